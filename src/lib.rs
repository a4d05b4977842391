pub mod catalog;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod ephemeris;
pub mod http_client;
pub mod lookup;
pub mod resolver;
pub mod search;
pub mod selector;
pub mod sky_model;
pub mod target;
pub mod time;
pub mod transit_errors;
pub mod visibility;

pub use config::LookupConfig;
pub use ephemeris::{Ephemeris, TransitTime};
pub use lookup::{LocationInput, TransitLookup, TransitOutcome, TransitReport, TransitRequest};
pub use transit_errors::TransitError;
