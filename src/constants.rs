//! # Constants and type definitions for exotransit
//!
//! This module centralizes the **astronomical constants**, **conversion factors**, **default
//! service endpoints** and **type aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Time-scale anchors (J2000.0, Besselian year origin)
//! - Unit conversions (degrees ↔ radians, hours ↔ days)
//! - Defaults of the transit search (advance step, year cutoff, pre-check year)
//! - Endpoints of the name resolver and of the exoplanet archive
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Julian Date of J2000.0 (2000-01-01 12:00:00 TT)
pub const JD2000: f64 = 2_451_545.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Julian Date of the Besselian year origin B1900.0
pub const B1900_JD: f64 = 2_415_020.313_52;

/// Length of the tropical (Besselian) year in days
pub const TROPICAL_YEAR: f64 = 365.242_198_781;

/// Days per Julian century
pub const DAYS_PER_CENTURY: f64 = 36525.0;

// -------------------------------------------------------------------------------------------------
// Transit search defaults
// -------------------------------------------------------------------------------------------------

/// Offset (hours) added to a rejected transit before propagating to the next one
pub const ADVANCE_STEP_HOURS: f64 = 1.0;

/// Year beyond which the visibility search gives up
pub const SEARCH_YEAR_CUTOFF: f64 = 10_000.0;

/// Calendar year used for the "is this target ever observable" pre-check
pub const PRECHECK_YEAR: i32 = 2023;

/// Sampling step (minutes) used when a time range is checked for observability
pub const PRECHECK_RESOLUTION_MINUTES: f64 = 30.0;

/// Default minimum altitude of the target (degrees)
pub const DEFAULT_MIN_ALTITUDE: Degree = 15.0;

/// Default minimum angular separation from the Moon (degrees)
pub const DEFAULT_MIN_MOON_SEPARATION: Degree = 30.0;

/// Default timeout of a network call (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// -------------------------------------------------------------------------------------------------
// External services
// -------------------------------------------------------------------------------------------------

/// Synchronous TAP endpoint of the NASA Exoplanet Archive
pub const EXOPLANET_ARCHIVE_TAP_URL: &str = "https://exoplanetarchive.ipac.caltech.edu/TAP/sync";

/// CDS Sesame name resolver, plain-text output restricted to Simbad
pub const SESAME_URL: &str = "https://cds.unistra.fr/cgi-bin/nph-sesame/-oI/S";

/// Planetary systems table of the exoplanet archive
pub const PLANETARY_SYSTEMS_TABLE: &str = "ps";

/// Output format requested from the TAP service
pub const DEFAULT_QUERY_FORMAT: &str = "csv";

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in meters
pub type Meter = f64;
/// Duration or date expressed in days
pub type Days = f64;
/// Julian Date (days), time scale given by context
pub type JulianDate = f64;
