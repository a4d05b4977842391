//! # Next-transit lookup
//!
//! [`TransitLookup`] is the entry point of the crate. Given a host-star name and a planet
//! designator it decides where the ephemeris comes from, propagates it to the next
//! transit and, when an observer location is supplied, searches for the next transit
//! that location can actually observe.
//!
//! ## Dispatch
//!
//! ```text
//! explicit period + epoch, no location   → propagate once
//! explicit period + epoch, location      → resolve coordinates, propagate, search
//! catalog source                         → resolve coordinates, cross-match the catalog,
//!                                          fetch and select an ephemeris, propagate,
//!                                          search if a location is given
//! ```
//!
//! Supplying both a period and an epoch together with the catalog source uses the
//! given values and records an [`Advisory::GivenEphemerisOverridesCatalog`].
//!
//! ## Outcomes
//!
//! Invalid input and collaborator failures are errors ([`TransitError`]). The three
//! "nothing to report" situations of a well-formed request are ordinary
//! [`TransitOutcome`] variants, logged at `info` level with a human-readable
//! explanation:
//!
//! * [`TransitOutcome::NoTransitKnown`] – the catalog lists no transit for the planet.
//! * [`TransitOutcome::IncompleteEphemeris`] – the catalog lacks a period or an epoch.
//! * [`TransitOutcome::NeverVisible`] – the target never satisfies the constraints from
//!   the given location.
//!
//! ## Example
//!
//! ```rust,no_run
//! use exotransit::lookup::{LocationInput, TransitLookup, TransitRequest};
//!
//! let lookup = TransitLookup::with_defaults()?;
//! let request = TransitRequest::new("WASP-39", "b")
//!     .location(LocationInput::Triple(vec![-17.88, 28.76, 2396.0]));
//! let report = lookup.find_next_transit(&request)?;
//! if let Some(transit) = report.transit_time() {
//!     println!("{} transits at {transit}", report.target.display_name());
//! }
//! # Ok::<(), exotransit::transit_errors::TransitError>(())
//! ```
//!
//! ## See also
//! ------------
//! * [`crate::config::LookupConfig`] – Endpoints, constraints and search bounds.
//! * [`crate::selector::select`] – Choice among several catalog ephemerides.
//! * [`crate::search::TransitVisibilitySearch`] – The visible-transit search.
use std::fmt;
use std::str::FromStr;

use crate::catalog::{
    coordinates_query, cross_match, ephemerides_query, query_catalog, records_for_planet,
    CatalogService, CoordinateRow, EphemerisRow, ExoplanetArchive,
};
use crate::config::LookupConfig;
use crate::diagnostics::{Advisory, Diagnostics};
use crate::ephemeris::{Ephemeris, TransitTime};
use crate::http_client::HttpClient;
use crate::resolver::{NameResolver, SesameResolver};
use crate::search::{CancellationToken, SearchOutcome, TransitVisibilitySearch};
use crate::selector::{select, EphemerisSelection};
use crate::sky_model::SkyModelEvaluator;
use crate::target::Target;
use crate::time::TimeInput;
use crate::transit_errors::TransitError;
use crate::visibility::{ObserverLocation, SkyCoord, VisibilityEvaluator};

/// Where the ephemeris of a request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EphemerisSource {
    /// Query the exoplanet catalog.
    Catalog,
    /// Use the period and epoch given in the request.
    Given,
}

impl FromStr for EphemerisSource {
    type Err = TransitError;

    /// `"catalog"` (or its historical name `"nea"`) and `"none"`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "catalog" | "nea" => Ok(EphemerisSource::Catalog),
            "none" => Ok(EphemerisSource::Given),
            _ => Err(TransitError::InvalidArgument(format!(
                "{s} is not a valid ephemeris source (expected \"catalog\" or \"none\")"
            ))),
        }
    }
}

/// Observer location as supplied by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    /// `[longitude (deg, east positive), latitude (deg), elevation (m)]`.
    Triple(Vec<f64>),
    Site(ObserverLocation),
}

impl LocationInput {
    pub fn to_location(&self) -> Result<ObserverLocation, TransitError> {
        match self {
            LocationInput::Triple(values) => ObserverLocation::from_triple(values),
            LocationInput::Site(site) => Ok(*site),
        }
    }
}

impl From<ObserverLocation> for LocationInput {
    fn from(site: ObserverLocation) -> Self {
        LocationInput::Site(site)
    }
}

/// One next-transit request.
#[derive(Debug, Clone)]
pub struct TransitRequest {
    pub star_name: String,
    pub planet_id: String,
    /// Parsed with [`EphemerisSource::from_str`].
    pub source: String,
    pub period_days: Option<f64>,
    /// Reference transit mid-time, BJD-TDB.
    pub epoch: Option<f64>,
    pub location: Option<LocationInput>,
    /// Time after which the next transit is looked for; now if absent.
    pub reference_time: Option<TimeInput>,
    pub cancellation: Option<CancellationToken>,
}

impl TransitRequest {
    /// Catalog request for `<star_name> <planet_id>`, no location, from now.
    pub fn new(star_name: impl Into<String>, planet_id: impl Into<String>) -> Self {
        TransitRequest {
            star_name: star_name.into(),
            planet_id: planet_id.into(),
            source: "catalog".to_string(),
            period_days: None,
            epoch: None,
            location: None,
            reference_time: None,
            cancellation: None,
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn ephemeris(mut self, period_days: f64, epoch: f64) -> Self {
        self.period_days = Some(period_days);
        self.epoch = Some(epoch);
        self
    }

    pub fn location(mut self, location: impl Into<LocationInput>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn reference_time(mut self, t: impl Into<TimeInput>) -> Self {
        self.reference_time = Some(t.into());
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn explicit_ephemeris(&self) -> Option<(f64, f64)> {
        self.period_days.zip(self.epoch)
    }
}

/// Result of a well-formed lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitOutcome {
    Transit(TransitTime),
    NoTransitKnown,
    IncompleteEphemeris,
    NeverVisible,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitReport {
    pub outcome: TransitOutcome,
    /// Final target state. [`Target::next_transit`] holds the reported transit and is
    /// `None` for every soft outcome.
    pub target: Target,
    pub diagnostics: Diagnostics,
}

impl TransitReport {
    pub fn transit_time(&self) -> Option<TransitTime> {
        match self.outcome {
            TransitOutcome::Transit(t) => Some(t),
            _ => None,
        }
    }

    /// Explanation of a soft outcome, `None` when a transit was found.
    pub fn explanation(&self) -> Option<String> {
        let name = self.target.display_name();
        match self.outcome {
            TransitOutcome::Transit(_) => None,
            TransitOutcome::NoTransitKnown => Some(format!(
                "According to the catalog, {name} does not transit. If you have discovered \
                 a transit of this planet, please consult your nearest observatory immediately."
            )),
            TransitOutcome::IncompleteEphemeris => Some(format!(
                "Could not extract a complete ephemeris for {name} from the catalog. \
                 No transits can be reported."
            )),
            TransitOutcome::NeverVisible => Some(format!(
                "Sorry, {} is never visible from this location. No transits visible.",
                self.target.host_star_name()
            )),
        }
    }
}

impl fmt::Display for TransitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.outcome, self.explanation()) {
            (TransitOutcome::Transit(t), _) => {
                write!(f, "Next transit of {}: {t}", self.target.display_name())
            }
            (_, Some(text)) => write!(f, "{text}"),
            (_, None) => Ok(()),
        }
    }
}

/// Orchestrates name resolution, catalog queries, ephemeris selection and the
/// visible-transit search.
pub struct TransitLookup {
    resolver: Box<dyn NameResolver>,
    catalog: Box<dyn CatalogService>,
    evaluator: Box<dyn VisibilityEvaluator>,
    config: LookupConfig,
}

impl TransitLookup {
    /// Lookup backed by CDS Sesame, the NASA Exoplanet Archive and the built-in sky
    /// model, all configured from `config`.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::InvalidConfig`] if `config` fails [`LookupConfig::validate`].
    pub fn new(config: LookupConfig) -> Result<Self, TransitError> {
        config.validate()?;
        let client = HttpClient::new(config.timeout());
        let resolver = SesameResolver::new(client.clone(), config.resolver_url.clone());
        let catalog = ExoplanetArchive::new(client, config.archive_url.clone());
        let evaluator = SkyModelEvaluator::new(config.resolution_minutes)?;

        Self::with_services(
            Box::new(resolver),
            Box::new(catalog),
            Box::new(evaluator),
            config,
        )
    }

    pub fn with_defaults() -> Result<Self, TransitError> {
        Self::new(LookupConfig::default())
    }

    /// Lookup on caller-provided collaborators.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::InvalidConfig`] if `config` fails [`LookupConfig::validate`].
    pub fn with_services(
        resolver: Box<dyn NameResolver>,
        catalog: Box<dyn CatalogService>,
        evaluator: Box<dyn VisibilityEvaluator>,
        config: LookupConfig,
    ) -> Result<Self, TransitError> {
        config.validate()?;
        Ok(TransitLookup {
            resolver,
            catalog,
            evaluator,
            config,
        })
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Find the next transit (visible from `request.location` if given).
    ///
    /// Arguments
    /// -----------------
    /// * `request`: star, planet, ephemeris source and optional ephemeris, location,
    ///   reference time and cancellation token.
    ///
    /// Return
    /// ----------
    /// * A [`TransitReport`] holding the outcome, the final [`Target`] and the
    ///   advisories raised on the way.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::InvalidArgument`] for an unknown source, a missing period or
    ///   epoch with source `"none"`, a malformed location or an invalid constraint.
    /// * [`TransitError::NotFound`] if the star name cannot be resolved.
    /// * [`TransitError::CatalogQuery`] if a catalog query fails.
    /// * [`TransitError::VisibilitySearchExhausted`] / [`TransitError::SearchCancelled`]
    ///   from the visible-transit search.
    pub fn find_next_transit(
        &self,
        request: &TransitRequest,
    ) -> Result<TransitReport, TransitError> {
        let source: EphemerisSource = request.source.parse()?;
        let explicit = request.explicit_ephemeris();
        if source == EphemerisSource::Given && explicit.is_none() {
            return Err(TransitError::InvalidArgument(
                "both a period and an epoch are required when the ephemeris source is \"none\""
                    .into(),
            ));
        }
        let location = request
            .location
            .as_ref()
            .map(LocationInput::to_location)
            .transpose()?;

        let mut diagnostics = Diagnostics::new();
        let constraints = match location {
            Some(_) => Some(self.config.constraints(&mut diagnostics)?),
            None => None,
        };
        let mut target = Target::new(request.star_name.trim(), request.planet_id.trim());

        match explicit {
            Some((period, epoch)) => {
                if source == EphemerisSource::Catalog {
                    diagnostics.push(Advisory::GivenEphemerisOverridesCatalog);
                }
                target.set_ephemeris(Ephemeris::new(period, epoch)?);
                if location.is_some() {
                    target.set_sky_coordinates(self.resolve(&target)?);
                }
            }
            None => {
                target.set_sky_coordinates(self.resolve(&target)?);
                match self.catalog_ephemeris(&mut target, &mut diagnostics)? {
                    Some(ephemeris) => target.set_ephemeris(ephemeris),
                    None => {
                        let outcome = match target.transits() {
                            Some(false) => TransitOutcome::NoTransitKnown,
                            _ => TransitOutcome::IncompleteEphemeris,
                        };
                        return Ok(finish(outcome, target, diagnostics));
                    }
                }
            }
        }

        let first =
            target.update_next_transit(request.reference_time.as_ref(), &mut diagnostics)?;

        let outcome = match (location, constraints, target.sky_coordinates()) {
            (Some(site), Some(constraints), Some(coords)) => {
                let evaluator = self.evaluator.as_ref();
                let search = TransitVisibilitySearch::new(evaluator, coords, &site, &constraints)
                    .settings(self.config.search_settings())
                    .cancellation(request.cancellation.as_ref());
                match search.run(target.ephemeris(), first)? {
                    SearchOutcome::Visible(t) => TransitOutcome::Transit(t),
                    SearchOutcome::NeverVisible => TransitOutcome::NeverVisible,
                }
            }
            _ => TransitOutcome::Transit(first),
        };

        Ok(finish(outcome, target, diagnostics))
    }

    fn resolve(&self, target: &Target) -> Result<SkyCoord, TransitError> {
        self.resolver.resolve_coordinates(target.host_star_name())
    }

    /// Cross-match the target in the catalog and select its ephemeris.
    ///
    /// `Ok(None)` means a soft outcome was recorded on the target: either the catalog
    /// knows no transit ([`Target::transits`] is `Some(false)`) or the ephemeris is
    /// incomplete.
    fn catalog_ephemeris(
        &self,
        target: &mut Target,
        diagnostics: &mut Diagnostics,
    ) -> Result<Option<Ephemeris>, TransitError> {
        let coords = target
            .sky_coordinates()
            .copied()
            .ok_or_else(|| TransitError::NotFound(target.host_star_name().to_string()))?;

        let coordinate_rows: Vec<CoordinateRow> =
            query_catalog(self.catalog.as_ref(), &coordinates_query())?;
        let matched = cross_match(
            target.host_star_name(),
            target.planet_designator(),
            &coords,
            &coordinate_rows,
            diagnostics,
        )?;

        let query =
            ephemerides_query().constraint("pl_name", "=", adql_string(&matched.pl_name));
        let rows: Vec<EphemerisRow> = query_catalog(self.catalog.as_ref(), &query)?;
        let records = records_for_planet(&rows, &matched.pl_name);
        log::debug!("{} catalog records for {}", records.len(), matched.pl_name);

        match select(&records) {
            Ok(EphemerisSelection::Selected(ephemeris)) => {
                target.set_transits(true);
                Ok(Some(ephemeris))
            }
            Ok(EphemerisSelection::NoTransitKnown) => {
                target.set_transits(false);
                Ok(None)
            }
            Err(TransitError::IncompleteEphemeris) => {
                target.set_transits(true);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Assemble the report; soft outcomes are logged with their explanation.
fn finish(outcome: TransitOutcome, mut target: Target, diagnostics: Diagnostics) -> TransitReport {
    match outcome {
        TransitOutcome::Transit(t) => target.set_next_transit(t),
        TransitOutcome::NeverVisible => target.clear_next_transit(),
        TransitOutcome::NoTransitKnown | TransitOutcome::IncompleteEphemeris => {}
    }
    let report = TransitReport {
        outcome,
        target,
        diagnostics,
    };
    if let Some(text) = report.explanation() {
        log::info!("{text}");
    }
    report
}

/// Quote a string literal for a catalog query.
fn adql_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
