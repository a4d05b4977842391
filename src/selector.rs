//! # Ephemeris selection
//!
//! An exoplanet catalog usually holds several parameter sets for the same planet, one
//! per publication, with at most one of them flagged as the *default* solution. This
//! module reduces such a set of [`CatalogRecord`]s to a single [`Ephemeris`].
//!
//! ## Precedence
//!
//! 1. No record flags a transit → [`EphemerisSelection::NoTransitKnown`].
//! 2. The default record, if it carries **both** period and mid-transit time.
//! 3. The first non-default record carrying both fields (first hit wins).
//! 4. The first period and the first mid-transit time found among non-default records,
//!    possibly from different publications.
//! 5. Otherwise [`TransitError::IncompleteEphemeris`].
//!
//! A default record with a single field is ignored altogether: its lone value is never
//! merged with values from other publications.
use crate::constants::{Days, JulianDate};
use crate::ephemeris::Ephemeris;
use crate::transit_errors::TransitError;

/// One catalog row describing a planet solution.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CatalogRecord {
    pub is_default: bool,
    pub shows_transit: bool,
    pub period_days: Option<Days>,
    pub transit_epoch: Option<JulianDate>,
}

impl CatalogRecord {
    fn full_ephemeris(&self) -> Option<(Days, JulianDate)> {
        self.period_days.zip(self.transit_epoch)
    }
}

/// Result of [`select`].
#[derive(Debug, Clone, PartialEq)]
pub enum EphemerisSelection {
    Selected(Ephemeris),
    /// The catalog states that the planet does not transit.
    NoTransitKnown,
}

/// Pick one ephemeris out of the catalog records of a single planet.
///
/// Arguments
/// -----------------
/// * `records`: every catalog row of the planet, in catalog order.
///
/// Return
/// ----------
/// * [`EphemerisSelection::Selected`] with a complete ephemeris, or
///   [`EphemerisSelection::NoTransitKnown`] if no row flags a transit.
///
/// Errors
/// ----------
/// * [`TransitError::IncompleteEphemeris`] when no period or no mid-transit time can be found.
pub fn select(records: &[CatalogRecord]) -> Result<EphemerisSelection, TransitError> {
    if !records.iter().any(|r| r.shows_transit) {
        return Ok(EphemerisSelection::NoTransitKnown);
    }

    if let Some((p, t0)) = records
        .iter()
        .find(|r| r.is_default)
        .and_then(CatalogRecord::full_ephemeris)
    {
        return Ok(EphemerisSelection::Selected(Ephemeris::new(p, t0)?));
    }

    let mut final_period = None;
    let mut final_epoch = None;
    for record in records.iter().filter(|r| !r.is_default) {
        if let Some((p, t0)) = record.full_ephemeris() {
            return Ok(EphemerisSelection::Selected(Ephemeris::new(p, t0)?));
        }
        final_period = final_period.or(record.period_days);
        final_epoch = final_epoch.or(record.transit_epoch);
    }

    match (final_period, final_epoch) {
        (Some(p), Some(t0)) => Ok(EphemerisSelection::Selected(Ephemeris::new(p, t0)?)),
        _ => Err(TransitError::IncompleteEphemeris),
    }
}
