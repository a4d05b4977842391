//! # Linear transit ephemeris
//!
//! A transiting planet crosses its host star at regular intervals. Its timing is fully
//! described by a **linear ephemeris**: an orbital period `P` (days) and a reference
//! mid-transit time `T0` (BJD-TDB). The `n`-th transit after the reference happens at
//!
//! ```text
//! T(n) = T0 + n · P
//! ```
//!
//! [`Ephemeris::next_transit_after`] picks the smallest `n` such that `T(n)` lies
//! strictly after a reference time `t`:
//!
//! ```text
//! n = floor((t − T0) / P) + 1
//! ```
//!
//! ## Example
//!
//! ```rust
//! use exotransit::ephemeris::Ephemeris;
//! use exotransit::diagnostics::Diagnostics;
//! use exotransit::time::TimeInput;
//!
//! let ephem = Ephemeris::new(3.5, 2459000.0)?;
//! let mut diagnostics = Diagnostics::new();
//! let next = ephem.next_transit_after(Some(&TimeInput::JulianDate(2459010.0)), &mut diagnostics)?;
//! assert!((next.bjd_tdb() - 2459010.5).abs() < 1e-8);
//! # Ok::<(), exotransit::transit_errors::TransitError>(())
//! ```
use hifitime::{Epoch, Unit};
use std::fmt;

use crate::constants::{Days, JulianDate};
use crate::diagnostics::Diagnostics;
use crate::time::{epoch_to_jd_tdb, jd_tdb_to_epoch, resolve_reference_time, TimeInput};
use crate::transit_errors::TransitError;

/// Predicted mid-transit time, on the BJD-TDB scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TransitTime(Epoch);

impl TransitTime {
    pub fn from_bjd_tdb(jd: JulianDate) -> Self {
        TransitTime(jd_tdb_to_epoch(jd))
    }

    pub fn epoch(&self) -> Epoch {
        self.0
    }

    /// Barycentric Julian Date (TDB) of the transit.
    pub fn bjd_tdb(&self) -> JulianDate {
        epoch_to_jd_tdb(&self.0)
    }
}

impl From<TransitTime> for Epoch {
    fn from(t: TransitTime) -> Self {
        t.0
    }
}

impl fmt::Display for TransitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BJD_TDB {:.6} ({})", self.bjd_tdb(), self.0)
    }
}

/// A (possibly incomplete) linear transit ephemeris.
///
/// Both fields are optional so that partially known ephemerides coming from a catalog
/// can be represented; only a complete one can be propagated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ephemeris {
    /// Orbital period in days.
    pub period_days: Option<Days>,
    /// Reference mid-transit time, BJD-TDB.
    pub reference_time: Option<JulianDate>,
}

impl Ephemeris {
    /// Build a complete ephemeris.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::InvalidArgument`] if the period is not finite or shorter than one
    ///   nanosecond (the resolution of [`Epoch`]), or the reference time is not finite.
    pub fn new(period_days: Days, reference_time: JulianDate) -> Result<Self, TransitError> {
        let ephem = Ephemeris {
            period_days: Some(period_days),
            reference_time: Some(reference_time),
        };
        ephem.validate()?;
        Ok(ephem)
    }

    /// Build from optional parts, checking whatever is present.
    pub fn from_parts(
        period_days: Option<Days>,
        reference_time: Option<JulianDate>,
    ) -> Result<Self, TransitError> {
        let ephem = Ephemeris {
            period_days,
            reference_time,
        };
        ephem.validate()?;
        Ok(ephem)
    }

    fn validate(&self) -> Result<(), TransitError> {
        if let Some(p) = self.period_days {
            if !(p.is_finite() && (Unit::Day * p).total_nanoseconds() >= 1) {
                return Err(TransitError::InvalidArgument(format!(
                    "orbital period must be a positive number of days of at least 1 ns, got {p}"
                )));
            }
        }
        if let Some(t0) = self.reference_time {
            if !t0.is_finite() {
                return Err(TransitError::InvalidArgument(format!(
                    "transit epoch must be a finite Julian date, got {t0}"
                )));
            }
        }
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.period_days.is_some() && self.reference_time.is_some()
    }

    /// Both fields, or [`TransitError::IncompleteEphemeris`].
    pub fn complete(&self) -> Result<(Days, JulianDate), TransitError> {
        match (self.period_days, self.reference_time) {
            (Some(p), Some(t0)) => Ok((p, t0)),
            _ => Err(TransitError::IncompleteEphemeris),
        }
    }

    /// Next transit strictly after the reference time `t`.
    ///
    /// Arguments
    /// -----------------
    /// * `t`: the reference time; `None` means now. A time that cannot be parsed is
    ///   replaced by now and reported through `diagnostics`.
    /// * `diagnostics`: sink for non-fatal advisories.
    ///
    /// Return
    /// ----------
    /// * The mid-time of the first transit after `t`, on the BJD-TDB scale.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::IncompleteEphemeris`] if the period or the epoch is missing.
    pub fn next_transit_after(
        &self,
        t: Option<&TimeInput>,
        diagnostics: &mut Diagnostics,
    ) -> Result<TransitTime, TransitError> {
        self.complete()?;
        let reference = resolve_reference_time(t, diagnostics)?;
        self.next_transit_after_epoch(reference)
    }

    /// Same as [`Ephemeris::next_transit_after`] for an already resolved epoch.
    pub fn next_transit_after_epoch(&self, t: Epoch) -> Result<TransitTime, TransitError> {
        let (period, t0) = self.complete()?;
        let t0 = jd_tdb_to_epoch(t0);

        let elapsed = (t - t0).to_unit(Unit::Day);
        let epoch_count = (elapsed / period).floor() + 1.0;

        let mut transit = t0 + Unit::Day * (period * epoch_count);
        // Floating-point rounding may land exactly on t when t is itself a transit.
        if transit <= t {
            transit = transit + Unit::Day * period;
        }
        Ok(TransitTime(transit))
    }
}
