//! # Time handling
//!
//! Every timestamp of the crate is a [`hifitime::Epoch`]. Transit ephemerides are
//! expressed as **BJD-TDB** Julian dates, so conversions always go through the TDB
//! time scale; sidereal time is derived from the UTC representation.
//!
//! ## See also
//! ------------
//! * [`crate::ephemeris::Ephemeris::next_transit_after`] – Main consumer of [`TimeInput`].
//! * [`crate::sky_model`] – Uses [`gmst`] for local sidereal time.
use hifitime::{Epoch, Unit};
use std::fmt;
use std::str::FromStr;

use crate::constants::{JulianDate, B1900_JD, DAYS_PER_CENTURY, DPI, T2000, TROPICAL_YEAR};
use crate::diagnostics::{Advisory, Diagnostics};
use crate::transit_errors::TransitError;

/// A reference time as supplied by a caller.
///
/// Text inputs are parsed lazily: either a hifitime-compatible date string
/// (e.g. `"2023-06-01T00:00:00 UTC"`) or a bare number read as a BJD-TDB Julian date.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeInput {
    /// An already built epoch.
    Epoch(Epoch),
    /// Julian date on the TDB scale.
    JulianDate(JulianDate),
    /// Free-form text.
    Text(String),
}

impl From<Epoch> for TimeInput {
    fn from(epoch: Epoch) -> Self {
        TimeInput::Epoch(epoch)
    }
}

impl From<f64> for TimeInput {
    fn from(jd: f64) -> Self {
        TimeInput::JulianDate(jd)
    }
}

impl From<&str> for TimeInput {
    fn from(text: &str) -> Self {
        TimeInput::Text(text.to_string())
    }
}

impl fmt::Display for TimeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInput::Epoch(e) => write!(f, "{e}"),
            TimeInput::JulianDate(jd) => write!(f, "JD {jd}"),
            TimeInput::Text(s) => write!(f, "{s}"),
        }
    }
}

impl TimeInput {
    /// Interpret the input as an epoch, or `None` if it cannot be understood as a time.
    pub fn to_epoch(&self) -> Option<Epoch> {
        match self {
            TimeInput::Epoch(e) => Some(*e),
            TimeInput::JulianDate(jd) if jd.is_finite() => Some(jd_tdb_to_epoch(*jd)),
            TimeInput::JulianDate(_) => None,
            TimeInput::Text(s) => {
                let s = s.trim();
                match s.parse::<f64>() {
                    Ok(jd) if jd.is_finite() => Some(jd_tdb_to_epoch(jd)),
                    Ok(_) => None,
                    Err(_) => Epoch::from_str(s).ok(),
                }
            }
        }
    }
}

/// Resolve an optional reference time into an epoch.
///
/// Arguments
/// -----------------
/// * `input`: the caller-supplied time, `None` meaning "now".
/// * `diagnostics`: receives an [`Advisory::UnparsableReferenceTime`] when the input
///   cannot be understood.
///
/// Return
/// ----------
/// * The parsed epoch, or the current time when the input is absent or unparsable.
///   Fails only if the system clock cannot be read.
pub fn resolve_reference_time(
    input: Option<&TimeInput>,
    diagnostics: &mut Diagnostics,
) -> Result<Epoch, TransitError> {
    match input {
        None => Ok(Epoch::now()?),
        Some(t) => match t.to_epoch() {
            Some(epoch) => Ok(epoch),
            None => {
                diagnostics.push(Advisory::UnparsableReferenceTime {
                    input: t.to_string(),
                });
                Ok(Epoch::now()?)
            }
        },
    }
}

/// Build an epoch from a Julian date on the TDB scale.
pub fn jd_tdb_to_epoch(jd: JulianDate) -> Epoch {
    Epoch::from_jde_tdb(jd)
}

/// Julian date on the TDB scale of an epoch.
pub fn epoch_to_jd_tdb(epoch: &Epoch) -> JulianDate {
    epoch.to_jde_tdb_days()
}

/// Besselian year of an epoch (e.g. `2023.5`).
///
/// Used as the calendar-year measure of the search cutoff; it keeps working far past
/// the range of a civil calendar.
pub fn besselian_year(epoch: &Epoch) -> f64 {
    1900.0 + (epoch_to_jd_tdb(epoch) - B1900_JD) / TROPICAL_YEAR
}

/// First and last second (UTC) of a calendar year.
pub fn calendar_year_bounds(year: i32) -> (Epoch, Epoch) {
    (
        Epoch::from_gregorian_utc_at_midnight(year, 1, 1),
        Epoch::from_gregorian_utc(year, 12, 31, 23, 59, 59, 0),
    )
}

/// Evenly spaced epochs from `start` to `end` (both included) with the given step in minutes.
pub fn time_grid(start: Epoch, end: Epoch, step_minutes: f64) -> Vec<Epoch> {
    let mut grid = Vec::new();
    let step = Unit::Minute * step_minutes;
    let mut t = start;
    while t <= end {
        grid.push(t);
        t = t + step;
    }
    if grid.last() != Some(&end) {
        grid.push(end);
    }
    grid
}

/// Greenwich Mean Sidereal Time (radians, in [0, 2π)) of an epoch.
///
/// The IAU 1982 polynomial is evaluated at 0h UT followed by the rotation accumulated
/// during the fraction of the day. UTC stands in for UT1 (|UT1 − UTC| < 0.9 s).
pub fn gmst(epoch: &Epoch) -> f64 {
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;
    // sidereal / solar day ratio
    const RAP: f64 = 1.00273790934;

    let tjm = epoch.to_mjd_utc_days();
    let t = (tjm.floor() - T2000) / DAYS_PER_CENTURY;

    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / 86400.0;
    (gmst0 + tjm.fract() * DPI * RAP).rem_euclid(DPI)
}

/// Julian date in the TT scale, used by the low-precision solar and lunar theories.
pub(crate) fn jd_tt(epoch: &Epoch) -> JulianDate {
    epoch.to_jde_tt_days()
}
