//! # Built-in sky model
//!
//! [`SkyModelEvaluator`] is a self-contained [`VisibilityEvaluator`]: it needs no
//! network access and no ephemeris file. Positions come from the low-precision solar
//! and lunar series of the *Astronomical Almanac* (accuracy ≈ 0.01° for the Sun and
//! ≈ 0.3° for the Moon over 1950–2050), which is far below the width of any realistic
//! altitude or Moon-separation threshold.
//!
//! ## Model
//!
//! ```text
//! target altitude : sin(alt) = sin φ sin δ + cos φ cos δ cos H,   H = GMST + λ − α
//! night           : altitude(Sun) ≤ NightLevel::max_solar_altitude()
//! moon separation : angle between the target and Moon unit vectors (geocentric)
//! ```
//!
//! Refraction, lunar parallax and polar motion are ignored.
//!
//! Range queries ([`VisibilityEvaluator::is_ever_observable`]) sample the interval on a
//! regular grid (30 minutes by default).
use hifitime::Epoch;
use nalgebra::{Rotation3, Vector3};

use crate::constants::{
    Degree, Radian, DAYS_PER_CENTURY, DPI, JD2000, PRECHECK_RESOLUTION_MINUTES, RADEG,
};
use crate::time::{gmst, jd_tt, time_grid};
use crate::transit_errors::TransitError;
use crate::visibility::{ObserverLocation, SkyCoord, VisibilityConstraints, VisibilityEvaluator};

/// Local visibility evaluator based on analytical Sun and Moon positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyModelEvaluator {
    resolution_minutes: f64,
}

impl Default for SkyModelEvaluator {
    fn default() -> Self {
        SkyModelEvaluator {
            resolution_minutes: PRECHECK_RESOLUTION_MINUTES,
        }
    }
}

impl SkyModelEvaluator {
    /// Evaluator sampling time ranges every `resolution_minutes`.
    pub fn new(resolution_minutes: f64) -> Result<Self, TransitError> {
        if !(resolution_minutes.is_finite() && resolution_minutes > 0.0) {
            return Err(TransitError::InvalidArgument(format!(
                "time resolution must be positive, got {resolution_minutes} min"
            )));
        }
        Ok(SkyModelEvaluator { resolution_minutes })
    }

    pub fn resolution_minutes(&self) -> f64 {
        self.resolution_minutes
    }
}

impl VisibilityEvaluator for SkyModelEvaluator {
    fn is_observable_at(
        &self,
        target: &SkyCoord,
        location: &ObserverLocation,
        time: Epoch,
        constraints: &VisibilityConstraints,
    ) -> Result<bool, TransitError> {
        Ok(satisfies_constraints(target, location, time, constraints))
    }

    fn is_ever_observable(
        &self,
        target: &SkyCoord,
        location: &ObserverLocation,
        start: Epoch,
        end: Epoch,
        constraints: &VisibilityConstraints,
    ) -> Result<bool, TransitError> {
        if end < start {
            return Err(TransitError::InvalidArgument(format!(
                "time range ends ({end}) before it starts ({start})"
            )));
        }
        Ok(time_grid(start, end, self.resolution_minutes)
            .into_iter()
            .any(|t| satisfies_constraints(target, location, t, constraints)))
    }
}

fn satisfies_constraints(
    target: &SkyCoord,
    location: &ObserverLocation,
    time: Epoch,
    constraints: &VisibilityConstraints,
) -> bool {
    let jd = jd_tt(&time);

    let sun = sun_position(jd);
    if altitude(&sun, location, &time) > constraints.night_level().max_solar_altitude() {
        return false;
    }
    if altitude(target, location, &time) < constraints.min_altitude_deg() {
        return false;
    }
    angular_separation(target, &moon_position(jd)) >= constraints.min_moon_separation_deg()
}

/// Altitude above the horizon (degrees) of `coord` seen from `location` at `time`.
pub fn altitude(coord: &SkyCoord, location: &ObserverLocation, time: &Epoch) -> Degree {
    let hour_angle = gmst(time) + location.longitude * RADEG - coord.ra_deg * RADEG;
    let lat = location.latitude * RADEG;
    let dec = coord.dec_deg * RADEG;

    let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos();
    sin_alt.clamp(-1.0, 1.0).asin() / RADEG
}

/// Great-circle distance between two positions, in degrees.
pub fn angular_separation(a: &SkyCoord, b: &SkyCoord) -> Degree {
    unit_vector(a).angle(&unit_vector(b)) / RADEG
}

fn unit_vector(coord: &SkyCoord) -> Vector3<f64> {
    let (ra, dec) = (coord.ra_deg * RADEG, coord.dec_deg * RADEG);
    Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
}

/// Mean obliquity of the ecliptic (radians) at a TT Julian date.
fn obliquity(jd: f64) -> Radian {
    (23.439 - 0.000_000_4 * (jd - JD2000)) * RADEG
}

/// Ecliptic longitude/latitude (radians) to equatorial coordinates of date.
fn ecliptic_to_equatorial(lambda: Radian, beta: Radian, jd: f64) -> SkyCoord {
    let ecl = Vector3::new(
        beta.cos() * lambda.cos(),
        beta.cos() * lambda.sin(),
        beta.sin(),
    );
    let equ = Rotation3::from_axis_angle(&Vector3::x_axis(), obliquity(jd)) * ecl;

    SkyCoord {
        ra_deg: equ.y.atan2(equ.x).rem_euclid(DPI) / RADEG,
        dec_deg: equ.z.clamp(-1.0, 1.0).asin() / RADEG,
    }
}

/// Apparent geocentric position of the Sun at a TT Julian date.
pub fn sun_position(jd: f64) -> SkyCoord {
    let n = jd - JD2000;
    let mean_longitude = 280.460 + 0.985_647_4 * n;
    let g = (357.528 + 0.985_600_3 * n) * RADEG;
    let lambda = (mean_longitude + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()) * RADEG;

    ecliptic_to_equatorial(lambda, 0.0, jd)
}

/// Geocentric position of the Moon at a TT Julian date.
pub fn moon_position(jd: f64) -> SkyCoord {
    let t = (jd - JD2000) / DAYS_PER_CENTURY;
    let s = |a: f64, b: f64| ((a + b * t) * RADEG).sin();

    let lambda = 218.32 + 481_267.881 * t + 6.29 * s(135.0, 477_198.87)
        - 1.27 * s(259.3, -413_335.36)
        + 0.66 * s(235.7, 890_534.22)
        + 0.21 * s(269.9, 954_397.74)
        - 0.19 * s(357.5, 35_999.05)
        - 0.11 * s(186.5, 966_404.03);
    let beta = 5.13 * s(93.3, 483_202.02) + 0.28 * s(228.2, 960_400.89)
        - 0.28 * s(318.3, 6_003.15)
        - 0.17 * s(217.6, -407_332.21);

    ecliptic_to_equatorial(lambda * RADEG, beta * RADEG, jd)
}
