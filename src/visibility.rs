//! # Observability constraints and evaluator interface
//!
//! This module defines what "the target can be observed" means for a ground-based
//! observer and the narrow interface the transit search relies on to answer it.
//!
//! ## Building blocks
//!
//! - [`SkyCoord`] – ICRS right ascension / declination of the host star, in degrees.
//! - [`ObserverLocation`] – geodetic longitude, latitude and elevation of the site.
//! - [`NightLevel`] – how dark the sky must be (Sun below 0°, 6°, 12° or 18°).
//! - [`VisibilityConstraints`] – night level, minimum target altitude and minimum
//!   angular distance from the Moon, validated at construction.
//! - [`VisibilityEvaluator`] – the collaborator answering observability questions, either
//!   at an instant or over a time range.
//!
//! ## Constraint validation
//!
//! | Input                       | Behaviour                                   |
//! |-----------------------------|---------------------------------------------|
//! | `min_altitude < 0`          | clamped to 0°, [`Advisory::AltitudeClamped`] |
//! | `min_altitude >= 90`        | [`TransitError::InvalidArgument`]           |
//! | `min_moon_separation < 0`   | clamped to 0°, [`Advisory::MoonSeparationClamped`] |
//! | unknown night name          | [`TransitError::InvalidArgument`]           |
//!
//! ## See also
//! ------------
//! * [`crate::sky_model::SkyModelEvaluator`] – Built-in evaluator.
//! * [`crate::search`] – The transit search driving the evaluator.
use hifitime::Epoch;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{Degree, Meter, DEFAULT_MIN_ALTITUDE, DEFAULT_MIN_MOON_SEPARATION};
use crate::diagnostics::{Advisory, Diagnostics};
use crate::transit_errors::TransitError;

/// Equatorial coordinates (ICRS) in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyCoord {
    pub ra_deg: Degree,
    pub dec_deg: Degree,
}

impl SkyCoord {
    pub fn new(ra_deg: Degree, dec_deg: Degree) -> Result<Self, TransitError> {
        if !ra_deg.is_finite() || !dec_deg.is_finite() || !(-90.0..=90.0).contains(&dec_deg) {
            return Err(TransitError::InvalidArgument(format!(
                "invalid sky coordinates (ra={ra_deg}, dec={dec_deg})"
            )));
        }
        Ok(SkyCoord {
            ra_deg: ra_deg.rem_euclid(360.0),
            dec_deg,
        })
    }
}

/// Geodetic position of an observer on Earth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverLocation {
    /// Longitude in degrees, east positive.
    pub longitude: Degree,
    /// Geodetic latitude in degrees.
    pub latitude: Degree,
    /// Height above the ellipsoid in meters.
    pub elevation: Meter,
}

impl ObserverLocation {
    /// Arguments
    /// -----------------
    /// * `longitude`: degrees, east positive.
    /// * `latitude`: degrees, within [-90, 90].
    /// * `elevation`: meters.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::InvalidArgument`] for non-finite values or an out-of-range latitude.
    pub fn from_geodetic(
        longitude: Degree,
        latitude: Degree,
        elevation: Meter,
    ) -> Result<Self, TransitError> {
        if !(longitude.is_finite() && latitude.is_finite() && elevation.is_finite()) {
            return Err(TransitError::InvalidArgument(
                "location components must be finite numbers".into(),
            ));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(TransitError::InvalidArgument(format!(
                "latitude must be within [-90, 90] deg, got {latitude}"
            )));
        }
        Ok(ObserverLocation {
            longitude,
            latitude,
            elevation,
        })
    }

    /// Build from a `[longitude, latitude, elevation]` slice.
    pub fn from_triple(values: &[f64]) -> Result<Self, TransitError> {
        match values {
            [lon, lat, height] => Self::from_geodetic(*lon, *lat, *height),
            _ => Err(TransitError::InvalidArgument(
                "location must be a 3 item sequence containing longitude, latitude, and elevation"
                    .into(),
            )),
        }
    }
}

/// Darkness required before a target counts as observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NightLevel {
    /// Sun below the horizon.
    Sunset,
    /// Sun 6° below the horizon.
    Civil,
    /// Sun 12° below the horizon.
    #[default]
    Nautical,
    /// Sun 18° below the horizon.
    Astronomical,
}

impl NightLevel {
    /// Highest solar altitude (degrees) still counted as night.
    pub fn max_solar_altitude(&self) -> Degree {
        match self {
            NightLevel::Sunset => 0.0,
            NightLevel::Civil => -6.0,
            NightLevel::Nautical => -12.0,
            NightLevel::Astronomical => -18.0,
        }
    }
}

impl FromStr for NightLevel {
    type Err = TransitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sunset" => Ok(NightLevel::Sunset),
            "civil" => Ok(NightLevel::Civil),
            "nautical" => Ok(NightLevel::Nautical),
            "astronomical" => Ok(NightLevel::Astronomical),
            _ => Err(TransitError::InvalidArgument(format!(
                "{s} is not a recognized definition of night time"
            ))),
        }
    }
}

impl fmt::Display for NightLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NightLevel::Sunset => "sunset",
            NightLevel::Civil => "civil",
            NightLevel::Nautical => "nautical",
            NightLevel::Astronomical => "astronomical",
        };
        write!(f, "{name}")
    }
}

/// Validated observability constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityConstraints {
    night_level: NightLevel,
    min_altitude_deg: Degree,
    min_moon_separation_deg: Degree,
}

impl Default for VisibilityConstraints {
    fn default() -> Self {
        VisibilityConstraints {
            night_level: NightLevel::Nautical,
            min_altitude_deg: DEFAULT_MIN_ALTITUDE,
            min_moon_separation_deg: DEFAULT_MIN_MOON_SEPARATION,
        }
    }
}

impl VisibilityConstraints {
    /// Validate and build a constraint set.
    ///
    /// Arguments
    /// -----------------
    /// * `night_level`: required darkness.
    /// * `min_altitude_deg`: minimum altitude of the target; negative values are clamped to 0.
    /// * `min_moon_separation_deg`: minimum target–Moon separation; negative values are clamped to 0.
    /// * `diagnostics`: receives the clamping advisories.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::InvalidArgument`] if the altitude is 90° or more, or a value is NaN.
    pub fn new(
        night_level: NightLevel,
        min_altitude_deg: Degree,
        min_moon_separation_deg: Degree,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, TransitError> {
        if min_altitude_deg.is_nan() || min_moon_separation_deg.is_nan() {
            return Err(TransitError::InvalidArgument(
                "visibility constraints must be numbers".into(),
            ));
        }

        let min_altitude_deg = if min_altitude_deg < 0.0 {
            diagnostics.push(Advisory::AltitudeClamped {
                given: min_altitude_deg,
            });
            0.0
        } else if min_altitude_deg >= 90.0 {
            return Err(TransitError::InvalidArgument(
                "Minimum altitude cannot be >= 90 deg.".into(),
            ));
        } else {
            min_altitude_deg
        };

        let min_moon_separation_deg = if min_moon_separation_deg < 0.0 {
            diagnostics.push(Advisory::MoonSeparationClamped {
                given: min_moon_separation_deg,
            });
            0.0
        } else {
            min_moon_separation_deg
        };

        Ok(VisibilityConstraints {
            night_level,
            min_altitude_deg,
            min_moon_separation_deg,
        })
    }

    pub fn night_level(&self) -> NightLevel {
        self.night_level
    }

    pub fn min_altitude_deg(&self) -> Degree {
        self.min_altitude_deg
    }

    pub fn min_moon_separation_deg(&self) -> Degree {
        self.min_moon_separation_deg
    }
}

/// Answers "can this target be observed from here?".
///
/// Implementations may be network services or local sky models; the transit search
/// only needs these two questions answered.
pub trait VisibilityEvaluator {
    /// Whether the target satisfies every constraint at the instant `time`.
    fn is_observable_at(
        &self,
        target: &SkyCoord,
        location: &ObserverLocation,
        time: Epoch,
        constraints: &VisibilityConstraints,
    ) -> Result<bool, TransitError>;

    /// Whether the target satisfies every constraint at some time within `[start, end]`.
    fn is_ever_observable(
        &self,
        target: &SkyCoord,
        location: &ObserverLocation,
        start: Epoch,
        end: Epoch,
        constraints: &VisibilityConstraints,
    ) -> Result<bool, TransitError>;
}
