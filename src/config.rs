//! # Lookup configuration
//!
//! [`LookupConfig`] gathers every tunable of a transit lookup: service endpoints, the
//! HTTP timeout, the observability constraints and the bounds of the visible-transit
//! search.
//!
//! A configuration is obtained in one of three ways:
//!
//! * [`LookupConfig::default`] – the historical command-line defaults
//!   (nautical night, 15° minimum altitude, 30° from the Moon, 10 s timeout).
//! * [`LookupConfig::builder`] – override selected fields, validated by
//!   [`LookupConfigBuilder::build`].
//! * [`LookupConfig::from_toml_str`] – deserialize a TOML document. Missing keys take
//!   their default value, unknown keys are rejected.
//!
//! ```toml
//! archive_url = "https://exoplanetarchive.ipac.caltech.edu/TAP/sync"
//! timeout_secs = 20
//! night_level = "astronomical"
//! min_altitude_deg = 25.0
//! ```
//!
//! The altitude and Moon-separation thresholds are not range-checked here:
//! they go through [`VisibilityConstraints::new`] at lookup time, which clamps negative
//! values with an advisory and rejects altitudes of 90° or more.
//!
//! ## See also
//! ------------
//! * [`crate::lookup::TransitLookup`] – Consumes the configuration.
//! * [`crate::search::SearchSettings`] – Search bounds derived from it.
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::constants::{
    Degree, ADVANCE_STEP_HOURS, DEFAULT_MIN_ALTITUDE, DEFAULT_MIN_MOON_SEPARATION,
    DEFAULT_TIMEOUT_SECS, EXOPLANET_ARCHIVE_TAP_URL, PRECHECK_RESOLUTION_MINUTES,
    PRECHECK_YEAR, SEARCH_YEAR_CUTOFF, SESAME_URL,
};
use crate::diagnostics::Diagnostics;
use crate::search::SearchSettings;
use crate::transit_errors::TransitError;
use crate::visibility::{NightLevel, VisibilityConstraints};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LookupConfig {
    /// TAP endpoint of the exoplanet archive.
    pub archive_url: String,
    /// Sesame name resolver endpoint.
    pub resolver_url: String,
    /// Global timeout of each HTTP request, in seconds.
    pub timeout_secs: u64,

    pub night_level: NightLevel,
    pub min_altitude_deg: Degree,
    pub min_moon_separation_deg: Degree,

    pub precheck_year: i32,
    pub advance_step_hours: f64,
    pub year_cutoff: f64,
    /// Sampling step of the pre-check window, in minutes.
    pub resolution_minutes: f64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            archive_url: EXOPLANET_ARCHIVE_TAP_URL.to_string(),
            resolver_url: SESAME_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,

            night_level: NightLevel::Nautical,
            min_altitude_deg: DEFAULT_MIN_ALTITUDE,
            min_moon_separation_deg: DEFAULT_MIN_MOON_SEPARATION,

            precheck_year: PRECHECK_YEAR,
            advance_step_hours: ADVANCE_STEP_HOURS,
            year_cutoff: SEARCH_YEAR_CUTOFF,
            resolution_minutes: PRECHECK_RESOLUTION_MINUTES,
        }
    }
}

impl LookupConfig {
    pub fn builder() -> LookupConfigBuilder {
        LookupConfigBuilder::new()
    }

    /// Parse and validate a TOML document.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::TomlError`] on malformed TOML, wrong value types, unknown keys
    ///   or an unknown night level.
    /// * [`TransitError::InvalidConfig`] if a value is out of range (see
    ///   [`LookupConfigBuilder::build`]).
    pub fn from_toml_str(s: &str) -> Result<Self, TransitError> {
        let config: LookupConfig = toml::from_str(s)?;
        LookupConfigBuilder { config }.build()
    }

    /// Check every field that is not range-checked at lookup time.
    ///
    /// Also run by [`crate::lookup::TransitLookup::new`] and
    /// [`crate::lookup::TransitLookup::with_services`].
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::InvalidConfig`] if an endpoint is not a valid URL, the timeout
    ///   is zero, the advance step or the resolution is not strictly positive, or the
    ///   year cutoff does not lie after the pre-check year.
    pub fn validate(&self) -> Result<(), TransitError> {
        for (name, value) in [
            ("archive_url", &self.archive_url),
            ("resolver_url", &self.resolver_url),
        ] {
            Url::parse(value)
                .map_err(|e| TransitError::InvalidConfig(format!("{name} ({value}): {e}")))?;
        }
        if self.timeout_secs == 0 {
            return Err(TransitError::InvalidConfig("timeout_secs must be >= 1".into()));
        }
        if !gt0(self.resolution_minutes) {
            return Err(TransitError::InvalidConfig("resolution_minutes must be > 0".into()));
        }
        if !(self.year_cutoff.is_finite() && self.year_cutoff > f64::from(self.precheck_year)) {
            return Err(TransitError::InvalidConfig(
                "year_cutoff must be later than precheck_year".into(),
            ));
        }
        self.search_settings().validate()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            precheck_year: self.precheck_year,
            advance_step_hours: self.advance_step_hours,
            year_cutoff: self.year_cutoff,
        }
    }

    /// Validated constraints; clamping advisories go to `diagnostics`.
    pub fn constraints(
        &self,
        diagnostics: &mut Diagnostics,
    ) -> Result<VisibilityConstraints, TransitError> {
        VisibilityConstraints::new(
            self.night_level,
            self.min_altitude_deg,
            self.min_moon_separation_deg,
            diagnostics,
        )
    }
}

#[inline]
fn gt0(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

pub struct LookupConfigBuilder {
    config: LookupConfig,
}

impl Default for LookupConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: LookupConfig::default(),
        }
    }

    // --- Services ---
    pub fn archive_url(mut self, v: impl Into<String>) -> Self {
        self.config.archive_url = v.into();
        self
    }
    pub fn resolver_url(mut self, v: impl Into<String>) -> Self {
        self.config.resolver_url = v.into();
        self
    }
    pub fn timeout_secs(mut self, v: u64) -> Self {
        self.config.timeout_secs = v;
        self
    }

    // --- Constraints ---
    pub fn night_level(mut self, v: NightLevel) -> Self {
        self.config.night_level = v;
        self
    }
    pub fn min_altitude_deg(mut self, v: Degree) -> Self {
        self.config.min_altitude_deg = v;
        self
    }
    pub fn min_moon_separation_deg(mut self, v: Degree) -> Self {
        self.config.min_moon_separation_deg = v;
        self
    }

    // --- Search ---
    pub fn precheck_year(mut self, v: i32) -> Self {
        self.config.precheck_year = v;
        self
    }
    pub fn advance_step_hours(mut self, v: f64) -> Self {
        self.config.advance_step_hours = v;
        self
    }
    pub fn year_cutoff(mut self, v: f64) -> Self {
        self.config.year_cutoff = v;
        self
    }
    pub fn resolution_minutes(mut self, v: f64) -> Self {
        self.config.resolution_minutes = v;
        self
    }

    /// Validate and return the configuration.
    ///
    /// Errors
    /// ----------
    /// * See [`LookupConfig::validate`].
    pub fn build(self) -> Result<LookupConfig, TransitError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
