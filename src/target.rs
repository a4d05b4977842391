//! # Transit targets
//!
//! A [`Target`] identifies one planet (host star + planet designator) and accumulates
//! what is learned about it during a lookup: the host-star coordinates, whether the
//! catalog confirms transits, the ephemeris in use and the last computed transit.
//!
//! Every `Target` owns its state; nothing is shared between instances.
use serde::Deserialize;

use crate::constants::{Days, JulianDate};
use crate::diagnostics::Diagnostics;
use crate::ephemeris::{Ephemeris, TransitTime};
use crate::time::TimeInput;
use crate::transit_errors::TransitError;
use crate::visibility::SkyCoord;

/// Optional fields accepted when building a [`Target`].
///
/// Unknown keys are rejected when deserializing, e.g. from TOML:
///
/// ```toml
/// period_days = 4.0552941
/// reference_time = 2455342.9688
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub period_days: Option<Days>,
    pub reference_time: Option<JulianDate>,
}

impl TargetConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, TransitError> {
        Ok(toml::from_str(s)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    host_star_name: String,
    planet_designator: String,
    display_name: String,
    sky_coordinates: Option<SkyCoord>,
    transits: Option<bool>,
    ephemeris: Ephemeris,
    next_transit: Option<TransitTime>,
}

impl Target {
    pub fn new(host_star_name: impl Into<String>, planet_designator: impl Into<String>) -> Self {
        let host_star_name = host_star_name.into();
        let planet_designator = planet_designator.into();
        let display_name = format!("{host_star_name} {planet_designator}");

        Target {
            host_star_name,
            planet_designator,
            display_name,
            sky_coordinates: None,
            transits: None,
            ephemeris: Ephemeris::default(),
            next_transit: None,
        }
    }

    /// Build a target and assign the ephemeris fields present in `config`.
    pub fn with_config(
        host_star_name: impl Into<String>,
        planet_designator: impl Into<String>,
        config: &TargetConfig,
    ) -> Result<Self, TransitError> {
        let mut target = Self::new(host_star_name, planet_designator);
        target.ephemeris = Ephemeris::from_parts(config.period_days, config.reference_time)?;
        Ok(target)
    }

    pub fn host_star_name(&self) -> &str {
        &self.host_star_name
    }

    pub fn planet_designator(&self) -> &str {
        &self.planet_designator
    }

    /// `"<host star> <designator>"`, e.g. `"WASP-39 b"`.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn sky_coordinates(&self) -> Option<&SkyCoord> {
        self.sky_coordinates.as_ref()
    }

    pub fn set_sky_coordinates(&mut self, coords: SkyCoord) {
        self.sky_coordinates = Some(coords);
    }

    pub fn transits(&self) -> Option<bool> {
        self.transits
    }

    pub fn set_transits(&mut self, transits: bool) {
        self.transits = Some(transits);
    }

    pub fn ephemeris(&self) -> &Ephemeris {
        &self.ephemeris
    }

    pub fn set_ephemeris(&mut self, ephemeris: Ephemeris) {
        self.ephemeris = ephemeris;
    }

    pub fn next_transit(&self) -> Option<TransitTime> {
        self.next_transit
    }

    pub(crate) fn set_next_transit(&mut self, transit: TransitTime) {
        self.next_transit = Some(transit);
    }

    pub(crate) fn clear_next_transit(&mut self) {
        self.next_transit = None;
    }

    /// Propagate the ephemeris to the first transit after `t` (now if `None`) and keep it
    /// as the target's next transit.
    pub fn update_next_transit(
        &mut self,
        t: Option<&TimeInput>,
        diagnostics: &mut Diagnostics,
    ) -> Result<TransitTime, TransitError> {
        let transit = self.ephemeris.next_transit_after(t, diagnostics)?;
        self.next_transit = Some(transit);
        Ok(transit)
    }
}

#[cfg(test)]
mod target_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_display_name() {
        let target = Target::new("WASP-39", "b");
        assert_eq!(target.display_name(), "WASP-39 b");
        assert_eq!(target.next_transit(), None);
        assert!(!target.ephemeris().is_complete());
    }

    #[test]
    fn test_targets_do_not_share_state() {
        let mut a = Target::new("A", "b");
        let b = Target::new("B", "c");
        a.set_transits(true);
        a.set_sky_coordinates(SkyCoord::new(1.0, 2.0).unwrap());
        assert_eq!(b.transits(), None);
        assert_eq!(b.sky_coordinates(), None);
    }

    #[test]
    fn test_config_rejects_unknown_keys() {
        let config = TargetConfig::from_toml_str("period_days = 3.5\nreference_time = 2459000.0")
            .unwrap();
        assert_eq!(config.period_days, Some(3.5));

        assert!(matches!(
            TargetConfig::from_toml_str("period_days = 3.5\nP = 3.5"),
            Err(TransitError::TomlError(_))
        ));
    }

    #[test]
    fn test_update_next_transit() {
        let config = TargetConfig {
            period_days: Some(3.5),
            reference_time: Some(2459000.0),
        };
        let mut target = Target::with_config("Star", "b", &config).unwrap();
        let mut diagnostics = Diagnostics::new();
        let transit = target
            .update_next_transit(Some(&TimeInput::JulianDate(2459010.0)), &mut diagnostics)
            .unwrap();
        assert_relative_eq!(transit.bjd_tdb(), 2459010.5, epsilon = 1e-8);
        assert_eq!(target.next_transit(), Some(transit));
    }
}
