//! # Advisory diagnostics
//!
//! Non-fatal adjustments made while looking up a transit (clamped constraints, a time
//! that could not be parsed, an assumed catalog alias, ...) are recorded as
//! [`Advisory`] values in a [`Diagnostics`] collection. The collection travels with
//! the final [`TransitReport`](crate::lookup::TransitReport) so automated callers can
//! inspect what was adjusted; every advisory is also emitted through `log::warn!`.
use std::fmt;

use crate::constants::Degree;

/// One non-fatal event raised during a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// The reference time could not be understood; the current time was used.
    UnparsableReferenceTime { input: String },
    /// A negative minimum altitude was raised to 0°.
    AltitudeClamped { given: Degree },
    /// A negative minimum Moon separation was raised to 0°.
    MoonSeparationClamped { given: Degree },
    /// The nearest catalog entry does not carry the requested star name.
    AssumedAlias { star_name: String, matched: String },
    /// Period and epoch were supplied together with a catalog source.
    GivenEphemerisOverridesCatalog,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::UnparsableReferenceTime { input } => write!(
                f,
                "Cannot understand {input} as a time. Using the present time instead."
            ),
            Advisory::AltitudeClamped { given } => write!(
                f,
                "Minimum altitude cannot be less than 0 deg (got {given}). Setting to 0 deg."
            ),
            Advisory::MoonSeparationClamped { given } => write!(
                f,
                "Minimum Moon separation cannot be less than 0 deg (got {given}). Setting to 0 deg."
            ),
            Advisory::AssumedAlias { star_name, matched } => write!(
                f,
                "Matched {star_name} on the catalog to {matched}. Assuming alias and proceeding."
            ),
            Advisory::GivenEphemerisOverridesCatalog => {
                write!(f, "Using given ephemeris as opposed to querying the catalog.")
            }
        }
    }
}

/// Ordered collection of the advisories raised by one lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    advisories: Vec<Advisory>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an advisory and log it at warning level.
    pub fn push(&mut self, advisory: Advisory) {
        log::warn!("{advisory}");
        self.advisories.push(advisory);
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    pub fn is_empty(&self) -> bool {
        self.advisories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.advisories.len()
    }

    /// `true` if an advisory matching the predicate was raised.
    pub fn contains(&self, predicate: impl Fn(&Advisory) -> bool) -> bool {
        self.advisories.iter().any(predicate)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Advisory;
    type IntoIter = std::vec::IntoIter<Advisory>;

    fn into_iter(self) -> Self::IntoIter {
        self.advisories.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Advisory;
    type IntoIter = std::slice::Iter<'a, Advisory>;

    fn into_iter(self) -> Self::IntoIter {
        self.advisories.iter()
    }
}
