//! # Visible transit search
//!
//! Starting from the next predicted transit, [`TransitVisibilitySearch`] looks for the
//! first transit that a given observer can actually see.
//!
//! ```text
//!            pre-check (one calendar year)
//!                 │ never observable ─────────────► NeverVisible
//!                 ▼
//!   ┌──────────► Checking ── observable ──────────► Visible(candidate)
//!   │             │ not observable
//!   │             ▼
//!   └────────── Advancing: candidate = next transit after (candidate + step)
//!                 │ Besselian year > cutoff ──────► Err(VisibilitySearchExhausted)
//!                 │ token cancelled ──────────────► Err(SearchCancelled)
//! ```
//!
//! The pre-check keeps targets that are never observable from the site (e.g. a
//! circumpolar southern star seen from the north) from walking transits for thousands
//! of years.
//!
//! ## See also
//! ------------
//! * [`crate::visibility::VisibilityEvaluator`] – Answers the individual checks.
//! * [`crate::ephemeris::Ephemeris::next_transit_after_epoch`] – Propagation between checks.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hifitime::Unit;

use crate::constants::{ADVANCE_STEP_HOURS, PRECHECK_YEAR, SEARCH_YEAR_CUTOFF};
use crate::ephemeris::{Ephemeris, TransitTime};
use crate::time::{besselian_year, calendar_year_bounds};
use crate::transit_errors::TransitError;
use crate::visibility::{ObserverLocation, SkyCoord, VisibilityConstraints, VisibilityEvaluator};

/// Shared flag used to stop a running search from another thread.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Bounds of the search loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    /// Calendar year used for the one-year observability pre-check.
    pub precheck_year: i32,
    /// Offset added to a rejected candidate before propagating again.
    pub advance_step_hours: f64,
    /// Besselian year after which the search gives up.
    pub year_cutoff: f64,
}

impl SearchSettings {
    /// Errors
    /// ----------
    /// * [`TransitError::InvalidConfig`] if the advance step is not strictly positive
    ///   or the year cutoff is not finite. A step of zero or less never moves the
    ///   candidate past the one just rejected.
    pub fn validate(&self) -> Result<(), TransitError> {
        if !(self.advance_step_hours.is_finite() && self.advance_step_hours > 0.0) {
            return Err(TransitError::InvalidConfig(format!(
                "advance_step_hours must be > 0, got {}",
                self.advance_step_hours
            )));
        }
        if !self.year_cutoff.is_finite() {
            return Err(TransitError::InvalidConfig("year_cutoff must be finite".into()));
        }
        Ok(())
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            precheck_year: PRECHECK_YEAR,
            advance_step_hours: ADVANCE_STEP_HOURS,
            year_cutoff: SEARCH_YEAR_CUTOFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchOutcome {
    /// First transit satisfying every constraint.
    Visible(TransitTime),
    /// The target is not observable at any time of the pre-check year.
    NeverVisible,
}

/// State of the search loop, reported in the debug log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Checking,
    Visible,
    Advancing,
    NeverVisible,
    Aborted,
}

pub struct TransitVisibilitySearch<'a> {
    evaluator: &'a dyn VisibilityEvaluator,
    target: &'a SkyCoord,
    location: &'a ObserverLocation,
    constraints: &'a VisibilityConstraints,
    settings: SearchSettings,
    cancellation: Option<&'a CancellationToken>,
}

impl<'a> TransitVisibilitySearch<'a> {
    pub fn new(
        evaluator: &'a dyn VisibilityEvaluator,
        target: &'a SkyCoord,
        location: &'a ObserverLocation,
        constraints: &'a VisibilityConstraints,
    ) -> Self {
        TransitVisibilitySearch {
            evaluator,
            target,
            location,
            constraints,
            settings: SearchSettings::default(),
            cancellation: None,
        }
    }

    pub fn settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn cancellation(mut self, token: Option<&'a CancellationToken>) -> Self {
        self.cancellation = token;
        self
    }

    /// Run the search from `first_candidate`, the next predicted transit.
    ///
    /// Arguments
    /// -----------------
    /// * `ephemeris`: complete ephemeris used to propagate past rejected candidates.
    /// * `first_candidate`: the first transit to check.
    ///
    /// Return
    /// ----------
    /// * [`SearchOutcome::Visible`] with the first observable transit, or
    ///   [`SearchOutcome::NeverVisible`] when the pre-check fails. In the latter case
    ///   no per-transit evaluation is performed.
    ///
    /// Errors
    /// ----------
    /// * [`TransitError::InvalidConfig`] if the settings are invalid, before any
    ///   evaluation (see [`SearchSettings::validate`]).
    /// * [`TransitError::VisibilitySearchExhausted`] once candidates pass the year cutoff.
    /// * [`TransitError::SearchCancelled`] if the cancellation token fires.
    /// * Any error reported by the evaluator or by propagation.
    pub fn run(
        &self,
        ephemeris: &Ephemeris,
        first_candidate: TransitTime,
    ) -> Result<SearchOutcome, TransitError> {
        self.settings.validate()?;

        let (start, end) = calendar_year_bounds(self.settings.precheck_year);
        if !self.evaluator.is_ever_observable(
            self.target,
            self.location,
            start,
            end,
            self.constraints,
        )? {
            log::debug!(
                "{:?}: not observable during {}",
                SearchState::NeverVisible,
                self.settings.precheck_year
            );
            return Ok(SearchOutcome::NeverVisible);
        }

        let step = Unit::Hour * self.settings.advance_step_hours;
        let mut candidate = first_candidate;
        let mut checked = 0_u64;

        loop {
            if self.cancellation.is_some_and(CancellationToken::is_cancelled) {
                log::debug!("{:?}: cancelled after {checked} checks", SearchState::Aborted);
                return Err(TransitError::SearchCancelled);
            }
            if besselian_year(&candidate.epoch()) > self.settings.year_cutoff {
                log::debug!("{:?}: passed the year cutoff", SearchState::Aborted);
                return Err(TransitError::VisibilitySearchExhausted(
                    self.settings.year_cutoff,
                ));
            }

            log::debug!("{:?}: {candidate}", SearchState::Checking);
            checked += 1;
            if self.evaluator.is_observable_at(
                self.target,
                self.location,
                candidate.epoch(),
                self.constraints,
            )? {
                log::debug!("{:?} after {checked} checks", SearchState::Visible);
                return Ok(SearchOutcome::Visible(candidate));
            }

            log::debug!("{:?}", SearchState::Advancing);
            candidate = ephemeris.next_transit_after_epoch(candidate.epoch() + step)?;
        }
    }
}
