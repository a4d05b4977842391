mod common;

use approx::assert_relative_eq;
use common::ScriptedEvaluator;
use exotransit::config::LookupConfig;
use exotransit::diagnostics::Diagnostics;
use exotransit::ephemeris::{Ephemeris, TransitTime};
use exotransit::search::{
    CancellationToken, SearchOutcome, SearchSettings, TransitVisibilitySearch,
};
use exotransit::sky_model::SkyModelEvaluator;
use exotransit::transit_errors::TransitError;
use exotransit::visibility::{NightLevel, ObserverLocation, SkyCoord, VisibilityConstraints};

struct Fixture {
    target: SkyCoord,
    site: ObserverLocation,
    constraints: VisibilityConstraints,
}

fn fixture() -> Fixture {
    let mut diagnostics = Diagnostics::new();
    Fixture {
        target: SkyCoord::new(217.3266, -3.4445).unwrap(),
        site: ObserverLocation::from_geodetic(-17.8792, 28.7606, 2396.0).unwrap(),
        constraints: VisibilityConstraints::new(
            NightLevel::Nautical,
            15.0,
            30.0,
            &mut diagnostics,
        )
        .unwrap(),
    }
}

#[test]
fn test_failed_precheck_skips_transit_checks() {
    let f = fixture();
    let evaluator = ScriptedEvaluator::never_visible();
    let ephem = Ephemeris::new(4.0552941, 2455342.9688).unwrap();

    let outcome = TransitVisibilitySearch::new(&evaluator, &f.target, &f.site, &f.constraints)
        .run(&ephem, TransitTime::from_bjd_tdb(2460000.1))
        .unwrap();

    assert_eq!(outcome, SearchOutcome::NeverVisible);
    assert_eq!(evaluator.range_calls.get(), 1);
    assert_eq!(evaluator.instant_calls.get(), 0);
}

#[test]
fn test_always_visible_stops_at_first_candidate() {
    let f = fixture();
    let evaluator = ScriptedEvaluator::always_visible();
    let ephem = Ephemeris::new(4.0552941, 2455342.9688).unwrap();
    let first = TransitTime::from_bjd_tdb(2455342.9688 + 1000.0 * 4.0552941);

    let outcome = TransitVisibilitySearch::new(&evaluator, &f.target, &f.site, &f.constraints)
        .run(&ephem, first)
        .unwrap();

    assert_eq!(outcome, SearchOutcome::Visible(first));
    assert_eq!(evaluator.instant_calls.get(), 1);
}

#[test]
fn test_advances_by_whole_periods() {
    let f = fixture();
    let ephem = Ephemeris::new(3.5, 2459000.0).unwrap();
    let from = TransitTime::from_bjd_tdb(2459030.0).epoch();
    let evaluator = ScriptedEvaluator::visible_from(Some(from));

    let outcome = TransitVisibilitySearch::new(&evaluator, &f.target, &f.site, &f.constraints)
        .run(&ephem, TransitTime::from_bjd_tdb(2459010.5))
        .unwrap();

    match outcome {
        SearchOutcome::Visible(t) => {
            assert_relative_eq!(t.bjd_tdb(), 2459031.5, epsilon = 1e-6);
        }
        other => panic!("expected a visible transit, got {other:?}"),
    }
    // 2459010.5, 14.0, 17.5, 21.0, 24.5, 28.0, 31.5
    assert_eq!(evaluator.instant_calls.get(), 7);
}

#[test]
fn test_search_exhausted() {
    let f = fixture();
    let evaluator = ScriptedEvaluator::visible_from(None);
    let ephem = Ephemeris::new(365.25, 2459000.0).unwrap();
    let settings = SearchSettings {
        year_cutoff: 2100.0,
        ..SearchSettings::default()
    };

    let res = TransitVisibilitySearch::new(&evaluator, &f.target, &f.site, &f.constraints)
        .settings(settings)
        .run(&ephem, TransitTime::from_bjd_tdb(2459365.25));

    assert_eq!(res, Err(TransitError::VisibilitySearchExhausted(2100.0)));
    // About one candidate per year from 2021 to 2100.
    assert!((75..=85).contains(&evaluator.instant_calls.get()));
}

#[test]
fn test_backward_step_from_config_is_rejected() {
    let f = fixture();
    let evaluator = ScriptedEvaluator::visible_from(None);
    let ephem = Ephemeris::new(3.5, 2459000.0).unwrap();
    let config = LookupConfig {
        advance_step_hours: -1.0,
        ..LookupConfig::default()
    };
    assert!(matches!(config.validate(), Err(TransitError::InvalidConfig(_))));

    let res = TransitVisibilitySearch::new(&evaluator, &f.target, &f.site, &f.constraints)
        .settings(config.search_settings())
        .run(&ephem, TransitTime::from_bjd_tdb(2459010.5));

    assert!(matches!(res, Err(TransitError::InvalidConfig(_))));
    assert_eq!(evaluator.range_calls.get(), 0);
    assert_eq!(evaluator.instant_calls.get(), 0);
}

#[test]
fn test_cancellation() {
    let f = fixture();
    let evaluator = ScriptedEvaluator::visible_from(None);
    let ephem = Ephemeris::new(0.5, 2459000.0).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let res = TransitVisibilitySearch::new(&evaluator, &f.target, &f.site, &f.constraints)
        .cancellation(Some(&token))
        .run(&ephem, TransitTime::from_bjd_tdb(2459000.5));

    assert_eq!(res, Err(TransitError::SearchCancelled));
}

#[test]
fn test_sky_model_finds_a_night_transit() {
    let f = fixture();
    let evaluator = SkyModelEvaluator::default();
    // WASP-39 b
    let ephem = Ephemeris::new(4.0552941, 2455342.9688).unwrap();
    let first = ephem
        .next_transit_after_epoch(TransitTime::from_bjd_tdb(2460000.0).epoch())
        .unwrap();

    let outcome = TransitVisibilitySearch::new(&evaluator, &f.target, &f.site, &f.constraints)
        .run(&ephem, first)
        .unwrap();

    match outcome {
        SearchOutcome::Visible(t) => {
            assert!(t >= first);
            let cycles = (t.bjd_tdb() - 2455342.9688) / 4.0552941;
            assert_relative_eq!(cycles, cycles.round(), epsilon = 1e-6);
        }
        other => panic!("expected a visible transit, got {other:?}"),
    }
}
