use approx::assert_relative_eq;
use exotransit::diagnostics::{Advisory, Diagnostics};
use exotransit::ephemeris::Ephemeris;
use exotransit::time::{jd_tdb_to_epoch, TimeInput};
use exotransit::transit_errors::TransitError;
use hifitime::Unit;
use proptest::prelude::*;

// Tolerance on day differences, well above the nanosecond resolution of hifitime durations.
const DAY_TOL: f64 = 1e-8;

#[test]
fn test_scenario_a() {
    let ephem = Ephemeris::new(3.5, 2459000.0).unwrap();
    let mut diagnostics = Diagnostics::new();
    let next = ephem
        .next_transit_after(Some(&TimeInput::JulianDate(2459010.0)), &mut diagnostics)
        .unwrap();
    assert_relative_eq!(next.bjd_tdb(), 2459010.5, epsilon = 1e-8);
}

#[test]
fn test_incomplete_ephemeris() {
    let ephem = Ephemeris::from_parts(Some(3.5), None).unwrap();
    let mut diagnostics = Diagnostics::new();
    assert_eq!(
        ephem.next_transit_after(Some(&TimeInput::JulianDate(2459010.0)), &mut diagnostics),
        Err(TransitError::IncompleteEphemeris)
    );
}

#[test]
fn test_unparsable_time_uses_now() {
    let ephem = Ephemeris::new(3.5, 2459000.0).unwrap();
    let mut diagnostics = Diagnostics::new();
    let before = hifitime::Epoch::now().unwrap();
    let next = ephem
        .next_transit_after(Some(&TimeInput::from("next tuesday")), &mut diagnostics)
        .unwrap();

    assert!(next.epoch() > before);
    assert!((next.epoch() - before).to_unit(Unit::Day) <= 3.5 + DAY_TOL);
    assert_eq!(
        diagnostics.advisories(),
        &[Advisory::UnparsableReferenceTime {
            input: "next tuesday".into()
        }]
    );
}

#[test]
fn test_calendar_text_reference() {
    let ephem = Ephemeris::new(1.0, 2459000.0).unwrap();
    let mut diagnostics = Diagnostics::new();
    let next = ephem
        .next_transit_after(
            Some(&TimeInput::from("2023-06-01T00:00:00 UTC")),
            &mut diagnostics,
        )
        .unwrap();
    // 2023-06-01T00:00 UTC is JD 2460096.5; transits fall on integer JDs.
    assert_relative_eq!(next.bjd_tdb(), 2460097.0, epsilon = 1e-6);
    assert!(diagnostics.is_empty());
}

proptest! {
    #[test]
    fn prop_next_transit_within_one_period(
        period in 0.2..800.0f64,
        t0 in 2_440_000.0..2_470_000.0f64,
        offset in -50_000.0..50_000.0f64,
    ) {
        let ephem = Ephemeris::new(period, t0).unwrap();
        let t = jd_tdb_to_epoch(t0 + offset);
        let next = ephem.next_transit_after_epoch(t).unwrap();

        let lead = (next.epoch() - t).to_unit(Unit::Day);
        prop_assert!(next.epoch() > t);
        prop_assert!(lead <= period + DAY_TOL, "lead {} > period {}", lead, period);
    }

    #[test]
    fn prop_consecutive_transits_one_period_apart(
        period in 0.2..800.0f64,
        t0 in 2_440_000.0..2_470_000.0f64,
        offset in -50_000.0..50_000.0f64,
    ) {
        let ephem = Ephemeris::new(period, t0).unwrap();
        let first = ephem.next_transit_after_epoch(jd_tdb_to_epoch(t0 + offset)).unwrap();
        let second = ephem.next_transit_after_epoch(first.epoch()).unwrap();

        let gap = (second.epoch() - first.epoch()).to_unit(Unit::Day);
        prop_assert!((gap - period).abs() < DAY_TOL, "gap {} != period {}", gap, period);
    }
}
