use libapollo_rust::revision::{
    band_index, classify, fold, percentage, Detection, FOLD_MIDPOINT, REVISION_THRESHOLDS,
};
use libapollo_rust::{RevisionCode, ADC_MAX_READING};
use proptest::prelude::*;

/// Largest reading whose percentage does not fold.
fn last_unfolded_reading() -> u16 {
    (0..=ADC_MAX_READING)
        .rev()
        .find(|&r| percentage(r) <= FOLD_MIDPOINT)
        .unwrap()
}

#[test]
fn unfolded_domain_ends_at_2109() {
    assert_eq!(last_unfolded_reading(), 2109);
}

#[test]
fn every_reading_lands_in_a_band() {
    for reading in 0..=ADC_MAX_READING {
        let d = Detection::from_reading(reading);
        assert!(d.percentage <= 100);
        assert!(d.folded <= FOLD_MIDPOINT);
        assert!(band_index(d.folded).is_some(), "reading {}", reading);
    }
}

#[test]
fn production_flag_matches_unfolded_percentage() {
    for reading in 0..=ADC_MAX_READING {
        let d = Detection::from_reading(reading);
        assert_eq!(d.production, d.percentage > 51);
    }
}

#[test]
fn every_real_revision_is_reachable_both_ways() {
    for &(rev, _) in REVISION_THRESHOLDS.iter().filter(|e| e.0.is_known()) {
        let prototype = (0..=ADC_MAX_READING)
            .map(Detection::from_reading)
            .any(|d| d.revision == rev && !d.production);
        assert!(prototype, "{} has no prototype reading", rev);
    }
    let production_1_1 = (0..=ADC_MAX_READING)
        .map(Detection::from_reading)
        .any(|d| d.revision == RevisionCode::Rev1_1 && d.production);
    assert!(production_1_1);
}

proptest! {
    #[test]
    fn band_rank_never_decreases(a in 0u16..=2109, b in 0u16..=2109) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = band_index(percentage(lo)).unwrap();
        let hi = band_index(percentage(hi)).unwrap();
        prop_assert!(lo <= hi);
    }

    #[test]
    fn detection_is_deterministic(reading in 0u16..=ADC_MAX_READING) {
        prop_assert_eq!(Detection::from_reading(reading), Detection::from_reading(reading));
    }

    #[test]
    fn fold_mirrors_around_midpoint(pct in 52u8..=100) {
        let (folded, production) = fold(pct);
        prop_assert!(production);
        prop_assert_eq!(folded, 100 - pct);
        prop_assert!(folded < FOLD_MIDPOINT);
        prop_assert_eq!(classify(folded), REVISION_THRESHOLDS[band_index(folded).unwrap()].0);
    }
}
