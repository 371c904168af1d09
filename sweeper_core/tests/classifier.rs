use rstest::rstest;
use sweeper_core::{
    MatchPolicy, Sample, SampleClassifier, SubstanceProfile, SubstanceTable, Unit, classify,
};

#[rstest]
#[case(2.5, Some("copper"))]
#[case(2.0, Some("copper"))] // limit is inclusive
#[case(1.0, None)]
fn copper_against_its_limit(#[case] amount: f32, #[case] expected: Option<&str>) {
    let table = SubstanceTable::builtin();
    let sample = Sample::new([20.0, 17.0, 44.0], amount);
    assert_eq!(classify(&sample, &table).map(|p| p.name.as_str()), expected);
}

#[rstest]
fn unknown_signature_is_never_flagged() {
    let table = SubstanceTable::builtin();
    let sample = Sample::new([1.0, 2.0, 3.0], 1.0e6);
    assert!(classify(&sample, &table).is_none());
}

#[rstest]
fn shared_signature_resolves_by_table_order() {
    let table = SubstanceTable::builtin();
    // fluoride (1.5 mg/L) is registered before mercury (1.0 ug/L)
    let high = Sample::new([19.0, 18.0, 45.0], 2.0);
    assert_eq!(classify(&high, &table).map(|p| p.name.as_str()), Some("fluoride"));

    // Below fluoride's limit but at mercury's: mercury is next in order
    let low = Sample::new([19.0, 18.0, 45.0], 1.2);
    assert_eq!(classify(&low, &table).map(|p| p.name.as_str()), Some("mercury"));
}

#[rstest]
fn empty_table_matches_nothing() {
    let table = SubstanceTable::new(Vec::new()).unwrap();
    assert!(table.is_empty());
    let sample = Sample::new([20.0, 17.0, 44.0], 100.0);
    assert!(classify(&sample, &table).is_none());
}

#[rstest]
fn zero_limit_flags_any_trace() {
    let table = SubstanceTable::new(vec![SubstanceProfile::new(
        "zero",
        [1.0, 1.0, 1.0],
        0.0,
        Unit::MicrogramsPerLitre,
    )])
    .unwrap();
    assert!(classify(&Sample::new([1.0, 1.0, 1.0], 0.0), &table).is_some());
}

#[rstest]
fn exact_policy_misses_noisy_reading() {
    let table = SubstanceTable::builtin();
    let noisy = Sample::new([20.2, 16.9, 44.1], 3.0);
    assert!(SampleClassifier::new(MatchPolicy::Exact)
        .classify(&noisy, &table)
        .is_none());
}

#[rstest]
fn nearest_policy_picks_closest_within_radius() {
    let table = SubstanceTable::builtin();
    let c = SampleClassifier::new(MatchPolicy::Nearest { max_distance: 0.5 });

    let noisy = Sample::new([20.2, 16.9, 44.1], 3.0);
    assert_eq!(c.classify(&noisy, &table).map(|p| p.name.as_str()), Some("copper"));

    let far = Sample::new([30.0, 30.0, 30.0], 3.0);
    assert!(c.classify(&far, &table).is_none());
}

#[rstest]
#[case(12.0, Some("copper"))]
// under copper (2 mg/L) and lead (10 ug/L), over nitrite (0.5 mg/L)
#[case(1.0, Some("nitrite"))]
#[case(0.1, None)]
fn nearest_policy_falls_through_candidates_under_limit(
    #[case] amount: f32,
    #[case] expected: Option<&str>,
) {
    let table = SubstanceTable::builtin();
    let c = SampleClassifier::new(MatchPolicy::Nearest { max_distance: 1.5 });
    let s = Sample::new([20.0, 17.0, 44.0], amount);
    assert_eq!(c.classify(&s, &table).map(|p| p.name.as_str()), expected);
}
