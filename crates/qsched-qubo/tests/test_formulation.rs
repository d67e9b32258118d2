//! End-to-end tests for the section-selection QUBO.

use approx::assert_abs_diff_eq;
use qsched_catalog::{Course, Day, Section};
use qsched_qubo::{
    BitOrder, ExhaustiveSampler, QuboBuilder, QuboDecoder, QuboError, QuboPenalties, SampleSet,
    Sampler, verify_reported,
};

fn mon_9_10(id: &str) -> Section {
    Section::meeting(id, &[Day::Mon], "09:00", "10:00").unwrap()
}

/// Course A = {A1, A2}, course B = {B1}; all three meet Mon 09:00-10:00.
fn two_course_example() -> Vec<Course> {
    vec![
        Course::new("A", "Course A")
            .with_section(mon_9_10("A1"))
            .with_section(mon_9_10("A2")),
        Course::new("B", "Course B").with_section(mon_9_10("B1")),
    ]
}

fn all_assignments(n: usize) -> impl Iterator<Item = Vec<bool>> {
    (0..(1u32 << n)).map(move |k| (0..n).map(|i| (k >> i) & 1 == 1).collect())
}

// ---------------------------------------------------------------------------
// Two-course decoding scenario
// ---------------------------------------------------------------------------

#[test]
fn two_course_minimum_energy_is_one_conflict_penalty() {
    let courses = two_course_example();
    let model = QuboBuilder::new(&courses).build().unwrap();

    let min = all_assignments(3)
        .map(|bits| model.energy(&bits).unwrap())
        .fold(f64::INFINITY, f64::min);
    assert_abs_diff_eq!(min, 5.0, epsilon = 1e-12);

    // Satisfying both courses costs exactly the unavoidable conflict
    assert_abs_diff_eq!(model.energy(&[true, false, true]).unwrap(), 5.0);
    assert_abs_diff_eq!(model.energy(&[false, true, true]).unwrap(), 5.0);
    // Selecting both A sections is never optimal
    assert!(model.energy(&[true, true, false]).unwrap() > min);
}

#[test]
fn two_course_exhaustive_sampler_agrees() {
    let courses = two_course_example();
    let model = QuboBuilder::new(&courses).build().unwrap();
    let hamiltonian = model.to_ising().to_hamiltonian();

    let set = ExhaustiveSampler::new().sample(&hamiltonian).unwrap();
    let decoded = QuboDecoder::new(&model, &courses)
        .decode_best(set.samples())
        .unwrap();

    assert_abs_diff_eq!(decoded.energy, 5.0, epsilon = 1e-9);
    verify_reported(set.expectation().unwrap(), decoded.energy, 1e-6).unwrap();
    // No selected pair sits in both courses at once
    assert!(!(decoded.bits[0] && decoded.bits[1]));
}

// ---------------------------------------------------------------------------
// Exactly-one enforcement
// ---------------------------------------------------------------------------

#[test]
fn exactly_one_scores_strictly_lowest() {
    for k in 1..=5usize {
        // TBA sections: no conflict terms, only the selection penalty
        let course = (0..k).fold(Course::new("C", "Isolated"), |c, i| {
            c.with_section(Section::unscheduled(format!("C-{i}")))
        });
        let courses = vec![course];
        let penalties = QuboPenalties::default().with_course_penalty(3.0);
        let model = QuboBuilder::new(&courses)
            .with_penalties(penalties)
            .build()
            .unwrap();

        for bits in all_assignments(k) {
            let c = bits.iter().filter(|b| **b).count() as f64;
            let energy = model.energy(&bits).unwrap();
            // E = penalty·(c − 1)²
            assert_abs_diff_eq!(energy, 3.0 * (c - 1.0).powi(2), epsilon = 1e-9);
            if c != 1.0 {
                assert!(energy >= 3.0);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical pairs
// ---------------------------------------------------------------------------

#[test]
fn overlapping_pairs_accumulate_on_one_key() {
    let courses = two_course_example();
    let model = QuboBuilder::new(&courses).build().unwrap();
    let keys: Vec<_> = model.quadratic().iter().map(|(k, _)| k).collect();
    for key in &keys {
        assert!(key.low() < key.high());
    }
    let mut dedup = keys.clone();
    dedup.dedup();
    assert_eq!(dedup.len(), keys.len());
}

// ---------------------------------------------------------------------------
// Counts and backend-reported values
// ---------------------------------------------------------------------------

#[test]
fn counts_feed_the_decoder() {
    let courses = two_course_example();
    let model = QuboBuilder::new(&courses).build().unwrap();
    // Little-endian display: "110" read right to left is A1=0, A2=1, B1=1
    let set = SampleSet::from_counts(
        [("000", 40), ("110", 3), ("101", 7)],
        3,
        BitOrder::QubitZeroLast,
    )
    .unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!(set.shots(), 50);

    let decoded = QuboDecoder::new(&model, &courses)
        .decode_best(set.samples())
        .unwrap();
    assert_eq!(decoded.selection.len(), 2);
    assert_abs_diff_eq!(decoded.energy, 5.0);
}

#[test]
fn drift_between_reported_and_recomputed_is_fatal() {
    let courses = two_course_example();
    let model = QuboBuilder::new(&courses).build().unwrap();
    let recomputed = model.energy(&[true, false, true]).unwrap();
    assert!(matches!(
        verify_reported(recomputed - 1.0, recomputed, 1e-6),
        Err(QuboError::NumericDrift { .. })
    ));
}
