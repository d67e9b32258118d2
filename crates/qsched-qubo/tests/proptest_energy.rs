//! Property-based tests for the QUBO -> Ising transform.
//!
//! The spin model must reproduce the QUBO energy of every assignment under
//! `1 -> -1, 0 -> +1`, and coefficient maps never hold both `(a, b)` and `(b, a)`.

use proptest::prelude::*;
use qsched_catalog::{Course, Day, Section};
use qsched_qubo::{PairMap, QuboBuilder, QuboModel, VariableIndex, spins_from_bits};

/// An index of `n` variables backed by TBA sections of one course.
fn index_of_size(n: usize) -> VariableIndex {
    let course = (0..n).fold(Course::new("P", "Property"), |c, i| {
        c.with_section(Section::unscheduled(format!("P-{i}")))
    });
    VariableIndex::from_courses(&[course]).expect("unique names")
}

/// A random QUBO with 1-8 variables and coefficients in [-10, 10].
fn arb_qubo() -> impl Strategy<Value = (QuboModel, Vec<bool>)> {
    (1_usize..=8).prop_flat_map(|n| {
        (
            prop::collection::vec(-10.0_f64..10.0, n),
            prop::collection::vec((0..n, 0..n, -10.0_f64..10.0), 0..=20),
            -10.0_f64..10.0,
            prop::collection::vec(any::<bool>(), n),
        )
            .prop_map(move |(linear, pairs, offset, bits)| {
                let mut quadratic = PairMap::new();
                for (a, b, q) in pairs {
                    // Diagonal draws are simply skipped
                    quadratic.add(a, b, q);
                }
                let model =
                    QuboModel::from_coefficients(index_of_size(n), linear, quadratic, offset)
                        .expect("consistent sizes");
                (model, bits)
            })
    })
}

/// A random timed section on Mon/Tue between 08:00 and 12:00.
fn arb_section() -> impl Strategy<Value = Section> {
    (any::<bool>(), 0_u16..4, 1_u16..=3, any::<bool>()).prop_map(|(tue, start, len, tba)| {
        if tba {
            return Section::unscheduled("S");
        }
        let day = if tue { Day::Tue } else { Day::Mon };
        let begin = format!("{:02}:00", 8 + start);
        let end = format!("{:02}:00", 8 + start + len);
        Section::meeting("S", &[day], &begin, &end).expect("valid window")
    })
}

/// Up to four courses with one to three sections each.
fn arb_courses() -> impl Strategy<Value = Vec<Course>> {
    prop::collection::vec(prop::collection::vec(arb_section(), 1..=3), 1..=4).prop_map(|groups| {
        groups
            .into_iter()
            .enumerate()
            .map(|(c, sections)| {
                sections
                    .into_iter()
                    .fold(Course::new(format!("C{c}"), "Random"), |course, s| {
                        course.with_section(s)
                    })
            })
            .collect()
    })
}

proptest! {
    /// `QUBO_energy(x) == Ising_energy(spin(x))` within 1e-6.
    #[test]
    fn test_ising_energy_matches_qubo((model, bits) in arb_qubo()) {
        let ising = model.to_ising();
        let e_qubo = model.energy(&bits).expect("length matches");
        let e_ising = ising.energy(&spins_from_bits(&bits)).expect("length matches");
        prop_assert!((e_qubo - e_ising).abs() < 1e-6,
            "QUBO {} vs Ising {}", e_qubo, e_ising);
    }

    /// The emitted Hamiltonian agrees with the QUBO despite pruning.
    #[test]
    fn test_hamiltonian_energy_matches_qubo((model, bits) in arb_qubo()) {
        let hamiltonian = model.to_ising().to_hamiltonian();
        let e_qubo = model.energy(&bits).expect("length matches");
        let e_h = hamiltonian.energy_of_bits(&bits).expect("length matches");
        prop_assert!((e_qubo - e_h).abs() < 1e-6);
    }

    /// Built models keep every pair key strictly ordered and unique.
    #[test]
    fn test_built_model_pairs_are_canonical(courses in arb_courses()) {
        let model = QuboBuilder::new(&courses).build().expect("valid courses");
        let ising = model.to_ising();
        for map in [model.quadratic(), ising.couplings()] {
            let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
            for window in keys.windows(2) {
                prop_assert!(window[0] < window[1]);
            }
            for key in &keys {
                prop_assert!(key.low() < key.high());
            }
        }
    }

    /// Energy equivalence also holds on models built from random catalogs.
    #[test]
    fn test_built_model_energy_equivalence(courses in arb_courses(), seed in any::<u64>()) {
        let model = QuboBuilder::new(&courses).build().expect("valid courses");
        let n = model.num_variables();
        let bits: Vec<bool> = (0..n).map(|i| (seed >> (i % 64)) & 1 == 1).collect();
        let e_qubo = model.energy(&bits).expect("length matches");
        let e_ising = model.to_ising().energy(&spins_from_bits(&bits)).expect("length matches");
        prop_assert!((e_qubo - e_ising).abs() < 1e-6);
    }
}
