//! `qsched-qubo`: section selection as a QUBO / Ising problem.
//!
//! Compiles a course list into binary quadratic coefficients whose minimum
//! picks exactly one section per course with no time conflicts, then:
//!
//! - transforms it to an **Ising model** (`x = (1 − z)/2`)
//! - emits a diagonal **cost Hamiltonian** (I / Z / ZZ terms) for QAOA backends
//! - **decodes** sampled bitstrings back to a course → section map, recomputing
//!   every energy from the model rather than trusting the backend
//!
//! # Quick start
//!
//! ```rust
//! use qsched_catalog::{Course, Day, Section};
//! use qsched_qubo::{ExhaustiveSampler, QuboBuilder, QuboDecoder, Sampler};
//!
//! let mon = |id: &str| Section::meeting(id, &[Day::Mon], "09:00", "10:00").unwrap();
//! let courses = vec![
//!     Course::new("A", "Course A").with_section(mon("A1")),
//!     Course::new("B", "Course B")
//!         .with_section(mon("B1"))
//!         .with_section(Section::meeting("B2", &[Day::Tue], "09:00", "10:00").unwrap()),
//! ];
//!
//! let model = QuboBuilder::new(&courses).build().unwrap();
//! let hamiltonian = model.to_ising().to_hamiltonian();
//! let samples = ExhaustiveSampler::new().sample(&hamiltonian).unwrap();
//!
//! let decoded = QuboDecoder::new(&model, &courses)
//!     .decode_best(samples.samples())
//!     .unwrap();
//! assert_eq!(decoded.selection["B"], "B2");
//! assert!(decoded.is_feasible());
//! ```

pub mod builder;
pub mod coeff;
pub mod decode;
pub mod error;
pub mod hamiltonian;
pub mod index;
pub mod ising;
pub mod sampler;

/// Magnitude below which a coefficient is treated as zero when emitting.
pub const EPSILON: f64 = 1e-9;

pub use builder::{QuboBuilder, QuboModel, QuboPenalties, SoftCost};
pub use coeff::{PairKey, PairMap};
pub use decode::{
    BitOrder, DecodedSelection, QuboDecoder, Violation, expectation_from_counts, parse_counts,
    verify_reported,
};
pub use error::{QuboError, QuboResult};
pub use hamiltonian::{CostHamiltonian, CostTerm};
pub use index::{VariableIndex, VariableKey};
pub use ising::{IsingModel, bits_from_spins, spins_from_bits};
pub use sampler::{ExhaustiveSampler, SampleSet, Sampler};
