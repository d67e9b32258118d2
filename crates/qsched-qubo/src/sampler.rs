//! Sampler backends.
//!
//! A sampler takes the cost Hamiltonian and returns bit assignments. Quantum
//! backends (QAOA on a simulator or device) live outside this crate and
//! implement [`Sampler`]; [`ExhaustiveSampler`] is the exact reference.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::decode::{BitOrder, parse_counts};
use crate::error::{QuboError, QuboResult};
use crate::hamiltonian::CostHamiltonian;

/// Bit assignments returned by a sampler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    samples: Vec<Vec<bool>>,
    shots: u64,
    expectation: Option<f64>,
}

impl SampleSet {
    /// Wrap raw samples.
    pub fn new(samples: Vec<Vec<bool>>) -> Self {
        Self {
            shots: samples.len() as u64,
            samples,
            expectation: None,
        }
    }

    /// Collect the distinct patterns of a `bitstring -> count` map in input
    /// order. Zero-count entries are skipped.
    pub fn from_counts<'a, I>(counts: I, num_qubits: usize, order: BitOrder) -> QuboResult<Self>
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let mut seen = FxHashSet::default();
        let mut samples = Vec::new();
        let mut shots = 0;
        for (bits, count) in parse_counts(counts, num_qubits, order)? {
            if count == 0 {
                continue;
            }
            shots += count;
            if seen.insert(bits.clone()) {
                samples.push(bits);
            }
        }
        Ok(Self {
            samples,
            shots,
            expectation: None,
        })
    }

    /// Attach the expectation value the backend reported.
    #[must_use]
    pub fn with_expectation(mut self, value: f64) -> Self {
        self.expectation = Some(value);
        self
    }

    /// Samples in the order returned.
    pub fn samples(&self) -> &[Vec<bool>] {
        &self.samples
    }

    /// Backend-reported expectation value, if any.
    pub fn expectation(&self) -> Option<f64> {
        self.expectation
    }

    /// Total shots behind the samples.
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the set holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A backend that draws assignments for a cost Hamiltonian.
///
/// Calls are blocking. Failures are returned as [`QuboError::Backend`] and
/// are not retried here.
pub trait Sampler {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Draw samples.
    fn sample(&self, hamiltonian: &CostHamiltonian) -> QuboResult<SampleSet>;
}

/// Enumerates every assignment and returns all ground states.
#[derive(Debug, Clone, Copy)]
pub struct ExhaustiveSampler {
    max_variables: usize,
    tolerance: f64,
}

impl Default for ExhaustiveSampler {
    fn default() -> Self {
        Self {
            max_variables: Self::MAX_VARIABLES,
            tolerance: 1e-9,
        }
    }
}

impl ExhaustiveSampler {
    /// Largest register the sampler will enumerate.
    pub const MAX_VARIABLES: usize = 24;

    /// Create a sampler with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower the enumeration limit (capped at [`Self::MAX_VARIABLES`]).
    #[must_use]
    pub fn with_max_variables(mut self, max: usize) -> Self {
        self.max_variables = max.min(Self::MAX_VARIABLES);
        self
    }
}

impl Sampler for ExhaustiveSampler {
    fn name(&self) -> &str {
        "exhaustive"
    }

    /// Ground states come back in ascending order of the integer whose bit
    /// `i` is qubit `i`. The expectation is the ground energy.
    fn sample(&self, hamiltonian: &CostHamiltonian) -> QuboResult<SampleSet> {
        let n = hamiltonian.num_qubits();
        if n > self.max_variables {
            return Err(QuboError::TooManyVariables {
                n,
                max: self.max_variables,
            });
        }

        let mut best = f64::INFINITY;
        let mut ground: Vec<Vec<bool>> = Vec::new();
        for k in 0..(1u64 << n) {
            let bits: Vec<bool> = (0..n).map(|i| (k >> i) & 1 == 1).collect();
            let energy = hamiltonian.energy_of_bits(&bits)?;
            if energy < best - self.tolerance {
                best = energy;
                ground.clear();
                ground.push(bits);
            } else if (energy - best).abs() <= self.tolerance {
                ground.push(bits);
            }
        }
        debug!(
            qubits = n,
            ground_states = ground.len(),
            energy = best,
            "exhaustive enumeration finished"
        );
        Ok(SampleSet::new(ground).with_expectation(best))
    }
}
