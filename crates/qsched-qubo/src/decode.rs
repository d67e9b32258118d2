//! Turning sampled bitstrings back into section selections.
//!
//! Energies are always recomputed from the model's own coefficient maps; a
//! backend's reported value is only ever compared against that recomputation.

use std::collections::BTreeMap;
use std::fmt;

use qsched_catalog::{Course, Section};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::builder::QuboModel;
use crate::error::{QuboError, QuboResult};
use crate::hamiltonian::CostHamiltonian;

/// Character order of measurement-count keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// The first character is qubit 0.
    #[default]
    QubitZeroFirst,
    /// The last character is qubit 0 (little-endian register display).
    QubitZeroLast,
}

/// Parse one measurement key such as `"0110"`.
pub fn parse_bitstring(key: &str, num_qubits: usize, order: BitOrder) -> QuboResult<Vec<bool>> {
    let mut bits = key
        .chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(QuboError::MalformedInput(format!(
                "bitstring '{key}' contains '{other}'"
            ))),
        })
        .collect::<QuboResult<Vec<bool>>>()?;
    if bits.len() != num_qubits {
        return Err(QuboError::BitstringLength {
            expected: num_qubits,
            got: bits.len(),
        });
    }
    if order == BitOrder::QubitZeroLast {
        bits.reverse();
    }
    Ok(bits)
}

/// Parse a `bitstring -> count` map into `(bits, count)` pairs, keeping input order.
pub fn parse_counts<'a, I>(
    counts: I,
    num_qubits: usize,
    order: BitOrder,
) -> QuboResult<Vec<(Vec<bool>, u64)>>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    counts
        .into_iter()
        .map(|(key, count)| Ok((parse_bitstring(key, num_qubits, order)?, count)))
        .collect()
}

/// Shot-weighted mean energy of measured basis states.
pub fn expectation_from_counts(
    hamiltonian: &CostHamiltonian,
    counts: &[(Vec<bool>, u64)],
) -> QuboResult<f64> {
    let shots: u64 = counts.iter().map(|(_, c)| c).sum();
    if shots == 0 {
        return Err(QuboError::NoSamples);
    }
    let mut total = 0.0;
    for (bits, count) in counts {
        total += hamiltonian.energy_of_bits(bits)? * *count as f64;
    }
    Ok(total / shots as f64)
}

/// Fail with `NumericDrift` if `reported` and `recomputed` differ by more than `tolerance`.
pub fn verify_reported(reported: f64, recomputed: f64, tolerance: f64) -> QuboResult<()> {
    if (reported - recomputed).abs() > tolerance || reported.is_nan() {
        return Err(QuboError::NumericDrift {
            reported,
            recomputed,
            tolerance,
        });
    }
    Ok(())
}

/// A hard constraint broken by a decoded assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A course did not get exactly one section.
    SectionCount {
        /// Course identifier.
        course_id: String,
        /// Number of selected sections.
        selected: usize,
    },
    /// Two selected sections overlap in time.
    Conflict {
        /// First variable name.
        first: String,
        /// Second variable name.
        second: String,
    },
    /// A selected section overlaps a mandatory primary meeting.
    PrimaryConflict {
        /// Variable name.
        variable: String,
        /// Section id of the primary meeting.
        primary: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::SectionCount {
                course_id,
                selected,
            } => write!(f, "course {course_id} has {selected} sections selected"),
            Violation::Conflict { first, second } => write!(f, "{first} overlaps {second}"),
            Violation::PrimaryConflict { variable, primary } => {
                write!(f, "{variable} overlaps primary meeting {primary}")
            }
        }
    }
}

/// The winning assignment and what it means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedSelection {
    /// Winning bit assignment.
    pub bits: Vec<bool>,
    /// Recomputed QUBO energy.
    pub energy: f64,
    /// Course id to selected section id.
    pub selection: BTreeMap<String, String>,
    /// Broken hard constraints, empty for a feasible selection.
    pub violations: Vec<Violation>,
}

impl DecodedSelection {
    /// True if no hard constraint is broken.
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Decodes assignments against a model and the courses it was built from.
#[derive(Debug, Clone, Copy)]
pub struct QuboDecoder<'a> {
    model: &'a QuboModel,
    courses: &'a [Course],
}

impl<'a> QuboDecoder<'a> {
    /// Create a decoder. `courses` must be the list the model was built from.
    pub fn new(model: &'a QuboModel, courses: &'a [Course]) -> Self {
        Self { model, courses }
    }

    /// Lowest-energy sample; ties go to the first one seen.
    ///
    /// Each distinct pattern is evaluated once.
    pub fn best(&self, samples: &[Vec<bool>]) -> QuboResult<(Vec<bool>, f64)> {
        let mut cache: FxHashMap<&[bool], f64> = FxHashMap::default();
        let mut best: Option<(&[bool], f64)> = None;
        for sample in samples {
            let energy = match cache.get(sample.as_slice()) {
                Some(&e) => e,
                None => {
                    let e = self.model.energy(sample)?;
                    cache.insert(sample.as_slice(), e);
                    e
                }
            };
            if best.is_none_or(|(_, b)| energy < b) {
                best = Some((sample.as_slice(), energy));
            }
        }
        debug!(
            samples = samples.len(),
            distinct = cache.len(),
            "evaluated sample energies"
        );
        best.map(|(bits, e)| (bits.to_vec(), e))
            .ok_or(QuboError::NoSamples)
    }

    /// Course id to section id for every set bit. A later index overwrites
    /// an earlier one of the same course.
    pub fn selection(&self, bits: &[bool]) -> QuboResult<BTreeMap<String, String>> {
        self.check_len(bits)?;
        Ok(self
            .model
            .index()
            .keys()
            .iter()
            .zip(bits)
            .filter(|(_, b)| **b)
            .map(|(key, _)| (key.course_id.clone(), key.section_id.clone()))
            .collect())
    }

    /// Hard constraints broken by `bits`.
    pub fn violations(&self, bits: &[bool]) -> QuboResult<Vec<Violation>> {
        self.check_len(bits)?;
        let index = self.model.index();
        let mut violations = Vec::new();

        for (course_pos, group) in index.course_groups().iter().enumerate() {
            if group.is_empty() {
                continue;
            }
            let selected = bits[group.clone()].iter().filter(|b| **b).count();
            if selected != 1 {
                violations.push(Violation::SectionCount {
                    course_id: self.courses[course_pos].id.clone(),
                    selected,
                });
            }
        }

        let chosen: Vec<(usize, &Section)> = bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .filter_map(|(v, _)| index.section(v, self.courses).map(|s| (v, s)))
            .collect();
        for (pos, (a, sa)) in chosen.iter().enumerate() {
            for (b, sb) in &chosen[pos + 1..] {
                if sa.overlaps(sb) {
                    violations.push(Violation::Conflict {
                        first: index.names()[*a].clone(),
                        second: index.names()[*b].clone(),
                    });
                }
            }
        }

        if self.model.includes_primary_meetings() {
            for (v, section) in &chosen {
                for primary in self.courses.iter().filter_map(|c| c.primary.as_ref()) {
                    if section.overlaps(primary) {
                        violations.push(Violation::PrimaryConflict {
                            variable: index.names()[*v].clone(),
                            primary: primary.section_id.clone(),
                        });
                    }
                }
            }
        }

        Ok(violations)
    }

    /// Decode one assignment.
    pub fn decode(&self, bits: &[bool]) -> QuboResult<DecodedSelection> {
        let energy = self.model.energy(bits)?;
        let violations = self.violations(bits)?;
        if !violations.is_empty() {
            warn!(count = violations.len(), energy, "decoded assignment is infeasible");
        }
        Ok(DecodedSelection {
            bits: bits.to_vec(),
            energy,
            selection: self.selection(bits)?,
            violations,
        })
    }

    /// Pick the best sample and decode it.
    pub fn decode_best(&self, samples: &[Vec<bool>]) -> QuboResult<DecodedSelection> {
        let (bits, _) = self.best(samples)?;
        self.decode(&bits)
    }

    fn check_len(&self, bits: &[bool]) -> QuboResult<()> {
        if bits.len() != self.model.num_variables() {
            return Err(QuboError::BitstringLength {
                expected: self.model.num_variables(),
                got: bits.len(),
            });
        }
        Ok(())
    }
}
