//! QUBO construction for exactly-one section selection.
//!
//! The energy over binary `x` is
//!
//! ```text
//! E(x) = offset + Σ_v linear[v]·x_v + Σ_{a<b} quad[(a,b)]·x_a·x_b
//! ```
//!
//! Each course contributes `course_penalty·(Σ_{v∈V} x_v − 1)²`. With `x² = x`
//! this expands to `−course_penalty` per variable, `+2·course_penalty` per
//! pair inside the course and `+course_penalty` to the offset. Every pair of
//! overlapping sections anywhere in the problem adds `conflict_penalty`.

use qsched_catalog::{Course, Section};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::coeff::PairMap;
use crate::error::{QuboError, QuboResult};
use crate::index::VariableIndex;
use crate::ising::IsingModel;

/// Hard-constraint weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuboPenalties {
    /// Weight of the exactly-one-section term.
    pub course_penalty: f64,
    /// Weight per overlapping selected pair.
    pub conflict_penalty: f64,
}

impl Default for QuboPenalties {
    fn default() -> Self {
        Self {
            course_penalty: 5.0,
            conflict_penalty: 5.0,
        }
    }
}

impl QuboPenalties {
    /// Set the course penalty.
    #[must_use]
    pub fn with_course_penalty(mut self, value: f64) -> Self {
        self.course_penalty = value;
        self
    }

    /// Set the conflict penalty.
    #[must_use]
    pub fn with_conflict_penalty(mut self, value: f64) -> Self {
        self.conflict_penalty = value;
        self
    }

    /// The smaller of the two penalties.
    pub fn hard_min(&self) -> f64 {
        self.course_penalty.min(self.conflict_penalty)
    }

    fn validate(&self) -> QuboResult<()> {
        for (name, value) in [
            ("course_penalty", self.course_penalty),
            ("conflict_penalty", self.conflict_penalty),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(QuboError::MalformedInput(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Per-section soft preference added to the linear terms.
pub type SoftCost<'a> = Box<dyn Fn(&Course, &Section) -> f64 + 'a>;

/// Builds a [`QuboModel`] from a course list.
pub struct QuboBuilder<'a> {
    courses: &'a [Course],
    penalties: QuboPenalties,
    primary_meetings: bool,
    soft_cost: Option<SoftCost<'a>>,
}

impl<'a> QuboBuilder<'a> {
    /// Start a builder over `courses` with default penalties.
    pub fn new(courses: &'a [Course]) -> Self {
        Self {
            courses,
            penalties: QuboPenalties::default(),
            primary_meetings: false,
            soft_cost: None,
        }
    }

    /// Set the hard-constraint weights.
    #[must_use]
    pub fn with_penalties(mut self, penalties: QuboPenalties) -> Self {
        self.penalties = penalties;
        self
    }

    /// Treat each course's primary meeting as always attended.
    ///
    /// A section overlapping a primary meeting gets `+conflict_penalty` per
    /// overlapped primary on its linear term, and every overlapping pair of
    /// primaries adds `conflict_penalty` to the offset.
    #[must_use]
    pub fn with_primary_meetings(mut self, enabled: bool) -> Self {
        self.primary_meetings = enabled;
        self
    }

    /// Layer a soft linear cost on top of the hard terms.
    #[must_use]
    pub fn with_soft_cost(mut self, cost: impl Fn(&Course, &Section) -> f64 + 'a) -> Self {
        self.soft_cost = Some(Box::new(cost));
        self
    }

    /// Assemble the coefficient maps.
    pub fn build(self) -> QuboResult<QuboModel> {
        self.penalties.validate()?;
        let index = VariableIndex::from_courses(self.courses)?;
        let n = index.len();
        let QuboPenalties {
            course_penalty,
            conflict_penalty,
        } = self.penalties;

        let mut linear = vec![0.0; n];
        let mut quadratic = PairMap::new();
        let mut offset = 0.0;

        // Exactly one section per course
        for group in index.course_groups() {
            if group.is_empty() {
                continue;
            }
            for v in group.clone() {
                linear[v] -= course_penalty;
                for w in (v + 1)..group.end {
                    quadratic.add(v, w, 2.0 * course_penalty);
                }
            }
            offset += course_penalty;
        }

        let sections = resolve_sections(&index, self.courses)?;

        // Pairwise time conflicts across the whole problem
        let constrained: Vec<usize> = (0..n)
            .filter(|&v| !sections[v].is_unconstrained())
            .collect();
        let mut conflicts = 0usize;
        for (pos, &a) in constrained.iter().enumerate() {
            for &b in &constrained[pos + 1..] {
                if sections[a].overlaps(sections[b]) {
                    quadratic.add(a, b, conflict_penalty);
                    conflicts += 1;
                }
            }
        }
        debug!(conflicts, "added pairwise conflict terms");

        if self.primary_meetings {
            let primaries: Vec<&Section> = self
                .courses
                .iter()
                .filter_map(|c| c.primary.as_ref())
                .filter(|p| !p.is_unconstrained())
                .collect();
            for &v in &constrained {
                let hits = primaries.iter().filter(|p| sections[v].overlaps(p)).count();
                linear[v] += conflict_penalty * hits as f64;
            }
            for (pos, a) in primaries.iter().enumerate() {
                for b in &primaries[pos + 1..] {
                    if a.overlaps(b) {
                        offset += conflict_penalty;
                    }
                }
            }
            debug!(primaries = primaries.len(), "applied primary meetings");
        }

        if let Some(cost) = &self.soft_cost {
            let soft: Vec<f64> = index
                .keys()
                .iter()
                .zip(sections.iter().copied())
                .map(|(key, section)| cost(&self.courses[key.course_pos], section))
                .collect();
            let soft_total: f64 = soft.iter().map(|s| s.abs()).sum();
            let hard_min = self.penalties.hard_min();
            if soft_total.is_nan() || soft_total >= hard_min {
                return Err(QuboError::PenaltyDominance {
                    soft_total,
                    hard_min,
                });
            }
            for (l, s) in linear.iter_mut().zip(soft) {
                *l += s;
            }
        }

        info!(
            variables = n,
            pairs = quadratic.len(),
            offset,
            "built QUBO"
        );

        Ok(QuboModel {
            index,
            linear,
            quadratic,
            offset,
            primary_meetings: self.primary_meetings,
        })
    }
}

fn resolve_sections<'c>(
    index: &VariableIndex,
    courses: &'c [Course],
) -> QuboResult<Vec<&'c Section>> {
    (0..index.len())
        .map(|v| {
            index.section(v, courses).ok_or_else(|| {
                QuboError::MalformedInput(format!("variable {v} has no backing section"))
            })
        })
        .collect()
}

/// Linear, quadratic and constant coefficients over the indexed variables.
#[derive(Debug, Clone, PartialEq)]
pub struct QuboModel {
    index: VariableIndex,
    linear: Vec<f64>,
    quadratic: PairMap,
    offset: f64,
    primary_meetings: bool,
}

impl QuboModel {
    /// Assemble a model from raw coefficients.
    pub fn from_coefficients(
        index: VariableIndex,
        linear: Vec<f64>,
        quadratic: PairMap,
        offset: f64,
    ) -> QuboResult<Self> {
        if linear.len() != index.len() {
            return Err(QuboError::MalformedInput(format!(
                "{} linear coefficients for {} variables",
                linear.len(),
                index.len()
            )));
        }
        if let Some((key, _)) = quadratic.iter().find(|(k, _)| k.high() >= index.len()) {
            return Err(QuboError::MalformedInput(format!(
                "pair {key} is out of range for {} variables",
                index.len()
            )));
        }
        Ok(Self {
            index,
            linear,
            quadratic,
            offset,
            primary_meetings: false,
        })
    }

    /// The variable index this model was built over.
    pub fn index(&self) -> &VariableIndex {
        &self.index
    }

    /// Number of binary variables.
    pub fn num_variables(&self) -> usize {
        self.index.len()
    }

    /// Linear coefficients in index order.
    pub fn linear(&self) -> &[f64] {
        &self.linear
    }

    /// Linear coefficient of a named variable.
    pub fn linear_of(&self, name: &str) -> Option<f64> {
        self.index.index_of(name).map(|i| self.linear[i])
    }

    /// Quadratic coefficients.
    pub fn quadratic(&self) -> &PairMap {
        &self.quadratic
    }

    /// Quadratic coefficient between two named variables.
    pub fn quadratic_of(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.quadratic.get(self.index.index_of(a)?, self.index.index_of(b)?))
    }

    /// Constant offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Whether primary meetings were folded into the model.
    pub fn includes_primary_meetings(&self) -> bool {
        self.primary_meetings
    }

    /// Energy of a bit assignment indexed like [`Self::index`].
    pub fn energy(&self, bits: &[bool]) -> QuboResult<f64> {
        if bits.len() != self.num_variables() {
            return Err(QuboError::BitstringLength {
                expected: self.num_variables(),
                got: bits.len(),
            });
        }
        let mut energy = self.offset;
        for (l, &b) in self.linear.iter().zip(bits) {
            if b {
                energy += l;
            }
        }
        for (key, q) in self.quadratic.iter() {
            if bits[key.low()] && bits[key.high()] {
                energy += q;
            }
        }
        Ok(energy)
    }

    /// Upper-triangular sparse form: `(i, i, linear)` and `(i, j, quad)` with
    /// `i < j`, sorted, zero entries omitted.
    pub fn sparse_triples(&self) -> Vec<(usize, usize, f64)> {
        let mut triples: Vec<(usize, usize, f64)> = self
            .linear
            .iter()
            .enumerate()
            .filter(|(_, l)| l.abs() > crate::EPSILON)
            .map(|(i, &l)| (i, i, l))
            .chain(
                self.quadratic
                    .iter()
                    .filter(|(_, q)| q.abs() > crate::EPSILON)
                    .map(|(k, q)| (k.low(), k.high(), q)),
            )
            .collect();
        triples.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        triples
    }

    /// Equivalent spin model under `x = (1 − z) / 2`.
    pub fn to_ising(&self) -> IsingModel {
        IsingModel::from_qubo(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsched_catalog::Day;

    fn mon_9_10(id: &str) -> Section {
        Section::meeting(id, &[Day::Mon], "09:00", "10:00").unwrap()
    }

    fn ab_courses() -> Vec<Course> {
        vec![
            Course::new("A", "Course A")
                .with_section(mon_9_10("A1"))
                .with_section(mon_9_10("A2")),
            Course::new("B", "Course B").with_section(mon_9_10("B1")),
        ]
    }

    #[test]
    fn test_coefficients_for_two_course_example() {
        let courses = ab_courses();
        let model = QuboBuilder::new(&courses).build().unwrap();

        assert_eq!(model.linear(), &[-5.0, -5.0, -5.0]);
        assert_eq!(model.offset(), 10.0);
        // 2·course_penalty + conflict_penalty inside course A
        assert_eq!(model.quadratic_of("A|A1|0", "A|A2|1"), Some(15.0));
        assert_eq!(model.quadratic_of("A|A1|0", "B|B1|0"), Some(5.0));
        assert_eq!(model.quadratic_of("B|B1|0", "A|A2|1"), Some(5.0));
        assert_eq!(model.quadratic().len(), 3);
    }

    #[test]
    fn test_energy() {
        let courses = ab_courses();
        let model = QuboBuilder::new(&courses).build().unwrap();
        assert_eq!(model.energy(&[false, false, false]).unwrap(), 10.0);
        assert_eq!(model.energy(&[true, false, true]).unwrap(), 5.0);
        // 10 - 15 + (15 + 5 + 5)
        assert_eq!(model.energy(&[true, true, true]).unwrap(), 20.0);
        assert!(matches!(
            model.energy(&[true]),
            Err(QuboError::BitstringLength { expected: 3, got: 1 })
        ));
    }

    #[test]
    fn test_penalties_deserialize_with_defaults() {
        let penalties: QuboPenalties = serde_json::from_str(r#"{"course_penalty": 8.0}"#).unwrap();
        assert_eq!(penalties, QuboPenalties::default().with_course_penalty(8.0));
        assert_eq!(penalties.hard_min(), 5.0);
    }

    #[test]
    fn test_unscheduled_sections_add_no_conflicts() {
        let courses = vec![
            Course::new("A", "a").with_section(Section::unscheduled("A1")),
            Course::new("B", "b").with_section(mon_9_10("B1")),
        ];
        let model = QuboBuilder::new(&courses).build().unwrap();
        assert!(model.quadratic().is_empty());
    }

    #[test]
    fn test_primary_meetings() {
        let courses = vec![
            Course::new("A", "a")
                .with_primary(mon_9_10("A-Lec"))
                .with_section(Section::meeting("A1", &[Day::Tue], "09:00", "10:00").unwrap()),
            Course::new("B", "b")
                .with_primary(Section::meeting("B-Lec", &[Day::Mon], "09:30", "10:30").unwrap())
                .with_section(mon_9_10("B1")),
        ];
        let plain = QuboBuilder::new(&courses).build().unwrap();
        let with = QuboBuilder::new(&courses)
            .with_primary_meetings(true)
            .build()
            .unwrap();

        assert_eq!(with.linear()[0], plain.linear()[0]);
        // B1 overlaps both primaries
        assert_eq!(with.linear()[1], plain.linear()[1] + 10.0);
        assert_eq!(with.offset(), plain.offset() + 5.0);
        assert!(with.includes_primary_meetings());
    }

    #[test]
    fn test_soft_cost_dominance() {
        let courses = ab_courses();
        let ok = QuboBuilder::new(&courses)
            .with_soft_cost(|_, s| if s.section_id == "A2" { 1.0 } else { 0.0 })
            .build()
            .unwrap();
        assert_eq!(ok.linear_of("A|A2|1"), Some(-4.0));

        let too_big = QuboBuilder::new(&courses).with_soft_cost(|_, _| 2.0).build();
        assert!(matches!(too_big, Err(QuboError::PenaltyDominance { .. })));
    }

    #[test]
    fn test_invalid_penalty_rejected() {
        let courses = ab_courses();
        let result = QuboBuilder::new(&courses)
            .with_penalties(QuboPenalties::default().with_course_penalty(0.0))
            .build();
        assert!(matches!(result, Err(QuboError::MalformedInput(_))));
    }

    #[test]
    fn test_sparse_triples() {
        let courses = ab_courses();
        let model = QuboBuilder::new(&courses).build().unwrap();
        assert_eq!(
            model.sparse_triples(),
            vec![
                (0, 0, -5.0),
                (0, 1, 15.0),
                (0, 2, 5.0),
                (1, 1, -5.0),
                (1, 2, 5.0),
                (2, 2, -5.0),
            ]
        );
    }
}
