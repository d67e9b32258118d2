//! Solver seam and the reference branch-and-bound solver.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{IlpError, IlpResult};
use crate::model::{IlpModel, Sense};

/// Outcome reported by a solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Proven optimal.
    Optimal,
    /// Feasible but not proven optimal.
    Feasible,
    /// Proven infeasible.
    Infeasible,
    /// Anything else the backend may report (time limit, license, ...).
    Other(String),
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimal => write!(f, "optimal"),
            Self::Feasible => write!(f, "feasible"),
            Self::Infeasible => write!(f, "infeasible"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Raw solver output: one value in `[0, 1]` per variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IlpSolution {
    /// Solve status.
    pub status: SolveStatus,
    /// Variable values; empty when no assignment was found.
    pub values: Vec<f64>,
    /// Objective value as reported by the solver.
    pub objective: Option<f64>,
}

impl IlpSolution {
    /// An infeasible result with no values.
    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            values: Vec::new(),
            objective: None,
        }
    }
}

/// A backend able to solve a placement program.
///
/// Calls are blocking. Backend failures are returned as
/// [`IlpError::Backend`] and never retried here.
pub trait IlpSolver {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Solve `model`.
    fn solve(&self, model: &IlpModel) -> IlpResult<IlpSolution>;
}

/// Depth-first branch and bound over assignment-structured programs.
///
/// Every variable must sit in exactly one `Σ x = 1` row; `≤` rows must have
/// non-negative coefficients and bounds. Groups are branched smallest first,
/// cheapest variable first, and pruned against the sum of per-group minimum
/// costs still to be paid.
#[derive(Debug, Clone)]
pub struct BranchAndBoundSolver {
    node_limit: u64,
}

impl Default for BranchAndBoundSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchAndBoundSolver {
    /// Default node budget.
    pub const DEFAULT_NODE_LIMIT: u64 = 1_000_000;

    /// Solver with the default node budget.
    pub fn new() -> Self {
        Self {
            node_limit: Self::DEFAULT_NODE_LIMIT,
        }
    }

    /// Set the node budget.
    #[must_use]
    pub fn with_node_limit(mut self, node_limit: u64) -> Self {
        self.node_limit = node_limit;
        self
    }
}

/// Search state shared across the recursion.
struct Search<'m> {
    groups: Vec<Vec<usize>>,
    costs: &'m [f64],
    rows_of: Vec<Vec<(usize, f64)>>,
    rhs: Vec<f64>,
    usage: Vec<f64>,
    bound: Vec<f64>,
    chosen: Vec<usize>,
    best: Option<(f64, Vec<usize>)>,
    nodes: u64,
    node_limit: u64,
    exhausted: bool,
}

const TOL: f64 = 1e-9;

impl Search<'_> {
    fn run(&mut self, depth: usize, cost: f64) {
        if depth == self.groups.len() {
            if self.best.as_ref().is_none_or(|(b, _)| cost < *b - TOL) {
                self.best = Some((cost, self.chosen.clone()));
            }
            return;
        }
        for k in 0..self.groups[depth].len() {
            if self.nodes >= self.node_limit {
                self.exhausted = true;
                return;
            }
            self.nodes += 1;

            let v = self.groups[depth][k];
            let next = cost + self.costs[v];
            if let Some((best, _)) = &self.best {
                if next + self.bound[depth + 1] >= *best - TOL {
                    // Candidates are sorted by cost
                    break;
                }
            }
            let fits = self.rows_of[v]
                .iter()
                .all(|&(row, coef)| self.usage[row] + coef <= self.rhs[row] + TOL);
            if !fits {
                continue;
            }

            for &(row, coef) in &self.rows_of[v] {
                self.usage[row] += coef;
            }
            self.chosen.push(v);
            self.run(depth + 1, next);
            self.chosen.pop();
            for &(row, coef) in &self.rows_of[v] {
                self.usage[row] -= coef;
            }
            if self.exhausted {
                return;
            }
        }
    }
}

impl IlpSolver for BranchAndBoundSolver {
    fn name(&self) -> &str {
        "branch-and-bound"
    }

    fn solve(&self, model: &IlpModel) -> IlpResult<IlpSolution> {
        let n = model.num_variables();
        let costs = model.objective();

        let mut group_of: Vec<Option<usize>> = vec![None; n];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut rows_of: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        let mut rhs = Vec::new();

        for constraint in model.constraints() {
            match constraint.sense {
                Sense::Eq => {
                    let unit = (constraint.rhs - 1.0).abs() <= TOL
                        && constraint.terms.iter().all(|&(_, c)| (c - 1.0).abs() <= TOL);
                    if !unit {
                        return Err(IlpError::UnsupportedStructure(format!(
                            "equality row {} is not a unit assignment",
                            constraint.name
                        )));
                    }
                    let g = groups.len();
                    for &(v, _) in &constraint.terms {
                        if v >= n || group_of[v].replace(g).is_some() {
                            return Err(IlpError::UnsupportedStructure(format!(
                                "variable {v} is not in exactly one assignment row"
                            )));
                        }
                    }
                    groups.push(constraint.terms.iter().map(|&(v, _)| v).collect());
                }
                Sense::Le => {
                    if constraint.rhs < 0.0 || constraint.terms.iter().any(|&(_, c)| c < 0.0) {
                        return Err(IlpError::UnsupportedStructure(format!(
                            "row {} has negative entries",
                            constraint.name
                        )));
                    }
                    let row = rhs.len();
                    rhs.push(constraint.rhs);
                    for &(v, c) in &constraint.terms {
                        if v >= n {
                            return Err(IlpError::MalformedInput(format!(
                                "row {} references variable {v}",
                                constraint.name
                            )));
                        }
                        rows_of[v].push((row, c));
                    }
                }
            }
        }
        if let Some(v) = group_of.iter().position(Option::is_none) {
            return Err(IlpError::UnsupportedStructure(format!(
                "variable {v} belongs to no assignment row"
            )));
        }
        if groups.iter().any(Vec::is_empty) {
            info!(solver = self.name(), "empty assignment row");
            return Ok(IlpSolution::infeasible());
        }

        groups.sort_by_key(Vec::len);
        for group in &mut groups {
            group.sort_by(|&a, &b| costs[a].total_cmp(&costs[b]));
        }
        let mut bound = vec![0.0; groups.len() + 1];
        for (d, group) in groups.iter().enumerate().rev() {
            bound[d] = bound[d + 1] + costs[group[0]];
        }

        let mut search = Search {
            usage: vec![0.0; rhs.len()],
            chosen: Vec::with_capacity(groups.len()),
            groups,
            costs,
            rows_of,
            rhs,
            bound,
            best: None,
            nodes: 0,
            node_limit: self.node_limit,
            exhausted: false,
        };
        search.run(0, 0.0);
        debug!(nodes = search.nodes, exhausted = search.exhausted, "search finished");

        let status = match (&search.best, search.exhausted) {
            (Some(_), false) => SolveStatus::Optimal,
            (Some(_), true) => SolveStatus::Feasible,
            (None, false) => SolveStatus::Infeasible,
            (None, true) => SolveStatus::Other(format!("node limit {} reached", self.node_limit)),
        };
        info!(solver = self.name(), %status, nodes = search.nodes, "solve finished");

        Ok(match search.best {
            Some((objective, chosen)) => {
                let mut values = vec![0.0; n];
                for v in chosen {
                    values[v] = 1.0;
                }
                IlpSolution {
                    status,
                    values,
                    objective: Some(objective),
                }
            }
            None => IlpSolution {
                status,
                values: Vec::new(),
                objective: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{IlpBuilder, ObjectiveMode};
    use crate::instance::{IlpInstance, InstanceOptions, MeetingSpec};
    use qsched_catalog::{Day, GridConfig, Room, TimeGrid};

    fn one_day(hours: u16) -> TimeGrid {
        TimeGrid::new(
            GridConfig::default()
                .with_days(vec![Day::Mon])
                .with_hours(9, 9 + hours),
        )
        .unwrap()
    }

    fn model(meetings: Vec<MeetingSpec>, rooms: Vec<Room>, hours: u16) -> IlpModel {
        let inst = IlpInstance::assemble(meetings, rooms, &InstanceOptions::default()).unwrap();
        IlpBuilder::new(&inst, &one_day(hours))
            .with_objective(ObjectiveMode::resource_minimization())
            .build()
    }

    #[test]
    fn test_picks_cheapest_room() {
        let m = model(
            vec![MeetingSpec::new("M").with_enrollment(20)],
            vec![Room::new("big", 100), Room::new("small", 25)],
            1,
        );
        let sol = BranchAndBoundSolver::new().solve(&m).unwrap();
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.values, vec![0.0, 1.0]);
        assert_eq!(sol.objective, Some(5.0));
    }

    #[test]
    fn test_proves_infeasibility() {
        // Three one-slot meetings, one room, two slots
        let meetings = ["A", "B", "C"]
            .iter()
            .map(|id| MeetingSpec::new(*id).with_enrollment(5))
            .collect();
        let m = model(meetings, vec![Room::new("R", 10)], 2);
        let sol = BranchAndBoundSolver::new().solve(&m).unwrap();
        assert_eq!(sol.status, SolveStatus::Infeasible);
        assert!(sol.values.is_empty());
    }

    #[test]
    fn test_node_limit() {
        let meetings = ["A", "B", "C"]
            .iter()
            .map(|id| MeetingSpec::new(*id).with_enrollment(5))
            .collect();
        let m = model(meetings, vec![Room::new("R", 10)], 2);
        let sol = BranchAndBoundSolver::new()
            .with_node_limit(1)
            .solve(&m)
            .unwrap();
        assert!(matches!(sol.status, SolveStatus::Other(_)));
    }

    #[test]
    fn test_no_meetings_is_trivially_optimal() {
        let m = model(vec![], vec![Room::new("R", 10)], 2);
        let sol = BranchAndBoundSolver::new().solve(&m).unwrap();
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.objective, Some(0.0));
    }
}
