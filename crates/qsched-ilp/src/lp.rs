//! Mixed-integer backend on `good_lp` with the pure-Rust `microlp` solver.

use good_lp::solvers::microlp::microlp;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    variable,
};
use tracing::{debug, info};

use crate::error::{IlpError, IlpResult};
use crate::model::{IlpModel, Sense};
use crate::solver::{IlpSolution, IlpSolver, SolveStatus};

/// Solves any [`IlpModel`] as a binary program with `microlp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LpSolver;

impl LpSolver {
    /// Create the solver.
    pub fn new() -> Self {
        Self
    }
}

fn weighted_sum(terms: &[(usize, f64)], vars: &[Variable]) -> Expression {
    terms.iter().map(|&(v, c)| c * vars[v]).sum()
}

impl IlpSolver for LpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, model: &IlpModel) -> IlpResult<IlpSolution> {
        let n = model.num_variables();
        if n == 0 {
            return Ok(IlpSolution {
                status: SolveStatus::Optimal,
                values: Vec::new(),
                objective: Some(0.0),
            });
        }

        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = problem.add_vector(variable().binary(), n);
        let objective: Expression = model
            .objective()
            .iter()
            .zip(&vars)
            .map(|(&c, &x)| c * x)
            .sum();

        let mut program = problem.minimise(objective).using(microlp);
        for row in model.constraints() {
            if let Some(&(v, _)) = row.terms.iter().find(|&&(v, _)| v >= n) {
                return Err(IlpError::MalformedInput(format!(
                    "row {} references variable {v}",
                    row.name
                )));
            }
            let lhs = weighted_sum(&row.terms, &vars);
            let rhs = row.rhs;
            program.add_constraint(match row.sense {
                Sense::Eq => constraint!(lhs == rhs),
                Sense::Le => constraint!(lhs <= rhs),
            });
        }
        debug!(
            variables = n,
            rows = model.constraints().len(),
            "handing program to microlp"
        );

        let solution = match program.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => {
                info!(solver = self.name(), "solve finished: infeasible");
                return Ok(IlpSolution::infeasible());
            }
            Err(ResolutionError::Unbounded) => {
                return Ok(IlpSolution {
                    status: SolveStatus::Other("unbounded".into()),
                    values: Vec::new(),
                    objective: None,
                });
            }
            Err(e) => return Err(IlpError::Backend(e.to_string())),
        };

        let values: Vec<f64> = vars.iter().map(|&x| solution.value(x)).collect();
        let objective: f64 = model
            .objective()
            .iter()
            .zip(&values)
            .map(|(c, x)| c * x)
            .sum();
        info!(solver = self.name(), objective, "solve finished: optimal");
        Ok(IlpSolution {
            status: SolveStatus::Optimal,
            values,
            objective: Some(objective),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{IlpBuilder, ObjectiveMode};
    use crate::instance::{IlpInstance, InstanceOptions, MeetingSpec};
    use crate::schedule::{ScheduleOutcome, solve_and_decode};
    use qsched_catalog::{Day, GridConfig, Room, TimeGrid};

    fn one_day(hours: u16) -> TimeGrid {
        TimeGrid::new(
            GridConfig::default()
                .with_days(vec![Day::Mon])
                .with_hours(9, 9 + hours),
        )
        .unwrap()
    }

    #[test]
    fn test_picks_cheapest_room() {
        let inst = IlpInstance::assemble(
            vec![MeetingSpec::new("M").with_enrollment(28)],
            vec![Room::new("R150", 150), Room::new("R30", 30)],
            &InstanceOptions::default(),
        )
        .unwrap();
        let model = IlpBuilder::new(&inst, &one_day(2))
            .with_objective(ObjectiveMode::resource_minimization())
            .build();
        let ScheduleOutcome::Scheduled(schedule) =
            solve_and_decode(&model, &LpSolver::new()).unwrap()
        else {
            panic!("expected a schedule");
        };
        assert_eq!(schedule.entries[0].room_id, "R30");
        assert!((schedule.objective - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_reports_infeasible() {
        // Two meetings, one room, one slot
        let inst = IlpInstance::assemble(
            vec![
                MeetingSpec::new("A").with_enrollment(5),
                MeetingSpec::new("B").with_enrollment(5),
            ],
            vec![Room::new("R", 10)],
            &InstanceOptions::default(),
        )
        .unwrap();
        let model = IlpBuilder::new(&inst, &one_day(1)).build();
        let solution = LpSolver::new().solve(&model).unwrap();
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_no_variables_is_trivially_optimal() {
        let inst =
            IlpInstance::assemble(vec![], vec![Room::new("R", 10)], &InstanceOptions::default())
                .unwrap();
        let model = IlpBuilder::new(&inst, &one_day(1)).build();
        let solution = LpSolver::new().solve(&model).unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective, Some(0.0));
    }
}
