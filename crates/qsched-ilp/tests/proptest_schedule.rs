//! Property-based tests for placement programs.
//!
//! Whatever a solver returns must either decode into a schedule with no
//! double-booked room or instructor, or be proven infeasible. Both backends
//! must agree on feasibility and on the optimal objective.

use proptest::prelude::*;
use qsched_catalog::{Day, GridConfig, Room, TimeGrid};
use qsched_ilp::{
    BranchAndBoundSolver, IlpBuilder, IlpInstance, IlpSolver, InstanceOptions, LpSolver,
    MeetingSpec, ObjectiveMode, ScheduleOutcome, SolveStatus, solve_and_decode,
};

/// Up to five meetings drawn from three instructors.
fn arb_meetings() -> impl Strategy<Value = Vec<MeetingSpec>> {
    prop::collection::vec((5_u32..60, 1_u32..=150, prop::option::of(0_usize..3)), 1..=5)
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (enrollment, minutes, instructor))| {
                    let spec = MeetingSpec::new(format!("M{i}"))
                        .with_enrollment(enrollment)
                        .with_duration_minutes(minutes);
                    match instructor {
                        Some(t) => spec.with_instructor(format!("T{t}")),
                        None => spec,
                    }
                })
                .collect()
        })
}

fn arb_rooms() -> impl Strategy<Value = Vec<Room>> {
    prop::collection::vec(10_u32..80, 1..=3).prop_map(|caps| {
        caps.into_iter()
            .enumerate()
            .map(|(i, cap)| Room::new(format!("R{i}"), cap))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_decoded_schedules_are_valid(
        meetings in arb_meetings(),
        rooms in arb_rooms(),
        minimize in any::<bool>(),
    ) {
        let instance = IlpInstance::assemble(meetings, rooms, &InstanceOptions::default())
            .expect("valid instance");
        let grid = TimeGrid::new(
            GridConfig::default().with_days(vec![Day::Mon]).with_hours(9, 13),
        ).expect("valid grid");
        let objective = if minimize {
            ObjectiveMode::resource_minimization()
        } else {
            ObjectiveMode::Feasibility
        };
        let model = IlpBuilder::new(&instance, &grid).with_objective(objective).build();

        for var in model.variables() {
            let meeting = &instance.meetings()[var.meeting];
            prop_assert!(instance.rooms()[var.room].capacity >= meeting.enrollment);
            prop_assert!(var.start + var.duration <= grid.slots_per_day());
        }

        match solve_and_decode(&model, &LpSolver::new()).expect("solver succeeds") {
            ScheduleOutcome::Scheduled(schedule) => {
                prop_assert!(schedule.verify().is_ok());
                let placed = schedule.placements().count();
                prop_assert_eq!(placed + schedule.unplaceable.len(), instance.meetings().len());
            }
            ScheduleOutcome::Infeasible { .. } => {}
        }

        let exact = BranchAndBoundSolver::new().solve(&model).expect("search succeeds");
        let lp = LpSolver::new().solve(&model).expect("microlp succeeds");
        match (&exact.status, &lp.status) {
            (SolveStatus::Optimal, SolveStatus::Optimal) => {
                let (a, b) = (exact.objective.unwrap_or(0.0), lp.objective.unwrap_or(0.0));
                prop_assert!((a - b).abs() <= 1e-6 * a.abs().max(1.0), "{} vs {}", a, b);
            }
            (SolveStatus::Infeasible, status) => prop_assert_eq!(status, &SolveStatus::Infeasible),
            _ => {}
        }
    }
}
