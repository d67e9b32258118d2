//! `qsched-ilp`: meeting placement as a binary integer program.
//!
//! Places every meeting into one room at one start slot of a weekly grid:
//!
//! - **Variables**: one binary per `(meeting, room, day, start)`, generated
//!   only for rooms that seat the meeting
//! - **Constraints**: exactly-one placement per meeting, at most one meeting
//!   per room and slot, at most one meeting per instructor and slot
//! - **Objective**: zero (feasibility) or wasted seats plus an overflow
//!   penalty for the larger half of the rooms
//!
//! [`LpSolver`] hands the program to `good_lp`'s `microlp` backend;
//! [`BranchAndBoundSolver`] is an exact search for assignment-structured
//! programs. Solver output is rounded at 0.5 and re-verified before a
//! [`Schedule`] is returned. An infeasible solve yields [`DiagnosticHint`]s,
//! never a substitute schedule.
//!
//! # Quick start
//!
//! ```rust
//! use qsched_catalog::{GridConfig, Room, TimeGrid};
//! use qsched_ilp::{
//!     IlpBuilder, IlpInstance, InstanceOptions, LpSolver, MeetingSpec, ObjectiveMode,
//!     ScheduleOutcome, solve_and_decode,
//! };
//!
//! let instance = IlpInstance::assemble(
//!     vec![MeetingSpec::new("18100-A").with_enrollment(28).with_instructor("Ada")],
//!     vec![Room::new("HH-1107", 30), Room::new("DH-2315", 150)],
//!     &InstanceOptions::default(),
//! )
//! .unwrap();
//! let grid = TimeGrid::new(GridConfig::default()).unwrap();
//!
//! let model = IlpBuilder::new(&instance, &grid)
//!     .with_objective(ObjectiveMode::resource_minimization())
//!     .build();
//! let outcome = solve_and_decode(&model, &LpSolver::new()).unwrap();
//!
//! let ScheduleOutcome::Scheduled(schedule) = outcome else { panic!() };
//! assert_eq!(schedule.entries[0].room_id, "HH-1107");
//! ```

pub mod builder;
pub mod diagnostics;
pub mod error;
pub mod instance;
pub mod lp;
pub mod model;
pub mod schedule;
pub mod solver;

pub use builder::{IlpBuilder, ObjectiveMode};
pub use diagnostics::{DiagnosticHint, diagnose};
pub use error::{IlpError, IlpResult};
pub use instance::{IlpInstance, InstanceOptions, Meeting, MeetingSpec, SizedRoom};
pub use lp::LpSolver;
pub use model::{
    ConstraintClass, IlpModel, LinearConstraint, ModelStats, PlacementVar, Sense,
    UnplaceableMeeting, UnplaceableReason,
};
pub use schedule::{
    EntryKind, OBJECTIVE_TOLERANCE, Schedule, ScheduleEntry, ScheduleOutcome, decode,
    solve_and_decode,
};
pub use solver::{BranchAndBoundSolver, IlpSolution, IlpSolver, SolveStatus};
