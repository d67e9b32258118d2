//! Decoding solver output into a verified weekly schedule.

use std::collections::BTreeMap;
use std::fmt;

use qsched_catalog::TimeSlot;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::diagnostics::{DiagnosticHint, diagnose};
use crate::error::{IlpError, IlpResult};
use crate::model::{IlpModel, UnplaceableMeeting};
use crate::solver::{IlpSolution, IlpSolver, SolveStatus};

/// Tolerance between reported and recomputed objectives, scaled by
/// `max(1, |objective|)`.
pub const OBJECTIVE_TOLERANCE: f64 = 1e-6;

/// Whether an entry is the first slot of its meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// First occupied slot.
    Start,
    /// A later slot of a multi-slot meeting.
    Continuation,
}

/// One occupied `(slot, room)` cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Occupied grid slot.
    pub slot: TimeSlot,
    /// Grid label such as `Mon_09:00`.
    pub label: String,
    /// Whether the meeting starts in this slot.
    pub kind: EntryKind,
    /// Placed meeting.
    pub meeting_id: String,
    /// Assigned room.
    pub room_id: String,
    /// Instructors of the meeting.
    pub instructors: Vec<String>,
    /// Seats in the room.
    pub capacity: u32,
    /// Students in the meeting.
    pub enrollment: u32,
    /// Total length of the meeting in slots.
    pub duration_slots: usize,
}

/// A decoded schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Entries ordered by slot, then room.
    pub entries: Vec<ScheduleEntry>,
    /// Objective recomputed from the model coefficients.
    pub objective: f64,
    /// Objective as reported by the solver.
    pub reported_objective: Option<f64>,
    /// Meetings the model could not place at all.
    pub unplaceable: Vec<UnplaceableMeeting>,
}

impl Schedule {
    /// Entries grouped by slot in day/hour order.
    pub fn by_slot(&self) -> BTreeMap<TimeSlot, Vec<&ScheduleEntry>> {
        let mut slots: BTreeMap<TimeSlot, Vec<&ScheduleEntry>> = BTreeMap::new();
        for entry in &self.entries {
            slots.entry(entry.slot).or_default().push(entry);
        }
        slots
    }

    /// Start entries only, one per placed meeting.
    pub fn placements(&self) -> impl Iterator<Item = &ScheduleEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Start)
    }

    /// Re-check room and instructor exclusivity and the reported objective.
    pub fn verify(&self) -> IlpResult<()> {
        let mut rooms = FxHashSet::default();
        let mut instructors = FxHashSet::default();
        for entry in &self.entries {
            if !rooms.insert((entry.room_id.as_str(), entry.slot)) {
                return Err(IlpError::InvalidSolution(format!(
                    "room {} double-booked at {}",
                    entry.room_id, entry.label
                )));
            }
            for name in &entry.instructors {
                if !instructors.insert((name.as_str(), entry.slot)) {
                    return Err(IlpError::InvalidSolution(format!(
                        "instructor {name} double-booked at {}",
                        entry.label
                    )));
                }
            }
        }
        if let Some(reported) = self.reported_objective {
            check_drift(reported, self.objective)?;
        }
        Ok(())
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            let tag = match entry.kind {
                EntryKind::Start => "",
                EntryKind::Continuation => " (cont.)",
            };
            write!(
                f,
                "{:<10} {:<12} {:<10} {:>3}/{:<3}",
                entry.label, entry.meeting_id, entry.room_id, entry.enrollment, entry.capacity
            )?;
            if !entry.instructors.is_empty() {
                write!(f, " {}", entry.instructors.join(", "))?;
            }
            writeln!(f, "{tag}")?;
        }
        Ok(())
    }
}

/// Result of decoding a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduleOutcome {
    /// A verified schedule.
    Scheduled(Schedule),
    /// The solver proved infeasibility.
    Infeasible {
        /// Likely causes.
        hints: Vec<DiagnosticHint>,
    },
}

fn check_drift(reported: f64, recomputed: f64) -> IlpResult<()> {
    let tolerance = OBJECTIVE_TOLERANCE * recomputed.abs().max(1.0);
    if (reported - recomputed).abs() > tolerance {
        return Err(IlpError::NumericDrift {
            reported,
            recomputed,
            tolerance,
        });
    }
    Ok(())
}

/// Decode a solver result against the model it was produced for.
///
/// Values above 0.5 count as selected. The rounded assignment must satisfy
/// every constraint, and the reported objective must match the one
/// recomputed from the model.
pub fn decode(model: &IlpModel, solution: &IlpSolution) -> IlpResult<ScheduleOutcome> {
    match &solution.status {
        SolveStatus::Infeasible => {
            let hints = diagnose(model);
            warn!(hints = hints.len(), "placement program is infeasible");
            return Ok(ScheduleOutcome::Infeasible { hints });
        }
        SolveStatus::Other(status) => {
            return Err(IlpError::Backend(format!("solver returned status {status}")));
        }
        SolveStatus::Optimal | SolveStatus::Feasible => {}
    }

    let n = model.num_variables();
    if solution.values.len() != n {
        return Err(IlpError::ValueCount {
            expected: n,
            got: solution.values.len(),
        });
    }
    let rounded: Vec<f64> = solution
        .values
        .iter()
        .map(|&x| if x > 0.5 { 1.0 } else { 0.0 })
        .collect();

    if let Some(broken) = model
        .constraints()
        .iter()
        .find(|c| !c.is_satisfied(&rounded, 1e-9))
    {
        return Err(IlpError::InvalidSolution(broken.name.clone()));
    }

    let objective = model.objective_value(&rounded);
    if let Some(reported) = solution.objective {
        check_drift(reported, objective)?;
    }

    let meetings = model.instance().meetings();
    let rooms = model.instance().rooms();
    let grid = model.grid();
    let mut entries = Vec::new();
    for (var, _) in model
        .variables()
        .iter()
        .zip(&rounded)
        .filter(|&(_, &x)| x > 0.5)
    {
        let meeting = &meetings[var.meeting];
        let room = &rooms[var.room];
        for slot in var.covered_slots() {
            entries.push(ScheduleEntry {
                slot,
                label: grid.label(slot),
                kind: if slot.index == var.start {
                    EntryKind::Start
                } else {
                    EntryKind::Continuation
                },
                meeting_id: meeting.id.clone(),
                room_id: room.id.clone(),
                instructors: meeting.instructors.clone(),
                capacity: room.capacity,
                enrollment: meeting.enrollment,
                duration_slots: var.duration,
            });
        }
    }
    entries.sort_by(|a, b| a.slot.cmp(&b.slot).then_with(|| a.room_id.cmp(&b.room_id)));

    let schedule = Schedule {
        entries,
        objective,
        reported_objective: solution.objective,
        unplaceable: model.unplaceable().to_vec(),
    };
    schedule.verify()?;
    info!(
        placed = schedule.placements().count(),
        unplaceable = schedule.unplaceable.len(),
        objective,
        "decoded schedule"
    );
    Ok(ScheduleOutcome::Scheduled(schedule))
}

/// Solve with `solver` and decode the result.
pub fn solve_and_decode(
    model: &IlpModel,
    solver: &dyn IlpSolver,
) -> IlpResult<ScheduleOutcome> {
    let solution = solver.solve(model)?;
    decode(model, &solution)
}
