//! Integer-program builder.
//!
//! One binary variable per `(meeting, fitting room, day, start slot)`.
//! Rooms smaller than a meeting's enrollment are skipped outright, so no
//! capacity row is ever emitted.

use qsched_catalog::{TimeGrid, TimeSlot};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::instance::IlpInstance;
use crate::model::{
    ConstraintClass, IlpModel, LinearConstraint, PlacementVar, Sense, UnplaceableMeeting,
    UnplaceableReason,
};

/// What the objective rewards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ObjectiveMode {
    /// Zero objective; any feasible schedule will do.
    #[default]
    Feasibility,
    /// Penalize empty seats and the use of the larger half of the rooms.
    ResourceMinimization {
        /// Cost per wasted seat.
        #[serde(default = "default_waste_weight")]
        waste_weight: f64,
        /// Flat cost for placing into a room in the upper capacity half.
        #[serde(default = "default_overflow_penalty")]
        overflow_penalty: f64,
    },
}

fn default_waste_weight() -> f64 {
    1.0
}

fn default_overflow_penalty() -> f64 {
    1000.0
}

impl ObjectiveMode {
    /// Resource minimization with the default weights.
    pub fn resource_minimization() -> Self {
        Self::ResourceMinimization {
            waste_weight: default_waste_weight(),
            overflow_penalty: default_overflow_penalty(),
        }
    }
}

/// Builds an [`IlpModel`] from an instance and a grid.
pub struct IlpBuilder<'a> {
    instance: &'a IlpInstance,
    grid: &'a TimeGrid,
    objective: ObjectiveMode,
}

impl<'a> IlpBuilder<'a> {
    /// Feasibility-only builder.
    pub fn new(instance: &'a IlpInstance, grid: &'a TimeGrid) -> Self {
        Self {
            instance,
            grid,
            objective: ObjectiveMode::Feasibility,
        }
    }

    /// Choose the objective.
    #[must_use]
    pub fn with_objective(mut self, objective: ObjectiveMode) -> Self {
        self.objective = objective;
        self
    }

    /// Generate variables, constraints and the objective.
    pub fn build(&self) -> IlpModel {
        let meetings = self.instance.meetings();
        let rooms = self.instance.rooms();

        let mut variables = Vec::new();
        let mut placement = Vec::new();
        let mut unplaceable = Vec::new();

        for (m, meeting) in meetings.iter().enumerate() {
            let duration = self.grid.duration_slots(meeting.duration_minutes);
            let starts = self.grid.start_indices(duration);
            let fitting: Vec<usize> = rooms
                .iter()
                .enumerate()
                .filter(|(_, r)| r.capacity >= meeting.enrollment)
                .map(|(i, _)| i)
                .collect();

            let first = variables.len();
            for &room in &fitting {
                for &day in self.grid.days() {
                    for start in starts.clone() {
                        variables.push(PlacementVar {
                            meeting: m,
                            room,
                            day,
                            start,
                            duration,
                        });
                    }
                }
            }

            if variables.len() == first {
                let reason = if fitting.is_empty() {
                    UnplaceableReason::NoRoomFits
                } else {
                    UnplaceableReason::NoStartTime
                };
                let report = UnplaceableMeeting {
                    meeting_id: meeting.id.clone(),
                    enrollment: meeting.enrollment,
                    duration_slots: duration,
                    reason,
                };
                warn!(meeting = %meeting.id, "{report}");
                unplaceable.push(report);
                continue;
            }

            placement.push(LinearConstraint {
                name: format!("place_{}", meeting.id),
                class: ConstraintClass::Placement,
                terms: (first..variables.len()).map(|v| (v, 1.0)).collect(),
                sense: Sense::Eq,
                rhs: 1.0,
            });
        }

        let mut constraints = placement;
        constraints.extend(self.room_rows(&variables));
        constraints.extend(self.instructor_rows(&variables));
        let objective = self.objective_coefficients(&variables);

        let model = IlpModel {
            instance: self.instance.clone(),
            grid: self.grid.clone(),
            variables,
            objective,
            constraints,
            unplaceable,
        };
        info!(stats = %model.stats(), "built placement program");
        model
    }

    fn room_rows(&self, variables: &[PlacementVar]) -> Vec<LinearConstraint> {
        let mut cells = coverage(variables, |var| vec![var.room]);
        let mut rows = Vec::new();
        for (r, room) in self.instance.rooms().iter().enumerate() {
            for slot in self.grid.slots() {
                let Some(vars) = cells.remove(&(r, slot)) else {
                    continue;
                };
                rows.push(LinearConstraint {
                    name: format!("room_{}_{}", room.id, self.grid.label(slot)),
                    class: ConstraintClass::RoomExclusivity,
                    terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
                    sense: Sense::Le,
                    rhs: 1.0,
                });
            }
        }
        debug!(rows = rows.len(), "room exclusivity");
        rows
    }

    fn instructor_rows(&self, variables: &[PlacementVar]) -> Vec<LinearConstraint> {
        let meetings = self.instance.meetings();
        let mut cells = coverage(variables, |var| {
            meetings[var.meeting].instructors.iter().map(String::as_str).collect()
        });
        let mut rows = Vec::new();
        for instructor in self.instance.instructors() {
            for slot in self.grid.slots() {
                let Some(vars) = cells.remove(&(instructor, slot)) else {
                    continue;
                };
                rows.push(LinearConstraint {
                    name: format!("instructor_{}_{}", instructor, self.grid.label(slot)),
                    class: ConstraintClass::InstructorExclusivity,
                    terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
                    sense: Sense::Le,
                    rhs: 1.0,
                });
            }
        }
        debug!(rows = rows.len(), "instructor exclusivity");
        rows
    }

    fn objective_coefficients(&self, variables: &[PlacementVar]) -> Vec<f64> {
        let (waste_weight, overflow_penalty) = match self.objective {
            ObjectiveMode::Feasibility => return vec![0.0; variables.len()],
            ObjectiveMode::ResourceMinimization {
                waste_weight,
                overflow_penalty,
            } => (waste_weight, overflow_penalty),
        };

        let rooms = self.instance.rooms();
        // Upper half of a stable ascending capacity sort
        let mut by_capacity: Vec<usize> = (0..rooms.len()).collect();
        by_capacity.sort_by_key(|&r| rooms[r].capacity);
        let mut overflow = vec![false; rooms.len()];
        for &r in &by_capacity[rooms.len() / 2..] {
            overflow[r] = true;
        }

        let meetings = self.instance.meetings();
        let mut max_waste = 0.0_f64;
        let coefficients = variables
            .iter()
            .map(|var| {
                let seats = rooms[var.room].capacity - meetings[var.meeting].enrollment;
                let waste = waste_weight * f64::from(seats);
                max_waste = max_waste.max(waste);
                if overflow[var.room] {
                    waste + overflow_penalty
                } else {
                    waste
                }
            })
            .collect();

        if overflow_penalty <= max_waste {
            warn!(
                overflow_penalty,
                max_waste, "overflow penalty does not dominate wasted-seat cost"
            );
        }
        coefficients
    }
}

/// Variables grouped by the `(owner, cell)` pairs they cover.
fn coverage<K, F>(variables: &[PlacementVar], owners: F) -> FxHashMap<(K, TimeSlot), Vec<usize>>
where
    K: std::hash::Hash + Eq + Clone,
    F: Fn(&PlacementVar) -> Vec<K>,
{
    let mut cells: FxHashMap<(K, TimeSlot), Vec<usize>> = FxHashMap::default();
    for (v, var) in variables.iter().enumerate() {
        for owner in owners(var) {
            for slot in var.covered_slots() {
                cells.entry((owner.clone(), slot)).or_default().push(v);
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{InstanceOptions, MeetingSpec};
    use qsched_catalog::{GridConfig, Room};

    fn grid(hours: u16) -> TimeGrid {
        TimeGrid::new(
            GridConfig::default()
                .with_days(vec![qsched_catalog::Day::Mon])
                .with_hours(9, 9 + hours),
        )
        .unwrap()
    }

    fn instance(meetings: Vec<MeetingSpec>, rooms: Vec<Room>) -> IlpInstance {
        IlpInstance::assemble(meetings, rooms, &InstanceOptions::default()).unwrap()
    }

    #[test]
    fn test_capacity_prefilter() {
        let inst = instance(
            vec![MeetingSpec::new("M").with_enrollment(40)],
            vec![Room::new("small", 30), Room::new("big", 50)],
        );
        let model = IlpBuilder::new(&inst, &grid(3)).build();
        assert_eq!(model.num_variables(), 3);
        assert!(model.variables().iter().all(|v| v.room == 1));
    }

    #[test]
    fn test_start_range_respects_duration() {
        let inst = instance(
            vec![
                MeetingSpec::new("M")
                    .with_enrollment(10)
                    .with_duration_minutes(80),
            ],
            vec![Room::new("R", 30)],
        );
        let model = IlpBuilder::new(&inst, &grid(3)).build();
        let starts: Vec<_> = model.variables().iter().map(|v| v.start).collect();
        assert_eq!(starts, vec![0, 1]);
        assert!(model.variables().iter().all(|v| v.duration == 2));
    }

    #[test]
    fn test_multi_slot_meeting_covers_every_cell() {
        let inst = instance(
            vec![
                MeetingSpec::new("M")
                    .with_enrollment(10)
                    .with_duration_minutes(120)
                    .with_instructor("Ada"),
            ],
            vec![Room::new("R", 30)],
        );
        let model = IlpBuilder::new(&inst, &grid(3)).build();
        let rows: Vec<_> = model
            .constraints()
            .iter()
            .filter(|c| c.class != ConstraintClass::Placement)
            .map(|c| (c.name.as_str(), c.terms.len()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("room_R_Mon_09:00", 1),
                ("room_R_Mon_10:00", 2),
                ("room_R_Mon_11:00", 1),
                ("instructor_Ada_Mon_09:00", 1),
                ("instructor_Ada_Mon_10:00", 2),
                ("instructor_Ada_Mon_11:00", 1),
            ]
        );
    }

    #[test]
    fn test_unplaceable_reasons() {
        let inst = instance(
            vec![
                MeetingSpec::new("huge").with_enrollment(500),
                MeetingSpec::new("long")
                    .with_enrollment(5)
                    .with_duration_minutes(600),
            ],
            vec![Room::new("R", 30)],
        );
        let model = IlpBuilder::new(&inst, &grid(3)).build();
        assert_eq!(model.num_variables(), 0);
        let reasons: Vec<_> = model.unplaceable().iter().map(|u| u.reason).collect();
        assert_eq!(
            reasons,
            vec![UnplaceableReason::NoRoomFits, UnplaceableReason::NoStartTime]
        );
        assert_eq!(model.stats().placement_constraints, 0);
    }

    #[test]
    fn test_overflow_penalty_on_upper_half() {
        let inst = instance(
            vec![MeetingSpec::new("M").with_enrollment(20)],
            vec![Room::new("big", 100), Room::new("small", 25)],
        );
        let model = IlpBuilder::new(&inst, &grid(1))
            .with_objective(ObjectiveMode::resource_minimization())
            .build();
        // Variable order follows room input order
        assert_eq!(model.objective(), &[80.0 + 1000.0, 5.0]);
    }

    #[test]
    fn test_instructor_rows_only_for_taught_cells() {
        let inst = instance(
            vec![
                MeetingSpec::new("A").with_enrollment(5).with_instructor("Ada"),
                MeetingSpec::new("B").with_enrollment(5).with_instructor("Ada"),
                MeetingSpec::new("C").with_enrollment(5),
            ],
            vec![Room::new("R1", 30), Room::new("R2", 30)],
        );
        let model = IlpBuilder::new(&inst, &grid(2)).build();
        let stats = model.stats();
        assert_eq!(stats.variables, 12);
        assert_eq!(stats.placement_constraints, 3);
        assert_eq!(stats.room_constraints, 4);
        assert_eq!(stats.instructor_constraints, 2);
        let row = model
            .constraints()
            .iter()
            .find(|c| c.class == ConstraintClass::InstructorExclusivity)
            .unwrap();
        // Two meetings, two rooms, one start each covering slot 0
        assert_eq!(row.terms.len(), 4);
    }

    #[test]
    fn test_objective_mode_serde() {
        let mode: ObjectiveMode =
            serde_json::from_str(r#"{"mode":"resource_minimization"}"#).unwrap();
        assert_eq!(mode, ObjectiveMode::resource_minimization());
        let mode: ObjectiveMode = serde_json::from_str(r#"{"mode":"feasibility"}"#).unwrap();
        assert_eq!(mode, ObjectiveMode::Feasibility);
    }
}
