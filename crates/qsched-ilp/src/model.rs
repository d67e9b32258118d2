//! Binary placement variables, linear constraints and the built model.

use std::fmt;

use qsched_catalog::{Day, TimeGrid, TimeSlot};
use serde::{Deserialize, Serialize};

use crate::instance::IlpInstance;

/// One binary variable: meeting `meeting` starts at `(day, start)` in room `room`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementVar {
    /// Index into the instance's meetings.
    pub meeting: usize,
    /// Index into the instance's rooms.
    pub room: usize,
    /// Day of the placement.
    pub day: Day,
    /// First occupied slot.
    pub start: usize,
    /// Occupied slot count.
    pub duration: usize,
}

impl PlacementVar {
    /// True if the placement occupies `slot`: same day and `start <= t < start + duration`.
    pub fn covers(&self, slot: TimeSlot) -> bool {
        self.day == slot.day && self.start <= slot.index && slot.index < self.start + self.duration
    }

    /// Occupied cells in order.
    pub fn covered_slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        (self.start..self.start + self.duration).map(|i| TimeSlot::new(self.day, i))
    }

    /// First cell.
    pub fn start_slot(&self) -> TimeSlot {
        TimeSlot::new(self.day, self.start)
    }
}

/// Relation between a constraint's left-hand side and its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    /// `lhs == rhs`
    Eq,
    /// `lhs <= rhs`
    Le,
}

/// Which hard rule a constraint encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintClass {
    /// Each meeting placed exactly once.
    Placement,
    /// At most one meeting per room and slot.
    RoomExclusivity,
    /// At most one meeting per instructor and slot.
    InstructorExclusivity,
}

/// `Σ coef·x (sense) rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Readable name.
    pub name: String,
    /// Rule encoded.
    pub class: ConstraintClass,
    /// `(variable index, coefficient)` pairs.
    pub terms: Vec<(usize, f64)>,
    /// Relation.
    pub sense: Sense,
    /// Right-hand side.
    pub rhs: f64,
}

impl LinearConstraint {
    /// Left-hand side under `values`.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * values.get(v).copied().unwrap_or(0.0))
            .sum()
    }

    /// True if `values` satisfy the constraint within `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.lhs(values);
        match self.sense {
            Sense::Eq => (lhs - self.rhs).abs() <= tol,
            Sense::Le => lhs <= self.rhs + tol,
        }
    }
}

/// Why a meeting got no variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnplaceableReason {
    /// Every room is smaller than the enrollment.
    NoRoomFits,
    /// The meeting is longer than the teaching day.
    NoStartTime,
}

/// A meeting that cannot be placed under the current rooms and grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplaceableMeeting {
    /// Meeting identifier.
    pub meeting_id: String,
    /// Enrollment.
    pub enrollment: u32,
    /// Required slots.
    pub duration_slots: usize,
    /// Cause.
    pub reason: UnplaceableReason,
}

impl fmt::Display for UnplaceableMeeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            UnplaceableReason::NoRoomFits => write!(
                f,
                "{}: no room seats {} students",
                self.meeting_id, self.enrollment
            ),
            UnplaceableReason::NoStartTime => write!(
                f,
                "{}: {} slots do not fit in one day",
                self.meeting_id, self.duration_slots
            ),
        }
    }
}

/// Size summary of a built model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    /// Binary variables.
    pub variables: usize,
    /// Exactly-one rows.
    pub placement_constraints: usize,
    /// Room-cell rows.
    pub room_constraints: usize,
    /// Instructor-cell rows.
    pub instructor_constraints: usize,
    /// Meetings without variables.
    pub unplaceable: usize,
}

impl fmt::Display for ModelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} variables, {} placement / {} room / {} instructor constraints, {} unplaceable",
            self.variables,
            self.placement_constraints,
            self.room_constraints,
            self.instructor_constraints,
            self.unplaceable
        )
    }
}

/// A built placement program. Minimize `objective · x` subject to `constraints`.
#[derive(Debug, Clone)]
pub struct IlpModel {
    pub(crate) instance: IlpInstance,
    pub(crate) grid: TimeGrid,
    pub(crate) variables: Vec<PlacementVar>,
    pub(crate) objective: Vec<f64>,
    pub(crate) constraints: Vec<LinearConstraint>,
    pub(crate) unplaceable: Vec<UnplaceableMeeting>,
}

impl IlpModel {
    /// Instance the model was built from.
    pub fn instance(&self) -> &IlpInstance {
        &self.instance
    }

    /// Grid the model was built on.
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Variables in index order.
    pub fn variables(&self) -> &[PlacementVar] {
        &self.variables
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Objective coefficient per variable.
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// All constraints.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Meetings that got no variables.
    pub fn unplaceable(&self) -> &[UnplaceableMeeting] {
        &self.unplaceable
    }

    /// Readable variable name, e.g. `x_18100-A_Mon_09:00_HH-1107`.
    pub fn variable_name(&self, v: usize) -> Option<String> {
        let var = self.variables.get(v)?;
        Some(format!(
            "x_{}_{}_{}",
            self.instance.meetings()[var.meeting].id,
            self.grid.label(var.start_slot()),
            self.instance.rooms()[var.room].id
        ))
    }

    /// Objective value of `values`.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    /// Size summary.
    pub fn stats(&self) -> ModelStats {
        let count = |class| self.constraints.iter().filter(|c| c.class == class).count();
        ModelStats {
            variables: self.variables.len(),
            placement_constraints: count(ConstraintClass::Placement),
            room_constraints: count(ConstraintClass::RoomExclusivity),
            instructor_constraints: count(ConstraintClass::InstructorExclusivity),
            unplaceable: self.unplaceable.len(),
        }
    }
}
