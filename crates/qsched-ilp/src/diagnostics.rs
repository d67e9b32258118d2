//! Likely causes of an infeasible placement program.
//!
//! Hints are reported alongside an infeasible outcome. Nothing here relaxes
//! or repairs the model.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::model::{IlpModel, UnplaceableReason};

/// One suspected cause of infeasibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticHint {
    /// A meeting is larger than every room.
    OversizedMeeting {
        /// The meeting.
        meeting_id: String,
        /// Its enrollment.
        enrollment: u32,
        /// Capacity of the largest room, if any room exists.
        largest_room: Option<u32>,
    },
    /// A meeting does not fit in one teaching day.
    MeetingTooLong {
        /// The meeting.
        meeting_id: String,
        /// Consecutive slots it needs.
        duration_slots: usize,
        /// Slots in one grid day.
        slots_per_day: usize,
    },
    /// Meetings of at least `threshold` students need more room-slots than
    /// the rooms seating them offer.
    LargeMeetingShortfall {
        /// Enrollment cut-off.
        threshold: u32,
        /// Meetings at or above the cut-off.
        meetings: usize,
        /// Rooms that seat the cut-off.
        rooms: usize,
        /// Room-slots those meetings occupy.
        demand: usize,
        /// Room-slots those rooms offer.
        supply: usize,
    },
    /// All meetings together need more room-slots than exist.
    RoomTimeShortfall {
        /// Room-slots all meetings occupy.
        demand: usize,
        /// Rooms times grid slots.
        supply: usize,
    },
    /// An instructor teaches more slots than the week holds.
    InstructorOverload {
        /// The instructor.
        instructor: String,
        /// Slots taught.
        demand: usize,
        /// Slots in the grid.
        supply: usize,
    },
}

impl fmt::Display for DiagnosticHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OversizedMeeting {
                meeting_id,
                enrollment,
                largest_room,
            } => match largest_room {
                Some(cap) => write!(
                    f,
                    "{meeting_id} enrolls {enrollment} but the largest room seats {cap}"
                ),
                None => write!(f, "{meeting_id} enrolls {enrollment} but there are no rooms"),
            },
            Self::MeetingTooLong {
                meeting_id,
                duration_slots,
                slots_per_day,
            } => write!(
                f,
                "{meeting_id} needs {duration_slots} consecutive slots, the day has {slots_per_day}"
            ),
            Self::LargeMeetingShortfall {
                threshold,
                meetings,
                rooms,
                demand,
                supply,
            } => write!(
                f,
                "too many large classes for small rooms: {meetings} meetings of {threshold}+ \
                 students need {demand} room-slots, {rooms} rooms offer {supply}"
            ),
            Self::RoomTimeShortfall { demand, supply } => write!(
                f,
                "meetings need {demand} room-slots but only {supply} exist"
            ),
            Self::InstructorOverload {
                instructor,
                demand,
                supply,
            } => write!(
                f,
                "{instructor} teaches {demand} slots but the week has {supply}"
            ),
        }
    }
}

/// Collect hints for a model that a solver reported infeasible.
pub fn diagnose(model: &IlpModel) -> Vec<DiagnosticHint> {
    let grid = model.grid();
    let rooms = model.instance().rooms();
    let meetings = model.instance().meetings();
    let week = grid.num_slots();
    let largest_room = rooms.iter().map(|r| r.capacity).max();

    let mut hints: Vec<DiagnosticHint> = model
        .unplaceable()
        .iter()
        .map(|u| match u.reason {
            UnplaceableReason::NoRoomFits => DiagnosticHint::OversizedMeeting {
                meeting_id: u.meeting_id.clone(),
                enrollment: u.enrollment,
                largest_room,
            },
            UnplaceableReason::NoStartTime => DiagnosticHint::MeetingTooLong {
                meeting_id: u.meeting_id.clone(),
                duration_slots: u.duration_slots,
                slots_per_day: grid.slots_per_day(),
            },
        })
        .collect();

    let demand: Vec<(u32, usize)> = meetings
        .iter()
        .map(|m| (m.enrollment, grid.duration_slots(m.duration_minutes)))
        .collect();

    let total: usize = demand.iter().map(|&(_, d)| d).sum();
    let supply = rooms.len() * week;
    if total > supply {
        hints.push(DiagnosticHint::RoomTimeShortfall {
            demand: total,
            supply,
        });
    }

    // Worst deficit over enrollment thresholds
    let mut thresholds: Vec<u32> = demand.iter().map(|&(e, _)| e).collect();
    thresholds.sort_unstable();
    thresholds.dedup();
    let worst = thresholds
        .into_iter()
        .filter_map(|threshold| {
            let (count, need) = demand
                .iter()
                .filter(|&&(e, _)| e >= threshold)
                .fold((0, 0), |(c, n), &(_, d)| (c + 1, n + d));
            let seating = rooms.iter().filter(|r| r.capacity >= threshold).count();
            let offer = seating * week;
            (seating > 0 && need > offer && seating < rooms.len()).then_some(
                DiagnosticHint::LargeMeetingShortfall {
                    threshold,
                    meetings: count,
                    rooms: seating,
                    demand: need,
                    supply: offer,
                },
            )
        })
        .max_by_key(|hint| match hint {
            DiagnosticHint::LargeMeetingShortfall { demand, supply, .. } => demand - supply,
            _ => 0,
        });
    hints.extend(worst);

    let mut load: FxHashMap<&str, usize> = FxHashMap::default();
    for (meeting, &(_, slots)) in meetings.iter().zip(&demand) {
        for name in &meeting.instructors {
            *load.entry(name.as_str()).or_default() += slots;
        }
    }
    for instructor in model.instance().instructors() {
        let taught = load.get(instructor).copied().unwrap_or(0);
        if taught > week {
            hints.push(DiagnosticHint::InstructorOverload {
                instructor: instructor.to_string(),
                demand: taught,
                supply: week,
            });
        }
    }
    hints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IlpBuilder;
    use crate::instance::{IlpInstance, InstanceOptions, MeetingSpec};
    use qsched_catalog::{Day, GridConfig, Room, TimeGrid};

    fn model(meetings: Vec<MeetingSpec>, rooms: Vec<Room>, hours: u16) -> IlpModel {
        let grid = TimeGrid::new(
            GridConfig::default()
                .with_days(vec![Day::Mon])
                .with_hours(9, 9 + hours),
        )
        .unwrap();
        let inst = IlpInstance::assemble(meetings, rooms, &InstanceOptions::default()).unwrap();
        IlpBuilder::new(&inst, &grid).build()
    }

    #[test]
    fn test_large_class_shortfall() {
        let meetings = vec![
            MeetingSpec::new("L1").with_enrollment(90),
            MeetingSpec::new("L2").with_enrollment(95),
            MeetingSpec::new("L3").with_enrollment(99),
            MeetingSpec::new("S1").with_enrollment(10),
        ];
        let rooms = vec![Room::new("big", 100), Room::new("s1", 20), Room::new("s2", 20)];
        let hints = diagnose(&model(meetings, rooms, 2));
        assert_eq!(hints.len(), 1);
        assert!(hints[0].to_string().starts_with("too many large classes for small rooms"));
        assert!(matches!(
            hints[0],
            DiagnosticHint::LargeMeetingShortfall {
                demand: 3,
                supply: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_unplaceable_and_instructor_hints() {
        let meetings = vec![
            MeetingSpec::new("huge").with_enrollment(500),
            MeetingSpec::new("A").with_enrollment(5).with_instructor("Ada"),
            MeetingSpec::new("B").with_enrollment(5).with_instructor("Ada"),
            MeetingSpec::new("C").with_enrollment(5).with_instructor("Ada"),
        ];
        let hints = diagnose(&model(meetings, vec![Room::new("R1", 30), Room::new("R2", 30)], 2));
        assert!(matches!(
            &hints[0],
            DiagnosticHint::OversizedMeeting {
                largest_room: Some(30),
                ..
            }
        ));
        assert!(hints.iter().any(|h| matches!(
            h,
            DiagnosticHint::InstructorOverload {
                demand: 3,
                supply: 2,
                ..
            }
        )));
    }
}
