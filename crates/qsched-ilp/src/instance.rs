//! Placement instances: the meetings and rooms an integer program is built over.

use qsched_catalog::{Course, Room, Section, Synthetic, SyntheticRanges};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{IlpError, IlpResult};

/// A meeting as supplied by the caller; size and duration may be unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSpec {
    /// Meeting identifier (`course-section`).
    pub id: String,
    /// Instructors teaching it.
    #[serde(default)]
    pub instructors: Vec<String>,
    /// Enrollment; drawn synthetically when absent.
    #[serde(default)]
    pub enrollment: Option<u32>,
    /// Length in minutes; one slot when absent.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

impl MeetingSpec {
    /// A meeting with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            instructors: Vec::new(),
            enrollment: None,
            duration_minutes: None,
        }
    }

    /// Add an instructor.
    #[must_use]
    pub fn with_instructor(mut self, name: impl Into<String>) -> Self {
        self.instructors.push(name.into());
        self
    }

    /// Set the enrollment.
    #[must_use]
    pub fn with_enrollment(mut self, enrollment: u32) -> Self {
        self.enrollment = Some(enrollment);
        self
    }

    /// Set the duration.
    #[must_use]
    pub fn with_duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    /// A meeting for a catalog section.
    pub fn from_section(section: &Section) -> Self {
        Self {
            id: section.section_id.clone(),
            instructors: section.instructors.clone(),
            enrollment: None,
            duration_minutes: section.effective_duration_minutes(),
        }
    }
}

/// A meeting with every field resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    /// Meeting identifier.
    pub id: String,
    /// Distinct instructors, in input order.
    pub instructors: Vec<String>,
    /// Enrollment.
    pub enrollment: u32,
    /// Length in minutes, if known.
    pub duration_minutes: Option<u32>,
}

/// A room with a resolved capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizedRoom {
    /// Room identifier.
    pub id: String,
    /// Seating capacity.
    pub capacity: u32,
}

/// Knobs for instance assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceOptions {
    /// Keep at most this many rooms (input order).
    pub max_rooms: Option<usize>,
    /// Seed for synthetic enrollment and capacity.
    pub seed: u64,
    /// Ranges for synthetic draws.
    pub synthetic: SyntheticRanges,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            max_rooms: None,
            seed: 0,
            synthetic: SyntheticRanges::default(),
        }
    }
}

impl InstanceOptions {
    /// Cap the room list.
    #[must_use]
    pub fn with_max_rooms(mut self, max_rooms: usize) -> Self {
        self.max_rooms = Some(max_rooms);
        self
    }

    /// Set the synthetic-data seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Deduplicated, fully sized meetings and rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IlpInstance {
    meetings: Vec<Meeting>,
    rooms: Vec<SizedRoom>,
    duplicates_dropped: usize,
}

impl IlpInstance {
    /// Assemble an instance.
    ///
    /// Repeated meeting ids keep their first occurrence. Repeated room ids
    /// are collapsed the same way before `max_rooms` is applied. Missing
    /// enrollments are drawn first, in meeting order, then missing capacities.
    pub fn assemble(
        meetings: Vec<MeetingSpec>,
        rooms: Vec<Room>,
        options: &InstanceOptions,
    ) -> IlpResult<Self> {
        let mut synthetic = Synthetic::new(options.seed, options.synthetic)?;

        let total = meetings.len();
        let mut seen = FxHashSet::default();
        let mut unique = Vec::with_capacity(total);
        for spec in meetings {
            if spec.id.trim().is_empty() {
                return Err(IlpError::MalformedInput("meeting with empty id".into()));
            }
            if seen.insert(spec.id.clone()) {
                unique.push(spec);
            }
        }
        let duplicates_dropped = total - unique.len();
        if duplicates_dropped > 0 {
            warn!(dropped = duplicates_dropped, "dropped duplicate meeting rows");
        }

        let meetings: Vec<Meeting> = unique
            .into_iter()
            .map(|spec| {
                let mut instructors: Vec<String> = Vec::with_capacity(spec.instructors.len());
                for name in spec.instructors {
                    if !instructors.contains(&name) {
                        instructors.push(name);
                    }
                }
                Meeting {
                    enrollment: spec.enrollment.unwrap_or_else(|| synthetic.enrollment()),
                    id: spec.id,
                    instructors,
                    duration_minutes: spec.duration_minutes,
                }
            })
            .collect();

        let mut seen_rooms = FxHashSet::default();
        let mut rooms: Vec<Room> = rooms
            .into_iter()
            .filter(|r| seen_rooms.insert(r.id.clone()))
            .collect();
        if let Some(max) = options.max_rooms {
            if rooms.len() > max {
                info!(available = rooms.len(), kept = max, "limiting room list");
                rooms.truncate(max);
            }
        }
        let rooms: Vec<SizedRoom> = rooms
            .into_iter()
            .map(|room| SizedRoom {
                capacity: room.capacity.unwrap_or_else(|| synthetic.capacity()),
                id: room.id,
            })
            .collect();

        debug!(
            meetings = meetings.len(),
            rooms = rooms.len(),
            "assembled placement instance"
        );
        Ok(Self {
            meetings,
            rooms,
            duplicates_dropped,
        })
    }

    /// Meetings for every timed section and primary meeting in `courses`.
    ///
    /// TBA sections are never placed and are left out.
    pub fn from_courses(
        courses: &[Course],
        rooms: Vec<Room>,
        options: &InstanceOptions,
    ) -> IlpResult<Self> {
        let specs = courses
            .iter()
            .flat_map(|c| c.primary.iter().chain(c.sections.iter()))
            .filter(|s| !s.is_unconstrained())
            .map(MeetingSpec::from_section)
            .collect();
        Self::assemble(specs, rooms, options)
    }

    /// Resolved meetings.
    pub fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }

    /// Resolved rooms.
    pub fn rooms(&self) -> &[SizedRoom] {
        &self.rooms
    }

    /// Meeting rows dropped as duplicates.
    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    /// Distinct instructors in first-seen order.
    pub fn instructors(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.meetings
            .iter()
            .flat_map(|m| m.instructors.iter())
            .filter(|name| seen.insert(name.as_str()))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_first_wins() {
        let meetings = vec![
            MeetingSpec::new("18100-A").with_enrollment(20).with_instructor("Ada"),
            MeetingSpec::new("18100-A").with_enrollment(99),
            MeetingSpec::new("18100-B").with_enrollment(10),
        ];
        let inst =
            IlpInstance::assemble(meetings, vec![Room::new("R", 30)], &InstanceOptions::default())
                .unwrap();
        assert_eq!(inst.meetings().len(), 2);
        assert_eq!(inst.meetings()[0].enrollment, 20);
        assert_eq!(inst.duplicates_dropped(), 1);
        assert_eq!(inst.instructors(), vec!["Ada"]);
    }

    #[test]
    fn test_max_rooms_and_room_dedup() {
        let rooms = vec![
            Room::new("A", 10),
            Room::new("A", 20),
            Room::new("B", 30),
            Room::new("C", 40),
        ];
        let options = InstanceOptions::default().with_max_rooms(2);
        let inst = IlpInstance::assemble(vec![], rooms, &options).unwrap();
        let ids: Vec<_> = inst.rooms().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(inst.rooms()[0].capacity, 10);
    }

    #[test]
    fn test_synthetic_fill_is_seeded() {
        let build = |seed| {
            IlpInstance::assemble(
                vec![MeetingSpec::new("M1"), MeetingSpec::new("M2").with_enrollment(5)],
                vec![Room::without_capacity("R1"), Room::new("R2", 200)],
                &InstanceOptions::default().with_seed(seed),
            )
            .unwrap()
        };
        let a = build(7);
        assert_eq!(a, build(7));
        assert!((15..=80).contains(&a.meetings()[0].enrollment));
        assert_eq!(a.meetings()[1].enrollment, 5);
        assert!((30..=150).contains(&a.rooms()[0].capacity));
        assert_eq!(a.rooms()[1].capacity, 200);
    }

    #[test]
    fn test_empty_id_rejected() {
        let result =
            IlpInstance::assemble(vec![MeetingSpec::new(" ")], vec![], &InstanceOptions::default());
        assert!(matches!(result, Err(IlpError::MalformedInput(_))));
    }

    #[test]
    fn test_repeated_instructor_collapsed() {
        let meetings = vec![
            MeetingSpec::new("M")
                .with_enrollment(1)
                .with_instructor("Ada")
                .with_instructor("Ada"),
        ];
        let inst = IlpInstance::assemble(meetings, vec![], &InstanceOptions::default()).unwrap();
        assert_eq!(inst.meetings()[0].instructors, vec!["Ada".to_string()]);
    }
}
