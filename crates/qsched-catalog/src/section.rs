//! Sections (candidate meetings) and the interval model.
//!
//! Two sections conflict iff they share a meeting day AND their `[begin, end)`
//! windows overlap. Sections without a fixed slot (TBA, independent study,
//! internships) never conflict with anything.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::time::{ClockTime, Day, DaySet, TimeWindow};

/// Kind of meeting a section represents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingType {
    /// Primary lecture.
    Lecture,
    /// Laboratory.
    Lab,
    /// Recitation or discussion section.
    Recitation,
    /// Design studio.
    Studio,
    /// Seminar.
    Seminar,
    /// Forum.
    Forum,
}

impl MeetingType {
    /// Guess the meeting type from the course title and section tag.
    pub fn infer(title: &str, tag: &str) -> Self {
        if tag == "Lec" {
            MeetingType::Lecture
        } else if title.contains("Lab") {
            MeetingType::Lab
        } else if title.contains("Forum") {
            MeetingType::Forum
        } else if title.contains("Studio") {
            MeetingType::Studio
        } else if title.contains("Seminar") {
            MeetingType::Seminar
        } else {
            MeetingType::Recitation
        }
    }

    /// Parse a catalog tag such as `"lab"`; `None` if unrecognised.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "lecture" | "lec" => Some(MeetingType::Lecture),
            "lab" => Some(MeetingType::Lab),
            "recitation" | "rec" => Some(MeetingType::Recitation),
            "studio" => Some(MeetingType::Studio),
            "seminar" => Some(MeetingType::Seminar),
            "forum" => Some(MeetingType::Forum),
            _ => None,
        }
    }
}

/// One candidate meeting of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section identifier, e.g. `48313-A`. Not necessarily unique within a course.
    pub section_id: String,
    /// Short section tag, e.g. `A` or `Lec`.
    pub tag: String,
    /// Meeting days.
    pub days: DaySet,
    /// Clock window, `None` when the time is TBA.
    pub window: Option<TimeWindow>,
    /// Duration in minutes as reported by the catalog.
    pub duration_minutes: Option<u32>,
    /// Meeting kind.
    pub meeting_type: MeetingType,
    /// False for entries that never occupy a slot.
    pub requires_time_slot: bool,
    /// Instructors teaching this meeting.
    pub instructors: Vec<String>,
}

impl Section {
    /// A section with no days and no time (schedulable unconditionally).
    pub fn unscheduled(section_id: impl Into<String>) -> Self {
        let section_id = section_id.into();
        Self {
            tag: section_id.rsplit('-').next().unwrap_or_default().to_string(),
            section_id,
            days: DaySet::EMPTY,
            window: None,
            duration_minutes: None,
            meeting_type: MeetingType::Recitation,
            requires_time_slot: false,
            instructors: Vec::new(),
        }
    }

    /// A timed section meeting on `days` between `begin` and `end`.
    pub fn meeting(
        section_id: impl Into<String>,
        days: &[Day],
        begin: &str,
        end: &str,
    ) -> CatalogResult<Self> {
        let section_id = section_id.into();
        let window = parse_window(Some(begin), Some(end), &section_id)?;
        let mut section = Self::unscheduled(section_id);
        section.days = days.iter().copied().collect();
        section.duration_minutes = window.map(|w| w.minutes());
        section.requires_time_slot = window.is_some();
        section.window = window;
        Ok(section)
    }

    /// Set the meeting type.
    #[must_use]
    pub fn with_meeting_type(mut self, meeting_type: MeetingType) -> Self {
        self.meeting_type = meeting_type;
        self
    }

    /// Add an instructor.
    #[must_use]
    pub fn with_instructor(mut self, name: impl Into<String>) -> Self {
        self.instructors.push(name.into());
        self
    }

    /// True when this section can never collide with another meeting.
    pub fn is_unconstrained(&self) -> bool {
        !self.requires_time_slot || self.days.is_empty() || self.window.is_none()
    }

    /// Interval-model conflict test. Symmetric, not transitive.
    pub fn overlaps(&self, other: &Section) -> bool {
        if self.is_unconstrained() || other.is_unconstrained() {
            return false;
        }
        if !self.days.intersects(other.days) {
            return false;
        }
        match (self.window, other.window) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        }
    }

    /// Catalog duration, falling back to the clock window.
    pub fn effective_duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
            .or_else(|| self.window.map(|w| w.minutes()))
    }

    /// Build from a raw record.
    pub fn from_record(record: &SectionRecord, course_title: &str) -> CatalogResult<Self> {
        let context = record.section_id.as_str();
        let window = parse_window(record.begin.as_deref(), record.end.as_deref(), context)?;
        let days = match &record.days {
            Some(tokens) => DaySet::parse_tokens(tokens)?,
            None => DaySet::EMPTY,
        };
        let tag = record.section.clone().unwrap_or_else(|| {
            record
                .section_id
                .rsplit('-')
                .next()
                .unwrap_or_default()
                .to_string()
        });
        let meeting_type = record
            .meeting_type
            .as_deref()
            .and_then(MeetingType::from_tag)
            .unwrap_or_else(|| MeetingType::infer(course_title, &tag));

        Ok(Self {
            section_id: record.section_id.clone(),
            tag,
            days,
            window,
            duration_minutes: record.duration_minutes.or(window.map(|w| w.minutes())),
            meeting_type,
            requires_time_slot: record.requires_time_slot.unwrap_or(window.is_some()),
            instructors: record.instructors.clone(),
        })
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.window {
            Some(w) if !self.days.is_empty() => write!(f, "{} {} {}", self.section_id, self.days, w),
            _ => write!(f, "{} TBA", self.section_id),
        }
    }
}

fn is_tba(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("tba")
}

fn parse_window(
    begin: Option<&str>,
    end: Option<&str>,
    context: &str,
) -> CatalogResult<Option<TimeWindow>> {
    let begin = begin.filter(|b| !is_tba(b));
    let end = end.filter(|e| !is_tba(e));
    let (begin_raw, end_raw) = match (begin, end) {
        (None, None) => return Ok(None),
        (Some(b), Some(e)) => (b, e),
        (Some(_), None) | (None, Some(_)) => {
            return Err(CatalogError::MalformedTime {
                value: begin.or(end).unwrap_or_default().to_string(),
                context: format!("{context} (missing begin or end)"),
            });
        }
    };
    let parse = |raw: &str| {
        ClockTime::parse(raw).ok_or_else(|| CatalogError::MalformedTime {
            value: raw.to_string(),
            context: context.to_string(),
        })
    };
    let (b, e) = (parse(begin_raw)?, parse(end_raw)?);
    TimeWindow::new(b, e)
        .map(Some)
        .ok_or_else(|| CatalogError::InvertedInterval {
            context: context.to_string(),
            begin: begin_raw.to_string(),
            end: end_raw.to_string(),
        })
}

/// Raw section row as produced by the ingestion pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    /// Section identifier.
    pub section_id: String,
    /// Short tag (`A`, `Lec`).
    #[serde(default)]
    pub section: Option<String>,
    /// Day letters.
    #[serde(default)]
    pub days: Option<Vec<String>>,
    /// Begin time (`HH:MM`, `hh:mmAM`, or `TBA`).
    #[serde(default)]
    pub begin: Option<String>,
    /// End time.
    #[serde(default)]
    pub end: Option<String>,
    /// Reported duration.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Meeting-type tag.
    #[serde(default)]
    pub meeting_type: Option<String>,
    /// Explicit slot requirement; inferred from `begin` when absent.
    #[serde(default)]
    pub requires_time_slot: Option<bool>,
    /// Instructors.
    #[serde(default)]
    pub instructors: Vec<String>,
}
