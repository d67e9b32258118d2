//! Courses and the catalog they live in.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::section::{Section, SectionRecord};

/// A course offering with its ordered candidate sections.
///
/// Immutable once loaded. The section order is significant: a section's
/// ordinal position is part of its decision-variable name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Course identifier (catalog number).
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Unit count, if published.
    pub units: Option<f64>,
    /// Candidate sections; exactly one is to be selected.
    pub sections: Vec<Section>,
    /// Mandatory meeting attended regardless of the chosen section.
    pub primary: Option<Section>,
    /// False for courses with no timed meetings at all.
    pub requires_time_slot: bool,
}

impl Course {
    /// Create a course with no sections.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            units: None,
            sections: Vec::new(),
            primary: None,
            requires_time_slot: true,
        }
    }

    /// Append a candidate section.
    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Set the mandatory primary meeting.
    #[must_use]
    pub fn with_primary(mut self, primary: Section) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Set the unit count.
    #[must_use]
    pub fn with_units(mut self, units: f64) -> Self {
        self.units = Some(units);
        self
    }

    /// Override the slot requirement flag.
    #[must_use]
    pub fn with_requires_time_slot(mut self, requires: bool) -> Self {
        self.requires_time_slot = requires;
        self
    }

    /// Number of candidate sections.
    pub fn num_sections(&self) -> usize {
        self.sections.len()
    }

    /// Build from a raw record.
    pub fn from_record(record: &CourseRecord) -> CatalogResult<Self> {
        let sections = record
            .sections
            .iter()
            .map(|s| Section::from_record(s, &record.title))
            .collect::<CatalogResult<Vec<_>>>()?;
        let primary = record
            .primary
            .as_ref()
            .filter(|_| record.is_primary_required.unwrap_or(true))
            .map(|p| Section::from_record(p, &record.title))
            .transpose()?;

        // Internships and independent study have no timed meeting anywhere
        let inferred = primary.as_ref().is_some_and(|p| p.window.is_some())
            || sections.iter().any(|s| s.window.is_some());

        Ok(Self {
            id: record.course.clone(),
            title: record.title.clone(),
            units: record.units,
            sections,
            primary,
            requires_time_slot: record.requires_time_slot.unwrap_or(inferred),
        })
    }
}

/// Raw course row as produced by the ingestion pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Course number.
    pub course: String,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Units.
    #[serde(default)]
    pub units: Option<f64>,
    /// Mandatory lecture, if any.
    #[serde(default)]
    pub primary: Option<SectionRecord>,
    /// Candidate sections.
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
    /// Explicit slot requirement.
    #[serde(default)]
    pub requires_time_slot: Option<bool>,
    /// Whether `primary` must be attended; an optional primary is dropped.
    #[serde(default)]
    pub is_primary_required: Option<bool>,
}

/// An ordered, validated list of courses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    /// Wrap already-built courses, rejecting duplicate course ids.
    pub fn new(courses: Vec<Course>) -> CatalogResult<Self> {
        let mut seen = FxHashSet::default();
        for course in &courses {
            if !seen.insert(course.id.as_str()) {
                return Err(CatalogError::DuplicateCourse(course.id.clone()));
            }
        }
        Ok(Self { courses })
    }

    /// Validate and convert raw records.
    pub fn from_records(records: &[CourseRecord]) -> CatalogResult<Self> {
        let courses = records
            .iter()
            .map(Course::from_record)
            .collect::<CatalogResult<Vec<_>>>()?;
        let catalog = Self::new(courses)?;
        debug!(
            courses = catalog.len(),
            sections = catalog.num_sections(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// Courses in input order.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Number of courses.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// True if there are no courses.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Total candidate sections over all courses.
    pub fn num_sections(&self) -> usize {
        self.courses.iter().map(Course::num_sections).sum()
    }

    /// Look up a course by id.
    pub fn get(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }
}
