//! Dense variable indexing for the section-selection formulation.
//!
//! One binary variable per `(course, candidate section)` pair, numbered in
//! catalog order. The name `course|section|ordinal` includes the section's
//! position in its course so duplicated source rows stay distinct.

use std::fmt;

use qsched_catalog::{Course, Section};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{QuboError, QuboResult};

/// Identity of one decision variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableKey {
    /// Course identifier.
    pub course_id: String,
    /// Section identifier.
    pub section_id: String,
    /// Position of the section in its course's list.
    pub ordinal: usize,
    /// Position of the course in the input list.
    pub course_pos: usize,
}

impl VariableKey {
    /// Composite variable name.
    pub fn name(&self) -> String {
        format!("{}|{}|{}", self.course_id, self.section_id, self.ordinal)
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.course_id, self.section_id, self.ordinal)
    }
}

/// Bidirectional `index <-> name` mapping, fixed for the lifetime of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableIndex {
    keys: Vec<VariableKey>,
    names: Vec<String>,
    lookup: FxHashMap<String, usize>,
    /// Variable ranges per course position; empty for skipped courses.
    groups: Vec<std::ops::Range<usize>>,
}

impl VariableIndex {
    /// Index every candidate section of every course.
    ///
    /// A course with no sections is skipped when it needs no time slot and is
    /// rejected otherwise. Colliding names are rejected.
    pub fn from_courses(courses: &[Course]) -> QuboResult<Self> {
        let mut index = Self::default();
        for (course_pos, course) in courses.iter().enumerate() {
            if course.sections.is_empty() {
                if course.requires_time_slot {
                    return Err(QuboError::MalformedInput(format!(
                        "course {} requires a time slot but has no candidate sections",
                        course.id
                    )));
                }
                debug!(course = %course.id, "skipping course without sections");
            }
            let start = index.keys.len();
            for (ordinal, section) in course.sections.iter().enumerate() {
                index.push(VariableKey {
                    course_id: course.id.clone(),
                    section_id: section.section_id.clone(),
                    ordinal,
                    course_pos,
                })?;
            }
            index.groups.push(start..index.keys.len());
        }
        debug!(variables = index.len(), courses = courses.len(), "indexed variables");
        Ok(index)
    }

    fn push(&mut self, key: VariableKey) -> QuboResult<()> {
        let name = key.name();
        let next = self.keys.len();
        if self.lookup.insert(name.clone(), next).is_some() {
            return Err(QuboError::MalformedInput(format!(
                "variable name '{name}' is not unique"
            )));
        }
        self.names.push(name);
        self.keys.push(key);
        Ok(())
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if no variables were created.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Name of variable `i`.
    pub fn name(&self, i: usize) -> Option<&str> {
        self.names.get(i).map(String::as_str)
    }

    /// Key of variable `i`.
    pub fn key(&self, i: usize) -> Option<&VariableKey> {
        self.keys.get(i)
    }

    /// Index of a variable name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    /// All names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All keys in index order.
    pub fn keys(&self) -> &[VariableKey] {
        &self.keys
    }

    /// Variable index ranges, one per input course.
    pub fn course_groups(&self) -> &[std::ops::Range<usize>] {
        &self.groups
    }

    /// The section a variable stands for.
    ///
    /// `courses` must be the list the index was built from.
    pub fn section<'a>(&self, i: usize, courses: &'a [Course]) -> Option<&'a Section> {
        let key = self.keys.get(i)?;
        courses.get(key.course_pos)?.sections.get(key.ordinal)
    }
}
