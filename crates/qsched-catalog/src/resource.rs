//! Rooms and instructors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A teaching room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    /// Room identifier, e.g. `HH-1107`.
    pub id: String,
    /// Seating capacity. `None` until filled from a synthetic draw.
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl Room {
    /// A room with known capacity.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            capacity: Some(capacity),
        }
    }

    /// A room whose capacity is not yet known.
    pub fn without_capacity(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capacity: None,
        }
    }

    /// True if the room seats at least `enrollment` students.
    pub fn fits(&self, enrollment: u32) -> bool {
        self.capacity.is_some_and(|cap| cap >= enrollment)
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.capacity {
            Some(cap) => write!(f, "{} ({cap} seats)", self.id),
            None => write!(f, "{} (capacity unknown)", self.id),
        }
    }
}

/// An instructor. Identity is the name as it appears in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instructor(pub String);

impl Instructor {
    /// Wrap a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The instructor's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Instructor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
