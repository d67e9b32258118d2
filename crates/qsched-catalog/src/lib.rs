//! `qsched-catalog`: course catalog model for timetable optimization.
//!
//! Holds the read-only inputs shared by both formulations:
//!
//! - **Courses and sections** with meeting days and `[begin, end)` windows
//! - **Interval model**: two sections conflict iff they share a day and
//!   their windows overlap; TBA sections never conflict
//! - **Rooms and instructors** for the integer-program path
//! - **Time grid**: discretized `(day, slot)` cells and duration rounding
//! - **Synthetic data**: seeded fill for missing enrollment and capacity
//!
//! # Quick start
//!
//! ```rust
//! use qsched_catalog::{Day, Section};
//!
//! let a = Section::meeting("18100-A", &[Day::Mon, Day::Wed], "09:00", "10:20").unwrap();
//! let b = Section::meeting("18213-B", &[Day::Wed], "10:00", "11:00").unwrap();
//! let c = Section::unscheduled("48599-A");
//!
//! assert!(a.overlaps(&b));
//! assert!(!a.overlaps(&c));
//! ```

pub mod course;
pub mod error;
pub mod grid;
pub mod resource;
pub mod section;
pub mod synthetic;
pub mod time;

pub use course::{Catalog, Course, CourseRecord};
pub use error::{CatalogError, CatalogResult};
pub use grid::{GridConfig, TimeGrid, TimeSlot};
pub use resource::{Instructor, Room};
pub use section::{MeetingType, Section, SectionRecord};
pub use synthetic::{Synthetic, SyntheticRanges};
pub use time::{ClockTime, Day, DaySet, TimeWindow};
