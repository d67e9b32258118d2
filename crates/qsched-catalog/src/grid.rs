//! The discretized weekly time grid used by the integer-program path.
//!
//! Each teaching day is split into `slots_per_day` equal slots starting at
//! `first_hour`. A meeting lasting `m` minutes occupies
//! `max(1, ceil(m / slot_minutes))` contiguous slots on one day.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::time::{ClockTime, Day};

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Days the grid spans, in order.
    pub days: Vec<Day>,
    /// First hour of the teaching day.
    pub first_hour: u16,
    /// Hour at which the teaching day ends (exclusive).
    pub last_hour: u16,
    /// Slot length in minutes.
    pub slot_minutes: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            days: Day::ALL.to_vec(),
            first_hour: 8,
            last_hour: 22,
            slot_minutes: 60,
        }
    }
}

impl GridConfig {
    /// Set the teaching days.
    #[must_use]
    pub fn with_days(mut self, days: Vec<Day>) -> Self {
        self.days = days;
        self
    }

    /// Set the `[first_hour, last_hour)` teaching window.
    #[must_use]
    pub fn with_hours(mut self, first_hour: u16, last_hour: u16) -> Self {
        self.first_hour = first_hour;
        self.last_hour = last_hour;
        self
    }

    /// Set the slot length.
    #[must_use]
    pub fn with_slot_minutes(mut self, slot_minutes: u32) -> Self {
        self.slot_minutes = slot_minutes;
        self
    }
}

/// One `(day, slot index)` cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Day of the cell.
    pub day: Day,
    /// Slot position within the day, 0-based.
    pub index: usize,
}

impl TimeSlot {
    /// Create a slot.
    pub fn new(day: Day, index: usize) -> Self {
        Self { day, index }
    }
}

/// A validated weekly grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeGrid {
    config: GridConfig,
    slots_per_day: usize,
}

impl TimeGrid {
    /// Validate a configuration.
    pub fn new(config: GridConfig) -> CatalogResult<Self> {
        if config.slot_minutes == 0 {
            return Err(CatalogError::InvalidGrid("slot length is zero".into()));
        }
        if config.last_hour > 24 || config.first_hour >= config.last_hour {
            return Err(CatalogError::InvalidGrid(format!(
                "teaching hours [{}, {}) are empty or out of range",
                config.first_hour, config.last_hour
            )));
        }
        if config.days.is_empty() {
            return Err(CatalogError::InvalidGrid("no teaching days".into()));
        }
        let span = u32::from(config.last_hour - config.first_hour) * 60;
        let slots_per_day = (span / config.slot_minutes) as usize;
        if slots_per_day == 0 {
            return Err(CatalogError::InvalidGrid(format!(
                "{}-minute slots do not fit in the teaching day",
                config.slot_minutes
            )));
        }
        Ok(Self {
            config,
            slots_per_day,
        })
    }

    /// The configuration this grid was built from.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Grid days in order.
    pub fn days(&self) -> &[Day] {
        &self.config.days
    }

    /// Number of slots in one day.
    pub fn slots_per_day(&self) -> usize {
        self.slots_per_day
    }

    /// Slot length in minutes.
    pub fn slot_minutes(&self) -> u32 {
        self.config.slot_minutes
    }

    /// Total number of cells.
    pub fn num_slots(&self) -> usize {
        self.slots_per_day * self.config.days.len()
    }

    /// All cells in day-major order.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        self.config
            .days
            .iter()
            .flat_map(move |&day| (0..self.slots_per_day).map(move |i| TimeSlot::new(day, i)))
    }

    /// Slots needed for a meeting of `minutes`. Unknown durations take one slot.
    pub fn duration_slots(&self, minutes: Option<u32>) -> usize {
        match minutes {
            Some(m) => m.div_ceil(self.config.slot_minutes).max(1) as usize,
            None => 1,
        }
    }

    /// Valid start indices for a meeting of `duration` slots.
    pub fn start_indices(&self, duration: usize) -> std::ops::Range<usize> {
        0..(self.slots_per_day + 1).saturating_sub(duration)
    }

    /// Wall-clock start of a slot index.
    pub fn slot_start(&self, index: usize) -> ClockTime {
        let minutes =
            u32::from(self.config.first_hour) * 60 + index as u32 * self.config.slot_minutes;
        ClockTime::saturating_from_minutes(minutes)
    }

    /// Label such as `Mon_09:00`.
    pub fn label(&self, slot: TimeSlot) -> String {
        format!("{}_{}", slot.day.short_name(), self.slot_start(slot.index))
    }
}

impl fmt::Display for TimeGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} days x {} slots of {} min from {:02}:00",
            self.config.days.len(),
            self.slots_per_day,
            self.config.slot_minutes,
            self.config.first_hour
        )
    }
}
