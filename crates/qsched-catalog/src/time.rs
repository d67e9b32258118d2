//! Weekdays, day sets and wall-clock times.
//!
//! Catalog meetings happen on a subset of the teaching week (Mon..Fri) and
//! inside a `[begin, end)` window at minute resolution.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// A teaching day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    /// Monday.
    #[serde(alias = "M", alias = "Monday")]
    Mon,
    /// Tuesday.
    #[serde(alias = "T", alias = "Tuesday")]
    Tue,
    /// Wednesday.
    #[serde(alias = "W", alias = "Wednesday")]
    Wed,
    /// Thursday (catalog letter `R`).
    #[serde(alias = "R", alias = "Thursday")]
    Thu,
    /// Friday.
    #[serde(alias = "F", alias = "Friday")]
    Fri,
}

impl Day {
    /// All teaching days in calendar order.
    pub const ALL: [Day; 5] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri];

    /// Position in the week, Monday = 0.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Three-letter name used in slot labels.
    pub fn short_name(self) -> &'static str {
        match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
        }
    }

    /// Single-letter catalog code.
    pub fn letter(self) -> char {
        match self {
            Day::Mon => 'M',
            Day::Tue => 'T',
            Day::Wed => 'W',
            Day::Thu => 'R',
            Day::Fri => 'F',
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Day {
    type Err = CatalogError;

    fn from_str(s: &str) -> CatalogResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "mon" | "monday" => Ok(Day::Mon),
            "t" | "tue" | "tuesday" => Ok(Day::Tue),
            "w" | "wed" | "wednesday" => Ok(Day::Wed),
            "r" | "thu" | "thursday" => Ok(Day::Thu),
            "f" | "fri" | "friday" => Ok(Day::Fri),
            _ => Err(CatalogError::UnknownDay(s.to_string())),
        }
    }
}

/// A set of teaching days stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Day>", into = "Vec<Day>")]
pub struct DaySet(u8);

impl DaySet {
    /// The empty set.
    pub const EMPTY: DaySet = DaySet(0);

    /// Add a day.
    pub fn insert(&mut self, day: Day) {
        self.0 |= 1 << day.index();
    }

    /// Whether `day` is in the set.
    pub fn contains(self, day: Day) -> bool {
        self.0 & (1 << day.index()) != 0
    }

    /// True if no day is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Days present in both sets.
    pub fn intersection(self, other: DaySet) -> DaySet {
        DaySet(self.0 & other.0)
    }

    /// True if the sets share at least one day.
    pub fn intersects(self, other: DaySet) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Number of days in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the days in calendar order.
    pub fn iter(self) -> impl Iterator<Item = Day> {
        Day::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// Parse catalog day tokens (`["M", "W"]` or `["Mon", "Wed"]`).
    pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> CatalogResult<Self> {
        let mut set = DaySet::EMPTY;
        for token in tokens {
            let token = token.as_ref().trim();
            // A compact string like "MWF" arrives as one token
            if token.len() > 1 && token.chars().all(|c| "MTWRF".contains(c)) {
                for c in token.chars() {
                    set.insert(c.to_string().parse()?);
                }
            } else {
                set.insert(token.parse()?);
            }
        }
        Ok(set)
    }
}

impl FromIterator<Day> for DaySet {
    fn from_iter<T: IntoIterator<Item = Day>>(iter: T) -> Self {
        let mut set = DaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl From<Vec<Day>> for DaySet {
    fn from(days: Vec<Day>) -> Self {
        days.into_iter().collect()
    }
}

impl From<DaySet> for Vec<Day> {
    fn from(set: DaySet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in self.iter() {
            write!(f, "{}", day.letter())?;
        }
        Ok(())
    }
}

/// Wall-clock time of day with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Build from hours and minutes, `None` if out of range.
    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self(hour * 60 + minute))
    }

    /// Build from minutes after midnight, clamped to 23:59.
    pub fn saturating_from_minutes(minutes: u32) -> Self {
        Self(minutes.min(23 * 60 + 59) as u16)
    }

    /// Minutes after midnight.
    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    /// Hour component.
    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    /// Parse `HH:MM` (24-hour) or `hh:mmAM` / `hh:mm PM` (12-hour).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let parsed = NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%I:%M%p"))
            .or_else(|_| NaiveTime::parse_from_str(value, "%I:%M %p"))
            .ok()?;
        Self::from_hm(parsed.hour() as u16, parsed.minute() as u16)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = CatalogError;

    fn try_from(value: String) -> CatalogResult<Self> {
        ClockTime::parse(&value).ok_or(CatalogError::MalformedTime {
            value,
            context: "clock time".into(),
        })
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> Self {
        t.to_string()
    }
}

/// A half-open `[begin, end)` window on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start.
    pub begin: ClockTime,
    /// Exclusive end.
    pub end: ClockTime,
}

impl TimeWindow {
    /// Create a window; `None` unless `begin < end`.
    pub fn new(begin: ClockTime, end: ClockTime) -> Option<Self> {
        (begin < end).then_some(Self { begin, end })
    }

    /// Length in minutes.
    pub fn minutes(&self) -> u32 {
        self.end.minutes() - self.begin.minutes()
    }

    /// `[s1,e1)` and `[s2,e2)` overlap iff `!(e1 <= s2 || e2 <= s1)`.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        !(self.end <= other.begin || other.end <= self.begin)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.begin, self.end)
    }
}
