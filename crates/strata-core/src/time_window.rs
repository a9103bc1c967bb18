//! Half-open, timezone-aware time windows.
//!
//! A [`TimeWindow`] is the unit of coverage for time-partitioned spaces:
//! one window spans one or more contiguous schedule ticks. Windows carry
//! their timezone identity (`chrono_tz::Tz`) through every transformation,
//! because downstream rendering of a partition key depends on the local
//! wall-clock representation of the window's start.

use std::cmp::Ordering;
use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// An immutable half-open interval `[start, end)` of timezone-aware instants.
///
/// Invariant: `start < end`. Two windows are adjacent when one ends exactly
/// where the other begins; adjacent windows are expected to be merged by
/// their owners rather than stored side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Errors
    /// Returns [`Error::InvalidTimeWindow`] if `start >= end`.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self> {
        if start >= end {
            return Err(Error::invalid_time_window(format!(
                "start {start} must precede end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The inclusive start instant.
    #[must_use]
    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    /// The exclusive end instant.
    #[must_use]
    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    /// Returns true if `instant` falls within `[start, end)`.
    #[must_use]
    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        *instant >= self.start && *instant < self.end
    }

    /// Returns true if this window ends exactly where `other` begins,
    /// or vice versa.
    #[must_use]
    pub fn is_adjacent_to(&self, other: &Self) -> bool {
        self.end == other.start || other.end == self.start
    }

    /// Returns true if the two windows share any instant.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Merges two adjacent or overlapping windows into their union.
    ///
    /// # Errors
    /// Returns [`Error::InvalidMerge`] if the windows neither overlap nor
    /// touch; callers hitting this have violated a construction invariant.
    pub fn merge_with(&self, other: &Self) -> Result<Self> {
        if !self.overlaps(other) && !self.is_adjacent_to(other) {
            return Err(Error::invalid_merge(format!(
                "windows [{}, {}) and [{}, {}) neither overlap nor touch",
                self.start, self.end, other.start, other.end
            )));
        }
        let start = if self.start <= other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end >= other.end {
            self.end
        } else {
            other.end
        };
        Self::new(start, end)
    }
}

impl PartialOrd for TimeWindow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeWindow {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
