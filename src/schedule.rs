//! Feeding schedule entries.
//!
//! An entry is a declarative time-of-day rule: at `HH:MM`, run the auger for
//! `duration` and expect `target_grams` to leave the hopper. Entries carry no
//! memory of having fired; same-minute dedup belongs to the scheduler loop.

use core::fmt;
use core::time::Duration;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// A validated schedule rule. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduleEntry {
    hour: u8,
    minute: u8,
    duration_ms: u32,
    target_grams: f32,
}

impl ScheduleEntry {
    /// Build an entry, rejecting impossible clock values, a zero duration and
    /// non-positive or non-finite targets.
    pub fn new(
        hour: u8,
        minute: u8,
        duration_ms: u32,
        target_grams: f32,
    ) -> Result<Self, ScheduleError> {
        if hour > 23 {
            return Err(ScheduleError::InvalidHour(hour));
        }
        if minute > 59 {
            return Err(ScheduleError::InvalidMinute(minute));
        }
        if duration_ms == 0 {
            return Err(ScheduleError::ZeroDuration);
        }
        if !target_grams.is_finite() || target_grams <= 0.0 {
            return Err(ScheduleError::InvalidTarget);
        }
        Ok(Self {
            hour,
            minute,
            duration_ms,
            target_grams,
        })
    }

    /// True iff `now` falls in this entry's wall-clock minute.
    pub fn is_due(&self, now: &impl Timelike) -> bool {
        now.hour() == u32::from(self.hour) && now.minute() == u32::from(self.minute)
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.duration_ms))
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn target_grams(&self) -> f32 {
        self.target_grams
    }
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02} for {}ms, {:.2}g",
            self.hour, self.minute, self.duration_ms, self.target_grams
        )
    }
}

/// Unvalidated schedule as it appears in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSpec {
    pub hour: u8,
    pub minute: u8,
    pub duration_ms: u32,
    pub target_grams: f32,
}

impl ScheduleSpec {
    pub fn to_entry(&self) -> Result<ScheduleEntry, ScheduleError> {
        ScheduleEntry::new(self.hour, self.minute, self.duration_ms, self.target_grams)
    }
}

impl From<ScheduleEntry> for ScheduleSpec {
    fn from(e: ScheduleEntry) -> Self {
        Self {
            hour: e.hour,
            minute: e.minute,
            duration_ms: e.duration_ms,
            target_grams: e.target_grams,
        }
    }
}
