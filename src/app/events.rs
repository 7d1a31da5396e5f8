//! Outbound feeder events and feeding outcomes.
//!
//! The feeder core emits these through the [`Journal`](super::journal::Journal).
//! Each event has a short type tag (the `[EventType]` column of the text log)
//! and a human-readable message.

use core::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::ActuatorError;
use crate::schedule::ScheduleEntry;

/// Capacity of an outcome note.
pub const NOTE_CAP: usize = 32;

/// Who asked for a feed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeedSource {
    Scheduled,
    Manual,
}

impl FeedSource {
    /// Note recorded on the outcome of a cycle from this source.
    pub fn note(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled feeding",
            Self::Manual => "Manual feed",
        }
    }
}

/// Result of one completed feed cycle. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedingOutcome {
    pub timestamp: DateTime<Local>,
    /// `before - after`; negative when the scale drifts upward.
    pub dispensed_grams: f32,
    pub temperature_c: f32,
    pub success: bool,
    pub note: heapless::String<NOTE_CAP>,
}

impl FeedingOutcome {
    pub fn new(
        timestamp: DateTime<Local>,
        dispensed_grams: f32,
        temperature_c: f32,
        success: bool,
        note: &str,
    ) -> Self {
        let mut n = heapless::String::new();
        let end = note
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .take_while(|&end| end <= NOTE_CAP)
            .last()
            .unwrap_or(0);
        let _ = n.push_str(&note[..end]);
        Self {
            timestamp,
            dispensed_grams,
            temperature_c,
            success,
            note: n,
        }
    }
}

/// Two-line audit record, as appended to the log file.
impl fmt::Display for FeedingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time: {}", ctime(&self.timestamp))?;
        write!(
            f,
            "Amount: {:.2}g, Temp: {:.2}\u{00b0}C, Success: {}, Notes: {}",
            self.dispensed_grams,
            self.temperature_c,
            if self.success { "Yes" } else { "No" },
            self.note
        )
    }
}

/// `ctime(3)`-style timestamp, e.g. `Wed Jun 30 21:49:08 1993`.
pub fn ctime(ts: &DateTime<Local>) -> impl fmt::Display + '_ {
    ts.format("%a %b %e %H:%M:%S %Y")
}

/// Structured events emitted by the feeder core.
#[derive(Debug, Clone, PartialEq)]
pub enum FeederEvent {
    /// Loops spawned.
    Started,
    /// Loops joined, motor stopped.
    Shutdown,
    ScheduleAdded(ScheduleEntry),
    ScheduleRemoved { index: usize, entry: ScheduleEntry },
    /// A cycle was refused by the interlock gate.
    FeedingSkipped { source: FeedSource },
    FeedingCompleted {
        dispensed_grams: f32,
        temperature_c: f32,
    },
    /// The motor could not be driven; the cycle was abandoned.
    FeedingFaulted {
        source: FeedSource,
        error: ActuatorError,
    },
    EmergencyStop,
    Resumed,
    TemperatureAlert { celsius: f32 },
    LowFoodAlert { grams: f32 },
    SpeedChanged { speed: u8 },
}

impl FeederEvent {
    /// Short tag written in the `[EventType]` column.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Started => "System started",
            Self::Shutdown => "System shutdown",
            Self::ScheduleAdded(_) => "Schedule added",
            Self::ScheduleRemoved { .. } => "Schedule removed",
            Self::FeedingSkipped { .. } => "Feeding skipped",
            Self::FeedingCompleted { .. } => "Feeding completed",
            Self::FeedingFaulted { .. } => "Feeding fault",
            Self::EmergencyStop => "Emergency stop",
            Self::Resumed => "System resumed",
            Self::TemperatureAlert { .. } => "Temperature alert",
            Self::LowFoodAlert { .. } => "Low food alert",
            Self::SpeedChanged { .. } => "Motor speed",
        }
    }

    /// Human-readable message body.
    pub fn message(&self) -> String {
        match self {
            Self::Started => "Feeding system is now active".into(),
            Self::Shutdown => "Feeding system stopped".into(),
            Self::ScheduleAdded(e) => format!(
                "Time: {:02}:{:02}, Amount: {:.2}g",
                e.hour(),
                e.minute(),
                e.target_grams()
            ),
            Self::ScheduleRemoved { index, entry } => format!("#{index} ({entry})"),
            Self::FeedingSkipped { source } => {
                format!("Emergency stop active ({})", source.note())
            }
            Self::FeedingCompleted {
                dispensed_grams,
                temperature_c,
            } => format!("Fed {dispensed_grams:.2}g at {temperature_c:.2}\u{00b0}C"),
            Self::FeedingFaulted { source, error } => {
                format!("{} abandoned: {error}", source.note())
            }
            Self::EmergencyStop => "System halted due to emergency".into(),
            Self::Resumed => "Emergency stop cleared".into(),
            Self::TemperatureAlert { celsius } => {
                format!("Current temp: {celsius:.2}\u{00b0}C")
            }
            Self::LowFoodAlert { grams } => format!("Current level: {grams:.2}g"),
            Self::SpeedChanged { speed } => format!("Duty set to {speed}/255"),
        }
    }

    /// Events an operator should notice (logged at `warn`).
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::FeedingSkipped { .. }
                | Self::FeedingFaulted { .. }
                | Self::EmergencyStop
                | Self::TemperatureAlert { .. }
                | Self::LowFoodAlert { .. }
        )
    }
}
