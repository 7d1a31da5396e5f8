//! Feed cycle executor.
//!
//! One routine for scheduled and manual feeds:
//!
//! ```text
//!  gate ──▶ baseline ──▶ start ─▶ sleep(duration) ─▶ stop ──▶ post ──▶ classify ──▶ record
//!   │                      │
//!   └─ interlock engaged   └─ pin failure / interlock race
//!      → Skipped              → stop, Faulted
//! ```
//!
//! The whole cycle runs under the executor's cycle lock, so two feeds never
//! overlap on the motor. The interlock path does not need that lock: it
//! engages the interlock and stops the motor directly.

use std::sync::{Arc, Mutex, PoisonError};

use log::{error, info};

use super::events::{FeedSource, FeederEvent, FeedingOutcome};
use super::journal::Journal;
use super::ports::{ActuatorPort, ClockPort, Direction, SchedulerDelegate, SensorPort};
use super::state::SystemState;
use crate::error::ActuatorError;
use crate::schedule::ScheduleEntry;
use core::time::Duration;

/// Fraction of the target that must leave the hopper for a feed to count.
pub const DEFAULT_TOLERANCE: f32 = 0.9;

/// `dispensed >= target * tolerance`. Negative `dispensed` always fails
/// against a positive target.
pub fn classify(dispensed_grams: f32, target_grams: f32, tolerance: f32) -> bool {
    dispensed_grams >= target_grams * tolerance
}

/// Parameters of one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedRequest {
    pub duration: Duration,
    pub target_grams: f32,
    pub source: FeedSource,
}

impl FeedRequest {
    pub fn scheduled(entry: &ScheduleEntry) -> Self {
        Self {
            duration: entry.duration(),
            target_grams: entry.target_grams(),
            source: FeedSource::Scheduled,
        }
    }

    pub fn manual(target_grams: f32, duration: Duration) -> Self {
        Self {
            duration,
            target_grams,
            source: FeedSource::Manual,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleResult {
    /// Motor ran; the outcome was recorded (successful or not).
    Completed(FeedingOutcome),
    /// Interlock engaged at the gate; the motor was never touched.
    Skipped,
    /// The motor could not be started; the cycle was abandoned.
    Faulted(ActuatorError),
}

impl CycleResult {
    pub fn outcome(&self) -> Option<&FeedingOutcome> {
        match self {
            Self::Completed(o) => Some(o),
            _ => None,
        }
    }
}

pub struct FeedExecutor {
    state: Arc<SystemState>,
    motor: Arc<dyn ActuatorPort>,
    sensors: Arc<dyn SensorPort>,
    journal: Arc<Journal>,
    clock: Arc<dyn ClockPort>,
    tolerance: f32,
    in_flight: Mutex<()>,
}

impl FeedExecutor {
    pub fn new(
        state: Arc<SystemState>,
        motor: Arc<dyn ActuatorPort>,
        sensors: Arc<dyn SensorPort>,
        journal: Arc<Journal>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            state,
            motor,
            sensors,
            journal,
            clock,
            tolerance: DEFAULT_TOLERANCE,
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Run one cycle to completion. Blocks for at least `req.duration`
    /// unless the gate refuses.
    pub fn execute(&self, req: FeedRequest) -> CycleResult {
        let _cycle = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        if self.state.is_interlocked() {
            self.journal
                .emit(&FeederEvent::FeedingSkipped { source: req.source });
            return CycleResult::Skipped;
        }

        let before = self.sensors.read_mass();
        info!(
            "Feed: {} for {}ms, target {:.2}g, baseline {:.2}g",
            req.source.note(),
            req.duration.as_millis(),
            req.target_grams,
            before
        );

        if let Err(e) = self.motor.start(Direction::Forward, self.state.interlock()) {
            error!("Feed: motor start failed: {}", e);
            // Some lines may already be driven.
            if let Err(stop_err) = self.motor.stop() {
                error!("Feed: motor stop failed: {}", stop_err);
            }
            self.journal.emit(&FeederEvent::FeedingFaulted {
                source: req.source,
                error: e,
            });
            return CycleResult::Faulted(e);
        }

        std::thread::sleep(req.duration);

        if let Err(e) = self.motor.stop() {
            error!("Feed: motor stop failed: {}", e);
        }

        let after = self.sensors.read_mass();
        let dispensed = before - after;
        let success = classify(dispensed, req.target_grams, self.tolerance);
        let temperature = self.sensors.read_temperature();

        let outcome = FeedingOutcome::new(
            self.clock.now(),
            dispensed,
            temperature,
            success,
            req.source.note(),
        );
        self.journal.record(outcome.clone());
        self.journal.emit(&FeederEvent::FeedingCompleted {
            dispensed_grams: dispensed,
            temperature_c: temperature,
        });

        CycleResult::Completed(outcome)
    }
}

impl SchedulerDelegate for FeedExecutor {
    fn on_entry_due(&self, entry: &ScheduleEntry) {
        self.execute(FeedRequest::scheduled(entry));
    }
}
