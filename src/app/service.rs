//! Feeder system service, the hexagonal core.
//!
//! [`FeederSystem`] owns the shared state, the schedule book, the journal
//! and the feed executor, and runs the scheduler and monitor loops on their
//! own threads between [`start`](FeederSystem::start) and
//! [`shutdown`](FeederSystem::shutdown). Every operation takes `&self`, so
//! the operator surface can keep calling in while the loops run.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ Journal (log file)
//!                 │         FeederSystem         │
//! ActuatorPort ◀──│ Executor · Scheduler · Monitor│
//!                 └──────────────────────────────┘
//! ```

use core::fmt;
use core::time::Duration;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use log::{error, info, warn};
use serde::Serialize;

use crate::config::FeederConfig;
use crate::drivers::task::spawn_task;
use crate::error::{Error, Result};
use crate::monitor::{MonitorLoop, Thresholds};
use crate::pins::MOTOR_SPEED_FULL_SCALE;
use crate::schedule::{ScheduleEntry, ScheduleSpec};
use crate::scheduler::{ScheduleBook, SchedulerLoop};
use crate::shutdown::{ShutdownTrigger, shutdown_channel};

use super::events::{FeederEvent, FeedingOutcome, ctime};
use super::executor::{CycleResult, FeedExecutor, FeedRequest};
use super::journal::Journal;
use super::ports::{ActuatorPort, ClockPort, SensorPort};
use super::state::SystemState;

const LOOP_STACK_KB: usize = 64;

// ───────────────────────────────────────────────────────────────
// Wiring types
// ───────────────────────────────────────────────────────────────

/// Driven hardware ports handed to the system at construction.
#[derive(Clone)]
pub struct Hardware {
    pub motor: Arc<dyn ActuatorPort>,
    pub sensors: Arc<dyn SensorPort>,
}

/// Loop cadences. Taken from config; tests shorten them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    pub scheduler_poll: Duration,
    pub post_feed_pause: Duration,
    pub monitor_interval: Duration,
}

impl LoopTiming {
    pub fn from_config(config: &FeederConfig) -> Self {
        Self {
            scheduler_poll: config.scheduler_poll_interval(),
            post_feed_pause: config.post_feed_pause(),
            monitor_interval: config.monitor_interval(),
        }
    }
}

struct Runtime {
    trigger: ShutdownTrigger,
    handles: Vec<JoinHandle<()>>,
}

impl Runtime {
    fn stop(mut self) {
        self.trigger.fire();
        for handle in self.handles {
            let name = handle.thread().name().unwrap_or("loop").to_owned();
            if handle.join().is_err() {
                error!("FeederSystem: '{}' thread panicked", name);
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Status snapshot
// ───────────────────────────────────────────────────────────────

/// Point-in-time view for the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub running: bool,
    pub emergency_stop: bool,
    pub motor_running: bool,
    /// Enable-line duty actually driven, not the last requested speed.
    pub motor_duty: u8,
    pub temperature_c: f32,
    pub food_grams: f32,
    pub schedules: usize,
    pub feedings: usize,
    pub last_feeding: Option<FeedingOutcome>,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yes_no = |b: bool| if b { "Yes" } else { "No" };
        writeln!(f, "=== Fish Feeder System Status ===")?;
        writeln!(f, "System Running: {}", yes_no(self.running))?;
        writeln!(
            f,
            "Emergency Stop: {}",
            if self.emergency_stop { "Active" } else { "Inactive" }
        )?;
        writeln!(
            f,
            "Motor Status: {} (duty {}/{})",
            if self.motor_running { "Running" } else { "Stopped" },
            self.motor_duty,
            MOTOR_SPEED_FULL_SCALE
        )?;
        writeln!(f, "Tank Temperature: {:.2}\u{00b0}C", self.temperature_c)?;
        writeln!(f, "Food Level: {:.2}g", self.food_grams)?;
        writeln!(f, "Scheduled Feedings: {}", self.schedules)?;
        writeln!(f, "Feedings Recorded: {}", self.feedings)?;
        if let Some(last) = &self.last_feeding {
            writeln!(
                f,
                "Last Feeding: {} ({:.2}g, {})",
                ctime(&last.timestamp),
                last.dispensed_grams,
                if last.success { "ok" } else { "short" }
            )?;
        }
        write!(f, "================================")
    }
}

// ───────────────────────────────────────────────────────────────
// FeederSystem
// ───────────────────────────────────────────────────────────────

pub struct FeederSystem {
    state: Arc<SystemState>,
    book: Arc<ScheduleBook>,
    motor: Arc<dyn ActuatorPort>,
    sensors: Arc<dyn SensorPort>,
    journal: Arc<Journal>,
    clock: Arc<dyn ClockPort>,
    executor: Arc<FeedExecutor>,
    thresholds: Thresholds,
    timing: LoopTiming,
    runtime: Mutex<Option<Runtime>>,
}

impl FeederSystem {
    /// Build a stopped system. Schedules are not loaded from `config`; the
    /// caller adds them so each one is journaled.
    pub fn new(
        config: &FeederConfig,
        hardware: Hardware,
        clock: Arc<dyn ClockPort>,
        log_out: Box<dyn Write + Send>,
    ) -> Self {
        let state = Arc::new(SystemState::new());
        let journal = Arc::new(Journal::new(log_out, clock.clone()));
        let executor = Arc::new(
            FeedExecutor::new(
                state.clone(),
                hardware.motor.clone(),
                hardware.sensors.clone(),
                journal.clone(),
                clock.clone(),
            )
            .with_tolerance(config.success_tolerance),
        );

        Self {
            state,
            book: Arc::new(ScheduleBook::new()),
            motor: hardware.motor,
            sensors: hardware.sensors,
            journal,
            clock,
            executor,
            thresholds: Thresholds::from_config(config),
            timing: LoopTiming::from_config(config),
            runtime: Mutex::new(None),
        }
    }

    pub fn with_timing(mut self, timing: LoopTiming) -> Self {
        self.timing = timing;
        self
    }

    // ── Schedules ─────────────────────────────────────────────

    pub fn add_schedule(&self, entry: ScheduleEntry) -> usize {
        let index = self.book.add(entry);
        self.journal.emit(&FeederEvent::ScheduleAdded(entry));
        index
    }

    /// Validate and add every configured slot, in order. Stops at the first
    /// invalid slot; slots before it stay added.
    pub fn load_schedules(&self, slots: &[ScheduleSpec]) -> Result<usize> {
        for slot in slots {
            self.add_schedule(slot.to_entry()?);
        }
        Ok(slots.len())
    }

    /// Remove by index. Out-of-range indices change nothing.
    pub fn remove_schedule(&self, index: usize) -> Option<ScheduleEntry> {
        let entry = self.book.remove(index)?;
        self.journal
            .emit(&FeederEvent::ScheduleRemoved { index, entry });
        Some(entry)
    }

    pub fn schedules(&self) -> Vec<ScheduleEntry> {
        self.book.snapshot()
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Spawn the scheduler and monitor loops. No-op if already running.
    pub fn start(&self) -> Result<()> {
        let mut runtime = self.lock_runtime();
        if !self.state.try_begin_running() {
            return Ok(());
        }
        self.state.interlock().release();

        let (trigger, listener) = shutdown_channel();
        let mut rt = Runtime {
            trigger,
            handles: Vec::with_capacity(2),
        };

        let scheduler = SchedulerLoop::new(
            self.book.clone(),
            self.state.clone(),
            self.clock.clone(),
            self.executor.clone(),
            self.timing.scheduler_poll,
            self.timing.post_feed_pause,
        );
        let l = listener.clone();
        match spawn_task("feeder-sched", LOOP_STACK_KB, move || scheduler.run(&l)) {
            Ok(h) => rt.handles.push(h),
            Err(e) => {
                error!("FeederSystem: scheduler spawn failed: {}", e);
                self.state.set_running(false);
                rt.stop();
                return Err(Error::Spawn("scheduler"));
            }
        }

        let monitor = MonitorLoop::new(
            self.state.clone(),
            self.sensors.clone(),
            self.journal.clone(),
            self.thresholds,
            self.timing.monitor_interval,
        );
        match spawn_task("feeder-monitor", LOOP_STACK_KB, move || monitor.run(&listener)) {
            Ok(h) => rt.handles.push(h),
            Err(e) => {
                error!("FeederSystem: monitor spawn failed: {}", e);
                self.state.set_running(false);
                rt.stop();
                return Err(Error::Spawn("monitor"));
            }
        }

        *runtime = Some(rt);
        drop(runtime);
        self.journal.emit(&FeederEvent::Started);
        Ok(())
    }

    /// Stop both loops and the motor. Idempotent.
    ///
    /// A feed cycle in progress finishes its timed run before the scheduler
    /// thread can be joined; the motor itself is stopped immediately.
    pub fn shutdown(&self) {
        let mut runtime = self.lock_runtime();
        let was_running = self.state.is_running();
        self.state.set_running(false);
        self.state.interlock().engage();
        if let Err(e) = self.motor.stop() {
            warn!("FeederSystem: motor stop on shutdown failed: {}", e);
        }

        let rt = runtime.take();
        let had_loops = rt.is_some();
        if let Some(rt) = rt {
            rt.stop();
        }
        drop(runtime);

        if was_running || had_loops {
            self.journal.emit(&FeederEvent::Shutdown);
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    // ── Feeding ───────────────────────────────────────────────

    /// Run one manual cycle on the caller's thread. Blocks for `duration`
    /// (and behind any cycle already in flight).
    pub fn manual_feed(&self, target_grams: f32, duration: Duration) -> CycleResult {
        self.executor
            .execute(FeedRequest::manual(target_grams, duration))
    }

    pub fn history(&self) -> Vec<FeedingOutcome> {
        self.journal.history()
    }

    // ── Interlock ─────────────────────────────────────────────

    /// Engage the interlock, then stop the motor unconditionally.
    pub fn trigger_emergency_stop(&self) {
        self.state.interlock().engage();
        if let Err(e) = self.motor.stop() {
            error!("FeederSystem: emergency motor stop failed: {}", e);
        }
        self.journal.emit(&FeederEvent::EmergencyStop);
    }

    /// Release the interlock. Does not restart stopped loops.
    pub fn resume_after_emergency(&self) {
        self.state.interlock().release();
        self.journal.emit(&FeederEvent::Resumed);
    }

    pub fn is_emergency_stopped(&self) -> bool {
        self.state.is_interlocked()
    }

    // ── Hardware ──────────────────────────────────────────────

    pub fn temperature(&self) -> f32 {
        self.sensors.read_temperature()
    }

    pub fn food_level(&self) -> f32 {
        self.sensors.read_mass()
    }

    pub fn set_motor_speed(&self, speed: u8) -> Result<()> {
        self.motor.set_speed(speed)?;
        self.journal.emit(&FeederEvent::SpeedChanged { speed });
        Ok(())
    }

    pub fn calibrate_scale(&self, known_grams: f32) -> Result<f32> {
        let factor = self.sensors.calibrate_scale(known_grams)?;
        info!("FeederSystem: scale factor now {}", factor);
        Ok(factor)
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            running: self.state.is_running(),
            emergency_stop: self.state.is_interlocked(),
            motor_running: self.motor.is_running(),
            motor_duty: self.motor.duty(),
            temperature_c: self.temperature(),
            food_grams: self.food_level(),
            schedules: self.book.len(),
            feedings: self.journal.outcome_count(),
            last_feeding: self.journal.last_outcome(),
        }
    }

    fn lock_runtime(&self) -> MutexGuard<'_, Option<Runtime>> {
        self.runtime.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for FeederSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}
