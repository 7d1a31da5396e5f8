//! Port traits: the hexagonal boundary between the feeder core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ FeederSystem (domain)
//! ```
//!
//! Driven adapters (motor, sensors, clock, config storage) implement these
//! traits. The feeder core holds them as `Arc<dyn …>` so the scheduler and
//! monitor threads can share one instance; every port is therefore
//! `Send + Sync` and takes `&self`, with implementations serialising
//! internally.

use chrono::{DateTime, Local};

use crate::app::state::Interlock;
use crate::config::FeederConfig;
use crate::error::{ActuatorError, SensorError};
use crate::schedule::ScheduleEntry;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → motor)
// ───────────────────────────────────────────────────────────────

/// Motor rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Auger turns to push food out of the hopper.
    Forward,
    /// Auger backs off (jam clearing).
    Reverse,
}

/// Write-side port: the domain calls this to drive the feeder motor.
pub trait ActuatorPort: Send + Sync {
    /// Drive the motor at full duty in `direction`.
    ///
    /// Implementations must check `interlock` under the same lock that
    /// [`stop`](Self::stop) takes, and refuse with
    /// [`ActuatorError::InterlockEngaged`] when it is engaged.
    fn start(&self, direction: Direction, interlock: &Interlock) -> Result<(), ActuatorError>;

    /// De-assert drive. Idempotent; safe from shutdown and `Drop` paths.
    fn stop(&self) -> Result<(), ActuatorError>;

    /// Set duty (0–255) without touching run or direction state.
    fn set_speed(&self, speed: u8) -> Result<(), ActuatorError>;

    /// Last commanded running state (not hardware-verified).
    fn is_running(&self) -> bool;

    /// Enable-line duty last driven (0-255). `start` drives full duty and
    /// `stop` drops it to zero, so this can differ from the last `set_speed`.
    fn duty(&self) -> u8;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: point-in-time sensor readings.
pub trait SensorPort: Send + Sync {
    /// Calibrated food mass in the hopper (grams).
    fn read_mass(&self) -> f32;

    /// Tank water temperature (°C).
    fn read_temperature(&self) -> f32;

    /// Re-derive the scale factor from a known mass currently on the scale.
    /// Returns the new factor.
    fn calibrate_scale(&self, known_grams: f32) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Raw hardware channels (below the sensor drivers)
// ───────────────────────────────────────────────────────────────

/// Raw mass transducer channel, before zero offset and calibration.
pub trait MassChannel: Send {
    fn read_raw(&mut self) -> f32;
}

/// Temperature probe returning degrees Celsius.
///
/// Fault values (probe disconnected, out of range) are whatever the probe
/// returns; the core compares them against thresholds like any other value.
pub trait Thermometer: Send {
    fn read_celsius(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for schedule evaluation and log timestamps.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Receives due schedule entries from the scheduler loop.
///
/// Called synchronously on the scheduler thread; the loop does not evaluate
/// further entries until this returns.
pub trait SchedulerDelegate: Send + Sync {
    fn on_entry_due(&self, entry: &ScheduleEntry);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists feeder configuration.
///
/// Implementations MUST validate before persisting and reject invalid
/// values with [`ConfigError::ValidationFailed`] rather than clamping them.
pub trait ConfigPort {
    /// Load configuration. Returns [`ConfigError::NotFound`] when no stored
    /// configuration exists; callers decide whether to fall back to defaults.
    fn load(&self) -> Result<FeederConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &FeederConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first run).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
