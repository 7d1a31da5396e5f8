//! Unified error types for the feeder controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! operator surface's error handling uniform. The per-subsystem enums are
//! `Copy` so they can be stored in cycle results and events without
//! allocation.

use core::fmt;

use crate::app::ports::ConfigError;
use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operator-facing operation funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// Hardware bring-up failed. Fatal at startup.
    Init(HwInitError),
    /// A motor command failed.
    Actuator(ActuatorError),
    /// A sensor operation failed.
    Sensor(SensorError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// A schedule entry was rejected.
    Schedule(ScheduleError),
    /// A loop task could not be spawned.
    Spawn(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Schedule(e) => write!(f, "schedule: {e}"),
            Self::Spawn(task) => write!(f, "failed to spawn {task} task"),
        }
    }
}

impl std::error::Error for Error {}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// Direction or run GPIO write failed.
    GpioWriteFailed,
    /// The emergency-stop interlock forbids driving the motor.
    InterlockEngaged,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::InterlockEngaged => write!(f, "interlock engaged"),
        }
    }
}

impl std::error::Error for ActuatorError {}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The reference mass or the raw reading cannot yield a usable factor.
    CalibrationFailed,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CalibrationFailed => write!(f, "calibration failed"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Schedule errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// Hour outside 0–23.
    InvalidHour(u8),
    /// Minute outside 0–59.
    InvalidMinute(u8),
    /// Feed duration must be at least one millisecond.
    ZeroDuration,
    /// Target mass must be a positive, finite number of grams.
    InvalidTarget,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHour(h) => write!(f, "hour {h} out of range 0-23"),
            Self::InvalidMinute(m) => write!(f, "minute {m} out of range 0-59"),
            Self::ZeroDuration => write!(f, "duration must be positive"),
            Self::InvalidTarget => write!(f, "target mass must be positive"),
        }
    }
}

impl std::error::Error for ScheduleError {}

impl From<ScheduleError> for Error {
    fn from(e: ScheduleError) -> Self {
        Self::Schedule(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
