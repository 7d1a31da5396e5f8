//! System configuration parameters
//!
//! All tunable parameters for the feeder. Values are loaded from a JSON file
//! through [`ConfigPort`](crate::app::ports::ConfigPort); every field has a
//! default so partial files are accepted.

use core::time::Duration;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins;
use crate::schedule::ScheduleSpec;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederConfig {
    // --- Hardware ---
    /// GPIO assignments.
    pub pins: PinConfig,

    // --- Journal ---
    /// Append-only text log of events and feeding outcomes.
    pub log_path: PathBuf,

    // --- Timing ---
    /// Scheduler poll interval between passes (seconds)
    pub scheduler_poll_secs: u32,
    /// Pause after a scheduled feed before checking further entries (seconds)
    pub post_feed_pause_secs: u32,
    /// Monitor loop period (seconds)
    pub monitor_interval_secs: u32,

    // --- Health thresholds ---
    /// Lowest acceptable tank temperature (Celsius)
    pub min_temperature_c: f32,
    /// Highest acceptable tank temperature (Celsius)
    pub max_temperature_c: f32,
    /// Hopper mass below which a low-food alert is raised (grams)
    pub low_food_grams: f32,

    // --- Dispensing ---
    /// Fraction of the target mass that counts as a successful feed
    pub success_tolerance: f32,

    // --- Scale ---
    /// Raw reading of the empty scale
    pub scale_zero_offset: f32,
    /// Grams per raw unit
    pub scale_calibration_factor: f32,

    /// Simulated hopper used by the host build.
    pub simulation: SimulationConfig,

    /// Feeding times loaded at startup.
    pub schedules: Vec<ScheduleSpec>,
}

/// GPIO pin map (BCM numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub motor_run: u8,
    pub motor_enable: u8,
    pub motor_direction: u8,
    pub food_sensor: u8,
    pub temperature_sensor: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            motor_run: pins::MOTOR_RUN_GPIO,
            motor_enable: pins::MOTOR_ENABLE_GPIO,
            motor_direction: pins::MOTOR_DIR_GPIO,
            food_sensor: pins::FOOD_SENSOR_GPIO,
            temperature_sensor: pins::TEMP_SENSOR_GPIO,
        }
    }
}

impl PinConfig {
    /// Every assigned pin, in a fixed order.
    pub fn all(&self) -> [u8; 5] {
        [
            self.motor_run,
            self.motor_enable,
            self.motor_direction,
            self.food_sensor,
            self.temperature_sensor,
        ]
    }
}

/// Parameters of the simulated hopper.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Food in the hopper at startup (grams)
    pub hopper_grams: f32,
    /// Dispense rate at full motor duty (grams per second)
    pub dispense_rate_g_per_s: f32,
    /// Simulated tank temperature (Celsius)
    pub water_temperature_c: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            hopper_grams: 500.0,
            dispense_rate_g_per_s: 2.5,
            water_temperature_c: 25.0,
        }
    }
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            pins: PinConfig::default(),
            log_path: PathBuf::from("/var/log/fish_feeder.log"),

            // Timing
            scheduler_poll_secs: 10,
            post_feed_pause_secs: 60, // one due minute
            monitor_interval_secs: 60,

            // Health thresholds
            min_temperature_c: 18.0,
            max_temperature_c: 30.0,
            low_food_grams: 50.0,

            // Dispensing
            success_tolerance: 0.9,

            // Scale
            scale_zero_offset: 0.0,
            scale_calibration_factor: 1.0,

            simulation: SimulationConfig::default(),
            schedules: Vec::new(),
        }
    }
}

impl FeederConfig {
    pub fn scheduler_poll_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.scheduler_poll_secs))
    }

    pub fn post_feed_pause(&self) -> Duration {
        Duration::from_secs(u64::from(self.post_feed_pause_secs))
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.monitor_interval_secs))
    }

    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler_poll_secs == 0 || self.scheduler_poll_secs > 60 {
            return Err(ConfigError::ValidationFailed(
                "scheduler_poll_secs must be 1–60",
            ));
        }
        // The pause is what stops an entry firing twice in its due minute.
        if self.post_feed_pause_secs < 60 || self.post_feed_pause_secs > 3600 {
            return Err(ConfigError::ValidationFailed(
                "post_feed_pause_secs must be 60–3600",
            ));
        }
        if !(1..=3600).contains(&self.monitor_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "monitor_interval_secs must be 1–3600",
            ));
        }
        if !self.min_temperature_c.is_finite()
            || !self.max_temperature_c.is_finite()
            || self.min_temperature_c >= self.max_temperature_c
        {
            return Err(ConfigError::ValidationFailed(
                "min_temperature_c must be < max_temperature_c",
            ));
        }
        if !self.low_food_grams.is_finite() || self.low_food_grams < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "low_food_grams must be >= 0",
            ));
        }
        if !(self.success_tolerance > 0.0 && self.success_tolerance <= 1.0) {
            return Err(ConfigError::ValidationFailed(
                "success_tolerance must be in (0, 1]",
            ));
        }
        if !self.scale_zero_offset.is_finite() {
            return Err(ConfigError::ValidationFailed(
                "scale_zero_offset must be finite",
            ));
        }
        if !self.scale_calibration_factor.is_finite() || self.scale_calibration_factor == 0.0 {
            return Err(ConfigError::ValidationFailed(
                "scale_calibration_factor must be finite and non-zero",
            ));
        }
        if self.simulation.hopper_grams < 0.0 || self.simulation.dispense_rate_g_per_s < 0.0 {
            return Err(ConfigError::ValidationFailed(
                "simulation masses and rates must be >= 0",
            ));
        }
        if self.schedules.iter().any(|s| s.to_entry().is_err()) {
            return Err(ConfigError::ValidationFailed(
                "schedules contain an invalid entry",
            ));
        }
        Ok(())
    }
}
