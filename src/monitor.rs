//! Tank health monitor.
//!
//! Each period the monitor reads temperature and hopper mass and raises an
//! alert for every reading outside its band. Alerts are not latched or
//! deduplicated: a condition that persists is reported again every period
//! until it clears. The monitor never drives the motor and ignores the
//! interlock.

use core::time::Duration;
use std::sync::Arc;

use log::{debug, info};

use crate::app::events::FeederEvent;
use crate::app::journal::Journal;
use crate::app::ports::SensorPort;
use crate::app::state::SystemState;
use crate::config::FeederConfig;
use crate::shutdown::ShutdownListener;

/// At most one alert per reading kind per check.
pub const MAX_ALERTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alert {
    Temperature { celsius: f32 },
    LowFood { grams: f32 },
}

impl From<Alert> for FeederEvent {
    fn from(a: Alert) -> Self {
        match a {
            Alert::Temperature { celsius } => FeederEvent::TemperatureAlert { celsius },
            Alert::LowFood { grams } => FeederEvent::LowFoodAlert { grams },
        }
    }
}

/// Acceptable bands for the monitored readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub min_temperature_c: f32,
    pub max_temperature_c: f32,
    pub low_food_grams: f32,
}

impl Thresholds {
    pub fn from_config(config: &FeederConfig) -> Self {
        Self {
            min_temperature_c: config.min_temperature_c,
            max_temperature_c: config.max_temperature_c,
            low_food_grams: config.low_food_grams,
        }
    }

    /// Pure evaluation. Band edges are in range.
    pub fn evaluate(&self, celsius: f32, grams: f32) -> heapless::Vec<Alert, MAX_ALERTS> {
        let mut alerts = heapless::Vec::new();
        // NaN from a faulty probe is not inside the band either.
        let temp_ok = (self.min_temperature_c..=self.max_temperature_c).contains(&celsius);
        if !temp_ok {
            let _ = alerts.push(Alert::Temperature { celsius });
        }
        if grams < self.low_food_grams {
            let _ = alerts.push(Alert::LowFood { grams });
        }
        alerts
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&FeederConfig::default())
    }
}

pub struct MonitorLoop {
    state: Arc<SystemState>,
    sensors: Arc<dyn SensorPort>,
    journal: Arc<Journal>,
    thresholds: Thresholds,
    interval: Duration,
}

impl MonitorLoop {
    pub fn new(
        state: Arc<SystemState>,
        sensors: Arc<dyn SensorPort>,
        journal: Arc<Journal>,
        thresholds: Thresholds,
        interval: Duration,
    ) -> Self {
        Self {
            state,
            sensors,
            journal,
            thresholds,
            interval,
        }
    }

    /// Read, evaluate and journal one round of alerts.
    pub fn check(&self) -> heapless::Vec<Alert, MAX_ALERTS> {
        let celsius = self.sensors.read_temperature();
        let grams = self.sensors.read_mass();
        debug!("Monitor: {:.2}°C, {:.2}g", celsius, grams);

        let alerts = self.thresholds.evaluate(celsius, grams);
        for alert in &alerts {
            self.journal.emit(&FeederEvent::from(*alert));
        }
        alerts
    }

    pub fn run(&self, shutdown: &ShutdownListener) {
        info!("Monitor: loop started (every {}s)", self.interval.as_secs());
        while self.state.is_running() {
            self.check();
            if shutdown.sleep(self.interval) {
                break;
            }
        }
        info!("Monitor: loop exited");
    }
}
