//! Tank water temperature sensor.

use std::sync::{Mutex, PoisonError};

use crate::app::ports::Thermometer;

pub struct TemperatureSensor<T> {
    probe: Mutex<T>,
}

impl<T: Thermometer> TemperatureSensor<T> {
    pub fn new(probe: T) -> Self {
        Self {
            probe: Mutex::new(probe),
        }
    }

    /// Degrees Celsius, unfiltered.
    pub fn read(&self) -> f32 {
        self.probe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_celsius()
    }
}
