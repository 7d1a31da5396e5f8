//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns the weight and temperature drivers and exposes them to the
//! feeder core through [`SensorPort`].

pub mod temperature;
pub mod weight;

use crate::app::ports::{MassChannel, SensorPort, Thermometer};
use crate::error::SensorError;
use temperature::TemperatureSensor;
use weight::WeightSensor;

pub struct SensorHub<C, T> {
    pub weight: WeightSensor<C>,
    pub temperature: TemperatureSensor<T>,
}

impl<C: MassChannel, T: Thermometer> SensorHub<C, T> {
    pub fn new(weight: WeightSensor<C>, temperature: TemperatureSensor<T>) -> Self {
        Self {
            weight,
            temperature,
        }
    }
}

impl<C, T> SensorPort for SensorHub<C, T>
where
    C: MassChannel,
    T: Thermometer,
{
    fn read_mass(&self) -> f32 {
        self.weight.read_mass()
    }

    fn read_temperature(&self) -> f32 {
        self.temperature.read()
    }

    fn calibrate_scale(&self, known_grams: f32) -> Result<f32, SensorError> {
        self.weight.calibrate(known_grams)
    }
}
