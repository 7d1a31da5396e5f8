//! Hopper load-cell sensor.
//!
//! Converts raw channel readings to grams:
//!
//! ```text
//! grams = (raw - zero_offset) * calibration_factor
//! ```
//!
//! Calibration parameters are stored as `f32` bit patterns in atomics so a
//! calibration never blocks a concurrent read for longer than the channel
//! lock.

use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use embedded_hal::digital::InputPin;
use log::{info, warn};

use crate::app::ports::MassChannel;
use crate::error::SensorError;

pub struct WeightSensor<C> {
    channel: Mutex<C>,
    zero_offset: AtomicU32,
    calibration_factor: AtomicU32,
}

impl<C: MassChannel> WeightSensor<C> {
    pub fn new(channel: C, zero_offset: f32, calibration_factor: f32) -> Self {
        Self {
            channel: Mutex::new(channel),
            zero_offset: AtomicU32::new(zero_offset.to_bits()),
            calibration_factor: AtomicU32::new(calibration_factor.to_bits()),
        }
    }

    /// Uncalibrated channel reading.
    pub fn read_raw(&self) -> f32 {
        self.channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_raw()
    }

    /// Calibrated mass in grams.
    pub fn read_mass(&self) -> f32 {
        let raw = self.read_raw();
        (raw - self.zero_offset()) * self.calibration_factor()
    }

    /// Derive a new factor from a known reference mass on the scale.
    pub fn calibrate(&self, known_grams: f32) -> Result<f32, SensorError> {
        if !known_grams.is_finite() || known_grams <= 0.0 {
            return Err(SensorError::CalibrationFailed);
        }
        let delta = self.read_raw() - self.zero_offset();
        if !delta.is_finite() || delta == 0.0 {
            warn!("Scale: calibration rejected, raw delta {}", delta);
            return Err(SensorError::CalibrationFailed);
        }
        let factor = known_grams / delta;
        self.calibration_factor
            .store(factor.to_bits(), Ordering::Release);
        info!("Scale: calibrated against {:.2}g, factor {}", known_grams, factor);
        Ok(factor)
    }

    pub fn zero_offset(&self) -> f32 {
        f32::from_bits(self.zero_offset.load(Ordering::Acquire))
    }

    pub fn calibration_factor(&self) -> f32 {
        f32::from_bits(self.calibration_factor.load(Ordering::Acquire))
    }
}

/// Presence-style food sensor on a digital input: high reads as `1.0`,
/// low as `0.0`. A read error reads as empty.
pub struct DigitalMassInput<P> {
    pin: P,
}

impl<P: InputPin> DigitalMassInput<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin + Send> MassChannel for DigitalMassInput<P> {
    fn read_raw(&mut self) -> f32 {
        match self.pin.is_high() {
            Ok(true) => 1.0,
            Ok(false) => 0.0,
            Err(_) => {
                warn!("Scale: digital input read failed");
                0.0
            }
        }
    }
}
