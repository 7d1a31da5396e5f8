//! Simulated feeder hardware for host runs.
//!
//! A [`SimHopper`] holds the food mass. The pin handles it hands out
//! implement the `embedded-hal` traits the real drivers expect, so the same
//! [`MotorController`](crate::drivers::motor::MotorController) and
//! [`WeightSensor`](crate::sensors::weight::WeightSensor) run unchanged:
//!
//! ```text
//!   SimDirectionPin ─┐
//!   SimEnablePwm    ─┼─▶ SimHopper ◀── SimScale (raw = grams)
//!   SimRunPin       ─┘
//! ```
//!
//! While the run line is high and the direction is forward, food leaves the
//! hopper at `rate * duty / 255` grams per second.

use core::convert::Infallible;
use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use embedded_hal::digital::{ErrorType as DigitalErrorType, OutputPin};
use embedded_hal::pwm::{ErrorType as PwmErrorType, SetDutyCycle};

use crate::app::ports::{MassChannel, Thermometer};
use crate::config::SimulationConfig;
use crate::pins::MOTOR_SPEED_FULL_SCALE;

struct Hopper {
    grams: f32,
    rate_g_per_s: f32,
    forward: bool,
    run: bool,
    duty: u16,
    last_settle: Instant,
}

impl Hopper {
    /// Account for food dispensed since the last state change.
    fn settle(&mut self) {
        let now = Instant::now();
        if self.run && self.forward {
            let secs = now.duration_since(self.last_settle).as_secs_f32();
            let fraction = f32::from(self.duty) / f32::from(MOTOR_SPEED_FULL_SCALE);
            self.grams = (self.grams - self.rate_g_per_s * fraction * secs).max(0.0);
        }
        self.last_settle = now;
    }
}

/// Shared simulated hopper. Cheap to clone.
#[derive(Clone)]
pub struct SimHopper {
    inner: Arc<Mutex<Hopper>>,
    water_celsius: Arc<AtomicU32>,
}

impl SimHopper {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Hopper {
                grams: config.hopper_grams,
                rate_g_per_s: config.dispense_rate_g_per_s,
                forward: true,
                run: false,
                duty: 0,
                last_settle: Instant::now(),
            })),
            water_celsius: Arc::new(AtomicU32::new(config.water_temperature_c.to_bits())),
        }
    }

    pub fn grams(&self) -> f32 {
        let mut h = self.lock();
        h.settle();
        h.grams
    }

    pub fn refill(&self, grams: f32) {
        let mut h = self.lock();
        h.settle();
        h.grams = grams;
    }

    pub fn set_water_temperature(&self, celsius: f32) {
        self.water_celsius.store(celsius.to_bits(), Ordering::Relaxed);
    }

    pub fn is_dispensing(&self) -> bool {
        let h = self.lock();
        h.run && h.forward && h.duty > 0
    }

    pub fn direction_pin(&self) -> SimDirectionPin {
        SimDirectionPin(self.clone())
    }

    pub fn enable_pwm(&self) -> SimEnablePwm {
        SimEnablePwm(self.clone())
    }

    pub fn run_pin(&self) -> SimRunPin {
        SimRunPin(self.clone())
    }

    pub fn scale(&self) -> SimScale {
        SimScale(self.clone())
    }

    pub fn thermometer(&self) -> SimThermometer {
        SimThermometer(self.water_celsius.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Hopper> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut Hopper)) {
        let mut h = self.lock();
        h.settle();
        f(&mut h);
    }
}

pub struct SimDirectionPin(SimHopper);

impl DigitalErrorType for SimDirectionPin {
    type Error = Infallible;
}

impl OutputPin for SimDirectionPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.update(|h| h.forward = false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.update(|h| h.forward = true);
        Ok(())
    }
}

pub struct SimRunPin(SimHopper);

impl DigitalErrorType for SimRunPin {
    type Error = Infallible;
}

impl OutputPin for SimRunPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.update(|h| h.run = false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.update(|h| h.run = true);
        Ok(())
    }
}

/// Enable line as an 8-bit PWM channel.
pub struct SimEnablePwm(SimHopper);

impl PwmErrorType for SimEnablePwm {
    type Error = Infallible;
}

impl SetDutyCycle for SimEnablePwm {
    fn max_duty_cycle(&self) -> u16 {
        u16::from(MOTOR_SPEED_FULL_SCALE)
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.0.update(|h| h.duty = duty);
        Ok(())
    }
}

/// Load cell reading grams directly (zero offset 0, factor 1).
pub struct SimScale(SimHopper);

impl MassChannel for SimScale {
    fn read_raw(&mut self) -> f32 {
        self.0.grams()
    }
}

pub struct SimThermometer(Arc<AtomicU32>);

impl Thermometer for SimThermometer {
    fn read_celsius(&mut self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}
