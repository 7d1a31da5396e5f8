//! Feeder auger motor driver (H-bridge with run, enable and direction lines).
//!
//! Generic over `embedded-hal` 1.0 pins: direction and run are digital
//! outputs, enable is a PWM channel whose duty sets the speed.
//!
//! ## Safety contract
//!
//! All pin writes go through one mutex owned by the driver. `start` checks
//! the emergency-stop interlock while holding that mutex, and the emergency
//! path engages the interlock *before* calling `stop`, so a start racing an
//! emergency stop either sees the interlock or is undone by the stop.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::{debug, warn};

use crate::app::ports::{ActuatorPort, Direction};
use crate::app::state::Interlock;
use crate::error::ActuatorError;
use crate::pins::MOTOR_SPEED_FULL_SCALE;

struct MotorPins<D, E, R> {
    direction: D,
    enable: E,
    run: R,
}

pub struct MotorController<D, E, R> {
    pins: Mutex<MotorPins<D, E, R>>,
    running: AtomicBool,
    /// Enable-line duty last written, on the 0-255 scale.
    duty: AtomicU8,
}

impl<D, E, R> MotorController<D, E, R>
where
    D: OutputPin + Send,
    E: SetDutyCycle + Send,
    R: OutputPin + Send,
{
    pub fn new(direction: D, enable: E, run: R) -> Self {
        Self {
            pins: Mutex::new(MotorPins {
                direction,
                enable,
                run,
            }),
            running: AtomicBool::new(false),
            duty: AtomicU8::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MotorPins<D, E, R>> {
        // A panic mid-write must not make the motor unstoppable.
        self.pins.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D, E, R> ActuatorPort for MotorController<D, E, R>
where
    D: OutputPin + Send,
    E: SetDutyCycle + Send,
    R: OutputPin + Send,
{
    fn start(&self, direction: Direction, interlock: &Interlock) -> Result<(), ActuatorError> {
        let mut p = self.lock();
        if interlock.is_engaged() {
            return Err(ActuatorError::InterlockEngaged);
        }

        let dir = match direction {
            Direction::Forward => p.direction.set_high(),
            Direction::Reverse => p.direction.set_low(),
        };
        dir.map_err(|_| ActuatorError::GpioWriteFailed)?;
        p.enable
            .set_duty_cycle_fully_on()
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.duty.store(MOTOR_SPEED_FULL_SCALE, Ordering::Release);
        p.run.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;

        self.running.store(true, Ordering::Release);
        debug!("Motor: started {:?}", direction);
        Ok(())
    }

    fn stop(&self) -> Result<(), ActuatorError> {
        let mut p = self.lock();

        // Attempt both lines even if the first write fails.
        let enable = p
            .enable
            .set_duty_cycle_fully_off()
            .map_err(|_| ActuatorError::PwmWriteFailed);
        let run = p.run.set_low().map_err(|_| ActuatorError::GpioWriteFailed);

        if enable.is_ok() {
            self.duty.store(0, Ordering::Release);
        }
        self.running.store(false, Ordering::Release);

        if let Err(e) = enable.and(run) {
            warn!("Motor: stop incomplete: {}", e);
            return Err(e);
        }
        debug!("Motor: stopped");
        Ok(())
    }

    fn set_speed(&self, speed: u8) -> Result<(), ActuatorError> {
        let mut p = self.lock();
        p.enable
            .set_duty_cycle_fraction(u16::from(speed), u16::from(MOTOR_SPEED_FULL_SCALE))
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.duty.store(speed, Ordering::Release);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn duty(&self) -> u8 {
        self.duty.load(Ordering::Acquire)
    }
}
