//! One-shot board bring-up.
//!
//! Validates the pin map, builds the motor and sensor drivers on top of
//! the simulated hopper, and drives the motor to a known stopped state.
//! Called once from `main()`; any error aborts startup.

use std::sync::Arc;

use log::info;

use crate::adapters::sim::{
    SimDirectionPin, SimEnablePwm, SimHopper, SimRunPin, SimScale, SimThermometer,
};
use crate::app::ports::ActuatorPort;
use crate::app::service::Hardware;
use crate::config::{FeederConfig, PinConfig};
use crate::drivers::motor::MotorController;
use crate::error::ActuatorError;
use crate::pins::MAX_HEADER_GPIO;
use crate::sensors::SensorHub;
use crate::sensors::temperature::TemperatureSensor;
use crate::sensors::weight::WeightSensor;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot board initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// Two functions were assigned the same GPIO.
    PinConflict(u8),
    /// GPIO outside the 40-pin header range.
    PinOutOfRange(u8),
    /// The motor could not be driven to a stopped state.
    MotorInit(ActuatorError),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PinConflict(pin) => write!(f, "GPIO {} assigned more than once", pin),
            Self::PinOutOfRange(pin) => {
                write!(f, "GPIO {} out of range 0-{}", pin, MAX_HEADER_GPIO)
            }
            Self::MotorInit(e) => write!(f, "motor init failed: {}", e),
        }
    }
}

impl std::error::Error for HwInitError {}

// ── Board ─────────────────────────────────────────────────────

pub type SimMotor = MotorController<SimDirectionPin, SimEnablePwm, SimRunPin>;
pub type SimSensors = SensorHub<SimScale, SimThermometer>;

/// Initialised peripherals, ready to hand to the feeder core.
pub struct Board {
    pub motor: Arc<SimMotor>,
    pub sensors: Arc<SimSensors>,
    pub hopper: SimHopper,
}

impl Board {
    pub fn hardware(&self) -> Hardware {
        Hardware {
            motor: self.motor.clone(),
            sensors: self.sensors.clone(),
        }
    }
}

/// Every pin distinct and on the header.
pub fn validate_pins(pins: &PinConfig) -> Result<(), HwInitError> {
    let all = pins.all();
    for (i, &pin) in all.iter().enumerate() {
        if pin > MAX_HEADER_GPIO {
            return Err(HwInitError::PinOutOfRange(pin));
        }
        if all[..i].contains(&pin) {
            return Err(HwInitError::PinConflict(pin));
        }
    }
    Ok(())
}

pub fn init_sim_board(config: &FeederConfig) -> Result<Board, HwInitError> {
    validate_pins(&config.pins)?;

    let hopper = SimHopper::new(&config.simulation);
    let motor = MotorController::new(hopper.direction_pin(), hopper.enable_pwm(), hopper.run_pin());
    motor.stop().map_err(HwInitError::MotorInit)?;

    let sensors = SensorHub::new(
        WeightSensor::new(
            hopper.scale(),
            config.scale_zero_offset,
            config.scale_calibration_factor,
        ),
        TemperatureSensor::new(hopper.thermometer()),
    );

    info!(
        "hw_init(sim): motor run={} enable={} dir={}, food={}, temp={}",
        config.pins.motor_run,
        config.pins.motor_enable,
        config.pins.motor_direction,
        config.pins.food_sensor,
        config.pins.temperature_sensor
    );

    Ok(Board {
        motor: Arc::new(motor),
        sensors: Arc::new(sensors),
        hopper,
    })
}
