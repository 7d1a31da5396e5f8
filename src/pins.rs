//! GPIO / peripheral pin assignments for the feeder board.
//!
//! Single source of truth for the default pin map. Numbers are BCM GPIO
//! numbers on the 40-pin header; [`crate::config::PinConfig`] starts from
//! these and can override any of them.

// ---------------------------------------------------------------------------
// Auger motor driver (L298N-style H-bridge)
// ---------------------------------------------------------------------------

/// Digital output: motor run line (HIGH = drive).
pub const MOTOR_RUN_GPIO: u8 = 17;
/// Hardware PWM channel on the bridge enable input.
pub const MOTOR_ENABLE_GPIO: u8 = 18;
/// Digital output: HIGH = forward (dispense), LOW = reverse (clear jam).
pub const MOTOR_DIR_GPIO: u8 = 27;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Load-cell amplifier data line (HX711-class) under the food hopper.
pub const FOOD_SENSOR_GPIO: u8 = 5;

/// DS18B20 1-Wire probe in the tank.
pub const TEMP_SENSOR_GPIO: u8 = 4;

// ---------------------------------------------------------------------------
// Header limits / PWM
// ---------------------------------------------------------------------------

/// Highest BCM GPIO number exposed on the header.
pub const MAX_HEADER_GPIO: u8 = 27;

/// Full-scale motor speed. Speeds are expressed on a 0–255 scale and mapped
/// onto the PWM channel's own resolution.
pub const MOTOR_SPEED_FULL_SCALE: u8 = 255;
