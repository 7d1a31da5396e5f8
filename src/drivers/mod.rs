//! Actuator drivers, board initialisation, and thread helpers.

pub mod hw_init;
pub mod motor;
pub mod task;
