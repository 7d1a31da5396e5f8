//! Application core: feeding logic behind port traits.
//!
//! This module contains the business rules for the feeder: the feed cycle
//! executor, the event journal, shared interlock state and the operator
//! command surface. All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer testable without real
//! peripherals.

pub mod commands;
pub mod events;
pub mod executor;
pub mod journal;
pub mod ports;
pub mod service;
pub mod state;
