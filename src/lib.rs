//! Fish feeder controller library.
//!
//! Exposes the feeder core, drivers and adapters for the host binary and
//! for integration testing. Hardware is reached only through
//! `embedded-hal` traits; the host build wires them to a simulated hopper.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod monitor;
pub mod pins;
pub mod schedule;
pub mod scheduler;
pub mod sensors;
pub mod shutdown;

pub use app::commands::{CommandError, OperatorCommand};
pub use app::executor::{CycleResult, FeedRequest};
pub use app::service::{FeederSystem, Hardware, LoopTiming, StatusSnapshot};
pub use config::FeederConfig;
pub use error::{Error, Result};
pub use schedule::ScheduleEntry;
