//! Host wall-clock adapter.
//!
//! Schedules are evaluated against local time, so this reads the system
//! clock in the host's local timezone.

use chrono::{DateTime, Local};

use crate::app::ports::ClockPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
