//! Process-wide feeder state shared by the operator surface and both loops.
//!
//! Both flags are plain atomics so the interlock check at the top of a feed
//! cycle never waits behind a journal write or a motor operation.

use core::sync::atomic::{AtomicBool, Ordering};

/// Emergency-stop interlock. While engaged, no motor actuation is allowed.
#[derive(Debug, Default)]
pub struct Interlock(AtomicBool);

impl Interlock {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn engage(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_engaged(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// `{running, interlocked}` pair read by both loops every iteration.
#[derive(Debug, Default)]
pub struct SystemState {
    running: AtomicBool,
    interlock: Interlock,
}

impl SystemState {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            interlock: Interlock::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
    }

    /// Atomically mark the system running. Returns `false` if it already was.
    pub fn try_begin_running(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn interlock(&self) -> &Interlock {
        &self.interlock
    }

    pub fn is_interlocked(&self) -> bool {
        self.interlock.is_engaged()
    }
}
