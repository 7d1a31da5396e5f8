//! Wall-clock feeding scheduler.
//!
//! The loop polls the clock, and for every due entry notifies a
//! [`SchedulerDelegate`] (the feed executor in production). It is decoupled
//! from feeding itself so it can be driven by a recording delegate in tests.
//!
//! ```text
//!   while running:
//!     for entry in snapshot(book):
//!       if entry.is_due(now):
//!         delegate.on_entry_due(entry)     ── synchronous, whole feed cycle
//!         wait(post_feed_pause)            ── interruptible
//!     wait(poll_interval)                  ── interruptible
//! ```
//!
//! The post-feed pause is at least one minute, which is what keeps an entry
//! from firing twice inside its due minute.

use core::time::Duration;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, info};

use crate::app::ports::{ClockPort, SchedulerDelegate};
use crate::app::state::SystemState;
use crate::schedule::ScheduleEntry;
use crate::shutdown::ShutdownListener;

// ═══════════════════════════════════════════════════════════════
//  Schedule book
// ═══════════════════════════════════════════════════════════════

/// Ordered collection of entries shared between the operator surface and
/// the scheduler thread. Passes iterate a snapshot, so edits made while a
/// feed is running apply from the next pass.
#[derive(Debug, Default)]
pub struct ScheduleBook {
    entries: RwLock<Vec<ScheduleEntry>>,
}

impl ScheduleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; returns its index.
    pub fn add(&self, entry: ScheduleEntry) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push(entry);
        info!("Scheduler: added {} at slot {}", entry, entries.len() - 1);
        entries.len() - 1
    }

    /// Remove by index. Out of range is a no-op.
    pub fn remove(&self, index: usize) -> Option<ScheduleEntry> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if index >= entries.len() {
            return None;
        }
        let entry = entries.remove(index);
        info!("Scheduler: removed {} from slot {}", entry, index);
        Some(entry)
    }

    pub fn snapshot(&self) -> Vec<ScheduleEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler loop
// ═══════════════════════════════════════════════════════════════

pub struct SchedulerLoop {
    book: Arc<ScheduleBook>,
    state: Arc<SystemState>,
    clock: Arc<dyn ClockPort>,
    delegate: Arc<dyn SchedulerDelegate>,
    poll_interval: Duration,
    post_feed_pause: Duration,
}

impl SchedulerLoop {
    pub fn new(
        book: Arc<ScheduleBook>,
        state: Arc<SystemState>,
        clock: Arc<dyn ClockPort>,
        delegate: Arc<dyn SchedulerDelegate>,
        poll_interval: Duration,
        post_feed_pause: Duration,
    ) -> Self {
        Self {
            book,
            state,
            clock,
            delegate,
            poll_interval,
            post_feed_pause,
        }
    }

    /// Run until `running` clears or shutdown is signalled.
    pub fn run(&self, shutdown: &ShutdownListener) {
        info!(
            "Scheduler: loop started (poll {}s, pause {}s)",
            self.poll_interval.as_secs(),
            self.post_feed_pause.as_secs()
        );
        while self.state.is_running() {
            if self.run_pass(shutdown) {
                break;
            }
            if shutdown.sleep(self.poll_interval) {
                break;
            }
        }
        info!("Scheduler: loop exited");
    }

    /// One pass over a snapshot of the book. Returns `true` if shutdown was
    /// observed during a post-feed pause.
    pub fn run_pass(&self, shutdown: &ShutdownListener) -> bool {
        for entry in self.book.snapshot() {
            if !self.state.is_running() {
                return false;
            }
            // Re-read per entry: a feed plus pause moves the clock on.
            let now = self.clock.now();
            if !entry.is_due(&now) {
                continue;
            }
            debug!("Scheduler: {} due", entry);
            self.delegate.on_entry_due(&entry);
            if shutdown.sleep(self.post_feed_pause) {
                return true;
            }
        }
        false
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
