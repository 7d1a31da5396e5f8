//! Append-only event and feeding-history journal.
//!
//! One mutex serialises both the in-memory history and the text log writer,
//! so a feeding record and an alert line never interleave. Every entry is
//! also mirrored to the `log` facade.
//!
//! ```text
//! [Thu Mar  5 08:00:02 2026] [Feeding completed] Fed 5.50g at 25.00°C
//! Time: Thu Mar  5 08:00:02 2026
//! Amount: 5.50g, Temp: 25.00°C, Success: Yes, Notes: Scheduled feeding
//! ```

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use super::events::{FeederEvent, FeedingOutcome, ctime};
use super::ports::ClockPort;

struct JournalInner {
    history: Vec<FeedingOutcome>,
    out: Box<dyn Write + Send>,
}

/// Shared journal. Writers block each other; reads clone out of the lock.
pub struct Journal {
    inner: Mutex<JournalInner>,
    clock: Arc<dyn ClockPort>,
}

impl Journal {
    pub fn new(out: Box<dyn Write + Send>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            inner: Mutex::new(JournalInner {
                history: Vec::new(),
                out,
            }),
            clock,
        }
    }

    /// Append one `[timestamp] [EventType] message` line.
    pub fn emit(&self, event: &FeederEvent) {
        let now = self.clock.now();
        let kind = event.event_type();
        let message = event.message();

        if event.is_warning() {
            warn!("[{}] {}", kind, message);
        } else {
            info!("[{}] {}", kind, message);
        }

        let mut inner = self.lock();
        let line = format!("[{}] [{}] {}\n", ctime(&now), kind, message);
        if let Err(e) = write_all_flush(&mut inner.out, line.as_bytes()) {
            warn!("Journal: log write failed: {}", e);
        }
    }

    /// Append a feeding outcome to the history and the text log.
    pub fn record(&self, outcome: FeedingOutcome) {
        info!(
            "Feeding outcome: {:.2}g dispensed, success={}, note={}",
            outcome.dispensed_grams, outcome.success, outcome.note
        );

        let mut inner = self.lock();
        let text = format!("{outcome}\n");
        if let Err(e) = write_all_flush(&mut inner.out, text.as_bytes()) {
            warn!("Journal: outcome write failed: {}", e);
        }
        inner.history.push(outcome);
    }

    /// Snapshot of every recorded outcome, oldest first.
    pub fn history(&self) -> Vec<FeedingOutcome> {
        self.lock().history.clone()
    }

    pub fn last_outcome(&self) -> Option<FeedingOutcome> {
        self.lock().history.last().cloned()
    }

    pub fn outcome_count(&self) -> usize {
        self.lock().history.len()
    }

    fn lock(&self) -> MutexGuard<'_, JournalInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn write_all_flush(out: &mut Box<dyn Write + Send>, bytes: &[u8]) -> std::io::Result<()> {
    out.write_all(bytes)?;
    out.flush()
}
