//! Feed cycle executor against recording mocks.

use std::sync::Arc;
use std::time::Duration;

use fishfeeder::app::events::FeedSource;
use fishfeeder::app::executor::{CycleResult, FeedExecutor, FeedRequest};
use fishfeeder::app::journal::Journal;
use fishfeeder::app::ports::{ActuatorPort, ClockPort, Direction};
use fishfeeder::app::state::SystemState;
use fishfeeder::error::ActuatorError;
use fishfeeder::schedule::ScheduleEntry;

use crate::mock_hw::{FixedClock, MotorCall, RecordingMotor, ScriptedSensors, SharedBuffer, journal};

struct Rig {
    state: Arc<SystemState>,
    motor: Arc<RecordingMotor>,
    journal: Arc<Journal>,
    log: SharedBuffer,
    executor: FeedExecutor,
}

fn rig(motor: RecordingMotor, sensors: ScriptedSensors) -> Rig {
    let state = Arc::new(SystemState::new());
    let motor = Arc::new(motor);
    let clock: Arc<dyn ClockPort> = Arc::new(FixedClock::at(8, 0, 2));
    let log = SharedBuffer::default();
    let journal = journal(&log, clock.clone());
    let executor = FeedExecutor::new(
        state.clone(),
        motor.clone(),
        Arc::new(sensors),
        journal.clone(),
        clock,
    );
    Rig {
        state,
        motor,
        journal,
        log,
        executor,
    }
}

#[test]
fn scheduled_feed_on_target_succeeds() {
    let r = rig(RecordingMotor::new(), ScriptedSensors::new(&[100.0, 94.5], 25.0));
    let entry = ScheduleEntry::new(8, 0, 2000, 5.0).unwrap();

    let started = std::time::Instant::now();
    let result = r.executor.execute(FeedRequest::scheduled(&entry));
    assert!(started.elapsed() >= Duration::from_millis(2000));

    let outcome = result.outcome().cloned().expect("cycle should complete");
    assert!((outcome.dispensed_grams - 5.5).abs() < 1e-4);
    assert!(outcome.success);
    assert_eq!(outcome.note.as_str(), FeedSource::Scheduled.note());
    assert_eq!(outcome.note.as_str(), "Scheduled feeding");
    assert!((outcome.temperature_c - 25.0).abs() < f32::EPSILON);

    assert_eq!(
        r.motor.calls(),
        vec![MotorCall::Start(Direction::Forward), MotorCall::Stop]
    );
    assert_eq!(r.journal.history(), vec![outcome]);
    assert!(r.log.text().contains("Amount: 5.50g"));
    assert!(r.log.text().contains("Success: Yes"));
}

#[test]
fn under_dispense_is_recorded_as_failure() {
    let r = rig(RecordingMotor::new(), ScriptedSensors::new(&[100.0, 99.0], 25.0));
    let entry = ScheduleEntry::new(8, 0, 20, 5.0).unwrap();

    let outcome = match r.executor.execute(FeedRequest::scheduled(&entry)) {
        CycleResult::Completed(o) => o,
        other => panic!("unexpected {other:?}"),
    };
    assert!((outcome.dispensed_grams - 1.0).abs() < 1e-4);
    assert!(!outcome.success);
    assert_eq!(r.motor.starts(), 1);
    assert!(r.log.text().contains("Success: No"));
}

#[test]
fn negative_dispense_is_kept_and_fails() {
    let r = rig(RecordingMotor::new(), ScriptedSensors::new(&[100.0, 101.0], 25.0));
    let outcome = r
        .executor
        .execute(FeedRequest::manual(2.0, Duration::from_millis(10)));
    let o = outcome.outcome().unwrap();
    assert!((o.dispensed_grams + 1.0).abs() < 1e-4);
    assert!(!o.success);
}

#[test]
fn manual_feed_records_manual_note() {
    let r = rig(RecordingMotor::new(), ScriptedSensors::new(&[200.0, 188.0], 24.0));
    let result = r
        .executor
        .execute(FeedRequest::manual(10.0, Duration::from_millis(1500)));
    let o = result.outcome().unwrap();
    assert!((o.dispensed_grams - 12.0).abs() < 1e-4);
    assert!(o.success);
    assert_eq!(o.note.as_str(), "Manual feed");
}

#[test]
fn interlock_skips_without_touching_motor() {
    let r = rig(RecordingMotor::new(), ScriptedSensors::new(&[100.0, 90.0], 25.0));
    r.state.interlock().engage();
    let entry = ScheduleEntry::new(8, 0, 2000, 5.0).unwrap();

    assert_eq!(r.executor.execute(FeedRequest::scheduled(&entry)), CycleResult::Skipped);
    assert_eq!(
        r.executor
            .execute(FeedRequest::manual(5.0, Duration::from_millis(10))),
        CycleResult::Skipped
    );
    assert!(r.motor.calls().is_empty());
    assert!(r.journal.history().is_empty());

    let log = r.log.text();
    assert!(log.contains("Feeding skipped"));
    assert!(log.contains("Emergency stop active"));
}

#[test]
fn resume_restores_full_cycle() {
    let r = rig(RecordingMotor::new(), ScriptedSensors::new(&[100.0, 95.0], 25.0));
    r.state.interlock().engage();
    let req = FeedRequest::manual(5.0, Duration::from_millis(10));
    assert_eq!(r.executor.execute(req), CycleResult::Skipped);

    r.state.interlock().release();
    assert!(matches!(r.executor.execute(req), CycleResult::Completed(_)));
    assert_eq!(
        r.motor.calls(),
        vec![MotorCall::Start(Direction::Forward), MotorCall::Stop]
    );
    assert_eq!(r.journal.outcome_count(), 1);
}

#[test]
fn start_failure_faults_and_stops() {
    let r = rig(RecordingMotor::failing(), ScriptedSensors::new(&[100.0, 95.0], 25.0));
    let result = r
        .executor
        .execute(FeedRequest::manual(5.0, Duration::from_millis(10)));

    assert_eq!(result, CycleResult::Faulted(ActuatorError::GpioWriteFailed));
    assert_eq!(r.motor.calls(), vec![MotorCall::Refused, MotorCall::Stop]);
    assert!(!r.motor.is_running());
    assert!(r.journal.history().is_empty());
    assert!(r.log.text().contains("[Feeding fault]"));
}

#[test]
fn concurrent_feeds_never_overlap() {
    let r = rig(
        RecordingMotor::new(),
        ScriptedSensors::steady_drain(500.0, 3.0, 4),
    );
    let executor = Arc::new(r.executor);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ex = executor.clone();
            std::thread::spawn(move || ex.execute(FeedRequest::manual(3.0, Duration::from_millis(30))))
        })
        .collect();
    for h in handles {
        assert!(matches!(h.join().unwrap(), CycleResult::Completed(_)));
    }

    assert!(!r.motor.overlapped());
    let calls = r.motor.calls();
    assert_eq!(calls.len(), 8);
    for pair in calls.chunks(2) {
        assert_eq!(pair, [MotorCall::Start(Direction::Forward), MotorCall::Stop]);
    }
    // Each cycle saw its own before/after pair.
    for o in r.journal.history() {
        assert!((o.dispensed_grams - 3.0).abs() < 1e-4);
    }
}
