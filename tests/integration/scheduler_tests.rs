//! Scheduler loop driving the simulated board through `FeederSystem`.

use std::sync::Arc;
use std::time::Duration;

use fishfeeder::app::ports::ActuatorPort;
use fishfeeder::config::FeederConfig;
use fishfeeder::drivers::hw_init::{Board, init_sim_board};
use fishfeeder::{FeederSystem, LoopTiming, ScheduleEntry};

use crate::mock_hw::{FixedClock, SharedBuffer, wait_for};

/// Real one-minute post-feed pause, fast polling.
fn timing() -> LoopTiming {
    LoopTiming {
        scheduler_poll: Duration::from_millis(10),
        post_feed_pause: Duration::from_secs(60),
        monitor_interval: Duration::from_secs(60),
    }
}

fn system_at(h: u32, m: u32) -> (FeederSystem, Board, SharedBuffer, Arc<FixedClock>) {
    let config = FeederConfig::default();
    let board = init_sim_board(&config).unwrap();
    let clock = Arc::new(FixedClock::at(h, m, 30));
    let log = SharedBuffer::default();
    let system = FeederSystem::new(&config, board.hardware(), clock.clone(), Box::new(log.clone()))
        .with_timing(timing());
    (system, board, log, clock)
}

#[test]
fn due_entry_feeds_once_in_its_minute() {
    let (system, board, log, _clock) = system_at(8, 0);
    // 2.5 g/s at full duty: 200 ms is about 0.5 g.
    system.add_schedule(ScheduleEntry::new(8, 0, 200, 0.4).unwrap());
    system.start().unwrap();

    assert!(wait_for(Duration::from_secs(3), || system.history().len() == 1));
    std::thread::sleep(Duration::from_millis(200));

    let history = system.history();
    assert_eq!(history.len(), 1);
    assert!(history[0].dispensed_grams > 0.0);
    assert!(history[0].success);
    assert_eq!(history[0].note.as_str(), "Scheduled feeding");
    assert!(board.hopper.grams() < 500.0);
    assert!(!board.motor.is_running());
    assert_eq!(log.count("[Feeding completed]"), 1);

    system.shutdown();
}

#[test]
fn entry_outside_its_minute_never_fires() {
    let (system, board, _log, _clock) = system_at(9, 30);
    system.add_schedule(ScheduleEntry::new(8, 0, 200, 0.4).unwrap());
    system.start().unwrap();
    std::thread::sleep(Duration::from_millis(150));

    assert!(system.history().is_empty());
    assert_eq!(board.hopper.grams(), 500.0);
    system.shutdown();
}

#[test]
fn clock_reaching_entry_triggers_feed() {
    let (system, _board, _log, clock) = system_at(7, 59);
    system.add_schedule(ScheduleEntry::new(8, 0, 50, 0.01).unwrap());
    system.start().unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert!(system.history().is_empty());

    clock.set(8, 0, 0);
    assert!(wait_for(Duration::from_secs(3), || system.history().len() == 1));
    system.shutdown();
}

#[test]
fn emergency_stop_skips_due_entry() {
    let (system, board, log, _clock) = system_at(8, 0);
    system.start().unwrap();
    system.trigger_emergency_stop();
    system.add_schedule(ScheduleEntry::new(8, 0, 2000, 5.0).unwrap());

    assert!(wait_for(Duration::from_secs(3), || log.text().contains("Feeding skipped")));
    assert!(log.text().contains("Emergency stop active"));
    assert!(system.history().is_empty());
    assert!(!board.motor.is_running());
    assert_eq!(board.hopper.grams(), 500.0);

    system.shutdown();
}

#[test]
fn shutdown_interrupts_post_feed_pause() {
    let (system, _board, _log, _clock) = system_at(8, 0);
    system.add_schedule(ScheduleEntry::new(8, 0, 20, 0.01).unwrap());
    system.start().unwrap();
    assert!(wait_for(Duration::from_secs(3), || system.history().len() == 1));

    // The scheduler is now inside its 60 s pause.
    let t0 = std::time::Instant::now();
    system.shutdown();
    assert!(t0.elapsed() < Duration::from_secs(2));
    assert!(!system.is_running());
}
