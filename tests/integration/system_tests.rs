//! `FeederSystem` lifecycle, operator surface and monitor alerts on the
//! simulated board.

use std::sync::Arc;
use std::time::{Duration, Instant};

use fishfeeder::app::commands::{OperatorCommand, apply};
use fishfeeder::app::ports::ActuatorPort;
use fishfeeder::config::FeederConfig;
use fishfeeder::error::{Error, ScheduleError};
use fishfeeder::drivers::hw_init::{Board, init_sim_board};
use fishfeeder::schedule::ScheduleSpec;
use fishfeeder::{CycleResult, FeederSystem, Hardware, LoopTiming, ScheduleEntry};

use crate::mock_hw::{FixedClock, MotorCall, RecordingMotor, ScriptedSensors, SharedBuffer, wait_for};

fn build(config: &FeederConfig) -> (FeederSystem, Board, SharedBuffer) {
    let board = init_sim_board(config).unwrap();
    let log = SharedBuffer::default();
    let system = FeederSystem::new(
        config,
        board.hardware(),
        Arc::new(FixedClock::at(12, 0, 0)),
        Box::new(log.clone()),
    );
    (system, board, log)
}

#[test]
fn shutdown_is_prompt_with_default_cadences() {
    let (system, _board, log) = build(&FeederConfig::default());
    system.start().unwrap();
    std::thread::sleep(Duration::from_millis(50));

    let t0 = Instant::now();
    system.shutdown();
    assert!(t0.elapsed() < Duration::from_secs(2));
    assert!(!system.is_running());
    assert!(log.text().contains("[System shutdown] Feeding system stopped"));
}

#[test]
fn start_and_shutdown_are_idempotent() {
    let (system, _board, log) = build(&FeederConfig::default());
    system.start().unwrap();
    system.start().unwrap();
    assert!(system.is_running());
    system.shutdown();
    system.shutdown();

    assert_eq!(log.count("[System started]"), 1);
    assert_eq!(log.count("[System shutdown]"), 1);
}

#[test]
fn restart_after_shutdown_releases_interlock() {
    let (system, _board, _log) = build(&FeederConfig::default());
    system.start().unwrap();
    system.shutdown();
    assert!(system.is_emergency_stopped());
    system.start().unwrap();
    assert!(!system.is_emergency_stopped());
    system.shutdown();
}

#[test]
fn drop_joins_loops() {
    let (system, board, _log) = build(&FeederConfig::default());
    system.start().unwrap();
    let t0 = Instant::now();
    drop(system);
    assert!(t0.elapsed() < Duration::from_secs(2));
    assert!(!board.motor.is_running());
}

#[test]
fn schedules_add_and_remove() {
    let (system, _board, log) = build(&FeederConfig::default());
    let a = ScheduleEntry::new(8, 0, 2000, 5.0).unwrap();
    let b = ScheduleEntry::new(18, 30, 1500, 4.0).unwrap();
    assert_eq!(system.add_schedule(a), 0);
    assert_eq!(system.add_schedule(b), 1);
    assert_eq!(system.schedules(), vec![a, b]);

    assert_eq!(system.remove_schedule(5), None);
    assert_eq!(system.schedules().len(), 2);
    assert_eq!(system.remove_schedule(0), Some(a));
    assert_eq!(system.schedules(), vec![b]);

    assert_eq!(log.count("[Schedule added]"), 2);
    assert_eq!(log.count("[Schedule removed]"), 1);
}

#[test]
fn status_reflects_state() {
    let (system, _board, _log) = build(&FeederConfig::default());
    system.add_schedule(ScheduleEntry::new(8, 0, 2000, 5.0).unwrap());

    let s = system.status();
    assert!(!s.running);
    assert!(!s.emergency_stop);
    assert!(!s.motor_running);
    assert_eq!(s.motor_duty, 0);
    assert!((s.food_grams - 500.0).abs() < 1e-3);
    assert!((s.temperature_c - 25.0).abs() < 1e-3);
    assert_eq!(s.schedules, 1);
    assert_eq!(s.feedings, 0);
    assert!(s.last_feeding.is_none());

    system.trigger_emergency_stop();
    let text = system.status().to_string();
    assert!(text.contains("Emergency Stop: Active"));
    assert!(text.contains("Scheduled Feedings: 1"));

    let json = serde_json::to_value(system.status()).unwrap();
    assert_eq!(json["emergency_stop"], true);
}

#[test]
fn manual_feed_on_sim_board_dispenses() {
    let (system, board, _log) = build(&FeederConfig::default());
    let result = system.manual_feed(0.4, Duration::from_millis(200));
    let o = result.outcome().expect("manual feed should complete");
    assert!(o.success);
    assert!(o.dispensed_grams > 0.4);
    assert!(board.hopper.grams() < 500.0);
    assert_eq!(system.status().feedings, 1);
}

#[test]
fn emergency_stop_blocks_manual_feed_until_resumed() {
    let motor = Arc::new(RecordingMotor::new());
    let hardware = Hardware {
        motor: motor.clone(),
        sensors: Arc::new(ScriptedSensors::new(&[50.0, 40.0], 22.0)),
    };
    let log = SharedBuffer::default();
    let system = FeederSystem::new(
        &FeederConfig::default(),
        hardware,
        Arc::new(FixedClock::at(12, 0, 0)),
        Box::new(log.clone()),
    );

    system.trigger_emergency_stop();
    assert_eq!(
        system.manual_feed(5.0, Duration::from_millis(10)),
        CycleResult::Skipped
    );
    assert_eq!(motor.calls(), vec![MotorCall::Stop]);

    system.resume_after_emergency();
    assert!(!system.is_emergency_stopped());
    assert!(matches!(
        system.manual_feed(5.0, Duration::from_millis(10)),
        CycleResult::Completed(_)
    ));
    assert_eq!(motor.starts(), 1);

    let text = log.text();
    assert!(text.contains("[Emergency stop] System halted due to emergency"));
    assert!(text.contains("[System resumed] Emergency stop cleared"));
}

#[test]
fn emergency_stop_mid_feed_halts_motor_at_once() {
    let (system, board, log) = build(&FeederConfig::default());
    let system = Arc::new(system);
    let feeder = system.clone();
    let feed = std::thread::spawn(move || feeder.manual_feed(5.0, Duration::from_millis(1500)));

    assert!(wait_for(Duration::from_secs(1), || board.motor.is_running()));
    std::thread::sleep(Duration::from_millis(200));

    // Must not wait behind the cycle lock or the feed-duration sleep.
    let t0 = Instant::now();
    system.trigger_emergency_stop();
    assert!(t0.elapsed() < Duration::from_millis(100));
    assert!(!board.motor.is_running());
    assert!(!board.hopper.is_dispensing());

    let halted = board.hopper.grams();
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(board.hopper.grams(), halted);

    // The interrupted cycle still records what actually left the hopper.
    let result = feed.join().unwrap();
    let o = result.outcome().expect("cycle was already past the gate");
    assert!(o.dispensed_grams > 0.0);
    assert!(o.dispensed_grams < 5.0 * 0.9);
    assert!(!o.success);
    assert!(system.is_emergency_stopped());
    assert!(log.text().contains("[Emergency stop]"));
}

#[test]
fn status_reports_driven_duty_not_requested_speed() {
    let (system, board, _log) = build(&FeederConfig::default());
    system.set_motor_speed(128).unwrap();
    assert_eq!(system.status().motor_duty, 128);

    let system = Arc::new(system);
    let feeder = system.clone();
    let feed = std::thread::spawn(move || feeder.manual_feed(0.1, Duration::from_millis(400)));

    assert!(wait_for(Duration::from_secs(1), || board.motor.is_running()));
    // start() drives full duty whatever speed was requested before.
    assert_eq!(system.status().motor_duty, 255);

    feed.join().unwrap();
    let s = system.status();
    assert!(!s.motor_running);
    assert_eq!(s.motor_duty, 0);
    assert!(s.to_string().contains("(duty 0/255)"));
}

#[test]
fn configured_schedules_load_until_first_invalid() {
    let (system, _board, log) = build(&FeederConfig::default());
    let good = ScheduleSpec {
        hour: 8,
        minute: 0,
        duration_ms: 2000,
        target_grams: 5.0,
    };
    assert_eq!(system.load_schedules(&[good, good]).unwrap(), 2);
    assert_eq!(log.count("[Schedule added]"), 2);

    let bad = ScheduleSpec { hour: 25, ..good };
    let err = system.load_schedules(&[good, bad]).unwrap_err();
    assert!(matches!(err, Error::Schedule(ScheduleError::InvalidHour(25))));
    assert_eq!(system.schedules().len(), 3);
}

#[test]
fn monitor_alerts_repeat_while_out_of_band() {
    let config = FeederConfig {
        simulation: fishfeeder::config::SimulationConfig {
            hopper_grams: 10.0,
            dispense_rate_g_per_s: 1.0,
            water_temperature_c: 32.0,
        },
        ..FeederConfig::default()
    };
    let (system, board, log) = build(&config);
    let system = system.with_timing(LoopTiming {
        scheduler_poll: Duration::from_secs(10),
        post_feed_pause: Duration::from_secs(60),
        monitor_interval: Duration::from_millis(10),
    });
    system.start().unwrap();

    assert!(wait_for(Duration::from_secs(3), || log.count("[Temperature alert]") >= 2));
    assert!(log.text().contains("Current temp: 32.00"));
    assert!(log.count("[Low food alert]") >= 2);

    // Back in band: no further temperature alerts.
    board.hopper.set_water_temperature(25.0);
    board.hopper.refill(400.0);
    std::thread::sleep(Duration::from_millis(50));
    let settled = log.count("[Temperature alert]");
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(log.count("[Temperature alert]"), settled);
    system.shutdown();
}

#[test]
fn speed_change_is_applied_and_journaled() {
    let motor = Arc::new(RecordingMotor::new());
    let hardware = Hardware {
        motor: motor.clone(),
        sensors: Arc::new(ScriptedSensors::new(&[100.0], 25.0)),
    };
    let log = SharedBuffer::default();
    let system = FeederSystem::new(
        &FeederConfig::default(),
        hardware,
        Arc::new(FixedClock::at(12, 0, 0)),
        Box::new(log.clone()),
    );
    system.set_motor_speed(128).unwrap();
    assert_eq!(motor.calls(), vec![MotorCall::SetSpeed(128)]);
    assert_eq!(system.status().motor_duty, 128);
    assert!(log.text().contains("[Motor speed]"));
}

#[test]
fn console_commands_drive_the_system() {
    let (system, _board, _log) = build(&FeederConfig::default());
    let run = |line: &str| apply(&system, &OperatorCommand::parse(line).unwrap());

    assert!(run("add 08:00 2000 5").contains("[0] 08:00"));
    assert!(run("list").contains("08:00 for 2000ms, 5.00g"));
    assert!(run("remove 4").contains("No schedule"));
    assert!(run("remove 0").contains("Removed"));
    assert_eq!(run("list"), "No feeding schedules");
    assert_eq!(run("history"), "No feedings recorded");

    assert!(run("estop").contains("engaged"));
    assert!(run("feed 1 50").contains("skipped"));
    assert!(run("resume").contains("cleared"));
    assert!(run("feed 0.05 100").contains("Dispensed"));
    assert!(run("history").contains("Manual feed"));

    assert!(run("calibrate 500").contains("factor"));
    assert!(run("status").contains("System Running: No"));
    assert!(run("start").contains("running"));
    assert!(run("stop").contains("stopped"));
}
