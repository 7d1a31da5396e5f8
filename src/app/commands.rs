//! Operator commands for the feeder system.
//!
//! One line of text per command, as typed on the console:
//!
//! ```text
//! status | list | history | help | quit
//! add HH:MM <duration_ms> <grams>     remove <index>
//! feed <grams> <duration_ms>          speed <0-255>
//! calibrate <grams>                   estop | resume | start | stop
//! ```
//!
//! [`OperatorCommand::parse`] validates arguments up front so [`apply`]
//! never sees a malformed request. `Display` renders the canonical form,
//! which parses back to the same command.

use core::fmt;
use core::time::Duration;
use std::fmt::Write as _;

use crate::error::ScheduleError;
use crate::schedule::ScheduleEntry;

use super::events::ctime;
use super::executor::CycleResult;
use super::service::FeederSystem;

pub const HELP: &str = "\
Commands:
  status                          system status
  list                            list feeding schedules
  add HH:MM <duration_ms> <grams> add a feeding schedule
  remove <index>                  remove a feeding schedule
  feed <grams> <duration_ms>      feed now
  calibrate <grams>               calibrate the scale with a known mass
  speed <0-255>                   set motor duty
  estop                           emergency stop
  resume                          clear emergency stop
  start | stop                    start or stop the scheduler and monitor
  history                         feeding history
  help                            this text
  quit                            shut down and exit";

#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    Status,
    List,
    Add(ScheduleEntry),
    Remove(usize),
    Feed { grams: f32, duration: Duration },
    Calibrate(f32),
    EmergencyStop,
    Resume,
    Speed(u8),
    Start,
    Stop,
    History,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    InvalidArgument(&'static str),
    TrailingInput,
    Schedule(ScheduleError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::Unknown(word) => write!(f, "unknown command '{}' (try 'help')", word),
            Self::MissingArgument(what) => write!(f, "missing argument: {}", what),
            Self::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
            Self::TrailingInput => write!(f, "unexpected trailing input"),
            Self::Schedule(e) => write!(f, "invalid schedule: {}", e),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ScheduleError> for CommandError {
    fn from(e: ScheduleError) -> Self {
        Self::Schedule(e)
    }
}

impl OperatorCommand {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut args = line.split_whitespace();
        let word = args.next().ok_or(CommandError::Empty)?;

        let cmd = match word.to_ascii_lowercase().as_str() {
            "status" => Self::Status,
            "list" => Self::List,
            "add" => {
                let (hour, minute) = parse_clock(next(&mut args, "HH:MM")?)?;
                let ms = parse_millis(next(&mut args, "duration_ms")?)?;
                let grams = parse_grams(next(&mut args, "grams")?)?;
                Self::Add(ScheduleEntry::new(hour, minute, ms, grams)?)
            }
            "remove" => Self::Remove(
                next(&mut args, "index")?
                    .parse()
                    .map_err(|_| CommandError::InvalidArgument("index"))?,
            ),
            "feed" => {
                let grams = parse_grams(next(&mut args, "grams")?)?;
                let ms = parse_millis(next(&mut args, "duration_ms")?)?;
                Self::Feed {
                    grams,
                    duration: Duration::from_millis(u64::from(ms)),
                }
            }
            "calibrate" => Self::Calibrate(parse_grams(next(&mut args, "grams")?)?),
            "estop" => Self::EmergencyStop,
            "resume" => Self::Resume,
            "speed" => Self::Speed(
                next(&mut args, "speed")?
                    .parse()
                    .map_err(|_| CommandError::InvalidArgument("speed must be 0-255"))?,
            ),
            "start" => Self::Start,
            "stop" => Self::Stop,
            "history" => Self::History,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return Err(CommandError::Unknown(word.to_owned())),
        };

        if args.next().is_some() {
            return Err(CommandError::TrailingInput);
        }
        Ok(cmd)
    }
}

impl fmt::Display for OperatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => write!(f, "status"),
            Self::List => write!(f, "list"),
            Self::Add(e) => write!(
                f,
                "add {:02}:{:02} {} {}",
                e.hour(),
                e.minute(),
                e.duration_ms(),
                e.target_grams()
            ),
            Self::Remove(i) => write!(f, "remove {}", i),
            Self::Feed { grams, duration } => {
                write!(f, "feed {} {}", grams, duration.as_millis())
            }
            Self::Calibrate(g) => write!(f, "calibrate {}", g),
            Self::EmergencyStop => write!(f, "estop"),
            Self::Resume => write!(f, "resume"),
            Self::Speed(s) => write!(f, "speed {}", s),
            Self::Start => write!(f, "start"),
            Self::Stop => write!(f, "stop"),
            Self::History => write!(f, "history"),
            Self::Help => write!(f, "help"),
            Self::Quit => write!(f, "quit"),
        }
    }
}

fn next<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    what: &'static str,
) -> Result<&'a str, CommandError> {
    args.next().ok_or(CommandError::MissingArgument(what))
}

/// Range checks are left to [`ScheduleEntry::new`].
fn parse_clock(s: &str) -> Result<(u8, u8), CommandError> {
    let (h, m) = s
        .split_once(':')
        .ok_or(CommandError::InvalidArgument("time must be HH:MM"))?;
    let hour = h
        .parse()
        .map_err(|_| CommandError::InvalidArgument("time must be HH:MM"))?;
    let minute = m
        .parse()
        .map_err(|_| CommandError::InvalidArgument("time must be HH:MM"))?;
    Ok((hour, minute))
}

fn parse_millis(s: &str) -> Result<u32, CommandError> {
    match s.parse::<u32>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(CommandError::InvalidArgument(
            "duration_ms must be a positive integer",
        )),
    }
}

fn parse_grams(s: &str) -> Result<f32, CommandError> {
    match s.parse::<f32>() {
        Ok(g) if g.is_finite() && g > 0.0 => Ok(g),
        _ => Err(CommandError::InvalidArgument("grams must be positive")),
    }
}

/// Perform `cmd` against `system` and render the reply.
///
/// `Quit` only shuts the system down; leaving the input loop is up to the
/// caller.
pub fn apply(system: &FeederSystem, cmd: &OperatorCommand) -> String {
    match cmd {
        OperatorCommand::Status => system.status().to_string(),
        OperatorCommand::List => {
            let entries = system.schedules();
            if entries.is_empty() {
                return "No feeding schedules".into();
            }
            let mut out = String::new();
            for (i, e) in entries.iter().enumerate() {
                let _ = writeln!(out, "[{}] {}", i, e);
            }
            out.trim_end().to_owned()
        }
        OperatorCommand::Add(entry) => {
            let index = system.add_schedule(*entry);
            format!("Added schedule [{}] {}", index, entry)
        }
        OperatorCommand::Remove(index) => match system.remove_schedule(*index) {
            Some(e) => format!("Removed schedule [{}] {}", index, e),
            None => format!("No schedule at index {}", index),
        },
        OperatorCommand::Feed { grams, duration } => {
            match system.manual_feed(*grams, *duration) {
                CycleResult::Completed(o) => format!(
                    "Dispensed {:.2}g of {:.2}g target ({})",
                    o.dispensed_grams,
                    grams,
                    if o.success { "success" } else { "under target" }
                ),
                CycleResult::Skipped => "Feed skipped: emergency stop active".into(),
                CycleResult::Faulted(e) => format!("Feed aborted: {}", e),
            }
        }
        OperatorCommand::Calibrate(grams) => match system.calibrate_scale(*grams) {
            Ok(factor) => format!("Scale calibrated, factor {}", factor),
            Err(e) => format!("Calibration failed: {}", e),
        },
        OperatorCommand::EmergencyStop => {
            system.trigger_emergency_stop();
            "Emergency stop engaged".into()
        }
        OperatorCommand::Resume => {
            system.resume_after_emergency();
            "Emergency stop cleared".into()
        }
        OperatorCommand::Speed(speed) => match system.set_motor_speed(*speed) {
            Ok(()) => format!("Motor speed set to {}", speed),
            Err(e) => format!("Speed change failed: {}", e),
        },
        OperatorCommand::Start => match system.start() {
            Ok(()) => "Feeding system running".into(),
            Err(e) => format!("Start failed: {}", e),
        },
        OperatorCommand::Stop | OperatorCommand::Quit => {
            system.shutdown();
            "Feeding system stopped".into()
        }
        OperatorCommand::History => {
            let history = system.history();
            if history.is_empty() {
                return "No feedings recorded".into();
            }
            let mut out = String::new();
            for o in &history {
                let _ = writeln!(
                    out,
                    "{}  {:.2}g  {:.2}\u{00b0}C  {}  {}",
                    ctime(&o.timestamp),
                    o.dispensed_grams,
                    o.temperature_c,
                    if o.success { "Yes" } else { "No" },
                    o.note
                );
            }
            out.trim_end().to_owned()
        }
        OperatorCommand::Help => HELP.into(),
    }
}
