//! Fish Feeder: Main Entry Point
//!
//! Host build: the motor and sensors run against a simulated hopper, and
//! the operator drives the system from a line-oriented console.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimHopper pins   JsonConfigFile   AppendLogFile   SystemClock │
//! │  (embedded-hal)   (ConfigPort)     (journal out)   (ClockPort) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │                    FeederSystem                        │    │
//! │  │  Executor · Journal · Interlock                        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  SchedulerLoop thread · MonitorLoop thread · console (main)    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `fishfeeder [config.json]`. `RUST_LOG` overrides the `info`
//! default log filter.
#![deny(unused_must_use)]

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::{self, Sender};
use log::{error, info, warn};

use fishfeeder::adapters::config_file::JsonConfigFile;
use fishfeeder::adapters::log_file::AppendLogFile;
use fishfeeder::adapters::time::SystemClock;
use fishfeeder::app::commands::{self, OperatorCommand};
use fishfeeder::app::ports::{ConfigError, ConfigPort};
use fishfeeder::config::FeederConfig;
use fishfeeder::drivers::hw_init::{self, Board};
use fishfeeder::drivers::task::spawn_task;
use fishfeeder::FeederSystem;

enum Input {
    Line(String),
    Eof,
    Interrupt,
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Fish Feeder v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config (file or defaults) ──────────────────────────
    let config = load_config().context("loading configuration")?;

    // ── 3. Hardware ───────────────────────────────────────────
    let board = init_board(&config).context("hardware initialisation")?;

    // ── 4. Journal output ─────────────────────────────────────
    let log_out: Box<dyn Write + Send> = match AppendLogFile::open(&config.log_path) {
        Ok(f) => Box::new(f),
        Err(e) => {
            warn!(
                "Cannot open {} ({}), journaling to stderr",
                config.log_path.display(),
                e
            );
            Box::new(io::stderr())
        }
    };

    // ── 5. Feeder core ────────────────────────────────────────
    let system = FeederSystem::new(&config, board.hardware(), Arc::new(SystemClock::new()), log_out);
    system
        .load_schedules(&config.schedules)
        .context("schedules in config")?;
    system.start().context("starting feeder loops")?;

    // ── 6. Console ────────────────────────────────────────────
    let (tx, rx) = channel::unbounded::<Input>();
    let ctrlc_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(Input::Interrupt);
    })
    .context("installing Ctrl-C handler")?;
    // Detached: blocks in stdin until the process exits.
    let _console =
        spawn_task("console", 64, move || read_stdin(tx)).context("spawning console reader")?;

    println!("{}", commands::HELP);
    prompt();
    loop {
        let line = match rx.recv() {
            Ok(Input::Line(line)) => line,
            Ok(Input::Interrupt) => {
                info!("Interrupted");
                break;
            }
            Ok(Input::Eof) | Err(_) => break,
        };
        if line.trim().is_empty() {
            prompt();
            continue;
        }
        match OperatorCommand::parse(&line) {
            Ok(OperatorCommand::Quit) => break,
            Ok(cmd) => println!("{}", commands::apply(&system, &cmd)),
            Err(e) => println!("{}", e),
        }
        prompt();
    }

    system.shutdown();
    info!("Bye");
    Ok(())
}

fn load_config() -> fishfeeder::Result<FeederConfig> {
    let Some(path) = std::env::args_os().nth(1) else {
        info!("No config file given, using defaults");
        return Ok(FeederConfig::default());
    };
    let port = JsonConfigFile::new(path);
    match port.load() {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound) => {
            warn!("{} not found, using defaults", port.path().display());
            Ok(FeederConfig::default())
        }
        Err(e) => {
            error!("Config {} rejected: {}", port.path().display(), e);
            Err(e.into())
        }
    }
}

fn init_board(config: &FeederConfig) -> fishfeeder::Result<Board> {
    hw_init::init_sim_board(config).map_err(|e| {
        error!("Hardware init failed: {}, aborting", e);
        e.into()
    })
}

fn read_stdin(tx: Sender<Input>) {
    for line in io::stdin().lock().lines() {
        match line {
            Ok(l) => {
                if tx.send(Input::Line(l)).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!("Console read failed: {}", e);
                break;
            }
        }
    }
    let _ = tx.send(Input::Eof);
}

fn prompt() {
    print!("feeder> ");
    let _ = io::stdout().flush();
}
