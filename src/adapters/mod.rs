//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements              | Connects to                |
//! |---------------|-------------------------|----------------------------|
//! | `config_file` | ConfigPort              | JSON file on disk          |
//! | `log_file`    | `io::Write` (journal)   | Append-only text log       |
//! | `sim`         | OutputPin, SetDutyCycle | Simulated hopper and motor |
//! |               | MassChannel, Thermometer|                            |
//! | `time`        | ClockPort               | Host local time            |

pub mod config_file;
pub mod log_file;
pub mod sim;
pub mod time;
