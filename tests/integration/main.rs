//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters or the simulated board. All tests run on the host
//! with no real hardware required.

mod feed_cycle_tests;
mod scheduler_tests;
mod system_tests;
