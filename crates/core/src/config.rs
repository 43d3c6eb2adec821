//! Simulator configuration.
//!
//! Centralizes the handful of tunables this simulator exposes. Defaults live
//! in [`defaults`] so the CLI and tests can reference the same constants the
//! `Config::default()` impl reads from.

use serde::{Deserialize, Serialize};

/// Default values for [`Config`] fields.
pub mod defaults {
    /// Maximum number of cycles a simulation runs before giving up.
    pub const MAX_CYCLES: u64 = 20_000;
    /// Whether per-cycle trace lines are printed to stdout.
    pub const TRACE: bool = false;
}

/// Top-level simulator configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Hard cap on the number of cycles [`crate::sim::Simulator::run`] will execute.
    pub max_cycles: u64,
    /// When true, print a one-line `(cycle, commits, pc)` trace every cycle.
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cycles: defaults::MAX_CYCLES,
            trace: defaults::TRACE,
        }
    }
}
