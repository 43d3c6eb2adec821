//! Simulation driver: wires the engine to its memories, loads an
//! instruction image, and runs the tick loop to completion.

/// Hex-byte instruction image loader.
pub mod loader;

use std::path::Path;

use crate::common::error::ImageError;
use crate::config::Config;
use crate::core::dmem::DataMemory;
use crate::core::imem::InstructionMemory;
use crate::pipeline::engine::Engine;
use crate::report::Report;
use crate::stats::Stats;

/// Owns the engine, both memories, and the run's accumulated statistics.
#[derive(Clone, Debug, Default)]
pub struct Simulator {
    config: Config,
    engine: Engine,
    imem: InstructionMemory,
    dmem: DataMemory,
    stats: Stats,
}

impl Simulator {
    /// Builds a simulator with fresh, empty memories.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Loads an instruction image from `path` into instruction memory.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] if the file is missing, malformed, or too
    /// large for instruction memory; see [`loader::load_image`].
    pub fn load_image(&mut self, path: &Path) -> Result<(), ImageError> {
        let words = loader::load_image(path)?;
        self.imem.load(&words);
        Ok(())
    }

    /// Advances the simulation by one cycle, folding the tick's events into
    /// [`Stats`] and optionally printing a trace line.
    pub fn tick(&mut self) {
        let events = self.engine.tick(&self.imem, &mut self.dmem);
        self.stats.cycles += 1;
        if events.committed {
            self.stats.commits += 1;
        }
        if events.mispredict {
            self.stats.mispredicts += 1;
        }
        if events.stall_no_free_preg {
            self.stats.stalls_no_free_preg += 1;
        }
        if events.stall_no_rob_tag {
            self.stats.stalls_no_rob_tag += 1;
        }
        if events.stall_no_rs_slot {
            self.stats.stalls_no_rs_slot += 1;
        }
        if self.config.trace {
            let (a0, a1) = self.engine.reported_registers();
            println!(
                "cycle {:>6}  pc={:#010x}  rob={:>2}  commits={:>6}  a0={a0:#010x}  a1={a1:#010x}",
                self.stats.cycles,
                self.engine.pc(),
                self.engine.rob_len(),
                self.stats.commits,
            );
        }
    }

    /// Runs until [`Config::max_cycles`] is reached, returning the final
    /// report.
    #[must_use]
    pub fn run(&mut self) -> Report {
        while self.stats.cycles < self.config.max_cycles {
            self.tick();
        }
        self.report()
    }

    /// The current (or final) simulation statistics.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Snapshots the current architectural state as a [`Report`].
    #[must_use]
    pub fn report(&self) -> Report {
        let (a0, a1) = self.engine.reported_registers();
        Report {
            cycle: self.stats.cycles,
            commits: self.stats.commits,
            a0,
            a1,
        }
    }
}
