//! Simulation statistics collection and reporting.
//!
//! Scoped-down counterpart of a full-system simulator's stats block: this
//! core has no caches, no floating point, and a single commit per cycle, so
//! only cycle/commit/stall/mispredict counters apply.

/// Plain counters incremented by the pipeline engine's tick loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    /// Total ticks executed.
    pub cycles: u64,
    /// Total ROB commits (retired instructions).
    pub commits: u64,
    /// Cycles where dispatch stalled for lack of a free physical register.
    pub stalls_no_free_preg: u64,
    /// Cycles where dispatch stalled for lack of a ROB tag.
    pub stalls_no_rob_tag: u64,
    /// Cycles where dispatch stalled for lack of a reservation station slot.
    pub stalls_no_rs_slot: u64,
    /// Number of branch/jump mispredicts detected (and recovered from).
    pub mispredicts: u64,
}

impl Stats {
    /// Prints a short human-readable summary to stdout.
    pub fn print(&self) {
        let ipc = if self.cycles == 0 {
            0.0
        } else {
            self.commits as f64 / self.cycles as f64
        };
        println!("----------------------------------------------------------");
        println!("SIMULATION STATISTICS");
        println!("  cycles                 {}", self.cycles);
        println!("  commits                {}", self.commits);
        println!("  ipc                    {ipc:.4}");
        println!("  mispredicts            {}", self.mispredicts);
        println!(
            "  stalls.no_free_preg    {}",
            self.stalls_no_free_preg
        );
        println!("  stalls.no_rob_tag      {}", self.stalls_no_rob_tag);
        println!("  stalls.no_rs_slot      {}", self.stalls_no_rs_slot);
        println!("----------------------------------------------------------");
    }
}
