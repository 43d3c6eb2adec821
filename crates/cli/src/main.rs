//! Out-of-order RISC-V integer core simulator CLI.
//!
//! Loads an instruction image, runs the pipeline to completion (or to a
//! cycle cap), and prints the final architectural state plus run
//! statistics. Optionally writes a JSON report sidecar for comparison with
//! `cmpreports`.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use ooop_core::config::{self, Config};
use ooop_core::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "Out-of-order RISC-V integer core simulator",
    long_about = "Simulates a small out-of-order superscalar RISC-V integer core from a \
hex-byte instruction image, cycle by cycle, and reports the final architectural state."
)]
struct Cli {
    /// Instruction image: one hex byte per non-blank, non-comment line.
    image_file: PathBuf,

    /// Maximum number of cycles to run before giving up.
    #[arg(long, default_value_t = config::defaults::MAX_CYCLES)]
    max_cycles: u64,

    /// Print a one-line trace every cycle.
    #[arg(long, default_value_t = config::defaults::TRACE)]
    trace: bool,

    /// Write the final report as JSON to this path, alongside the usual
    /// stdout summary.
    #[arg(long)]
    report_json: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let config = Config {
        max_cycles: cli.max_cycles,
        trace: cli.trace,
    };

    let mut sim = Simulator::new(config);
    if let Err(err) = sim.load_image(&cli.image_file) {
        eprintln!("error: {err}");
        process::exit(1);
    }

    let report = sim.run();
    println!("{report}");
    sim.stats().print();

    if let Some(path) = cli.report_json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                if let Err(err) = std::fs::write(&path, json) {
                    eprintln!("error: could not write report to '{}': {err}", path.display());
                    process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("error: could not serialize report: {err}");
                process::exit(1);
            }
        }
    }
}
