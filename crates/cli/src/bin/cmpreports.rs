//! Compares two JSON simulation reports scalar by scalar.
//!
//! Intended for co-verification: run the simulator and the reference
//! hardware (or RTL testbench) independently, each producing a `Report`
//! JSON sidecar, then diff them here.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use ooop_core::Report;

#[derive(Parser, Debug)]
#[command(
    name = "cmpreports",
    author,
    version,
    about = "Compares two simulation report JSON files"
)]
struct Cli {
    /// First report JSON file.
    left: PathBuf,
    /// Second report JSON file.
    right: PathBuf,
}

fn read_report(path: &PathBuf) -> Report {
    let text = std::fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("error: could not read '{}': {err}", path.display());
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|err| {
        eprintln!("error: could not parse '{}' as a report: {err}", path.display());
        process::exit(1);
    })
}

fn main() {
    let cli = Cli::parse();

    let left = read_report(&cli.left);
    let right = read_report(&cli.right);
    let mismatches = left.diff(&right);

    println!("{:<10} {:<20} {:<20}", "field", cli.left.display(), cli.right.display());
    println!("{:<10} {:<20} {:<20}", "cycle", left.cycle, right.cycle);
    println!("{:<10} {:<20} {:<20}", "commits", left.commits, right.commits);
    println!("{:<10} {:<20} {:<20}", "a0", format!("{:#010x}", left.a0), format!("{:#010x}", right.a0));
    println!("{:<10} {:<20} {:<20}", "a1", format!("{:#010x}", left.a1), format!("{:#010x}", right.a1));

    if mismatches.is_empty() {
        println!("\nMATCH");
    } else {
        println!("\nMISMATCH: {}", mismatches.join(", "));
        process::exit(1);
    }
}
