//! Final simulation state report: the four scalars compared across a
//! simulator/hardware co-verification run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// End-of-simulation architectural state.
///
/// Printed in human-readable form by the CLI and serialized to a JSON
/// sidecar (via `serde_json`, already a workspace dependency) so
/// `cmpreports` can compare two runs structurally instead of scraping text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Total ticks executed.
    pub cycle: u64,
    /// Total ROB commits (retired instructions).
    pub commits: u64,
    /// Architectural register `a0` (x10) at the end of simulation.
    pub a0: u32,
    /// Architectural register `a1` (x11) at the end of simulation.
    pub a1: u32,
}

impl Report {
    /// Compares `self` against `other` scalar by scalar, returning the
    /// names of any mismatching fields.
    #[must_use]
    pub fn diff(&self, other: &Self) -> Vec<&'static str> {
        let mut mismatches = Vec::new();
        if self.cycle != other.cycle {
            mismatches.push("cycle");
        }
        if self.commits != other.commits {
            mismatches.push("commits");
        }
        if self.a0 != other.a0 {
            mismatches.push("a0");
        }
        if self.a1 != other.a1 {
            mismatches.push("a1");
        }
        mismatches
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cycle      {}", self.cycle)?;
        writeln!(f, "commits    {}", self.commits)?;
        writeln!(f, "a0         {:#010X} ({})", self.a0, self.a0 as i32)?;
        writeln!(f, "a1         {:#010X} ({})", self.a1, self.a1 as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_reports_diff_to_nothing() {
        let report = Report {
            cycle: 10,
            commits: 3,
            a0: 7,
            a1: 9,
        };
        assert!(report.diff(&report).is_empty());
    }

    #[test]
    fn diff_names_every_mismatching_scalar() {
        let a = Report {
            cycle: 10,
            commits: 3,
            a0: 7,
            a1: 9,
        };
        let b = Report {
            cycle: 11,
            commits: 3,
            a0: 8,
            a1: 9,
        };
        assert_eq!(a.diff(&b), vec!["cycle", "a0"]);
    }

    #[test]
    fn display_formats_negative_a0_as_signed_decimal() {
        let report = Report {
            cycle: 0,
            commits: 0,
            a0: 0xFFFF_FFFF,
            a1: 0,
        };
        let text = report.to_string();
        assert!(text.contains("0xFFFFFFFF (-1)"));
    }
}
