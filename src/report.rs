//! Per-command outcome reporting.
//!
//! One line is written for every command handled without a fatal error,
//! tagged with the command's source line. There is no summary: a run either
//! reports every command or stops at the first failure.

use crate::script::CommandKind;
use std::io::{self, Stdout, Write};

/// How a command was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A module was loaded and registered.
    Loaded,
    /// An action ran and any expected value matched.
    Passed,
    /// The command belongs to a category this harness does not execute.
    Skipped(CommandKind),
}

pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<Stdout> {
    pub fn stdout() -> Self {
        Reporter::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Reporter { out }
    }

    /// Write the record for one command.
    ///
    /// Skips get their own tag so they are never mistaken for passes.
    pub fn record(&mut self, line: u32, outcome: &Outcome) -> io::Result<()> {
        match outcome {
            Outcome::Loaded | Outcome::Passed => writeln!(self.out, "PASS L{line}"),
            Outcome::Skipped(kind) => writeln!(self.out, "SKIP L{line} {kind}"),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(records: &[(u32, Outcome)]) -> String {
        let mut reporter = Reporter::new(Vec::new());
        for (line, outcome) in records {
            reporter.record(*line, outcome).unwrap();
        }
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_pass_records() {
        let output = render(&[(1, Outcome::Loaded), (4, Outcome::Passed)]);
        assert_eq!(output, "PASS L1\nPASS L4\n");
    }

    #[test]
    fn test_skip_is_not_a_pass() {
        let output = render(&[(12, Outcome::Skipped(CommandKind::AssertTrap))]);
        assert_eq!(output, "SKIP L12 assert_trap\n");
        assert!(!output.contains("PASS"));
    }
}
