//! Colored console reporting for probe results.
//!
//! The per-check status lines are the product output of the smoke run, so
//! they go straight to stdout rather than through tracing.

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const RESET: &str = "\x1b[0m";

/// Outcome of a single probe, consumed immediately for logging and tally.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl ProbeResult {
    pub fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
        }
    }
}

/// Pass/fail tally for the whole run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub passed: usize,
    pub total: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &ProbeResult) {
        self.total += 1;
        if result.passed {
            self.passed += 1;
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// Print one symbol-prefixed status line for a probe outcome.
pub fn print_result(result: &ProbeResult) {
    let (color, symbol) = if result.passed {
        (GREEN, "✓")
    } else {
        (RED, "✗")
    };
    println!("{color}{symbol}{RESET} {}", result.detail);
}

/// Blue banner line opening the run.
pub fn banner(message: &str) {
    println!("{BLUE}▶{RESET} {message}\n");
}

/// Yellow section header for a group of probes.
pub fn section(message: &str) {
    println!("{YELLOW}●{RESET} {message}");
}

/// Yellow interruption notice.
pub fn interrupted(message: &str) {
    println!("{YELLOW}⚡{RESET} {message}");
}

/// Red fatal-error line for failures outside any single probe.
pub fn fatal(message: &str) {
    println!("{RED}✗{RESET} {message}");
}

/// Final green-or-red summary line.
pub fn print_summary(summary: &RunSummary) {
    println!();
    if summary.all_passed() {
        println!(
            "{GREEN}✓{RESET} All checks passed ({}/{})",
            summary.passed, summary.total
        );
    } else {
        println!(
            "{RED}✗{RESET} Some checks failed: {}/{} passed",
            summary.passed, summary.total
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_tally() {
        let mut summary = RunSummary::default();
        summary.record(&ProbeResult::pass("a", "a passed"));
        summary.record(&ProbeResult::fail("b", "b failed"));
        summary.record(&ProbeResult::pass("c", "c passed"));

        assert_eq!(summary.passed, 2);
        assert_eq!(summary.total, 3);
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_empty_run_counts_as_all_passed() {
        // Degenerate but consistent: 0 == 0.
        let summary = RunSummary::default();
        assert!(summary.all_passed());
    }
}
