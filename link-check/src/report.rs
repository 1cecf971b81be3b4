use std::fmt;

use crate::checker::CheckOutcome;
use crate::ignore::IgnoreList;

pub const FAILURE_EXIT_CODE: u8 = 2;

/// Links split into the ones to check and the known-noise ones to skip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub to_check: Vec<String>,
    pub skipped: Vec<String>,
}

impl Plan {
    pub fn new(links: Vec<String>, ignore: &IgnoreList) -> Self {
        let (skipped, to_check) = links.into_iter().partition(|link| ignore.is_ignored(link));
        Self { to_check, skipped }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Found {} external links to check (skipped {} known-noise links)",
            self.to_check.len(),
            self.skipped.len()
        )?;
        if !self.skipped.is_empty() {
            writeln!(f, "\nSkipped links:")?;
            for link in &self.skipped {
                writeln!(f, "  - {}", link)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    outcomes: Vec<CheckOutcome>,
}

impl Report {
    /// Outcomes are sorted by URL so output does not depend on completion order.
    pub fn new(mut outcomes: Vec<CheckOutcome>) -> Self {
        outcomes.sort_by(|a, b| a.url.cmp(&b.url));
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_failure())
    }

    pub fn exit_code(&self) -> u8 {
        if self.failures().next().is_some() {
            FAILURE_EXIT_CODE
        } else {
            0
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in self.failures() {
            let status = outcome
                .status
                .map(|status| status.to_string())
                .unwrap_or_else(|| "no response".to_string());
            writeln!(f, "BAD: {} -> {} ({})", outcome.url, status, outcome.detail)?;
        }
        writeln!(f, "\nSummary:")?;
        writeln!(f, "  Total checked: {}", self.outcomes.len())?;
        writeln!(f, "  Failures: {}", self.failures().count())
    }
}
