//! Expected failures ledger, loaded from `fixtures/expected-failures.toml`.
//!
//! A failing check listed here is reported but does not fail the harness.

use crate::SpecError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const LEDGER_FILE: &str = "expected-failures.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedFailures {
    /// Known limitations (won't fix soon).
    #[serde(default)]
    pub known: Vec<FailureEntry>,
    /// Awaiting a fix.
    #[serde(default)]
    pub pending: Vec<FailureEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    /// Fixture path relative to the fixtures directory.
    pub fixture: String,
    /// Check reference, e.g. `g1.start` or `outcome`.
    pub check: String,
    #[serde(default)]
    pub reason: Option<String>,
    /// Date added (YYYY-MM-DD).
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub issue: Option<String>,
}

impl FailureEntry {
    fn matches(&self, fixture: &str, check: &str) -> bool {
        self.fixture == fixture && self.check == check
    }
}

/// Failure lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureState {
    Known,
    Pending,
    /// Expected to pass; the failure is a regression.
    Regression,
}

impl ExpectedFailures {
    /// Load from a TOML file. A missing file is an empty ledger.
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ledger_error = |message: String| SpecError::Ledger {
            path: path.display().to_string(),
            message,
        };
        let content = fs::read_to_string(path).map_err(|e| ledger_error(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ledger_error(e.to_string()))
    }

    pub fn state_of(&self, fixture: &str, check: &str) -> FailureState {
        if self.known.iter().any(|e| e.matches(fixture, check)) {
            FailureState::Known
        } else if self.pending.iter().any(|e| e.matches(fixture, check)) {
            FailureState::Pending
        } else {
            FailureState::Regression
        }
    }

    pub fn entry(&self, fixture: &str, check: &str) -> Option<&FailureEntry> {
        self.known
            .iter()
            .chain(self.pending.iter())
            .find(|e| e.matches(fixture, check))
    }

    pub fn count(&self) -> usize {
        self.known.len() + self.pending.len()
    }
}

/// Tally of a harness run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessResult {
    pub total: usize,
    pub passed: usize,
    pub expected_failures: usize,
    pub regressions: usize,
}

impl HarnessResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 0 = pass, 1 = regressions.
    pub fn exit_code(&self) -> i32 {
        if self.regressions > 0 {
            1
        } else {
            0
        }
    }

    pub fn success(&self) -> bool {
        self.regressions == 0
    }

    pub fn record_pass(&mut self) {
        self.total += 1;
        self.passed += 1;
    }

    pub fn record_failure(&mut self, state: FailureState) {
        self.total += 1;
        match state {
            FailureState::Known | FailureState::Pending => self.expected_failures += 1,
            FailureState::Regression => self.regressions += 1,
        }
    }
}
