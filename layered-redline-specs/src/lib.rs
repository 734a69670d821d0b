#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Fixture-driven scenario testing for layered-redline.
//!
//! Each `.toml` file under `fixtures/` holds a raw pipeline output, an
//! optional graph and review script, and the document the run must produce.
//!
//! ## Modules
//!
//! - [`fixture`] - Fixture file format
//! - [`loader`] - Loading fixtures from disk
//! - [`runner`] - Running fixtures through [`RedlinePipeline`](layered_redline_pipeline::RedlinePipeline)
//! - [`failures`] - Expected failures tracking via TOML
//! - [`formatter`] - Failure and summary reports
//! - [`errors`] - Error types for the harness

pub mod errors;
pub mod failures;
pub mod fixture;
pub mod formatter;
pub mod loader;
pub mod runner;

pub use errors::{SpecError, SpecResult};
pub use failures::{ExpectedFailures, FailureEntry, FailureState, HarnessResult};
pub use fixture::{ExpectedOutcome, ExpectedSuggestion, Expectations, FixtureInput, RedlineFixture};
pub use formatter::{format_failure, format_summary};
pub use loader::{fixtures_dir, load_all_fixtures, load_fixture};
pub use runner::{run_fixture, run_harness, CheckFailure, FixtureReport};

#[cfg(test)]
mod tests;
