//! Runs fixtures through the redline pipeline and checks expectations.

use layered_redline_document::{apply_review_action, DocumentSource, EmptyRedline, RedlineDocument, RedlineSuggestion};
use layered_redline_pipeline::{RedlinePipeline, RedlineRun};
use serde::Serialize;

use crate::{ExpectedFailures, ExpectedOutcome, ExpectedSuggestion, FailureState, HarnessResult, RedlineFixture};

/// A single expectation that did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    /// Reference used by the expected-failures ledger, e.g. `g1.start`
    pub check: String,
    pub expected: String,
    pub actual: String,
}

/// Outcome of running one fixture.
#[derive(Debug, Clone)]
pub struct FixtureReport {
    pub name: String,
    pub title: String,
    /// Number of checks evaluated
    pub checks: usize,
    pub failures: Vec<CheckFailure>,
    /// Overlay rendering of the final document, for failure context
    pub display: Option<String>,
}

impl FixtureReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Default)]
struct Checks {
    count: usize,
    failures: Vec<CheckFailure>,
}

impl Checks {
    fn eq<T: PartialEq + std::fmt::Debug>(&mut self, check: impl Into<String>, expected: T, actual: T) {
        self.count += 1;
        if expected != actual {
            self.failures.push(CheckFailure {
                check: check.into(),
                expected: format!("{:?}", expected),
                actual: format!("{:?}", actual),
            });
        }
    }

    fn fail(&mut self, check: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) {
        self.count += 1;
        self.failures.push(CheckFailure {
            check: check.into(),
            expected: expected.into(),
            actual: actual.into(),
        });
    }
}

/// Run one fixture and evaluate every expectation it states.
pub fn run_fixture(name: &str, fixture: &RedlineFixture) -> FixtureReport {
    let mut source = DocumentSource::new(&fixture.input.file_name, &fixture.input.file_type);
    if let Some(html) = &fixture.input.html {
        source = source.with_html(html.clone());
    }

    let pipeline = RedlinePipeline::new(fixture.config.clone());
    let run = pipeline.run_value(&fixture.input.output, fixture.input.graph.as_ref(), &source);

    let mut checks = Checks::default();
    check_outcome(&mut checks, &fixture.expect.outcome, &run);
    check_warnings(&mut checks, &fixture.expect.warnings, &run);

    let mut display = None;
    if let Some(document) = run.document() {
        check_suggestions(&mut checks, fixture, document);

        let mut document: RedlineDocument = RedlineDocument::clone(document);
        for (idx, action) in fixture.review.iter().enumerate() {
            match apply_review_action(&document, action) {
                Ok(next) => document = next,
                Err(err) => checks.fail(format!("review[{}]", idx), "applied", err.to_string()),
            }
        }
        if let Some(expected) = &fixture.expect.current_content {
            checks.eq("current_content", expected.as_str(), document.current_content.as_str());
        }
        if let Some(html) = &fixture.input.html {
            let rendered = document.render_html(html);
            for (idx, fragment) in fixture.expect.html_contains.iter().enumerate() {
                if !rendered.contains(fragment.as_str()) {
                    checks.fail(format!("html_contains[{}]", idx), fragment.clone(), rendered.clone());
                }
            }
        }
        display = Some(document.display().to_string());
    }

    tracing::debug!(fixture = name, checks = checks.count, failures = checks.failures.len(), "ran fixture");
    FixtureReport {
        name: name.to_string(),
        title: fixture.title.clone(),
        checks: checks.count,
        failures: checks.failures,
        display,
    }
}

/// Run every fixture, classifying failures against the ledger.
pub fn run_harness(
    fixtures: &[(String, RedlineFixture)],
    expected: &ExpectedFailures,
) -> (HarnessResult, Vec<(FixtureReport, Vec<FailureState>)>) {
    let mut result = HarnessResult::new();
    let mut reports = Vec::with_capacity(fixtures.len());

    for (name, fixture) in fixtures {
        let report = run_fixture(name, fixture);
        for _ in 0..report.checks.saturating_sub(report.failures.len()) {
            result.record_pass();
        }
        let states: Vec<FailureState> = report
            .failures
            .iter()
            .map(|failure| expected.state_of(name, &failure.check))
            .collect();
        for state in &states {
            result.record_failure(*state);
        }
        reports.push((report, states));
    }

    (result, reports)
}

fn check_outcome(checks: &mut Checks, expected: &ExpectedOutcome, run: &RedlineRun) {
    let actual = match &run.outcome {
        Ok(_) => ExpectedOutcome::Document,
        Err(EmptyRedline::NoTerminalModules) => ExpectedOutcome::NoTerminalModules,
        Err(EmptyRedline::NoContent { .. }) => ExpectedOutcome::NoContent,
        Err(EmptyRedline::NoSuggestions { .. }) => ExpectedOutcome::NoSuggestions,
    };
    checks.eq("outcome", expected.to_string(), actual.to_string());
}

fn check_warnings(checks: &mut Checks, expected: &[String], run: &RedlineRun) {
    if expected.is_empty() {
        return;
    }
    let actual: Vec<String> = run.warnings.iter().map(|w| serde_label(w, "kind")).collect();
    checks.eq("warnings", expected.to_vec(), actual);
}

fn check_suggestions(checks: &mut Checks, fixture: &RedlineFixture, document: &RedlineDocument) {
    let expect = &fixture.expect;

    if !expect.suggestions.is_empty() {
        let expected_ids: Vec<&str> = expect.suggestions.iter().map(|s| s.id.as_str()).collect();
        let actual_ids: Vec<&str> = document.suggestions.iter().map(|s| s.id.as_str()).collect();
        checks.eq("suggestions", expected_ids, actual_ids);

        for expected in &expect.suggestions {
            if let Some(actual) = document.suggestion(&expected.id) {
                check_suggestion(checks, expected, actual);
            }
        }
    }

    for id in &expect.absent {
        if document.suggestion(id).is_some() {
            checks.fail(format!("absent.{}", id), "absent", "present");
        } else {
            checks.count += 1;
        }
    }

    if let Some(modules) = &expect.source_modules {
        checks.eq("source_modules", modules, &document.metadata.source_modules);
    }
}

fn check_suggestion(checks: &mut Checks, expected: &ExpectedSuggestion, actual: &RedlineSuggestion) {
    let id = &expected.id;
    if let Some(start) = expected.start {
        checks.eq(format!("{}.start", id), start, actual.start_pos);
    }
    if let Some(end) = expected.end {
        checks.eq(format!("{}.end", id), end, actual.end_pos);
    }
    if let Some(paragraph) = &expected.paragraph {
        checks.eq(format!("{}.paragraph", id), paragraph.as_str(), actual.paragraph_id.as_str());
    }

    let labelled = [
        ("type", &expected.kind, serde_label(&actual.suggestion_type, "")),
        ("severity", &expected.severity, serde_label(&actual.severity, "")),
        ("position", &expected.position, serde_label(&actual.position_source, "")),
        ("status", &expected.status, serde_label(&actual.status, "")),
    ];
    for (field, expected, actual) in labelled {
        if let Some(expected) = expected {
            checks.eq(format!("{}.{}", id, field), expected.clone(), actual);
        }
    }
}

/// The serialized name of a value: a bare string, or the `tag` field of an object.
fn serde_label<T: Serialize>(value: &T, tag: &str) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(label)) => label,
        Ok(serde_json::Value::Object(map)) => map
            .get(tag)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}
