//! Human-readable reports for fixture failures.

use crate::{CheckFailure, FailureState, FixtureReport, HarnessResult};
use std::fmt::Write;

/// Format one failed check with the document it was checked against.
pub fn format_failure(report: &FixtureReport, failure: &CheckFailure, state: FailureState) -> String {
    let mut output = String::new();

    let label = match state {
        FailureState::Known => "KNOWN",
        FailureState::Pending => "PENDING",
        FailureState::Regression => "FAIL",
    };
    let _ = writeln!(output, "\n{}: {} [{}]", label, report.name, failure.check);
    let _ = writeln!(output, "  {}", report.title);
    let _ = writeln!(output);
    let _ = writeln!(output, "    expected: {}", failure.expected);
    let _ = writeln!(output, "    actual:   {}", failure.actual);

    if let Some(display) = &report.display {
        let _ = writeln!(output);
        for line in display.lines() {
            let _ = writeln!(output, "  | {}", line);
        }
    }

    if let Some(hint) = hint(failure) {
        let _ = writeln!(output);
        let _ = writeln!(output, "  hint: {}", hint);
    }

    output
}

/// One summary line per fixture plus a total.
pub fn format_summary(reports: &[(FixtureReport, Vec<FailureState>)], result: &HarnessResult) -> String {
    let mut output = String::new();
    for (report, states) in reports {
        let regressions = states.iter().filter(|s| **s == FailureState::Regression).count();
        let status = if regressions > 0 { "FAIL" } else { "PASS" };
        let _ = writeln!(
            output,
            "{}: {} ({} checks, {} failed, {} regressions)",
            status,
            report.name,
            report.checks,
            report.failures.len(),
            regressions
        );
    }
    let _ = writeln!(
        output,
        "{} checks: {} passed, {} expected failures, {} regressions",
        result.total, result.passed, result.expected_failures, result.regressions
    );
    output
}

fn hint(failure: &CheckFailure) -> Option<&'static str> {
    if failure.check.ends_with(".start") || failure.check.ends_with(".end") {
        return Some("offsets count chars, not bytes; check for anchors or multi-byte text before the span");
    }
    if failure.check == "outcome" && failure.actual.contains("noSuggestions") {
        return Some("every suggestion was dropped; the warnings list names the modules that lost them");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> FixtureReport {
        FixtureReport {
            name: "off-by-one.toml".to_string(),
            title: "Off-by-one claim".to_string(),
            checks: 3,
            failures: vec![CheckFailure {
                check: "g1.start".to_string(),
                expected: "26".to_string(),
                actual: "27".to_string(),
            }],
            display: Some("bad grammer.\n    ╰─────╯x".to_string()),
        }
    }

    #[test]
    fn failure_report() {
        let report = report();
        let text = format_failure(&report, &report.failures[0], FailureState::Regression);
        insta::assert_snapshot!(text.trim_start(), @r###"
        FAIL: off-by-one.toml [g1.start]
          Off-by-one claim

            expected: 26
            actual:   27

          | bad grammer.
          |     ╰─────╯x

          hint: offsets count chars, not bytes; check for anchors or multi-byte text before the span
        "###);
    }

    #[test]
    fn summary_counts_regressions() {
        let result = HarnessResult {
            total: 3,
            passed: 2,
            expected_failures: 0,
            regressions: 1,
        };
        let text = format_summary(&[(report(), vec![FailureState::Regression])], &result);
        insta::assert_snapshot!(text, @r###"
        FAIL: off-by-one.toml (3 checks, 1 failed, 1 regressions)
        3 checks: 2 passed, 0 expected failures, 1 regressions
        "###);
    }
}
