use crate::failures::LEDGER_FILE;
use crate::{
    fixtures_dir, format_failure, format_summary, load_all_fixtures, load_fixture, run_fixture,
    run_harness, ExpectedFailures, FailureState, RedlineFixture,
};

fn fixture(name: &str) -> RedlineFixture {
    load_fixture(&fixtures_dir().join(name)).unwrap_or_else(|err| panic!("{}", err))
}

#[test]
fn bundled_fixtures_have_no_regressions() {
    let fixtures = load_all_fixtures(&fixtures_dir()).unwrap();
    assert!(fixtures.len() >= 12);
    let expected = ExpectedFailures::load(&fixtures_dir().join(LEDGER_FILE)).unwrap();

    let (result, reports) = run_harness(&fixtures, &expected);
    if !result.success() {
        let mut message = String::new();
        for (report, states) in &reports {
            for (failure, state) in report.failures.iter().zip(states) {
                if *state == FailureState::Regression {
                    message.push_str(&format_failure(report, failure, *state));
                }
            }
        }
        message.push_str(&format_summary(&reports, &result));
        panic!("{}", message);
    }
    assert!(result.passed > 0);
}

#[test]
fn off_by_one_claim_report() {
    let report = run_fixture("off-by-one-grammar.toml", &fixture("off-by-one-grammar.toml"));
    assert!(report.passed(), "{:?}", report.failures);
    insta::assert_snapshot!(report.display.unwrap(), @r###"
    Hello world.↵↵This is bad grammer.
                              ╰─────╯grammar("grammer" → "grammar")
    "###);
}

#[test]
fn mismatches_are_reported_per_field() {
    let mut fixture = fixture("off-by-one-grammar.toml");
    fixture.expect.suggestions[0].start = Some(33);
    fixture.expect.suggestions[0].position = Some("flat".to_string());

    let report = run_fixture("off-by-one-grammar.toml", &fixture);
    let checks: Vec<(&str, &str)> = report
        .failures
        .iter()
        .map(|f| (f.check.as_str(), f.actual.as_str()))
        .collect();
    assert_eq!(checks, vec![("g1.start", "26"), ("g1.position", "\"relocated\"")]);
}

#[test]
fn ledger_turns_failures_into_expected_ones() {
    let mut broken = fixture("negative-citation.toml");
    broken.expect.absent = vec!["cites-c0".to_string()];
    let fixtures = vec![("negative-citation.toml".to_string(), broken)];

    let (result, _) = run_harness(&fixtures, &ExpectedFailures::default());
    assert_eq!(result.regressions, 1);

    let ledger: ExpectedFailures = toml::from_str(
        r#"
[[known]]
fixture = "negative-citation.toml"
check = "absent.cites-c0"
"#,
    )
    .unwrap();
    let (result, _) = run_harness(&fixtures, &ledger);
    assert!(result.success());
    assert_eq!(result.expected_failures, 1);
}

#[test]
fn review_failures_are_checks() {
    let mut fixture = fixture("review-accept-reject.toml");
    fixture.review.push(layered_redline_document::ReviewAction::Accept("g1".to_string()));
    let report = run_fixture("review-accept-reject.toml", &fixture);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].check, "review[2]");
}
