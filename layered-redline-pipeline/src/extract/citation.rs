use layered_redline_document::{PositionSource, RedlineSuggestion, Severity, SuggestionType};
use serde_json::Value;

use super::{anchor_paragraph_id, ExtractContext};
use crate::access::{probe_array, probe_bool, probe_f64, probe_i64, probe_str, AccessPath};

const FINDING_PATHS: &[AccessPath] = &[
    "citations",
    "findings",
    "verifiedCitations",
    "citationResults",
    "results",
    "data.citations",
    "analysis",
    "output.analysis",
    "output.citations",
    "finalOutput.output.analysis",
    "",
];

const TEXT_PATHS: &[AccessPath] = &["citationText", "originalText", "citation", "citation.text", "text"];
const CORRECTION_PATHS: &[AccessPath] = &[
    "correction",
    "suggestedCorrection",
    "correctedCitation",
    "suggestedText",
    "corrected",
];
const EXPLANATION_PATHS: &[AccessPath] = &["explanation", "issue", "message", "notes", "reason"];
const STATUS_PATHS: &[AccessPath] = &["status", "verificationStatus"];
const START_PATHS: &[AccessPath] = &["startPos"];
const END_PATHS: &[AccessPath] = &["endPos"];
const ID_PATHS: &[AccessPath] = &["id", "citationId"];
const PARAGRAPH_ID_PATHS: &[AccessPath] = &["paragraphId", "paragraph_id"];
const PARAGRAPH_ANCHOR_PATHS: &[AccessPath] = &["paragraphText", "context"];

const NEEDS_VERIFICATION_STATUSES: &[&str] = &["needs_verification", "unverified", "questionable"];

/// Extract citation findings from a module result.
///
/// Offsets are mandatory here: a finding without numeric `startPos`/`endPos`
/// satisfying `endPos > startPos >= 0` is dropped rather than guessed.
pub fn extract_citations(result: &Value, ctx: &ExtractContext<'_>) -> Vec<RedlineSuggestion> {
    let Some((_, findings)) = probe_array(result, FINDING_PATHS) else {
        tracing::debug!(source = ctx.source_id, "no citation findings in result");
        return Vec::new();
    };

    let suggestions: Vec<RedlineSuggestion> = findings
        .iter()
        .enumerate()
        .filter_map(|(idx, finding)| read_finding(finding, idx, ctx))
        .collect();

    tracing::debug!(
        source = ctx.source_id,
        findings = findings.len(),
        count = suggestions.len(),
        "extracted citation suggestions"
    );
    suggestions
}

fn read_finding(finding: &Value, idx: usize, ctx: &ExtractContext<'_>) -> Option<RedlineSuggestion> {
    let fallback_id = format!("{}-c{}", ctx.source_id, idx);

    let Some((_, text)) = probe_str(finding, TEXT_PATHS) else {
        tracing::debug!(id = %fallback_id, "citation finding has no text, skipped");
        return None;
    };

    let (start, end) = match (probe_i64(finding, START_PATHS), probe_i64(finding, END_PATHS)) {
        (Some(start), Some(end)) if start >= 0 && end > start => (start, end),
        (start, end) => {
            tracing::debug!(id = %fallback_id, ?start, ?end, "citation finding has unusable offsets, skipped");
            return None;
        }
    };

    let (severity, default_explanation) = grade(finding);
    let correction = probe_str(finding, CORRECTION_PATHS).map(|(_, c)| c);
    let explanation = probe_str(finding, EXPLANATION_PATHS)
        .map(|(_, e)| e.to_string())
        .unwrap_or_else(|| default_explanation.to_string());

    let id = probe_str(finding, ID_PATHS)
        .map(|(_, id)| id.to_string())
        .unwrap_or(fallback_id);
    let paragraph_id = probe_str(finding, PARAGRAPH_ID_PATHS)
        .map(|(_, id)| id.to_string())
        .or_else(|| anchor_paragraph_id(finding, PARAGRAPH_ANCHOR_PATHS))
        .unwrap_or_default();

    Some(
        RedlineSuggestion::new(
            id,
            SuggestionType::Legal,
            text,
            correction.unwrap_or(text),
            start,
            end,
        )
        .with_severity(severity)
        .with_explanation(explanation)
        .with_paragraph_id(paragraph_id)
        .with_confidence(probe_f64(finding, &["confidence"]).unwrap_or(ctx.config.default_citation_confidence))
        .with_source_module(ctx.module_type)
        .with_position_source(PositionSource::Flat),
    )
}

/// Severity from completeness and verification state.
fn grade(finding: &Value) -> (Severity, &'static str) {
    let status = probe_str(finding, STATUS_PATHS).map(|(_, s)| s.trim().to_ascii_lowercase());
    let status = status.as_deref();

    let incomplete = status == Some("incomplete") || probe_bool(finding, &["isComplete"]) == Some(false);
    if incomplete {
        return (Severity::High, "Citation is incomplete");
    }

    let needs_verification = status.map_or(false, |s| NEEDS_VERIFICATION_STATUSES.contains(&s))
        || probe_bool(finding, &["needsVerification"]) == Some(true);
    if needs_verification {
        return (Severity::Medium, "Citation needs verification");
    }

    (Severity::Low, "Citation found")
}
