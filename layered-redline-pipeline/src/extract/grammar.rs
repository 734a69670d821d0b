use layered_redline_document::{PositionSource, RedlineSuggestion};
use serde_json::Value;

use super::{anchor_paragraph_id, classify_severity, classify_type, ExtractContext};
use crate::access::{lookup, probe_array, probe_f64, probe_i64, probe_str, AccessPath};

/// Where per-paragraph items live. `""` covers results that are the list itself.
const PARAGRAPH_PATHS: &[AccessPath] = &[
    "paragraphs",
    "results",
    "data.paragraphs",
    "output.paragraphs",
    "analysis.paragraphs",
    "analysis",
    "output.analysis",
    "finalOutput.output.analysis",
    "",
];
/// Suggestions nested in a paragraph item, or listed flat on the result.
const SUGGESTION_PATHS: &[AccessPath] = &["suggestions", "corrections", "issues", "errors"];

const PARAGRAPH_ID_PATHS: &[AccessPath] = &["paragraphId", "paragraph_id"];
const PARAGRAPH_ANCHOR_PATHS: &[AccessPath] = &["paragraphText", "text", "anchor"];

const ORIGINAL_PATHS: &[AccessPath] = &["originalText", "original", "errorText", "incorrectText", "text"];
const SUGGESTED_PATHS: &[AccessPath] = &["suggestedText", "suggestion", "correction", "replacement", "corrected", "suggested"];
const EXPLANATION_PATHS: &[AccessPath] = &["explanation", "reason", "message", "description", "rationale"];
const TYPE_PATHS: &[AccessPath] = &["type", "category", "issueType", "kind"];
const SEVERITY_PATHS: &[AccessPath] = &["severity", "priority", "level", "impact"];
const CONFIDENCE_PATHS: &[AccessPath] = &["confidence", "score", "probability"];
const ID_PATHS: &[AccessPath] = &["id", "suggestionId"];

const POSITION_OBJECT_PATHS: &[AccessPath] = &["position", "location"];
const FLAT_START_PATHS: &[AccessPath] = &["startPos", "start"];
const FLAT_END_PATHS: &[AccessPath] = &["endPos", "end"];

/// Extract grammar-style suggestions from a module result.
///
/// Paragraph-grouped results are walked item by item. A result with only a
/// flat suggestion list is read as a single unnamed group whose suggestions
/// keep whatever paragraph id they carry themselves.
pub fn extract_grammar(result: &Value, ctx: &ExtractContext<'_>) -> Vec<RedlineSuggestion> {
    let mut suggestions = Vec::new();

    // The first list whose items carry suggestions of their own
    let paragraphs = PARAGRAPH_PATHS.iter().find_map(|path| {
        probe_array(result, std::slice::from_ref(path))
            .map(|(_, items)| items.as_slice())
            .filter(|items| items.iter().any(|item| probe_array(item, SUGGESTION_PATHS).is_some()))
    });

    match paragraphs {
        Some(items) => {
            for (para_idx, item) in items.iter().enumerate() {
                let Some((_, item_suggestions)) = probe_array(item, SUGGESTION_PATHS) else {
                    continue;
                };
                let paragraph_id = probe_str(item, PARAGRAPH_ID_PATHS)
                    .map(|(_, id)| id.to_string())
                    .or_else(|| anchor_paragraph_id(item, PARAGRAPH_ANCHOR_PATHS))
                    .unwrap_or_else(|| format!("para-{}", para_idx));

                for (idx, raw) in item_suggestions.iter().enumerate() {
                    let fallback_id = format!("{}-p{}-s{}", ctx.source_id, para_idx, idx);
                    if let Some(suggestion) = read_suggestion(raw, &fallback_id, Some(&paragraph_id), ctx) {
                        suggestions.push(suggestion);
                    }
                }
            }
        }
        None => {
            let flat = probe_array(result, SUGGESTION_PATHS)
                .or_else(|| probe_array(result, PARAGRAPH_PATHS))
                .map(|(_, items)| items.as_slice())
                .unwrap_or_default();
            for (idx, raw) in flat.iter().enumerate() {
                let fallback_id = format!("{}-s{}", ctx.source_id, idx);
                if let Some(suggestion) = read_suggestion(raw, &fallback_id, None, ctx) {
                    suggestions.push(suggestion);
                }
            }
        }
    }

    tracing::debug!(
        source = ctx.source_id,
        count = suggestions.len(),
        "extracted grammar suggestions"
    );
    suggestions
}

fn read_suggestion(
    raw: &Value,
    fallback_id: &str,
    paragraph_id: Option<&str>,
    ctx: &ExtractContext<'_>,
) -> Option<RedlineSuggestion> {
    let Some((_, original)) = probe_str(raw, ORIGINAL_PATHS) else {
        tracing::debug!(id = fallback_id, "grammar suggestion has no original text, skipped");
        return None;
    };
    let Some((_, suggested)) = probe_str(raw, SUGGESTED_PATHS) else {
        tracing::debug!(id = fallback_id, "grammar suggestion has no replacement, skipped");
        return None;
    };

    let (start, end, position_source) = read_position(raw, original);

    let id = probe_str(raw, ID_PATHS)
        .map(|(_, id)| id.to_string())
        .unwrap_or_else(|| fallback_id.to_string());
    let paragraph_id = probe_str(raw, PARAGRAPH_ID_PATHS)
        .map(|(_, id)| id.to_string())
        .or_else(|| paragraph_id.map(str::to_string))
        .unwrap_or_default();

    Some(
        RedlineSuggestion::new(
            id,
            classify_type(probe_str(raw, TYPE_PATHS).map(|(_, t)| t)),
            original,
            suggested,
            start,
            end,
        )
        .with_severity(classify_severity(probe_str(raw, SEVERITY_PATHS).map(|(_, s)| s)))
        .with_explanation(probe_str(raw, EXPLANATION_PATHS).map(|(_, e)| e).unwrap_or_default())
        .with_paragraph_id(paragraph_id)
        .with_confidence(probe_f64(raw, CONFIDENCE_PATHS).unwrap_or(ctx.config.default_grammar_confidence))
        .with_source_module(ctx.module_type)
        .with_position_source(position_source),
    )
}

/// Position object, then flat fields, then `0..len(original)`.
fn read_position(raw: &Value, original: &str) -> (i64, i64, PositionSource) {
    let explicit = POSITION_OBJECT_PATHS.iter().find_map(|path| {
        let object = lookup(raw, path).filter(|v| v.is_object())?;
        let start = probe_i64(object, FLAT_START_PATHS)?;
        let end = probe_i64(object, FLAT_END_PATHS)?;
        Some((start, end))
    });
    if let Some((start, end)) = explicit {
        return (start, end, PositionSource::Explicit);
    }

    if let (Some(start), Some(end)) = (probe_i64(raw, FLAT_START_PATHS), probe_i64(raw, FLAT_END_PATHS)) {
        return (start, end, PositionSource::Flat);
    }

    (0, original.chars().count() as i64, PositionSource::Fallback)
}
