//! Suggestion extractors for terminal module results.
//!
//! Each extractor turns one module's loosely-shaped result into
//! [`RedlineSuggestion`]s. Extractors never fail: anything they cannot read
//! is skipped with a `debug!` and the rest of the result is still used.

mod citation;
mod grammar;

use layered_redline::find_anchors;
use layered_redline_document::{RedlineSuggestion, Severity, SuggestionType};
use serde::Serialize;
use serde_json::Value;

use crate::access::{probe_str, AccessPath};
use crate::RedlineConfig;

pub use citation::extract_citations;
pub use grammar::extract_grammar;

/// Inputs shared by every extractor call.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    /// Node id of the module, used to build fallback suggestion ids
    pub source_id: &'a str,
    pub module_type: &'a str,
    pub config: &'a RedlineConfig,
}

pub type ExtractFn = fn(&Value, &ExtractContext<'_>) -> Vec<RedlineSuggestion>;

/// Manifest entry for an extractor.
///
/// The `extract` field is not serializable; [`ExtractorInfo`] is the
/// projection handed to the browser.
pub struct ExtractorManifest {
    pub name: &'static str,
    pub description: &'static str,
    /// Module types handled exactly
    pub module_types: &'static [&'static str],
    /// Substrings that select this extractor for unlisted module types
    pub keywords: &'static [&'static str],
    pub extract: ExtractFn,
}

/// All registered extractors, in selection priority order
pub static EXTRACTOR_MANIFESTS: &[ExtractorManifest] = &[
    ExtractorManifest {
        name: "grammar",
        description: "Grammar, spelling, style and clarity suggestions grouped by paragraph",
        module_types: &["grammar-checker", "grammar-check", "style-checker", "proofreader"],
        keywords: &["grammar", "spell", "proofread", "style"],
        extract: extract_grammar,
    },
    ExtractorManifest {
        name: "citation",
        description: "Legal citation findings with verification status",
        module_types: &["citation-finder", "citation-verifier", "citation-checker"],
        keywords: &["citation", "cite"],
        extract: extract_citations,
    },
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub module_types: &'static [&'static str],
}

/// Serializable view of [`EXTRACTOR_MANIFESTS`].
pub fn extractor_infos() -> Vec<ExtractorInfo> {
    EXTRACTOR_MANIFESTS
        .iter()
        .map(|m| ExtractorInfo {
            name: m.name,
            description: m.description,
            module_types: m.module_types,
        })
        .collect()
}

/// The extractor for a module type: exact match first, then keyword match.
pub fn extractor_for(module_type: &str) -> Option<&'static ExtractorManifest> {
    let lower = module_type.to_ascii_lowercase();
    EXTRACTOR_MANIFESTS
        .iter()
        .find(|m| m.module_types.contains(&lower.as_str()))
        .or_else(|| {
            EXTRACTOR_MANIFESTS
                .iter()
                .find(|m| m.keywords.iter().any(|k| lower.contains(k)))
        })
}

const TYPE_VOCABULARY: &[(&[&str], SuggestionType)] = &[
    (&["spelling", "grammar", "punctuation", "typo"], SuggestionType::Grammar),
    (&["style", "wording", "tone"], SuggestionType::Style),
    (&["clarity", "readability", "ambiguity"], SuggestionType::Clarity),
    (&["legal", "terminology", "citation"], SuggestionType::Legal),
];

const SEVERITY_VOCABULARY: &[(&[&str], Severity)] = &[
    (&["major", "critical", "high", "error"], Severity::High),
    (&["minor", "low", "suggestion", "info"], Severity::Low),
];

/// Case-insensitive mapping of upstream labels; unknown labels are grammar.
pub fn classify_type(label: Option<&str>) -> SuggestionType {
    label
        .map(|l| l.trim().to_ascii_lowercase())
        .and_then(|l| {
            TYPE_VOCABULARY
                .iter()
                .find(|(words, _)| words.contains(&l.as_str()))
                .map(|(_, t)| *t)
        })
        .unwrap_or(SuggestionType::Grammar)
}

/// Case-insensitive mapping of upstream levels; unknown levels are medium.
pub fn classify_severity(label: Option<&str>) -> Severity {
    label
        .map(|l| l.trim().to_ascii_lowercase())
        .and_then(|l| {
            SEVERITY_VOCABULARY
                .iter()
                .find(|(words, _)| words.contains(&l.as_str()))
                .map(|(_, s)| *s)
        })
        .unwrap_or(Severity::Medium)
}

/// Paragraph id of the first anchor token found under `paths`.
fn anchor_paragraph_id(value: &Value, paths: &[AccessPath]) -> Option<String> {
    paths.iter().find_map(|path| {
        let (_, text) = probe_str(value, std::slice::from_ref(path))?;
        find_anchors(text).first().map(|m| m.token.paragraph_id())
    })
}
