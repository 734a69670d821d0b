//! Core types for TOML scenario fixtures.
//!
//! A fixture describes one pipeline run: the raw pipeline output (and
//! optionally its graph) as JSON, any review actions to replay, and what the
//! resulting document must look like.
//!
//! ```toml
//! title = "Off-by-one claim is relocated"
//!
//! [input]
//! output = '''{ "results": [ ... ] }'''
//!
//! [[expect.suggestions]]
//! id = "g1"
//! start = 26
//! end = 33
//! ```

use layered_redline_document::ReviewAction;
use layered_redline_pipeline::RedlineConfig;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A parsed fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedlineFixture {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Overrides for the run; missing keys keep their defaults
    #[serde(default)]
    pub config: RedlineConfig,
    pub input: FixtureInput,
    /// Review actions replayed in order on the produced document
    #[serde(default)]
    pub review: Vec<ReviewAction>,
    #[serde(default)]
    pub expect: Expectations,
}

/// What the pipeline is run on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureInput {
    #[serde(default = "default_file_name")]
    pub file_name: String,
    #[serde(default = "default_file_type")]
    pub file_type: String,
    /// Pipeline output, written as a JSON string
    #[serde(deserialize_with = "json_text")]
    pub output: Value,
    /// Pipeline graph, written as a JSON string
    #[serde(default, deserialize_with = "optional_json_text")]
    pub graph: Option<Value>,
    /// Source HTML to render suggestions into
    #[serde(default)]
    pub html: Option<String>,
}

fn default_file_name() -> String {
    "fixture.txt".to_string()
}

fn default_file_type() -> String {
    "txt".to_string()
}

/// Whether the run should produce a document, and if not, why.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpectedOutcome {
    #[default]
    Document,
    NoTerminalModules,
    NoContent,
    NoSuggestions,
}

impl std::fmt::Display for ExpectedOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ExpectedOutcome::Document => "document",
            ExpectedOutcome::NoTerminalModules => "noTerminalModules",
            ExpectedOutcome::NoContent => "noContent",
            ExpectedOutcome::NoSuggestions => "noSuggestions",
        })
    }
}

/// Checks applied to the run. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Expectations {
    pub outcome: ExpectedOutcome,
    /// The document's suggestions, exactly and in order, when non-empty
    pub suggestions: Vec<ExpectedSuggestion>,
    /// Suggestion ids that must not reach the document
    pub absent: Vec<String>,
    /// Warning kinds, exactly and in order, when non-empty
    pub warnings: Vec<String>,
    pub source_modules: Option<Vec<String>>,
    /// Content after the review actions have been applied
    pub current_content: Option<String>,
    /// Fragments the rendered HTML must contain
    pub html_contains: Vec<String>,
}

/// One expected suggestion. Unset fields are not checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectedSuggestion {
    pub id: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub paragraph: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub severity: Option<String>,
    /// `explicit`, `flat`, `fallback` or `relocated`
    pub position: Option<String>,
    pub status: Option<String>,
}

impl RedlineFixture {
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

fn json_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
    let text = String::deserialize(deserializer)?;
    serde_json::from_str(&text).map_err(serde::de::Error::custom)
}

fn optional_json_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    json_text(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
title = "Minimal"

[input]
output = '''{ "results": [] }'''
"#;

    #[test]
    fn defaults_fill_optional_sections() {
        let fixture = RedlineFixture::from_toml_str(MINIMAL).unwrap();
        assert_eq!(fixture.title, "Minimal");
        assert_eq!(fixture.input.file_name, "fixture.txt");
        assert!(fixture.input.graph.is_none());
        assert!(fixture.review.is_empty());
        assert_eq!(fixture.expect.outcome, ExpectedOutcome::Document);
        assert_eq!(fixture.config, RedlineConfig::default());
    }

    #[test]
    fn full_fixture() {
        let source = r#"
title = "Review"

[config]
search_radius = 10

[input]
file_name = "memo.docx"
file_type = "docx"
output = '''{ "results": [{ "nodeId": "g", "moduleType": "grammar-checker", "result": {} }] }'''
graph = '''{ "nodes": [{ "id": "g" }], "edges": [] }'''

[[review]]
action = "accept"
suggestionId = "g1"

[expect]
outcome = "noSuggestions"
warnings = ["droppedSuggestions"]

[[expect.suggestions]]
id = "g1"
start = 4
type = "grammar"
"#;
        let fixture = RedlineFixture::from_toml_str(source).unwrap();
        assert_eq!(fixture.config.search_radius, 10);
        assert_eq!(fixture.input.output["results"][0]["nodeId"], "g");
        assert!(fixture.input.graph.is_some());
        assert_eq!(fixture.review, vec![ReviewAction::Accept("g1".to_string())]);
        assert_eq!(fixture.expect.outcome, ExpectedOutcome::NoSuggestions);
        assert_eq!(fixture.expect.suggestions[0].kind.as_deref(), Some("grammar"));
        assert_eq!(fixture.expect.suggestions[0].end, None);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let source = r#"
title = "Broken"

[input]
output = '''{ "results": '''
"#;
        let err = RedlineFixture::from_toml_str(source).unwrap_err();
        assert!(err.to_string().contains("EOF"));
    }
}
