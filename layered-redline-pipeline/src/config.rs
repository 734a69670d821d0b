//! Pipeline configuration.
//!
//! `RedlineConfig` carries the tunables of every pass. Defaults match the
//! behaviour the review UI expects; a TOML file may override any subset.

use layered_redline_document::DEFAULT_SEARCH_RADIUS;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid redline config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid redline config: {field} {problem}")]
    Invalid { field: &'static str, problem: String },
}

/// Configuration for a redline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedlineConfig {
    /// Chars searched on each side of a mismatched claim
    pub search_radius: usize,
    /// Minimum length of a string the prose heuristic will accept
    pub prose_min_len: usize,
    /// Minimum run of consecutive letters for a string to count as prose
    pub prose_min_letter_run: usize,
    /// Module types that carry the raw document and are never terminal
    pub document_input_types: Vec<String>,
    /// Module types whose output can be rebuilt into document content
    pub paragraph_source_types: Vec<String>,
    /// Confidence given to grammar suggestions that do not state one
    pub default_grammar_confidence: f64,
    /// Confidence given to citation findings that do not state one
    pub default_citation_confidence: f64,
    /// Remove `⟦P-NNNNN⟧` tokens from resolved content
    pub strip_anchors: bool,
}

impl Default for RedlineConfig {
    fn default() -> Self {
        Self {
            search_radius: DEFAULT_SEARCH_RADIUS,
            prose_min_len: 20,
            prose_min_letter_run: 3,
            document_input_types: vec!["document-input".to_string()],
            paragraph_source_types: vec![
                "document-input".to_string(),
                "paragraph-splitter".to_string(),
            ],
            default_grammar_confidence: 0.8,
            default_citation_confidence: 0.7,
            strip_anchors: true,
        }
    }
}

impl RedlineConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults.
    ///
    /// ```
    /// use layered_redline_pipeline::RedlineConfig;
    ///
    /// let config = RedlineConfig::from_toml_str("search_radius = 80").unwrap();
    /// assert_eq!(config.search_radius, 80);
    /// assert_eq!(config.prose_min_len, 20);
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: RedlineConfig = toml::from_str(source)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("default_grammar_confidence", self.default_grammar_confidence),
            ("default_citation_confidence", self.default_citation_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    problem: format!("must be within 0..=1, found {}", value),
                });
            }
        }
        if self.prose_min_letter_run == 0 {
            return Err(ConfigError::Invalid {
                field: "prose_min_letter_run",
                problem: "must be at least 1".to_string(),
            });
        }
        Ok(self)
    }

    pub fn with_search_radius(mut self, radius: usize) -> Self {
        self.search_radius = radius;
        self
    }

    pub fn with_prose_thresholds(mut self, min_len: usize, min_letter_run: usize) -> Self {
        self.prose_min_len = min_len;
        self.prose_min_letter_run = min_letter_run.max(1);
        self
    }

    /// Replace the document-input module types.
    pub fn with_document_input_types(mut self, types: &[&str]) -> Self {
        self.document_input_types = types.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Replace the module types content can be rebuilt from.
    pub fn with_paragraph_source_types(mut self, types: &[&str]) -> Self {
        self.paragraph_source_types = types.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_strip_anchors(mut self, strip: bool) -> Self {
        self.strip_anchors = strip;
        self
    }

    pub fn is_document_input(&self, module_type: &str) -> bool {
        self.document_input_types.iter().any(|t| t == module_type)
    }

    pub fn is_paragraph_source(&self, module_type: &str) -> bool {
        self.paragraph_source_types.iter().any(|t| t == module_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_only_named_keys() {
        let config = RedlineConfig::from_toml_str(
            r#"
            search_radius = 25
            paragraph_source_types = ["paragraph-splitter", "ocr-extractor"]
            strip_anchors = false
            "#,
        )
        .unwrap();
        assert_eq!(config.search_radius, 25);
        assert!(config.is_paragraph_source("ocr-extractor"));
        assert!(!config.is_paragraph_source("document-input"));
        assert!(config.is_document_input("document-input"));
        assert!(!config.strip_anchors);
        assert_eq!(config.default_grammar_confidence, 0.8);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = RedlineConfig::from_toml_str("default_citation_confidence = 1.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "default_citation_confidence",
                ..
            }
        ));
        assert!(matches!(
            RedlineConfig::from_toml_str("search_radius = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn builder_methods() {
        let config = RedlineConfig::new()
            .with_search_radius(10)
            .with_prose_thresholds(40, 0)
            .with_document_input_types(&["upload"]);
        assert_eq!(config.search_radius, 10);
        assert_eq!(config.prose_min_letter_run, 1);
        assert!(config.is_document_input("upload"));
    }
}
