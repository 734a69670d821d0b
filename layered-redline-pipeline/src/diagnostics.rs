use serde::Serialize;

/// A non-fatal problem noticed during a run.
///
/// None of these stop processing; they explain why a document has fewer
/// suggestions than upstream reported, or why there is no document at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RunWarning {
    /// Output could not be read as a results list
    #[serde(rename_all = "camelCase")]
    MalformedOutput { message: String },
    /// No content field, upstream source, or prose string was found
    #[serde(rename_all = "camelCase")]
    UnresolvedContent { node_id: String },
    /// Content came from the prose heuristic and may be wrong
    #[serde(rename_all = "camelCase")]
    HeuristicContent { node_id: String, path: String },
    /// No extractor handles this module type
    #[serde(rename_all = "camelCase")]
    NoExtractor { node_id: String, module_type: String },
    /// Suggestions were removed by reconciliation
    #[serde(rename_all = "camelCase")]
    DroppedSuggestions { node_id: String, count: usize },
    /// Module content was a different text from the document's, so its
    /// suggestions were reconciled again against the document
    #[serde(rename_all = "camelCase")]
    RebasedSuggestions {
        node_id: String,
        relocated: usize,
        dropped: usize,
    },
}

impl std::fmt::Display for RunWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunWarning::MalformedOutput { message } => write!(f, "malformed pipeline output: {}", message),
            RunWarning::UnresolvedContent { node_id } => {
                write!(f, "{}: original content could not be resolved", node_id)
            }
            RunWarning::HeuristicContent { node_id, path } => {
                write!(f, "{}: original content guessed from '{}'", node_id, path)
            }
            RunWarning::NoExtractor {
                node_id,
                module_type,
            } => write!(f, "{}: no extractor for module type '{}'", node_id, module_type),
            RunWarning::DroppedSuggestions { node_id, count } => {
                write!(f, "{}: {} suggestion(s) dropped during reconciliation", node_id, count)
            }
            RunWarning::RebasedSuggestions {
                node_id,
                relocated,
                dropped,
            } => write!(
                f,
                "{}: content differs from the document, {} suggestion(s) relocated and {} dropped",
                node_id, relocated, dropped
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_read_as_sentences() {
        let warnings = [
            RunWarning::HeuristicContent {
                node_id: "grammar".to_string(),
                path: "data.body".to_string(),
            },
            RunWarning::DroppedSuggestions {
                node_id: "grammar".to_string(),
                count: 2,
            },
        ];
        let lines: Vec<String> = warnings.iter().map(ToString::to_string).collect();
        insta::assert_snapshot!(lines.join("\n"), @r###"
        grammar: original content guessed from 'data.body'
        grammar: 2 suggestion(s) dropped during reconciliation
        "###);

        let json = serde_json::to_string(&warnings[1]).unwrap();
        assert_eq!(json, r#"{"kind":"droppedSuggestions","nodeId":"grammar","count":2}"#);
    }
}
