//! Resolving the original document text a terminal module's offsets refer to.

use layered_redline::strip_anchors;
use layered_redline_document::ContentSource;
use serde_json::Value;

use crate::access::{probe_array, probe_str, AccessPath};
use crate::{PipelineGraph, PipelineOutput, RedlineConfig};

/// Content fields on a module's own result.
pub const DIRECT_CONTENT_PATHS: &[AccessPath] = &[
    "originalContent",
    "content",
    "text",
    "documentText",
    "fullText",
    "document.content",
    "document.text",
    "input.content",
    "input.text",
];

/// Original-document fields embedded in a result's metadata.
pub const METADATA_CONTENT_PATHS: &[AccessPath] = &[
    "metadata.originalContent",
    "metadata.originalDocument.content",
    "metadata.originalDocument.text",
    "metadata.document.content",
    "metadata.sourceContent",
    "metadata.inputText",
];

/// Paragraph lists on document-input or paragraph-splitter results.
pub const PARAGRAPH_LIST_PATHS: &[AccessPath] = &["paragraphs", "data.paragraphs", "output.paragraphs", ""];
const PARAGRAPH_TEXT_PATHS: &[AccessPath] = &["text", "content", "paragraphText"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub content: String,
    pub source: ContentSource,
}

impl ResolvedContent {
    fn unresolved() -> Self {
        ResolvedContent {
            content: String::new(),
            source: ContentSource::Unresolved,
        }
    }
}

/// Resolve the original content for the module at `index`.
///
/// Tries, in order: direct fields, metadata fields, the nearest upstream
/// content source, and finally the longest prose-like string anywhere in
/// the result (tagged [`ContentSource::Heuristic`]).
pub fn resolve_content(
    output: &PipelineOutput,
    index: usize,
    graph: Option<&PipelineGraph>,
    config: &RedlineConfig,
) -> ResolvedContent {
    let Some(module) = output.results.get(index) else {
        return ResolvedContent::unresolved();
    };

    let resolved = probe_str(&module.result, DIRECT_CONTENT_PATHS)
        .map(|(path, text)| (text.to_string(), ContentSource::Direct { path: path.to_string() }))
        .or_else(|| {
            probe_str(&module.result, METADATA_CONTENT_PATHS)
                .map(|(path, text)| (text.to_string(), ContentSource::Metadata { path: path.to_string() }))
        })
        .or_else(|| upstream_content(output, index, graph, config))
        .or_else(|| {
            longest_prose(&module.result, config).map(|(path, text)| {
                tracing::warn!(
                    node_id = %module.node_id,
                    path = %path,
                    "original content resolved heuristically"
                );
                (text, ContentSource::Heuristic { path })
            })
        });

    match resolved {
        Some((content, source)) => {
            let content = if config.strip_anchors {
                strip_anchors(&content).into_owned()
            } else {
                content
            };
            tracing::trace!(node_id = %module.node_id, %source, len = content.len(), "resolved content");
            ResolvedContent { content, source }
        }
        None => {
            tracing::warn!(node_id = %module.node_id, module_type = %module.module_type, "could not resolve original content");
            ResolvedContent::unresolved()
        }
    }
}

/// Content rebuilt from the nearest upstream paragraph source.
fn upstream_content(
    output: &PipelineOutput,
    index: usize,
    graph: Option<&PipelineGraph>,
    config: &RedlineConfig,
) -> Option<(String, ContentSource)> {
    let node_id = &output.results.get(index)?.node_id;

    let module_type_of = |id: &str, position: usize| {
        graph
            .and_then(|g| g.module_type(id))
            .unwrap_or(output.results[position].module_type.as_str())
            .to_string()
    };

    let candidates: Vec<usize> = match graph.filter(|g| g.has_edges()) {
        Some(graph) => graph
            .ancestors(node_id)
            .into_iter()
            .filter_map(|id| output.position_of(id))
            .collect(),
        None => (0..index).rev().collect(),
    };

    candidates.into_iter().find_map(|position| {
        let upstream = &output.results[position];
        let module_type = module_type_of(&upstream.node_id, position);
        if !config.is_paragraph_source(&module_type) {
            return None;
        }
        let content = probe_str(&upstream.result, DIRECT_CONTENT_PATHS)
            .map(|(_, text)| text.to_string())
            .or_else(|| joined_paragraphs(&upstream.result))?;
        Some((
            content,
            ContentSource::Upstream {
                node_id: upstream.node_id.clone(),
                module_type,
            },
        ))
    })
}

/// Paragraphs joined with a blank line. Items may be strings or objects.
fn joined_paragraphs(result: &Value) -> Option<String> {
    let (_, items) = probe_array(result, PARAGRAPH_LIST_PATHS)?;
    let paragraphs: Vec<&str> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text.as_str()),
            other => probe_str(other, PARAGRAPH_TEXT_PATHS).map(|(_, text)| text),
        })
        .filter(|text| !text.trim().is_empty())
        .collect();
    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n\n"))
    }
}

/// The longest string anywhere under `value` that reads like prose.
fn longest_prose(value: &Value, config: &RedlineConfig) -> Option<(String, String)> {
    let mut best: Option<(String, &str)> = None;
    let mut stack: Vec<(String, &Value)> = vec![(String::new(), value)];

    while let Some((path, current)) = stack.pop() {
        match current {
            Value::String(text) => {
                if looks_like_prose(text, config)
                    && best.as_ref().map_or(true, |(_, b)| text.chars().count() > b.chars().count())
                {
                    best = Some((path, text.as_str()));
                }
            }
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate().rev() {
                    stack.push((join_path(&path, &idx.to_string()), item));
                }
            }
            Value::Object(map) => {
                for (key, item) in map.iter().rev() {
                    stack.push((join_path(&path, key), item));
                }
            }
            _ => {}
        }
    }

    best.map(|(path, text)| (path, text.to_string()))
}

fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// Longer than the configured minimum and containing a run of letters.
pub fn looks_like_prose(text: &str, config: &RedlineConfig) -> bool {
    if text.chars().count() <= config.prose_min_len {
        return false;
    }
    let mut run = 0usize;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            run += 1;
            if run >= config.prose_min_letter_run {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModuleResult;
    use serde_json::json;

    fn output(results: Vec<ModuleResult>) -> PipelineOutput {
        PipelineOutput::from_results(results)
    }

    #[test]
    fn direct_then_metadata() {
        let config = RedlineConfig::default();
        let out = output(vec![
            ModuleResult::new("a", "grammar-checker", json!({ "text": "⟦P-00001⟧Direct text." })),
            ModuleResult::new("b", "grammar-checker", json!({ "metadata": { "originalDocument": { "content": "From metadata." } } })),
        ]);
        let direct = resolve_content(&out, 0, None, &config);
        assert_eq!(direct.content, "Direct text.");
        assert_eq!(direct.source, ContentSource::Direct { path: "text".into() });

        let meta = resolve_content(&out, 1, None, &config);
        assert_eq!(meta.content, "From metadata.");
        assert_eq!(
            meta.source,
            ContentSource::Metadata {
                path: "metadata.originalDocument.content".into()
            }
        );
    }

    #[test]
    fn anchors_kept_when_configured() {
        let config = RedlineConfig::default().with_strip_anchors(false);
        let out = output(vec![ModuleResult::new("a", "x", json!({ "content": "⟦P-00001⟧Kept." }))]);
        assert_eq!(resolve_content(&out, 0, None, &config).content, "⟦P-00001⟧Kept.");
    }

    #[test]
    fn upstream_paragraphs_without_graph() {
        let config = RedlineConfig::default();
        let out = output(vec![
            ModuleResult::new("in", "document-input", json!({ "fileName": "lease.docx" })),
            ModuleResult::new(
                "split",
                "paragraph-splitter",
                json!({ "paragraphs": [ { "text": "⟦P-00001⟧Hello world." }, "", "⟦P-00002⟧This is bad grammer." ] }),
            ),
            ModuleResult::new("summary", "summarizer", json!({ "summary": "short" })),
            ModuleResult::new("grammar", "grammar-checker", json!({ "paragraphs": [] })),
        ]);
        let resolved = resolve_content(&out, 3, None, &config);
        assert_eq!(resolved.content, "Hello world.\n\nThis is bad grammer.");
        assert_eq!(
            resolved.source,
            ContentSource::Upstream {
                node_id: "split".into(),
                module_type: "paragraph-splitter".into()
            }
        );
    }

    #[test]
    fn upstream_follows_graph_edges() {
        let config = RedlineConfig::default();
        let out = output(vec![
            ModuleResult::new("grammar", "grammar-checker", json!({})),
            ModuleResult::new("other-input", "document-input", json!({ "content": "Wrong document entirely." })),
            ModuleResult::new("in", "document-input", json!({ "content": "Right document text." })),
        ]);
        let graph = PipelineGraph::from_value(&json!({
            "nodes": [ { "id": "in" }, { "id": "grammar" }, { "id": "other-input" } ],
            "edges": [ { "source": "in", "target": "grammar" } ]
        }))
        .unwrap();
        let resolved = resolve_content(&out, 0, Some(&graph), &config);
        assert_eq!(resolved.content, "Right document text.");
    }

    #[test]
    fn heuristic_is_last_resort() {
        let config = RedlineConfig::default();
        let out = output(vec![ModuleResult::new(
            "g",
            "grammar-checker",
            json!({
                "analysis": {
                    "id": "0123456789abcdef0123456789",
                    "notes": ["short", "The Tenant shall pay rent on the first day of each month."],
                    "label": "A longer label string"
                }
            }),
        )]);
        let resolved = resolve_content(&out, 0, None, &config);
        assert_eq!(resolved.content, "The Tenant shall pay rent on the first day of each month.");
        assert_eq!(
            resolved.source,
            ContentSource::Heuristic {
                path: "analysis.notes.1".into()
            }
        );
        assert!(!resolved.source.is_confident());
    }

    #[test]
    fn unresolved_when_nothing_fits() {
        let config = RedlineConfig::default();
        let out = output(vec![ModuleResult::new("g", "grammar-checker", json!({ "n": 1, "s": "tiny" }))]);
        let resolved = resolve_content(&out, 0, None, &config);
        assert_eq!(resolved, ResolvedContent::unresolved());
        assert_eq!(resolve_content(&out, 9, None, &config).source, ContentSource::Unresolved);
    }

    #[test]
    fn prose_detection() {
        let config = RedlineConfig::default();
        assert!(looks_like_prose("The quick brown fox jumps.", &config));
        assert!(!looks_like_prose("12-34-56-78-90-12-34-56-78", &config));
        assert!(!looks_like_prose("exactly twenty chars", &config));
    }
}
