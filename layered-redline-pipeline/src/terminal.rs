//! Which pipeline modules are terminal.

use std::collections::HashSet;

use serde::Serialize;

use crate::{ModuleResult, PipelineGraph, PipelineOutput, RedlineConfig, ResultsShape};

/// Why a module was picked as terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TerminalReason {
    /// No outgoing edge in the graph
    GraphSink,
    /// Reported under `endpointResults`
    EndpointResults,
    /// Last non-input entry of a linear results list
    LastResult,
    /// Entry carried `isEndpoint: true`
    EndpointFlag,
}

#[derive(Debug, Clone, Copy)]
pub struct TerminalModule<'a> {
    /// Position in [`PipelineOutput::results`]
    pub index: usize,
    pub result: &'a ModuleResult,
    pub reason: TerminalReason,
}

/// Find the terminal modules of a run, in results order.
///
/// With edge information, terminals are graph sinks that are not document
/// inputs. Without it, an `endpointResults` list is taken as-is; otherwise
/// the last non-input entry plus any entry flagged `isEndpoint` are used.
/// An empty list means there is nothing to reconcile yet.
pub fn detect_terminals<'a>(
    output: &'a PipelineOutput,
    graph: Option<&PipelineGraph>,
    config: &RedlineConfig,
) -> Vec<TerminalModule<'a>> {
    let is_input = |result: &ModuleResult, graph: Option<&PipelineGraph>| {
        config.is_document_input(&result.module_type)
            || graph
                .and_then(|g| g.module_type(&result.node_id))
                .map_or(false, |t| config.is_document_input(t))
    };

    let candidates = output.results.iter().enumerate();

    let terminals: Vec<TerminalModule<'a>> = match graph.filter(|g| g.has_edges()) {
        Some(graph) => {
            let sinks: HashSet<&str> = graph.sinks().into_iter().collect();
            candidates
                .filter(|(_, r)| sinks.contains(r.node_id.as_str()) && !is_input(r, Some(graph)))
                .map(|(index, result)| TerminalModule {
                    index,
                    result,
                    reason: TerminalReason::GraphSink,
                })
                .collect()
        }
        None if output.shape == ResultsShape::EndpointResults => candidates
            .filter(|(_, r)| !is_input(r, graph))
            .map(|(index, result)| TerminalModule {
                index,
                result,
                reason: TerminalReason::EndpointResults,
            })
            .collect(),
        None => {
            let last = output
                .results
                .iter()
                .rposition(|r| !is_input(r, graph));
            candidates
                .filter_map(|(index, result)| {
                    let reason = if Some(index) == last {
                        TerminalReason::LastResult
                    } else if result.is_endpoint && !is_input(result, graph) {
                        TerminalReason::EndpointFlag
                    } else {
                        return None;
                    };
                    Some(TerminalModule { index, result, reason })
                })
                .collect()
        }
    };

    tracing::debug!(
        count = terminals.len(),
        nodes = ?terminals.iter().map(|t| t.result.node_id.as_str()).collect::<Vec<_>>(),
        "detected terminal modules"
    );
    terminals
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn output(shape: ResultsShape, entries: &[(&str, &str, bool)]) -> PipelineOutput {
        PipelineOutput {
            shape,
            results: entries
                .iter()
                .map(|(id, module_type, endpoint)| {
                    let result = ModuleResult::new(*id, *module_type, Value::Null);
                    if *endpoint {
                        result.endpoint()
                    } else {
                        result
                    }
                })
                .collect(),
            summary: None,
            metadata: None,
        }
    }

    fn ids(terminals: &[TerminalModule<'_>]) -> Vec<(String, TerminalReason)> {
        terminals
            .iter()
            .map(|t| (t.result.node_id.clone(), t.reason))
            .collect()
    }

    #[test]
    fn graph_sinks_win() {
        let output = output(
            ResultsShape::Results,
            &[
                ("in", "document-input", false),
                ("split", "paragraph-splitter", false),
                ("grammar", "grammar-checker", false),
                ("cite", "citation-finder", false),
            ],
        );
        let graph = PipelineGraph::from_value(&json!({
            "nodes": [
                { "id": "in", "data": { "moduleType": "document-input" } },
                { "id": "split", "data": { "moduleType": "paragraph-splitter" } },
                { "id": "grammar", "data": { "moduleType": "grammar-checker" } },
                { "id": "cite", "data": { "moduleType": "citation-finder" } },
                { "id": "orphan-input", "data": { "moduleType": "document-input" } }
            ],
            "edges": [
                { "source": "in", "target": "split" },
                { "source": "split", "target": "grammar" },
                { "source": "split", "target": "cite" }
            ]
        }))
        .unwrap();
        let terminals = detect_terminals(&output, Some(&graph), &RedlineConfig::default());
        assert_eq!(
            ids(&terminals),
            vec![
                ("grammar".to_string(), TerminalReason::GraphSink),
                ("cite".to_string(), TerminalReason::GraphSink),
            ]
        );
    }

    #[test]
    fn endpoint_results_are_all_terminal() {
        let output = output(
            ResultsShape::EndpointResults,
            &[("in", "document-input", false), ("a", "grammar-checker", false), ("b", "citation-finder", false)],
        );
        let terminals = detect_terminals(&output, None, &RedlineConfig::default());
        assert_eq!(terminals.len(), 2);
        assert!(terminals.iter().all(|t| t.reason == TerminalReason::EndpointResults));
    }

    #[test]
    fn linear_fallback_uses_last_and_flagged() {
        let output = output(
            ResultsShape::Results,
            &[
                ("in", "document-input", false),
                ("a", "grammar-checker", true),
                ("b", "summarizer", false),
                ("c", "citation-finder", false),
                ("tail", "document-input", false),
            ],
        );
        // An edgeless graph carries no edge information
        let graph = PipelineGraph::default();
        let terminals = detect_terminals(&output, Some(&graph), &RedlineConfig::default());
        assert_eq!(
            ids(&terminals),
            vec![
                ("a".to_string(), TerminalReason::EndpointFlag),
                ("c".to_string(), TerminalReason::LastResult),
            ]
        );
    }

    #[test]
    fn nothing_to_reconcile() {
        let config = RedlineConfig::default();
        let only_input = output(ResultsShape::Results, &[("in", "document-input", true)]);
        assert!(detect_terminals(&only_input, None, &config).is_empty());
        let empty = output(ResultsShape::BareArray, &[]);
        assert!(detect_terminals(&empty, None, &config).is_empty());
    }
}
