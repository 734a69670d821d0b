//! The pipeline graph as drawn in the editor.

use std::collections::{BTreeSet, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub data: GraphNodeData,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

/// Nodes and directed edges of a pipeline. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl PipelineGraph {
    /// Parse a graph value, logging and returning `None` if it is malformed.
    pub fn from_value(value: &Value) -> Option<Self> {
        match serde_json::from_value(value.clone()) {
            Ok(graph) => Some(graph),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed pipeline graph");
                None
            }
        }
    }

    pub fn has_edges(&self) -> bool {
        !self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn module_type(&self, id: &str) -> Option<&str> {
        self.node(id).and_then(|n| n.data.module_type.as_deref())
    }

    /// Node ids with no outgoing edge, in node order.
    pub fn sinks(&self) -> Vec<&str> {
        let sources: HashSet<&str> = self.edges.iter().map(|e| e.source.as_str()).collect();
        self.nodes
            .iter()
            .map(|n| n.id.as_str())
            .filter(|id| !sources.contains(id))
            .collect()
    }

    /// Direct predecessors of `id`, in edge order.
    pub fn predecessors<'g>(&'g self, id: &'g str) -> impl Iterator<Item = &'g str> + 'g {
        self.edges
            .iter()
            .filter(move |e| e.target == id)
            .map(|e| e.source.as_str())
    }

    /// Every ancestor of `id`, nearest first (breadth-first over reversed edges).
    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<&str> = self
            .edges
            .iter()
            .filter(|e| e.target == id)
            .map(|e| e.source.as_str())
            .collect();

        while let Some(current) = queue.pop_front() {
            if current == id || !seen.insert(current) {
                continue;
            }
            order.push(current);
            queue.extend(self.predecessors(current));
        }
        order
    }

    pub fn signature(&self) -> GraphSignature {
        GraphSignature {
            nodes: self
                .nodes
                .iter()
                .map(|n| (n.id.clone(), n.data.module_type.clone().unwrap_or_default()))
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| (e.source.clone(), e.target.clone()))
                .collect(),
        }
    }
}

/// Structural identity of a graph: which nodes exist and how they connect.
///
/// Layout, labels and other editor-only fields are not part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSignature {
    /// `(id, moduleType)`
    pub nodes: BTreeSet<(String, String)>,
    /// `(source, target)`
    pub edges: BTreeSet<(String, String)>,
}

impl GraphSignature {
    /// What changed going from `self` to `next`.
    pub fn diff(&self, next: &GraphSignature) -> GraphChange {
        GraphChange {
            added_nodes: next.nodes.difference(&self.nodes).cloned().collect(),
            removed_nodes: self.nodes.difference(&next.nodes).cloned().collect(),
            added_edges: next.edges.difference(&self.edges).cloned().collect(),
            removed_edges: self.edges.difference(&next.edges).cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphChange {
    pub added_nodes: Vec<(String, String)>,
    pub removed_nodes: Vec<(String, String)>,
    pub added_edges: Vec<(String, String)>,
    pub removed_edges: Vec<(String, String)>,
}

impl GraphChange {
    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty()
    }
}
