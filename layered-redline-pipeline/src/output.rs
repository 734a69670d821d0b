//! Pipeline output as delivered by the execution layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::{probe_bool, probe_str, AccessPath};

const NODE_ID_PATHS: &[AccessPath] = &["nodeId", "node_id", "id"];
const MODULE_TYPE_PATHS: &[AccessPath] = &["moduleType", "module_type", "type", "data.moduleType"];
const RESULT_PATHS: &[AccessPath] = &["result", "output", "data"];
const ENDPOINT_FLAG_PATHS: &[AccessPath] = &["isEndpoint", "is_endpoint"];

/// Which key the results list was found under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultsShape {
    Results,
    PipelineResults,
    /// Only endpoint modules were reported
    EndpointResults,
    /// The output was the list itself
    BareArray,
}

/// Output of one executed pipeline module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResult {
    pub node_id: String,
    pub module_type: String,
    pub result: Value,
    #[serde(default)]
    pub is_endpoint: bool,
}

impl ModuleResult {
    pub fn new(node_id: impl Into<String>, module_type: impl Into<String>, result: Value) -> Self {
        ModuleResult {
            node_id: node_id.into(),
            module_type: module_type.into(),
            result,
            is_endpoint: false,
        }
    }

    pub fn endpoint(mut self) -> Self {
        self.is_endpoint = true;
        self
    }

    /// Lenient parse of one results-list entry.
    ///
    /// Missing ids become `node-{index}`, missing types `unknown`, and a
    /// missing result `null`. Non-object entries are rejected.
    fn from_entry(index: usize, entry: &Value) -> Option<Self> {
        if !entry.is_object() {
            tracing::debug!(index, "results entry is not an object, skipped");
            return None;
        }
        let node_id = probe_str(entry, NODE_ID_PATHS)
            .map(|(_, id)| id.to_string())
            .unwrap_or_else(|| format!("node-{}", index));
        let module_type = probe_str(entry, MODULE_TYPE_PATHS)
            .map(|(_, t)| t.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let result = RESULT_PATHS
            .iter()
            .find_map(|path| entry.get(*path))
            .cloned()
            .unwrap_or(Value::Null);
        let is_endpoint = probe_bool(entry, ENDPOINT_FLAG_PATHS).unwrap_or(false);

        Some(ModuleResult {
            node_id,
            module_type,
            result,
            is_endpoint,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutputError {
    #[error("pipeline output is not valid json: {0}")]
    Json(String),
    #[error("pipeline output has no results, pipelineResults or endpointResults list")]
    NoResultsList,
}

/// Normalized pipeline output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub shape: ResultsShape,
    pub results: Vec<ModuleResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

const RESULTS_KEYS: [(&str, ResultsShape); 3] = [
    ("results", ResultsShape::Results),
    ("pipelineResults", ResultsShape::PipelineResults),
    ("endpointResults", ResultsShape::EndpointResults),
];

impl PipelineOutput {
    /// Outputs built directly from module results use the `results` shape.
    pub fn from_results(results: Vec<ModuleResult>) -> Self {
        PipelineOutput {
            shape: ResultsShape::Results,
            results,
            summary: None,
            metadata: None,
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self, OutputError> {
        let value: Value = serde_json::from_str(source).map_err(|err| OutputError::Json(err.to_string()))?;
        Self::from_value(&value)
    }

    /// Accepts `{ results | pipelineResults | endpointResults, summary?, metadata? }`
    /// or a bare array of entries.
    pub fn from_value(value: &Value) -> Result<Self, OutputError> {
        let (shape, entries) = match value {
            Value::Array(entries) => (ResultsShape::BareArray, entries),
            Value::Object(map) => {
                let lists: Vec<(ResultsShape, &Vec<Value>)> = RESULTS_KEYS
                    .iter()
                    .filter_map(|(key, shape)| match map.get(*key) {
                        Some(Value::Array(entries)) => Some((*shape, entries)),
                        _ => None,
                    })
                    .collect();
                // An empty list only counts when no other key has entries
                lists
                    .iter()
                    .find(|(_, entries)| !entries.is_empty())
                    .or_else(|| lists.first())
                    .copied()
                    .ok_or(OutputError::NoResultsList)?
            }
            _ => return Err(OutputError::NoResultsList),
        };

        let results = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| ModuleResult::from_entry(index, entry))
            .collect();

        Ok(PipelineOutput {
            shape,
            results,
            summary: value.get("summary").cloned(),
            metadata: value.get("metadata").cloned(),
        })
    }

    pub fn position_of(&self, node_id: &str) -> Option<usize> {
        self.results.iter().position(|r| r.node_id == node_id)
    }
}
