use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;

use layered_redline::{AnchoredText, MarkupReport};
use layered_redline_document::{
    apply_review_action, DocumentSource, EmptyRedline, RedlineDocument, RedlineSuggestion, ReviewAction,
};
use layered_redline_pipeline::{
    extractor_infos, ExtractorInfo, GraphChange, PipelineFingerprint, PipelineGraph, PipelineOutput,
    RedlineConfig, RedlinePipeline, RunWarning, SessionUpdate,
};

// Set up panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

// ============================================================================
// ERRORS
// ============================================================================

/// Error response returned in place of a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeError {
    pub error: BridgeErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeErrorDetail {
    pub code: String,
    pub message: String,
}

impl BridgeError {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: BridgeErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    fn invalid_input(message: impl Into<String>) -> Self {
        Self::new("invalid_input", message)
    }

    fn review_failed(message: impl Into<String>) -> Self {
        Self::new("review_failed", message)
    }
}

/// Plain objects rather than `Map`s, so the UI can read fields directly.
fn to_js<T: Serialize>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).unwrap_or_else(|e| {
        let error = BridgeError::new("internal_error", format!("Failed to serialize result: {}", e));
        error.serialize(&serializer).unwrap_or(JsValue::NULL)
    })
}

fn from_js<T: for<'de> Deserialize<'de>>(value: JsValue, what: &str) -> Result<T, BridgeError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| BridgeError::invalid_input(format!("{}: {}", what, e)))
}

fn respond<T: Serialize>(result: Result<T, BridgeError>) -> JsValue {
    match result {
        Ok(value) => to_js(&value),
        Err(error) => to_js(&error),
    }
}

// ============================================================================
// STATELESS API
// ============================================================================

/// Insert paragraph anchors into raw document text.
#[wasm_bindgen]
pub fn generate_anchors(text: &str) -> JsValue {
    to_js(&generate_anchors_internal(text))
}

fn generate_anchors_internal(text: &str) -> AnchoredText {
    layered_redline::generate_anchors(text)
}

/// Markup pass result. On failure `html` is the input unchanged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupResponse {
    #[serde(flatten)]
    pub report: MarkupReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Wrap suggestions in `redline-suggestion` spans inside `html`.
///
/// `suggestions` is an array of suggestion objects as found in a
/// `RedlineDocument`. Non-pending suggestions are rendered too; filter
/// before calling if only pending ones should show.
///
/// Pass the document's `originalContent` as `content` when the suggestions
/// are positioned against it rather than against the HTML's own text.
#[wasm_bindgen]
pub fn apply_markup(html: &str, suggestions: JsValue, content: Option<String>) -> JsValue {
    respond(
        from_js::<Vec<RedlineSuggestion>>(suggestions, "suggestions")
            .map(|s| apply_markup_internal(html, &s, content.as_deref())),
    )
}

fn apply_markup_internal(html: &str, suggestions: &[RedlineSuggestion], content: Option<&str>) -> MarkupResponse {
    let result = match content {
        Some(content) => layered_redline::apply_markup_to_content(html, content, suggestions),
        None => layered_redline::apply_markup(html, suggestions),
    };
    match result {
        Ok(report) => MarkupResponse { report, error: None },
        Err(err) => MarkupResponse {
            report: MarkupReport {
                html: html.to_string(),
                applied: 0,
                skipped: Vec::new(),
            },
            error: Some(err.to_string()),
        },
    }
}

/// Apply `{ action: "accept" | "reject", suggestionId }` to a document.
///
/// Returns the next document, or an error object if the action is refused.
#[wasm_bindgen]
pub fn review_suggestion(document: JsValue, action: JsValue) -> JsValue {
    let result = from_js::<RedlineDocument>(document, "document").and_then(|document| {
        let action = from_js::<ReviewAction>(action, "action")?;
        review_suggestion_internal(&document, &action)
    });
    respond(result)
}

fn review_suggestion_internal(document: &RedlineDocument, action: &ReviewAction) -> Result<RedlineDocument, BridgeError> {
    apply_review_action(document, action).map_err(|e| BridgeError::review_failed(e.to_string()))
}

/// Names, descriptions and module types of the built-in extractors.
#[wasm_bindgen]
pub fn list_extractors() -> JsValue {
    to_js(&list_extractors_internal())
}

fn list_extractors_internal() -> Vec<ExtractorInfo> {
    extractor_infos()
}

// ============================================================================
// SESSION API
// ============================================================================

/// Serializable outcome of [`RedlineSession::process`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    /// `"processed"` or `"unchanged"`
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<RedlineDocument>,
    /// Why there is no document, for the empty-state UI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty: Option<EmptyRedline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_reason: Option<String>,
    pub warnings: Vec<RunWarning>,
    pub fingerprint: PipelineFingerprint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_change: Option<GraphChange>,
}

impl ProcessResponse {
    fn from_update(update: &SessionUpdate) -> Self {
        let run = update.run();
        let (document, empty) = match &run.outcome {
            Ok(document) => (Some(RedlineDocument::clone(document)), None),
            Err(empty) => (None, Some(empty.clone())),
        };
        let (status, graph_change) = match update {
            SessionUpdate::Unchanged(_) => ("unchanged", None),
            SessionUpdate::Processed { graph_change, .. } => ("processed", graph_change.clone()),
        };
        ProcessResponse {
            status,
            document,
            empty_reason: empty.as_ref().map(EmptyRedline::reason),
            empty,
            warnings: run.warnings.clone(),
            fingerprint: run.fingerprint.clone(),
            graph_change,
        }
    }
}

/// A redline session owned by the review panel.
///
/// Remembers the last processed output so repeated renders are free, and
/// holds the document review actions are applied to.
#[wasm_bindgen]
pub struct RedlineSession {
    inner: layered_redline_pipeline::RedlineSession,
}

#[wasm_bindgen]
impl RedlineSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> RedlineSession {
        init();
        RedlineSession {
            inner: layered_redline_pipeline::RedlineSession::default(),
        }
    }

    /// Create a session from a TOML config; throws on invalid config.
    pub fn with_config(config_toml: &str) -> Result<RedlineSession, JsValue> {
        init();
        let config = RedlineConfig::from_toml_str(config_toml).map_err(|e| to_js(&BridgeError::invalid_input(e.to_string())))?;
        Ok(RedlineSession {
            inner: layered_redline_pipeline::RedlineSession::new(RedlinePipeline::new(config)),
        })
    }

    /// Process raw pipeline output. `graph` may be `null` or `undefined`.
    pub fn process(&mut self, output: JsValue, graph: JsValue, source: JsValue) -> JsValue {
        let result = (|| {
            let output: Value = from_js(output, "output")?;
            let graph: Option<Value> = from_js(graph, "graph")?;
            let source: DocumentSource = from_js(source, "source")?;
            process_internal(&mut self.inner, &output, graph.as_ref(), &source)
        })();
        respond(result)
    }

    /// Accept or reject a suggestion in the current document.
    pub fn review(&mut self, action: JsValue) -> JsValue {
        let result = from_js::<ReviewAction>(action, "action").and_then(|action| review_internal(&mut self.inner, &action));
        respond(result)
    }

    /// The current document, or `null` before the first successful run.
    pub fn current(&self) -> JsValue {
        match self.inner.current().and_then(|run| run.document()) {
            Some(document) => to_js(document.as_ref()),
            None => JsValue::NULL,
        }
    }

    /// Forget the last processed output; the next `process` always runs.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl Default for RedlineSession {
    fn default() -> Self {
        Self::new()
    }
}

fn process_internal(
    session: &mut layered_redline_pipeline::RedlineSession,
    output: &Value,
    graph: Option<&Value>,
    source: &DocumentSource,
) -> Result<ProcessResponse, BridgeError> {
    let output = PipelineOutput::from_value(output).map_err(|e| BridgeError::invalid_input(e.to_string()))?;
    let graph = graph.filter(|g| !g.is_null()).and_then(PipelineGraph::from_value);
    let update = session.process(&output, graph.as_ref(), source);
    Ok(ProcessResponse::from_update(&update))
}

fn review_internal(
    session: &mut layered_redline_pipeline::RedlineSession,
    action: &ReviewAction,
) -> Result<RedlineDocument, BridgeError> {
    session
        .review(action)
        .map(|document| RedlineDocument::clone(&document))
        .map_err(|e| BridgeError::review_failed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn output() -> Value {
        json!({
            "results": [
                { "nodeId": "input", "moduleType": "document-input",
                  "result": { "content": "Hello world.\n\nThis is bad grammer." } },
                { "nodeId": "grammar", "moduleType": "grammar-checker", "result": { "suggestions": [
                    { "id": "g1", "originalText": "grammer", "suggestedText": "grammar", "startPos": 33, "endPos": 40 }
                ] } }
            ]
        })
    }

    fn source() -> DocumentSource {
        DocumentSource::new("memo.txt", "txt")
    }

    #[test]
    fn anchors_round_trip_through_json() {
        let anchored = generate_anchors_internal("One.\n\nTwo.");
        let json = serde_json::to_value(&anchored).unwrap();
        assert_eq!(json["anchoredContent"], "⟦P-00001⟧One.\n\n⟦P-00002⟧Two.");
        assert_eq!(json["anchorCount"], 2);
    }

    #[test]
    fn session_process_then_unchanged() {
        let mut session = layered_redline_pipeline::RedlineSession::default();
        let first = process_internal(&mut session, &output(), None, &source()).unwrap();
        assert_eq!(first.status, "processed");
        let document = first.document.unwrap();
        assert_eq!((document.suggestions[0].start_pos, document.suggestions[0].end_pos), (26, 33));

        let second = process_internal(&mut session, &output(), Some(&Value::Null), &source()).unwrap();
        assert_eq!(second.status, "unchanged");
        assert_eq!(second.fingerprint, first.fingerprint);
    }

    #[test]
    fn empty_outcome_carries_a_reason() {
        let mut session = layered_redline_pipeline::RedlineSession::default();
        let only_input = json!({ "results": [output()["results"][0].clone()] });
        let response = process_internal(&mut session, &only_input, None, &source()).unwrap();
        assert!(response.document.is_none());
        assert_eq!(response.empty, Some(EmptyRedline::NoTerminalModules));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["empty"]["reason"], "noTerminalModules");
        assert_eq!(json["emptyReason"], "no terminal modules to reconcile");
    }

    #[test]
    fn malformed_output_is_an_error_object() {
        let mut session = layered_redline_pipeline::RedlineSession::default();
        let err = process_internal(&mut session, &json!({ "nodes": [] }), None, &source()).unwrap_err();
        assert_eq!(err.error.code, "invalid_input");
    }

    #[test]
    fn review_through_session_and_standalone() {
        let mut session = layered_redline_pipeline::RedlineSession::default();
        let document = process_internal(&mut session, &output(), None, &source())
            .unwrap()
            .document
            .unwrap();

        let standalone = review_suggestion_internal(&document, &ReviewAction::Accept("g1".to_string())).unwrap();
        assert_eq!(standalone.current_content, "Hello world.\n\nThis is bad grammar.");

        let reviewed = review_internal(&mut session, &ReviewAction::Reject("g1".to_string())).unwrap();
        assert_eq!(reviewed.metadata.rejected_suggestions, 1);

        let err = review_internal(&mut session, &ReviewAction::Accept("g1".to_string())).unwrap_err();
        assert_eq!(err.error.code, "review_failed");
    }

    #[test]
    fn markup_failure_returns_original_html() {
        let mut session = layered_redline_pipeline::RedlineSession::default();
        let document = process_internal(&mut session, &output(), None, &source())
            .unwrap()
            .document
            .unwrap();

        let broken = "<p>Hello world.</p><p>This is bad grammer.</p";
        let response = apply_markup_internal(broken, &document.suggestions, Some(&document.original_content));
        assert_eq!(response.report.html, broken);
        assert!(response.error.is_some());
    }

    #[test]
    fn markup_follows_document_content() {
        let mut session = layered_redline_pipeline::RedlineSession::default();
        let document = process_internal(&mut session, &output(), None, &source())
            .unwrap()
            .document
            .unwrap();
        let html = "<p>Hello world.</p><p>This is bad grammer.</p>";

        let aligned = apply_markup_internal(html, &document.suggestions, Some(&document.original_content));
        assert_eq!(aligned.report.applied, 1);
        assert!(aligned.error.is_none());
        assert!(aligned.report.html.ends_with(r#"data-suggested="grammar">grammer</span>.</p>"#));

        // Without the content, 26..33 is read as a position in the HTML text
        let unaligned = apply_markup_internal(html, &document.suggestions, None);
        assert_eq!(unaligned.report.applied, 0);
    }

    #[test]
    fn extractors_are_listed() {
        let names: Vec<&str> = list_extractors_internal().iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["grammar", "citation"]);
    }
}
