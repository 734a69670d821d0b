use serde_json::json;

use crate::{DocumentSource, PipelineGraph, PipelineOutput, RedlineSession, ReviewAction, ReviewError};
use layered_redline_document::SuggestionStatus;

const MEMO: &str = "The Tenent shall pay teh rent.";

fn output() -> PipelineOutput {
    PipelineOutput::from_value(&json!({
        "results": [
            { "nodeId": "input", "moduleType": "document-input", "result": { "content": MEMO } },
            { "nodeId": "grammar", "moduleType": "grammar-checker", "result": { "suggestions": [
                { "id": "g1", "originalText": "Tenent", "suggestedText": "Tenant", "startPos": 4, "endPos": 10 },
                { "id": "g2", "originalText": "teh", "suggestedText": "the", "startPos": 21, "endPos": 24 }
            ] } }
        ]
    }))
    .unwrap()
}

fn graph(extra_edge: bool) -> PipelineGraph {
    let mut edges = vec![json!({ "source": "input", "target": "grammar" })];
    if extra_edge {
        edges.push(json!({ "source": "grammar", "target": "review" }));
    }
    PipelineGraph::from_value(&json!({
        "nodes": [
            { "id": "input", "data": { "moduleType": "document-input" } },
            { "id": "grammar", "data": { "moduleType": "grammar-checker" } },
            { "id": "review", "data": { "moduleType": "grammar-checker" } }
        ],
        "edges": edges
    }))
    .unwrap()
}

fn source() -> DocumentSource {
    DocumentSource::new("memo.txt", "txt")
}

#[test]
fn identical_input_is_not_reprocessed() {
    let mut session = RedlineSession::default();
    let first = session.process(&output(), None, &source());
    assert!(!first.is_unchanged());

    let second = session.process(&output(), None, &source());
    assert!(second.is_unchanged());
    assert!(std::sync::Arc::ptr_eq(first.run(), second.run()));
}

#[test]
fn graph_change_invalidates_the_cache() {
    let (before, after) = (graph(false), graph(true));
    let mut session = RedlineSession::default();
    session.process(&output(), Some(&before), &source());
    assert!(session.process(&output(), Some(&before), &source()).is_unchanged());

    match session.process(&output(), Some(&after), &source()) {
        crate::SessionUpdate::Processed { graph_change, .. } => {
            let change = graph_change.unwrap();
            assert_eq!(change.added_edges.len(), 1);
            assert!(change.removed_edges.is_empty());
            assert!(change.added_nodes.is_empty());
        }
        other => panic!("expected reprocessing, got {:?}", other),
    }
}

#[test]
fn clear_forgets_the_last_run() {
    let mut session = RedlineSession::default();
    session.process(&output(), None, &source());
    session.clear();
    assert!(session.current().is_none());
    assert!(!session.process(&output(), None, &source()).is_unchanged());
}

#[test]
fn review_replaces_the_current_document() {
    let mut session = RedlineSession::default();
    session.process(&output(), None, &source());

    let accepted = session.review(&ReviewAction::Accept("g1".to_string())).unwrap();
    assert_eq!(accepted.current_content, "The Tenant shall pay teh rent.");
    assert_eq!(accepted.metadata.accepted_suggestions, 1);

    let rejected = session.review(&ReviewAction::Reject("g2".to_string())).unwrap();
    assert_eq!(rejected.current_content, "The Tenant shall pay teh rent.");
    assert_eq!(rejected.suggestion("g2").unwrap().status, SuggestionStatus::Rejected);

    let current = session.current().unwrap().document().unwrap();
    assert_eq!(current.metadata.rejected_suggestions, 1);
    assert_eq!(current.pending().count(), 0);

    assert_eq!(
        session.review(&ReviewAction::Reject("g1".to_string())),
        Err(ReviewError::AlreadyReviewed {
            id: "g1".to_string(),
            status: SuggestionStatus::Accepted,
        })
    );
}

#[test]
fn review_without_a_document_fails() {
    let mut session = RedlineSession::default();
    let accept = ReviewAction::Accept("g1".to_string());
    assert_eq!(session.review(&accept), Err(ReviewError::NoDocument));

    // A run that produced no document is no better
    let only_input = PipelineOutput::from_value(&json!({
        "results": [{ "nodeId": "input", "moduleType": "document-input", "result": { "content": MEMO } }]
    }))
    .unwrap();
    session.process(&only_input, None, &source());
    assert!(session.current().is_some());
    assert_eq!(session.review(&accept), Err(ReviewError::NoDocument));
    assert_eq!(ReviewError::NoDocument.to_string(), "no redline document to review");
}
