mod common;

use common::{json_response, TestApp, TestProviders};
use rag_chatbot::services::providers::mock::{MockRetriever, MockTextModel};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn empty_question_is_bad_request() {
    let app = TestApp::spawn().await;

    let (status, body) = json_response(app.post_json("/chat", &json!({"question": ""})).await).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Question required"}));
    assert_eq!(app.retriever.calls(), 0);

    app.cleanup().await;
}

#[tokio::test]
async fn missing_body_is_bad_request() {
    let app = TestApp::spawn().await;

    let (status, body) = json_response(app.post_raw("/chat", "").await).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "Question required");

    app.cleanup().await;
}

#[tokio::test]
async fn message_key_is_accepted_as_question() {
    let app = TestApp::spawn_with(TestProviders {
        retriever: Arc::new(MockRetriever::failing("unavailable")),
        ..TestProviders::default()
    })
    .await;

    let (status, body) = json_response(app.post_json("/chat", &json!({"message": "x"})).await).await;

    assert_eq!(status, 200);
    assert_eq!(body["answer"], "Mock response for: x");

    app.cleanup().await;
}

#[tokio::test]
async fn knowledge_base_answer_has_capped_citations() {
    let app = TestApp::spawn().await;

    let (status, body) = json_response(
        app.post_json("/chat", &json!({"question": "How long do refunds take?"}))
            .await,
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["source"], "knowledge_base");
    assert_eq!(body["answer"], "Refunds are processed within 5 days.");

    let citations = body["citations"].as_array().expect("citations array");
    assert_eq!(citations.len(), 3);
    for citation in citations {
        assert!(citation["text"].as_str().unwrap().chars().count() <= 200);
    }
    assert_eq!(citations[0]["source"], "s3://docs-bucket/policy.pdf");
    assert_eq!(citations[1], json!({"text": "Refund window", "source": ""}));
    assert_eq!(citations[2]["text"], "Processing times");

    assert!(app.model.requests().is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn retrieval_failure_falls_back_to_direct_model() {
    let app = TestApp::spawn_with(TestProviders {
        retriever: Arc::new(MockRetriever::failing("ResourceNotFoundException")),
        ..TestProviders::default()
    })
    .await;

    let (status, body) =
        json_response(app.post_json("/chat", &json!({"question": "Hello"})).await).await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "answer": "Mock response for: Hello",
            "citations": [],
            "source": "direct_model"
        })
    );
    assert_eq!(app.retriever.calls(), 1);
    assert_eq!(app.model.requests(), vec![("Hello".to_string(), 1024)]);

    app.cleanup().await;
}

#[tokio::test]
async fn fallback_failure_surfaces_as_internal_error() {
    let app = TestApp::spawn_with(TestProviders {
        retriever: Arc::new(MockRetriever::failing("ResourceNotFoundException")),
        model: Arc::new(MockTextModel::new(false)),
        ..TestProviders::default()
    })
    .await;

    let (status, body) =
        json_response(app.post_json("/chat", &json!({"question": "Hello"})).await).await;

    assert_eq!(status, 500);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Mock text model not enabled"));

    app.cleanup().await;
}
