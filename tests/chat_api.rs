use async_trait::async_trait;
use axum::body::Body;
use axum::http::{ header, Method, Request, StatusCode };
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tower::ServiceExt;

use intake_agent::agent::Agent;
use intake_agent::models::chat::{ AgentReply, ChatMessage };
use intake_agent::pipeline::{ AgentPipeline, PipelineError };
use intake_agent::server::api::{ router, AppState };

/// Pipeline stub that answers with a fixed reply and records every
/// conversation it receives, in order.
struct RecordingPipeline {
    reply: String,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl RecordingPipeline {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AgentPipeline for RecordingPipeline {
    async fn run(&self, messages: &[ChatMessage]) -> Result<AgentReply, PipelineError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        Ok(AgentReply::from_text(self.reply.clone()))
    }
}

struct FailingPipeline;

#[async_trait]
impl AgentPipeline for FailingPipeline {
    async fn run(&self, _messages: &[ChatMessage]) -> Result<AgentReply, PipelineError> {
        Err(PipelineError::Status {
            status: 500,
            detail: "model backend unavailable".to_string(),
        })
    }
}

struct StallingPipeline;

#[async_trait]
impl AgentPipeline for StallingPipeline {
    async fn run(&self, _messages: &[ChatMessage]) -> Result<AgentReply, PipelineError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(AgentReply::from_text("too late"))
    }
}

fn app_with(pipeline: Arc<dyn AgentPipeline>) -> axum::Router {
    let agent = Agent::with_pipeline("IntakeFormAssistant", pipeline, Duration::from_secs(5));
    router(AppState { agent: Arc::new(agent) })
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> JsonValue {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn well_formed_conversation_returns_response() {
    let app = app_with(RecordingPipeline::new("Happy to help with your intake form."));

    let response = app
        .oneshot(chat_request(r#"{"messages":[{"role":"user","content":"Hello!"}]}"#)).await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let reply = body["response"].as_str().unwrap();
    assert!(!reply.is_empty());
}

#[tokio::test]
async fn payload_without_messages_key_is_rejected() {
    let app = app_with(RecordingPipeline::new("unused"));

    let response = app.oneshot(chat_request(r#"{"invalid":"request"}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn empty_messages_rejection_is_idempotent() {
    let pipeline = RecordingPipeline::new("unused");
    let app = app_with(pipeline.clone());

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(chat_request(r#"{"messages":[]}"#)).await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert!(body["error"].as_str().is_some());
    }

    // Never interpreted as an empty-but-valid conversation.
    assert!(pipeline.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_role_is_a_client_error() {
    let app = app_with(RecordingPipeline::new("unused"));

    let response = app
        .oneshot(chat_request(r#"{"messages":[{"role":"operator","content":"hi"}]}"#)).await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn message_order_is_forwarded_unchanged() {
    let pipeline = RecordingPipeline::new("noted");
    let app = app_with(pipeline.clone());

    let response = app
        .oneshot(chat_request(
            r#"{"messages":[
                {"role":"user","content":"first"},
                {"role":"assistant","content":"second"},
                {"role":"user","content":"third"}
            ]}"#
        )).await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let calls = pipeline.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let contents: Vec<&str> = calls[0].iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let app = app_with(Arc::new(FailingPipeline));

    let response = app
        .oneshot(chat_request(r#"{"messages":[{"role":"user","content":"Hello!"}]}"#)).await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("model backend unavailable"));
}

#[tokio::test(start_paused = true)]
async fn stalled_pipeline_maps_to_gateway_timeout() {
    let app = app_with(Arc::new(StallingPipeline));

    let response = app
        .oneshot(chat_request(r#"{"messages":[{"role":"user","content":"Hello!"}]}"#)).await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = body_json(response).await;
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn liveness_probe_ignores_pipeline_health() {
    let app = app_with(Arc::new(FailingPipeline));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["agent"], "IntakeFormAssistant");
}

#[tokio::test]
async fn concurrent_requests_share_no_state() {
    let pipeline = RecordingPipeline::new("concurrent reply");
    let app = app_with(pipeline.clone());

    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let body = format!(r#"{{"messages":[{{"role":"user","content":"call {}"}}]}}"#, i);
            app.oneshot(chat_request(&body)).await.unwrap().status()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(pipeline.calls.lock().unwrap().len(), 8);
}
