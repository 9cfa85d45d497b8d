use crate::agent::{ Agent, AgentError };
use crate::models::chat::{ ChatRequest, ChatResponse, ErrorResponse };
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    body::Bytes,
    extract::State,
    response::IntoResponse,
    http::StatusCode,
};
use serde_json::json;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
}

/// Builds the facade router. Exposed separately from the listener so tests
/// can drive it without binding a socket.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/chat", post(chat_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    addr: &str,
    agent: Arc<Agent>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    let app = router(AppState { agent });
    let listener = tokio::net::TcpListener::bind(addr).await
        .map_err(|e| format!("Failed to bind HTTP server to {}: {}", addr, e))?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Liveness probe. Reports reachability only; deliberately independent of
/// pipeline health.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "agent": state.agent.name(),
    }))
}

/// The chat facade: body bytes in, one success or error shape out. Parsing
/// is done by hand so every rejection carries a JSON error body instead of
/// a framework default.
async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes
) -> impl IntoResponse {
    let request_id = Uuid::new_v4();

    let request = match serde_json::from_slice::<ChatRequest>(&body) {
        Ok(req) => req,
        Err(e) => {
            info!("[{}] Rejected malformed chat request: {}", request_id, e);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: format!("malformed request body: {}", e),
                }),
            ).into_response();
        }
    };

    info!("[{}] Chat request with {} message(s)", request_id, request.messages.len());

    match state.agent.handle_chat(&request.messages).await {
        Ok(reply) => {
            info!("[{}] Pipeline replied ({} chars)", request_id, reply.assistant_reply().len());
            (
                StatusCode::OK,
                Json(ChatResponse {
                    response: reply.assistant_reply().to_string(),
                }),
            ).into_response()
        }
        Err(e) => {
            let status = error_status(&e);
            error!("[{}] Chat request failed ({}): {}", request_id, status, e);
            (status, Json(ErrorResponse { error: e.to_string() })).into_response()
        }
    }
}

/// Client faults are 4xx, upstream faults are 5xx; the two are never
/// conflated and neither is coerced into an empty 200.
fn error_status(err: &AgentError) -> StatusCode {
    match err {
        AgentError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AgentError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        AgentError::Pipeline(_) => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineError;
    use std::time::Duration;

    #[test]
    fn status_mapping_separates_client_and_server_faults() {
        let invalid = AgentError::InvalidRequest("empty".to_string());
        assert_eq!(error_status(&invalid), StatusCode::UNPROCESSABLE_ENTITY);

        let timeout = AgentError::Timeout(Duration::from_secs(1));
        assert_eq!(error_status(&timeout), StatusCode::GATEWAY_TIMEOUT);

        let upstream = AgentError::Pipeline(PipelineError::Malformed("no reply".to_string()));
        assert_eq!(error_status(&upstream), StatusCode::BAD_GATEWAY);
    }
}
