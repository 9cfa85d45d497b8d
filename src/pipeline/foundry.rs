use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE } };
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{ normalize_reply, AgentPipeline, PipelineConfig, PipelineError };
use crate::models::chat::{ AgentReply, ChatMessage };

pub const DEFAULT_API_VERSION: &str = "2025-04-01-preview";

/// Agent pipeline hosted on an Azure AI Foundry project. The project
/// endpoint owns model deployment, tool execution and scaling; this client
/// only ships the conversation and the static agent configuration.
pub struct FoundryPipeline {
    http: HttpClient,
    url: String,
    api_key: String,
    model: String,
    instructions: String,
    tools: Vec<JsonValue>,
}

#[derive(Serialize)]
struct FoundryRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: Vec<InputMessage<'a>>,
    tools: &'a [JsonValue],
}

#[derive(Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: &'a str,
}

impl FoundryPipeline {
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        instructions: String,
        tools: Vec<JsonValue>
    ) -> Result<Self, PipelineError> {
        let url = format!(
            "{}/openai/responses?api-version={}",
            endpoint.trim_end_matches('/'),
            DEFAULT_API_VERSION
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "api-key",
            HeaderValue::from_str(&api_key).map_err(|e|
                PipelineError::Config(format!("Invalid API key format: {}", e))
            )?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(PipelineError::Transport)?;

        Ok(Self { http, url, api_key, model, instructions, tools })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let endpoint = config.endpoint
            .clone()
            .ok_or_else(|| {
                PipelineError::Config("Foundry project endpoint is required".to_string())
            })?;
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| PipelineError::Config("Foundry API key is required".to_string()))?;

        Self::new(
            endpoint,
            api_key,
            config.model.clone(),
            config.instructions.clone(),
            config.tools.iter().map(|t| t.to_tool_param()).collect()
        )
    }
}

#[async_trait]
impl AgentPipeline for FoundryPipeline {
    async fn run(&self, messages: &[ChatMessage]) -> Result<AgentReply, PipelineError> {
        let input: Vec<InputMessage> = messages
            .iter()
            .map(|m| InputMessage { role: m.role.as_str(), content: &m.content })
            .collect();

        let req = FoundryRequest {
            model: &self.model,
            instructions: &self.instructions,
            input,
            tools: &self.tools,
        };

        let resp = self.http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&req)
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Status {
                status: status.as_u16(),
                detail: extract_error_detail(&detail),
            });
        }

        let body: JsonValue = resp.json().await?;
        debug!("Foundry pipeline response: {}", body);
        normalize_reply(&body)
    }
}

/// Azure error bodies nest the message under `error.message`; fall back to
/// the raw body when they don't.
fn extract_error_detail(body: &str) -> String {
    serde_json
        ::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_prefers_nested_message() {
        let body = r#"{"error":{"code":"401","message":"bad key"}}"#;
        assert_eq!(extract_error_detail(body), "bad key");
        assert_eq!(extract_error_detail("plain failure"), "plain failure");
    }

    #[test]
    fn from_config_requires_endpoint_and_key() {
        let config = PipelineConfig {
            pipeline_type: super::super::PipelineType::Foundry,
            endpoint: None,
            api_key: Some("key".to_string()),
            model: "gpt-5-mini".to_string(),
            instructions: String::new(),
            tools: Vec::new(),
        };
        assert!(matches!(
            FoundryPipeline::from_config(&config),
            Err(PipelineError::Config(_))
        ));
    }
}
