use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE } };
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{ normalize_reply, AgentPipeline, PipelineConfig, PipelineError };
use crate::models::chat::{ AgentReply, ChatMessage };

/// Agent pipeline reachable over an OpenAI-compatible responses endpoint.
/// Useful against local gateways during development; the hosted deployment
/// uses [`super::foundry::FoundryPipeline`].
pub struct OpenAIPipeline {
    http: HttpClient,
    url: String,
    model: String,
    instructions: String,
    tools: Vec<JsonValue>,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
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

impl OpenAIPipeline {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        model: String,
        instructions: String,
        tools: Vec<JsonValue>
    ) -> Result<Self, PipelineError> {
        let base = base_url.unwrap_or_else(|| "https://api.openai.com".to_string());
        let url = if base.ends_with("/v1/responses") {
            base
        } else {
            format!("{}/v1/responses", base.trim_end_matches('/'))
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e|
                PipelineError::Config(format!("Invalid API key format: {}", e))
            )?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(PipelineError::Transport)?;

        Ok(Self { http, url, model, instructions, tools })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| PipelineError::Config("OpenAI API key is required".to_string()))?;

        Self::new(
            api_key,
            config.endpoint.clone(),
            config.model.clone(),
            config.instructions.clone(),
            config.tools.iter().map(|t| t.to_tool_param()).collect()
        )
    }
}

#[async_trait]
impl AgentPipeline for OpenAIPipeline {
    async fn run(&self, messages: &[ChatMessage]) -> Result<AgentReply, PipelineError> {
        let input: Vec<InputMessage> = messages
            .iter()
            .map(|m| InputMessage { role: m.role.as_str(), content: &m.content })
            .collect();

        let req = OpenAIRequest {
            model: &self.model,
            instructions: &self.instructions,
            input,
            tools: &self.tools,
        };

        let resp = self.http.post(&self.url).json(&req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let body: JsonValue = resp.json().await?;
        debug!("OpenAI pipeline response: {}", body);
        normalize_reply(&body)
    }
}
