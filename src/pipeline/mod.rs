pub mod foundry;
pub mod openai;

use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::models::chat::{ AgentReply, ChatMessage };
use crate::tools::HostedMcpTool;
use self::foundry::FoundryPipeline;
use self::openai::OpenAIPipeline;

/// Errors surfaced by the outbound pipeline call. The facade maps these to
/// server-error statuses; it never retries and never masks them as success.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("pipeline returned status {status}: {detail}")]
    Status {
        status: u16,
        detail: String,
    },

    #[error("unusable pipeline response: {0}")]
    Malformed(String),

    #[error("pipeline configuration error: {0}")]
    Config(String),
}

/// The external agent/model/tool pipeline. It owns reasoning, tool
/// invocation, model selection and any multi-turn memory; the facade only
/// hands it the ordered conversation and static configuration.
#[async_trait]
pub trait AgentPipeline: Send + Sync {
    async fn run(&self, messages: &[ChatMessage]) -> Result<AgentReply, PipelineError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineType {
    Foundry,
    OpenAI,
}

impl fmt::Display for PipelineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineType::Foundry => write!(f, "foundry"),
            PipelineType::OpenAI => write!(f, "openai"),
        }
    }
}

impl FromStr for PipelineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "foundry" => Ok(PipelineType::Foundry),
            "openai" => Ok(PipelineType::OpenAI),
            _ => Err(format!("Unsupported pipeline type: '{}'", s)),
        }
    }
}

/// Static configuration handed to the pipeline on every call: which model
/// to reason with, the agent's standing instructions, and the hosted tools
/// it may invoke.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub pipeline_type: PipelineType,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub instructions: String,
    pub tools: Vec<HostedMcpTool>,
}

pub fn new_pipeline(
    config: &PipelineConfig
) -> Result<Arc<dyn AgentPipeline>, PipelineError> {
    let pipeline: Arc<dyn AgentPipeline> = match config.pipeline_type {
        PipelineType::Foundry => Arc::new(FoundryPipeline::from_config(config)?),
        PipelineType::OpenAI => Arc::new(OpenAIPipeline::from_config(config)?),
    };
    Ok(pipeline)
}

/// Folds the runtime's answer into one [`AgentReply`]. Agent runtimes are
/// not consistent about the success shape: some return a bare `response`
/// string, some a `messages` transcript, some a `output`/`output_text`
/// pair. Callers of the pipeline never see that variance.
pub(crate) fn normalize_reply(
    body: &serde_json::Value
) -> Result<AgentReply, PipelineError> {
    if let Some(text) = body.get("response").and_then(|v| v.as_str()) {
        if !text.is_empty() {
            return Ok(AgentReply::from_text(text));
        }
    }

    if let Some(text) = body.get("output_text").and_then(|v| v.as_str()) {
        if !text.is_empty() {
            return Ok(AgentReply::from_text(text));
        }
    }

    if let Some(raw) = body.get("messages") {
        let messages: Vec<ChatMessage> = serde_json
            ::from_value(raw.clone())
            .map_err(|e| PipelineError::Malformed(format!("bad messages array: {}", e)))?;
        if let Some(reply) = AgentReply::from_messages(messages) {
            return Ok(reply);
        }
    }

    if let Some(items) = body.get("output").and_then(|v| v.as_array()) {
        let mut text = String::new();
        for item in items {
            if item.get("type").and_then(|t| t.as_str()) != Some("message") {
                continue;
            }
            let parts = item
                .get("content")
                .and_then(|c| c.as_array())
                .map(|a| a.as_slice())
                .unwrap_or(&[]);
            for part in parts {
                if let Some(fragment) = part.get("text").and_then(|t| t.as_str()) {
                    text.push_str(fragment);
                }
            }
        }
        if !text.is_empty() {
            return Ok(AgentReply::from_text(text));
        }
    }

    Err(PipelineError::Malformed("no assistant reply in pipeline response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_type_parses_case_insensitively() {
        assert_eq!("foundry".parse::<PipelineType>().unwrap(), PipelineType::Foundry);
        assert_eq!("OpenAI".parse::<PipelineType>().unwrap(), PipelineType::OpenAI);
        assert!("vertex".parse::<PipelineType>().is_err());
    }

    #[test]
    fn normalize_handles_response_string() {
        let body = serde_json::json!({"response": "the answer"});
        assert_eq!(normalize_reply(&body).unwrap().assistant_reply(), "the answer");
    }

    #[test]
    fn normalize_handles_message_sequence() {
        let body = serde_json::json!({
            "messages": [
                {"role": "user", "content": "question"},
                {"role": "assistant", "content": "answer"}
            ]
        });
        assert_eq!(normalize_reply(&body).unwrap().assistant_reply(), "answer");
    }

    #[test]
    fn normalize_handles_output_items() {
        let body = serde_json::json!({
            "output": [
                {"type": "reasoning", "content": []},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": "partial "},
                    {"type": "output_text", "text": "answer"}
                ]}
            ]
        });
        assert_eq!(normalize_reply(&body).unwrap().assistant_reply(), "partial answer");
    }

    #[test]
    fn normalize_rejects_empty_and_unknown_shapes() {
        assert!(normalize_reply(&serde_json::json!({"response": ""})).is_err());
        assert!(normalize_reply(&serde_json::json!({"messages": []})).is_err());
        assert!(normalize_reply(&serde_json::json!({"status": "ok"})).is_err());
    }
}
