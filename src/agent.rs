use log::info;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::cli::Args;
use crate::config::instructions::load_instructions;
use crate::models::chat::{ AgentReply, ChatMessage };
use crate::pipeline::{ new_pipeline, AgentPipeline, PipelineConfig, PipelineError };
use crate::tools::HostedMcpTool;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("pipeline call timed out after {0:?}")]
    Timeout(Duration),
}

/// Process-wide agent handle: one long-lived pipeline connection plus the
/// static configuration shipped with every call. Created once at startup,
/// shared across requests, holds no per-call state.
pub struct Agent {
    name: String,
    pipeline: Arc<dyn AgentPipeline>,
    call_timeout: Duration,
}

impl Agent {
    pub async fn new(args: &Args) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let approval_mode = args.mcp_approval_mode
            .parse()
            .map_err(|e| format!("Invalid MCP approval mode: {}", e))?;
        let kb_tool = HostedMcpTool::new(
            args.mcp_tool_name.clone(),
            args.mcp_tool_description.clone(),
            args.mcp_server_url.clone(),
            approval_mode
        )?;
        info!(
            "Knowledge base tool configured: Name={}, Approval={}, URL={}",
            kb_tool.name,
            kb_tool.approval_mode,
            kb_tool.url
        );

        let instructions = load_instructions(args.instructions_path.as_deref())?;

        let pipeline_type = args.pipeline_type
            .parse()
            .map_err(|e| format!("Invalid pipeline type: {}", e))?;
        let api_key = if !args.pipeline_api_key.is_empty() {
            Some(args.pipeline_api_key.clone())
        } else {
            None
        };
        let pipeline_config = PipelineConfig {
            pipeline_type,
            endpoint: args.project_endpoint.clone(),
            api_key,
            model: args.agent_model.clone(),
            instructions,
            tools: vec![kb_tool],
        };
        let pipeline = new_pipeline(&pipeline_config)?;
        info!(
            "Pipeline configured: Type={}, Model={}, Endpoint={:?}",
            pipeline_type,
            pipeline_config.model,
            pipeline_config.endpoint.as_deref().unwrap_or("backend default")
        );

        Ok(Self {
            name: args.agent_name.clone(),
            pipeline,
            call_timeout: Duration::from_secs(args.pipeline_timeout_secs),
        })
    }

    /// Builds an agent around an already-constructed pipeline. Used by
    /// tests to observe the facade against stub pipelines.
    pub fn with_pipeline(
        name: impl Into<String>,
        pipeline: Arc<dyn AgentPipeline>,
        call_timeout: Duration
    ) -> Self {
        Self {
            name: name.into(),
            pipeline,
            call_timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Forwards a conversation to the pipeline and returns the normalized
    /// reply. Fails closed on an empty conversation; never retries and
    /// never substitutes a default reply for an upstream failure.
    pub async fn handle_chat(
        &self,
        messages: &[ChatMessage]
    ) -> Result<AgentReply, AgentError> {
        if messages.is_empty() {
            return Err(AgentError::InvalidRequest(
                "conversation must contain at least one message".to_string()
            ));
        }

        match timeout(self.call_timeout, self.pipeline.run(messages)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AgentError::Timeout(self.call_timeout)),
        }
    }
}
