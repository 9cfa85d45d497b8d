use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the facade to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8000")]
    pub server_addr: String,

    // --- Agent Args ---
    /// Display name of the agent.
    #[arg(long, env = "AGENT_NAME", default_value = "IntakeFormAssistant")]
    pub agent_name: String,

    /// Model identifier the pipeline reasons with (e.g., gpt-5-mini)
    #[arg(long, env = "AGENT_MODEL", default_value = "gpt-5-mini")]
    pub agent_model: String,

    /// Optional path to a file overriding the built-in agent instructions.
    #[arg(long, env = "INSTRUCTIONS_PATH")]
    pub instructions_path: Option<String>,

    // --- Pipeline Args ---
    /// Type of agent pipeline backend (foundry, openai)
    #[arg(long, env = "PIPELINE_TYPE", default_value = "foundry")]
    pub pipeline_type: String,

    /// Endpoint of the pipeline: the Foundry project endpoint, or the base
    /// URL of an OpenAI-compatible gateway.
    #[arg(long, env = "PROJECT_ENDPOINT")]
    pub project_endpoint: Option<String>,

    /// API key for the pipeline endpoint.
    #[arg(long, env = "PIPELINE_API_KEY", default_value = "")]
    pub pipeline_api_key: String,

    /// Per-call timeout for the outbound pipeline call, in seconds.
    #[arg(long, env = "PIPELINE_TIMEOUT_SECS", default_value = "120")]
    pub pipeline_timeout_secs: u64,

    // --- Knowledge Base Tool Args ---
    /// Hosted MCP endpoint of the knowledge base the agent may search.
    #[arg(
        long,
        env = "MCP_SERVER_URL",
        default_value = "https://aisearch-nv-eastus2-dev-01.search.windows.net/knowledgebases/kb-archive/mcp?api-version=2025-11-01-Preview"
    )]
    pub mcp_server_url: String,

    /// Tool name the agent sees for the knowledge base.
    #[arg(long, env = "MCP_TOOL_NAME", default_value = "kb_archive")]
    pub mcp_tool_name: String,

    /// Tool description the agent sees for the knowledge base.
    #[arg(
        long,
        env = "MCP_TOOL_DESCRIPTION",
        default_value = "Knowledge base containing project information for intake form assistance"
    )]
    pub mcp_tool_description: String,

    /// Human-approval policy for knowledge base tool calls (never, always)
    #[arg(long, env = "MCP_APPROVAL_MODE", default_value = "never")]
    pub mcp_approval_mode: String,

    // --- Deployment Args (platform-enforced, not enforced by the facade) ---
    /// Minimum replica count for the hosting platform.
    #[arg(long, env = "SCALE_MIN_REPLICAS", default_value = "1")]
    pub min_replicas: u32,

    /// Maximum replica count for the hosting platform.
    #[arg(long, env = "SCALE_MAX_REPLICAS", default_value = "3")]
    pub max_replicas: u32,
}

/// Arguments of the deployment helper binary. Mirrors the server surface
/// where the rendered manifest needs the same values, plus the
/// new-vs-existing project choice resolved once at provisioning time.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Validate configuration and render the deployment manifest")]
pub struct DeployArgs {
    /// Resource id of an existing platform project to deploy into. When
    /// absent, a new project is provisioned.
    #[arg(long, env = "EXISTING_PROJECT_ID")]
    pub existing_project_id: Option<String>,

    /// Name for a newly provisioned project.
    #[arg(long, env = "PROJECT_NAME", default_value = "intake-agent")]
    pub project_name: String,

    /// Region for a newly provisioned project.
    #[arg(long, env = "PROJECT_LOCATION", default_value = "eastus2")]
    pub project_location: String,

    /// Model identifier the deployed agent reasons with.
    #[arg(long, env = "AGENT_MODEL", default_value = "gpt-5-mini")]
    pub agent_model: String,

    /// Hosted MCP endpoint the deployed agent may search.
    #[arg(
        long,
        env = "MCP_SERVER_URL",
        default_value = "https://aisearch-nv-eastus2-dev-01.search.windows.net/knowledgebases/kb-archive/mcp?api-version=2025-11-01-Preview"
    )]
    pub mcp_server_url: String,

    /// Minimum replica count.
    #[arg(long, env = "SCALE_MIN_REPLICAS", default_value = "1")]
    pub min_replicas: u32,

    /// Maximum replica count.
    #[arg(long, env = "SCALE_MAX_REPLICAS", default_value = "3")]
    pub max_replicas: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_have_workable_defaults() {
        let args = Args::try_parse_from(["intake-agent"]).unwrap();
        assert_eq!(args.server_addr, "0.0.0.0:8000");
        assert_eq!(args.agent_model, "gpt-5-mini");
        assert_eq!(args.mcp_approval_mode, "never");
        assert_eq!(args.pipeline_timeout_secs, 120);
    }

    #[test]
    fn deploy_args_accept_existing_project() {
        let args = DeployArgs::try_parse_from([
            "deploy",
            "--existing-project-id",
            "/subscriptions/s/resourceGroups/rg/providers/Microsoft.CognitiveServices/accounts/a/projects/p",
        ]).unwrap();
        assert!(args.existing_project_id.is_some());
    }
}
