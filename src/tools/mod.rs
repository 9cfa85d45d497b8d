use serde::{ Serialize, Deserialize };
use serde_json::{ json, Value as JsonValue };
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Human-approval policy for a hosted tool. The knowledge-base wiring only
/// ever exercises `Never`; `Always` is recognized so the value stays an enum
/// rather than a free string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMode {
    Never,
    Always,
}

impl Default for ApprovalMode {
    fn default() -> Self {
        ApprovalMode::Never
    }
}

impl fmt::Display for ApprovalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalMode::Never => write!(f, "never"),
            ApprovalMode::Always => write!(f, "always"),
        }
    }
}

impl FromStr for ApprovalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "never" => Ok(ApprovalMode::Never),
            "always" => Ok(ApprovalMode::Always),
            _ => Err(format!("Invalid approval mode: '{}'", s)),
        }
    }
}

/// A remotely hosted MCP tool endpoint, attached to the agent by
/// configuration only. The pipeline calls it; the facade never does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedMcpTool {
    pub name: String,
    pub description: String,
    pub url: String,
    pub approval_mode: ApprovalMode,
}

impl HostedMcpTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        approval_mode: ApprovalMode
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let url = url.into();
        Url::parse(&url).map_err(|e| format!("Invalid MCP server URL '{}': {}", url, e))?;
        Ok(Self {
            name: name.into(),
            description: description.into(),
            url,
            approval_mode,
        })
    }

    /// Renders the tool definition the way the agent runtime expects it in
    /// the request's `tools` array.
    pub fn to_tool_param(&self) -> JsonValue {
        json!({
            "type": "mcp",
            "server_label": self.name,
            "server_description": self.description,
            "server_url": self.url,
            "require_approval": self.approval_mode.to_string(),
        })
    }
}
