use serde::{ Serialize, Deserialize };
use serde_json::{ json, Value as JsonValue };
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("invalid scale settings: {0}")]
    InvalidScale(String),
}

/// Where the agent host lands on the platform, resolved exactly once at
/// provisioning time. The facade never sees this at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeploymentTarget {
    NewProject(NewProjectParams),
    ExistingProject(ProjectReference),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProjectParams {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectReference {
    pub resource_id: String,
}

impl DeploymentTarget {
    /// New-vs-existing conditional: a configured project id wins, otherwise
    /// a fresh project is described.
    pub fn resolve(
        existing_project_id: Option<String>,
        name: String,
        location: String
    ) -> Self {
        match existing_project_id.filter(|id| !id.trim().is_empty()) {
            Some(resource_id) => DeploymentTarget::ExistingProject(ProjectReference { resource_id }),
            None => DeploymentTarget::NewProject(NewProjectParams { name, location }),
        }
    }
}

/// Replica bounds enforced by the platform, not by the facade. Validated
/// here so a bad manifest never leaves the operator's machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleSettings {
    pub min_replicas: u32,
    pub max_replicas: u32,
}

impl ScaleSettings {
    pub fn new(min_replicas: u32, max_replicas: u32) -> Result<Self, DeployError> {
        if min_replicas == 0 {
            return Err(DeployError::InvalidScale(
                "min replicas must be at least 1".to_string()
            ));
        }
        if min_replicas > max_replicas {
            return Err(DeployError::InvalidScale(format!(
                "min replicas ({}) exceeds max replicas ({})",
                min_replicas,
                max_replicas
            )));
        }
        Ok(Self { min_replicas, max_replicas })
    }
}

/// Declarative description of one agent deployment: the resource graph the
/// platform control plane consumes. No provisioning happens here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSpec {
    pub target: DeploymentTarget,
    pub agent_model: String,
    pub mcp_server_url: String,
    pub scale: ScaleSettings,
}

impl DeploymentSpec {
    /// Renders the resource manifest. An existing project contributes only a
    /// reference; a new one contributes its own resource entry.
    pub fn manifest(&self) -> JsonValue {
        let mut resources = Vec::new();

        let project_ref = match &self.target {
            DeploymentTarget::NewProject(params) => {
                resources.push(json!({
                    "type": "aiProject",
                    "name": params.name,
                    "location": params.location,
                }));
                json!({ "project": params.name })
            }
            DeploymentTarget::ExistingProject(reference) => {
                json!({ "projectId": reference.resource_id })
            }
        };

        resources.push(json!({
            "type": "agentHost",
            "name": "intake-agent",
            "dependsOn": project_ref,
            "properties": {
                "model": self.agent_model,
                "scale": {
                    "minReplicas": self.scale.min_replicas,
                    "maxReplicas": self.scale.max_replicas,
                },
                "env": {
                    "AGENT_MODEL": self.agent_model,
                    "MCP_SERVER_URL": self.mcp_server_url,
                },
            },
        }));

        json!({ "resources": resources })
    }
}
