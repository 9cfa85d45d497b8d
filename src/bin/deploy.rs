use clap::Parser;
use dotenv::dotenv;
use log::{ info, error };
use std::error::Error;
use std::process::ExitCode;

use intake_agent::cli::DeployArgs;
use intake_agent::deploy::{ DeploymentSpec, DeploymentTarget, ScaleSettings };

fn build_spec(args: &DeployArgs) -> Result<DeploymentSpec, Box<dyn Error + Send + Sync>> {
    let scale = ScaleSettings::new(args.min_replicas, args.max_replicas)?;
    let target = DeploymentTarget::resolve(
        args.existing_project_id.clone(),
        args.project_name.clone(),
        args.project_location.clone()
    );
    Ok(DeploymentSpec {
        target,
        agent_model: args.agent_model.clone(),
        mcp_server_url: args.mcp_server_url.clone(),
        scale,
    })
}

fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = DeployArgs::parse();

    let spec = match build_spec(&args) {
        Ok(spec) => spec,
        Err(e) => {
            error!("Deployment configuration invalid: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match &spec.target {
        DeploymentTarget::NewProject(params) => {
            info!("Provisioning target: new project '{}' in {}", params.name, params.location);
        }
        DeploymentTarget::ExistingProject(reference) => {
            info!("Provisioning target: existing project {}", reference.resource_id);
        }
    }
    info!("Agent model: {}", spec.agent_model);
    info!("Knowledge base MCP endpoint: {}", spec.mcp_server_url);
    info!(
        "Scale bounds: {}..{} replicas (platform-enforced)",
        spec.scale.min_replicas,
        spec.scale.max_replicas
    );

    match serde_json::to_string_pretty(&spec.manifest()) {
        Ok(manifest) => println!("{}", manifest),
        Err(e) => {
            error!("Failed to render manifest: {}", e);
            return ExitCode::FAILURE;
        }
    }

    info!("Manifest rendered. Submit it with your platform tooling, then run the server binary.");
    ExitCode::SUCCESS
}
