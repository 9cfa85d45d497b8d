pub mod agent;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod tools;

use agent::Agent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Agent Name: {}", args.agent_name);
    info!("Agent Model: {}", args.agent_model);
    info!("Pipeline Type: {}", args.pipeline_type);
    info!("Pipeline Timeout: {}s", args.pipeline_timeout_secs);
    info!("MCP Server URL: {}", args.mcp_server_url);
    info!("MCP Approval Mode: {}", args.mcp_approval_mode);
    info!("Scale Bounds (platform-enforced): {}..{}", args.min_replicas, args.max_replicas);
    info!("-------------------------");

    let agent = Arc::new(Agent::new(&args).await?);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent);
    server.run().await?;

    Ok(())
}
