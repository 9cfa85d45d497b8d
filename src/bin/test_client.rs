use clap::Parser;
use reqwest::{ Client, StatusCode };
use serde_json::{ json, Value as JsonValue };
use std::process::ExitCode;
use std::time::Duration;

/// Sends a canned request sequence against a running facade and prints
/// pass/fail per step, judged on HTTP status codes.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct ClientArgs {
    /// Base URL of the agent server.
    #[arg(default_value = "http://localhost:8000")]
    base_url: String,
}

struct Outcome {
    name: &'static str,
    passed: bool,
}

async fn check_liveness(client: &Client, base_url: &str) -> Result<bool, reqwest::Error> {
    let resp = client.get(format!("{}/", base_url)).send().await?;
    let status = resp.status();
    println!("  status: {}", status);
    // Reachable means 200 or 404; a 5xx here is a failing facade.
    Ok(status == StatusCode::OK || status == StatusCode::NOT_FOUND)
}

async fn check_chat(
    client: &Client,
    base_url: &str,
    content: &str
) -> Result<bool, reqwest::Error> {
    let payload = json!({
        "messages": [{ "role": "user", "content": content }]
    });
    let resp = client.post(format!("{}/chat", base_url)).json(&payload).send().await?;
    let status = resp.status();
    println!("  status: {}", status);

    if status != StatusCode::OK {
        println!("  body: {}", resp.text().await.unwrap_or_default());
        return Ok(false);
    }

    let body: JsonValue = resp.json().await?;
    match body.get("response").and_then(|v| v.as_str()) {
        Some(reply) if !reply.is_empty() => {
            let preview: String = reply.chars().take(100).collect();
            println!("  agent response: {}...", preview);
            Ok(true)
        }
        _ => {
            println!("  missing 'response' field in body");
            Ok(false)
        }
    }
}

async fn check_rejects_malformed(
    client: &Client,
    base_url: &str
) -> Result<bool, reqwest::Error> {
    let resp = client
        .post(format!("{}/chat", base_url))
        .json(&json!({ "invalid": "request" }))
        .send().await?;
    let status = resp.status();
    println!("  status: {}", status);

    if !status.is_client_error() {
        return Ok(false);
    }
    let body: JsonValue = resp.json().await?;
    Ok(body.get("error").and_then(|v| v.as_str()).is_some())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = ClientArgs::parse();
    let base_url = args.base_url.trim_end_matches('/').to_string();

    println!("Testing agent endpoint at {}", base_url);

    let client = match Client::builder().timeout(Duration::from_secs(180)).build() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut outcomes = Vec::new();

    println!("\n1. Basic connectivity (GET /)...");
    match check_liveness(&client, &base_url).await {
        Ok(passed) => outcomes.push(Outcome { name: "connectivity", passed }),
        Err(e) => {
            // Transport failure: nothing is listening, so the remaining
            // steps cannot say anything useful.
            eprintln!("  connection failed: {}", e);
            return ExitCode::FAILURE;
        }
    }

    println!("\n2. Chat request...");
    match check_chat(&client, &base_url, "Hello! Can you help me with an intake form?").await {
        Ok(passed) => outcomes.push(Outcome { name: "chat", passed }),
        Err(e) => {
            eprintln!("  request failed: {}", e);
            outcomes.push(Outcome { name: "chat", passed: false });
        }
    }

    println!("\n3. Knowledge base query...");
    match check_chat(
        &client,
        &base_url,
        "What projects are in the knowledge base that I can reference for this intake form?"
    ).await {
        Ok(passed) => outcomes.push(Outcome { name: "knowledge base query", passed }),
        Err(e) => {
            eprintln!("  request failed: {}", e);
            outcomes.push(Outcome { name: "knowledge base query", passed: false });
        }
    }

    println!("\n4. Malformed payload rejection...");
    match check_rejects_malformed(&client, &base_url).await {
        Ok(passed) => outcomes.push(Outcome { name: "malformed payload rejection", passed }),
        Err(e) => {
            eprintln!("  request failed: {}", e);
            outcomes.push(Outcome { name: "malformed payload rejection", passed: false });
        }
    }

    println!("\n--- Results ---");
    let mut all_passed = true;
    for outcome in &outcomes {
        let verdict = if outcome.passed { "pass" } else { "FAIL" };
        println!("{:<30} {}", outcome.name, verdict);
        all_passed &= outcome.passed;
    }

    if all_passed {
        println!("All checks passed.");
        ExitCode::SUCCESS
    } else {
        println!("Some checks failed.");
        ExitCode::FAILURE
    }
}
