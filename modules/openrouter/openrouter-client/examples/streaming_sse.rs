//! Server-Sent Events (SSE) streaming example
//!
//! Streams a chat completion and prints the content deltas as they arrive.
//!
//! To run this example:
//! ```bash
//! export OPENROUTER_ACCESS_TOKEN="sk-or-..."
//! export OPENROUTER_URI_BASE="http://localhost:8080/api"  # Optional
//! cargo run --example streaming_sse
//! ```

use std::io::Write;

use openrouter_client::{ClientError, OpenRouterClient, PostParameters};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = OpenRouterClient::from_env()?;

    println!("=== Streaming Chat Completion ===\n");

    let mut full_content = String::new();
    let mut event_count = 0_usize;

    let parameters = PostParameters::json(&json!({
        "model": "openai/gpt-4o-mini",
        "messages": [
            {"role": "user", "content": "Tell me a short story about a robot learning to code."}
        ],
        "max_tokens": 200
    }))?
    .on_event(|chunk| {
        event_count += 1;

        // OpenRouter reports mid-stream failures as an event with an `error` member
        if let Some(error) = chunk.get("error") {
            eprintln!("\n[stream error] {error}");
            return;
        }
        if let Some(content) = chunk["choices"][0]["delta"]["content"].as_str() {
            print!("{content}");
            full_content.push_str(content);
            std::io::stdout().flush().ok();
        }
    });

    match client.post("chat/completions", parameters).await {
        Ok(_) => {}
        Err(ClientError::Http { status, body }) => {
            eprintln!("Request failed with {status}: {body}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }

    println!("\n\n=== Stream Complete ===");
    println!("Events received: {event_count}");
    println!("Total content length: {} chars", full_content.len());

    Ok(())
}
