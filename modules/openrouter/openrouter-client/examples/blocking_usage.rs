//! Blocking (sync) usage example for the `OpenRouter` client
//!
//! No async runtime is needed; each call blocks until the response (or the
//! stream) is complete.
//!
//! To run this example:
//! ```bash
//! export OPENROUTER_ACCESS_TOKEN="sk-or-..."
//! export OPENROUTER_LOG_ERRORS=true  # Optional
//! cargo run --example blocking_usage -- ./training.jsonl
//! ```

use openrouter_client::{MultipartParameters, OpenRouterClient, PostParameters};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = OpenRouterClient::from_env()?;

    println!("=== Example 1: Blocking GET ===\n");

    let models = client.get_blocking("models")?;
    let count = models["data"].as_array().map_or(0, Vec::len);
    println!("Available models: {count}\n");

    println!("=== Example 2: Blocking Chat Completion ===\n");

    let parameters = PostParameters::json(&json!({
        "model": "openai/gpt-4o-mini",
        "messages": [{"role": "user", "content": "Say hello in French."}]
    }))?;

    if let Some(completion) = client.post_blocking("chat/completions", parameters)? {
        println!("Reply: {}\n", completion["choices"][0]["message"]["content"]);

        if let Some(id) = completion["id"].as_str() {
            let stats = client.get_blocking(&format!("generation?id={id}"))?;
            println!("Generation stats: {stats}\n");
        }
    }

    println!("=== Example 3: Blocking Streaming ===\n");

    let mut deltas = Vec::new();
    let parameters = PostParameters::json(&json!({
        "model": "openai/gpt-4o-mini",
        "messages": [{"role": "user", "content": "Count to five."}]
    }))?
    .on_event(|chunk| {
        if let Some(text) = chunk["choices"][0]["delta"]["content"].as_str() {
            deltas.push(text.to_owned());
        }
    });
    client.post_blocking("chat/completions", parameters)?;
    println!("Streamed: {}\n", deltas.concat());

    if let Some(path) = std::env::args().nth(1) {
        println!("=== Example 4: Multipart Upload ===\n");

        let parameters = MultipartParameters::new()
            .text("purpose", "fine-tune")
            .file("file", path);
        let uploaded = client.multipart_post_blocking("files", parameters)?;
        println!("Uploaded: {uploaded}\n");
    }

    println!("=== All examples completed successfully! ===");

    Ok(())
}
