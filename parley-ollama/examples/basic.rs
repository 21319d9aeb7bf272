//! Stream a single generation from a local Ollama server.
//!
//! Make sure Ollama is running locally and run:
//!   cargo run --example basic -- "Say hello in one sentence."
//!
//! `OLLAMA_HOST`, `PARLEY_MODEL` and `RUST_LOG` are honored.

use std::io::Write;

use futures::StreamExt;
use parley_ollama::{OllamaClient, OllamaConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Say hello in one sentence.".to_string());

    let client = OllamaClient::from_config(&OllamaConfig::from_env())?;
    println!("Model: {}", client.model_name());

    let mut deltas = client.generate(&prompt, &[]).await?.deltas()?;
    let mut stdout = std::io::stdout();
    while let Some(delta) = deltas.next().await {
        write!(stdout, "{}", delta?)?;
        stdout.flush()?;
    }
    println!();

    Ok(())
}
