#![cfg(all(feature = "chat", feature = "state-memory"))]
//! Smoke tests against a local Ollama instance.
//!
//! These tests are `#[ignore]` by default. Run them with:
//!
//!     cargo test -p parley --test smoke_ollama -- --ignored
//!
//! They require a running Ollama server with the configured model pulled
//! (`PARLEY_MODEL`, default `deepseek-r1:8b`). `OLLAMA_HOST` is honored.

use std::sync::Arc;

use futures::StreamExt;
use parley::prelude::*;

fn ollama() -> OllamaClient {
    OllamaClient::from_config(&OllamaConfig::from_env()).unwrap()
}

// ===========================================================================
// Test 1: Reachability
// ===========================================================================

#[tokio::test]
#[ignore = "requires local Ollama"]
async fn smoke_check_connection() {
    assert!(ollama().check_connection().await, "Ollama should be reachable");
}

// ===========================================================================
// Test 2: Streaming
// ===========================================================================

#[tokio::test]
#[ignore = "requires local Ollama"]
async fn smoke_streaming() {
    let client = ollama();
    let mut events = client
        .generate("Count from 1 to 5, separated by commas. Nothing else.", &[])
        .await
        .unwrap()
        .events()
        .unwrap();

    let mut text = String::new();
    let mut context = Vec::new();
    while let Some(event) = events.next().await {
        match event.unwrap() {
            GenerateEvent::Delta(delta) => text.push_str(&delta),
            GenerateEvent::Done(summary) => context = summary.context,
        }
    }

    assert!(!text.is_empty(), "should have streamed text");
    assert!(!context.is_empty(), "final chunk should carry context");
    println!("  streamed: {text}");
}

// ===========================================================================
// Test 3: Chat store round trip
// ===========================================================================

#[tokio::test]
#[ignore = "requires local Ollama"]
async fn smoke_chat_reply() {
    let mut chat = ChatStore::load(ollama(), Arc::new(MemoryStore::new()))
        .await
        .unwrap();
    chat.initialize().await.unwrap();
    let thread_id = chat.current_thread().unwrap().id.clone();

    let reply = chat
        .add_message(&thread_id, Message::user("What is 2+2? Reply with just the number."))
        .await
        .unwrap();
    assert!(matches!(reply, Reply::Completed(_)), "got: {reply:?}");

    let thread = chat.thread(&thread_id).unwrap();
    assert_eq!(thread.messages.len(), 2);
    assert!(!thread.context.is_empty());
    println!("  reply: {}", thread.messages[1].content);
}
