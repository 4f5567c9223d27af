//! # FAQ Chat — Hybrid Question Matcher
//!
//! **Main entry point.** One binary, two shells over the same engine:
//!
//! 1. **Web** (default): an Axum server on `http://localhost:3000` with a
//!    form-driven chat page and a small JSON API.
//! 2. **Console** (`--console`): a line-oriented loop on stdin/stdout,
//!    with keyword suggestions and teach-me-the-answer on misses.
//!
//! ## Startup Flow
//!
//! ```text
//! main()
//!   ├── Configure tracing/logging
//!   ├── Load catalogue from disk (or fall back to the built-in one)
//!   ├── Build FaqEngine (normalizer + both indices) — fatal on failure
//!   └── --console? → run the REPL
//!       otherwise  → mount Router, serve on port 3000
//! ```
//!
//! Unlike systems that warm up a model in the background, everything here
//! is cheap to build, so startup is single-phase: by the time either
//! shell accepts input the engine is fully ready.
//!
//! ## Usage
//!
//! ```bash
//! # Web server with default logs (info)
//! cargo run
//!
//! # Console chat with verbose match logging
//! RUST_LOG=debug cargo run -- --console
//!
//! # Point the store somewhere else
//! FAQ_DATA=/tmp/faq.json cargo run
//! ```

mod catalogue;
mod engine;
mod error;
mod nlu;
mod persistence;
mod web;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::catalogue::default_catalogue;
use crate::engine::{EngineConfig, FaqEngine};
use crate::nlu::extractor::RegexEntityExtractor;
use crate::persistence::CatalogueStore;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity, e.g. RUST_LOG=debug cargo run.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("FAQ Chat — starting");

    // Load the stored catalogue; a missing file means first run, a broken
    // file is a warning, and both fall back to the built-in pairs.
    let store = CatalogueStore::from_env();
    let catalogue = match store.load() {
        Ok(Some(loaded)) => {
            tracing::info!(entries = loaded.len(), path = %store.path().display(), "catalogue loaded from disk");
            loaded
        }
        Ok(None) => {
            tracing::info!(path = %store.path().display(), "no stored catalogue yet, using the built-in one");
            default_catalogue()
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not read the stored catalogue, using the built-in one");
            default_catalogue()
        }
    };

    let engine = Arc::new(FaqEngine::new(
        catalogue,
        EngineConfig::default(),
        Some(store),
        Some(Box::new(RegexEntityExtractor::new())),
    )?);

    if std::env::args().any(|arg| arg == "--console") {
        return run_console(&engine);
    }

    let app = web::create_router(AppState::new(engine));

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("server running at http://localhost:3000");
    axum::serve(listener, app).await?;

    Ok(())
}

/// The console loop. Plain blocking stdin/stdout; the async runtime sits
/// idle underneath it.
///
/// On a confident match it prints the answer. On a miss it prints the
/// clarification, offers the keyword suggestions, and lets the user
/// either pick one by number or teach the engine the answer.
fn run_console(engine: &FaqEngine) -> Result<()> {
    println!("FAQ Chat console. Ask a question, or type 'quit' to leave.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        let Some(input) = read_line(&mut lines, "You: ")? else {
            break; // EOF
        };

        let result = engine.respond(&input);
        println!("Chatbot: {}", result.answer);

        if engine.is_exit(&input) {
            return Ok(()); // the farewell was the answer
        }
        if result.matched_question.is_some() || input.trim().is_empty() {
            continue;
        }

        // Miss: offer the keyword suggestions, then the teach path.
        let suggestions = engine.keyword_fallback(&input);
        if !suggestions.is_empty() {
            println!("Did you mean one of these?");
            for (i, suggestion) in suggestions.iter().enumerate() {
                println!("  {}. {}", i + 1, suggestion.question);
            }
            let Some(choice) =
                read_line(&mut lines, "Pick a number, or 'n' to teach me the answer: ")?
            else {
                break;
            };
            if let Ok(pick) = choice.trim().parse::<usize>() {
                if let Some(entry) = (pick > 0)
                    .then(|| suggestions.get(pick - 1))
                    .flatten()
                    .and_then(|s| engine.entry_at(s.position))
                {
                    println!("Chatbot: {}", entry.answer);
                    continue;
                }
                println!("Chatbot: That was not one of the options.");
                continue;
            }
            if !choice.trim().eq_ignore_ascii_case("n") {
                continue;
            }
        } else {
            let Some(choice) = read_line(&mut lines, "Would you like to teach me the answer? (y/n): ")?
            else {
                break;
            };
            if !choice.trim().eq_ignore_ascii_case("y") {
                continue;
            }
        }

        // Teach path: the question is what the user just asked.
        let Some(answer) = read_line(&mut lines, "What should I answer next time? ")? else {
            break;
        };
        if answer.trim().is_empty() {
            println!("Chatbot: Skipping — an empty answer would not help anyone.");
            continue;
        }
        match engine.add_entry(input.trim(), answer.trim()) {
            Ok(report) => {
                println!("Chatbot: Thanks! I will remember that.");
                if let Some(warning) = report.warning {
                    println!("Chatbot: (Heads up: {warning})");
                }
            }
            Err(e) => println!("Chatbot: I could not learn that: {e}"),
        }
    }

    println!("Chatbot: Goodbye!");
    Ok(())
}

/// Prints a prompt and reads one line; `None` on EOF.
fn read_line(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    prompt: &str,
) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?)),
        None => Ok(None),
    }
}
