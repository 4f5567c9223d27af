//! # Web Application State
//!
//! The shared state every Axum handler receives. Unlike the engine's own
//! internals there is nothing to initialize lazily here: the engine is
//! fully built before the router exists, so handlers never need a
//! "still loading" guard.

use std::sync::Arc;

use crate::engine::FaqEngine;

/// Shared state of the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// The matching engine. Interior locking lives inside the engine, so
    /// handlers call it through a plain `Arc`.
    pub engine: Arc<FaqEngine>,
}

impl AppState {
    pub fn new(engine: Arc<FaqEngine>) -> Self {
        Self { engine }
    }
}
