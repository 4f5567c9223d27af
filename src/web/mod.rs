//! # Web Module — The Browser Face of the FAQ Engine
//!
//! The web layer is built with **Axum** + **Maud**: classic form posts
//! that re-render the page server-side, plus a small JSON surface for
//! scripts.
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ Browser (plain HTML form)                  │
//! ├────────────────────────────────────────────┤
//! │ Axum Router (this module)                  │
//! │  ├── GET  /        → chat page             │
//! │  ├── GET  /status  → JSON: ready, entries  │
//! │  ├── POST /ask     → chat page with answer │
//! │  └── POST /faq     → JSON: append a pair   │
//! ├────────────────────────────────────────────┤
//! │ FaqEngine (shared via AppState)            │
//! └────────────────────────────────────────────┘
//! ```
//!
//! ## Submodules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | Shared state (`AppState`) |
//! | [`handlers`] | Axum handlers for each route |
//! | [`templates`] | Maud templates (server-side HTML) |

pub mod handlers;
pub mod state;
pub mod templates;

use axum::routing::{get, post};
use axum::Router;

use state::AppState;

/// Builds the Axum router over a shared [`AppState`].
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/status", get(handlers::status))
        .route("/ask", post(handlers::ask))
        .route("/faq", post(handlers::add_faq))
        .with_state(state)
}
