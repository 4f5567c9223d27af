//! # HTTP Handlers
//!
//! Each public function here is an Axum handler, mapped to a route in
//! [`super::create_router()`].
//!
//! | Handler | Method | Returns | Use |
//! |---------|--------|---------|-----|
//! | `index` | GET | Full HTML | Chat page (Maud) |
//! | `status` | GET | JSON | Health / catalogue size |
//! | `ask` | POST | Full HTML | Form submit, page with the answer |
//! | `add_faq` | POST | JSON | Append a new question/answer pair |
//!
//! The engine itself never fails a query, so `ask` has no error branch;
//! only `add_faq` maps engine errors onto HTTP status codes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::{Form, Json};

use super::state::AppState;
use super::templates::{self, Exchange};
use crate::error::EngineError;

/// `/status` response body.
#[derive(serde::Serialize)]
pub struct StatusResponse {
    /// Always `true` once the server answers: the engine is built before
    /// the router is.
    pub ready: bool,
    /// Current catalogue size, including entries added at runtime.
    pub entries: usize,
}

/// Form data of the ask form (the `question` field).
#[derive(serde::Deserialize)]
pub struct AskForm {
    pub question: String,
}

/// `/faq` request body: a new pair to append.
#[derive(serde::Deserialize)]
pub struct NewEntry {
    pub question: String,
    pub answer: String,
}

/// `/faq` response body.
#[derive(serde::Serialize)]
pub struct AddResponse {
    pub added: bool,
    /// Whether the updated catalogue reached disk. `false` with a
    /// `warning` means the entry is live in memory only.
    pub persisted: bool,
    pub entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// GET `/` — the chat page with an empty answer panel.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(templates::chat_page(state.engine.catalogue_len(), None).into_string())
}

/// GET `/status` — liveness plus catalogue size, for scripts and probes.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        ready: true,
        entries: state.engine.catalogue_len(),
    })
}

/// POST `/ask` — runs the query through the engine and re-renders the
/// page with the exchange. Suggestions are attached only when the match
/// fell below the threshold, mirroring what the console loop offers.
pub async fn ask(
    State(state): State<AppState>,
    Form(form): Form<AskForm>,
) -> Html<String> {
    let query = form.question.trim().to_string();
    let result = state.engine.respond(&query);

    let suggestions = if result.matched_question.is_none()
        && !query.is_empty()
        && !state.engine.is_exit(&query)
    {
        state.engine.keyword_fallback(&query)
    } else {
        Vec::new()
    };

    let exchange = Exchange {
        query,
        result,
        suggestions,
    };
    Html(templates::chat_page(state.engine.catalogue_len(), Some(&exchange)).into_string())
}

/// POST `/faq` — appends a pair and rebuilds the indices.
///
/// `201` on success (with a `warning` if persistence failed), `422` for
/// blank fields, `500` if the index rebuild failed (the catalogue is
/// unchanged in that case).
pub async fn add_faq(
    State(state): State<AppState>,
    Json(entry): Json<NewEntry>,
) -> (StatusCode, Json<AddResponse>) {
    let question = entry.question.trim().to_string();
    let answer = entry.answer.trim().to_string();
    if question.is_empty() || answer.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(AddResponse {
                added: false,
                persisted: false,
                entries: state.engine.catalogue_len(),
                warning: Some("question and answer must both be non-empty".to_string()),
            }),
        );
    }

    match state.engine.add_entry(question, answer) {
        Ok(report) => (
            StatusCode::CREATED,
            Json(AddResponse {
                added: true,
                persisted: report.persisted,
                entries: state.engine.catalogue_len(),
                warning: report.warning.as_ref().map(EngineError::to_string),
            }),
        ),
        Err(error) => {
            tracing::error!(error = %error, "failed to add catalogue entry");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AddResponse {
                    added: false,
                    persisted: false,
                    entries: state.engine.catalogue_len(),
                    warning: Some(error.to_string()),
                }),
            )
        }
    }
}
