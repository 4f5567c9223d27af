//! # Maud Templates — Server-Side HTML
//!
//! HTML rendered at compile time with the [`maud`](https://maud.lambda.xyz/)
//! macro. The page is deliberately plain: one form, one answer panel, no
//! client-side framework. Styling is a small inline stylesheet so the
//! binary serves everything itself.
//!
//! ## Templates
//!
//! | Function | Kind | Purpose |
//! |----------|------|---------|
//! | [`chat_page()`] | Full page | Form + (optionally) the last exchange |
//! | [`exchange_block()`] | Fragment | One query/answer pair with confidence |

use maud::{html, Markup, DOCTYPE};

use crate::engine::{MatchResult, Suggestion};

/// One completed question/answer round, rendered into the page after a
/// form submit.
pub struct Exchange {
    pub query: String,
    pub result: MatchResult,
    /// Keyword suggestions, present only when the match fell below the
    /// confidence threshold.
    pub suggestions: Vec<Suggestion>,
}

const STYLESHEET: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 44rem; margin: 2rem auto; padding: 0 1rem; background: #fafafa; color: #222; }
h1 { font-size: 1.4rem; }
form.ask { display: flex; gap: 0.5rem; margin: 1.5rem 0; }
form.ask input[type=text] { flex: 1; padding: 0.6rem; border: 1px solid #bbb; border-radius: 4px; font-size: 1rem; }
form.ask button { padding: 0.6rem 1.2rem; border: none; border-radius: 4px; background: #2b6cb0; color: white; font-size: 1rem; cursor: pointer; }
.exchange { background: white; border: 1px solid #ddd; border-radius: 6px; padding: 1rem; margin-bottom: 1rem; }
.exchange .query { font-weight: 600; margin-bottom: 0.5rem; }
.exchange .matched { color: #666; font-size: 0.85rem; margin-bottom: 0.5rem; }
.exchange .confidence { color: #999; font-size: 0.8rem; }
.suggestions { margin-top: 0.75rem; }
.suggestions ul { margin: 0.25rem 0 0 1.25rem; padding: 0; }
footer { color: #999; font-size: 0.8rem; margin-top: 2rem; }
"#;

/// The chat page: heading, ask form, and the last exchange if there was
/// one. Submitting the form re-renders this same page.
pub fn chat_page(entries: usize, exchange: Option<&Exchange>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "FAQ Chat" }
                style { (STYLESHEET) }
            }
            body {
                h1 { "FAQ Chat" }
                p { "Ask a question and I will look for the closest known answer." }

                form class="ask" method="post" action="/ask" {
                    input type="text" name="question"
                        placeholder="e.g. What is your return policy?"
                        autofocus autocomplete="off";
                    button type="submit" { "Ask" }
                }

                @if let Some(exchange) = exchange {
                    (exchange_block(exchange))
                }

                footer {
                    (entries) " questions in the catalogue \u{00b7} "
                    a href="/status" { "status" }
                }
            }
        }
    }
}

/// One query/answer pair. When the match stayed below the threshold the
/// block carries the keyword suggestions so the user can pick a nearby
/// question instead of rephrasing blind.
pub fn exchange_block(exchange: &Exchange) -> Markup {
    html! {
        div class="exchange" {
            div class="query" { "You: " (exchange.query) }
            @if let Some(matched) = &exchange.result.matched_question {
                div class="matched" { "Matched: " (matched) }
            }
            div class="answer" { (exchange.result.answer) }
            div class="confidence" {
                (format!("confidence {:.2}", exchange.result.confidence))
            }
            @if !exchange.suggestions.is_empty() {
                div class="suggestions" {
                    "Did you mean one of these?"
                    ul {
                        @for suggestion in &exchange.suggestions {
                            li { (suggestion.question) }
                        }
                    }
                }
            }
        }
    }
}
