//! # Engine Error Taxonomy
//!
//! Every failure the engine can surface is one of three kinds:
//!
//! | Kind | When | Recovery |
//! |------|------|----------|
//! | [`Configuration`](EngineError::Configuration) | startup: empty catalogue, unusable static resources | fatal, surfaced to the caller of `FaqEngine::new` |
//! | [`IndexBuild`](EngineError::IndexBuild) | a rebuild triggered by `add_entry` fails | prior indices stay active, error surfaced to the caller |
//! | [`Persistence`](EngineError::Persistence) | the updated catalogue could not be written to disk | warning-level: the in-memory entry stays usable |
//!
//! A blank query is deliberately *not* an error — the engine converts it
//! locally into a fixed validation [`MatchResult`](crate::engine::MatchResult).
//!
//! Internal library failures are caught at the component boundary and wrapped
//! as one of these kinds with the original cause attached, so a caller can
//! walk the chain for diagnostics.

use thiserror::Error;

/// Boxed underlying cause, attached where one exists.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Tagged error type for the matching engine.
///
/// Each variant carries a human-readable message and, where one exists,
/// the wrapped underlying cause (printed by `{source}` chains).
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine cannot start: no catalogue, empty catalogue, or a static
    /// resource (stopword set, lemma table, embedding lexicon) is unusable.
    #[error("engine configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// Rebuilding the indices after a catalogue append failed. The engine
    /// keeps serving queries from the prior indices.
    #[error("index rebuild failed: {message}")]
    IndexBuild {
        message: String,
        #[source]
        source: Option<Cause>,
    },

    /// The updated catalogue could not be persisted. The in-memory catalogue
    /// and indices already include the new entry and remain usable.
    #[error("catalogue persistence failed: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<Cause>,
    },
}

impl EngineError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    pub fn index_build(message: impl Into<String>, cause: anyhow::Error) -> Self {
        Self::IndexBuild {
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    pub fn persistence(message: impl Into<String>, cause: anyhow::Error) -> Self {
        Self::Persistence {
            message: message.into(),
            source: Some(cause.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_displays_message() {
        let err = EngineError::configuration("catalogue is empty");
        assert_eq!(
            err.to_string(),
            "engine configuration error: catalogue is empty"
        );
    }

    #[test]
    fn cause_is_reachable_through_source_chain() {
        let cause = anyhow::anyhow!("disk full");
        let err = EngineError::persistence("could not write data/faq.json", cause);
        let source = std::error::Error::source(&err).expect("source should be attached");
        assert!(source.to_string().contains("disk full"));
    }
}
