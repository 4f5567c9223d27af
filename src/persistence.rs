//! # Persistence — The Catalogue's External Store
//!
//! Loads and saves the catalogue as pretty-printed JSON (an array of
//! `{question, answer}` records). The engine consumes the loaded catalogue
//! as a plain value and only calls back into [`CatalogueStore::save`] after
//! an append — persistence is a collaborator, not part of the matching
//! engine.
//!
//! A missing file at startup is not an error: the caller falls back to the
//! built-in default catalogue (and the first save creates the file). A save
//! failure after an append is warning-level: the in-memory entry stays
//! usable for the rest of the process lifetime.
//!
//! The write is not atomic — a crash mid-write can corrupt the file.
//! Acceptable at this catalogue size; a write-rename pattern would fix it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::catalogue::Catalogue;

/// Default on-disk location, relative to the working directory.
pub const DEFAULT_PATH: &str = "data/faq.json";

/// JSON-file-backed store for one catalogue.
#[derive(Debug, Clone)]
pub struct CatalogueStore {
    path: PathBuf,
}

impl CatalogueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`DEFAULT_PATH`], overridable through the `FAQ_DATA`
    /// environment variable.
    pub fn from_env() -> Self {
        let path = std::env::var("FAQ_DATA").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the catalogue, or `Ok(None)` if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or is not valid JSON.
    pub fn load(&self) -> Result<Option<Catalogue>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let catalogue: Catalogue = serde_json::from_str(&json)
            .with_context(|| format!("invalid catalogue JSON in {}", self.path.display()))?;
        Ok(Some(catalogue))
    }

    /// Saves the catalogue as pretty JSON, creating parent directories as
    /// needed.
    pub fn save(&self, catalogue: &Catalogue) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(catalogue)
            .context("failed to serialize the catalogue")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), entries = catalogue.len(), "catalogue saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::CatalogueEntry;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogueStore::new(dir.path().join("faq.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CatalogueStore::new(dir.path().join("nested/faq.json"));

        let catalogue = Catalogue::new(vec![
            CatalogueEntry::new("What is your return policy?", "30 days."),
            CatalogueEntry::new("How do I track my order?", "Use the tracking link."),
        ]);
        store.save(&catalogue).unwrap();

        let loaded = store.load().unwrap().expect("file should exist");
        assert_eq!(loaded.entries(), catalogue.entries());
    }

    #[test]
    fn corrupt_file_surfaces_an_error_with_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = CatalogueStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("faq.json"), "error: {err}");
    }
}
