//! Library programs data source.
//!
//! Programs are kept in a JSON file edited by staff:
//!
//! ```json
//! { "list": [ { "slug": "story-time", "name": "Story Time", "schedule": "Saturdays 10am" } ] }
//! ```
//!
//! The file is read on every request so edits show up without a restart.
//! A `list` that is not an array counts as empty, and entries that do not
//! describe a program are skipped with a warning.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors reading the programs file.
#[derive(Debug, Error)]
pub enum ProgramsError {
    /// The file could not be read.
    #[error("failed to read programs file: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid programs JSON.
    #[error("failed to parse programs file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One library program.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Program {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Image path relative to the static root.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProgramsFile {
    #[serde(default)]
    list: serde_json::Value,
}

impl ProgramsFile {
    fn into_programs(self) -> Vec<Program> {
        let serde_json::Value::Array(entries) = self.list else {
            if !self.list.is_null() {
                tracing::warn!("Programs file `list` is not an array");
            }
            return Vec::new();
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(program) => Some(program),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping invalid program entry");
                    None
                }
            })
            .collect()
    }
}

/// Reads programs from a JSON file.
#[derive(Debug, Clone)]
pub struct ProgramsSource {
    path: PathBuf,
}

impl ProgramsSource {
    /// Create a source backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all programs in file order.
    ///
    /// # Errors
    ///
    /// Returns `ProgramsError` if the file cannot be read or is not a JSON
    /// object.
    pub async fn load(&self) -> Result<Vec<Program>, ProgramsError> {
        let raw = tokio::fs::read(&self.path).await?;
        let file: ProgramsFile = serde_json::from_slice(&raw)?;
        Ok(file.into_programs())
    }

    /// Find a program by slug.
    ///
    /// # Errors
    ///
    /// Returns `ProgramsError` if the file cannot be read or parsed.
    pub async fn find(&self, slug: &str) -> Result<Option<Program>, ProgramsError> {
        Ok(self.load().await?.into_iter().find(|p| p.slug == slug))
    }
}
