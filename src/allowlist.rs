//! Allow-list of channel identifiers (tvg-ids).
//!
//! The list is a plain text file, one identifier per line. Lines are
//! trimmed and blank lines are dropped, so trailing newlines and stray
//! whitespace in hand-edited files are harmless. An unreadable file is a
//! configuration error and aborts the run before any network activity.

use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllowListError {
    #[error("Failed to read allow-list file: {0}")]
    Io(#[from] std::io::Error),
}

/// The set of channel identifiers to keep. Duplicates collapse; lookup is
/// exact string match.
#[derive(Debug, Clone)]
pub struct AllowList {
    ids: HashSet<String>,
}

impl AllowList {
    /// Loads the allow-list from a file, one identifier per line.
    pub fn load(path: &Path) -> Result<Self, AllowListError> {
        let content = std::fs::read_to_string(path)?;
        let list = Self::from_lines(&content);
        tracing::info!(
            path = %path.display(),
            ids = list.len(),
            "Loaded channel allow-list"
        );
        Ok(list)
    }

    /// Builds an allow-list from newline-delimited text.
    pub fn from_lines(content: &str) -> Self {
        let ids = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        Self { ids }
    }

    /// Builds an allow-list from an explicit id collection. Test helper
    /// and programmatic entry point.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
