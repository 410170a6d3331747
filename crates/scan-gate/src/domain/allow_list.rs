//! # Allow-List
//!
//! Immutable set of identifiers eligible for access, loaded once at startup.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use super::errors::AllowListError;
use super::value_objects::Identifier;

/// On-disk document format: `{ "uids": ["A1", "A2"] }`.
#[derive(Debug, Deserialize)]
struct AllowListDocument {
    uids: Vec<String>,
}

/// Immutable identifier set with O(1) expected membership.
///
/// Shared behind an `Arc` without locking; nothing can mutate it after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    ids: HashSet<String>,
}

impl AllowList {
    /// Build from any collection. Duplicates collapse.
    ///
    /// Empty strings are dropped: they can never be produced by a decoder and
    /// would never match a parsed [`Identifier`].
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids
            .into_iter()
            .map(Into::into)
            .filter(|id: &String| !id.is_empty())
            .collect();
        Self { ids }
    }

    /// Parse a `{ "uids": [...] }` document.
    pub fn from_json_str(json: &str) -> Result<Self, AllowListError> {
        let doc: AllowListDocument = serde_json::from_str(json)?;
        Ok(Self::new(doc.uids))
    }

    /// Load a `{ "uids": [...] }` document from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AllowListError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| AllowListError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let list = Self::from_json_str(&json)?;
        tracing::info!(
            "[scan-gate] Loaded allow-list with {} identifiers from {}",
            list.len(),
            path.display()
        );
        Ok(list)
    }

    /// Exact membership test.
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.ids.contains(identifier.as_str())
    }

    /// Exact membership test on a raw string.
    pub fn contains_str(&self, identifier: &str) -> bool {
        self.ids.contains(identifier)
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no identifier is eligible.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AllowList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}
