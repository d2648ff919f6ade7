//! Append-only artifact registry.

use crate::artifact::Artifact;
use crate::filter::Filter;
use std::sync::Mutex;
use tracing::debug;

/// Shared store of build outputs.
///
/// The registry is append-only: entries are never mutated or removed once
/// added, and appends are serialized behind a mutex so concurrent recipe
/// runs can register their outputs safely.
#[derive(Debug, Default)]
pub struct Registry {
    inner: Mutex<Vec<Artifact>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one artifact.
    pub fn add(&self, artifact: Artifact) {
        debug!(name = %artifact.name, kind = ?artifact.kind, "registering artifact");
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.push(artifact);
    }

    /// Returns a snapshot of every stored artifact.
    #[must_use]
    pub fn list(&self) -> Vec<Artifact> {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.clone()
    }

    /// Returns a snapshot of the artifacts matching the filter.
    #[must_use]
    pub fn filter(&self, filter: &Filter) -> Vec<Artifact> {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.iter().filter(|a| filter.matches(a)).cloned().collect()
    }
}
