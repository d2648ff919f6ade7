//! Composable selection predicates over artifacts.

use crate::artifact::{Artifact, ArtifactKind, extra};
use crate::platform::{Arch, Os};

/// A composable artifact predicate.
///
/// Filters combine with [`Filter::and`] and [`Filter::or`] into arbitrary
/// predicate trees; matching is a pure function of the artifact record.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Matches artifacts with the given OS.
    ByOs(Os),
    /// Matches artifacts with the given architecture.
    ByArch(Arch),
    /// Matches artifacts with the given AMD64 microarchitecture level.
    ByGoamd64(String),
    /// Matches artifacts with the given ARM revision.
    ByGoarm(String),
    /// Matches artifacts of the given kind.
    ByKind(ArtifactKind),
    /// Matches artifacts whose archive format is one of the given formats.
    ByFormats(Vec<String>),
    /// Matches artifacts whose build id is in the allowlist.
    ByIds(Vec<String>),
    /// Drops universal binaries that did not replace their single-arch
    /// inputs, keeping only the canonical representative.
    ReplacingUnibins,
    /// Matches when every inner filter matches.
    And(Vec<Filter>),
    /// Matches when any inner filter matches.
    Or(Vec<Filter>),
}

impl Filter {
    /// Conjunction of filters.
    #[must_use]
    pub fn and(filters: Vec<Self>) -> Self {
        Self::And(filters)
    }

    /// Disjunction of filters.
    #[must_use]
    pub fn or(filters: Vec<Self>) -> Self {
        Self::Or(filters)
    }

    /// Evaluates the predicate against one artifact.
    #[must_use]
    pub fn matches(&self, artifact: &Artifact) -> bool {
        match self {
            Self::ByOs(os) => artifact.os == Some(*os),
            Self::ByArch(arch) => artifact.arch == Some(*arch),
            Self::ByGoamd64(level) => artifact.goamd64 == *level,
            Self::ByGoarm(revision) => artifact.goarm == *revision,
            Self::ByKind(kind) => artifact.kind == *kind,
            Self::ByFormats(formats) => formats.iter().any(|f| artifact.format == *f),
            Self::ByIds(ids) => ids.iter().any(|id| artifact.id == *id),
            Self::ReplacingUnibins => {
                let universal = matches!(artifact.arch, Some(arch) if arch.is_universal());
                !universal || artifact.extra_or(extra::REPLACES, true)
            }
            Self::And(filters) => filters.iter().all(|f| f.matches(artifact)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(artifact)),
        }
    }
}
