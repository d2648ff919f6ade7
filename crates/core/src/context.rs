//! Release context shared by every formula run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Commit author identity used for tap commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitAuthor {
    /// Author name
    pub name: String,
    /// Author email
    pub email: String,
}

impl Default for CommitAuthor {
    fn default() -> Self {
        Self {
            name: "tapforgebot".to_string(),
            email: "bot@tapforge.dev".to_string(),
        }
    }
}

impl CommitAuthor {
    /// Fills empty fields from the default identity.
    ///
    /// Recipes may override only the name or only the email; the missing
    /// half falls back to the bot identity.
    #[must_use]
    pub fn or_default(mut self) -> Self {
        let fallback = Self::default();
        if self.name.is_empty() {
            self.name = fallback.name;
        }
        if self.email.is_empty() {
            self.email = fallback.email;
        }
        self
    }
}

/// Read-only context describing the release a run operates on.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    /// Project name (default formula name)
    pub project_name: String,
    /// Version being released, without a 'v' prefix
    pub version: String,
    /// Whether the current version is a prerelease
    pub prerelease: bool,
    /// Root of the dist tree formula files are written under
    pub dist: PathBuf,
    /// Default commit author when the recipe does not override it
    pub commit_author: CommitAuthor,
}

impl ReleaseContext {
    /// Creates a new release context.
    #[must_use]
    pub fn new(
        project_name: impl Into<String>,
        version: impl Into<String>,
        dist: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            version: version.into(),
            prerelease: false,
            dist: dist.into(),
            commit_author: CommitAuthor::default(),
        }
    }

    /// Sets the prerelease flag.
    #[must_use]
    pub const fn with_prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    /// Sets the default commit author.
    #[must_use]
    pub fn with_commit_author(mut self, author: CommitAuthor) -> Self {
        self.commit_author = author;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_new() {
        let ctx = ReleaseContext::new("tool", "1.2.3", "dist");
        assert_eq!(ctx.project_name, "tool");
        assert_eq!(ctx.version, "1.2.3");
        assert!(!ctx.prerelease);
        assert_eq!(ctx.dist, PathBuf::from("dist"));
    }

    #[test]
    fn test_context_with_prerelease() {
        let ctx = ReleaseContext::new("tool", "1.3.0-rc.1", "dist").with_prerelease(true);
        assert!(ctx.prerelease);
    }

    #[test]
    fn test_commit_author_default() {
        let author = CommitAuthor::default();
        assert_eq!(author.name, "tapforgebot");
        assert_eq!(author.email, "bot@tapforge.dev");
    }

    #[test]
    fn test_commit_author_or_default_partial() {
        let author = CommitAuthor {
            name: "release bot".to_string(),
            email: String::new(),
        }
        .or_default();
        assert_eq!(author.name, "release bot");
        assert_eq!(author.email, "bot@tapforge.dev");
    }
}
