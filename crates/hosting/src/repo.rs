//! Repository references and their resolution.

use serde::{Deserialize, Serialize};
use tapforge_artifact::Templater;
use tapforge_core::{Error, Result};

/// A concrete repository target: owner, name and branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Repo {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Branch commits land on; empty means the remote default
    pub branch: String,
}

impl Repo {
    /// Returns "owner/name".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Base repository of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequestBase {
    /// Base repository owner; empty means the head repository's owner
    pub owner: String,
    /// Base repository name; empty means the head repository's name
    pub name: String,
    /// Base branch; empty means "main"
    pub branch: String,
}

/// Pull-request settings of a repository reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullRequestRef {
    /// Whether publication goes through a pull request
    pub enabled: bool,
    /// Whether the pull request is opened as a draft
    pub draft: bool,
    /// Base repository/branch the pull request targets
    pub base: PullRequestBase,
}

/// Declarative reference to a target repository.
///
/// Fields may contain placeholder expressions; [`RepoRef::resolved`]
/// produces the final reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoRef {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Target branch; empty means the remote default
    pub branch: String,
    /// Access-token override; empty reuses the ambient client token
    pub token: String,
    /// Generic git remote URL; when set, publication bypasses the hosting
    /// API entirely
    pub git_url: String,
    /// SSH private key (PEM contents) for the generic git transport
    pub git_private_key: String,
    /// Pull-request settings
    pub pull_request: PullRequestRef,
}

impl RepoRef {
    /// Resolves every templated field into a final reference.
    ///
    /// This is a pure step: the input reference is left untouched.
    ///
    /// # Errors
    ///
    /// Propagates substitution failures verbatim.
    pub fn resolved(&self, templater: &dyn Templater) -> Result<Self> {
        Ok(Self {
            owner: templater.apply(&self.owner)?,
            name: templater.apply(&self.name)?,
            branch: templater.apply(&self.branch)?,
            token: templater.apply(&self.token)?,
            git_url: templater.apply(&self.git_url)?,
            git_private_key: templater.apply(&self.git_private_key)?,
            pull_request: self.pull_request.clone(),
        })
    }

    /// Returns the concrete repository this reference points at.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the repository name is empty and
    /// no generic git remote URL is set; the git transport addresses the
    /// remote by URL alone.
    pub fn to_repo(&self) -> Result<Repo> {
        if self.name.is_empty() && self.git_url.is_empty() {
            return Err(Error::config(
                "repository name is empty",
                "set repository.name or repository.git_url in the recipe",
            ));
        }
        Ok(Repo {
            owner: self.owner.clone(),
            name: self.name.clone(),
            branch: self.branch.clone(),
        })
    }
}
