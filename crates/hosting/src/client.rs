//! Hosting client traits and the transport factory.

use crate::git::GitTransportClient;
use crate::repo::{Repo, RepoRef};
use async_trait::async_trait;
use std::sync::Arc;
use tapforge_core::{CommitAuthor, Result};

/// Opens pull requests on a hosting service.
///
/// This is an optional capability: a [`HostClient`] advertises it through
/// [`HostClient::pull_request_opener`], and callers must check before use.
#[async_trait]
pub trait PullRequestOpener: Send + Sync {
    /// Opens a pull request from `head` into `base`.
    ///
    /// # Errors
    ///
    /// Returns a hosting error when the API call fails.
    async fn open_pull_request(
        &self,
        base: &Repo,
        head: &Repo,
        title: &str,
        draft: bool,
    ) -> Result<()>;
}

/// A version-control hosting client.
///
/// The base capability set is a single-file commit plus the host's download
/// URL template; pull-request support is an explicit optional capability.
#[async_trait]
pub trait HostClient: Send + Sync {
    /// Commits `content` to `path` in `repo` with the given message.
    ///
    /// Creates the file when absent, updates it otherwise.
    ///
    /// # Errors
    ///
    /// Returns a hosting or git error when the commit fails.
    async fn create_file(
        &self,
        author: &CommitAuthor,
        repo: &Repo,
        content: &[u8],
        path: &str,
        message: &str,
    ) -> Result<()>;

    /// Returns the host's download URL template for release artifacts.
    ///
    /// The template may contain placeholder expressions resolved by the
    /// substitution engine with per-artifact scope.
    ///
    /// # Errors
    ///
    /// Returns a hosting error when the transport has no release downloads.
    fn release_url_template(&self) -> Result<String>;

    /// Returns the pull-request capability, when this client has one.
    fn pull_request_opener(&self) -> Option<&dyn PullRequestOpener> {
        None
    }

    /// Returns a client scoped to the given access token.
    ///
    /// `Ok(None)` means the token is empty and the current client should be
    /// reused.
    ///
    /// # Errors
    ///
    /// Returns a hosting error when the scoped client cannot be built.
    fn token_scoped(&self, token: &str) -> Result<Option<Arc<dyn HostClient>>> {
        let _ = token;
        Ok(None)
    }
}

/// Builds the transport for a resolved repository reference.
///
/// A reference carrying a generic git remote URL gets a [`GitTransportClient`]
/// (no hosting API involved); otherwise the ambient hosting client is reused,
/// rescoped when the reference carries its own token.
///
/// # Errors
///
/// Returns an error when a token-scoped client cannot be constructed.
pub fn client_for(
    repo_ref: &RepoRef,
    ambient: Arc<dyn HostClient>,
) -> Result<Arc<dyn HostClient>> {
    if !repo_ref.git_url.is_empty() {
        return Ok(Arc::new(
            GitTransportClient::new(repo_ref.git_url.clone(), repo_ref.branch.clone())
                .with_private_key(repo_ref.git_private_key.clone()),
        ));
    }
    match ambient.token_scoped(&repo_ref.token)? {
        Some(scoped) => Ok(scoped),
        None => Ok(ambient),
    }
}
