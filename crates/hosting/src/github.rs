//! Token-scoped GitHub hosting client.

use crate::client::{HostClient, PullRequestOpener};
use crate::repo::Repo;
use async_trait::async_trait;
use octocrab::Octocrab;
use std::sync::Arc;
use tapforge_core::{CommitAuthor, Error, Result};
use tracing::{debug, info};

/// GitHub hosting client backed by the contents and pulls APIs.
pub struct GithubClient {
    octocrab: Octocrab,
    /// Source repository releases are downloaded from
    source: Repo,
    token: String,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// The branch a contents-API commit targets; `None` leaves the remote
/// default branch in effect.
fn commit_branch(repo: &Repo) -> Option<&str> {
    (!repo.branch.is_empty()).then_some(repo.branch.as_str())
}

impl GithubClient {
    /// Creates an authenticated client.
    ///
    /// `source` is the repository release artifacts are attached to; it
    /// anchors [`HostClient::release_url_template`].
    ///
    /// # Errors
    ///
    /// Returns a hosting error when the underlying client cannot be built.
    pub fn new(token: impl Into<String>, source: Repo) -> Result<Self> {
        let token = token.into();
        let octocrab = Octocrab::builder()
            .personal_token(token.clone())
            .build()
            .map_err(|e| Error::host(format!("failed to build GitHub client: {e}")))?;
        Ok(Self {
            octocrab,
            source,
            token,
        })
    }
}

#[async_trait]
impl HostClient for GithubClient {
    async fn create_file(
        &self,
        author: &CommitAuthor,
        repo: &Repo,
        content: &[u8],
        path: &str,
        message: &str,
    ) -> Result<()> {
        debug!(
            repo = %repo.full_name(),
            branch = %repo.branch,
            path = %path,
            author = %author.name,
            "committing file via contents API"
        );

        // The contents API needs the current blob SHA to update an existing
        // file.
        let repos = self.octocrab.repos(&repo.owner, &repo.name);
        let existing_sha = match repos.get_content().path(path).send().await {
            Ok(content) => content.items.first().map(|item| item.sha.clone()),
            Err(_) => None,
        };

        let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, content);
        let branch = commit_branch(repo);

        let result = if let Some(sha) = existing_sha {
            debug!(sha = %sha, "updating existing file");
            let mut request = repos.update_file(path, message, &encoded, &sha);
            if let Some(branch) = branch {
                request = request.branch(branch);
            }
            request.send().await
        } else {
            debug!("creating new file");
            let mut request = repos.create_file(path, message, &encoded);
            if let Some(branch) = branch {
                request = request.branch(branch);
            }
            request.send().await
        };

        result.map_err(|e| Error::host(format!("failed to commit {path}: {e}")))?;

        info!(repo = %repo.full_name(), path = %path, "file committed");
        Ok(())
    }

    fn release_url_template(&self) -> Result<String> {
        Ok(format!(
            "https://github.com/{}/{}/releases/download/v${{version}}/${{artifact}}",
            self.source.owner, self.source.name
        ))
    }

    fn pull_request_opener(&self) -> Option<&dyn PullRequestOpener> {
        Some(self)
    }

    fn token_scoped(&self, token: &str) -> Result<Option<Arc<dyn HostClient>>> {
        if token.is_empty() || token == self.token {
            return Ok(None);
        }
        let scoped = Self::new(token, self.source.clone())?;
        Ok(Some(Arc::new(scoped)))
    }
}

#[async_trait]
impl PullRequestOpener for GithubClient {
    async fn open_pull_request(
        &self,
        base: &Repo,
        head: &Repo,
        title: &str,
        draft: bool,
    ) -> Result<()> {
        // Empty base fields fall back to the head repository.
        let base_owner = if base.owner.is_empty() {
            &head.owner
        } else {
            &base.owner
        };
        let base_name = if base.name.is_empty() {
            &head.name
        } else {
            &base.name
        };
        let base_branch = if base.branch.is_empty() {
            "main"
        } else {
            &base.branch
        };
        let head_ref = if base_owner == &head.owner {
            head.branch.clone()
        } else {
            format!("{}:{}", head.owner, head.branch)
        };

        info!(
            base = %format!("{base_owner}/{base_name}@{base_branch}"),
            head = %head_ref,
            draft,
            "opening pull request"
        );

        self.octocrab
            .pulls(base_owner, base_name)
            .create(title, &head_ref, base_branch)
            .body(title)
            .draft(Some(draft))
            .send()
            .await
            .map_err(|e| Error::host(format!("failed to open pull request: {e}")))?;

        Ok(())
    }
}
