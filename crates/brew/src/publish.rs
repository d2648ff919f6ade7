//! Formula publication.

use crate::recipe::ResolvedRecipe;
use std::sync::Arc;
use tapforge_artifact::{Artifact, ArtifactKind, Filter, Registry, Templater, extra};
use tapforge_core::{CommitAuthor, Error, ReleaseContext, Result, SkipSet};
use tapforge_hosting::{HostClient, Repo, client_for};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Result of publishing one formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Committed directly to the tap repository
    Published,
    /// Committed to the tap and opened a pull request
    PullRequested,
    /// Deliberately not published
    Skipped(String),
}

/// Resolves the pull-request base repository, defaulting unset fields from
/// the head.
fn pull_request_base(head: &Repo, resolved: &ResolvedRecipe) -> Repo {
    let base = &resolved.repository.pull_request.base;
    Repo {
        owner: if base.owner.is_empty() {
            head.owner.clone()
        } else {
            base.owner.clone()
        },
        name: if base.name.is_empty() {
            head.name.clone()
        } else {
            base.name.clone()
        },
        branch: if base.branch.is_empty() {
            "main".to_string()
        } else {
            base.branch.clone()
        },
    }
}

/// Publishes one previously rendered formula artifact.
///
/// Skip policies are honored first ("true" always skips, "auto" skips on a
/// prerelease) and reported as [`PublishOutcome::Skipped`], never as errors.
/// A reference with a generic git remote URL publishes over plain git; one
/// with its own token gets a rescoped hosting client. With pull requests
/// enabled the client's capability is verified before the first mutating
/// call, so a client without pull-request support fails with nothing
/// half-published.
///
/// # Errors
///
/// Returns configuration, templating, I/O, hosting or capability errors.
pub async fn publish_formula(
    ctx: &ReleaseContext,
    artifact: &Artifact,
    ambient: Arc<dyn HostClient>,
    templater: &dyn Templater,
) -> Result<PublishOutcome> {
    let resolved: ResolvedRecipe = artifact.extra(extra::BREW_RECIPE)?;

    let skip_upload = resolved.skip_upload.trim();
    if skip_upload == "true" {
        return Ok(PublishOutcome::Skipped("brew.skip_upload is set".to_string()));
    }
    if skip_upload == "auto" && ctx.prerelease {
        return Ok(PublishOutcome::Skipped(
            "prerelease detected with 'auto' upload, skipping homebrew publish".to_string(),
        ));
    }

    let repo = resolved.repository.to_repo()?;
    let message = templater.apply(&resolved.recipe.commit_message_template)?;
    let author = CommitAuthor {
        name: templater.apply(&resolved.recipe.commit_author.name)?,
        email: templater.apply(&resolved.recipe.commit_author.email)?,
    }
    .or_default();

    let content = tokio::fs::read(&artifact.path).await.map_err(|e| {
        Error::io_with_source("reading formula", Some(artifact.path.clone()), e)
    })?;

    let client = client_for(&resolved.repository, ambient)?;
    let path = resolved.formula_repo_path();
    let pr = &resolved.repository.pull_request;

    if !pr.enabled {
        info!(formula = %resolved.name, repo = %repo.full_name(), "pushing formula");
        client
            .create_file(&author, &repo, &content, &path, &message)
            .await?;
        return Ok(PublishOutcome::Published);
    }

    // Capability first: nothing may be committed if the pull request can
    // never be opened.
    let Some(opener) = client.pull_request_opener() else {
        return Err(Error::capability(format!(
            "pull requests requested for {} but the transport cannot open them",
            repo.full_name()
        )));
    };

    info!(formula = %resolved.name, repo = %repo.full_name(), "pushing formula");
    client
        .create_file(&author, &repo, &content, &path, &message)
        .await?;

    let base = pull_request_base(&repo, &resolved);
    info!(base = %base.full_name(), head = %repo.full_name(), "opening pull request");
    opener
        .open_pull_request(&base, &repo, &message, pr.draft)
        .await?;
    Ok(PublishOutcome::PullRequested)
}

/// Publishes every rendered formula in the registry.
///
/// Skips are batched across formulas and returned as one combined notice;
/// only real errors abort the batch. Cancellation is honored between
/// formulas.
///
/// # Errors
///
/// Returns the first publication error.
pub async fn publish_all(
    ctx: &ReleaseContext,
    registry: &Registry,
    ambient: Arc<dyn HostClient>,
    templater: &dyn Templater,
    cancel: &CancellationToken,
) -> Result<Option<String>> {
    let mut skips = SkipSet::new();
    for artifact in registry.filter(&Filter::ByKind(ArtifactKind::Formula)) {
        if cancel.is_cancelled() {
            warn!("publication cancelled");
            break;
        }
        match publish_formula(ctx, &artifact, Arc::clone(&ambient), templater).await? {
            PublishOutcome::Skipped(reason) => {
                info!(formula = %artifact.name, reason = %reason, "skipping publication");
                skips.remember(reason);
            }
            PublishOutcome::Published | PublishOutcome::PullRequested => {}
        }
    }
    Ok(skips.notice())
}
