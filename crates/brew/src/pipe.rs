//! The per-recipe run pipeline: select, assemble, render, write, register.

use crate::data::assemble;
use crate::recipe::BrewRecipe;
use crate::select::select_candidates;
use crate::template::render;
use std::path::PathBuf;
use tapforge_artifact::{Artifact, ArtifactKind, Registry, Templater, extra};
use tapforge_core::{Error, ReleaseContext, Result, SkipSet};
use tapforge_hosting::HostClient;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Result of running one recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Formula rendered, written and registered
    Rendered(PathBuf),
    /// Deliberately not run
    Skipped(String),
}

fn formula_dist_path(ctx: &ReleaseContext, directory: &str, filename: &str) -> PathBuf {
    let mut path = ctx.dist.join("homebrew");
    if !directory.is_empty() {
        path.push(directory);
    }
    path.push(filename);
    path
}

/// Runs one recipe end to end, up to (but not including) publication.
///
/// A recipe whose repository is entirely unset is skipped, not failed: the
/// run phase still happens for configured recipes so the formula file exists
/// for inspection even when publication is later skipped.
///
/// # Errors
///
/// Returns selection, assembly, rendering or I/O errors.
pub async fn run_recipe(
    ctx: &ReleaseContext,
    registry: &Registry,
    recipe: &BrewRecipe,
    client: &dyn HostClient,
    templater: &dyn Templater,
) -> Result<RunOutcome> {
    if recipe.repository.name.is_empty() && recipe.repository.git_url.is_empty() {
        return Ok(RunOutcome::Skipped(
            "brew tap repository is not configured".to_string(),
        ));
    }

    let recipe = recipe.clone().defaulted(ctx);
    let candidates = select_candidates(registry, &recipe)?;
    let resolved = recipe.resolved(templater)?;

    let data = assemble(ctx, &resolved, client, templater, &candidates)?;
    let text = render(&data, templater)?;

    let path = formula_dist_path(ctx, &resolved.recipe.directory, &resolved.formula_filename());
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            Error::io_with_source("creating formula directory", Some(parent.to_path_buf()), e)
        })?;
    }
    info!(formula = %resolved.name, path = %path.display(), "writing formula");
    tokio::fs::write(&path, text)
        .await
        .map_err(|e| Error::io_with_source("writing formula", Some(path.clone()), e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))
            .await
            .map_err(|e| Error::io_with_source("setting formula mode", Some(path.clone()), e))?;
    }

    registry.add(
        Artifact::new(resolved.formula_filename(), path.clone(), ArtifactKind::Formula)
            .with_extra(extra::BREW_RECIPE, &resolved),
    );
    Ok(RunOutcome::Rendered(path))
}

/// Runs every recipe, collecting per-recipe skips.
///
/// A skipped recipe never aborts its siblings; real errors do. Cancellation
/// is honored between recipes.
///
/// # Errors
///
/// Returns the first recipe error.
pub async fn run_all(
    ctx: &ReleaseContext,
    registry: &Registry,
    recipes: &[BrewRecipe],
    client: &dyn HostClient,
    templater: &dyn Templater,
    cancel: &CancellationToken,
) -> Result<Option<String>> {
    let mut skips = SkipSet::new();
    for recipe in recipes {
        if cancel.is_cancelled() {
            warn!("run cancelled");
            break;
        }
        match run_recipe(ctx, registry, recipe, client, templater).await? {
            RunOutcome::Skipped(reason) => {
                info!(formula = %recipe.name, reason = %reason, "skipping recipe");
                skips.remember(reason);
            }
            RunOutcome::Rendered(_) => {}
        }
    }
    Ok(skips.notice())
}
