//! Formula rendering-context assembly.

use crate::install::{install_lines, split_lines};
use crate::recipe::{BrewDependency, ResolvedRecipe};
use std::collections::BTreeSet;
use tapforge_artifact::{Arch, Artifact, Os, Templater};
use tapforge_core::{Error, ReleaseContext, Result};
use tapforge_hosting::HostClient;
use tracing::debug;

/// Per-artifact rendering unit inside a formula context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePackage {
    /// Fully substituted download URL
    pub download_url: String,
    /// sha256 of the artifact bytes
    pub sha256: String,
    /// Target OS
    pub os: Os,
    /// Target architecture
    pub arch: Arch,
    /// Download strategy class for the url stanza; empty for the default
    pub download_strategy: String,
    /// Resolved install-instruction lines
    pub install: Vec<String>,
}

/// The full rendering input for one formula.
#[derive(Debug, Clone, Default)]
pub struct FormulaContext {
    /// Formula display name (mangled into a class token at render time)
    pub name: String,
    /// One-line description
    pub desc: String,
    /// Homepage URL
    pub homepage: String,
    /// Release version
    pub version: String,
    /// License identifier
    pub license: String,
    /// Caveats lines
    pub caveats: Vec<String>,
    /// Dependencies, sorted by name
    pub dependencies: Vec<BrewDependency>,
    /// Conflicting formulas
    pub conflicts: Vec<String>,
    /// Service block lines
    pub service: Vec<String>,
    /// Post-install block lines
    pub post_install: Vec<String>,
    /// Test block lines
    pub tests: Vec<String>,
    /// `require_relative` target; empty for none
    pub custom_require: String,
    /// Free-form class body lines
    pub custom_block: Vec<String>,
    /// True when macOS has exactly one package and it is AMD64-only
    /// (drives the Rosetta-related template conditionals)
    pub has_only_amd64_macos_pkg: bool,
    /// macOS packages, ordered
    pub macos_packages: Vec<ReleasePackage>,
    /// Linux packages, ordered
    pub linux_packages: Vec<ReleasePackage>,
}

/// Descending (OS, then architecture) order over the platform strings, for
/// reproducible output across runs.
fn package_order(a: &ReleasePackage, b: &ReleasePackage) -> std::cmp::Ordering {
    b.os
        .as_str()
        .cmp(a.os.as_str())
        .then_with(|| b.arch.as_str().cmp(a.arch.as_str()))
}

/// Folds the candidate artifacts into one [`FormulaContext`].
///
/// # Errors
///
/// Fails on checksum I/O errors, substitution failures, or when two
/// artifacts land on the same (OS, architecture) slot - the template cannot
/// express two packages for one platform.
pub fn assemble(
    ctx: &ReleaseContext,
    resolved: &ResolvedRecipe,
    client: &dyn HostClient,
    templater: &dyn Templater,
    artifacts: &[Artifact],
) -> Result<FormulaContext> {
    let recipe = &resolved.recipe;

    let mut dependencies = recipe.dependencies.clone();
    dependencies.sort_by(|a, b| a.name.cmp(&b.name));

    let mut data = FormulaContext {
        name: resolved.name.clone(),
        desc: recipe.description.clone(),
        homepage: recipe.homepage.clone(),
        version: ctx.version.clone(),
        license: recipe.license.clone(),
        caveats: split_lines(&recipe.caveats),
        dependencies,
        conflicts: recipe.conflicts.clone(),
        service: split_lines(&recipe.service),
        post_install: split_lines(&recipe.post_install),
        tests: split_lines(&recipe.test),
        custom_require: recipe.custom_require.clone(),
        custom_block: split_lines(&recipe.custom_block),
        ..FormulaContext::default()
    };

    let mut seen: BTreeSet<(Os, Arch)> = BTreeSet::new();

    for artifact in artifacts {
        let (Some(os), Some(arch)) = (artifact.os, artifact.arch) else {
            // Selection only yields platformed artifacts.
            continue;
        };

        // Fail before any file is written; one slot per platform.
        if !seen.insert((os, arch)) {
            return Err(Error::AmbiguousOsArch {
                os: os.to_string(),
                arch: arch.to_string(),
            });
        }

        let sha256 = artifact.checksum_sha256()?;

        let url_template = if recipe.url_template.is_empty() {
            client.release_url_template()?
        } else {
            recipe.url_template.clone()
        };
        let download_url = templater.apply_for_artifact(&url_template, artifact)?;

        let install = install_lines(recipe, artifact, templater)?;

        let pkg = ReleasePackage {
            download_url,
            sha256,
            os,
            arch,
            download_strategy: recipe.download_strategy.clone(),
            install,
        };
        debug!(os = %os, arch = %arch, url = %pkg.download_url, "assembled package");

        match os {
            Os::Darwin => data.macos_packages.push(pkg),
            Os::Linux => data.linux_packages.push(pkg),
            Os::Windows => {}
        }
    }

    if data.macos_packages.len() == 1 && data.macos_packages[0].arch == Arch::Amd64 {
        data.has_only_amd64_macos_pkg = true;
    }

    data.macos_packages.sort_by(package_order);
    data.linux_packages.sort_by(package_order);

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::BrewRecipe;
    use async_trait::async_trait;
    use tapforge_artifact::{ArtifactKind, LiteralTemplater};
    use tapforge_core::CommitAuthor;
    use tapforge_hosting::Repo;
    use tempfile::TempDir;

    struct StubHost;

    #[async_trait]
    impl HostClient for StubHost {
        async fn create_file(
            &self,
            _author: &CommitAuthor,
            _repo: &Repo,
            _content: &[u8],
            _path: &str,
            _message: &str,
        ) -> Result<()> {
            Ok(())
        }

        fn release_url_template(&self) -> Result<String> {
            Ok("https://dl.example.com/${artifact}".to_string())
        }
    }

    fn resolved(recipe: BrewRecipe) -> ResolvedRecipe {
        recipe.resolved(&LiteralTemplater).unwrap()
    }

    fn stored_artifact(temp: &TempDir, name: &str, os: Os, arch: Arch) -> Artifact {
        let path = temp.path().join(name);
        std::fs::write(&path, name).unwrap();
        Artifact::new(name, path, ArtifactKind::UploadableBinary).with_platform(os, arch)
    }

    #[test]
    fn test_dependencies_sorted_by_name() {
        let temp = TempDir::new().unwrap();
        let recipe = BrewRecipe {
            name: "tool".to_string(),
            dependencies: vec![
                BrewDependency::new("zsh"),
                BrewDependency::new("bash"),
            ],
            ..BrewRecipe::default()
        };
        let art = stored_artifact(&temp, "tool", Os::Linux, Arch::Amd64);
        let ctx = ReleaseContext::new("tool", "1.0.0", temp.path());
        let data =
            assemble(&ctx, &resolved(recipe), &StubHost, &LiteralTemplater, &[art]).unwrap();
        let names: Vec<&str> = data.dependencies.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["bash", "zsh"]);
    }

    #[test]
    fn test_recipe_url_template_overrides_host() {
        let temp = TempDir::new().unwrap();
        let recipe = BrewRecipe {
            name: "tool".to_string(),
            url_template: "https://mirror.example.com/${artifact}".to_string(),
            ..BrewRecipe::default()
        };
        let art = stored_artifact(&temp, "tool", Os::Darwin, Arch::Arm64);
        let ctx = ReleaseContext::new("tool", "1.0.0", temp.path());
        let data =
            assemble(&ctx, &resolved(recipe), &StubHost, &LiteralTemplater, &[art]).unwrap();
        assert_eq!(
            data.macos_packages[0].download_url,
            "https://mirror.example.com/${artifact}"
        );
    }

    #[test]
    fn test_single_amd64_macos_package_sets_flag() {
        let temp = TempDir::new().unwrap();
        let art = stored_artifact(&temp, "tool", Os::Darwin, Arch::Amd64);
        let ctx = ReleaseContext::new("tool", "1.0.0", temp.path());
        let data = assemble(
            &ctx,
            &resolved(BrewRecipe::default()),
            &StubHost,
            &LiteralTemplater,
            &[art],
        )
        .unwrap();
        assert!(data.has_only_amd64_macos_pkg);
        assert_eq!(data.macos_packages.len(), 1);
        assert!(data.linux_packages.is_empty());
    }

    #[test]
    fn test_flag_unset_with_arm64_macos_package() {
        let temp = TempDir::new().unwrap();
        let art = stored_artifact(&temp, "tool", Os::Darwin, Arch::Arm64);
        let ctx = ReleaseContext::new("tool", "1.0.0", temp.path());
        let data = assemble(
            &ctx,
            &resolved(BrewRecipe::default()),
            &StubHost,
            &LiteralTemplater,
            &[art],
        )
        .unwrap();
        assert!(!data.has_only_amd64_macos_pkg);
    }

    #[test]
    fn test_duplicate_os_arch_is_hard_error() {
        let temp = TempDir::new().unwrap();
        let one = stored_artifact(&temp, "one", Os::Darwin, Arch::Arm64);
        let two = stored_artifact(&temp, "two", Os::Darwin, Arch::Arm64);
        let ctx = ReleaseContext::new("tool", "1.0.0", temp.path());
        let err = assemble(
            &ctx,
            &resolved(BrewRecipe::default()),
            &StubHost,
            &LiteralTemplater,
            &[one, two],
        )
        .unwrap_err();
        assert!(matches!(err, Error::AmbiguousOsArch { .. }));
    }

    #[test]
    fn test_checksum_failure_aborts() {
        let temp = TempDir::new().unwrap();
        let missing = Artifact::new("gone", temp.path().join("gone"), ArtifactKind::UploadableBinary)
            .with_platform(Os::Linux, Arch::Amd64);
        let ctx = ReleaseContext::new("tool", "1.0.0", temp.path());
        assert!(
            assemble(
                &ctx,
                &resolved(BrewRecipe::default()),
                &StubHost,
                &LiteralTemplater,
                &[missing],
            )
            .is_err()
        );
    }

    #[test]
    fn test_packages_sorted_descending() {
        let temp = TempDir::new().unwrap();
        let amd = stored_artifact(&temp, "amd", Os::Linux, Arch::Amd64);
        let arm = stored_artifact(&temp, "arm", Os::Linux, Arch::Arm64);
        let ctx = ReleaseContext::new("tool", "1.0.0", temp.path());
        let data = assemble(
            &ctx,
            &resolved(BrewRecipe::default()),
            &StubHost,
            &LiteralTemplater,
            &[amd, arm],
        )
        .unwrap();
        let archs: Vec<Arch> = data.linux_packages.iter().map(|p| p.arch).collect();
        // "arm64" > "amd64" in the descending string order
        assert_eq!(archs, vec![Arch::Arm64, Arch::Amd64]);
    }
}
