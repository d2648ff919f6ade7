//! Install-instruction derivation.

use crate::recipe::BrewRecipe;
use std::collections::BTreeSet;
use tapforge_artifact::{Artifact, ArtifactKind, Templater, extra};
use tapforge_core::Result;
use tracing::debug;

/// Splits a (possibly templated, already substituted) block into lines.
///
/// Empty input yields no lines.
pub(crate) fn split_lines(s: &str) -> Vec<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.lines().map(str::to_string).collect()
}

/// Derives the ordered install-instruction lines for one artifact.
///
/// An explicit recipe install block (after substitution) is used verbatim
/// and suppresses inference entirely. Otherwise instructions are inferred
/// from the artifact kind: a standalone binary installs under its declared
/// name, an archive installs each bundled binary. Inferred lines are
/// deduplicated and sorted for determinism. Extra-install lines are
/// appended in both branches.
///
/// # Errors
///
/// Propagates substitution failures verbatim.
pub fn install_lines(
    recipe: &BrewRecipe,
    artifact: &Artifact,
    templater: &dyn Templater,
) -> Result<Vec<String>> {
    let extra_install = templater.apply_for_artifact(&recipe.extra_install, artifact)?;
    let install = templater.apply_for_artifact(&recipe.install, artifact)?;

    if !install.trim().is_empty() {
        let mut lines = split_lines(&install);
        lines.extend(split_lines(&extra_install));
        return Ok(lines);
    }

    let mut inferred = BTreeSet::new();
    match artifact.kind {
        ArtifactKind::UploadableBinary => {
            let bin = artifact.extra_or(extra::BINARY, artifact.name.clone());
            inferred.insert(format!("bin.install {:?} => {:?}", artifact.name, bin));
        }
        ArtifactKind::UploadableArchive => {
            for bin in artifact.extra_or::<Vec<String>>(extra::BINARIES, Vec::new()) {
                inferred.insert(format!("bin.install {bin:?}"));
            }
        }
        _ => {}
    }

    // BTreeSet iteration gives the sorted, deduplicated order.
    let mut lines: Vec<String> = inferred.into_iter().collect();
    debug!(install = ?lines, "guessing install");

    lines.extend(split_lines(&extra_install));
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapforge_artifact::{Arch, LiteralTemplater, Os};

    fn binary(name: &str) -> Artifact {
        Artifact::new(name, format!("/tmp/{name}"), ArtifactKind::UploadableBinary)
            .with_platform(Os::Darwin, Arch::Arm64)
    }

    fn archive(bins: &[&str]) -> Artifact {
        Artifact::new("tool.tar.gz", "/tmp/tool.tar.gz", ArtifactKind::UploadableArchive)
            .with_platform(Os::Linux, Arch::Amd64)
            .with_format("tar.gz")
            .with_extra(extra::BINARIES, bins)
    }

    #[test]
    fn test_explicit_install_suppresses_inference() {
        let recipe = BrewRecipe {
            install: "bin.install \"custom\"\nman1.install \"custom.1\"".to_string(),
            ..BrewRecipe::default()
        };
        let lines = install_lines(&recipe, &archive(&["tool"]), &LiteralTemplater).unwrap();
        assert_eq!(lines, vec!["bin.install \"custom\"", "man1.install \"custom.1\""]);
    }

    #[test]
    fn test_binary_installs_under_declared_name() {
        let art = binary("tool_v1").with_extra(extra::BINARY, "tool");
        let lines = install_lines(&BrewRecipe::default(), &art, &LiteralTemplater).unwrap();
        assert_eq!(lines, vec!["bin.install \"tool_v1\" => \"tool\""]);
    }

    #[test]
    fn test_binary_without_extra_uses_artifact_name() {
        let lines =
            install_lines(&BrewRecipe::default(), &binary("tool"), &LiteralTemplater).unwrap();
        assert_eq!(lines, vec!["bin.install \"tool\" => \"tool\""]);
    }

    #[test]
    fn test_archive_installs_each_bundled_binary_sorted() {
        let art = archive(&["zeta", "alpha", "zeta"]);
        let lines = install_lines(&BrewRecipe::default(), &art, &LiteralTemplater).unwrap();
        assert_eq!(lines, vec!["bin.install \"alpha\"", "bin.install \"zeta\""]);
    }

    #[test]
    fn test_other_kind_infers_nothing() {
        let art = Artifact::new("sums.txt", "/tmp/sums.txt", ArtifactKind::Checksum);
        let lines = install_lines(&BrewRecipe::default(), &art, &LiteralTemplater).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_extra_install_appended_after_inference() {
        let recipe = BrewRecipe {
            extra_install: "bash_completion.install \"completions/tool.bash\"".to_string(),
            ..BrewRecipe::default()
        };
        let lines = install_lines(&recipe, &archive(&["tool"]), &LiteralTemplater).unwrap();
        assert_eq!(
            lines,
            vec![
                "bin.install \"tool\"",
                "bash_completion.install \"completions/tool.bash\""
            ]
        );
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let art = archive(&["b", "a", "c"]);
        let first = install_lines(&BrewRecipe::default(), &art, &LiteralTemplater).unwrap();
        let second = install_lines(&BrewRecipe::default(), &art, &LiteralTemplater).unwrap();
        assert_eq!(first, second);
    }
}
