//! Candidate artifact selection for one recipe.

use crate::recipe::BrewRecipe;
use tapforge_artifact::{Arch, Artifact, ArtifactKind, Filter, Os, Registry};
use tapforge_core::{Error, Result};

/// Archive formats the formula url stanza can point at.
const ACCEPTED_FORMATS: [&str; 2] = ["zip", "tar.gz"];

/// Builds the selection predicate for a recipe.
fn selection_filter(recipe: &BrewRecipe) -> Filter {
    let mut filters = vec![
        Filter::or(vec![Filter::ByOs(Os::Darwin), Filter::ByOs(Os::Linux)]),
        Filter::or(vec![
            Filter::and(vec![
                Filter::ByArch(Arch::Amd64),
                Filter::ByGoamd64(recipe.goamd64.clone()),
            ]),
            Filter::ByArch(Arch::Arm64),
            Filter::ByArch(Arch::All),
            Filter::and(vec![
                Filter::ByArch(Arch::Arm),
                Filter::ByGoarm(recipe.goarm.clone()),
            ]),
        ]),
        Filter::or(vec![
            Filter::and(vec![
                Filter::ByFormats(ACCEPTED_FORMATS.map(String::from).to_vec()),
                Filter::ByKind(ArtifactKind::UploadableArchive),
            ]),
            Filter::ByKind(ArtifactKind::UploadableBinary),
        ]),
        Filter::ReplacingUnibins,
    ];
    if !recipe.ids.is_empty() {
        filters.push(Filter::ByIds(recipe.ids.clone()));
    }
    Filter::and(filters)
}

/// Returns the artifacts eligible for the recipe's formula.
///
/// # Errors
///
/// Returns [`Error::NoCandidates`] carrying the microarchitecture level,
/// ARM revision and id allowlist in effect when nothing matches.
pub fn select_candidates(registry: &Registry, recipe: &BrewRecipe) -> Result<Vec<Artifact>> {
    let candidates = registry.filter(&selection_filter(recipe));
    if candidates.is_empty() {
        return Err(Error::NoCandidates {
            goamd64: recipe.goamd64.clone(),
            goarm: recipe.goarm.clone(),
            ids: recipe.ids.clone(),
        });
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> BrewRecipe {
        BrewRecipe {
            goamd64: "v1".to_string(),
            goarm: "6".to_string(),
            ..BrewRecipe::default()
        }
    }

    fn archive(name: &str, os: Os, arch: Arch) -> Artifact {
        Artifact::new(name, format!("/tmp/{name}"), ArtifactKind::UploadableArchive)
            .with_platform(os, arch)
            .with_format("tar.gz")
            .with_goamd64(if arch == Arch::Amd64 { "v1" } else { "" })
    }

    #[test]
    fn test_selects_darwin_and_linux_archives_only() {
        let registry = Registry::new();
        registry.add(archive("darwin.tar.gz", Os::Darwin, Arch::Arm64));
        registry.add(archive("linux.tar.gz", Os::Linux, Arch::Amd64));
        registry.add(archive("windows.zip", Os::Windows, Arch::Amd64).with_format("zip"));

        let selected = select_candidates(&registry, &recipe()).unwrap();
        assert_eq!(selected.len(), 2);
        assert!(
            selected
                .iter()
                .all(|a| matches!(a.os, Some(Os::Darwin | Os::Linux)))
        );
    }

    #[test]
    fn test_rejects_unaccepted_format() {
        let registry = Registry::new();
        registry.add(archive("a.tar.xz", Os::Linux, Arch::Arm64).with_format("tar.xz"));
        assert!(select_candidates(&registry, &recipe()).is_err());
    }

    #[test]
    fn test_uploadable_binary_passes_without_format() {
        let registry = Registry::new();
        registry.add(
            Artifact::new("tool", "/tmp/tool", ArtifactKind::UploadableBinary)
                .with_platform(Os::Darwin, Arch::Arm64),
        );
        assert_eq!(select_candidates(&registry, &recipe()).unwrap().len(), 1);
    }

    #[test]
    fn test_microarchitecture_level_gates_amd64() {
        let registry = Registry::new();
        registry.add(archive("v1.tar.gz", Os::Linux, Arch::Amd64));

        let mut v3 = recipe();
        v3.goamd64 = "v3".to_string();
        let err = select_candidates(&registry, &v3).unwrap_err();
        match err {
            Error::NoCandidates { goamd64, goarm, ids } => {
                assert_eq!(goamd64, "v3");
                assert_eq!(goarm, "6");
                assert!(ids.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_arm_revision_gates_arm() {
        let registry = Registry::new();
        registry.add(
            archive("armv7.tar.gz", Os::Linux, Arch::Arm)
                .with_goarm("7"),
        );
        assert!(select_candidates(&registry, &recipe()).is_err());

        let mut v7 = recipe();
        v7.goarm = "7".to_string();
        assert_eq!(select_candidates(&registry, &v7).unwrap().len(), 1);
    }

    #[test]
    fn test_id_allowlist() {
        let registry = Registry::new();
        registry.add(archive("cli.tar.gz", Os::Linux, Arch::Arm64).with_id("cli"));
        registry.add(archive("daemon.tar.gz", Os::Darwin, Arch::Arm64).with_id("daemon"));

        let mut restricted = recipe();
        restricted.ids = vec!["cli".to_string()];
        let selected = select_candidates(&registry, &restricted).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "cli");
    }

    #[test]
    fn test_error_carries_id_allowlist() {
        let registry = Registry::new();
        let mut restricted = recipe();
        restricted.ids = vec!["missing".to_string()];
        let err = select_candidates(&registry, &restricted).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_universal_binary_canonical_representative() {
        use tapforge_artifact::extra;
        let registry = Registry::new();
        registry.add(
            archive("universal.tar.gz", Os::Darwin, Arch::All).with_extra(extra::REPLACES, true),
        );
        registry.add(
            archive("extra-universal.tar.gz", Os::Darwin, Arch::All)
                .with_extra(extra::REPLACES, false),
        );

        let selected = select_candidates(&registry, &recipe()).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "universal.tar.gz");
    }
}
