//! Recipe configuration and its resolution.

use serde::{Deserialize, Serialize};
use tapforge_artifact::Templater;
use tapforge_core::{CommitAuthor, ReleaseContext, Result};
use tapforge_hosting::RepoRef;

/// One formula dependency, optionally qualified (e.g. `:optional`,
/// `:build`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewDependency {
    /// Dependency formula name
    pub name: String,
    /// Qualifier appended as a Ruby symbol; empty for a plain dependency
    #[serde(rename = "type")]
    pub dep_type: String,
}

impl BrewDependency {
    /// Creates a plain dependency.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dep_type: String::new(),
        }
    }

    /// Creates a qualified dependency.
    #[must_use]
    pub fn with_type(name: impl Into<String>, dep_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dep_type: dep_type.into(),
        }
    }
}

/// Declarative definition of one Homebrew formula to generate and publish.
///
/// Most string fields may carry placeholder expressions for the external
/// substitution engine; they are resolved during a run, never in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewRecipe {
    /// Formula name; empty means the project name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Homepage URL
    pub homepage: String,
    /// License identifier
    pub license: String,
    /// Caveats text shown after install
    pub caveats: String,
    /// Upload policy: "", "true" or "auto"
    pub skip_upload: String,
    /// Explicit install block; when set, nothing is inferred
    pub install: String,
    /// Extra install lines appended after the explicit or inferred block
    pub extra_install: String,
    /// Post-install block
    pub post_install: String,
    /// Test block
    pub test: String,
    /// Service block
    pub service: String,
    /// `require_relative` target injected above the class
    pub custom_require: String,
    /// Free-form lines injected into the class body
    pub custom_block: String,
    /// Download strategy class name for the url stanzas
    pub download_strategy: String,
    /// Download URL template override; empty uses the hosting client's
    pub url_template: String,
    /// Commit message template
    pub commit_message_template: String,
    /// Commit author override
    pub commit_author: CommitAuthor,
    /// Folder inside the tap repository formulas live in
    pub directory: String,
    /// AMD64 microarchitecture level to select (default "v1")
    pub goamd64: String,
    /// ARM revision to select (default "6")
    pub goarm: String,
    /// Artifact-ID allowlist; empty means unrestricted
    pub ids: Vec<String>,
    /// Formula dependencies
    pub dependencies: Vec<BrewDependency>,
    /// Conflicting formulas
    pub conflicts: Vec<String>,
    /// Target tap repository
    pub repository: RepoRef,
}

impl BrewRecipe {
    /// Fills unset fields with their defaults.
    #[must_use]
    pub fn defaulted(mut self, ctx: &ReleaseContext) -> Self {
        if self.name.is_empty() {
            self.name = ctx.project_name.clone();
        }
        if self.commit_message_template.is_empty() {
            self.commit_message_template =
                "Brew formula update for ${project} version v${version}".to_string();
        }
        if self.goarm.is_empty() {
            self.goarm = "6".to_string();
        }
        if self.goamd64.is_empty() {
            self.goamd64 = "v1".to_string();
        }
        self.commit_author = self.commit_author.or_default();
        self
    }

    /// Resolves the templated selection-relevant fields into a final,
    /// immutable recipe.
    ///
    /// This is a pure step: the input recipe stays untouched and the
    /// resolved value is threaded explicitly to the assembler and publisher.
    ///
    /// # Errors
    ///
    /// Propagates substitution failures verbatim.
    pub fn resolved(&self, templater: &dyn Templater) -> Result<ResolvedRecipe> {
        Ok(ResolvedRecipe {
            name: templater.apply(&self.name)?,
            skip_upload: templater.apply(&self.skip_upload)?,
            repository: self.repository.resolved(templater)?,
            recipe: self.clone(),
        })
    }
}

/// A recipe with its templated name, skip policy and repository reference
/// resolved to final values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRecipe {
    /// Final formula name
    pub name: String,
    /// Final upload policy
    pub skip_upload: String,
    /// Final repository reference
    pub repository: RepoRef,
    /// The originating recipe
    pub recipe: BrewRecipe,
}

impl ResolvedRecipe {
    /// Returns the formula file name.
    #[must_use]
    pub fn formula_filename(&self) -> String {
        format!("{}.rb", self.name)
    }

    /// Returns the destination path inside the tap repository.
    #[must_use]
    pub fn formula_repo_path(&self) -> String {
        if self.recipe.directory.is_empty() {
            self.formula_filename()
        } else {
            format!("{}/{}", self.recipe.directory, self.formula_filename())
        }
    }
}

/// Top-level recipes configuration, as loaded from the surrounding
/// orchestrator's config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The recipes to run
    pub brews: Vec<BrewRecipe>,
}

impl Config {
    /// Parses a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the document does not parse.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            tapforge_core::Error::config(
                format!("invalid recipes configuration: {e}"),
                "check the [[brews]] tables",
            )
        })
    }
}
