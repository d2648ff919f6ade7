//! Boundary trait for the external placeholder-substitution engine.
//!
//! tapforge consumes a substitution micro-language (release and environment
//! placeholders inside recipe fields) but does not implement it. The engine
//! plugs in through [`Templater`]; tests use the in-crate stubs.

use crate::artifact::Artifact;
use tapforge_core::Result;

/// Applies placeholder substitution to template strings.
///
/// Implementations must be pure with respect to their inputs: the same
/// template and scope always produce the same output.
pub trait Templater: Send + Sync {
    /// Substitutes placeholders in `template` using release-level scope.
    ///
    /// # Errors
    ///
    /// Returns a templating error, surfaced verbatim from the engine.
    fn apply(&self, template: &str) -> Result<String>;

    /// Substitutes placeholders with an additional per-artifact scope
    /// (artifact name, OS, architecture and friends).
    ///
    /// # Errors
    ///
    /// Returns a templating error, surfaced verbatim from the engine.
    fn apply_for_artifact(&self, template: &str, artifact: &Artifact) -> Result<String>;
}

/// Pass-through templater: returns templates unchanged.
///
/// Useful when recipes carry no placeholder expressions, and as the default
/// in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiteralTemplater;

impl Templater for LiteralTemplater {
    fn apply(&self, template: &str) -> Result<String> {
        Ok(template.to_string())
    }

    fn apply_for_artifact(&self, template: &str, _artifact: &Artifact) -> Result<String> {
        Ok(template.to_string())
    }
}
