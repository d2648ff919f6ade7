//! Homebrew formula synthesis and tap publication.
//!
//! The engine turns already-built release artifacts into a Homebrew formula
//! and pushes it to a tap repository. A run goes through five stages:
//! candidate [selection](select), install-instruction
//! [derivation](install), rendering-context [assembly](data), two-pass
//! [rendering](template), and [publication](publish). [`run_all`] drives
//! the first four per recipe and registers the rendered formula as a new
//! artifact; [`publish_all`] pushes every registered formula, batching skip
//! reasons across recipes.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod data;
pub mod install;
pub mod pipe;
pub mod publish;
pub mod recipe;
pub mod select;
pub mod template;

pub use data::{FormulaContext, ReleasePackage, assemble};
pub use install::install_lines;
pub use pipe::{RunOutcome, run_all, run_recipe};
pub use publish::{PublishOutcome, publish_all, publish_formula};
pub use recipe::{BrewDependency, BrewRecipe, Config, ResolvedRecipe};
pub use select::select_candidates;
pub use template::{formula_class_name, render, sanitize};
