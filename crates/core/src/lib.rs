//! Shared types for the tapforge workspace.
//!
//! This crate holds the pieces every other tapforge crate needs:
//!
//! - [`error`] - the workspace-wide error enum and [`Result`] alias
//! - [`context`] - the read-only release context and commit author identity
//! - [`skip`] - the non-fatal skip signal batched across recipes

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod context;
pub mod error;
pub mod skip;

pub use context::{CommitAuthor, ReleaseContext};
pub use error::{Error, Result};
pub use skip::SkipSet;
