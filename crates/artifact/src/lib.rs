//! Artifact model, registry and selection filters for tapforge.
//!
//! Build stages upstream of tapforge produce [`Artifact`] records tagged
//! with platform and kind metadata and append them to the shared
//! [`Registry`]. The formula engine queries the registry through composable
//! [`Filter`] predicates, reads typed side-channel [`artifact::extra`]
//! attributes, and computes download checksums.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod artifact;
pub mod filter;
pub mod platform;
pub mod registry;
pub mod tmpl;

pub use artifact::{Artifact, ArtifactKind, extra};
pub use filter::Filter;
pub use platform::{Arch, Os};
pub use registry::Registry;
pub use tmpl::{LiteralTemplater, Templater};
