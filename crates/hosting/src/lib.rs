//! Version-control hosting clients for tapforge.
//!
//! Publication goes through the [`HostClient`] seam: a base capability set
//! (single-file commit, release download URL template) plus an explicit
//! optional [`PullRequestOpener`] capability. Two transports are provided:
//!
//! - [`GithubClient`] - token-scoped hosting API client (commit + pull
//!   requests)
//! - [`GitTransportClient`] - plain git protocol, commit only
//!
//! The [`client_for`] factory picks the transport for a resolved
//! [`RepoRef`].

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod client;
pub mod git;
pub mod github;
pub mod repo;

pub use client::{HostClient, PullRequestOpener, client_for};
pub use git::GitTransportClient;
pub use github::GithubClient;
pub use repo::{PullRequestBase, PullRequestRef, Repo, RepoRef};
