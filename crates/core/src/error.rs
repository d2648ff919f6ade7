//! Error types shared across the tapforge workspace.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tapforge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while synthesizing or publishing formulas.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Invalid or incomplete recipe configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(code(tapforge::config), help("{help}"))]
    Config {
        /// The error message
        message: String,
        /// Help text for the user
        help: String,
    },

    /// No artifacts matched the recipe's selection filters.
    #[error(
        "no linux/macos archives found matching goos=[darwin linux] goarch=[amd64 arm64 arm] goamd64={goamd64} goarm={goarm} ids={ids:?}"
    )]
    #[diagnostic(
        code(tapforge::no_candidates),
        help(
            "Check that the build produced uploadable archives or binaries for the configured platforms, or widen the recipe's ids allowlist"
        )
    )]
    NoCandidates {
        /// Microarchitecture level the selection was restricted to
        goamd64: String,
        /// ARM revision the selection was restricted to
        goarm: String,
        /// Artifact-ID allowlist in effect (empty means unrestricted)
        ids: Vec<String>,
    },

    /// Two artifacts landed on the same (OS, architecture) slot.
    #[error("one tap can handle only one archive per OS/arch combination, got a duplicate for {os}/{arch}")]
    #[diagnostic(
        code(tapforge::ambiguous_os_arch),
        help("Use the recipe's ids allowlist to narrow the artifact set down to one archive per platform")
    )]
    AmbiguousOsArch {
        /// The conflicting OS
        os: String,
        /// The conflicting architecture
        arch: String,
    },

    /// A hosting client lacks a required capability.
    #[error("Capability error: {message}")]
    #[diagnostic(code(tapforge::capability))]
    Capability {
        /// The error message
        message: String,
    },

    /// Placeholder substitution failed.
    #[error("Template error: {message}")]
    #[diagnostic(
        code(tapforge::template),
        help("Check the placeholder expressions in the recipe field being resolved")
    )]
    Template {
        /// The error message, verbatim from the substitution engine
        message: String,
    },

    /// A typed artifact extra was missing or had the wrong shape.
    #[error("Artifact extra error: {message}")]
    #[diagnostic(code(tapforge::extra))]
    Extra {
        /// The error message
        message: String,
    },

    /// Git transport failure.
    #[error("Git error: {message}")]
    #[diagnostic(code(tapforge::git))]
    Git {
        /// The error message
        message: String,
    },

    /// Hosting API failure.
    #[error("Hosting error: {message}")]
    #[diagnostic(code(tapforge::host))]
    Host {
        /// The error message
        message: String,
    },

    /// I/O failure wrapped with the operation context.
    #[error("I/O error: {message}")]
    #[diagnostic(code(tapforge::io))]
    IoContext {
        /// The error message
        message: String,
        /// The path the operation touched
        path: Option<PathBuf>,
        /// The underlying source error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Wrapped I/O error without extra context.
    #[error("I/O error: {0}")]
    #[diagnostic(code(tapforge::io))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a new capability error.
    #[must_use]
    pub fn capability(message: impl Into<String>) -> Self {
        Self::Capability {
            message: message.into(),
        }
    }

    /// Create a new template error.
    #[must_use]
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create a new artifact-extra error.
    #[must_use]
    pub fn extra(message: impl Into<String>) -> Self {
        Self::Extra {
            message: message.into(),
        }
    }

    /// Create a new git transport error.
    #[must_use]
    pub fn git(message: impl Into<String>) -> Self {
        Self::Git {
            message: message.into(),
        }
    }

    /// Create a new hosting API error.
    #[must_use]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }

    /// Create a new I/O error with operation context.
    #[must_use]
    pub fn io(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::IoContext {
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a new I/O error with operation context and source.
    #[must_use]
    pub fn io_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::IoContext {
            message: message.into(),
            path,
            source: Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_candidates_carries_diagnostics() {
        let err = Error::NoCandidates {
            goamd64: "v3".to_string(),
            goarm: "7".to_string(),
            ids: vec!["cli".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("goamd64=v3"));
        assert!(msg.contains("goarm=7"));
        assert!(msg.contains("cli"));
    }

    #[test]
    fn test_ambiguous_os_arch_message() {
        let err = Error::AmbiguousOsArch {
            os: "darwin".to_string(),
            arch: "arm64".to_string(),
        };
        assert!(err.to_string().contains("darwin/arm64"));
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("repository name is empty", "set repository.name");
        assert!(err.to_string().contains("repository name is empty"));
    }

    #[test]
    fn test_capability_error() {
        let err = Error::capability("client does not support pull requests");
        assert!(err.to_string().contains("pull requests"));
    }

    #[test]
    fn test_io_error_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::io_with_source(
            "failed to read formula",
            Some(PathBuf::from("dist/foo.rb")),
            io_err,
        );
        assert!(err.to_string().contains("failed to read formula"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }
}
