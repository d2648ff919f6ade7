//! The immutable artifact record and its typed side-channel extras.

use crate::platform::{Arch, Os};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use tapforge_core::{Error, Result};

/// Well-known keys of the artifact extras side channel.
pub mod extra {
    /// Name of the binary inside a single-binary artifact.
    pub const BINARY: &str = "Binary";
    /// Names of the binaries bundled inside an archive artifact.
    pub const BINARIES: &str = "Binaries";
    /// Whether a universal binary replaced its single-arch inputs.
    pub const REPLACES: &str = "Replaces";
    /// Resolved recipe payload attached to a generated formula artifact.
    pub const BREW_RECIPE: &str = "BrewRecipe";
}

/// Kind of a build output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A compressed archive eligible for upload.
    UploadableArchive,
    /// A standalone binary eligible for upload.
    UploadableBinary,
    /// A plain build-output binary, not uploaded as-is.
    Binary,
    /// A checksums manifest.
    Checksum,
    /// A rendered package-manager formula.
    Formula,
}

/// One immutable build output with its platform and kind metadata.
///
/// Artifacts are created by upstream build stages and are read-only to this
/// engine; the only artifact it ever creates is the rendered formula, which
/// carries no target platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Identifying name (usually the file name)
    pub name: String,
    /// Filesystem path of the stored output
    pub path: PathBuf,
    /// Kind of the output
    pub kind: ArtifactKind,
    /// Target operating system, absent for platformless artifacts
    #[serde(default)]
    pub os: Option<Os>,
    /// Target architecture, absent for platformless artifacts
    #[serde(default)]
    pub arch: Option<Arch>,
    /// AMD64 microarchitecture level (e.g. "v1", "v3"), when relevant
    #[serde(default)]
    pub goamd64: String,
    /// ARM revision (e.g. "6", "7"), when relevant
    #[serde(default)]
    pub goarm: String,
    /// Archive compression format (e.g. "tar.gz", "zip"), empty for binaries
    #[serde(default)]
    pub format: String,
    /// Build id the artifact originated from
    #[serde(default)]
    pub id: String,
    /// Open-ended named extras
    #[serde(default)]
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl Artifact {
    /// Creates a new platformless artifact record.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: ArtifactKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            os: None,
            arch: None,
            goamd64: String::new(),
            goarm: String::new(),
            format: String::new(),
            id: String::new(),
            extras: BTreeMap::new(),
        }
    }

    /// Sets the target platform.
    #[must_use]
    pub const fn with_platform(mut self, os: Os, arch: Arch) -> Self {
        self.os = Some(os);
        self.arch = Some(arch);
        self
    }

    /// Sets the AMD64 microarchitecture level.
    #[must_use]
    pub fn with_goamd64(mut self, goamd64: impl Into<String>) -> Self {
        self.goamd64 = goamd64.into();
        self
    }

    /// Sets the ARM revision.
    #[must_use]
    pub fn with_goarm(mut self, goarm: impl Into<String>) -> Self {
        self.goarm = goarm.into();
        self
    }

    /// Sets the archive format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets the originating build id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Attaches a named extra, serialized as JSON.
    ///
    /// Values that fail to serialize are stored as null; the typed accessor
    /// reports the mismatch at read time.
    #[must_use]
    pub fn with_extra(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.extras.insert(key.to_string(), value);
        self
    }

    /// Returns a typed view of a named extra.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extra`] when the key is absent or the stored value
    /// does not deserialize into `T`.
    pub fn extra<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .extras
            .get(key)
            .ok_or_else(|| Error::extra(format!("artifact {} has no extra {key:?}", self.name)))?;
        serde_json::from_value(value.clone()).map_err(|e| {
            Error::extra(format!(
                "artifact {} extra {key:?} has unexpected shape: {e}",
                self.name
            ))
        })
    }

    /// Returns a typed view of a named extra, or the default when absent or
    /// mismatched.
    pub fn extra_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.extra(key).unwrap_or(default)
    }

    /// Computes the sha256 checksum of the artifact's stored bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read; the failure
    /// carries the artifact path.
    pub fn checksum_sha256(&self) -> Result<String> {
        let file = File::open(&self.path).map_err(|e| {
            Error::io_with_source(
                format!("failed to open artifact for checksum: {e}"),
                Some(self.path.clone()),
                e,
            )
        })?;
        let mut reader = BufReader::new(file);
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = reader.read(&mut buffer).map_err(|e| {
                Error::io_with_source(
                    format!("failed to read artifact for checksum: {e}"),
                    Some(self.path.clone()),
                    e,
                )
            })?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        let hash = hasher.finalize();
        Ok(hash.iter().map(|b| format!("{b:02x}")).collect())
    }
}
