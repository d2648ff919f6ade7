//! Target platform enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tapforge_core::Error;

/// Target operating system of a build output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// macOS
    Darwin,
    /// Linux
    Linux,
    /// Windows
    Windows,
}

impl Os {
    /// Returns the lowercase identifier used in filenames and templates.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Os {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "darwin" => Ok(Self::Darwin),
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            _ => Err(Error::config(
                format!("unknown OS: {s}"),
                "valid values: darwin, linux, windows",
            )),
        }
    }
}

/// Target architecture of a build output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// x86-64
    Amd64,
    /// 64-bit ARM
    Arm64,
    /// 32-bit ARM
    Arm,
    /// 32-bit x86
    #[serde(rename = "386")]
    I386,
    /// Universal binary covering several architectures
    All,
}

impl Arch {
    /// Returns the lowercase identifier used in filenames and templates.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::Arm => "arm",
            Self::I386 => "386",
            Self::All => "all",
        }
    }

    /// Whether this is the universal ("all") pseudo-architecture.
    #[must_use]
    pub const fn is_universal(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amd64" => Ok(Self::Amd64),
            "arm64" => Ok(Self::Arm64),
            "arm" => Ok(Self::Arm),
            "386" => Ok(Self::I386),
            "all" => Ok(Self::All),
            _ => Err(Error::config(
                format!("unknown architecture: {s}"),
                "valid values: amd64, arm64, arm, 386, all",
            )),
        }
    }
}
