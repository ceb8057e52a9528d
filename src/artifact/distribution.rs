use crate::artifact::ArtifactError;
use derive_more::Display;

/// Version of a distributed artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct Version(String);

impl Version {
    /// Version from its textual form, e.g. `"2.1.1"`.
    pub fn of(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// The version as it appears in download paths.
    #[must_use]
    pub fn as_in_download_path(&self) -> &str {
        &self.0
    }
}

/// Operating system family a distribution targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Platform {
    /// Linux.
    Linux,
    /// Microsoft Windows.
    Windows,
    /// macOS.
    OsX,
    /// FreeBSD.
    FreeBsd,
    /// Solaris and illumos.
    Solaris,
}

impl Platform {
    /// Platform of the running process.
    ///
    /// # Errors
    /// [`ArtifactError::UnsupportedPlatform`] for any other OS.
    pub fn detect() -> Result<Self, ArtifactError> {
        Self::from_os(std::env::consts::OS)
    }

    fn from_os(os: &str) -> Result<Self, ArtifactError> {
        match os {
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            "macos" => Ok(Self::OsX),
            "freebsd" => Ok(Self::FreeBsd),
            "solaris" | "illumos" => Ok(Self::Solaris),
            other => Err(ArtifactError::UnsupportedPlatform(format!("os `{other}`"))),
        }
    }
}

/// Pointer width of a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BitSize {
    /// 32 bit.
    B32,
    /// 64 bit.
    B64,
}

impl BitSize {
    /// Bit size of the running process.
    ///
    /// # Errors
    /// [`ArtifactError::UnsupportedPlatform`] for unknown architectures.
    pub fn detect() -> Result<Self, ArtifactError> {
        match std::env::consts::ARCH {
            "x86_64" | "aarch64" | "powerpc64" | "s390x" | "riscv64" => Ok(Self::B64),
            "x86" | "arm" | "powerpc" => Ok(Self::B32),
            other => Err(ArtifactError::UnsupportedPlatform(format!("arch `{other}`"))),
        }
    }
}

/// A version tagged with the platform and bit size it is distributed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{version}:{platform}:{bit_size}")]
pub struct Distribution {
    /// Artifact version.
    pub version: Version,
    /// Target OS.
    pub platform: Platform,
    /// Target pointer width.
    pub bit_size: BitSize,
}

impl Distribution {
    /// Explicit distribution.
    #[must_use]
    pub fn new(version: Version, platform: Platform, bit_size: BitSize) -> Self {
        Self {
            version,
            platform,
            bit_size,
        }
    }

    /// Distribution of `version` for the running process.
    ///
    /// # Errors
    /// [`ArtifactError::UnsupportedPlatform`] if the OS or architecture is
    /// not supported.
    pub fn detect_for(version: &Version) -> Result<Self, ArtifactError> {
        Ok(Self::new(version.clone(), Platform::detect()?, BitSize::detect()?))
    }
}

