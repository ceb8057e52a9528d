use crate::artifact::{
    ArtifactError,
    distribution::{BitSize, Distribution, Platform},
};
use derive_more::Display;
use url::Url;

/// Archive format of a distribution package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveType {
    /// `.zip`
    Zip,
    /// `.tar.bz2`
    TarBz2,
}

impl ArchiveType {
    /// Archive type used for `platform`.
    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::OsX | Platform::Windows => Self::Zip,
            Platform::Linux | Platform::FreeBsd | Platform::Solaris => Self::TarBz2,
        }
    }

    /// File extension, including the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::TarBz2 => ".tar.bz2",
        }
    }
}

/// Role of a file inside a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// The program to run.
    Executable,
    /// A shared library the executable needs.
    Library,
    /// Any other file to extract.
    Support,
}

/// One expected file of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSetEntry {
    /// Role of the file.
    pub file_type: FileType,
    /// File name inside the archive.
    pub name: String,
}

/// Manifest of the files to pick from an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    entries: Vec<FileSetEntry>,
}

impl FileSet {
    /// Add an entry.
    #[must_use]
    pub fn with_entry(mut self, file_type: FileType, name: impl Into<String>) -> Self {
        self.entries.push(FileSetEntry {
            file_type,
            name: name.into(),
        });
        self
    }

    /// All entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[FileSetEntry] {
        &self.entries
    }

    /// The first executable entry.
    #[must_use]
    pub fn executable(&self) -> Option<&FileSetEntry> {
        self.entries
            .iter()
            .find(|entry| entry.file_type == FileType::Executable)
    }
}

/// Archive type, file manifest and relative archive path of a distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionPackage {
    /// Archive format.
    pub archive_type: ArchiveType,
    /// Files to extract.
    pub file_set: FileSet,
    /// Archive path relative to the download base and the artifact store.
    pub archive_path: String,
}

impl DistributionPackage {
    /// Package descriptor for `distribution`.
    ///
    /// Pure function of the platform and, on Linux-like systems, the bit
    /// size.
    #[must_use]
    pub fn for_distribution(distribution: &Distribution) -> Self {
        let archive_type = ArchiveType::for_platform(distribution.platform);
        let exec_name = match distribution.platform {
            Platform::Windows => "phantomjs.exe",
            _ => "phantomjs",
        };
        let platform_part = match distribution.platform {
            Platform::OsX => "macosx",
            Platform::Windows => "windows",
            _ => match distribution.bit_size {
                BitSize::B64 => "linux-x86_64",
                BitSize::B32 => "linux-i686",
            },
        };
        Self {
            archive_type,
            file_set: FileSet::default().with_entry(FileType::Executable, exec_name),
            archive_path: format!(
                "phantomjs-{}-{platform_part}{}",
                distribution.version.as_in_download_path(),
                archive_type.extension()
            ),
        }
    }
}

/// Base URL artifacts are downloaded from; archive paths are appended
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{_0}")]
pub struct DownloadPath(String);

impl DownloadPath {
    /// Download base, usually ending with `/`.
    pub fn of(base: impl Into<String>) -> Self {
        Self(base.into())
    }

    /// The base as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Download URL of `package` below `base`.
///
/// # Errors
/// [`ArtifactError::InvalidUrl`] if the concatenation is not a valid URL.
pub fn download_url(base: &DownloadPath, package: &DistributionPackage) -> Result<Url, ArtifactError> {
    let url = format!("{}{}", base.as_str(), package.archive_path);
    Url::parse(&url).map_err(|source| ArtifactError::InvalidUrl { url, source })
}
