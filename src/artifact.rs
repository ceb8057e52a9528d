/// Versions tagged with the platform they are distributed for.
pub mod distribution;
/// Idempotent artifact download with progress reporting.
pub mod fetch;
/// Archive descriptors and download URLs.
pub mod package;
/// Temporary artifact store and recursive deletion.
pub mod workspace;

use crate::{
    artifact::{
        distribution::{Distribution, Version},
        fetch::{Fetch, use_or_download},
        package::{DistributionPackage, DownloadPath, download_url},
        workspace::artifact_store,
    },
    error::{Failure, RouteError},
    graph::RouteGraph,
    rule::Rule,
    types::TypeKey,
    value::Value,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Error kind of the artifact rules.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArtifactError {
    /// The running OS or architecture has no distribution.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),
    /// A download URL could not be built.
    #[error("invalid download url `{url}`")]
    InvalidUrl {
        /// The rejected URL text.
        url: String,
        /// Why it was rejected.
        #[source]
        source: url::ParseError,
    },
    /// The HTTP transfer failed.
    #[error("download failed")]
    Http(#[from] ureq::Error),
    /// A filesystem operation failed.
    #[error("i/o error on {}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A directory entry could not be visited.
    #[error("could not walk directory tree")]
    Walk(#[from] walkdir::Error),
}

impl ArtifactError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Slots of the artifact download graph.
///
/// ```text
/// Version -> Distribution -> DistributionPackage
/// (DownloadPath, DistributionPackage) -> Url
/// (artifactStore, DistributionPackage) -> artifactPath
/// (artifactPath, Url) -> downloadedArtifactPath
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactRoutes {
    /// Requested version.
    pub version: TypeKey<Version>,
    /// Temporary directory holding downloads; deleted on release.
    pub artifact_store: TypeKey<PathBuf>,
    /// Base URL of downloads.
    pub download_path: TypeKey<DownloadPath>,
    /// Version tagged with platform and bit size.
    pub distribution: TypeKey<Distribution>,
    /// Archive descriptor.
    pub package: TypeKey<DistributionPackage>,
    /// Full download URL.
    pub download_url: TypeKey<Url>,
    /// Where the archive is stored locally.
    pub artifact_path: TypeKey<PathBuf>,
    /// `artifact_path`, after ensuring the archive is there.
    pub downloaded_artifact_path: TypeKey<PathBuf>,
}

impl Default for ArtifactRoutes {
    fn default() -> Self {
        Self {
            version: TypeKey::of(),
            artifact_store: TypeKey::named("artifactStore"),
            download_path: TypeKey::of(),
            distribution: TypeKey::of(),
            package: TypeKey::of(),
            download_url: TypeKey::of(),
            artifact_path: TypeKey::named("artifactPath"),
            downloaded_artifact_path: TypeKey::named("downloadedArtifactPath"),
        }
    }
}

impl ArtifactRoutes {
    /// Graph for the running platform.
    ///
    /// # Errors
    /// Graph construction errors; none occur for this fixed rule set.
    pub fn graph(
        &self,
        version: Version,
        download_path: DownloadPath,
        fetcher: impl Fetch + 'static,
    ) -> Result<RouteGraph, RouteError> {
        self.graph_with(version, download_path, Distribution::detect_for, fetcher)
    }

    /// Graph with an explicit distribution resolver.
    ///
    /// # Errors
    /// Graph construction errors; none occur for this fixed rule set.
    pub fn graph_with(
        &self,
        version: Version,
        download_path: DownloadPath,
        resolve: impl Fn(&Version) -> Result<Distribution, ArtifactError> + 'static,
        fetcher: impl Fetch + 'static,
    ) -> Result<RouteGraph, RouteError> {
        RouteGraph::builder()
            .add(Rule::start(&self.version, move || Ok(Value::of(version.clone()))))?
            .add(Rule::start(&self.artifact_store, artifact_store))?
            .add(Rule::start(&self.download_path, move || {
                Ok(Value::of(download_path.clone()))
            }))?
            .add(Rule::bridge(&self.version, &self.distribution, move |version| {
                resolve(version).map(Value::of).map_err(Failure::new)
            }))?
            .add(Rule::bridge(&self.distribution, &self.package, |distribution| {
                Ok(Value::of(DistributionPackage::for_distribution(distribution)))
            }))?
            .add(Rule::merge(
                &self.download_path,
                &self.package,
                &self.download_url,
                |base, package| download_url(base, package).map(Value::of).map_err(Failure::new),
            ))?
            .add(Rule::merge(
                &self.artifact_store,
                &self.package,
                &self.artifact_path,
                |store, package| Ok(Value::of(store.join(&package.archive_path))),
            ))?
            .add(Rule::merge(
                &self.artifact_path,
                &self.download_url,
                &self.downloaded_artifact_path,
                move |path, url| {
                    use_or_download(path, url, &fetcher)
                        .map(Value::of)
                        .map_err(Failure::new)
                },
            ))?
            .build()
    }
}
