use crate::artifact::ArtifactError;
use log::{debug, info};
use std::{
    ffi::OsString,
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use url::Url;

/// Default minimum time between two progress reports.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Network timeouts of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Limit for establishing the connection.
    pub connect: Duration,
    /// Limit for receiving the response body.
    pub read: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            read: Duration::from_secs(60),
        }
    }
}

/// Settings of [`HttpFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Network timeouts.
    pub timeouts: TimeoutConfig,
    /// Minimum time between two progress reports.
    pub progress_interval: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeouts: TimeoutConfig::default(),
            progress_interval: PROGRESS_INTERVAL,
        }
    }
}

/// Receives `(bytes_copied, total_bytes)` while an artifact is downloaded.
///
/// `total` is `None` when the server does not announce a length.
pub trait DownloadProgress {
    /// Called at most once per progress interval, and once on completion.
    fn downloaded(&mut self, bytes_copied: u64, total: Option<u64>);
}

impl<F: FnMut(u64, Option<u64>)> DownloadProgress for F {
    fn downloaded(&mut self, bytes_copied: u64, total: Option<u64>) {
        self(bytes_copied, total);
    }
}

/// Progress listener that logs percentages at `info` level.
#[derive(Debug)]
pub struct LogProgress {
    label: String,
}

impl LogProgress {
    /// Listener prefixing every line with `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl DownloadProgress for LogProgress {
    fn downloaded(&mut self, bytes_copied: u64, total: Option<u64>) {
        match total {
            Some(total) if total > 0 => {
                info!("{}: {}%", self.label, bytes_copied * 100 / total);
            }
            _ => info!("{}: {bytes_copied} bytes", self.label),
        }
    }
}

/// Copy `reader` into `writer`, reporting progress at most once per
/// [`PROGRESS_INTERVAL`].
///
/// # Errors
/// I/O errors of either side.
pub fn copy_with_progress(
    reader: &mut impl Read,
    writer: &mut impl Write,
    total: Option<u64>,
    progress: &mut dyn DownloadProgress,
) -> std::io::Result<u64> {
    copy_with_progress_every(reader, writer, total, progress, PROGRESS_INTERVAL)
}

/// Copy `reader` into `writer`, reporting progress.
///
/// Two intermediate reports are at least `interval` apart, measured from the
/// end of one report to the start of the next. The final count is always
/// reported. Returns the number of bytes copied.
///
/// # Errors
/// I/O errors of either side.
pub fn copy_with_progress_every(
    reader: &mut impl Read,
    writer: &mut impl Write,
    total: Option<u64>,
    progress: &mut dyn DownloadProgress,
    interval: Duration,
) -> std::io::Result<u64> {
    let mut buf = [0u8; 64 * 1024];
    let mut copied = 0u64;
    let mut last_report = Instant::now();
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        copied += n as u64;
        if last_report.elapsed() >= interval {
            progress.downloaded(copied, total);
            last_report = Instant::now();
        }
    }
    writer.flush()?;
    progress.downloaded(copied, total);
    Ok(copied)
}

/// Transfers a remote artifact to a local path.
pub trait Fetch {
    /// Download `url` into `dest`, creating parent directories as needed.
    ///
    /// # Errors
    /// Transport and I/O failures.
    fn fetch(
        &self,
        url: &Url,
        dest: &Path,
        progress: &mut dyn DownloadProgress,
    ) -> Result<(), ArtifactError>;
}

/// [`Fetch`] over HTTP(S).
#[derive(Debug)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Fetcher with its own connection pool.
    #[must_use]
    pub fn new(config: FetchConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_connect(Some(config.timeouts.connect))
            .timeout_recv_body(Some(config.timeouts.read))
            .build()
            .into();
        Self { agent, config }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl Fetch for HttpFetcher {
    fn fetch(
        &self,
        url: &Url,
        dest: &Path,
        progress: &mut dyn DownloadProgress,
    ) -> Result<(), ArtifactError> {
        debug!("GET {url}");
        let response = self
            .agent
            .get(url.as_str())
            .header("User-Agent", self.config.user_agent.as_str())
            .call()?;
        let total = response
            .headers()
            .get("content-length")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        let mut reader = response.into_body().into_reader();

        // Written aside and renamed so an interrupted download never looks
        // complete to `use_or_download`.
        let tmp = partial_path(dest);
        if let Some(parent) = tmp.parent() {
            fs::create_dir_all(parent).map_err(|source| ArtifactError::io(parent, source))?;
        }
        let mut file = File::create(&tmp).map_err(|source| ArtifactError::io(&tmp, source))?;
        let copied = copy_with_progress_every(
            &mut reader,
            &mut file,
            total,
            progress,
            self.config.progress_interval,
        )
        .map_err(|source| ArtifactError::io(&tmp, source))?;
        drop(file);
        fs::rename(&tmp, dest).map_err(|source| ArtifactError::io(dest, source))?;
        debug!("{url}: {copied} bytes written to {}", dest.display());
        Ok(())
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".download");
    PathBuf::from(name)
}

/// Return `path` if it exists, otherwise download `url` into it first.
///
/// An existing file short-circuits without any network access.
///
/// # Errors
/// Whatever the fetcher fails with.
pub fn use_or_download(
    path: &Path,
    url: &Url,
    fetcher: &dyn Fetch,
) -> Result<PathBuf, ArtifactError> {
    if path.exists() {
        debug!("{} already present, skipping download", path.display());
        return Ok(path.to_path_buf());
    }
    let mut progress = LogProgress::new(url.as_str());
    fetcher.fetch(url, path, &mut progress)?;
    Ok(path.to_path_buf())
}
