//! Resolve a phantomjs distribution for this platform, download it into a
//! temporary artifact store and print where it landed.

use anyhow::{Context, Result};
use clap::Parser;
use route_graph::artifact::{
    ArtifactRoutes,
    distribution::Version,
    fetch::{FetchConfig, HttpFetcher, TimeoutConfig},
    package::DownloadPath,
};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Version to fetch.
    #[arg(long, env = "ARTIFACT_VERSION", default_value = "2.1.1")]
    artifact_version: String,
    /// Download base URL; the archive name is appended verbatim.
    #[arg(
        long,
        env = "ARTIFACT_BASE_URL",
        default_value = "https://bitbucket.org/ariya/phantomjs/downloads/"
    )]
    base_url: String,
    /// `User-Agent` header.
    #[arg(long, env = "ARTIFACT_USER_AGENT")]
    user_agent: Option<String>,
    /// Connect timeout in seconds.
    #[arg(long, default_value_t = 10)]
    connect_timeout: u64,
    /// Read timeout in seconds.
    #[arg(long, default_value_t = 60)]
    read_timeout: u64,
    /// Print the route graph in DOT format and exit.
    #[arg(long)]
    dot: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = FetchConfig {
        timeouts: TimeoutConfig {
            connect: Duration::from_secs(cli.connect_timeout),
            read: Duration::from_secs(cli.read_timeout),
        },
        ..FetchConfig::default()
    };
    if let Some(user_agent) = cli.user_agent {
        config.user_agent = user_agent;
    }

    let routes = ArtifactRoutes::default();
    let graph = routes
        .graph(
            Version::of(cli.artifact_version),
            DownloadPath::of(cli.base_url),
            HttpFetcher::new(config),
        )
        .context("build artifact routes")?;
    if cli.dot {
        print!("{}", graph.to_dot());
        return Ok(());
    }

    let store = graph
        .open(&routes.artifact_store)
        .context("allocate artifact store")?;
    for _ in 0..2 {
        let downloaded = store
            .open(&routes.downloaded_artifact_path)
            .context("download artifact")?;
        println!("current: {}", downloaded.current().display());
        downloaded.close().context("release download scope")?;
    }
    store.close().context("release artifact store")?;
    Ok(())
}
