// src/config/mod.rs
//! Runtime configuration, read from the environment (after `.env` in dev)
//! plus the site list file.

pub mod azure;
pub mod sites;

use std::path::PathBuf;
use std::str::FromStr;

use crate::collect::{FailurePolicy, SweepOptions, DEFAULT_MAX_DEPTH};
use crate::download::{DownloadTarget, FileDownloader};

pub use azure::{AzureAdConfig, GraphSettings};
pub use sites::{SiteList, SiteRef};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub azure: AzureAdConfig,
    pub graph: GraphSettings,
    pub sites: SiteList,
    pub max_depth: usize,
    pub failure_policy: FailurePolicy,
    /// When set, drive sweeps also download every listed file here.
    pub download_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let failure_policy = match std::env::var("SWEEP_FAILURE_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => FailurePolicy::default(),
        };
        let download_dir = std::env::var("DOWNLOAD_DIR")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            azure: AzureAdConfig::from_env()?,
            graph: GraphSettings::from_env(),
            sites: sites::load_sites_default()?,
            max_depth: parse_env("DRIVE_MAX_DEPTH", DEFAULT_MAX_DEPTH),
            failure_policy,
            download_dir,
        })
    }

    pub fn sweep_options(&self) -> anyhow::Result<SweepOptions> {
        let downloads = match &self.download_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                // GRAPH_TIMEOUT_SECS bounds the gap between chunks, not the whole file.
                Some(DownloadTarget {
                    downloader: FileDownloader::new(self.graph.timeout)?,
                    dir: dir.clone(),
                })
            }
            None => None,
        };
        Ok(SweepOptions {
            max_depth: self.max_depth,
            failure_policy: self.failure_policy,
            downloads,
        })
    }
}

/// Parse an optional env var, falling back (with a warning) on garbage.
pub(crate) fn parse_env<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, fallback = %default, "invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
