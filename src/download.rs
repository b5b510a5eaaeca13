// src/download.rs
//! Streams a file from a pre-authenticated download URL to local disk.

use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::error::SweepError;

/// Default gap allowed between two body chunks.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct FileDownloader {
    http: Client,
    idle_timeout: Duration,
}

impl FileDownloader {
    /// No whole-request deadline: large files may stream as long as they
    /// need, but every chunk must arrive within `idle_timeout`.
    pub fn new(idle_timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent("sharepoint-content-export/0.1")
            .connect_timeout(Duration::from_secs(10).min(idle_timeout))
            .build()?;
        Ok(Self { http, idle_timeout })
    }

    pub fn from_client(http: Client) -> Self {
        Self {
            http,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// GET `url` and write the body to `dest`, returning the byte count.
    ///
    /// The body goes to a temp file next to `dest` and is renamed over it
    /// only once complete, so on any failure an existing `dest` keeps its
    /// content and a missing one stays missing. Calling again re-downloads.
    pub async fn download_file(&self, url: &str, dest: &Path) -> Result<u64, SweepError> {
        let mut resp = self.idle(url, self.http.get(url).send()).await??;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SweepError::status(url, status.as_u16(), &body));
        }

        let dir = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        tokio::fs::create_dir_all(dir).await?;
        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        let mut out = tokio::fs::File::from_std(tmp.reopen()?);

        let mut written = 0u64;
        while let Some(chunk) = self.idle(url, resp.chunk()).await?? {
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        out.flush().await?;
        out.sync_all().await?;
        drop(out);

        tmp.persist(dest)?;
        Ok(written)
    }

    async fn idle<F: std::future::Future>(
        &self,
        url: &str,
        fut: F,
    ) -> Result<F::Output, SweepError> {
        tokio::time::timeout(self.idle_timeout, fut)
            .await
            .map_err(|_| SweepError::DownloadStalled {
                url: url.to_string(),
                idle_secs: self.idle_timeout.as_secs(),
            })
    }
}

/// Where a drive sweep drops downloaded files.
#[derive(Clone, Debug)]
pub struct DownloadTarget {
    pub downloader: FileDownloader,
    pub dir: PathBuf,
}

impl DownloadTarget {
    /// `dir/<rel>/<last path component of name>`; `None` for names like `..`.
    /// `rel` mirrors site, drive and folder so equal names don't collide.
    pub fn destination_for(&self, rel: &Path, name: &str) -> Option<PathBuf> {
        Some(self.dir.join(rel).join(path_segment(name)?))
    }
}

/// One safe path component from a remote name.
pub fn path_segment(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\', ':']).next()?.trim();
    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    Some(base.to_string())
}
