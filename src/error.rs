// src/error.rs
//! Single failure type for a sweep: token exchange, Graph calls, decoding,
//! local I/O and traversal guards all collapse into `SweepError`.

use thiserror::Error;

/// Max body characters kept when a remote call answers with a non-success status.
const BODY_SNIPPET_CHARS: usize = 300;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("token request failed with status {status}: {body}")]
    Token { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} returned status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("drive {drive_id} is nested deeper than {max_depth} folders")]
    DepthExceeded { drive_id: String, max_depth: usize },

    #[error("drive {drive_id} lists folder {item_id} inside itself")]
    Cycle { drive_id: String, item_id: String },

    #[error("{url} keeps paging: {reason}")]
    Pagination { url: String, reason: String },

    #[error("download from {url} stalled: no data for {idle_secs}s")]
    DownloadStalled { url: String, idle_secs: u64 },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl SweepError {
    pub fn status(url: &str, status: u16, body: &str) -> Self {
        SweepError::Status {
            url: url.to_string(),
            status,
            body: snippet(body),
        }
    }
}

pub(crate) fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_SNIPPET_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(BODY_SNIPPET_CHARS).collect();
    out.push('…');
    out
}

impl From<tempfile::PersistError> for SweepError {
    fn from(e: tempfile::PersistError) -> Self {
        SweepError::Io(e.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_body_is_truncated() {
        let long = "x".repeat(1000);
        let err = SweepError::status("https://graph.test/sites", 500, &long);
        let msg = err.to_string();
        assert!(msg.starts_with("https://graph.test/sites returned status 500: "));
        assert!(msg.ends_with('…'));
        assert!(msg.chars().count() < 400);
    }
}
