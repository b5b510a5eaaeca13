// src/collect/mod.rs
//! Site sweeps. Both walk the site list in order, calling Graph
//! sequentially, and append human-readable lines to one accumulator.

pub mod drives;
pub mod pages;
pub mod render;

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::config::SiteRef;
use crate::download::DownloadTarget;
use crate::error::SweepError;

pub use drives::collect_drive_files;
pub use pages::collect_page_text;

/// Deepest folder level a drive walk will enter (root = 0).
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What happens when one site fails mid-sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// First failure fails the whole sweep; nothing is delivered.
    #[default]
    Abort,
    /// Record the failure, note it in the output, move on to the next site.
    Isolate,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" | "" => Ok(FailurePolicy::Abort),
            "isolate" => Ok(FailurePolicy::Isolate),
            other => anyhow::bail!("unknown failure policy '{other}' (expected abort|isolate)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub max_depth: usize,
    pub failure_policy: FailurePolicy,
    /// Drive sweeps download each listed file when set.
    pub downloads: Option<DownloadTarget>,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            failure_policy: FailurePolicy::Abort,
            downloads: None,
        }
    }
}

/// Append-only, ordered text lines for one request.
#[derive(Debug, Clone, Default)]
pub struct TextAccumulator {
    lines: Vec<String>,
}

impl TextAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a line prefixed with `indent` tabs.
    pub fn push(&mut self, indent: usize, text: impl fmt::Display) {
        self.lines.push(format!("{}{}", "\t".repeat(indent), text));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Every line terminated by `\n`; empty accumulator renders as "".
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFailure {
    pub site: SiteRef,
    pub message: String,
}

/// Counts for one sweep plus any isolated failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub sites_total: usize,
    pub sites_ok: usize,
    pub pages: usize,
    pub text_blocks: usize,
    pub drives: usize,
    pub folders: usize,
    pub files: usize,
    pub downloads_ok: usize,
    pub downloads_failed: usize,
    pub failures: Vec<SiteFailure>,
}

impl SweepReport {
    fn new(sites_total: usize) -> Self {
        Self {
            sites_total,
            ..Self::default()
        }
    }
}

/// Apply the failure policy to one site's outcome.
fn settle(
    site: &SiteRef,
    outcome: Result<(), SweepError>,
    options: &SweepOptions,
    acc: &mut TextAccumulator,
    report: &mut SweepReport,
) -> Result<(), SweepError> {
    match outcome {
        Ok(()) => {
            report.sites_ok += 1;
            Ok(())
        }
        Err(e) => match options.failure_policy {
            FailurePolicy::Abort => Err(e),
            FailurePolicy::Isolate => {
                warn!(site = %site, error = %e, "site failed; continuing");
                acc.push(1, format!("Error: {site}: {e}"));
                report.failures.push(SiteFailure {
                    site: site.clone(),
                    message: e.to_string(),
                });
                Ok(())
            }
        },
    }
}
