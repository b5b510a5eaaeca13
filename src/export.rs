// src/export.rs
//! One export request end to end: token, sweep, temp file, bytes.

use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{error, info};

use crate::collect::{self, SweepOptions, SweepReport, TextAccumulator};
use crate::config::SiteList;
use crate::error::SweepError;
use crate::graph::GraphConnector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Page text of every site.
    SiteContent,
    /// Drive file listing of every site.
    SiteAttachments,
}

impl ExportKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportKind::SiteContent => "SiteContentDetails.txt",
            ExportKind::SiteAttachments => "SiteAttachmentDetails.txt",
        }
    }

    pub fn content_disposition(self) -> &'static str {
        match self {
            ExportKind::SiteContent => "attachment; filename=\"SiteContentDetails.txt\"",
            ExportKind::SiteAttachments => "attachment; filename=\"SiteAttachmentDetails.txt\"",
        }
    }

    pub fn operation(self) -> &'static str {
        match self {
            ExportKind::SiteContent => "site_content",
            ExportKind::SiteAttachments => "site_attachments",
        }
    }
}

#[derive(Debug)]
pub struct Export {
    pub kind: ExportKind,
    pub bytes: Vec<u8>,
    pub report: SweepReport,
}

pub async fn run_export(
    connector: &dyn GraphConnector,
    sites: &SiteList,
    options: &SweepOptions,
    kind: ExportKind,
) -> Result<Export, SweepError> {
    crate::metrics::ensure_described();
    let started = Instant::now();

    let result = sweep(connector, sites, options, kind).await;

    let ms = started.elapsed().as_secs_f64() * 1_000.0;
    histogram!("sweep_duration_ms", "operation" => kind.operation()).record(ms);
    let outcome = if result.is_ok() { "ok" } else { "error" };
    counter!("sweep_runs_total", "operation" => kind.operation(), "outcome" => outcome)
        .increment(1);

    match &result {
        Ok(export) => info!(
            operation = kind.operation(),
            bytes = export.bytes.len(),
            failures = export.report.failures.len(),
            elapsed_ms = ms as u64,
            "export finished"
        ),
        Err(e) => error!(operation = kind.operation(), error = %e, "export failed"),
    }
    result
}

async fn sweep(
    connector: &dyn GraphConnector,
    sites: &SiteList,
    options: &SweepOptions,
    kind: ExportKind,
) -> Result<Export, SweepError> {
    let graph = connector.connect().await?;
    let mut acc = TextAccumulator::new();
    let report = match kind {
        ExportKind::SiteContent => {
            collect::collect_page_text(graph.as_ref(), sites.as_slice(), options, &mut acc).await?
        }
        ExportKind::SiteAttachments => {
            collect::collect_drive_files(graph.as_ref(), sites.as_slice(), options, &mut acc)
                .await?
        }
    };
    let bytes = flush_through_temp_file(&acc).await?;
    Ok(Export { kind, bytes, report })
}

/// Write the accumulated text to a request-scoped temp file and read it
/// back; the file is removed when dropped.
pub async fn flush_through_temp_file(acc: &TextAccumulator) -> Result<Vec<u8>, SweepError> {
    let tmp = tempfile::NamedTempFile::new()?;
    tokio::fs::write(tmp.path(), acc.render()).await?;
    let bytes = tokio::fs::read(tmp.path()).await?;
    Ok(bytes)
}
