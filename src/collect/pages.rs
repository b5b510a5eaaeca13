// src/collect/pages.rs
use tracing::{debug, info};

use super::render::render_inner_html;
use super::{settle, SweepOptions, SweepReport, TextAccumulator};
use crate::config::SiteRef;
use crate::error::SweepError;
use crate::graph::{GraphApi, WebPart};

/// For every site: `Site:` line, then per page a `Page:` line followed by
/// one `Content:` line per text web part.
pub async fn collect_page_text(
    graph: &dyn GraphApi,
    sites: &[SiteRef],
    options: &SweepOptions,
    acc: &mut TextAccumulator,
) -> Result<SweepReport, SweepError> {
    let mut report = SweepReport::new(sites.len());
    for site_ref in sites {
        let outcome = collect_site_pages(graph, site_ref, acc, &mut report).await;
        settle(site_ref, outcome, options, acc, &mut report)?;
    }
    info!(
        sites = report.sites_ok,
        pages = report.pages,
        text_blocks = report.text_blocks,
        failures = report.failures.len(),
        "page text collected"
    );
    Ok(report)
}

async fn collect_site_pages(
    graph: &dyn GraphApi,
    site_ref: &SiteRef,
    acc: &mut TextAccumulator,
    report: &mut SweepReport,
) -> Result<(), SweepError> {
    let site = graph.site_by_path(site_ref).await?;
    acc.push(0, format!("Site: {}", site.label()));

    let pages = graph.list_pages(&site.id).await?;
    debug!(site = %site_ref, pages = pages.len(), "listed pages");

    for page in pages {
        acc.push(1, format!("Page: {}", page.title.as_deref().unwrap_or_default()));
        report.pages += 1;

        let detail = graph.page_with_layout(&site.id, &page.id).await?;
        for part in detail.web_parts() {
            if let WebPart::Text { inner_html } = part {
                acc.push(2, format!("Content: {}", render_inner_html(inner_html)));
                report.text_blocks += 1;
            }
        }
    }
    Ok(())
}
