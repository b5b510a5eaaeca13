// src/collect/drives.rs
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{settle, SweepOptions, SweepReport, TextAccumulator};
use crate::config::SiteRef;
use crate::download::{path_segment, DownloadTarget};
use crate::error::SweepError;
use crate::graph::{DriveItem, GraphApi};

/// For every site: `Site:` line, then a `File Name:` / `Download URL:` pair
/// per downloadable file, drive by drive, folders walked depth-first.
pub async fn collect_drive_files(
    graph: &dyn GraphApi,
    sites: &[SiteRef],
    options: &SweepOptions,
    acc: &mut TextAccumulator,
) -> Result<SweepReport, SweepError> {
    let mut report = SweepReport::new(sites.len());
    for site_ref in sites {
        let outcome = collect_site_drives(graph, site_ref, options, acc, &mut report).await;
        settle(site_ref, outcome, options, acc, &mut report)?;
    }
    info!(
        sites = report.sites_ok,
        drives = report.drives,
        folders = report.folders,
        files = report.files,
        downloads_ok = report.downloads_ok,
        downloads_failed = report.downloads_failed,
        failures = report.failures.len(),
        "drive files collected"
    );
    Ok(report)
}

async fn collect_site_drives(
    graph: &dyn GraphApi,
    site_ref: &SiteRef,
    options: &SweepOptions,
    acc: &mut TextAccumulator,
    report: &mut SweepReport,
) -> Result<(), SweepError> {
    let site = graph.site_by_path(site_ref).await?;
    acc.push(0, format!("Site: {}", site.label()));

    let drives = graph.list_drives(&site.id).await?;
    debug!(site = %site_ref, drives = drives.len(), "listed drives");

    for drive in drives {
        report.drives += 1;
        let root = graph.drive_root(&drive.id).await?;
        let base = drive_dir(site_ref, drive.name.as_deref(), &drive.id);
        walk_drive(graph, &drive.id, &root.id, &base, options, acc, report).await?;
    }
    Ok(())
}

/// `<host>/<site path segments>/<drive name or id>`, relative to the download dir.
fn drive_dir(site_ref: &SiteRef, drive_name: Option<&str>, drive_id: &str) -> PathBuf {
    let mut rel = PathBuf::new();
    let site_parts = std::iter::once(site_ref.host.as_str()).chain(site_ref.path.split('/'));
    for part in site_parts.filter_map(path_segment) {
        rel.push(part);
    }
    let drive = drive_name.and_then(path_segment).or_else(|| path_segment(drive_id));
    rel.push(drive.unwrap_or_else(|| "drive".to_string()));
    rel
}

/// Children of one folder still to visit.
struct Frame {
    items: std::vec::IntoIter<DriveItem>,
    depth: usize,
    rel: PathBuf,
}

/// Pre-order walk below `root_id`, children in listing order. Folders are
/// entered where they appear; depth is capped and each folder id may be
/// entered once. Downloads land under `base` joined with the folder names.
pub async fn walk_drive(
    graph: &dyn GraphApi,
    drive_id: &str,
    root_id: &str,
    base: &Path,
    options: &SweepOptions,
    acc: &mut TextAccumulator,
    report: &mut SweepReport,
) -> Result<(), SweepError> {
    let mut visited: HashSet<String> = HashSet::from([root_id.to_string()]);
    let mut stack = vec![Frame {
        items: graph.list_children(drive_id, root_id).await?.into_iter(),
        depth: 0,
        rel: base.to_path_buf(),
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(item) = frame.items.next() else {
            stack.pop();
            continue;
        };
        let depth = frame.depth + 1;

        if item.is_folder() {
            if depth > options.max_depth {
                return Err(SweepError::DepthExceeded {
                    drive_id: drive_id.to_string(),
                    max_depth: options.max_depth,
                });
            }
            if !visited.insert(item.id.clone()) {
                return Err(SweepError::Cycle {
                    drive_id: drive_id.to_string(),
                    item_id: item.id,
                });
            }
            report.folders += 1;
            let folder = path_segment(&item.name)
                .or_else(|| path_segment(&item.id))
                .unwrap_or_else(|| "folder".to_string());
            let rel = frame.rel.join(folder);
            let children = graph.list_children(drive_id, &item.id).await?;
            stack.push(Frame {
                items: children.into_iter(),
                depth,
                rel,
            });
            continue;
        }

        // Only files carrying a pre-authenticated URL are listed.
        let (Some(_), Some(url)) = (&item.file, item.download_url.as_deref()) else {
            continue;
        };
        acc.push(0, format!("File Name: {}", item.name));
        acc.push(0, format!("Download URL: {url}"));
        report.files += 1;

        if let Some(target) = &options.downloads {
            download_one(target, &frame.rel, &item.name, url, acc, report).await;
        }
    }
    Ok(())
}

/// Download failures are noted in the output and never abort the sweep.
async fn download_one(
    target: &DownloadTarget,
    rel: &Path,
    name: &str,
    url: &str,
    acc: &mut TextAccumulator,
    report: &mut SweepReport,
) {
    let Some(dest) = target.destination_for(rel, name) else {
        report.downloads_failed += 1;
        acc.push(0, format!("Error downloading {name}: unusable file name"));
        return;
    };
    match target.downloader.download_file(url, &dest).await {
        Ok(bytes) => {
            debug!(file = name, bytes, dest = %dest.display(), "downloaded");
            report.downloads_ok += 1;
            acc.push(0, format!("Downloaded to: {}", dest.display()));
        }
        Err(e) => {
            warn!(file = name, error = %e, "download failed");
            report.downloads_failed += 1;
            acc.push(0, format!("Error downloading {name}: {e}"));
        }
    }
}
