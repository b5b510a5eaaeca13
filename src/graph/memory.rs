// src/graph/memory.rs
//! In-memory Graph used by tests and offline demos. Builder-style setup,
//! then hand it to the router or a sweep as a `GraphConnector`.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::types::{Drive, DriveItem, Site, SitePage};
use super::{GraphApi, GraphConnector};
use crate::config::SiteRef;
use crate::error::SweepError;

#[derive(Clone, Default)]
pub struct InMemoryGraph {
    sites: HashMap<String, Site>,
    pages: HashMap<String, Vec<SitePage>>,
    drives: HashMap<String, Vec<Drive>>,
    roots: HashMap<String, DriveItem>,
    children: HashMap<(String, String), Vec<DriveItem>>,
    failing_sites: HashSet<String>,
    reject_connect: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(mut self, site_ref: &SiteRef, site: Site) -> Self {
        self.sites.insert(site_ref.graph_key(), site);
        self
    }

    /// Site lookup for `site_ref` answers with a 500.
    pub fn with_failing_site(mut self, site_ref: &SiteRef) -> Self {
        self.failing_sites.insert(site_ref.graph_key());
        self
    }

    /// Pages are listed without layout and re-fetched with it.
    pub fn with_page(mut self, site_id: &str, page: SitePage) -> Self {
        self.pages.entry(site_id.to_string()).or_default().push(page);
        self
    }

    pub fn with_drive(mut self, site_id: &str, drive: Drive, root: DriveItem) -> Self {
        self.roots.insert(drive.id.clone(), root);
        self.drives.entry(site_id.to_string()).or_default().push(drive);
        self
    }

    pub fn with_children(mut self, drive_id: &str, parent_id: &str, items: Vec<DriveItem>) -> Self {
        self.children
            .entry((drive_id.to_string(), parent_id.to_string()))
            .or_default()
            .extend(items);
        self
    }

    /// `connect` fails as if the token exchange was rejected.
    pub fn rejecting_credentials(mut self) -> Self {
        self.reject_connect = true;
        self
    }

    /// Every call made so far, in order, e.g. `children:d1/root`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl GraphConnector for InMemoryGraph {
    async fn connect(&self) -> Result<Box<dyn GraphApi>, SweepError> {
        self.record("connect".to_string());
        if self.reject_connect {
            return Err(SweepError::Token {
                status: 401,
                body: "invalid_client: bad secret".to_string(),
            });
        }
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl GraphApi for InMemoryGraph {
    async fn site_by_path(&self, site: &SiteRef) -> Result<Site, SweepError> {
        let key = site.graph_key();
        self.record(format!("site:{key}"));
        if self.failing_sites.contains(&key) {
            return Err(SweepError::status(
                &format!("memory://sites/{key}"),
                500,
                "generalException",
            ));
        }
        self.sites
            .get(&key)
            .cloned()
            .ok_or_else(|| SweepError::NotFound(format!("site {key}")))
    }

    async fn list_pages(&self, site_id: &str) -> Result<Vec<SitePage>, SweepError> {
        self.record(format!("pages:{site_id}"));
        Ok(self
            .pages
            .get(site_id)
            .map(|pages| {
                pages
                    .iter()
                    .map(|p| SitePage {
                        canvas_layout: None,
                        ..p.clone()
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn page_with_layout(
        &self,
        site_id: &str,
        page_id: &str,
    ) -> Result<SitePage, SweepError> {
        self.record(format!("page:{site_id}/{page_id}"));
        self.pages
            .get(site_id)
            .and_then(|pages| pages.iter().find(|p| p.id == page_id))
            .cloned()
            .ok_or_else(|| SweepError::NotFound(format!("page {site_id}/{page_id}")))
    }

    async fn list_drives(&self, site_id: &str) -> Result<Vec<Drive>, SweepError> {
        self.record(format!("drives:{site_id}"));
        Ok(self.drives.get(site_id).cloned().unwrap_or_default())
    }

    async fn drive_root(&self, drive_id: &str) -> Result<DriveItem, SweepError> {
        self.record(format!("root:{drive_id}"));
        self.roots
            .get(drive_id)
            .cloned()
            .ok_or_else(|| SweepError::NotFound(format!("drive {drive_id}")))
    }

    async fn list_children(
        &self,
        drive_id: &str,
        item_id: &str,
    ) -> Result<Vec<DriveItem>, SweepError> {
        self.record(format!("children:{drive_id}/{item_id}"));
        Ok(self
            .children
            .get(&(drive_id.to_string(), item_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
