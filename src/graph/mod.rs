// src/graph/mod.rs
//! Microsoft Graph access: the `GraphApi` seam used by the sweeps, the
//! reqwest-backed client, and an in-memory graph for tests and demos.

pub mod auth;
pub mod client;
pub mod memory;
pub mod types;

use async_trait::async_trait;

use crate::config::SiteRef;
use crate::error::SweepError;

pub use client::{AzureGraphConnector, GraphClient};
pub use memory::InMemoryGraph;
pub use types::{CanvasLayout, Drive, DriveItem, Site, SitePage, WebPart};

/// The Graph calls a sweep needs. Listing calls return every item,
/// following continuation links.
#[async_trait]
pub trait GraphApi: Send + Sync {
    async fn site_by_path(&self, site: &SiteRef) -> Result<Site, SweepError>;
    async fn list_pages(&self, site_id: &str) -> Result<Vec<SitePage>, SweepError>;
    /// Re-fetch a page with its canvas layout expanded.
    async fn page_with_layout(&self, site_id: &str, page_id: &str)
        -> Result<SitePage, SweepError>;
    async fn list_drives(&self, site_id: &str) -> Result<Vec<Drive>, SweepError>;
    async fn drive_root(&self, drive_id: &str) -> Result<DriveItem, SweepError>;
    async fn list_children(
        &self,
        drive_id: &str,
        item_id: &str,
    ) -> Result<Vec<DriveItem>, SweepError>;
}

/// Opens one authenticated session per request.
#[async_trait]
pub trait GraphConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn GraphApi>, SweepError>;
}
