// src/graph/client.rs
use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use super::auth::ClientSecretCredential;
use super::types::{Collection, Drive, DriveItem, Site, SitePage};
use super::{GraphApi, GraphConnector};
use crate::config::{AzureAdConfig, GraphSettings, SiteRef};
use crate::error::SweepError;

const USER_AGENT: &str = "sharepoint-content-export/0.1";

/// Upper bound on continuation pages for one listing.
pub const MAX_PAGES: usize = 1_000;

/// Shared reqwest client with connect + per-call timeouts.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .timeout(timeout)
        .build()
}

/// Production connector: one token exchange per `connect`.
#[derive(Clone)]
pub struct AzureGraphConnector {
    http: Client,
    credential: ClientSecretCredential,
    base_url: String,
}

impl AzureGraphConnector {
    pub fn new(azure: AzureAdConfig, settings: GraphSettings) -> Result<Self, SweepError> {
        let http = build_http_client(settings.timeout)?;
        Ok(Self {
            credential: ClientSecretCredential::new(http.clone(), azure),
            http,
            base_url: settings.base_url,
        })
    }
}

#[async_trait]
impl GraphConnector for AzureGraphConnector {
    async fn connect(&self) -> Result<Box<dyn GraphApi>, SweepError> {
        let token = self.credential.acquire_token().await?;
        Ok(Box::new(GraphClient::new(
            self.http.clone(),
            self.base_url.clone(),
            token.token,
        )))
    }
}

/// Authenticated Graph session.
pub struct GraphClient {
    http: Client,
    base_url: String,
    token: String,
}

impl GraphClient {
    pub fn new(http: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SweepError> {
        counter!("graph_requests_total").increment(1);
        debug!(%url, "graph GET");

        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .inspect_err(|_| counter!("graph_request_errors_total").increment(1))?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            counter!("graph_request_errors_total").increment(1);
            warn!(%url, status = status.as_u16(), "graph call failed");
            return Err(SweepError::status(url, status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|source| SweepError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Reads a collection to the end by following `@odata.nextLink`.
    /// A link seen before, or more than `MAX_PAGES` pages, fails the call.
    async fn get_all<T: DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>, SweepError> {
        let mut out = Vec::new();
        let mut seen: HashSet<String> = HashSet::from([first_url.clone()]);
        let mut url = first_url;
        loop {
            let page: Collection<T> = self.get_json(&url).await?;
            out.extend(page.value);
            let Some(next) = page.next_link else {
                break;
            };
            if !seen.insert(next.clone()) {
                warn!(%url, %next, "next link was already visited");
                return Err(SweepError::Pagination {
                    url: next,
                    reason: "continuation link repeats an earlier page".to_string(),
                });
            }
            if seen.len() > MAX_PAGES {
                return Err(SweepError::Pagination {
                    url: next,
                    reason: format!("more than {MAX_PAGES} pages"),
                });
            }
            url = next;
        }
        if seen.len() > 1 {
            debug!(pages = seen.len(), items = out.len(), "followed continuation links");
        }
        Ok(out)
    }
}

#[async_trait]
impl GraphApi for GraphClient {
    async fn site_by_path(&self, site: &SiteRef) -> Result<Site, SweepError> {
        let url = self.url(&format!("sites/{}", site.graph_key()));
        self.get_json(&url).await
    }

    async fn list_pages(&self, site_id: &str) -> Result<Vec<SitePage>, SweepError> {
        let url = self.url(&format!("sites/{site_id}/pages/microsoft.graph.sitePage"));
        self.get_all(url).await
    }

    async fn page_with_layout(
        &self,
        site_id: &str,
        page_id: &str,
    ) -> Result<SitePage, SweepError> {
        let url = self.url(&format!(
            "sites/{site_id}/pages/{page_id}/microsoft.graph.sitePage?$expand=canvasLayout"
        ));
        self.get_json(&url).await
    }

    async fn list_drives(&self, site_id: &str) -> Result<Vec<Drive>, SweepError> {
        let url = self.url(&format!("sites/{site_id}/drives"));
        self.get_all(url).await
    }

    async fn drive_root(&self, drive_id: &str) -> Result<DriveItem, SweepError> {
        let url = self.url(&format!("drives/{drive_id}/root"));
        self.get_json(&url).await
    }

    async fn list_children(
        &self,
        drive_id: &str,
        item_id: &str,
    ) -> Result<Vec<DriveItem>, SweepError> {
        let url = self.url(&format!("drives/{drive_id}/items/{item_id}/children"));
        self.get_all(url).await
    }
}
