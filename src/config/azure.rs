// src/config/azure.rs
use anyhow::anyhow;
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_GRAPH_TIMEOUT_SECS: u64 = 30;

/// App registration used for the client-credentials token exchange.
#[derive(Clone)]
pub struct AzureAdConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// e.g. https://login.microsoftonline.com (public cloud)
    pub authority_host: String,
    pub scope: String,
}

// Keep the secret out of logs.
impl fmt::Debug for AzureAdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureAdConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret_len", &self.client_secret.len())
            .field("authority_host", &self.authority_host)
            .field("scope", &self.scope)
            .finish()
    }
}

impl AzureAdConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            tenant_id: required("AZURE_TENANT_ID")?,
            client_id: required("AZURE_CLIENT_ID")?,
            client_secret: required("AZURE_CLIENT_SECRET")?,
            authority_host: env::var("AZURE_AUTHORITY_HOST")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_AUTHORITY_HOST.to_string()),
            scope: env::var("GRAPH_SCOPE").unwrap_or_else(|_| DEFAULT_GRAPH_SCOPE.to_string()),
        })
    }

    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority_host, self.tenant_id)
    }
}

/// Where Graph lives and how long a single call may take.
#[derive(Debug, Clone)]
pub struct GraphSettings {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_GRAPH_TIMEOUT_SECS),
        }
    }
}

impl GraphSettings {
    pub fn from_env() -> Self {
        let base_url = env::var("GRAPH_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_GRAPH_BASE_URL.to_string());
        let secs = super::parse_env("GRAPH_TIMEOUT_SECS", DEFAULT_GRAPH_TIMEOUT_SECS).max(1);
        Self {
            base_url,
            timeout: Duration::from_secs(secs),
        }
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    let v = env::var(name).map_err(|_| anyhow!("Missing {name} env var"))?;
    if v.trim().is_empty() {
        anyhow::bail!("{name} env var is empty");
    }
    Ok(v.trim().to_string())
}
