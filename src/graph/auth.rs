// src/graph/auth.rs
//! OAuth 2.0 client-credentials exchange against the Microsoft identity platform.

use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, warn};

use crate::config::AzureAdConfig;
use crate::error::{snippet, SweepError};

/// Bearer token for one request. Not cached, never persisted.
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: Option<u64>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_len", &self.token.len())
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Clone)]
pub struct ClientSecretCredential {
    http: Client,
    config: AzureAdConfig,
}

impl ClientSecretCredential {
    pub fn new(http: Client, config: AzureAdConfig) -> Self {
        Self { http, config }
    }

    pub async fn acquire_token(&self) -> Result<AccessToken, SweepError> {
        let url = self.config.token_url();
        debug!(tenant = %self.config.tenant_id, client = %self.config.client_id, "requesting graph token");

        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", self.config.scope.as_str()),
            ("grant_type", "client_credentials"),
        ];
        let resp = self.http.post(&url).form(&form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            // AAD answers with {error, error_description}; fall back to the raw body.
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(e) => match e.error_description {
                    Some(d) => format!("{}: {}", e.error, d),
                    None => e.error,
                },
                Err(_) => body,
            };
            warn!(status = status.as_u16(), "token request rejected");
            return Err(SweepError::Token {
                status: status.as_u16(),
                body: snippet(&detail),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|source| SweepError::Decode {
                url: url.clone(),
                source,
            })?;
        Ok(AccessToken {
            token: parsed.access_token,
            expires_in: parsed.expires_in,
        })
    }
}
