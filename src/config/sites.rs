// src/config/sites.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_SITES_PATH: &str = "SHAREPOINT_SITES_PATH";

/// A SharePoint site addressed by host name and server-relative path,
/// e.g. `contoso.sharepoint.com` + `/sites/Wiki`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteRef {
    pub host: String,
    pub path: String,
}

impl SiteRef {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        let host = host.into().trim().trim_end_matches('/').to_string();
        let path = path.into();
        let path = path.trim().trim_end_matches('/');
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self { host, path }
    }

    /// Graph addresses a site by path as `{host}:{path}`.
    pub fn graph_key(&self) -> String {
        format!("{}:{}", self.host, self.path)
    }
}

impl fmt::Display for SiteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.host, self.path)
    }
}

/// Ordered, immutable list of sites swept by every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteList(Vec<SiteRef>);

impl SiteList {
    pub fn new(sites: Vec<SiteRef>) -> Self {
        Self(clean_list(sites))
    }

    pub fn as_slice(&self) -> &[SiteRef] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Load the site list from an explicit path. Supports TOML or JSON formats.
pub fn load_sites_from(path: &Path) -> Result<SiteList> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading site list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let sites = match ext.as_str() {
        "json" => parse_json(&content)?,
        _ => parse_toml(&content)?,
    };
    Ok(SiteList::new(sites))
}

/// Load the site list using env var + fallbacks:
/// 1) $SHAREPOINT_SITES_PATH
/// 2) config/sites.toml
/// 3) config/sites.json
pub fn load_sites_default() -> Result<SiteList> {
    if let Ok(p) = std::env::var(ENV_SITES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sites_from(&pb);
        } else {
            return Err(anyhow!("{ENV_SITES_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sites.toml");
    if toml_p.exists() {
        return load_sites_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sites.json");
    if json_p.exists() {
        return load_sites_from(&json_p);
    }
    tracing::warn!("no site list configured; sweeps will produce empty files");
    Ok(SiteList::default())
}

/// TOML layout: a shared `host` with `paths`, plus any `[[sites]]` on other hosts.
fn parse_toml(s: &str) -> Result<Vec<SiteRef>> {
    #[derive(Deserialize)]
    struct TomlSites {
        host: Option<String>,
        #[serde(default)]
        paths: Vec<String>,
        #[serde(default)]
        sites: Vec<SiteRef>,
    }
    let v: TomlSites = toml::from_str(s).context("parsing site list toml")?;
    let mut out = Vec::with_capacity(v.paths.len() + v.sites.len());
    if !v.paths.is_empty() {
        let host = v
            .host
            .ok_or_else(|| anyhow!("site list has `paths` but no `host`"))?;
        out.extend(v.paths.into_iter().map(|p| SiteRef::new(host.clone(), p)));
    }
    out.extend(v.sites.into_iter().map(|s| SiteRef::new(s.host, s.path)));
    Ok(out)
}

fn parse_json(s: &str) -> Result<Vec<SiteRef>> {
    let v: Vec<SiteRef> = serde_json::from_str(s).context("parsing site list json")?;
    Ok(v.into_iter().map(|s| SiteRef::new(s.host, s.path)).collect())
}

/// Drops blank and repeated entries; keeps first-seen order.
fn clean_list(items: Vec<SiteRef>) -> Vec<SiteRef> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|s| !s.host.is_empty() && s.path != "/")
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
