use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use crate::collect::SweepOptions;
use crate::config::{AppConfig, SiteList};
use crate::error::SweepError;
use crate::export::{run_export, ExportKind};
use crate::graph::{AzureGraphConnector, GraphConnector};
use crate::metrics::Metrics;

pub const SWEEP_FAILURES_HEADER: &str = "x-sweep-failures";

#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn GraphConnector>,
    pub sites: Arc<SiteList>,
    pub options: Arc<SweepOptions>,
}

impl AppState {
    pub fn new(
        connector: Arc<dyn GraphConnector>,
        sites: SiteList,
        options: SweepOptions,
    ) -> Self {
        Self {
            connector,
            sites: Arc::new(sites),
            options: Arc::new(options),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/", get(site_content))
        .route("/site-content", get(site_content))
        .route("/site-attachments", get(site_attachments))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Full application as served: Graph over HTTPS plus `/metrics`.
pub fn router_from_config(config: &AppConfig) -> anyhow::Result<Router> {
    let connector = AzureGraphConnector::new(config.azure.clone(), config.graph.clone())?;
    let state = AppState::new(
        Arc::new(connector),
        config.sites.clone(),
        config.sweep_options()?,
    );
    let metrics = Metrics::init()?;
    Ok(router(state).merge(metrics.router()))
}

async fn site_content(State(state): State<AppState>) -> Response {
    export_response(&state, ExportKind::SiteContent).await
}

async fn site_attachments(State(state): State<AppState>) -> Response {
    export_response(&state, ExportKind::SiteAttachments).await
}

async fn export_response(state: &AppState, kind: ExportKind) -> Response {
    let export = match run_export(
        state.connector.as_ref(),
        &state.sites,
        &state.options,
        kind,
    )
    .await
    {
        Ok(export) => export,
        Err(e) => return error_view(&e),
    };

    let mut resp = (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static(kind.content_disposition()),
            ),
        ],
        export.bytes,
    )
        .into_response();

    if !export.report.failures.is_empty() {
        resp.headers_mut().insert(
            HeaderName::from_static(SWEEP_FAILURES_HEADER),
            HeaderValue::from(export.report.failures.len()),
        );
    }
    resp
}

/// Error page; no partial file is ever attached.
fn error_view(err: &SweepError) -> Response {
    let message = html_escape::encode_text(&err.to_string()).into_owned();
    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Export failed</title></head>\n<body>\n\
         <h1>Export failed</h1>\n<p class=\"error\">An error occurred: {message}</p>\n\
         </body>\n</html>\n"
    );
    (StatusCode::BAD_GATEWAY, Html(page)).into_response()
}
