//! Run one export without the HTTP server and write the text to a file.
//!
//! Usage: export_once <content|attachments> [OUTPUT]
//! OUTPUT defaults to the file name the web endpoint would use.

use std::process::ExitCode;

use sharepoint_content_export::config::AppConfig;
use sharepoint_content_export::graph::AzureGraphConnector;
use sharepoint_content_export::{run_export, ExportKind};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let kind = match args.next().as_deref() {
        Some("content") => ExportKind::SiteContent,
        Some("attachments") => ExportKind::SiteAttachments,
        _ => {
            eprintln!("usage: export_once <content|attachments> [OUTPUT]");
            return ExitCode::from(2);
        }
    };
    let output = args.next().unwrap_or_else(|| kind.file_name().to_string());

    match run(kind, &output).await {
        Ok(()) => {
            println!("wrote {output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("An error occurred: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(kind: ExportKind, output: &str) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let connector = AzureGraphConnector::new(config.azure.clone(), config.graph.clone())?;
    let options = config.sweep_options()?;
    let export = run_export(&connector, &config.sites, &options, kind).await?;
    tokio::fs::write(output, &export.bytes).await?;
    for failure in &export.report.failures {
        eprintln!("site failed: {}: {}", failure.site, failure.message);
    }
    Ok(())
}
