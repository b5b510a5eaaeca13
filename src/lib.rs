// src/lib.rs
// Public library surface for the server binary, the one-shot exporter and integration tests.

pub mod api;
pub mod collect;
pub mod config;
pub mod download;
pub mod error;
pub mod export;
pub mod graph;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::error::SweepError;
pub use crate::export::{run_export, Export, ExportKind};
