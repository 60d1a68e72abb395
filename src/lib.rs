//! drive_fetch - Pull files from a personal Google Drive onto local disk.
//!
//! This library provides functionality to:
//! - Resolve Drive, Docs, Sheets and Slides URLs (or bare IDs) to file IDs
//! - Export Workspace documents to Markdown, CSV or plain text
//! - Download other files (PDFs, images, ...) unchanged
//! - Manage several Google accounts and per-project credentials
//!
//! Access is strictly read-only.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use drive_fetch::{download_all, Authenticator, DriveClient, ExportPreset};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = Authenticator::from_files(".drive-data/credentials.json", ".drive-data/token.json")?;
//!     let client = DriveClient::new(auth);
//!
//!     let refs = ["https://docs.google.com/document/d/ABC123/edit"];
//!     let summary = download_all(&client, &refs, Path::new("drive_files"), ExportPreset::TextOnly).await?;
//!     println!("{}/{} downloaded", summary.success_count(), summary.total());
//!
//!     Ok(())
//! }
//! ```

pub mod accounts;
pub mod auth;
pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod selection;
pub mod url_parser;

// Re-exports for convenience
pub use accounts::AccountManager;
pub use auth::Authenticator;
pub use batch::{download_all, download_ids, BatchSummary, DownloadResult, DownloadStatus};
pub use client::DriveClient;
pub use error::{DriveError, Result};
pub use export::{plan_transfer, plan_transfer_with, ExportPreset, TransferPlan};
pub use models::FileMetadata;
pub use url_parser::extract_id;
