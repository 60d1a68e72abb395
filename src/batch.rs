//! Sequential batch download of resolved file references.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::client::DriveClient;
use crate::error::{DriveError, Result};
use crate::export::{plan_transfer_with, ExportPreset, TransferPlan, GOOGLE_FOLDER};
use crate::models::FileMetadata;
use crate::url_parser::extract_id;

/// Name of the index written next to downloaded files.
pub const METADATA_INDEX_FILE: &str = "_file_metadata.md";

/// Outcome of a single file transfer.
#[derive(Debug)]
pub enum DownloadStatus {
    Success {
        path: PathBuf,
        bytes: u64,
        metadata: FileMetadata,
    },
    Failure {
        reason: String,
    },
}

/// Per-file result; `name` is the Drive name when known, otherwise the file ID.
#[derive(Debug)]
pub struct DownloadResult {
    pub file_id: String,
    pub name: String,
    pub status: DownloadStatus,
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, DownloadStatus::Success { .. })
    }
}

/// All results of a batch, in request order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub results: Vec<DownloadResult>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.total() - self.success_count()
    }

    /// Metadata of every successfully transferred file.
    pub fn downloaded(&self) -> Vec<&FileMetadata> {
        self.results
            .iter()
            .filter_map(|r| match &r.status {
                DownloadStatus::Success { metadata, .. } => Some(metadata),
                DownloadStatus::Failure { .. } => None,
            })
            .collect()
    }
}

/// Resolve each reference and download it, one file at a time.
///
/// Per-file failures are recorded and the batch moves on. Authentication
/// failures abort the whole batch since no later file could succeed either.
pub async fn download_all<S: AsRef<str>>(
    client: &DriveClient,
    references: &[S],
    output_dir: &Path,
    preset: ExportPreset,
) -> Result<BatchSummary> {
    let file_ids: Vec<String> = references.iter().map(|r| extract_id(r.as_ref())).collect();
    download_ids(client, &file_ids, output_dir, preset).await
}

/// Download already-resolved file IDs.
pub async fn download_ids(
    client: &DriveClient,
    file_ids: &[String],
    output_dir: &Path,
    preset: ExportPreset,
) -> Result<BatchSummary> {
    fs::create_dir_all(output_dir)?;

    let mut summary = BatchSummary::default();
    for (idx, file_id) in file_ids.iter().enumerate() {
        info!("[{}/{}] Fetching {}", idx + 1, file_ids.len(), file_id);

        let result = match download_one(client, file_id, output_dir, preset).await {
            Ok((path, bytes, metadata)) => DownloadResult {
                file_id: file_id.clone(),
                name: metadata.name.clone(),
                status: DownloadStatus::Success {
                    path,
                    bytes,
                    metadata,
                },
            },
            Err(e) if e.is_auth_failure() => return Err(e.into()),
            Err(FileError { name, error }) => {
                warn!("Failed to fetch {}: {}", file_id, error);
                DownloadResult {
                    file_id: file_id.clone(),
                    name: name.unwrap_or_else(|| file_id.clone()),
                    status: DownloadStatus::Failure {
                        reason: error.to_string(),
                    },
                }
            }
        };
        summary.results.push(result);
    }

    Ok(summary)
}

/// Error for one file, carrying the Drive name if metadata was fetched.
struct FileError {
    name: Option<String>,
    error: DriveError,
}

impl FileError {
    fn is_auth_failure(&self) -> bool {
        self.error.is_auth_failure()
    }
}

impl From<FileError> for DriveError {
    fn from(e: FileError) -> Self {
        e.error
    }
}

impl From<DriveError> for FileError {
    fn from(error: DriveError) -> Self {
        FileError { name: None, error }
    }
}

async fn download_one(
    client: &DriveClient,
    file_id: &str,
    output_dir: &Path,
    preset: ExportPreset,
) -> std::result::Result<(PathBuf, u64, FileMetadata), FileError> {
    if file_id.is_empty() {
        return Err(DriveError::EmptyReference.into());
    }

    let metadata = client.get_file(file_id).await?;
    let named = |error: DriveError| FileError {
        name: Some(metadata.name.clone()),
        error,
    };

    if metadata.mime_type == GOOGLE_FOLDER {
        return Err(named(DriveError::UnsupportedFile {
            name: metadata.name.clone(),
            mime_type: metadata.mime_type.clone(),
        }));
    }

    let plan = plan_transfer_with(preset, &metadata.mime_type);
    let file_name = plan.file_name(&metadata.name, &metadata.id);
    let path = output_dir.join(file_name);
    info!("{} -> {} ({})", metadata.name, path.display(), plan);

    let bytes = match plan {
        TransferPlan::Export(format) => client.export_to(file_id, format.mime_type, &path).await,
        TransferPlan::Download => client.download_to(file_id, &path).await,
    }
    .map_err(named)?;

    Ok((path, bytes, metadata))
}

/// Write `_file_metadata.md`, most recently modified first.
pub fn write_metadata_index(output_dir: &Path, files: &[&FileMetadata]) -> Result<PathBuf> {
    let path = output_dir.join(METADATA_INDEX_FILE);
    fs::write(&path, render_metadata_index(files))?;
    Ok(path)
}

pub fn render_metadata_index(files: &[&FileMetadata]) -> String {
    let mut sorted = files.to_vec();
    // RFC 3339 timestamps in UTC sort lexically
    sorted.sort_by(|a, b| b.modified_time.cmp(&a.modified_time));

    let mut out = String::from("# Downloaded Files Metadata\n\n");
    out.push_str("Files are sorted by modification date (most recent first).\n\n");
    for file in sorted {
        let _ = writeln!(out, "## {}", file.name);
        let _ = writeln!(
            out,
            "- **Last Modified**: {}",
            file.modified_time.as_deref().unwrap_or("Unknown")
        );
        let _ = writeln!(out, "- **File ID**: {}", file.id);
        let _ = writeln!(out, "- **Type**: {}\n", file.mime_type);
    }
    out
}
