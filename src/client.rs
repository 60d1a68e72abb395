//! Google Drive API client for read-only file operations.

use std::path::Path;

use futures::StreamExt;
use reqwest::{Client, RequestBuilder, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::auth::Authenticator;
use crate::error::{DriveError, Result};
use crate::models::{ApiErrorResponse, FileListResponse, FileMetadata};

/// Base URL for Google Drive API v3.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Fields requested for file metadata.
pub const METADATA_FIELDS: &str = "id, name, mimeType, modifiedTime, size";

/// Largest page the files.list endpoint accepts.
const MAX_PAGE_SIZE: usize = 1000;

/// Client for reading files from a user's Google Drive.
pub struct DriveClient {
    auth: Authenticator,
    http: Client,
    base_url: String,
}

impl DriveClient {
    /// Create a new DriveClient.
    pub fn new(auth: Authenticator) -> Self {
        Self {
            auth,
            http: Client::new(),
            base_url: DRIVE_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// List up to `max_results` non-trashed files directly inside a folder.
    ///
    /// # Arguments
    /// * `folder_id` - Parent folder ID, or `None` for the Drive root
    /// * `max_results` - Upper bound on the number of files returned
    pub async fn list_files(
        &self,
        folder_id: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<FileMetadata>> {
        let parent = folder_id.unwrap_or("root");
        let query = format!(
            "'{}' in parents and trashed = false",
            parent.replace('\'', "\\'")
        );
        let fields = format!("nextPageToken, files({})", METADATA_FIELDS);

        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        while all_files.len() < max_results {
            let page_size = (max_results - all_files.len()).min(MAX_PAGE_SIZE).to_string();
            let mut request = self
                .http
                .get(format!("{}/files", self.base_url))
                .query(&[
                    ("q", query.as_str()),
                    ("pageSize", page_size.as_str()),
                    ("fields", fields.as_str()),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = self.send(request).await?;
            let list_response: FileListResponse = response.json().await?;
            debug!("Listed {} file(s) in {}", list_response.files.len(), parent);
            all_files.extend(list_response.files);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        all_files.truncate(max_results);
        Ok(all_files)
    }

    /// Get file metadata by ID.
    pub async fn get_file(&self, file_id: &str) -> Result<FileMetadata> {
        let request = self
            .http
            .get(format!("{}/files/{}", self.base_url, file_id))
            .query(&[("fields", METADATA_FIELDS)]);

        let response = self.send(request).await?;
        let metadata: FileMetadata = response.json().await?;
        Ok(metadata)
    }

    /// Download a file's stored bytes to `destination`.
    pub async fn download_to(&self, file_id: &str, destination: &Path) -> Result<u64> {
        let request = self
            .http
            .get(format!("{}/files/{}", self.base_url, file_id))
            .query(&[("alt", "media")]);

        let response = self.send(request).await?;
        write_body(response, destination).await
    }

    /// Export a Workspace document as `export_mime_type` to `destination`.
    pub async fn export_to(
        &self,
        file_id: &str,
        export_mime_type: &str,
        destination: &Path,
    ) -> Result<u64> {
        let request = self
            .http
            .get(format!("{}/files/{}/export", self.base_url, file_id))
            .query(&[("mimeType", export_mime_type)]);

        let response = self.send(request).await?;
        write_body(response, destination).await
    }

    /// Authorize and send a request, mapping non-success statuses to `ApiError`.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.auth.get_access_token().await?;
        let response = request.bearer_auth(&token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
            return Err(DriveError::ApiError {
                status: api_error.error.code,
                message: api_error.error.message,
            });
        }
        Err(DriveError::ApiError {
            status: status.as_u16(),
            message: error_body,
        })
    }
}

/// Stream a response body to disk, removing the partial file on failure.
async fn write_body(response: Response, destination: &Path) -> Result<u64> {
    let result = stream_to_file(response, destination).await;
    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(destination).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove partial file {}: {}", destination.display(), e);
            }
        }
    }
    result
}

async fn stream_to_file(response: Response, destination: &Path) -> Result<u64> {
    let mut file = File::create(destination).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}
