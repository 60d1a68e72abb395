//! Error types for the drive_fetch crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when fetching files from Google Drive.
#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error(
        "OAuth client credentials not found at {}\n\
         Run `drive_fetch accounts setup <account>` or place a Desktop app credentials.json there.",
        .0.display()
    )]
    MissingCredentials(PathBuf),

    #[error("OAuth error: {0}. Delete token.json and re-run to sign in again.")]
    OAuthError(#[from] yup_oauth2::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Empty file reference")]
    EmptyReference,

    #[error("Cannot download {name}: {mime_type} files are not supported")]
    UnsupportedFile { name: String, mime_type: String },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Invalid account name: {0:?}")]
    InvalidAccountName(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
}

impl DriveError {
    /// Whether this error invalidates the whole invocation rather than a single file.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            DriveError::AuthenticationError(_)
                | DriveError::MissingCredentials(_)
                | DriveError::OAuthError(_)
                | DriveError::ApiError { status: 401, .. }
        )
    }
}

/// Result type alias for DriveError.
pub type Result<T> = std::result::Result<T, DriveError>;
