//! OAuth2 installed-app authentication for the Drive API.
//!
//! The authorization-code flow, token refresh and `token.json` persistence are
//! handled by `yup_oauth2`. The authenticator is built on first use, so loading
//! credentials never touches the network.

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, warn};
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::authenticator_delegate::InstalledFlowDelegate;
use yup_oauth2::{ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::error::{DriveError, Result};

/// Read-only Drive scope; this tool never writes to Drive.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

enum TokenSource {
    /// Bearer token supplied by the caller; never refreshed.
    Static(String),
    OAuth {
        secret: ApplicationSecret,
        token_path: PathBuf,
        authenticator: OnceCell<DefaultAuthenticator>,
    },
}

/// Authenticator for the Drive API.
#[derive(Clone)]
pub struct Authenticator {
    source: Arc<TokenSource>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Load client credentials; the token file is read lazily on first use.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        credentials_path: P,
        token_path: Q,
    ) -> Result<Self> {
        let credentials_path = credentials_path.as_ref();
        if !credentials_path.exists() {
            return Err(DriveError::MissingCredentials(credentials_path.to_path_buf()));
        }
        let secret = read_client_secret(credentials_path)?;
        Ok(Self::new(secret, token_path.as_ref().to_path_buf()))
    }

    pub fn new(secret: ApplicationSecret, token_path: PathBuf) -> Self {
        Self {
            source: Arc::new(TokenSource::OAuth {
                secret,
                token_path,
                authenticator: OnceCell::new(),
            }),
        }
    }

    /// Use a pre-issued bearer token instead of the OAuth flow.
    pub fn from_access_token(access_token: impl Into<String>) -> Self {
        Self {
            source: Arc::new(TokenSource::Static(access_token.into())),
        }
    }

    /// Get a valid access token, refreshing or re-authorizing if necessary.
    pub async fn get_access_token(&self) -> Result<String> {
        let (secret, token_path, authenticator) = match self.source.as_ref() {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::OAuth {
                secret,
                token_path,
                authenticator,
            } => (secret, token_path, authenticator),
        };

        let authenticator = authenticator
            .get_or_try_init(|| build_authenticator(secret.clone(), token_path))
            .await?;

        let token = authenticator.token(&[DRIVE_READONLY_SCOPE]).await?;
        token.token().map(str::to_string).ok_or_else(|| {
            DriveError::AuthenticationError("no access token was issued".to_string())
        })
    }
}

async fn build_authenticator(
    secret: ApplicationSecret,
    token_path: &Path,
) -> Result<DefaultAuthenticator> {
    // Ignore the error: a provider may already be installed by the host process
    let _ = rustls::crypto::ring::default_provider().install_default();

    if let Some(parent) = token_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    debug!("Using token cache {}", token_path.display());
    let authenticator =
        InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
            .persist_tokens_to_disk(token_path)
            .flow_delegate(Box::new(BrowserFlowDelegate))
            .build()
            .await?;
    Ok(authenticator)
}

/// Read a client secret file, accepting either an `installed` or `web` section.
pub fn read_client_secret(path: &Path) -> Result<ApplicationSecret> {
    let content = fs::read(path)?;
    yup_oauth2::parse_application_secret(content).map_err(|e| {
        DriveError::AuthenticationError(format!(
            "{} is not an OAuth client credentials file: {}",
            path.display(),
            e
        ))
    })
}

/// Opens the consent page in the user's browser, printing the URL as a fallback.
struct BrowserFlowDelegate;

impl InstalledFlowDelegate for BrowserFlowDelegate {
    fn present_user_url<'a>(
        &'a self,
        url: &'a str,
        _need_code: bool,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<String, String>> + Send + 'a>> {
        Box::pin(async move {
            eprintln!("Starting authentication flow...");
            eprintln!("A browser window will open for you to authorize access.");
            eprintln!("If it does not, open this URL:\n\n  {}\n", url);
            if let Err(e) = open::that(url) {
                warn!("Could not open browser: {}", e);
            }
            // The redirect listener receives the code; nothing to read here
            Ok(String::new())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_static_token() {
        let auth = Authenticator::from_access_token("ya29.static");
        assert_eq!(auth.get_access_token().await.unwrap(), "ya29.static");
        // Clones share the same source
        assert_eq!(auth.clone().get_access_token().await.unwrap(), "ya29.static");
    }

    #[test]
    fn test_missing_credentials() {
        let result = Authenticator::from_files("/nonexistent/credentials.json", "token.json");
        assert!(matches!(result, Err(DriveError::MissingCredentials(_))));
    }

    #[test]
    fn test_read_client_secret_sections() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("credentials.json");

        fs::write(
            &path,
            r#"{"installed": {
                "client_id": "cid.apps.googleusercontent.com",
                "client_secret": "shh",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["http://localhost"]
            }}"#,
        )
        .unwrap();
        let secret = read_client_secret(&path).unwrap();
        assert_eq!(secret.client_id, "cid.apps.googleusercontent.com");
        assert_eq!(secret.token_uri, "https://oauth2.googleapis.com/token");

        fs::write(&path, r#"{"type": "service_account"}"#).unwrap();
        let err = read_client_secret(&path).unwrap_err();
        assert!(err.to_string().contains("credentials.json"));
        assert!(err.is_auth_failure());
    }
}
