//! Local paths: data directories, credential files and project config.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::accounts::AccountManager;
use crate::error::Result;

pub const DEFAULT_DATA_DIR: &str = ".drive-data";
pub const DEFAULT_OUTPUT_DIR: &str = "drive_files";
pub const ACCOUNTS_DIR_NAME: &str = ".drive-accounts";

pub const CREDENTIALS_FILE: &str = "credentials.json";
pub const TOKEN_FILE: &str = "token.json";
pub const PROJECT_CONFIG_FILE: &str = "config.json";

/// Records which account a project directory was set up with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub account_name: String,
    pub accounts_dir: PathBuf,
}

impl ProjectConfig {
    /// Read `config.json` from a data directory, if present and well-formed.
    pub fn load(data_dir: &Path) -> Option<Self> {
        let content = fs::read_to_string(data_dir.join(PROJECT_CONFIG_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        fs::write(
            data_dir.join(PROJECT_CONFIG_FILE),
            serde_json::to_string_pretty(self)?,
        )?;
        Ok(())
    }
}

/// Directory holding one credential file and one token file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    pub path: PathBuf,
}

impl DataDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.path.join(CREDENTIALS_FILE)
    }

    pub fn token_path(&self) -> PathBuf {
        self.path.join(TOKEN_FILE)
    }

    /// Pick the data directory for this invocation.
    ///
    /// A named account wins. Otherwise `data_dir` is used, unless it only holds a
    /// project config pointing at an account, in which case that account's
    /// directory is used.
    pub fn resolve(
        data_dir: &Path,
        account: Option<&str>,
        accounts: &AccountManager,
    ) -> Result<Self> {
        if let Some(name) = account {
            return Ok(Self::new(accounts.existing_account_path(name)?));
        }

        let local = Self::new(data_dir);
        if local.credentials_path().exists() {
            return Ok(local);
        }

        if let Some(config) = ProjectConfig::load(data_dir) {
            let manager = AccountManager::new(config.accounts_dir);
            if let Ok(path) = manager.existing_account_path(&config.account_name) {
                debug!(
                    "Using account {} from {}",
                    config.account_name,
                    data_dir.join(PROJECT_CONFIG_FILE).display()
                );
                return Ok(Self::new(path));
            }
        }

        Ok(local)
    }
}

/// `~/.drive-accounts`, or `./.drive-accounts` when no home directory is known.
pub fn default_accounts_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(ACCOUNTS_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(ACCOUNTS_DIR_NAME))
}
