//! Named accounts, each a directory holding its own OAuth client credentials.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::auth::read_client_secret;
use crate::config::{ProjectConfig, CREDENTIALS_FILE, DEFAULT_DATA_DIR};
use crate::error::{DriveError, Result};

/// Store of accounts under a single directory (by default `~/.drive-accounts`).
pub struct AccountManager {
    accounts_dir: PathBuf,
}

impl AccountManager {
    pub fn new(accounts_dir: impl Into<PathBuf>) -> Self {
        Self {
            accounts_dir: accounts_dir.into(),
        }
    }

    pub fn accounts_dir(&self) -> &Path {
        &self.accounts_dir
    }

    /// Names of all accounts that have credentials, sorted.
    pub fn list_accounts(&self) -> Result<Vec<String>> {
        if !self.accounts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut accounts = Vec::new();
        for entry in fs::read_dir(&self.accounts_dir)? {
            let path = entry?.path();
            if path.is_dir() && path.join(CREDENTIALS_FILE).exists() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    accounts.push(name.to_string());
                }
            }
        }
        accounts.sort();
        Ok(accounts)
    }

    /// Directory for `name`, whether or not it exists yet.
    pub fn account_path(&self, name: &str) -> Result<PathBuf> {
        validate_account_name(name)?;
        Ok(self.accounts_dir.join(name))
    }

    pub fn account_exists(&self, name: &str) -> bool {
        self.account_path(name)
            .map(|path| path.join(CREDENTIALS_FILE).exists())
            .unwrap_or(false)
    }

    /// Directory for an account that has credentials.
    pub fn existing_account_path(&self, name: &str) -> Result<PathBuf> {
        let path = self.account_path(name)?;
        if !path.join(CREDENTIALS_FILE).exists() {
            return Err(DriveError::AccountNotFound(name.to_string()));
        }
        Ok(path)
    }

    pub fn credentials_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.existing_account_path(name)?.join(CREDENTIALS_FILE))
    }

    /// Create (or replace) an account from a client secret file.
    pub fn create_account(&self, name: &str, credentials: &Path) -> Result<PathBuf> {
        // Reject files that would only fail later at sign-in
        read_client_secret(credentials)?;

        let path = self.account_path(name)?;
        fs::create_dir_all(&path)?;
        fs::copy(credentials, path.join(CREDENTIALS_FILE))?;
        info!("Created account {} in {}", name, path.display());
        Ok(path)
    }

    /// Copy an account's credentials into `<project_dir>/.drive-data/` and record the account.
    ///
    /// Returns the project's data directory.
    pub fn setup_project(&self, name: &str, project_dir: &Path) -> Result<PathBuf> {
        let source = self.credentials_path(name)?;
        let data_dir = project_dir.join(DEFAULT_DATA_DIR);
        fs::create_dir_all(&data_dir)?;
        fs::copy(&source, data_dir.join(CREDENTIALS_FILE))?;

        ProjectConfig {
            account_name: name.to_string(),
            accounts_dir: self.accounts_dir.clone(),
        }
        .save(&data_dir)?;

        info!("Set up {} with account {}", data_dir.display(), name);
        Ok(data_dir)
    }

    /// Account a project directory was set up with, if any.
    pub fn project_account(project_dir: &Path) -> Option<String> {
        ProjectConfig::load(&project_dir.join(DEFAULT_DATA_DIR)).map(|c| c.account_name)
    }
}

fn validate_account_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name.contains(['/', '\\'])
        || name == "."
        || name == ".."
    {
        return Err(DriveError::InvalidAccountName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_account_name() {
        assert!(validate_account_name("work").is_ok());
        assert!(validate_account_name("client-a_2").is_ok());

        for bad in ["", " ", "..", ".", "a/b", "a\\b", " work"] {
            assert!(validate_account_name(bad).is_err(), "{:?} accepted", bad);
        }
    }
}
