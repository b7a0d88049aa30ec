//! FTPS login resolution

use crate::constants::{CREDENTIALS_ENV, CREDENTIALS_PATH_ENV};
use crate::{Error, Result};
use std::fmt;

/// Login for the carrier's FTPS server
#[derive(Clone, PartialEq, Eq)]
pub struct FtpCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for FtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl FtpCredentials {
    /// Parse `username,password`, splitting on the first comma
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim_start_matches('\u{feff}').trim();
        if value.is_empty() {
            return Err(Error::credentials("credentials are empty"));
        }

        let (username, password) = value.split_once(',').unwrap_or((value, ""));
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Resolve credentials from the process environment
pub fn resolve_credentials() -> Result<FtpCredentials> {
    resolve_from(|name| std::env::var(name).ok())
}

/// Resolve credentials through an environment lookup
///
/// The inline variable wins; otherwise the path variable names a file holding
/// the same `username,password` text.
pub fn resolve_from(lookup: impl Fn(&str) -> Option<String>) -> Result<FtpCredentials> {
    if let Some(value) = lookup(CREDENTIALS_ENV).filter(|v| !v.trim().is_empty()) {
        return FtpCredentials::parse(&value);
    }

    if let Some(path) = lookup(CREDENTIALS_PATH_ENV).filter(|v| !v.trim().is_empty()) {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::io(format!("Failed to read credentials file {}", path), e))?;
        return FtpCredentials::parse(&content);
    }

    Err(Error::credentials(format!(
        "{} environment variable not set",
        CREDENTIALS_ENV
    )))
}
