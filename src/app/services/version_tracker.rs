//! Timetable version marker
//!
//! The version of a timetable is the modification time of its upstream file
//! rendered in the carrier's timezone. The version of the last successful
//! conversion is kept in a one-line marker file, and a run whose upstream
//! version matches it does nothing unless forced.

use crate::constants::{CARRIER_TIMEZONE, VERSION_FORMAT};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Render a modification time as a version string
pub fn format_version(modified: DateTime<Utc>) -> String {
    modified
        .with_timezone(&CARRIER_TIMEZONE)
        .format(VERSION_FORMAT)
        .to_string()
}

/// Parse an FTP `MDTM` reply (`213 YYYYMMDDHHMMSS[.sss]`) as a UTC instant
pub fn parse_mdtm(reply: &str) -> Result<DateTime<Utc>> {
    let value = reply.trim();
    let value = value.strip_prefix("213").map(str::trim_start).unwrap_or(value);

    let naive = if value.len() == 14 {
        NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M%S")
    } else if value.len() > 15 {
        let end = value
            .char_indices()
            .nth(21)
            .map_or(value.len(), |(index, _)| index);
        NaiveDateTime::parse_from_str(&value[..end], "%Y%m%d%H%M%S%.f")
    } else {
        return Err(Error::invalid_time(reply, "unexpected MDTM timestamp length"));
    };

    naive
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::datetime_parsing(format!("Invalid MDTM reply '{}'", reply), e))
}

/// Outcome of comparing an upstream version with the recorded one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionDecision {
    /// Upstream differs from the recorded version
    Changed { previous: Option<String> },
    /// Upstream matches the recorded version
    Unchanged,
    /// Upstream matches, but conversion was requested anyway
    Forced,
}

impl VersionDecision {
    pub fn should_convert(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Reads and writes the version marker file
#[derive(Debug, Clone)]
pub struct VersionTracker {
    path: PathBuf,
}

impl VersionTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version of the last successful conversion, if any
    pub fn read_current(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let version = content.trim();
                Ok((!version.is_empty()).then(|| version.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(
                format!("Failed to read version marker {}", self.path.display()),
                e,
            )),
        }
    }

    /// Compare an upstream version with the recorded one
    pub fn decide(&self, upstream: &str, force: bool) -> Result<VersionDecision> {
        let current = self.read_current()?;
        debug!(
            "Upstream version {}, recorded version {:?}",
            upstream, current
        );

        let decision = match current {
            Some(current) if current == upstream => {
                if force {
                    VersionDecision::Forced
                } else {
                    VersionDecision::Unchanged
                }
            }
            previous => VersionDecision::Changed { previous },
        };
        Ok(decision)
    }

    /// Record a successfully converted version
    ///
    /// The marker is replaced atomically, so an interrupted write leaves the
    /// previous version in place.
    pub fn record(&self, version: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::io(format!("Failed to create {}", parent.display()), e)
            })?;
        }

        let staging = self.path.with_extension("tmp");
        fs::write(&staging, format!("{}\n", version))
            .map_err(|e| Error::io(format!("Failed to write {}", staging.display()), e))?;
        fs::rename(&staging, &self.path).map_err(|e| {
            Error::io(
                format!("Failed to replace version marker {}", self.path.display()),
                e,
            )
        })?;

        info!("Recorded timetable version {}", version);
        Ok(())
    }
}
