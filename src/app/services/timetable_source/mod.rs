//! Timetable sources
//!
//! A source knows when its timetable was last modified and how to place the
//! timetable CSV in a working directory. The carrier ships the CSV inside a
//! ZIP archive; local sources accept either the archive or the bare CSV.
//!
//! # Architecture
//!
//! - [`TimetableSource`] - the seam between the converter and upstream
//! - [`LocalTimetableSource`] - a file on disk
//! - [`credentials`] - FTPS login resolution
//! - `ftp` - the carrier's FTPS server (behind the `ftp` feature)

use crate::constants::{ARCHIVE_CSV_MEMBER, EXTRACTED_CSV_NAME};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod credentials;
#[cfg(feature = "ftp")]
pub mod ftp;


pub use credentials::{FtpCredentials, resolve_credentials};
#[cfg(feature = "ftp")]
pub use ftp::FtpTimetableSource;

/// Where a timetable comes from
pub trait TimetableSource {
    /// Human-readable location, used in logs
    fn describe(&self) -> String;

    /// Modification time of the upstream timetable
    fn modified(&mut self) -> Result<DateTime<Utc>>;

    /// Place the timetable CSV inside `workdir` and return its path
    fn fetch(&mut self, workdir: &Path) -> Result<PathBuf>;
}

/// Timetable CSV or archive on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalTimetableSource {
    path: PathBuf,
}

impl LocalTimetableSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_archive(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    }
}

impl TimetableSource for LocalTimetableSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn modified(&mut self) -> Result<DateTime<Utc>> {
        let modified = fs::metadata(&self.path)
            .and_then(|metadata| metadata.modified())
            .map_err(|e| {
                Error::io(
                    format!("Failed to read modification time of {}", self.path.display()),
                    e,
                )
            })?;
        Ok(DateTime::<Utc>::from(modified))
    }

    fn fetch(&mut self, workdir: &Path) -> Result<PathBuf> {
        if !self.is_archive() {
            debug!("Using timetable CSV {} directly", self.path.display());
            return Ok(self.path.clone());
        }

        let file = File::open(&self.path)
            .map_err(|e| Error::io(format!("Failed to open {}", self.path.display()), e))?;
        extract_timetable(file, workdir)
    }
}

/// Extract the timetable CSV from the carrier's archive into `workdir`
pub fn extract_timetable<R: Read + Seek>(archive: R, workdir: &Path) -> Result<PathBuf> {
    let mut archive = zip::ZipArchive::new(archive)
        .map_err(|e| Error::archive("Failed to open timetable archive", e))?;

    let Some(index) = archive.index_for_name(ARCHIVE_CSV_MEMBER) else {
        let available: Vec<String> = archive.file_names().map(str::to_string).collect();
        return Err(Error::archive_member_not_found(ARCHIVE_CSV_MEMBER, &available));
    };

    let mut member = archive
        .by_index(index)
        .map_err(|e| Error::archive(format!("Failed to read {}", ARCHIVE_CSV_MEMBER), e))?;

    let target = workdir.join(EXTRACTED_CSV_NAME);
    let mut output = BufWriter::new(
        File::create(&target)
            .map_err(|e| Error::io(format!("Failed to create {}", target.display()), e))?,
    );
    let bytes = std::io::copy(&mut member, &mut output)
        .map_err(|e| Error::io(format!("Failed to extract {}", ARCHIVE_CSV_MEMBER), e))?;

    info!("Extracted {} ({} bytes)", ARCHIVE_CSV_MEMBER, bytes);
    Ok(target)
}
