//! Timetable reader for the carrier's CSV export
//!
//! The export is a semicolon-delimited file encoded in windows-1250 with a
//! Polish header row. Records are decoded and deserialised one at a time so
//! a timetable of several hundred thousand rows never sits in memory.
//!
//! # Architecture
//!
//! - [`TimetableReader`]: opens the export and configures decoding
//! - [`TimetableRows`]: lazy iterator yielding [`TimetableRow`]s
//! - [`ReadStats`]: counts of records read and rejected

use crate::app::models::TimetableRow;
use crate::{Error, Result};
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod stats;

pub use stats::ReadStats;

/// Reader for one timetable export
#[derive(Debug, Clone)]
pub struct TimetableReader {
    path: PathBuf,
}

impl TimetableReader {
    /// Prepare to read the export at `path`
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(Error::configuration(format!(
                "Timetable file does not exist: {}",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the export and iterate over its rows
    pub fn rows(&self) -> Result<TimetableRows<File>> {
        info!("Reading timetable from {}", self.path.display());
        let file = File::open(&self.path).map_err(|e| {
            Error::io(format!("Failed to open timetable {}", self.path.display()), e)
        })?;
        Ok(TimetableRows::from_reader(
            file,
            self.path.display().to_string(),
        ))
    }
}

/// Lazy iterator over the rows of a timetable export
pub struct TimetableRows<R: Read> {
    records: csv::DeserializeRecordsIntoIter<DecodeReaderBytes<R, Vec<u8>>, TimetableRow>,
    source: String,
    stats: ReadStats,
}

impl<R: Read> TimetableRows<R> {
    /// Read windows-1250 encoded CSV from any byte source
    pub fn from_reader(reader: R, source: impl Into<String>) -> Self {
        let decoded = DecodeReaderBytesBuilder::new()
            .encoding(Some(encoding_rs::WINDOWS_1250))
            .build(reader);

        let records = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::Fields)
            .from_reader(decoded)
            .into_deserialize::<TimetableRow>();

        Self {
            records,
            source: source.into(),
            stats: ReadStats::new(),
        }
    }

    /// Statistics for the rows read so far
    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }
}

impl<R: Read> Iterator for TimetableRows<R> {
    type Item = Result<TimetableRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        self.stats.records_read += 1;

        match record {
            Ok(row) => {
                if row.commercial {
                    self.stats.commercial_rows += 1;
                }
                if row.bus {
                    self.stats.bus_rows += 1;
                }
                Some(Ok(row))
            }
            Err(e) => {
                self.stats.records_rejected += 1;
                let position = e
                    .position()
                    .map(|p| format!("line {}", p.line()))
                    .unwrap_or_else(|| format!("record {}", self.stats.records_read));
                debug!("Malformed timetable record at {}: {}", position, e);
                Some(Err(Error::csv_parsing(
                    self.source.clone(),
                    format!("malformed record at {}", position),
                    Some(e),
                )))
            }
        }
    }
}
