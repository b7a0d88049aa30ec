//! Stop directory loading
//!
//! The directory is a comma-separated file with a
//! `stop_id,stop_name,stop_code,stop_lat,stop_lon` header; `stop_code` may be
//! empty or absent. Invalid records are logged and skipped so a single bad
//! line does not take the whole conversion down.

use super::StopRegistry;
use super::metadata::LoadStats;
use crate::app::models::StopRecord;
use crate::{Error, Result};
use std::collections::hash_map::Entry;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

impl StopRegistry {
    /// Load the stop directory from a CSV file
    ///
    /// # Errors
    /// * Returns `Error::StopDirectory` if the file doesn't exist or has no stops
    /// * Returns `Error::Io` for file system access issues
    pub fn load_from_file(path: &Path) -> Result<(Self, LoadStats)> {
        info!("Loading stop directory from {}", path.display());

        if !path.exists() {
            return Err(Error::stop_directory(format!(
                "Stop directory does not exist: {}",
                path.display()
            )));
        }

        let file = std::fs::File::open(path).map_err(|e| {
            Error::io(format!("Failed to open stop directory {}", path.display()), e)
        })?;

        let (mut registry, stats) = Self::load_from_reader(file)?;
        registry.source_path = Some(path.to_path_buf());

        if registry.stop_count() == 0 {
            return Err(Error::stop_directory(format!(
                "No valid stops found in {}",
                path.display()
            )));
        }

        info!("{}", stats.summary());
        Ok((registry, stats))
    }

    /// Load the stop directory from any CSV source
    pub fn load_from_reader<R: Read>(reader: R) -> Result<(Self, LoadStats)> {
        let start_time = Instant::now();
        let mut registry = Self::new();
        let mut stats = LoadStats::new();

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (index, record) in csv_reader.deserialize::<StopRecord>().enumerate() {
            stats.records_read += 1;
            let line = index + 2;

            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping stop directory line {}: {}", line, e);
                    stats.errors.push(format!("line {}: {}", line, e));
                    continue;
                }
            };

            if let Err(e) = record.validate() {
                warn!("Skipping stop directory line {}: {}", line, e);
                stats.errors.push(format!("line {}: {}", line, e));
                continue;
            }

            registry.insert(record, &mut stats);
        }

        stats.load_duration = start_time.elapsed();
        debug!(
            "Stop directory loaded: {} stops, {} aliases",
            registry.stop_count(),
            registry.alias_count()
        );

        Ok((registry, stats))
    }

    /// Build a registry from in-memory records
    pub fn from_records(records: impl IntoIterator<Item = StopRecord>) -> Result<Self> {
        let mut registry = Self::new();
        let mut stats = LoadStats::new();
        for record in records {
            record.validate()?;
            registry.insert(record, &mut stats);
        }
        Ok(registry)
    }

    /// Add a record, keeping the existing entry on duplicate ids or codes
    fn insert(&mut self, mut record: StopRecord, stats: &mut LoadStats) {
        let alias = record
            .stop_code
            .take()
            .filter(|code| !code.is_empty() && *code != record.stop_id);

        match self.stops.entry(record.stop_id.clone()) {
            Entry::Vacant(e) => {
                e.insert(record.clone());
                stats.stops_loaded += 1;
            }
            Entry::Occupied(_) => {
                warn!(
                    "Duplicate stop found: stop_id = {}, name = '{}', keeping existing",
                    record.stop_id, record.stop_name
                );
                stats.duplicates_skipped += 1;
                return;
            }
        }

        if let Some(code) = alias {
            match self.aliases.entry(code) {
                Entry::Vacant(e) => {
                    e.insert(record.stop_id);
                    stats.aliases_loaded += 1;
                }
                Entry::Occupied(e) => {
                    warn!(
                        "Secondary code {} already points at {}, ignoring it for {}",
                        e.key(),
                        e.get(),
                        record.stop_id
                    );
                }
            }
        }
    }
}
