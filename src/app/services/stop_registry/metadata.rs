//! Stop registry loading statistics

use std::time::Duration;

/// Statistics about the stop directory loading process
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    /// Number of records read from the file
    pub records_read: usize,

    /// Number of stops loaded into the registry
    pub stops_loaded: usize,

    /// Number of secondary codes registered
    pub aliases_loaded: usize,

    /// Number of records ignored because their id was already loaded
    pub duplicates_skipped: usize,

    /// Time taken to load the registry
    pub load_duration: Duration,

    /// Records that could not be loaded
    pub errors: Vec<String>,
}

impl LoadStats {
    /// Create new empty load statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records rejected as invalid
    pub fn records_rejected(&self) -> usize {
        self.errors.len()
    }

    /// Check if any errors occurred during loading
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get a summary string of the loading process
    pub fn summary(&self) -> String {
        format!(
            "Read {} records, loaded {} stops and {} secondary codes ({} duplicates, {} rejected) in {:.2}s",
            self.records_read,
            self.stops_loaded,
            self.aliases_loaded,
            self.duplicates_skipped,
            self.records_rejected(),
            self.load_duration.as_secs_f64()
        )
    }
}
