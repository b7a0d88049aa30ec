//! Stop registry service for canonical stop lookups
//!
//! This module loads the canonical stop directory (a CSV of ids, names,
//! optional secondary codes and coordinates) and reconciles the carrier's
//! station codes against it.
//!
//! # Architecture
//!
//! - [`StopDirectory`]: the narrow lookup capability the converter depends on
//! - [`StopRegistry`]: CSV-backed directory with O(1) lookups by id and alias
//! - [`loader`]: reading and validating the stop directory file
//! - [`reconciler`]: alias resolution, missing-stop tracking and name checks

use crate::app::models::StopRecord;
use std::collections::HashMap;
use std::path::PathBuf;

pub mod loader;
pub mod metadata;
pub mod reconciler;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use metadata::LoadStats;
pub use reconciler::{StopReconciler, StopReport};

/// Lookup capability over canonical stops
pub trait StopDirectory {
    /// Canonical stop with the given id
    fn lookup(&self, stop_id: &str) -> Option<&StopRecord>;

    /// Canonical id for a secondary reference code, if one is registered
    fn resolve_alias(&self, code: &str) -> Option<&str>;
}

/// Stop directory loaded from a CSV file
#[derive(Debug, Clone, Default)]
pub struct StopRegistry {
    /// Stops indexed by canonical id
    pub(crate) stops: HashMap<String, StopRecord>,

    /// Secondary reference code to canonical id
    pub(crate) aliases: HashMap<String, String>,

    /// File the registry was loaded from
    pub(crate) source_path: Option<PathBuf>,
}

impl StopRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a stop by canonical id
    pub fn get_stop(&self, stop_id: &str) -> Option<&StopRecord> {
        self.stops.get(stop_id)
    }

    /// Check if a stop exists in the registry
    pub fn contains_stop(&self, stop_id: &str) -> bool {
        self.stops.contains_key(stop_id)
    }

    /// Get the total number of stops in the registry
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Get the number of registered secondary codes
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// File the registry was loaded from, if any
    pub fn source_path(&self) -> Option<&PathBuf> {
        self.source_path.as_ref()
    }

    /// All stops sorted by id
    pub fn stops_sorted(&self) -> Vec<&StopRecord> {
        let mut stops: Vec<&StopRecord> = self.stops.values().collect();
        stops.sort_by(|a, b| a.stop_id.cmp(&b.stop_id));
        stops
    }
}

impl StopDirectory for StopRegistry {
    fn lookup(&self, stop_id: &str) -> Option<&StopRecord> {
        self.stops.get(stop_id)
    }

    fn resolve_alias(&self, code: &str) -> Option<&str> {
        self.aliases.get(code).map(String::as_str)
    }
}
