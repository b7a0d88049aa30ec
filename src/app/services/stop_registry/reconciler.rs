//! Reconciliation of carrier station codes with canonical stops

use super::StopDirectory;
use crate::app::models::{MissingStopRecord, StopCall, StopRecord};
use crate::constants::FIX_STOPS;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Carrier stations absent from the stop directory
///
/// Each station code is kept once, with the first name it was seen under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopReport {
    missing: BTreeMap<String, String>,
}

impl StopReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a missing station; returns true the first time a code is seen
    pub fn record_missing(&mut self, code: &str, name: &str) -> bool {
        if self.missing.contains_key(code) {
            return false;
        }
        self.missing.insert(code.to_string(), name.to_string());
        true
    }

    pub fn contains(&self, code: &str) -> bool {
        self.missing.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.missing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    /// Report rows ordered by station code
    pub fn records(&self) -> impl Iterator<Item = MissingStopRecord> + '_ {
        self.missing.iter().map(|(code, name)| MissingStopRecord {
            stop_id: code.clone(),
            stop_name: name.clone(),
        })
    }
}

/// Carrier display name with known misspellings corrected, upper-cased
pub fn corrected_name(carrier_name: &str) -> String {
    let upper = carrier_name.trim().to_uppercase();
    FIX_STOPS
        .iter()
        .find(|(wrong, _)| *wrong == upper)
        .map(|(_, right)| right.to_string())
        .unwrap_or(upper)
}

/// Maps carrier station codes onto canonical stops
pub struct StopReconciler<'a, D: StopDirectory + ?Sized> {
    directory: &'a D,
    warned: HashSet<String>,
    name_mismatches: usize,
}

impl<'a, D: StopDirectory + ?Sized> StopReconciler<'a, D> {
    pub fn new(directory: &'a D) -> Self {
        Self {
            directory,
            warned: HashSet::new(),
            name_mismatches: 0,
        }
    }

    /// Canonical stop for a carrier code, following secondary codes first
    pub fn resolve(&self, code: &str) -> Option<&'a StopRecord> {
        let canonical = self.directory.resolve_alias(code).unwrap_or(code);
        self.directory.lookup(canonical)
    }

    /// Rewrite a call onto its canonical stop
    ///
    /// Unknown stations are added to `report` and yield `None`.
    pub fn reconcile(&mut self, call: &StopCall, report: &mut StopReport) -> Option<StopCall> {
        let Some(stop) = self.resolve(&call.station_code) else {
            if report.record_missing(&call.station_code, &call.station_name) {
                debug!(
                    "Station {} ({}) missing from stop directory",
                    call.station_code, call.station_name
                );
            }
            return None;
        };

        self.check_name(stop, &call.station_name);
        Some(call.with_station_code(stop.stop_id.clone()))
    }

    /// Warn once per stop when the carrier name disagrees with the directory
    fn check_name(&mut self, stop: &StopRecord, carrier_name: &str) {
        let expected = stop.stop_name.trim().to_uppercase();
        if corrected_name(carrier_name) == expected {
            return;
        }

        if self.warned.insert(stop.stop_id.clone()) {
            self.name_mismatches += 1;
            warn!(
                "Stop {} is named '{}' by the carrier but '{}' in the stop directory",
                stop.stop_id, carrier_name, stop.stop_name
            );
        }
    }

    /// Number of stops whose names disagreed
    pub fn name_mismatches(&self) -> usize {
        self.name_mismatches
    }
}
