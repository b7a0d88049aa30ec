//! Run-scoped accumulators shared by every train of a conversion

use super::stats::FeedStats;
use crate::app::services::stop_registry::StopReport;
use std::collections::BTreeSet;

/// Everything a conversion accumulates across trains
///
/// All collections are sets, so feeding the same train twice leaves them
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct FeedContext {
    /// Canonical ids of stops referenced by at least one stop time
    pub used_stops: BTreeSet<String>,

    /// Carrier stations missing from the stop directory
    pub missing_stops: StopReport,

    /// Distinct route ids
    pub routes: BTreeSet<String>,

    /// Distinct service ids (service dates)
    pub services: BTreeSet<String>,

    pub stats: FeedStats,
}

impl FeedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_route(&mut self, route_id: &str) {
        if !self.routes.contains(route_id) {
            self.routes.insert(route_id.to_string());
        }
    }

    pub fn add_service(&mut self, service_id: &str) {
        if !self.services.contains(service_id) {
            self.services.insert(service_id.to_string());
        }
    }

    pub fn add_used_stop(&mut self, stop_id: &str) {
        if !self.used_stops.contains(stop_id) {
            self.used_stops.insert(stop_id.to_string());
        }
    }
}
