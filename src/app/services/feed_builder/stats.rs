//! Feed building statistics

use serde::Serialize;

/// Counts gathered while turning trains into feed records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Row groups seen by the builder
    pub trains_seen: usize,

    /// Trains that produced at least one trip
    pub trains_emitted: usize,

    /// Trains with fewer than two commercial stops or no usable leg
    pub trains_skipped: usize,

    /// Trains split into more than one leg
    pub multi_leg_trains: usize,

    /// Legs dropped because fewer than two of their stops are known
    pub legs_skipped: usize,

    /// Trips written
    pub trips: usize,

    /// Stop times written
    pub stop_times: usize,

    /// Stop times dropped because their station is unknown
    pub stop_times_dropped: usize,

    /// Transfers written
    pub transfers: usize,

    /// Stops whose carrier name disagrees with the stop directory
    pub name_mismatches: usize,
}

impl FeedStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage of trains that produced output
    pub fn emission_rate(&self) -> f64 {
        if self.trains_seen == 0 {
            0.0
        } else {
            (self.trains_emitted as f64 / self.trains_seen as f64) * 100.0
        }
    }

    /// Get a summary string of the build
    pub fn summary(&self) -> String {
        format!(
            "{} of {} trains emitted ({:.1}%), {} trips, {} stop times ({} dropped), {} transfers",
            self.trains_emitted,
            self.trains_seen,
            self.emission_rate(),
            self.trips,
            self.stop_times,
            self.stop_times_dropped,
            self.transfers
        )
    }
}
