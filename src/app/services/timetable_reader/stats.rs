//! Reading statistics for timetable exports

/// Counts gathered while reading a timetable export
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ReadStats {
    /// Total number of records encountered
    pub records_read: usize,

    /// Records marked as commercial stations
    pub commercial_rows: usize,

    /// Records served by a replacement bus
    pub bus_rows: usize,

    /// Records that could not be deserialised
    pub records_rejected: usize,
}

impl ReadStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of rows served by bus as a percentage
    pub fn bus_share(&self) -> f64 {
        if self.records_read == 0 {
            0.0
        } else {
            (self.bus_rows as f64 / self.records_read as f64) * 100.0
        }
    }
}
