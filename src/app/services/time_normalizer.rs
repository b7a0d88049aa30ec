//! Wall-clock parsing and day-rollover normalisation
//!
//! The carrier publishes every call as a local wall-clock `HH:MM:SS` without a
//! day component. GTFS wants seconds since the start of the service day, so a
//! train leaving at 23:55 and calling at 00:05 must report 24:05:00. The
//! normaliser walks the calls in order and pushes each time forward by whole
//! days until it is no earlier than the time before it.

use crate::app::models::{ServiceTime, StopCall};
use crate::constants::{DAY, HOUR, MINUTE};
use crate::{Error, Result};

/// Parse `HH:MM:SS`; hours may exceed 23
pub fn parse_wall_clock(value: &str) -> Result<ServiceTime> {
    let trimmed = value.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() != 3 {
        return Err(Error::invalid_time(value, "expected HH:MM:SS"));
    }

    let mut fields = [0u32; 3];
    for (field, part) in fields.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_time(value, "components must be digits"));
        }
        *field = part
            .parse()
            .map_err(|_| Error::invalid_time(value, "component out of range"))?;
    }

    let [hours, minutes, seconds] = fields;
    if minutes >= 60 || seconds >= 60 {
        return Err(Error::invalid_time(
            value,
            "minutes and seconds must be below 60",
        ));
    }

    hours
        .checked_mul(HOUR)
        .and_then(|h| h.checked_add(minutes * MINUTE + seconds))
        .map(ServiceTime::from_seconds)
        .ok_or_else(|| Error::invalid_time(value, "hours out of range"))
}

/// Smallest `time + n * DAY` that is not earlier than `floor`
fn roll_forward(time: ServiceTime, floor: ServiceTime) -> ServiceTime {
    if time >= floor {
        return time;
    }
    let behind = floor.seconds() - time.seconds();
    let days = behind.div_ceil(DAY);
    ServiceTime::from_seconds(time.seconds() + days * DAY)
}

/// Running state of the normaliser across the calls of one train
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeNormalizer {
    prev_departure: ServiceTime,
}

impl TimeNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Departure of the last call seen
    pub fn prev_departure(&self) -> ServiceTime {
        self.prev_departure
    }

    /// Forget the previous departure, as at the start of a train
    pub fn reset(&mut self) {
        self.prev_departure = ServiceTime::default();
    }

    /// Normalise a single call against the running state
    pub fn normalize_call(&mut self, call: &StopCall) -> StopCall {
        let arrival = roll_forward(call.arrival.time, self.prev_departure);
        let departure = roll_forward(call.departure.time, arrival);
        self.prev_departure = departure;
        call.with_times(arrival, departure)
    }

    /// Normalise a sequence of calls, continuing from the running state
    pub fn normalize_calls(&mut self, calls: &[StopCall]) -> Vec<StopCall> {
        calls.iter().map(|call| self.normalize_call(call)).collect()
    }
}
