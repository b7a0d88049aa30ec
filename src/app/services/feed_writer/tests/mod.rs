//! Shared test utilities and fixtures for feed writer tests

use crate::app::models::{ServiceTime, StopTimeRecord, TransferRecord, TripRecord};
use crate::app::services::feed_builder::{FeedContext, TrainOutput};
use std::path::Path;

pub mod archive_tests;

/// Output of a two-leg train between stations 1, 2 and 3
pub fn create_test_output() -> TrainOutput {
    let stop_time = |trip: &str, sequence: u32, stop: &str, hour: u32, dist: i64| StopTimeRecord {
        trip_id: trip.to_string(),
        stop_sequence: sequence,
        stop_id: stop.to_string(),
        arrival_time: ServiceTime::from_hms(hour, 0, 0),
        departure_time: ServiceTime::from_hms(hour, 5, 0),
        platform: String::new(),
        shape_dist_traveled: dist,
    };
    let trip = |route: &str, trip_id: &str| TripRecord {
        route_id: route.to_string(),
        service_id: "2024-01-01".to_string(),
        trip_id: trip_id.to_string(),
        trip_headsign: "Station 3".to_string(),
        trip_short_name: "1600".to_string(),
    };

    TrainOutput {
        trips: vec![trip("IC", "2024-01-01_16000_0"), trip("ZKA IC", "2024-01-01_16000_1")],
        stop_times: vec![
            stop_time("2024-01-01_16000_0", 0, "1", 8, 0),
            stop_time("2024-01-01_16000_0", 1, "2", 9, 1000),
            stop_time("2024-01-01_16000_1", 0, "2", 9, 0),
            stop_time("2024-01-01_16000_1", 1, "3", 25, 2500),
        ],
        transfers: vec![TransferRecord::guaranteed(
            "2",
            "2024-01-01_16000_0",
            "2024-01-01_16000_1",
        )],
    }
}

/// Context matching [`create_test_output`]
pub fn create_test_context() -> FeedContext {
    let mut ctx = FeedContext::new();
    for stop in ["1", "2", "3"] {
        ctx.add_used_stop(stop);
    }
    ctx.add_route("IC");
    ctx.add_route("ZKA IC");
    ctx.add_service("2024-01-01");
    ctx
}

/// Lines of a written file
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
