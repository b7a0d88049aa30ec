//! Shared test utilities and fixtures for stop registry tests

use crate::app::models::{Backfill, CallSide, ServiceTime, StopCall, StopRecord, TravelMode};
use std::fs;
use std::path::{Path, PathBuf};


/// Create a test stop
pub fn create_test_stop(id: &str, name: &str, code: Option<&str>) -> StopRecord {
    StopRecord::new(id, name, code.map(str::to_string), 52.0, 21.0).unwrap()
}

/// Create a call at a carrier station
pub fn create_test_call(code: &str, name: &str) -> StopCall {
    let side = CallSide {
        time: ServiceTime::from_hms(12, 0, 0),
        platform: String::new(),
        track: String::new(),
    };
    StopCall {
        sequence: 1,
        station_code: code.to_string(),
        station_name: name.to_string(),
        arrival: side.clone(),
        departure: side,
        mode: TravelMode::Train,
        distance_m: 0,
        backfill: Backfill::None,
    }
}

/// Write a stop directory file
pub fn create_test_stops_file(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("stops.csv");
    fs::write(&path, content).unwrap();
    path
}

pub const TEST_STOPS_CSV: &str = "\
stop_id,stop_name,stop_code,stop_lat,stop_lon
33605,Warszawa Centralna,,52.228858,21.003341
80416,Kraków Główny,KRK,50.067698,19.947483
5100069,Bohumín,,49.904,18.355
";
