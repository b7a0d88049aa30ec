//! Shared test utilities and fixtures for feed builder tests

use crate::app::models::{StopRecord, TimetableRow, TrainKey};
use crate::app::services::stop_registry::StopRegistry;

pub mod builder_tests;

/// Builder for timetable rows of one test train
pub struct TrainFixture {
    pub date: String,
    pub number: String,
    pub category: String,
    pub commercial_number: String,
    pub name: String,
    rows: Vec<TimetableRow>,
}

impl TrainFixture {
    pub fn new(date: &str, number: &str) -> Self {
        Self {
            date: date.to_string(),
            number: number.to_string(),
            category: "IC".to_string(),
            commercial_number: "1600".to_string(),
            name: String::new(),
            rows: Vec::new(),
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn named(mut self, commercial_number: &str, name: &str) -> Self {
        self.commercial_number = commercial_number.to_string();
        self.name = name.to_string();
        self
    }

    /// Append a commercial call
    pub fn call(self, code: &str, arrival: &str, departure: &str, bus: bool, distance_m: i64) -> Self {
        self.row(code, arrival, departure, bus, distance_m, true)
    }

    /// Append a technical stop
    pub fn pass(self, code: &str, time: &str) -> Self {
        self.row(code, time, time, false, 0, false)
    }

    fn row(
        mut self,
        code: &str,
        arrival: &str,
        departure: &str,
        bus: bool,
        distance_m: i64,
        commercial: bool,
    ) -> Self {
        let sequence = self.rows.len() as u32 + 1;
        self.rows.push(TimetableRow {
            service_date: self.date.clone(),
            train_number: self.number.clone(),
            sequence,
            commercial,
            station_code: code.to_string(),
            station_name: format!("Station {}", code),
            arrival_time: arrival.to_string(),
            departure_time: departure.to_string(),
            arrival_platform: "III".to_string(),
            departure_platform: if bus { "BUS".to_string() } else { String::new() },
            arrival_track: String::new(),
            departure_track: String::new(),
            bus,
            cumulative_distance_m: distance_m,
            category: self.category.clone(),
            commercial_number: self.commercial_number.clone(),
            train_name: self.name.clone(),
        });
        self
    }

    pub fn key(&self) -> TrainKey {
        TrainKey {
            service_date: self.date.clone(),
            train_number: self.number.clone(),
        }
    }

    pub fn rows(&self) -> &[TimetableRow] {
        &self.rows
    }
}

/// Stop directory containing the given station codes
pub fn create_test_registry(codes: &[&str]) -> StopRegistry {
    StopRegistry::from_records(codes.iter().map(|code| StopRecord {
        stop_id: code.to_string(),
        stop_name: format!("Station {}", code),
        stop_code: None,
        stop_lat: 52.0,
        stop_lon: 21.0,
    }))
    .unwrap()
}
