//! Data models for timetable conversion
//!
//! This module contains the carrier timetable record, the typed stop calls a
//! train is built from, and the GTFS records emitted for every train.

use crate::constants::{self, BUS_ROUTE_MARKER, DAY, ROUTE_TYPE_BUS, ROUTE_TYPE_RAIL};
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Carrier Timetable Record
// =============================================================================

/// One record of the carrier's `KPD_Rozklad.csv` export
///
/// Column names follow the carrier's Polish headers. Rows are never mutated
/// after reading; later stages build [`StopCall`] values from them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimetableRow {
    /// Service (departure) date of the train, `YYYY-MM-DD`
    #[serde(rename = "DataOdjazdu")]
    pub service_date: String,

    /// Internal train number, may contain `/`
    #[serde(rename = "NrPociagu")]
    pub train_number: String,

    /// Position of the row within the train
    #[serde(rename = "Lp")]
    pub sequence: u32,

    /// Whether passengers may board or alight here
    #[serde(rename = "StacjaHandlowa", deserialize_with = "deserialize_flag")]
    pub commercial: bool,

    /// Carrier station code
    #[serde(rename = "NumerStacji")]
    pub station_code: String,

    /// Carrier station name
    #[serde(rename = "NazwaStacji")]
    pub station_name: String,

    /// Scheduled arrival, `HH:MM:SS`
    #[serde(rename = "Przyjazd", default)]
    pub arrival_time: String,

    /// Scheduled departure, `HH:MM:SS`
    #[serde(rename = "Odjazd", default)]
    pub departure_time: String,

    #[serde(rename = "PeronWjazd", default)]
    pub arrival_platform: String,

    #[serde(rename = "PeronWyjazd", default)]
    pub departure_platform: String,

    #[serde(rename = "TorWjazd", default)]
    pub arrival_track: String,

    #[serde(rename = "TorWyjazd", default)]
    pub departure_track: String,

    /// Whether this stop is served by a replacement bus
    #[serde(rename = "BUS", deserialize_with = "deserialize_flag", default)]
    pub bus: bool,

    /// Cumulative distance from the train's origin in meters
    #[serde(
        rename = "DrogaKumulowanaMetry",
        deserialize_with = "deserialize_distance",
        default
    )]
    pub cumulative_distance_m: i64,

    /// Commercial category, e.g. `IC` or `TLK`
    #[serde(rename = "KategoriaHandlowa", default)]
    pub category: String,

    /// Rider-facing train number
    #[serde(rename = "NrPociaguHandlowy", default)]
    pub commercial_number: String,

    /// Train name, e.g. `PRZEMYŚLANIN`
    #[serde(rename = "NazwaPociagu", default)]
    pub train_name: String,
}

impl TimetableRow {
    /// Grouping key of the train this row belongs to
    pub fn train_key(&self) -> TrainKey {
        TrainKey {
            service_date: self.service_date.clone(),
            train_number: self.train_number.clone(),
        }
    }

    /// Transport mode serving this row
    pub fn mode(&self) -> TravelMode {
        TravelMode::from_bus_flag(self.bus)
    }
}

/// Check a boolean-like carrier value
pub fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    constants::TRUE_FLAGS
        .iter()
        .any(|flag| flag.eq_ignore_ascii_case(value))
}

/// Check whether a carrier value means "not specified"
pub fn is_empty_marker(value: &str) -> bool {
    let value = value.trim();
    constants::EMPTY_MARKERS
        .iter()
        .any(|marker| marker.eq_ignore_ascii_case(value))
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_flag(&raw))
}

fn deserialize_distance<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if is_empty_marker(raw) {
        return Ok(0);
    }
    raw.parse::<i64>()
        .map_err(|e| serde::de::Error::custom(format!("invalid distance '{}': {}", raw, e)))
}

/// Key identifying one train run: (service date, train number)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainKey {
    pub service_date: String,
    pub train_number: String,
}

impl fmt::Display for TrainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.service_date, self.train_number)
    }
}

// =============================================================================
// Travel Mode
// =============================================================================

/// Vehicle serving a stop: the train itself or a replacement bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelMode {
    Train,
    Bus,
}

impl TravelMode {
    pub fn from_bus_flag(bus: bool) -> Self {
        if bus { Self::Bus } else { Self::Train }
    }

    pub fn is_bus(self) -> bool {
        self == Self::Bus
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => write!(f, "train"),
            Self::Bus => write!(f, "bus"),
        }
    }
}

// =============================================================================
// Service Time
// =============================================================================

/// Seconds since midnight of the service day
///
/// Values past 24:00:00 are legal and denote overnight running; they are
/// displayed as `HH:MM:SS` with `HH >= 24`, as GTFS expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceTime(u32);

impl ServiceTime {
    pub const fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self(hours * constants::HOUR + minutes * constants::MINUTE + seconds)
    }

    pub const fn seconds(self) -> u32 {
        self.0
    }

    /// The same wall-clock time one service day later
    pub const fn next_day(self) -> Self {
        Self(self.0 + DAY)
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / constants::HOUR;
        let minutes = (self.0 % constants::HOUR) / constants::MINUTE;
        let seconds = self.0 % constants::MINUTE;
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

impl FromStr for ServiceTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        crate::app::services::time_normalizer::parse_wall_clock(s)
    }
}

impl Serialize for ServiceTime {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

// =============================================================================
// Stop Calls
// =============================================================================

/// One side (arrival or departure) of a stop call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSide {
    pub time: ServiceTime,
    pub platform: String,
    pub track: String,
}

impl CallSide {
    /// This side with empty platform/track filled in from `other`
    fn filled_from(&self, other: &CallSide) -> CallSide {
        CallSide {
            time: self.time,
            platform: if is_empty_marker(&self.platform) {
                other.platform.clone()
            } else {
                self.platform.clone()
            },
            track: if is_empty_marker(&self.track) {
                other.track.clone()
            } else {
                self.track.clone()
            },
        }
    }
}

/// Which side of a call was copied from its counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backfill {
    /// Both sides come from the timetable
    #[default]
    None,
    /// Arrival data is a copy of the departure (start of a leg)
    ArrivalFromDeparture,
    /// Departure data is a copy of the arrival (end of a leg)
    DepartureFromArrival,
}

/// A train calling at one commercial station
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopCall {
    /// Position within the train, from the timetable
    pub sequence: u32,
    /// Station code; canonical once reconciled
    pub station_code: String,
    /// Carrier station name
    pub station_name: String,
    pub arrival: CallSide,
    pub departure: CallSide,
    pub mode: TravelMode,
    /// Cumulative distance from the train's origin in meters
    pub distance_m: i64,
    pub backfill: Backfill,
}

impl StopCall {
    /// Build a call from a timetable row
    ///
    /// A missing arrival falls back to the departure and vice versa; a row
    /// with neither, or with a malformed time, is rejected.
    pub fn from_row(row: &TimetableRow) -> Result<Self> {
        let arrival = parse_optional_time(&row.arrival_time)?;
        let departure = parse_optional_time(&row.departure_time)?;

        let (arrival_time, departure_time, backfill) = match (arrival, departure) {
            (Some(arr), Some(dep)) => (arr, dep, Backfill::None),
            (None, Some(dep)) => (dep, dep, Backfill::ArrivalFromDeparture),
            (Some(arr), None) => (arr, arr, Backfill::DepartureFromArrival),
            (None, None) => {
                return Err(Error::invalid_time(
                    "",
                    format!(
                        "train {} has neither arrival nor departure at station {} ({})",
                        row.train_key(),
                        row.station_code,
                        row.station_name
                    ),
                ));
            }
        };

        Ok(Self {
            sequence: row.sequence,
            station_code: row.station_code.trim().to_string(),
            station_name: row.station_name.trim().to_string(),
            arrival: CallSide {
                time: arrival_time,
                platform: row.arrival_platform.trim().to_string(),
                track: row.arrival_track.trim().to_string(),
            },
            departure: CallSide {
                time: departure_time,
                platform: row.departure_platform.trim().to_string(),
                track: row.departure_track.trim().to_string(),
            },
            mode: row.mode(),
            distance_m: row.cumulative_distance_m,
            backfill,
        })
    }

    /// Copy of this call carrying only departure data, served by `mode`
    pub fn departure_only(&self, mode: TravelMode) -> Self {
        let departure = self.departure.filled_from(&self.arrival);
        Self {
            arrival: departure.clone(),
            departure,
            mode,
            backfill: Backfill::ArrivalFromDeparture,
            ..self.clone()
        }
    }

    /// Copy of this call carrying only arrival data, served by `mode`
    pub fn arrival_only(&self, mode: TravelMode) -> Self {
        let arrival = self.arrival.filled_from(&self.departure);
        Self {
            departure: arrival.clone(),
            arrival,
            mode,
            backfill: Backfill::DepartureFromArrival,
            ..self.clone()
        }
    }

    /// Copy of this call with replaced times
    pub fn with_times(&self, arrival: ServiceTime, departure: ServiceTime) -> Self {
        let mut call = self.clone();
        call.arrival.time = arrival;
        call.departure.time = departure;
        call
    }

    /// Copy of this call with a different station code
    pub fn with_station_code(&self, station_code: impl Into<String>) -> Self {
        Self {
            station_code: station_code.into(),
            ..self.clone()
        }
    }
}

fn parse_optional_time(value: &str) -> Result<Option<ServiceTime>> {
    if is_empty_marker(value) {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

// =============================================================================
// Trains and Legs
// =============================================================================

/// Commercial calls of one train run, in timetable order
#[derive(Debug, Clone, PartialEq)]
pub struct Train {
    pub key: TrainKey,
    /// Commercial category as published
    pub category: String,
    pub commercial_number: String,
    pub name: String,
    pub calls: Vec<StopCall>,
}

impl Train {
    /// Name of the final commercial stop
    pub fn headsign(&self) -> &str {
        self.calls
            .last()
            .map(|call| call.station_name.as_str())
            .unwrap_or_default()
    }
}

/// Contiguous part of a train served by a single mode
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub mode: TravelMode,
    pub calls: Vec<StopCall>,
}

impl Leg {
    /// Station where this leg hands over to the next one
    pub fn coupling_station(&self) -> Option<&str> {
        self.calls.last().map(|call| call.station_code.as_str())
    }
}

// =============================================================================
// Stop Directory Records
// =============================================================================

/// Canonical stop from the stop directory
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StopRecord {
    /// Canonical stop id
    pub stop_id: String,

    /// Display name
    pub stop_name: String,

    /// Secondary reference code the carrier may use instead of the id
    #[serde(default, skip_serializing)]
    pub stop_code: Option<String>,

    /// WGS84 latitude
    pub stop_lat: f64,

    /// WGS84 longitude
    pub stop_lon: f64,
}

impl StopRecord {
    pub fn new(
        stop_id: impl Into<String>,
        stop_name: impl Into<String>,
        stop_code: Option<String>,
        stop_lat: f64,
        stop_lon: f64,
    ) -> Result<Self> {
        let record = Self {
            stop_id: stop_id.into(),
            stop_name: stop_name.into(),
            stop_code,
            stop_lat,
            stop_lon,
        };
        record.validate()?;
        Ok(record)
    }

    /// Validate identifiers and coordinate ranges
    pub fn validate(&self) -> Result<()> {
        if self.stop_id.trim().is_empty() {
            return Err(Error::data_validation("Stop id cannot be empty"));
        }

        if self.stop_name.trim().is_empty() {
            return Err(Error::data_validation(format!(
                "Stop {} has an empty name",
                self.stop_id
            )));
        }

        if !(-90.0..=90.0).contains(&self.stop_lat) {
            return Err(Error::data_validation(format!(
                "Invalid latitude {} for stop {}: must be between -90 and 90 degrees",
                self.stop_lat, self.stop_id
            )));
        }

        if !(-180.0..=180.0).contains(&self.stop_lon) {
            return Err(Error::data_validation(format!(
                "Invalid longitude {} for stop {}: must be between -180 and 180 degrees",
                self.stop_lon, self.stop_id
            )));
        }

        Ok(())
    }
}

// =============================================================================
// GTFS Records
// =============================================================================

/// `agency.txt` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgencyRecord {
    pub agency_id: String,
    pub agency_name: String,
    pub agency_url: String,
    pub agency_timezone: String,
    pub agency_lang: String,
    pub agency_phone: String,
}

impl Default for AgencyRecord {
    fn default() -> Self {
        use crate::constants::agency;
        Self {
            agency_id: agency::ID.to_string(),
            agency_name: agency::NAME.to_string(),
            agency_url: agency::URL.to_string(),
            agency_timezone: agency::TIMEZONE.to_string(),
            agency_lang: agency::LANG.to_string(),
            agency_phone: agency::PHONE.to_string(),
        }
    }
}

/// `routes.txt` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRecord {
    pub agency_id: String,
    pub route_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
    pub route_type: u8,
    pub route_color: String,
    pub route_text_color: String,
}

impl RouteRecord {
    /// Route for a route id, typed and coloured from the id itself
    pub fn from_route_id(route_id: &str) -> Self {
        let (color, text_color) = constants::route_color(route_id);
        let route_type = if route_id.contains(BUS_ROUTE_MARKER) {
            ROUTE_TYPE_BUS
        } else {
            ROUTE_TYPE_RAIL
        };

        Self {
            agency_id: constants::agency::ID.to_string(),
            route_id: route_id.to_string(),
            route_short_name: route_id.to_string(),
            route_long_name: String::new(),
            route_type,
            route_color: color.to_string(),
            route_text_color: text_color.to_string(),
        }
    }
}

/// `calendar_dates.txt` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDateRecord {
    pub service_id: String,
    pub date: String,
    pub exception_type: u8,
}

impl CalendarDateRecord {
    /// Single-day service for a `YYYY-MM-DD` service id
    pub fn for_service(service_id: &str) -> Self {
        Self {
            service_id: service_id.to_string(),
            date: service_id.replace('-', ""),
            exception_type: constants::EXCEPTION_TYPE_ADDED,
        }
    }
}

/// `trips.txt` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
    pub trip_headsign: String,
    pub trip_short_name: String,
}

/// `stop_times.txt` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopTimeRecord {
    pub trip_id: String,
    pub stop_sequence: u32,
    pub stop_id: String,
    pub arrival_time: ServiceTime,
    pub departure_time: ServiceTime,
    pub platform: String,
    /// Meters from the first stop of the trip
    pub shape_dist_traveled: i64,
}

/// `transfers.txt` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferRecord {
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub from_trip_id: String,
    pub to_trip_id: String,
    pub transfer_type: u8,
}

impl TransferRecord {
    /// Guaranteed in-seat connection between two legs at one stop
    pub fn guaranteed(stop_id: &str, from_trip_id: &str, to_trip_id: &str) -> Self {
        Self {
            from_stop_id: stop_id.to_string(),
            to_stop_id: stop_id.to_string(),
            from_trip_id: from_trip_id.to_string(),
            to_trip_id: to_trip_id.to_string(),
            transfer_type: constants::TRANSFER_TYPE_GUARANTEED,
        }
    }
}

/// `attributions.txt` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionRecord {
    pub organization_name: String,
    pub is_producer: u8,
    pub is_operator: u8,
    pub is_authority: u8,
    pub is_data_source: u8,
    pub attribution_url: String,
}

/// `feed_info.txt` row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedInfoRecord {
    pub feed_publisher_name: String,
    pub feed_publisher_url: String,
    pub feed_lang: String,
    pub feed_version: String,
}

/// Row of the missing stops report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingStopRecord {
    pub stop_id: String,
    pub stop_name: String,
}
