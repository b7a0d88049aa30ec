//! GTFS feed writer
//!
//! Trips, stop times and transfers are streamed to disk as each train is
//! built; the aggregate files (routes, calendar dates, stops) and the static
//! agency, attribution and feed info files are written once at the end.
//!
//! # Architecture
//!
//! - [`GtfsWriter`] - streaming writer for one output directory
//! - [`archive`] - compression of the written files into a feed archive

use crate::app::models::{
    AgencyRecord, AttributionRecord, CalendarDateRecord, FeedInfoRecord, RouteRecord,
    StopTimeRecord, TransferRecord, TripRecord,
};
use crate::app::services::feed_builder::{FeedContext, TrainOutput};
use crate::app::services::stop_registry::{StopDirectory, StopReport};
use crate::config::PublisherInfo;
use crate::constants::{agency, files};
use crate::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub mod archive;

#[cfg(test)]
pub mod tests;

pub use archive::compress_feed;

const TRIPS_HEADER: &[&str] = &[
    "route_id",
    "service_id",
    "trip_id",
    "trip_headsign",
    "trip_short_name",
];

const STOP_TIMES_HEADER: &[&str] = &[
    "trip_id",
    "stop_sequence",
    "stop_id",
    "arrival_time",
    "departure_time",
    "platform",
    "shape_dist_traveled",
];

const TRANSFERS_HEADER: &[&str] = &[
    "from_stop_id",
    "to_stop_id",
    "from_trip_id",
    "to_trip_id",
    "transfer_type",
];

const STOPS_HEADER: &[&str] = &["stop_id", "stop_name", "stop_lat", "stop_lon"];

const MISSING_STOPS_HEADER: &[&str] = &["stop_id", "stop_name"];

/// Descriptive data for the static feed files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedMetadata {
    /// Version of the converted timetable
    pub version: String,

    /// Publisher for `feed_info.txt`; the file is skipped without one
    pub publisher: Option<PublisherInfo>,
}

/// Files written to the output directory
#[derive(Debug, Clone, Default)]
pub struct WriteSummary {
    /// File names with their sizes in bytes
    pub files: Vec<(String, u64)>,
}

impl WriteSummary {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|(_, size)| size).sum()
    }
}

/// Streaming writer for one GTFS output directory
pub struct GtfsWriter {
    dir: PathBuf,
    trips: csv::Writer<File>,
    stop_times: csv::Writer<File>,
    transfers: csv::Writer<File>,
}

impl GtfsWriter {
    /// Create the directory and open the streamed files
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::io(
                format!("Failed to create output directory {}", dir.display()),
                e,
            )
        })?;

        debug!("Writing GTFS files into {}", dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
            trips: open_table(&dir.join(files::TRIPS), TRIPS_HEADER)?,
            stop_times: open_table(&dir.join(files::STOP_TIMES), STOP_TIMES_HEADER)?,
            transfers: open_table(&dir.join(files::TRANSFERS), TRANSFERS_HEADER)?,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append the records of one train
    pub fn write_train(&mut self, output: &TrainOutput) -> Result<()> {
        write_all::<TripRecord>(&mut self.trips, files::TRIPS, &output.trips)?;
        write_all::<StopTimeRecord>(&mut self.stop_times, files::STOP_TIMES, &output.stop_times)?;
        write_all::<TransferRecord>(&mut self.transfers, files::TRANSFERS, &output.transfers)?;
        Ok(())
    }

    /// Flush the streamed files and write the aggregate and static ones
    pub fn finish<D: StopDirectory + ?Sized>(
        mut self,
        ctx: &FeedContext,
        directory: &D,
        metadata: &FeedMetadata,
    ) -> Result<WriteSummary> {
        for (writer, name) in [
            (&mut self.trips, files::TRIPS),
            (&mut self.stop_times, files::STOP_TIMES),
            (&mut self.transfers, files::TRANSFERS),
        ] {
            writer
                .flush()
                .map_err(|e| Error::io(format!("Failed to flush {}", name), e))?;
        }

        self.write_routes(ctx)?;
        self.write_calendar_dates(ctx)?;
        self.write_stops(ctx, directory)?;
        self.write_static(metadata)?;

        let mut summary = WriteSummary::default();
        for entry in std::fs::read_dir(&self.dir)
            .map_err(|e| Error::io(format!("Failed to list {}", self.dir.display()), e))?
        {
            let entry = entry?;
            let size = entry.metadata()?.len();
            summary
                .files
                .push((entry.file_name().to_string_lossy().into_owned(), size));
        }
        summary.files.sort();

        info!(
            "Wrote {} GTFS files ({} bytes) to {}",
            summary.files.len(),
            summary.total_size(),
            self.dir.display()
        );
        Ok(summary)
    }

    fn write_routes(&self, ctx: &FeedContext) -> Result<()> {
        let routes: Vec<RouteRecord> = ctx
            .routes
            .iter()
            .map(|route_id| RouteRecord::from_route_id(route_id))
            .collect();
        write_table(&self.dir.join(files::ROUTES), &routes)
    }

    fn write_calendar_dates(&self, ctx: &FeedContext) -> Result<()> {
        let dates: Vec<CalendarDateRecord> = ctx
            .services
            .iter()
            .map(|service_id| CalendarDateRecord::for_service(service_id))
            .collect();
        write_table(&self.dir.join(files::CALENDAR_DATES), &dates)
    }

    fn write_stops<D: StopDirectory + ?Sized>(&self, ctx: &FeedContext, directory: &D) -> Result<()> {
        let path = self.dir.join(files::STOPS);
        let mut writer = open_table(&path, STOPS_HEADER)?;
        for stop_id in &ctx.used_stops {
            match directory.lookup(stop_id) {
                Some(stop) => writer
                    .serialize(stop)
                    .map_err(|e| Error::csv_parsing(files::STOPS, "Failed to write stop", Some(e)))?,
                None => warn!("Used stop {} vanished from the stop directory", stop_id),
            }
        }
        writer
            .flush()
            .map_err(|e| Error::io(format!("Failed to flush {}", files::STOPS), e))
    }

    fn write_static(&self, metadata: &FeedMetadata) -> Result<()> {
        write_table(&self.dir.join(files::AGENCY), &[AgencyRecord::default()])?;

        let attribution = AttributionRecord {
            organization_name: format!(
                "Schedules provided by: {} S.A. (retrieved {})",
                agency::NAME,
                metadata.version
            ),
            is_producer: 0,
            is_operator: 1,
            is_authority: 0,
            is_data_source: 1,
            attribution_url: agency::URL.to_string(),
        };
        write_table(&self.dir.join(files::ATTRIBUTIONS), &[attribution])?;

        if let Some(publisher) = &metadata.publisher {
            let feed_info = FeedInfoRecord {
                feed_publisher_name: publisher.name.clone(),
                feed_publisher_url: publisher.url.clone(),
                feed_lang: agency::LANG.to_string(),
                feed_version: metadata.version.clone(),
            };
            write_table(&self.dir.join(files::FEED_INFO), &[feed_info])?;
        }

        Ok(())
    }
}

/// Write the report of stations missing from the stop directory
pub fn write_missing_stops(path: &Path, report: &StopReport) -> Result<()> {
    let mut writer = open_table(path, MISSING_STOPS_HEADER)?;
    for record in report.records() {
        writer.serialize(&record).map_err(|e| {
            Error::csv_parsing(path.display().to_string(), "Failed to write row", Some(e))
        })?;
    }
    writer
        .flush()
        .map_err(|e| Error::io(format!("Failed to flush {}", path.display()), e))?;

    if !report.is_empty() {
        warn!(
            "{} stations are missing from the stop directory, see {}",
            report.len(),
            path.display()
        );
    }
    Ok(())
}

/// Open a CSV file and write its header row
fn open_table(path: &Path, header: &[&str]) -> Result<csv::Writer<File>> {
    let file_name = path.display().to_string();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| Error::csv_parsing(&file_name, "Failed to create file", Some(e)))?;
    writer
        .write_record(header)
        .map_err(|e| Error::csv_parsing(&file_name, "Failed to write header", Some(e)))?;
    Ok(writer)
}

/// Write a whole table with a header derived from the record type
fn write_table<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let file_name = path.display().to_string();
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| Error::csv_parsing(&file_name, "Failed to create file", Some(e)))?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| Error::csv_parsing(&file_name, "Failed to write row", Some(e)))?;
    }
    writer
        .flush()
        .map_err(|e| Error::io(format!("Failed to flush {}", file_name), e))
}

fn write_all<T: Serialize>(writer: &mut csv::Writer<File>, name: &str, records: &[T]) -> Result<()> {
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| Error::csv_parsing(name, "Failed to write row", Some(e)))?;
    }
    Ok(())
}
