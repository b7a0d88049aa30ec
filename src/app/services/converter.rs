//! End-to-end conversion of one timetable into a GTFS feed
//!
//! The converter ties the services together: it checks the upstream version,
//! fetches the timetable, streams it train by train through the feed builder
//! into a staging directory and only then makes the result authoritative by
//! swapping it into place, compressing it and recording the version.

use crate::app::services::feed_builder::{FeedBuilder, FeedContext, FeedStats};
use crate::app::services::feed_writer::{
    FeedMetadata, GtfsWriter, WriteSummary, compress_feed, write_missing_stops,
};
use crate::app::services::stop_registry::{LoadStats, StopRegistry};
use crate::app::services::timetable_reader::{ReadStats, TimetableReader};
use crate::app::services::timetable_source::{LocalTimetableSource, TimetableSource};
use crate::app::services::train_grouper::TrainGroups;
use crate::app::services::version_tracker::{VersionDecision, VersionTracker, format_version};
use crate::config::ConvertConfig;
use crate::constants::PROGRESS_UPDATE_INTERVAL;
use crate::{Error, Result};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of a conversion run
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The upstream version was already converted
    Skipped { version: String },
    /// A new feed was written
    Converted(Box<ConversionReport>),
}

/// Everything worth reporting about a completed conversion
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub version: String,
    pub previous_version: Option<String>,
    pub forced: bool,
    pub read: ReadStats,
    pub stops: LoadStats,
    pub feed: FeedStats,
    pub missing_stops: usize,
    pub files: WriteSummary,
    pub archive_path: PathBuf,
    pub archive_entries: usize,
    pub duration: Duration,
}

/// Build the timetable source a configuration asks for
pub fn open_source(config: &ConvertConfig) -> Result<Box<dyn TimetableSource>> {
    #[cfg(feature = "ftp")]
    if config.use_ftp {
        use crate::app::services::timetable_source::FtpTimetableSource;
        return Ok(Box::new(FtpTimetableSource::new(config.ftp_remote_path.clone())));
    }

    match &config.timetable_path {
        Some(path) => Ok(Box::new(LocalTimetableSource::new(path))),
        None => Err(Error::configuration("No timetable source configured")),
    }
}

/// Runs conversions for one configuration
pub struct Converter {
    config: ConvertConfig,
    cancel: Option<Arc<AtomicBool>>,
    progress: Option<ProgressBar>,
}

impl Converter {
    /// Create a converter for a validated configuration
    pub fn new(config: ConvertConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: None,
            progress: None,
        })
    }

    /// Abort between trains once the flag is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Report per-train progress on a spinner
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert from the configured source
    pub fn run(&self) -> Result<RunOutcome> {
        let mut source = open_source(&self.config)?;
        self.run_with_source(source.as_mut())
    }

    /// Convert from an explicit source
    pub fn run_with_source(&self, source: &mut dyn TimetableSource) -> Result<RunOutcome> {
        let start = Instant::now();
        info!("Checking timetable at {}", source.describe());

        let version = format_version(source.modified()?);
        let tracker = VersionTracker::new(&self.config.version_file);
        let decision = tracker.decide(&version, self.config.force)?;
        let (previous_version, forced) = match decision {
            VersionDecision::Unchanged => {
                info!("Timetable version {} already converted, nothing to do", version);
                return Ok(RunOutcome::Skipped { version });
            }
            VersionDecision::Forced => {
                info!("Timetable version {} unchanged, converting anyway", version);
                (Some(version.clone()), true)
            }
            VersionDecision::Changed { previous } => {
                info!(
                    "Converting timetable version {} (previous: {})",
                    version,
                    previous.as_deref().unwrap_or("none")
                );
                (previous, false)
            }
        };

        let (registry, stops) = StopRegistry::load_from_file(&self.config.stops_path)?;
        info!("{}", stops.summary());

        let workdir = tempfile::tempdir()
            .map_err(|e| Error::io("Failed to create working directory", e))?;
        let timetable_path = source.fetch(workdir.path())?;

        let staging = self.create_staging_dir()?;
        let (ctx, read, files) =
            self.convert_into(&timetable_path, &registry, staging.path(), &version)?;

        let archive_entries = self.publish(staging.path())?;
        write_missing_stops(&self.config.missing_stops_path, &ctx.missing_stops)?;
        tracker.record(&version)?;

        let report = ConversionReport {
            version,
            previous_version,
            forced,
            read,
            stops,
            feed: ctx.stats.clone(),
            missing_stops: ctx.missing_stops.len(),
            files,
            archive_path: self.config.archive_path.clone(),
            archive_entries,
            duration: start.elapsed(),
        };
        info!(
            "Conversion finished in {:.1}s: {}",
            report.duration.as_secs_f64(),
            report.feed.summary()
        );
        Ok(RunOutcome::Converted(Box::new(report)))
    }

    /// Stream the timetable through the builder into `staging`
    fn convert_into(
        &self,
        timetable_path: &Path,
        registry: &StopRegistry,
        staging: &Path,
        version: &str,
    ) -> Result<(FeedContext, ReadStats, WriteSummary)> {
        let reader = TimetableReader::new(timetable_path)?;
        let mut groups = TrainGroups::new(reader.rows()?);
        let mut builder = FeedBuilder::new(registry, self.config.day_rollover);
        let mut writer = GtfsWriter::create(staging)?;
        let mut ctx = FeedContext::new();

        for group in groups.by_ref() {
            self.check_cancelled()?;

            let (key, rows) = group?;
            let output = builder.build_train(key, &rows, &mut ctx)?;
            writer.write_train(&output)?;

            if ctx.stats.trains_seen % PROGRESS_UPDATE_INTERVAL == 0 {
                self.report_progress(&ctx.stats);
            }
        }
        self.report_progress(&ctx.stats);

        let read = groups.get_ref().stats().clone();
        debug!(
            "Read {} rows, {} commercial, {:.1}% by bus",
            read.records_read,
            read.commercial_rows,
            read.bus_share()
        );

        let metadata = FeedMetadata {
            version: version.to_string(),
            publisher: self.config.publisher.clone(),
        };
        let files = writer.finish(&ctx, registry, &metadata)?;
        Ok((ctx, read, files))
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::processing_interrupted(
                "Conversion cancelled, previous feed left in place",
            )),
            _ => Ok(()),
        }
    }

    fn report_progress(&self, stats: &FeedStats) {
        if let Some(progress) = &self.progress {
            progress.set_position(stats.trains_seen as u64);
            progress.set_message(format!("{} trips", stats.trips));
        }
    }

    /// Staging directory on the same filesystem as the output directory
    fn create_staging_dir(&self) -> Result<tempfile::TempDir> {
        let parent = output_parent(&self.config.output_dir);
        fs::create_dir_all(&parent)
            .map_err(|e| Error::io(format!("Failed to create {}", parent.display()), e))?;

        tempfile::Builder::new()
            .prefix(".pkpic-gtfs-")
            .tempdir_in(&parent)
            .map_err(|e| Error::io("Failed to create staging directory", e))
    }

    /// Compress the staged feed and move it into place
    fn publish(&self, staging: &Path) -> Result<usize> {
        let archive_path = &self.config.archive_path;
        let archive_parent = output_parent(archive_path);
        fs::create_dir_all(&archive_parent)
            .map_err(|e| Error::io(format!("Failed to create {}", archive_parent.display()), e))?;

        let partial = archive_path.with_extension("zip.partial");
        let entries = compress_feed(staging, &partial)?;
        fs::rename(&partial, archive_path).map_err(|e| {
            Error::io(format!("Failed to move archive to {}", archive_path.display()), e)
        })?;

        let output_dir = &self.config.output_dir;
        if output_dir.exists() {
            debug!("Replacing previous feed in {}", output_dir.display());
            fs::remove_dir_all(output_dir).map_err(|e| {
                Error::io(format!("Failed to remove {}", output_dir.display()), e)
            })?;
        }
        fs::rename(staging, output_dir).map_err(|e| {
            Error::io(format!("Failed to move feed to {}", output_dir.display()), e)
        })?;

        if entries == 0 {
            warn!("Feed archive {} is empty", archive_path.display());
        }
        Ok(entries)
    }
}

fn output_parent(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
