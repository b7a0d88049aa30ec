//! Configuration management and validation.
//!
//! Provides the conversion configuration: input and output locations, the
//! feed publisher, and the day-rollover policy used when normalising times.
//! A TOML file may supply any subset of the settings; command-line arguments
//! are applied on top of it.

use crate::constants;
use crate::{Error, Result};
use config_file::FromConfigFile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How the previous departure is tracked while normalising times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayRolloverPolicy {
    /// The previous departure carries over from leg to leg within a train
    #[default]
    CarryAcrossTrain,
    /// Every leg starts counting from midnight again
    ResetPerLeg,
}

/// Publisher written to `feed_info.txt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherInfo {
    pub name: String,
    pub url: String,
}

impl PublisherInfo {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Settings for one conversion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Local timetable, either the CSV export or the ZIP it ships in
    pub timetable_path: Option<PathBuf>,

    /// Stop directory CSV
    pub stops_path: PathBuf,

    /// Directory receiving the GTFS text files
    pub output_dir: PathBuf,

    /// Compressed feed
    pub archive_path: PathBuf,

    /// Report of carrier stations absent from the stop directory
    pub missing_stops_path: PathBuf,

    /// Marker holding the version of the last converted timetable
    pub version_file: PathBuf,

    /// Optional publisher for `feed_info.txt`
    pub publisher: Option<PublisherInfo>,

    /// Day-rollover behaviour of the time normalizer
    pub day_rollover: DayRolloverPolicy,

    /// Regenerate even if the upstream version is unchanged
    pub force: bool,

    /// Fetch the timetable from the carrier's FTPS server
    pub use_ftp: bool,

    /// Remote archive path on the FTPS server
    pub ftp_remote_path: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            timetable_path: None,
            stops_path: PathBuf::from(constants::DEFAULT_STOPS_FILE),
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            archive_path: PathBuf::from(constants::DEFAULT_ARCHIVE_FILE),
            missing_stops_path: PathBuf::from(constants::DEFAULT_MISSING_STOPS_FILE),
            version_file: PathBuf::from(constants::DEFAULT_VERSION_FILE),
            publisher: None,
            day_rollover: DayRolloverPolicy::default(),
            force: false,
            use_ftp: false,
            ftp_remote_path: constants::FTP_ARCHIVE_PATH.to_string(),
        }
    }
}

impl ConvertConfig {
    /// Create a configuration with default locations
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the local timetable
    pub fn with_timetable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.timetable_path = Some(path.into());
        self
    }

    /// Set the stop directory
    pub fn with_stops_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stops_path = path.into();
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    /// Set the compressed feed location
    pub fn with_archive_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive_path = path.into();
        self
    }

    /// Set the missing stops report location
    pub fn with_missing_stops_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.missing_stops_path = path.into();
        self
    }

    /// Set the version marker location
    pub fn with_version_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.version_file = path.into();
        self
    }

    /// Set the feed publisher
    pub fn with_publisher(mut self, publisher: PublisherInfo) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Set the day-rollover policy
    pub fn with_day_rollover(mut self, policy: DayRolloverPolicy) -> Self {
        self.day_rollover = policy;
        self
    }

    /// Force regeneration
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Fetch from the FTPS server instead of a local file
    pub fn with_ftp(mut self, use_ftp: bool) -> Self {
        self.use_ftp = use_ftp;
        self
    }

    /// Place every output next to each other inside `root`
    ///
    /// Handy for tests and for running several conversions side by side.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        self.output_dir = root.join(constants::DEFAULT_OUTPUT_DIR);
        self.archive_path = root.join(constants::DEFAULT_ARCHIVE_FILE);
        self.missing_stops_path = root.join(constants::DEFAULT_MISSING_STOPS_FILE);
        self.version_file = root.join(constants::DEFAULT_VERSION_FILE);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.use_ftp {
            if !cfg!(feature = "ftp") {
                return Err(Error::configuration(
                    "FTPS download requested but this build lacks the 'ftp' feature",
                ));
            }
            if self.ftp_remote_path.trim().is_empty() {
                return Err(Error::configuration("FTPS remote path cannot be empty"));
            }
        } else {
            match &self.timetable_path {
                None => {
                    return Err(Error::configuration(
                        "No timetable given: pass --input or enable --ftp",
                    ));
                }
                Some(path) if !path.exists() => {
                    return Err(Error::configuration(format!(
                        "Timetable does not exist: {}",
                        path.display()
                    )));
                }
                Some(_) => {}
            }
        }

        if !self.stops_path.exists() {
            return Err(Error::configuration(format!(
                "Stop directory does not exist: {}",
                self.stops_path.display()
            )));
        }

        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(Error::configuration(format!(
                "Output path is not a directory: {}",
                self.output_dir.display()
            )));
        }

        if self.output_dir.file_name().is_none() {
            return Err(Error::configuration(format!(
                "Output directory must name a directory: {}",
                self.output_dir.display()
            )));
        }

        if let Some(publisher) = &self.publisher {
            if publisher.name.trim().is_empty() || publisher.url.trim().is_empty() {
                return Err(Error::configuration(
                    "Publisher name and URL must both be non-empty",
                ));
            }
        }

        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        Self::from_config_file(path).map_err(|e| {
            Error::configuration(format!(
                "Failed to load config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::configuration("Could not determine config directory"))?;

        Ok(config_dir.join("pkpic-gtfs").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn valid_config(temp_dir: &TempDir) -> ConvertConfig {
        let timetable = temp_dir.path().join("KPD_Rozklad.csv");
        let stops = temp_dir.path().join("stops.csv");
        fs::write(&timetable, "").unwrap();
        fs::write(&stops, "").unwrap();

        ConvertConfig::new()
            .with_timetable_path(timetable)
            .with_stops_path(stops)
            .rooted_at(temp_dir.path())
    }

    #[test]
    fn test_default_config() {
        let config = ConvertConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("gtfs"));
        assert_eq!(config.day_rollover, DayRolloverPolicy::CarryAcrossTrain);
        assert!(config.publisher.is_none());
        assert!(!config.force);
    }

    #[test]
    fn test_validate_accepts_existing_inputs() {
        let temp_dir = TempDir::new().unwrap();
        assert!(valid_config(&temp_dir).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_inputs() {
        let temp_dir = TempDir::new().unwrap();

        let config = ConvertConfig::new().rooted_at(temp_dir.path());
        assert!(matches!(
            config.validate(),
            Err(Error::Configuration { .. })
        ));

        let config = valid_config(&temp_dir).with_stops_path(temp_dir.path().join("nope.csv"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_half_publisher() {
        let temp_dir = TempDir::new().unwrap();
        let config = valid_config(&temp_dir).with_publisher(PublisherInfo::new("Me", ""));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
stops_path = "/data/stops.csv"
day_rollover = "reset-per-leg"

[publisher]
name = "Example"
url = "https://example.com"
"#,
        )
        .unwrap();

        let config = ConvertConfig::load_from_file(&path).unwrap();
        assert_eq!(config.stops_path, PathBuf::from("/data/stops.csv"));
        assert_eq!(config.day_rollover, DayRolloverPolicy::ResetPerLeg);
        assert_eq!(
            config.publisher,
            Some(PublisherInfo::new("Example", "https://example.com"))
        );
        // Unset keys keep their defaults
        assert_eq!(config.version_file, PathBuf::from("version.txt"));
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConvertConfig::load_from_file(&temp_dir.path().join("missing.toml"));
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }
}
