//! PKP Intercity GTFS Library
//!
//! A Rust library for converting the PKP Intercity timetable export
//! (`KPD_Rozklad.csv`) into a GTFS feed usable by journey planners.
//!
//! This library provides tools for:
//! - Reading the windows-1250, semicolon-delimited carrier export lazily
//! - Grouping timetable rows into trains and splitting them into train/bus legs
//! - Normalizing wall-clock times across midnight into GTFS service times
//! - Reconciling carrier station codes against a canonical stop directory
//! - Writing GTFS text files and compressing them into a feed archive
//! - Skipping regeneration when the upstream timetable did not change

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod converter;
        pub mod feed_builder;
        pub mod feed_writer;
        pub mod leg_splitter;
        pub mod stop_registry;
        pub mod time_normalizer;
        pub mod timetable_reader;
        pub mod timetable_source;
        pub mod train_grouper;
        pub mod version_tracker;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{ServiceTime, StopCall, StopRecord, TimetableRow, TravelMode};
pub use config::{ConvertConfig, DayRolloverPolicy};

/// Result type alias for the converter
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for timetable conversion operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing or writing error
    #[error("CSV error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Wall-clock or modification time that cannot be interpreted
    #[error("Invalid time value '{value}': {message}")]
    InvalidTime { value: String, message: String },

    /// Date/time parsing error
    #[error("Date/time parsing error: {message}")]
    DateTimeParsing {
        message: String,
        #[source]
        source: chrono::ParseError,
    },

    /// ZIP archive error
    #[error("Archive error: {message}")]
    Archive {
        message: String,
        #[source]
        source: zip::result::ZipError,
    },

    /// Expected member missing from an archive
    #[error("File '{member}' not found in archive; archive contains: {available}")]
    ArchiveMemberNotFound { member: String, available: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Upstream credentials missing or malformed
    #[error("Credentials error: {message}")]
    Credentials { message: String },

    /// Upstream timetable source unreachable or misbehaving
    #[error("Upstream source error: {message}")]
    Upstream {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Stop directory error
    #[error("Stop directory error: {message}")]
    StopDirectory { message: String },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid time error
    pub fn invalid_time(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTime {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a date/time parsing error
    pub fn datetime_parsing(message: impl Into<String>, source: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: message.into(),
            source,
        }
    }

    /// Create an archive error
    pub fn archive(message: impl Into<String>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            message: message.into(),
            source,
        }
    }

    /// Create an archive member not found error
    pub fn archive_member_not_found(member: impl Into<String>, available: &[String]) -> Self {
        Self::ArchiveMemberNotFound {
            member: member.into(),
            available: available.join(", "),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a credentials error
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    /// Create an upstream error, optionally wrapping the transport failure
    pub fn upstream(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Upstream {
            message: message.into(),
            source,
        }
    }

    /// Create a stop directory error
    pub fn stop_directory(message: impl Into<String>) -> Self {
        Self::StopDirectory {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV processing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(error: zip::result::ZipError) -> Self {
        Self::Archive {
            message: "ZIP processing failed".to_string(),
            source: error,
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: "Date/time parsing failed".to_string(),
            source: error,
        }
    }
}
