//! Feed builder turning trains into GTFS records
//!
//! This module holds the timetable-to-feed transformation: each group of
//! timetable rows is assembled into a train, split at train/bus changes,
//! reconciled against the stop directory, normalised across midnight over
//! the stops that remain and finally rendered as trips, stop times and
//! transfers.
//!
//! # Architecture
//!
//! - [`builder`] - FeedBuilder and the per-train pipeline
//! - [`context`] - run-scoped sets of used stops, routes and services
//! - [`trip_naming`] - trip ids, route ids, short names and platforms
//! - [`stats`] - counts of emitted and skipped trains, legs and stop times
//!
//! # Example Usage
//!
//! ```rust
//! use pkpic_gtfs::app::services::feed_builder::{FeedBuilder, FeedContext};
//! use pkpic_gtfs::app::services::stop_registry::StopRegistry;
//! use pkpic_gtfs::app::services::train_grouper::group_trains;
//! use pkpic_gtfs::DayRolloverPolicy;
//!
//! # fn example(rows: Vec<pkpic_gtfs::Result<pkpic_gtfs::TimetableRow>>) -> pkpic_gtfs::Result<()> {
//! let registry = StopRegistry::new();
//! let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
//! let mut ctx = FeedContext::new();
//!
//! for group in group_trains(rows) {
//!     let (key, rows) = group?;
//!     let output = builder.build_train(key, &rows, &mut ctx)?;
//!     println!("{} trips", output.trips.len());
//! }
//! println!("{}", ctx.stats.summary());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod context;
pub mod stats;
pub mod trip_naming;

#[cfg(test)]
pub mod tests;

pub use builder::{FeedBuilder, TrainOutput};
pub use context::FeedContext;
pub use stats::FeedStats;
