//! Tests for feed compression

use crate::app::services::feed_writer::compress_feed;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_compress_feed_collects_txt_files() {
    let temp_dir = TempDir::new().unwrap();
    let feed_dir = temp_dir.path().join("gtfs");
    fs::create_dir(&feed_dir).unwrap();
    fs::write(feed_dir.join("trips.txt"), "trip_id\n1\n").unwrap();
    fs::write(feed_dir.join("agency.txt"), "agency_id\n0\n").unwrap();
    fs::write(feed_dir.join("notes.md"), "ignored").unwrap();
    fs::create_dir(feed_dir.join("nested")).unwrap();
    fs::write(feed_dir.join("nested").join("deep.txt"), "ignored").unwrap();

    let target = temp_dir.path().join("feed.zip");
    let count = compress_feed(&feed_dir, &target).unwrap();
    assert_eq!(count, 2);

    let mut archive = zip::ZipArchive::new(fs::File::open(&target).unwrap()).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(sorted, vec!["agency.txt", "trips.txt"]);

    let entry = archive.by_name("trips.txt").unwrap();
    assert_eq!(entry.compression(), zip::CompressionMethod::Deflated);
}

#[test]
fn test_compress_empty_dir() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("feed.zip");
    let feed_dir = temp_dir.path().join("gtfs");
    fs::create_dir(&feed_dir).unwrap();

    assert_eq!(compress_feed(&feed_dir, &target).unwrap(), 0);
    assert!(target.exists());
}
