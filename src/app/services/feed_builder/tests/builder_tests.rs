//! Tests for per-train feed building

use super::*;
use crate::DayRolloverPolicy;
use crate::app::services::feed_builder::{FeedBuilder, FeedContext};

fn times(output: &crate::app::services::feed_builder::TrainOutput, trip_id: &str) -> Vec<(String, String)> {
    output
        .stop_times
        .iter()
        .filter(|st| st.trip_id == trip_id)
        .map(|st| (st.arrival_time.to_string(), st.departure_time.to_string()))
        .collect()
}

fn bus_section_train() -> TrainFixture {
    TrainFixture::new("2024-05-10", "61100/1")
        .category("TLK")
        .named("61100", "KORMORAN")
        .call("1", "", "08:00:00", false, 0)
        .call("2", "09:00:00", "09:05:00", true, 1000)
        .call("3", "10:00:00", "", false, 2500)
}

#[test]
fn test_single_mode_train() {
    let registry = create_test_registry(&["1", "2", "3"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();

    let fixture = TrainFixture::new("2024-05-10", "1600")
        .call("1", "", "08:00:00", false, 100)
        .pass("9", "08:30:00")
        .call("2", "09:00:00", "09:02:00", false, 1100)
        .call("3", "10:00:00", "", false, 2100);

    let output = builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();

    assert_eq!(output.trips.len(), 1);
    let trip = &output.trips[0];
    assert_eq!(trip.trip_id, "2024-05-10_1600");
    assert_eq!(trip.route_id, "IC");
    assert_eq!(trip.service_id, "2024-05-10");
    assert_eq!(trip.trip_headsign, "Station 3");

    let stops: Vec<&str> = output.stop_times.iter().map(|st| st.stop_id.as_str()).collect();
    assert_eq!(stops, vec!["1", "2", "3"]);
    let sequences: Vec<u32> = output.stop_times.iter().map(|st| st.stop_sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
    let distances: Vec<i64> = output
        .stop_times
        .iter()
        .map(|st| st.shape_dist_traveled)
        .collect();
    assert_eq!(distances, vec![0, 1000, 2000]);
    assert_eq!(output.stop_times[0].platform, "3");
    assert!(output.transfers.is_empty());

    assert_eq!(ctx.stats.trains_emitted, 1);
    assert_eq!(ctx.stats.stop_times, 3);
    assert!(ctx.routes.contains("IC"));
    assert!(ctx.services.contains("2024-05-10"));
}

#[test]
fn test_bus_flip_on_last_stop_gives_two_legs() {
    let registry = create_test_registry(&["1", "2", "3"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();
    let fixture = bus_section_train();

    let output = builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();

    let trips: Vec<(&str, &str)> = output
        .trips
        .iter()
        .map(|t| (t.trip_id.as_str(), t.route_id.as_str()))
        .collect();
    assert_eq!(
        trips,
        vec![
            ("2024-05-10_61100-1_0", "TLK"),
            ("2024-05-10_61100-1_1", "ZKA TLK"),
        ]
    );
    assert!(output.trips.iter().all(|t| t.trip_short_name == "61100 Kormoran"));

    assert_eq!(
        times(&output, "2024-05-10_61100-1_0"),
        vec![
            ("08:00:00".to_string(), "08:00:00".to_string()),
            ("09:00:00".to_string(), "09:00:00".to_string()),
        ]
    );
    assert_eq!(
        times(&output, "2024-05-10_61100-1_1"),
        vec![
            ("09:05:00".to_string(), "09:05:00".to_string()),
            ("10:00:00".to_string(), "10:00:00".to_string()),
        ]
    );

    let second_leg: Vec<i64> = output
        .stop_times
        .iter()
        .filter(|st| st.trip_id.ends_with("_1"))
        .map(|st| st.shape_dist_traveled)
        .collect();
    assert_eq!(second_leg, vec![0, 1500]);

    assert_eq!(output.transfers.len(), 1);
    let transfer = &output.transfers[0];
    assert_eq!(transfer.from_stop_id, "2");
    assert_eq!(transfer.to_stop_id, "2");
    assert_eq!(transfer.from_trip_id, "2024-05-10_61100-1_0");
    assert_eq!(transfer.to_trip_id, "2024-05-10_61100-1_1");
    assert_eq!(transfer.transfer_type, 1);

    assert_eq!(ctx.stats.multi_leg_trains, 1);
    assert!(ctx.routes.contains("ZKA TLK"));
}

#[test]
fn test_first_leg_opens_with_departure_only() {
    let registry = create_test_registry(&["1", "2", "3"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();

    let fixture = TrainFixture::new("2024-05-10", "61102/3")
        .call("1", "07:55:00", "08:00:00", false, 0)
        .call("2", "09:00:00", "09:05:00", true, 1000)
        .call("3", "10:00:00", "", false, 2500);

    let output = builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();

    assert_eq!(output.trips.len(), 2);
    let opening = &output.stop_times[0];
    assert_eq!(opening.trip_id, "2024-05-10_61102-3_0");
    assert_eq!(opening.stop_id, "1");
    assert_eq!(opening.arrival_time, opening.departure_time);
    assert_eq!(opening.departure_time.to_string(), "08:00:00");
    assert_eq!(opening.platform, "3");
}

#[test]
fn test_bus_only_train_uses_bus_route() {
    let registry = create_test_registry(&["1", "2"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();

    let fixture = TrainFixture::new("2024-05-10", "77")
        .call("1", "", "08:00:00", true, 0)
        .call("2", "09:00:00", "", true, 1000);

    let output = builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();

    assert_eq!(output.trips.len(), 1);
    assert_eq!(output.trips[0].trip_id, "2024-05-10_77");
    assert_eq!(output.trips[0].route_id, "ZKA IC");
    // Bus stands fall back to the arrival platform
    assert!(output.stop_times.iter().all(|st| st.platform == "3"));
}

#[test]
fn test_single_commercial_stop_produces_nothing() {
    let registry = create_test_registry(&["1", "2"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();

    let fixture = TrainFixture::new("2024-05-10", "7")
        .call("1", "", "08:00:00", false, 0)
        .pass("2", "08:30:00");

    let output = builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();

    assert!(output.is_empty());
    assert!(output.stop_times.is_empty());
    assert_eq!(ctx.stats.trains_skipped, 1);
    assert!(ctx.routes.is_empty());
    assert!(ctx.services.is_empty());
}

#[test]
fn test_unknown_stops_are_dropped_and_reported() {
    let registry = create_test_registry(&["1", "3"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();

    let fixture = TrainFixture::new("2024-05-10", "1600")
        .call("1", "", "08:00:00", false, 0)
        .call("2", "09:00:00", "09:02:00", false, 1000)
        .call("3", "10:00:00", "", false, 2000);

    builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();
    let output = builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();

    let stops: Vec<(&str, u32)> = output
        .stop_times
        .iter()
        .map(|st| (st.stop_id.as_str(), st.stop_sequence))
        .collect();
    assert_eq!(stops, vec![("1", 0), ("3", 1)]);

    assert_eq!(ctx.missing_stops.len(), 1);
    assert!(ctx.missing_stops.contains("2"));
    assert!(!ctx.used_stops.contains("2"));
    assert_eq!(ctx.stats.stop_times_dropped, 2);
}

#[test]
fn test_leg_without_two_known_stops_is_skipped() {
    let registry = create_test_registry(&["2", "3"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();
    let fixture = bus_section_train();

    let output = builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();

    assert_eq!(output.trips.len(), 1);
    assert_eq!(output.trips[0].trip_id, "2024-05-10_61100-1_1");
    assert!(output.transfers.is_empty());
    assert_eq!(ctx.stats.legs_skipped, 1);
}

#[test]
fn test_transfer_needs_known_coupling_stop() {
    let registry = create_test_registry(&["1", "3"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();

    let fixture = TrainFixture::new("2024-05-10", "5")
        .call("1", "", "08:00:00", false, 0)
        .call("3", "08:30:00", "08:31:00", false, 500)
        .call("2", "09:00:00", "09:05:00", true, 1000)
        .call("1", "09:30:00", "09:35:00", true, 1500)
        .call("3", "10:00:00", "", true, 2500);

    let output = builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();

    assert_eq!(output.trips.len(), 2);
    assert!(output.transfers.is_empty());
}

#[test]
fn test_dropped_stop_does_not_shift_later_times() {
    let registry = create_test_registry(&["1", "2", "3"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();

    // Station 9 is unknown and carries a time far out of order
    let fixture = TrainFixture::new("2024-05-10", "1700")
        .call("1", "", "10:00:00", false, 0)
        .call("9", "23:00:00", "23:05:00", false, 500)
        .call("2", "11:00:00", "11:05:00", false, 1000)
        .call("3", "12:00:00", "", false, 2000);

    let output = builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();

    assert_eq!(
        times(&output, "2024-05-10_1700"),
        vec![
            ("10:00:00".to_string(), "10:00:00".to_string()),
            ("11:00:00".to_string(), "11:05:00".to_string()),
            ("12:00:00".to_string(), "12:00:00".to_string()),
        ]
    );
    assert!(ctx.missing_stops.contains("9"));
}

#[test]
fn test_overnight_bus_section_by_rollover_policy() {
    let registry = create_test_registry(&["1", "2", "3", "4"]);
    let fixture = TrainFixture::new("2024-05-10", "8")
        .call("1", "", "23:30:00", false, 0)
        .call("2", "23:50:00", "00:10:00", true, 1000)
        .call("3", "00:40:00", "00:45:00", true, 2000)
        .call("4", "01:00:00", "", false, 3000);

    let mut carried = FeedBuilder::new(&registry, DayRolloverPolicy::CarryAcrossTrain);
    let mut ctx = FeedContext::new();
    let output = carried.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();
    assert_eq!(
        times(&output, "2024-05-10_8_1"),
        vec![
            ("24:10:00".to_string(), "24:10:00".to_string()),
            ("24:40:00".to_string(), "24:45:00".to_string()),
            ("25:00:00".to_string(), "25:00:00".to_string()),
        ]
    );

    let mut reset = FeedBuilder::new(&registry, DayRolloverPolicy::ResetPerLeg);
    let mut ctx = FeedContext::new();
    let output = reset.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();
    assert_eq!(
        times(&output, "2024-05-10_8_1"),
        vec![
            ("00:10:00".to_string(), "00:10:00".to_string()),
            ("00:40:00".to_string(), "00:45:00".to_string()),
            ("01:00:00".to_string(), "01:00:00".to_string()),
        ]
    );
    assert_eq!(
        times(&output, "2024-05-10_8_0"),
        vec![
            ("23:30:00".to_string(), "23:30:00".to_string()),
            ("23:50:00".to_string(), "23:50:00".to_string()),
        ]
    );
}

#[test]
fn test_stop_times_are_ordered_per_leg() {
    let registry = create_test_registry(&["1", "2", "3", "4"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();
    let fixture = TrainFixture::new("2024-05-10", "9")
        .call("1", "", "22:00:00", false, 0)
        .call("2", "23:59:00", "00:04:00", true, 100)
        .call("3", "02:00:00", "02:10:00", true, 200)
        .call("4", "01:50:00", "", false, 300);

    let output = builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();

    for trip in &output.trips {
        let stop_times: Vec<_> = output
            .stop_times
            .iter()
            .filter(|st| st.trip_id == trip.trip_id)
            .collect();
        for pair in stop_times.windows(2) {
            assert!(pair[0].arrival_time <= pair[0].departure_time);
            assert!(pair[0].departure_time <= pair[1].arrival_time);
        }
    }
}

#[test]
fn test_accumulation_is_idempotent() {
    let registry = create_test_registry(&["1", "2", "3"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();
    let fixture = bus_section_train();

    builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();
    let routes = ctx.routes.clone();
    let services = ctx.services.clone();
    let used = ctx.used_stops.clone();

    builder.build_train(fixture.key(), fixture.rows(), &mut ctx).unwrap();
    assert_eq!(ctx.routes, routes);
    assert_eq!(ctx.services, services);
    assert_eq!(ctx.used_stops, used);
}

#[test]
fn test_malformed_time_is_fatal() {
    let registry = create_test_registry(&["1", "2"]);
    let mut builder = FeedBuilder::new(&registry, DayRolloverPolicy::default());
    let mut ctx = FeedContext::new();
    let fixture = TrainFixture::new("2024-05-10", "10")
        .call("1", "", "8 o'clock", false, 0)
        .call("2", "09:00:00", "", false, 100);

    assert!(builder.build_train(fixture.key(), fixture.rows(), &mut ctx).is_err());
}
