//! End-to-end conversion of a generated timetable archive

use pkpic_gtfs::ConvertConfig;
use pkpic_gtfs::app::services::converter::{Converter, RunOutcome};
use pkpic_gtfs::config::PublisherInfo;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const HEADER: &str = "DataOdjazdu;NrPociagu;Lp;StacjaHandlowa;NumerStacji;NazwaStacji;Przyjazd;Odjazd;PeronWjazd;PeronWyjazd;TorWjazd;TorWyjazd;BUS;KategoriaHandlowa;NrPociaguHandlowy;NazwaPociagu;DrogaKumulowanaMetry";

const ROWS: &[&str] = &[
    // Rail, then a replacement bus running past midnight to the last stop
    "2024-03-01;40100/1;1;1;1;KRAKÓW GŁÓWNY;;22:00:00;;I;;1;0;IC;4010;MALINOWSKI;0",
    "2024-03-01;40100/1;2;1;2;TARNÓW;22:50:00;22:52:00;II;BUS;2;;1;IC;4010;MALINOWSKI;80000",
    "2024-03-01;40100/1;3;1;3;RZESZÓW GŁÓWNY;00:30:00;;III;;3;;0;IC;4010;MALINOWSKI;160000",
    // Technical stop and a station absent from the stop directory
    "2024-03-01;50200/1;1;1;1;KRAKÓW GŁÓWNY;;08:00:00;;2;;;0;TLK;5020;;0",
    "2024-03-01;50200/1;2;0;5;PODŁĘŻE;08:10:00;08:10:00;;;;;0;TLK;5020;;15000",
    "2024-03-01;50200/1;3;1;9;NIEZNANA;08:30:00;08:31:00;;;;;0;TLK;5020;;40000",
    "2024-03-01;50200/1;4;1;3;RZESZÓW GŁÓWNY;09:30:00;;IV;;;;0;TLK;5020;;160000",
    // Single commercial stop
    "2024-03-02;60300/1;1;1;1;KRAKÓW GŁÓWNY;;12:00:00;;;;;0;IC;6030;;0",
    "2024-03-02;60300/1;2;0;5;PODŁĘŻE;12:10:00;;;;;;0;IC;6030;;15000",
];

const STOPS: &str = "\
stop_id,stop_name,stop_code,stop_lat,stop_lon
1,Kraków Główny,,50.067698,19.947483
2,Tarnów,,50.0055,20.9746
3,Rzeszów Główny,,50.0433,22.0066
";

fn create_archive(path: &Path) {
    let content = format!("{}\r\n{}\r\n", HEADER, ROWS.join("\r\n"));
    let (encoded, _, unmappable) = encoding_rs::WINDOWS_1250.encode(&content);
    assert!(!unmappable);

    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    zip.start_file("KPD_Rozklad.csv", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(&encoded).unwrap();
    zip.finish().unwrap();
}

fn setup(root: &Path) -> ConvertConfig {
    let archive = root.join("KPD_Rozklad.zip");
    create_archive(&archive);
    let stops = root.join("stops.csv");
    fs::write(&stops, STOPS).unwrap();

    ConvertConfig::new()
        .with_timetable_path(archive)
        .with_stops_path(stops)
        .with_publisher(PublisherInfo::new("Example Feeds", "https://example.com/"))
        .rooted_at(root)
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

fn archive_names(path: &PathBuf) -> Vec<String> {
    let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

#[test]
fn test_full_conversion() {
    let temp_dir = TempDir::new().unwrap();
    let config = setup(temp_dir.path());
    let converter = Converter::new(config.clone()).unwrap();

    let RunOutcome::Converted(report) = converter.run().unwrap() else {
        panic!("first run must convert");
    };
    assert_eq!(report.read.records_read, ROWS.len());
    assert_eq!(report.feed.trains_seen, 3);
    assert_eq!(report.feed.trains_emitted, 2);
    assert_eq!(report.feed.trains_skipped, 1);
    assert_eq!(report.feed.multi_leg_trains, 1);
    assert_eq!(report.feed.trips, 3);
    assert_eq!(report.feed.transfers, 1);
    assert_eq!(report.missing_stops, 1);

    let out = &config.output_dir;

    // Rail leg and bus leg of the split train, decoded from windows-1250
    let trips = read(out, "trips.txt");
    assert!(trips.contains("IC,2024-03-01,2024-03-01_40100-1_0,RZESZÓW GŁÓWNY,4010 Malinowski"));
    assert!(trips.contains("ZKA IC,2024-03-01,2024-03-01_40100-1_1,RZESZÓW GŁÓWNY,4010 Malinowski"));
    assert!(trips.contains("TLK,2024-03-01,2024-03-01_50200-1,"));
    assert!(!trips.contains("60300"));

    let stop_times = read(out, "stop_times.txt");
    assert!(stop_times.contains("2024-03-01_40100-1_0,1,2,22:50:00,22:50:00,2,80000"));
    assert!(stop_times.contains("2024-03-01_40100-1_1,0,2,22:52:00,22:52:00,,0"));
    assert!(stop_times.contains("2024-03-01_40100-1_1,1,3,24:30:00,24:30:00,3,80000"));
    assert!(stop_times.contains("2024-03-01_50200-1,1,3,09:30:00,09:30:00,4,160000"));
    assert!(!stop_times.contains(",9,"));
    assert!(!stop_times.contains(",5,"));

    assert_eq!(
        read(out, "transfers.txt").lines().nth(1),
        Some("2,2,2024-03-01_40100-1_0,2024-03-01_40100-1_1,1")
    );
    assert_eq!(
        read(out, "calendar_dates.txt").lines().collect::<Vec<_>>(),
        vec!["service_id,date,exception_type", "2024-03-01,20240301,1"]
    );

    let routes = read(out, "routes.txt");
    assert_eq!(routes.lines().count(), 4);
    assert!(routes.contains("0,ZKA IC,ZKA IC,,3,"));

    assert_eq!(read(out, "stops.txt").lines().count(), 4);
    assert!(read(out, "feed_info.txt").contains("Example Feeds,https://example.com/,pl,"));

    assert_eq!(
        read(temp_dir.path(), "stops_missing.csv")
            .lines()
            .collect::<Vec<_>>(),
        vec!["stop_id,stop_name", "9,NIEZNANA"]
    );

    assert_eq!(
        archive_names(&config.archive_path),
        vec![
            "agency.txt",
            "attributions.txt",
            "calendar_dates.txt",
            "feed_info.txt",
            "routes.txt",
            "stop_times.txt",
            "stops.txt",
            "transfers.txt",
            "trips.txt",
        ]
    );
    assert_eq!(read(temp_dir.path(), "version.txt").trim(), report.version);
}

#[test]
fn test_unchanged_timetable_is_not_reconverted() {
    let temp_dir = TempDir::new().unwrap();
    let config = setup(temp_dir.path());

    let first = Converter::new(config.clone()).unwrap().run().unwrap();
    assert!(matches!(first, RunOutcome::Converted(_)));

    fs::remove_dir_all(&config.output_dir).unwrap();
    fs::remove_file(&config.archive_path).unwrap();

    let second = Converter::new(config.clone()).unwrap().run().unwrap();
    assert!(matches!(second, RunOutcome::Skipped { .. }));
    assert!(!config.output_dir.exists());
    assert!(!config.archive_path.exists());

    let forced = Converter::new(config.clone().with_force(true))
        .unwrap()
        .run()
        .unwrap();
    assert!(matches!(forced, RunOutcome::Converted(_)));
    assert!(config.output_dir.join("trips.txt").exists());
}
