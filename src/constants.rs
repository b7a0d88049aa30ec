//! Application constants for the PKP Intercity GTFS converter
//!
//! This module contains upstream locations, default file names, fixed GTFS
//! values and the lookup tables used throughout the converter.

// =============================================================================
// Upstream Source
// =============================================================================

/// Host name of the carrier's FTPS server
pub const FTP_HOST: &str = "ftps.intercity.pl";

/// Control port of the carrier's FTPS server
pub const FTP_PORT: u16 = 21;

/// Path of the timetable archive on the FTPS server
pub const FTP_ARCHIVE_PATH: &str = "rozklad/KPD_Rozklad.zip";

/// Name of the timetable CSV inside the archive
pub const ARCHIVE_CSV_MEMBER: &str = "KPD_Rozklad.csv";

/// Environment variable holding `username,password` for the FTPS server
pub const CREDENTIALS_ENV: &str = "INTERCITY_FTP_CREDENTIALS";

/// Environment variable pointing at a file holding `username,password`
pub const CREDENTIALS_PATH_ENV: &str = "INTERCITY_FTP_CREDENTIALS_PATH";

/// Timezone the carrier publishes its timetable in
pub const CARRIER_TIMEZONE: chrono_tz::Tz = chrono_tz::Europe::Warsaw;

/// Format of the version marker
pub const VERSION_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Timetable Values
// =============================================================================

/// Seconds in a minute
pub const MINUTE: u32 = 60;

/// Seconds in an hour
pub const HOUR: u32 = 60 * MINUTE;

/// Seconds in a service day
pub const DAY: u32 = 24 * HOUR;

/// Values of the carrier's boolean-like columns meaning "yes"
pub const TRUE_FLAGS: &[&str] = &["1", "T", "TAK", "TRUE"];

/// Time and platform values the carrier uses for "not specified"
pub const EMPTY_MARKERS: &[&str] = &["", "NULL"];

/// Platform placeholder used by the carrier for road replacement services
pub const BUS_PLATFORM: &str = "BUS";

/// Marker prefixed to route ids of bus replacement legs ("zastępcza komunikacja autobusowa")
pub const BUS_ROUTE_MARKER: &str = "ZKA";

// =============================================================================
// GTFS Constants
// =============================================================================

/// The only agency in the feed
pub mod agency {
    pub const ID: &str = "0";
    pub const NAME: &str = "PKP Intercity";
    pub const URL: &str = "https://intercity.pl/";
    pub const TIMEZONE: &str = "Europe/Warsaw";
    pub const LANG: &str = "pl";
    pub const PHONE: &str = "+48703200200";
}

/// GTFS `route_type` for rail services
pub const ROUTE_TYPE_RAIL: u8 = 2;

/// GTFS `route_type` for bus services
pub const ROUTE_TYPE_BUS: u8 = 3;

/// GTFS `transfer_type` for a timed, guaranteed connection
pub const TRANSFER_TYPE_GUARANTEED: u8 = 1;

/// GTFS `exception_type` for an added service day
pub const EXCEPTION_TYPE_ADDED: u8 = 1;

/// Colour pair used for categories missing from [`ROUTE_COLORS`]
pub const DEFAULT_ROUTE_COLOR: (&str, &str) = ("DE4E4E", "FFFFFF");

/// Background/text colours per commercial category
pub const ROUTE_COLORS: &[(&str, (&str, &str))] = &[
    ("TLK", ("8505A3", "FFFFFF")),
    ("IC", ("F25E18", "FFFFFF")),
    ("IC EIC", ("898989", "FFFFFF")),
    ("EC", ("9D740F", "FFFFFF")),
    ("EIC", ("898989", "FFFFFF")),
    ("EIP", ("002664", "FFFFFF")),
    ("EN", ("000000", "FFFFFF")),
];

/// Colour pair for a route id, falling back to [`DEFAULT_ROUTE_COLOR`]
pub fn route_color(route_id: &str) -> (&'static str, &'static str) {
    ROUTE_COLORS
        .iter()
        .find(|(category, _)| *category == route_id)
        .map(|(_, colors)| *colors)
        .unwrap_or(DEFAULT_ROUTE_COLOR)
}

// =============================================================================
// Lookup Tables
// =============================================================================

/// Carrier station names known to be misspelled, with their corrected form
///
/// Keys and values are upper-case; names are compared case-insensitively.
pub const FIX_STOPS: &[(&str, &str)] = &[
    ("BOHUMIN", "BOGUMIN"),
    ("RABKA ZDRÓJ", "RABKA-ZDRÓJ"),
    ("MOSTISKA 2", "MOŚCISKA 2"),
    ("PIWNICZNA ZDRÓJ", "PIWNICZNA-ZDRÓJ"),
    ("KUDOWA ZDRÓJ", "KUDOWA-ZDRÓJ"),
    ("PETROVICE U KARVINE", "PETROVICE U KARVINÉ"),
    ("WARSZAWA ZACHODNIA P8", "WARSZAWA ZACHODNIA (PERON 8)"),
    ("KRYNICA", "KRYNICA ZDRÓJ"),
    ("GUTKOWO", "OLSZTYN GUTKOWO"),
    ("NAKŁO N/NOTECIĄ", "NAKŁO NAD NOTECIĄ"),
    ("CHEŁM", "CHEŁM GŁÓWNY"),
    ("JAGODIN", "JAGODZIN"),
    ("CZECHOWICE DZIEDZICE", "CZECHOWICE-DZIEDZICE"),
    ("RUDNIK N/SANEM", "RUDNIK NAD SANEM"),
    ("MAŁASZEWICZE PRZYSTANEK", "MAŁASZEWICZE"),
    ("GORZÓW WIELKOPOLSKI TEATRALNA", "GORZÓW WIELKOPOLSKI WSCHODNI"),
    ("SKALITE", "SKALITÉ"),
    ("SKARŻYSKO KAMIENNA", "SKARŻYSKO-KAMIENNA"),
    ("KĘDZIERZYN KOŹLE", "KĘDZIERZYN-KOŹLE"),
    ("STRZYŻÓW N/WISŁOKIEM", "STRZYŻÓW NAD WISŁOKIEM"),
    ("BREST CENTRALNY", "BRZEŚĆ CENTRALNY"),
    ("FRANKFURT/ODER", "FRANKFURT (ODER)"),
    ("KUŹNICA", "KUŹNICA (HEL)"),
    ("WIELEŃ PÓŁNOCNY", "WIELEŃ"),
];

/// Roman platform numbers used by the carrier, with their Arabic form
pub const ROMAN_TO_ARABIC: &[(&str, &str)] = &[
    ("I", "1"),
    ("II", "2"),
    ("III", "3"),
    ("IV", "4"),
    ("V", "5"),
    ("VI", "6"),
    ("VII", "7"),
    ("VIII", "8"),
    ("IX", "9"),
    ("X", "10"),
    ("XI", "11"),
    ("XII", "12"),
];

// =============================================================================
// File and Directory Defaults
// =============================================================================

/// Default stop directory file
pub const DEFAULT_STOPS_FILE: &str = "stops.csv";

/// Default directory the GTFS text files are written to
pub const DEFAULT_OUTPUT_DIR: &str = "gtfs";

/// Default path of the compressed feed
pub const DEFAULT_ARCHIVE_FILE: &str = "pkpic.zip";

/// Default path of the missing stops report
pub const DEFAULT_MISSING_STOPS_FILE: &str = "stops_missing.csv";

/// Default path of the version marker
pub const DEFAULT_VERSION_FILE: &str = "version.txt";

/// Name the extracted timetable is stored under in the work directory
pub const EXTRACTED_CSV_NAME: &str = "rozklad.csv";

/// GTFS file names
pub mod files {
    pub const AGENCY: &str = "agency.txt";
    pub const ATTRIBUTIONS: &str = "attributions.txt";
    pub const CALENDAR_DATES: &str = "calendar_dates.txt";
    pub const FEED_INFO: &str = "feed_info.txt";
    pub const ROUTES: &str = "routes.txt";
    pub const STOPS: &str = "stops.txt";
    pub const STOP_TIMES: &str = "stop_times.txt";
    pub const TRANSFERS: &str = "transfers.txt";
    pub const TRIPS: &str = "trips.txt";
}

// =============================================================================
// Progress Reporting
// =============================================================================

/// Number of trains between progress bar refreshes
pub const PROGRESS_UPDATE_INTERVAL: usize = 250;
