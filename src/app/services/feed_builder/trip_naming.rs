//! Rider-facing naming of trips and platforms

use crate::app::models::{Train, TravelMode, is_empty_marker};
use crate::constants::{BUS_PLATFORM, BUS_ROUTE_MARKER, ROMAN_TO_ARABIC};
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").unwrap_or_else(|e| panic!("invalid whitespace pattern: {}", e))
});

/// Replace runs of whitespace with single spaces
pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RUN.replace_all(value.trim(), " ").into_owned()
}

/// Capitalise the first letter of every word and lower-case the rest
///
/// A word starts after any character that is not a letter, so `BIAŁA-PODLASKA`
/// becomes `Biała-Podlaska` and `ZKA3` becomes `Zka3`.
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut in_word = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if in_word {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(ch);
            in_word = false;
        }
    }
    result
}

/// Number shown to riders
///
/// The commercial number when published, otherwise the internal number up to
/// its first `/`.
pub fn display_number(train: &Train) -> String {
    let commercial = train.commercial_number.trim();
    if !is_empty_marker(commercial) {
        return commercial.to_string();
    }
    train
        .key
        .train_number
        .split('/')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Short name combining the train's number and name
pub fn short_name(train: &Train) -> String {
    let number = display_number(train);
    let name = train.name.trim();

    if name.is_empty() {
        number
    } else if name.contains(&number) {
        title_case(name).replace("Zka", BUS_ROUTE_MARKER)
    } else {
        format!("{} {}", number, title_case(name))
    }
}

/// Route id: the commercial category with whitespace collapsed
pub fn route_id(train: &Train) -> String {
    collapse_whitespace(&train.category)
}

/// Route id of one leg of a multi-leg train
pub fn leg_route_id(base_route_id: &str, mode: TravelMode) -> String {
    match mode {
        TravelMode::Bus => format!("{} {}", BUS_ROUTE_MARKER, base_route_id),
        TravelMode::Train => base_route_id.to_string(),
    }
}

/// Trip id of a train: `{date}_{number}` with `/` replaced by `-`
pub fn base_trip_id(train: &Train) -> String {
    format!(
        "{}_{}",
        train.key.service_date,
        train.key.train_number.replace('/', "-")
    )
}

/// Trip id of one leg of a multi-leg train
pub fn leg_trip_id(base_trip_id: &str, index: usize) -> String {
    format!("{}_{}", base_trip_id, index)
}

/// Platform in the form riders see on station signage
///
/// Placeholders become empty; Roman numerals, optionally followed by `a`,
/// become Arabic digits.
pub fn normalize_platform(platform: &str) -> String {
    let platform = platform.trim();
    if is_empty_marker(platform) || platform.eq_ignore_ascii_case(BUS_PLATFORM) {
        return String::new();
    }

    let (base, suffix) = match platform.strip_suffix('a') {
        Some(base) if !base.is_empty() => (base, "a"),
        _ => (platform, ""),
    };

    let base = ROMAN_TO_ARABIC
        .iter()
        .find(|(roman, _)| *roman == base)
        .map(|(_, arabic)| *arabic)
        .unwrap_or(base);

    format!("{}{}", base, suffix)
}

/// Platform of a call: departure side first, then arrival side
///
/// Placeholders are blanked before the fallback, so a `BUS` departure side
/// still yields the arrival platform.
pub fn call_platform(departure: &str, arrival: &str) -> String {
    let departure = normalize_platform(departure);
    if departure.is_empty() {
        normalize_platform(arrival)
    } else {
        departure
    }
}
