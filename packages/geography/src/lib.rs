#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County naming and city-to-county resolution for Connecticut.
//!
//! The canonical county name (e.g. `"New Haven"`) is the universal join key
//! between vehicles, stations, income, and population. Free-text city names
//! are turned into canonical county names by [`CityCountyMap`], a static
//! table built once per process.

pub mod city_county;

pub use city_county::CityCountyMap;

/// Two-letter abbreviation of the only state [`KNOWN_COUNTIES`] and
/// [`CityCountyMap`] cover.
pub const COVERED_STATE: &str = "CT";

/// Returns `true` if `state` names [`COVERED_STATE`], ignoring case.
#[must_use]
pub fn is_covered_state(state: &str) -> bool {
    state.trim().eq_ignore_ascii_case(COVERED_STATE)
}

/// The eight Connecticut counties, in canonical spelling.
pub const KNOWN_COUNTIES: &[&str] = &[
    "Fairfield",
    "Hartford",
    "Litchfield",
    "Middlesex",
    "New Haven",
    "New London",
    "Tolland",
    "Windham",
];

/// Returns `true` if `county` is exactly one of [`KNOWN_COUNTIES`].
#[must_use]
pub fn is_known_county(county: &str) -> bool {
    KNOWN_COUNTIES.contains(&county)
}

/// Converts a raw county label into its canonical name.
///
/// Trims whitespace and strips a trailing `"County"` suffix. When the result
/// matches a known county ignoring case, the known spelling is returned so
/// that `"HARTFORD COUNTY"` and `"Hartford County"` join identically.
///
/// ```
/// assert_eq!(ev_map_geography::canonical_county_name(" New London County "), "New London");
/// ```
#[must_use]
pub fn canonical_county_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = strip_county_suffix(trimmed).trim_end();

    KNOWN_COUNTIES
        .iter()
        .find(|known| known.eq_ignore_ascii_case(stripped))
        .map_or_else(|| stripped.to_string(), |known| (*known).to_string())
}

fn strip_county_suffix(name: &str) -> &str {
    const SUFFIX: &str = "county";

    let Some(split) = name.len().checked_sub(SUFFIX.len()) else {
        return name;
    };
    if !name.is_char_boundary(split) || !name[split..].eq_ignore_ascii_case(SUFFIX) {
        return name;
    }

    let head = &name[..split];
    // Only strip a standalone word, not e.g. "Mccounty".
    if head.ends_with(char::is_whitespace) {
        head
    } else {
        name
    }
}
