//! Shared cell-level parsing utilities.
//!
//! Every function here is total: a cell that cannot be interpreted comes
//! back as `None` (or a documented default) instead of an error, so one
//! malformed row never aborts a run.

use std::sync::LazyLock;

use regex::Regex;

/// A number written with thousands separators, e.g. `12,345.67`.
static GROUPED_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?\d{1,3}(,\d{3})+(\.\d*)?$").expect("valid regex")
});

/// `POINT (lon lat)` well-known text.
static POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)POINT\s*\(\s*([-+]?[\d.]+)\s+([-+]?[\d.]+)\s*\)").expect("valid regex")
});

/// Parses a float cell. Accepts surrounding whitespace, a leading `$`, and
/// thousands separators. Empty, unparseable, and non-finite values are
/// `None`.
#[must_use]
pub fn coerce_f64(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('$').unwrap_or(trimmed).trim_start();
    if unsigned.is_empty() {
        return None;
    }

    let value = if unsigned.contains(',') {
        if !GROUPED_NUMBER_RE.is_match(unsigned) {
            return None;
        }
        unsigned.replace(',', "").parse::<f64>().ok()?
    } else {
        unsigned.parse::<f64>().ok()?
    };

    value.is_finite().then_some(value)
}

/// Parses an integer cell with the same rules as [`coerce_f64`]. A float
/// with a zero fractional part (`"3.0"`) is accepted.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn coerce_i64(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }

    let value = coerce_f64(trimmed)?;
    if value.fract() != 0.0 || value < i64::MIN as f64 || value > i64::MAX as f64 {
        log::debug!("Integer coercion rejected {raw:?}");
        return None;
    }

    Some(value as i64)
}

/// Parses a non-negative count. Missing, unparseable, and negative values
/// are `0`.
#[must_use]
pub fn coerce_count(raw: &str) -> u32 {
    coerce_i64(raw).map_or(0, |value| u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

/// Title-cases free text: the first letter of every run of letters is
/// upper-cased and the rest lower-cased.
///
/// ```
/// use ev_map_source::parsing::title_case;
///
/// assert_eq!(title_case("NEW HAVEN"), "New Haven");
/// assert_eq!(title_case("o'neil"), "O'Neil");
/// ```
#[must_use]
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;

    for c in raw.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

/// Parses a latitude/longitude pair. Returns `None` if either value is
/// missing, unparseable, zero, or out of range.
#[must_use]
pub fn parse_lat_lon(lat: &str, lon: &str) -> Option<(f64, f64)> {
    let latitude = coerce_f64(lat)?;
    let longitude = coerce_f64(lon)?;
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    Some((latitude, longitude))
}

/// Extracts `(latitude, longitude)` from `POINT (lon lat)` text.
#[must_use]
pub fn parse_point_lat_lon(raw: &str) -> Option<(f64, f64)> {
    let caps = POINT_RE.captures(raw)?;
    parse_lat_lon(caps.get(2)?.as_str(), caps.get(1)?.as_str())
}
