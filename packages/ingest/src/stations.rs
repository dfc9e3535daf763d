//! Charging station cleaning.

use ev_map_entity_models::{ChargerCounts, StationRecord};
use ev_map_geography::CityCountyMap;
use ev_map_source::parsing::{coerce_count, parse_lat_lon, parse_point_lat_lon, title_case};
use ev_map_source::{RawRow, RawTable, SourceError, SourceSnapshot};
use ev_map_source_models::SourceKind;

const STATION_NAME_COLUMN: &str = "station_name";
const CITY_COLUMN: &str = "city";
const LEVEL1_COLUMN: &str = "ev_level1_evse_num";
const LEVEL2_COLUMN: &str = "ev_level2_evse_num";
const DC_FAST_COLUMN: &str = "ev_dc_fast_count";
const POINT_COLUMN: &str = "new_georeferenced_column";

/// Explicit coordinate column pairs `(latitude, longitude)`, in priority
/// order.
const COORDINATE_COLUMNS: &[(&str, &str)] = &[("latitude", "longitude"), ("lat", "lng")];

/// Parses the station file held in `snapshot` and cleans it.
///
/// # Errors
///
/// Returns [`SourceError`] if the file is not parseable.
pub fn load_stations(
    snapshot: &SourceSnapshot,
    map: &CityCountyMap,
) -> Result<Vec<StationRecord>, SourceError> {
    let raw = snapshot.get(SourceKind::Stations).headed(0)?;
    Ok(clean_stations(raw, map))
}

/// Cleans a raw station table.
///
/// Absent count columns read as zero, absent text columns as empty strings.
/// Every row becomes a station, whether or not it has a location or a
/// mapped city.
#[must_use]
pub fn clean_stations(raw: RawTable, map: &CityCountyMap) -> Vec<StationRecord> {
    let table = raw.normalize_headers();

    let name_col = table.column(STATION_NAME_COLUMN);
    let city_col = table.column(CITY_COLUMN);
    let level1_col = table.column(LEVEL1_COLUMN);
    let level2_col = table.column(LEVEL2_COLUMN);
    let dc_fast_col = table.column(DC_FAST_COLUMN);

    for (name, col) in [
        (LEVEL1_COLUMN, level1_col),
        (LEVEL2_COLUMN, level2_col),
        (DC_FAST_COLUMN, dc_fast_col),
    ] {
        if col.is_none() {
            log::debug!("[{}] No {name} column; counts default to 0", SourceKind::Stations);
        }
    }

    let coordinate_cols: Vec<(usize, usize)> = COORDINATE_COLUMNS
        .iter()
        .filter_map(|(lat, lon)| Some((table.column(lat)?, table.column(lon)?)))
        .collect();
    let point_col = table.column(POINT_COLUMN);

    let stations: Vec<StationRecord> = table
        .rows()
        .map(|row| {
            let cell = |col: Option<usize>| col.map_or("", |i| row.at(i));
            let count = |col: Option<usize>| col.map_or(0, |i| coerce_count(row.at(i)));
            let raw_city = cell(city_col);

            StationRecord::new(
                cell(name_col).to_string(),
                title_case(raw_city),
                map.resolve(raw_city).map(str::to_string),
                ChargerCounts {
                    level1: count(level1_col),
                    level2: count(level2_col),
                    dc_fast: count(dc_fast_col),
                },
                locate(&row, &coordinate_cols, point_col),
            )
        })
        .collect();

    let located = stations.iter().filter(|s| s.location().is_some()).count();
    let unmapped = stations.iter().filter(|s| s.county.is_none()).count();
    log::info!(
        "[{}] Cleaned {} stations ({located} located, {unmapped} with unmapped city)",
        SourceKind::Stations,
        stations.len()
    );

    stations
}

/// Returns the first location any coordinate form yields for this row.
fn locate(
    row: &RawRow<'_>,
    coordinate_cols: &[(usize, usize)],
    point_col: Option<usize>,
) -> Option<(f64, f64)> {
    coordinate_cols
        .iter()
        .find_map(|(lat, lon)| parse_lat_lon(row.at(*lat), row.at(*lon)))
        .or_else(|| point_col.and_then(|i| parse_point_lat_lon(row.at(i))))
}
