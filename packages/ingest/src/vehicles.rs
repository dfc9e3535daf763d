//! Vehicle registration cleaning.

use std::collections::BTreeSet;

use ev_map_entity_models::{EvCategory, VehicleRecord};
use ev_map_geography::CityCountyMap;
use ev_map_source::parsing::{coerce_i64, title_case};
use ev_map_source::{RawTable, SourceError, SourceSnapshot};
use ev_map_source_models::{SourceConfig, SourceKind};

/// Registration city columns, in priority order.
const CITY_COLUMNS: &[&str] = &["primary_customer_city", "city"];
/// Make columns, in priority order.
const MAKE_COLUMNS: &[&str] = &["vehicle_make", "make"];
/// Model columns, in priority order.
const MODEL_COLUMNS: &[&str] = &["vehicle_model", "model"];
/// Year columns, in priority order.
const YEAR_COLUMNS: &[&str] = &["model_year", "vehicle_year"];
/// Unique identifier columns, in priority order.
const ID_COLUMNS: &[&str] = &["vin", "id"];

const FUEL_CODE_COLUMN: &str = "fuel_code";
const STATE_COLUMN: &str = "state";

/// Maps a raw fuel code to its EV category.
///
/// `E00` is battery-electric and `H04` is plug-in hybrid; every other code,
/// including a blank one, is [`EvCategory::Other`]. Codes are compared
/// after trimming and upper-casing.
#[must_use]
pub fn categorize_fuel_code(code: &str) -> EvCategory {
    match code.trim().to_ascii_uppercase().as_str() {
        "E00" => EvCategory::Bev,
        "H04" => EvCategory::Phev,
        _ => EvCategory::Other,
    }
}

/// Parses the vehicle file held in `snapshot` and cleans it.
///
/// # Errors
///
/// Returns [`SourceError`] if the file is not parseable.
pub fn load_vehicles(
    config: &SourceConfig,
    snapshot: &SourceSnapshot,
    map: &CityCountyMap,
) -> Result<Vec<VehicleRecord>, SourceError> {
    let raw = snapshot.get(SourceKind::Vehicles).headed(0)?;
    Ok(clean_vehicles(raw, &config.target_state, map))
}

/// Cleans a raw vehicle table.
///
/// Keeps rows of `target_state` when a `state` column exists, title-cases
/// the descriptive fields, derives the EV category, resolves the county,
/// and finally drops duplicate identifiers.
#[must_use]
pub fn clean_vehicles(
    raw: RawTable,
    target_state: &str,
    map: &CityCountyMap,
) -> Vec<VehicleRecord> {
    let table = raw.normalize_headers();
    let read = table.len();

    let table = if table.has_column(STATE_COLUMN) {
        let target = target_state.to_uppercase();
        let filtered = table.filter(|row| {
            row.get(STATE_COLUMN)
                .is_some_and(|state| state.to_uppercase() == target)
        });
        log::info!(
            "[{}] Kept {} of {read} rows in {target}",
            SourceKind::Vehicles,
            filtered.len()
        );
        filtered
    } else {
        table
    };

    let city_col = first_column(&table, CITY_COLUMNS);
    let make_col = first_column(&table, MAKE_COLUMNS);
    let model_col = first_column(&table, MODEL_COLUMNS);
    let year_col = first_column(&table, YEAR_COLUMNS);
    let id_col = first_column(&table, ID_COLUMNS);
    let fuel_col = table.column(FUEL_CODE_COLUMN);

    if fuel_col.is_none() {
        log::warn!(
            "[{}] No {FUEL_CODE_COLUMN} column; every vehicle is {}",
            SourceKind::Vehicles,
            EvCategory::Unknown
        );
    }

    let records: Vec<VehicleRecord> = table
        .rows()
        .map(|row| {
            let cell = |col: Option<usize>| col.map_or("", |i| row.at(i));
            let raw_city = cell(city_col);

            let fuel_code = fuel_col.map(|i| row.at(i)).filter(|c| !c.is_empty());
            let ev_category = match fuel_col {
                Some(_) => fuel_code.map_or(EvCategory::Other, categorize_fuel_code),
                None => EvCategory::Unknown,
            };

            VehicleRecord {
                city: title_case(raw_city),
                make: title_case(cell(make_col)),
                model: title_case(cell(model_col)),
                model_year: year_col
                    .and_then(|i| coerce_i64(row.at(i)))
                    .and_then(|year| i32::try_from(year).ok()),
                fuel_code: fuel_code.map(str::to_string),
                ev_category,
                county: map.resolve(raw_city).map(str::to_string),
                id_or_vin: id_col
                    .map(|i| row.at(i))
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
            }
        })
        .collect();

    let records = if id_col.is_some() {
        dedupe_vehicles(records)
    } else {
        records
    };

    let unmapped = records.iter().filter(|v| v.county.is_none()).count();
    log::info!(
        "[{}] Cleaned {} vehicles ({unmapped} with unmapped city)",
        SourceKind::Vehicles,
        records.len()
    );

    records
}

/// Keeps the first vehicle per identifier. Vehicles without an identifier
/// are always kept.
#[must_use]
pub fn dedupe_vehicles(records: Vec<VehicleRecord>) -> Vec<VehicleRecord> {
    let before = records.len();
    let mut seen = BTreeSet::new();

    let kept: Vec<VehicleRecord> = records
        .into_iter()
        .filter(|record| {
            record
                .id_or_vin
                .as_ref()
                .is_none_or(|id| seen.insert(id.clone()))
        })
        .collect();

    let dropped = before - kept.len();
    if dropped > 0 {
        log::info!("[{}] Dropped {dropped} duplicate vehicles", SourceKind::Vehicles);
    }

    kept
}

fn first_column(table: &RawTable, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|name| table.column(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_map_source::table::parse_headed;

    fn clean(csv: &str) -> Vec<VehicleRecord> {
        let raw = parse_headed(SourceKind::Vehicles, csv.as_bytes(), 0)
            .unwrap()
            .unwrap();
        clean_vehicles(raw, "CT", CityCountyMap::global())
    }

    #[test]
    fn categorizes_known_and_unknown_codes() {
        assert_eq!(categorize_fuel_code("E00"), EvCategory::Bev);
        assert_eq!(categorize_fuel_code(" h04 "), EvCategory::Phev);
        assert_eq!(categorize_fuel_code("X99"), EvCategory::Other);
        assert_eq!(categorize_fuel_code(""), EvCategory::Other);
    }

    #[test]
    fn hartford_fuel_codes_map_to_categories() {
        let vehicles = clean(
            "Primary Customer City,Vehicle Make,Fuel Code\n\
             HARTFORD,TESLA,E00\n\
             HARTFORD,TOYOTA,H04\n\
             HARTFORD,FORD,X99\n",
        );

        let categories: Vec<EvCategory> = vehicles.iter().map(|v| v.ev_category).collect();
        assert_eq!(categories, [EvCategory::Bev, EvCategory::Phev, EvCategory::Other]);
        assert!(vehicles.iter().all(|v| v.county.as_deref() == Some("Hartford")));
        assert_eq!(vehicles[0].city, "Hartford");
        assert_eq!(vehicles[0].make, "Tesla");
        assert_eq!(vehicles[2].fuel_code.as_deref(), Some("X99"));
    }

    #[test]
    fn blank_code_is_other_and_missing_column_is_unknown() {
        let with_column = clean("city,fuel_code\nHartford,\n");
        assert_eq!(with_column[0].ev_category, EvCategory::Other);
        assert_eq!(with_column[0].fuel_code, None);

        let without_column = clean("city,make\nHartford,Kia\n");
        assert_eq!(without_column[0].ev_category, EvCategory::Unknown);
    }

    #[test]
    fn filters_to_target_state_case_insensitively() {
        let vehicles = clean("city,state\nHartford,CT\nBoston,MA\nStamford,ct\n");
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[1].county.as_deref(), Some("Fairfield"));
    }

    #[test]
    fn dedupes_by_vin_before_id() {
        let vehicles = clean("vin,id,city\nA1,1,Hartford\nA1,2,Hartford\nB2,2,Hartford\n");
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0].id_or_vin.as_deref(), Some("A1"));
        assert_eq!(vehicles[1].id_or_vin.as_deref(), Some("B2"));

        let by_id = clean("id,city\n7,Hartford\n7,Hartford\n8,Hartford\n");
        assert_eq!(by_id.len(), 2);
    }

    #[test]
    fn blank_identifiers_are_never_deduplicated() {
        let vehicles = clean("vin,city\n,Hartford\n,Hartford\n");
        assert_eq!(vehicles.len(), 2);
        assert!(vehicles.iter().all(|v| v.id_or_vin.is_none()));
    }

    #[test]
    fn no_identifier_column_keeps_every_row() {
        let vehicles = clean("city,make\nHartford,Kia\nHartford,Kia\n");
        assert_eq!(vehicles.len(), 2);
    }

    #[test]
    fn deduplication_is_idempotent() {
        let once = clean("vin,city\nA,Hartford\nB,Mystic\nA,Storrs\n,Nowhere\n");
        let twice = dedupe_vehicles(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn title_casing_does_not_change_the_key() {
        let vehicles = clean("vin,city\nabc,hartford\nABC,HARTFORD\n");
        assert_eq!(vehicles.len(), 2);
    }

    #[test]
    fn model_year_falls_back_to_vehicle_year() {
        let vehicles = clean("city,vehicle_year\nHartford,2021\nHartford,soon\n");
        assert_eq!(vehicles[0].model_year, Some(2021));
        assert_eq!(vehicles[1].model_year, None);

        let both = clean("city,model_year,vehicle_year\nHartford,2019.0,2021\n");
        assert_eq!(both[0].model_year, Some(2019));
    }

    #[test]
    fn unmapped_city_keeps_the_row_without_county() {
        let vehicles = clean("city\nSpringfield\n");
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].county, None);
        assert_eq!(vehicles[0].city, "Springfield");
    }
}
