#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Turns raw source tables into cleaned entity records.
//!
//! Each source has its own module with a `load_*` function that reads the
//! configured file and a pure `clean_*` function that works on an
//! already-read [`RawTable`](ev_map_source::RawTable). Cleaning never
//! fails: malformed cells become missing values and unmapped cities become
//! a `None` county.

pub mod income;
pub mod population;
pub mod stations;
pub mod vehicles;

use ev_map_entity_models::{IncomeRecord, PopulationRecord, StationRecord, VehicleRecord};
use ev_map_geography::{COVERED_STATE, CityCountyMap, is_covered_state};
use ev_map_source::{SourceError, SourceSnapshot};
use ev_map_source_models::SourceConfig;

/// All four sources after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSources {
    /// Deduplicated vehicle registrations.
    pub vehicles: Vec<VehicleRecord>,
    /// Charging stations with derived totals and flags.
    pub stations: Vec<StationRecord>,
    /// Income per canonical county, unique by county.
    pub income: Vec<IncomeRecord>,
    /// Population per canonical county, unique by county.
    pub population: Vec<PopulationRecord>,
}

/// Reads and cleans every configured source.
///
/// Sources are read in [`SourceKind::all`](ev_map_source_models::SourceKind::all)
/// order and the first unreadable one aborts the load.
///
/// # Errors
///
/// Returns [`SourceError`] identifying the first source that could not be
/// read or parsed.
pub fn load_all(config: &SourceConfig, map: &CityCountyMap) -> Result<CleanedSources, SourceError> {
    let snapshot = SourceSnapshot::read(&config.paths)?;
    load_snapshot(config, &snapshot, map)
}

/// Parses and cleans sources that were already read into `snapshot`.
///
/// # Errors
///
/// Returns [`SourceError`] identifying the first source that could not be
/// parsed.
pub fn load_snapshot(
    config: &SourceConfig,
    snapshot: &SourceSnapshot,
    map: &CityCountyMap,
) -> Result<CleanedSources, SourceError> {
    if !is_covered_state(&config.target_state) {
        log::warn!(
            "Target state {} is not covered by the county tables ({COVERED_STATE}); \
             no rows will resolve to a county",
            config.target_state
        );
    }

    let income = income::load_income(config, snapshot)?;
    let vehicles = vehicles::load_vehicles(config, snapshot, map)?;
    let stations = stations::load_stations(snapshot, map)?;
    let population = population::load_population(config, snapshot)?;

    Ok(CleanedSources {
        vehicles,
        stations,
        income,
        population,
    })
}
