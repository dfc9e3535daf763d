#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County-level result types.
//!
//! Field names are the column names of the exported tables, so they are
//! kept in `snake_case` for both CSV and JSON output.

use ev_map_entity_models::EvCategory;
use serde::{Deserialize, Serialize};

/// One county's joined vehicle, station, income, and population figures.
///
/// Counts are never missing: a county known only from income or population
/// data has zero vehicles and zero stations. Ratios are `None` whenever
/// their denominator is zero or missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountySummary {
    /// Canonical county name.
    pub county: String,
    /// Vehicles registered in the county.
    pub ev_registrations: u64,
    /// Station rows in the county.
    pub total_stations: u64,
    /// Sum of all charging ports.
    pub total_chargers: u64,
    /// Stations offering at least one DC fast port.
    pub fast_chargers: u64,
    /// Stations offering at least one Level 2 port.
    pub level2_chargers: u64,
    /// Stations offering at least one Level 1 port.
    pub level1_chargers: u64,
    /// Median household income in dollars.
    pub median_income: Option<f64>,
    /// Resident population.
    pub population: Option<f64>,
    /// `ev_registrations / total_chargers`.
    pub evs_per_charger: Option<f64>,
    /// `ev_registrations` per 1,000 residents.
    pub evs_per_1k_people: Option<f64>,
    /// `total_chargers` per 1,000 residents.
    pub chargers_per_1k_people: Option<f64>,
}

impl CountySummary {
    /// Creates a summary with zero counts and every optional value missing.
    #[must_use]
    pub const fn empty(county: String) -> Self {
        Self {
            county,
            ev_registrations: 0,
            total_stations: 0,
            total_chargers: 0,
            fast_chargers: 0,
            level2_chargers: 0,
            level1_chargers: 0,
            median_income: None,
            population: None,
            evs_per_charger: None,
            evs_per_1k_people: None,
            chargers_per_1k_people: None,
        }
    }
}

/// Statewide headline figures for a (possibly filtered) view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateOverview {
    /// Vehicle records in view.
    pub ev_records: u64,
    /// Station records in view.
    pub charging_stations: u64,
    /// Distinct counties in the summary table.
    pub counties_in_view: u64,
    /// Charging ports across all stations in view.
    pub total_chargers: u64,
    /// `ev_records / total_chargers`.
    pub evs_per_charger: Option<f64>,
    /// Share of vehicles with a resolved county, in `0.0..=1.0`.
    pub mapped_share: Option<f64>,
}

/// Number of vehicles in one EV category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// The category.
    pub category: EvCategory,
    /// Vehicles in it.
    pub count: u64,
}

/// A city name that did not resolve to any county.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmappedCity {
    /// City as it appears in the cleaned records.
    pub city: String,
    /// Vehicle rows with this city.
    pub vehicles: u64,
    /// Station rows with this city.
    pub stations: u64,
}

impl UnmappedCity {
    /// Rows of either kind with this city.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.vehicles + self.stations
    }
}

/// Rows that were left out of the county table because their city could
/// not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    /// Vehicles with a missing county.
    pub unmapped_vehicles: u64,
    /// Stations with a missing county.
    pub unmapped_stations: u64,
    /// Distinct unmapped cities, most rows first.
    pub unmapped_cities: Vec<UnmappedCity>,
}

impl ResolutionReport {
    /// Returns `true` if every row resolved to a county.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.unmapped_vehicles == 0 && self.unmapped_stations == 0
    }
}
