//! Statewide headline figures and filtered entity views.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use ev_map_analytics_models::{CategoryCount, CountySummary, StateOverview};
use ev_map_entity_models::{EvCategory, StationRecord, VehicleRecord};

use crate::metrics::safe_div;

/// Selects a subset of cleaned vehicles. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleFilter {
    /// Only vehicles resolved to this county.
    pub county: Option<String>,
    /// Only vehicles of this category.
    pub ev_category: Option<EvCategory>,
    /// Only vehicles whose model year falls in this range. Vehicles with a
    /// missing year never match a range.
    pub year_range: Option<RangeInclusive<i32>>,
}

impl VehicleFilter {
    /// Returns `true` if `vehicle` meets every set criterion.
    #[must_use]
    pub fn matches(&self, vehicle: &VehicleRecord) -> bool {
        if let Some(county) = &self.county
            && vehicle.county.as_ref() != Some(county)
        {
            return false;
        }
        if let Some(category) = self.ev_category
            && vehicle.ev_category != category
        {
            return false;
        }
        if let Some(range) = &self.year_range {
            return vehicle.model_year.is_some_and(|year| range.contains(&year));
        }
        true
    }

    /// Returns the matching vehicles, in input order.
    #[must_use]
    pub fn apply<'a>(&self, vehicles: &'a [VehicleRecord]) -> Vec<&'a VehicleRecord> {
        vehicles.iter().filter(|v| self.matches(v)).collect()
    }
}

/// Returns the stations resolved to `county`, or all stations when `county`
/// is `None`.
#[must_use]
pub fn stations_in<'a>(
    stations: &'a [StationRecord],
    county: Option<&str>,
) -> Vec<&'a StationRecord> {
    stations
        .iter()
        .filter(|s| county.is_none_or(|c| s.county.as_deref() == Some(c)))
        .collect()
}

/// Computes headline figures for a view of vehicles, stations, and county
/// summaries.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn overview(
    vehicles: &[&VehicleRecord],
    stations: &[&StationRecord],
    summaries: &[CountySummary],
) -> StateOverview {
    let ev_records = vehicles.len() as u64;
    let total_chargers: u64 = stations.iter().map(|s| u64::from(s.total_chargers)).sum();
    let mapped = vehicles.iter().filter(|v| v.county.is_some()).count() as u64;
    let counties: BTreeSet<&str> = summaries.iter().map(|s| s.county.as_str()).collect();

    StateOverview {
        ev_records,
        charging_stations: stations.len() as u64,
        counties_in_view: counties.len() as u64,
        total_chargers,
        evs_per_charger: safe_div(ev_records as f64, Some(total_chargers as f64)),
        mapped_share: safe_div(mapped as f64, Some(ev_records as f64)),
    }
}

/// Counties with a defined vehicles-per-charger ratio, highest first.
///
/// Ties are broken by county name.
#[must_use]
pub fn gap_ranking(summaries: &[CountySummary]) -> Vec<&CountySummary> {
    let mut ranked: Vec<&CountySummary> = summaries
        .iter()
        .filter(|s| s.evs_per_charger.is_some())
        .collect();

    ranked.sort_by(|a, b| {
        let a_rate = a.evs_per_charger.unwrap_or_default();
        let b_rate = b.evs_per_charger.unwrap_or_default();
        b_rate.total_cmp(&a_rate).then_with(|| a.county.cmp(&b.county))
    });

    ranked
}

/// Stations that can be placed on a map and have at least `min_chargers`
/// ports.
#[must_use]
pub fn mappable_stations(stations: &[StationRecord], min_chargers: u32) -> Vec<&StationRecord> {
    stations
        .iter()
        .filter(|s| s.location().is_some() && s.total_chargers >= min_chargers)
        .collect()
}

/// Vehicles per category, most common first. Categories with no vehicles
/// are omitted.
#[must_use]
pub fn ev_category_counts<'a>(
    vehicles: impl IntoIterator<Item = &'a VehicleRecord>,
) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<EvCategory, u64> = BTreeMap::new();
    for vehicle in vehicles {
        *counts.entry(vehicle.ev_category).or_insert(0) += 1;
    }

    let mut counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    counts
}
