//! Per-county aggregation.

use std::collections::BTreeMap;

use ev_map_analytics_models::CountySummary;
use ev_map_entity_models::{IncomeRecord, PopulationRecord, StationRecord, VehicleRecord};
use ev_map_geography::is_known_county;

use crate::metrics::derive_metrics;

/// Builds the full county table: counts, joins, and derived ratios.
///
/// Output is ordered by county name.
#[must_use]
pub fn build_county_summaries(
    vehicles: &[VehicleRecord],
    stations: &[StationRecord],
    income: &[IncomeRecord],
    population: &[PopulationRecord],
) -> Vec<CountySummary> {
    let summaries: Vec<CountySummary> = aggregate_counties(vehicles, stations, income, population)
        .into_iter()
        .map(derive_metrics)
        .collect();

    log::info!("Built {} county summaries", summaries.len());

    summaries
}

/// Groups vehicles and stations by resolved county and left-joins income
/// and population. Ratios are left missing.
///
/// A county appears if any vehicle or station resolves to it, or if it is a
/// known county present in the income or population data. Rows without a
/// county never contribute to any count.
#[must_use]
pub fn aggregate_counties(
    vehicles: &[VehicleRecord],
    stations: &[StationRecord],
    income: &[IncomeRecord],
    population: &[PopulationRecord],
) -> Vec<CountySummary> {
    let mut counties: BTreeMap<&str, CountySummary> = BTreeMap::new();

    for county in vehicles.iter().filter_map(|v| v.county.as_deref()) {
        entry(&mut counties, county).ev_registrations += 1;
    }

    for station in stations {
        let Some(county) = station.county.as_deref() else {
            continue;
        };
        let summary = entry(&mut counties, county);
        summary.total_stations += 1;
        summary.total_chargers += u64::from(station.total_chargers);
        summary.fast_chargers += u64::from(station.has_dc_fast);
        summary.level2_chargers += u64::from(station.has_level2);
        summary.level1_chargers += u64::from(station.has_level1);
    }

    let income_counties = income.iter().map(|r| r.county.as_str());
    let population_counties = population.iter().map(|r| r.county.as_str());
    for county in income_counties.chain(population_counties) {
        if is_known_county(county) {
            entry(&mut counties, county);
        }
    }

    let income_by_county =
        first_per_county(income.iter().map(|r| (r.county.as_str(), r.median_income)));
    let population_by_county =
        first_per_county(population.iter().map(|r| (r.county.as_str(), r.population)));

    counties
        .into_values()
        .map(|summary| CountySummary {
            median_income: income_by_county.get(summary.county.as_str()).copied().flatten(),
            population: population_by_county.get(summary.county.as_str()).copied().flatten(),
            ..summary
        })
        .collect()
}

fn entry<'a, 'm>(
    counties: &'m mut BTreeMap<&'a str, CountySummary>,
    county: &'a str,
) -> &'m mut CountySummary {
    counties
        .entry(county)
        .or_insert_with(|| CountySummary::empty(county.to_string()))
}

fn first_per_county<'a>(
    values: impl Iterator<Item = (&'a str, Option<f64>)>,
) -> BTreeMap<&'a str, Option<f64>> {
    let mut map = BTreeMap::new();
    for (county, value) in values {
        map.entry(county).or_insert(value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_map_entity_models::{ChargerCounts, EvCategory};

    fn vehicle(county: Option<&str>, category: EvCategory) -> VehicleRecord {
        VehicleRecord {
            city: "Somewhere".to_string(),
            make: "Make".to_string(),
            model: "Model".to_string(),
            model_year: Some(2022),
            fuel_code: None,
            ev_category: category,
            county: county.map(str::to_string),
            id_or_vin: None,
        }
    }

    fn station(county: Option<&str>, level1: u32, level2: u32, dc_fast: u32) -> StationRecord {
        StationRecord::new(
            "Station".to_string(),
            "Somewhere".to_string(),
            county.map(str::to_string),
            ChargerCounts {
                level1,
                level2,
                dc_fast,
            },
            None,
        )
    }

    fn income(county: &str, value: f64) -> IncomeRecord {
        IncomeRecord {
            county: county.to_string(),
            median_income: Some(value),
            national_rank: None,
        }
    }

    fn population(county: &str, value: f64) -> PopulationRecord {
        PopulationRecord {
            county: county.to_string(),
            population: Some(value),
        }
    }

    #[test]
    fn hartford_registrations_count_every_category() {
        let vehicles = [
            vehicle(Some("Hartford"), EvCategory::Bev),
            vehicle(Some("Hartford"), EvCategory::Phev),
            vehicle(Some("Hartford"), EvCategory::Other),
        ];
        let summaries = build_county_summaries(&vehicles, &[], &[], &[]);

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].county, "Hartford");
        assert_eq!(summaries[0].ev_registrations, 3);
    }

    #[test]
    fn unmapped_rows_never_form_a_bucket() {
        let vehicles = [vehicle(None, EvCategory::Bev), vehicle(Some("Tolland"), EvCategory::Bev)];
        let stations = [station(None, 0, 5, 0)];
        let summaries = build_county_summaries(&vehicles, &stations, &[], &[]);

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].county, "Tolland");
        assert_eq!(summaries[0].ev_registrations, 1);
        assert_eq!(summaries[0].total_chargers, 0);
    }

    #[test]
    fn station_aggregates_sum_ports_and_count_flags() {
        let stations = [
            station(Some("New Haven"), 0, 3, 0),
            station(Some("New Haven"), 2, 4, 1),
            station(Some("New Haven"), 0, 0, 2),
        ];
        let summaries = build_county_summaries(&[], &stations, &[], &[]);
        let new_haven = &summaries[0];

        assert_eq!(new_haven.total_stations, 3);
        assert_eq!(new_haven.total_chargers, 12);
        assert_eq!(new_haven.fast_chargers, 2);
        assert_eq!(new_haven.level2_chargers, 2);
        assert_eq!(new_haven.level1_chargers, 1);
        assert_eq!(new_haven.evs_per_charger, Some(0.0));
    }

    #[test]
    fn outer_join_of_vehicles_and_stations() {
        let vehicles = [vehicle(Some("Fairfield"), EvCategory::Bev)];
        let stations = [station(Some("Middlesex"), 0, 1, 0)];
        let summaries = build_county_summaries(&vehicles, &stations, &[], &[]);
        let counties: Vec<&str> = summaries.iter().map(|s| s.county.as_str()).collect();

        assert_eq!(counties, ["Fairfield", "Middlesex"]);
        assert_eq!(summaries[0].evs_per_charger, None);
        assert_eq!(summaries[1].evs_per_charger, Some(0.0));
    }

    #[test]
    fn windham_from_population_only() {
        let summaries = build_county_summaries(&[], &[], &[], &[population("Windham", 100_000.0)]);
        let windham = &summaries[0];

        assert_eq!(windham.county, "Windham");
        assert_eq!(windham.ev_registrations, 0);
        assert_eq!(windham.total_chargers, 0);
        assert_eq!(windham.evs_per_charger, None);
        assert_eq!(windham.evs_per_1k_people, Some(0.0));
        assert_eq!(windham.chargers_per_1k_people, Some(0.0));
    }

    #[test]
    fn left_joins_income_and_population() {
        let vehicles = vec![vehicle(Some("Hartford"), EvCategory::Bev); 2];
        let stations = [station(Some("Hartford"), 0, 4, 0)];
        let summaries = build_county_summaries(
            &vehicles,
            &stations,
            &[income("Hartford", 84_926.0), income("Hartford", 1.0)],
            &[population("Hartford", 2_000.0)],
        );
        let hartford = &summaries[0];

        assert_eq!(hartford.median_income, Some(84_926.0));
        assert_eq!(hartford.population, Some(2_000.0));
        assert_eq!(hartford.evs_per_charger, Some(0.5));
        assert_eq!(hartford.evs_per_1k_people, Some(1.0));
        assert_eq!(hartford.chargers_per_1k_people, Some(2.0));
    }

    #[test]
    fn state_and_national_rows_do_not_join_the_universe() {
        let summaries = build_county_summaries(
            &[],
            &[],
            &[income("Connecticut", 90_213.0), income("Litchfield", 88_000.0)],
            &[population("United States", 3.3e8)],
        );
        let counties: Vec<&str> = summaries.iter().map(|s| s.county.as_str()).collect();

        assert_eq!(counties, ["Litchfield"]);
        assert_eq!(summaries[0].median_income, Some(88_000.0));
        assert_eq!(summaries[0].population, None);
        assert_eq!(summaries[0].evs_per_1k_people, None);
    }

    #[test]
    fn registrations_match_mapped_vehicle_counts() {
        let vehicles = [
            vehicle(Some("Hartford"), EvCategory::Bev),
            vehicle(Some("Windham"), EvCategory::Bev),
            vehicle(None, EvCategory::Bev),
            vehicle(Some("Hartford"), EvCategory::Unknown),
        ];
        let summaries = build_county_summaries(&vehicles, &[], &[], &[]);

        for summary in &summaries {
            let expected = vehicles
                .iter()
                .filter(|v| v.county.as_deref() == Some(summary.county.as_str()))
                .count() as u64;
            assert_eq!(summary.ev_registrations, expected);
        }
    }
}
