//! Reporting rows whose city did not resolve to a county.

use std::collections::BTreeMap;

use ev_map_analytics_models::{ResolutionReport, UnmappedCity};
use ev_map_entity_models::{StationRecord, VehicleRecord};

/// Summarizes the vehicles and stations left out of the county table.
///
/// Cities are grouped by their cleaned display name and sorted by total
/// rows, most first, then by name.
#[must_use]
pub fn resolution_report(
    vehicles: &[VehicleRecord],
    stations: &[StationRecord],
) -> ResolutionReport {
    let mut cities: BTreeMap<&str, UnmappedCity> = BTreeMap::new();
    let mut unmapped_vehicles = 0;
    let mut unmapped_stations = 0;

    for vehicle in vehicles.iter().filter(|v| v.county.is_none()) {
        unmapped_vehicles += 1;
        city_entry(&mut cities, &vehicle.city).vehicles += 1;
    }
    for station in stations.iter().filter(|s| s.county.is_none()) {
        unmapped_stations += 1;
        city_entry(&mut cities, &station.city).stations += 1;
    }

    let mut unmapped_cities: Vec<UnmappedCity> = cities.into_values().collect();
    unmapped_cities.sort_by(|a, b| b.total().cmp(&a.total()).then_with(|| a.city.cmp(&b.city)));

    if !unmapped_cities.is_empty() {
        log::info!(
            "{unmapped_vehicles} vehicles and {unmapped_stations} stations across {} cities \
             have no county",
            unmapped_cities.len()
        );
    }

    ResolutionReport {
        unmapped_vehicles,
        unmapped_stations,
        unmapped_cities,
    }
}

fn city_entry<'a, 'm>(
    cities: &'m mut BTreeMap<&'a str, UnmappedCity>,
    city: &'a str,
) -> &'m mut UnmappedCity {
    cities.entry(city).or_insert_with(|| UnmappedCity {
        city: city.to_string(),
        vehicles: 0,
        stations: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_map_entity_models::{ChargerCounts, EvCategory};

    fn vehicle(city: &str, county: Option<&str>) -> VehicleRecord {
        VehicleRecord {
            city: city.to_string(),
            make: String::new(),
            model: String::new(),
            model_year: None,
            fuel_code: None,
            ev_category: EvCategory::Unknown,
            county: county.map(str::to_string),
            id_or_vin: None,
        }
    }

    fn station(city: &str, county: Option<&str>) -> StationRecord {
        StationRecord::new(
            String::new(),
            city.to_string(),
            county.map(str::to_string),
            ChargerCounts::default(),
            None,
        )
    }

    #[test]
    fn counts_unmapped_rows_per_city() {
        let vehicles = [
            vehicle("Hartford", Some("Hartford")),
            vehicle("Atlantis", None),
            vehicle("Springfield", None),
            vehicle("Springfield", None),
        ];
        let stations = [station("Atlantis", None), station("Atlantis", None)];
        let report = resolution_report(&vehicles, &stations);

        assert_eq!(report.unmapped_vehicles, 3);
        assert_eq!(report.unmapped_stations, 2);
        assert_eq!(
            report.unmapped_cities,
            [
                UnmappedCity {
                    city: "Atlantis".to_string(),
                    vehicles: 1,
                    stations: 2,
                },
                UnmappedCity {
                    city: "Springfield".to_string(),
                    vehicles: 2,
                    stations: 0,
                },
            ]
        );
    }

    #[test]
    fn fully_resolved_input_is_complete() {
        let report = resolution_report(&[vehicle("Hartford", Some("Hartford"))], &[]);
        assert!(report.is_complete());
        assert!(report.unmapped_cities.is_empty());
    }
}
