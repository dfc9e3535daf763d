#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end pipeline: read the four sources, clean them, aggregate by
//! county, and hand back the finished tables.
//!
//! A run either completes with every table fully formed, or fails before
//! producing anything. Only an unreadable source aborts a run; bad cells,
//! unmapped cities, and degenerate ratios all surface as missing values.
//!
//! [`cache::PipelineCache`] memoizes runs keyed by a fingerprint of the
//! input files, and [`export`] writes the tables as CSV.

pub mod cache;
pub mod export;

use ev_map_analytics::build_county_summaries;
use ev_map_analytics::report::resolution_report;
use ev_map_analytics_models::{CountySummary, ResolutionReport};
use ev_map_entity_models::{IncomeRecord, PopulationRecord, StationRecord, VehicleRecord};
use ev_map_geography::CityCountyMap;
use ev_map_ingest::CleanedSources;
use ev_map_source::{SourceError, SourceSnapshot};
use ev_map_source::config::ConfigError;
use ev_map_source_models::SourceConfig;

use crate::export::ExportError;

/// Errors that can abort a pipeline invocation.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A source file could not be read or parsed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An output table could not be written.
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Every table produced by one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Cleaned, deduplicated vehicles.
    pub vehicles: Vec<VehicleRecord>,
    /// Cleaned stations.
    pub stations: Vec<StationRecord>,
    /// Income per county.
    pub income: Vec<IncomeRecord>,
    /// Population per county.
    pub population: Vec<PopulationRecord>,
    /// One row per county, ordered by county name.
    pub summaries: Vec<CountySummary>,
    /// Rows left out of `summaries` for lack of a county.
    pub report: ResolutionReport,
}

/// Runs the pipeline against the process-wide city table.
///
/// # Errors
///
/// Returns [`PipelineError::Source`] identifying the first unreadable
/// source.
pub fn run_pipeline(config: &SourceConfig) -> Result<PipelineOutput, PipelineError> {
    run_pipeline_with(config, CityCountyMap::global())
}

/// Runs the pipeline with an explicit city table.
///
/// # Errors
///
/// Returns [`PipelineError::Source`] identifying the first unreadable
/// source.
pub fn run_pipeline_with(
    config: &SourceConfig,
    map: &CityCountyMap,
) -> Result<PipelineOutput, PipelineError> {
    let sources = ev_map_ingest::load_all(config, map)?;
    Ok(assemble(sources))
}

/// Runs the pipeline on source contents that were already read.
///
/// # Errors
///
/// Returns [`PipelineError::Source`] identifying the first source that
/// cannot be parsed.
pub fn run_snapshot(
    config: &SourceConfig,
    snapshot: &SourceSnapshot,
    map: &CityCountyMap,
) -> Result<PipelineOutput, PipelineError> {
    let sources = ev_map_ingest::load_snapshot(config, snapshot, map)?;
    Ok(assemble(sources))
}

/// Aggregates already-cleaned sources into the finished tables.
#[must_use]
pub fn assemble(sources: CleanedSources) -> PipelineOutput {
    let CleanedSources {
        vehicles,
        stations,
        income,
        population,
    } = sources;

    let summaries = build_county_summaries(&vehicles, &stations, &income, &population);
    let report = resolution_report(&vehicles, &stations);

    PipelineOutput {
        vehicles,
        stations,
        income,
        population,
        summaries,
        report,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! On-disk source files shared by the pipeline tests.

    use std::path::{Path, PathBuf};

    use ev_map_source_models::{SourceConfig, SourcePaths};

    pub const INCOME: &str = "\
Income (Median household income) for Connecticut by County\n\
Household Income, 2018-2022\n\
\n\
Sorted by Value\n\
County,FIPS,Value (Dollars),Rank within US (of 3141 counties),State Abbreviation\n\
Connecticut,09000,\"90,213\",N/A,CT\n\
Hartford County,09003,\"84,926\",260,CT\n\
Windham County,09015,\"70,084\",887,CT\n";

    pub const VEHICLES: &str = "\
ID,VIN,Primary Customer City,State,Vehicle Make,Vehicle Model,Model Year,Fuel Code\n\
1,V1,HARTFORD,CT,TESLA,MODEL 3,2021,E00\n\
2,V2,HARTFORD,CT,TOYOTA,PRIUS PRIME,2022,H04\n\
3,V3,HARTFORD,CT,FORD,MACH-E,2023,X99\n\
4,V3,HARTFORD,CT,FORD,MACH-E,2023,X99\n\
5,V5,ATLANTIS,CT,KIA,EV6,2022,E00\n\
6,V6,SPRINGFIELD,MA,KIA,EV6,2022,E00\n";

    pub const STATIONS: &str = "\
Station Name,City,EV Level1 EVSE Num,EV Level2 EVSE Num,EV DC Fast Count,New Georeferenced Column\n\
Union Station,HARTFORD,0,3,0,POINT (-72.6817 41.7685)\n\
Atlantis Plaza,ATLANTIS,1,,,\n";

    pub const POPULATION: &str = "\
1,CT,\"Hartford, CT\",09003,Hartford County,x,y,z,894014\n\
2,CT,\"Windham, CT\",09015,Windham County,x,y,z,100000\n\
3,MA,\"Boston, MA\",25025,Suffolk County,x,y,z,767719\n";

    /// Writes the fixture sources into a fresh directory named `name` under
    /// the system temp dir and returns a config pointing at them.
    pub fn write_sources(name: &str) -> (PathBuf, SourceConfig) {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let write = |file: &str, contents: &str| -> PathBuf {
            let path = dir.join(file);
            std::fs::write(&path, contents).unwrap();
            path
        };

        let paths = SourcePaths {
            income: write("income.csv", INCOME),
            vehicles: write("vehicles.csv", VEHICLES),
            stations: write("stations.csv", STATIONS),
            population: write("population.csv", POPULATION),
        };

        (dir, SourceConfig::from_paths(paths))
    }

    pub fn cleanup(dir: &Path) {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_map_entity_models::EvCategory;
    use ev_map_source_models::SourceKind;

    #[test]
    fn end_to_end_run() {
        let (dir, config) = fixtures::write_sources("ev_map_pipeline_end_to_end");
        let output = run_pipeline(&config).unwrap();
        fixtures::cleanup(&dir);

        // V3 is duplicated and Springfield is out of state.
        assert_eq!(output.vehicles.len(), 4);
        let categories: Vec<EvCategory> =
            output.vehicles[..3].iter().map(|v| v.ev_category).collect();
        assert_eq!(categories, [EvCategory::Bev, EvCategory::Phev, EvCategory::Other]);

        let counties: Vec<&str> = output.summaries.iter().map(|s| s.county.as_str()).collect();
        assert_eq!(counties, ["Hartford", "Windham"]);

        let hartford = &output.summaries[0];
        assert_eq!(hartford.ev_registrations, 3);
        assert_eq!(hartford.total_stations, 1);
        assert_eq!(hartford.total_chargers, 3);
        assert_eq!(hartford.level2_chargers, 1);
        assert_eq!(hartford.fast_chargers, 0);
        assert_eq!(hartford.median_income, Some(84_926.0));
        assert_eq!(hartford.evs_per_charger, Some(1.0));

        let windham = &output.summaries[1];
        assert_eq!(windham.ev_registrations, 0);
        assert_eq!(windham.evs_per_charger, None);
        assert_eq!(windham.evs_per_1k_people, Some(0.0));
        assert_eq!(windham.chargers_per_1k_people, Some(0.0));

        assert_eq!(output.report.unmapped_vehicles, 1);
        assert_eq!(output.report.unmapped_stations, 1);
        assert_eq!(output.report.unmapped_cities[0].city, "Atlantis");

        let union_station = &output.stations[0];
        assert_eq!(union_station.location(), Some((41.7685, -72.6817)));
        assert!(union_station.has_level2);
    }

    #[test]
    fn missing_source_fails_with_its_kind() {
        let (dir, mut config) = fixtures::write_sources("ev_map_pipeline_missing_source");
        config.paths.stations = dir.join("nope.csv");
        let err = run_pipeline(&config).unwrap_err();
        fixtures::cleanup(&dir);

        match err {
            PipelineError::Source(source) => assert_eq!(source.kind(), SourceKind::Stations),
            other => panic!("unexpected error: {other}"),
        }
    }
}
