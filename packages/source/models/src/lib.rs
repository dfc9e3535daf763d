#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Source identifiers and the configuration that locates and shapes the
//! four input files.
//!
//! A [`SourceConfig`] is normally deserialized from a TOML file. Every field
//! except [`SourceConfig::paths`] has a default matching the Connecticut
//! data exports the pipeline was built around.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Identifies one of the four input sources.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceKind {
    /// County median household income (HDPulse export)
    Income,
    /// Vehicle registration records
    Vehicles,
    /// Charging station inventory
    Stations,
    /// City and county energy profiles (positional, no header)
    Population,
}

impl SourceKind {
    /// All sources in the order the pipeline reads them.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Income, Self::Vehicles, Self::Stations, Self::Population]
    }
}

/// File locations for the four sources.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourcePaths {
    /// Income-by-county table.
    pub income: PathBuf,
    /// Vehicle registration table.
    pub vehicles: PathBuf,
    /// Charging station table.
    pub stations: PathBuf,
    /// Header-less population table.
    pub population: PathBuf,
}

impl SourcePaths {
    /// Returns the path configured for `kind`.
    #[must_use]
    pub const fn get(&self, kind: SourceKind) -> &PathBuf {
        match kind {
            SourceKind::Income => &self.income,
            SourceKind::Vehicles => &self.vehicles,
            SourceKind::Stations => &self.stations,
            SourceKind::Population => &self.population,
        }
    }
}

/// Zero-based column positions in the header-less population file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationColumns {
    /// Two-letter state abbreviation.
    pub state: usize,
    /// Place label, e.g. `"Hartford, CT"`.
    pub place: usize,
    /// County name, possibly with a `" County"` suffix.
    pub county: usize,
    /// 2016 population estimate.
    pub population: usize,
}

impl Default for PopulationColumns {
    fn default() -> Self {
        Self {
            state: 1,
            place: 2,
            county: 4,
            population: 8,
        }
    }
}

/// Full source configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Where each source file lives.
    pub paths: SourcePaths,
    /// Two-letter abbreviation of the state whose rows are kept, compared
    /// case-insensitively.
    ///
    /// The county list and city table only cover Connecticut, so any other
    /// state yields cleaned rows with no county and an empty county table.
    #[serde(default = "default_target_state")]
    pub target_state: String,
    /// Preamble lines in the income file before the real header row.
    #[serde(default = "default_income_skip_rows")]
    pub income_skip_rows: usize,
    /// Drop income rows whose median income fails numeric coercion instead
    /// of keeping them with a missing value.
    #[serde(default)]
    pub drop_unparsable_income: bool,
    /// Positional layout of the population file.
    #[serde(default)]
    pub population_columns: PopulationColumns,
}

fn default_target_state() -> String {
    "CT".to_string()
}

const fn default_income_skip_rows() -> usize {
    4
}

impl SourceConfig {
    /// Builds a configuration for `paths` with every other option at its
    /// default.
    #[must_use]
    pub fn from_paths(paths: SourcePaths) -> Self {
        Self {
            paths,
            target_state: default_target_state(),
            income_skip_rows: default_income_skip_rows(),
            drop_unparsable_income: false,
            population_columns: PopulationColumns::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    fn paths() -> SourcePaths {
        SourcePaths {
            income: PathBuf::from("income.csv"),
            vehicles: PathBuf::from("vehicles.csv"),
            stations: PathBuf::from("stations.csv"),
            population: PathBuf::from("population.csv"),
        }
    }

    #[test]
    fn source_kind_names() {
        assert_eq!(SourceKind::Population.to_string(), "population");
        assert_eq!(SourceKind::from_str("stations").unwrap(), SourceKind::Stations);
        assert_eq!(SourceKind::all().len(), 4);
    }

    #[test]
    fn paths_lookup_by_kind() {
        let paths = paths();
        assert_eq!(paths.get(SourceKind::Income), &PathBuf::from("income.csv"));
        assert_eq!(
            paths.get(SourceKind::Population),
            &PathBuf::from("population.csv")
        );
    }

    #[test]
    fn defaults_match_connecticut_exports() {
        let config = SourceConfig::from_paths(paths());
        assert_eq!(config.target_state, "CT");
        assert_eq!(config.income_skip_rows, 4);
        assert!(!config.drop_unparsable_income);
        assert_eq!(config.population_columns.county, 4);
        assert_eq!(config.population_columns.population, 8);
    }
}
