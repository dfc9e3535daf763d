#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cleaned entity record types.
//!
//! Every source file is normalized and cleaned into one of these records
//! before any county-level aggregation happens. A missing county is always
//! `None`, never a placeholder string, so unmapped rows cannot be grouped
//! together by accident.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Electric vehicle category derived from a registration fuel code.
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
pub enum EvCategory {
    /// Battery-electric vehicle
    #[serde(rename = "BEV")]
    #[strum(serialize = "BEV")]
    Bev,
    /// Plug-in hybrid electric vehicle
    #[serde(rename = "PHEV")]
    #[strum(serialize = "PHEV")]
    Phev,
    /// A fuel code that is present but not one of the known EV codes
    Other,
    /// The source has no fuel code column at all
    Unknown,
}

impl EvCategory {
    /// Returns all categories in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Bev, Self::Phev, Self::Other, Self::Unknown]
    }
}

/// One registered vehicle after cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Registration city, title-cased for display.
    pub city: String,
    /// Vehicle make, title-cased.
    pub make: String,
    /// Vehicle model, title-cased.
    pub model: String,
    /// Model year. `None` when absent or unparseable.
    pub model_year: Option<i32>,
    /// Raw fuel code as delivered by the source. `None` when the source has
    /// no fuel code column.
    pub fuel_code: Option<String>,
    /// Category derived from [`Self::fuel_code`].
    pub ev_category: EvCategory,
    /// Canonical county name, or `None` when the city is unmapped.
    pub county: Option<String>,
    /// VIN or generic row id used for deduplication, when the source has one.
    pub id_or_vin: Option<String>,
}

/// One public charging station after cleaning.
///
/// Build with [`StationRecord::new`] so that `total_chargers` and the
/// `has_*` flags always agree with the per-level counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct StationRecord {
    /// Station name. Empty when the source has no name column.
    pub station_name: String,
    /// City, title-cased for display.
    pub city: String,
    /// Canonical county name, or `None` when the city is unmapped.
    pub county: Option<String>,
    /// Number of Level 1 ports.
    pub level1_count: u32,
    /// Number of Level 2 ports.
    pub level2_count: u32,
    /// Number of DC fast ports.
    pub dc_fast_count: u32,
    /// Sum of the three port counts.
    pub total_chargers: u32,
    /// `true` iff `level1_count > 0`.
    pub has_level1: bool,
    /// `true` iff `level2_count > 0`.
    pub has_level2: bool,
    /// `true` iff `dc_fast_count > 0`.
    pub has_dc_fast: bool,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
}

/// Port counts for a single station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChargerCounts {
    /// Level 1 ports.
    pub level1: u32,
    /// Level 2 ports.
    pub level2: u32,
    /// DC fast ports.
    pub dc_fast: u32,
}

impl ChargerCounts {
    /// Total ports across all levels.
    #[must_use]
    pub const fn total(self) -> u32 {
        self.level1
            .saturating_add(self.level2)
            .saturating_add(self.dc_fast)
    }
}

impl StationRecord {
    /// Creates a station, deriving the total and the `has_*` flags from
    /// `counts`.
    #[must_use]
    pub fn new(
        station_name: String,
        city: String,
        county: Option<String>,
        counts: ChargerCounts,
        location: Option<(f64, f64)>,
    ) -> Self {
        let (latitude, longitude) =
            location.map_or((None, None), |(lat, lon)| (Some(lat), Some(lon)));

        Self {
            station_name,
            city,
            county,
            level1_count: counts.level1,
            level2_count: counts.level2,
            dc_fast_count: counts.dc_fast,
            total_chargers: counts.total(),
            has_level1: counts.level1 > 0,
            has_level2: counts.level2 > 0,
            has_dc_fast: counts.dc_fast > 0,
            latitude,
            longitude,
        }
    }

    /// Returns `(latitude, longitude)` when both coordinates are known.
    ///
    /// Stations without a location stay in every table but must be skipped
    /// by spatial consumers.
    #[must_use]
    pub fn location(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// One county's household income statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    /// Canonical county name.
    pub county: String,
    /// Median household income in dollars.
    pub median_income: Option<f64>,
    /// Rank among all US counties.
    pub national_rank: Option<i64>,
}

/// One county's 2016 population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    /// Canonical county name.
    pub county: String,
    /// Resident population.
    pub population: Option<f64>,
}
