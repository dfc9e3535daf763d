#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County aggregation and derived metrics over cleaned entity records.
//!
//! [`aggregate::build_county_summaries`] is the main entry point: it groups
//! vehicles and stations by resolved county, joins income and population,
//! and fills in the ratios from [`metrics`]. The remaining modules are read
//! only views over the same records for statewide and per-entity consumers.

pub mod aggregate;
pub mod metrics;
pub mod overview;
pub mod report;

pub use aggregate::build_county_summaries;
pub use metrics::safe_div;
