//! Household income by county.
//!
//! The income export starts with a few lines of free-text preamble before
//! the real header, and ends with notes rows that have no numeric values.

use std::collections::BTreeSet;

use ev_map_entity_models::IncomeRecord;
use ev_map_geography::canonical_county_name;
use ev_map_source::parsing::{coerce_f64, coerce_i64};
use ev_map_source::{RawTable, SourceError, SourceSnapshot};
use ev_map_source_models::{SourceConfig, SourceKind};

const COUNTY_COLUMN: &str = "county";
const INCOME_COLUMN: &str = "value_dollars";
const STATE_COLUMN: &str = "state_abbreviation";

/// The rank header embeds the county total, e.g.
/// `Rank within US (of 3141 counties)`, so it is matched by prefix.
const RANK_COLUMN_PREFIX: &str = "rank_within_us";

/// Parses the income file held in `snapshot` and cleans it.
///
/// # Errors
///
/// Returns [`SourceError`] if the file is not parseable or has no header
/// after the preamble.
pub fn load_income(
    config: &SourceConfig,
    snapshot: &SourceSnapshot,
) -> Result<Vec<IncomeRecord>, SourceError> {
    let raw = snapshot
        .get(SourceKind::Income)
        .headed(config.income_skip_rows)?;
    Ok(clean_income(raw, &config.target_state, config.drop_unparsable_income))
}

/// Cleans a raw income table into one record per canonical county.
///
/// Rows of other states are dropped when a state column exists. When
/// `drop_unparsable` is set, rows whose income fails coercion are dropped;
/// otherwise they are kept with a missing value. The first row per county
/// wins.
#[must_use]
pub fn clean_income(raw: RawTable, target_state: &str, drop_unparsable: bool) -> Vec<IncomeRecord> {
    let table = raw.normalize_headers();

    let Some(county_col) = table.column(COUNTY_COLUMN) else {
        log::warn!("[{}] No {COUNTY_COLUMN} column; no income data", SourceKind::Income);
        return Vec::new();
    };
    let income_col = table.column(INCOME_COLUMN);
    let rank_col = table
        .headers()
        .iter()
        .position(|h| h.starts_with(RANK_COLUMN_PREFIX));
    let state_col = table.column(STATE_COLUMN);

    let mut seen = BTreeSet::new();
    let mut records = Vec::new();
    let mut unparsable = 0_usize;

    for row in table.rows() {
        if state_col.is_some_and(|i| !row.at(i).eq_ignore_ascii_case(target_state)) {
            continue;
        }

        let county = canonical_county_name(row.at(county_col));
        if county.is_empty() {
            continue;
        }

        let median_income = income_col.and_then(|i| coerce_f64(row.at(i)));
        if median_income.is_none() {
            unparsable += 1;
            if drop_unparsable {
                continue;
            }
        }

        if !seen.insert(county.clone()) {
            log::debug!("[{}] Duplicate county {county}; keeping first", SourceKind::Income);
            continue;
        }

        records.push(IncomeRecord {
            county,
            median_income,
            national_rank: rank_col.and_then(|i| coerce_i64(row.at(i))),
        });
    }

    log::info!(
        "[{}] Cleaned {} counties ({unparsable} rows without a parseable income{})",
        SourceKind::Income,
        records.len(),
        if drop_unparsable { ", dropped" } else { "" }
    );

    records
}
