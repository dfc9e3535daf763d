//! Population adapter for the header-less city/county energy profile file.
//!
//! The file mixes rows from every state and several record shapes, so it is
//! read positionally. All knowledge of its layout is confined to this
//! module and [`PopulationColumns`].

use std::collections::BTreeMap;

use ev_map_entity_models::PopulationRecord;
use ev_map_geography::canonical_county_name;
use ev_map_source::parsing::coerce_f64;
use ev_map_source::{RawRow, RawTable, SourceError, SourceSnapshot};
use ev_map_source_models::{PopulationColumns, SourceConfig, SourceKind};

/// Parses the population file held in `snapshot` and cleans it.
///
/// # Errors
///
/// Returns [`SourceError`] if the file is not parseable.
pub fn load_population(
    config: &SourceConfig,
    snapshot: &SourceSnapshot,
) -> Result<Vec<PopulationRecord>, SourceError> {
    let raw = snapshot.get(SourceKind::Population).positional()?;
    Ok(clean_population(&raw, &config.target_state, config.population_columns))
}

/// Returns `true` if `row` belongs to `target_state`, either through its
/// state column or through a `"<place>, <STATE>"` label.
#[must_use]
pub fn is_state_row(row: &RawRow<'_>, target_state: &str, columns: PopulationColumns) -> bool {
    let suffix = format!(", {}", target_state.to_uppercase());
    row.at(columns.state).eq_ignore_ascii_case(target_state)
        || row.at(columns.place).contains(&suffix)
}

/// Extracts one population record per canonical county.
///
/// The first row with a parseable, non-negative population wins for each
/// county; a county whose rows are all unparseable is kept with a missing
/// value.
/// Records are returned in first-seen order.
#[must_use]
pub fn clean_population(
    raw: &RawTable,
    target_state: &str,
    columns: PopulationColumns,
) -> Vec<PopulationRecord> {
    let mut records: Vec<PopulationRecord> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    let mut state_rows = 0_usize;

    for row in raw.rows().filter(|row| is_state_row(row, target_state, columns)) {
        state_rows += 1;

        let county = canonical_county_name(row.at(columns.county));
        if county.is_empty() {
            continue;
        }
        let population = coerce_f64(row.at(columns.population)).filter(|p| *p >= 0.0);

        if let Some(&existing) = index.get(&county) {
            let record = &mut records[existing];
            if record.population.is_none() && population.is_some() {
                record.population = population;
            }
            continue;
        }

        index.insert(county.clone(), records.len());
        records.push(PopulationRecord { county, population });
    }

    log::info!(
        "[{}] Cleaned {} counties from {state_rows} {target_state} rows",
        SourceKind::Population,
        records.len()
    );

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use ev_map_source::table::parse_positional;

    const PROFILES: &str = "\
1,CT,\"Hartford, CT\",09003,Hartford County,x,y,z,894014\n\
2,CT,\"West Hartford, CT\",09003,Hartford County,x,y,z,891000\n\
3,,\"Windham, CT\",09015,Windham County,x,y,z,100000\n\
4,MA,\"Boston, MA\",25025,Suffolk County,x,y,z,767719\n\
5,ct,\"Tolland, CT\",09013,Tolland County,x,y,z,n/a\n\
6,CT,\"Vernon, CT\",09013,Tolland County,x,y,z,\"151,269\"\n\
7,CT,\"Short row, CT\"\n";

    fn clean() -> Vec<PopulationRecord> {
        let raw = parse_positional(SourceKind::Population, PROFILES.as_bytes()).unwrap();
        clean_population(&raw, "CT", PopulationColumns::default())
    }

    #[test]
    fn keeps_target_state_rows_by_state_or_place() {
        let counties: Vec<String> = clean().into_iter().map(|r| r.county).collect();
        assert_eq!(counties, ["Hartford", "Windham", "Tolland"]);
    }

    #[test]
    fn first_parseable_population_wins() {
        let population = clean();

        assert_eq!(population[0].population, Some(894_014.0));
        assert_eq!(population[1].population, Some(100_000.0));
        assert_eq!(population[2].population, Some(151_269.0));
    }

    #[test]
    fn negative_population_is_missing() {
        let data = b"1,CT,\"Mansfield, CT\",09013,Tolland County,x,y,z,-5\n\
2,CT,\"Vernon, CT\",09013,Tolland County,x,y,z,29000\n\
3,CT,\"Putnam, CT\",09015,Windham County,x,y,z,-1\n";
        let raw = parse_positional(SourceKind::Population, data).unwrap();
        let population = clean_population(&raw, "CT", PopulationColumns::default());

        assert_eq!(population[0].county, "Tolland");
        assert_eq!(population[0].population, Some(29_000.0));
        assert_eq!(population[1].county, "Windham");
        assert_eq!(population[1].population, None);
    }

    #[test]
    fn custom_column_positions() {
        let raw = parse_positional(SourceKind::Population, b"Litchfield,CT,500\n").unwrap();
        let columns = PopulationColumns {
            state: 1,
            place: 3,
            county: 0,
            population: 2,
        };
        let population = clean_population(&raw, "CT", columns);

        assert_eq!(population[0].county, "Litchfield");
        assert_eq!(population[0].population, Some(500.0));
    }

    #[test]
    fn state_match_requires_separator_in_place() {
        let raw = parse_positional(SourceKind::Population, b"1,MA,\"Connecticut Ave\"\n").unwrap();
        let row = raw.rows().next().unwrap();
        assert!(!is_state_row(&row, "CT", PopulationColumns::default()));
    }
}
