//! CSV export of the finished tables.
//!
//! Every file starts with a header row of the record's field names. Missing
//! values are written as empty fields and floats use the shortest
//! representation that parses back to the same value.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use ev_map_analytics_models::CountySummary;
use serde::Serialize;

use crate::PipelineOutput;

/// File name of the exported vehicle table.
pub const VEHICLES_FILE: &str = "vehicles.csv";
/// File name of the exported station table.
pub const STATIONS_FILE: &str = "stations.csv";
/// File name of the exported county table.
pub const COUNTY_SUMMARY_FILE: &str = "county_summary.csv";

/// Column order of the county table.
pub const COUNTY_SUMMARY_COLUMNS: &[&str] = &[
    "county",
    "ev_registrations",
    "total_stations",
    "total_chargers",
    "fast_chargers",
    "level2_chargers",
    "level1_chargers",
    "median_income",
    "population",
    "evs_per_charger",
    "evs_per_1k_people",
    "chargers_per_1k_people",
];

/// Column order of the vehicle table.
pub const VEHICLE_COLUMNS: &[&str] = &[
    "city",
    "make",
    "model",
    "model_year",
    "fuel_code",
    "ev_category",
    "county",
    "id_or_vin",
];

/// Column order of the station table.
pub const STATION_COLUMNS: &[&str] = &[
    "station_name",
    "city",
    "county",
    "level1_count",
    "level2_count",
    "dc_fast_count",
    "total_chargers",
    "has_level1",
    "has_level2",
    "has_dc_fast",
    "latitude",
    "longitude",
];

/// Errors writing or reading an exported table.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The output directory could not be created.
    #[error("output directory {} could not be created: {source}", path.display())]
    CreateDir {
        /// Directory that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A table could not be serialized or parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes `records` as CSV with `columns` as the header row, even when there
/// are no records.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if writing fails.
pub fn write_table<W: Write, T: Serialize>(
    writer: W,
    columns: &[&str],
    records: &[T],
) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(columns)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(csv::Error::from)?;

    Ok(())
}

/// Writes the county table as CSV.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if writing fails.
pub fn write_county_summaries<W: Write>(
    writer: W,
    summaries: &[CountySummary],
) -> Result<(), ExportError> {
    write_table(writer, COUNTY_SUMMARY_COLUMNS, summaries)
}

/// Parses a county table previously written by [`write_county_summaries`].
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if the data is not a valid county table.
pub fn read_county_summaries<R: Read>(reader: R) -> Result<Vec<CountySummary>, ExportError> {
    let mut reader = csv::Reader::from_reader(reader);
    let summaries = reader.deserialize().collect::<Result<Vec<CountySummary>, _>>()?;
    Ok(summaries)
}

/// Renders the county table as a CSV string, for download.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if serialization fails.
pub fn county_summaries_to_string(summaries: &[CountySummary]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_county_summaries(&mut buffer, summaries)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes the vehicle, station, and county tables into `dir`, creating it
/// if needed. Returns the written paths.
///
/// # Errors
///
/// Returns [`ExportError`] if the directory cannot be created or any file
/// cannot be written.
pub fn write_outputs(dir: &Path, output: &PipelineOutput) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let vehicles = dir.join(VEHICLES_FILE);
    write_table(create(&vehicles)?, VEHICLE_COLUMNS, &output.vehicles)?;

    let stations = dir.join(STATIONS_FILE);
    write_table(create(&stations)?, STATION_COLUMNS, &output.stations)?;

    let summaries = dir.join(COUNTY_SUMMARY_FILE);
    write_county_summaries(create(&summaries)?, &output.summaries)?;

    log::info!(
        "Wrote {} vehicles, {} stations, and {} counties to {}",
        output.vehicles.len(),
        output.stations.len(),
        output.summaries.len(),
        dir.display()
    );

    Ok(vec![vehicles, stations, summaries])
}

fn create(path: &Path) -> Result<std::io::BufWriter<std::fs::File>, ExportError> {
    let file = std::fs::File::create(path).map_err(csv::Error::from)?;
    Ok(std::io::BufWriter::new(file))
}
