//! Source file contents read once per pipeline run.
//!
//! A [`SourceSnapshot`] holds the bytes of all four sources. Everything
//! downstream of the read, including the cache fingerprint and the table
//! parsers, works on those bytes, so a file rewritten mid-run cannot mix
//! two versions of its contents into one result.

use std::path::{Path, PathBuf};

use ev_map_source_models::{SourceKind, SourcePaths};

use crate::SourceError;
use crate::table::{RawTable, parse_headed, parse_positional};

/// The contents of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    kind: SourceKind,
    path: PathBuf,
    data: Vec<u8>,
}

impl SourceFile {
    /// Reads the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the file cannot be read.
    pub fn read(kind: SourceKind, path: &Path) -> Result<Self, SourceError> {
        let data = std::fs::read(path).map_err(|source| SourceError::Io {
            kind,
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_bytes(kind, path.to_path_buf(), data))
    }

    /// Wraps bytes that were already read from `path`.
    #[must_use]
    pub const fn from_bytes(kind: SourceKind, path: PathBuf, data: Vec<u8>) -> Self {
        Self { kind, path, data }
    }

    /// The source these bytes belong to.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Where the bytes were read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw file contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Parses the contents as a headed table, skipping `skip_lines`
    /// preamble lines before the header row.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the contents are not parseable or have no
    /// header row.
    pub fn headed(&self, skip_lines: usize) -> Result<RawTable, SourceError> {
        let kind = self.kind;
        let table = parse_headed(kind, &self.data, skip_lines)
            .map_err(|source| self.csv_error(source))?
            .ok_or_else(|| SourceError::MissingHeader {
                kind,
                path: self.path.clone(),
            })?;

        log::info!(
            "[{kind}] Read {} rows x {} columns from {}",
            table.len(),
            table.headers().len(),
            self.path.display()
        );

        Ok(table)
    }

    /// Parses the contents as a header-less table addressed by position.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Csv`] if the contents are not parseable.
    pub fn positional(&self) -> Result<RawTable, SourceError> {
        let kind = self.kind;
        let table = parse_positional(kind, &self.data).map_err(|source| self.csv_error(source))?;

        log::info!(
            "[{kind}] Read {} positional rows from {}",
            table.len(),
            self.path.display()
        );

        Ok(table)
    }

    fn csv_error(&self, source: csv::Error) -> SourceError {
        SourceError::Csv {
            kind: self.kind,
            path: self.path.clone(),
            source,
        }
    }
}

/// The contents of all four sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSnapshot {
    income: SourceFile,
    vehicles: SourceFile,
    stations: SourceFile,
    population: SourceFile,
}

impl SourceSnapshot {
    /// Reads every source in [`SourceKind::all`] order. The first
    /// unreadable file aborts the read.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] identifying the first unreadable source.
    pub fn read(paths: &SourcePaths) -> Result<Self, SourceError> {
        let read = |kind| SourceFile::read(kind, paths.get(kind));

        Ok(Self {
            income: read(SourceKind::Income)?,
            vehicles: read(SourceKind::Vehicles)?,
            stations: read(SourceKind::Stations)?,
            population: read(SourceKind::Population)?,
        })
    }

    /// Returns the file read for `kind`.
    #[must_use]
    pub const fn get(&self, kind: SourceKind) -> &SourceFile {
        match kind {
            SourceKind::Income => &self.income,
            SourceKind::Vehicles => &self.vehicles,
            SourceKind::Stations => &self.stations,
            SourceKind::Population => &self.population,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_file_names_the_source() {
        let path = std::env::temp_dir().join("ev_map_source_does_not_exist.csv");
        let err = SourceFile::read(SourceKind::Vehicles, &path).unwrap_err();

        assert_eq!(err.kind(), SourceKind::Vehicles);
        assert!(err.to_string().starts_with("vehicles source could not be read"));
    }

    #[test]
    fn parses_the_bytes_it_was_given() {
        let path = std::env::temp_dir().join("ev_map_snapshot_held_bytes.csv");
        std::fs::write(&path, "City,State\nHartford,CT\n").unwrap();
        let file = SourceFile::read(SourceKind::Vehicles, &path).unwrap();

        std::fs::write(&path, "City,State\nStorrs,CT\nMansfield,CT\n").unwrap();
        let table = file.headed(0).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows().next().unwrap().get("City"), Some("Hartford"));
    }

    #[test]
    fn empty_headed_file_has_no_header() {
        let file =
            SourceFile::from_bytes(SourceKind::Income, PathBuf::from("income.csv"), Vec::new());
        let err = file.headed(0).unwrap_err();

        assert!(matches!(err, SourceError::MissingHeader { kind: SourceKind::Income, .. }));
    }

    #[test]
    fn snapshot_reads_in_source_order() {
        let dir = std::env::temp_dir().join("ev_map_snapshot_order");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("income.csv"), "County\n").unwrap();

        let paths = SourcePaths {
            income: dir.join("income.csv"),
            vehicles: dir.join("missing_vehicles.csv"),
            stations: dir.join("missing_stations.csv"),
            population: dir.join("missing_population.csv"),
        };
        let err = SourceSnapshot::read(&paths).unwrap_err();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(err.kind(), SourceKind::Vehicles);
    }
}
