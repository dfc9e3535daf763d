#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw source reading and schema normalization.
//!
//! Each input file is read into a [`RawTable`] of string cells. Headed
//! tables then go through [`RawTable::normalize_headers`] so every source
//! is addressed by the same `snake_case` column names regardless of how the
//! export spelled them. Cell-level coercion lives in [`parsing`] and never
//! fails: an unparseable cell becomes a missing value.
//!
//! File contents are read once into a [`SourceSnapshot`] and parsed from
//! there.

pub mod config;
pub mod parsing;
pub mod snapshot;
pub mod table;

use std::path::PathBuf;

use ev_map_source_models::SourceKind;

pub use snapshot::{SourceFile, SourceSnapshot};
pub use table::{RawRow, RawTable};

/// A source file could not be read or parsed.
///
/// Every variant identifies the offending source so the failure can be
/// reported without partial output.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file is missing or could not be opened.
    #[error("{kind} source could not be read from {}: {source}", path.display())]
    Io {
        /// Which source failed.
        kind: SourceKind,
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not parseable as delimited text.
    #[error("{kind} source at {} is not valid CSV: {source}", path.display())]
    Csv {
        /// Which source failed.
        kind: SourceKind,
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// A headed source ended before its header row.
    #[error("{kind} source at {} has no header row", path.display())]
    MissingHeader {
        /// Which source failed.
        kind: SourceKind,
        /// Path that was attempted.
        path: PathBuf,
    },
}

impl SourceError {
    /// Returns the source this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::Io { kind, .. } | Self::Csv { kind, .. } | Self::MissingHeader { kind, .. } => {
                *kind
            }
        }
    }
}
