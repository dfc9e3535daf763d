//! Loading [`SourceConfig`] from TOML.

use std::path::{Path, PathBuf};

use ev_map_source_models::{SourceConfig, SourceKind};

/// The configuration file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("config file {} could not be read: {source}", path.display())]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid source configuration.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Parses a source configuration from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Toml`] if the text is not valid TOML or is missing
/// required fields.
pub fn parse_config(toml_str: &str) -> Result<SourceConfig, ConfigError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Loads a source configuration from a file. Relative source paths are
/// resolved against the directory containing the config file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<SourceConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut config = parse_config(&text)?;

    if let Some(base) = path.parent() {
        for kind in SourceKind::all() {
            let source_path = config.paths.get(*kind);
            if source_path.is_relative() {
                let resolved = base.join(source_path);
                *paths_mut(&mut config, *kind) = resolved;
            }
        }
    }

    log::info!("Loaded source config from {}", path.display());

    Ok(config)
}

const fn paths_mut(config: &mut SourceConfig, kind: SourceKind) -> &mut PathBuf {
    match kind {
        SourceKind::Income => &mut config.paths.income,
        SourceKind::Vehicles => &mut config.paths.vehicles,
        SourceKind::Stations => &mut config.paths.stations,
        SourceKind::Population => &mut config.paths.population,
    }
}
