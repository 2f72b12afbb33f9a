//! Format detection, file discovery and deserialization for game configs.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tickworks_core::config::GameConfig;
use tickworks_core::error::ConfigError;

/// Base name looked up by [`load_config_dir`].
pub const CONFIG_BASE_NAME: &str = "game";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading a config.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// No config file was found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The file parsed but describes a game that cannot be built.
    #[error("invalid config: {0}")]
    Invalid(#[from] ConfigError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `{base_name}.ron`, `{base_name}.toml` and `{base_name}.json` in
/// `dir`. Returns `Ok(None)` if none exist and `ConflictingFormats` if more
/// than one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for format in Format::ALL {
        let candidate = dir.join(format!("{base_name}.{}", format.extension()));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_str<T: DeserializeOwned>(content: &str, format: Format, file: &Path) -> Result<T, DataLoadError> {
    let parsed = match format {
        Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|detail| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    })
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format, path)
}

// ===========================================================================
// Config loading
// ===========================================================================

/// Parse and validate a config held in memory.
pub fn config_from_str(content: &str, format: Format) -> Result<GameConfig, DataLoadError> {
    let config: GameConfig = parse_str(content, format, Path::new("<inline>"))?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<GameConfig, DataLoadError> {
    let config: GameConfig = deserialize_file(path)?;
    config.validate()?;
    tracing::debug!(file = %path.display(), seed = config.seed, "config loaded");
    Ok(config)
}

/// Load `game.ron`, `game.toml` or `game.json` from `dir`.
pub fn load_config_dir(dir: &Path) -> Result<GameConfig, DataLoadError> {
    let path = find_data_file(dir, CONFIG_BASE_NAME)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: CONFIG_BASE_NAME.to_string(),
        dir: dir.to_path_buf(),
    })?;
    load_config(&path)
}
