//! Settings error types.

use thiserror::Error;

/// Errors that can occur while loading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file exists but could not be read.
    #[error("Could not read settings file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or has mistyped values.
    #[error("Failed to parse settings in '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A setting has an invalid value.
    #[error("Invalid settings in '{path}': {message}")]
    ValidationError { path: String, message: String },

    /// No settings file at the given path.
    #[error("Settings file '{path}' not found")]
    MissingFile { path: String },
}
