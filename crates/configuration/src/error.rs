use thiserror::Error;

/// Failures while building the application `Config`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML file or a `PROPLENS__*` variable could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    /// A valuation constant is non-finite or out of range, e.g. `market_condition = nan`.
    #[error("Settings validation failed: {0}")]
    ValidationError(String),
}
