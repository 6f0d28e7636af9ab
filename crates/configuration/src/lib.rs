use crate::error::ConfigError;
use crate::settings::Config;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    LoggingSettings, MarketSettings, PortfolioSettings, ScoringSettings, ServerSettings,
    TypeTable, ValuationSettings,
};

/// Prefix of the environment variables that override file settings,
/// e.g. `PROPLENS__SERVER__ADDR=127.0.0.1:8080`.
pub const ENV_PREFIX: &str = "PROPLENS";

/// Loads the application configuration.
///
/// Layers, lowest precedence first: built-in defaults, the TOML file at `path`
/// (optional, a missing file is not an error), then `PROPLENS__*` environment
/// variables. The result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Command-line flag pointing at the configuration file.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    pub config: std::path::PathBuf,
}

#[cfg(feature = "clap")]
impl ConfigArgs {
    pub fn load(&self) -> Result<Config, ConfigError> {
        load_config(&self.config)
    }
}
