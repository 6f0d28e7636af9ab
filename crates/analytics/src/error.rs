use configuration::error::ConfigError;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    #[error("Invalid valuation settings: {0}")]
    InvalidSettings(#[from] ConfigError),
}
