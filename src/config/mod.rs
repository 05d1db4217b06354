//! Configuration loading, validation and environment overrides.

pub mod env;
pub mod parser;
pub mod types;
pub mod validate;

use crate::common::error::ConfigResult;
use types::Config;

/// Load a config file, apply environment overrides and validate it.
pub fn load_and_validate(path: &str) -> ConfigResult<Config> {
    let config = parser::load_config(path)?;
    let config = env::apply_env_overrides(config);
    validate::validate_config(&config)?;
    Ok(config)
}
