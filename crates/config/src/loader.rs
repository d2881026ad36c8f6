//! Configuration loading utilities

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use config::builder::DefaultState;
use thiserror::Error;

use crate::settings::{ConfigValidationError, Settings};

/// Prefix of environment overrides, e.g. `SHIPX__DISPATCH__BATCH_DEADLINE_MS`
pub const ENV_PREFIX: &str = "SHIPX";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
	#[error("Failed to read configuration: {0}")]
	Source(#[from] ConfigError),

	#[error("Invalid configuration: {0}")]
	Validation(#[from] ConfigValidationError),
}

/// Load `config/config.{toml,json,yaml}` if present, then environment overrides
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	finish(Config::builder().add_source(File::with_name("config/config").required(false)))
}

/// Load settings from an explicit file, then environment overrides
pub fn load_config_from(path: &str) -> Result<Settings, ConfigLoadError> {
	finish(Config::builder().add_source(File::with_name(path)))
}

/// Parse settings from in-memory text, without environment overrides
pub fn parse_config(contents: &str, format: FileFormat) -> Result<Settings, ConfigLoadError> {
	let settings: Settings = Config::builder()
		.add_source(File::from_str(contents, format))
		.build()?
		.try_deserialize()?;
	settings.validate()?;
	Ok(settings)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigLoadError> {
	let settings: Settings = builder
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__")
				.try_parsing(true),
		)
		.build()?
		.try_deserialize()?;
	settings.validate()?;
	Ok(settings)
}
