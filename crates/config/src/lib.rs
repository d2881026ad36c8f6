//! shipx configuration
//!
//! Settings loading (file plus `SHIPX__` environment overrides), credential
//! resolution and startup logging.

pub mod configurable_value;
pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use configurable_value::{ConfigurableValue, ConfigurableValueError, ValueType};
pub use loader::{load_config, load_config_from, parse_config, ConfigLoadError, ENV_PREFIX};
pub use settings::{
	AccountConfig, ConfigValidationError, DispatchSettings, LogFormat, LoggingSettings,
	RetrySettings, Settings,
};
pub use startup_logger::{log_configuration, log_service_info, log_startup_complete};
