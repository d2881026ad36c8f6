//! Settings fixtures
#![allow(dead_code)]

use std::collections::BTreeMap;

use shipx::config::{AccountConfig, ConfigurableValue, DispatchSettings, RetrySettings};
use shipx::{Environment, Settings};

pub struct ConfigFixtures;

impl ConfigFixtures {
	/// Short deadlines and no retries, so failing cases finish quickly
	pub fn fast_settings() -> Settings {
		Settings {
			dispatch: DispatchSettings {
				batch_deadline_ms: 1_500,
				per_carrier_timeout_ms: 800,
				request_timeout_ms: 500,
				retry: RetrySettings {
					max_retries: 0,
					initial_delay_ms: 10,
					max_delay_ms: 10,
				},
			},
			..Settings::default()
		}
	}

	pub fn with_accounts(accounts: Vec<(&str, AccountConfig)>) -> Settings {
		let mut settings = Self::fast_settings();
		settings.carriers = accounts
			.into_iter()
			.map(|(name, account)| (name.to_string(), account))
			.collect();
		settings
	}

	pub fn account(carrier_id: &str, options: &[(&str, &str)]) -> AccountConfig {
		AccountConfig {
			carrier_id: carrier_id.to_string(),
			account_id: None,
			environment: Environment::Sandbox,
			endpoint: None,
			timeout_ms: None,
			enabled: true,
			options: options
				.iter()
				.map(|(name, value)| (name.to_string(), ConfigurableValue::from(*value)))
				.collect::<BTreeMap<_, _>>(),
		}
	}

	pub fn dicom_account() -> AccountConfig {
		Self::account("dicom", &[("username", "ops"), ("password", "s3cret")])
	}

	pub fn fedex_account() -> AccountConfig {
		Self::account(
			"fedex",
			&[
				("key", "k3y"),
				("password", "pa55"),
				("account_number", "510087020"),
				("meter_number", "118785166"),
			],
		)
	}
}
