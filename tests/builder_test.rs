//! Builder configuration and carrier selection

mod mocks;

use mocks::configs::ConfigFixtures;
use mocks::entities::RequestFixtures;
use shipx::config::{ConfigValidationError, ConfigurableValue};
use shipx::mocks::MockCarrier;
use shipx::{codes, ShipxBuilder, ShipxError};

#[test]
fn test_builder_registers_builtin_carriers_by_default() {
	let shipx = ShipxBuilder::new().build().unwrap();
	assert!(shipx.registry().contains("dicom"));
	assert!(shipx.registry().contains("fedex"));
	assert!(shipx.accounts().is_empty());
}

#[test]
fn test_accounts_come_from_settings() {
	let settings = ConfigFixtures::with_accounts(vec![
		("dicom_main", ConfigFixtures::dicom_account()),
		("fedex_us", ConfigFixtures::fedex_account()),
	]);
	let shipx = ShipxBuilder::new().with_settings(settings).build().unwrap();

	let accounts: Vec<(String, String)> = shipx
		.accounts()
		.iter()
		.map(|a| (a.carrier_id.to_string(), a.account_id.clone()))
		.collect();
	assert_eq!(
		accounts,
		vec![
			("dicom".to_string(), "dicom_main".to_string()),
			("fedex".to_string(), "fedex_us".to_string()),
		]
	);
}

#[test]
fn test_invalid_settings_rejected_at_build() {
	let mut settings = ConfigFixtures::fast_settings();
	settings.dispatch.per_carrier_timeout_ms = settings.dispatch.batch_deadline_ms + 1;
	let result = ShipxBuilder::new().with_settings(settings).build();
	assert!(matches!(
		result,
		Err(ShipxError::Configuration(
			ConfigValidationError::ExceedsBatchDeadline { .. }
		))
	));
}

#[test]
fn test_unresolvable_credential_rejected_at_build() {
	let mut account = ConfigFixtures::dicom_account();
	account.options.insert(
		"password".to_string(),
		ConfigurableValue::from_env("SHIPX_BUILDER_TEST_UNSET_PASSWORD"),
	);
	let settings = ConfigFixtures::with_accounts(vec![("dicom_main", account)]);
	assert!(matches!(
		ShipxBuilder::new().with_settings(settings).build(),
		Err(ShipxError::Configuration(
			ConfigValidationError::UnresolvedOption { .. }
		))
	));
}

#[tokio::test]
async fn test_dispatch_to_selects_carriers() {
	let alpha = MockCarrier::fast("alpha");
	let bravo = MockCarrier::fast("bravo");
	let shipx = ShipxBuilder::new()
		.without_builtin_adapters()
		.with_settings(ConfigFixtures::fast_settings())
		.with_metadata(alpha.metadata())
		.with_metadata(bravo.metadata())
		.with_account(alpha.account("east"))
		.with_account(alpha.account("west"))
		.with_account(bravo.account("main"))
		.build()
		.unwrap();

	let outcome = shipx
		.dispatch_to(RequestFixtures::rate_request(), &["alpha"])
		.await
		.unwrap()
		.sorted();

	assert_eq!(alpha.tracker.call_count(), 2);
	assert_eq!(bravo.tracker.call_count(), 0);
	let accounts: Vec<&str> = outcome.results.iter().map(|r| r.account_id.as_str()).collect();
	assert_eq!(accounts, vec!["east", "west"]);
}

#[tokio::test]
async fn test_dispatch_to_sends_repeated_carrier_once() {
	let alpha = MockCarrier::fast("alpha");
	let shipx = ShipxBuilder::new()
		.without_builtin_adapters()
		.with_settings(ConfigFixtures::fast_settings())
		.with_metadata(alpha.metadata())
		.with_account(alpha.account("main"))
		.build()
		.unwrap();

	let outcome = shipx
		.dispatch_to(RequestFixtures::rate_request(), &["alpha", "alpha", "ghost", "ghost"])
		.await
		.unwrap();

	assert_eq!(alpha.tracker.call_count(), 1);
	assert_eq!(outcome.results.len(), 1);
	assert_eq!(outcome.errors.len(), 1);
	assert_eq!(outcome.errors[0].code, codes::UNKNOWN_CARRIER);
}

#[tokio::test]
async fn test_dispatch_to_reports_unconfigured_carriers() {
	let alpha = MockCarrier::fast("alpha");
	let shipx = ShipxBuilder::new()
		.with_settings(ConfigFixtures::fast_settings())
		.with_metadata(alpha.metadata())
		.with_account(alpha.account("main"))
		.build()
		.unwrap();

	let outcome = shipx
		.dispatch_to(RequestFixtures::rate_request(), &["alpha", "dicom", "ups"])
		.await
		.unwrap()
		.sorted();

	assert_eq!(outcome.results.len(), 1);
	let errors: Vec<(&str, &str)> = outcome
		.errors
		.iter()
		.map(|e| (e.carrier_id.as_str(), e.code.as_str()))
		.collect();
	assert_eq!(
		errors,
		vec![
			("dicom", codes::INVALID_SETTINGS),
			("ups", codes::UNKNOWN_CARRIER)
		]
	);
}

#[test]
fn test_connect_validates_account_settings() {
	let shipx = ShipxBuilder::new().build().unwrap();
	let account = shipx::CarrierAccount::new("dicom", "main").with_option("username", "ops");

	let error = shipx.connect(&account).unwrap_err();
	assert_eq!(error.code, codes::INVALID_SETTINGS);
	assert!(error.details["fields"].contains("password"));
}

#[test]
fn test_connect_rejects_malformed_endpoint() {
	let shipx = ShipxBuilder::new().build().unwrap();
	let account = shipx::CarrierAccount::new("dicom", "main")
		.with_option("username", "ops")
		.with_option("password", "s3cret")
		.with_endpoint("https://bad host.example");

	let error = shipx.connect(&account).unwrap_err();
	assert_eq!(error.code, codes::INVALID_SETTINGS);
	assert!(error.details["fields"].contains("endpoint"));
}
