//! Adapter registry discovery and lookup

use shipx::adapters::{dicom, fedex, AdapterOptions, BUILTIN_ADAPTERS};
use shipx::mocks::MockCarrier;
use shipx::models::ConfigurationError;
use shipx::{AdapterRegistry, Capability, CapabilitySet};

#[test]
fn test_builtin_carriers_are_discovered() {
	let registry = AdapterRegistry::discover(BUILTIN_ADAPTERS, &AdapterOptions::default());

	let ids: Vec<String> = registry.list_all().iter().map(|m| m.id.to_string()).collect();
	assert_eq!(ids, vec!["dicom".to_string(), "fedex".to_string()]);

	let fedex = registry.lookup("fedex").unwrap();
	assert!(fedex.capabilities.supports(Capability::Rating));
	assert!(fedex.capabilities.supports(Capability::Tracking));
	assert!(!fedex.capabilities.supports(Capability::Shipping));
	assert!(fedex.spec("meter_number").is_some());
}

#[test]
fn test_register_then_lookup_returns_same_descriptor() {
	let mut registry = AdapterRegistry::new();
	let carrier = MockCarrier::fast("acme").with_capabilities(
		CapabilitySet::none()
			.with(Capability::Rating)
			.with(Capability::Shipping),
	);
	registry.register(carrier.metadata()).unwrap();

	let found = registry.lookup("acme").unwrap();
	assert_eq!(found.label, "Mock acme");
	assert_eq!(found.version, "1.0.0");
	assert_eq!(
		found.capabilities,
		CapabilitySet::none()
			.with(Capability::Rating)
			.with(Capability::Shipping)
	);
}

#[test]
fn test_duplicate_registration_fails_and_keeps_prior_entry() {
	let mut registry = AdapterRegistry::new();
	registry.register(dicom::metadata(&AdapterOptions::default())).unwrap();

	let impostor = MockCarrier::fast("dicom").with_capabilities(CapabilitySet::none().with(Capability::Rating));
	let error = registry.register(impostor.metadata()).unwrap_err();
	assert!(matches!(error, ConfigurationError::DuplicateCarrier { .. }));
	assert_eq!(registry.lookup("dicom").unwrap().label, "Dicom");
	assert_eq!(registry.lookup("dicom").unwrap().capabilities, CapabilitySet::all());
}

#[test]
fn test_list_by_capability_and_aggregators() {
	let mut registry = AdapterRegistry::discover(&[dicom::metadata, fedex::metadata], &AdapterOptions::default());
	registry.admit(MockCarrier::fast("easyship").as_aggregator().metadata());

	let cancel: Vec<String> = registry
		.list_by_capability(Capability::Cancel)
		.iter()
		.map(|m| m.id.to_string())
		.collect();
	assert_eq!(cancel, vec!["dicom".to_string(), "easyship".to_string()]);

	let aggregators = registry.list_aggregators();
	assert_eq!(aggregators.len(), 1);
	assert_eq!(aggregators[0].id, "easyship");
	assert_eq!(registry.len(), 3);
}

#[test]
fn test_malformed_descriptors_are_excluded() {
	let mut registry = AdapterRegistry::new();
	assert!(!registry.admit(MockCarrier::fast("Bad Id").metadata()));
	assert!(!registry.admit(MockCarrier::fast("empty").with_capabilities(CapabilitySet::none()).metadata()));
	assert!(registry.admit(MockCarrier::fast("good").metadata()));
	assert_eq!(registry.len(), 1);
	assert!(matches!(
		registry.lookup("empty"),
		Err(ConfigurationError::UnknownCarrier { .. })
	));
}
