//! FedEx: XML over SOAP, credentials carried in the request body

mod mapper;
mod proxy;
pub mod wire;

use std::sync::Arc;

use shipx_types::{
	AdapterFactory, AdapterResult, Capability, CapabilitySet, CarrierAccount, CarrierRef,
	CarrierSettings, Gateway, Metadata, SecretString, SettingKind, SettingSpec,
};

use crate::client_cache::ClientCache;
use crate::proxy::{AdapterOptions, HttpProxy};

pub use mapper::FedexMapper;
pub use proxy::FedexProxy;

pub const CARRIER_ID: &str = "fedex";
pub const SANDBOX_URL: &str = "https://wsbeta.fedex.com:443/web-services";
pub const PRODUCTION_URL: &str = "https://ws.fedex.com:443/web-services";

/// SOAP faults come back as HTTP 500 with an envelope body
const BUSINESS_ERROR_STATUSES: &[u16] = &[500];

#[derive(Debug, Clone)]
pub struct FedexSettings {
	pub target: CarrierRef,
	pub key: SecretString,
	pub password: SecretString,
	pub account_number: String,
	pub meter_number: String,
	pub language_code: Option<String>,
}

impl FedexSettings {
	pub fn from_settings(settings: &CarrierSettings) -> AdapterResult<Self> {
		Ok(Self {
			target: CarrierRef::new(settings.carrier_id().clone(), settings.account_id()),
			key: settings.require_secret("key")?.clone(),
			password: settings.require_secret("password")?.clone(),
			account_number: settings.require_value("account_number")?.to_string(),
			meter_number: settings.require_value("meter_number")?.to_string(),
			language_code: settings.value("language_code").map(str::to_string),
		})
	}
}

pub fn schema() -> Vec<SettingSpec> {
	vec![
		SettingSpec::required("key", SettingKind::Text).secret(),
		SettingSpec::required("password", SettingKind::Text).secret(),
		SettingSpec::required("account_number", SettingKind::Digits),
		SettingSpec::required("meter_number", SettingKind::Digits),
		SettingSpec::optional("language_code", SettingKind::Text),
	]
}

/// Registration entrypoint
pub fn metadata(options: &AdapterOptions) -> Metadata {
	Metadata::new(
		CARRIER_ID,
		"FedEx",
		"1.0.0",
		Arc::new(FedexFactory::new(options.clone())),
	)
	.with_capabilities(
		CapabilitySet::none()
			.with(Capability::Rating)
			.with(Capability::Tracking),
	)
	.with_schema(schema())
	.with_sandbox_account(
		CarrierAccount::new(CARRIER_ID, "sandbox")
			.with_option("key", "sandbox")
			.with_option("password", "sandbox")
			.with_option("account_number", "510087020")
			.with_option("meter_number", "100000000"),
	)
}

#[derive(Debug)]
pub struct FedexFactory {
	options: AdapterOptions,
	clients: ClientCache,
}

impl FedexFactory {
	pub fn new(options: AdapterOptions) -> Self {
		let clients = ClientCache::new(options.pool.clone());
		Self { options, clients }
	}
}

impl AdapterFactory for FedexFactory {
	fn create_gateway(&self, settings: Arc<CarrierSettings>) -> AdapterResult<Gateway> {
		let fedex = FedexSettings::from_settings(&settings)?;
		let base_url = settings.server_url(SANDBOX_URL, PRODUCTION_URL);
		let transport = self
			.options
			.transport_for(&self.clients, &settings, &base_url)?;

		let http = HttpProxy::new(settings.carrier_id().clone(), &base_url, transport)?
			.with_retry(self.options.retry.clone())
			.with_timeout_ms(self.options.timeout_ms_for(&settings))
			.with_business_statuses(BUSINESS_ERROR_STATUSES);

		Ok(Gateway::new(
			Arc::new(FedexMapper::new(fedex)),
			Arc::new(FedexProxy::new(http)),
		))
	}
}
