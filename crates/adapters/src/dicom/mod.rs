//! Dicom: JSON REST carrier with HTTP basic auth

mod mapper;
mod proxy;
pub mod wire;

use std::sync::Arc;

use shipx_types::{
	AdapterFactory, AdapterResult, CapabilitySet, CarrierAccount, CarrierRef, CarrierSettings,
	Gateway, Metadata, SecretString, SettingKind, SettingSpec,
};

use crate::client_cache::ClientCache;
use crate::http::HttpAuth;
use crate::proxy::{AdapterOptions, HttpProxy};

pub use mapper::DicomMapper;
pub use proxy::DicomProxy;

pub const CARRIER_ID: &str = "dicom";
pub const SANDBOX_URL: &str = "https://ct.soa-gw.canadapost.ca";
pub const PRODUCTION_URL: &str = "https://soa-gw.canadapost.ca";

/// Error bodies Dicom returns with these statuses are still JSON responses
const BUSINESS_ERROR_STATUSES: &[u16] = &[400, 404, 422];

/// Typed view of validated Dicom settings
#[derive(Debug, Clone)]
pub struct DicomSettings {
	pub target: CarrierRef,
	pub username: String,
	pub password: SecretString,
	pub billing_account: Option<String>,
}

impl DicomSettings {
	pub fn from_settings(settings: &CarrierSettings) -> AdapterResult<Self> {
		Ok(Self {
			target: CarrierRef::new(settings.carrier_id().clone(), settings.account_id()),
			username: settings.require_value("username")?.to_string(),
			password: settings.require_secret("password")?.clone(),
			billing_account: settings.value("billing_account").map(str::to_string),
		})
	}
}

pub fn schema() -> Vec<SettingSpec> {
	vec![
		SettingSpec::required("username", SettingKind::Text),
		SettingSpec::required("password", SettingKind::Text).secret(),
		SettingSpec::optional("billing_account", SettingKind::Digits),
	]
}

/// Registration entrypoint
pub fn metadata(options: &AdapterOptions) -> Metadata {
	Metadata::new(
		CARRIER_ID,
		"Dicom",
		"1.0.0",
		Arc::new(DicomFactory::new(options.clone())),
	)
	.with_capabilities(CapabilitySet::all())
	.with_schema(schema())
	.with_sandbox_account(
		CarrierAccount::new(CARRIER_ID, "sandbox")
			.with_option("username", "sandbox")
			.with_option("password", "sandbox"),
	)
}

#[derive(Debug)]
pub struct DicomFactory {
	options: AdapterOptions,
	clients: ClientCache,
}

impl DicomFactory {
	pub fn new(options: AdapterOptions) -> Self {
		let clients = ClientCache::new(options.pool.clone());
		Self { options, clients }
	}
}

impl AdapterFactory for DicomFactory {
	fn create_gateway(&self, settings: Arc<CarrierSettings>) -> AdapterResult<Gateway> {
		let dicom = DicomSettings::from_settings(&settings)?;
		let base_url = settings.server_url(SANDBOX_URL, PRODUCTION_URL);
		let transport = self
			.options
			.transport_for(&self.clients, &settings, &base_url)?;

		let http = HttpProxy::new(settings.carrier_id().clone(), &base_url, transport)?
			.with_auth(HttpAuth::basic(dicom.username.clone(), dicom.password.clone()))
			.with_retry(self.options.retry.clone())
			.with_timeout_ms(self.options.timeout_ms_for(&settings))
			.with_business_statuses(BUSINESS_ERROR_STATUSES);

		Ok(Gateway::new(
			Arc::new(DicomMapper::new(dicom)),
			Arc::new(DicomProxy::new(http)),
		))
	}
}

#[cfg(test)]
mod tests;
