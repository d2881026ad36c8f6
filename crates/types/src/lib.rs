//! shipx types
//!
//! The unified shipping model, the carrier adapter contracts (`Mapper`,
//! `Proxy`, `AdapterFactory`), carrier descriptors and settings, and the
//! envelopes carrier payloads travel in.

pub mod carriers;
pub mod models;
pub mod requests;
pub mod results;
pub mod settings;
pub mod wire;

// Re-export shared crates so adapters agree on versions
pub use chrono;
pub use rust_decimal;
pub use serde_json;

pub use carriers::{
	AdapterError, AdapterFactory, AdapterResult, Capability, CapabilitySet, CarrierId,
	ConfigurationError, FieldIssue, FieldProblem, Gateway, InvalidSettingsError, Mapper, Metadata,
	MetadataValidationError, Proxy, SettingKind, SettingSpec, TransportError,
};

pub use models::{
	Address, Charge, ConversionError, DimensionUnit, Dimensions, Money, Parcel, SecretString,
	Weight, WeightUnit,
};

pub use requests::{
	CancelRequest, LabelType, PickupRequest, RateRequest, RequestValidationError,
	ShipmentRequest, TrackingRequest, UnifiedRequest,
};

pub use results::{
	codes, CarrierError, CarrierRef, ConfirmationDetails, DispatchResult, ParsedResponse,
	PickupDetails, RateDetails, ResultDetails, ShipmentDetails, TrackingDetails, TrackingEvent,
	UnifiedResult,
};

pub use settings::{CarrierAccount, CarrierSettings, Environment};

pub use wire::{CarrierRequest, CarrierResponse, CodecError, WireFormat};
