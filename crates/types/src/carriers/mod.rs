//! Carrier adapter contracts: identity, capabilities, descriptors and errors

pub mod capabilities;
pub mod errors;
pub mod metadata;
pub mod traits;

pub use capabilities::{Capability, CapabilitySet};
pub use errors::{
	AdapterError, AdapterResult, ConfigurationError, FieldIssue, FieldProblem,
	InvalidSettingsError, MetadataValidationError, TransportError,
};
pub use metadata::{CarrierId, Metadata, SettingKind, SettingSpec};
pub use traits::{AdapterFactory, Gateway, Mapper, Proxy};
