//! Carrier-native payload envelopes
//!
//! A mapper wraps its typed request together with the codec that encodes it,
//! so proxies and the dispatcher move requests around without knowing the
//! format. Responses travel back as raw bytes.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::carriers::{Capability, CarrierId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
	Json,
	Xml,
}

impl WireFormat {
	pub const fn content_type(self) -> &'static str {
		match self {
			Self::Json => "application/json",
			Self::Xml => "text/xml; charset=utf-8",
		}
	}
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
	#[error("JSON error: {0}")]
	Json(String),

	#[error("XML error: {0}")]
	Xml(String),
}

impl From<serde_json::Error> for CodecError {
	fn from(error: serde_json::Error) -> Self {
		Self::Json(error.to_string())
	}
}

impl From<quick_xml::DeError> for CodecError {
	fn from(error: quick_xml::DeError) -> Self {
		Self::Xml(error.to_string())
	}
}

trait Payload: Send + Sync + fmt::Debug {
	fn encode(&self) -> Result<String, CodecError>;
}

#[derive(Debug)]
struct JsonPayload<T>(T);

impl<T> Payload for JsonPayload<T>
where
	T: Serialize + fmt::Debug + Send + Sync,
{
	fn encode(&self) -> Result<String, CodecError> {
		Ok(serde_json::to_string(&self.0)?)
	}
}

#[derive(Debug)]
struct XmlPayload<T> {
	root: &'static str,
	value: T,
}

impl<T> Payload for XmlPayload<T>
where
	T: Serialize + fmt::Debug + Send + Sync,
{
	fn encode(&self) -> Result<String, CodecError> {
		Ok(quick_xml::se::to_string_with_root(self.root, &self.value)?)
	}
}

/// A typed carrier request with its serialization strategy attached
#[derive(Debug)]
pub struct CarrierRequest {
	carrier_id: CarrierId,
	operation: Capability,
	format: WireFormat,
	payload: Box<dyn Payload>,
}

impl CarrierRequest {
	pub fn json<T>(carrier_id: CarrierId, operation: Capability, payload: T) -> Self
	where
		T: Serialize + fmt::Debug + Send + Sync + 'static,
	{
		Self {
			carrier_id,
			operation,
			format: WireFormat::Json,
			payload: Box::new(JsonPayload(payload)),
		}
	}

	/// XML payload serialized under the element `root`
	pub fn xml<T>(carrier_id: CarrierId, operation: Capability, root: &'static str, payload: T) -> Self
	where
		T: Serialize + fmt::Debug + Send + Sync + 'static,
	{
		Self {
			carrier_id,
			operation,
			format: WireFormat::Xml,
			payload: Box::new(XmlPayload {
				root,
				value: payload,
			}),
		}
	}

	pub fn carrier_id(&self) -> &CarrierId {
		&self.carrier_id
	}

	pub fn operation(&self) -> Capability {
		self.operation
	}

	pub fn format(&self) -> WireFormat {
		self.format
	}

	pub fn encode(&self) -> Result<String, CodecError> {
		self.payload.encode()
	}
}

/// Raw bytes and transport metadata returned by a proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierResponse {
	pub carrier_id: CarrierId,
	pub operation: Capability,
	pub status: u16,
	pub headers: BTreeMap<String, String>,
	pub body: Vec<u8>,
}

impl CarrierResponse {
	pub fn new(carrier_id: CarrierId, operation: Capability, status: u16, body: Vec<u8>) -> Self {
		Self {
			carrier_id,
			operation,
			status,
			headers: BTreeMap::new(),
			body,
		}
	}

	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	pub fn json<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
		Ok(serde_json::from_slice(&self.body)?)
	}

	pub fn xml<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
		let text = std::str::from_utf8(&self.body).map_err(|e| CodecError::Xml(e.to_string()))?;
		Ok(quick_xml::de::from_str(text)?)
	}
}
