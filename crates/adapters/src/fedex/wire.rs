//! FedEx Web Services payloads (rate v28, track v19) and the SOAP envelope

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use shipx_types::SecretString;

pub const RATE_NAMESPACE: &str = "http://fedex.com/ws/rate/v28";
pub const TRACK_NAMESPACE: &str = "http://fedex.com/ws/track/v19";
const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Wrap an encoded body element in a SOAP 1.1 envelope
pub fn soap_envelope(body: &str) -> String {
	format!(
		r#"<soapenv:Envelope xmlns:soapenv="{}"><soapenv:Header/><soapenv:Body>{}</soapenv:Body></soapenv:Envelope>"#,
		SOAP_ENVELOPE_NAMESPACE, body
	)
}

/// A credential written into the request body in the clear
///
/// Serializes the real value, unlike `SecretString`, but stays redacted in
/// debug output.
#[derive(Clone, PartialEq)]
pub struct Credential(pub SecretString);

impl Serialize for Credential {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.0.expose_secret())
	}
}

impl fmt::Debug for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebAuthenticationDetail {
	#[serde(rename = "UserCredential")]
	pub user_credential: UserCredential,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCredential {
	#[serde(rename = "Key")]
	pub key: Credential,
	#[serde(rename = "Password")]
	pub password: Credential,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientDetail {
	#[serde(rename = "AccountNumber")]
	pub account_number: String,
	#[serde(rename = "MeterNumber")]
	pub meter_number: String,
	#[serde(rename = "Localization", skip_serializing_if = "Option::is_none")]
	pub localization: Option<Localization>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Localization {
	#[serde(rename = "LanguageCode")]
	pub language_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDetail {
	#[serde(rename = "CustomerTransactionId")]
	pub customer_transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionId {
	#[serde(rename = "ServiceId")]
	pub service_id: &'static str,
	#[serde(rename = "Major")]
	pub major: u32,
	#[serde(rename = "Intermediate")]
	pub intermediate: u32,
	#[serde(rename = "Minor")]
	pub minor: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FedexAddress {
	#[serde(rename = "StreetLines")]
	pub street_lines: Vec<String>,
	#[serde(rename = "City", skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	#[serde(rename = "StateOrProvinceCode", skip_serializing_if = "Option::is_none")]
	pub state_or_province_code: Option<String>,
	#[serde(rename = "PostalCode", skip_serializing_if = "Option::is_none")]
	pub postal_code: Option<String>,
	#[serde(rename = "CountryCode")]
	pub country_code: String,
	#[serde(rename = "Residential")]
	pub residential: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
	#[serde(rename = "PersonName", skip_serializing_if = "Option::is_none")]
	pub person_name: Option<String>,
	#[serde(rename = "CompanyName", skip_serializing_if = "Option::is_none")]
	pub company_name: Option<String>,
	#[serde(rename = "PhoneNumber", skip_serializing_if = "Option::is_none")]
	pub phone_number: Option<String>,
	#[serde(rename = "EMailAddress", skip_serializing_if = "Option::is_none")]
	pub email_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Party {
	#[serde(rename = "Contact", skip_serializing_if = "Option::is_none")]
	pub contact: Option<Contact>,
	#[serde(rename = "Address")]
	pub address: FedexAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FedexWeight {
	#[serde(rename = "Units")]
	pub units: &'static str,
	#[serde(rename = "Value")]
	pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FedexDimensions {
	#[serde(rename = "Length")]
	pub length: String,
	#[serde(rename = "Width")]
	pub width: String,
	#[serde(rename = "Height")]
	pub height: String,
	#[serde(rename = "Units")]
	pub units: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestedPackageLineItem {
	#[serde(rename = "SequenceNumber")]
	pub sequence_number: usize,
	#[serde(rename = "GroupPackageCount")]
	pub group_package_count: u32,
	#[serde(rename = "Weight")]
	pub weight: FedexWeight,
	#[serde(rename = "Dimensions", skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<FedexDimensions>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestedShipment {
	#[serde(rename = "DropoffType")]
	pub dropoff_type: &'static str,
	#[serde(rename = "ServiceType", skip_serializing_if = "Option::is_none")]
	pub service_type: Option<String>,
	#[serde(rename = "PackagingType")]
	pub packaging_type: String,
	#[serde(rename = "Shipper")]
	pub shipper: Party,
	#[serde(rename = "Recipient")]
	pub recipient: Party,
	#[serde(rename = "RateRequestTypes")]
	pub rate_request_types: &'static str,
	#[serde(rename = "PackageCount")]
	pub package_count: usize,
	#[serde(rename = "RequestedPackageLineItems")]
	pub requested_package_line_items: Vec<RequestedPackageLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRequest {
	#[serde(rename = "@xmlns")]
	pub xmlns: &'static str,
	#[serde(rename = "WebAuthenticationDetail")]
	pub web_authentication_detail: WebAuthenticationDetail,
	#[serde(rename = "ClientDetail")]
	pub client_detail: ClientDetail,
	#[serde(rename = "TransactionDetail", skip_serializing_if = "Option::is_none")]
	pub transaction_detail: Option<TransactionDetail>,
	#[serde(rename = "Version")]
	pub version: VersionId,
	#[serde(rename = "ReturnTransitAndCommit")]
	pub return_transit_and_commit: bool,
	#[serde(rename = "RequestedShipment")]
	pub requested_shipment: RequestedShipment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageIdentifier {
	#[serde(rename = "Type")]
	pub kind: &'static str,
	#[serde(rename = "Value")]
	pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSelectionDetail {
	#[serde(rename = "PackageIdentifier")]
	pub package_identifier: PackageIdentifier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRequest {
	#[serde(rename = "@xmlns")]
	pub xmlns: &'static str,
	#[serde(rename = "WebAuthenticationDetail")]
	pub web_authentication_detail: WebAuthenticationDetail,
	#[serde(rename = "ClientDetail")]
	pub client_detail: ClientDetail,
	#[serde(rename = "Version")]
	pub version: VersionId,
	#[serde(rename = "SelectionDetails")]
	pub selection_details: Vec<TrackSelectionDetail>,
	#[serde(rename = "ProcessingOptions")]
	pub processing_options: &'static str,
}

// Replies. Element names are matched without their namespace prefix.

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SoapEnvelope {
	#[serde(rename = "Body", default)]
	pub body: SoapBody,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SoapBody {
	#[serde(rename = "Fault")]
	pub fault: Option<SoapFault>,
	#[serde(rename = "RateReply")]
	pub rate_reply: Option<RateReply>,
	#[serde(rename = "TrackReply")]
	pub track_reply: Option<TrackReply>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SoapFault {
	#[serde(rename = "faultcode")]
	pub fault_code: String,
	#[serde(rename = "faultstring")]
	pub fault_string: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notification {
	#[serde(rename = "Severity")]
	pub severity: String,
	#[serde(rename = "Source", default)]
	pub source: Option<String>,
	#[serde(rename = "Code")]
	pub code: String,
	#[serde(rename = "Message")]
	pub message: String,
}

impl Notification {
	pub fn is_error(&self) -> bool {
		matches!(self.severity.as_str(), "ERROR" | "FAILURE")
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FedexMoney {
	#[serde(rename = "Currency")]
	pub currency: String,
	#[serde(rename = "Amount")]
	pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Surcharge {
	#[serde(rename = "SurchargeType")]
	pub surcharge_type: String,
	#[serde(rename = "Amount")]
	pub amount: FedexMoney,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tax {
	#[serde(rename = "TaxType")]
	pub tax_type: String,
	#[serde(rename = "Amount")]
	pub amount: FedexMoney,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShipmentRateDetail {
	#[serde(rename = "RateType", default)]
	pub rate_type: Option<String>,
	#[serde(rename = "TotalBaseCharge", default)]
	pub total_base_charge: Option<FedexMoney>,
	#[serde(rename = "TotalNetCharge")]
	pub total_net_charge: FedexMoney,
	#[serde(rename = "Surcharges", default)]
	pub surcharges: Vec<Surcharge>,
	#[serde(rename = "Taxes", default)]
	pub taxes: Vec<Tax>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatedShipmentDetail {
	#[serde(rename = "ShipmentRateDetail")]
	pub shipment_rate_detail: ShipmentRateDetail,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateReplyDetail {
	#[serde(rename = "ServiceType")]
	pub service_type: String,
	#[serde(rename = "TransitTime", default)]
	pub transit_time: Option<String>,
	#[serde(rename = "RatedShipmentDetails", default)]
	pub rated_shipment_details: Vec<RatedShipmentDetail>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateReply {
	#[serde(rename = "HighestSeverity")]
	pub highest_severity: String,
	#[serde(rename = "Notifications", default)]
	pub notifications: Vec<Notification>,
	#[serde(rename = "RateReplyDetails", default)]
	pub rate_reply_details: Vec<RateReplyDetail>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusDetail {
	#[serde(rename = "Code", default)]
	pub code: Option<String>,
	#[serde(rename = "Description", default)]
	pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventAddress {
	#[serde(rename = "City", default)]
	pub city: Option<String>,
	#[serde(rename = "StateOrProvinceCode", default)]
	pub state_or_province_code: Option<String>,
	#[serde(rename = "CountryCode", default)]
	pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackEvent {
	#[serde(rename = "Timestamp")]
	pub timestamp: String,
	#[serde(rename = "EventType")]
	pub event_type: String,
	#[serde(rename = "EventDescription")]
	pub event_description: String,
	#[serde(rename = "Address", default)]
	pub address: Option<EventAddress>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackDetail {
	#[serde(rename = "Notification", default)]
	pub notification: Option<Notification>,
	#[serde(rename = "TrackingNumber", default)]
	pub tracking_number: Option<String>,
	#[serde(rename = "StatusDetail", default)]
	pub status_detail: Option<StatusDetail>,
	#[serde(rename = "Events", default)]
	pub events: Vec<TrackEvent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletedTrackDetail {
	#[serde(rename = "TrackDetails", default)]
	pub track_details: Vec<TrackDetail>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackReply {
	#[serde(rename = "HighestSeverity")]
	pub highest_severity: String,
	#[serde(rename = "Notifications", default)]
	pub notifications: Vec<Notification>,
	#[serde(rename = "CompletedTrackDetails", default)]
	pub completed_track_details: Vec<CompletedTrackDetail>,
}
