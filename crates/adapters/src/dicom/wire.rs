//! Dicom REST payloads

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomAddress {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub customer_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub contact_name: Option<String>,
	pub address_line1: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub address_line2: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub province_code: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub postal_code: Option<String>,
	pub country_code: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	pub residential: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomParcel {
	pub quantity: u32,
	pub parcel_type: String,
	/// Kilograms, two decimals
	pub weight: String,
	/// Centimetres, one decimal
	#[serde(skip_serializing_if = "Option::is_none")]
	pub length: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub width: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub height: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomSurcharge {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomRateRequest {
	pub category: String,
	pub payment_type: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub billing_account: Option<String>,
	pub sender: DicomAddress,
	pub consignee: DicomAddress,
	pub unit_of_measurement: String,
	pub parcels: Vec<DicomParcel>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub services: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub surcharges: Vec<DicomSurcharge>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomShipmentRequest {
	#[serde(flatten)]
	pub rate: DicomRateRequest,
	pub service: String,
	pub label_format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomPickupRequest {
	pub date: String,
	pub ready_time: String,
	pub closing_time: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub billing_account: Option<String>,
	pub location: DicomAddress,
	pub parcel_count: u32,
	pub total_weight: String,
	pub unit_of_measurement: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub location_description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomTrackingRequest {
	pub tracking_numbers: Vec<String>,
	pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomCancelRequest {
	pub shipment_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomError {
	pub code: String,
	pub message: String,
	#[serde(default)]
	pub service_code: Option<String>,
	#[serde(default)]
	pub field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomAmount {
	#[serde(rename = "type")]
	pub kind: String,
	pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomRate {
	pub service_code: String,
	#[serde(default)]
	pub transit_days: Option<u32>,
	pub base_charge: String,
	#[serde(default)]
	pub surcharges: Vec<DicomAmount>,
	#[serde(default)]
	pub taxes: Vec<DicomAmount>,
	pub total: String,
	pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomRateResponse {
	#[serde(default)]
	pub rates: Vec<DicomRate>,
	#[serde(default)]
	pub errors: Vec<DicomError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomShipmentResponse {
	#[serde(default)]
	pub shipment_id: Option<String>,
	#[serde(default)]
	pub tracking_number: Option<String>,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub label_format: Option<String>,
	#[serde(default)]
	pub errors: Vec<DicomError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomCharge {
	pub amount: String,
	pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomPickupResponse {
	#[serde(default)]
	pub pickup_id: Option<String>,
	#[serde(default)]
	pub date: Option<String>,
	#[serde(default)]
	pub charge: Option<DicomCharge>,
	#[serde(default)]
	pub errors: Vec<DicomError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomEvent {
	/// `YYYY-MM-DDTHH:MM:SS`, local to the event
	pub date: String,
	pub code: String,
	pub description: String,
	#[serde(default)]
	pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomTracking {
	pub tracking_number: String,
	#[serde(default)]
	pub delivered: bool,
	#[serde(default)]
	pub events: Vec<DicomEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomTrackingResponse {
	#[serde(default)]
	pub trackings: Vec<DicomTracking>,
	#[serde(default)]
	pub errors: Vec<DicomError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicomCancelResponse {
	#[serde(default)]
	pub cancelled: bool,
	#[serde(default)]
	pub errors: Vec<DicomError>,
}
