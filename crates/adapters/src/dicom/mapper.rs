use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use shipx_types::{
	AdapterError, AdapterResult, Address, Capability, CarrierError, CarrierId, CarrierRef,
	CarrierRequest, CarrierResponse, Charge, ConfirmationDetails, DimensionUnit, Mapper, Parcel,
	ParsedResponse, PickupDetails, PickupRequest, RateDetails, RateRequest, ResultDetails,
	ShipmentDetails, ShipmentRequest, TrackingDetails, TrackingEvent, TrackingRequest,
	UnifiedRequest, Weight, WeightUnit,
};

use super::wire::*;
use super::DicomSettings;
use crate::mapping::{
	declared_weight, decode_failure, finish, label_type_code, parse_decimal, parse_label_type,
	parse_money,
};

const WEIGHT_DP: u32 = 2;
const DIMENSION_DP: u32 = 1;
const EVENT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone)]
pub struct DicomMapper {
	target: CarrierRef,
	settings: DicomSettings,
}

impl DicomMapper {
	pub fn new(settings: DicomSettings) -> Self {
		Self {
			target: settings.target.clone(),
			settings,
		}
	}

	fn address(&self, address: &Address) -> DicomAddress {
		let mut lines = address.address_lines.iter();
		DicomAddress {
			customer_name: address.company_name.clone(),
			contact_name: address.person_name.clone(),
			address_line1: lines.next().cloned().unwrap_or_default(),
			address_line2: {
				let rest: Vec<&str> = lines.map(String::as_str).collect();
				(!rest.is_empty()).then(|| rest.join(", "))
			},
			city: address.city.clone(),
			province_code: address.state_code.clone(),
			postal_code: address.normalized_postal_code(),
			country_code: address.country_code.clone(),
			phone: address.phone_number.clone(),
			email: address.email.clone(),
			residential: address.residential,
		}
	}

	fn parcel(&self, parcel: &Parcel) -> AdapterResult<DicomParcel> {
		let weight = declared_weight(&parcel.weight, WeightUnit::KG, WEIGHT_DP)?;
		let (length, width, height) = match &parcel.dimensions {
			Some(dims) => {
				let (l, w, h) = dims.in_unit(DimensionUnit::CM, DIMENSION_DP)?;
				(
					Some(format!("{:.1}", l)),
					Some(format!("{:.1}", w)),
					Some(format!("{:.1}", h)),
				)
			},
			None => (None, None, None),
		};

		Ok(DicomParcel {
			quantity: 1,
			parcel_type: parcel_type(parcel.packaging_type.as_deref()).to_string(),
			weight: format!("{:.2}", weight),
			length,
			width,
			height,
			reference: parcel.reference.clone(),
		})
	}

	fn rate_request(&self, request: &RateRequest) -> AdapterResult<DicomRateRequest> {
		Ok(DicomRateRequest {
			category: "Parcel".to_string(),
			payment_type: "Prepaid".to_string(),
			billing_account: self.settings.billing_account.clone(),
			sender: self.address(&request.shipper),
			consignee: self.address(&request.recipient),
			unit_of_measurement: "KC".to_string(),
			parcels: request
				.parcels
				.iter()
				.map(|p| self.parcel(p))
				.collect::<AdapterResult<_>>()?,
			services: request.services.clone(),
			surcharges: surcharges(&request.options),
			reference: request.reference.clone(),
		})
	}

	fn shipment_request(&self, request: &ShipmentRequest) -> AdapterResult<DicomShipmentRequest> {
		let rate = self.rate_request(&RateRequest {
			shipper: request.shipper.clone(),
			recipient: request.recipient.clone(),
			parcels: request.parcels.clone(),
			services: Vec::new(),
			options: request.options.clone(),
			reference: request.reference.clone(),
		})?;
		Ok(DicomShipmentRequest {
			rate,
			service: request.service.clone(),
			label_format: label_type_code(request.label_type).to_string(),
		})
	}

	fn pickup_request(&self, request: &PickupRequest) -> AdapterResult<DicomPickupRequest> {
		let mut total = Decimal::ZERO;
		for parcel in &request.parcels {
			let kg = parcel.weight.convert(WeightUnit::KG)?.value;
			total = total.checked_add(kg).ok_or_else(|| AdapterError::Mapping {
				carrier_id: self.target.carrier_id.clone(),
				reason: "total pickup weight overflows".to_string(),
			})?;
		}
		let total = declared_weight(&Weight::new(total, WeightUnit::KG), WeightUnit::KG, WEIGHT_DP)?;

		Ok(DicomPickupRequest {
			date: request.pickup_date.format("%Y-%m-%d").to_string(),
			ready_time: request.ready_time.format("%H:%M").to_string(),
			closing_time: request.closing_time.format("%H:%M").to_string(),
			billing_account: self.settings.billing_account.clone(),
			location: self.address(&request.address),
			parcel_count: request.parcels.len() as u32,
			total_weight: format!("{:.2}", total),
			unit_of_measurement: "KC".to_string(),
			location_description: request.package_location.clone(),
			instructions: request.instruction.clone(),
		})
	}

	fn dicom_error(&self, error: &DicomError) -> CarrierError {
		let mut carrier_error = self.target.error(error.code.as_str(), error.message.as_str());
		if let Some(service) = &error.service_code {
			carrier_error = carrier_error.with_detail("service_code", service.as_str());
		}
		if let Some(field) = &error.field {
			carrier_error = carrier_error.with_detail("field", field.as_str());
		}
		carrier_error
	}

	fn errors(&self, errors: &[DicomError]) -> Vec<CarrierError> {
		errors.iter().map(|e| self.dicom_error(e)).collect()
	}

	fn rate(&self, rate: &DicomRate) -> Result<RateDetails, String> {
		let charge = |kind: &DicomAmount| -> Result<Charge, String> {
			Ok(Charge::new(
				kind.kind.as_str(),
				parse_money(&kind.kind, &kind.amount, &rate.currency)?,
			))
		};
		let extra_charges = rate
			.surcharges
			.iter()
			.chain(rate.taxes.iter())
			.map(charge)
			.collect::<Result<Vec<_>, _>>()?;

		Ok(RateDetails {
			service: rate.service_code.clone(),
			total_charge: parse_money("total", &rate.total, &rate.currency)?,
			base_charge: Some(parse_money("baseCharge", &rate.base_charge, &rate.currency)?),
			extra_charges,
			transit_days: rate.transit_days,
			sub_carrier: None,
		})
	}

	fn parse_rates(&self, response: &CarrierResponse) -> ParsedResponse {
		let body: DicomRateResponse = match response.json() {
			Ok(body) => body,
			Err(error) => return decode_failure(&self.target, response, &error),
		};

		let mut parsed = ParsedResponse::default();
		for rate in &body.rates {
			match self.rate(rate) {
				Ok(details) => parsed.results.push(self.target.result(ResultDetails::Rate(details))),
				Err(reason) => parsed.errors.push(
					self.target
						.parse_error(reason)
						.with_detail("service_code", rate.service_code.as_str()),
				),
			}
		}
		parsed.errors.extend(self.errors(&body.errors));
		parsed
	}

	fn parse_shipment(&self, response: &CarrierResponse) -> ParsedResponse {
		let body: DicomShipmentResponse = match response.json() {
			Ok(body) => body,
			Err(error) => return decode_failure(&self.target, response, &error),
		};

		let mut parsed = ParsedResponse::new(Vec::new(), self.errors(&body.errors));
		match (body.shipment_id, body.tracking_number) {
			(Some(shipment_identifier), Some(tracking_number)) => {
				parsed.results.push(self.target.result(ResultDetails::Shipment(ShipmentDetails {
					tracking_number,
					shipment_identifier,
					label: body.label,
					label_type: parse_label_type(body.label_format.as_deref()),
				})));
			},
			(None, None) => {},
			_ => parsed.errors.push(
				self.target
					.parse_error("Shipment response is missing the shipment id or tracking number"),
			),
		}
		parsed
	}

	fn parse_pickup(&self, response: &CarrierResponse) -> ParsedResponse {
		let body: DicomPickupResponse = match response.json() {
			Ok(body) => body,
			Err(error) => return decode_failure(&self.target, response, &error),
		};

		let mut parsed = ParsedResponse::new(Vec::new(), self.errors(&body.errors));
		if let Some(confirmation_number) = body.pickup_id {
			let details = body
				.date
				.as_deref()
				.ok_or_else(|| "Pickup response is missing the date".to_string())
				.and_then(|date| {
					NaiveDate::parse_from_str(date, "%Y-%m-%d")
						.map_err(|e| format!("Pickup date '{}' is invalid: {}", date, e))
				})
				.and_then(|pickup_date| {
					let pickup_charge = body
						.charge
						.as_ref()
						.map(|c| parse_money("charge", &c.amount, &c.currency))
						.transpose()?;
					Ok(PickupDetails {
						confirmation_number,
						pickup_date,
						pickup_charge,
					})
				});
			match details {
				Ok(details) => parsed.results.push(self.target.result(ResultDetails::Pickup(details))),
				Err(reason) => parsed.errors.push(self.target.parse_error(reason)),
			}
		}
		parsed
	}

	fn tracking(&self, tracking: &DicomTracking) -> Result<TrackingDetails, String> {
		let mut events = tracking
			.events
			.iter()
			.map(|event| {
				Ok(TrackingEvent {
					date: NaiveDateTime::parse_from_str(&event.date, EVENT_DATE_FORMAT)
						.map_err(|e| format!("Event date '{}' is invalid: {}", event.date, e))?,
					code: event.code.clone(),
					description: event.description.clone(),
					location: event.location.clone(),
				})
			})
			.collect::<Result<Vec<_>, String>>()?;
		events.sort_by(|a, b| b.date.cmp(&a.date));

		Ok(TrackingDetails {
			tracking_number: tracking.tracking_number.clone(),
			delivered: tracking.delivered,
			events,
		})
	}

	fn parse_tracking(&self, response: &CarrierResponse) -> ParsedResponse {
		let body: DicomTrackingResponse = match response.json() {
			Ok(body) => body,
			Err(error) => return decode_failure(&self.target, response, &error),
		};

		let mut parsed = ParsedResponse::default();
		for tracking in &body.trackings {
			match self.tracking(tracking) {
				Ok(details) => parsed
					.results
					.push(self.target.result(ResultDetails::Tracking(details))),
				Err(reason) => parsed.errors.push(
					self.target
						.parse_error(reason)
						.with_detail("tracking_number", tracking.tracking_number.as_str()),
				),
			}
		}
		parsed.errors.extend(self.errors(&body.errors));
		parsed
	}

	fn parse_cancel(&self, response: &CarrierResponse) -> ParsedResponse {
		let body: DicomCancelResponse = match response.json() {
			Ok(body) => body,
			Err(error) => return decode_failure(&self.target, response, &error),
		};

		let mut parsed = ParsedResponse::new(Vec::new(), self.errors(&body.errors));
		if body.cancelled || parsed.errors.is_empty() {
			parsed
				.results
				.push(self.target.result(ResultDetails::Confirmation(ConfirmationDetails {
					operation: Capability::Cancel,
					success: body.cancelled,
				})));
		}
		parsed
	}
}

impl Mapper for DicomMapper {
	fn carrier_id(&self) -> &CarrierId {
		&self.target.carrier_id
	}

	fn to_carrier_request(&self, request: &UnifiedRequest) -> AdapterResult<CarrierRequest> {
		let carrier_id = self.target.carrier_id.clone();
		let operation = request.capability();
		Ok(match request {
			UnifiedRequest::Rate(r) => CarrierRequest::json(carrier_id, operation, self.rate_request(r)?),
			UnifiedRequest::Shipment(r) => {
				CarrierRequest::json(carrier_id, operation, self.shipment_request(r)?)
			},
			UnifiedRequest::Pickup(r) => {
				CarrierRequest::json(carrier_id, operation, self.pickup_request(r)?)
			},
			UnifiedRequest::Tracking(r) => CarrierRequest::json(
				carrier_id,
				operation,
				tracking_request(r),
			),
			UnifiedRequest::Cancel(r) => CarrierRequest::json(
				carrier_id,
				operation,
				DicomCancelRequest {
					shipment_id: r.shipment_identifier.trim().to_string(),
				},
			),
		})
	}

	fn from_carrier_response(&self, response: CarrierResponse) -> ParsedResponse {
		let parsed = match response.operation {
			Capability::Rating => self.parse_rates(&response),
			Capability::Shipping => self.parse_shipment(&response),
			Capability::Pickup => self.parse_pickup(&response),
			Capability::Tracking => self.parse_tracking(&response),
			Capability::Cancel => self.parse_cancel(&response),
		};
		finish(&self.target, &response, parsed)
	}
}

fn tracking_request(request: &TrackingRequest) -> DicomTrackingRequest {
	DicomTrackingRequest {
		tracking_numbers: request
			.tracking_numbers
			.iter()
			.map(|n| n.trim().to_string())
			.collect(),
		language: match request.language.as_deref() {
			Some(lang) if lang.eq_ignore_ascii_case("fr") => "fr".to_string(),
			_ => "en".to_string(),
		},
	}
}

/// Unknown packaging hints fall back to a plain parcel
fn parcel_type(packaging: Option<&str>) -> &'static str {
	match packaging {
		Some("envelope") => "Envelope",
		Some("pak") => "Pak",
		Some("pallet") => "Skid",
		_ => "Parcel",
	}
}

/// Options with a Dicom surcharge equivalent; the rest are not sent
fn surcharges(options: &std::collections::BTreeMap<String, String>) -> Vec<DicomSurcharge> {
	options
		.iter()
		.filter_map(|(name, value)| {
			let kind = match name.as_str() {
				"signature_confirmation" => "SIGN",
				"insurance" => "DCV",
				"dangerous_goods" => "DG",
				"saturday_delivery" => "SAT",
				_ => return None,
			};
			let value = match kind {
				"DCV" => parse_decimal(name, value).ok().map(|v| format!("{:.2}", v)),
				_ => None,
			};
			Some(DicomSurcharge {
				kind: kind.to_string(),
				value,
			})
		})
		.collect()
}
