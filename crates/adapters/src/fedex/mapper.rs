use chrono::DateTime;
use shipx_types::{
	AdapterError, AdapterResult, Address, Capability, CarrierError, CarrierId, CarrierRef,
	CarrierRequest, CarrierResponse, Charge, DimensionUnit, Mapper, Parcel, ParsedResponse,
	RateDetails, ResultDetails, TrackingDetails, TrackingEvent, UnifiedRequest, WeightUnit,
};

use super::wire::{self, *};
use super::FedexSettings;
use crate::mapping::{declared_weight, decode_failure, finish, parse_money};

const WEIGHT_DP: u32 = 1;
const DIMENSION_DP: u32 = 0;

#[derive(Debug, Clone)]
pub struct FedexMapper {
	target: CarrierRef,
	settings: FedexSettings,
}

impl FedexMapper {
	pub fn new(settings: FedexSettings) -> Self {
		Self {
			target: settings.target.clone(),
			settings,
		}
	}

	fn authentication(&self) -> WebAuthenticationDetail {
		WebAuthenticationDetail {
			user_credential: UserCredential {
				key: Credential(self.settings.key.clone()),
				password: Credential(self.settings.password.clone()),
			},
		}
	}

	fn client_detail(&self) -> ClientDetail {
		ClientDetail {
			account_number: self.settings.account_number.clone(),
			meter_number: self.settings.meter_number.clone(),
			localization: self.settings.language_code.clone().map(|language_code| Localization {
				language_code,
			}),
		}
	}

	fn party(address: &Address) -> Party {
		let has_contact = address.person_name.is_some()
			|| address.company_name.is_some()
			|| address.phone_number.is_some()
			|| address.email.is_some();
		Party {
			contact: has_contact.then(|| Contact {
				person_name: address.person_name.clone(),
				company_name: address.company_name.clone(),
				phone_number: address.phone_number.clone(),
				email_address: address.email.clone(),
			}),
			address: FedexAddress {
				street_lines: address.address_lines.clone(),
				city: address.city.clone(),
				state_or_province_code: address.state_code.clone(),
				postal_code: address.normalized_postal_code(),
				country_code: address.country_code.clone(),
				residential: address.residential,
			},
		}
	}

	fn line_item(index: usize, parcel: &Parcel) -> AdapterResult<RequestedPackageLineItem> {
		let weight = declared_weight(&parcel.weight, WeightUnit::LB, WEIGHT_DP)?;
		let dimensions = parcel
			.dimensions
			.as_ref()
			.map(|dims| dims.in_unit(DimensionUnit::IN, DIMENSION_DP))
			.transpose()?
			.map(|(length, width, height)| FedexDimensions {
				length: length.to_string(),
				width: width.to_string(),
				height: height.to_string(),
				units: "IN",
			});

		Ok(RequestedPackageLineItem {
			sequence_number: index + 1,
			group_package_count: 1,
			weight: FedexWeight {
				units: "LB",
				value: format!("{:.1}", weight),
			},
			dimensions,
		})
	}

	fn rate_request(&self, request: &shipx_types::RateRequest) -> AdapterResult<wire::RateRequest> {
		let line_items = request
			.parcels
			.iter()
			.enumerate()
			.map(|(index, parcel)| Self::line_item(index, parcel))
			.collect::<AdapterResult<Vec<_>>>()?;

		Ok(wire::RateRequest {
			xmlns: RATE_NAMESPACE,
			web_authentication_detail: self.authentication(),
			client_detail: self.client_detail(),
			transaction_detail: request.reference.clone().map(|customer_transaction_id| {
				TransactionDetail {
					customer_transaction_id,
				}
			}),
			version: VersionId {
				service_id: "crs",
				major: 28,
				intermediate: 0,
				minor: 0,
			},
			return_transit_and_commit: true,
			requested_shipment: RequestedShipment {
				dropoff_type: "REGULAR_PICKUP",
				// FedEx quotes every service unless exactly one is asked for
				service_type: match request.services.as_slice() {
					[only] => Some(only.clone()),
					_ => None,
				},
				packaging_type: packaging_type(request.parcels.first()),
				shipper: Self::party(&request.shipper),
				recipient: Self::party(&request.recipient),
				rate_request_types: "LIST",
				package_count: line_items.len(),
				requested_package_line_items: line_items,
			},
		})
	}

	fn track_request(&self, request: &shipx_types::TrackingRequest) -> wire::TrackRequest {
		wire::TrackRequest {
			xmlns: TRACK_NAMESPACE,
			web_authentication_detail: self.authentication(),
			client_detail: self.client_detail(),
			version: VersionId {
				service_id: "trck",
				major: 19,
				intermediate: 0,
				minor: 0,
			},
			selection_details: request
				.tracking_numbers
				.iter()
				.map(|number| TrackSelectionDetail {
					package_identifier: PackageIdentifier {
						kind: "TRACKING_NUMBER_OR_DOORTAG",
						value: number.trim().to_string(),
					},
				})
				.collect(),
			processing_options: "INCLUDE_DETAILED_SCANS",
		}
	}

	fn notification_error(&self, notification: &Notification) -> CarrierError {
		let error = self
			.target
			.error(notification.code.as_str(), notification.message.as_str())
			.with_detail("severity", notification.severity.as_str());
		match &notification.source {
			Some(source) => error.with_detail("source", source.as_str()),
			None => error,
		}
	}

	fn notification_errors(&self, notifications: &[Notification]) -> Vec<CarrierError> {
		notifications
			.iter()
			.filter(|n| n.is_error())
			.map(|n| self.notification_error(n))
			.collect()
	}

	fn rate(&self, detail: &RateReplyDetail) -> Result<RateDetails, String> {
		let rated = detail
			.rated_shipment_details
			.first()
			.map(|r| &r.shipment_rate_detail)
			.ok_or_else(|| format!("Service {} has no rated shipment details", detail.service_type))?;

		let mut extra_charges = Vec::new();
		for surcharge in &rated.surcharges {
			extra_charges.push(Charge::new(
				surcharge.surcharge_type.as_str(),
				money(&surcharge.surcharge_type, &surcharge.amount)?,
			));
		}
		for tax in &rated.taxes {
			extra_charges.push(Charge::new(tax.tax_type.as_str(), money(&tax.tax_type, &tax.amount)?));
		}

		Ok(RateDetails {
			service: detail.service_type.clone(),
			total_charge: money("TotalNetCharge", &rated.total_net_charge)?,
			base_charge: rated
				.total_base_charge
				.as_ref()
				.map(|m| money("TotalBaseCharge", m))
				.transpose()?,
			extra_charges,
			transit_days: detail.transit_time.as_deref().and_then(transit_days),
			sub_carrier: None,
		})
	}

	fn envelope(&self, response: &CarrierResponse) -> Result<SoapBody, ParsedResponse> {
		match response.xml::<SoapEnvelope>() {
			Ok(envelope) => Ok(envelope.body),
			Err(error) => Err(decode_failure(&self.target, response, &error)),
		}
	}

	fn fault(&self, fault: &SoapFault) -> ParsedResponse {
		ParsedResponse::from_error(self.target.error(
			fault.fault_code.as_str(),
			fault.fault_string.as_str(),
		))
	}

	fn missing_reply(&self, name: &str) -> ParsedResponse {
		ParsedResponse::from_error(
			self.target
				.parse_error(format!("SOAP body does not contain a {}", name)),
		)
	}

	fn parse_rates(&self, response: &CarrierResponse) -> ParsedResponse {
		let body = match self.envelope(response) {
			Ok(body) => body,
			Err(parsed) => return parsed,
		};
		if let Some(fault) = &body.fault {
			return self.fault(fault);
		}
		let Some(reply) = body.rate_reply else {
			return self.missing_reply("RateReply");
		};

		let mut parsed = ParsedResponse::default();
		for detail in &reply.rate_reply_details {
			match self.rate(detail) {
				Ok(rate) => parsed.results.push(self.target.result(ResultDetails::Rate(rate))),
				Err(reason) => parsed.errors.push(
					self.target
						.parse_error(reason)
						.with_detail("service_type", detail.service_type.as_str()),
				),
			}
		}
		parsed.errors.extend(self.notification_errors(&reply.notifications));
		parsed
	}

	fn tracking(&self, detail: &TrackDetail, tracking_number: &str) -> Result<TrackingDetails, String> {
		let mut events = Vec::with_capacity(detail.events.len());
		for event in &detail.events {
			let date = DateTime::parse_from_rfc3339(&event.timestamp)
				.map_err(|e| format!("Event timestamp '{}' is invalid: {}", event.timestamp, e))?
				.naive_local();
			let location = event.address.as_ref().and_then(|address| {
				let parts: Vec<&str> = [
					address.city.as_deref(),
					address.state_or_province_code.as_deref(),
					address.country_code.as_deref(),
				]
				.into_iter()
				.flatten()
				.collect();
				(!parts.is_empty()).then(|| parts.join(", "))
			});
			events.push(TrackingEvent {
				date,
				code: event.event_type.clone(),
				description: event.event_description.clone(),
				location,
			});
		}
		events.sort_by(|a, b| b.date.cmp(&a.date));

		let status = detail
			.status_detail
			.as_ref()
			.and_then(|s| s.code.as_deref());
		Ok(TrackingDetails {
			tracking_number: tracking_number.to_string(),
			delivered: status == Some("DL"),
			events,
		})
	}

	fn parse_tracking(&self, response: &CarrierResponse) -> ParsedResponse {
		let body = match self.envelope(response) {
			Ok(body) => body,
			Err(parsed) => return parsed,
		};
		if let Some(fault) = &body.fault {
			return self.fault(fault);
		}
		let Some(reply) = body.track_reply else {
			return self.missing_reply("TrackReply");
		};

		let mut parsed = ParsedResponse::default();
		for detail in reply
			.completed_track_details
			.iter()
			.flat_map(|completed| completed.track_details.iter())
		{
			let tracking_number = detail.tracking_number.as_deref().unwrap_or_default();
			if let Some(notification) = detail.notification.as_ref().filter(|n| n.is_error()) {
				parsed.errors.push(
					self.notification_error(notification)
						.with_detail("tracking_number", tracking_number),
				);
				continue;
			}
			match self.tracking(detail, tracking_number) {
				Ok(details) => parsed
					.results
					.push(self.target.result(ResultDetails::Tracking(details))),
				Err(reason) => parsed.errors.push(
					self.target
						.parse_error(reason)
						.with_detail("tracking_number", tracking_number),
				),
			}
		}
		parsed.errors.extend(self.notification_errors(&reply.notifications));
		parsed
	}
}

impl Mapper for FedexMapper {
	fn carrier_id(&self) -> &CarrierId {
		&self.target.carrier_id
	}

	fn to_carrier_request(&self, request: &UnifiedRequest) -> AdapterResult<CarrierRequest> {
		let carrier_id = self.target.carrier_id.clone();
		match request {
			UnifiedRequest::Rate(r) => Ok(CarrierRequest::xml(
				carrier_id,
				Capability::Rating,
				"RateRequest",
				self.rate_request(r)?,
			)),
			UnifiedRequest::Tracking(r) => Ok(CarrierRequest::xml(
				carrier_id,
				Capability::Tracking,
				"TrackRequest",
				self.track_request(r),
			)),
			other => Err(AdapterError::UnsupportedOperation {
				operation: other.capability(),
				carrier_id,
			}),
		}
	}

	fn from_carrier_response(&self, response: CarrierResponse) -> ParsedResponse {
		let parsed = match response.operation {
			Capability::Rating => self.parse_rates(&response),
			Capability::Tracking => self.parse_tracking(&response),
			other => ParsedResponse::from_error(self.target.unsupported(other)),
		};
		finish(&self.target, &response, parsed)
	}
}

fn money(field: &str, money: &FedexMoney) -> Result<shipx_types::Money, String> {
	parse_money(field, &money.amount, &money.currency)
}

/// FedEx packaging for the first parcel; mixed shipments use customer packaging
fn packaging_type(parcel: Option<&Parcel>) -> String {
	match parcel.and_then(|p| p.packaging_type.as_deref()) {
		Some("envelope") => "FEDEX_ENVELOPE",
		Some("pak") => "FEDEX_PAK",
		Some("small_box") => "FEDEX_SMALL_BOX",
		Some("medium_box") => "FEDEX_MEDIUM_BOX",
		Some("tube") => "FEDEX_TUBE",
		_ => "YOUR_PACKAGING",
	}
	.to_string()
}

/// `TWO_DAYS` style transit times
fn transit_days(value: &str) -> Option<u32> {
	const WORDS: [&str; 20] = [
		"ONE", "TWO", "THREE", "FOUR", "FIVE", "SIX", "SEVEN", "EIGHT", "NINE", "TEN", "ELEVEN",
		"TWELVE", "THIRTEEN", "FOURTEEN", "FIFTEEN", "SIXTEEN", "SEVENTEEN", "EIGHTEEN", "NINETEEN",
		"TWENTY",
	];
	let word = value
		.strip_suffix("_DAYS")
		.or_else(|| value.strip_suffix("_DAY"))?;
	WORDS
		.iter()
		.position(|w| *w == word)
		.map(|index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_transit_days() {
		assert_eq!(transit_days("ONE_DAY"), Some(1));
		assert_eq!(transit_days("TWO_DAYS"), Some(2));
		assert_eq!(transit_days("TWENTY_DAYS"), Some(20));
		assert_eq!(transit_days("UNKNOWN"), None);
	}
}
