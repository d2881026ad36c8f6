//! Helpers shared by carrier mappers

use std::str::FromStr;

use rust_decimal::Decimal;
use shipx_types::{
	codes, CarrierError, CarrierRef, CarrierResponse, CodecError, ConversionError, LabelType, Money,
	ParsedResponse, Weight, WeightUnit,
};

const BODY_EXCERPT_LEN: usize = 200;

/// Normalize an undecodable response body
pub fn decode_failure(target: &CarrierRef, response: &CarrierResponse, error: &CodecError) -> ParsedResponse {
	let text = response.text();
	let excerpt: String = text.chars().take(BODY_EXCERPT_LEN).collect();
	ParsedResponse::from_error(
		target
			.parse_error(format!("Cannot decode {} response: {}", response.operation, error))
			.with_detail("status", response.status.to_string())
			.with_detail("body", excerpt),
	)
}

/// Error for a non-2xx response that carried no error entries of its own
pub fn status_without_details(target: &CarrierRef, response: &CarrierResponse) -> CarrierError {
	target
		.error(
			codes::TRANSPORT,
			format!(
				"Carrier answered {} with HTTP {} and no error details",
				response.operation, response.status
			),
		)
		.with_detail("status", response.status.to_string())
}

/// Weight in `unit` rounded to `dp` places, never below one step for a
/// positive weight
pub fn declared_weight(weight: &Weight, unit: WeightUnit, dp: u32) -> Result<Decimal, ConversionError> {
	let rounded = weight.in_unit(unit, dp)?;
	if rounded.is_zero() && weight.value > Decimal::ZERO {
		return Ok(Decimal::new(1, dp));
	}
	Ok(rounded)
}

pub fn parse_decimal(field: &str, value: &str) -> Result<Decimal, String> {
	Decimal::from_str(value.trim()).map_err(|e| format!("{} '{}' is not a decimal: {}", field, value, e))
}

pub fn parse_money(field: &str, amount: &str, currency: &str) -> Result<Money, String> {
	Ok(Money::new(parse_decimal(field, amount)?, currency.trim().to_ascii_uppercase()))
}

pub fn parse_label_type(format: Option<&str>) -> LabelType {
	match format.map(str::to_ascii_uppercase).as_deref() {
		Some("ZPL") => LabelType::Zpl,
		Some("PNG") => LabelType::Png,
		_ => LabelType::Pdf,
	}
}

pub fn label_type_code(label_type: LabelType) -> &'static str {
	match label_type {
		LabelType::Pdf => "PDF",
		LabelType::Zpl => "ZPL",
		LabelType::Png => "PNG",
	}
}

/// Keep a response only if it said something; otherwise report the status
pub fn finish(target: &CarrierRef, response: &CarrierResponse, mut parsed: ParsedResponse) -> ParsedResponse {
	if parsed.is_empty() && !response.is_success() {
		parsed.errors.push(status_without_details(target, response));
	}
	parsed
}
