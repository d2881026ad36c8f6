//! Weights and dimensions with exact unit conversion
//!
//! Conversions go through a base unit (grams, centimetres) using the exact
//! definitions 1 lb = 0.45359237 kg, 1 oz = 1/16 lb and 1 in = 2.54 cm, all
//! of which are terminating decimals. Rounding happens once, at the end,
//! half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
	#[error("Converting {value} {from} to {to} overflows")]
	Overflow {
		value: Decimal,
		from: &'static str,
		to: &'static str,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightUnit {
	KG,
	LB,
	OZ,
	G,
}

impl WeightUnit {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::KG => "KG",
			Self::LB => "LB",
			Self::OZ => "OZ",
			Self::G => "G",
		}
	}

	fn grams(self) -> Decimal {
		match self {
			Self::KG => Decimal::new(1000, 0),
			Self::LB => Decimal::new(45_359_237, 5),
			Self::OZ => Decimal::new(28_349_523_125, 9),
			Self::G => Decimal::ONE,
		}
	}
}

impl fmt::Display for WeightUnit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionUnit {
	CM,
	IN,
}

impl DimensionUnit {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::CM => "CM",
			Self::IN => "IN",
		}
	}

	fn centimetres(self) -> Decimal {
		match self {
			Self::CM => Decimal::ONE,
			Self::IN => Decimal::new(254, 2),
		}
	}
}

impl fmt::Display for DimensionUnit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

fn convert(
	value: Decimal,
	from_base: Decimal,
	to_base: Decimal,
	from: &'static str,
	to: &'static str,
) -> Result<Decimal, ConversionError> {
	if from_base == to_base {
		return Ok(value);
	}
	value
		.checked_mul(from_base)
		.and_then(|base| base.checked_div(to_base))
		.ok_or(ConversionError::Overflow { value, from, to })
}

/// Round half away from zero to `dp` decimal places
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
	value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
	#[serde(with = "rust_decimal::serde::str")]
	pub value: Decimal,
	pub unit: WeightUnit,
}

impl Weight {
	pub fn new(value: Decimal, unit: WeightUnit) -> Self {
		Self { value, unit }
	}

	/// Exact conversion, no rounding
	pub fn convert(&self, unit: WeightUnit) -> Result<Weight, ConversionError> {
		let value = convert(
			self.value,
			self.unit.grams(),
			unit.grams(),
			self.unit.as_str(),
			unit.as_str(),
		)?;
		Ok(Weight { value, unit })
	}

	/// Value in `unit`, rounded half up to `dp` places
	pub fn in_unit(&self, unit: WeightUnit, dp: u32) -> Result<Decimal, ConversionError> {
		Ok(round_half_up(self.convert(unit)?.value, dp))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
	#[serde(with = "rust_decimal::serde::str")]
	pub length: Decimal,
	#[serde(with = "rust_decimal::serde::str")]
	pub width: Decimal,
	#[serde(with = "rust_decimal::serde::str")]
	pub height: Decimal,
	pub unit: DimensionUnit,
}

impl Dimensions {
	pub fn new(length: Decimal, width: Decimal, height: Decimal, unit: DimensionUnit) -> Self {
		Self {
			length,
			width,
			height,
			unit,
		}
	}

	pub fn convert(&self, unit: DimensionUnit) -> Result<Dimensions, ConversionError> {
		let (from, to) = (self.unit.centimetres(), unit.centimetres());
		let one = |value| convert(value, from, to, self.unit.as_str(), unit.as_str());
		Ok(Dimensions {
			length: one(self.length)?,
			width: one(self.width)?,
			height: one(self.height)?,
			unit,
		})
	}

	/// `(length, width, height)` in `unit`, each rounded half up to `dp` places
	pub fn in_unit(
		&self,
		unit: DimensionUnit,
		dp: u32,
	) -> Result<(Decimal, Decimal, Decimal), ConversionError> {
		let converted = self.convert(unit)?;
		Ok((
			round_half_up(converted.length, dp),
			round_half_up(converted.width, dp),
			round_half_up(converted.height, dp),
		))
	}

	pub fn is_positive(&self) -> bool {
		self.length > Decimal::ZERO && self.width > Decimal::ZERO && self.height > Decimal::ZERO
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	#[test]
	fn test_pound_to_kilogram_is_exact() {
		let weight = Weight::new(dec!(1), WeightUnit::LB);
		assert_eq!(weight.convert(WeightUnit::KG).unwrap().value, dec!(0.45359237));
	}

	#[test]
	fn test_ounce_is_sixteenth_of_pound() {
		let weight = Weight::new(dec!(16), WeightUnit::OZ);
		assert_eq!(weight.convert(WeightUnit::LB).unwrap().value, dec!(1));
		assert_eq!(weight.convert(WeightUnit::G).unwrap().value, dec!(453.59237));
	}

	#[test]
	fn test_rounding_is_half_away_from_zero() {
		assert_eq!(round_half_up(dec!(2.345), 2), dec!(2.35));
		assert_eq!(round_half_up(dec!(2.344), 2), dec!(2.34));
		assert_eq!(round_half_up(dec!(0.125), 2), dec!(0.13));

		let weight = Weight::new(dec!(10), WeightUnit::LB);
		assert_eq!(weight.in_unit(WeightUnit::KG, 2).unwrap(), dec!(4.54));
	}

	#[test]
	fn test_kilogram_pound_round_trip_within_tolerance() {
		let original = Weight::new(dec!(3.7), WeightUnit::KG);
		let pounds = original.in_unit(WeightUnit::LB, 2).unwrap();
		let back = Weight::new(pounds, WeightUnit::LB)
			.in_unit(WeightUnit::KG, 2)
			.unwrap();
		assert!((back - original.value).abs() <= dec!(0.01));
	}

	#[test]
	fn test_inches_to_centimetres() {
		let dims = Dimensions::new(dec!(10), dec!(5.5), dec!(1), DimensionUnit::IN);
		assert_eq!(
			dims.in_unit(DimensionUnit::CM, 1).unwrap(),
			(dec!(25.4), dec!(14.0), dec!(2.5))
		);
		assert!(dims.is_positive());
	}

	#[test]
	fn test_same_unit_is_identity() {
		let weight = Weight::new(dec!(1.23456), WeightUnit::KG);
		assert_eq!(weight.convert(WeightUnit::KG).unwrap(), weight);
	}
}
