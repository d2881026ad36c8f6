use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
	#[serde(with = "rust_decimal::serde::str")]
	pub amount: Decimal,
	/// ISO 4217 code
	pub currency: String,
}

impl Money {
	pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
		Self {
			amount,
			currency: currency.into(),
		}
	}
}

/// A named surcharge, tax or fee line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
	pub name: String,
	pub amount: Money,
}

impl Charge {
	pub fn new(name: impl Into<String>, amount: Money) -> Self {
		Self {
			name: name.into(),
			amount,
		}
	}
}
