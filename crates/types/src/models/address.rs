use serde::{Deserialize, Serialize};

/// A postal address as the unified model sees it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub company_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub person_name: Option<String>,
	#[serde(default)]
	pub address_lines: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state_code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub postal_code: Option<String>,
	/// ISO 3166-1 alpha-2
	pub country_code: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone_number: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(default)]
	pub residential: bool,
}

impl Address {
	pub fn new(country_code: impl Into<String>) -> Self {
		Self {
			country_code: country_code.into(),
			..Default::default()
		}
	}

	pub fn has_valid_country_code(&self) -> bool {
		self.country_code.len() == 2 && self.country_code.chars().all(|c| c.is_ascii_uppercase())
	}

	/// Postal code without spaces, upper-cased
	pub fn normalized_postal_code(&self) -> Option<String> {
		self.postal_code.as_ref().map(|code| {
			code.chars()
				.filter(|c| !c.is_whitespace())
				.collect::<String>()
				.to_ascii_uppercase()
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_country_code_validation() {
		assert!(Address::new("CA").has_valid_country_code());
		assert!(!Address::new("ca").has_valid_country_code());
		assert!(!Address::new("CAN").has_valid_country_code());
	}

	#[test]
	fn test_postal_code_normalization() {
		let mut address = Address::new("CA");
		address.postal_code = Some("h3a 1b2".to_string());
		assert_eq!(address.normalized_postal_code().as_deref(), Some("H3A1B2"));
	}
}
