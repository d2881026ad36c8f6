use serde::{Deserialize, Serialize};

use super::units::{Dimensions, Weight};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
	pub weight: Weight,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<Dimensions>,
	/// Carrier-neutral packaging hint, e.g. `envelope` or `your_packaging`
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub packaging_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reference: Option<String>,
}

impl Parcel {
	pub fn new(weight: Weight) -> Self {
		Self {
			weight,
			dimensions: None,
			packaging_type: None,
			description: None,
			reference: None,
		}
	}

	pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
		self.dimensions = Some(dimensions);
		self
	}
}
