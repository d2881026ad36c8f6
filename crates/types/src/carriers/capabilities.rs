//! Carrier capabilities and capability sets

use serde::{Deserialize, Serialize};
use std::fmt;

/// An operation a carrier may support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
	Rating,
	Shipping,
	Pickup,
	Tracking,
	Cancel,
}

impl Capability {
	pub const ALL: [Capability; 5] = [
		Capability::Rating,
		Capability::Shipping,
		Capability::Pickup,
		Capability::Tracking,
		Capability::Cancel,
	];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Rating => "rating",
			Self::Shipping => "shipping",
			Self::Pickup => "pickup",
			Self::Tracking => "tracking",
			Self::Cancel => "cancel",
		}
	}

	/// Whether repeating the operation against a carrier has no side effects.
	///
	/// Only idempotent operations are retried on transient transport failures;
	/// resending a shipment or pickup could book it twice.
	pub const fn is_idempotent(self) -> bool {
		matches!(self, Self::Rating | Self::Tracking)
	}
}

impl fmt::Display for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Declares which operations a carrier adapter implements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
	pub rating: bool,
	pub shipping: bool,
	pub pickup: bool,
	pub tracking: bool,
	pub cancel: bool,
}

impl CapabilitySet {
	pub const fn none() -> Self {
		Self {
			rating: false,
			shipping: false,
			pickup: false,
			tracking: false,
			cancel: false,
		}
	}

	pub const fn all() -> Self {
		Self {
			rating: true,
			shipping: true,
			pickup: true,
			tracking: true,
			cancel: true,
		}
	}

	pub const fn with(mut self, capability: Capability) -> Self {
		match capability {
			Capability::Rating => self.rating = true,
			Capability::Shipping => self.shipping = true,
			Capability::Pickup => self.pickup = true,
			Capability::Tracking => self.tracking = true,
			Capability::Cancel => self.cancel = true,
		}
		self
	}

	pub const fn supports(&self, capability: Capability) -> bool {
		match capability {
			Capability::Rating => self.rating,
			Capability::Shipping => self.shipping,
			Capability::Pickup => self.pickup,
			Capability::Tracking => self.tracking,
			Capability::Cancel => self.cancel,
		}
	}

	pub fn is_empty(&self) -> bool {
		Capability::ALL.iter().all(|c| !self.supports(*c))
	}

	/// Supported capabilities in declaration order
	pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
		Capability::ALL
			.into_iter()
			.filter(move |c| self.supports(*c))
	}
}

impl FromIterator<Capability> for CapabilitySet {
	fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
		iter.into_iter().fold(Self::none(), Self::with)
	}
}

impl fmt::Display for CapabilitySet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let names: Vec<&str> = self.iter().map(Capability::as_str).collect();
		write!(f, "[{}]", names.join(", "))
	}
}
