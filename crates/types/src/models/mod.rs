//! Carrier-agnostic domain values shared by requests and results

pub mod address;
pub mod money;
pub mod parcel;
pub mod secret_string;
pub mod units;

pub use address::Address;
pub use money::{Charge, Money};
pub use parcel::Parcel;
pub use secret_string::SecretString;
pub use units::{round_half_up, ConversionError, DimensionUnit, Dimensions, Weight, WeightUnit};
