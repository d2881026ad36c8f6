//! Credential values that never leak through formatting or serialization

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

const REDACTED: &str = "[REDACTED]";

/// A carrier credential, wiped on drop and printed as `[REDACTED]`
///
/// ```rust
/// use shipx_types::SecretString;
///
/// let password = SecretString::from("s3cr3t");
/// assert_eq!(password.expose_secret(), "s3cr3t");
/// assert_eq!(password.to_string(), "[REDACTED]");
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
	pub fn new(secret: String) -> Self {
		Self(secret)
	}

	pub fn expose_secret(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString({})", REDACTED)
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(secret: String) -> Self {
		Self(secret)
	}
}

impl From<&str> for SecretString {
	fn from(secret: &str) -> Self {
		Self(secret.to_string())
	}
}

impl Serialize for SecretString {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(REDACTED)
	}
}
