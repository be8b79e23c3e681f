//! Access and refresh token values.

// self
use crate::_prelude::*;

/// An access or refresh token issued by the rental backend.
///
/// Formatting never reveals the value; only [`TokenSecret::expose`] and
/// [`TokenSecret::bearer`] do, at the point where the token leaves the process.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a token value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Reads a token out of a cookie value; a blank value (a logged-out cookie) is no token.
	pub fn from_cookie_value(value: &str) -> Option<Self> {
		let value = value.trim();

		(!value.is_empty()).then(|| Self::new(value))
	}

	/// Raw token value for the wire.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// `Authorization` header value sent by request-scoped calls.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenSecret(****)")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("****")
	}
}
