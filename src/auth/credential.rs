//! Access/refresh credential pair and the renewal endpoint's grant payload.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Lifetime of an access token and of the cookie that carries it.
pub const ACCESS_TOKEN_TTL: Duration = Duration::seconds(900);
/// Lifetime of a refresh token and of the cookie that carries it.
pub const REFRESH_TOKEN_TTL: Duration = Duration::days(7);

/// The unit of authentication state for one execution context.
///
/// Refresh tokens rotate: every successful renewal produces a new pair and the previous
/// refresh token must never be presented again.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPair {
	/// Short-lived bearer credential.
	pub access_token: TokenSecret,
	/// Rotating credential accepted only by the renewal endpoint.
	pub refresh_token: TokenSecret,
}
impl CredentialPair {
	/// Creates a pair from raw token strings.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
		}
	}
}
impl Debug for CredentialPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialPair")
			.field("access_token", &self.access_token)
			.field("refresh_token", &self.refresh_token)
			.finish()
	}
}

/// Body sent to the renewal endpoint by request-scoped code.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenewalRequest<'a> {
	pub refresh_token: &'a str,
}

/// Successful renewal endpoint response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalGrant {
	/// Newly minted access token.
	pub access_token: TokenSecret,
	/// Replacement refresh token; the presented one is no longer valid.
	pub refresh_token: TokenSecret,
	/// Token type label, normally `Bearer`.
	pub token_type: String,
	/// Access token lifetime in seconds as reported by the backend.
	pub expires_in: i64,
	/// Account the credentials belong to.
	pub username: String,
}
impl RenewalGrant {
	/// Returns the rotated credential pair carried by the grant.
	pub fn credentials(&self) -> CredentialPair {
		CredentialPair {
			access_token: self.access_token.clone(),
			refresh_token: self.refresh_token.clone(),
		}
	}
}
