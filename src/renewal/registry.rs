// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{RenewalGrant, TokenSecret},
	renewal::SingleFlight,
};

/// Process-wide registry deduplicating request-scoped renewals per session.
///
/// Renewals are keyed by a fingerprint of the presented refresh token, so concurrent
/// requests from the same session share one exchange while unrelated sessions renew
/// independently. Each request still installs the shared grant into its own store.
#[derive(Debug, Default)]
pub struct RenewalRegistry {
	flights: SingleFlight<String, Option<RenewalGrant>>,
}
impl RenewalRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Derives the registry key for a refresh token without retaining the token itself.
	pub fn fingerprint(refresh: &TokenSecret) -> String {
		URL_SAFE_NO_PAD.encode(Sha256::digest(refresh.expose().as_bytes()))
	}

	/// Returns `true` while a renewal presenting `refresh` is running.
	pub fn in_flight(&self, refresh: &TokenSecret) -> bool {
		self.flights.in_flight(&Self::fingerprint(refresh))
	}

	pub(crate) async fn run<F, Fut>(&self, refresh: &TokenSecret, start: F) -> Option<RenewalGrant>
	where
		F: FnOnce() -> Fut,
		Fut: 'static + Send + Future<Output = Option<RenewalGrant>>,
	{
		self.flights.run(Self::fingerprint(refresh), start).await
	}
}
