// crates.io
use reqwest::header::CONTENT_TYPE;
// self
use crate::{
	_prelude::*,
	auth::{RenewalGrant, TokenSecret, credential::RenewalRequest},
	http::HttpClient,
	obs::{self, CallSpan, ClientKind, RenewalOutcome},
	renewal::{RenewalMetrics, RenewalRegistry},
	store::CredentialStore,
};

const KIND: ClientKind = ClientKind::Scoped;

/// Per-request renewal coordinator.
///
/// Reads the refresh token from the request's store, exchanges it at the renewal endpoint,
/// and installs the rotated pair back into the same store.
pub struct ScopedRenewer<S>
where
	S: ?Sized + CredentialStore,
{
	http: HttpClient,
	renewal_url: Url,
	store: Arc<S>,
	registry: Option<Arc<RenewalRegistry>>,
	metrics: Arc<RenewalMetrics>,
}
impl<S> ScopedRenewer<S>
where
	S: ?Sized + CredentialStore,
{
	/// Creates a renewer bound to one request's credential store.
	pub fn new(
		http: HttpClient,
		renewal_url: Url,
		store: Arc<S>,
		metrics: Arc<RenewalMetrics>,
	) -> Self {
		Self { http, renewal_url, store, registry: None, metrics }
	}

	/// Routes renewals through a shared registry so concurrent requests presenting the same
	/// refresh token share one renewal.
	pub fn with_registry(mut self, registry: Arc<RenewalRegistry>) -> Self {
		self.registry = Some(registry);

		self
	}

	/// Attempts one renewal and returns the new access token.
	///
	/// Returns `None` without touching the network when no refresh token is stored, and
	/// `None` without touching the store when the endpoint refuses or cannot be reached.
	pub async fn try_renew(&self) -> Option<TokenSecret> {
		let refresh = self.store.refresh_token()?;
		let http = self.http.clone();
		let url = self.renewal_url.clone();
		let metrics = Arc::clone(&self.metrics);
		let grant = match &self.registry {
			Some(registry) => {
				let presented = refresh.clone();
				let starter = Arc::clone(&self.store);

				registry
					.run(&refresh, move || async move {
						let grant = request_grant(http, url, presented, metrics).await;

						// The starter may be gone by the time the grant arrives.
						if let Some(grant) = &grant {
							starter.install(&grant.credentials());
						}

						grant
					})
					.await
			},
			None => request_grant(http, url, refresh, metrics).await,
		}?;

		self.store.install(&grant.credentials());

		Some(grant.access_token)
	}
}
impl<S> Debug for ScopedRenewer<S>
where
	S: ?Sized + CredentialStore,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ScopedRenewer")
			.field("renewal_url", &self.renewal_url)
			.field("shared_registry", &self.registry.is_some())
			.finish()
	}
}

/// Exchanges `refresh` for a new credential pair.
pub(crate) async fn request_grant(
	http: HttpClient,
	url: Url,
	refresh: TokenSecret,
	metrics: Arc<RenewalMetrics>,
) -> Option<RenewalGrant> {
	let span = CallSpan::renewal(KIND);

	metrics.record_attempt();
	obs::record_renewal_outcome(KIND, RenewalOutcome::Attempt);

	let grant = span.instrument(exchange(http, url, refresh)).await;

	if grant.is_some() {
		metrics.record_success();
		obs::record_renewal_outcome(KIND, RenewalOutcome::Success);
	} else {
		metrics.record_failure();
		obs::record_renewal_outcome(KIND, RenewalOutcome::Failure);
	}

	grant
}

async fn exchange(http: HttpClient, url: Url, refresh: TokenSecret) -> Option<RenewalGrant> {
	let body = serde_json::to_vec(&RenewalRequest { refresh_token: refresh.expose() })
		.inspect_err(|e| obs::warn_renewal_failed(KIND, None, e))
		.ok()?;
	let response = http
		.post(url)
		.header(CONTENT_TYPE, "application/json")
		.body(body)
		.send()
		.await
		.inspect_err(|e| obs::warn_renewal_failed(KIND, None, e))
		.ok()?;
	let status = response.status();

	if !status.is_success() {
		obs::warn_renewal_failed(KIND, Some(status.as_u16()), &status);

		return None;
	}

	let bytes = response
		.bytes()
		.await
		.inspect_err(|e| obs::warn_renewal_failed(KIND, Some(status.as_u16()), e))
		.ok()?;

	serde_json::from_slice::<RenewalGrant>(&bytes)
		.inspect_err(|e| obs::warn_renewal_failed(KIND, Some(status.as_u16()), e))
		.ok()
}
