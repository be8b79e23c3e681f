// crates.io
use reqwest::header::CONTENT_TYPE;
// self
use crate::{
	_prelude::*,
	http::HttpClient,
	obs::{self, CallSpan, ClientKind, RenewalOutcome},
	renewal::{RenewalMetrics, SingleFlight},
};

const KIND: ClientKind = ClientKind::Session;

/// Process-wide, deduplicating renewal coordinator for session clients.
///
/// The renewal call carries no body: the refresh cookie travels through the session's cookie
/// jar, and the backend rotates both cookies on success.
#[derive(Debug)]
pub struct SharedRenewal {
	http: HttpClient,
	renewal_url: Url,
	flights: SingleFlight<(), bool>,
	metrics: Arc<RenewalMetrics>,
}
impl SharedRenewal {
	/// Creates a coordinator that renews through `http` against `renewal_url`.
	pub fn new(http: HttpClient, renewal_url: Url, metrics: Arc<RenewalMetrics>) -> Self {
		Self { http, renewal_url, flights: SingleFlight::new(), metrics }
	}

	/// Returns `true` while a renewal is running.
	pub fn in_flight(&self) -> bool {
		self.flights.in_flight(&())
	}

	/// Renews the session's credentials, joining a renewal that is already running.
	///
	/// Resolves to `false` when the endpoint is unreachable or refuses the session; callers
	/// must then surface their original failure instead of retrying.
	pub async fn ensure_renewed(&self) -> bool {
		let http = self.http.clone();
		let url = self.renewal_url.clone();
		let metrics = Arc::clone(&self.metrics);

		self.flights.run((), move || renew_session(http, url, metrics)).await
	}
}

async fn renew_session(http: HttpClient, url: Url, metrics: Arc<RenewalMetrics>) -> bool {
	let span = CallSpan::renewal(KIND);

	metrics.record_attempt();
	obs::record_renewal_outcome(KIND, RenewalOutcome::Attempt);

	let renewed = span
		.instrument(async move {
			match http.post(url).header(CONTENT_TYPE, "application/json").send().await {
				Ok(response) if response.status().is_success() => true,
				Ok(response) => {
					let status = response.status();

					obs::warn_renewal_failed(KIND, Some(status.as_u16()), &status);

					false
				},
				Err(e) => {
					obs::warn_renewal_failed(KIND, None, &e);

					false
				},
			}
		})
		.await;

	if renewed {
		metrics.record_success();
		obs::record_renewal_outcome(KIND, RenewalOutcome::Success);
	} else {
		metrics.record_failure();
		obs::record_renewal_outcome(KIND, RenewalOutcome::Failure);
	}

	renewed
}
