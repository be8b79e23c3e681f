//! Long-lived session executor whose credentials live in the transport's cookie jar.

// crates.io
use reqwest::cookie::Jar;
// self
use crate::{
	_prelude::*,
	auth::{ACCESS_TOKEN_TTL, CredentialPair, REFRESH_TOKEN_TTL},
	client::{self, ApiClient, ApiFuture, Attempt},
	config::ClientConfig,
	http::{self, ApiResponse, HttpClient, RequestOptions},
	obs::{self, CallSpan, ClientKind},
	renewal::{RenewalMetrics, SharedRenewal},
	store::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE},
};

const KIND: ClientKind = ClientKind::Session;

/// Executor for a long-lived client session.
///
/// Every call carries the session's cookies, so application code never handles the access
/// token. Clones share the cookie jar and the renewal coordinator: concurrent calls that are
/// rejected with `401` trigger exactly one renewal between them.
#[derive(Clone)]
pub struct SessionClient {
	/// Validated configuration.
	pub config: Arc<ClientConfig>,
	/// Counters for renewal calls issued by this session.
	pub renewal_metrics: Arc<RenewalMetrics>,
	http: HttpClient,
	jar: Arc<Jar>,
	renewal: Arc<SharedRenewal>,
}
impl SessionClient {
	/// Creates a session with an empty cookie jar.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let jar = Arc::new(Jar::default());
		let http = HttpClient::with_cookie_jar(&config, Arc::clone(&jar))?;

		Self::with_http_client(config, http, jar)
	}

	/// Creates a session over a caller-built transport.
	///
	/// `http` must have been built with `jar` as its cookie provider, otherwise credentials
	/// installed through this client never reach the backend.
	pub fn with_http_client(config: ClientConfig, http: HttpClient, jar: Arc<Jar>) -> Result<Self> {
		let renewal_url = config.renewal_url()?;
		let renewal_metrics = Arc::new(RenewalMetrics::default());
		let renewal =
			Arc::new(SharedRenewal::new(http.clone(), renewal_url, Arc::clone(&renewal_metrics)));

		Ok(Self { config: Arc::new(config), renewal_metrics, http, jar, renewal })
	}

	/// Cookie jar backing the session.
	pub fn jar(&self) -> &Arc<Jar> {
		&self.jar
	}

	/// Returns `true` while a renewal is running for this session.
	pub fn renewal_in_flight(&self) -> bool {
		self.renewal.in_flight()
	}

	/// Seeds the jar with a pair obtained at login.
	///
	/// The refresh cookie is scoped to the renewal endpoint so it never accompanies ordinary
	/// calls.
	pub fn install_credentials(&self, pair: &CredentialPair) {
		let base = &self.config.base_url;

		self.jar.add_cookie_str(
			&format!(
				"{ACCESS_TOKEN_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
				pair.access_token.expose(),
				ACCESS_TOKEN_TTL.whole_seconds(),
			),
			base,
		);
		self.jar.add_cookie_str(
			&format!(
				"{REFRESH_TOKEN_COOKIE}={}; Path={}; HttpOnly; SameSite=Lax; Max-Age={}",
				pair.refresh_token.expose(),
				self.refresh_cookie_path(),
				REFRESH_TOKEN_TTL.whole_seconds(),
			),
			base,
		);
	}

	/// Expires both credential cookies (logout).
	pub fn clear_credentials(&self) {
		let base = &self.config.base_url;

		self.jar.add_cookie_str(&format!("{ACCESS_TOKEN_COOKIE}=; Path=/; Max-Age=0"), base);
		self.jar.add_cookie_str(
			&format!("{REFRESH_TOKEN_COOKIE}=; Path={}; Max-Age=0", self.refresh_cookie_path()),
			base,
		);
	}

	/// Forces a renewal, joining one that is already running.
	pub async fn renew(&self) -> bool {
		self.renewal.ensure_renewed().await
	}

	fn refresh_cookie_path(&self) -> String {
		self.config.renewal_url().map(|url| url.path().to_owned()).unwrap_or_else(|_| "/".into())
	}

	async fn execute<T>(&self, target: &str, options: RequestOptions) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
	{
		let url = self.config.resolve(target)?;
		let span = CallSpan::request(KIND, &options.method, &options.tags);
		let guarded = self.config.is_auth_endpoint(&url);

		span.instrument(async {
			let mut attempt = Attempt::Initial;

			loop {
				let response = self.http.send(&url, &options, None).await?;

				if response.status() == StatusCode::UNAUTHORIZED
					&& attempt == Attempt::Initial
					&& !guarded
					&& self.renewal.ensure_renewed().await
				{
					obs::debug_retrying(KIND, &url);

					attempt = Attempt::Retry;

					continue;
				}

				return http::read_response(&url, response).await;
			}
		})
		.await
	}
}
impl ApiClient for SessionClient {
	fn request<'a, T>(&'a self, target: &'a str, mut options: RequestOptions) -> ApiFuture<'a, T>
	where
		T: 'a + DeserializeOwned + Send,
	{
		Box::pin(async move {
			let abort = options.take_abort();

			client::run_abortable(abort, self.execute(target, options)).await
		})
	}
}
impl Debug for SessionClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("renewal_in_flight", &self.renewal.in_flight())
			.finish()
	}
}
