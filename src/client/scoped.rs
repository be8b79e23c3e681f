//! Request-scoped executor that reads and rotates credentials through a [`CredentialStore`].

// self
use crate::{
	_prelude::*,
	client::{self, ApiClient, ApiFuture, RenewalBudget},
	config::ClientConfig,
	http::{self, ApiResponse, HttpClient, RequestOptions},
	obs::{self, CallSpan, ClientKind},
	renewal::{RenewalMetrics, RenewalRegistry, ScopedRenewer},
	store::{CookieCredentialStore, CredentialStore},
};

const KIND: ClientKind = ClientKind::Scoped;

/// Executor bound to one incoming request.
///
/// The access token is read from the store before every call and sent as a bearer header.
/// When it is missing, or the backend answers `401`/`403`, the call spends its single
/// renewal; a renewed token is written back to the store and used for one retry.
pub struct ScopedClient<S = CookieCredentialStore>
where
	S: ?Sized + CredentialStore,
{
	/// Validated configuration.
	pub config: Arc<ClientConfig>,
	/// Counters for renewal calls issued on behalf of this request.
	pub renewal_metrics: Arc<RenewalMetrics>,
	http: HttpClient,
	store: Arc<S>,
	renewer: ScopedRenewer<S>,
}
impl<S> ScopedClient<S>
where
	S: ?Sized + CredentialStore,
{
	/// Creates a client with its own cookie-less transport.
	pub fn new(config: ClientConfig, store: Arc<S>) -> Result<Self> {
		let http = HttpClient::without_cookies(&config)?;

		Self::with_http_client(Arc::new(config), http, store)
	}

	/// Creates a client over a shared transport and configuration.
	///
	/// Servers build one [`HttpClient`] at startup and a `ScopedClient` per incoming request.
	pub fn with_http_client(
		config: Arc<ClientConfig>,
		http: HttpClient,
		store: Arc<S>,
	) -> Result<Self> {
		let renewal_metrics = Arc::new(RenewalMetrics::default());
		let renewer = ScopedRenewer::new(
			http.clone(),
			config.renewal_url()?,
			Arc::clone(&store),
			Arc::clone(&renewal_metrics),
		);

		Ok(Self { config, renewal_metrics, http, store, renewer })
	}

	/// Shares renewals with other requests presenting the same refresh token.
	pub fn with_registry(mut self, registry: Arc<RenewalRegistry>) -> Self {
		self.renewer = self.renewer.with_registry(registry);

		self
	}

	/// Credential store for this request.
	pub fn store(&self) -> &Arc<S> {
		&self.store
	}

	/// Attempts a renewal outside of a call and returns whether it succeeded.
	pub async fn renew(&self) -> bool {
		self.renewer.try_renew().await.is_some()
	}

	async fn execute<T>(&self, target: &str, options: RequestOptions) -> Result<ApiResponse<T>>
	where
		T: DeserializeOwned,
	{
		let url = self.config.resolve(target)?;
		let span = CallSpan::request(KIND, &options.method, &options.tags);
		let guarded = self.config.is_auth_endpoint(&url);

		span.instrument(async {
			let mut budget = RenewalBudget::Available;
			let mut token = self.store.access_token();

			if token.is_none() && !guarded {
				budget = RenewalBudget::Spent;
				token = self.renewer.try_renew().await;
			}

			let response = self.http.send(&url, &options, token.as_ref()).await?;
			let response = if client::is_auth_failure(response.status())
				&& budget == RenewalBudget::Available
				&& !guarded
			{
				match self.renewer.try_renew().await {
					Some(renewed) => {
						obs::debug_retrying(KIND, &url);

						self.http.send(&url, &options, Some(&renewed)).await?
					},
					None => response,
				}
			} else {
				response
			};

			http::read_response(&url, response).await
		})
		.await
	}
}
impl<S> ApiClient for ScopedClient<S>
where
	S: ?Sized + CredentialStore,
{
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
impl<S> Debug for ScopedClient<S>
where
	S: ?Sized + CredentialStore,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ScopedClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("renewer", &self.renewer)
			.finish()
	}
}
