//! Transport primitives shared by both executors.
//!
//! The module wraps the reqwest client in [`HttpClient`], describes a single call with
//! [`RequestOptions`], and turns raw responses into [`ApiResponse`] values or normalized
//! [`ApiError`](crate::error::ApiError)s through [`normalize`].

pub mod normalize;

pub use normalize::*;

// std
use std::ops::Deref;
// crates.io
use futures::future::AbortRegistration;
use reqwest::{
	Response,
	cookie::Jar,
	header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::ClientConfig,
	error::{ConfigError, TransportError},
};

const JSON: &str = "application/json";

/// Successful outcome of an authenticated call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiResponse<T> {
	/// Body decoded into the caller's expected shape.
	Content(T),
	/// The backend answered `204 No Content`.
	NoContent,
}
impl<T> ApiResponse<T> {
	/// Returns the decoded body, or `None` for `204 No Content`.
	pub fn into_option(self) -> Option<T> {
		match self {
			Self::Content(value) => Some(value),
			Self::NoContent => None,
		}
	}

	/// Returns `true` for `204 No Content`.
	pub fn is_no_content(&self) -> bool {
		matches!(self, Self::NoContent)
	}
}

/// Caching hint forwarded to the backend as `Cache-Control`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CachePolicy {
	#[default]
	/// Leave caching to the transport and backend defaults.
	Default,
	/// Always fetch a fresh response.
	NoStore,
	/// Accept a cached response up to the given age.
	Revalidate(Duration),
}
impl CachePolicy {
	fn header_value(self) -> Option<HeaderValue> {
		match self {
			Self::Default => None,
			Self::NoStore => Some(HeaderValue::from_static("no-store")),
			Self::Revalidate(age) =>
				HeaderValue::from_str(&format!("max-age={}", age.whole_seconds().max(0))).ok(),
		}
	}
}

/// Per-call parameters accepted by both executors.
///
/// The body is serialized once up front so a retried attempt resends identical bytes.
#[derive(Debug, Default)]
pub struct RequestOptions {
	/// HTTP method; defaults to `GET`.
	pub method: Method,
	/// Caller-supplied headers, applied after the JSON content type.
	pub headers: HeaderMap,
	/// Serialized JSON body.
	pub body: Option<Vec<u8>>,
	/// Caching hint.
	pub cache: CachePolicy,
	/// Labels recorded on the request span.
	pub tags: Vec<String>,
	abort: Option<AbortRegistration>,
}
impl RequestOptions {
	/// Creates options for the provided method.
	pub fn new(method: Method) -> Self {
		Self { method, ..Default::default() }
	}

	/// Serializes `body` as the JSON payload.
	pub fn with_json<B>(mut self, body: &B) -> Result<Self>
	where
		B: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body).map_err(Error::Encode)?);

		Ok(self)
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Adds or replaces a header from raw strings.
	pub fn try_header(self, name: &str, value: &str) -> Result<Self, ConfigError> {
		let invalid = || ConfigError::InvalidHeader { name: name.to_owned() };
		let header = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
		let value = HeaderValue::from_str(value).map_err(|_| invalid())?;

		Ok(self.with_header(header, value))
	}

	/// Sets the caching hint.
	pub fn with_cache(mut self, cache: CachePolicy) -> Self {
		self.cache = cache;

		self
	}

	/// Adds span labels.
	pub fn with_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tags.extend(tags.into_iter().map(Into::into));

		self
	}

	/// Lets the caller cancel this call through the paired
	/// [`AbortHandle`](futures::future::AbortHandle).
	pub fn with_abort(mut self, registration: AbortRegistration) -> Self {
		self.abort = Some(registration);

		self
	}

	pub(crate) fn take_abort(&mut self) -> Option<AbortRegistration> {
		self.abort.take()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug, Default)]
pub struct HttpClient(pub ReqwestClient);
impl HttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests always carry the cookies held in `jar`.
	pub fn with_cookie_jar(config: &ClientConfig, jar: Arc<Jar>) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder().cookie_provider(jar);

		if let Some(user_agent) = &config.user_agent {
			builder = builder.user_agent(user_agent);
		}

		builder.build().map(Self).map_err(ConfigError::http_client_build)
	}

	/// Builds a cookie-less client for request-scoped code.
	pub fn without_cookies(config: &ClientConfig) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder();

		if let Some(user_agent) = &config.user_agent {
			builder = builder.user_agent(user_agent);
		}

		builder.build().map(Self).map_err(ConfigError::http_client_build)
	}

	/// Issues one attempt of a call.
	pub(crate) async fn send(
		&self,
		url: &Url,
		options: &RequestOptions,
		bearer: Option<&TokenSecret>,
	) -> Result<Response> {
		let mut request = self
			.0
			.request(options.method.clone(), url.clone())
			.header(CONTENT_TYPE, JSON)
			.headers(options.headers.clone());

		if let Some(cache) = options.cache.header_value() {
			request = request.header(CACHE_CONTROL, cache);
		}
		if let Some(token) = bearer {
			request = request.header(AUTHORIZATION, token.bearer());
		}
		if let Some(body) = &options.body {
			request = request.body(body.clone());
		}

		request.send().await.map_err(|e| TransportError::network(url, e).into())
	}
}
impl AsRef<ReqwestClient> for HttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for HttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Converts the final response of a call into the caller's result.
pub(crate) async fn read_response<T>(url: &Url, response: Response) -> Result<ApiResponse<T>>
where
	T: DeserializeOwned,
{
	let status = response.status();

	if !status.is_success() {
		return Err(parse_error_response(response).await.into());
	}
	if status == StatusCode::NO_CONTENT {
		return Ok(ApiResponse::NoContent);
	}

	let bytes = response.bytes().await.map_err(|e| TransportError::network(url, e))?;

	decode_body(url, &bytes).map(ApiResponse::Content)
}

fn decode_body<T>(url: &Url, bytes: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let bytes = if bytes.iter().all(u8::is_ascii_whitespace) { b"null".as_slice() } else { bytes };
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::Decode { url: url.to_string(), source })
}
