//! Authenticated request executors and the typed convenience API they share.
//!
//! Both executors follow the same state machine: an initial attempt, at most one renewal when
//! the backend rejects the credential, at most one retry, and normalization of whatever
//! response is final. [`SessionClient`] renews through the shared, deduplicating coordinator
//! and keeps credentials in its cookie jar; [`ScopedClient`] renews per request and attaches
//! the access token from a [`CredentialStore`](crate::store::CredentialStore) as a bearer
//! header.

pub mod scoped;
pub mod session;

pub use scoped::ScopedClient;
pub use session::SessionClient;

// crates.io
use futures::future::{AbortRegistration, Abortable};
// self
use crate::{
	_prelude::*,
	http::{ApiResponse, RequestOptions},
};

/// Boxed future returned by [`ApiClient`] calls.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<ApiResponse<T>>> + 'a + Send>>;

/// Which attempt of a call is being issued. A call never goes past [`Attempt::Retry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attempt {
	/// First attempt with the credentials currently held.
	Initial,
	/// Single retry after a successful renewal.
	Retry,
}

/// Whether a call may still spend its single renewal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenewalBudget {
	/// No renewal has been attempted for this call.
	Available,
	/// The call already attempted its renewal, successful or not.
	Spent,
}

/// Typed request API shared by both executors.
///
/// Response bodies are decoded into the caller's type without further validation; the type
/// is a contract with the backend, not an enforced schema.
pub trait ApiClient
where
	Self: Send + Sync,
{
	/// Issues a call to `target` (a path appended to the base URL, or an absolute URL).
	fn request<'a, T>(&'a self, target: &'a str, options: RequestOptions) -> ApiFuture<'a, T>
	where
		T: 'a + DeserializeOwned + Send;

	/// `GET target`.
	fn get<'a, T>(&'a self, target: &'a str) -> ApiFuture<'a, T>
	where
		T: 'a + DeserializeOwned + Send,
	{
		self.request(target, RequestOptions::new(Method::GET))
	}

	/// `POST target` with a JSON body.
	fn post<'a, T, B>(&'a self, target: &'a str, body: &B) -> ApiFuture<'a, T>
	where
		T: 'a + DeserializeOwned + Send,
		B: ?Sized + Serialize,
	{
		self.request_with_body(target, Method::POST, body)
	}

	/// `PUT target` with a JSON body.
	fn put<'a, T, B>(&'a self, target: &'a str, body: &B) -> ApiFuture<'a, T>
	where
		T: 'a + DeserializeOwned + Send,
		B: ?Sized + Serialize,
	{
		self.request_with_body(target, Method::PUT, body)
	}

	/// `PATCH target` with a JSON body.
	fn patch<'a, T, B>(&'a self, target: &'a str, body: &B) -> ApiFuture<'a, T>
	where
		T: 'a + DeserializeOwned + Send,
		B: ?Sized + Serialize,
	{
		self.request_with_body(target, Method::PATCH, body)
	}

	/// `DELETE target`.
	fn delete<'a, T>(&'a self, target: &'a str) -> ApiFuture<'a, T>
	where
		T: 'a + DeserializeOwned + Send,
	{
		self.request(target, RequestOptions::new(Method::DELETE))
	}

	/// Serializes `body` and issues the call; serialization failures never reach the network.
	fn request_with_body<'a, T, B>(
		&'a self,
		target: &'a str,
		method: Method,
		body: &B,
	) -> ApiFuture<'a, T>
	where
		T: 'a + DeserializeOwned + Send,
		B: ?Sized + Serialize,
	{
		match RequestOptions::new(method).with_json(body) {
			Ok(options) => self.request(target, options),
			Err(e) => Box::pin(async move { Err(e) }),
		}
	}
}

/// Returns `true` for statuses that mean the backend rejected the credential.
pub(crate) fn is_auth_failure(status: StatusCode) -> bool {
	matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Runs `call`, resolving to [`Error::Aborted`] once the paired handle fires.
pub(crate) async fn run_abortable<F, T>(abort: Option<AbortRegistration>, call: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	match abort {
		Some(registration) => Abortable::new(call, registration).await.map_err(|_| Error::Aborted)?,
		None => call.await,
	}
}
