//! Credential store contracts and built-in implementations for request-scoped code.
//!
//! Session clients keep credentials inside their transport's cookie jar and never read them
//! back; request-scoped clients read the access token explicitly before each call and write
//! rotated pairs back through a [`CredentialStore`].

pub mod jar;
pub mod memory;

pub use jar::CookieCredentialStore;
pub use memory::MemoryCredentialStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
};

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Read/write accessor for the token pair of one execution context.
///
/// Implementations are shared by every call made on behalf of a single incoming request, so
/// they rely on interior mutability and must tolerate concurrent readers.
pub trait CredentialStore
where
	Self: 'static + Send + Sync,
{
	/// Returns the current access token, if any.
	fn access_token(&self) -> Option<TokenSecret>;

	/// Returns the current refresh token, if any.
	fn refresh_token(&self) -> Option<TokenSecret>;

	/// Replaces both tokens with a freshly rotated pair.
	fn install(&self, pair: &CredentialPair);

	/// Drops both tokens (logout).
	fn clear(&self);
}
impl<S> CredentialStore for Arc<S>
where
	S: ?Sized + CredentialStore,
{
	fn access_token(&self) -> Option<TokenSecret> {
		(**self).access_token()
	}

	fn refresh_token(&self) -> Option<TokenSecret> {
		(**self).refresh_token()
	}

	fn install(&self, pair: &CredentialPair) {
		(**self).install(pair)
	}

	fn clear(&self) {
		(**self).clear()
	}
}
