//! Request-scoped [`CredentialStore`] backed by the incoming request's cookies.
//!
//! The store is seeded from the request's `Cookie` header and records every change so the
//! embedding server can emit them as `Set-Cookie` headers on its response.

// crates.io
use cookie::{Cookie, CookieJar, SameSite};
// self
use crate::{
	_prelude::*,
	auth::{ACCESS_TOKEN_TTL, CredentialPair, REFRESH_TOKEN_TTL, TokenSecret},
	config::Environment,
	store::{ACCESS_TOKEN_COOKIE, CredentialStore, REFRESH_TOKEN_COOKIE},
};

/// Cookie jar accessor for one incoming request.
#[derive(Debug)]
pub struct CookieCredentialStore {
	jar: Mutex<CookieJar>,
	environment: Environment,
}
impl CookieCredentialStore {
	/// Wraps an existing jar (original cookies should already be registered).
	pub fn new(jar: CookieJar, environment: Environment) -> Self {
		Self { jar: Mutex::new(jar), environment }
	}

	/// Seeds a jar from a raw `Cookie` request header; malformed pairs are skipped.
	pub fn from_cookie_header(header: &str, environment: Environment) -> Self {
		let mut jar = CookieJar::new();

		for cookie in Cookie::split_parse(header.to_owned()).flatten() {
			jar.add_original(cookie.into_owned());
		}

		Self::new(jar, environment)
	}

	/// Returns the pending `Set-Cookie` header values produced by renewals and logouts.
	pub fn set_cookie_headers(&self) -> Vec<String> {
		self.jar.lock().delta().map(ToString::to_string).collect()
	}

	/// Consumes the store and hands back the underlying jar.
	pub fn into_jar(self) -> CookieJar {
		self.jar.into_inner()
	}

	fn read(&self, name: &str) -> Option<TokenSecret> {
		self.jar
			.lock()
			.get(name)
			.and_then(|cookie| TokenSecret::from_cookie_value(cookie.value()))
	}

	fn credential_cookie(
		&self,
		name: &'static str,
		value: String,
		ttl: Duration,
	) -> Cookie<'static> {
		Cookie::build((name, value))
			.http_only(true)
			.secure(self.environment.secure_cookies())
			.same_site(SameSite::Lax)
			.path("/")
			.max_age(ttl)
			.build()
	}
}
impl CredentialStore for CookieCredentialStore {
	fn access_token(&self) -> Option<TokenSecret> {
		self.read(ACCESS_TOKEN_COOKIE)
	}

	fn refresh_token(&self) -> Option<TokenSecret> {
		self.read(REFRESH_TOKEN_COOKIE)
	}

	fn install(&self, pair: &CredentialPair) {
		let access = self.credential_cookie(
			ACCESS_TOKEN_COOKIE,
			pair.access_token.expose().to_owned(),
			ACCESS_TOKEN_TTL,
		);
		let refresh = self.credential_cookie(
			REFRESH_TOKEN_COOKIE,
			pair.refresh_token.expose().to_owned(),
			REFRESH_TOKEN_TTL,
		);
		let mut jar = self.jar.lock();

		jar.add(access);
		jar.add(refresh);
	}

	fn clear(&self) {
		let mut jar = self.jar.lock();

		for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
			jar.remove(Cookie::build(name).path("/").build());
		}
	}
}
