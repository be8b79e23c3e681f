//! Thread-safe in-memory [`CredentialStore`] for tools, background jobs, and tests.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, TokenSecret},
	store::CredentialStore,
};

#[derive(Clone, Debug, Default)]
struct Tokens {
	access: Option<TokenSecret>,
	refresh: Option<TokenSecret>,
}

/// Keeps the token pair in-process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore(RwLock<Tokens>);
impl MemoryCredentialStore {
	/// Creates a store holding a complete pair.
	pub fn new(pair: CredentialPair) -> Self {
		Self(RwLock::new(Tokens {
			access: Some(pair.access_token),
			refresh: Some(pair.refresh_token),
		}))
	}

	/// Creates a store from optional raw tokens.
	pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
		Self(RwLock::new(Tokens {
			access: access.map(TokenSecret::new),
			refresh: refresh.map(TokenSecret::new),
		}))
	}

	/// Returns the stored pair when both tokens are present.
	pub fn snapshot(&self) -> Option<CredentialPair> {
		let tokens = self.0.read();

		Some(CredentialPair {
			access_token: tokens.access.clone()?,
			refresh_token: tokens.refresh.clone()?,
		})
	}
}
impl CredentialStore for MemoryCredentialStore {
	fn access_token(&self) -> Option<TokenSecret> {
		self.0.read().access.clone()
	}

	fn refresh_token(&self) -> Option<TokenSecret> {
		self.0.read().refresh.clone()
	}

	fn install(&self, pair: &CredentialPair) {
		let mut tokens = self.0.write();

		tokens.access = Some(pair.access_token.clone());
		tokens.refresh = Some(pair.refresh_token.clone());
	}

	fn clear(&self) {
		*self.0.write() = Tokens::default();
	}
}
