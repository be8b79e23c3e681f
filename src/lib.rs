//! Authenticated HTTP access layer for the rental platform: typed request executors that renew
//! an expired access credential once, share that renewal across concurrent callers, and surface
//! backend failures as structured API errors.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod renewal;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{ScopedClient, SessionClient},
		config::{ClientConfig, Environment},
		renewal::RenewalRegistry,
		store::MemoryCredentialStore,
	};

	/// Builds a development-mode configuration pointing at a mock backend base URL.
	pub fn test_config(base_url: &str) -> ClientConfig {
		ClientConfig::builder(
			Url::parse(base_url).expect("Mock backend base URL should parse successfully."),
		)
		.environment(Environment::Development)
		.build()
		.expect("Test client configuration should build successfully.")
	}

	/// Constructs a [`SessionClient`] against the provided mock backend.
	pub fn build_test_session_client(base_url: &str) -> SessionClient {
		SessionClient::new(test_config(base_url))
			.expect("Session client should build for integration tests.")
	}

	/// Constructs a [`ScopedClient`] backed by an in-memory credential store seeded with the
	/// provided tokens.
	pub fn build_test_scoped_client(
		base_url: &str,
		access_token: Option<&str>,
		refresh_token: Option<&str>,
	) -> (ScopedClient<MemoryCredentialStore>, Arc<MemoryCredentialStore>) {
		let store = Arc::new(MemoryCredentialStore::with_tokens(access_token, refresh_token));
		let client = ScopedClient::new(test_config(base_url), store.clone())
			.expect("Scoped client should build for integration tests.");

		(client, store)
	}

	/// Same as [`build_test_scoped_client`] but routes renewals through a shared registry.
	pub fn build_test_scoped_client_with_registry(
		base_url: &str,
		access_token: Option<&str>,
		refresh_token: Option<&str>,
		registry: Arc<RenewalRegistry>,
	) -> (ScopedClient<MemoryCredentialStore>, Arc<MemoryCredentialStore>) {
		let (client, store) = build_test_scoped_client(base_url, access_token, refresh_token);

		(client.with_registry(registry), store)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Method, StatusCode};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
