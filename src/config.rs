//! Client configuration: backend base URL, auth endpoint paths, and deployment environment.
//!
//! A [`ClientConfig`] is assembled through [`ClientConfigBuilder`] (or read from the process
//! environment with [`ClientConfig::from_env`]) and validated once, so executors can resolve
//! targets and apply the renewal recursion guard without re-checking invariants.

/// Builder API for assembling validated configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Default path of the credential renewal endpoint.
pub const DEFAULT_RENEWAL_PATH: &str = "/api/auth/refresh";
/// Default path of the login endpoint.
pub const DEFAULT_LOGIN_PATH: &str = "/api/auth/login";

/// Deployment environment; decides whether credential cookies carry the `Secure` attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	/// Local development over plain HTTP.
	Development,
	#[default]
	/// Any deployed environment.
	Production,
}
impl Environment {
	/// Parses a deployment label such as `development` or `prod`.
	pub fn from_label(label: &str) -> Result<Self, ConfigError> {
		match label.trim().to_ascii_lowercase().as_str() {
			"development" | "dev" | "local" => Ok(Self::Development),
			"production" | "prod" => Ok(Self::Production),
			_ => Err(ConfigError::UnknownEnvironment { label: label.to_owned() }),
		}
	}

	/// Returns `true` for local development.
	pub const fn is_development(self) -> bool {
		matches!(self, Self::Development)
	}

	/// Whether credential cookies must be restricted to HTTPS.
	pub const fn secure_cookies(self) -> bool {
		!self.is_development()
	}
}

/// Validated client configuration shared by every executor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Backend base URL; request targets are appended to it.
	pub base_url: Url,
	/// Path of the credential renewal endpoint.
	pub renewal_path: String,
	/// Path of the login endpoint.
	pub login_path: String,
	/// Deployment environment.
	pub environment: Environment,
	/// Optional `User-Agent` sent with every call.
	pub user_agent: Option<String>,
}
impl ClientConfig {
	/// Variable holding the backend base URL.
	pub const ENV_BASE_URL: &'static str = "RENTAL_API_BASE_URL";
	/// Variable holding the deployment label.
	pub const ENV_ENVIRONMENT: &'static str = "RENTAL_API_ENV";
	/// Variable overriding the renewal endpoint path.
	pub const ENV_RENEWAL_PATH: &'static str = "RENTAL_API_RENEWAL_PATH";
	/// Variable overriding the login endpoint path.
	pub const ENV_LOGIN_PATH: &'static str = "RENTAL_API_LOGIN_PATH";

	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Reads the configuration from `RENTAL_API_*` process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Builds the configuration from an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let raw = lookup(Self::ENV_BASE_URL)
			.ok_or(ConfigError::MissingVariable { name: Self::ENV_BASE_URL })?;
		let base_url = Url::parse(&raw)
			.map_err(|source| ConfigError::InvalidUrl { value: raw.clone(), source })?;
		let mut builder = Self::builder(base_url);

		if let Some(label) = lookup(Self::ENV_ENVIRONMENT) {
			builder = builder.environment(Environment::from_label(&label)?);
		}
		if let Some(path) = lookup(Self::ENV_RENEWAL_PATH) {
			builder = builder.renewal_path(path);
		}
		if let Some(path) = lookup(Self::ENV_LOGIN_PATH) {
			builder = builder.login_path(path);
		}

		builder.build()
	}

	/// Resolves a request target against the base URL.
	///
	/// Absolute `http(s)://` targets are used as-is; anything else is appended to the base
	/// URL's path.
	pub fn resolve(&self, target: &str) -> Result<Url, ConfigError> {
		if target.starts_with("http://") || target.starts_with("https://") {
			return Url::parse(target)
				.map_err(|source| ConfigError::InvalidUrl { value: target.to_owned(), source });
		}

		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if target.starts_with('/') {
			format!("{base}{target}")
		} else {
			format!("{base}/{target}")
		};

		Url::parse(&joined).map_err(|source| ConfigError::InvalidUrl { value: joined, source })
	}

	/// Absolute URL of the renewal endpoint.
	pub fn renewal_url(&self) -> Result<Url, ConfigError> {
		self.resolve(&self.renewal_path)
	}

	/// Returns `true` when `url` targets the renewal or login endpoint.
	///
	/// Authorization failures from these endpoints never trigger a renewal.
	pub fn is_auth_endpoint(&self, url: &Url) -> bool {
		[&self.renewal_path, &self.login_path].into_iter().any(|path| {
			self.resolve(path).is_ok_and(|auth| {
				auth.origin() == url.origin()
					&& auth.path().trim_end_matches('/') == url.path().trim_end_matches('/')
			})
		})
	}
}
