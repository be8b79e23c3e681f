// self
use crate::{
	_prelude::*,
	config::{ClientConfig, DEFAULT_LOGIN_PATH, DEFAULT_RENEWAL_PATH, Environment},
	error::ConfigError,
};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Backend base URL.
	pub base_url: Url,
	/// Renewal endpoint path.
	pub renewal_path: String,
	/// Login endpoint path.
	pub login_path: String,
	/// Deployment environment.
	pub environment: Environment,
	/// Optional `User-Agent` header value.
	pub user_agent: Option<String>,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the provided base URL.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			renewal_path: DEFAULT_RENEWAL_PATH.into(),
			login_path: DEFAULT_LOGIN_PATH.into(),
			environment: Environment::default(),
			user_agent: None,
		}
	}

	/// Overrides the renewal endpoint path.
	pub fn renewal_path(mut self, path: impl Into<String>) -> Self {
		self.renewal_path = path.into();

		self
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Sets the deployment environment.
	pub fn environment(mut self, environment: Environment) -> Self {
		self.environment = environment;

		self
	}

	/// Sets the `User-Agent` header value.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			renewal_path: self.renewal_path,
			login_path: self.login_path,
			environment: self.environment,
			user_agent: self.user_agent,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		validate_base_url(&self.base_url, self.environment)?;
		validate_path("renewal", &self.renewal_path)?;
		validate_path("login", &self.login_path)?;

		Ok(())
	}
}

fn validate_base_url(url: &Url, environment: Environment) -> Result<(), ConfigError> {
	match url.scheme() {
		"https" => {},
		"http" if environment.is_development() || is_loopback(url) => {},
		"http" => return Err(ConfigError::InsecureBaseUrl { url: url.to_string() }),
		_ => return Err(ConfigError::UnsupportedScheme { url: url.to_string() }),
	}

	if url.query().is_some() || url.fragment().is_some() {
		return Err(ConfigError::BaseUrlNotAPrefix { url: url.to_string() });
	}

	Ok(())
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(url::Host::Domain(domain)) => domain == "localhost",
		Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
		Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	}
}

fn validate_path(endpoint: &'static str, path: &str) -> Result<(), ConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::InvalidEndpointPath { endpoint, path: path.to_owned() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse.")
	}

	#[test]
	fn production_rejects_plain_http_for_remote_hosts() {
		let err = ClientConfig::builder(url("http://rental.example.com"))
			.build()
			.expect_err("Plain HTTP should be rejected in production.");

		assert!(matches!(err, ConfigError::InsecureBaseUrl { .. }));

		ClientConfig::builder(url("http://127.0.0.1:8080"))
			.build()
			.expect("Loopback hosts may use plain HTTP.");
		ClientConfig::builder(url("http://rental.internal"))
			.environment(Environment::Development)
			.build()
			.expect("Development may use plain HTTP.");
	}

	#[test]
	fn builder_rejects_malformed_inputs() {
		let err = ClientConfig::builder(url("ftp://rental.example.com"))
			.build()
			.expect_err("Non-HTTP schemes should be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { .. }));

		let err = ClientConfig::builder(url("https://rental.example.com/?tenant=1"))
			.build()
			.expect_err("Base URLs with a query should be rejected.");

		assert!(matches!(err, ConfigError::BaseUrlNotAPrefix { .. }));

		let err = ClientConfig::builder(url("https://rental.example.com"))
			.renewal_path("auth/refresh")
			.build()
			.expect_err("Relative endpoint paths should be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpointPath { endpoint: "renewal", .. }));
	}
}
