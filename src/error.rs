//! Client-level error types shared across executors, renewal coordinators, and stores.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Backend answered with a non-success status; carries the normalized descriptor.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, body streaming).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Successful response body did not match the expected shape.
	#[error("Response body from {url} could not be decoded.")]
	Decode {
		/// Requested URL.
		url: String,
		/// Structured parsing failure naming the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Encode(#[source] serde_json::Error),
	/// Caller aborted the request before it completed.
	#[error("Request was aborted by the caller.")]
	Aborted,
}
impl Error {
	/// Returns the structured API error, if this failure came from a backend response.
	pub fn as_api(&self) -> Option<&ApiError> {
		match self {
			Self::Api(api) => Some(api),
			_ => None,
		}
	}

	/// HTTP status carried by the failure, when the backend produced one.
	pub fn status(&self) -> Option<u16> {
		self.as_api().map(|api| api.status)
	}

	/// Returns `true` when the backend rejected the caller's credentials.
	///
	/// Upstream code treats this as "session ended" and routes the user back to login.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self.status(), Some(401 | 403))
	}
}

/// Normalized descriptor for a non-success backend response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
#[error("Backend request failed with status {status}: {message}.")]
pub struct ApiError {
	/// HTTP status code reported by the transport.
	pub status: u16,
	/// Human-readable failure message.
	pub message: String,
	/// ISO-8601 instant the failure was recorded.
	pub timestamp: String,
	/// Request path echoed by the backend, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	/// Field-level validation violations keyed by field name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub errors: Option<BTreeMap<String, String>>,
}
impl ApiError {
	/// Looks up the violation message reported for a single field.
	pub fn field_error(&self, field: &str) -> Option<&str> {
		self.errors.as_ref()?.get(field).map(String::as_str)
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL uses a scheme other than HTTP(S).
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Rejected URL.
		url: String,
	},
	/// Production deployments must talk to the backend over HTTPS.
	#[error("Base URL must use HTTPS in production: {url}.")]
	InsecureBaseUrl {
		/// Rejected URL.
		url: String,
	},
	/// Base URL carries a query string or fragment.
	#[error("Base URL must not carry a query or fragment: {url}.")]
	BaseUrlNotAPrefix {
		/// Rejected URL.
		url: String,
	},
	/// Auth endpoint paths must be absolute.
	#[error("The {endpoint} path must start with '/': {path}.")]
	InvalidEndpointPath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Rejected path.
		path: String,
	},
	/// Environment label could not be recognized.
	#[error("Unknown environment label `{label}`.")]
	UnknownEnvironment {
		/// Rejected label.
		label: String,
	},
	/// Required environment variable is not set.
	#[error("Environment variable {name} is not set.")]
	MissingVariable {
		/// Variable name.
		name: &'static str,
	},
	/// A URL could not be parsed.
	#[error("URL `{value}` is invalid.")]
	InvalidUrl {
		/// Rejected input.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Caller-supplied header could not be encoded.
	#[error("Header `{name}` has an invalid value.")]
	InvalidHeader {
		/// Header name.
		name: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Requested URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn api_error(status: u16) -> ApiError {
		ApiError {
			status,
			message: "Validation failed".into(),
			timestamp: "2026-01-01T00:00:00Z".into(),
			path: Some("/api/rentals".into()),
			errors: Some(BTreeMap::from([("pickupDate".into(), "must be in the future".into())])),
		}
	}

	#[test]
	fn api_error_is_distinguishable_from_transport_errors() {
		let err = Error::from(api_error(422));

		assert_eq!(err.status(), Some(422));
		assert!(!err.is_unauthorized());
		assert_eq!(
			err.as_api().and_then(|api| api.field_error("pickupDate")),
			Some("must be in the future")
		);

		let url = Url::parse("https://rental.example.com/api/cars")
			.expect("Fixture URL should parse successfully.");
		let transport = Error::from(TransportError::network(
			&url,
			std::io::Error::other("connection reset"),
		));

		assert!(transport.as_api().is_none());
		assert!(transport.to_string().contains("https://rental.example.com/api/cars"));
		assert!(StdError::source(&transport).is_some());
	}

	#[test]
	fn unauthorized_covers_both_auth_statuses() {
		assert!(Error::from(api_error(401)).is_unauthorized());
		assert!(Error::from(api_error(403)).is_unauthorized());
		assert!(!Error::Aborted.is_unauthorized());
	}

	#[test]
	fn api_error_serializes_without_absent_fields() {
		let mut err = api_error(500);

		err.path = None;
		err.errors = None;

		let payload = serde_json::to_value(&err).expect("ApiError should serialize to JSON.");

		assert_eq!(
			payload,
			serde_json::json!({
				"status": 500,
				"message": "Validation failed",
				"timestamp": "2026-01-01T00:00:00Z",
			})
		);
	}
}
