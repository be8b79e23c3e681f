//! Error normalization for non-success backend responses.

// crates.io
use reqwest::Response;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
// self
use crate::{_prelude::*, error::ApiError};

const GENERIC_MESSAGE: &str = "Request failed";

#[derive(Deserialize)]
struct ErrorBody {
	message: Option<String>,
	timestamp: Option<String>,
	path: Option<String>,
	errors: Option<BTreeMap<String, String>>,
}

/// Builds an [`ApiError`] from a non-success response. Never fails.
pub async fn parse_error_response(response: Response) -> ApiError {
	let status = response.status();
	let body = response.bytes().await.unwrap_or_default();

	normalize_error(status, &body)
}

/// Builds an [`ApiError`] from a status code and raw body bytes.
///
/// A JSON object body contributes `message`, `timestamp`, `path`, and `errors`; anything
/// else falls back to the status line.
pub fn normalize_error(status: StatusCode, body: &[u8]) -> ApiError {
	let status_text = status.canonical_reason().unwrap_or(GENERIC_MESSAGE);

	match parse_object(body) {
		Some(parsed) => ApiError {
			status: status.as_u16(),
			message: parsed.message.unwrap_or_else(|| status_text.to_owned()),
			timestamp: parsed.timestamp.unwrap_or_else(now_rfc3339),
			path: parsed.path,
			errors: parsed.errors,
		},
		None => ApiError {
			status: status.as_u16(),
			message: status_text.to_owned(),
			timestamp: now_rfc3339(),
			path: None,
			errors: None,
		},
	}
}

fn parse_object(body: &[u8]) -> Option<ErrorBody> {
	let object = serde_json::from_slice::<serde_json::Map<String, Value>>(body).ok()?;

	serde_json::from_value(Value::Object(object)).ok()
}

fn now_rfc3339() -> String {
	OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}
