//! Optional observability helpers for executors and renewal coordinators.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit spans named `rental_api.request` (fields `client`,
//!   `method`, `tags`) and `rental_api.renewal` (field `client`), plus `warn` events when a
//!   renewal fails.
//! - Enable `metrics` to increment the `rental_api_renewal_total` counter for every
//!   attempt/success/failure, labeled by `client` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Executor flavors observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientKind {
	/// Long-lived session client with a shared, deduplicating renewal coordinator.
	Session,
	/// Request-scoped client with per-request renewal.
	Scoped,
}
impl ClientKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ClientKind::Session => "session",
			ClientKind::Scoped => "scoped",
		}
	}
}
impl Display for ClientKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each renewal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenewalOutcome {
	/// A network call to the renewal endpoint was started.
	Attempt,
	/// The endpoint issued a new credential pair.
	Success,
	/// The endpoint was unreachable or refused the refresh token.
	Failure,
}
impl RenewalOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RenewalOutcome::Attempt => "attempt",
			RenewalOutcome::Success => "success",
			RenewalOutcome::Failure => "failure",
		}
	}
}
impl Display for RenewalOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
