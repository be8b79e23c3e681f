//! Per-client renewal counters.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Renewal endpoint calls issued by one client.
///
/// A session client owns one instance for its lifetime; a scoped client owns one per incoming
/// request. With a [`RenewalRegistry`](crate::renewal::RenewalRegistry), a shared exchange is
/// counted by the client that started it only.
#[derive(Debug, Default)]
pub struct RenewalMetrics {
	started: AtomicU64,
	renewed: AtomicU64,
	refused: AtomicU64,
}
impl RenewalMetrics {
	/// Calls made to the renewal endpoint.
	pub fn attempts(&self) -> u64 {
		self.started.load(Ordering::Relaxed)
	}

	/// Calls that rotated the credential pair.
	pub fn successes(&self) -> u64 {
		self.renewed.load(Ordering::Relaxed)
	}

	/// Calls the endpoint refused or the transport could not complete.
	pub fn failures(&self) -> u64 {
		self.refused.load(Ordering::Relaxed)
	}

	/// Calls that have started but not yet settled.
	///
	/// Drops back to zero once every renewal has finished, even if the callers that started
	/// them were cancelled.
	pub fn pending(&self) -> u64 {
		let started = self.attempts();
		let settled = self.successes() + self.failures();

		started.saturating_sub(settled)
	}

	pub(crate) fn record_attempt(&self) {
		self.started.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.renewed.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.refused.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn pending_tracks_unsettled_renewals() {
		let metrics = RenewalMetrics::default();

		metrics.record_attempt();
		metrics.record_attempt();
		metrics.record_success();

		assert_eq!(metrics.pending(), 1);

		metrics.record_failure();

		assert_eq!((metrics.attempts(), metrics.successes(), metrics.failures()), (2, 1, 1));
		assert_eq!(metrics.pending(), 0);
	}
}
