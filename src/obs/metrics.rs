// self
use crate::obs::{ClientKind, RenewalOutcome};

/// Counter incremented once per renewal attempt and once more when it settles.
pub const RENEWAL_COUNTER: &str = "rental_api_renewal_total";

/// Reports a renewal step to the installed `metrics` recorder.
///
/// Without the `metrics` feature this compiles to nothing; [`RenewalMetrics`] keeps counting
/// either way.
///
/// [`RenewalMetrics`]: crate::renewal::RenewalMetrics
pub fn record_renewal_outcome(kind: ClientKind, outcome: RenewalOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(RENEWAL_COUNTER, "client" => kind.as_str(), "outcome" => outcome.as_str())
			.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn every_outcome_is_reportable_without_a_recorder() {
		for kind in [ClientKind::Session, ClientKind::Scoped] {
			for outcome in [RenewalOutcome::Attempt, RenewalOutcome::Success, RenewalOutcome::Failure]
			{
				record_renewal_outcome(kind, outcome);
			}
		}

		assert_eq!(RENEWAL_COUNTER, "rental_api_renewal_total");
	}
}
