// self
use crate::{_prelude::*, obs::ClientKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by executors and renewal coordinators.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a span for one executor call.
	pub fn request(kind: ClientKind, method: &Method, tags: &[String]) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"rental_api.request",
				client = kind.as_str(),
				method = method.as_str(),
				tags = ?tags,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, method, tags);

			Self {}
		}
	}

	/// Creates a span for one renewal network call.
	pub fn renewal(kind: ClientKind) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("rental_api.renewal", client = kind.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = kind;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a renewal the endpoint refused or the transport could not complete.
///
/// Only the status or transport error is logged; token material never is.
pub fn warn_renewal_failed(kind: ClientKind, status: Option<u16>, reason: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(client = kind.as_str(), status, %reason, "credential renewal failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, status, reason);
	}
}

/// Logs that a call is being retried after a successful renewal.
pub fn debug_retrying(kind: ClientKind, url: &Url) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(client = kind.as_str(), %url, "retrying call with renewed credentials");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, url);
	}
}
