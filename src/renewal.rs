//! Credential renewal coordinators.
//!
//! [`SharedRenewal`] serves long-lived session clients: any number of concurrent callers that
//! observe an authorization failure collapse into a single call to the renewal endpoint and
//! all observe its result. Refresh tokens rotate on use, so two independent renewals would
//! see the second one rejected and end a healthy session.
//!
//! [`ScopedRenewer`] serves request-scoped code: it presents the refresh token from the
//! request's [`CredentialStore`](crate::store::CredentialStore) and writes the rotated pair
//! back. Scoped renewals are independent unless the client opts into a process-wide
//! [`RenewalRegistry`], which deduplicates renewals presenting the same refresh token.

mod metrics;
mod registry;
mod scoped;
mod shared;
mod single_flight;

pub use metrics::RenewalMetrics;
pub use registry::RenewalRegistry;
pub use scoped::ScopedRenewer;
pub use shared::SharedRenewal;
pub use single_flight::SingleFlight;
