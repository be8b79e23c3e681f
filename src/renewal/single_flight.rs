//! Keyed single-flight execution with shared results.

// std
use std::hash::Hash;
// crates.io
use futures::{
	FutureExt,
	future::{BoxFuture, Shared},
};
use tokio::runtime::Handle;
// self
use crate::_prelude::*;

type Flight<T> = Shared<BoxFuture<'static, T>>;
type Slots<K, T> = Arc<Mutex<HashMap<K, Flight<T>>>>;

/// Runs at most one operation per key at a time; concurrent callers share its result.
///
/// A key's slot is occupied for exactly as long as its operation is running: the operation
/// itself vacates the slot as it settles, before any waiter observes the result, so the next
/// caller after that starts a fresh operation.
///
/// Inside a Tokio runtime every operation is also spawned as a detached task, so it runs to
/// completion and vacates its slot even after all of its waiters were dropped. Outside a
/// runtime the operation only advances while some waiter polls it.
pub struct SingleFlight<K, T> {
	slots: Slots<K, T>,
}
impl<K, T> SingleFlight<K, T>
where
	K: 'static + Clone + Eq + Hash + Send,
	T: 'static + Clone + Send + Sync,
{
	/// Creates an empty coordinator.
	pub fn new() -> Self {
		Self { slots: Default::default() }
	}

	/// Returns `true` while an operation for `key` is running.
	pub fn in_flight(&self, key: &K) -> bool {
		self.slots.lock().contains_key(key)
	}

	/// Joins the running operation for `key`, or starts one with `start`.
	///
	/// `start` only builds the future; it runs under the slot lock and must not block.
	pub async fn run<F, Fut>(&self, key: K, start: F) -> T
	where
		F: FnOnce() -> Fut,
		Fut: 'static + Send + Future<Output = T>,
	{
		let flight = {
			let mut slots = self.slots.lock();

			match slots.get(&key) {
				Some(flight) => flight.clone(),
				None => {
					let flight = Self::settling(Arc::clone(&self.slots), key.clone(), start());

					slots.insert(key, flight.clone());

					if let Ok(runtime) = Handle::try_current() {
						runtime.spawn(flight.clone());
					}

					flight
				},
			}
		};

		flight.await
	}

	fn settling<Fut>(slots: Slots<K, T>, key: K, operation: Fut) -> Flight<T>
	where
		Fut: 'static + Send + Future<Output = T>,
	{
		async move {
			let output = operation.await;

			slots.lock().remove(&key);

			output
		}
		.boxed()
		.shared()
	}
}
impl<K, T> Default for SingleFlight<K, T>
where
	K: 'static + Clone + Eq + Hash + Send,
	T: 'static + Clone + Send + Sync,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K, T> Debug for SingleFlight<K, T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SingleFlight").field("in_flight", &self.slots.lock().len()).finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use futures::future::join_all;
	// self
	use super::*;

	fn counted(starts: &Arc<AtomicUsize>, value: u32) -> impl Future<Output = u32> + Send + 'static {
		starts.fetch_add(1, Ordering::SeqCst);

		async move {
			tokio::time::sleep(std::time::Duration::from_millis(50)).await;

			value
		}
	}

	#[tokio::test]
	async fn concurrent_callers_share_one_operation() {
		let flights = SingleFlight::<(), u32>::new();
		let starts = Arc::new(AtomicUsize::new(0));
		let starts_ref = &starts;
		let results =
			join_all((0..10).map(|i| flights.run((), move || counted(starts_ref, i)))).await;

		assert_eq!(starts.load(Ordering::SeqCst), 1);
		assert!(results.iter().all(|value| *value == 0));
		assert!(!flights.in_flight(&()));
	}

	#[tokio::test]
	async fn settled_slot_allows_a_fresh_operation() {
		let flights = SingleFlight::<(), u32>::new();
		let starts = Arc::new(AtomicUsize::new(0));

		assert_eq!(flights.run((), || counted(&starts, 1)).await, 1);
		assert_eq!(flights.run((), || counted(&starts, 2)).await, 2);
		assert_eq!(starts.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn keys_do_not_share_operations() {
		let flights = SingleFlight::<&'static str, u32>::new();
		let starts = Arc::new(AtomicUsize::new(0));
		let (a, b) = tokio::join!(
			flights.run("a", || counted(&starts, 1)),
			flights.run("b", || counted(&starts, 2))
		);

		assert_eq!((a, b), (1, 2));
		assert_eq!(starts.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn abandoned_operation_settles_without_waiters() {
		let flights = SingleFlight::<(), u32>::new();
		let starts = Arc::new(AtomicUsize::new(0));
		let finished = Arc::new(AtomicUsize::new(0));
		let finished_by_flight = Arc::clone(&finished);
		let abandoned = tokio::time::timeout(
			std::time::Duration::from_millis(5),
			flights.run((), || {
				let operation = counted(&starts, 7);

				async move {
					let value = operation.await;

					finished_by_flight.fetch_add(1, Ordering::SeqCst);

					value
				}
			}),
		)
		.await;

		assert!(abandoned.is_err());
		assert!(flights.in_flight(&()));

		tokio::time::sleep(std::time::Duration::from_millis(200)).await;

		assert_eq!(finished.load(Ordering::SeqCst), 1);
		assert!(!flights.in_flight(&()));
		assert_eq!(flights.run((), || counted(&starts, 8)).await, 8);
		assert_eq!(starts.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn operation_outside_a_runtime_is_driven_by_its_waiters() {
		let flights = SingleFlight::<(), u32>::new();
		let value = futures::executor::block_on(flights.run((), || async { 3 }));

		assert_eq!(value, 3);
		assert!(!flights.in_flight(&()));
	}
}
