use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::disposable::Disposable;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registered<T> {
	id: u64,
	listener: Listener<T>,
}

struct EmitterState<T> {
	listeners: Vec<Registered<T>>,
	next_id: u64,
}

/// A typed event with multiple subscribers.
///
/// Listeners are invoked synchronously in subscription order against a
/// snapshot of the current subscriber list, so unsubscribing during a
/// dispatch is safe. A panicking listener is isolated and logged; later
/// listeners still run.
pub struct EventEmitter<T> {
	state: Arc<Mutex<EmitterState<T>>>,
}

impl<T> Default for EventEmitter<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> Clone for EventEmitter<T> {
	fn clone(&self) -> Self {
		Self { state: self.state.clone() }
	}
}

impl<T> EventEmitter<T> {
	/// Creates an emitter with no subscribers.
	pub fn new() -> Self {
		Self {
			state: Arc::new(Mutex::new(EmitterState { listeners: Vec::new(), next_id: 0 })),
		}
	}

	/// Subscribes a listener, returning the handle that removes it.
	///
	/// Disposal removes exactly this subscription and no other; disposing
	/// twice is a no-op.
	pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Disposable
	where
		T: 'static,
	{
		let id = {
			let mut state = self.state.lock();
			let id = state.next_id;
			state.next_id += 1;
			state.listeners.push(Registered { id, listener: Arc::new(listener) });
			id
		};

		let state = Arc::downgrade(&self.state);
		Disposable::new(move || {
			if let Some(state) = state.upgrade() {
				state.lock().listeners.retain(|r| r.id != id);
			}
		})
	}

	/// Returns the number of live subscriptions.
	pub fn listener_count(&self) -> usize {
		self.state.lock().listeners.len()
	}

	/// Invokes all current listeners with `event`.
	pub fn emit(&self, event: &T) {
		let snapshot: Vec<Listener<T>> = self.state.lock().listeners.iter().map(|r| r.listener.clone()).collect();
		for listener in snapshot {
			if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
				warn!("event listener panicked; continuing with remaining listeners");
			}
		}
	}
}
