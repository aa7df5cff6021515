use std::sync::Arc;

use parking_lot::Mutex;

type DisposeFn = Box<dyn FnOnce() + Send>;

/// A one-shot, idempotent resource-release handle.
///
/// A disposable has exactly two states, active and disposed. The first
/// [`dispose`](Self::dispose) call runs the release callback and transitions
/// to disposed; subsequent calls are no-ops. There is no transition back.
pub struct Disposable {
	callback: Arc<Mutex<Option<DisposeFn>>>,
}

impl std::fmt::Debug for Disposable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Disposable").field("disposed", &self.is_disposed()).finish()
	}
}

impl Disposable {
	/// Creates a disposable that runs `callback` on first disposal.
	pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
		Self {
			callback: Arc::new(Mutex::new(Some(Box::new(callback)))),
		}
	}

	/// Creates an already-spent disposable whose disposal does nothing.
	pub fn noop() -> Self {
		Self {
			callback: Arc::new(Mutex::new(None)),
		}
	}

	/// Combines many disposables into one.
	///
	/// The aggregate forwards its first disposal to every child and clears
	/// them, so the group as a whole keeps the idempotence invariant.
	pub fn join(disposables: impl IntoIterator<Item = Disposable>) -> Self {
		let children: Vec<Disposable> = disposables.into_iter().collect();
		Self::new(move || {
			for child in children {
				child.dispose();
			}
		})
	}

	/// Releases the underlying resource. Safe to call more than once.
	pub fn dispose(&self) {
		let callback = self.callback.lock().take();
		if let Some(callback) = callback {
			callback();
		}
	}

	/// Returns true once the handle has been disposed.
	pub fn is_disposed(&self) -> bool {
		self.callback.lock().is_none()
	}
}

/// Aggregates disposables for release together at consumer teardown.
///
/// Dropping the bag disposes everything still held.
#[derive(Default)]
pub struct DisposableBag {
	items: Mutex<Vec<Disposable>>,
}

impl DisposableBag {
	/// Creates an empty bag.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a disposable to the bag.
	pub fn push(&self, disposable: Disposable) {
		self.items.lock().push(disposable);
	}

	/// Returns the number of held disposables.
	pub fn len(&self) -> usize {
		self.items.lock().len()
	}

	/// Returns true if nothing is held.
	pub fn is_empty(&self) -> bool {
		self.items.lock().is_empty()
	}

	/// Disposes and drops everything held. Safe to call more than once.
	pub fn dispose_all(&self) {
		let items = std::mem::take(&mut *self.items.lock());
		for item in items {
			item.dispose();
		}
	}
}

impl Drop for DisposableBag {
	fn drop(&mut self) {
		self.dispose_all();
	}
}
