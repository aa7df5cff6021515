use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use quill_events::{Disposable, EventEmitter};
use tracing::debug;
use url::Url;

use crate::types::{Diagnostic, DiagnosticSeverity};

struct Batch {
	/// Publication id; disposal removes exactly this batch.
	id: u64,
	diagnostics: Vec<Diagnostic>,
}

#[derive(Default)]
struct CollectionState {
	batches: HashMap<Url, Vec<Batch>>,
	next_id: u64,
}

/// Published diagnostics, grouped per resource.
///
/// Each [`add`](Self::add) publishes one batch and returns a
/// [`Disposable`] that retracts exactly that batch, leaving batches from
/// other publishers in place. Reads see the concatenation of all live
/// batches for a resource, in publication order.
#[derive(Default)]
pub struct DiagnosticsCollection {
	state: Arc<Mutex<CollectionState>>,
	changed: EventEmitter<Url>,
}

impl DiagnosticsCollection {
	/// Creates an empty collection.
	pub fn new() -> Self {
		Self::default()
	}

	/// Publishes a batch of diagnostics for `uri`.
	///
	/// The returned handle retracts the batch on disposal; disposing twice
	/// is a no-op. Subscribers of [`on_did_change`](Self::on_did_change)
	/// are notified on both publication and retraction.
	pub fn add(&self, uri: Url, diagnostics: Vec<Diagnostic>) -> Disposable {
		let id = {
			let mut state = self.state.lock();
			let id = state.next_id;
			state.next_id += 1;
			state.batches.entry(uri.clone()).or_default().push(Batch { id, diagnostics });
			id
		};
		debug!(uri = %uri, id, "published diagnostics batch");
		self.changed.emit(&uri);

		let state = Arc::downgrade(&self.state);
		let changed = self.changed.clone();
		Disposable::new(move || retract(&state, &changed, &uri, id))
	}

	/// Returns all live diagnostics for `uri`, in publication order.
	pub fn diagnostics_for(&self, uri: &Url) -> Vec<Diagnostic> {
		let state = self.state.lock();
		state
			.batches
			.get(uri)
			.into_iter()
			.flatten()
			.flat_map(|b| b.diagnostics.iter().cloned())
			.collect()
	}

	/// Returns the resources that currently carry diagnostics.
	pub fn resources(&self) -> Vec<Url> {
		self.state.lock().batches.keys().cloned().collect()
	}

	/// Counts live diagnostics for `uri` at exactly `severity`.
	pub fn severity_count(&self, uri: &Url, severity: DiagnosticSeverity) -> usize {
		let state = self.state.lock();
		state
			.batches
			.get(uri)
			.into_iter()
			.flatten()
			.flat_map(|b| b.diagnostics.iter())
			.filter(|d| d.severity == severity)
			.count()
	}

	/// Subscribes to resource-level change notifications.
	///
	/// The event carries the resource whose diagnostics changed, not the
	/// diagnostics themselves; read back via
	/// [`diagnostics_for`](Self::diagnostics_for).
	pub fn on_did_change(&self, listener: impl Fn(&Url) + Send + Sync + 'static) -> Disposable {
		self.changed.subscribe(listener)
	}
}

fn retract(state: &Weak<Mutex<CollectionState>>, changed: &EventEmitter<Url>, uri: &Url, id: u64) {
	let Some(state) = state.upgrade() else {
		return;
	};
	let removed = {
		let mut state = state.lock();
		let Some(batches) = state.batches.get_mut(uri) else {
			return;
		};
		let before = batches.len();
		batches.retain(|b| b.id != id);
		let removed = batches.len() != before;
		if batches.is_empty() {
			state.batches.remove(uri);
		}
		removed
	};
	if removed {
		debug!(uri = %uri, id, "retracted diagnostics batch");
		changed.emit(uri);
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use quill_primitives::Range;

	use super::*;

	fn uri() -> Url {
		Url::parse("file:///a/lib.rs").unwrap()
	}

	fn error(message: &str) -> Diagnostic {
		Diagnostic::error(Range::from_coords(0, 0, 0, 1), message)
	}

	fn warning(message: &str) -> Diagnostic {
		Diagnostic::warning(Range::from_coords(1, 0, 1, 1), message)
	}

	#[test]
	fn test_batches_concatenate_in_publication_order() {
		let collection = DiagnosticsCollection::new();

		let _a = collection.add(uri(), vec![error("first")]);
		let _b = collection.add(uri(), vec![error("second"), warning("third")]);

		let all = collection.diagnostics_for(&uri());
		let messages: Vec<&str> = all.iter().map(|d| d.message.as_str()).collect();
		assert_eq!(messages, vec!["first", "second", "third"]);
	}

	#[test]
	fn test_dispose_retracts_only_that_batch() {
		let collection = DiagnosticsCollection::new();

		let _keep = collection.add(uri(), vec![error("kept")]);
		let dropped = collection.add(uri(), vec![error("dropped")]);

		dropped.dispose();
		dropped.dispose();

		let remaining = collection.diagnostics_for(&uri());
		assert_eq!(remaining.len(), 1);
		assert_eq!(remaining[0].message, "kept");
	}

	#[test]
	fn test_empty_resource_is_forgotten() {
		let collection = DiagnosticsCollection::new();

		let batch = collection.add(uri(), vec![error("only")]);
		assert_eq!(collection.resources(), vec![uri()]);

		batch.dispose();
		assert!(collection.resources().is_empty());
		assert!(collection.diagnostics_for(&uri()).is_empty());
	}

	#[test]
	fn test_severity_count_filters_exactly() {
		let collection = DiagnosticsCollection::new();

		let _batch = collection.add(uri(), vec![error("e1"), error("e2"), warning("w1")]);

		assert_eq!(collection.severity_count(&uri(), DiagnosticSeverity::Error), 2);
		assert_eq!(collection.severity_count(&uri(), DiagnosticSeverity::Warning), 1);
		assert_eq!(collection.severity_count(&uri(), DiagnosticSeverity::Hint), 0);
	}

	#[test]
	fn test_change_event_fires_on_publish_and_retract() {
		let collection = DiagnosticsCollection::new();
		let count = Arc::new(AtomicUsize::new(0));

		let seen = count.clone();
		let _sub = collection.on_did_change(move |changed| {
			assert_eq!(*changed, uri());
			seen.fetch_add(1, Ordering::SeqCst);
		});

		let batch = collection.add(uri(), vec![error("x")]);
		batch.dispose();
		batch.dispose();

		assert_eq!(count.load(Ordering::SeqCst), 2);
	}
}
