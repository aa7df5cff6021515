use std::path::Path;
use std::sync::{Arc, Weak};

use globset::{Glob, GlobMatcher};
use parking_lot::Mutex;
use quill_events::{Disposable, EventEmitter};
use tracing::{debug, trace};
use url::Url;

use crate::{Error, Result};

/// What happened to a watched resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
	/// The resource appeared.
	Created,
	/// The resource's content changed.
	Changed,
	/// The resource disappeared.
	Deleted,
}

struct WatcherShared {
	matcher: GlobMatcher,
	ignore_create: bool,
	ignore_change: bool,
	ignore_delete: bool,
	created: EventEmitter<Url>,
	changed: EventEmitter<Url>,
	deleted: EventEmitter<Url>,
}

impl WatcherShared {
	fn deliver(&self, kind: FileEventKind, uri: &Url) {
		if !self.matcher.is_match(Path::new(uri.path())) {
			return;
		}
		match kind {
			FileEventKind::Created if !self.ignore_create => self.created.emit(uri),
			FileEventKind::Changed if !self.ignore_change => self.changed.emit(uri),
			FileEventKind::Deleted if !self.ignore_delete => self.deleted.emit(uri),
			_ => {}
		}
	}
}

#[derive(Default)]
struct SetState {
	watchers: Vec<(u64, Arc<WatcherShared>)>,
	next_id: u64,
}

/// Routes host-fed file events to glob-scoped watchers.
///
/// The host owns the actual filesystem monitoring and calls
/// [`notify`](Self::notify) with every observed event; the set fans each
/// event out to the live watchers whose glob matches the path.
#[derive(Default)]
pub struct WatcherSet {
	state: Arc<Mutex<SetState>>,
}

impl WatcherSet {
	/// Creates a set with no watchers.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a watcher for paths matching `glob`.
	///
	/// The `ignore_*` flags suppress the corresponding event kind for this
	/// watcher only. Dispose the watcher to detach it from the set.
	pub fn create(&self, glob: &str, ignore_create: bool, ignore_change: bool, ignore_delete: bool) -> Result<FileSystemWatcher> {
		let matcher = Glob::new(glob)
			.map_err(|source| Error::InvalidPattern {
				pattern: glob.to_string(),
				source,
			})?
			.compile_matcher();
		let shared = Arc::new(WatcherShared {
			matcher,
			ignore_create,
			ignore_change,
			ignore_delete,
			created: EventEmitter::new(),
			changed: EventEmitter::new(),
			deleted: EventEmitter::new(),
		});

		let id = {
			let mut state = self.state.lock();
			let id = state.next_id;
			state.next_id += 1;
			state.watchers.push((id, shared.clone()));
			id
		};
		debug!(glob, id, "created file watcher");

		let state = Arc::downgrade(&self.state);
		Ok(FileSystemWatcher {
			shared,
			detach: Disposable::new(move || detach(&state, id)),
		})
	}

	/// Returns the number of live watchers.
	pub fn watcher_count(&self) -> usize {
		self.state.lock().watchers.len()
	}

	/// Fans a file event out to every matching watcher.
	pub fn notify(&self, kind: FileEventKind, uri: &Url) {
		trace!(?kind, uri = %uri, "file event");
		let watchers: Vec<Arc<WatcherShared>> = self.state.lock().watchers.iter().map(|(_, w)| w.clone()).collect();
		for watcher in watchers {
			watcher.deliver(kind, uri);
		}
	}
}

fn detach(state: &Weak<Mutex<SetState>>, id: u64) {
	if let Some(state) = state.upgrade() {
		state.lock().watchers.retain(|(watcher_id, _)| *watcher_id != id);
		debug!(id, "disposed file watcher");
	}
}

/// One glob-scoped subscription to file events.
pub struct FileSystemWatcher {
	shared: Arc<WatcherShared>,
	detach: Disposable,
}

impl FileSystemWatcher {
	/// Subscribes to creations under this watcher's glob.
	pub fn on_did_create(&self, listener: impl Fn(&Url) + Send + Sync + 'static) -> Disposable {
		self.shared.created.subscribe(listener)
	}

	/// Subscribes to content changes under this watcher's glob.
	pub fn on_did_change(&self, listener: impl Fn(&Url) + Send + Sync + 'static) -> Disposable {
		self.shared.changed.subscribe(listener)
	}

	/// Subscribes to deletions under this watcher's glob.
	pub fn on_did_delete(&self, listener: impl Fn(&Url) + Send + Sync + 'static) -> Disposable {
		self.shared.deleted.subscribe(listener)
	}

	/// Detaches the watcher from its set. Idempotent; existing
	/// subscriptions simply never fire again.
	pub fn dispose(&self) {
		self.detach.dispose();
	}

	/// Returns true once the watcher has been disposed.
	pub fn is_disposed(&self) -> bool {
		self.detach.is_disposed()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;

	fn uri(path: &str) -> Url {
		Url::parse(&format!("file://{path}")).unwrap()
	}

	#[test]
	fn test_events_reach_matching_watchers_only() {
		let set = WatcherSet::new();
		let rust = set.create("**/*.rs", false, false, false).unwrap();
		let toml = set.create("**/*.toml", false, false, false).unwrap();

		let rust_seen = Arc::new(AtomicUsize::new(0));
		let toml_seen = Arc::new(AtomicUsize::new(0));
		let r = rust_seen.clone();
		let _a = rust.on_did_change(move |_| {
			r.fetch_add(1, Ordering::SeqCst);
		});
		let t = toml_seen.clone();
		let _b = toml.on_did_change(move |_| {
			t.fetch_add(1, Ordering::SeqCst);
		});

		set.notify(FileEventKind::Changed, &uri("/proj/src/lib.rs"));

		assert_eq!(rust_seen.load(Ordering::SeqCst), 1);
		assert_eq!(toml_seen.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_ignore_flags_suppress_kinds() {
		let set = WatcherSet::new();
		let watcher = set.create("**/*.rs", true, false, true).unwrap();

		let created = Arc::new(AtomicUsize::new(0));
		let changed = Arc::new(AtomicUsize::new(0));
		let deleted = Arc::new(AtomicUsize::new(0));
		let c1 = created.clone();
		let _a = watcher.on_did_create(move |_| {
			c1.fetch_add(1, Ordering::SeqCst);
		});
		let c2 = changed.clone();
		let _b = watcher.on_did_change(move |_| {
			c2.fetch_add(1, Ordering::SeqCst);
		});
		let c3 = deleted.clone();
		let _c = watcher.on_did_delete(move |_| {
			c3.fetch_add(1, Ordering::SeqCst);
		});

		let target = uri("/proj/src/lib.rs");
		set.notify(FileEventKind::Created, &target);
		set.notify(FileEventKind::Changed, &target);
		set.notify(FileEventKind::Deleted, &target);

		assert_eq!(created.load(Ordering::SeqCst), 0);
		assert_eq!(changed.load(Ordering::SeqCst), 1);
		assert_eq!(deleted.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_dispose_detaches_idempotently() {
		let set = WatcherSet::new();
		let watcher = set.create("**/*.rs", false, false, false).unwrap();

		let changed = Arc::new(AtomicUsize::new(0));
		let seen = changed.clone();
		let _sub = watcher.on_did_change(move |_| {
			seen.fetch_add(1, Ordering::SeqCst);
		});

		watcher.dispose();
		watcher.dispose();
		assert!(watcher.is_disposed());
		assert_eq!(set.watcher_count(), 0);

		set.notify(FileEventKind::Changed, &uri("/proj/src/lib.rs"));
		assert_eq!(changed.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_malformed_glob_is_rejected() {
		let set = WatcherSet::new();
		assert!(matches!(set.create("a{b", false, false, false), Err(Error::InvalidPattern { .. })));
		assert_eq!(set.watcher_count(), 0);
	}
}
