use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::Result;

/// Which partition of the state store a memento addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
	/// Shared across all workspaces of the host.
	Global,
	/// Private to the current workspace.
	Workspace,
}

#[derive(Default, Serialize, Deserialize)]
struct StoreState {
	global: HashMap<String, Value>,
	workspace: HashMap<String, Value>,
}

impl StoreState {
	fn partition(&self, scope: Scope) -> &HashMap<String, Value> {
		match scope {
			Scope::Global => &self.global,
			Scope::Workspace => &self.workspace,
		}
	}

	fn partition_mut(&mut self, scope: Scope) -> &mut HashMap<String, Value> {
		match scope {
			Scope::Global => &mut self.global,
			Scope::Workspace => &mut self.workspace,
		}
	}
}

/// JSON-valued key/value state in two partitions.
///
/// The store itself stays in memory; the host persists it by round-tripping
/// [`snapshot`](Self::snapshot) / [`restore`](Self::restore) through
/// whatever storage it owns. [`memento`](Self::memento) hands out
/// scope-bound views for consumers.
#[derive(Default)]
pub struct StateStore {
	state: Arc<RwLock<StoreState>>,
}

impl StateStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a view bound to `scope`, sharing this store's state.
	pub fn memento(&self, scope: Scope) -> Memento {
		Memento {
			scope,
			state: self.state.clone(),
		}
	}

	/// Serializes the whole store into one JSON value.
	pub fn snapshot(&self) -> Result<Value> {
		Ok(serde_json::to_value(&*self.state.read())?)
	}

	/// Replaces the whole store from a [`snapshot`](Self::snapshot) value.
	pub fn restore(&self, snapshot: Value) -> Result<()> {
		let restored: StoreState = serde_json::from_value(snapshot)?;
		*self.state.write() = restored;
		Ok(())
	}
}

/// A scope-bound view over the [`StateStore`].
#[derive(Clone)]
pub struct Memento {
	scope: Scope,
	state: Arc<RwLock<StoreState>>,
}

impl Memento {
	/// Returns the scope this view addresses.
	pub fn scope(&self) -> Scope {
		self.scope
	}

	/// Reads the value stored under `key`, deserialized as `T`.
	///
	/// Missing keys and values that do not deserialize as `T` both read as
	/// `None`; the latter is logged.
	pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let value = self.state.read().partition(self.scope).get(key).cloned()?;
		match serde_json::from_value(value) {
			Ok(typed) => Some(typed),
			Err(error) => {
				warn!(key, %error, "stored value has the wrong shape");
				None
			}
		}
	}

	/// Reads the value stored under `key`, or `default` if absent or
	/// mis-shaped.
	pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
		self.get(key).unwrap_or(default)
	}

	/// Stores `value` under `key`, replacing any previous value.
	pub fn set(&self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
		let value = serde_json::to_value(value)?;
		self.state.write().partition_mut(self.scope).insert(key.into(), value);
		Ok(())
	}

	/// Removes the value under `key`; returns true if one was stored.
	pub fn remove(&self, key: &str) -> bool {
		self.state.write().partition_mut(self.scope).remove(key).is_some()
	}

	/// Returns the stored keys, sorted.
	pub fn keys(&self) -> Vec<String> {
		let mut keys: Vec<String> = self.state.read().partition(self.scope).keys().cloned().collect();
		keys.sort();
		keys
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_set_and_get_round_trip_types() {
		let store = StateStore::new();
		let memento = store.memento(Scope::Global);

		memento.set("count", 3u32).unwrap();
		memento.set("name", "quill").unwrap();

		assert_eq!(memento.get::<u32>("count"), Some(3));
		assert_eq!(memento.get::<String>("name").as_deref(), Some("quill"));
		assert_eq!(memento.get::<u32>("missing"), None);
		assert_eq!(memento.get_or("missing", 7u32), 7);
	}

	#[test]
	fn test_scopes_do_not_bleed() {
		let store = StateStore::new();
		let global = store.memento(Scope::Global);
		let workspace = store.memento(Scope::Workspace);

		global.set("key", "global value").unwrap();
		workspace.set("key", "workspace value").unwrap();

		assert_eq!(global.get::<String>("key").as_deref(), Some("global value"));
		assert_eq!(workspace.get::<String>("key").as_deref(), Some("workspace value"));

		assert!(workspace.remove("key"));
		assert!(!workspace.remove("key"));
		assert_eq!(global.get::<String>("key").as_deref(), Some("global value"));
	}

	#[test]
	fn test_wrong_shape_reads_as_absent() {
		let store = StateStore::new();
		let memento = store.memento(Scope::Global);

		memento.set("count", "not a number").unwrap();
		assert_eq!(memento.get::<u32>("count"), None);
	}

	#[test]
	fn test_keys_are_sorted() {
		let store = StateStore::new();
		let memento = store.memento(Scope::Workspace);

		memento.set("b", 1).unwrap();
		memento.set("a", 2).unwrap();

		assert_eq!(memento.keys(), vec!["a", "b"]);
	}

	#[test]
	fn test_snapshot_restore_round_trip() {
		let store = StateStore::new();
		store.memento(Scope::Global).set("g", 1).unwrap();
		store.memento(Scope::Workspace).set("w", 2).unwrap();

		let snapshot = store.snapshot().unwrap();

		let other = StateStore::new();
		other.restore(snapshot).unwrap();

		assert_eq!(other.memento(Scope::Global).get::<u32>("g"), Some(1));
		assert_eq!(other.memento(Scope::Workspace).get::<u32>("w"), Some(2));
	}

	#[test]
	fn test_restore_rejects_malformed_snapshots() {
		let store = StateStore::new();
		store.memento(Scope::Global).set("kept", true).unwrap();

		assert!(store.restore(json!([1, 2, 3])).is_err());
		assert_eq!(store.memento(Scope::Global).get::<bool>("kept"), Some(true));
	}
}
