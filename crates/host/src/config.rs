use std::sync::Arc;

use parking_lot::RwLock;
use quill_events::{Disposable, EventEmitter};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

struct ConfigState {
	defaults: Value,
	user: Value,
}

/// Layered configuration addressed by dotted keys.
///
/// Two layers of JSON objects: defaults installed by the host, and user
/// values written through [`update`](Self::update). Lookup walks the dotted
/// path (`"editor.tabSize"` reads `editor` then `tabSize`) in the user
/// layer first, falling back to defaults. A value of the wrong shape for
/// the requested type reads as absent, not as an error.
pub struct Configuration {
	state: Arc<RwLock<ConfigState>>,
	changed: EventEmitter<String>,
}

impl Default for Configuration {
	fn default() -> Self {
		Self::new(Value::Object(Map::new()))
	}
}

impl Configuration {
	/// Creates a configuration over the given defaults object.
	///
	/// A non-object `defaults` value is treated as empty.
	pub fn new(defaults: Value) -> Self {
		let defaults = if defaults.is_object() { defaults } else { Value::Object(Map::new()) };
		Self {
			state: Arc::new(RwLock::new(ConfigState {
				defaults,
				user: Value::Object(Map::new()),
			})),
			changed: EventEmitter::new(),
		}
	}

	/// Reads the value at `key`, deserialized as `T`.
	///
	/// Missing keys and values that do not deserialize as `T` both read as
	/// `None`; the latter is logged.
	pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let value = {
			let state = self.state.read();
			lookup(&state.user, key).or_else(|| lookup(&state.defaults, key)).cloned()
		}?;
		match serde_json::from_value(value) {
			Ok(typed) => Some(typed),
			Err(error) => {
				warn!(key, %error, "configuration value has the wrong shape");
				None
			}
		}
	}

	/// Reads the value at `key`, or `default` if absent or mis-shaped.
	pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
		self.get(key).unwrap_or(default)
	}

	/// Returns true if `key` resolves in either layer.
	pub fn has(&self, key: &str) -> bool {
		let state = self.state.read();
		lookup(&state.user, key).is_some() || lookup(&state.defaults, key).is_some()
	}

	/// Returns the merged subtree under `prefix`.
	///
	/// Defaults and user values are deep-merged, user winning per key. A
	/// prefix that resolves to nothing yields an empty object.
	pub fn section(&self, prefix: &str) -> Value {
		let state = self.state.read();
		let mut merged = lookup(&state.defaults, prefix).cloned().unwrap_or(Value::Object(Map::new()));
		if let Some(user) = lookup(&state.user, prefix) {
			merge(&mut merged, user);
		}
		merged
	}

	/// Writes `value` at `key` in the user layer and announces the key.
	///
	/// Intermediate objects along the dotted path are created; a
	/// non-object intermediate is replaced.
	pub fn update(&self, key: &str, value: Value) {
		{
			let mut state = self.state.write();
			insert(&mut state.user, key, value);
		}
		debug!(key, "configuration updated");
		self.changed.emit(&key.to_string());
	}

	/// Subscribes to configuration changes; the event carries the updated key.
	pub fn on_did_change(&self, listener: impl Fn(&String) + Send + Sync + 'static) -> Disposable {
		self.changed.subscribe(listener)
	}
}

/// Walks `root` along the dotted `path`.
fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
	let mut current = root;
	for segment in path.split('.') {
		current = current.as_object()?.get(segment)?;
	}
	Some(current)
}

/// Deep-merges `over` into `base`; objects merge per key, anything else
/// replaces.
fn merge(base: &mut Value, over: &Value) {
	match (base, over) {
		(Value::Object(base), Value::Object(over)) => {
			for (key, value) in over {
				merge(base.entry(key.clone()).or_insert(Value::Null), value);
			}
		}
		(base, over) => *base = over.clone(),
	}
}

/// Writes `value` at the dotted `path` under `root`, creating objects along
/// the way.
fn insert(root: &mut Value, path: &str, value: Value) {
	let mut current = root;
	let mut segments = path.split('.').peekable();
	while let Some(segment) = segments.next() {
		if !current.is_object() {
			*current = Value::Object(Map::new());
		}
		let Value::Object(map) = current else {
			return;
		};
		if segments.peek().is_none() {
			map.insert(segment.to_string(), value);
			return;
		}
		current = map.entry(segment.to_string()).or_insert(Value::Object(Map::new()));
	}
}
