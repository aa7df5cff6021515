use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use quill_events::Disposable;
use serde_json::Value;
use tracing::{debug, info};

use crate::{Error, Result};

type Callback = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

struct Registered {
	/// Registration sequence; a stale disposable for a re-registered id
	/// must not remove the newer registration.
	seq: u64,
	callback: Callback,
}

#[derive(Default)]
struct CommandState {
	commands: HashMap<String, Registered>,
	next_seq: u64,
}

/// Named commands executable with JSON arguments.
///
/// Commands are synchronous callbacks; anything asynchronous a command
/// kicks off is its own concern. An identifier can be registered at most
/// once at a time, and disposal of the registration frees it again.
#[derive(Default)]
pub struct CommandRegistry {
	state: Arc<Mutex<CommandState>>,
}

impl CommandRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a command under `id`.
	///
	/// Fails if `id` is already taken. The returned handle removes exactly
	/// this registration; disposing twice is a no-op.
	pub fn register_command(
		&self,
		id: impl Into<String>,
		callback: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
	) -> Result<Disposable> {
		let id = id.into();
		let seq = {
			let mut state = self.state.lock();
			if state.commands.contains_key(&id) {
				return Err(Error::DuplicateCommand { id });
			}
			let seq = state.next_seq;
			state.next_seq += 1;
			state.commands.insert(id.clone(), Registered { seq, callback: Arc::new(callback) });
			seq
		};
		info!(command = %id, "registered command");

		let state = Arc::downgrade(&self.state);
		Ok(Disposable::new(move || unregister(&state, &id, seq)))
	}

	/// Executes the command registered under `id`.
	///
	/// The callback runs outside the registry lock, so a command may itself
	/// register, execute, or dispose commands. A callback failure is
	/// reported as [`Error::Command`] carrying the command id.
	pub fn execute_command(&self, id: &str, args: &[Value]) -> Result<Value> {
		let callback = {
			let state = self.state.lock();
			let registered = state.commands.get(id).ok_or_else(|| Error::UnknownCommand { id: id.to_string() })?;
			registered.callback.clone()
		};
		debug!(command = %id, "executing command");
		callback(args).map_err(|error| Error::Command {
			id: id.to_string(),
			reason: error.to_string(),
		})
	}

	/// Returns true if `id` names a live registration.
	pub fn is_registered(&self, id: &str) -> bool {
		self.state.lock().commands.contains_key(id)
	}

	/// Returns the registered identifiers, sorted.
	pub fn command_ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.state.lock().commands.keys().cloned().collect();
		ids.sort();
		ids
	}
}

fn unregister(state: &Weak<Mutex<CommandState>>, id: &str, seq: u64) {
	if let Some(state) = state.upgrade() {
		let mut state = state.lock();
		if state.commands.get(id).is_some_and(|r| r.seq == seq) {
			state.commands.remove(id);
			debug!(command = %id, "unregistered command");
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_execute_passes_arguments_and_returns_value() {
		let registry = CommandRegistry::new();

		let _cmd = registry
			.register_command("math.add", |args| {
				let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
				Ok(json!(sum))
			})
			.unwrap();

		let result = registry.execute_command("math.add", &[json!(2), json!(3)]).unwrap();
		assert_eq!(result, json!(5));
	}

	#[test]
	fn test_duplicate_id_is_rejected() {
		let registry = CommandRegistry::new();

		let _first = registry.register_command("noop", |_| Ok(Value::Null)).unwrap();
		let err = registry.register_command("noop", |_| Ok(Value::Null)).unwrap_err();

		assert!(matches!(err, Error::DuplicateCommand { .. }));
	}

	#[test]
	fn test_dispose_frees_the_id() {
		let registry = CommandRegistry::new();

		let handle = registry.register_command("noop", |_| Ok(Value::Null)).unwrap();
		handle.dispose();
		handle.dispose();

		assert!(!registry.is_registered("noop"));
		let _again = registry.register_command("noop", |_| Ok(Value::Null)).unwrap();
	}

	#[test]
	fn test_stale_disposable_leaves_new_registration_alone() {
		let registry = CommandRegistry::new();

		let old = registry.register_command("noop", |_| Ok(Value::Null)).unwrap();
		old.dispose();
		let _new = registry.register_command("noop", |_| Ok(json!("new"))).unwrap();

		old.dispose();
		assert!(registry.is_registered("noop"));
		assert_eq!(registry.execute_command("noop", &[]).unwrap(), json!("new"));
	}

	#[test]
	fn test_unknown_command_fails() {
		let registry = CommandRegistry::new();
		assert!(matches!(registry.execute_command("missing", &[]), Err(Error::UnknownCommand { .. })));
	}

	#[test]
	fn test_callback_failure_carries_the_command_id() {
		let registry = CommandRegistry::new();

		let _cmd = registry
			.register_command("fails", |_| {
				Err(Error::Command {
					id: "inner".to_string(),
					reason: "boom".to_string(),
				})
			})
			.unwrap();

		match registry.execute_command("fails", &[]) {
			Err(Error::Command { id, .. }) => assert_eq!(id, "fails"),
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[test]
	fn test_command_ids_are_sorted() {
		let registry = CommandRegistry::new();

		let _b = registry.register_command("b", |_| Ok(Value::Null)).unwrap();
		let _a = registry.register_command("a", |_| Ok(Value::Null)).unwrap();

		assert_eq!(registry.command_ids(), vec!["a", "b"]);
	}
}
