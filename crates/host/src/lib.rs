//! Host-side surfaces of the API: the open-document workspace, the command
//! registry, layered configuration, persisted key/value state, and file
//! watching.
//!
//! These types own the mutable state that the provider layer deliberately
//! avoids. Everything here is synchronous and lock-protected; the host feeds
//! inputs (document changes, file events) and consumers observe them through
//! [`EventEmitter`](quill_events::EventEmitter) subscriptions.

/// Command registration and execution.
pub mod commands;
/// Layered configuration with dotted-key access.
pub mod config;
/// Persisted key/value state.
pub mod memento;
/// File event routing by glob.
pub mod watch;
/// Open documents and their lifecycle events.
pub mod workspace;

pub use commands::CommandRegistry;
pub use config::Configuration;
pub use memento::{Memento, Scope, StateStore};
pub use watch::{FileEventKind, FileSystemWatcher, WatcherSet};
pub use workspace::{DocumentChangeEvent, Workspace};

/// A convenient type alias for `Result` with `E` = [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible host surface errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// A document with the same uri is already open.
	#[error("document already open: {uri}")]
	DocumentAlreadyOpen {
		/// The offending uri.
		uri: url::Url,
	},
	/// The uri does not name an open document.
	#[error("no open document: {uri}")]
	UnknownDocument {
		/// The unknown uri.
		uri: url::Url,
	},
	/// A command with the same identifier is already registered.
	#[error("command already registered: {id:?}")]
	DuplicateCommand {
		/// The offending identifier.
		id: String,
	},
	/// The identifier does not name a registered command.
	#[error("no such command: {id:?}")]
	UnknownCommand {
		/// The unknown identifier.
		id: String,
	},
	/// A command callback reported failure.
	#[error("command {id:?} failed: {reason}")]
	Command {
		/// The failing command.
		id: String,
		/// The callback's failure, rendered.
		reason: String,
	},
	/// A watcher glob pattern failed to compile.
	#[error("invalid glob pattern {pattern:?}")]
	InvalidPattern {
		/// The offending pattern.
		pattern: String,
		/// The underlying glob error.
		#[source]
		source: globset::Error,
	},
	/// A state value failed to serialize or a snapshot failed to parse.
	#[error("state serialization failed")]
	State(#[from] serde_json::Error),
}
