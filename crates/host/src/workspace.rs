use std::collections::HashMap;

use parking_lot::{ReentrantMutex, RwLock};
use quill_document::{ContentChange, TextDocument};
use quill_events::{Disposable, EventEmitter};
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

/// A change applied to an open document.
#[derive(Debug, Clone)]
pub struct DocumentChangeEvent {
	/// The document after the change.
	pub document: TextDocument,
	/// The changes that produced this version.
	pub changes: Vec<ContentChange>,
}

/// The set of open documents, keyed by uri.
///
/// Documents are immutable per version; the workspace holds the newest
/// version of each and swaps it out on change. Lifecycle transitions are
/// observable through the `on_did_*` subscriptions, and change events for a
/// single document always arrive in version order.
#[derive(Default)]
pub struct Workspace {
	documents: RwLock<HashMap<Url, TextDocument>>,
	/// Serializes the update-then-emit sequence so racing change events
	/// cannot arrive out of version order. Reentrant, so a change listener
	/// may itself apply a follow-up change; the nested event is emitted
	/// inside the outer one, still in version order.
	change_order: ReentrantMutex<()>,
	did_open: EventEmitter<TextDocument>,
	did_change: EventEmitter<DocumentChangeEvent>,
	did_save: EventEmitter<TextDocument>,
	did_close: EventEmitter<TextDocument>,
}

impl Workspace {
	/// Creates a workspace with no open documents.
	pub fn new() -> Self {
		Self::default()
	}

	/// Opens a document at version 0 and announces it.
	///
	/// A uri can be open at most once; a second open is an error rather
	/// than a reload.
	pub fn open_document(&self, uri: Url, language_id: impl Into<String>, text: &str) -> Result<TextDocument> {
		let document = TextDocument::new(uri.clone(), language_id, text);
		{
			let mut documents = self.documents.write();
			if documents.contains_key(&uri) {
				return Err(Error::DocumentAlreadyOpen { uri });
			}
			documents.insert(uri.clone(), document.clone());
		}
		info!(uri = %uri, language = document.language_id(), "opened document");
		self.did_open.emit(&document);
		Ok(document)
	}

	/// Returns the newest version of the document at `uri`, if open.
	pub fn document(&self, uri: &Url) -> Option<TextDocument> {
		self.documents.read().get(uri).cloned()
	}

	/// Returns the newest version of every open document.
	pub fn documents(&self) -> Vec<TextDocument> {
		self.documents.read().values().cloned().collect()
	}

	/// Returns true if `uri` names an open document.
	pub fn is_open(&self, uri: &Url) -> bool {
		self.documents.read().contains_key(uri)
	}

	/// Applies a batch of changes to the document at `uri`.
	///
	/// The stored document is replaced by one with a strictly larger
	/// version, and a [`DocumentChangeEvent`] carrying the new version is
	/// emitted before this call returns.
	pub fn apply_changes(&self, uri: &Url, changes: &[ContentChange]) -> Result<TextDocument> {
		let _order = self.change_order.lock();
		let updated = {
			let mut documents = self.documents.write();
			let current = documents.get(uri).ok_or_else(|| Error::UnknownDocument { uri: uri.clone() })?;
			let updated = current.apply_changes(changes);
			documents.insert(uri.clone(), updated.clone());
			updated
		};
		debug!(uri = %uri, version = updated.version(), "document changed");
		self.did_change.emit(&DocumentChangeEvent {
			document: updated.clone(),
			changes: changes.to_vec(),
		});
		Ok(updated)
	}

	/// Announces that the host persisted the document at `uri`.
	///
	/// Storage itself is the host's concern; this only emits the event.
	pub fn save_document(&self, uri: &Url) -> Result<TextDocument> {
		let document = self.document(uri).ok_or_else(|| Error::UnknownDocument { uri: uri.clone() })?;
		debug!(uri = %uri, version = document.version(), "document saved");
		self.did_save.emit(&document);
		Ok(document)
	}

	/// Closes the document at `uri` and announces its final version.
	pub fn close_document(&self, uri: &Url) -> Result<TextDocument> {
		let document = self
			.documents
			.write()
			.remove(uri)
			.ok_or_else(|| Error::UnknownDocument { uri: uri.clone() })?;
		info!(uri = %uri, "closed document");
		self.did_close.emit(&document);
		Ok(document)
	}

	/// Subscribes to document-open events.
	pub fn on_did_open(&self, listener: impl Fn(&TextDocument) + Send + Sync + 'static) -> Disposable {
		self.did_open.subscribe(listener)
	}

	/// Subscribes to document-change events.
	pub fn on_did_change(&self, listener: impl Fn(&DocumentChangeEvent) + Send + Sync + 'static) -> Disposable {
		self.did_change.subscribe(listener)
	}

	/// Subscribes to document-save events.
	pub fn on_did_save(&self, listener: impl Fn(&TextDocument) + Send + Sync + 'static) -> Disposable {
		self.did_save.subscribe(listener)
	}

	/// Subscribes to document-close events.
	pub fn on_did_close(&self, listener: impl Fn(&TextDocument) + Send + Sync + 'static) -> Disposable {
		self.did_close.subscribe(listener)
	}
}
