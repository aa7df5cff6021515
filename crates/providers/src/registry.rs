//! The capability registry: registration bookkeeping and dispatch.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use futures::future::join_all;
use parking_lot::RwLock;
use quill_document::TextDocument;
use quill_events::{CancellationToken, Disposable};
use quill_primitives::{Position, Range, TextEdit};
use tracing::{debug, info, warn};

use crate::capability::Capability;
use crate::provider::{
	CodeActionProvider, CodeLensProvider, CompletionProvider, DefinitionProvider, DiagnosticsProvider,
	DocumentSymbolProvider, FormattingProvider, HoverProvider, ReferencesProvider, RenameProvider,
	SignatureHelpProvider, WorkspaceSymbolProvider,
};
use crate::selector::{CompiledSelector, DocumentSelector};
use crate::types::{
	CodeAction, CodeLens, CompletionList, Diagnostic, FormattingOptions, Hover, Location, SignatureHelp,
	SymbolInformation, WorkspaceEdit,
};
use crate::Result;

enum ProviderKind {
	Hover(Arc<dyn HoverProvider>),
	Completion(Arc<dyn CompletionProvider>),
	Definition(Arc<dyn DefinitionProvider>),
	References(Arc<dyn ReferencesProvider>),
	Rename(Arc<dyn RenameProvider>),
	Formatting(Arc<dyn FormattingProvider>),
	SignatureHelp(Arc<dyn SignatureHelpProvider>),
	CodeLens(Arc<dyn CodeLensProvider>),
	DocumentSymbols(Arc<dyn DocumentSymbolProvider>),
	WorkspaceSymbols(Arc<dyn WorkspaceSymbolProvider>),
	CodeActions(Arc<dyn CodeActionProvider>),
	Diagnostics(Arc<dyn DiagnosticsProvider>),
}

struct Entry {
	/// Registration id; doubles as the registration-order sequence.
	id: u64,
	selector: CompiledSelector,
	provider: ProviderKind,
}

#[derive(Default)]
struct RegistryState {
	entries: HashMap<Capability, Vec<Entry>>,
	next_id: u64,
}

/// Registry of capability providers keyed by document selector.
///
/// Many providers may coexist per capability and document. Dispatch order
/// among them is registration order. The `request_*` helpers invoke all
/// matching providers concurrently, isolate per-provider failures, and
/// discard results once the passed token has requested cancellation.
#[derive(Default)]
pub struct LanguageRegistry {
	state: Arc<RwLock<RegistryState>>,
}

impl LanguageRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	fn register(&self, capability: Capability, selector: impl Into<DocumentSelector>, provider: ProviderKind) -> Result<Disposable> {
		let selector = selector.into().compile()?;
		let id = {
			let mut state = self.state.write();
			let id = state.next_id;
			state.next_id += 1;
			state.entries.entry(capability).or_default().push(Entry { id, selector, provider });
			id
		};
		info!(capability = %capability, id, "registered provider");

		let state = Arc::downgrade(&self.state);
		Ok(Disposable::new(move || remove_entry(&state, capability, id)))
	}

	fn matching<T: ?Sized>(
		&self,
		capability: Capability,
		document: Option<&TextDocument>,
		extract: impl Fn(&ProviderKind) -> Option<Arc<T>>,
	) -> Vec<Arc<T>> {
		let state = self.state.read();
		let Some(entries) = state.entries.get(&capability) else {
			return Vec::new();
		};
		entries
			.iter()
			.filter(|e| document.is_none_or(|d| e.selector.matches(d)))
			.filter_map(|e| extract(&e.provider))
			.collect()
	}

	/// Returns the number of live registrations for a capability.
	pub fn provider_count(&self, capability: Capability) -> usize {
		self.state.read().entries.get(&capability).map_or(0, Vec::len)
	}

	// --- registration, one entry point per capability ---

	/// Registers a hover provider.
	pub fn register_hover_provider(&self, selector: impl Into<DocumentSelector>, provider: Arc<dyn HoverProvider>) -> Result<Disposable> {
		self.register(Capability::Hover, selector, ProviderKind::Hover(provider))
	}

	/// Registers a completion provider.
	pub fn register_completion_provider(
		&self,
		selector: impl Into<DocumentSelector>,
		provider: Arc<dyn CompletionProvider>,
	) -> Result<Disposable> {
		self.register(Capability::Completion, selector, ProviderKind::Completion(provider))
	}

	/// Registers a definition provider.
	pub fn register_definition_provider(
		&self,
		selector: impl Into<DocumentSelector>,
		provider: Arc<dyn DefinitionProvider>,
	) -> Result<Disposable> {
		self.register(Capability::Definition, selector, ProviderKind::Definition(provider))
	}

	/// Registers a references provider.
	pub fn register_references_provider(
		&self,
		selector: impl Into<DocumentSelector>,
		provider: Arc<dyn ReferencesProvider>,
	) -> Result<Disposable> {
		self.register(Capability::References, selector, ProviderKind::References(provider))
	}

	/// Registers a rename provider.
	pub fn register_rename_provider(&self, selector: impl Into<DocumentSelector>, provider: Arc<dyn RenameProvider>) -> Result<Disposable> {
		self.register(Capability::Rename, selector, ProviderKind::Rename(provider))
	}

	/// Registers a formatting provider.
	pub fn register_formatting_provider(
		&self,
		selector: impl Into<DocumentSelector>,
		provider: Arc<dyn FormattingProvider>,
	) -> Result<Disposable> {
		self.register(Capability::Formatting, selector, ProviderKind::Formatting(provider))
	}

	/// Registers a signature help provider.
	pub fn register_signature_help_provider(
		&self,
		selector: impl Into<DocumentSelector>,
		provider: Arc<dyn SignatureHelpProvider>,
	) -> Result<Disposable> {
		self.register(Capability::SignatureHelp, selector, ProviderKind::SignatureHelp(provider))
	}

	/// Registers a code lens provider.
	pub fn register_code_lens_provider(
		&self,
		selector: impl Into<DocumentSelector>,
		provider: Arc<dyn CodeLensProvider>,
	) -> Result<Disposable> {
		self.register(Capability::CodeLens, selector, ProviderKind::CodeLens(provider))
	}

	/// Registers a document symbol provider.
	pub fn register_document_symbol_provider(
		&self,
		selector: impl Into<DocumentSelector>,
		provider: Arc<dyn DocumentSymbolProvider>,
	) -> Result<Disposable> {
		self.register(Capability::DocumentSymbols, selector, ProviderKind::DocumentSymbols(provider))
	}

	/// Registers a workspace symbol provider.
	///
	/// The selector still gates registration validity, but workspace symbol
	/// queries carry no document, so dispatch reaches every registration.
	pub fn register_workspace_symbol_provider(
		&self,
		selector: impl Into<DocumentSelector>,
		provider: Arc<dyn WorkspaceSymbolProvider>,
	) -> Result<Disposable> {
		self.register(Capability::WorkspaceSymbols, selector, ProviderKind::WorkspaceSymbols(provider))
	}

	/// Registers a code action provider.
	pub fn register_code_action_provider(
		&self,
		selector: impl Into<DocumentSelector>,
		provider: Arc<dyn CodeActionProvider>,
	) -> Result<Disposable> {
		self.register(Capability::CodeActions, selector, ProviderKind::CodeActions(provider))
	}

	/// Registers a diagnostics provider.
	pub fn register_diagnostics_provider(
		&self,
		selector: impl Into<DocumentSelector>,
		provider: Arc<dyn DiagnosticsProvider>,
	) -> Result<Disposable> {
		self.register(Capability::Diagnostics, selector, ProviderKind::Diagnostics(provider))
	}

	// --- matching accessors, in registration order ---

	/// Returns the hover providers matching `document`.
	pub fn hover_providers(&self, document: &TextDocument) -> Vec<Arc<dyn HoverProvider>> {
		self.matching(Capability::Hover, Some(document), |p| match p {
			ProviderKind::Hover(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns the completion providers matching `document`.
	pub fn completion_providers(&self, document: &TextDocument) -> Vec<Arc<dyn CompletionProvider>> {
		self.matching(Capability::Completion, Some(document), |p| match p {
			ProviderKind::Completion(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns the definition providers matching `document`.
	pub fn definition_providers(&self, document: &TextDocument) -> Vec<Arc<dyn DefinitionProvider>> {
		self.matching(Capability::Definition, Some(document), |p| match p {
			ProviderKind::Definition(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns the references providers matching `document`.
	pub fn references_providers(&self, document: &TextDocument) -> Vec<Arc<dyn ReferencesProvider>> {
		self.matching(Capability::References, Some(document), |p| match p {
			ProviderKind::References(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns the rename providers matching `document`.
	pub fn rename_providers(&self, document: &TextDocument) -> Vec<Arc<dyn RenameProvider>> {
		self.matching(Capability::Rename, Some(document), |p| match p {
			ProviderKind::Rename(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns the formatting providers matching `document`.
	pub fn formatting_providers(&self, document: &TextDocument) -> Vec<Arc<dyn FormattingProvider>> {
		self.matching(Capability::Formatting, Some(document), |p| match p {
			ProviderKind::Formatting(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns the signature help providers matching `document`.
	pub fn signature_help_providers(&self, document: &TextDocument) -> Vec<Arc<dyn SignatureHelpProvider>> {
		self.matching(Capability::SignatureHelp, Some(document), |p| match p {
			ProviderKind::SignatureHelp(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns the code lens providers matching `document`.
	pub fn code_lens_providers(&self, document: &TextDocument) -> Vec<Arc<dyn CodeLensProvider>> {
		self.matching(Capability::CodeLens, Some(document), |p| match p {
			ProviderKind::CodeLens(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns the document symbol providers matching `document`.
	pub fn document_symbol_providers(&self, document: &TextDocument) -> Vec<Arc<dyn DocumentSymbolProvider>> {
		self.matching(Capability::DocumentSymbols, Some(document), |p| match p {
			ProviderKind::DocumentSymbols(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns all workspace symbol providers.
	pub fn workspace_symbol_providers(&self) -> Vec<Arc<dyn WorkspaceSymbolProvider>> {
		self.matching(Capability::WorkspaceSymbols, None, |p| match p {
			ProviderKind::WorkspaceSymbols(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns the code action providers matching `document`.
	pub fn code_action_providers(&self, document: &TextDocument) -> Vec<Arc<dyn CodeActionProvider>> {
		self.matching(Capability::CodeActions, Some(document), |p| match p {
			ProviderKind::CodeActions(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns the diagnostics providers matching `document`.
	pub fn diagnostics_providers(&self, document: &TextDocument) -> Vec<Arc<dyn DiagnosticsProvider>> {
		self.matching(Capability::Diagnostics, Some(document), |p| match p {
			ProviderKind::Diagnostics(p) => Some(p.clone()),
			_ => None,
		})
	}

	/// Returns the distinct completion trigger characters for `document`,
	/// aggregated over the matching providers, sorted.
	pub fn completion_trigger_characters(&self, document: &TextDocument) -> Vec<char> {
		collect_trigger_characters(self.completion_providers(document).iter().map(|p| p.trigger_characters()))
	}

	/// Returns the distinct signature help trigger characters for
	/// `document`, aggregated over the matching providers, sorted.
	pub fn signature_help_trigger_characters(&self, document: &TextDocument) -> Vec<char> {
		collect_trigger_characters(self.signature_help_providers(document).iter().map(|p| p.trigger_characters()))
	}

	// --- dispatch helpers ---

	/// Collects hover contributions for a position.
	pub async fn request_hover(&self, document: &TextDocument, position: Position, token: &CancellationToken) -> Vec<Hover> {
		if token.is_cancelled() {
			return Vec::new();
		}
		let providers = self.hover_providers(document);
		let results = join_all(providers.iter().map(|p| p.provide_hover(document, position, token.clone()))).await;
		sift(Capability::Hover, token, results)
	}

	/// Collects and merges completion contributions for a position.
	pub async fn request_completions(&self, document: &TextDocument, position: Position, token: &CancellationToken) -> CompletionList {
		if token.is_cancelled() {
			return CompletionList::default();
		}
		let providers = self.completion_providers(document);
		let results = join_all(providers.iter().map(|p| p.provide_completions(document, position, token.clone()))).await;

		let mut merged = CompletionList::default();
		for list in sift(Capability::Completion, token, results) {
			merged.is_incomplete |= list.is_incomplete;
			merged.items.extend(list.items);
		}
		merged
	}

	/// Collects definition locations for a position.
	pub async fn request_definition(&self, document: &TextDocument, position: Position, token: &CancellationToken) -> Vec<Location> {
		if token.is_cancelled() {
			return Vec::new();
		}
		let providers = self.definition_providers(document);
		let results = join_all(providers.iter().map(|p| p.provide_definition(document, position, token.clone()))).await;
		sift(Capability::Definition, token, results).into_iter().flatten().collect()
	}

	/// Collects references to the symbol at a position.
	pub async fn request_references(
		&self,
		document: &TextDocument,
		position: Position,
		include_declaration: bool,
		token: &CancellationToken,
	) -> Vec<Location> {
		if token.is_cancelled() {
			return Vec::new();
		}
		let providers = self.references_providers(document);
		let results = join_all(
			providers
				.iter()
				.map(|p| p.provide_references(document, position, include_declaration, token.clone())),
		)
		.await;
		sift(Capability::References, token, results).into_iter().flatten().collect()
	}

	/// Computes a rename. The first contribution in registration order wins.
	pub async fn request_rename(
		&self,
		document: &TextDocument,
		position: Position,
		new_name: &str,
		token: &CancellationToken,
	) -> Option<WorkspaceEdit> {
		if token.is_cancelled() {
			return None;
		}
		let providers = self.rename_providers(document);
		let results = join_all(providers.iter().map(|p| p.provide_rename(document, position, new_name, token.clone()))).await;
		sift(Capability::Rename, token, results).into_iter().next()
	}

	/// Computes formatting edits. The first contribution in registration
	/// order wins, since edits from competing formatters do not compose.
	pub async fn request_formatting(
		&self,
		document: &TextDocument,
		range: Option<Range>,
		options: FormattingOptions,
		token: &CancellationToken,
	) -> Option<Vec<TextEdit>> {
		if token.is_cancelled() {
			return None;
		}
		let providers = self.formatting_providers(document);
		let results = join_all(providers.iter().map(|p| p.provide_formatting(document, range, options, token.clone()))).await;
		sift(Capability::Formatting, token, results).into_iter().next()
	}

	/// Computes signature help. The first contribution wins.
	pub async fn request_signature_help(
		&self,
		document: &TextDocument,
		position: Position,
		token: &CancellationToken,
	) -> Option<SignatureHelp> {
		if token.is_cancelled() {
			return None;
		}
		let providers = self.signature_help_providers(document);
		let results = join_all(providers.iter().map(|p| p.provide_signature_help(document, position, token.clone()))).await;
		sift(Capability::SignatureHelp, token, results).into_iter().next()
	}

	/// Collects code lenses for a document.
	pub async fn request_code_lenses(&self, document: &TextDocument, token: &CancellationToken) -> Vec<CodeLens> {
		if token.is_cancelled() {
			return Vec::new();
		}
		let providers = self.code_lens_providers(document);
		let results = join_all(providers.iter().map(|p| p.provide_code_lenses(document, token.clone()))).await;
		sift(Capability::CodeLens, token, results).into_iter().flatten().collect()
	}

	/// Collects the symbol outline of a document.
	pub async fn request_document_symbols(&self, document: &TextDocument, token: &CancellationToken) -> Vec<SymbolInformation> {
		if token.is_cancelled() {
			return Vec::new();
		}
		let providers = self.document_symbol_providers(document);
		let results = join_all(providers.iter().map(|p| p.provide_document_symbols(document, token.clone()))).await;
		sift(Capability::DocumentSymbols, token, results).into_iter().flatten().collect()
	}

	/// Collects symbols matching `query` across the workspace.
	pub async fn request_workspace_symbols(&self, query: &str, token: &CancellationToken) -> Vec<SymbolInformation> {
		if token.is_cancelled() {
			return Vec::new();
		}
		let providers = self.workspace_symbol_providers();
		let results = join_all(providers.iter().map(|p| p.provide_workspace_symbols(query, token.clone()))).await;
		sift(Capability::WorkspaceSymbols, token, results).into_iter().flatten().collect()
	}

	/// Collects code actions for a range.
	pub async fn request_code_actions(&self, document: &TextDocument, range: Range, token: &CancellationToken) -> Vec<CodeAction> {
		if token.is_cancelled() {
			return Vec::new();
		}
		let providers = self.code_action_providers(document);
		let results = join_all(providers.iter().map(|p| p.provide_code_actions(document, range, token.clone()))).await;
		sift(Capability::CodeActions, token, results).into_iter().flatten().collect()
	}

	/// Collects diagnostics for a document.
	pub async fn request_diagnostics(&self, document: &TextDocument, token: &CancellationToken) -> Vec<Diagnostic> {
		if token.is_cancelled() {
			return Vec::new();
		}
		let providers = self.diagnostics_providers(document);
		let results = join_all(providers.iter().map(|p| p.provide_diagnostics(document, token.clone()))).await;
		sift(Capability::Diagnostics, token, results).into_iter().flatten().collect()
	}
}

fn collect_trigger_characters<'a>(per_provider: impl Iterator<Item = &'a [char]>) -> Vec<char> {
	let mut chars: Vec<char> = per_provider.flatten().copied().collect();
	chars.sort_unstable();
	chars.dedup();
	chars
}

fn remove_entry(state: &Weak<RwLock<RegistryState>>, capability: Capability, id: u64) {
	if let Some(state) = state.upgrade() {
		let mut state = state.write();
		if let Some(entries) = state.entries.get_mut(&capability) {
			entries.retain(|e| e.id != id);
		}
		debug!(capability = %capability, id, "unregistered provider");
	}
}

/// Separates usable contributions from failures and empty responses.
///
/// Failures are logged and skipped so one failing provider never suppresses
/// its siblings. A token that requested cancellation in the meantime
/// discards everything; the work is already wasted, the results are not
/// wanted.
fn sift<R>(capability: Capability, token: &CancellationToken, results: Vec<Result<Option<R>>>) -> Vec<R> {
	if token.is_cancelled() {
		debug!(capability = %capability, "discarding provider results after cancellation");
		return Vec::new();
	}
	let mut out = Vec::new();
	for result in results {
		match result {
			Ok(Some(value)) => out.push(value),
			Ok(None) => {}
			Err(error) => warn!(capability = %capability, %error, "provider failed; keeping sibling results"),
		}
	}
	out
}

#[cfg(test)]
mod tests;
