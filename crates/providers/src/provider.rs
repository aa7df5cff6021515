//! Provider trait definitions, one per capability.
//!
//! Every provider call receives the document (or a query), the coordinates
//! it applies to, and a [`CancellationToken`]. Implementations should check
//! [`CancellationToken::is_cancelled`] at reasonable intervals, or await
//! `cancelled()`, and return promptly once cancellation is requested; a late
//! result is simply discarded by the dispatcher. Returning `Ok(None)` is a
//! valid "no contribution" response, not an error.

use quill_document::TextDocument;
use quill_events::CancellationToken;
use quill_primitives::{BoxFutureSend, Position, Range, TextEdit};

use crate::types::{
	CodeAction, CodeLens, CompletionList, Diagnostic, FormattingOptions, Hover, Location, SignatureHelp,
	SymbolInformation, WorkspaceEdit,
};
use crate::Result;

/// Provides hover text for a position.
pub trait HoverProvider: Send + Sync {
	/// Computes hover contents for `position`.
	fn provide_hover<'a>(
		&'a self,
		document: &'a TextDocument,
		position: Position,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Hover>>>;
}

/// Provides completion proposals for a position.
pub trait CompletionProvider: Send + Sync {
	/// Computes completion proposals at `position`.
	fn provide_completions<'a>(
		&'a self,
		document: &'a TextDocument,
		position: Position,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<CompletionList>>>;

	/// Characters that trigger completion automatically.
	fn trigger_characters(&self) -> &[char] {
		&[]
	}
}

/// Provides definition locations for the symbol at a position.
pub trait DefinitionProvider: Send + Sync {
	/// Resolves the definition of the symbol at `position`.
	fn provide_definition<'a>(
		&'a self,
		document: &'a TextDocument,
		position: Position,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Vec<Location>>>>;
}

/// Provides references to the symbol at a position.
pub trait ReferencesProvider: Send + Sync {
	/// Lists references to the symbol at `position`.
	fn provide_references<'a>(
		&'a self,
		document: &'a TextDocument,
		position: Position,
		include_declaration: bool,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Vec<Location>>>>;
}

/// Provides workspace-wide renames of the symbol at a position.
pub trait RenameProvider: Send + Sync {
	/// Computes the edits renaming the symbol at `position` to `new_name`.
	fn provide_rename<'a>(
		&'a self,
		document: &'a TextDocument,
		position: Position,
		new_name: &'a str,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<WorkspaceEdit>>>;
}

/// Formats a document or a range of it.
pub trait FormattingProvider: Send + Sync {
	/// Computes formatting edits. `range` is `None` for whole-document
	/// formatting.
	fn provide_formatting<'a>(
		&'a self,
		document: &'a TextDocument,
		range: Option<Range>,
		options: FormattingOptions,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Vec<TextEdit>>>>;
}

/// Provides signature help for the call under the cursor.
pub trait SignatureHelpProvider: Send + Sync {
	/// Computes signature help at `position`.
	fn provide_signature_help<'a>(
		&'a self,
		document: &'a TextDocument,
		position: Position,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<SignatureHelp>>>;

	/// Characters that trigger signature help automatically.
	fn trigger_characters(&self) -> &[char] {
		&[]
	}
}

/// Provides code lenses for a whole document.
pub trait CodeLensProvider: Send + Sync {
	/// Computes the lenses for `document`.
	fn provide_code_lenses<'a>(
		&'a self,
		document: &'a TextDocument,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Vec<CodeLens>>>>;
}

/// Provides the symbol outline of a document.
pub trait DocumentSymbolProvider: Send + Sync {
	/// Computes the symbols declared in `document`.
	fn provide_document_symbols<'a>(
		&'a self,
		document: &'a TextDocument,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Vec<SymbolInformation>>>>;
}

/// Provides workspace-wide symbol search.
pub trait WorkspaceSymbolProvider: Send + Sync {
	/// Finds symbols matching `query` across the workspace.
	fn provide_workspace_symbols<'a>(
		&'a self,
		query: &'a str,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Vec<SymbolInformation>>>>;
}

/// Provides quick fixes and refactorings for a range.
pub trait CodeActionProvider: Send + Sync {
	/// Computes the actions available for `range`.
	fn provide_code_actions<'a>(
		&'a self,
		document: &'a TextDocument,
		range: Range,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Vec<CodeAction>>>>;
}

/// Provides pull-model diagnostics for a document.
pub trait DiagnosticsProvider: Send + Sync {
	/// Computes the diagnostics for `document`.
	fn provide_diagnostics<'a>(
		&'a self,
		document: &'a TextDocument,
		token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Vec<Diagnostic>>>>;
}
