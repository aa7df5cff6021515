//! Capability registration and dispatch for language-intelligence providers.
//!
//! A consumer advertises capability implementations ("I can provide hover
//! text for language X") against a [`DocumentSelector`]; the
//! [`LanguageRegistry`] matches registered providers to documents and
//! invokes them with a cancellation token. Registration returns a
//! [`Disposable`](quill_events::Disposable) whose disposal removes exactly
//! that registration.
//!
//! Dispatch across providers of the same capability is deterministic:
//! registration order. A failing provider is isolated — its error is logged
//! and sibling providers still contribute.

/// Capability names.
pub mod capability;
/// Published diagnostics bookkeeping.
pub mod diagnostics;
/// Provider trait definitions.
pub mod provider;
/// The capability registry.
pub mod registry;
/// Document matching.
pub mod selector;
/// Capability result types.
pub mod types;

pub use capability::Capability;
pub use diagnostics::DiagnosticsCollection;
pub use provider::{
	CodeActionProvider, CodeLensProvider, CompletionProvider, DefinitionProvider, DiagnosticsProvider,
	DocumentSymbolProvider, FormattingProvider, HoverProvider, ReferencesProvider, RenameProvider,
	SignatureHelpProvider, WorkspaceSymbolProvider,
};
pub use registry::LanguageRegistry;
pub use selector::{CompiledSelector, DocumentFilter, DocumentSelector};
pub use types::{
	CodeAction, CodeLens, CommandRef, CompletionItem, CompletionList, Diagnostic, DiagnosticSeverity,
	FormattingOptions, Hover, Location, ParameterInformation, SignatureHelp, SignatureInformation,
	SymbolInformation, SymbolKind, WorkspaceEdit,
};

/// A convenient type alias for `Result` with `E` = [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible registry and provider errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// A selector with no filters was passed to a registration.
	#[error("selector must contain at least one filter")]
	EmptySelector,
	/// A filter specified none of language, scheme, or pattern.
	#[error("document filter must specify a language, scheme, or pattern")]
	EmptyFilter,
	/// A filter's glob pattern failed to compile.
	#[error("invalid glob pattern {pattern:?}")]
	InvalidPattern {
		/// The offending pattern.
		pattern: String,
		/// The underlying glob error.
		#[source]
		source: globset::Error,
	},
	/// A provider implementation failed.
	#[error("provider failed: {0}")]
	Provider(String),
	/// The operation noticed a cancellation request and stopped.
	#[error("operation was cancelled")]
	Cancelled,
}

impl Error {
	/// Creates a provider-side failure from any displayable reason.
	pub fn provider(reason: impl std::fmt::Display) -> Self {
		Self::Provider(reason.to_string())
	}
}
