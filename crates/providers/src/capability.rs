use std::fmt;

use serde::{Deserialize, Serialize};

/// One named kind of language service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
	/// Hover text at a position.
	Hover,
	/// Completion proposals at a position.
	Completion,
	/// Jump-to-definition locations.
	Definition,
	/// References to the symbol at a position.
	References,
	/// Workspace-wide symbol rename.
	Rename,
	/// Document and range formatting.
	Formatting,
	/// Signature help while typing a call.
	SignatureHelp,
	/// Actionable annotations interleaved with the text.
	CodeLens,
	/// Symbol outline of a single document.
	DocumentSymbols,
	/// Symbol search across the workspace.
	WorkspaceSymbols,
	/// Quick fixes and refactorings for a range.
	CodeActions,
	/// Pull-model diagnostics for a document.
	Diagnostics,
}

impl Capability {
	/// All capabilities, in a stable order.
	pub const ALL: [Capability; 12] = [
		Capability::Hover,
		Capability::Completion,
		Capability::Definition,
		Capability::References,
		Capability::Rename,
		Capability::Formatting,
		Capability::SignatureHelp,
		Capability::CodeLens,
		Capability::DocumentSymbols,
		Capability::WorkspaceSymbols,
		Capability::CodeActions,
		Capability::Diagnostics,
	];

	/// Returns the canonical name of this capability.
	pub const fn as_str(&self) -> &'static str {
		match self {
			Capability::Hover => "hover",
			Capability::Completion => "completion",
			Capability::Definition => "definition",
			Capability::References => "references",
			Capability::Rename => "rename",
			Capability::Formatting => "formatting",
			Capability::SignatureHelp => "signatureHelp",
			Capability::CodeLens => "codeLens",
			Capability::DocumentSymbols => "documentSymbols",
			Capability::WorkspaceSymbols => "workspaceSymbols",
			Capability::CodeActions => "codeActions",
			Capability::Diagnostics => "diagnostics",
		}
	}
}

impl fmt::Display for Capability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
