use std::collections::HashMap;

use quill_primitives::{Range, TextEdit};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Hover text for a position, with the span it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hover {
	/// The hover text.
	pub contents: String,
	/// The span the hover applies to; `None` means the word under the cursor.
	pub range: Option<Range>,
}

impl Hover {
	/// Creates a hover without an explicit range.
	pub fn new(contents: impl Into<String>) -> Self {
		Self { contents: contents.into(), range: None }
	}

	/// Attaches the span the hover applies to.
	pub fn with_range(mut self, range: Range) -> Self {
		self.range = Some(range);
		self
	}
}

/// A single completion proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionItem {
	/// Shown in the completion list.
	pub label: String,
	/// Additional detail, e.g. a type signature.
	pub detail: Option<String>,
	/// Longer documentation.
	pub documentation: Option<String>,
	/// Text inserted on accept; defaults to the label.
	pub insert_text: Option<String>,
}

impl CompletionItem {
	/// Creates a proposal with only a label.
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			detail: None,
			documentation: None,
			insert_text: None,
		}
	}

	/// Sets the inserted text.
	pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
		self.insert_text = Some(text.into());
		self
	}
}

/// A batch of completion proposals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionList {
	/// True if further typing should re-query the provider.
	pub is_incomplete: bool,
	/// The proposals.
	pub items: Vec<CompletionItem>,
}

impl From<Vec<CompletionItem>> for CompletionList {
	fn from(items: Vec<CompletionItem>) -> Self {
		Self { is_incomplete: false, items }
	}
}

/// A location inside a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
	/// The resource.
	pub uri: Url,
	/// The span inside the resource.
	pub range: Range,
}

impl Location {
	/// Creates a location.
	pub fn new(uri: Url, range: Range) -> Self {
		Self { uri, range }
	}
}

/// The kind of a named symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
	/// A file.
	File,
	/// A module or namespace.
	Module,
	/// A class or similar nominal type.
	Class,
	/// A method on a type.
	Method,
	/// A free function.
	Function,
	/// A variable.
	Variable,
	/// A constant.
	Constant,
	/// A struct.
	Struct,
	/// An enum.
	Enum,
	/// An interface or trait.
	Interface,
	/// A field or property.
	Property,
}

/// A named symbol and where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInformation {
	/// Symbol name.
	pub name: String,
	/// Symbol kind.
	pub kind: SymbolKind,
	/// Where the symbol is declared.
	pub location: Location,
	/// Name of the enclosing container, if any.
	pub container_name: Option<String>,
}

/// One parameter of one signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInformation {
	/// Parameter label as it appears in the signature.
	pub label: String,
	/// Parameter documentation.
	pub documentation: Option<String>,
}

/// One callable signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInformation {
	/// Full signature label.
	pub label: String,
	/// Signature documentation.
	pub documentation: Option<String>,
	/// The parameters, in declaration order.
	pub parameters: Vec<ParameterInformation>,
}

/// Signature help for the call under the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureHelp {
	/// All overloads.
	pub signatures: Vec<SignatureInformation>,
	/// Index of the active overload.
	pub active_signature: u32,
	/// Index of the active parameter within the active overload.
	pub active_parameter: u32,
}

/// A command reference attached to a lens or action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRef {
	/// Human-readable title.
	pub title: String,
	/// Command identifier to execute.
	pub command: String,
	/// Arguments handed to the command.
	#[serde(default)]
	pub arguments: Vec<Value>,
}

impl CommandRef {
	/// Creates a command reference without arguments.
	pub fn new(title: impl Into<String>, command: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			command: command.into(),
			arguments: Vec::new(),
		}
	}
}

/// An actionable annotation anchored to a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLens {
	/// The anchoring span.
	pub range: Range,
	/// The command run when the lens is activated; `None` until resolved.
	pub command: Option<CommandRef>,
}

/// Edits across several resources, keyed by uri.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceEdit {
	/// Per-resource edit lists.
	pub changes: HashMap<Url, Vec<TextEdit>>,
}

impl WorkspaceEdit {
	/// Creates an empty edit.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an edit for a resource.
	pub fn add_edit(&mut self, uri: Url, edit: TextEdit) {
		self.changes.entry(uri).or_default().push(edit);
	}

	/// Returns true if no resource is edited.
	pub fn is_empty(&self) -> bool {
		self.changes.values().all(Vec::is_empty)
	}
}

/// A quick fix or refactoring offered for a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAction {
	/// Human-readable title.
	pub title: String,
	/// Command executed when the action is applied.
	pub command: Option<CommandRef>,
	/// Workspace edit applied when the action is applied.
	pub edit: Option<WorkspaceEdit>,
}

impl CodeAction {
	/// Creates an action with only a title.
	pub fn new(title: impl Into<String>) -> Self {
		Self { title: title.into(), command: None, edit: None }
	}
}

/// Options a formatting provider must honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingOptions {
	/// Rendered width of a tab.
	pub tab_size: u32,
	/// Prefer spaces over tabs.
	pub insert_spaces: bool,
}

impl Default for FormattingOptions {
	fn default() -> Self {
		Self { tab_size: 4, insert_spaces: true }
	}
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticSeverity {
	/// A hard error.
	Error,
	/// A warning.
	Warning,
	/// Informational note.
	Information,
	/// A hint, e.g. an unused-variable underline.
	Hint,
}

/// A compiler error or warning anchored to a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
	/// The span the diagnostic applies to.
	pub range: Range,
	/// Severity.
	pub severity: DiagnosticSeverity,
	/// Human-readable message.
	pub message: String,
	/// Producer of the diagnostic, e.g. a compiler name.
	pub source: Option<String>,
}

impl Diagnostic {
	/// Creates a diagnostic.
	pub fn new(range: Range, severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
		Self {
			range,
			severity,
			message: message.into(),
			source: None,
		}
	}

	/// Creates an error diagnostic.
	pub fn error(range: Range, message: impl Into<String>) -> Self {
		Self::new(range, DiagnosticSeverity::Error, message)
	}

	/// Creates a warning diagnostic.
	pub fn warning(range: Range, message: impl Into<String>) -> Self {
		Self::new(range, DiagnosticSeverity::Warning, message)
	}

	/// Sets the producer of the diagnostic.
	pub fn with_source(mut self, source: impl Into<String>) -> Self {
		self.source = Some(source.into());
		self
	}
}
