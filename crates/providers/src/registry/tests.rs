use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use quill_events::CancellationTokenSource;
use quill_primitives::BoxFutureSend;
use url::Url;

use super::*;
use crate::selector::DocumentFilter;
use crate::types::{CompletionItem, SymbolKind};
use crate::Error;

fn doc(uri: &str, language: &str) -> TextDocument {
	TextDocument::new(Url::parse(uri).unwrap(), language, "fn main() {}\n")
}

struct StaticHover {
	text: &'static str,
	calls: Arc<AtomicUsize>,
}

impl StaticHover {
	fn new(text: &'static str) -> (Arc<Self>, Arc<AtomicUsize>) {
		let calls = Arc::new(AtomicUsize::new(0));
		(Arc::new(Self { text, calls: calls.clone() }), calls)
	}
}

impl HoverProvider for StaticHover {
	fn provide_hover<'a>(
		&'a self,
		_document: &'a TextDocument,
		_position: Position,
		_token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Hover>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Box::pin(async move { Ok(Some(Hover::new(self.text))) })
	}
}

struct FailingHover;

impl HoverProvider for FailingHover {
	fn provide_hover<'a>(
		&'a self,
		_document: &'a TextDocument,
		_position: Position,
		_token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Hover>>> {
		Box::pin(async move { Err(Error::provider("backend unavailable")) })
	}
}

struct SilentHover;

impl HoverProvider for SilentHover {
	fn provide_hover<'a>(
		&'a self,
		_document: &'a TextDocument,
		_position: Position,
		_token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Hover>>> {
		Box::pin(async move { Ok(None) })
	}
}

struct StaticCompletions(Vec<&'static str>);

impl CompletionProvider for StaticCompletions {
	fn provide_completions<'a>(
		&'a self,
		_document: &'a TextDocument,
		_position: Position,
		_token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<CompletionList>>> {
		Box::pin(async move {
			let items: Vec<CompletionItem> = self.0.iter().map(|label| CompletionItem::new(*label)).collect();
			Ok(Some(items.into()))
		})
	}
}

struct TriggeredCompletions(&'static [char]);

impl CompletionProvider for TriggeredCompletions {
	fn provide_completions<'a>(
		&'a self,
		_document: &'a TextDocument,
		_position: Position,
		_token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<CompletionList>>> {
		Box::pin(async move { Ok(None) })
	}

	fn trigger_characters(&self) -> &[char] {
		self.0
	}
}

struct StaticSymbols(&'static str);

impl WorkspaceSymbolProvider for StaticSymbols {
	fn provide_workspace_symbols<'a>(
		&'a self,
		query: &'a str,
		_token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<Vec<SymbolInformation>>>> {
		Box::pin(async move {
			if !self.0.contains(query) {
				return Ok(None);
			}
			Ok(Some(vec![SymbolInformation {
				name: self.0.to_string(),
				kind: SymbolKind::Function,
				location: Location::new(Url::parse("file:///a/lib.rs").unwrap(), Range::default()),
				container_name: None,
			}]))
		})
	}
}

struct StaticRename(&'static str);

impl RenameProvider for StaticRename {
	fn provide_rename<'a>(
		&'a self,
		document: &'a TextDocument,
		_position: Position,
		_new_name: &'a str,
		_token: CancellationToken,
	) -> BoxFutureSend<'a, Result<Option<WorkspaceEdit>>> {
		Box::pin(async move {
			let mut edit = WorkspaceEdit::new();
			edit.add_edit(document.uri().clone(), quill_primitives::TextEdit::insert(Position::default(), self.0));
			Ok(Some(edit))
		})
	}
}

#[tokio::test]
async fn test_hover_dispatch_in_registration_order() {
	let registry = LanguageRegistry::new();
	let (first, _) = StaticHover::new("first");
	let (second, _) = StaticHover::new("second");

	let _a = registry.register_hover_provider("rust", first).unwrap();
	let _b = registry.register_hover_provider("rust", second).unwrap();

	let d = doc("file:///a/lib.rs", "rust");
	let token = CancellationTokenSource::new().token();
	let hovers = registry.request_hover(&d, Position::default(), &token).await;

	let texts: Vec<&str> = hovers.iter().map(|h| h.contents.as_str()).collect();
	assert_eq!(texts, vec!["first", "second"]);
}

#[tokio::test]
async fn test_dispose_removes_only_that_registration() {
	let registry = LanguageRegistry::new();
	let (keep, keep_calls) = StaticHover::new("keep");
	let (drop_me, drop_calls) = StaticHover::new("drop");

	let _keep = registry.register_hover_provider("rust", keep).unwrap();
	let dropped = registry.register_hover_provider("rust", drop_me).unwrap();

	dropped.dispose();
	dropped.dispose();
	assert_eq!(registry.provider_count(Capability::Hover), 1);

	let d = doc("file:///a/lib.rs", "rust");
	let token = CancellationTokenSource::new().token();
	let hovers = registry.request_hover(&d, Position::default(), &token).await;

	assert_eq!(hovers.len(), 1);
	assert_eq!(hovers[0].contents, "keep");
	assert_eq!(keep_calls.load(Ordering::SeqCst), 1);
	assert_eq!(drop_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_provider_failure_is_isolated() {
	let registry = LanguageRegistry::new();
	let (good, _) = StaticHover::new("still here");

	let _bad = registry.register_hover_provider("rust", Arc::new(FailingHover)).unwrap();
	let _good = registry.register_hover_provider("rust", good).unwrap();

	let d = doc("file:///a/lib.rs", "rust");
	let token = CancellationTokenSource::new().token();
	let hovers = registry.request_hover(&d, Position::default(), &token).await;

	assert_eq!(hovers.len(), 1);
	assert_eq!(hovers[0].contents, "still here");
}

#[tokio::test]
async fn test_empty_contribution_is_not_an_error() {
	let registry = LanguageRegistry::new();
	let (good, _) = StaticHover::new("something");

	let _silent = registry.register_hover_provider("rust", Arc::new(SilentHover)).unwrap();
	let _good = registry.register_hover_provider("rust", good).unwrap();

	let d = doc("file:///a/lib.rs", "rust");
	let token = CancellationTokenSource::new().token();
	let hovers = registry.request_hover(&d, Position::default(), &token).await;

	assert_eq!(hovers.len(), 1);
}

#[tokio::test]
async fn test_selector_gates_dispatch() {
	let registry = LanguageRegistry::new();
	let (rust, rust_calls) = StaticHover::new("rust hover");
	let (python, python_calls) = StaticHover::new("python hover");

	let _r = registry.register_hover_provider("rust", rust).unwrap();
	let _p = registry.register_hover_provider("python", python).unwrap();

	let d = doc("file:///a/lib.rs", "rust");
	let token = CancellationTokenSource::new().token();
	let hovers = registry.request_hover(&d, Position::default(), &token).await;

	assert_eq!(hovers.len(), 1);
	assert_eq!(rust_calls.load(Ordering::SeqCst), 1);
	assert_eq!(python_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pattern_selector_gates_dispatch() {
	let registry = LanguageRegistry::new();
	let (tests_only, _) = StaticHover::new("tests only");

	let selector = DocumentSelector::from(DocumentFilter::pattern("**/tests/*.rs"));
	let _h = registry.register_hover_provider(selector, tests_only).unwrap();

	let token = CancellationTokenSource::new().token();
	let inside = doc("file:///proj/tests/it.rs", "rust");
	let outside = doc("file:///proj/src/lib.rs", "rust");

	assert_eq!(registry.request_hover(&inside, Position::default(), &token).await.len(), 1);
	assert_eq!(registry.request_hover(&outside, Position::default(), &token).await.len(), 0);
}

#[tokio::test]
async fn test_cancelled_token_short_circuits() {
	let registry = LanguageRegistry::new();
	let (provider, calls) = StaticHover::new("never seen");

	let _h = registry.register_hover_provider("rust", provider).unwrap();

	let source = CancellationTokenSource::new();
	source.cancel();
	let d = doc("file:///a/lib.rs", "rust");
	let hovers = registry.request_hover(&d, Position::default(), &source.token()).await;

	assert!(hovers.is_empty());
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_invalid_selector_rejected_at_registration() {
	let registry = LanguageRegistry::new();
	let (provider, _) = StaticHover::new("x");

	let err = registry
		.register_hover_provider(DocumentSelector::default(), provider)
		.unwrap_err();

	assert!(matches!(err, Error::EmptySelector));
	assert_eq!(registry.provider_count(Capability::Hover), 0);
}

#[tokio::test]
async fn test_completion_lists_merge_across_providers() {
	let registry = LanguageRegistry::new();

	let _a = registry
		.register_completion_provider("rust", Arc::new(StaticCompletions(vec!["alpha", "beta"])))
		.unwrap();
	let _b = registry
		.register_completion_provider("rust", Arc::new(StaticCompletions(vec!["gamma"])))
		.unwrap();

	let d = doc("file:///a/lib.rs", "rust");
	let token = CancellationTokenSource::new().token();
	let list = registry.request_completions(&d, Position::default(), &token).await;

	let labels: Vec<&str> = list.items.iter().map(|i| i.label.as_str()).collect();
	assert_eq!(labels, vec!["alpha", "beta", "gamma"]);
	assert!(!list.is_incomplete);
}

#[test]
fn test_trigger_characters_aggregate_across_matching_providers() {
	let registry = LanguageRegistry::new();

	let _dotted = registry
		.register_completion_provider("rust", Arc::new(TriggeredCompletions(&['.', ':'])))
		.unwrap();
	let _plain = registry
		.register_completion_provider("rust", Arc::new(StaticCompletions(vec!["x"])))
		.unwrap();
	let _python = registry
		.register_completion_provider("python", Arc::new(TriggeredCompletions(&['('])))
		.unwrap();

	let d = doc("file:///a/lib.rs", "rust");
	assert_eq!(registry.completion_trigger_characters(&d), vec!['.', ':']);
	assert!(registry.signature_help_trigger_characters(&d).is_empty());
}

#[tokio::test]
async fn test_workspace_symbols_reach_all_providers() {
	let registry = LanguageRegistry::new();

	let _a = registry
		.register_workspace_symbol_provider("rust", Arc::new(StaticSymbols("parse_header")))
		.unwrap();
	let _b = registry
		.register_workspace_symbol_provider("python", Arc::new(StaticSymbols("parse_body")))
		.unwrap();

	let token = CancellationTokenSource::new().token();
	let symbols = registry.request_workspace_symbols("parse", &token).await;

	assert_eq!(symbols.len(), 2);
}

#[tokio::test]
async fn test_rename_first_contribution_wins() {
	let registry = LanguageRegistry::new();

	let _a = registry.register_rename_provider("rust", Arc::new(StaticRename("first"))).unwrap();
	let _b = registry.register_rename_provider("rust", Arc::new(StaticRename("second"))).unwrap();

	let d = doc("file:///a/lib.rs", "rust");
	let token = CancellationTokenSource::new().token();
	let edit = registry.request_rename(&d, Position::default(), "renamed", &token).await.unwrap();

	let edits = &edit.changes[d.uri()];
	assert_eq!(edits[0].new_text, "first");
}
