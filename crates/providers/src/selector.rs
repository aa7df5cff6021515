use std::path::Path;

use globset::{Glob, GlobMatcher};
use quill_document::TextDocument;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A matcher over one document facet set: language id, uri scheme, and/or
/// path glob.
///
/// The discriminators inside one filter are ANDed; a filter with none of
/// them is rejected at registration time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFilter {
	/// Language identifier, e.g. `"rust"`.
	pub language: Option<String>,
	/// Uri scheme, e.g. `"file"` or `"untitled"`.
	pub scheme: Option<String>,
	/// Glob pattern applied to the uri path, e.g. `"**/*.rs"`.
	pub pattern: Option<String>,
}

impl DocumentFilter {
	/// Creates a filter matching a language id.
	pub fn language(id: impl Into<String>) -> Self {
		Self { language: Some(id.into()), ..Self::default() }
	}

	/// Creates a filter matching a uri scheme.
	pub fn scheme(scheme: impl Into<String>) -> Self {
		Self { scheme: Some(scheme.into()), ..Self::default() }
	}

	/// Creates a filter matching a path glob.
	pub fn pattern(pattern: impl Into<String>) -> Self {
		Self { pattern: Some(pattern.into()), ..Self::default() }
	}

	/// Adds a scheme discriminator.
	pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
		self.scheme = Some(scheme.into());
		self
	}

	/// Adds a path glob discriminator.
	pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
		self.pattern = Some(pattern.into());
		self
	}

	fn compile(&self) -> Result<CompiledFilter> {
		if self.language.is_none() && self.scheme.is_none() && self.pattern.is_none() {
			return Err(Error::EmptyFilter);
		}
		let glob = match &self.pattern {
			None => None,
			Some(pattern) => Some(
				Glob::new(pattern)
					.map_err(|source| Error::InvalidPattern { pattern: pattern.clone(), source })?
					.compile_matcher(),
			),
		};
		Ok(CompiledFilter {
			language: self.language.clone(),
			scheme: self.scheme.clone(),
			glob,
		})
	}
}

/// A non-empty list of filters; a document matches if any filter does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSelector {
	filters: Vec<DocumentFilter>,
}

impl DocumentSelector {
	/// Creates a selector from filters.
	pub fn new(filters: impl IntoIterator<Item = DocumentFilter>) -> Self {
		Self {
			filters: filters.into_iter().collect(),
		}
	}

	/// Returns the filters of this selector.
	pub fn filters(&self) -> &[DocumentFilter] {
		&self.filters
	}

	/// Validates the selector and compiles its glob patterns.
	///
	/// Performed once at registration time so dispatch never re-parses
	/// patterns and malformed registrations are rejected up front.
	pub fn compile(&self) -> Result<CompiledSelector> {
		if self.filters.is_empty() {
			return Err(Error::EmptySelector);
		}
		let filters = self.filters.iter().map(DocumentFilter::compile).collect::<Result<Vec<_>>>()?;
		Ok(CompiledSelector { filters })
	}
}

impl From<&str> for DocumentSelector {
	fn from(language: &str) -> Self {
		Self::new([DocumentFilter::language(language)])
	}
}

impl From<DocumentFilter> for DocumentSelector {
	fn from(filter: DocumentFilter) -> Self {
		Self::new([filter])
	}
}

impl FromIterator<DocumentFilter> for DocumentSelector {
	fn from_iter<I: IntoIterator<Item = DocumentFilter>>(iter: I) -> Self {
		Self::new(iter)
	}
}

#[derive(Debug, Clone)]
struct CompiledFilter {
	language: Option<String>,
	scheme: Option<String>,
	glob: Option<GlobMatcher>,
}

impl CompiledFilter {
	fn matches(&self, document: &TextDocument) -> bool {
		if let Some(language) = &self.language
			&& language != document.language_id()
		{
			return false;
		}
		if let Some(scheme) = &self.scheme
			&& scheme != document.uri().scheme()
		{
			return false;
		}
		if let Some(glob) = &self.glob
			&& !glob.is_match(Path::new(document.uri().path()))
		{
			return false;
		}
		true
	}
}

/// A validated selector ready for dispatch-time matching.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
	filters: Vec<CompiledFilter>,
}

impl CompiledSelector {
	/// Returns true if any filter matches the document.
	pub fn matches(&self, document: &TextDocument) -> bool {
		self.filters.iter().any(|f| f.matches(document))
	}
}

#[cfg(test)]
mod tests {
	use url::Url;

	use super::*;

	fn doc(uri: &str, language: &str) -> TextDocument {
		TextDocument::new(Url::parse(uri).unwrap(), language, "")
	}

	#[test]
	fn test_language_filter() {
		let selector = DocumentSelector::from("rust").compile().unwrap();

		assert!(selector.matches(&doc("file:///a/lib.rs", "rust")));
		assert!(!selector.matches(&doc("file:///a/lib.py", "python")));
	}

	#[test]
	fn test_filter_discriminators_are_anded() {
		let selector = DocumentSelector::from(DocumentFilter::language("rust").with_scheme("file"))
			.compile()
			.unwrap();

		assert!(selector.matches(&doc("file:///a/lib.rs", "rust")));
		assert!(!selector.matches(&doc("untitled:one", "rust")));
	}

	#[test]
	fn test_filters_are_ored() {
		let selector = DocumentSelector::new([DocumentFilter::language("rust"), DocumentFilter::language("toml")])
			.compile()
			.unwrap();

		assert!(selector.matches(&doc("file:///a/lib.rs", "rust")));
		assert!(selector.matches(&doc("file:///a/Cargo.toml", "toml")));
		assert!(!selector.matches(&doc("file:///a/x.py", "python")));
	}

	#[test]
	fn test_pattern_filter() {
		let selector = DocumentSelector::from(DocumentFilter::pattern("**/tests/*.rs")).compile().unwrap();

		assert!(selector.matches(&doc("file:///proj/tests/it.rs", "rust")));
		assert!(!selector.matches(&doc("file:///proj/src/lib.rs", "rust")));
	}

	#[test]
	fn test_empty_selector_rejected() {
		let err = DocumentSelector::default().compile().unwrap_err();
		assert!(matches!(err, Error::EmptySelector));
	}

	#[test]
	fn test_empty_filter_rejected() {
		let err = DocumentSelector::from(DocumentFilter::default()).compile().unwrap_err();
		assert!(matches!(err, Error::EmptyFilter));
	}

	#[test]
	fn test_malformed_pattern_rejected() {
		let err = DocumentSelector::from(DocumentFilter::pattern("a{b")).compile().unwrap_err();
		assert!(matches!(err, Error::InvalidPattern { .. }));
	}
}
