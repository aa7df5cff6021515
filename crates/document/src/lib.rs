//! Versioned text documents.
//!
//! A [`TextDocument`] is an immutable-per-version snapshot of text backed by
//! a rope. Every change produces a new document with a strictly larger
//! version; readers of one version never need synchronization. Coordinates
//! from a possibly stale computation are never an error: the `validate_*`
//! operations clamp them to the nearest in-bounds coordinate.

/// Scoped edit collection with overlap rejection.
pub mod builder;
/// Content change payloads and application.
pub mod changes;
/// The versioned document type.
pub mod document;

pub use builder::EditBuilder;
pub use changes::ContentChange;
pub use document::TextDocument;

/// A convenient type alias for `Result` with `E` = [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible document errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// Two edits in one batch cover overlapping text.
	#[error("overlapping edits: {first:?} and {second:?}")]
	OverlappingEdits {
		/// The earlier edit's span.
		first: quill_primitives::Range,
		/// The conflicting edit's span.
		second: quill_primitives::Range,
	},
}
