use quill_primitives::Range;
use serde::{Deserialize, Serialize};

/// A single content change: the replaced range and its new text.
///
/// The range addresses pre-change positions. Within one batch each change is
/// interpreted against the text as rewritten by the changes before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
	/// The range that got replaced.
	pub range: Range,
	/// The new text for the range.
	pub text: String,
}

impl ContentChange {
	/// Creates a change replacing `range` with `text`.
	pub fn new(range: Range, text: impl Into<String>) -> Self {
		Self { range, text: text.into() }
	}

	/// Creates a change replacing the whole document.
	///
	/// The range is clamped by the receiving document, so an end position
	/// past any real document extent selects everything.
	pub fn full(text: impl Into<String>) -> Self {
		Self {
			range: Range::from_coords(0, 0, u32::MAX, u32::MAX),
			text: text.into(),
		}
	}
}
