use serde::{Deserialize, Serialize};

use crate::position::Position;
use crate::range::Range;

/// A single edit operation: replace `range` with `new_text`.
///
/// An empty range models an insert; empty text models a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
	/// The span to replace.
	pub range: Range,
	/// The replacement text.
	pub new_text: String,
}

impl TextEdit {
	/// Replaces `range` with `new_text`.
	pub fn replace(range: Range, new_text: impl Into<String>) -> Self {
		Self { range, new_text: new_text.into() }
	}

	/// Inserts `new_text` at `position`.
	pub fn insert(position: Position, new_text: impl Into<String>) -> Self {
		Self {
			range: Range::point(position),
			new_text: new_text.into(),
		}
	}

	/// Deletes the text covered by `range`.
	pub fn delete(range: Range) -> Self {
		Self { range, new_text: String::new() }
	}

	/// Returns true if this edit neither removes nor inserts text.
	pub fn is_noop(&self) -> bool {
		self.range.is_empty() && self.new_text.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_edit_constructors() {
		let r = Range::from_coords(0, 1, 0, 4);

		assert_eq!(TextEdit::replace(r, "abc").new_text, "abc");
		assert!(TextEdit::insert(Position::new(2, 0), "x").range.is_empty());
		assert!(TextEdit::delete(r).new_text.is_empty());
		assert!(TextEdit::insert(Position::new(0, 0), "").is_noop());
		assert!(!TextEdit::delete(r).is_noop());
	}
}
