use quill_primitives::{Position, Range, Selection, TextEdit};

use crate::changes::ContentChange;
use crate::document::TextDocument;
use crate::{Error, Result};

/// Target of an [`EditBuilder`] operation: a position, range, or selection.
#[derive(Debug, Clone, Copy)]
pub enum EditTarget {
	/// Insert point.
	Position(Position),
	/// Replaced span.
	Range(Range),
	/// Replaced span taken from a selection.
	Selection(Selection),
}

impl From<Position> for EditTarget {
	fn from(position: Position) -> Self {
		Self::Position(position)
	}
}

impl From<Range> for EditTarget {
	fn from(range: Range) -> Self {
		Self::Range(range)
	}
}

impl From<Selection> for EditTarget {
	fn from(selection: Selection) -> Self {
		Self::Selection(selection)
	}
}

impl EditTarget {
	fn into_range(self) -> Range {
		match self {
			Self::Position(p) => Range::point(p),
			Self::Range(r) => r,
			Self::Selection(s) => s.range(),
		}
	}
}

/// Collects edits during a scoped callback.
///
/// The builder only describes edits; it mutates nothing. It is handed to the
/// consumer's callback by [`TextDocument::edit`] and is valid only for the
/// duration of that callback, after which the collected edits are checked
/// for overlap and applied as one new document version.
#[derive(Debug, Default)]
pub struct EditBuilder {
	edits: Vec<TextEdit>,
}

impl EditBuilder {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Replaces the target span with `text`.
	pub fn replace(&mut self, target: impl Into<EditTarget>, text: impl Into<String>) {
		self.edits.push(TextEdit::replace(target.into().into_range(), text));
	}

	/// Inserts `text` at a position.
	pub fn insert(&mut self, position: Position, text: impl Into<String>) {
		self.edits.push(TextEdit::insert(position, text));
	}

	/// Deletes the target span.
	pub fn delete(&mut self, target: impl Into<EditTarget>) {
		self.edits.push(TextEdit::delete(target.into().into_range()));
	}

	/// Returns the edits collected so far.
	pub fn edits(&self) -> &[TextEdit] {
		&self.edits
	}

	/// Validates the collected edits and applies them to `document`.
	///
	/// Edits are applied back-to-front so earlier spans stay valid while
	/// later ones are rewritten. Overlapping spans reject the whole batch.
	pub(crate) fn apply_to(self, document: &TextDocument) -> Result<TextDocument> {
		let mut edits = self.edits;
		edits.sort_by_key(|e| (e.range.start, e.range.end));

		for pair in edits.windows(2) {
			// Touching spans are fine; strictly overlapping ones are not.
			if pair[1].range.start.is_before(pair[0].range.end) {
				return Err(Error::OverlappingEdits {
					first: pair[0].range,
					second: pair[1].range,
				});
			}
		}

		let changes: Vec<ContentChange> = edits
			.into_iter()
			.rev()
			.map(|e| ContentChange::new(e.range, e.new_text))
			.collect();
		Ok(document.apply_changes(&changes))
	}
}
