use serde::{Deserialize, Serialize};

use crate::position::Position;
use crate::range::Range;

/// A directional range carrying anchor/active endpoints.
///
/// The anchor is where the selection started; the active end is where the
/// cursor logically rests. The embedded span is always the normalized
/// `Range::new(anchor, active)`, so `{anchor, active}` and `{start, end}`
/// coincide as a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "RawSelection")]
pub struct Selection {
	/// The fixed end of the selection.
	pub anchor: Position,
	/// The moving end of the selection (cursor position).
	pub active: Position,
	range: Range,
}

/// Wire shape of [`Selection`]; the embedded span is recomputed from the
/// endpoints rather than trusted from the data.
#[derive(Deserialize)]
struct RawSelection {
	anchor: Position,
	active: Position,
}

impl From<RawSelection> for Selection {
	fn from(raw: RawSelection) -> Self {
		Self::new(raw.anchor, raw.active)
	}
}

impl Selection {
	/// Creates a selection from anchor to active.
	pub fn new(anchor: Position, active: Position) -> Self {
		Self {
			anchor,
			active,
			range: Range::new(anchor, active),
		}
	}

	/// Creates a selection from four raw coordinates.
	pub fn from_coords(anchor_line: u32, anchor_character: u32, active_line: u32, active_character: u32) -> Self {
		Self::new(
			Position::new(anchor_line, anchor_character),
			Position::new(active_line, active_character),
		)
	}

	/// Creates a zero-width selection (cursor) at a position.
	pub fn point(position: Position) -> Self {
		Self::new(position, position)
	}

	/// Returns the normalized span of this selection.
	#[inline]
	pub fn range(&self) -> Range {
		self.range
	}

	/// Returns the earlier endpoint.
	#[inline]
	pub fn start(&self) -> Position {
		self.range.start
	}

	/// Returns the later endpoint.
	#[inline]
	pub fn end(&self) -> Position {
		self.range.end
	}

	/// Returns true if anchor and active coincide.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.anchor == self.active
	}

	/// Returns true if the active end precedes the anchor.
	///
	/// A reversed selection has its anchor at `end` and its cursor at
	/// `start`. Empty selections are not reversed.
	#[inline]
	pub fn is_reversed(&self) -> bool {
		self.active.is_before(self.anchor)
	}

	/// Returns a selection with anchor and active swapped.
	pub fn flip(&self) -> Self {
		Self::new(self.active, self.anchor)
	}
}

impl From<Range> for Selection {
	fn from(range: Range) -> Self {
		Self::new(range.start, range.end)
	}
}
