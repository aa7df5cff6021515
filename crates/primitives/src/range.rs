use serde::{Deserialize, Serialize};

use crate::position::Position;
use crate::selection::Selection;

/// A span of text delimited by two positions.
///
/// The invariant `start <= end` always holds: constructing a range from
/// out-of-order endpoints silently swaps them. That is a correctness
/// invariant, not an error condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "RawRange")]
pub struct Range {
	/// Start of the span (inclusive).
	pub start: Position,
	/// End of the span (inclusive for containment checks).
	pub end: Position,
}

/// Wire shape of [`Range`]; conversion re-normalizes endpoint order so
/// deserialized data upholds the same invariant as constructed values.
#[derive(Deserialize)]
struct RawRange {
	start: Position,
	end: Position,
}

impl From<RawRange> for Range {
	fn from(raw: RawRange) -> Self {
		Self::new(raw.start, raw.end)
	}
}

/// Argument to [`Range::contains`]: either a single position or a whole range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeTarget {
	/// A single coordinate.
	Position(Position),
	/// A sub-span.
	Range(Range),
}

impl From<Position> for RangeTarget {
	fn from(position: Position) -> Self {
		Self::Position(position)
	}
}

impl From<Range> for RangeTarget {
	fn from(range: Range) -> Self {
		Self::Range(range)
	}
}

impl Range {
	/// Creates a range, swapping the endpoints if they are out of order.
	pub fn new(start: Position, end: Position) -> Self {
		if end.is_before(start) {
			Self { start: end, end: start }
		} else {
			Self { start, end }
		}
	}

	/// Creates a range from four raw coordinates, normalizing endpoint order.
	pub fn from_coords(start_line: u32, start_character: u32, end_line: u32, end_character: u32) -> Self {
		Self::new(
			Position::new(start_line, start_character),
			Position::new(end_line, end_character),
		)
	}

	/// Creates a zero-length range at a position.
	pub const fn point(position: Position) -> Self {
		Self { start: position, end: position }
	}

	/// Returns true if start and end are equal.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if start and end are on the same line.
	#[inline]
	pub fn is_single_line(&self) -> bool {
		self.start.line == self.end.line
	}

	/// Returns true if the target lies within this range.
	///
	/// A position is contained iff `start <= p <= end` (inclusive on both
	/// ends); a range is contained iff its whole extent is.
	pub fn contains(&self, target: impl Into<RangeTarget>) -> bool {
		match target.into() {
			RangeTarget::Position(p) => self.start.is_before_or_equal(p) && p.is_before_or_equal(self.end),
			RangeTarget::Range(r) => self.start.is_before_or_equal(r.start) && r.end.is_before_or_equal(self.end),
		}
	}

	/// Returns the smallest range covering both this range and `other`.
	pub fn union(&self, other: Range) -> Self {
		Self {
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}

	/// Returns the overlap of this range and `other`, if any.
	pub fn intersection(&self, other: Range) -> Option<Self> {
		let start = self.start.max(other.start);
		let end = self.end.min(other.end);
		if end.is_before(start) { None } else { Some(Self { start, end }) }
	}

	/// Returns a range with the given start, re-normalizing endpoint order.
	pub fn with_start(&self, start: Position) -> Self {
		Self::new(start, self.end)
	}

	/// Returns a range with the given end, re-normalizing endpoint order.
	pub fn with_end(&self, end: Position) -> Self {
		Self::new(self.start, end)
	}
}

impl From<Selection> for Range {
	fn from(selection: Selection) -> Self {
		selection.range()
	}
}
