use std::fmt;

use serde::{Deserialize, Serialize};

/// A line/character coordinate in a text document.
///
/// Positions are immutable values ordered lexicographically by `(line, character)`.
/// Both fields are zero-based; non-negativity holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
	/// Zero-based line index.
	pub line: u32,
	/// Zero-based character offset within the line.
	pub character: u32,
}

impl Position {
	/// Creates a new position.
	pub const fn new(line: u32, character: u32) -> Self {
		Self { line, character }
	}

	/// Returns true if this position is strictly before `other`.
	#[inline]
	pub fn is_before(&self, other: Position) -> bool {
		*self < other
	}

	/// Returns true if this position is before or equal to `other`.
	#[inline]
	pub fn is_before_or_equal(&self, other: Position) -> bool {
		*self <= other
	}

	/// Returns true if this position is strictly after `other`.
	#[inline]
	pub fn is_after(&self, other: Position) -> bool {
		*self > other
	}

	/// Returns true if this position is after or equal to `other`.
	#[inline]
	pub fn is_after_or_equal(&self, other: Position) -> bool {
		*self >= other
	}

	/// Returns a position shifted by the given deltas, saturating at zero.
	pub fn translate(&self, delta_line: i64, delta_character: i64) -> Self {
		Self {
			line: saturating_apply(self.line, delta_line),
			character: saturating_apply(self.character, delta_character),
		}
	}

	/// Returns a position with the same character on a different line.
	pub const fn with_line(&self, line: u32) -> Self {
		Self { line, character: self.character }
	}

	/// Returns a position with a different character on the same line.
	pub const fn with_character(&self, character: u32) -> Self {
		Self { line: self.line, character }
	}
}

fn saturating_apply(base: u32, delta: i64) -> u32 {
	let shifted = i64::from(base).saturating_add(delta);
	shifted.clamp(0, i64::from(u32::MAX)) as u32
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.line, self.character)
	}
}
