use std::path::PathBuf;

use quill_primitives::{Position, Range};
use ropey::Rope;
use url::Url;

use crate::builder::EditBuilder;
use crate::changes::ContentChange;
use crate::Result;

/// An immutable-per-version sequence of lines.
///
/// Cloning is cheap (the rope shares its chunks), so a document can be
/// handed to concurrently running providers without synchronization: the
/// text behind one version never changes. Edits go through
/// [`apply_changes`](Self::apply_changes) or [`edit`](Self::edit) and
/// produce a new document with a strictly larger version.
#[derive(Debug, Clone)]
pub struct TextDocument {
	uri: Url,
	language_id: String,
	version: i32,
	rope: Rope,
}

impl TextDocument {
	/// Creates a document at version 0.
	pub fn new(uri: Url, language_id: impl Into<String>, text: &str) -> Self {
		Self {
			uri,
			language_id: language_id.into(),
			version: 0,
			rope: Rope::from_str(text),
		}
	}

	/// Returns the resource identifier of this document.
	pub fn uri(&self) -> &Url {
		&self.uri
	}

	/// Returns the filesystem path for `file:` documents.
	pub fn path(&self) -> Option<PathBuf> {
		self.uri.to_file_path().ok()
	}

	/// Returns true for documents not yet associated with a resource on disk.
	pub fn is_untitled(&self) -> bool {
		self.uri.scheme() == "untitled"
	}

	/// Returns the language identifier associated with this document.
	pub fn language_id(&self) -> &str {
		&self.language_id
	}

	/// Returns the version number. It strictly increases after each change.
	pub fn version(&self) -> i32 {
		self.version
	}

	/// Returns the entire text of this document.
	pub fn text(&self) -> String {
		self.rope.to_string()
	}

	/// Returns the number of lines.
	pub fn line_count(&self) -> u32 {
		self.rope.len_lines() as u32
	}

	/// Returns the text of a line without its line break.
	///
	/// Out-of-bounds lines clamp to the last line.
	pub fn line_text(&self, line: u32) -> String {
		let line = self.clamp_line(line);
		let slice = self.rope.line(line);
		let len = line_len_without_break(&slice);
		slice.slice(..len).to_string()
	}

	/// Returns the number of characters on a line, excluding the line break.
	pub fn line_length(&self, line: u32) -> u32 {
		let line = self.clamp_line(line);
		line_len_without_break(&self.rope.line(line)) as u32
	}

	/// Returns the text covered by `range`, after validation.
	pub fn text_in_range(&self, range: Range) -> String {
		let range = self.validate_range(range);
		let start = self.offset_at(range.start);
		let end = self.offset_at(range.end);
		self.rope.slice(start..end).to_string()
	}

	/// Converts a position to an absolute character offset.
	///
	/// The position is validated first, so stale coordinates clamp instead
	/// of failing.
	pub fn offset_at(&self, position: Position) -> usize {
		let position = self.validate_position(position);
		self.rope.line_to_char(position.line as usize) + position.character as usize
	}

	/// Converts an absolute character offset to a position.
	///
	/// Offsets past the end of the document clamp to the final position.
	pub fn position_at(&self, offset: usize) -> Position {
		let offset = offset.min(self.rope.len_chars());
		let line = self.rope.char_to_line(offset);
		let character = offset - self.rope.line_to_char(line);
		Position::new(line as u32, character as u32)
	}

	/// Clamps a position to the nearest in-bounds coordinate.
	///
	/// Never an error: coordinates must remain usable across asynchronous
	/// gaps between a provider being invoked and its result being applied.
	pub fn validate_position(&self, position: Position) -> Position {
		let line = self.clamp_line(position.line);
		let max_character = line_len_without_break(&self.rope.line(line)) as u32;
		Position::new(line as u32, position.character.min(max_character))
	}

	/// Clamps both endpoints of a range to in-bounds coordinates.
	pub fn validate_range(&self, range: Range) -> Range {
		Range::new(self.validate_position(range.start), self.validate_position(range.end))
	}

	/// Returns the word range under a position, or `None` on whitespace or
	/// punctuation.
	///
	/// Words are runs of alphanumeric characters and underscores.
	pub fn word_range_at(&self, position: Position) -> Option<Range> {
		let position = self.validate_position(position);
		let chars: Vec<char> = self.line_text(position.line).chars().collect();
		let idx = position.character as usize;

		let probe = if idx < chars.len() && is_word_char(chars[idx]) {
			idx
		} else if idx > 0 && idx <= chars.len() && is_word_char(chars[idx - 1]) {
			idx - 1
		} else {
			return None;
		};

		let mut start = probe;
		while start > 0 && is_word_char(chars[start - 1]) {
			start -= 1;
		}
		let mut end = probe + 1;
		while end < chars.len() && is_word_char(chars[end]) {
			end += 1;
		}

		Some(Range::new(
			Position::new(position.line, start as u32),
			Position::new(position.line, end as u32),
		))
	}

	/// Applies content changes in order, returning the next version.
	///
	/// Each change's range is validated against the evolving text before
	/// use; the whole batch bumps the version by one.
	pub fn apply_changes(&self, changes: &[ContentChange]) -> TextDocument {
		let mut rope = self.rope.clone();
		for change in changes {
			apply_one(&mut rope, change);
		}
		TextDocument {
			uri: self.uri.clone(),
			language_id: self.language_id.clone(),
			version: self.version + 1,
			rope,
		}
	}

	/// Runs `build` against a scoped [`EditBuilder`] and applies the
	/// collected edits as one new version.
	///
	/// The builder is valid only for the duration of the callback. Edits
	/// covering overlapping text are rejected as a whole with
	/// [`Error::OverlappingEdits`](crate::Error::OverlappingEdits).
	pub fn edit(&self, build: impl FnOnce(&mut EditBuilder)) -> Result<TextDocument> {
		let mut builder = EditBuilder::new();
		build(&mut builder);
		builder.apply_to(self)
	}

	fn clamp_line(&self, line: u32) -> usize {
		(line as usize).min(self.rope.len_lines().saturating_sub(1))
	}
}

/// Applies a single change against the evolving rope, clamping its range
/// against the text as it stands at this point in the batch.
fn apply_one(rope: &mut Rope, change: &ContentChange) {
	let start = clamp_to_offset(rope, change.range.start);
	let end = clamp_to_offset(rope, change.range.end);
	let (start, end) = if start <= end { (start, end) } else { (end, start) };
	rope.remove(start..end);
	rope.insert(start, &change.text);
}

fn clamp_to_offset(rope: &Rope, position: Position) -> usize {
	let line = (position.line as usize).min(rope.len_lines().saturating_sub(1));
	let max_character = line_len_without_break(&rope.line(line));
	rope.line_to_char(line) + (position.character as usize).min(max_character)
}

fn line_len_without_break(line: &ropey::RopeSlice<'_>) -> usize {
	let mut len = line.len_chars();
	let mut chars = line.chars_at(len);
	while let Some(c) = chars.prev() {
		if c == '\n' || c == '\r' {
			len -= 1;
		} else {
			break;
		}
	}
	len
}

fn is_word_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}
