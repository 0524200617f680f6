//! Text buffer: line storage plus the editing primitives.
//!
//! A `Buffer` wraps a [`ropey::Rope`] and exposes it as an ordered list of
//! lines. Only `\n` separates lines (ropey is built without its CR/Unicode
//! line-break features), so a `\r` in a CRLF file is simply the last char of
//! its line and survives a load/save cycle untouched.
//!
//! # Invariants
//!
//! - The buffer always has at least one line. An empty rope is one empty line.
//! - Every editing primitive is **total**: it clamps its input position to
//!   the buffer first and never panics. Each returns the cursor position the
//!   edit leaves behind.
//! - `revision` increases on every call that actually changes text, and
//!   `modified` is set at the same moment. A call that changes nothing (e.g.
//!   forward delete at the very end of the buffer) leaves both alone.
//!
//! File I/O guards (size ceiling, binary detection, backups) live in
//! [`crate::file`]; this module only turns their output into a rope.

use std::fmt;
use std::path::{Path, PathBuf};

use ropey::{Rope, RopeSlice};

use crate::file::{self, LoadError, LoadLimits, SaveError};
use crate::position::Position;

/// A text buffer backed by a rope.
///
/// Positions are `(line, col)` with `col` counted in chars. See
/// [`Position`] for the coordinate conventions.
pub struct Buffer {
    rope: Rope,
    path: Option<PathBuf>,
    modified: bool,
    revision: u64,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// A single empty line with no file path.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            path: None,
            modified: false,
            revision: 0,
        }
    }

    /// A buffer holding `text` verbatim. Lines are split on `\n`; a trailing
    /// `\n` produces a trailing empty line.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            path: None,
            modified: false,
            revision: 0,
        }
    }

    /// Load a buffer from disk, applying the size and binary guards.
    ///
    /// One trailing newline is dropped, so `"a\nb\n"` loads as the two lines
    /// `a` and `b`. The buffer starts unmodified.
    ///
    /// # Errors
    ///
    /// Any [`LoadError`]; a missing file is [`LoadError::NotFound`], which
    /// callers treat as "new file" rather than a failure.
    pub fn from_file(path: &Path, limits: &LoadLimits) -> Result<Self, LoadError> {
        let text = file::read_text(path, limits)?;
        Ok(Self {
            rope: Rope::from_str(&text),
            path: Some(path.to_path_buf()),
            modified: false,
            revision: 0,
        })
    }

    // -- Text access --------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Number of lines, always at least 1.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Index of the last line.
    #[inline]
    #[must_use]
    pub fn last_line(&self) -> usize {
        self.line_count() - 1
    }

    /// Content of `line` without its trailing `\n`. `None` past the end.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        if line >= self.line_count() {
            return None;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            Some(slice.slice(..len - 1))
        } else {
            Some(slice)
        }
    }

    /// Content of `line` as an owned string (empty past the end).
    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        self.line(line).map(String::from).unwrap_or_default()
    }

    /// Char length of `line`, excluding the newline. 0 past the end.
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        self.line(line).map_or(0, |l| l.len_chars())
    }

    /// The char under `pos`, or `None` when `pos` is past the line's end.
    #[must_use]
    pub fn char_at(&self, pos: Position) -> Option<char> {
        let line = self.line(pos.line)?;
        (pos.col < line.len_chars()).then(|| line.char(pos.col))
    }

    /// All lines joined by `\n`. This is exactly what gets written to disk.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// Total char count.
    #[inline]
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    // -- Coordinates --------------------------------------------------------

    /// Clamp `pos` into the buffer: line to the last line, column to the
    /// line's length (the past-the-end slot is valid).
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.last_line());
        Position::new(line, pos.col.min(self.line_len(line)))
    }

    /// Absolute char index of a position, after clamping.
    #[must_use]
    pub fn char_index(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        self.rope.line_to_char(pos.line) + pos.col
    }

    /// The position of an absolute char index (clamped to the buffer end).
    #[must_use]
    pub fn position_of(&self, char_idx: usize) -> Position {
        let idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        Position::new(line, idx - self.rope.line_to_char(line))
    }

    // -- Editing primitives -------------------------------------------------

    /// Splice `ch` into the line at `pos`. Returns the position after it.
    ///
    /// A `'\n'` behaves like [`split_line`](Self::split_line).
    pub fn insert_char(&mut self, pos: Position, ch: char) -> Position {
        if ch == '\n' {
            return self.split_line(pos);
        }
        let idx = self.char_index(pos);
        self.rope.insert_char(idx, ch);
        self.touch();
        self.position_of(idx + 1)
    }

    /// Splice arbitrary text (possibly spanning lines) at `pos`. Returns the
    /// position just after the inserted text: for multi-line text that is
    /// the last inserted line, at the length of its pasted part.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Position {
        let idx = self.char_index(pos);
        if text.is_empty() {
            return self.position_of(idx);
        }
        self.rope.insert(idx, text);
        self.touch();
        self.position_of(idx + text.chars().count())
    }

    /// Backspace. Removes the char before `pos`; at column 0 joins the line
    /// onto the previous one and lands on the join point. No-op at `(0, 0)`.
    pub fn delete_before(&mut self, pos: Position) -> Position {
        let pos = self.clamp(pos);
        if pos.col > 0 {
            let idx = self.char_index(pos);
            self.rope.remove(idx - 1..idx);
            self.touch();
            return pos.with_col(pos.col - 1);
        }
        if pos.line == 0 {
            return pos;
        }
        let prev = pos.line - 1;
        let join = Position::new(prev, self.line_len(prev));
        self.join_next_line_onto(prev);
        join
    }

    /// Forward delete (`x`, Delete). Removes the char under `pos`; past the
    /// end of a line joins the next line on. The cursor does not move except
    /// for clamping. No-op at the end of the last line.
    pub fn delete_at(&mut self, pos: Position) -> Position {
        let pos = self.clamp(pos);
        if pos.col < self.line_len(pos.line) {
            let idx = self.char_index(pos);
            self.rope.remove(idx..=idx);
            self.touch();
        } else {
            self.join_next_line_onto(pos.line);
        }
        self.clamp(pos)
    }

    /// Enter. Breaks the line at `pos`; the tail moves to a new line below
    /// and the cursor goes to its start.
    pub fn split_line(&mut self, pos: Position) -> Position {
        let idx = self.char_index(pos);
        self.rope.insert_char(idx, '\n');
        self.touch();
        Position::new(self.clamp(pos).line + 1, 0)
    }

    /// Append line `line + 1` to `line` and remove it. Returns `false` (and
    /// changes nothing) when `line` is the last line.
    pub fn join_next_line_onto(&mut self, line: usize) -> bool {
        if line >= self.last_line() {
            return false;
        }
        let newline = self.rope.line_to_char(line) + self.line_len(line);
        self.rope.remove(newline..=newline);
        self.touch();
        true
    }

    /// `o`: open an empty line below `line`. Cursor goes to its start.
    pub fn insert_line_after(&mut self, line: usize) -> Position {
        let line = line.min(self.last_line());
        let end = self.rope.line_to_char(line) + self.line_len(line);
        self.rope.insert_char(end, '\n');
        self.touch();
        Position::new(line + 1, 0)
    }

    /// `O`: open an empty line above `line`. Cursor goes to its start.
    pub fn insert_line_before(&mut self, line: usize) -> Position {
        let line = line.min(self.last_line());
        let start = self.rope.line_to_char(line);
        self.rope.insert_char(start, '\n');
        self.touch();
        Position::new(line, 0)
    }

    /// `dd`: remove the line under `pos`. The only line is cleared instead of
    /// removed. The cursor keeps its column, clamped to the new line.
    pub fn delete_line(&mut self, pos: Position) -> Position {
        let pos = self.clamp(pos);
        let count = self.line_count();
        if count == 1 {
            if self.rope.len_chars() > 0 {
                self.rope.remove(..);
                self.touch();
            }
            return Position::ZERO;
        }

        let start = self.rope.line_to_char(pos.line);
        let range = if pos.line + 1 < count {
            start..self.rope.line_to_char(pos.line + 1)
        } else {
            // Last line: take the newline that ends the previous line instead.
            start - 1..self.rope.len_chars()
        };
        self.rope.remove(range);
        self.touch();
        self.clamp(pos)
    }

    // -- Metadata -----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// True when the text differs from what was last loaded or saved.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Force the modified flag, e.g. for a brand-new file that has never
    /// been written.
    #[inline]
    pub const fn mark_modified(&mut self) {
        self.modified = true;
    }

    /// Bumped by every real text change. Caches keyed on buffer content
    /// compare against this.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    const fn touch(&mut self) {
        self.modified = true;
        self.revision += 1;
    }

    // -- File I/O -----------------------------------------------------------

    /// Write to the buffer's own path. See [`save_as`](Self::save_as).
    ///
    /// # Errors
    ///
    /// [`SaveError::NoPath`] when the buffer has no path, otherwise any
    /// write failure.
    pub fn save(&mut self, backup: bool) -> Result<(), SaveError> {
        let path = self.path.clone().ok_or(SaveError::NoPath)?;
        self.save_as(&path, backup)
    }

    /// Write the lines joined by `\n` to `path` and adopt it as the buffer's
    /// path. With `backup`, an existing file is first copied to `<path>.bak`
    /// (best effort). On failure nothing about the buffer changes.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Write`] if the file cannot be written.
    pub fn save_as(&mut self, path: &Path, backup: bool) -> Result<(), SaveError> {
        if backup {
            file::backup_existing(path);
        }
        file::write_text(path, &self.contents())?;
        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.len_chars())
            .field("modified", &self.modified)
            .field("revision", &self.revision)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn lines(buf: &Buffer) -> Vec<String> {
        (0..buf.line_count()).map(|i| buf.line_text(i)).collect()
    }

    fn buf(text: &str) -> Buffer {
        Buffer::from_text(text)
    }

    // -- Construction & access ----------------------------------------------

    #[test]
    fn new_buffer_has_one_empty_line() {
        let b = Buffer::new();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line_text(0), "");
        assert!(!b.is_modified());
        assert_eq!(b.revision(), 0);
    }

    #[test]
    fn lines_exclude_newline() {
        let b = buf("hello\nworld");
        assert_eq!(lines(&b), vec!["hello", "world"]);
        assert_eq!(b.line_len(0), 5);
        assert_eq!(b.line_len(7), 0);
        assert!(b.line(2).is_none());
    }

    #[test]
    fn carriage_return_is_content() {
        let b = buf("a\r\nb");
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line_text(0), "a\r");
        assert_eq!(b.line_len(0), 2);
    }

    #[test]
    fn char_at_stops_at_line_end() {
        let b = buf("ab\ncd");
        assert_eq!(b.char_at(Position::new(0, 1)), Some('b'));
        assert_eq!(b.char_at(Position::new(0, 2)), None);
        assert_eq!(b.char_at(Position::new(1, 0)), Some('c'));
        assert_eq!(b.char_at(Position::new(9, 0)), None);
    }

    #[test]
    fn clamp_limits_line_and_col() {
        let b = buf("hello\nhi");
        assert_eq!(b.clamp(Position::new(0, 99)), Position::new(0, 5));
        assert_eq!(b.clamp(Position::new(9, 9)), Position::new(1, 2));
        assert_eq!(b.clamp(Position::new(1, 1)), Position::new(1, 1));
    }

    #[test]
    fn position_of_roundtrips_char_index() {
        let b = buf("ab\n\ncafé");
        for line in 0..b.line_count() {
            for col in 0..=b.line_len(line) {
                let p = Position::new(line, col);
                assert_eq!(b.position_of(b.char_index(p)), p);
            }
        }
    }

    // -- insert_char ---------------------------------------------------------

    #[test]
    fn insert_char_advances_col() {
        let mut b = buf("hllo");
        let p = b.insert_char(Position::new(0, 1), 'e');
        assert_eq!(b.line_text(0), "hello");
        assert_eq!(p, Position::new(0, 2));
        assert!(b.is_modified());
        assert_eq!(b.revision(), 1);
    }

    #[test]
    fn insert_char_clamps_out_of_range_position() {
        let mut b = buf("ab");
        let p = b.insert_char(Position::new(5, 50), '!');
        assert_eq!(b.line_text(0), "ab!");
        assert_eq!(p, Position::new(0, 3));
    }

    #[test]
    fn insert_char_unicode() {
        let mut b = buf("caf");
        let p = b.insert_char(Position::new(0, 3), 'é');
        assert_eq!(b.line_text(0), "café");
        assert_eq!(p.col, 4);
    }

    #[test]
    fn insert_newline_char_splits() {
        let mut b = buf("ab");
        let p = b.insert_char(Position::new(0, 1), '\n');
        assert_eq!(lines(&b), vec!["a", "b"]);
        assert_eq!(p, Position::new(1, 0));
    }

    // -- insert_text ---------------------------------------------------------

    #[test]
    fn insert_text_single_line() {
        let mut b = buf("xy");
        let p = b.insert_text(Position::new(0, 1), "abc");
        assert_eq!(lines(&b), vec!["xabcy"]);
        assert_eq!(p, Position::new(0, 4));
    }

    #[test]
    fn insert_text_multi_line_splice() {
        let mut b = buf("xy");
        let p = b.insert_text(Position::new(0, 1), "a\nb\nc");
        assert_eq!(lines(&b), vec!["xa", "b", "cy"]);
        assert_eq!(p, Position::new(2, 1));
    }

    #[test]
    fn insert_text_empty_is_noop() {
        let mut b = buf("xy");
        let p = b.insert_text(Position::new(0, 1), "");
        assert_eq!(p, Position::new(0, 1));
        assert!(!b.is_modified());
        assert_eq!(b.revision(), 0);
    }

    #[test]
    fn insert_text_trailing_newline_lands_on_new_line() {
        let mut b = buf("xy");
        let p = b.insert_text(Position::new(0, 2), "z\n");
        assert_eq!(lines(&b), vec!["xyz", ""]);
        assert_eq!(p, Position::new(1, 0));
    }

    // -- delete_before -------------------------------------------------------

    #[test]
    fn backspace_mid_line() {
        let mut b = buf("abc");
        let p = b.delete_before(Position::new(0, 2));
        assert_eq!(b.line_text(0), "ac");
        assert_eq!(p, Position::new(0, 1));
    }

    #[test]
    fn backspace_at_col_zero_joins_previous() {
        let mut b = buf("foo\nbar");
        let p = b.delete_before(Position::new(1, 0));
        assert_eq!(lines(&b), vec!["foobar"]);
        assert_eq!(p, Position::new(0, 3));
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut b = buf("foo");
        let p = b.delete_before(Position::ZERO);
        assert_eq!(p, Position::ZERO);
        assert_eq!(b.line_text(0), "foo");
        assert!(!b.is_modified());
    }

    #[test]
    fn backspace_into_empty_previous_line() {
        let mut b = buf("\nbar");
        let p = b.delete_before(Position::new(1, 0));
        assert_eq!(lines(&b), vec!["bar"]);
        assert_eq!(p, Position::ZERO);
    }

    // -- delete_at -----------------------------------------------------------

    #[test]
    fn delete_at_removes_char_under_cursor() {
        let mut b = buf("abc");
        let p = b.delete_at(Position::new(0, 1));
        assert_eq!(b.line_text(0), "ac");
        assert_eq!(p, Position::new(0, 1));
    }

    #[test]
    fn delete_at_last_char_clamps_cursor() {
        let mut b = buf("abc");
        let p = b.delete_at(Position::new(0, 2));
        assert_eq!(b.line_text(0), "ab");
        assert_eq!(p, Position::new(0, 2));
    }

    #[test]
    fn delete_at_line_end_joins_next() {
        let mut b = buf("ab\ncd");
        let p = b.delete_at(Position::new(0, 2));
        assert_eq!(lines(&b), vec!["abcd"]);
        assert_eq!(p, Position::new(0, 2));
    }

    #[test]
    fn delete_at_end_of_buffer_is_noop() {
        let mut b = buf("ab\ncd");
        let p = b.delete_at(Position::new(1, 2));
        assert_eq!(lines(&b), vec!["ab", "cd"]);
        assert_eq!(p, Position::new(1, 2));
        assert!(!b.is_modified());
    }

    // -- split / join --------------------------------------------------------

    #[test]
    fn split_line_moves_tail_down() {
        let mut b = buf("hello world\nnext");
        let p = b.split_line(Position::new(0, 5));
        assert_eq!(lines(&b), vec!["hello", " world", "next"]);
        assert_eq!(p, Position::new(1, 0));
    }

    #[test]
    fn split_at_end_makes_empty_line() {
        let mut b = buf("abc");
        let p = b.split_line(Position::new(0, 3));
        assert_eq!(lines(&b), vec!["abc", ""]);
        assert_eq!(p, Position::new(1, 0));
    }

    #[test]
    fn join_next_line() {
        let mut b = buf("a\nb\nc");
        assert!(b.join_next_line_onto(1));
        assert_eq!(lines(&b), vec!["a", "bc"]);
        assert!(!b.join_next_line_onto(1));
        assert!(!b.join_next_line_onto(40));
    }

    // -- open line -----------------------------------------------------------

    #[test]
    fn insert_line_after_current() {
        let mut b = buf("one\ntwo");
        let p = b.insert_line_after(0);
        assert_eq!(lines(&b), vec!["one", "", "two"]);
        assert_eq!(p, Position::new(1, 0));
    }

    #[test]
    fn insert_line_after_last() {
        let mut b = buf("one");
        let p = b.insert_line_after(0);
        assert_eq!(lines(&b), vec!["one", ""]);
        assert_eq!(p, Position::new(1, 0));
    }

    #[test]
    fn insert_line_before_current() {
        let mut b = buf("one\ntwo");
        let p = b.insert_line_before(1);
        assert_eq!(lines(&b), vec!["one", "", "two"]);
        assert_eq!(p, Position::new(1, 0));
    }

    #[test]
    fn insert_line_before_first() {
        let mut b = buf("one");
        let p = b.insert_line_before(0);
        assert_eq!(lines(&b), vec!["", "one"]);
        assert_eq!(p, Position::ZERO);
    }

    // -- delete_line ---------------------------------------------------------

    #[test]
    fn delete_middle_line() {
        let mut b = buf("a\nbbb\nc");
        let p = b.delete_line(Position::new(1, 2));
        assert_eq!(lines(&b), vec!["a", "c"]);
        assert_eq!(p, Position::new(1, 1));
    }

    #[test]
    fn delete_last_line_moves_cursor_up() {
        let mut b = buf("first\nlast");
        let p = b.delete_line(Position::new(1, 3));
        assert_eq!(lines(&b), vec!["first"]);
        assert_eq!(p, Position::new(0, 3));
    }

    #[test]
    fn delete_only_line_clears_it() {
        let mut b = buf("solo");
        let p = b.delete_line(Position::new(0, 2));
        assert_eq!(lines(&b), vec![""]);
        assert_eq!(p, Position::ZERO);
        assert!(b.is_modified());
    }

    #[test]
    fn delete_line_on_single_empty_line() {
        let mut b = buf("");
        let p = b.delete_line(Position::ZERO);
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line_text(0), "");
        assert_eq!(p, Position::ZERO);
    }

    // -- Metadata ------------------------------------------------------------

    #[test]
    fn revision_counts_real_changes() {
        let mut b = buf("ab");
        b.insert_char(Position::ZERO, 'x');
        b.delete_at(Position::new(0, 3));
        assert_eq!(b.revision(), 1);
        b.delete_at(Position::ZERO);
        assert_eq!(b.revision(), 2);
    }

    #[test]
    fn debug_format_mentions_shape() {
        let s = format!("{:?}", buf("a\nb"));
        assert!(s.contains("lines: 2"));
        assert!(s.contains("modified: false"));
    }

    // -- Invariants under random edit sequences ------------------------------

    #[derive(Debug, Clone)]
    enum Op {
        Insert(char),
        Text(String),
        Backspace,
        DeleteAt,
        Split,
        OpenBelow,
        OpenAbove,
        DeleteLine,
        Jump(usize, usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<char>().prop_map(Op::Insert),
            "[a-c \n]{0,8}".prop_map(Op::Text),
            Just(Op::Backspace),
            Just(Op::DeleteAt),
            Just(Op::Split),
            Just(Op::OpenBelow),
            Just(Op::OpenAbove),
            Just(Op::DeleteLine),
            (0usize..12, 0usize..12).prop_map(|(l, c)| Op::Jump(l, c)),
        ]
    }

    proptest! {
        #[test]
        fn cursor_stays_in_bounds(start in "[a-z \n]{0,30}", ops in prop::collection::vec(op(), 0..40)) {
            let mut b = Buffer::from_text(&start);
            let mut pos = Position::ZERO;
            for op in ops {
                pos = match op {
                    Op::Insert(ch) => b.insert_char(pos, ch),
                    Op::Text(t) => b.insert_text(pos, &t),
                    Op::Backspace => b.delete_before(pos),
                    Op::DeleteAt => b.delete_at(pos),
                    Op::Split => b.split_line(pos),
                    Op::OpenBelow => b.insert_line_after(pos.line),
                    Op::OpenAbove => b.insert_line_before(pos.line),
                    Op::DeleteLine => b.delete_line(pos),
                    Op::Jump(l, c) => b.clamp(Position::new(l, c)),
                };
                prop_assert!(b.line_count() >= 1);
                prop_assert!(pos.line < b.line_count());
                prop_assert!(pos.col <= b.line_len(pos.line));
            }
        }
    }
}
