//! Cursor coordinates.
//!
//! A [`Position`] is a `(line, col)` pair, both **0-indexed**. Columns count
//! chars (Unicode scalar values), the same unit `ropey` uses, so a column can
//! never land inside a multi-byte UTF-8 sequence. For pure ASCII text, which
//! is the common case for Markdown, a char column equals a byte column.
//!
//! `col == line length` is a valid position: it is the "after the last
//! character" slot used by insert mode and by `A` / `$`.
//!
//! The status bar converts to 1-indexed `(row,col)` for the user; that
//! conversion lives in the [`Display`](fmt::Display) impl and nowhere else.

use std::fmt;

/// A position in a text buffer: `(line, col)`, both 0-indexed.
///
/// Ordered lexicographically, line first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// Line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Same line, different column.
    #[inline]
    #[must_use]
    pub const fn with_col(self, col: usize) -> Self {
        Self {
            line: self.line,
            col,
        }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line
            .cmp(&other.line)
            .then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Status-bar form: 1-indexed, parenthesized.
        write!(f, "({},{})", self.line + 1, self.col + 1)
    }
}
