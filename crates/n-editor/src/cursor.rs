//! Cursor: a position plus the column vertical moves aim for.
//!
//! Columns run `0..=line_len` in both modes; the past-the-end slot is where
//! `$`, `A` and typing at the end of a line leave the cursor.
//!
//! # Sticky column
//!
//! `j` and `k` remember the column they started from. Passing through a short
//! line clamps the cursor but keeps the remembered column, so reaching a long
//! line again snaps back to it. Every other motion and every edit resets it.

use crate::buffer::Buffer;
use crate::position::Position;
use crate::word;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
    want_col: usize,
}

impl Cursor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            want_col: 0,
        }
    }

    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self {
            pos,
            want_col: pos.col,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    /// The column `j`/`k` aim for.
    #[inline]
    #[must_use]
    pub const fn want_col(&self) -> usize {
        self.want_col
    }

    // -- Positioning --------------------------------------------------------

    /// Jump to `pos` (clamped). Resets the sticky column.
    pub fn set(&mut self, pos: Position, buf: &Buffer) {
        self.pos = buf.clamp(pos);
        self.want_col = self.pos.col;
    }

    /// Re-validate after the buffer changed underneath the cursor. Keeps the
    /// sticky column.
    pub fn clamp(&mut self, buf: &Buffer) {
        self.pos = buf.clamp(self.pos);
    }

    // -- Horizontal ---------------------------------------------------------

    /// `h`: one column left, stopping at 0.
    pub fn move_left(&mut self, buf: &Buffer) {
        let col = self.pos.col.min(buf.line_len(self.pos.line));
        self.set(self.pos.with_col(col.saturating_sub(1)), buf);
    }

    /// `l`: one column right, stopping past the last char.
    pub fn move_right(&mut self, buf: &Buffer) {
        self.set(self.pos.with_col(self.pos.col + 1), buf);
    }

    /// `0`
    pub fn move_to_line_start(&mut self, buf: &Buffer) {
        self.set(self.pos.with_col(0), buf);
    }

    /// `$`
    pub fn move_to_line_end(&mut self, buf: &Buffer) {
        self.set(self.pos.with_col(buf.line_len(self.pos.line)), buf);
    }

    // -- Vertical -----------------------------------------------------------

    /// `k`
    pub fn move_up(&mut self, buf: &Buffer) {
        let line = self.pos.line.saturating_sub(1);
        self.pos = buf.clamp(Position::new(line, self.want_col));
    }

    /// `j`
    pub fn move_down(&mut self, buf: &Buffer) {
        let line = (self.pos.line + 1).min(buf.last_line());
        self.pos = buf.clamp(Position::new(line, self.want_col));
    }

    /// `gg`: first line, column 0.
    pub fn move_to_buffer_start(&mut self, buf: &Buffer) {
        self.set(Position::ZERO, buf);
    }

    /// `G`: last line, past its last char.
    pub fn move_to_buffer_end(&mut self, buf: &Buffer) {
        let last = buf.last_line();
        self.set(Position::new(last, buf.line_len(last)), buf);
    }

    // -- Words --------------------------------------------------------------

    /// `w`
    pub fn word_forward(&mut self, buf: &Buffer) {
        self.set(word::next_word(buf, self.pos), buf);
    }

    /// `b`
    pub fn word_backward(&mut self, buf: &Buffer) {
        self.set(word::prev_word(buf, self.pos), buf);
    }

    /// `e`
    pub fn word_end(&mut self, buf: &Buffer) {
        self.set(word::end_of_word(buf, self.pos), buf);
    }
}
