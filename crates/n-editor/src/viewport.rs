//! Viewport: which part of the buffer is on screen.
//!
//! The viewport is the top-left visible cell, `(offset_row, offset_col)`.
//! `offset_row` is a buffer line; `offset_col` is a **display** column, so
//! tabs and wide chars scroll the way they are drawn.
//!
//! Editing never touches the viewport. After every key and every resize the
//! session calls [`Viewport::adjust`], which pulls the offsets just far
//! enough to keep the cursor inside the text area:
//!
//! ```text
//!            offset_col
//!               │◀──── width ────▶│
//! offset_row ──▶┌─────────────────┐
//!               │                 │ ▲
//!               │      cursor     │ height
//!               │                 │ ▼
//!               └─────────────────┘
//! ```
//!
//! `adjust` is idempotent: with the same cursor, buffer and size a second
//! call changes nothing.

use unicode_width::UnicodeWidthChar;

use crate::buffer::Buffer;
use crate::position::Position;

/// Columns used by the line-number gutter: digits of the line count plus one
/// separator space. 0 when numbers are off.
///
/// | Lines   | Gutter |
/// |---------|--------|
/// | 1–9     | 2      |
/// | 10–99   | 3      |
/// | 100–999 | 4      |
#[must_use]
pub fn gutter_width(line_count: usize, show_numbers: bool) -> u16 {
    if !show_numbers {
        return 0;
    }
    let digits = line_count.max(1).ilog10() + 1;
    #[allow(clippy::cast_possible_truncation)]
    let width = digits as u16 + 1;
    width
}

/// Display width of one char at display column `at`: tabs run to the next
/// stop, wide chars take two cells, control chars take none.
#[must_use]
pub fn char_display_width(ch: char, at: usize, tab_width: u8) -> usize {
    let tab = usize::from(tab_width.max(1));
    match ch {
        '\t' => tab - at % tab,
        _ => ch.width().unwrap_or(0),
    }
}

/// Display column of char column `char_col` within a line.
#[must_use]
pub fn char_col_to_display_col<I: Iterator<Item = char>>(
    chars: I,
    char_col: usize,
    tab_width: u8,
) -> usize {
    chars
        .take(char_col)
        .take_while(|&ch| ch != '\n')
        .fold(0, |col, ch| col + char_display_width(ch, col, tab_width))
}

/// Size of the text area in cells (gutter and bars already subtracted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewSize {
    pub width: u16,
    pub height: u16,
}

impl ViewSize {
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    offset_row: usize,
    offset_col: usize,
    tab_width: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Viewport {
    #[must_use]
    pub const fn new(tab_width: u8) -> Self {
        Self {
            offset_row: 0,
            offset_col: 0,
            tab_width: if tab_width == 0 { 1 } else { tab_width },
        }
    }

    /// First visible buffer line.
    #[inline]
    #[must_use]
    pub const fn offset_row(&self) -> usize {
        self.offset_row
    }

    /// First visible display column.
    #[inline]
    #[must_use]
    pub const fn offset_col(&self) -> usize {
        self.offset_col
    }

    #[inline]
    #[must_use]
    pub const fn tab_width(&self) -> u8 {
        self.tab_width
    }

    /// Scroll just enough to show `cursor` in a text area of `size`.
    ///
    /// Vertically the offset is then clamped to
    /// `0..=max(0, line_count - height)`, so the last page is never followed
    /// by empty rows while earlier content exists.
    pub fn adjust(&mut self, cursor: Position, buf: &Buffer, size: ViewSize) {
        let cursor = buf.clamp(cursor);
        let height = usize::from(size.height);
        let width = usize::from(size.width);

        if height > 0 {
            if cursor.line < self.offset_row {
                self.offset_row = cursor.line;
            }
            if cursor.line >= self.offset_row + height {
                self.offset_row = cursor.line + 1 - height;
            }
        }
        let max_row = buf.line_count().saturating_sub(height.max(1));
        self.offset_row = self.offset_row.min(max_row);

        if width > 0 {
            let display = buf.line(cursor.line).map_or(0, |line| {
                char_col_to_display_col(line.chars(), cursor.col, self.tab_width)
            });
            if display < self.offset_col {
                self.offset_col = display;
            }
            if display >= self.offset_col + width {
                self.offset_col = display + 1 - width;
            }
        }
    }

    /// Screen cell of `cursor` relative to the text area's top-left, or
    /// `None` when it is scrolled out of view.
    #[must_use]
    pub fn cursor_cell(&self, cursor: Position, buf: &Buffer, size: ViewSize) -> Option<(u16, u16)> {
        let row = cursor.line.checked_sub(self.offset_row)?;
        let display = buf.line(cursor.line).map_or(0, |line| {
            char_col_to_display_col(line.chars(), cursor.col, self.tab_width)
        });
        let col = display.checked_sub(self.offset_col)?;
        if row >= usize::from(size.height) || col >= usize::from(size.width) {
            return None;
        }
        Some((u16::try_from(col).ok()?, u16::try_from(row).ok()?))
    }
}
