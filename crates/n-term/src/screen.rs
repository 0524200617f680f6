// SPDX-License-Identifier: MIT
//
// Frame and Renderer: the cell grid the app paints into, and the code that
// turns it into terminal output.
//
// The app paints a fresh `Frame` every time something changes. The
// `Renderer` keeps the previous frame and compares row by row: rows that
// match are skipped with one slice comparison, rows that differ are
// rewritten from column 0. An editor keystroke typically touches the
// cursor row and the status bar, so two rows go out instead of the screen.
//
// Wide characters (CJK, some emoji) take two columns. The first cell holds
// the char, the second is a continuation cell (`ch == '\0'`) that the
// renderer never prints. Rewriting whole rows means a wide char and its
// continuation always go out together.
//
// Output is accumulated in a `Vec<u8>` wrapped in synchronized-output
// markers and written with a single `write_all` per frame.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::ansi;
use crate::style::Style;

// ─── Cell ───────────────────────────────────────────────────────────────────

/// One screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The char drawn here, or `'\0'` for the right half of a wide char.
    pub ch: char,
    pub style: Style,
}

impl Cell {
    pub const BLANK: Self = Self {
        ch: ' ',
        style: Style::PLAIN,
    };

    #[inline]
    #[must_use]
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    #[inline]
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self { ch: '\0', style }
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == '\0'
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

// ─── Frame ──────────────────────────────────────────────────────────────────

/// A `width × height` grid of cells, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Frame {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        (x < self.width && y < self.height).then(|| &self.cells[self.index(x, y)])
    }

    /// All cells of row `y`.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = self.index(0, y);
        Some(&self.cells[start..start + usize::from(self.width)])
    }

    /// The printable text of row `y`, continuation cells left out.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|cells| {
                cells
                    .iter()
                    .filter(|c| !c.is_continuation())
                    .map(|c| c.ch)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reset every cell to a blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Change dimensions. Contents are discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::BLANK);
    }

    /// Set one cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.cells[i] = cell;
        }
    }

    /// Paint `style` with blanks over `width` columns starting at `(x, y)`,
    /// clipped to the frame.
    pub fn fill(&mut self, x: u16, y: u16, width: u16, style: Style) {
        let end = x.saturating_add(width).min(self.width);
        for col in x..end {
            self.set(col, y, Cell::new(' ', style));
        }
    }

    /// Blank out a whole row with `style`.
    pub fn fill_row(&mut self, y: u16, style: Style) {
        self.fill(0, y, self.width, style);
    }

    /// Paint `text` left to right from `(x, y)`, clipped at the right edge.
    ///
    /// Zero-width chars are dropped. A wide char that would be cut in half
    /// by the edge is painted as a space. Returns the columns used.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        if y >= self.height {
            return 0;
        }
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            match ch.width().unwrap_or(0) {
                0 => {}
                1 => {
                    self.set(col, y, Cell::new(ch, style));
                    col += 1;
                }
                _ => {
                    if col + 1 >= self.width {
                        self.set(col, y, Cell::new(' ', style));
                        col += 1;
                        break;
                    }
                    self.set(col, y, Cell::new(ch, style));
                    self.set(col + 1, y, Cell::continuation(style));
                    col += 2;
                }
            }
        }
        col - x
    }

    /// Like [`put_str`](Self::put_str) for a single char.
    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: Style) -> u16 {
        let mut tmp = [0u8; 4];
        self.put_str(x, y, ch.encode_utf8(&mut tmp), style)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({}x{})", self.width, self.height)
    }
}

// ─── Renderer ───────────────────────────────────────────────────────────────

/// Row-diffing renderer.
#[derive(Debug, Default)]
pub struct Renderer {
    out: Vec<u8>,
    previous: Option<Frame>,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate output for `frame` and return how many rows were written.
    ///
    /// The first frame, or one whose size differs from the last, clears the
    /// screen and writes every row.
    pub fn render(&mut self, frame: &Frame) -> usize {
        self.out.clear();
        if frame.width() == 0 || frame.height() == 0 {
            self.previous = Some(frame.clone());
            return 0;
        }

        let full = self
            .previous
            .as_ref()
            .is_none_or(|p| p.width() != frame.width() || p.height() != frame.height());

        let _ = ansi::begin_sync(&mut self.out);
        if full {
            let _ = ansi::reset(&mut self.out);
            let _ = ansi::clear_screen(&mut self.out);
        }

        let mut rows = 0;
        for y in 0..frame.height() {
            let current = frame.row(y).unwrap_or_default();
            let unchanged = !full
                && self
                    .previous
                    .as_ref()
                    .and_then(|p| p.row(y))
                    .is_some_and(|prev| prev == current);
            if unchanged {
                continue;
            }
            let _ = write_row(&mut self.out, y, current);
            rows += 1;
        }

        let _ = ansi::reset(&mut self.out);
        let _ = ansi::end_sync(&mut self.out);

        match &mut self.previous {
            Some(prev) if prev.width() == frame.width() && prev.height() == frame.height() => {
                prev.cells.copy_from_slice(&frame.cells);
            }
            _ => self.previous = Some(frame.clone()),
        }
        rows
    }

    /// Bytes produced by the last [`render`](Self::render).
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.out
    }

    /// Write the pending output to `w` and clear it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.out)?;
        self.out.clear();
        Ok(())
    }

    /// Forget the previous frame so the next render redraws everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }
}

/// Rewrite one row from column 0, emitting SGR only when the style changes.
fn write_row(out: &mut Vec<u8>, y: u16, cells: &[Cell]) -> io::Result<()> {
    ansi::cursor_to(out, 0, y)?;
    let mut current: Option<Style> = None;
    let mut tmp = [0u8; 4];
    for cell in cells {
        if cell.is_continuation() {
            continue;
        }
        if current != Some(cell.style) {
            ansi::style(out, cell.style)?;
            current = Some(cell.style);
        }
        out.extend_from_slice(cell.ch.encode_utf8(&mut tmp).as_bytes());
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
