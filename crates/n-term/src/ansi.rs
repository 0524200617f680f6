// SPDX-License-Identifier: MIT
//
// Escape sequences written by the renderer and the event loop.
//
// Only what n-mark draws with: cursor placement and visibility, one SGR
// sequence per style change, synchronized output, and the cursor shape.
// Mode switches made once per session (alternate screen, bracketed paste)
// live in `terminal` as fixed byte strings.
//
// Coordinates are 0-indexed here and 1-indexed on the wire.

use std::io::{self, Write};

use crate::style::{Attr, Color, Style};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// CUP to `(x, y)`.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Cursor shape (DECSCUSR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// The user's configured shape.
    #[default]
    Default,
    BlinkBlock,
    SteadyBlock,
    BlinkUnderline,
    SteadyUnderline,
    BlinkBar,
    SteadyBar,
}

impl CursorShape {
    /// The DECSCUSR parameter.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::BlinkBlock => 1,
            Self::SteadyBlock => 2,
            Self::BlinkUnderline => 3,
            Self::SteadyUnderline => 4,
            Self::BlinkBar => 5,
            Self::SteadyBar => 6,
        }
    }
}

#[inline]
pub fn set_cursor_shape(w: &mut impl Write, shape: CursorShape) -> io::Result<()> {
    write!(w, "\x1b[{} q", shape.code())
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// ED 2.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// SGR 0.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// DEC 2026: the terminal holds output until [`end_sync`], so a half-drawn
/// frame never shows.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Switch to `style` with a single SGR sequence that starts from a reset,
/// e.g. `\x1b[0;1;38;2;205;214;244;48;2;30;30;46m`.
pub fn style(w: &mut impl Write, style: Style) -> io::Result<()> {
    w.write_all(b"\x1b[0")?;
    for (flag, code) in [
        (Attr::BOLD, 1),
        (Attr::DIM, 2),
        (Attr::ITALIC, 3),
        (Attr::UNDERLINE, 4),
        (Attr::INVERSE, 7),
    ] {
        if style.attr.contains(flag) {
            write!(w, ";{code}")?;
        }
    }
    color(w, style.fg, 30)?;
    color(w, style.bg, 40)?;
    w.write_all(b"m")
}

/// One color parameter. `base` is 30 for foreground, 40 for background.
///
/// The 16 base colors use the short forms (`base + n`, `base + 60 + n`),
/// the rest of the palette `base+8;5;n`, RGB `base+8;2;r;g;b`.
/// [`Color::Default`] emits nothing since the sequence starts from a reset.
fn color(w: &mut impl Write, color: Color, base: u8) -> io::Result<()> {
    let ext = base + 8;
    match color {
        Color::Default => Ok(()),
        Color::Ansi(n) if n < 8 => write!(w, ";{}", base + n),
        Color::Ansi(n) if n < 16 => write!(w, ";{}", base + 60 + (n - 8)),
        Color::Ansi(n) => write!(w, ";{ext};5;{n}"),
        Color::Rgb(r, g, b) => write!(w, ";{ext};2;{r};{g};{b}"),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
