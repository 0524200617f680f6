// SPDX-License-Identifier: MIT
//
// Cell styling: colors and text attributes.
//
// A `Style` is three small `Copy` values. The screen stores one per cell
// and the renderer compares them to decide when an SGR sequence is needed,
// so equality here is what keeps output short.

use bitflags::bitflags;

// ─── Color ──────────────────────────────────────────────────────────────────

/// A terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// The terminal's own foreground or background.
    #[default]
    Default,
    /// Palette index: 0–7 standard, 8–15 bright, 16–255 extended.
    Ansi(u8),
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Self = Self::Ansi(0);
    pub const RED: Self = Self::Ansi(1);
    pub const GREEN: Self = Self::Ansi(2);
    pub const YELLOW: Self = Self::Ansi(3);
    pub const BLUE: Self = Self::Ansi(4);
    pub const MAGENTA: Self = Self::Ansi(5);
    pub const CYAN: Self = Self::Ansi(6);
    pub const WHITE: Self = Self::Ansi(7);
    pub const GRAY: Self = Self::Ansi(8);
}

// ─── Attr ───────────────────────────────────────────────────────────────────

bitflags! {
    /// SGR text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attr: u8 {
        const BOLD      = 1 << 0;
        const DIM       = 1 << 1;
        const ITALIC    = 1 << 2;
        const UNDERLINE = 1 << 3;
        const INVERSE   = 1 << 4;
    }
}

// ─── Style ──────────────────────────────────────────────────────────────────

/// Foreground, background and attributes of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attr: Attr,
}

impl Style {
    /// Terminal defaults, no attributes.
    pub const PLAIN: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        attr: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    #[inline]
    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    /// Add attributes to the ones already set.
    #[inline]
    #[must_use]
    pub const fn attr(mut self, attr: Attr) -> Self {
        self.attr = self.attr.union(attr);
        self
    }

    #[inline]
    #[must_use]
    pub const fn bold(self) -> Self {
        self.attr(Attr::BOLD)
    }

    #[inline]
    #[must_use]
    pub const fn italic(self) -> Self {
        self.attr(Attr::ITALIC)
    }

    #[inline]
    #[must_use]
    pub const fn dim(self) -> Self {
        self.attr(Attr::DIM)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_is_plain() {
        assert_eq!(Style::default(), Style::PLAIN);
    }

    #[test]
    fn builders_compose() {
        let s = Style::PLAIN.fg(Color::CYAN).bg(Color::BLACK).bold().italic();
        assert_eq!(s.fg, Color::Ansi(6));
        assert_eq!(s.bg, Color::Ansi(0));
        assert_eq!(s.attr, Attr::BOLD | Attr::ITALIC);
    }

    #[test]
    fn attr_accumulates() {
        let s = Style::PLAIN.dim().attr(Attr::UNDERLINE);
        assert!(s.attr.contains(Attr::DIM));
        assert!(s.attr.contains(Attr::UNDERLINE));
        assert!(!s.attr.contains(Attr::BOLD));
    }

    #[test]
    fn const_builders_work_in_consts() {
        const HEADING: Style = Style::PLAIN.fg(Color::YELLOW).bold();
        assert_eq!(HEADING.attr, Attr::BOLD);
    }
}
