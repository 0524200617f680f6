//! Editing mode and the active tab.
//!
//! | Mode   | Cursor shape | Keys mean |
//! |--------|--------------|-----------|
//! | Normal | Block        | commands and motions |
//! | Insert | Bar          | text |
//!
//! Orthogonal to the mode, the session shows one of two [`Tab`]s: the
//! editor itself or the rendered Markdown preview. Switching tabs never
//! changes the mode.

use std::fmt;

/// The current editing mode. Sessions start in [`Mode::Normal`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
}

impl Mode {
    /// Label for the status bar.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
        }
    }

    /// Terminal cursor shape for this mode.
    #[must_use]
    pub const fn cursor_shape(self) -> CursorShape {
        match self {
            Self::Normal => CursorShape::Block,
            Self::Insert => CursorShape::Bar,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_insert(self) -> bool {
        matches!(self, Self::Insert)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which tab is on screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    #[default]
    Editor,
    Preview,
}

impl Tab {
    /// The other tab. Tab and Shift-Tab both toggle, there are only two.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Editor => Self::Preview,
            Self::Preview => Self::Editor,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Editor => "Editor",
            Self::Preview => "Preview",
        }
    }
}

/// Cursor shape, mirrored here so the core does not depend on the terminal
/// crate. The binary maps it onto `n_term::ansi::CursorShape`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorShape {
    Block,
    Bar,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
        assert!(!Mode::Normal.is_insert());
        assert!(Mode::Insert.is_insert());
    }

    #[test]
    fn display_names() {
        assert_eq!(Mode::Normal.to_string(), "NORMAL");
        assert_eq!(Mode::Insert.to_string(), "INSERT");
    }

    #[test]
    fn cursor_shapes() {
        assert_eq!(Mode::Normal.cursor_shape(), CursorShape::Block);
        assert_eq!(Mode::Insert.cursor_shape(), CursorShape::Bar);
    }

    #[test]
    fn tab_toggles_between_two() {
        assert_eq!(Tab::default(), Tab::Editor);
        assert_eq!(Tab::Editor.toggled(), Tab::Preview);
        assert_eq!(Tab::Preview.toggled().toggled(), Tab::Preview);
        assert_eq!(Tab::Preview.title(), "Preview");
    }
}
