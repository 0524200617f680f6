// SPDX-License-Identifier: MIT
//
// Colors and styles for every painted role.
//
// One dark palette (Catppuccin Mocha), in 24-bit color. Everything that
// decides *what* a piece of text is lives in n-editor (`markdown::Role`,
// `highlight::Token`); this module only decides how each of those looks.

use n_editor::highlight::Token;
use n_editor::markdown::Role;
use n_term::style::{Attr, Color, Style};

// ─── Palette ────────────────────────────────────────────────────────────────

pub const BASE: Color = Color::Rgb(0x1e, 0x1e, 0x2e);
pub const MANTLE: Color = Color::Rgb(0x18, 0x18, 0x25);
pub const CRUST: Color = Color::Rgb(0x11, 0x11, 0x1b);
pub const SURFACE0: Color = Color::Rgb(0x31, 0x32, 0x44);
pub const SURFACE2: Color = Color::Rgb(0x58, 0x5b, 0x70);
pub const OVERLAY0: Color = Color::Rgb(0x6c, 0x70, 0x86);
pub const SUBTEXT0: Color = Color::Rgb(0xa6, 0xad, 0xc8);
pub const TEXT: Color = Color::Rgb(0xcd, 0xd6, 0xf4);
pub const BLUE: Color = Color::Rgb(0x89, 0xb4, 0xfa);
pub const LAVENDER: Color = Color::Rgb(0xb4, 0xbe, 0xfe);
pub const SAPPHIRE: Color = Color::Rgb(0x74, 0xc7, 0xec);
pub const TEAL: Color = Color::Rgb(0x94, 0xe2, 0xd5);
pub const GREEN: Color = Color::Rgb(0xa6, 0xe3, 0xa1);
pub const YELLOW: Color = Color::Rgb(0xf9, 0xe2, 0xaf);
pub const PEACH: Color = Color::Rgb(0xfa, 0xb3, 0x87);
pub const RED: Color = Color::Rgb(0xf3, 0x8b, 0xa8);
pub const PINK: Color = Color::Rgb(0xf5, 0xc2, 0xe7);
pub const MAUVE: Color = Color::Rgb(0xcb, 0xa6, 0xf7);

// ─── Chrome ─────────────────────────────────────────────────────────────────

pub const TEXT_AREA: Style = Style::PLAIN.fg(TEXT).bg(BASE);
pub const TILDE: Style = Style::PLAIN.fg(OVERLAY0).bg(BASE);
pub const GUTTER: Style = Style::PLAIN.fg(SURFACE2).bg(BASE);
pub const GUTTER_CURRENT: Style = Style::PLAIN.fg(LAVENDER).bg(BASE);

pub const TAB_BAR: Style = Style::PLAIN.bg(MANTLE);
pub const TAB_ACTIVE: Style = Style::PLAIN.fg(CRUST).bg(BLUE).bold();
pub const TAB_INACTIVE: Style = Style::PLAIN.fg(SUBTEXT0).bg(SURFACE0);

pub const STATUS: Style = Style::PLAIN.fg(TEXT).bg(SURFACE0);
pub const STATUS_NORMAL: Style = STATUS.fg(BLUE).bold();
pub const STATUS_INSERT: Style = STATUS.fg(PINK).bold();
pub const STATUS_FILE: Style = STATUS.fg(GREEN);
pub const STATUS_NEW_FILE: Style = STATUS.fg(PEACH);
pub const STATUS_MODIFIED: Style = STATUS.fg(RED);
pub const STATUS_POSITION: Style = STATUS.fg(TEAL);
pub const STATUS_ERROR: Style = STATUS.fg(RED).bold();

pub const HELP: Style = Style::PLAIN.fg(SUBTEXT0).bg(MANTLE);

// ─── Editor view ────────────────────────────────────────────────────────────

/// Editor-view style of a markdown role.
#[must_use]
pub const fn role(role: Role) -> Style {
    match role {
        Role::Text => TEXT_AREA,
        Role::Heading(1) => TEXT_AREA.fg(MAUVE).bold().attr(Attr::UNDERLINE),
        Role::Heading(2) => TEXT_AREA.fg(BLUE).bold(),
        Role::Heading(3) => TEXT_AREA.fg(SAPPHIRE).bold(),
        Role::Heading(_) => TEXT_AREA.fg(TEAL).bold(),
        Role::Fence => TEXT_AREA.fg(OVERLAY0),
        Role::Quote => TEXT_AREA.fg(SUBTEXT0).italic(),
        Role::ListMarker | Role::Numbered => TEXT_AREA.fg(PEACH),
        Role::Rule => TEXT_AREA.fg(SURFACE2),
        Role::InlineCode => TEXT_AREA.fg(GREEN).bg(SURFACE0),
    }
}

/// Background of fenced code content.
pub const CODE: Style = Style::PLAIN.fg(TEXT).bg(MANTLE);

/// Style of a highlighted char inside a fenced block.
#[must_use]
pub const fn token(token: Token) -> Style {
    match token {
        Token::Plain => CODE,
        Token::Keyword => CODE.fg(MAUVE),
        Token::String => CODE.fg(GREEN),
        Token::Comment => CODE.fg(OVERLAY0).italic(),
        Token::Function => CODE.fg(BLUE),
        Token::Macro => CODE.fg(TEAL),
        Token::Constant => CODE.fg(PEACH),
        Token::Type => CODE.fg(YELLOW),
        Token::Builtin => CODE.fg(RED),
        Token::Attribute => CODE.fg(YELLOW).dim(),
        Token::Property => CODE.fg(LAVENDER),
    }
}

// ─── Preview ────────────────────────────────────────────────────────────────

pub const PREVIEW_TEXT: Style = TEXT_AREA;
pub const PREVIEW_PLACEHOLDER: Style = TEXT_AREA.fg(SUBTEXT0).italic();
pub const PREVIEW_EMPHASIS: Attr = Attr::ITALIC;
pub const PREVIEW_STRONG: Attr = Attr::BOLD;
pub const PREVIEW_STRIKE: Attr = Attr::DIM;
pub const PREVIEW_LINK: Style = TEXT_AREA.fg(BLUE).attr(Attr::UNDERLINE);
pub const PREVIEW_CODE: Style = TEXT_AREA.fg(GREEN).bg(SURFACE0);
pub const PREVIEW_QUOTE_BAR: Style = TEXT_AREA.fg(SURFACE2);
pub const PREVIEW_MARKER: Style = TEXT_AREA.fg(PEACH);
pub const PREVIEW_RULE: Style = TEXT_AREA.fg(SURFACE2);
pub const PREVIEW_HTML: Style = TEXT_AREA.fg(OVERLAY0);

/// Preview style of a heading at `level` (1-6).
#[must_use]
pub const fn preview_heading(level: u8) -> Style {
    match level {
        1 => TEXT_AREA.fg(CRUST).bg(MAUVE).bold(),
        2 => TEXT_AREA.fg(BLUE).bold(),
        3 => TEXT_AREA.fg(SAPPHIRE).bold(),
        _ => TEXT_AREA.fg(TEAL).bold(),
    }
}
