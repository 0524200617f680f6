//! Key tables: which [`Command`] a key means in the current context.
//!
//! Resolution is a pure function of `(mode, tab, pending prefix, key)`.
//! Nothing here touches editor state; the session executes whatever comes
//! back. Lookup order:
//!
//! 1. **Global** keys, in any mode or tab: `Ctrl-S` save, `Ctrl-Q`/`Ctrl-C`
//!    quit, `Tab`/`Shift-Tab` switch tabs. They also drop a pending prefix.
//! 2. **Preview** tab: `j`/`k`/arrows scroll, `g`/`G` jump. Nothing else.
//! 3. **Normal** or **Insert** key table.
//!
//! # Prefixes
//!
//! `gg` and `dd` are two-key commands. The first key returns
//! [`Resolution::Pending`]; the session stores it and passes it back with
//! the next key. A prefix followed by anything else is dropped and that key
//! is resolved as if no prefix had been typed.

use crate::mode::{Mode, Tab};

/// A key as the editor sees it, independent of the terminal layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable char (already shifted: `G`, `$`, `A`).
    Char(char),
    /// Ctrl plus a letter, lowercase.
    Ctrl(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    BackTab,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    ShiftInsert,
}

/// First key of a two-key command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pending {
    /// `g`, waiting for the second `g`.
    Goto,
    /// `d`, waiting for the second `d`.
    Delete,
}

/// Every operation a key can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // Global
    Save,
    Quit,
    ToggleTab,

    // Motions
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    LineStart,
    LineEnd,
    BufferStart,
    BufferEnd,
    WordForward,
    WordBackward,
    WordEnd,

    // Edits
    InsertChar(char),
    SplitLine,
    DeleteBefore,
    DeleteAt,
    DeleteLine,
    Paste,

    // Mode changes
    InsertHere,
    InsertAfter,
    InsertAtEol,
    OpenBelow,
    OpenAbove,
    ExitInsert,

    // Preview scrolling
    PreviewDown,
    PreviewUp,
    PreviewTop,
    PreviewBottom,
}

/// Outcome of resolving one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Run(Command),
    Pending(Pending),
    /// Unknown in this context: a no-op.
    Ignored,
}

/// Resolve `key` against the current context.
#[must_use]
pub fn resolve(mode: Mode, tab: Tab, pending: Option<Pending>, key: Key) -> Resolution {
    if let Some(cmd) = global(key) {
        return Resolution::Run(cmd);
    }
    match tab {
        Tab::Preview => preview(key).map_or(Resolution::Ignored, Resolution::Run),
        Tab::Editor => match mode {
            Mode::Normal => normal(pending, key),
            Mode::Insert => insert(key).map_or(Resolution::Ignored, Resolution::Run),
        },
    }
}

const fn global(key: Key) -> Option<Command> {
    match key {
        Key::Ctrl('s') => Some(Command::Save),
        Key::Ctrl('q' | 'c') => Some(Command::Quit),
        Key::Tab | Key::BackTab => Some(Command::ToggleTab),
        _ => None,
    }
}

const fn preview(key: Key) -> Option<Command> {
    match key {
        Key::Char('j') | Key::Down => Some(Command::PreviewDown),
        Key::Char('k') | Key::Up => Some(Command::PreviewUp),
        Key::Char('g') | Key::Home => Some(Command::PreviewTop),
        Key::Char('G') | Key::End => Some(Command::PreviewBottom),
        _ => None,
    }
}

fn normal(pending: Option<Pending>, key: Key) -> Resolution {
    match (pending, key) {
        (Some(Pending::Goto), Key::Char('g')) => return Resolution::Run(Command::BufferStart),
        (Some(Pending::Delete), Key::Char('d')) => return Resolution::Run(Command::DeleteLine),
        _ => {}
    }

    let cmd = match key {
        Key::Char('h') | Key::Left => Command::MoveLeft,
        Key::Char('j') | Key::Down => Command::MoveDown,
        Key::Char('k') | Key::Up => Command::MoveUp,
        Key::Char('l') | Key::Right => Command::MoveRight,
        Key::Char('0') | Key::Home => Command::LineStart,
        Key::Char('$') | Key::End => Command::LineEnd,
        Key::Char('G') => Command::BufferEnd,
        Key::Char('w') => Command::WordForward,
        Key::Char('b') => Command::WordBackward,
        Key::Char('e') => Command::WordEnd,
        Key::Char('x') | Key::Delete => Command::DeleteAt,
        Key::Char('i') => Command::InsertHere,
        Key::Char('a') => Command::InsertAfter,
        Key::Char('A') => Command::InsertAtEol,
        Key::Char('o') => Command::OpenBelow,
        Key::Char('O') => Command::OpenAbove,
        Key::Char('g') => return Resolution::Pending(Pending::Goto),
        Key::Char('d') => return Resolution::Pending(Pending::Delete),
        _ => return Resolution::Ignored,
    };
    Resolution::Run(cmd)
}

fn insert(key: Key) -> Option<Command> {
    let cmd = match key {
        Key::Esc => Command::ExitInsert,
        Key::Enter => Command::SplitLine,
        Key::Backspace => Command::DeleteBefore,
        Key::Delete => Command::DeleteAt,
        Key::Left => Command::MoveLeft,
        Key::Right => Command::MoveRight,
        Key::Up => Command::MoveUp,
        Key::Down => Command::MoveDown,
        Key::Home => Command::LineStart,
        Key::End => Command::LineEnd,
        Key::Ctrl('v' | 'p') | Key::ShiftInsert => Command::Paste,
        Key::Char(ch) if !ch.is_control() => Command::InsertChar(ch),
        _ => return None,
    };
    Some(cmd)
}
