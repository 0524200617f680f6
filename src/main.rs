// SPDX-License-Identifier: MIT
//
// n-mark: a modal Markdown editor for the terminal.
//
// The binary wires the two library crates together:
//
//   n-term   → raw mode, input parsing, frame rendering, event loop
//   n-editor → buffer, motions, modes, the editing session
//
// `Editor` implements n-term's `App`. Each keypress flows through:
//
//   stdin → parser → handle_event → to_key → Session::handle_key
//   paint → ui::Painter → frame → diff renderer → terminal
//
// Logs go to a file, never to the terminal, which is in raw mode while the
// editor runs.

mod cli;
mod preview;
mod theme;
mod ui;

use std::fs::{self, File};
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use n_editor::clipboard::CommandClipboard;
use n_editor::config::Config;
use n_editor::keymap::Key;
use n_editor::session::{Flow, Session};
use n_term::ansi::CursorShape;
use n_term::event_loop::{Action, App, EventLoop};
use n_term::input::{Event, KeyCode, KeyEvent, Modifiers};
use n_term::screen::Frame;
use n_term::terminal::Size;

use crate::cli::Command;
use crate::ui::Painter;

// ─── App ────────────────────────────────────────────────────────────────────

struct Editor {
    session: Session,
    painter: Painter,
}

impl Editor {
    fn new(session: Session) -> Self {
        Self {
            session,
            painter: Painter::new(),
        }
    }
}

impl App for Editor {
    fn handle_event(&mut self, event: &Event) -> Action {
        match event {
            Event::Key(key) => {
                let Some(key) = to_key(key) else {
                    return Action::Continue;
                };
                match self.session.handle_key(key) {
                    Flow::Continue => Action::Continue,
                    Flow::Quit => Action::Quit,
                }
            }
            Event::Paste(text) => {
                self.session.paste_text(text);
                Action::Continue
            }
        }
    }

    fn resized(&mut self, size: Size) {
        self.session.resize(size.cols, size.rows);
    }

    fn tick(&mut self) -> bool {
        self.session.tick(Instant::now())
    }

    fn paint(&mut self, frame: &mut Frame) {
        self.painter.paint(&mut self.session, frame);
    }

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        ui::cursor(&self.session)
    }
}

/// Terminal key to editor key. Keys the editor has no use for map to `None`.
fn to_key(event: &KeyEvent) -> Option<Key> {
    let mods = event.modifiers;
    if mods.contains(Modifiers::ALT) {
        return None;
    }
    let shift = mods.contains(Modifiers::SHIFT);

    let key = match event.code {
        KeyCode::Char(ch) if mods.contains(Modifiers::CTRL) => {
            if !ch.is_ascii_alphabetic() {
                return None;
            }
            Key::Ctrl(ch.to_ascii_lowercase())
        }
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Escape => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Tab if shift => Key::BackTab,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Insert if shift => Key::ShiftInsert,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Insert | KeyCode::PageUp | KeyCode::PageDown | KeyCode::F(_) => return None,
    };
    Some(key)
}

// ─── Logging ────────────────────────────────────────────────────────────────

fn log_path() -> Option<PathBuf> {
    let dir = dirs::state_dir().or_else(dirs::cache_dir)?.join("n-mark");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join("n-mark.log"))
}

/// Send `tracing` output to the log file. Without one, logs are dropped.
fn init_logging() {
    let Some(path) = log_path() else {
        return;
    };
    let Ok(file) = File::options().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run(path: Option<PathBuf>) -> anyhow::Result<()> {
    init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), path = ?path, "starting");

    let config = Config::load();
    let session = Session::open(path, config, Box::new(CommandClipboard::new()));
    let mut editor = Editor::new(session);

    let mut event_loop = EventLoop::new().context("failed to initialize terminal")?;
    if let Err(err) = event_loop.run(&mut editor) {
        warn!(%err, "event loop failed");
        return Err(err).context("terminal I/O failed");
    }

    info!("exiting");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    match cli::parse(std::env::args().skip(1)) {
        Command::Run(path) => run(path)?,
        Command::Version => println!("{}", cli::version()),
        Command::VersionShort => println!("{}", cli::version_short()),
        Command::Help => print!("{}", cli::help()),
        Command::UnknownFlag(flag) => {
            eprintln!("Unknown flag: {flag}\n");
            eprint!("{}", cli::help());
            process::exit(1);
        }
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use n_editor::buffer::Buffer;
    use n_editor::clipboard::NoClipboard;
    use n_editor::mode::{Mode, Tab};
    use pretty_assertions::assert_eq;

    // ── Helpers ───────────────────────────────────────────────────────────

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    fn key_mod(code: KeyCode, modifiers: Modifiers) -> KeyEvent {
        KeyEvent { code, modifiers }
    }

    fn press(ch: char) -> Event {
        Event::Key(key(KeyCode::Char(ch)))
    }

    fn editor_with(text: &str) -> Editor {
        let session = Session::from_buffer(
            Buffer::from_text(text),
            Config::default(),
            Box::new(NoClipboard),
        );
        Editor::new(session)
    }

    // ── to_key ────────────────────────────────────────────────────────────

    #[test]
    fn plain_keys() {
        assert_eq!(to_key(&key(KeyCode::Char('x'))), Some(Key::Char('x')));
        assert_eq!(to_key(&key(KeyCode::Char('G'))), Some(Key::Char('G')));
        assert_eq!(to_key(&key(KeyCode::Escape)), Some(Key::Esc));
        assert_eq!(to_key(&key(KeyCode::Enter)), Some(Key::Enter));
        assert_eq!(to_key(&key(KeyCode::Home)), Some(Key::Home));
    }

    #[test]
    fn ctrl_letters_are_lowercased() {
        let ctrl = |ch| to_key(&key_mod(KeyCode::Char(ch), Modifiers::CTRL));
        assert_eq!(ctrl('s'), Some(Key::Ctrl('s')));
        assert_eq!(ctrl('Q'), Some(Key::Ctrl('q')));
        assert_eq!(ctrl('@'), None);
    }

    #[test]
    fn shift_tab_spellings() {
        assert_eq!(to_key(&key(KeyCode::BackTab)), Some(Key::BackTab));
        assert_eq!(
            to_key(&key_mod(KeyCode::Tab, Modifiers::SHIFT)),
            Some(Key::BackTab)
        );
        assert_eq!(to_key(&key(KeyCode::Tab)), Some(Key::Tab));
    }

    #[test]
    fn shift_insert_pastes_plain_insert_does_not() {
        assert_eq!(
            to_key(&key_mod(KeyCode::Insert, Modifiers::SHIFT)),
            Some(Key::ShiftInsert)
        );
        assert_eq!(to_key(&key(KeyCode::Insert)), None);
    }

    #[test]
    fn unused_keys_are_dropped() {
        assert_eq!(to_key(&key(KeyCode::PageUp)), None);
        assert_eq!(to_key(&key(KeyCode::F(5))), None);
        assert_eq!(
            to_key(&key_mod(KeyCode::Char('x'), Modifiers::ALT)),
            None
        );
    }

    // ── App ───────────────────────────────────────────────────────────────

    #[test]
    fn typing_reaches_the_buffer() {
        let mut e = editor_with("");
        for ev in [press('i'), press('h'), press('i')] {
            assert_eq!(e.handle_event(&ev), Action::Continue);
        }
        assert_eq!(e.session.buffer().contents(), "hi");
        assert_eq!(e.session.mode(), Mode::Insert);
    }

    #[test]
    fn ctrl_q_quits() {
        let mut e = editor_with("");
        let ev = Event::Key(key_mod(KeyCode::Char('q'), Modifiers::CTRL));
        assert_eq!(e.handle_event(&ev), Action::Quit);
    }

    #[test]
    fn bracketed_paste_in_insert_mode() {
        let mut e = editor_with("xy");
        e.handle_event(&press('a'));
        e.handle_event(&Event::Paste("1\r\n2".to_owned()));
        assert_eq!(e.session.buffer().contents(), "x1\n2y");
    }

    #[test]
    fn bracketed_paste_ignored_in_normal_mode() {
        let mut e = editor_with("xy");
        e.handle_event(&Event::Paste("zzz".to_owned()));
        assert_eq!(e.session.buffer().contents(), "xy");
    }

    #[test]
    fn resize_and_paint() {
        let mut e = editor_with("# Hello");
        e.resized(Size { cols: 30, rows: 6 });
        let mut frame = Frame::new(30, 6);
        e.paint(&mut frame);
        assert!(frame.row_text(1).starts_with("# Hello"));
        assert_eq!(e.cursor(), Some((0, 1, CursorShape::SteadyBlock)));
    }

    #[test]
    fn tab_switches_to_preview_and_hides_cursor() {
        let mut e = editor_with("text");
        e.handle_event(&Event::Key(key(KeyCode::Tab)));
        assert_eq!(e.session.tab(), Tab::Preview);
        assert_eq!(e.cursor(), None);
    }
}
