//! The editing session: one owned value holding everything the editor knows.
//!
//! Every key flows through the same path:
//!
//! ```text
//! Key → keymap::resolve → Command → Session::execute → buffer/cursor
//!                                                     → viewport sync
//! ```
//!
//! The session never talks to the terminal. The binary turns terminal events
//! into [`Key`]s (or pasted text), calls [`Session::handle_key`] or
//! [`Session::paste_text`], and paints from the accessors. Time enters only
//! through [`Session::tick`], so blink and status expiry are testable with
//! synthetic instants.
//!
//! # Screen layout
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ tab bar                      │  1 row
//! ├──────────────────────────────┤
//! │ gutter │ text area           │  height - CHROME_ROWS
//! ├──────────────────────────────┤
//! │ status bar                   │  1 row
//! │ help bar                     │  1 row
//! └──────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::buffer::Buffer;
use crate::clipboard::Clipboard;
use crate::code_span::CodeSpans;
use crate::config::Config;
use crate::cursor::Cursor;
use crate::keymap::{self, Command, Key, Pending, Resolution};
use crate::mode::{Mode, Tab};
use crate::paste;
use crate::position::Position;
use crate::viewport::{self, ViewSize, Viewport};

/// How long a status message stays up.
pub const STATUS_LIFETIME: Duration = Duration::from_secs(3);

/// Rows taken by the tab bar, status bar and help bar.
pub const CHROME_ROWS: u16 = 3;

/// Where a buffer without a path is saved.
pub const UNTITLED: &str = "untitled.md";

/// What the caller should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// A transient message in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub expires_at: Instant,
}

pub struct Session {
    buffer: Buffer,
    cursor: Cursor,
    viewport: Viewport,
    mode: Mode,
    tab: Tab,
    preview_offset: usize,
    spans: CodeSpans,
    pending: Option<Pending>,
    status: Option<StatusMessage>,

    /// Cursor drawn in the current blink phase.
    blink_on: bool,
    last_blink: Instant,

    /// Terminal size from the last resize.
    width: u16,
    height: u16,

    config: Config,
    clipboard: Box<dyn Clipboard>,
}

impl Session {
    // ---- Construction ----

    /// Start a session on `path`.
    ///
    /// | `path` | Result |
    /// |---|---|
    /// | none | empty scratch buffer, saved |
    /// | readable text file | its content, saved |
    /// | missing file | empty buffer with that path, unsaved |
    /// | rejected file | empty scratch buffer, saved, error in status bar |
    #[must_use]
    pub fn open(path: Option<PathBuf>, config: Config, clipboard: Box<dyn Clipboard>) -> Self {
        let Some(path) = path else {
            return Self::from_buffer(Buffer::new(), config, clipboard);
        };

        match Buffer::from_file(&path, &config.load_limits()) {
            Ok(buffer) => {
                info!(path = %path.display(), lines = buffer.line_count(), "opened file");
                Self::from_buffer(buffer, config, clipboard)
            }
            Err(err) if err.is_not_found() => {
                info!(path = %path.display(), "new file");
                let mut buffer = Buffer::new();
                buffer.set_path(path);
                buffer.mark_modified();
                Self::from_buffer(buffer, config, clipboard)
            }
            Err(err) => {
                warn!(error = %err, "file rejected, starting empty");
                let mut session = Self::from_buffer(Buffer::new(), config, clipboard);
                session.set_status(err.to_string(), StatusKind::Error);
                session
            }
        }
    }

    /// A session over an existing buffer, cursor at the top.
    #[must_use]
    pub fn from_buffer(buffer: Buffer, config: Config, clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            buffer,
            cursor: Cursor::new(),
            viewport: Viewport::new(config.tab_size),
            mode: Mode::Normal,
            tab: Tab::Editor,
            preview_offset: 0,
            spans: CodeSpans::new(),
            pending: None,
            status: None,
            blink_on: true,
            last_blink: Instant::now(),
            width: 80,
            height: 24,
            config,
            clipboard,
        }
    }

    // ---- Accessors ----

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor.position()
    }

    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn tab(&self) -> Tab {
        self.tab
    }

    #[must_use]
    pub const fn pending(&self) -> Option<Pending> {
        self.pending
    }

    #[must_use]
    pub const fn preview_offset(&self) -> usize {
        self.preview_offset
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// True when the buffer matches what is on disk.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        !self.buffer.is_modified()
    }

    /// Whether the cursor is drawn in the current blink phase.
    #[must_use]
    pub const fn cursor_visible(&self) -> bool {
        self.blink_on
    }

    #[must_use]
    pub const fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Columns of the line-number gutter.
    #[must_use]
    pub fn gutter_width(&self) -> u16 {
        viewport::gutter_width(self.buffer.line_count(), self.config.show_line_numbers)
    }

    /// Size of the text area: the terminal minus chrome rows and gutter.
    #[must_use]
    pub fn text_area(&self) -> ViewSize {
        ViewSize::new(
            self.width.saturating_sub(self.gutter_width()),
            self.height.saturating_sub(CHROME_ROWS),
        )
    }

    /// The code-span index, rebuilt first if an edit made it stale.
    pub fn code_spans(&mut self) -> &CodeSpans {
        self.spans.ensure_fresh(&self.buffer);
        &self.spans
    }

    /// Span index without rebuilding; may be stale.
    #[must_use]
    pub const fn code_spans_cached(&self) -> &CodeSpans {
        &self.spans
    }

    // ---- Input ----

    /// Dispatch one key.
    pub fn handle_key(&mut self, key: Key) -> Flow {
        self.wake_cursor(Instant::now());
        match keymap::resolve(self.mode, self.tab, self.pending.take(), key) {
            Resolution::Run(cmd) => self.execute(cmd),
            Resolution::Pending(p) => {
                self.pending = Some(p);
                Flow::Continue
            }
            Resolution::Ignored => Flow::Continue,
        }
    }

    /// Run one command, then re-sync the viewport.
    pub fn execute(&mut self, cmd: Command) -> Flow {
        match cmd {
            Command::Save => self.save(),
            Command::Quit => return Flow::Quit,
            Command::ToggleTab => self.tab = self.tab.toggled(),

            Command::MoveLeft => self.cursor.move_left(&self.buffer),
            Command::MoveRight => self.cursor.move_right(&self.buffer),
            Command::MoveUp => self.cursor.move_up(&self.buffer),
            Command::MoveDown => self.cursor.move_down(&self.buffer),
            Command::LineStart => self.cursor.move_to_line_start(&self.buffer),
            Command::LineEnd => self.cursor.move_to_line_end(&self.buffer),
            Command::BufferStart => self.cursor.move_to_buffer_start(&self.buffer),
            Command::BufferEnd => self.cursor.move_to_buffer_end(&self.buffer),
            Command::WordForward => self.cursor.word_forward(&self.buffer),
            Command::WordBackward => self.cursor.word_backward(&self.buffer),
            Command::WordEnd => self.cursor.word_end(&self.buffer),

            Command::InsertChar(ch) => self.edit(|buf, pos| buf.insert_char(pos, ch)),
            Command::SplitLine => self.edit(Buffer::split_line),
            Command::DeleteBefore => self.edit(Buffer::delete_before),
            Command::DeleteAt => self.edit(Buffer::delete_at),
            Command::DeleteLine => self.edit(Buffer::delete_line),
            Command::Paste => {
                let text = self.clipboard.read();
                self.paste(&text);
            }

            Command::InsertHere => self.mode = Mode::Insert,
            Command::InsertAfter => {
                let pos = self.cursor.position();
                if pos.col < self.buffer.line_len(pos.line) {
                    self.cursor.set(pos.with_col(pos.col + 1), &self.buffer);
                }
                self.mode = Mode::Insert;
            }
            Command::InsertAtEol => {
                self.cursor.move_to_line_end(&self.buffer);
                self.mode = Mode::Insert;
            }
            Command::OpenBelow => {
                self.edit(|buf, pos| buf.insert_line_after(pos.line));
                self.mode = Mode::Insert;
            }
            Command::OpenAbove => {
                self.edit(|buf, pos| buf.insert_line_before(pos.line));
                self.mode = Mode::Insert;
            }
            Command::ExitInsert => {
                self.mode = Mode::Normal;
                let pos = self.cursor.position();
                if pos.col > 0 {
                    self.cursor.set(pos.with_col(pos.col - 1), &self.buffer);
                }
            }

            Command::PreviewDown => self.preview_offset = self.preview_offset.saturating_add(1),
            Command::PreviewUp => self.preview_offset = self.preview_offset.saturating_sub(1),
            Command::PreviewTop => self.preview_offset = 0,
            // Clamped to the rendered length at paint time.
            Command::PreviewBottom => self.preview_offset = usize::MAX,
        }
        self.sync_viewport();
        Flow::Continue
    }

    /// Text from a terminal bracketed paste. Only lands in Insert mode on
    /// the editor tab; elsewhere it is dropped. Terminals send line breaks
    /// as `\r`, which become `\n`.
    pub fn paste_text(&mut self, text: &str) {
        self.wake_cursor(Instant::now());
        if !self.mode.is_insert() || self.tab != Tab::Editor {
            debug!(len = text.len(), "paste outside insert mode dropped");
            return;
        }
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.paste(&text);
        self.sync_viewport();
    }

    fn paste(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        debug!(lines = paste::line_count(text), chars = text.len(), "paste");
        self.edit(|buf, pos| paste::paste(buf, pos, text));
    }

    /// Apply a buffer edit at the cursor and move the cursor to where it
    /// says. Any content change invalidates the code spans.
    fn edit(&mut self, f: impl FnOnce(&mut Buffer, Position) -> Position) {
        let before = self.buffer.revision();
        let pos = f(&mut self.buffer, self.cursor.position());
        self.cursor.set(pos, &self.buffer);
        if self.buffer.revision() != before {
            self.spans.mark_dirty();
        }
    }

    // ---- Persistence ----

    /// Where a save would write.
    #[must_use]
    pub fn save_target(&self) -> PathBuf {
        self.buffer
            .path()
            .map_or_else(|| PathBuf::from(UNTITLED), Path::to_path_buf)
    }

    /// Save to the buffer's path (or [`UNTITLED`]) and report in the status
    /// bar. A failure leaves the buffer untouched and unsaved.
    pub fn save(&mut self) {
        let target = self.save_target();
        match self.buffer.save_as(&target, self.config.backup) {
            Ok(()) => {
                let lines = self.buffer.line_count();
                info!(path = %target.display(), lines, "saved");
                self.set_status(
                    format!("Saved {} ({lines} lines)", target.display()),
                    StatusKind::Info,
                );
            }
            Err(err) => {
                warn!(error = %err, "save failed");
                self.set_status(err.to_string(), StatusKind::Error);
            }
        }
    }

    // ---- Screen ----

    /// The terminal changed size.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cursor.clamp(&self.buffer);
        self.sync_viewport();
    }

    /// Re-validate the cursor and scroll it into view.
    pub fn sync_viewport(&mut self) {
        self.cursor.clamp(&self.buffer);
        let area = self.text_area();
        self.viewport.adjust(self.cursor.position(), &self.buffer, area);
    }

    /// Clamp the preview scroll to a document of `total` rendered lines
    /// shown in `height` rows.
    pub fn clamp_preview(&mut self, total: usize, height: usize) {
        self.preview_offset = self.preview_offset.min(total.saturating_sub(height));
    }

    // ---- Status and timers ----

    pub fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            expires_at: Instant::now() + STATUS_LIFETIME,
        });
    }

    /// Advance timers to `now`: flip the blink phase when its interval has
    /// passed and drop an expired status message. Never touches the buffer
    /// or the cursor. Returns `true` when something visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if self.status.as_ref().is_some_and(|s| now >= s.expires_at) {
            self.status = None;
            changed = true;
        }

        match self.config.blink_interval() {
            Some(interval) => {
                if now.saturating_duration_since(self.last_blink) >= interval {
                    self.blink_on = !self.blink_on;
                    self.last_blink = now;
                    changed = true;
                }
            }
            None => {
                if !self.blink_on {
                    self.blink_on = true;
                    changed = true;
                }
            }
        }
        changed
    }

    /// Any input shows the cursor and restarts the blink phase.
    const fn wake_cursor(&mut self, now: Instant) {
        self.blink_on = true;
        self.last_blink = now;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("buffer", &self.buffer)
            .field("cursor", &self.cursor)
            .field("mode", &self.mode)
            .field("tab", &self.tab)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
