// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: stdin chunks in, parsed events to the app, frames out.
//
// Each iteration waits on the reader for at most one tick, so keys are
// handled as soon as they arrive and an idle editor sleeps. The same wait
// is the clock for the app's timers (cursor blink, status expiry). A frame
// is painted only when an event, a resize or the app's tick reports a
// change.
//
// ESC is ambiguous until more bytes arrive or don't. The parser keeps it
// pending and the loop flushes it as the Escape key after a quiet tick, so
// the tick is also the Escape latency.
//
// The signal handler only raises a flag; the loop picks it up between
// events.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use crate::ansi::{self, CursorShape};
use crate::input::{Event, Parser};
use crate::reader::StdinReader;
use crate::screen::{Frame, Renderer};
use crate::terminal::{Size, Terminal};

/// Default wait per iteration.
pub const TICK: Duration = Duration::from_millis(25);

// ─── Window size changes ────────────────────────────────────────────────────

static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn note_resize(_signal: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

/// Route SIGWINCH to [`note_resize`]. An atomic store is all a handler may
/// safely do.
#[cfg(unix)]
fn watch_resize() {
    let handler: extern "C" fn(libc::c_int) = note_resize;
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut action.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const action, std::ptr::null_mut());
    }
}

#[cfg(not(unix))]
const fn watch_resize() {}

// ─── App ────────────────────────────────────────────────────────────────────

/// Whether the loop keeps going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// The application side of the loop.
///
/// Each iteration hands over the parsed events one by one, reports a size
/// change, ticks once, and repaints if any of that changed something.
pub trait App {
    fn handle_event(&mut self, event: &Event) -> Action;

    /// The terminal now has `size`. Also called once before the first frame.
    fn resized(&mut self, _size: Size) {}

    /// Timer hook, once per iteration. `true` requests a repaint.
    fn tick(&mut self) -> bool {
        false
    }

    /// Draw into a cleared frame of the terminal's size.
    fn paint(&mut self, frame: &mut Frame);

    /// Hardware cursor position and shape after painting; `None` hides it.
    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        None
    }
}

// ─── EventLoop ──────────────────────────────────────────────────────────────

/// Terminal, parser and renderer for one run of an [`App`].
///
/// ```no_run
/// use n_term::event_loop::{Action, App, EventLoop};
/// use n_term::input::Event;
/// use n_term::screen::Frame;
/// use n_term::style::Style;
///
/// #[derive(Default)]
/// struct Counter(usize);
///
/// impl App for Counter {
///     fn handle_event(&mut self, _event: &Event) -> Action {
///         self.0 += 1;
///         if self.0 == 10 { Action::Quit } else { Action::Continue }
///     }
///
///     fn paint(&mut self, frame: &mut Frame) {
///         frame.put_str(0, 0, &format!("{} events", self.0), Style::PLAIN);
///     }
/// }
///
/// EventLoop::new()?.run(&mut Counter::default())?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: Renderer,
    tick: Duration,
}

impl EventLoop {
    /// A loop ticking every [`TICK`].
    ///
    /// # Errors
    ///
    /// Fails when the terminal handle can't be created.
    pub fn new() -> io::Result<Self> {
        Self::with_tick(TICK)
    }

    /// # Errors
    ///
    /// Fails when the terminal handle can't be created.
    pub fn with_tick(tick: Duration) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            parser: Parser::new(),
            renderer: Renderer::new(),
            tick,
        })
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Take over the terminal until the app quits or stdin closes. The
    /// terminal is handed back even when the loop fails.
    ///
    /// # Errors
    ///
    /// Terminal setup, teardown and output errors.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        watch_resize();
        app.resized(self.terminal.size());

        let outcome = StdinReader::spawn().and_then(|mut reader| {
            let outcome = self.drive(app, &reader);
            reader.stop();
            outcome
        });

        self.terminal.leave()?;
        outcome
    }

    fn drive(&mut self, app: &mut impl App, reader: &StdinReader) -> io::Result<()> {
        let Size { cols, rows } = self.terminal.size();
        let mut frame = Frame::new(cols, rows);
        let mut stale = true;

        while let Some(events) = self.next_events(reader) {
            if events
                .iter()
                .any(|event| app.handle_event(event) == Action::Quit)
            {
                break;
            }
            stale |= !events.is_empty();
            stale |= self.take_resize(app, &mut frame);
            stale |= app.tick();

            if stale {
                self.present(app, &mut frame)?;
                stale = false;
            }
        }
        Ok(())
    }

    /// Events from the next input chunk, or a held-back ESC once a tick
    /// passes quietly. `None` when stdin is closed.
    fn next_events(&mut self, reader: &StdinReader) -> Option<Vec<Event>> {
        match reader.recv_timeout(self.tick) {
            Ok(bytes) => Some(self.parser.advance(&bytes)),
            Err(RecvTimeoutError::Timeout) if self.parser.has_pending() => {
                Some(self.parser.flush())
            }
            Err(RecvTimeoutError::Timeout) => Some(Vec::new()),
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Apply a pending window size change to the terminal, the frame and
    /// the app, forcing a full redraw. Returns whether there was one.
    fn take_resize(&mut self, app: &mut impl App, frame: &mut Frame) -> bool {
        if !RESIZE_PENDING.swap(false, Ordering::Relaxed) {
            return false;
        }
        let size = self.terminal.refresh_size();
        frame.resize(size.cols, size.rows);
        self.renderer.force_redraw();
        app.resized(size);
        true
    }

    /// Paint, diff, write, then place the cursor.
    fn present(&mut self, app: &mut impl App, frame: &mut Frame) -> io::Result<()> {
        frame.clear();
        app.paint(frame);
        self.renderer.render(frame);

        let mut out = io::stdout().lock();
        self.renderer.flush_to(&mut out)?;
        if let Some((x, y, shape)) = app.cursor() {
            ansi::cursor_to(&mut out, x, y)?;
            ansi::set_cursor_shape(&mut out, shape)?;
            ansi::cursor_show(&mut out)?;
        } else {
            ansi::cursor_hide(&mut out)?;
        }
        out.flush()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
