// SPDX-License-Identifier: MIT
//
// Terminal setup and teardown.
//
// Safety: termios, ioctl(TIOCGWINSZ), isatty and the raw fd write in the
// panic hook are POSIX calls without a safe std wrapper. Each unsafe block
// is the single call.
#![allow(unsafe_code)]
//
// A session changes two things: the line discipline (raw mode, held by
// `RawMode`) and the screen modes (alternate screen, hidden cursor,
// bracketed paste), switched on with `ENTER` and off with `RESTORE`.
// Leaving, dropping the `Terminal` and the panic hook all write the same
// `RESTORE` bytes.
//
// The panic hook writes straight to fd 1: a panic in the middle of a frame
// happens while the stdout lock is held, and `io::stdout()` would deadlock.

use std::io::{self, Write};
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

/// Used when no terminal answers the size query (pipes, tests).
pub const FALLBACK_SIZE: Size = Size { cols: 80, rows: 24 };

/// The window size, asked of stdout first and then stdin, so a redirected
/// stdout still gets a real size.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    [libc::STDOUT_FILENO, libc::STDIN_FILENO]
        .into_iter()
        .find_map(size_of_fd)
}

#[cfg(unix)]
fn size_of_fd(fd: libc::c_int) -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    if unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) } != 0 {
        return None;
    }
    (ws.ws_col > 0 && ws.ws_row > 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Is stdin a terminal?
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Screen modes ───────────────────────────────────────────────────────────

/// Alternate screen, hidden cursor, cleared screen, bracketed paste.
#[rustfmt::skip]
const ENTER: &[u8] = b"\
    \x1b[?1049h\
    \x1b[?25l\
    \x1b[2J\
    \x1b[?2004h";

/// Undo [`ENTER`] and anything a frame may have left on: synchronized
/// output, SGR state, cursor shape. The screen switch comes last so the
/// shell gets back a clean main screen.
#[rustfmt::skip]
const RESTORE: &[u8] = b"\
    \x1b[?2026l\
    \x1b[?2004l\
    \x1b[0m\
    \x1b[0 q\
    \x1b[?25h\
    \x1b[?1049l";

// ─── Raw mode ───────────────────────────────────────────────────────────────

/// Original termios, kept where the panic hook can reach it.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn set_termios(termios: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, termios) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Raw mode on stdin. The previous settings come back on drop.
#[cfg(unix)]
struct RawMode {
    original: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    /// `Ok(None)` when stdin is not a terminal: there is nothing to switch.
    fn enable() -> io::Result<Option<Self>> {
        if !is_tty() {
            return Ok(None);
        }

        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut original) } != 0 {
            return Err(io::Error::last_os_error());
        }

        // cfmakeraw clears ISIG and IXON too, so Ctrl+C, Ctrl+S and Ctrl+Q
        // arrive as keys.
        let mut termios = original;
        unsafe { libc::cfmakeraw(&raw mut termios) };
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        set_termios(&termios)?;

        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = Some(original);
        }
        Ok(Some(Self { original }))
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = set_termios(&self.original);
        if let Ok(mut saved) = SAVED_TERMIOS.lock() {
            *saved = None;
        }
    }
}

#[cfg(not(unix))]
struct RawMode;

#[cfg(not(unix))]
impl RawMode {
    #[allow(clippy::unnecessary_wraps)]
    const fn enable() -> io::Result<Option<Self>> {
        Ok(None)
    }
}

// ─── Panic hook ─────────────────────────────────────────────────────────────

static PANIC_HOOK: Once = Once::new();

/// Restore the terminal before the panic message prints. Installed once.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            write_restore_raw();
            restore_saved_termios();
            previous(info);
        }));
    });
}

#[cfg(unix)]
fn restore_saved_termios() {
    if let Some(termios) = SAVED_TERMIOS.lock().ok().and_then(|mut s| s.take()) {
        let _ = set_termios(&termios);
    }
}

#[cfg(not(unix))]
const fn restore_saved_termios() {}

/// [`RESTORE`] to fd 1, bypassing the stdout lock.
fn write_restore_raw() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            RESTORE.as_ptr().cast::<libc::c_void>(),
            RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(RESTORE);
        let _ = out.flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle. A session is active between [`enter`](Self::enter) and
/// [`leave`](Self::leave); dropping an active handle leaves.
///
/// ```no_run
/// use n_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// term.enter()?;
/// // ... draw, read keys ...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    size: Size,
    // Held for its Drop.
    _raw: Option<RawMode>,
    active: bool,
}

impl Terminal {
    /// A handle with the current size (or [`FALLBACK_SIZE`]). The terminal
    /// itself is untouched until [`enter`](Self::enter).
    ///
    /// # Errors
    ///
    /// Currently infallible.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            size: get_size().unwrap_or(FALLBACK_SIZE),
            _raw: None,
            active: false,
        })
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the size after SIGWINCH. Keeps the last known size when the
    /// query fails.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(size) = get_size() {
            self.size = size;
        }
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode plus [`ENTER`]. A no-op when already active.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or the write to stdout fails. Raw mode
    /// is undone again when the write fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        let raw = RawMode::enable()?;

        let mut out = io::stdout().lock();
        out.write_all(ENTER)?;
        out.flush()?;

        self._raw = raw;
        self.active = true;
        Ok(())
    }

    /// [`RESTORE`] plus cooked mode. A no-op when inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the write to stdout fails. The line discipline is
    /// restored either way.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let written = {
            let mut out = io::stdout().lock();
            out.write_all(RESTORE).and_then(|()| out.flush())
        };
        self._raw = None;
        written
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: &[u8]) -> &str {
        std::str::from_utf8(bytes).unwrap()
    }

    #[test]
    fn restore_undoes_every_enter_mode() {
        let restore = text(RESTORE);
        let pairs = [
            ("\x1b[?1049h", "\x1b[?1049l"),
            ("\x1b[?25l", "\x1b[?25h"),
            ("\x1b[?2004h", "\x1b[?2004l"),
        ];
        for (on, off) in pairs {
            assert!(text(ENTER).contains(on));
            assert!(restore.contains(off), "missing {off:?}");
        }
    }

    #[test]
    fn restore_leaves_alt_screen_last() {
        assert!(text(RESTORE).ends_with("\x1b[?1049l"));
    }

    #[test]
    fn restore_clears_frame_state() {
        let restore = text(RESTORE);
        assert!(restore.contains("\x1b[?2026l"));
        assert!(restore.contains("\x1b[0m"));
        assert!(restore.contains("\x1b[0 q"));
    }

    #[test]
    fn size_queries_do_not_panic() {
        let _ = get_size();
        let _ = is_tty();
    }

    #[test]
    fn new_terminal_is_inactive_with_a_size() {
        let term = Terminal::new().unwrap();
        assert!(!term.is_active());
        assert!(term.size().cols > 0 && term.size().rows > 0);
    }

    #[test]
    fn enter_and_leave_are_idempotent() {
        let mut term = Terminal::new().unwrap();
        term.leave().unwrap();
        term.enter().unwrap();
        term.enter().unwrap();
        assert!(term.is_active());
        term.leave().unwrap();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn refresh_size_updates_the_cache() {
        let mut term = Terminal::new().unwrap();
        assert_eq!(term.refresh_size(), term.size());
    }
}
