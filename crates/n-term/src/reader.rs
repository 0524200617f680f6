// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Stdin on a thread.
//
// The event loop must wake up on its tick even when no key is pressed, and
// a blocking `read()` on stdin can't time out. A helper thread does the
// reading and hands byte chunks over a channel; the loop waits on the
// channel with a timeout.
//
// The thread waits for input with `poll()` and a short timeout, checking
// the stop flag in between, so `stop()` returns promptly instead of hanging
// until the next keypress.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Largest chunk per read. Pastes bigger than this arrive in pieces and the
/// parser reassembles them.
const CHUNK: usize = 4096;

/// How long one `poll()` waits before the stop flag is checked again.
#[cfg(unix)]
const POLL_MS: libc::c_int = 50;

/// Handle to the reader thread and its channel. Stops the thread on drop.
pub struct StdinReader {
    rx: Receiver<Vec<u8>>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl StdinReader {
    /// Start reading stdin in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread can't be spawned.
    pub fn spawn() -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("n-term-stdin".into())
            .spawn(move || read_loop(&tx, &flag))?;
        Ok(Self {
            rx,
            stop,
            thread: Some(thread),
        })
    }

    /// The next chunk of raw bytes, waiting at most `timeout`.
    /// `Disconnected` means stdin hit EOF or the reader stopped.
    ///
    /// # Errors
    ///
    /// `Timeout` when nothing arrived in time; `Disconnected` when the
    /// reader thread is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Vec<u8>, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Stop the thread and wait for it. Calling again does nothing.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wait up to [`POLL_MS`] for stdin to become readable.
#[cfg(unix)]
fn stdin_ready() -> bool {
    let mut pfd = libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    // Timeouts and EINTR both count as "not ready".
    unsafe { libc::poll(&raw mut pfd, 1, POLL_MS) > 0 }
}

#[cfg(unix)]
fn read_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    let mut buf = [0u8; CHUNK];
    while !stop.load(Ordering::Relaxed) {
        if !stdin_ready() {
            continue;
        }
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        // 0 is EOF, negative an error: either way the input is gone.
        match usize::try_from(n) {
            Ok(n) if n > 0 => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    return;
                }
            }
            _ => return,
        }
    }
}

/// Without `poll()` the thread blocks in `read()`; a stop request is seen
/// after the next chunk.
#[cfg(not(unix))]
fn read_loop(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::io::Read;

    let mut stdin = std::io::stdin();
    let mut buf = [0u8; CHUNK];
    while !stop.load(Ordering::Relaxed) {
        match stdin.read(&mut buf) {
            Ok(n) if n > 0 => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    return;
                }
            }
            _ => return,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_twice_is_fine() {
        let mut reader = StdinReader::spawn().unwrap();
        reader.stop();
        reader.stop();
    }

    #[test]
    fn dropping_joins_the_thread() {
        let reader = StdinReader::spawn().unwrap();
        drop(reader);
    }

    #[test]
    fn stopped_reader_reports_disconnect() {
        let mut reader = StdinReader::spawn().unwrap();
        reader.stop();
        while reader.recv_timeout(Duration::ZERO).is_ok() {}
        assert_eq!(
            reader.recv_timeout(Duration::from_millis(20)),
            Err(RecvTimeoutError::Disconnected)
        );
    }
}
