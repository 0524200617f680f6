//! System clipboard access through external tools.
//!
//! The session only sees the [`Clipboard`] trait: "give me the clipboard
//! text, or an empty string". Failures of any kind (no tool installed, tool
//! error, timeout) are an empty string, never an error, and never stall the
//! editor for longer than [`CLIPBOARD_TIMEOUT`].
//!
//! [`CommandClipboard`] tries, in order:
//!
//! | Tool | Platform |
//! |------|----------|
//! | `xclip -o -selection clipboard` | X11 |
//! | `wl-paste --no-newline` | Wayland |
//! | `pbpaste` | macOS |
//!
//! Each tool runs as a child process. A helper thread drains its stdout and
//! sends the bytes back over a channel; the calling thread waits on that
//! channel with whatever is left of the shared deadline and kills the child
//! when it runs out. The text is handed back to the caller, which applies
//! it to the buffer on its own thread.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Upper bound on a whole clipboard read, across all tools tried.
pub const CLIPBOARD_TIMEOUT: Duration = Duration::from_secs(2);

/// Source of pasted text.
pub trait Clipboard {
    /// Current clipboard text, or `""` if there is none or it can't be read.
    fn read(&mut self) -> String;
}

/// A clipboard that is always empty. Used when no system clipboard should
/// be touched (tests, `--no-clipboard` style setups).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn read(&mut self) -> String {
        String::new()
    }
}

/// A clipboard with fixed contents.
#[derive(Debug, Default, Clone)]
pub struct FixedClipboard(pub String);

impl Clipboard for FixedClipboard {
    fn read(&mut self) -> String {
        self.0.clone()
    }
}

/// One external paste command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub program: String,
    pub args: Vec<String>,
}

impl Tool {
    #[must_use]
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_owned(),
            args: args.iter().map(|&a| a.to_owned()).collect(),
        }
    }
}

/// Reads the clipboard by running external tools.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    tools: Vec<Tool>,
    timeout: Duration,
}

impl Default for CommandClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandClipboard {
    /// The standard tool list with the standard timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tools(
            vec![
                Tool::new("xclip", &["-o", "-selection", "clipboard"]),
                Tool::new("wl-paste", &["--no-newline"]),
                Tool::new("pbpaste", &[]),
            ],
            CLIPBOARD_TIMEOUT,
        )
    }

    #[must_use]
    pub const fn with_tools(tools: Vec<Tool>, timeout: Duration) -> Self {
        Self { tools, timeout }
    }
}

impl Clipboard for CommandClipboard {
    fn read(&mut self) -> String {
        let deadline = Instant::now() + self.timeout;
        for tool in &self.tools {
            let Some(left) = deadline.checked_duration_since(Instant::now()) else {
                warn!("clipboard read timed out");
                break;
            };
            if let Some(text) = run_tool(tool, left) {
                return trim_trailing_newlines(text);
            }
        }
        String::new()
    }
}

/// Run one tool, returning its stdout if it exits successfully in time.
fn run_tool(tool: &Tool, timeout: Duration) -> Option<String> {
    let mut child = Command::new(&tool.program)
        .args(&tool.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| debug!(tool = %tool.program, error = %err, "clipboard tool unavailable"))
        .ok()?;

    let mut stdout = child.stdout.take()?;
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut bytes = Vec::new();
        let res = stdout.read_to_end(&mut bytes).map(|_| bytes);
        let _ = tx.send(res);
    });

    let Ok(output) = rx.recv_timeout(timeout) else {
        warn!(tool = %tool.program, "clipboard tool timed out");
        kill(&mut child);
        return None;
    };

    // Stdout is closed; the exit status follows right behind.
    let status = child.wait().ok()?;
    if !status.success() {
        debug!(tool = %tool.program, %status, "clipboard tool failed");
        return None;
    }
    let bytes = output.ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn trim_trailing_newlines(mut text: String) -> String {
    let keep = text.trim_end_matches('\n').len();
    text.truncate(keep);
    text
}
