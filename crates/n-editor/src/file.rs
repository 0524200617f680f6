//! Disk I/O guards: size ceiling, binary sniffing, backups.
//!
//! | Step | On failure |
//! |---|---|
//! | `metadata` size check | [`LoadError::TooLarge`] |
//! | read bytes | [`LoadError::NotFound`] / [`LoadError::Io`] |
//! | binary probe | [`LoadError::Binary`] |
//! | UTF-8 decode | [`LoadError::NotUtf8`] |
//! | backup copy | logged, save continues |
//! | write | [`SaveError::Write`] |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Default size ceiling: 10 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// How many leading bytes the binary heuristic looks at.
pub const PROBE_WINDOW: usize = 8192;

/// Share of non-printable bytes in the probe window above which a file is
/// treated as binary.
pub const MAX_NON_PRINTABLE_RATIO: f64 = 0.30;

/// Limits applied when loading a file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadLimits {
    pub max_bytes: u64,
    pub probe_window: usize,
    pub max_non_printable_ratio: f64,
}

impl LoadLimits {
    /// Default limits with a custom size ceiling.
    #[must_use]
    pub const fn with_max_bytes(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            probe_window: PROBE_WINDOW,
            max_non_printable_ratio: MAX_NON_PRINTABLE_RATIO,
        }
    }
}

impl Default for LoadLimits {
    fn default() -> Self {
        Self::with_max_bytes(DEFAULT_MAX_BYTES)
    }
}

/// Why a file could not be opened.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: no such file", path.display())]
    NotFound { path: PathBuf },

    #[error("{}: file too large ({size} bytes, limit {limit})", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("{}: binary file", path.display())]
    Binary { path: PathBuf },

    #[error("{}: not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// A missing file is how new files start, not a real failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Why a save did not happen.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no file name")]
    NoPath,

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read `path` as editor text.
///
/// Rejects files over `limits.max_bytes` before reading them, then files the
/// binary heuristic flags, then invalid UTF-8. One trailing `\n` is dropped.
///
/// # Errors
///
/// See [`LoadError`].
pub fn read_text(path: &Path, limits: &LoadLimits) -> Result<String, LoadError> {
    let io_err = |source: io::Error| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    };

    let size = fs::metadata(path).map_err(io_err)?.len();
    if size > limits.max_bytes {
        return Err(LoadError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: limits.max_bytes,
        });
    }

    let bytes = fs::read(path).map_err(io_err)?;
    if looks_binary(&bytes, limits) {
        return Err(LoadError::Binary {
            path: path.to_path_buf(),
        });
    }

    let mut text = String::from_utf8(bytes).map_err(|_| LoadError::NotUtf8 {
        path: path.to_path_buf(),
    })?;
    if text.ends_with('\n') {
        text.pop();
    }
    debug!(path = %path.display(), bytes = size, "loaded file");
    Ok(text)
}

/// Binary heuristic over the first `probe_window` bytes: any NUL byte, or
/// a non-printable share above `max_non_printable_ratio`.
#[must_use]
pub fn looks_binary(bytes: &[u8], limits: &LoadLimits) -> bool {
    let probe = &bytes[..bytes.len().min(limits.probe_window)];
    if probe.is_empty() {
        return false;
    }
    if probe.contains(&0) {
        return true;
    }
    let odd = probe.iter().filter(|&&b| is_non_printable(b)).count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = odd as f64 / probe.len() as f64;
    ratio > limits.max_non_printable_ratio
}

/// Control bytes other than the whitespace and escape bytes text files
/// legitimately carry. Bytes >= 0x80 are UTF-8 and count as printable.
const fn is_non_printable(b: u8) -> bool {
    match b {
        b'\t' | b'\n' | b'\r' | 0x0c | 0x1b => false,
        0x7f => true,
        _ => b < 0x20,
    }
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

/// `<path>.bak`, keeping the original extension: `notes.md` → `notes.md.bak`.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Copy the current on-disk bytes of `path` to its backup path. Returns the
/// backup path on success. Missing files and copy failures return `None`;
/// failures are logged but never stop a save.
pub fn backup_existing(path: &Path) -> Option<PathBuf> {
    if !path.is_file() {
        return None;
    }
    let bak = backup_path(path);
    match fs::copy(path, &bak) {
        Ok(_) => {
            debug!(backup = %bak.display(), "wrote backup");
            Some(bak)
        }
        Err(err) => {
            warn!(backup = %bak.display(), error = %err, "backup failed, saving anyway");
            None
        }
    }
}

/// Write `text` to `path`.
///
/// # Errors
///
/// [`SaveError::Write`] with the underlying I/O error.
pub fn write_text(path: &Path, text: &str) -> Result<(), SaveError> {
    fs::write(path, text).map_err(|source| SaveError::Write {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
