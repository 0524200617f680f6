//! Pasting text into the buffer.
//!
//! A paste is one splice at the cursor: the current line is split around
//! the cursor and the pasted lines go in between. The cursor ends up after
//! the last pasted char.
//!
//! Pastes of more than [`CHUNK_THRESHOLD`] lines are spliced in batches of
//! [`CHUNK_LINES`] lines, each one inserted where the previous batch ended.
//! The result (text and cursor) is identical to a single splice.

use crate::buffer::Buffer;
use crate::position::Position;

/// Pastes with more lines than this take the batched path.
pub const CHUNK_THRESHOLD: usize = 10;

/// Lines per batch on the batched path.
pub const CHUNK_LINES: usize = 64;

/// Splice `text` into `buf` at `pos`; returns the new cursor position.
/// An empty `text` changes nothing.
pub fn paste(buf: &mut Buffer, pos: Position, text: &str) -> Position {
    if text.is_empty() {
        return buf.clamp(pos);
    }
    if line_count(text) > CHUNK_THRESHOLD {
        paste_chunked(buf, pos, text, CHUNK_LINES)
    } else {
        buf.insert_text(pos, text)
    }
}

/// Number of lines `text` spans once split on `\n`.
#[must_use]
pub fn line_count(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count() + 1
}

fn paste_chunked(buf: &mut Buffer, pos: Position, text: &str, per_chunk: usize) -> Position {
    let mut at = buf.clamp(pos);
    for chunk in line_chunks(text, per_chunk) {
        at = buf.insert_text(at, chunk);
    }
    at
}

/// Split `text` into pieces of `per_chunk` lines each. Every piece but the
/// last keeps its trailing `\n`, so concatenating them gives back `text`.
fn line_chunks(text: &str, per_chunk: usize) -> impl Iterator<Item = &str> {
    let per_chunk = per_chunk.max(1);
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let cut = rest
            .match_indices('\n')
            .nth(per_chunk - 1)
            .map_or(rest.len(), |(i, _)| i + 1);
        let (head, tail) = rest.split_at(cut);
        rest = tail;
        Some(head)
    })
}
