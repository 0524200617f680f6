//! Fenced code spans: a lazily rebuilt index of ```` ``` ```` blocks.
//!
//! The index is a cache over the buffer, guarded by a stale flag:
//!
//! 1. Every text change calls [`CodeSpans::mark_dirty`].
//! 2. Before painting, [`CodeSpans::ensure_fresh`] rescans the whole buffer
//!    if (and only if) the flag is set, then clears it.
//! 3. Lookups ([`CodeSpans::language_at`]) read the current list.
//!
//! There is no incremental patching. A rescan is one linear pass over the
//! lines and replaces the list in one assignment, so a clean flag always
//! means the list matches the buffer.
//!
//! # Detection
//!
//! A line whose text (after leading whitespace) starts with ```` ``` ```` is
//! a fence. Outside a span it opens one, and whatever follows the marker,
//! trimmed, is the language tag. Inside a span any fence closes it. Fences
//! do not nest. A span still open at the end of the buffer closes on the
//! last line.

use tracing::trace;

use crate::buffer::Buffer;

/// The fence marker.
pub const FENCE: &str = "```";

/// One fenced block. `start` and `end` are the fence lines themselves; the
/// code is strictly between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSpan {
    pub start: usize,
    pub end: usize,
    pub language: String,
}

impl CodeSpan {
    /// True for content lines. Fence lines are never inside.
    #[inline]
    #[must_use]
    pub const fn contains(&self, line: usize) -> bool {
        self.start < line && line < self.end
    }
}

/// If `line` is a fence, the text after the marker (trimmed).
#[must_use]
pub fn fence_tag(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix(FENCE).map(str::trim)
}

/// Scan the whole buffer for spans, in line order.
#[must_use]
pub fn scan(buf: &Buffer) -> Vec<CodeSpan> {
    let mut spans = Vec::new();
    let mut open: Option<(usize, String)> = None;

    for n in 0..buf.line_count() {
        let text = buf.line_text(n);
        let Some(tag) = fence_tag(&text) else {
            continue;
        };
        match open.take() {
            None => open = Some((n, tag.to_owned())),
            Some((start, language)) => spans.push(CodeSpan {
                start,
                end: n,
                language,
            }),
        }
    }

    if let Some((start, language)) = open {
        spans.push(CodeSpan {
            start,
            end: buf.last_line(),
            language,
        });
    }
    spans
}

/// The span index plus its stale flag.
#[derive(Debug, Clone)]
pub struct CodeSpans {
    spans: Vec<CodeSpan>,
    stale: bool,
}

impl Default for CodeSpans {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeSpans {
    /// An empty index that will scan on first use.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            spans: Vec::new(),
            stale: true,
        }
    }

    /// Call after any buffer edit.
    #[inline]
    pub const fn mark_dirty(&mut self) {
        self.stale = true;
    }

    #[inline]
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Rescan if stale. Returns `true` when a rescan happened.
    pub fn ensure_fresh(&mut self, buf: &Buffer) -> bool {
        if !self.stale {
            return false;
        }
        self.spans = scan(buf);
        self.stale = false;
        trace!(spans = self.spans.len(), "rebuilt code spans");
        true
    }

    /// The current list, ordered by `start`. May be out of date while stale.
    #[inline]
    #[must_use]
    pub fn spans(&self) -> &[CodeSpan] {
        &self.spans
    }

    /// The span whose content includes `line`.
    #[must_use]
    pub fn span_at(&self, line: usize) -> Option<&CodeSpan> {
        // Spans are sorted and disjoint: the candidate is the last one that
        // starts before `line`.
        let idx = self.spans.partition_point(|s| s.start < line);
        let span = self.spans.get(idx.checked_sub(1)?)?;
        span.contains(line).then_some(span)
    }

    /// Language tag of the span containing `line`; `Some("")` for an
    /// untagged block, `None` outside any block.
    #[must_use]
    pub fn language_at(&self, line: usize) -> Option<&str> {
        self.span_at(line).map(|s| s.language.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use pretty_assertions::assert_eq;

    fn span(start: usize, end: usize, language: &str) -> CodeSpan {
        CodeSpan {
            start,
            end,
            language: language.to_owned(),
        }
    }

    fn buf(lines: &[&str]) -> Buffer {
        Buffer::from_text(&lines.join("\n"))
    }

    #[test]
    fn fence_tags() {
        assert_eq!(fence_tag("```"), Some(""));
        assert_eq!(fence_tag("```go"), Some("go"));
        assert_eq!(fence_tag("```  rust  "), Some("rust"));
        assert_eq!(fence_tag("   ```py"), Some("py"));
        assert_eq!(fence_tag("text ```"), None);
        assert_eq!(fence_tag("``"), None);
    }

    #[test]
    fn single_block() {
        let b = buf(&["# H", "```go", "code", "```", "text"]);
        assert_eq!(scan(&b), vec![span(1, 3, "go")]);
    }

    #[test]
    fn unclosed_block_ends_at_last_line() {
        let b = buf(&["intro", "```rust", "fn main() {}", "still code"]);
        assert_eq!(scan(&b), vec![span(1, 3, "rust")]);
    }

    #[test]
    fn fence_on_last_line_opens_empty_span() {
        let b = buf(&["text", "```"]);
        assert_eq!(scan(&b), vec![span(1, 1, "")]);
    }

    #[test]
    fn several_blocks_in_order() {
        let b = buf(&["```a", "1", "```", "", "```b", "2", "3", "```"]);
        assert_eq!(scan(&b), vec![span(0, 2, "a"), span(4, 7, "b")]);
    }

    #[test]
    fn closing_fence_with_text_still_closes() {
        let b = buf(&["```sh", "ls", "```sh", "after"]);
        assert_eq!(scan(&b), vec![span(0, 2, "sh")]);
    }

    #[test]
    fn no_fences_no_spans() {
        assert!(scan(&buf(&["plain", "text"])).is_empty());
        assert!(scan(&Buffer::new()).is_empty());
    }

    #[test]
    fn inside_is_strict() {
        let s = span(1, 3, "go");
        assert!(!s.contains(1));
        assert!(s.contains(2));
        assert!(!s.contains(3));
    }

    #[test]
    fn lookup_by_line() {
        let b = buf(&["# H", "```go", "code", "```", "text", "```", "x", "```"]);
        let mut idx = CodeSpans::new();
        idx.ensure_fresh(&b);
        assert_eq!(idx.language_at(0), None);
        assert_eq!(idx.language_at(1), None);
        assert_eq!(idx.language_at(2), Some("go"));
        assert_eq!(idx.language_at(3), None);
        assert_eq!(idx.language_at(4), None);
        assert_eq!(idx.language_at(6), Some(""));
        assert_eq!(idx.language_at(99), None);
    }

    #[test]
    fn starts_stale_and_rebuilds_once() {
        let b = buf(&["```", "x", "```"]);
        let mut idx = CodeSpans::default();
        assert!(idx.is_stale());
        assert!(idx.ensure_fresh(&b));
        assert!(!idx.is_stale());
        assert!(!idx.ensure_fresh(&b));
        assert_eq!(idx.spans().len(), 1);
    }

    #[test]
    fn dirty_flag_picks_up_edits() {
        let mut b = buf(&["text", "more"]);
        let mut idx = CodeSpans::new();
        idx.ensure_fresh(&b);
        assert!(idx.spans().is_empty());

        b.insert_text(Position::new(0, 0), "```md\n");
        // Clean flag means the old list is still served.
        assert!(idx.spans().is_empty());

        idx.mark_dirty();
        idx.ensure_fresh(&b);
        assert_eq!(idx.spans(), &[span(0, 2, "md")]);
    }
}
