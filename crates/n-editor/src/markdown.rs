//! Markdown styling for the editor view.
//!
//! Each line is classified on its own, without parsing the document. The
//! result only says how to *draw* the line: segments are char ranges over
//! the unchanged text, so the cursor column and the drawn column always
//! agree.
//!
//! | Line (after leading whitespace)   | Kind |
//! |-----------------------------------|------|
//! | `# `, `## `, `### `, `#### `      | [`LineKind::Heading`] (checked on the raw line) |
//! | ```` ``` ````                      | [`LineKind::Fence`] |
//! | `> `                              | [`LineKind::Quote`] |
//! | `- `, `* `, `+ `                  | [`LineKind::Bullet`], only the marker is styled |
//! | digits then `.`                   | [`LineKind::Numbered`] |
//! | starts with `---`, or is `***`    | [`LineKind::Rule`] |
//! | anything else                     | [`LineKind::Plain`], with inline code |
//!
//! Lines strictly inside a fenced block never get here; the caller routes
//! them to [`crate::highlight`].

use crate::code_span::FENCE;

/// Deepest heading level styled.
pub const MAX_HEADING: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Plain,
    Heading(u8),
    Fence,
    Quote,
    /// Unordered item; the marker char is at column `indent`.
    Bullet { indent: usize },
    Numbered,
    Rule,
}

/// How one run of chars is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Text,
    Heading(u8),
    Fence,
    Quote,
    ListMarker,
    Numbered,
    Rule,
    InlineCode,
}

/// A run of chars `[start, end)` sharing one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub role: Role,
}

impl Segment {
    const fn new(start: usize, end: usize, role: Role) -> Self {
        Self { start, end, role }
    }
}

/// Classify a single line.
#[must_use]
pub fn classify(line: &str) -> LineKind {
    if let Some(level) = heading_level(line) {
        return LineKind::Heading(level);
    }

    let trimmed = line.trim_start();
    let indent = line.chars().count() - trimmed.chars().count();

    if trimmed.starts_with(FENCE) {
        LineKind::Fence
    } else if trimmed.starts_with("> ") {
        LineKind::Quote
    } else if ["- ", "* ", "+ "].iter().any(|m| trimmed.starts_with(m)) {
        LineKind::Bullet { indent }
    } else if is_numbered(trimmed) {
        LineKind::Numbered
    } else if trimmed.trim_end().starts_with("---") || trimmed.trim_end() == "***" {
        LineKind::Rule
    } else {
        LineKind::Plain
    }
}

/// `#` count of a heading line, 1 to [`MAX_HEADING`].
fn heading_level(line: &str) -> Option<u8> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    let level = u8::try_from(hashes).ok()?;
    let heading = (1..=MAX_HEADING).contains(&level) && line[hashes..].starts_with(' ');
    heading.then_some(level)
}

/// `12. item`: one or more digits, a dot, and something after it.
fn is_numbered(trimmed: &str) -> bool {
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && trimmed[digits..].starts_with('.') && trimmed.len() > digits + 1
}

/// Split a line into styled runs covering every char, in order.
#[must_use]
pub fn segments(line: &str) -> Vec<Segment> {
    let len = line.chars().count();
    if len == 0 {
        return Vec::new();
    }
    let whole = |role| vec![Segment::new(0, len, role)];

    match classify(line) {
        LineKind::Heading(level) => whole(Role::Heading(level)),
        LineKind::Fence => whole(Role::Fence),
        LineKind::Quote => whole(Role::Quote),
        LineKind::Numbered => whole(Role::Numbered),
        LineKind::Rule => whole(Role::Rule),
        LineKind::Bullet { indent } => {
            let mut out = Vec::with_capacity(3);
            if indent > 0 {
                out.push(Segment::new(0, indent, Role::Text));
            }
            out.push(Segment::new(indent, indent + 1, Role::ListMarker));
            out.push(Segment::new(indent + 1, len, Role::Text));
            out
        }
        LineKind::Plain => inline_code(line, len),
    }
}

/// Plain text with the contents of each backtick pair marked as code. The
/// backticks themselves stay plain; an unmatched one is just text.
fn inline_code(line: &str, len: usize) -> Vec<Segment> {
    let ticks: Vec<usize> = line
        .chars()
        .enumerate()
        .filter_map(|(i, ch)| (ch == '`').then_some(i))
        .collect();

    let mut out = Vec::new();
    let mut at = 0;
    for pair in ticks.chunks_exact(2) {
        let (open, close) = (pair[0], pair[1]);
        if open + 1 == close {
            continue;
        }
        out.push(Segment::new(at, open + 1, Role::Text));
        out.push(Segment::new(open + 1, close, Role::InlineCode));
        at = close;
    }
    out.push(Segment::new(at, len, Role::Text));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seg(start: usize, end: usize, role: Role) -> Segment {
        Segment::new(start, end, role)
    }

    // -- Classification --

    #[test]
    fn headings() {
        assert_eq!(classify("# Title"), LineKind::Heading(1));
        assert_eq!(classify("## Sub"), LineKind::Heading(2));
        assert_eq!(classify("### Three"), LineKind::Heading(3));
        assert_eq!(classify("#### Four"), LineKind::Heading(4));
        assert_eq!(classify("##### Five"), LineKind::Plain);
        assert_eq!(classify("#hashtag"), LineKind::Plain);
        assert_eq!(classify(" # indented"), LineKind::Plain);
    }

    #[test]
    fn fences_and_quotes() {
        assert_eq!(classify("```rust"), LineKind::Fence);
        assert_eq!(classify("  ```"), LineKind::Fence);
        assert_eq!(classify("> quoted"), LineKind::Quote);
        assert_eq!(classify(">no space"), LineKind::Plain);
    }

    #[test]
    fn lists() {
        assert_eq!(classify("- item"), LineKind::Bullet { indent: 0 });
        assert_eq!(classify("  * item"), LineKind::Bullet { indent: 2 });
        assert_eq!(classify("+ item"), LineKind::Bullet { indent: 0 });
        assert_eq!(classify("1. first"), LineKind::Numbered);
        assert_eq!(classify("  42. answer"), LineKind::Numbered);
        assert_eq!(classify("1."), LineKind::Plain);
        assert_eq!(classify("1) no"), LineKind::Plain);
    }

    #[test]
    fn rules() {
        assert_eq!(classify("---"), LineKind::Rule);
        assert_eq!(classify("-----"), LineKind::Rule);
        assert_eq!(classify("***"), LineKind::Rule);
        assert_eq!(classify("  ---  "), LineKind::Rule);
        assert_eq!(classify("****"), LineKind::Plain);
    }

    // -- Segments --

    #[test]
    fn empty_line_has_no_segments() {
        assert!(segments("").is_empty());
    }

    #[test]
    fn whole_line_roles() {
        assert_eq!(segments("## Hi"), vec![seg(0, 5, Role::Heading(2))]);
        assert_eq!(segments("> q"), vec![seg(0, 3, Role::Quote)]);
        assert_eq!(segments("---"), vec![seg(0, 3, Role::Rule)]);
    }

    #[test]
    fn bullet_styles_only_the_marker() {
        assert_eq!(
            segments("  - item"),
            vec![
                seg(0, 2, Role::Text),
                seg(2, 3, Role::ListMarker),
                seg(3, 8, Role::Text)
            ]
        );
    }

    #[test]
    fn inline_code_between_ticks() {
        assert_eq!(
            segments("use `cargo` now"),
            vec![
                seg(0, 5, Role::Text),
                seg(5, 10, Role::InlineCode),
                seg(10, 15, Role::Text)
            ]
        );
    }

    #[test]
    fn unmatched_tick_is_text() {
        assert_eq!(
            segments("a `b` c `d"),
            vec![
                seg(0, 3, Role::Text),
                seg(3, 4, Role::InlineCode),
                seg(4, 10, Role::Text)
            ]
        );
    }

    #[test]
    fn segments_cover_multibyte_lines() {
        let line = "é `ü` ñ";
        let segs = segments(line);
        assert_eq!(segs.first().map(|s| s.start), Some(0));
        assert_eq!(segs.last().map(|s| s.end), Some(line.chars().count()));
        assert_eq!(segs[1], seg(3, 4, Role::InlineCode));
    }
}
