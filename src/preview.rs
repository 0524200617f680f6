// SPDX-License-Identifier: MIT
//
// Preview tab: Markdown rendered to styled, word-wrapped terminal lines.
//
// The whole buffer goes through `pulldown-cmark`. Inline events collect
// into a run list for the current block; each block end wraps those runs
// at the wrap width, behind the block's prefix (quote bars, list indent
// and marker). Code blocks are not wrapped: each source line becomes one
// preview line and the painter clips it.
//
// Output is plain data, `Vec<PreviewLine>`, so it can be cached per buffer
// revision and tested without a terminal.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use unicode_width::UnicodeWidthStr;

use n_term::style::Style;

use crate::theme;

/// Shown instead of an empty preview.
pub const PLACEHOLDER: [&str; 3] = [
    "No content to preview",
    "",
    "Start typing in the editor to see a live preview here!",
];

const QUOTE_BAR: &str = "│ ";
const BULLET: &str = "• ";
const RULE_CHAR: &str = "─";

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub style: Style,
}

impl Run {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// One rendered line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewLine {
    pub runs: Vec<Run>,
}

impl PreviewLine {
    fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }
}

/// Render `markdown` wrapped at `width` columns.
#[must_use]
pub fn render(markdown: &str, width: usize) -> Vec<PreviewLine> {
    if markdown.trim().is_empty() {
        return PLACEHOLDER
            .iter()
            .map(|&t| PreviewLine {
                runs: vec![Run::new(t, theme::PREVIEW_PLACEHOLDER)],
            })
            .collect();
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut builder = Builder::new(width.max(8));
    for event in Parser::new_ext(markdown, options) {
        builder.event(event);
    }
    builder.finish()
}

// ─── Builder ────────────────────────────────────────────────────────────────

struct Builder {
    width: usize,
    lines: Vec<PreviewLine>,
    /// Inline runs of the block being collected.
    runs: Vec<Run>,
    /// Inline style stack; the top styles new text.
    styles: Vec<Style>,
    quote_depth: usize,
    /// One entry per open list: the next number, or `None` for bullets.
    lists: Vec<Option<u64>>,
    /// Marker for the first line of the current list item.
    marker: Option<String>,
    in_code: bool,
}

impl Builder {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            runs: Vec::new(),
            styles: vec![theme::PREVIEW_TEXT],
            quote_depth: 0,
            lists: Vec::new(),
            marker: None,
            in_code: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or(theme::PREVIEW_TEXT)
    }

    fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
        let next = f(self.style());
        self.styles.push(next);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn text(&mut self, text: &str, style: Style) {
        self.runs.push(Run::new(text, style));
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.in_code => self.code_text(&text),
            Event::Text(text) => self.text(&text, self.style()),
            Event::Code(code) => self.text(&code, theme::PREVIEW_CODE),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.text(html.trim_end(), theme::PREVIEW_HTML);
            }
            Event::SoftBreak => self.text(" ", self.style()),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                let avail = self.width.saturating_sub(self.prefix_width());
                let rule = RULE_CHAR.repeat(avail);
                self.emit(vec![Run::new(rule, theme::PREVIEW_RULE)], true);
                self.blank();
            }
            Event::TaskListMarker(done) => {
                let mark = if done { "[x] " } else { "[ ] " };
                self.text(mark, theme::PREVIEW_MARKER);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                let level = heading_number(level);
                self.styles.push(theme::preview_heading(level));
                if level > 1 {
                    let hashes = format!("{} ", "#".repeat(usize::from(level)));
                    self.text(&hashes, theme::preview_heading(level));
                }
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                self.in_code = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        let label = Run::new(lang.to_string(), theme::PREVIEW_HTML);
                        self.emit(vec![label], true);
                    }
                }
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{n}. ");
                        *n += 1;
                        m
                    }
                    _ => BULLET.to_owned(),
                };
                self.marker = Some(marker);
            }
            Tag::Emphasis => self.push_style(|s| s.attr(theme::PREVIEW_EMPHASIS)),
            Tag::Strong => self.push_style(|s| s.attr(theme::PREVIEW_STRONG)),
            Tag::Strikethrough => self.push_style(|s| s.attr(theme::PREVIEW_STRIKE)),
            Tag::Link { .. } | Tag::Image { .. } => self.styles.push(theme::PREVIEW_LINK),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Heading(_) => {
                self.flush();
                self.pop_style();
                self.blank();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank();
            }
            TagEnd::CodeBlock => {
                self.in_code = false;
                self.blank();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item => {
                self.flush();
                self.marker = None;
            }
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::Image => self.pop_style(),
            _ => {}
        }
    }

    /// Code block text: one preview line per source line, never wrapped.
    fn code_text(&mut self, text: &str) {
        for line in text.lines() {
            let runs = vec![Run::new(format!("  {line}"), theme::PREVIEW_CODE)];
            self.emit(runs, true);
        }
    }

    // ── Block output ────────────────────────────────────────────────────

    fn list_indent(&self) -> usize {
        self.lists.len().saturating_sub(1) * 2
    }

    fn marker_width(&self) -> usize {
        self.marker.as_deref().map_or(0, UnicodeWidthStr::width)
    }

    fn prefix_width(&self) -> usize {
        self.quote_depth * QUOTE_BAR.width() + self.list_indent() + self.marker_width()
    }

    /// Quote bars and list indent, plus the item marker on an item's first
    /// line or blanks of the same width after it.
    fn prefix(&mut self, first: bool) -> Vec<Run> {
        let mut runs = Vec::new();
        for _ in 0..self.quote_depth {
            runs.push(Run::new(QUOTE_BAR, theme::PREVIEW_QUOTE_BAR));
        }
        let indent = self.list_indent();
        if indent > 0 {
            runs.push(Run::new(" ".repeat(indent), theme::PREVIEW_TEXT));
        }
        if first {
            if let Some(marker) = self.marker.take() {
                let width = marker.width();
                runs.push(Run::new(marker, theme::PREVIEW_MARKER));
                // Later lines of the same item align under the text.
                self.marker = Some(" ".repeat(width));
            }
        } else if let Some(marker) = &self.marker {
            runs.push(Run::new(" ".repeat(marker.width()), theme::PREVIEW_TEXT));
        }
        runs
    }

    fn emit(&mut self, body: Vec<Run>, first: bool) {
        let mut runs = self.prefix(first);
        runs.extend(body);
        self.lines.push(PreviewLine { runs });
    }

    /// Wrap the collected inline runs into lines.
    fn flush(&mut self) {
        if self.runs.is_empty() {
            return;
        }
        let runs = std::mem::take(&mut self.runs);
        let avail = self.width.saturating_sub(self.prefix_width()).max(1);
        let mut first = true;
        for body in wrap(&runs, avail) {
            self.emit(body, first);
            first = false;
        }
    }

    /// One empty separator line, never two in a row or at the top.
    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| !l.is_blank()) {
            self.lines.push(PreviewLine::default());
        }
    }

    fn finish(mut self) -> Vec<PreviewLine> {
        self.flush();
        while self.lines.last().is_some_and(PreviewLine::is_blank) {
            self.lines.pop();
        }
        self.lines
    }
}

const fn heading_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

// ─── Wrapping ───────────────────────────────────────────────────────────────

/// Greedy word wrap of styled runs into lines of at most `width` columns.
///
/// Whitespace collapses to single spaces and never starts a line. A word
/// wider than `width` is split by chars.
fn wrap(runs: &[Run], width: usize) -> Vec<Vec<Run>> {
    let mut lines = Vec::new();
    let mut line: Vec<Run> = Vec::new();
    let mut used = 0;
    // Style of the whitespace seen since the last word, if any.
    let mut space: Option<Style> = None;

    for run in runs {
        let mut rest = run.text.as_str();
        while !rest.is_empty() {
            let trimmed = rest.trim_start();
            if trimmed.len() != rest.len() {
                space.get_or_insert(run.style);
                rest = trimmed;
                continue;
            }
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (word, after) = rest.split_at(end);
            rest = after;

            let mut word = word;
            loop {
                let w = word.width();
                let gap = space.filter(|_| used > 0);
                let gap_w = usize::from(gap.is_some());
                if used + gap_w + w <= width {
                    if let Some(style) = gap {
                        push_text(&mut line, " ", style);
                    }
                    push_text(&mut line, word, run.style);
                    used += gap_w + w;
                    break;
                }
                if used > 0 {
                    lines.push(std::mem::take(&mut line));
                    used = 0;
                    continue;
                }
                // A word longer than a whole line.
                let (head, tail) = split_at_width(word, width);
                push_text(&mut line, head, run.style);
                lines.push(std::mem::take(&mut line));
                word = tail;
                if word.is_empty() {
                    break;
                }
            }
            space = None;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Append to the last run when the style matches.
fn push_text(line: &mut Vec<Run>, text: &str, style: Style) {
    match line.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => line.push(Run::new(text, style)),
    }
}

/// Split `s` after as many chars as fit in `width` columns (at least one).
fn split_at_width(s: &str, width: usize) -> (&str, &str) {
    let mut used = 0;
    for (i, ch) in s.char_indices() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width && i > 0 {
            return s.split_at(i);
        }
        used += w;
    }
    (s, "")
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(markdown: &str, width: usize) -> Vec<String> {
        render(markdown, width)
            .iter()
            .map(|l| l.runs.iter().map(|r| r.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn empty_document_shows_placeholder() {
        assert_eq!(texts("  \n\n", 80), PLACEHOLDER.map(str::to_owned).to_vec());
    }

    #[test]
    fn headings_and_paragraphs() {
        assert_eq!(
            texts("# Title\n\nSome *text* here.\n\n## Sub", 80),
            vec!["Title", "", "Some text here.", "", "## Sub"]
        );
    }

    #[test]
    fn heading_is_styled() {
        let lines = render("# Title", 80);
        assert_eq!(lines[0].runs[0].style, theme::preview_heading(1));
    }

    #[test]
    fn emphasis_keeps_base_colors() {
        let lines = render("a **b** c", 80);
        let bold = lines[0].runs.iter().find(|r| r.text == "b").unwrap();
        assert!(bold.style.attr.contains(theme::PREVIEW_STRONG));
    }

    #[test]
    fn gap_after_emphasis_is_plain() {
        let lines = render("a **b** c", 80);
        let runs: Vec<_> = lines[0].runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(runs, vec!["a ", "b", " c"]);
        assert_eq!(lines[0].runs[1].style.attr, theme::PREVIEW_STRONG);
        assert_eq!(lines[0].runs[2].style, theme::PREVIEW_TEXT);
    }

    #[test]
    fn strikethrough_stops_at_the_word() {
        let lines = render("~~x~~ y", 80);
        let runs = &lines[0].runs;
        assert_eq!(runs[0].text, "x");
        assert!(runs[0].style.attr.contains(theme::PREVIEW_STRIKE));
        assert_eq!(runs[1].text, " y");
        assert!(!runs[1].style.attr.contains(theme::PREVIEW_STRIKE));
    }

    #[test]
    fn paragraphs_wrap_at_width() {
        assert_eq!(
            texts("one two three four five", 10),
            vec!["one two", "three four", "five"]
        );
    }

    #[test]
    fn long_words_are_split() {
        assert_eq!(texts("abcdefghijkl", 8), vec!["abcdefgh", "ijkl"]);
    }

    #[test]
    fn soft_breaks_join_lines() {
        assert_eq!(texts("one\ntwo", 80), vec!["one two"]);
    }

    #[test]
    fn bullet_list_items() {
        assert_eq!(texts("- a\n- b", 80), vec!["• a", "• b"]);
    }

    #[test]
    fn numbered_list_counts_from_start() {
        assert_eq!(texts("3. x\n4. y", 80), vec!["3. x", "4. y"]);
    }

    #[test]
    fn wrapped_item_aligns_under_text() {
        assert_eq!(texts("- aaa bbb ccc", 9), vec!["• aaa bbb", "  ccc"]);
    }

    #[test]
    fn nested_list_is_indented() {
        assert_eq!(texts("- a\n  - b", 80), vec!["• a", "  • b"]);
    }

    #[test]
    fn block_quote_has_bar() {
        assert_eq!(texts("> quoted", 80), vec!["│ quoted"]);
    }

    #[test]
    fn code_block_lines_are_kept() {
        assert_eq!(
            texts("```rust\nfn main() {}\n    x\n```", 10),
            vec!["rust", "  fn main() {}", "      x"]
        );
    }

    #[test]
    fn inline_code_is_styled() {
        let lines = render("run `cargo`", 80);
        let code = lines[0].runs.iter().find(|r| r.text == "cargo").unwrap();
        assert_eq!(code.style, theme::PREVIEW_CODE);
    }

    #[test]
    fn rule_spans_width() {
        assert_eq!(texts("a\n\n---\n\nb", 10), vec!["a", "", "──────────", "", "b"]);
    }

    #[test]
    fn task_list_markers() {
        assert_eq!(texts("- [x] done\n- [ ] todo", 80), vec!["• [x] done", "• [ ] todo"]);
    }

    #[test]
    fn no_trailing_or_double_blank_lines() {
        let lines = texts("a\n\n\n\nb\n\n", 80);
        assert_eq!(lines, vec!["a", "", "b"]);
    }
}
