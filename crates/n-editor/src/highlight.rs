//! Syntax highlighting for fenced code blocks via tree-sitter.
//!
//! A [`Highlighter`] wraps a tree-sitter `Parser` + `Tree` with a compiled
//! highlight `Query` and a capture-to-[`Token`] table. It follows the same
//! stale-flag protocol as the code-span index:
//!
//! 1. [`Highlighter::set_source`] (or [`Highlighter::mark_dirty`]) flags the
//!    tree as stale when the block's text changed.
//! 2. [`Highlighter::ensure_parsed`] does a full reparse only when stale and
//!    recomputes the per-line tokens.
//! 3. [`Highlighter::line_tokens`] reads them.
//!
//! [`CodeHighlights`] sits on top: it keeps one highlighter per supported
//! language and the tokens of every block, refreshed when the buffer
//! revision moves.
//!
//! | Tag | Grammar |
//! |-----|---------|
//! | `rust`, `rs` | `tree-sitter-rust` |
//! | `go`, `golang` | `tree-sitter-go` |
//! | `python`, `py`, `python3` | `tree-sitter-python` |
//! | `javascript`, `js`, `jsx`, `mjs` | `tree-sitter-javascript` |
//! | `bash`, `sh`, `shell`, `zsh` | `tree-sitter-bash` |
//! | `json` | `tree-sitter-json` |
//!
//! Any other tag gets plain code styling.

use std::collections::HashMap;

use streaming_iterator::StreamingIterator;
use tracing::{trace, warn};
use tree_sitter::{Parser, Query, QueryCursor, Tree};

use crate::buffer::Buffer;
use crate::code_span::CodeSpan;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Highlight class of one char.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    #[default]
    Plain,
    Keyword,
    String,
    Comment,
    Function,
    Macro,
    Constant,
    Type,
    /// `self`, `super` and friends.
    Builtin,
    Attribute,
    Property,
}

/// Grammars we ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    Go,
    Python,
    JavaScript,
    Bash,
    Json,
}

impl Language {
    /// Language of a fence tag, case-insensitive.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "rust" | "rs" => Some(Self::Rust),
            "go" | "golang" => Some(Self::Go),
            "python" | "py" | "python3" => Some(Self::Python),
            "javascript" | "js" | "jsx" | "mjs" => Some(Self::JavaScript),
            "bash" | "sh" | "shell" | "zsh" => Some(Self::Bash),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Grammar and its bundled highlight query.
    fn grammar(self) -> (tree_sitter::Language, &'static str) {
        match self {
            Self::Rust => (
                tree_sitter_rust::LANGUAGE.into(),
                tree_sitter_rust::HIGHLIGHTS_QUERY,
            ),
            Self::Go => (
                tree_sitter_go::LANGUAGE.into(),
                tree_sitter_go::HIGHLIGHTS_QUERY,
            ),
            Self::Python => (
                tree_sitter_python::LANGUAGE.into(),
                tree_sitter_python::HIGHLIGHTS_QUERY,
            ),
            Self::JavaScript => (
                tree_sitter_javascript::LANGUAGE.into(),
                tree_sitter_javascript::HIGHLIGHT_QUERY,
            ),
            Self::Bash => (
                tree_sitter_bash::LANGUAGE.into(),
                tree_sitter_bash::HIGHLIGHT_QUERY,
            ),
            Self::Json => (
                tree_sitter_json::LANGUAGE.into(),
                tree_sitter_json::HIGHLIGHTS_QUERY,
            ),
        }
    }
}

/// Syntax highlighter for one piece of source text.
pub struct Highlighter {
    parser: Parser,
    tree: Option<Tree>,
    query: Query,
    /// Token for each capture index.
    capture_tokens: Vec<Token>,
    source: String,
    /// One entry per source line, one token per char.
    lines: Vec<Vec<Token>>,
    stale: bool,
}

// ---------------------------------------------------------------------------
// Highlighter
// ---------------------------------------------------------------------------

impl Highlighter {
    /// Returns `None` if the grammar or its query fails to load.
    ///
    /// A query that doesn't compile is logged and the language falls back
    /// to plain code styling.
    #[must_use]
    pub fn new(language: Language) -> Option<Self> {
        let (ts_language, query_source) = language.grammar();

        let mut parser = Parser::new();
        parser.set_language(&ts_language).ok()?;
        let query = Query::new(&ts_language, query_source)
            .map_err(|err| warn!(?language, %err, "highlight query rejected"))
            .ok()?;
        let capture_tokens = query.capture_names().iter().map(|n| capture_token(n)).collect();

        Some(Self {
            parser,
            tree: None,
            query,
            capture_tokens,
            source: String::new(),
            lines: Vec::new(),
            stale: true,
        })
    }

    /// Highlighter for a fence tag, if the tag names a supported language.
    #[must_use]
    pub fn for_tag(tag: &str) -> Option<Self> {
        Self::new(Language::from_tag(tag)?)
    }

    #[inline]
    pub const fn mark_dirty(&mut self) {
        self.stale = true;
    }

    #[inline]
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Replace the text to highlight. Marks the tree stale only when the
    /// text actually differs.
    pub fn set_source(&mut self, source: &str) {
        if self.source != source {
            source.clone_into(&mut self.source);
            self.stale = true;
        }
    }

    /// Reparse and recompute tokens if stale.
    pub fn ensure_parsed(&mut self) {
        if !self.stale {
            return;
        }
        // No edit tracking, so the old tree is never passed as a hint.
        self.tree = self.parser.parse(&self.source, None);
        self.lines = self.compute_tokens();
        self.stale = false;
    }

    /// Tokens of source line `line`, one per char. Empty for lines past the
    /// end. Call [`ensure_parsed`](Self::ensure_parsed) first.
    #[must_use]
    pub fn line_tokens(&self, line: usize) -> &[Token] {
        self.lines.get(line).map_or(&[], Vec::as_slice)
    }

    fn compute_tokens(&self) -> Vec<Vec<Token>> {
        let starts = line_starts(&self.source);
        let mut result: Vec<Vec<Token>> = (0..starts.len())
            .map(|row| {
                let (from, to) = line_bounds(&starts, self.source.len(), row);
                vec![Token::Plain; char_count(&self.source, from, to)]
            })
            .collect();

        let Some(tree) = &self.tree else {
            return result;
        };

        let mut cursor = QueryCursor::new();
        let mut captures = cursor.captures(&self.query, tree.root_node(), self.source.as_bytes());
        while let Some((m, _capture_idx)) = captures.next() {
            for capture in m.captures {
                let token = self.capture_tokens[capture.index as usize];
                if token == Token::Plain {
                    continue;
                }
                let node = capture.node;
                let last_row = node.end_position().row.min(starts.len() - 1);

                // A node may span lines; paint each line's part. Later
                // captures override earlier ones.
                for row in node.start_position().row..=last_row {
                    let (line_start, line_end) = line_bounds(&starts, self.source.len(), row);
                    let from = node.start_byte().max(line_start);
                    let to = node.end_byte().min(line_end);
                    if from >= to {
                        continue;
                    }
                    let first = char_count(&self.source, line_start, from);
                    let last = first + char_count(&self.source, from, to);
                    let line = &mut result[row];
                    let end = last.min(line.len());
                    if first < end {
                        line[first..end].fill(token);
                    }
                }
            }
        }
        result
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("lines", &self.lines.len())
            .field("stale", &self.stale)
            .finish_non_exhaustive()
    }
}

/// Byte offset of the start of every line.
fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

/// Byte range of line `row`, without its `\n`.
fn line_bounds(starts: &[usize], len: usize, row: usize) -> (usize, usize) {
    let start = starts[row];
    let end = starts.get(row + 1).map_or(len, |next| next - 1);
    (start, end)
}

fn char_count(source: &str, from: usize, to: usize) -> usize {
    source.get(from..to).map_or(0, |s| s.chars().count())
}

/// Highlight class of a capture name. Each grammar names its captures a
/// little differently, so dotted names fall back to their first segment
/// (`function.method` is a function, `string.special` a string).
/// Punctuation, operators and plain variables stay unstyled.
fn capture_token(name: &str) -> Token {
    match name {
        "function.macro" => return Token::Macro,
        "variable.builtin" => return Token::Builtin,
        // JSON object keys.
        "string.special.key" => return Token::Property,
        _ => {}
    }
    match name.split('.').next().unwrap_or(name) {
        "keyword" => Token::Keyword,
        "string" | "escape" => Token::String,
        "comment" => Token::Comment,
        "function" => Token::Function,
        "constant" | "number" => Token::Constant,
        "type" | "constructor" => Token::Type,
        "attribute" | "label" => Token::Attribute,
        "property" => Token::Property,
        _ => Token::Plain,
    }
}

// ---------------------------------------------------------------------------
// Per-buffer cache
// ---------------------------------------------------------------------------

/// Tokens for every highlightable code block of a buffer.
#[derive(Debug, Default)]
pub struct CodeHighlights {
    highlighters: HashMap<Language, Highlighter>,
    /// Block content tokens keyed by the block's opening fence line. Index 0
    /// is the first line after the fence.
    blocks: HashMap<usize, Vec<Vec<Token>>>,
    revision: Option<u64>,
}

impl CodeHighlights {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute block tokens if the buffer changed since the last call.
    /// `spans` must be fresh for `buf`.
    pub fn refresh(&mut self, buf: &Buffer, spans: &[CodeSpan]) {
        if self.revision == Some(buf.revision()) {
            return;
        }
        self.revision = Some(buf.revision());
        self.blocks.clear();

        for span in spans {
            let Some(language) = Language::from_tag(&span.language) else {
                continue;
            };
            if span.end <= span.start + 1 {
                continue;
            }
            let hl = match self.highlighters.entry(language) {
                std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
                std::collections::hash_map::Entry::Vacant(e) => {
                    let Some(hl) = Highlighter::new(language) else {
                        continue;
                    };
                    e.insert(hl)
                }
            };

            let source = (span.start + 1..span.end)
                .map(|n| buf.line_text(n))
                .collect::<Vec<_>>()
                .join("\n");
            hl.set_source(&source);
            hl.ensure_parsed();
            let tokens = (0..span.end - span.start - 1)
                .map(|i| hl.line_tokens(i).to_vec())
                .collect();
            self.blocks.insert(span.start, tokens);
        }
        trace!(blocks = self.blocks.len(), "refreshed code highlights");
    }

    /// Tokens of buffer line `line` inside `span`, if that block is
    /// highlighted.
    #[must_use]
    pub fn tokens(&self, span: &CodeSpan, line: usize) -> Option<&[Token]> {
        let rows = self.blocks.get(&span.start)?;
        let idx = line.checked_sub(span.start + 1)?;
        rows.get(idx).map(Vec::as_slice)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
