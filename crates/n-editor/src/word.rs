//! Word motions for `w`, `b` and `e`.
//!
//! | Motion | Key | Lands on |
//! |--------|-----|----------|
//! | [`next_word`] | `w` | first char of the next word |
//! | [`prev_word`] | `b` | first char of the current or previous word |
//! | [`end_of_word`] | `e` | last char of the current or next word |
//!
//! # Classification
//!
//! There are only two classes. Space, tab, CR and LF are whitespace; every
//! other char is a word char. Punctuation does not split words, so
//! `foo.bar(x)` is a single word. Markdown prose is mostly words separated by
//! spaces, and this keeps `w` hopping one visible token at a time.
//!
//! # Line boundaries
//!
//! An empty line is a zero-length word: `w` and `b` stop on it, `e` passes
//! over it. At the buffer edges every motion clamps; nothing wraps.

use ropey::RopeSlice;

use crate::buffer::Buffer;
use crate::position::Position;

/// True for the chars that separate words.
#[inline]
#[must_use]
pub const fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

// ---------------------------------------------------------------------------
// Motions
// ---------------------------------------------------------------------------

/// `w`: forward to the start of the next word.
///
/// Leaves the current word, then the whitespace after it. Running off the
/// end of the line continues at column 0 of the next line, skipping that
/// line's indentation. On the last line the cursor stops past its end.
#[must_use]
pub fn next_word(buf: &Buffer, pos: Position) -> Position {
    let pos = buf.clamp(pos);
    let Some(line) = buf.line(pos.line) else {
        return pos;
    };
    let len = line.len_chars();

    let mut col = pos.col;
    while col < len && !is_whitespace(line.char(col)) {
        col += 1;
    }
    while col < len && is_whitespace(line.char(col)) {
        col += 1;
    }

    if col >= len && pos.line < buf.last_line() {
        let row = pos.line + 1;
        return Position::new(row, skip_blank(buf.line(row), 0));
    }
    Position::new(pos.line, col)
}

/// `b`: backward to the start of the current or previous word.
///
/// Steps back one char (onto the end of the previous line from column 0),
/// skips whitespace backward, then walks back to the first char of the word
/// found there. A line holding nothing but whitespace before the cursor
/// sends the search on to the line above; an empty line is itself a stop.
#[must_use]
pub fn prev_word(buf: &Buffer, pos: Position) -> Position {
    let mut pos = buf.clamp(pos);
    loop {
        let (row, col) = if pos.col > 0 {
            (pos.line, pos.col - 1)
        } else if pos.line > 0 {
            let row = pos.line - 1;
            (row, buf.line_len(row))
        } else {
            return Position::ZERO;
        };

        let Some(line) = buf.line(row) else {
            return Position::ZERO;
        };
        let len = line.len_chars();
        if len == 0 {
            return Position::new(row, 0);
        }

        // Past-the-end (came up from the next line): start on the last char.
        let mut col = col.min(len - 1);
        while col > 0 && is_whitespace(line.char(col)) {
            col -= 1;
        }
        if is_whitespace(line.char(col)) {
            // Only whitespace before us on this line.
            if row == 0 {
                return Position::ZERO;
            }
            pos = Position::new(row, 0);
            continue;
        }
        while col > 0 && !is_whitespace(line.char(col - 1)) {
            col -= 1;
        }
        return Position::new(row, col);
    }
}

/// `e`: forward to the last char of the current or next word.
///
/// Inside a word (not on its last char) this is the end of that word.
/// Otherwise the search skips whitespace, crossing lines, and lands on the
/// end of the next word. When no word follows, the cursor stays put.
#[must_use]
pub fn end_of_word(buf: &Buffer, pos: Position) -> Position {
    let pos = buf.clamp(pos);
    let Some(line) = buf.line(pos.line) else {
        return pos;
    };
    let len = line.len_chars();

    let on_word = pos.col < len && !is_whitespace(line.char(pos.col));
    let mut row = pos.line;
    let mut col = if on_word { pos.col + 1 } else { pos.col };

    if on_word && col < len && !is_whitespace(line.char(col)) {
        return Position::new(row, word_end(line, col));
    }

    loop {
        let Some(line) = buf.line(row) else {
            return pos;
        };
        col = skip_blank(Some(line), col);
        if col < line.len_chars() {
            return Position::new(row, word_end(line, col));
        }
        if row >= buf.last_line() {
            return pos;
        }
        row += 1;
        col = 0;
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// First non-whitespace column at or after `col` (the line length if none).
fn skip_blank(line: Option<RopeSlice<'_>>, mut col: usize) -> usize {
    let Some(line) = line else {
        return 0;
    };
    let len = line.len_chars();
    while col < len && is_whitespace(line.char(col)) {
        col += 1;
    }
    col
}

/// Last column of the word that contains `col`.
fn word_end(line: RopeSlice<'_>, mut col: usize) -> usize {
    let len = line.len_chars();
    while col + 1 < len && !is_whitespace(line.char(col + 1)) {
        col += 1;
    }
    col
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn w(text: &str, line: usize, col: usize) -> Position {
        next_word(&Buffer::from_text(text), p(line, col))
    }

    fn b(text: &str, line: usize, col: usize) -> Position {
        prev_word(&Buffer::from_text(text), p(line, col))
    }

    fn e(text: &str, line: usize, col: usize) -> Position {
        end_of_word(&Buffer::from_text(text), p(line, col))
    }

    // -- Classification -----------------------------------------------------

    #[test]
    fn whitespace_set() {
        for ch in [' ', '\t', '\r', '\n'] {
            assert!(is_whitespace(ch), "{ch:?}");
        }
        for ch in ['a', '.', '#', '`', 'é', '\u{a0}'] {
            assert!(!is_whitespace(ch), "{ch:?}");
        }
    }

    // -- next_word (w) ------------------------------------------------------

    #[test]
    fn w_two_words() {
        assert_eq!(w("hello world", 0, 0), p(0, 6));
    }

    #[test]
    fn w_from_middle_of_word() {
        assert_eq!(w("hello world", 0, 2), p(0, 6));
    }

    #[test]
    fn w_runs_of_spaces_and_tabs() {
        assert_eq!(w("a  \t b", 0, 0), p(0, 5));
    }

    #[test]
    fn w_punctuation_is_part_of_word() {
        assert_eq!(w("foo.bar(x) next", 0, 0), p(0, 11));
    }

    #[test]
    fn w_from_whitespace() {
        assert_eq!(w("a   b", 0, 2), p(0, 4));
    }

    #[test]
    fn w_wraps_to_next_line_and_skips_indent() {
        assert_eq!(w("foo\n   bar", 0, 1), p(1, 3));
    }

    #[test]
    fn w_trailing_spaces_then_next_line() {
        assert_eq!(w("foo   \nbar", 0, 0), p(1, 0));
    }

    #[test]
    fn w_stops_on_empty_line() {
        assert_eq!(w("foo\n\nbar", 0, 0), p(1, 0));
        assert_eq!(w("foo\n\nbar", 1, 0), p(2, 0));
    }

    #[test]
    fn w_last_word_clamps_to_line_end() {
        assert_eq!(w("one two", 0, 4), p(0, 7));
        assert_eq!(w("one two", 0, 7), p(0, 7));
    }

    #[test]
    fn w_empty_buffer() {
        assert_eq!(w("", 0, 0), p(0, 0));
    }

    // -- prev_word (b) ------------------------------------------------------

    #[test]
    fn b_to_start_of_previous_word() {
        assert_eq!(b("hello world", 0, 6), p(0, 0));
    }

    #[test]
    fn b_from_middle_of_word_goes_to_its_start() {
        assert_eq!(b("hello world", 0, 8), p(0, 6));
    }

    #[test]
    fn b_from_end_of_line() {
        assert_eq!(b("hello world", 0, 11), p(0, 6));
    }

    #[test]
    fn b_crosses_to_previous_line() {
        assert_eq!(b("foo bar\nbaz", 1, 0), p(0, 4));
    }

    #[test]
    fn b_skips_indentation_to_previous_line() {
        assert_eq!(b("foo\n   bar", 1, 3), p(0, 0));
    }

    #[test]
    fn w_then_b_across_an_indented_line() {
        let buf = Buffer::from_text("foo\n   bar");
        let there = next_word(&buf, p(0, 1));
        assert_eq!(there, p(1, 3));
        assert_eq!(prev_word(&buf, there), p(0, 0));
    }

    #[test]
    fn b_passes_whitespace_only_lines() {
        assert_eq!(b("foo\n  \n   bar", 2, 3), p(0, 0));
    }

    #[test]
    fn b_stops_on_empty_line() {
        assert_eq!(b("foo\n\nbar", 2, 0), p(1, 0));
    }

    #[test]
    fn b_at_buffer_start_clamps() {
        assert_eq!(b("foo", 0, 0), p(0, 0));
        assert_eq!(b("   foo", 0, 3), p(0, 0));
    }

    #[test]
    fn b_multiple_spaces() {
        assert_eq!(b("ab    cd", 0, 6), p(0, 0));
    }

    // -- end_of_word (e) ----------------------------------------------------

    #[test]
    fn e_to_end_of_current_word() {
        assert_eq!(e("hello world", 0, 0), p(0, 4));
        assert_eq!(e("hello world", 0, 2), p(0, 4));
    }

    #[test]
    fn e_at_end_goes_to_next_word_end() {
        assert_eq!(e("hello world", 0, 4), p(0, 10));
    }

    #[test]
    fn e_from_whitespace() {
        assert_eq!(e("hello   world", 0, 6), p(0, 12));
    }

    #[test]
    fn e_crosses_lines_and_skips_empty_ones() {
        assert_eq!(e("foo\n\n  bar", 0, 2), p(2, 4));
    }

    #[test]
    fn e_single_char_words() {
        assert_eq!(e("a b c", 0, 0), p(0, 2));
    }

    #[test]
    fn e_no_more_words_stays() {
        assert_eq!(e("end", 0, 2), p(0, 2));
        assert_eq!(e("end   \n  ", 0, 2), p(0, 2));
    }

    #[test]
    fn e_whitespace_only_buffer() {
        assert_eq!(e("   ", 0, 1), p(0, 1));
    }

    // -- Laws ---------------------------------------------------------------

    proptest! {
        #[test]
        fn w_then_b_returns_to_word_start(text in "[a-c]{1,4}([ \n]{1,3}[a-c]{1,4}){1,6}", pick in 0usize..64) {
            let buf = Buffer::from_text(&text);
            // Pick a word char strictly inside the text.
            let words: Vec<Position> = (0..buf.line_count())
                .flat_map(|l| (0..buf.line_len(l)).map(move |c| p(l, c)))
                .filter(|&q| buf.char_at(q).is_some_and(|ch| !is_whitespace(ch)))
                .collect();
            let start = words[pick % words.len()];
            let mut word_start = start.col;
            let line = buf.line(start.line).unwrap();
            while word_start > 0 && !is_whitespace(line.char(word_start - 1)) {
                word_start -= 1;
            }

            let back = prev_word(&buf, next_word(&buf, start));
            prop_assert_eq!(back, p(start.line, word_start));
        }

        #[test]
        fn e_never_lands_on_whitespace_when_a_word_follows(text in "[a-b \n]{0,24}", line in 0usize..8, col in 0usize..8) {
            let buf = Buffer::from_text(&text);
            let from = buf.clamp(p(line, col));
            let to = end_of_word(&buf, from);
            prop_assert!(to >= from);
            if to != from {
                let ch = buf.char_at(to);
                prop_assert!(ch.is_some_and(|c| !is_whitespace(c)));
            }
        }

        #[test]
        fn motions_stay_in_bounds(text in "[a-b \t\n]{0,24}", line in 0usize..8, col in 0usize..8) {
            let buf = Buffer::from_text(&text);
            let from = p(line, col);
            for to in [next_word(&buf, from), prev_word(&buf, from), end_of_word(&buf, from)] {
                prop_assert!(to.line < buf.line_count());
                prop_assert!(to.col <= buf.line_len(to.line));
            }
        }
    }
}
