// SPDX-License-Identifier: MIT
//
// Decoding stdin bytes into keys and pastes.
//
// The decoder looks at the front of its buffer and takes one step at a
// time: emit an event, skip garbage, start a paste, or wait for more bytes
// because the front is a prefix of something longer. Escape sequences are
// resolved through two small lookup tables, one for `CSI n ~` and one for
// the letter finals shared by CSI and SS3.
//
// A lone ESC stays buffered. The event loop calls [`Parser::flush`] once
// input has been quiet for a tick, and the byte becomes the Escape key.

use bitflags::bitflags;

// ─── Events ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Everything between the bracketed paste delimiters, as one string.
    Paste(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    /// Shift+Tab, sent as `CSI Z`.
    BackTab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

bitflags! {
    /// Bit values match xterm's modifier parameter minus one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const ALT   = 0b010;
        const CTRL  = 0b100;
    }
}

// ─── Tables ─────────────────────────────────────────────────────────────────

/// `CSI n ~` keys by parameter.
const TILDE_KEYS: &[(u16, KeyCode)] = &[
    (1, KeyCode::Home),
    (2, KeyCode::Insert),
    (3, KeyCode::Delete),
    (4, KeyCode::End),
    (5, KeyCode::PageUp),
    (6, KeyCode::PageDown),
    (7, KeyCode::Home),
    (8, KeyCode::End),
    (11, KeyCode::F(1)),
    (12, KeyCode::F(2)),
    (13, KeyCode::F(3)),
    (14, KeyCode::F(4)),
    (15, KeyCode::F(5)),
    (17, KeyCode::F(6)),
    (18, KeyCode::F(7)),
    (19, KeyCode::F(8)),
    (20, KeyCode::F(9)),
    (21, KeyCode::F(10)),
    (23, KeyCode::F(11)),
    (24, KeyCode::F(12)),
];

/// Final bytes that name a key by themselves, after `CSI` or `SS3`.
const LETTER_KEYS: &[(u8, KeyCode)] = &[
    (b'A', KeyCode::Up),
    (b'B', KeyCode::Down),
    (b'C', KeyCode::Right),
    (b'D', KeyCode::Left),
    (b'H', KeyCode::Home),
    (b'F', KeyCode::End),
    (b'P', KeyCode::F(1)),
    (b'Q', KeyCode::F(2)),
    (b'R', KeyCode::F(3)),
    (b'S', KeyCode::F(4)),
    (b'Z', KeyCode::BackTab),
];

const PASTE_BEGIN: u16 = 200;
const PASTE_END: &[u8] = b"\x1b[201~";

fn lookup<K: Copy + PartialEq>(table: &[(K, KeyCode)], wanted: K) -> Option<KeyCode> {
    table
        .iter()
        .find_map(|&(k, code)| (k == wanted).then_some(code))
}

// ─── Decoding ───────────────────────────────────────────────────────────────

/// One decoding step at the front of the buffer.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Emit(KeyEvent, usize),
    BeginPaste(usize),
    Skip(usize),
    /// The front is an incomplete sequence.
    Wait,
}

fn step(bytes: &[u8]) -> Step {
    match bytes {
        [] => Step::Wait,
        [0x1B, rest @ ..] => escape(rest),
        _ => single(bytes),
    }
}

/// A key that starts with anything but ESC: a control byte, ASCII or UTF-8.
fn single(bytes: &[u8]) -> Step {
    match control(bytes[0]) {
        Some(key) => Step::Emit(key, 1),
        None => utf8(bytes),
    }
}

/// Keys that are a single byte. `None` for bytes at or above 0x80.
fn control(byte: u8) -> Option<KeyEvent> {
    let ctrl = |ch: u8| KeyEvent::new(KeyCode::Char(char::from(ch)), Modifiers::CTRL);
    let key = match byte {
        b'\r' | b'\n' => KeyEvent::plain(KeyCode::Enter),
        b'\t' => KeyEvent::plain(KeyCode::Tab),
        0x08 | 0x7F => KeyEvent::plain(KeyCode::Backspace),
        0x1B => KeyEvent::plain(KeyCode::Escape),
        0x00 => ctrl(b'@'),
        0x01..=0x1A => ctrl(byte + 0x60),
        0x1C..=0x1F => ctrl(byte + 0x40),
        0x20..=0x7E => KeyEvent::plain(KeyCode::Char(char::from(byte))),
        _ => return None,
    };
    Some(key)
}

fn utf8(bytes: &[u8]) -> Step {
    let len = match bytes[0] {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Step::Skip(1),
    };
    let available = &bytes[..bytes.len().min(len)];
    if !available[1..].iter().all(|b| (0x80..=0xBF).contains(b)) {
        return Step::Skip(1);
    }
    if available.len() < len {
        return Step::Wait;
    }
    std::str::from_utf8(available)
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Step::Skip(1), |ch| {
            Step::Emit(KeyEvent::plain(KeyCode::Char(ch)), len)
        })
}

/// Everything after a leading ESC.
fn escape(rest: &[u8]) -> Step {
    match rest {
        [] => Step::Wait,
        [b'[', body @ ..] => csi(body),
        [b'O'] => Step::Wait,
        [b'O', fin, ..] => lookup(LETTER_KEYS, *fin)
            .map_or(Step::Skip(3), |code| Step::Emit(KeyEvent::plain(code), 3)),
        _ => match single(rest) {
            Step::Emit(mut key, n) => {
                key.modifiers |= Modifiers::ALT;
                Step::Emit(key, n + 1)
            }
            Step::Wait => Step::Wait,
            _ => Step::Emit(KeyEvent::plain(KeyCode::Escape), 1),
        },
    }
}

/// `CSI params final`, with `body` starting after the `[`.
fn csi(body: &[u8]) -> Step {
    let Some(end) = body.iter().position(|b| !(0x20..=0x3F).contains(b)) else {
        return Step::Wait;
    };
    let len = 2 + end + 1;
    let fin = body[end];
    if !(0x40..=0x7E).contains(&fin) {
        // A stray byte cut the sequence short; drop what came before it.
        return Step::Skip(2 + end);
    }

    let (first, second) = params(&body[..end]);
    let modifiers = modifiers(second);
    let code = match fin {
        b'~' if first == PASTE_BEGIN => return Step::BeginPaste(len),
        b'~' => lookup(TILDE_KEYS, first),
        _ => lookup(LETTER_KEYS, fin),
    };
    code.map_or(Step::Skip(len), |code| {
        Step::Emit(KeyEvent::new(code, modifiers), len)
    })
}

/// The first two `;`-separated numbers. Missing or malformed ones read as 0.
fn params(raw: &[u8]) -> (u16, u16) {
    let mut numbers = raw.split(|&b| b == b';').map(|part| {
        std::str::from_utf8(part)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    });
    let first = numbers.next().unwrap_or(0);
    let second = numbers.next().unwrap_or(0);
    (first, second)
}

/// xterm sends `1 + bits`; 0 and 1 both mean no modifier.
fn modifiers(param: u16) -> Modifiers {
    u8::try_from(param.saturating_sub(1)).map_or(Modifiers::empty(), Modifiers::from_bits_truncate)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental decoder. Bytes that don't form a whole event yet stay
/// buffered across [`advance`](Self::advance) calls.
#[derive(Debug, Default)]
pub struct Parser {
    pending: Vec<u8>,
    /// Collected paste body while a bracketed paste is open.
    paste: Option<Vec<u8>>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and take every event they complete.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.pending.extend_from_slice(data);
        let mut events = Vec::new();
        let mut at = 0;

        while at < self.pending.len() {
            let rest = &self.pending[at..];

            if let Some(body) = self.paste.as_mut() {
                let Some(end) = find(rest, PASTE_END) else {
                    // Hold back a tail that may be the start of the terminator.
                    let keep = rest.len().min(PASTE_END.len() - 1);
                    let take = rest.len() - keep;
                    body.extend_from_slice(&rest[..take]);
                    at += take;
                    break;
                };
                body.extend_from_slice(&rest[..end]);
                at += end + PASTE_END.len();
                let body = self.paste.take().unwrap_or_default();
                events.push(Event::Paste(String::from_utf8_lossy(&body).into_owned()));
                continue;
            }

            match step(rest) {
                Step::Emit(key, n) => {
                    events.push(Event::Key(key));
                    at += n;
                }
                Step::BeginPaste(n) => {
                    self.paste = Some(Vec::new());
                    at += n;
                }
                Step::Skip(n) => at += n,
                Step::Wait => break,
            }
        }

        self.pending.drain(..at);
        events
    }

    /// Is anything buffered that [`flush`](Self::flush) would resolve?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || self.paste.is_some()
    }

    /// Give up waiting for more bytes. Each buffered byte becomes its own
    /// key, so a lone ESC is the Escape key. An open paste is closed with
    /// what it has.
    pub fn flush(&mut self) -> Vec<Event> {
        let pending = std::mem::take(&mut self.pending);
        if let Some(mut body) = self.paste.take() {
            body.extend_from_slice(&pending);
            if body.is_empty() {
                return Vec::new();
            }
            return vec![Event::Paste(String::from_utf8_lossy(&body).into_owned())];
        }
        pending
            .into_iter()
            .filter_map(control)
            .map(Event::Key)
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(data: &[u8]) -> Vec<Event> {
        Parser::new().advance(data)
    }

    fn plain(code: KeyCode) -> Event {
        Event::Key(KeyEvent::plain(code))
    }

    fn with(code: KeyCode, modifiers: Modifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn check(cases: &[(&str, Event)]) {
        for (input, want) in cases {
            assert_eq!(keys(input.as_bytes()), vec![want.clone()], "input {input:?}");
        }
    }

    // ── Single bytes ──

    #[test]
    fn printable_ascii_is_one_key_per_byte() {
        assert_eq!(
            keys(b"m d"),
            vec![
                plain(KeyCode::Char('m')),
                plain(KeyCode::Char(' ')),
                plain(KeyCode::Char('d')),
            ]
        );
    }

    #[test]
    fn control_bytes() {
        check(&[
            ("\x13", with(KeyCode::Char('s'), Modifiers::CTRL)),
            ("\x16", with(KeyCode::Char('v'), Modifiers::CTRL)),
            ("\x00", with(KeyCode::Char('@'), Modifiers::CTRL)),
            ("\x1f", with(KeyCode::Char('_'), Modifiers::CTRL)),
            ("\r", plain(KeyCode::Enter)),
            ("\n", plain(KeyCode::Enter)),
            ("\t", plain(KeyCode::Tab)),
            ("\x7f", plain(KeyCode::Backspace)),
            ("\x08", plain(KeyCode::Backspace)),
        ]);
    }

    #[test]
    fn multibyte_characters() {
        for s in ["ü", "あ", "🦀"] {
            let ch = s.chars().next().unwrap();
            assert_eq!(keys(s.as_bytes()), vec![plain(KeyCode::Char(ch))]);
        }
    }

    #[test]
    fn character_split_between_reads() {
        let bytes = "あ".as_bytes();
        let mut p = Parser::new();
        assert_eq!(p.advance(&bytes[..2]), Vec::<Event>::new());
        assert!(p.has_pending());
        assert_eq!(p.advance(&bytes[2..]), vec![plain(KeyCode::Char('あ'))]);
        assert!(!p.has_pending());
    }

    #[test]
    fn stray_continuation_bytes_are_dropped() {
        assert_eq!(keys(b"\xbfz"), vec![plain(KeyCode::Char('z'))]);
        assert_eq!(keys(b"\xe3z"), vec![plain(KeyCode::Char('z'))]);
    }

    // ── Escape and Alt ──

    #[test]
    fn escape_alone_needs_a_flush() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1b"), Vec::<Event>::new());
        assert!(p.has_pending());
        assert_eq!(p.flush(), vec![plain(KeyCode::Escape)]);
        assert!(!p.has_pending());
        assert_eq!(p.flush(), Vec::<Event>::new());
    }

    #[test]
    fn escape_prefix_means_alt() {
        check(&[
            ("\x1bj", with(KeyCode::Char('j'), Modifiers::ALT)),
            ("\x1b\x1b", with(KeyCode::Escape, Modifiers::ALT)),
            ("\x1b\r", with(KeyCode::Enter, Modifiers::ALT)),
        ]);
    }

    #[test]
    fn flush_splits_a_partial_sequence_into_keys() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1bO"), Vec::<Event>::new());
        assert_eq!(
            p.flush(),
            vec![plain(KeyCode::Escape), plain(KeyCode::Char('O'))]
        );
    }

    // ── Sequences ──

    #[test]
    fn letter_finals_after_csi_and_ss3() {
        check(&[
            ("\x1b[A", plain(KeyCode::Up)),
            ("\x1b[B", plain(KeyCode::Down)),
            ("\x1b[C", plain(KeyCode::Right)),
            ("\x1b[D", plain(KeyCode::Left)),
            ("\x1b[H", plain(KeyCode::Home)),
            ("\x1b[F", plain(KeyCode::End)),
            ("\x1b[Z", plain(KeyCode::BackTab)),
            ("\x1bOB", plain(KeyCode::Down)),
            ("\x1bOP", plain(KeyCode::F(1))),
        ]);
    }

    #[test]
    fn tilde_sequences() {
        check(&[
            ("\x1b[3~", plain(KeyCode::Delete)),
            ("\x1b[2~", plain(KeyCode::Insert)),
            ("\x1b[6~", plain(KeyCode::PageDown)),
            ("\x1b[7~", plain(KeyCode::Home)),
            ("\x1b[8~", plain(KeyCode::End)),
            ("\x1b[17~", plain(KeyCode::F(6))),
            ("\x1b[24~", plain(KeyCode::F(12))),
        ]);
    }

    #[test]
    fn modifier_parameter() {
        check(&[
            ("\x1b[2;2~", with(KeyCode::Insert, Modifiers::SHIFT)),
            ("\x1b[1;5A", with(KeyCode::Up, Modifiers::CTRL)),
            ("\x1b[1;3D", with(KeyCode::Left, Modifiers::ALT)),
            (
                "\x1b[3;6~",
                with(KeyCode::Delete, Modifiers::SHIFT | Modifiers::CTRL),
            ),
        ]);
    }

    #[test]
    fn unrecognized_sequences_vanish() {
        assert_eq!(keys(b"\x1b[42~q"), vec![plain(KeyCode::Char('q'))]);
        assert_eq!(keys(b"\x1b[5n"), Vec::<Event>::new());
        assert_eq!(keys(b"\x1bOx"), Vec::<Event>::new());
    }

    #[test]
    fn sequence_split_between_reads() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1b[1;"), Vec::<Event>::new());
        assert_eq!(p.advance(b"5C"), vec![with(KeyCode::Right, Modifiers::CTRL)]);
    }

    #[test]
    fn params_and_modifiers() {
        assert_eq!(params(b"1;5"), (1, 5));
        assert_eq!(params(b";3"), (0, 3));
        assert_eq!(params(b""), (0, 0));
        assert_eq!(modifiers(0), Modifiers::empty());
        assert_eq!(modifiers(1), Modifiers::empty());
        assert_eq!(modifiers(8), Modifiers::all());
    }

    // ── Bracketed paste ──

    #[test]
    fn paste_arrives_whole() {
        assert_eq!(
            keys(b"\x1b[200~- [ ] one\n- [x] two\x1b[201~"),
            vec![Event::Paste("- [ ] one\n- [x] two".into())]
        );
    }

    #[test]
    fn escape_bytes_inside_a_paste_are_text() {
        assert_eq!(
            keys(b"\x1b[200~\x1b[B\x1bk\x1b[201~i"),
            vec![
                Event::Paste("\x1b[B\x1bk".into()),
                plain(KeyCode::Char('i')),
            ]
        );
    }

    #[test]
    fn paste_delimiters_split_between_reads() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1b[2"), Vec::<Event>::new());
        assert_eq!(p.advance(b"00~ab"), Vec::<Event>::new());
        assert_eq!(p.advance(b"cd\x1b[20"), Vec::<Event>::new());
        assert_eq!(
            p.advance(b"1~x"),
            vec![Event::Paste("abcd".into()), plain(KeyCode::Char('x'))]
        );
        assert!(!p.has_pending());
    }

    #[test]
    fn flush_closes_an_open_paste() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1b[200~# Ti"), Vec::<Event>::new());
        assert!(p.has_pending());
        assert_eq!(p.flush(), vec![Event::Paste("# Ti".into())]);
        assert!(!p.has_pending());
    }

    #[test]
    fn empty_paste() {
        assert_eq!(keys(b"\x1b[200~\x1b[201~"), vec![Event::Paste(String::new())]);
    }
}
