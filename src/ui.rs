// SPDX-License-Identifier: MIT
//
// Painting: the session's state turned into cells of one frame.
//
//   row 0        tab bar
//   rows 1..h-2  editor text (with gutter) or the rendered preview
//   row h-2      status bar
//   row h-1      help bar
//
// Nothing here changes the text. The only session writes are refreshing
// the code-span index and clamping the preview scroll offset, both of which
// depend on what is being painted.

use n_editor::buffer::Buffer;
use n_editor::highlight::CodeHighlights;
use n_editor::markdown;
use n_editor::mode::{self, Mode, Tab};
use n_editor::session::{CHROME_ROWS, Session, StatusKind};
use n_editor::viewport::char_display_width;
use n_term::ansi::CursorShape;
use n_term::screen::{Cell, Frame};
use n_term::style::Style;
use unicode_width::UnicodeWidthStr;

use crate::preview::{self, PreviewLine};
use crate::theme;

const NEW_FILE: &str = "[New File]";

/// Painter state that outlives one frame: highlight and preview caches.
#[derive(Default)]
pub struct Painter {
    highlights: CodeHighlights,
    preview: PreviewCache,
}

impl Painter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint the whole screen.
    pub fn paint(&mut self, session: &mut Session, frame: &mut Frame) {
        let (w, h) = (frame.width(), frame.height());
        if w == 0 || h == 0 {
            return;
        }
        if h < CHROME_ROWS {
            frame.fill_row(0, theme::STATUS);
            frame.put_str(0, 0, "terminal too small", theme::STATUS_ERROR);
            return;
        }

        paint_tabs(frame, session.tab());
        match session.tab() {
            Tab::Editor => self.paint_editor(session, frame),
            Tab::Preview => self.paint_preview(session, frame),
        }
        paint_status(frame, session, h - 2);
        paint_help(frame, session, h - 1);
    }

    fn paint_editor(&mut self, session: &mut Session, frame: &mut Frame) {
        session.code_spans();
        let session: &Session = session;
        let spans = session.code_spans_cached();
        let buf = session.buffer();
        self.highlights.refresh(buf, spans.spans());

        let gutter = session.gutter_width();
        let area = session.text_area();
        let view = session.viewport();
        let cursor_line = session.cursor().line;

        for row in 0..area.height {
            let y = 1 + row;
            let line = view.offset_row() + usize::from(row);
            frame.fill_row(y, theme::TEXT_AREA);

            if line >= buf.line_count() {
                frame.put_char(0, y, '~', theme::TILDE);
                continue;
            }

            if gutter > 0 {
                let style = if line == cursor_line {
                    theme::GUTTER_CURRENT
                } else {
                    theme::GUTTER
                };
                let digits = usize::from(gutter - 1);
                frame.put_str(0, y, &format!("{:>digits$} ", line + 1), style);
            }

            let text = buf.line_text(line);
            let styles: Vec<Style> = match spans.span_at(line) {
                Some(span) => {
                    frame.fill(gutter, y, area.width, theme::CODE);
                    let tokens = self.highlights.tokens(span, line).unwrap_or_default();
                    (0..text.chars().count())
                        .map(|i| tokens.get(i).map_or(theme::CODE, |&t| theme::token(t)))
                        .collect()
                }
                None => line_styles(&text),
            };
            paint_text(
                frame,
                gutter,
                y,
                area.width,
                text.chars().zip(styles),
                view.offset_col(),
                view.tab_width(),
            );
        }
    }

    fn paint_preview(&mut self, session: &mut Session, frame: &mut Frame) {
        let height = usize::from(frame.height().saturating_sub(CHROME_ROWS));
        let wrap = usize::from(session.config().word_wrap)
            .min(usize::from(frame.width().saturating_sub(2)));
        let lines = self.preview.lines(session.buffer(), wrap);
        session.clamp_preview(lines.len(), height);

        let offset = session.preview_offset();
        for row in 0..frame.height().saturating_sub(CHROME_ROWS) {
            let y = 1 + row;
            frame.fill_row(y, theme::TEXT_AREA);
            let Some(line) = lines.get(offset + usize::from(row)) else {
                continue;
            };
            let mut x = 1;
            for run in &line.runs {
                x += frame.put_str(x, y, &run.text, run.style);
            }
        }
    }
}

/// Where the terminal cursor goes, if it is shown at all.
#[must_use]
pub fn cursor(session: &Session) -> Option<(u16, u16, CursorShape)> {
    if session.tab() != Tab::Editor || !session.cursor_visible() {
        return None;
    }
    let (x, y) = session
        .viewport()
        .cursor_cell(session.cursor(), session.buffer(), session.text_area())?;
    let shape = match session.mode().cursor_shape() {
        mode::CursorShape::Block => CursorShape::SteadyBlock,
        mode::CursorShape::Bar => CursorShape::SteadyBar,
    };
    Some((session.gutter_width() + x, 1 + y, shape))
}

// ─── Preview cache ──────────────────────────────────────────────────────────

/// Rendered preview lines, kept until the buffer or wrap width changes.
#[derive(Default)]
struct PreviewCache {
    key: Option<(u64, usize)>,
    lines: Vec<PreviewLine>,
}

impl PreviewCache {
    fn lines(&mut self, buf: &Buffer, wrap: usize) -> &[PreviewLine] {
        let key = (buf.revision(), wrap);
        if self.key != Some(key) {
            self.lines = preview::render(&buf.contents(), wrap);
            self.key = Some(key);
        }
        &self.lines
    }
}

// ─── Editor text ────────────────────────────────────────────────────────────

/// Per-char styles of a line outside code blocks.
fn line_styles(text: &str) -> Vec<Style> {
    let mut styles = vec![theme::TEXT_AREA; text.chars().count()];
    for seg in markdown::segments(text) {
        let style = theme::role(seg.role);
        for slot in styles.iter_mut().take(seg.end).skip(seg.start) {
            *slot = style;
        }
    }
    styles
}

/// Paint styled chars into `width` columns at `(x, y)`, skipping the first
/// `left` display columns. Tabs expand to the next stop.
fn paint_text(
    frame: &mut Frame,
    x: u16,
    y: u16,
    width: u16,
    chars: impl Iterator<Item = (char, Style)>,
    left: usize,
    tab_width: u8,
) {
    let mut display_col = 0;
    let mut screen_col: u16 = 0;

    for (ch, style) in chars {
        let char_w = char_display_width(ch, display_col, tab_width);
        if char_w == 0 {
            continue;
        }
        let start = display_col;
        display_col += char_w;

        if display_col <= left {
            continue;
        }
        if start < left {
            // Straddles the left edge: show the visible part as blanks.
            for _ in left..display_col {
                if screen_col >= width {
                    return;
                }
                frame.set(x + screen_col, y, Cell::new(' ', style));
                screen_col += 1;
            }
            continue;
        }
        if screen_col >= width {
            return;
        }

        if ch == '\t' {
            for _ in 0..char_w {
                if screen_col >= width {
                    return;
                }
                frame.set(x + screen_col, y, Cell::new(' ', style));
                screen_col += 1;
            }
        } else if char_w == 2 && screen_col + 1 >= width {
            // Wide char cut by the right edge.
            frame.set(x + screen_col, y, Cell::new(' ', style));
            return;
        } else {
            screen_col += frame.put_char(x + screen_col, y, ch, style);
        }
    }
}

// ─── Bars ───────────────────────────────────────────────────────────────────

fn paint_tabs(frame: &mut Frame, active: Tab) {
    frame.fill_row(0, theme::TAB_BAR);
    let mut x = 1;
    for tab in [Tab::Editor, Tab::Preview] {
        let style = if tab == active {
            theme::TAB_ACTIVE
        } else {
            theme::TAB_INACTIVE
        };
        x += frame.put_str(x, 0, &format!(" {} ", tab.title()), style);
        x += 1;
    }
}

fn paint_status(frame: &mut Frame, session: &Session, y: u16) {
    frame.fill_row(y, theme::STATUS);

    if let Some(status) = session.status() {
        let style = match status.kind {
            StatusKind::Info => theme::STATUS,
            StatusKind::Error => theme::STATUS_ERROR,
        };
        frame.put_str(0, y, &format!(" {}", status.text), style);
    } else {
        let mode = session.mode();
        let mode_style = match mode {
            Mode::Normal => theme::STATUS_NORMAL,
            Mode::Insert => theme::STATUS_INSERT,
        };
        let mut x = frame.put_str(0, y, &format!(" {} ", mode.display_name()), mode_style);
        x += frame.put_str(x, y, "| ", theme::STATUS);
        x += match file_name(session.buffer()) {
            Some(name) => frame.put_str(x, y, &name, theme::STATUS_FILE),
            None => frame.put_str(x, y, NEW_FILE, theme::STATUS_NEW_FILE),
        };
        if !session.is_saved() {
            frame.put_str(x, y, " [modified]", theme::STATUS_MODIFIED);
        }
    }

    let pos = session.cursor();
    let right = format!("({},{}) ", pos.line + 1, pos.col + 1);
    let right_w = u16::try_from(right.width()).unwrap_or(u16::MAX);
    let x = frame.width().saturating_sub(right_w);
    frame.fill(x, y, right_w, theme::STATUS);
    frame.put_str(x, y, &right, theme::STATUS_POSITION);
}

fn file_name(buf: &Buffer) -> Option<String> {
    let name = buf.path()?.file_name()?;
    Some(name.to_string_lossy().into_owned())
}

/// The key hints for what the user is looking at.
#[must_use]
pub const fn help_text(tab: Tab, mode: Mode) -> &'static str {
    match (tab, mode) {
        (Tab::Preview, _) => "J/K: Scroll | TAB: Editor | CTRL+S: Save | CTRL+Q: Quit",
        (Tab::Editor, Mode::Insert) => {
            "ESC: Normal | TAB: Preview | CTRL+V: Paste | CTRL+S: Save | CTRL+Q: Quit"
        }
        (Tab::Editor, Mode::Normal) => {
            "I: Insert | X: Delete | TAB: Preview | CTRL+S: Save | CTRL+Q: Quit"
        }
    }
}

fn paint_help(frame: &mut Frame, session: &Session, y: u16) {
    frame.fill_row(y, theme::HELP);
    let text = help_text(session.tab(), session.mode());
    let text_w = u16::try_from(text.width()).unwrap_or(u16::MAX);
    let x = frame.width().saturating_sub(text_w) / 2;
    frame.put_str(x, y, text, theme::HELP);
}

// ─── Tests ──────────────────────────────────────────────────────────────────
