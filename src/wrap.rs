//! Word wrapping against a fixed column budget.
//!
//! Text is normalized (every whitespace run becomes one space), cut into
//! glyphs, and emitted line by line. A line breaks at the last space that
//! fits, or at the space sitting exactly on the boundary; an unbreakable run
//! that starts a line is cut at the budget instead. Escape sequences embedded
//! in the text are zero-width and always travel with the glyph before them.
//! Margins are written unstyled, with the style in force re-applied after
//! them.

use crate::output::OutputBuffer;
use crate::style::RESET;
use crate::width::{escape_len, rune_width};

/// Hard line break inside pre-rendered text. Survives whitespace collapsing
/// and always ends the current line.
pub const HARD_BREAK: char = '\u{2028}';

/// Column geometry for one run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapLayout {
    pub width: usize,
    /// Indent placed when the run starts on an empty line.
    pub first_indent: usize,
    /// Indent placed on every continuation line.
    pub indent: usize,
}

impl WrapLayout {
    pub fn uniform(width: usize, indent: usize) -> Self {
        Self {
            width,
            first_indent: indent,
            indent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlyphKind {
    Visible,
    Space,
    Escape,
}

#[derive(Debug, Clone, Copy)]
struct Glyph<'a> {
    text: &'a str,
    width: usize,
    kind: GlyphKind,
}

impl Glyph<'_> {
    fn is_space(&self) -> bool {
        self.kind == GlyphKind::Space
    }
}

/// Collapses every maximal whitespace run to a single space. Non-breaking
/// spaces and [`HARD_BREAK`] are kept as they are.
pub fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() && ch != '\u{a0}' && ch != HARD_BREAK {
            if !in_space {
                collapsed.push(' ');
                in_space = true;
            }
        } else {
            collapsed.push(ch);
            in_space = false;
        }
    }
    collapsed
}

fn split_glyphs(text: &str) -> Vec<Glyph<'_>> {
    let mut glyphs = Vec::with_capacity(text.len());
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        let (len, width, kind) = match ch {
            '\x1b' => (escape_len(rest), 0, GlyphKind::Escape),
            ' ' => (1, 1, GlyphKind::Space),
            _ => (ch.len_utf8(), rune_width(ch), GlyphKind::Visible),
        };
        let (head, tail) = rest.split_at(len);
        glyphs.push(Glyph {
            text: head,
            width,
            kind,
        });
        rest = tail;
    }
    glyphs
}

fn span_width(glyphs: &[Glyph<'_>]) -> usize {
    glyphs.iter().map(|glyph| glyph.width).sum()
}

/// Number of leading glyphs whose cumulative width stays within `budget`.
fn fitting_prefix(glyphs: &[Glyph<'_>], budget: usize) -> usize {
    let mut used = 0;
    glyphs
        .iter()
        .take_while(|glyph| {
            used += glyph.width;
            used <= budget
        })
        .count()
}

fn skip_spaces(glyphs: &[Glyph<'_>], mut pos: usize) -> usize {
    while glyphs.get(pos).is_some_and(Glyph::is_space) {
        pos += 1;
    }
    pos
}

/// Records an SGR sequence in `pen`, the escapes needed to recreate the
/// style in force. A reset empties it.
fn track_style(pen: &mut String, escape: &str) {
    if !escape.starts_with("\x1b[") || !escape.ends_with('m') {
        return;
    }
    if escape == RESET || escape == "\x1b[m" {
        pen.clear();
    } else {
        pen.push_str(escape);
    }
}

fn emit(out: &mut OutputBuffer, glyphs: &[Glyph<'_>], pen: &mut String) {
    for glyph in glyphs {
        out.push_str(glyph.text);
        if glyph.kind == GlyphKind::Escape {
            track_style(pen, glyph.text);
        }
    }
}

/// Places the margin for a line about to start with `rest`. The indent is
/// clamped so the first visible glyph still fits on the line.
fn start_line(
    out: &mut OutputBuffer,
    column: &mut usize,
    rest: &[Glyph<'_>],
    indent: usize,
    width: usize,
    pen: &str,
) {
    let lead = rest
        .iter()
        .find(|glyph| glyph.kind != GlyphKind::Escape)
        .map_or(1, |glyph| glyph.width);
    let indent = indent.min(width.saturating_sub(lead));
    if indent > 0 {
        if pen.is_empty() {
            out.push_spaces(indent);
        } else {
            out.push_str(RESET);
            out.push_spaces(indent);
            out.push_str(pen);
        }
    }
    *column = indent;
}

/// Writes `text` to `out`, wrapping at `layout.width` and advancing
/// `column` to the cell position after the last glyph written.
///
/// A run that starts at column 0 is indented by `layout.first_indent`;
/// otherwise the caller has already placed whatever precedes it on the line.
pub fn wrap_text(out: &mut OutputBuffer, column: &mut usize, text: &str, layout: WrapLayout) {
    wrap_styled_text(out, column, text, layout, "");
}

/// [`wrap_text`] for text written while `style` is active on the terminal.
/// `style` holds the escapes that recreate it after a margin.
pub fn wrap_styled_text(
    out: &mut OutputBuffer,
    column: &mut usize,
    text: &str,
    layout: WrapLayout,
    style: &str,
) {
    let normalized = collapse_whitespace(text);
    let mut pen = String::from(style);
    let mut segments = normalized.split(HARD_BREAK).peekable();
    let mut start_indent = layout.first_indent;
    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();
        let segment = if last {
            segment
        } else {
            segment.trim_end_matches(' ')
        };
        wrap_segment(out, column, segment, layout, start_indent, &mut pen);
        if !last {
            out.push('\n');
            *column = 0;
            start_indent = layout.indent;
        }
    }
}

fn wrap_segment(
    out: &mut OutputBuffer,
    column: &mut usize,
    text: &str,
    layout: WrapLayout,
    start_indent: usize,
    pen: &mut String,
) {
    let glyphs = split_glyphs(text);
    let width = layout.width.max(1);

    let mut pos = 0;
    let mut fresh = *column == 0;
    if fresh {
        pos = skip_spaces(&glyphs, pos);
        if pos == glyphs.len() {
            return;
        }
        start_line(out, column, &glyphs[pos..], start_indent, width, pen);
    }

    let mut left = span_width(&glyphs[pos..]);
    loop {
        let remaining = &glyphs[pos..];
        let budget = width.saturating_sub(*column);
        if left <= budget {
            emit(out, remaining, pen);
            *column += left;
            return;
        }

        // Something does not fit, so `fit` indexes the first glyph past the
        // boundary. A space there still allows breaking on the boundary.
        let fit = fitting_prefix(remaining, budget);
        let split = (0..=fit).rev().find(|&idx| remaining[idx].is_space());
        let (end, resume) = match split {
            Some(idx) if idx > 0 || !fresh => (idx, idx + 1),
            _ if fresh => {
                let cut = fit.max(1);
                (cut, cut)
            }
            _ => (0, 0),
        };

        let line = &remaining[..end];
        emit(out, line, pen);
        *column += span_width(line);

        let next = skip_spaces(&glyphs, pos + resume);
        left -= span_width(&glyphs[pos..next]);
        pos = next;
        if pos >= glyphs.len() {
            return;
        }

        out.push('\n');
        start_line(out, column, &glyphs[pos..], layout.indent, width, pen);
        fresh = true;
    }
}
