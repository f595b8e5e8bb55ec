use std::borrow::Cow;

use crate::output::OutputBuffer;
use crate::renderer::TerminalRenderer;
use crate::style::{Attribute, RESET};
use crate::wrap::HARD_BREAK;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoLinkKind {
    Normal,
    Email,
}

fn is_remote_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Re-applies `style` after every reset already embedded in `text`, so a
/// span pre-rendered with its own nested spans keeps the outer style.
fn rearm_after_resets<'a>(text: &'a str, style: &str) -> Cow<'a, str> {
    if style.is_empty() || !text.contains(RESET) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace(RESET, &format!("{RESET}{style}")))
}

impl TerminalRenderer {
    pub fn normal_text(&mut self, out: &mut OutputBuffer, text: &str) {
        self.write_text(out, text);
    }

    /// Italic has no reliable terminal rendering; emphasis is underlined.
    pub fn emphasis(&mut self, out: &mut OutputBuffer, text: &str) {
        self.styled_span(out, Attribute::Underline, text);
    }

    pub fn double_emphasis(&mut self, out: &mut OutputBuffer, text: &str) {
        self.styled_span(out, Attribute::Bold, text);
    }

    pub fn triple_emphasis(&mut self, out: &mut OutputBuffer, text: &str) {
        self.styled_span(out, Attribute::Inverse, text);
    }

    pub fn strikethrough(&mut self, out: &mut OutputBuffer, text: &str) {
        if text.is_empty() {
            return;
        }
        self.write_text(out, &format!("~~{text}~~"));
    }

    /// Underlined URL followed by the link text in brackets.
    pub fn link(&mut self, out: &mut OutputBuffer, url: &str, _title: &str, content: &str) {
        self.emphasis(out, url);
        self.write_text(out, &format!("[{content}]"));
    }

    pub fn auto_link(&mut self, out: &mut OutputBuffer, url: &str, kind: AutoLinkKind) {
        let address = url.strip_prefix("mailto:").unwrap_or(url);
        let scheme = match kind {
            AutoLinkKind::Email => "mailto:",
            AutoLinkKind::Normal => "",
        };
        self.write_text(out, &format!("href[{scheme}{address}][{address}]"));
    }

    pub fn image(&mut self, out: &mut OutputBuffer, url: &str, title: &str, alt: &str) {
        if is_remote_url(url) {
            self.link(out, url, title, alt);
        } else {
            self.write_text(out, &format!("[{url}]"));
        }
    }

    pub fn code_span(&mut self, out: &mut OutputBuffer, text: &str) {
        self.write_text(out, text);
    }

    pub fn entity(&mut self, out: &mut OutputBuffer, entity: &str) {
        let decoded = self.decode(entity);
        self.write_text(out, &decoded);
    }

    /// Ends the line outright. Pre-rendered text carries the break as
    /// [`HARD_BREAK`] until it is written out.
    pub fn line_break(&mut self, out: &mut OutputBuffer) {
        if out.is_live() {
            self.newline(out);
        } else {
            out.push(HARD_BREAK);
        }
    }

    pub fn raw_html_tag(&mut self, _out: &mut OutputBuffer, tag: &str) {
        self.diagnostic("raw_html", tag);
    }

    pub fn footnote_ref(&mut self, out: &mut OutputBuffer, reference: &str) {
        self.diagnostic("footnote_ref", reference);
        self.write_text(out, &format!("[^{reference}]"));
    }

    fn styled_span(&mut self, out: &mut OutputBuffer, attribute: Attribute, text: &str) {
        if text.is_empty() {
            return;
        }
        self.state.styles.push();
        self.state.styles.enable(out, attribute);
        let style = self.state.styles.active().escape_sequence();
        let text = rearm_after_resets(text, &style);
        self.write_text(out, &text);
        self.state.styles.pop(out);
    }
}
