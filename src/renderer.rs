use std::fmt;

use crate::config::RenderOptions;
use crate::output::OutputBuffer;
use crate::style::{StyleAttributes, StyleStack};
use crate::wrap::{wrap_styled_text, WrapLayout};

/// Columns of indent contributed by each nested list or blockquote.
pub const INDENT_WIDTH: usize = 4;

pub const TRAILER_NAME: &str = "MDTERM";

/// Callback that renders a block's children into the given output and
/// reports whether it completed. A `false` return rolls the block back.
pub type Children<'a> = dyn FnMut(&mut TerminalRenderer, &mut OutputBuffer) -> bool + 'a;

pub type EntityDecoder = Box<dyn Fn(&str) -> String>;

/// Indentation for the text of a single list item: the marker sits at
/// `first`, wrapped lines line up under the item text at `hanging`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemIndent {
    pub first: usize,
    pub hanging: usize,
}

/// Cursor, indentation and style bookkeeping for one document render.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub(crate) column: usize,
    pub(crate) width: usize,
    pub(crate) indent_level: usize,
    pub(crate) item_indent: Option<ItemIndent>,
    pub(crate) styles: StyleStack,
    pub(crate) ordered_counter: usize,
}

impl RenderState {
    fn new(width: usize) -> Self {
        Self {
            column: 0,
            width,
            indent_level: 0,
            item_indent: None,
            styles: StyleStack::new(),
            ordered_counter: 1,
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    pub fn active_style(&self) -> StyleAttributes {
        self.styles.active()
    }

    pub fn style_depth(&self) -> usize {
        self.styles.depth()
    }

    /// Number the next ordered list item will carry.
    pub fn ordered_counter(&self) -> usize {
        self.ordered_counter
    }
}

/// Everything a block needs to undo its partial output.
#[derive(Debug, Clone)]
pub(crate) struct Checkpoint {
    len: usize,
    column: usize,
    indent_level: usize,
    ordered_counter: usize,
    styles: StyleStack,
}

/// Stateful formatter turning document callbacks into ANSI-styled,
/// word-wrapped text.
///
/// Handlers are invoked by a driver in document order. Text written to a
/// live [`OutputBuffer`] is wrapped and tracked; text written to a scratch
/// buffer passes through untouched so the driver can hand it back to a
/// later handler.
pub struct TerminalRenderer {
    pub(crate) options: RenderOptions,
    pub(crate) state: RenderState,
    decode_entity: EntityDecoder,
}

impl fmt::Debug for TerminalRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalRenderer")
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl TerminalRenderer {
    pub fn new(options: RenderOptions) -> Self {
        let options = options.normalized();
        Self {
            options,
            state: RenderState::new(options.terminal_width),
            decode_entity: Box::new(decode_html_entity),
        }
    }

    pub fn with_entity_decoder(mut self, decoder: impl Fn(&str) -> String + 'static) -> Self {
        self.decode_entity = Box::new(decoder);
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn document_start(&mut self, out: &mut OutputBuffer) {
        self.state = RenderState::new(self.options.terminal_width);
        if !out.is_live() {
            tracing::warn!("document started on a scratch buffer; wrapping is disabled");
        }
        if self.options.debug_logging {
            tracing::debug!(width = self.state.width, "document render started");
        }
    }

    pub fn document_end(&mut self, out: &mut OutputBuffer) {
        if self.options.suppress_trailer {
            return;
        }
        self.newline(out);
        out.push_str(&format!(
            "{TRAILER_NAME}(1) Version {}",
            env!("CARGO_PKG_VERSION")
        ));
        self.newline(out);
    }

    pub(crate) fn decode(&self, entity: &str) -> String {
        (self.decode_entity)(entity)
    }

    /// Routes text through the wrapping engine on live output, or copies it
    /// verbatim into a scratch buffer.
    pub(crate) fn write_text(&mut self, out: &mut OutputBuffer, text: &str) {
        if text.is_empty() {
            return;
        }
        if out.is_live() {
            let layout = self.layout();
            let style = self.state.styles.active().escape_sequence();
            wrap_styled_text(out, &mut self.state.column, text, layout, &style);
        } else {
            out.push_str(text);
        }
    }

    pub(crate) fn newline(&mut self, out: &mut OutputBuffer) {
        out.push('\n');
        if out.is_live() {
            self.state.column = 0;
        }
    }

    /// Ends the current line unless nothing has been placed on it yet.
    pub(crate) fn ensure_line_start(&mut self, out: &mut OutputBuffer) {
        if out.is_live() && self.state.column > 0 {
            self.newline(out);
        }
    }

    pub(crate) fn block_indent(&self) -> usize {
        self.state.indent_level * INDENT_WIDTH
    }

    fn layout(&self) -> WrapLayout {
        match self.state.item_indent {
            Some(ItemIndent { first, hanging }) => WrapLayout {
                width: self.state.width,
                first_indent: first,
                indent: hanging,
            },
            None => WrapLayout::uniform(self.state.width, self.block_indent()),
        }
    }

    pub(crate) fn checkpoint(&self, out: &OutputBuffer) -> Checkpoint {
        Checkpoint {
            len: out.len(),
            column: self.state.column,
            indent_level: self.state.indent_level,
            ordered_counter: self.state.ordered_counter,
            styles: self.state.styles.clone(),
        }
    }

    pub(crate) fn rollback(&mut self, out: &mut OutputBuffer, checkpoint: Checkpoint) {
        out.truncate(checkpoint.len);
        self.state.column = checkpoint.column;
        self.state.indent_level = checkpoint.indent_level;
        self.state.ordered_counter = checkpoint.ordered_counter;
        self.state.styles = checkpoint.styles;
    }

    pub(crate) fn diagnostic(&self, construct: &'static str, detail: &str) {
        if self.options.debug_logging {
            tracing::debug!(construct, detail, "rendering degraded construct");
        }
    }
}

/// Decodes an HTML entity given either bare (`copy`) or in full (`&copy;`).
/// Unknown entities come back unchanged.
pub fn decode_html_entity(entity: &str) -> String {
    let name = entity.trim_start_matches('&').trim_end_matches(';');
    if name.is_empty() {
        return entity.to_string();
    }
    html_escape::decode_html_entities(&format!("&{name};")).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{AnsiColor, Attribute};

    fn renderer(width: i64) -> TerminalRenderer {
        TerminalRenderer::new(RenderOptions::with_width(width).suppress_trailer(true))
    }

    #[test]
    fn entities_decode_in_either_form() {
        assert_eq!(decode_html_entity("&copy;"), "©");
        assert_eq!(decode_html_entity("amp"), "&");
        assert_eq!(decode_html_entity("&#x41;"), "A");
        assert_eq!(decode_html_entity("&bogus;"), "&bogus;");
    }

    #[test]
    fn trailer_is_appended_unless_suppressed() {
        let mut out = OutputBuffer::live();
        let mut with_trailer = TerminalRenderer::new(RenderOptions::with_width(40));
        with_trailer.document_start(&mut out);
        with_trailer.document_end(&mut out);
        assert_eq!(
            out.as_str(),
            format!("\nMDTERM(1) Version {}\n", env!("CARGO_PKG_VERSION"))
        );

        let mut out = OutputBuffer::live();
        let mut quiet = renderer(40);
        quiet.document_start(&mut out);
        quiet.document_end(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn scratch_text_is_not_wrapped_or_tracked() {
        let mut r = renderer(5);
        let mut scratch = OutputBuffer::scratch();
        r.write_text(&mut scratch, "a  long\nline of text");
        assert_eq!(scratch.as_str(), "a  long\nline of text");
        assert_eq!(r.state().column(), 0);
    }

    #[test]
    fn rollback_restores_output_and_state() {
        let mut r = renderer(20);
        let mut out = OutputBuffer::live();
        r.write_text(&mut out, "kept");
        let checkpoint = r.checkpoint(&out);
        r.state.styles.push();
        r.state.styles.set_foreground(&mut out, AnsiColor::Blue);
        r.state.styles.enable(&mut out, Attribute::Bold);
        r.state.indent_level += 1;
        r.write_text(&mut out, " dropped");
        r.rollback(&mut out, checkpoint);
        assert_eq!(out.as_str(), "kept");
        assert_eq!(r.state().column(), 4);
        assert_eq!(r.state().indent_level(), 0);
        assert_eq!(r.state().style_depth(), 0);
        assert!(r.state().active_style().is_plain());
    }

    #[test]
    fn custom_decoder_is_used() {
        let r = renderer(20).with_entity_decoder(|name| format!("<{name}>"));
        assert_eq!(r.decode("&hellip;"), "<&hellip;>");
    }

    #[test]
    fn zero_width_options_are_clamped() {
        let r = TerminalRenderer::new(RenderOptions {
            terminal_width: 0,
            ..RenderOptions::default()
        });
        assert_eq!(r.state().width(), 1);
    }
}
