//! Block-level handlers.
//!
//! Handlers that take a children callback are transactional: they record a
//! checkpoint first and, if the callback reports failure, roll the output and
//! render state back so the block leaves no trace.

use crate::output::OutputBuffer;
use crate::renderer::{Children, ItemIndent, TerminalRenderer, INDENT_WIDTH};
use crate::style::{AnsiColor, Attribute};
use crate::table::{layout_table, TableData};
use crate::width::cell_width;

pub const BULLET: char = '\u{2022}';
pub const RULE: char = '─';

const HEADING_PALETTE: [AnsiColor; 6] = [
    AnsiColor::Red,
    AnsiColor::Yellow,
    AnsiColor::Green,
    AnsiColor::Blue,
    AnsiColor::Magenta,
    AnsiColor::Cyan,
];

/// Heading levels past the palette reuse its last color.
pub fn heading_color(level: usize) -> AnsiColor {
    HEADING_PALETTE[level.clamp(1, HEADING_PALETTE.len()) - 1]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    /// Numbered list whose first item carries `start`.
    Ordered { start: usize },
}

impl ListKind {
    pub fn ordered() -> Self {
        ListKind::Ordered { start: 1 }
    }
}

impl TerminalRenderer {
    pub fn heading(&mut self, out: &mut OutputBuffer, level: usize, children: &mut Children<'_>) {
        let checkpoint = self.checkpoint(out);
        self.newline(out);
        self.state.styles.push();
        self.state.styles.set_foreground(out, heading_color(level));
        self.state.styles.enable(out, Attribute::Bold);
        if !children(self, out) {
            self.rollback(out, checkpoint);
            return;
        }
        self.state.styles.pop(out);
        self.newline(out);
    }

    pub fn horizontal_rule(&mut self, out: &mut OutputBuffer) {
        self.ensure_line_start(out);
        out.push_str(&String::from(RULE).repeat(self.state.width));
        self.newline(out);
    }

    /// Renders a list's items one level deeper. Only the outermost list
    /// closes its line on success: a nested list ends inside its parent
    /// item, so the next sibling item follows without a blank line.
    pub fn list(&mut self, out: &mut OutputBuffer, kind: ListKind, children: &mut Children<'_>) {
        let checkpoint = self.checkpoint(out);
        let enclosing_counter = self.state.ordered_counter;
        if let ListKind::Ordered { start } = kind {
            self.state.ordered_counter = start;
        }
        self.state.indent_level += 1;
        let completed = children(self, out);
        self.state.indent_level -= 1;
        self.state.ordered_counter = enclosing_counter;
        if !completed {
            self.rollback(out, checkpoint);
            return;
        }
        if self.state.indent_level == 0 {
            self.newline(out);
        }
    }

    /// Renders one item's own text: the marker at the enclosing list's
    /// margin, with wrapped lines aligned under the first character after it.
    pub fn list_item(&mut self, out: &mut OutputBuffer, text: &str, kind: ListKind) {
        self.newline(out);
        let marker = match kind {
            ListKind::Ordered { .. } => {
                let number = self.state.ordered_counter;
                self.state.ordered_counter += 1;
                format!("{number}. ")
            }
            ListKind::Unordered => format!("{BULLET} "),
        };
        let margin = self.state.indent_level.saturating_sub(1) * INDENT_WIDTH;
        self.state.item_indent = Some(ItemIndent {
            first: margin,
            hanging: margin + cell_width(&marker),
        });
        self.write_text(out, &format!("{marker}{}", text.trim()));
        self.state.item_indent = None;
    }

    pub fn paragraph(&mut self, out: &mut OutputBuffer, children: &mut Children<'_>) {
        let checkpoint = self.checkpoint(out);
        self.newline(out);
        if !children(self, out) {
            self.rollback(out, checkpoint);
            return;
        }
        self.newline(out);
    }

    pub fn block_quote(&mut self, out: &mut OutputBuffer, children: &mut Children<'_>) {
        let checkpoint = self.checkpoint(out);
        self.state.indent_level += 1;
        let completed = children(self, out);
        self.state.indent_level -= 1;
        if !completed {
            self.rollback(out, checkpoint);
            return;
        }
        self.newline(out);
    }

    /// Writes code line by line at the current block indent. Code is never
    /// reflowed, so long lines may run past the terminal width.
    pub fn code_block(&mut self, out: &mut OutputBuffer, text: &str, language: Option<&str>) {
        if let Some(language) = language {
            self.diagnostic("code_block", language);
        }
        self.newline(out);
        let indent = self.block_indent();
        for line in text.lines() {
            out.push_spaces(indent);
            out.push_str(line);
            self.newline(out);
        }
    }

    /// Draws a table as box-drawn text sized to the space left after the
    /// block indent.
    pub fn table(&mut self, out: &mut OutputBuffer, table: &TableData) {
        if table.column_count() == 0 {
            self.diagnostic("table", "empty table dropped");
            return;
        }
        self.diagnostic("table", "flattened to box-drawn text");
        self.newline(out);
        let indent = self.block_indent();
        let available = self.state.width.saturating_sub(indent).max(1);
        for line in layout_table(table, available) {
            out.push_spaces(indent);
            out.push_str(&line);
            self.newline(out);
        }
    }

    /// Footnote definitions are not rendered; the children callback is
    /// never invoked.
    pub fn footnotes(&mut self, _out: &mut OutputBuffer, _children: &mut Children<'_>) {
        self.diagnostic("footnotes", "footnote definitions are not rendered");
    }

    pub fn footnote_item(&mut self, _out: &mut OutputBuffer, name: &str, _text: &str) {
        self.diagnostic("footnote_item", name);
    }

    pub fn block_html(&mut self, _out: &mut OutputBuffer, html: &str) {
        self.diagnostic("block_html", html.trim());
    }
}
