//! Markdown driver.
//!
//! Parses with `pulldown-cmark`, folds the event stream into a small tree and
//! walks it, calling the renderer's handlers in document order. Inline
//! content that a handler needs as a string is rendered into a scratch
//! buffer first and handed over pre-styled.

use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag};

use crate::block::ListKind;
use crate::config::RenderOptions;
use crate::inline::AutoLinkKind;
use crate::output::OutputBuffer;
use crate::renderer::TerminalRenderer;
use crate::table::{ColumnAlignment, TableData};
use crate::wrap::HARD_BREAK;

#[derive(Debug)]
enum Node<'a> {
    Element(Tag<'a>, Vec<Node<'a>>),
    Leaf(Event<'a>),
}

pub fn parser_options() -> Options {
    Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TABLES
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

pub fn render_markdown(markdown: &str) -> String {
    render_markdown_with_options(markdown, RenderOptions::default())
}

pub fn render_markdown_with_options(markdown: &str, options: RenderOptions) -> String {
    let mut renderer = TerminalRenderer::new(options);
    render_with(&mut renderer, markdown)
}

/// Renders a whole document with an already configured renderer.
pub fn render_with(renderer: &mut TerminalRenderer, markdown: &str) -> String {
    let tree = build_tree(Parser::new_ext(markdown, parser_options()));
    let mut out = OutputBuffer::live();
    renderer.document_start(&mut out);
    render_blocks(renderer, &mut out, &tree);
    renderer.document_end(&mut out);
    out.into_string()
}

fn build_tree<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Node<'a>> {
    let mut root = Vec::new();
    let mut open: Vec<(Tag<'a>, Vec<Node<'a>>)> = Vec::new();

    fn attach<'a>(root: &mut Vec<Node<'a>>, open: &mut [(Tag<'a>, Vec<Node<'a>>)], node: Node<'a>) {
        match open.last_mut() {
            Some((_, children)) => children.push(node),
            None => root.push(node),
        }
    }

    for event in events {
        match event {
            Event::Start(tag) => open.push((tag, Vec::new())),
            Event::End(_) => {
                if let Some((tag, children)) = open.pop() {
                    attach(&mut root, &mut open, Node::Element(tag, children));
                }
            }
            leaf => attach(&mut root, &mut open, Node::Leaf(leaf)),
        }
    }
    while let Some((tag, children)) = open.pop() {
        attach(&mut root, &mut open, Node::Element(tag, children));
    }
    root
}

fn is_block(node: &Node<'_>) -> bool {
    match node {
        Node::Element(tag, _) => matches!(
            tag,
            Tag::Paragraph
                | Tag::Heading(..)
                | Tag::BlockQuote
                | Tag::CodeBlock(_)
                | Tag::List(_)
                | Tag::Item
                | Tag::FootnoteDefinition(_)
                | Tag::Table(_)
                | Tag::TableHead
                | Tag::TableRow
                | Tag::TableCell
        ),
        Node::Leaf(event) => matches!(event, Event::Rule),
    }
}

fn heading_level(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Returns true when the nodes produced any output.
fn render_blocks(r: &mut TerminalRenderer, out: &mut OutputBuffer, nodes: &[Node<'_>]) -> bool {
    let start = out.len();
    for node in nodes {
        render_block(r, out, node);
    }
    out.len() > start
}

fn render_block(r: &mut TerminalRenderer, out: &mut OutputBuffer, node: &Node<'_>) {
    let (tag, children) = match node {
        Node::Element(tag, children) => (tag, children),
        Node::Leaf(Event::Rule) => return r.horizontal_rule(out),
        Node::Leaf(Event::Html(html)) => return r.block_html(out, html),
        Node::Leaf(_) => return render_inline(r, out, node),
    };

    match tag {
        Tag::Paragraph => r.paragraph(out, &mut |r: &mut TerminalRenderer, out: &mut OutputBuffer| {
            render_inlines(r, out, children)
        }),
        Tag::Heading(level, _, _) => r.heading(
            out,
            heading_level(*level),
            &mut |r: &mut TerminalRenderer, out: &mut OutputBuffer| render_inlines(r, out, children),
        ),
        Tag::BlockQuote => r.block_quote(out, &mut |r: &mut TerminalRenderer, out: &mut OutputBuffer| {
            render_blocks(r, out, children);
            true
        }),
        Tag::CodeBlock(kind) => {
            let language = match kind {
                CodeBlockKind::Fenced(info) => info.split_whitespace().next(),
                CodeBlockKind::Indented => None,
            };
            r.code_block(out, &plain_text(children), language);
        }
        Tag::List(start) => {
            let kind = match start {
                Some(start) => ListKind::Ordered {
                    start: usize::try_from(*start).unwrap_or(usize::MAX),
                },
                None => ListKind::Unordered,
            };
            r.list(out, kind, &mut |r: &mut TerminalRenderer, out: &mut OutputBuffer| {
                for item in children {
                    render_item(r, out, item, kind);
                }
                true
            });
        }
        Tag::Item => render_item(r, out, node, ListKind::Unordered),
        Tag::Table(alignments) => {
            let table = collect_table(r, alignments, children);
            r.table(out, &table);
        }
        Tag::FootnoteDefinition(name) => {
            r.footnotes(out, &mut |r: &mut TerminalRenderer, out: &mut OutputBuffer| {
                r.footnote_item(out, name, &plain_text(children));
                true
            });
        }
        Tag::TableHead | Tag::TableRow | Tag::TableCell => {
            render_blocks(r, out, children);
        }
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link(..) | Tag::Image(..) => {
            render_inline(r, out, node)
        }
    }
}

/// Splits an item into the text that follows its marker and the blocks
/// nested under it. Tight items carry inline nodes directly; loose items
/// open with a paragraph.
fn render_item(r: &mut TerminalRenderer, out: &mut OutputBuffer, node: &Node<'_>, kind: ListKind) {
    let Node::Element(Tag::Item, children) = node else {
        return render_block(r, out, node);
    };
    let leading = children.iter().take_while(|child| !is_block(child)).count();
    let (text, rest) = if leading > 0 {
        (render_to_scratch(r, &children[..leading]), &children[leading..])
    } else {
        match children.split_first() {
            Some((Node::Element(Tag::Paragraph, inlines), rest)) => (render_to_scratch(r, inlines), rest),
            _ => (String::new(), &children[..]),
        }
    };
    r.list_item(out, &text, kind);
    render_blocks(r, out, rest);
}

/// Returns true when the nodes produced any output.
fn render_inlines(r: &mut TerminalRenderer, out: &mut OutputBuffer, nodes: &[Node<'_>]) -> bool {
    let start = out.len();
    for node in nodes {
        render_inline(r, out, node);
    }
    out.len() > start
}

fn render_to_scratch(r: &mut TerminalRenderer, nodes: &[Node<'_>]) -> String {
    let mut scratch = OutputBuffer::scratch();
    render_inlines(r, &mut scratch, nodes);
    scratch.into_string()
}

fn render_inline(r: &mut TerminalRenderer, out: &mut OutputBuffer, node: &Node<'_>) {
    let (tag, children) = match node {
        Node::Element(tag, children) => (tag, children),
        Node::Leaf(event) => return render_leaf(r, out, event),
    };

    match tag {
        Tag::Emphasis | Tag::Strong => match triple_emphasis_content(tag, children) {
            Some(inner) => {
                let text = render_to_scratch(r, inner);
                r.triple_emphasis(out, &text);
            }
            None => {
                let text = render_to_scratch(r, children);
                if matches!(tag, Tag::Emphasis) {
                    r.emphasis(out, &text);
                } else {
                    r.double_emphasis(out, &text);
                }
            }
        },
        Tag::Strikethrough => {
            let text = render_to_scratch(r, children);
            r.strikethrough(out, &text);
        }
        Tag::Link(link_type, url, title) => match link_type {
            LinkType::Autolink => r.auto_link(out, url, AutoLinkKind::Normal),
            LinkType::Email => r.auto_link(out, url, AutoLinkKind::Email),
            _ => {
                let content = render_to_scratch(r, children);
                r.link(out, url, title, &content);
            }
        },
        Tag::Image(_, url, title) => r.image(out, url, title, &plain_text(children)),
        _ => render_block(r, out, node),
    }
}

/// `***text***` parses as emphasis wrapping strong (or the reverse) with
/// nothing else inside.
fn triple_emphasis_content<'n, 'a>(tag: &Tag<'a>, children: &'n [Node<'a>]) -> Option<&'n [Node<'a>]> {
    let [Node::Element(inner_tag, inner)] = children else {
        return None;
    };
    match (tag, inner_tag) {
        (Tag::Emphasis, Tag::Strong) | (Tag::Strong, Tag::Emphasis) => Some(inner.as_slice()),
        _ => None,
    }
}

fn render_leaf(r: &mut TerminalRenderer, out: &mut OutputBuffer, event: &Event<'_>) {
    match event {
        Event::Text(text) => r.normal_text(out, text),
        Event::Code(code) => r.code_span(out, code),
        Event::Html(html) => r.raw_html_tag(out, html),
        Event::FootnoteReference(name) => r.footnote_ref(out, name),
        Event::SoftBreak => r.normal_text(out, "\n"),
        Event::HardBreak => r.line_break(out),
        Event::Rule => r.horizontal_rule(out),
        Event::TaskListMarker(done) => r.normal_text(out, if *done { "[x] " } else { "[ ] " }),
        Event::Start(_) | Event::End(_) => {}
    }
}

fn plain_text(nodes: &[Node<'_>]) -> String {
    let mut text = String::new();
    for node in nodes {
        match node {
            Node::Element(_, children) => text.push_str(&plain_text(children)),
            Node::Leaf(Event::Text(value) | Event::Code(value)) => text.push_str(value),
            Node::Leaf(Event::SoftBreak | Event::HardBreak) => text.push(' '),
            Node::Leaf(_) => {}
        }
    }
    text
}

fn column_alignment(alignment: &Alignment) -> ColumnAlignment {
    match alignment {
        Alignment::None | Alignment::Left => ColumnAlignment::Left,
        Alignment::Center => ColumnAlignment::Center,
        Alignment::Right => ColumnAlignment::Right,
    }
}

fn collect_table(r: &mut TerminalRenderer, alignments: &[Alignment], children: &[Node<'_>]) -> TableData {
    let mut table = TableData {
        alignments: alignments.iter().map(column_alignment).collect(),
        ..TableData::default()
    };
    for child in children {
        match child {
            Node::Element(Tag::TableHead, head) => {
                // Header cells arrive either directly under the head or
                // wrapped in a single row.
                let row = match head.first() {
                    Some(Node::Element(Tag::TableRow, cells)) => cells.as_slice(),
                    _ => head.as_slice(),
                };
                table.header = collect_cells(r, row);
            }
            Node::Element(Tag::TableRow, cells) => table.rows.push(collect_cells(r, cells)),
            _ => {}
        }
    }
    table
}

fn collect_cells(r: &mut TerminalRenderer, cells: &[Node<'_>]) -> Vec<String> {
    cells
        .iter()
        .filter_map(|cell| match cell {
            Node::Element(Tag::TableCell, content) => Some(render_cell(r, content)),
            _ => None,
        })
        .collect()
}

/// Cell text with hard breaks and `<br>` tags turned into newlines for the
/// table layout.
fn render_cell(r: &mut TerminalRenderer, content: &[Node<'_>]) -> String {
    let mut scratch = OutputBuffer::scratch();
    for node in content {
        match node {
            Node::Leaf(Event::Html(html)) if is_line_break_tag(html) => scratch.push('\n'),
            _ => render_inline(r, &mut scratch, node),
        }
    }
    scratch.as_str().replace(HARD_BREAK, "\n")
}

fn is_line_break_tag(html: &CowStr<'_>) -> bool {
    let tag = html.trim().to_ascii_lowercase();
    matches!(tag.as_str(), "<br>" | "<br/>" | "<br />")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str, width: i64) -> String {
        render_markdown_with_options(markdown, RenderOptions::with_width(width).suppress_trailer(true))
    }

    #[test]
    fn tree_nests_events_under_their_tags() {
        let tree = build_tree(Parser::new_ext("a *b*", parser_options()));
        let [Node::Element(Tag::Paragraph, children)] = tree.as_slice() else {
            panic!("expected a single paragraph: {tree:?}");
        };
        assert!(matches!(children[0], Node::Leaf(Event::Text(_))));
        assert!(matches!(children[1], Node::Element(Tag::Emphasis, _)));
    }

    #[test]
    fn paragraphs_wrap_at_the_terminal_width() {
        assert_eq!(render("This is a wrap test. Wrap on.\n", 20), "\nThis is a wrap test.\nWrap on.\n");
    }

    #[test]
    fn soft_breaks_join_lines() {
        assert_eq!(render("one\ntwo\n", 20), "\none two\n");
    }

    #[test]
    fn heading_with_emphasis_restores_heading_style() {
        assert_eq!(
            render("# Header with *inline*\n", 40),
            "\n\x1b[31m\x1b[1mHeader with \x1b[4minline\x1b[0m\x1b[31m\x1b[1m\x1b[0m\n"
        );
    }

    #[test]
    fn triple_emphasis_is_inverse() {
        assert_eq!(render("***loud***\n", 20), "\n\x1b[7mloud\x1b[0m\n");
    }

    #[test]
    fn strong_around_emphasis_keeps_bold_after_the_inner_reset() {
        assert_eq!(
            render("**a *b* c**\n", 20),
            "\n\x1b[1ma \x1b[4mb\x1b[0m\x1b[1m c\x1b[0m\n"
        );
    }

    #[test]
    fn autolinks_and_email_links() {
        assert_eq!(render("<https://x.io>\n", 60), "\nhref[https://x.io][https://x.io]\n");
        assert_eq!(render("<me@x.io>\n", 60), "\nhref[mailto:me@x.io][me@x.io]\n");
    }

    #[test]
    fn inline_links_underline_the_target() {
        assert_eq!(
            render("[site](https://x.io)\n", 60),
            "\n\x1b[4mhttps://x.io\x1b[0m[site]\n"
        );
    }

    #[test]
    fn images_use_their_alt_text() {
        assert_eq!(
            render("![the *logo*](https://x.io/a.png)\n", 60),
            "\n\x1b[4mhttps://x.io/a.png\x1b[0m[the logo]\n"
        );
        assert_eq!(render("![logo](a.png)\n", 60), "\n[a.png]\n");
    }

    #[test]
    fn task_markers_lead_the_item_text() {
        assert_eq!(render("- [x] done\n- [ ] todo\n", 30), "\n\u{2022} [x] done\n\u{2022} [ ] todo\n");
    }

    #[test]
    fn loose_items_take_text_from_their_first_paragraph() {
        assert_eq!(render("1. one\n\n2. two\n", 20), "\n1. one\n2. two\n");
    }

    #[test]
    fn ordered_lists_keep_their_start_number() {
        assert_eq!(render("7. seven\n8. eight\n", 20), "\n7. seven\n8. eight\n");
    }

    #[test]
    fn ordered_lists_can_start_at_zero() {
        assert_eq!(render("0. zero\n1. one\n", 40), "\n0. zero\n1. one\n");
    }

    #[test]
    fn hard_breaks_in_items_hang_under_the_text() {
        assert_eq!(
            render("- line one  \n  line two\n", 40),
            "\n\u{2022} line one\n  line two\n"
        );
    }

    #[test]
    fn hard_breaks_inside_strong_text() {
        assert_eq!(
            render("**bold one  \nbold two**\n", 40),
            "\n\x1b[1mbold one\nbold two\x1b[0m\n"
        );
    }

    #[test]
    fn hard_breaks_in_paragraphs_keep_the_quote_indent() {
        assert_eq!(render("> one  \n> two\n", 40), "\n    one\n    two\n\n");
    }

    #[test]
    fn styled_table_cells_split_on_br() {
        let rendered = render("| A |\n| --- |\n| **x**<br>y |\n", 40);
        assert!(rendered.contains("│ \x1b[1mx\x1b[0m   │"));
        assert!(rendered.contains("│ y   │"));
    }

    #[test]
    fn wrapped_emphasis_in_a_quote_leaves_the_margin_unstyled() {
        assert_eq!(
            render("> *alpha beta*\n", 13),
            "\n\x1b[4m\x1b[0m    \x1b[4malpha\n\x1b[0m    \x1b[4mbeta\x1b[0m\n\n"
        );
    }

    #[test]
    fn nested_lists_indent_by_four() {
        assert_eq!(
            render("- outer\n    - inner\n- next\n", 30),
            "\n\u{2022} outer\n    \u{2022} inner\n\u{2022} next\n"
        );
    }

    #[test]
    fn code_blocks_are_not_reflowed() {
        assert_eq!(
            render("```rust\nlet value = 1; // a long comment\n```\n", 10),
            "\nlet value = 1; // a long comment\n"
        );
    }

    #[test]
    fn strikethrough_and_code_spans() {
        assert_eq!(render("~~old~~ `new`\n", 20), "\n~~old~~ new\n");
    }

    #[test]
    fn footnotes_render_the_reference_only() {
        assert_eq!(render("text[^1]\n\n[^1]: the note\n", 30), "\ntext[^1]\n");
    }

    #[test]
    fn html_blocks_are_dropped() {
        assert_eq!(render("<div>\nraw\n</div>\n", 30), "");
    }

    #[test]
    fn tables_render_box_drawn() {
        let rendered = render("| Name | Age |\n| --- | ---: |\n| Bob | 3 |\n", 40);
        assert!(rendered.contains("┌──────┬─────┐"));
        assert!(rendered.contains("│ Name │ Age │"));
        assert!(rendered.contains("│ Bob  │   3 │"));
    }

    #[test]
    fn table_cells_split_on_br() {
        let rendered = render("| A |\n| --- |\n| line1<br>line2 |\n", 40);
        let lines: Vec<&str> = rendered.lines().collect();
        let first = lines.iter().position(|line| line.contains("line1"));
        let second = lines.iter().position(|line| line.contains("line2"));
        assert!(first.is_some() && second.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn empty_document_only_carries_the_trailer() {
        assert_eq!(render("", 20), "");
        assert_eq!(
            render_markdown_with_options("", RenderOptions::with_width(20)),
            format!("\nMDTERM(1) Version {}\n", env!("CARGO_PKG_VERSION"))
        );
    }
}
