//! Markdown rendered as ANSI-styled, word-wrapped text for a fixed-width
//! terminal.
//!
//! [`render_markdown`] handles a whole document. The [`TerminalRenderer`]
//! handlers can also be driven directly by any parser that walks a document
//! in order.

pub mod block;
pub mod config;
pub mod error;
pub mod inline;
pub mod markdown;
pub mod output;
pub mod renderer;
pub mod style;
pub mod table;
pub mod width;
pub mod wrap;

pub use block::ListKind;
pub use config::{detect_terminal_width, normalize_width, RenderOptions};
pub use error::{Error, Result};
pub use inline::AutoLinkKind;
pub use markdown::{render_markdown, render_markdown_with_options, render_with};
pub use output::{OutputBuffer, Target};
pub use renderer::{Children, RenderState, TerminalRenderer};
pub use style::{AnsiColor, Attribute, StyleAttributes};
pub use table::{ColumnAlignment, TableData};
