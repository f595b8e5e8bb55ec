use unicode_width::UnicodeWidthChar;

const ESC: char = '\x1b';

/// Number of terminal cells `c` occupies: 2 for East Asian wide and
/// fullwidth characters, 1 for everything else.
///
/// Zero-width and combining characters are not special-cased; they count
/// as a single cell.
pub fn rune_width(c: char) -> usize {
    match c.width() {
        Some(2) => 2,
        _ => 1,
    }
}

pub fn cell_width(text: &str) -> usize {
    text.chars().map(rune_width).sum()
}

/// Cell width of `text` with ANSI escape sequences treated as zero-width.
pub fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        let len = if c == ESC {
            escape_len(rest)
        } else {
            width += rune_width(c);
            c.len_utf8()
        };
        rest = &rest[len..];
    }
    width
}

/// Byte length of the escape sequence at the start of `text`, which must
/// begin with ESC. A CSI sequence runs through its final byte; a lone ESC
/// is one byte; an unterminated CSI swallows the rest of the text.
pub(crate) fn escape_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    if bytes.get(1) != Some(&b'[') {
        return 1;
    }
    bytes
        .iter()
        .enumerate()
        .skip(2)
        .find(|(_, b)| (0x40..=0x7e).contains(*b))
        .map(|(idx, _)| idx + 1)
        .unwrap_or(text.len())
}
