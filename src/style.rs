use crate::output::OutputBuffer;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const UNDERLINE: &str = "\x1b[4m";
pub const INVERSE: &str = "\x1b[7m";

/// The eight standard terminal foreground colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl AnsiColor {
    /// SGR parameter selecting this color as the foreground.
    pub fn sgr_code(self) -> u8 {
        match self {
            AnsiColor::Black => 30,
            AnsiColor::Red => 31,
            AnsiColor::Green => 32,
            AnsiColor::Yellow => 33,
            AnsiColor::Blue => 34,
            AnsiColor::Magenta => 35,
            AnsiColor::Cyan => 36,
            AnsiColor::White => 37,
        }
    }

    pub fn escape_sequence(self) -> String {
        format!("\x1b[{}m", self.sgr_code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Bold,
    Underline,
    Inverse,
}

impl Attribute {
    pub fn escape_sequence(self) -> &'static str {
        match self {
            Attribute::Bold => BOLD,
            Attribute::Underline => UNDERLINE,
            Attribute::Inverse => INVERSE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleAttributes {
    pub bold: bool,
    pub underline: bool,
    pub inverse: bool,
    pub foreground: Option<AnsiColor>,
}

impl StyleAttributes {
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    pub fn set(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::Bold => self.bold = true,
            Attribute::Underline => self.underline = true,
            Attribute::Inverse => self.inverse = true,
        }
    }

    /// Escapes that recreate this style on top of a reset terminal:
    /// foreground first, then bold, underline and inverse.
    pub fn escape_sequence(&self) -> String {
        let mut seq = String::new();
        if let Some(color) = self.foreground {
            seq.push_str(&color.escape_sequence());
        }
        if self.bold {
            seq.push_str(BOLD);
        }
        if self.underline {
            seq.push_str(UNDERLINE);
        }
        if self.inverse {
            seq.push_str(INVERSE);
        }
        seq
    }
}

/// The active style plus the styles saved by enclosing spans.
///
/// Terminals only offer a global reset, so leaving a span resets everything
/// and re-emits whatever the restored style still has switched on.
#[derive(Debug, Clone, Default)]
pub struct StyleStack {
    active: StyleAttributes,
    saved: Vec<StyleAttributes>,
}

impl StyleStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> StyleAttributes {
        self.active
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push(&mut self) {
        self.saved.push(self.active);
    }

    /// Restores the most recently saved style, or the default style when
    /// nothing is saved.
    pub fn pop(&mut self, out: &mut OutputBuffer) -> StyleAttributes {
        self.active = self.saved.pop().unwrap_or_default();
        out.push_str(RESET);
        out.push_str(&self.active.escape_sequence());
        self.active
    }

    pub fn set_foreground(&mut self, out: &mut OutputBuffer, color: AnsiColor) {
        self.active.foreground = Some(color);
        out.push_str(&color.escape_sequence());
    }

    pub fn enable(&mut self, out: &mut OutputBuffer, attribute: Attribute) {
        self.active.set(attribute);
        out.push_str(attribute.escape_sequence());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_codes_follow_sgr_order() {
        assert_eq!(AnsiColor::Black.escape_sequence(), "\x1b[30m");
        assert_eq!(AnsiColor::Red.escape_sequence(), "\x1b[31m");
        assert_eq!(AnsiColor::White.escape_sequence(), "\x1b[37m");
    }

    #[test]
    fn pop_reemits_the_outer_style() {
        let mut out = OutputBuffer::live();
        let mut styles = StyleStack::new();
        styles.push();
        styles.set_foreground(&mut out, AnsiColor::Red);
        styles.enable(&mut out, Attribute::Bold);
        styles.push();
        styles.enable(&mut out, Attribute::Underline);
        let restored = styles.pop(&mut out);
        assert_eq!(restored.foreground, Some(AnsiColor::Red));
        assert!(restored.bold);
        assert!(!restored.underline);
        assert_eq!(
            out.as_str(),
            "\x1b[31m\x1b[1m\x1b[4m\x1b[0m\x1b[31m\x1b[1m"
        );
    }

    #[test]
    fn pop_on_empty_stack_yields_default() {
        let mut out = OutputBuffer::live();
        let mut styles = StyleStack::new();
        styles.enable(&mut out, Attribute::Inverse);
        let restored = styles.pop(&mut out);
        assert!(restored.is_plain());
        assert_eq!(styles.depth(), 0);
        assert!(out.as_str().ends_with(RESET));
    }

    #[test]
    fn escape_sequence_orders_color_before_attributes() {
        let style = StyleAttributes {
            bold: true,
            underline: true,
            inverse: true,
            foreground: Some(AnsiColor::Cyan),
        };
        assert_eq!(
            style.escape_sequence(),
            "\x1b[36m\x1b[1m\x1b[4m\x1b[7m"
        );
        assert_eq!(StyleAttributes::default().escape_sequence(), "");
    }
}
