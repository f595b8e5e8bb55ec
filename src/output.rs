/// Where an [`OutputBuffer`] sends its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The document's committed output; text is word-wrapped and the
    /// cursor column tracks it.
    Live,
    /// A pass-through buffer the driver uses to pre-render child content.
    /// Text is copied verbatim and never moves the cursor.
    Scratch,
}

/// Append-only text sink with truncation back to a recorded length.
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    buf: String,
    target: Target,
}

impl OutputBuffer {
    pub fn live() -> Self {
        Self::new(Target::Live)
    }

    pub fn scratch() -> Self {
        Self::new(Target::Scratch)
    }

    pub fn new(target: Target) -> Self {
        Self {
            buf: String::new(),
            target,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn is_live(&self) -> bool {
        self.target == Target::Live
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn push(&mut self, ch: char) {
        self.buf.push(ch);
    }

    pub fn push_str(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    pub fn push_spaces(&mut self, count: usize) {
        self.buf.extend(std::iter::repeat(' ').take(count));
    }

    /// Discards everything appended after `len`. Lengths recorded with
    /// [`OutputBuffer::len`] always fall on a character boundary.
    pub fn truncate(&mut self, len: usize) {
        if len < self.buf.len() {
            self.buf.truncate(len);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}
