pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Column budget for wrapped text. Never below 1.
    pub terminal_width: usize,
    /// Skip the version banner appended at document end.
    pub suppress_trailer: bool,
    /// Emit `tracing` diagnostics for degraded constructs.
    pub debug_logging: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            terminal_width: DEFAULT_TERMINAL_WIDTH,
            suppress_trailer: false,
            debug_logging: false,
        }
    }
}

impl RenderOptions {
    pub fn with_width(width: i64) -> Self {
        Self {
            terminal_width: normalize_width(width),
            ..Self::default()
        }
    }

    pub fn suppress_trailer(mut self, suppress: bool) -> Self {
        self.suppress_trailer = suppress;
        self
    }

    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.terminal_width = self.terminal_width.max(1);
        self
    }
}

/// Clamps a configured width to at least one column.
pub fn normalize_width(width: i64) -> usize {
    usize::try_from(width).unwrap_or(0).max(1)
}

/// Column count of the attached terminal, or the default when there is
/// none to ask.
pub fn detect_terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .ok()
        .filter(|&w| w > 0)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}
