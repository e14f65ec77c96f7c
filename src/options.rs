//! Options for HTML to Markdown conversion.

use crate::html::PARSE_TIMEOUT;
use std::time::Duration;

/// Options controlling passage page conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Wall-clock budget for one conversion (`None` = unlimited).
    pub timeout: Option<Duration>,

    /// Whether to append the footnote section.
    pub include_footnotes: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            timeout: Some(PARSE_TIMEOUT),
            include_footnotes: true,
        }
    }
}

impl ConvertOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the conversion deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Removes the conversion deadline.
    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Leaves the footnote section out of the output.
    pub fn without_footnotes(mut self) -> Self {
        self.include_footnotes = false;
        self
    }
}
