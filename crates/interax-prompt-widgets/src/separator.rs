use std::fmt;

use crossterm::style::Stylize;

/// A non-selectable row used to group list entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separator {
    text: String,
}

impl Separator {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for Separator {
    /// A dimmed horizontal rule.
    fn default() -> Self {
        Self::new("─".repeat(14).dim().to_string())
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
