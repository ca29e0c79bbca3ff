//! Column cursor management for the scanner.

use super::LineScanner;

impl LineScanner {
    /// Returns the character at the cursor without consuming it.
    pub(super) fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Returns the character one past the cursor without consuming it.
    pub(super) fn peek(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    /// Advances the cursor by one column.
    pub(super) fn advance(&mut self) {
        self.pos += 1;
    }

    /// Moves the cursor to the end of the line.
    pub(super) fn consume_rest(&mut self) {
        self.pos = self.chars.len();
    }

    /// Collects `chars[start..=end]` into a `String`.
    pub(super) fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..=end].iter().collect()
    }
}
