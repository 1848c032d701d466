//! Adaptive tab-stop memory.
//!
//! Each auto-tab code in a message addresses the next slot of this
//! table. A slot remembers the widest column it has seen; requesting a
//! tab stop returns at least that width, so successive similar log
//! lines align their columns over time. Widths only ever grow.

/// Per-slot width memory with a cursor that walks the slots in the
/// order they appear within one message.
#[derive(Debug, Clone, Default)]
pub struct AutoSizes {
    widths: Vec<usize>,
    cursor: usize,
}

impl AutoSizes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the slot cursor to the first slot. Called at the start of
    /// each message (and at each embedded line break); the learned
    /// widths survive.
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    /// Forget all learned widths.
    pub fn reset(&mut self) {
        self.widths.clear();
        self.cursor = 0;
    }

    /// Compute the tab stop for the current slot and advance the cursor.
    ///
    /// The stop is the larger of the slot's recorded width and the
    /// current column, plus the requested extra padding; the slot record
    /// is updated to the result, so stops never decrease.
    pub fn next(&mut self, column: usize, extra: usize) -> usize {
        if self.cursor >= self.widths.len() {
            self.widths.resize(self.cursor + 1, 0);
        }
        let stop = self.widths[self.cursor].max(column) + extra;
        self.widths[self.cursor] = stop;
        self.cursor += 1;
        stop
    }

    /// Number of slots observed so far.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Serialize the learned widths to a single-line string, suitable
    /// for storage in a configuration variable.
    pub fn export(&self) -> String {
        self.widths
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Restore a table from [`AutoSizes::export`] output. Tokens that do
    /// not parse are skipped.
    pub fn import(text: &str) -> Self {
        Self {
            widths: text
                .split_whitespace()
                .filter_map(|t| t.parse().ok())
                .collect(),
            cursor: 0,
        }
    }
}
