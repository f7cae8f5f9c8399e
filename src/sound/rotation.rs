//! Round-robin or random selection from a configured list.

use rand::seq::SliceRandom;

use crate::types::SelectionMode;

/// Picks one item per break from a fixed list.
///
/// The sequential cursor survives across breaks for the life of the process.
#[derive(Debug, Clone)]
pub struct Rotation<T> {
    items: Vec<T>,
    mode: SelectionMode,
    cursor: usize,
}

impl<T> Rotation<T> {
    /// Creates a rotation over `items`.
    #[must_use]
    pub fn new(items: Vec<T>, mode: SelectionMode) -> Self {
        Self {
            items,
            mode,
            cursor: 0,
        }
    }

    /// Returns the next item, or `None` if the list is empty.
    pub fn next_item(&mut self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        match self.mode {
            SelectionMode::Sequential => {
                let index = self.cursor % self.items.len();
                self.cursor = self.cursor.wrapping_add(1);
                self.items.get(index)
            }
            SelectionMode::Random => self.items.choose(&mut rand::thread_rng()),
        }
    }
}
