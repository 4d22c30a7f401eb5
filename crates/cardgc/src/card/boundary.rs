//! Boundary Cursor - Allocation-time position in the crossing map
//!
//! The allocator keeps one `Boundary` per segment. It always sits on the next
//! card boundary at or above the allocation level, so an allocation
//! `[start, end)` crosses a card boundary exactly when `end > address()`.

/// Card-aligned cursor `{address, index}` advanced by crossing-map updates
///
/// Invariant: `index == table.address_to_index(address)` for the table that
/// produced it (see [`CardTable::next_boundary`](super::CardTable::next_boundary)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    address: usize,
    index: usize,
    card_size_log: u32,
}

impl Boundary {
    pub(crate) fn new(index: usize, address: usize, card_size_log: u32) -> Self {
        Self {
            address,
            index,
            card_size_log,
        }
    }

    /// Card boundary address the cursor sits on
    #[inline]
    pub fn address(&self) -> usize {
        self.address
    }

    /// Index of the card starting at `address()`
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance to the next card boundary
    #[inline]
    pub fn bump(&mut self) {
        self.index += 1;
        self.address += 1usize << self.card_size_log;
    }
}
