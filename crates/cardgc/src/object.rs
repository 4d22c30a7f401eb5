//! Object Model - The minimal view of heap-resident cells
//!
//! The card table never reads object memory. It only needs to know, for the
//! diagnostic verifier and the dirty-card walker, where an object starts, how
//! many bytes it occupies and whether it looks like a valid cell. The
//! allocator owns the real layout and exposes it through [`CellLookup`].

/// A heap-resident value with a computable size
pub trait HeapCell {
    /// Address of the first byte of the cell
    fn start(&self) -> usize;

    /// Allocated size in bytes, including any header and padding
    fn allocated_size(&self) -> usize;

    /// Debug validity predicate (header magic, known kind, etc.)
    fn is_valid(&self) -> bool {
        true
    }

    /// One past the last byte of the cell
    #[inline]
    fn end(&self) -> usize {
        self.start() + self.allocated_size()
    }

    /// Check if the cell covers `address`
    #[inline]
    fn contains(&self, address: usize) -> bool {
        self.start() <= address && address < self.end()
    }
}

/// Resolves an object start address to the cell allocated there
pub trait CellLookup {
    type Cell: HeapCell;

    /// Cell starting exactly at `address`, if the allocator placed one there
    fn cell_at(&self, address: usize) -> Option<Self::Cell>;
}

impl<L: CellLookup + ?Sized> CellLookup for &L {
    type Cell = L::Cell;

    fn cell_at(&self, address: usize) -> Option<Self::Cell> {
        (**self).cell_at(address)
    }
}

/// Plain `[start, start + size)` cell description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSpan {
    pub start: usize,
    pub size: usize,
    pub valid: bool,
}

impl CellSpan {
    /// Create a valid span
    pub fn new(start: usize, size: usize) -> Self {
        Self {
            start,
            size,
            valid: true,
        }
    }
}

impl HeapCell for CellSpan {
    #[inline]
    fn start(&self) -> usize {
        self.start
    }

    #[inline]
    fn allocated_size(&self) -> usize {
        self.size
    }

    #[inline]
    fn is_valid(&self) -> bool {
        self.valid && self.size > 0
    }
}
