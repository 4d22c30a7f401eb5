//! Test Utilities for the cardgc Test Suite
//!
//! Provides a synthetic heap segment: a bump allocator that feeds the crossing
//! map exactly like a real allocator would, remembers every object it placed
//! and stores managed pointer fields for acceptor tests.
//!
//! ============================================================================
//! Assertions here are exact. A mismatch is a crossing-map or scan bug.
//! ============================================================================

#![allow(dead_code)]

use cardgc::acceptor::{GcPointer, SlotAcceptor};
use cardgc::{Boundary, CardTable, CardTableConfig, CellLookup, CellSpan};
use std::collections::BTreeMap;

/// Segment base used by every fixture (card aligned for any card size)
pub const SEGMENT_BASE: usize = 0x1000_0000;

/// Default card size for fixtures (512 bytes)
pub const CARD_SIZE: usize = 512;

/// Default object alignment (8 bytes)
pub const ALIGNMENT: usize = 8;

/// ============================================================================
/// SEGMENT FIXTURE
/// ============================================================================

/// Bump-allocated segment with its card table
pub struct Segment {
    pub table: CardTable,
    objects: BTreeMap<usize, CellSpan>,
    fields: BTreeMap<usize, GcPointer>,
    top: usize,
    boundary: Boundary,
}

impl Segment {
    /// Segment of `num_cards` 512-byte cards at 8-byte alignment
    pub fn new(num_cards: usize) -> Self {
        Self::with_config(CardTableConfig {
            segment_size: num_cards * CARD_SIZE,
            ..Default::default()
        })
    }

    /// Segment built from an explicit configuration
    ///
    /// **Bug this finds:** Construction rejecting valid geometry
    pub fn with_config(config: CardTableConfig) -> Self {
        let table = CardTable::new(&config, SEGMENT_BASE)
            .expect("card table construction should succeed for a valid config");
        let boundary = table.next_boundary(SEGMENT_BASE);
        Self {
            table,
            objects: BTreeMap::new(),
            fields: BTreeMap::new(),
            top: SEGMENT_BASE,
            boundary,
        }
    }

    pub fn base(&self) -> usize {
        self.table.base()
    }

    /// Allocation level: one past the last allocated byte
    pub fn top(&self) -> usize {
        self.top
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Bump-allocate `size` bytes, or `None` if the segment is full
    pub fn try_allocate(&mut self, size: usize) -> Option<usize> {
        assert!(size > 0 && size % ALIGNMENT == 0, "bad test object size {}", size);
        let start = self.top;
        let end = start.checked_add(size)?;
        if end > self.table.end() {
            return None;
        }

        self.table.record_allocation(&mut self.boundary, start, end);
        self.objects.insert(start, CellSpan::new(start, size));
        self.top = end;
        Some(start)
    }

    /// Bump-allocate `size` bytes
    pub fn allocate(&mut self, size: usize) -> usize {
        self.try_allocate(size)
            .unwrap_or_else(|| panic!("segment full allocating {} bytes", size))
    }

    /// Objects in address order
    pub fn objects(&self) -> impl Iterator<Item = &CellSpan> {
        self.objects.values()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Object covering `address`, found by linear layout search
    pub fn object_containing(&self, address: usize) -> Option<CellSpan> {
        self.objects
            .range(..=address)
            .next_back()
            .map(|(_, cell)| *cell)
            .filter(|cell| address < cell.start + cell.size)
    }

    /// Store a managed pointer into field `field` of `object`, running the
    /// write barrier on the field address
    pub fn store(&mut self, object: usize, field: usize, target: usize) {
        let cell = self.objects[&object];
        let address = object + field * ALIGNMENT;
        assert!(
            address < cell.start + cell.size,
            "field {} outside object {:#x}",
            field,
            object
        );
        self.fields.insert(address, GcPointer::new(target));
        self.table.dirty_card_for_address(address);
    }

    /// Current value of a field slot
    pub fn field(&self, object: usize, field: usize) -> Option<GcPointer> {
        self.fields.get(&(object + field * ALIGNMENT)).copied()
    }

    /// Hand every pointer field of `object` to `acceptor`
    pub fn visit_fields(&mut self, object: usize, acceptor: &mut dyn SlotAcceptor) -> usize {
        let cell = self.objects[&object];
        let mut visited = 0;
        for (_, slot) in self.fields.range_mut(cell.start..cell.start + cell.size) {
            acceptor.accept_gc(slot);
            visited += 1;
        }
        visited
    }
}

impl CellLookup for Segment {
    type Cell = CellSpan;

    fn cell_at(&self, address: usize) -> Option<CellSpan> {
        self.objects.get(&address).copied()
    }
}

/// ============================================================================
/// ASSERTION HELPERS
/// ============================================================================

/// Assert that every card below the allocation level resolves to the object
/// straddling its first byte
///
/// **Bug this finds:** Wrong offsets, wrong back-jump exponents, chains that
/// land before the object start
pub fn assert_crossing_consistent(segment: &Segment) {
    let table = &segment.table;
    for index in 0..table.cards_below(segment.top()) {
        let card_start = table.index_to_address(index);
        let expected = segment
            .object_containing(card_start)
            .unwrap_or_else(|| panic!("no object covers card {}", index));
        assert_eq!(
            table.first_obj_for_card(index),
            expected.start,
            "card {} resolved to the wrong object",
            index
        );
    }
}

/// Number of significant bits in `n`
pub fn bit_length(n: usize) -> usize {
    (usize::BITS - n.leading_zeros()) as usize
}
