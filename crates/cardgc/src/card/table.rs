//! Card Table - Dirty tracking and crossing map for one heap segment
//!
//! Layout for the default configuration (4MB segment, 512-byte cards):
//!
//! ```text
//! segment:  [ card 0 | card 1 | card 2 | ... | card 8191 ]
//!             512B     512B     512B           512B
//!
//! cards:    [ Clean  | Dirty  | Clean  | ... ]   1 byte per card
//! crossing: [   0    |   5    |  -1    | ... ]   1 signed byte per card
//! ```
//!
//! The write barrier only touches `cards`. The allocator extends `crossing`
//! through [`CardTable::update_boundaries`] as it crosses card boundaries.
//! Both arrays are sized once at construction and never reallocated.

use super::boundary::Boundary;
use super::crossing::{encode_exp, jump_distance, ExpSchedule};
use crate::config::CardTableConfig;
use crate::error::{CardError, Result};
use crate::logging::{log_event, CardEvent, CardLogger};
use crate::util::{format_address, Alignment};
use serde::Serialize;

/// Per-card modification status, one byte per card
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CardStatus {
    Clean = 0,
    Dirty = 1,
}

/// CardTable - card status and crossing map covering one heap segment
pub struct CardTable {
    /// Status byte per card
    cards: Box<[CardStatus]>,

    /// Crossing-map entry per card
    boundaries: Box<[i8]>,

    /// First address of the segment (card aligned)
    base: usize,

    card_size_log: u32,
    heap_align_log: u32,
    verify_before_scan: bool,
    verbose: bool,
}

impl std::fmt::Debug for CardTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardTable")
            .field("base", &format_address(self.base))
            .field("num_cards", &self.num_cards())
            .field("card_size", &self.card_size())
            .finish()
    }
}

impl CardTable {
    /// Create a table covering `[base, base + config.segment_size)`
    ///
    /// All cards start Clean and the crossing map is zeroed.
    ///
    /// # Errors
    ///
    /// - `CardError::Configuration` if the config does not validate
    /// - `CardError::Misaligned` if `base` is not card aligned
    /// - `CardError::OutOfSegment` if the segment would wrap the address space
    pub fn new(config: &CardTableConfig, base: usize) -> Result<Self> {
        config.validate()?;

        if !Alignment::is_aligned(base, config.card_size()) {
            return Err(CardError::Misaligned {
                address: base,
                alignment: config.card_size(),
            });
        }

        if base.checked_add(config.segment_size).is_none() {
            return Err(CardError::OutOfSegment {
                address: base,
                base,
                end: usize::MAX,
            });
        }

        let num_cards = config.num_cards();
        let table = Self {
            cards: vec![CardStatus::Clean; num_cards].into_boxed_slice(),
            boundaries: vec![0i8; num_cards].into_boxed_slice(),
            base,
            card_size_log: config.card_size_log,
            heap_align_log: config.heap_align_log,
            verify_before_scan: config.verify_before_scan,
            verbose: config.verbose,
        };

        log::debug!(
            "Card table created at {} ({} cards of {} bytes)",
            format_address(base),
            num_cards,
            table.card_size()
        );
        table.emit(CardEvent::TableCreated {
            base,
            num_cards,
            card_size: table.card_size(),
        });

        Ok(table)
    }

    // ========================================================================
    // GEOMETRY
    // ========================================================================

    /// First address covered by the table
    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    /// One past the last address covered by the table
    #[inline]
    pub fn end(&self) -> usize {
        self.base + (self.num_cards() << self.card_size_log)
    }

    /// Number of valid card indices
    #[inline]
    pub fn num_cards(&self) -> usize {
        self.cards.len()
    }

    /// Card size in bytes
    #[inline]
    pub fn card_size(&self) -> usize {
        1usize << self.card_size_log
    }

    /// log2 of the minimum object alignment used by the crossing map
    #[inline]
    pub fn heap_align_log(&self) -> u32 {
        self.heap_align_log
    }

    /// Card index for `address`
    ///
    /// `address` may equal `end()`, which maps to `num_cards()`.
    #[inline]
    pub fn address_to_index(&self, address: usize) -> usize {
        debug_assert!(
            self.base <= address && address <= self.end(),
            "address {:#x} outside card table range",
            address
        );
        (address - self.base) >> self.card_size_log
    }

    /// First address of card `index`
    ///
    /// `index` may equal `num_cards()`, which maps to `end()`.
    #[inline]
    pub fn index_to_address(&self, index: usize) -> usize {
        debug_assert!(index <= self.num_cards(), "card index {} out of range", index);
        self.base + (index << self.card_size_log)
    }

    /// Check if `address` sits on a card boundary
    ///
    /// The base is card aligned, so this holds for addresses outside the
    /// segment too.
    #[inline]
    pub fn is_card_aligned(&self, address: usize) -> bool {
        Alignment::is_aligned(address.wrapping_sub(self.base), self.card_size())
    }

    /// Cursor on the first card boundary at or above `level`
    pub fn next_boundary(&self, level: usize) -> Boundary {
        let address = self.base + Alignment::align_up(level - self.base, self.card_size());
        Boundary::new(self.address_to_index(address), address, self.card_size_log)
    }

    // ========================================================================
    // CARD STATUS
    // ========================================================================

    /// Status of card `index`
    #[inline]
    pub fn status(&self, index: usize) -> CardStatus {
        self.cards[index]
    }

    /// Check if card `index` is dirty
    #[inline]
    pub fn is_dirty(&self, index: usize) -> bool {
        self.cards[index] == CardStatus::Dirty
    }

    /// Write barrier: dirty every card intersecting `[low, high)`
    ///
    /// An empty range dirties nothing.
    #[inline]
    pub fn dirty_cards_for_address_range(&mut self, low: usize, high: usize) {
        debug_assert!(low <= high, "inverted range {:#x}..{:#x}", low, high);
        if low >= high {
            return;
        }
        let from = self.address_to_index(low);
        let to = self.address_to_index(high - 1);
        self.dirty_range(from, to);
    }

    /// Write barrier fast path for a single pointer slot
    #[inline]
    pub fn dirty_card_for_address(&mut self, address: usize) {
        let index = self.address_to_index(address);
        self.cards[index] = CardStatus::Dirty;
    }

    /// Smallest index in `[from, end)` whose card has `status`
    pub fn find_next_card_with_status(
        &self,
        status: CardStatus,
        from: usize,
        end: usize,
    ) -> Option<usize> {
        debug_assert!(from <= end && end <= self.num_cards());
        self.cards[from..end]
            .iter()
            .position(|&card| card == status)
            .map(|offset| from + offset)
    }

    /// Smallest dirty card index in `[from, end)`
    #[inline]
    pub fn find_next_dirty_card(&self, from: usize, end: usize) -> Option<usize> {
        self.find_next_card_with_status(CardStatus::Dirty, from, end)
    }

    /// Set every card to Clean
    pub fn clear(&mut self) {
        let last = self.num_cards() - 1;
        self.clean_range(0, last);
        log::trace!("Card table at {} cleared", format_address(self.base));
        self.emit(CardEvent::Cleared {
            num_cards: self.num_cards(),
        });
    }

    /// Set cards `from..=to` to Clean
    #[inline]
    pub fn clean_range(&mut self, from: usize, to: usize) {
        self.clean_or_dirty_range(from, to, CardStatus::Clean);
    }

    /// Set cards `from..=to` to Dirty
    #[inline]
    pub fn dirty_range(&mut self, from: usize, to: usize) {
        self.clean_or_dirty_range(from, to, CardStatus::Dirty);
    }

    #[inline]
    fn clean_or_dirty_range(&mut self, from: usize, to: usize, status: CardStatus) {
        // An empty inclusive range (from == to + 1) is allowed at the top end.
        if from > to {
            debug_assert!(from == to + 1, "inverted card range {}..={}", from, to);
            return;
        }
        debug_assert!(to < self.num_cards(), "card index {} out of range", to);
        self.cards[from..=to].fill(status);
    }

    /// Rebase card state on the high-water mark left by compaction
    ///
    /// Every card holding bytes below `new_level` becomes Dirty; every card
    /// at or above it becomes Clean. A level equal to `base()` means the
    /// segment is empty and every card is cleaned.
    pub fn update_after_compaction(&mut self, new_level: usize) {
        debug_assert!(
            self.base <= new_level && new_level <= self.end(),
            "compaction level {:#x} outside segment",
            new_level
        );

        let num_cards = self.num_cards();
        let dirty_cards = if new_level == self.base {
            self.clean_range(0, num_cards - 1);
            0
        } else {
            let last_dirty = self.address_to_index(new_level - 1);
            self.dirty_range(0, last_dirty);
            self.clean_range(last_dirty + 1, num_cards - 1);
            last_dirty + 1
        };

        log::debug!(
            "Card table rebased on level {}: {} dirty, {} clean",
            format_address(new_level),
            dirty_cards,
            num_cards - dirty_cards
        );
        self.emit(CardEvent::CompactionRebase {
            new_level,
            dirty_cards,
            clean_cards: num_cards - dirty_cards,
        });
    }

    // ========================================================================
    // CROSSING MAP
    // ========================================================================

    /// Raw crossing-map entry of card `index`
    #[inline]
    pub fn crossing_entry(&self, index: usize) -> i8 {
        self.boundaries[index]
    }

    /// Record an object occupying `[start, end)` in the crossing map
    ///
    /// `boundary` must sit on the first card boundary the object crosses:
    /// `start <= boundary.address() < end`. On return the cursor sits on the
    /// first card boundary at or above `end`.
    pub fn update_boundaries(&mut self, boundary: &mut Boundary, start: usize, end: usize) {
        debug_assert!(
            self.base <= start && end <= self.end(),
            "[{:#x}, {:#x}) not covered by this table",
            start,
            end
        );
        debug_assert!(
            boundary.index() == self.address_to_index(boundary.address()),
            "boundary index does not match its address"
        );
        debug_assert!(
            start <= boundary.address() && boundary.address() < end,
            "object [{:#x}, {:#x}) does not cross boundary {:#x}",
            start,
            end,
            boundary.address()
        );

        let offset = (boundary.address() - start) >> self.heap_align_log;
        debug_assert!(offset <= i8::MAX as usize, "crossing offset {} overflows", offset);
        self.boundaries[boundary.index()] = offset as i8;
        boundary.bump();

        for exp in ExpSchedule::new() {
            if boundary.address() >= end {
                break;
            }
            self.boundaries[boundary.index()] = encode_exp(exp);
            boundary.bump();
        }
    }

    /// Allocator hook: record `[start, end)` if it crosses the cursor
    ///
    /// Objects that end at or before the next card boundary leave the
    /// crossing map and the cursor untouched. Returns true if the map changed.
    #[inline]
    pub fn record_allocation(&mut self, boundary: &mut Boundary, start: usize, end: usize) -> bool {
        if end > boundary.address() {
            self.update_boundaries(boundary, start, end);
            true
        } else {
            false
        }
    }

    /// Start address of the first object overlapping card `index`
    ///
    /// Follows negative entries backward until a non-negative offset is found.
    pub fn first_obj_for_card(&self, index: usize) -> usize {
        let (landing, entry) = self.resolve_chain(index);
        self.index_to_address(landing) - ((entry as usize) << self.heap_align_log)
    }

    /// Follow the backward-jump chain from `index`
    ///
    /// Returns the landing card and its non-negative entry.
    #[inline]
    fn resolve_chain(&self, mut index: usize) -> (usize, i8) {
        let mut entry = self.boundaries[index];
        while entry < 0 {
            let jump = jump_distance(entry);
            debug_assert!(jump <= index, "crossing chain underflows at card {}", index);
            index -= jump;
            entry = self.boundaries[index];
        }
        (index, entry)
    }

    /// Number of entries read when resolving card `index`
    pub fn chain_length(&self, mut index: usize) -> usize {
        let mut reads = 1;
        let mut entry = self.boundaries[index];
        while entry < 0 {
            index -= jump_distance(entry);
            entry = self.boundaries[index];
            reads += 1;
        }
        reads
    }

    pub(crate) fn boundaries(&self) -> &[i8] {
        &self.boundaries
    }

    pub(crate) fn verify_before_scan(&self) -> bool {
        self.verify_before_scan
    }

    /// Record `event`, echoing it to stdout for verbose tables
    pub(crate) fn emit(&self, event: CardEvent) {
        if self.verbose {
            println!("{}", CardLogger::format_human(&event));
        }
        log_event(event);
    }

    // ========================================================================
    // STATISTICS
    // ========================================================================

    /// Snapshot of card and crossing-map occupancy
    ///
    /// Walks both arrays; meant for diagnostics, not the allocation path.
    pub fn summary(&self) -> CardTableSummary {
        let dirty_cards = self
            .cards
            .iter()
            .filter(|&&card| card == CardStatus::Dirty)
            .count();
        let backward_entries = self.boundaries.iter().filter(|&&entry| entry < 0).count();
        let longest_chain = (0..self.num_cards())
            .filter(|&index| self.boundaries[index] < 0)
            .map(|index| self.chain_length(index))
            .max()
            .unwrap_or(1);

        CardTableSummary {
            base: self.base,
            num_cards: self.num_cards(),
            card_size: self.card_size(),
            dirty_cards,
            clean_cards: self.num_cards() - dirty_cards,
            backward_entries,
            longest_chain,
        }
    }
}

/// Summary statistics for one card table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardTableSummary {
    /// Segment base address
    pub base: usize,
    /// Number of cards
    pub num_cards: usize,
    /// Card size (bytes)
    pub card_size: usize,
    /// Cards currently dirty
    pub dirty_cards: usize,
    /// Cards currently clean
    pub clean_cards: usize,
    /// Crossing-map entries holding a backward jump
    pub backward_entries: usize,
    /// Most entries read by any single card lookup
    pub longest_chain: usize,
}
