//! Dirty Card Scanning - Minor collection driver
//!
//! A minor collection only looks at cards the write barrier dirtied:
//!
//! ```text
//! 1. find next dirty card          (byte scan over the status array)
//! 2. first_obj_for_card(card)      (crossing map, O(log n) reads)
//! 3. walk objects forward until the card ends
//! 4. continue from card + 1
//! ```
//!
//! Objects straddling several consecutive dirty cards are visited once.

use super::table::CardTable;
use crate::logging::CardEvent;
use crate::object::{CellLookup, HeapCell};
use crate::util::format_address;
use serde::Serialize;
use std::time::Instant;

/// Iterator over dirty card indices in increasing order
pub struct DirtyCards<'a> {
    table: &'a CardTable,
    next: usize,
    end: usize,
}

impl<'a> Iterator for DirtyCards<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let found = self.table.find_next_dirty_card(self.next, self.end)?;
        self.next = found + 1;
        Some(found)
    }
}

impl std::iter::FusedIterator for DirtyCards<'_> {}

impl CardTable {
    /// Dirty cards with index in `[from, end)`
    pub fn dirty_cards(&self, from: usize, end: usize) -> DirtyCards<'_> {
        debug_assert!(from <= end && end <= self.num_cards());
        DirtyCards {
            table: self,
            next: from,
            end,
        }
    }

    /// Number of cards holding at least one byte below `level`
    #[inline]
    pub fn cards_below(&self, level: usize) -> usize {
        if level == self.base() {
            0
        } else {
            self.address_to_index(level - 1) + 1
        }
    }
}

/// Statistics for one dirty-card scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Dirty cards visited
    pub cards_scanned: usize,
    /// Objects handed to the visitor
    pub objects_visited: usize,
}

/// Visit every object overlapping a dirty card below `level`
///
/// `cells` must describe the contiguous object layout the allocator built
/// while feeding the crossing map. When the table was configured with
/// `verify_before_scan`, the crossing map is verified up to `level` first.
pub fn scan_dirty_cards<L, F>(table: &CardTable, cells: &L, level: usize, mut visit: F) -> ScanStats
where
    L: CellLookup,
    F: FnMut(&L::Cell),
{
    if table.verify_before_scan() {
        table.verify_boundaries(table.base(), level, cells);
    }

    let timer = Instant::now();
    let end_index = table.cards_below(level);
    let mut stats = ScanStats::default();
    // Objects below this address were already visited
    let mut resume = table.base();

    for card in table.dirty_cards(0, end_index) {
        stats.cards_scanned += 1;
        let card_end = table.index_to_address(card + 1).min(level);
        let mut address = table.first_obj_for_card(card).max(resume);

        while address < card_end {
            let Some(cell) = cells.cell_at(address) else {
                log::warn!(
                    "No object at {} while scanning card {}",
                    format_address(address),
                    card
                );
                break;
            };
            if cell.allocated_size() == 0 {
                log::warn!("Zero-sized object at {}", format_address(address));
                break;
            }
            visit(&cell);
            stats.objects_visited += 1;
            address = cell.end();
        }
        resume = address;
    }

    log::debug!(
        "Scanned {} dirty cards, {} objects",
        stats.cards_scanned,
        stats.objects_visited
    );
    table.emit(CardEvent::DirtyScan {
        cards_scanned: stats.cards_scanned,
        objects_visited: stats.objects_visited,
        duration_us: timer.elapsed().as_micros() as u64,
    });

    stats
}
