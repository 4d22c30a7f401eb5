//! Crossing Map Diagnostics
//!
//! Debug helpers that cross-check the crossing map against the allocator's
//! real object layout. They read the whole range they are given, so they
//! belong in tests, debug builds and explicitly requested verification runs.

use super::table::CardTable;
use crate::error::{CardError, Result};
use crate::logging::CardEvent;
use crate::object::{CellLookup, HeapCell};
use rustc_hash::FxHasher;
use std::hash::Hasher;

impl CardTable {
    /// Hash of the crossing-map entries covering `[start, end)`
    ///
    /// When `end` is not card aligned its card is included, since an object
    /// ending past the boundary has already written that entry. An empty
    /// range hashes to zero, matching a freshly created segment.
    pub fn summarize_boundaries(&self, start: usize, end: usize) -> u64 {
        let start_index = self.address_to_index(start);
        let mut end_index = self.address_to_index(end);
        if self.index_to_address(end_index) != end {
            end_index += 1;
        }
        if end_index <= start_index {
            return 0;
        }

        let mut hasher = FxHasher::default();
        for &entry in &self.boundaries()[start_index..end_index] {
            hasher.write_i8(entry);
        }
        hasher.finish()
    }

    /// Check that every card in `[start, level)` resolves to a straddling object
    ///
    /// For each card whose first address is below `level`, the object found by
    /// [`first_obj_for_card`](CardTable::first_obj_for_card) must exist in
    /// `cells`, be valid, and satisfy `obj <= card_start < obj + size`.
    ///
    /// # Errors
    ///
    /// - `CardError::OutOfSegment` if `start` or `level` lies outside `[base, end]`
    /// - `CardError::Misaligned` if `start` is not card aligned
    /// - `CardError::BoundaryBroken` for the first card that fails
    pub fn check_boundaries<L: CellLookup>(
        &self,
        start: usize,
        level: usize,
        cells: &L,
    ) -> Result<usize> {
        for address in [start, level] {
            if address < self.base() || self.end() < address {
                return Err(CardError::OutOfSegment {
                    address,
                    base: self.base(),
                    end: self.end(),
                });
            }
        }
        if !self.is_card_aligned(start) {
            return Err(CardError::Misaligned {
                address: start,
                alignment: self.card_size(),
            });
        }

        let first_index = self.address_to_index(start);
        let mut checked = 0;
        for index in first_index..self.num_cards() {
            let card_start = self.index_to_address(index);
            if level <= card_start {
                break;
            }

            let object = self.first_obj_for_card(index);
            let broken = |reason: String| CardError::BoundaryBroken {
                index,
                address: object,
                reason,
            };

            let cell = cells
                .cell_at(object)
                .ok_or_else(|| broken("no object allocated at resolved address".to_string()))?;
            if !cell.is_valid() {
                return Err(broken("first object for card is not a valid cell".to_string()));
            }
            if !(cell.start() <= card_start && card_start < cell.end()) {
                return Err(broken(format!(
                    "object [{:#x}, {:#x}) does not extend into card",
                    cell.start(),
                    cell.end()
                )));
            }
            checked += 1;
        }

        log::trace!("Verified {} card boundaries from card {}", checked, first_index);
        self.emit(CardEvent::BoundariesVerified {
            from_index: first_index,
            cards_checked: checked,
        });
        Ok(checked)
    }

    /// Assert that the crossing map is consistent below `level`
    ///
    /// # Panics
    ///
    /// Panics on the first broken card; a broken crossing map means the
    /// collector would scan from the wrong object.
    pub fn verify_boundaries<L: CellLookup>(&self, start: usize, level: usize, cells: &L) {
        if let Err(err) = self.check_boundaries(start, level, cells) {
            if let CardError::BoundaryBroken {
                index,
                address,
                ref reason,
            } = err
            {
                log::error!("Card object boundary is broken: {}", err);
                self.emit(CardEvent::BoundaryBroken {
                    index,
                    address,
                    reason: reason.clone(),
                });
            }
            crate::assert_context!(false, "card boundary verification failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CardTableConfig;
    use crate::error::CardError;
    use crate::object::{CellLookup, CellSpan};
    use crate::CardTable;
    use std::collections::BTreeMap;

    const BASE: usize = 0x10_0000;

    #[derive(Default)]
    struct Cells(BTreeMap<usize, CellSpan>);

    impl CellLookup for Cells {
        type Cell = CellSpan;

        fn cell_at(&self, address: usize) -> Option<CellSpan> {
            self.0.get(&address).copied()
        }
    }

    /// Bump-allocate `sizes` from the base, recording boundaries
    fn layout(sizes: &[usize]) -> (CardTable, Cells, usize) {
        let config = CardTableConfig {
            segment_size: 256 * 512,
            ..Default::default()
        };
        let mut table = CardTable::new(&config, BASE).unwrap();
        let mut cells = Cells::default();
        let mut boundary = table.next_boundary(BASE);
        let mut level = BASE;
        for &size in sizes {
            table.record_allocation(&mut boundary, level, level + size);
            cells.0.insert(level, CellSpan::new(level, size));
            level += size;
        }
        (table, cells, level)
    }

    #[test]
    fn test_check_boundaries_on_valid_layout() {
        let (table, cells, level) = layout(&[64, 1000, 24, 8 * 512, 40, 600]);
        let checked = table.check_boundaries(BASE, level, &cells).unwrap();
        assert_eq!(checked, table.address_to_index(level - 1) + 1);
    }

    #[test]
    fn test_check_boundaries_detects_corruption() {
        let (mut table, mut cells, level) = layout(&[64, 1000, 24]);
        // Pretend the second object is smaller than recorded
        cells.0.insert(BASE + 64, CellSpan::new(BASE + 64, 128));
        let err = table.check_boundaries(BASE, level, &cells).unwrap_err();
        assert!(err.is_bug());

        // A dangling crossing entry points at no object at all
        let (_, fresh, level) = layout(&[64, 1000, 24]);
        let mut boundary = table.next_boundary(BASE + 512);
        table.update_boundaries(&mut boundary, BASE + 504, BASE + 520);
        assert!(table.check_boundaries(BASE, level, &fresh).is_err());
    }

    #[test]
    fn test_check_boundaries_rejects_unaligned_start() {
        let (table, cells, level) = layout(&[64]);
        assert!(table.check_boundaries(BASE + 8, level, &cells).is_err());
    }

    #[test]
    fn test_check_boundaries_rejects_outside_segment() {
        let (table, cells, level) = layout(&[64, 1000]);

        let below = table.check_boundaries(BASE - 512, level, &cells);
        assert!(matches!(below, Err(CardError::OutOfSegment { address, .. }) if address == BASE - 512));

        let above = table.check_boundaries(BASE, table.end() + 8, &cells);
        assert!(matches!(above, Err(CardError::OutOfSegment { .. })));

        assert!(table.is_card_aligned(BASE - 512));
        assert!(!table.is_card_aligned(BASE - 8));
    }

    #[test]
    #[should_panic(expected = "card boundary verification failed")]
    fn test_verify_boundaries_panics() {
        let (table, mut cells, level) = layout(&[64, 1000]);
        cells.0.remove(&(BASE + 64));
        table.verify_boundaries(BASE, level, &cells);
    }

    #[test]
    fn test_summarize_boundaries_tracks_changes() {
        let (table, _, level) = layout(&[64, 1000]);
        assert_eq!(table.summarize_boundaries(BASE, BASE), 0);

        let before = table.summarize_boundaries(BASE, level);
        let (other, _, other_level) = layout(&[64, 1000]);
        assert_eq!(before, other.summarize_boundaries(BASE, other_level));

        let (changed, _, changed_level) = layout(&[72, 992]);
        assert_eq!(level, changed_level);
        assert_ne!(before, changed.summarize_boundaries(BASE, changed_level));
    }
}
