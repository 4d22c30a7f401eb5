//! Card Module - Card Marking and Crossing Map
//!
//! A heap segment is divided into fixed-size cards. Each card has:
//!
//! - a **status** byte (Clean/Dirty) set by the write barrier and consumed by
//!   minor collections, and
//! - a **crossing-map** byte telling the collector where the object that
//!   overlaps the card's first address begins.
//!
//! ```text
//! segment   |  card 10  |  card 11  |  card 12  |  card 13  |
//! object           [=====================================)
//!                  start
//! crossing              offset      -1 (jump 1) -2 (jump 2)
//! ```
//!
//! The allocator extends the crossing map through a [`Boundary`] cursor;
//! [`CardTable::first_obj_for_card`] resolves any card in `O(log n)` reads
//! for an object spanning `n` cards.

pub mod boundary;
pub mod crossing;
pub mod scan;
pub mod table;
mod verify;

pub use boundary::Boundary;
pub use scan::{scan_dirty_cards, DirtyCards, ScanStats};
pub use table::{CardStatus, CardTable, CardTableSummary};
