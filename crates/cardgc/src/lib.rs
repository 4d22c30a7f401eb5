//! # cardgc - Card Table and Slot Acceptors for a Generational Collector
//!
//! cardgc provides the per-segment bookkeeping a generational, compacting
//! collector needs to find old-to-young pointers without scanning the whole
//! old generation, plus the visitor traits every collector pass uses to see
//! pointer-shaped slots.
//!
//! ## Overview
//!
//! - **Card Table**: One status byte per card, dirtied by the write barrier
//! - **Crossing Map**: One signed byte per card locating the first object
//!   overlapping it, resolved in O(log n) reads via exponential back-jumps
//! - **Dirty-Card Scanning**: Minor-collection walker over dirty cards
//! - **Slot Acceptors**: Plain, named and root-section-aware visitors
//! - **Root Set**: Sectioned root registry driven through a [`RootAcceptor`]
//!
//! ## Quick Start
//!
//! ```rust
//! use cardgc::{CardTable, CardTableConfig};
//!
//! fn main() -> Result<(), cardgc::CardError> {
//!     let config = CardTableConfig {
//!         segment_size: 64 * 512,
//!         ..Default::default()
//!     };
//!     let base = 0x10_0000;
//!     let mut table = CardTable::new(&config, base)?;
//!
//!     // Allocator: a 1000-byte object at base + 256 crosses two boundaries
//!     let mut boundary = table.next_boundary(base + 1);
//!     table.record_allocation(&mut boundary, base + 256, base + 1256);
//!     assert_eq!(table.first_obj_for_card(2), base + 256);
//!
//!     // Write barrier: a pointer store into the object
//!     table.dirty_card_for_address(base + 1200);
//!     assert_eq!(table.find_next_dirty_card(0, table.num_cards()), Some(2));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  dirty_cards_for_address_range   ┌────────────────────┐
//! │ Write Barrier│ ───────────────────────────────▶ │      CardTable     │
//! └──────────────┘                                  │  cards  [u8; n]    │
//! ┌──────────────┐  update_boundaries(Boundary)     │  crossing [i8; n]  │
//! │  Allocator   │ ───────────────────────────────▶ │                    │
//! └──────────────┘                                  └─────────┬──────────┘
//!                                                             │ find_next_dirty_card
//!                                                             │ first_obj_for_card
//!                                                             ▼
//!                                                   ┌────────────────────┐
//!                                                   │  scan_dirty_cards  │
//!                                                   └─────────┬──────────┘
//!                                                             │ objects
//!                                                             ▼
//!                                     SlotAcceptor / NamedSlotAcceptor / RootAcceptor
//! ```
//!
//! ## Modules
//!
//! - [`card`]: Card table, crossing map, boundary cursor and dirty-card scanning
//! - [`acceptor`]: Slot types and the acceptor trait family
//! - [`roots`]: Sectioned root set
//! - [`object`]: Minimal heap cell view used by verification and scanning
//! - [`config`]: Table configuration and validation
//! - [`error`]: Error types
//! - [`logging`]: Structured event log
//! - [`util`]: Alignment and formatting helpers
//!
//! ## Thread Safety
//!
//! A `CardTable` is owned by one segment and mutated through `&mut self`;
//! callers serialize the write barrier, allocation and collection phases.

pub mod acceptor;
pub mod card;
pub mod config;
pub mod error;
pub mod logging;
pub mod object;
pub mod roots;
pub mod util;

pub use acceptor::{
    DroppingAcceptor, NamedSlotAcceptor, RootAcceptor, RootSection, SlotAcceptor, SlotDump,
};
pub use card::{scan_dirty_cards, Boundary, CardStatus, CardTable, CardTableSummary, ScanStats};
pub use config::{CardTableConfig, ConfigError};
pub use error::{CardError, Result};
pub use object::{CellLookup, CellSpan, HeapCell};
pub use roots::{RootSet, RootSlot};

/// cardgc version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
