//! Slot Dump - Record every slot a traversal hands out
//!
//! Diagnostic acceptor used for heap snapshots and root dumps. Each slot is
//! recorded with its name, kind, rendered value and the root section it
//! arrived in. Slots are never rewritten.

use super::root::{RootAcceptor, RootSection};
use super::slot::{BasedPointer, GcPointer, RawPointer, SlotKind, SymbolId, TaggedValue, WeakRef};
use super::NamedSlotAcceptor;
use crate::logging::{log_event, CardEvent};
use serde::Serialize;

/// One recorded slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRecord {
    /// Root section, or `None` for slots visited outside any section
    pub section: Option<RootSection>,
    pub name: Option<String>,
    pub kind: SlotKind,
    pub value: String,
}

/// Recording [`RootAcceptor`]
#[derive(Debug, Default)]
pub struct SlotDump {
    records: Vec<SlotRecord>,
    current: Option<RootSection>,
    section_slots: usize,
}

impl SlotDump {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded slots, in visit order
    pub fn records(&self) -> &[SlotRecord] {
        &self.records
    }

    /// Records that arrived inside `section`
    pub fn section(&self, section: RootSection) -> impl Iterator<Item = &SlotRecord> {
        self.records
            .iter()
            .filter(move |record| record.section == Some(section))
    }

    /// Section currently open, if any
    pub fn current_section(&self) -> Option<RootSection> {
        self.current
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }

    fn record(&mut self, kind: SlotKind, name: Option<&str>, value: String) {
        if self.current.is_some() {
            self.section_slots += 1;
        }
        self.records.push(SlotRecord {
            section: self.current,
            name: name.map(str::to_string),
            kind,
            value,
        });
    }
}

fn render_address(address: Option<usize>) -> String {
    match address {
        Some(address) => format!("{:#x}", address),
        None => "null".to_string(),
    }
}

impl NamedSlotAcceptor for SlotDump {
    fn accept_raw_named(&mut self, ptr: &mut RawPointer, name: Option<&str>) {
        let value = render_address(Some(ptr.address()).filter(|&a| a != 0));
        self.record(SlotKind::Raw, name, value);
    }

    fn accept_based_named(&mut self, ptr: &mut BasedPointer, name: Option<&str>) {
        let value = if ptr.is_null() {
            "null".to_string()
        } else {
            format!("base+{:#x}", ptr.offset())
        };
        self.record(SlotKind::Based, name, value);
    }

    fn accept_gc_named(&mut self, ptr: &mut GcPointer, name: Option<&str>) {
        self.record(SlotKind::Gc, name, render_address(ptr.get()));
    }

    fn accept_value_named(&mut self, value: &mut TaggedValue, name: Option<&str>) {
        self.record(SlotKind::Value, name, value.to_string());
    }

    fn accept_symbol_named(&mut self, symbol: SymbolId, name: Option<&str>) {
        self.record(SlotKind::Symbol, name, format!("symbol#{}", symbol.index()));
    }

    fn accept_weak_named(&mut self, weak: &mut WeakRef, name: Option<&str>) {
        self.record(SlotKind::Weak, name, render_address(weak.get()));
    }
}

impl RootAcceptor for SlotDump {
    fn begin_root_section(&mut self, section: RootSection) {
        debug_assert!(
            self.current.is_none(),
            "root section {} opened inside {:?}",
            section,
            self.current
        );
        self.current = Some(section);
        self.section_slots = 0;
    }

    fn end_root_section(&mut self) {
        debug_assert!(self.current.is_some(), "end_root_section without begin");
        if let Some(section) = self.current.take() {
            log::trace!("root section {}: {} slots", section, self.section_slots);
            log_event(CardEvent::RootSection {
                section: section.name().to_string(),
                slots: self.section_slots,
            });
        }
        self.section_slots = 0;
    }
}
