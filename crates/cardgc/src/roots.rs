//! Root Set - Named root slots grouped by section
//!
//! The runtime registers its root slots here, each with a section and an
//! optional debug name. A traversal hands every slot to a [`RootAcceptor`],
//! one section at a time:
//!
//! ```text
//! begin(Registers)  r0 r1 r2           end()
//! begin(Globals)    global             end()
//! (empty sections are skipped)
//! begin(WeakRoots)  cache              end()
//! ```
//!
//! Slots live inside the set, so rewrites made by the acceptor (compaction
//! fixup, promotion) are visible to the runtime after the traversal.

use crate::acceptor::{
    with_root_section, BasedPointer, GcPointer, RawPointer, RootAcceptor, RootSection, SymbolId,
    TaggedValue, WeakRef,
};

/// A single root slot of any acceptor-visible kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSlot {
    Raw(RawPointer),
    Based(BasedPointer),
    Gc(GcPointer),
    Value(TaggedValue),
    Symbol(SymbolId),
    Weak(WeakRef),
}

impl RootSlot {
    fn accept(&mut self, acceptor: &mut dyn RootAcceptor, name: Option<&str>) {
        match self {
            RootSlot::Raw(ptr) => acceptor.accept_raw_named(ptr, name),
            RootSlot::Based(ptr) => acceptor.accept_based_named(ptr, name),
            RootSlot::Gc(ptr) => acceptor.accept_gc_named(ptr, name),
            RootSlot::Value(value) => acceptor.accept_value_named(value, name),
            RootSlot::Symbol(symbol) => acceptor.accept_symbol_named(*symbol, name),
            RootSlot::Weak(weak) => acceptor.accept_weak_named(weak, name),
        }
    }
}

/// Root slot plus its debug name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRoot {
    pub slot: RootSlot,
    pub name: Option<String>,
}

/// Handle to a registered root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootHandle {
    section: RootSection,
    index: usize,
}

impl RootHandle {
    pub fn section(&self) -> RootSection {
        self.section
    }
}

/// Root slots grouped by [`RootSection`]
#[derive(Debug, Clone)]
pub struct RootSet {
    sections: Vec<Vec<NamedRoot>>,
}

impl RootSet {
    pub fn new() -> Self {
        Self {
            sections: vec![Vec::new(); RootSection::COUNT],
        }
    }

    /// Register a root slot
    pub fn add(&mut self, section: RootSection, slot: RootSlot, name: Option<&str>) -> RootHandle {
        let roots = &mut self.sections[section.index()];
        roots.push(NamedRoot {
            slot,
            name: name.map(str::to_string),
        });
        RootHandle {
            section,
            index: roots.len() - 1,
        }
    }

    /// Current value of a registered slot
    pub fn get(&self, handle: RootHandle) -> Option<RootSlot> {
        self.sections[handle.section.index()]
            .get(handle.index)
            .map(|root| root.slot)
    }

    /// Drop every root of `section`; handles into it become stale
    pub fn clear_section(&mut self, section: RootSection) {
        self.sections[section.index()].clear();
    }

    /// Roots registered in `section`
    pub fn section(&self, section: RootSection) -> &[NamedRoot] {
        &self.sections[section.index()]
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(Vec::is_empty)
    }

    /// Hand every root to `acceptor`, one bracketed section at a time
    ///
    /// Sections are visited in [`RootSection::ALL`] order; empty ones are
    /// skipped. Returns the number of slots visited.
    pub fn visit(&mut self, acceptor: &mut dyn RootAcceptor) -> usize {
        let mut visited = 0;

        for section in RootSection::ALL {
            let roots = &mut self.sections[section.index()];
            if roots.is_empty() {
                continue;
            }

            with_root_section(acceptor, section, |acceptor| {
                for root in roots.iter_mut() {
                    root.slot.accept(acceptor, root.name.as_deref());
                }
            });
            visited += roots.len();
        }

        log::trace!("visited {} root slots", visited);
        visited
    }
}

impl Default for RootSet {
    fn default() -> Self {
        Self::new()
    }
}
