//! Acceptor Module - Heap slot visitation
//!
//! Collector passes (marking, promotion, compaction fixup, diagnostics) all
//! need to see every pointer-shaped slot of an object or root set. Object
//! and root traversal code is written once against these traits; each pass
//! supplies its own acceptor.
//!
//! # Trait Family
//!
//! ```text
//! SlotAcceptor          accept_raw / accept_based / accept_gc / accept_value
//!                       accept_symbol, accept_weak (default no-op)
//!      ▲
//!      │ blanket impl: unnamed call == named call with `None`
//!      │
//! NamedSlotAcceptor     accept_*_named(slot, name)
//!      ▲
//!      │
//! RootAcceptor          begin_root_section / end_root_section
//!
//! DroppingAcceptor<A>   RootAcceptor over any SlotAcceptor,
//!                       drops names and section brackets
//! ```
//!
//! Every slot is passed as `&mut`: an acceptor may rewrite it (compaction
//! fixup does), so callers must re-read the slot after the call.

pub mod dropping;
pub mod dump;
pub mod root;
pub mod slot;

pub use dropping::DroppingAcceptor;
pub use dump::{SlotDump, SlotRecord};
pub use root::{with_root_section, RootAcceptor, RootSection};
pub use slot::{BasedPointer, GcPointer, RawPointer, SlotKind, SymbolId, TaggedValue, ValueKind, WeakRef};

/// Minimal slot acceptor
///
/// # Example
///
/// ```rust
/// use cardgc::acceptor::{BasedPointer, GcPointer, RawPointer, SlotAcceptor, TaggedValue};
///
/// /// Collects every object address it sees
/// #[derive(Default)]
/// struct MarkSet(Vec<usize>);
///
/// impl SlotAcceptor for MarkSet {
///     fn accept_raw(&mut self, ptr: &mut RawPointer) {
///         self.0.push(ptr.address());
///     }
///     fn accept_based(&mut self, ptr: &mut BasedPointer) {
///         self.0.extend(ptr.resolve(0x1000));
///     }
///     fn accept_gc(&mut self, ptr: &mut GcPointer) {
///         self.0.extend(ptr.get());
///     }
///     fn accept_value(&mut self, value: &mut TaggedValue) {
///         self.0.extend(value.as_pointer());
///     }
/// }
///
/// let mut marks = MarkSet::default();
/// marks.accept_gc(&mut GcPointer::new(0x2000));
/// assert_eq!(marks.0, vec![0x2000]);
/// ```
pub trait SlotAcceptor {
    fn accept_raw(&mut self, ptr: &mut RawPointer);

    /// Pointer stored relative to a movable base
    fn accept_based(&mut self, ptr: &mut BasedPointer);

    /// Managed pointer; the collector may retarget it on move
    fn accept_gc(&mut self, ptr: &mut GcPointer);

    /// Tagged value that may or may not hold a pointer
    fn accept_value(&mut self, value: &mut TaggedValue);

    /// Symbol processing is a no-op for most acceptors
    fn accept_symbol(&mut self, _symbol: SymbolId) {}

    /// Weak reference processing is a no-op for most acceptors
    fn accept_weak(&mut self, _weak: &mut WeakRef) {}
}

/// Slot acceptor that also receives a human-readable slot name
///
/// Tooling uses the name to report e.g. "field `parent` of object X holds a
/// stale pointer". Every `NamedSlotAcceptor` is a [`SlotAcceptor`]: unnamed
/// calls arrive here with `name == None`.
pub trait NamedSlotAcceptor {
    fn accept_raw_named(&mut self, ptr: &mut RawPointer, name: Option<&str>);

    fn accept_based_named(&mut self, ptr: &mut BasedPointer, name: Option<&str>);

    fn accept_gc_named(&mut self, ptr: &mut GcPointer, name: Option<&str>);

    fn accept_value_named(&mut self, value: &mut TaggedValue, name: Option<&str>);

    fn accept_symbol_named(&mut self, _symbol: SymbolId, _name: Option<&str>) {}

    fn accept_weak_named(&mut self, _weak: &mut WeakRef, _name: Option<&str>) {}
}

impl<T: NamedSlotAcceptor + ?Sized> SlotAcceptor for T {
    #[inline]
    fn accept_raw(&mut self, ptr: &mut RawPointer) {
        self.accept_raw_named(ptr, None);
    }

    #[inline]
    fn accept_based(&mut self, ptr: &mut BasedPointer) {
        self.accept_based_named(ptr, None);
    }

    #[inline]
    fn accept_gc(&mut self, ptr: &mut GcPointer) {
        self.accept_gc_named(ptr, None);
    }

    #[inline]
    fn accept_value(&mut self, value: &mut TaggedValue) {
        self.accept_value_named(value, None);
    }

    #[inline]
    fn accept_symbol(&mut self, symbol: SymbolId) {
        self.accept_symbol_named(symbol, None);
    }

    #[inline]
    fn accept_weak(&mut self, weak: &mut WeakRef) {
        self.accept_weak_named(weak, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Named acceptor that remembers the names it was given
    #[derive(Default)]
    struct Names(Vec<Option<String>>);

    impl NamedSlotAcceptor for Names {
        fn accept_raw_named(&mut self, _ptr: &mut RawPointer, name: Option<&str>) {
            self.0.push(name.map(str::to_string));
        }
        fn accept_based_named(&mut self, _ptr: &mut BasedPointer, name: Option<&str>) {
            self.0.push(name.map(str::to_string));
        }
        fn accept_gc_named(&mut self, ptr: &mut GcPointer, name: Option<&str>) {
            ptr.set(ptr.address() + 0x100);
            self.0.push(name.map(str::to_string));
        }
        fn accept_value_named(&mut self, _value: &mut TaggedValue, name: Option<&str>) {
            self.0.push(name.map(str::to_string));
        }
    }

    #[test]
    fn test_unnamed_calls_route_with_no_name() {
        let mut names = Names::default();
        names.accept_raw(&mut RawPointer::new(8));
        names.accept_value_named(&mut TaggedValue::NULL, Some("proto"));
        names.accept_value(&mut TaggedValue::NULL);
        assert_eq!(names.0, vec![None, Some("proto".to_string()), None]);
    }

    #[test]
    fn test_symbol_and_weak_default_to_noop() {
        let mut names = Names::default();
        names.accept_symbol(SymbolId::new(3));
        names.accept_weak(&mut WeakRef::new(0x40));
        assert!(names.0.is_empty());
    }

    #[test]
    fn test_acceptor_may_rewrite_slot() {
        let mut names = Names::default();
        let mut ptr = GcPointer::new(0x1000);
        names.accept_gc(&mut ptr);
        assert_eq!(ptr.address(), 0x1100);
    }

    #[test]
    fn test_trait_object_is_slot_acceptor() {
        let mut names = Names::default();
        let acceptor: &mut dyn NamedSlotAcceptor = &mut names;
        acceptor.accept_gc(&mut GcPointer::new(0x10));
        assert_eq!(names.0.len(), 1);
    }
}
