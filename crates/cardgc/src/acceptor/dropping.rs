//! Dropping Acceptor - Drive a minimal acceptor through the rich interface
//!
//! Most collector code is written against [`RootAcceptor`]. Simple passes
//! (a bare mark-set builder, a pointer counter) only implement
//! [`SlotAcceptor`]. `DroppingAcceptor` bridges the two: names are dropped,
//! section brackets are swallowed, and every slot reaches the wrapped
//! acceptor's unnamed method unchanged.

use super::root::RootAcceptor;
use super::slot::{BasedPointer, GcPointer, RawPointer, SymbolId, TaggedValue, WeakRef};
use super::{NamedSlotAcceptor, SlotAcceptor};

/// [`RootAcceptor`] adapter over any [`SlotAcceptor`]
///
/// # Example
///
/// ```rust
/// use cardgc::acceptor::{
///     BasedPointer, DroppingAcceptor, GcPointer, NamedSlotAcceptor, RawPointer, RootAcceptor,
///     RootSection, SlotAcceptor, TaggedValue,
/// };
///
/// #[derive(Default)]
/// struct Count(usize);
///
/// impl SlotAcceptor for Count {
///     fn accept_raw(&mut self, _: &mut RawPointer) { self.0 += 1; }
///     fn accept_based(&mut self, _: &mut BasedPointer) { self.0 += 1; }
///     fn accept_gc(&mut self, _: &mut GcPointer) { self.0 += 1; }
///     fn accept_value(&mut self, _: &mut TaggedValue) { self.0 += 1; }
/// }
///
/// let mut count = Count::default();
/// let mut roots = DroppingAcceptor::new(&mut count);
/// roots.begin_root_section(RootSection::Globals);
/// roots.accept_gc_named(&mut GcPointer::new(0x80), Some("global"));
/// roots.end_root_section();
/// assert_eq!(count.0, 1);
/// ```
pub struct DroppingAcceptor<'a, A: SlotAcceptor + ?Sized> {
    acceptor: &'a mut A,
}

impl<'a, A: SlotAcceptor + ?Sized> DroppingAcceptor<'a, A> {
    pub fn new(acceptor: &'a mut A) -> Self {
        Self { acceptor }
    }

    /// The wrapped acceptor
    pub fn inner(&mut self) -> &mut A {
        self.acceptor
    }
}

impl<A: SlotAcceptor + ?Sized> NamedSlotAcceptor for DroppingAcceptor<'_, A> {
    #[inline]
    fn accept_raw_named(&mut self, ptr: &mut RawPointer, _name: Option<&str>) {
        self.acceptor.accept_raw(ptr);
    }

    #[inline]
    fn accept_based_named(&mut self, ptr: &mut BasedPointer, _name: Option<&str>) {
        self.acceptor.accept_based(ptr);
    }

    #[inline]
    fn accept_gc_named(&mut self, ptr: &mut GcPointer, _name: Option<&str>) {
        self.acceptor.accept_gc(ptr);
    }

    #[inline]
    fn accept_value_named(&mut self, value: &mut TaggedValue, _name: Option<&str>) {
        self.acceptor.accept_value(value);
    }

    #[inline]
    fn accept_symbol_named(&mut self, symbol: SymbolId, _name: Option<&str>) {
        self.acceptor.accept_symbol(symbol);
    }

    #[inline]
    fn accept_weak_named(&mut self, weak: &mut WeakRef, _name: Option<&str>) {
        self.acceptor.accept_weak(weak);
    }
}

impl<A: SlotAcceptor + ?Sized> RootAcceptor for DroppingAcceptor<'_, A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acceptor::{with_root_section, RootSection};

    /// Minimal acceptor that forwards every object 0x1000 bytes down
    struct Forwarder {
        symbols: Vec<SymbolId>,
        weak_seen: usize,
    }

    impl SlotAcceptor for Forwarder {
        fn accept_raw(&mut self, ptr: &mut RawPointer) {
            ptr.set(ptr.address() - 0x1000);
        }
        fn accept_based(&mut self, ptr: &mut BasedPointer) {
            ptr.set_offset(ptr.offset() - 0x100);
        }
        fn accept_gc(&mut self, ptr: &mut GcPointer) {
            ptr.set(ptr.address() - 0x1000);
        }
        fn accept_value(&mut self, value: &mut TaggedValue) {
            if let Some(address) = value.as_pointer() {
                value.update_pointer(address - 0x1000);
            }
        }
        fn accept_symbol(&mut self, symbol: SymbolId) {
            self.symbols.push(symbol);
        }
        fn accept_weak(&mut self, _weak: &mut WeakRef) {
            self.weak_seen += 1;
        }
    }

    #[test]
    fn test_rewrites_reach_caller_slots() {
        let mut forwarder = Forwarder {
            symbols: Vec::new(),
            weak_seen: 0,
        };
        let mut raw = RawPointer::new(0x5000);
        let mut based = BasedPointer::from_offset(0x300);
        let mut gc = GcPointer::new(0x6000);
        let mut value = TaggedValue::from_pointer(0x7000);
        let mut weak = WeakRef::new(0x8000);

        let mut roots = DroppingAcceptor::new(&mut forwarder);
        with_root_section(&mut roots, RootSection::Registers, |acceptor| {
            acceptor.accept_raw_named(&mut raw, Some("r0"));
            acceptor.accept_based_named(&mut based, Some("r1"));
            acceptor.accept_gc_named(&mut gc, None);
            acceptor.accept_value_named(&mut value, Some("r3"));
            acceptor.accept_symbol_named(SymbolId::new(9), Some("r4"));
            acceptor.accept_weak_named(&mut weak, Some("r5"));
        });

        assert_eq!(raw.address(), 0x4000);
        assert_eq!(based.offset(), 0x200);
        assert_eq!(gc.address(), 0x5000);
        assert_eq!(value.as_pointer(), Some(0x6000));
        assert_eq!(forwarder.symbols, vec![SymbolId::new(9)]);
        assert_eq!(forwarder.weak_seen, 1);
    }

    #[test]
    fn test_wraps_trait_objects() {
        let mut forwarder = Forwarder {
            symbols: Vec::new(),
            weak_seen: 0,
        };
        let inner: &mut dyn SlotAcceptor = &mut forwarder;
        let mut roots = DroppingAcceptor::new(inner);
        roots.accept_symbol(SymbolId::new(1));
        roots.inner().accept_symbol(SymbolId::new(2));
        assert_eq!(forwarder.symbols, vec![SymbolId::new(1), SymbolId::new(2)]);
    }
}
