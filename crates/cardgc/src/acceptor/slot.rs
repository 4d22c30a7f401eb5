//! Slot Types - The pointer-shaped fields an acceptor can visit
//!
//! ```text
//! RawPointer    absolute address, not relocated by the collector's tables
//! BasedPointer  32-bit offset from a movable base (0 = null)
//! GcPointer     managed pointer the collector updates on move
//! TaggedValue   64-bit word, low 3 bits = tag
//! SymbolId      interned symbol index
//! WeakRef       clearable weak slot
//! ```
//!
//! TaggedValue layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┬─────┐
//! │                 payload (61 bits)            │ tag │
//! │                 63 - 3                       │ 2-0 │
//! └──────────────────────────────────────────────┴─────┘
//!
//! tag 000  object pointer (8-byte aligned address, payload != 0)
//! tag 001  small integer  (payload << 3, sign preserved)
//! tag 010  boolean
//! tag 011  undefined / null (payload 0 / 1)
//! tag 100  symbol id
//! ```

use serde::Serialize;

/// Untracked absolute address held in a slot
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawPointer(usize);

impl RawPointer {
    pub const NULL: RawPointer = RawPointer(0);

    pub fn new(address: usize) -> Self {
        Self(address)
    }

    pub fn address(&self) -> usize {
        self.0
    }

    pub fn set(&mut self, address: usize) {
        self.0 = address;
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Pointer stored as an offset from a movable base
///
/// Stays valid when the whole region moves; only the base changes.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BasedPointer(u32);

impl BasedPointer {
    pub const NULL: BasedPointer = BasedPointer(0);

    pub fn from_offset(offset: u32) -> Self {
        Self(offset)
    }

    pub fn offset(&self) -> u32 {
        self.0
    }

    pub fn set_offset(&mut self, offset: u32) {
        self.0 = offset;
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Absolute address relative to `base`, or `None` for null
    pub fn resolve(&self, base: usize) -> Option<usize> {
        if self.is_null() {
            None
        } else {
            Some(base + self.0 as usize)
        }
    }
}

/// Managed pointer the collector must update when its target moves
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GcPointer(usize);

impl GcPointer {
    pub const NULL: GcPointer = GcPointer(0);

    pub fn new(address: usize) -> Self {
        Self(address)
    }

    pub fn get(&self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0)
        }
    }

    pub fn address(&self) -> usize {
        self.0
    }

    pub fn set(&mut self, address: usize) {
        self.0 = address;
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Interned symbol identifier
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

/// Decoded view of a [`TaggedValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Pointer(usize),
    Int(i64),
    Bool(bool),
    Undefined,
    Null,
    Symbol(SymbolId),
}

/// 64-bit word that may or may not hold an object pointer
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaggedValue(u64);

impl TaggedValue {
    pub const TAG_BITS: u32 = 3;
    pub const TAG_MASK: u64 = (1 << Self::TAG_BITS) - 1;

    const TAG_POINTER: u64 = 0b000;
    const TAG_INT: u64 = 0b001;
    const TAG_BOOL: u64 = 0b010;
    const TAG_SPECIAL: u64 = 0b011;
    const TAG_SYMBOL: u64 = 0b100;

    pub const UNDEFINED: TaggedValue = TaggedValue(Self::TAG_SPECIAL);
    pub const NULL: TaggedValue = TaggedValue((1 << Self::TAG_BITS) | Self::TAG_SPECIAL);

    /// Encode an object pointer (must be 8-byte aligned and non-null)
    pub fn from_pointer(address: usize) -> Self {
        debug_assert!(address != 0, "null is encoded as TaggedValue::NULL");
        debug_assert!(
            address as u64 & Self::TAG_MASK == 0,
            "pointer {:#x} not aligned for tagging",
            address
        );
        Self(address as u64)
    }

    /// Encode a 61-bit signed integer
    pub fn from_int(value: i64) -> Self {
        Self(((value << Self::TAG_BITS) as u64) | Self::TAG_INT)
    }

    pub fn from_bool(value: bool) -> Self {
        Self(((value as u64) << Self::TAG_BITS) | Self::TAG_BOOL)
    }

    pub fn from_symbol(symbol: SymbolId) -> Self {
        Self(((symbol.index() as u64) << Self::TAG_BITS) | Self::TAG_SYMBOL)
    }

    /// Raw encoded bits
    pub fn raw(&self) -> u64 {
        self.0
    }

    #[inline]
    fn tag(&self) -> u64 {
        self.0 & Self::TAG_MASK
    }

    /// Check if this value refers to a heap object
    #[inline]
    pub fn is_pointer(&self) -> bool {
        self.tag() == Self::TAG_POINTER && self.0 != 0
    }

    pub fn as_pointer(&self) -> Option<usize> {
        if self.is_pointer() {
            Some(self.0 as usize)
        } else {
            None
        }
    }

    /// Retarget a pointer value, e.g. after its object moved
    pub fn update_pointer(&mut self, address: usize) {
        debug_assert!(self.is_pointer(), "updating a non-pointer value");
        *self = Self::from_pointer(address);
    }

    pub fn as_symbol(&self) -> Option<SymbolId> {
        match self.kind() {
            ValueKind::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        let payload = self.0 >> Self::TAG_BITS;
        match self.tag() {
            Self::TAG_POINTER if self.0 != 0 => ValueKind::Pointer(self.0 as usize),
            Self::TAG_INT => ValueKind::Int((self.0 as i64) >> Self::TAG_BITS),
            Self::TAG_BOOL => ValueKind::Bool(payload != 0),
            Self::TAG_SYMBOL => ValueKind::Symbol(SymbolId::new(payload as u32)),
            Self::TAG_SPECIAL if payload == 1 => ValueKind::Null,
            _ => ValueKind::Undefined,
        }
    }
}

impl Default for TaggedValue {
    fn default() -> Self {
        Self::UNDEFINED
    }
}

impl std::fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            ValueKind::Pointer(address) => write!(f, "object@{:#x}", address),
            ValueKind::Int(value) => write!(f, "{}", value),
            ValueKind::Bool(value) => write!(f, "{}", value),
            ValueKind::Undefined => write!(f, "undefined"),
            ValueKind::Null => write!(f, "null"),
            ValueKind::Symbol(symbol) => write!(f, "symbol#{}", symbol.index()),
        }
    }
}

/// Weak slot: does not keep its target alive and may be cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeakRef {
    target: Option<usize>,
}

impl WeakRef {
    pub fn new(target: usize) -> Self {
        Self {
            target: Some(target),
        }
    }

    pub fn get(&self) -> Option<usize> {
        self.target
    }

    pub fn set(&mut self, target: usize) {
        self.target = Some(target);
    }

    pub fn clear(&mut self) {
        self.target = None;
    }

    pub fn is_cleared(&self) -> bool {
        self.target.is_none()
    }
}

/// Kind tag for reporting which slot type an acceptor received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlotKind {
    Raw,
    Based,
    Gc,
    Value,
    Symbol,
    Weak,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_pointer_roundtrip_and_update() {
        let mut value = TaggedValue::from_pointer(0x7F00_1230);
        assert!(value.is_pointer());
        assert_eq!(value.as_pointer(), Some(0x7F00_1230));

        value.update_pointer(0x7F00_4000);
        assert_eq!(value.kind(), ValueKind::Pointer(0x7F00_4000));
    }

    #[test]
    fn test_tagged_non_pointers() {
        assert_eq!(TaggedValue::from_int(-42).kind(), ValueKind::Int(-42));
        assert_eq!(TaggedValue::from_bool(true).kind(), ValueKind::Bool(true));
        assert_eq!(TaggedValue::UNDEFINED.kind(), ValueKind::Undefined);
        assert_eq!(TaggedValue::NULL.kind(), ValueKind::Null);
        assert!(!TaggedValue::NULL.is_pointer());
        assert!(!TaggedValue::from_int(8).is_pointer());

        let symbol = TaggedValue::from_symbol(SymbolId::new(17));
        assert_eq!(symbol.as_symbol(), Some(SymbolId::new(17)));
        assert_eq!(symbol.to_string(), "symbol#17");
    }

    #[test]
    fn test_based_pointer_resolve() {
        assert_eq!(BasedPointer::NULL.resolve(0x1000), None);
        assert_eq!(BasedPointer::from_offset(0x40).resolve(0x1000), Some(0x1040));
    }

    #[test]
    fn test_weak_ref_clear() {
        let mut weak = WeakRef::new(0x5000);
        assert_eq!(weak.get(), Some(0x5000));
        weak.clear();
        assert!(weak.is_cleared());
    }
}
