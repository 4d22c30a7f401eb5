//! Root Acceptor - Sectioned root-set traversal
//!
//! Root traversal visits roots grouped by where they come from. Acceptors
//! producing categorized reports (heap snapshots, root dumps) override the
//! section brackets; everyone else inherits the no-op defaults.
//!
//! Contract: `begin_root_section` and `end_root_section` are always paired
//! and never nested within one traversal. [`with_root_section`] enforces the
//! pairing for closures.

use super::NamedSlotAcceptor;
use serde::Serialize;

/// Logical category of a root group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RootSection {
    /// Interpreter registers and stack slots
    Registers,
    /// Global object and other runtime instance variables
    Globals,
    /// Code blocks and module-level tables
    RuntimeModules,
    /// Builtin prototypes
    Prototypes,
    /// Preallocated string primitives
    StringPrimitives,
    /// Identifier (symbol) table
    IdentifierTable,
    /// Native handle scopes
    HandleScopes,
    /// Registered symbol-for table
    SymbolRegistry,
    /// Weak root slots
    WeakRoots,
    /// Embedder-registered custom roots
    Custom,
}

impl RootSection {
    /// Every section, in traversal order
    pub const ALL: [RootSection; 10] = [
        RootSection::Registers,
        RootSection::Globals,
        RootSection::RuntimeModules,
        RootSection::Prototypes,
        RootSection::StringPrimitives,
        RootSection::IdentifierTable,
        RootSection::HandleScopes,
        RootSection::SymbolRegistry,
        RootSection::WeakRoots,
        RootSection::Custom,
    ];

    /// Number of sections
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this section in [`RootSection::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            RootSection::Registers => "Registers",
            RootSection::Globals => "Globals",
            RootSection::RuntimeModules => "RuntimeModules",
            RootSection::Prototypes => "Prototypes",
            RootSection::StringPrimitives => "StringPrimitives",
            RootSection::IdentifierTable => "IdentifierTable",
            RootSection::HandleScopes => "HandleScopes",
            RootSection::SymbolRegistry => "SymbolRegistry",
            RootSection::WeakRoots => "WeakRoots",
            RootSection::Custom => "Custom",
        }
    }
}

impl std::fmt::Display for RootSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Named acceptor used for root-set traversal
pub trait RootAcceptor: NamedSlotAcceptor {
    fn begin_root_section(&mut self, _section: RootSection) {}

    fn end_root_section(&mut self) {}
}

/// Run `f` between a paired `begin_root_section` / `end_root_section`
///
/// # Example
///
/// ```rust
/// use cardgc::acceptor::{with_root_section, GcPointer, NamedSlotAcceptor, RootSection, SlotDump};
///
/// let mut dump = SlotDump::new();
/// let mut global = GcPointer::new(0x4000);
/// with_root_section(&mut dump, RootSection::Globals, |acceptor| {
///     acceptor.accept_gc_named(&mut global, Some("global"));
/// });
/// assert_eq!(dump.records().len(), 1);
/// ```
pub fn with_root_section<A, R, F>(acceptor: &mut A, section: RootSection, f: F) -> R
where
    A: RootAcceptor + ?Sized,
    F: FnOnce(&mut A) -> R,
{
    acceptor.begin_root_section(section);
    let result = f(acceptor);
    acceptor.end_root_section();
    result
}
