//! Error Module - cardgc Error Types
//!
//! Defines the error types returned by the fallible parts of cardgc.
//!
//! Hot-path card operations (write barrier, crossing-map updates, dirty scans)
//! never return errors: their preconditions are programming invariants checked
//! with `debug_assert!`. Errors only surface from construction, configuration
//! and the diagnostic verifier.
//!
//! # Error Categories
//!
//! ## Construction Errors
//! - `Configuration` - Invalid card table configuration
//! - `Misaligned` - Segment base not card aligned
//! - `OutOfSegment` - Segment wraps the address space
//!
//! ## Diagnostic Errors
//! - `OutOfSegment` - Verification range outside the covered segment
//! - `BoundaryBroken` - Crossing map resolves to the wrong object

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for cardgc operations
///
/// # Examples
///
/// ```rust
/// use cardgc::CardError;
///
/// fn describe(err: &CardError) -> &'static str {
///     match err {
///         CardError::BoundaryBroken { .. } => "crossing map corrupted",
///         CardError::Configuration(_) => "bad configuration",
///         _ => "other",
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum CardError {
    /// Configuration error
    ///
    /// **When returned:** `CardTableConfig::validate` rejected the config
    ///
    /// **Recovery strategy:** Use default configuration or fail fast
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Alignment error
    ///
    /// **When returned:** Segment base or verification start is not card aligned
    #[error("Alignment error: address {address:#x} is not aligned to {alignment} bytes")]
    Misaligned { address: usize, alignment: usize },

    /// Address outside the segment
    ///
    /// **When returned:** `CardTable::new` for a segment that would wrap the
    /// address space (`end` is then `usize::MAX`), or
    /// `CardTable::check_boundaries` for a start or level outside `[base, end]`
    #[error("Address {address:#x} outside segment [{base:#x}, {end:#x}]")]
    OutOfSegment {
        address: usize,
        base: usize,
        end: usize,
    },

    /// Crossing map yields an object that does not straddle the card
    ///
    /// **When returned:** `CardTable::check_boundaries` found a broken card
    ///
    /// **Recovery strategy:** Cannot recover - heap metadata is corrupt
    #[error("Card {index} boundary broken at {address:#x}: {reason}")]
    BoundaryBroken {
        index: usize,
        address: usize,
        reason: String,
    },
}

impl CardError {
    /// Check if this error indicates a bug in the heap metadata or its caller
    pub fn is_bug(&self) -> bool {
        matches!(
            self,
            CardError::BoundaryBroken { .. } | CardError::OutOfSegment { .. }
        )
    }
}

/// Result type alias for cardgc operations
pub type Result<T> = std::result::Result<T, CardError>;

/// Assertion with context, compiled into every build profile
///
/// Used by the diagnostic verifier, whose failures are fatal by contract.
#[macro_export]
macro_rules! assert_context {
    ($cond:expr, $context:expr) => {
        if !$cond {
            panic!("Assertion failed at {}: {}", stringify!($cond), $context);
        }
    };
    ($cond:expr, $context:expr, $($arg:tt)*) => {
        if !$cond {
            panic!("Assertion failed at {}: {}", stringify!($cond), format!($context, $($arg)*));
        }
    };
}
