//! Configuration Module - Card Table Geometry
//!
//! Card size, segment size and heap alignment are fixed when a table is
//! built. The defaults match a 4MB segment with 512-byte cards and 8-byte
//! object alignment.

use crate::util::constants::MB;

/// Configuration for a card table covering one heap segment
///
/// # Examples
///
/// ```rust
/// use cardgc::CardTableConfig;
///
/// // Use default configuration
/// let config = CardTableConfig::default();
/// assert_eq!(config.card_size(), 512);
///
/// // Smaller cards for finer dirty tracking
/// let config = CardTableConfig {
///     card_size_log: 8,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTableConfig {
    /// Size of the covered heap segment in bytes
    ///
    /// Must be a non-zero multiple of the card size.
    /// Default: 4MB
    pub segment_size: usize,

    /// log2 of the card size in bytes
    ///
    /// Default: 9 (512-byte cards)
    pub card_size_log: u32,

    /// log2 of the minimum heap object alignment
    ///
    /// Crossing-map offsets are stored shifted right by this amount.
    /// Default: 3 (8-byte alignment)
    pub heap_align_log: u32,

    /// Run the boundary verifier before every dirty-card scan
    ///
    /// Default: false
    pub verify_before_scan: bool,

    /// Emit card table events to the console
    ///
    /// Default: false
    pub verbose: bool,
}

impl Default for CardTableConfig {
    fn default() -> Self {
        CardTableConfig {
            segment_size: 4 * MB,
            card_size_log: 9,
            heap_align_log: 3,
            verify_before_scan: false,
            verbose: false,
        }
    }
}

impl CardTableConfig {
    /// Card size in bytes
    #[inline]
    pub fn card_size(&self) -> usize {
        1usize << self.card_size_log
    }

    /// Minimum heap object alignment in bytes
    #[inline]
    pub fn heap_alignment(&self) -> usize {
        1usize << self.heap_align_log
    }

    /// Number of cards covering the segment
    #[inline]
    pub fn num_cards(&self) -> usize {
        self.segment_size >> self.card_size_log
    }

    /// Validate configuration
    ///
    /// The non-negative crossing-map encoding stores an offset of less than
    /// one card in alignment units inside an `i8`, so
    /// `card_size >> heap_align_log` may not exceed 128.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cardgc::CardTableConfig;
    ///
    /// let config = CardTableConfig {
    ///     segment_size: 0,  // Invalid!
    ///     ..Default::default()
    /// };
    ///
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heap_align_log > MAX_HEAP_ALIGN_LOG {
            return Err(ConfigError::InvalidAlignment(format!(
                "heap_align_log must be <= {}",
                MAX_HEAP_ALIGN_LOG
            )));
        }

        if self.card_size_log < self.heap_align_log || self.card_size_log > MAX_CARD_SIZE_LOG {
            return Err(ConfigError::InvalidCardSize(format!(
                "card_size_log must be between heap_align_log ({}) and {}",
                self.heap_align_log, MAX_CARD_SIZE_LOG
            )));
        }

        if self.card_size_log - self.heap_align_log > MAX_OFFSET_BITS {
            return Err(ConfigError::OffsetOverflow(format!(
                "card of {} bytes at {}-byte alignment needs offsets above {}",
                self.card_size(),
                self.heap_alignment(),
                1usize << MAX_OFFSET_BITS
            )));
        }

        if self.segment_size == 0 {
            return Err(ConfigError::InvalidSegmentSize(
                "segment_size must be > 0".to_string(),
            ));
        }

        if self.segment_size & (self.card_size() - 1) != 0 {
            return Err(ConfigError::InvalidSegmentSize(format!(
                "segment_size {} is not a multiple of the card size {}",
                self.segment_size,
                self.card_size()
            )));
        }

        Ok(())
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with environment variables:
    /// - CARDGC_SEGMENT_SIZE
    /// - CARDGC_CARD_SIZE_LOG
    /// - CARDGC_HEAP_ALIGN_LOG
    /// - CARDGC_VERIFY
    /// - CARDGC_VERBOSE
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CARDGC_SEGMENT_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                config.segment_size = size;
            }
        }

        if let Ok(val) = std::env::var("CARDGC_CARD_SIZE_LOG") {
            if let Ok(log) = val.parse::<u32>() {
                config.card_size_log = log;
            }
        }

        if let Ok(val) = std::env::var("CARDGC_HEAP_ALIGN_LOG") {
            if let Ok(log) = val.parse::<u32>() {
                config.heap_align_log = log;
            }
        }

        if let Ok(val) = std::env::var("CARDGC_VERIFY") {
            config.verify_before_scan = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("CARDGC_VERBOSE") {
            config.verbose = parse_flag(&val);
        }

        config
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid segment size: {0}")]
    InvalidSegmentSize(String),

    #[error("Invalid card size: {0}")]
    InvalidCardSize(String),

    #[error("Invalid heap alignment: {0}")]
    InvalidAlignment(String),

    #[error("Crossing-map offset overflow: {0}")]
    OffsetOverflow(String),
}

// ============================================================================
// CONSTANTS
// ============================================================================

/// Largest supported card: 64KB
const MAX_CARD_SIZE_LOG: u32 = 16;

const MAX_HEAP_ALIGN_LOG: u32 = 6;

/// A card of at most 128 alignment units keeps every intra-card offset
/// within `0..=127`.
const MAX_OFFSET_BITS: u32 = 7;
