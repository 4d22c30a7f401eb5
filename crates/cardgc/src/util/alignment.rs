//! Alignment Utilities
//!
//! Helper functions for power-of-two alignment of heap addresses.

/// Alignment - utility for alignment operations
pub struct Alignment;

impl Alignment {
    /// Align value up to boundary
    ///
    /// # Examples
    /// ```
    /// use cardgc::util::Alignment;
    ///
    /// assert_eq!(Alignment::align_up(100, 8), 104);
    /// assert_eq!(Alignment::align_up(64, 8), 64);
    /// ```
    #[inline]
    pub fn align_up(value: usize, alignment: usize) -> usize {
        debug_assert!(alignment.is_power_of_two());
        (value + alignment - 1) & !(alignment - 1)
    }

    /// Check if value is aligned
    #[inline]
    pub fn is_aligned(value: usize, alignment: usize) -> bool {
        value & (alignment - 1) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(Alignment::align_up(0, 512), 0);
        assert_eq!(Alignment::align_up(1, 512), 512);
        assert_eq!(Alignment::align_up(512, 512), 512);
    }

    #[test]
    fn test_is_aligned() {
        assert!(Alignment::is_aligned(4096, 8));
        assert!(!Alignment::is_aligned(4097, 8));
    }
}
