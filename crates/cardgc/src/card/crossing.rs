//! Crossing Map Encoding
//!
//! One signed byte per card describes where the first object overlapping the
//! card begins.
//!
//! ```text
//! entry >= 0   object starts at card_start - (entry << heap_align_log)
//! entry <  0   entry == -(e + 1): consult card (index - 2^e) instead
//! ```
//!
//! For an object whose first crossed boundary is card `k`, the cards after
//! `k` are written on a doubling schedule:
//!
//! ```text
//! card     k    k+1   k+2 k+3   k+4 .. k+7   k+8 .. k+15
//! entry   off   -1    -2  -2    -3  .. -3    -4  .. -4
//! jump     -     1     2   2     4  ..  4     8  ..  8
//! ```
//!
//! Every jump lands on a card in `[k, current)`, so a lookup on an object
//! spanning `n` cards reads at most `log2(n) + 1` entries.

/// Encode a backward-jump exponent `e` (jump of `2^e` cards)
#[inline]
pub const fn encode_exp(exp: i8) -> i8 {
    -(exp + 1)
}

/// Decode the exponent of a negative crossing-map entry
#[inline]
pub const fn decode_exp(entry: i8) -> u32 {
    (-(entry as i32) - 1) as u32
}

/// Number of cards a negative entry jumps backward
#[inline]
pub const fn jump_distance(entry: i8) -> usize {
    1usize << decode_exp(entry)
}

/// Doubling schedule for the negative entries of one object
///
/// Yields `e=0` once, `e=1` twice, `e=2` four times, and so on.
#[derive(Debug, Clone)]
pub(crate) struct ExpSchedule {
    exp: i8,
    run_length: u64,
    written: u64,
}

impl ExpSchedule {
    pub(crate) fn new() -> Self {
        Self {
            exp: 0,
            run_length: 1,
            written: 0,
        }
    }
}

impl Iterator for ExpSchedule {
    type Item = i8;

    fn next(&mut self) -> Option<i8> {
        let exp = self.exp;
        self.written += 1;
        if self.written == self.run_length {
            self.written = 0;
            // 63 doublings already exceed any addressable segment
            debug_assert!(self.exp < 63, "crossing-map exponent overflow");
            self.exp += 1;
            self.run_length *= 2;
        }
        Some(exp)
    }
}
