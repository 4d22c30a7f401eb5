//! Util Module - Shared Utilities

pub mod alignment;

pub use alignment::Alignment;

/// Debug formatter for heap addresses
pub fn format_address(address: usize) -> String {
    format!("0x{:016X}", address)
}

/// Constants for cardgc
pub mod constants {
    /// 1 Megabyte
    pub const MB: usize = 1024 * 1024;
}
