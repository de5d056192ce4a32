//! Byte-order discipline: group swaps and unaligned-safe packed loads.
//!
//! Work-buffer groups have no alignment guarantee, so every multi-byte read
//! goes through `from_le_bytes` / `from_be_bytes` on a stack copy, never
//! through a pointer cast to a wider integer type.

use crate::types::Endianness;

/// Write `src` into `dst` with byte order reversed. Slices must be the same
/// length.
pub fn copy_swapped(dst: &mut [u8], src: &[u8]) {
    let len = src.len();
    for i in 0..len {
        dst[i] = src[len - i - 1];
    }
}

/// Reverse the byte order of every `width`-sized group in `buf`.
/// `buf.len()` must be a multiple of `width`.
pub fn swap_groups(buf: &mut [u8], width: usize) {
    for group in buf.chunks_exact_mut(width) {
        group.reverse();
    }
}

macro_rules! define_load {
    ($name:ident, $ty:ty, $width:expr) => {
        /// Load one group from the start of `src` under the given byte order.
        /// `Endianness::None` reads as host order.
        #[inline]
        pub fn $name(src: &[u8], endianness: Endianness) -> $ty {
            let mut bytes = [0u8; $width];
            bytes.copy_from_slice(&src[..$width]);
            match endianness {
                Endianness::Big => <$ty>::from_be_bytes(bytes),
                Endianness::Little => <$ty>::from_le_bytes(bytes),
                Endianness::None => <$ty>::from_ne_bytes(bytes),
            }
        }
    };
}

define_load!(load_u16, u16, 2);
define_load!(load_u32, u32, 4);
define_load!(load_u64, u64, 8);
