//! Bit-level key handling for `f64` keys.
//!
//! Keys are stored and compared by their raw IEEE-754 bit pattern rather than
//! by `==`. Two consequences follow:
//!
//! - every NaN payload collapses to [`CANONICAL_NAN`] before it reaches the
//!   table, so a set holds at most one NaN;
//! - `+0.0` and `-0.0` have different patterns and stay distinct keys.

/// The single NaN pattern stored for every NaN key.
///
/// This is the quiet NaN with an empty payload. Which pattern is retained is
/// not part of the public contract, only that there is exactly one.
pub const CANONICAL_NAN: u64 = 0x7ff8_0000_0000_0000;

/// Pattern reserved for empty slots. It is also the pattern of `+0.0`, which
/// the table tracks with a separate flag.
pub(crate) const EMPTY: u64 = 0;

/// Returns the pattern under which `value` is stored.
///
/// # Examples
///
/// ```rust
/// use f64_hash_set::bits::canonical_bits;
///
/// let quiet = f64::NAN;
/// let payload = f64::from_bits(0x7ff0_0000_0000_0001);
/// assert_eq!(canonical_bits(quiet), canonical_bits(payload));
/// assert_ne!(canonical_bits(0.0), canonical_bits(-0.0));
/// ```
#[inline(always)]
pub fn canonical_bits(value: f64) -> u64 {
    if value.is_nan() {
        CANONICAL_NAN
    } else {
        value.to_bits()
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// 2^64 divided by the golden ratio, rounded to odd.
        const SEED: u64 = 0x9e37_79b9_7f4a_7c15;

        /// Scrambles a key pattern so that its low bits can be used as a slot
        /// index.
        #[inline(always)]
        pub(crate) fn mix(bits: u64) -> u64 {
            use core::hash::BuildHasher;

            foldhash::fast::FixedState::with_seed(SEED).hash_one(bits)
        }
    } else {
        /// Scrambles a key pattern so that its low bits can be used as a slot
        /// index.
        ///
        /// This is the murmur3 64-bit finalizer. Every output bit depends on
        /// every input bit, so keys that differ only in the exponent (powers
        /// of two, infinities) still spread over the low bits.
        #[inline(always)]
        pub(crate) fn mix(bits: u64) -> u64 {
            let mut h = bits;
            h ^= h >> 33;
            h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
            h ^= h >> 33;
            h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
            h ^ (h >> 33)
        }
    }
}
