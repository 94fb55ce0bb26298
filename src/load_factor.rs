use crate::error::Error;

/// Smallest number of slots a table ever allocates.
pub const MIN_CAPACITY: usize = 2;

/// Number of slots allocated by [`HashTable::new`](crate::HashTable::new).
pub const DEFAULT_CAPACITY: usize = 16;

/// Largest number of slots a table may allocate. Kept well below the point
/// where the slot array's byte size would overflow `isize`.
pub const MAX_CAPACITY: usize = 1 << (usize::BITS - 5);

/// The fraction of slots a table may fill before it grows.
///
/// Always strictly between zero and one. Lower values trade memory for
/// shorter probe sequences.
///
/// # Examples
///
/// ```rust
/// use f64_hash_set::LoadFactor;
///
/// assert!(LoadFactor::new(0.6).is_ok());
/// assert!(LoadFactor::new(1.0).is_err());
/// assert!(LoadFactor::new(f64::NAN).is_err());
/// assert_eq!(LoadFactor::default(), LoadFactor::DEFAULT);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct LoadFactor(f64);

impl LoadFactor {
    /// The default load factor, `0.75`.
    pub const DEFAULT: Self = Self(0.75);
    /// A load factor for faster lookups at twice the memory, `0.5`.
    pub const FAST: Self = Self(0.5);
    /// A load factor for the fastest lookups at four times the memory,
    /// `0.25`.
    pub const VERY_FAST: Self = Self(0.25);

    /// Validates `value` as a load factor.
    ///
    /// Returns [`Error::InvalidLoadFactor`] unless `0 < value < 1`.
    pub fn new(value: f64) -> Result<Self, Error> {
        if value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            log::debug!("rejecting load factor {value}");
            Err(Error::InvalidLoadFactor(value))
        }
    }

    /// Returns the load factor as a plain `f64`.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Largest number of keys a table of `capacity` slots holds before it
    /// must grow. Never more than `capacity - 1`, so at least one slot stays
    /// empty and every probe sequence terminates.
    #[inline]
    pub(crate) fn max_fill(self, capacity: usize) -> usize {
        let fill = (capacity as f64 * self.0) as usize;
        fill.min(capacity - 1)
    }

    /// Smallest power-of-two capacity whose [`max_fill`](Self::max_fill) is at
    /// least `expected`, or `None` if that exceeds [`MAX_CAPACITY`].
    pub(crate) fn capacity_for(self, expected: usize) -> Option<usize> {
        let quotient = expected as f64 / self.0;
        if quotient > MAX_CAPACITY as f64 {
            return None;
        }
        // `f64::ceil` needs std.
        let whole = quotient as usize;
        let needed = if (whole as f64) < quotient { whole + 1 } else { whole };

        let mut capacity = needed.max(MIN_CAPACITY).next_power_of_two();
        // Float rounding in the division can leave us one doubling short.
        while self.max_fill(capacity) < expected {
            if capacity >= MAX_CAPACITY {
                return None;
            }
            capacity *= 2;
        }
        Some(capacity)
    }
}

impl Default for LoadFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for LoadFactor {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        for value in [
            0.0,
            -0.0,
            1.0,
            -0.5,
            1.5,
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
        ] {
            match LoadFactor::new(value) {
                Err(Error::InvalidLoadFactor(v)) => {
                    assert_eq!(v.to_bits(), value.to_bits())
                }
                other => panic!("{value} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn accepts_open_interval() {
        for value in [f64::MIN_POSITIVE, 0.01, 0.5, 0.75, 0.999_999] {
            assert_eq!(LoadFactor::new(value).map(LoadFactor::get), Ok(value));
        }
        assert_eq!(LoadFactor::try_from(0.25), Ok(LoadFactor::VERY_FAST));
    }

    #[test]
    fn max_fill_keeps_a_free_slot() {
        assert_eq!(LoadFactor::DEFAULT.max_fill(16), 12);
        assert_eq!(LoadFactor::DEFAULT.max_fill(2), 1);
        assert_eq!(LoadFactor::FAST.max_fill(2), 1);
        let nearly_full = LoadFactor::new(0.999_999).unwrap();
        assert_eq!(nearly_full.max_fill(4), 3);
        assert_eq!(nearly_full.max_fill(2), 1);
    }

    #[test]
    fn capacity_for_is_power_of_two_and_sufficient() {
        for lf in [
            LoadFactor::VERY_FAST,
            LoadFactor::FAST,
            LoadFactor::DEFAULT,
            LoadFactor::new(0.1).unwrap(),
            LoadFactor::new(0.9).unwrap(),
        ] {
            for expected in 0..2000 {
                let capacity = lf.capacity_for(expected).unwrap();
                assert!(capacity.is_power_of_two());
                assert!(capacity >= MIN_CAPACITY);
                assert!(lf.max_fill(capacity) >= expected);
                assert!((expected as f64) <= capacity as f64 * lf.get());
                if capacity > MIN_CAPACITY {
                    assert!(
                        lf.max_fill(capacity / 2) < expected,
                        "{expected} at {lf:?} could fit in {}",
                        capacity / 2
                    );
                }
            }
        }
    }

    #[test]
    fn capacity_for_known_values() {
        assert_eq!(LoadFactor::DEFAULT.capacity_for(0), Some(2));
        assert_eq!(LoadFactor::DEFAULT.capacity_for(12), Some(16));
        assert_eq!(LoadFactor::DEFAULT.capacity_for(13), Some(32));
        assert_eq!(LoadFactor::FAST.capacity_for(8), Some(16));
    }

    #[test]
    fn capacity_for_rounds_quotient_up() {
        // 6 / 0.75 is exactly 8; 7 / 0.75 is 9.33 and needs the next power.
        assert_eq!(LoadFactor::DEFAULT.capacity_for(6), Some(8));
        assert_eq!(LoadFactor::DEFAULT.capacity_for(7), Some(16));
        assert_eq!(LoadFactor::FAST.capacity_for(1), Some(2));
        assert_eq!(LoadFactor::VERY_FAST.capacity_for(3), Some(16));
        let tenth = LoadFactor::new(0.1).unwrap();
        assert_eq!(tenth.capacity_for(3), Some(32));
        assert_eq!(tenth.capacity_for(6), Some(64));
    }

    #[test]
    fn capacity_for_overflows() {
        assert_eq!(LoadFactor::DEFAULT.capacity_for(usize::MAX), None);
        assert_eq!(LoadFactor::DEFAULT.capacity_for(MAX_CAPACITY), None);
        let tiny = LoadFactor::new(f64::MIN_POSITIVE).unwrap();
        assert_eq!(tiny.capacity_for(1), None);
    }
}
