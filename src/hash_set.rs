use core::fmt::Debug;
use core::iter::Chain;
use core::iter::FusedIterator;

use crate::bits::canonical_bits;
use crate::error::Error;
use crate::hash_table;
use crate::hash_table::HashTable;
use crate::load_factor::LoadFactor;

/// A hash set of `f64` values stored unboxed in an open-addressing table.
///
/// Values are compared by bit pattern, not by `==`:
///
/// - all NaNs are the same element, whatever their payload or sign;
/// - `0.0` and `-0.0` are different elements.
///
/// Every other value is its own element, so `1.0` and `1.0 + f64::EPSILON`
/// are distinct as you would expect.
///
/// # Performance Characteristics
///
/// - **Memory**: 8 bytes per slot, no per-element allocation.
/// - **Operations**: `insert`, `contains` and `remove` are O(1) amortized.
///
/// # Examples
///
/// ```rust
/// use f64_hash_set::F64HashSet;
///
/// let mut set = F64HashSet::new();
/// assert!(set.insert(f64::NAN));
/// assert!(!set.insert(f64::from_bits(0x7ff0_0000_0000_0001)));
/// assert!(set.insert(0.0));
/// assert!(set.insert(-0.0));
/// assert_eq!(set.len(), 3);
/// ```
#[derive(Clone, Default)]
pub struct F64HashSet {
    table: HashTable,
}

impl PartialEq for F64HashSet {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.table.iter().all(|bits| other.table.contains(bits))
    }
}

impl Eq for F64HashSet {}

impl Debug for F64HashSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl F64HashSet {
    /// Creates an empty set with 16 slots and the default load factor of
    /// `0.75`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let set = F64HashSet::new();
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 16);
    /// ```
    pub fn new() -> Self {
        Self {
            table: HashTable::new(),
        }
    }

    /// Creates an empty set that holds `expected` values without growing.
    ///
    /// # Panics
    ///
    /// Panics if the required capacity overflows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let set = F64HashSet::with_capacity(100);
    /// assert!(set.capacity() as f64 * 0.75 >= 100.0);
    /// ```
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            table: HashTable::with_capacity(expected),
        }
    }

    /// Creates an empty set that holds `expected` values without growing at
    /// the given load factor.
    ///
    /// Returns [`Error::InvalidLoadFactor`] unless `0 < load_factor < 1`, and
    /// [`Error::CapacityOverflow`] if the table would be too large to
    /// allocate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::Error;
    /// use f64_hash_set::F64HashSet;
    ///
    /// let set = F64HashSet::with_capacity_and_load_factor(10, 0.5).unwrap();
    /// assert_eq!(set.capacity(), 32);
    ///
    /// assert_eq!(
    ///     F64HashSet::with_capacity_and_load_factor(10, 1.0),
    ///     Err(Error::InvalidLoadFactor(1.0))
    /// );
    /// ```
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f64) -> Result<Self, Error> {
        let load_factor = LoadFactor::new(load_factor)?;
        Ok(Self {
            table: HashTable::with_capacity_and_load_factor(expected, load_factor)?,
        })
    }

    /// Returns the number of elements in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let mut set = F64HashSet::new();
    /// assert_eq!(set.len(), 0);
    /// set.insert(1.0);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots the set has allocated. Always a power of
    /// two; the set grows once `len` would exceed
    /// `capacity * load_factor`.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the load factor of the set.
    pub fn load_factor(&self) -> LoadFactor {
        self.table.load_factor()
    }

    /// Removes all elements from the set.
    ///
    /// This operation preserves the set's allocated capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let mut set: F64HashSet = (0..100).map(f64::from).collect();
    /// let capacity = set.capacity();
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Shrinks the capacity of the set as much as the load factor allows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let mut set = F64HashSet::with_capacity(1000);
    /// set.insert(1.0);
    /// set.insert(2.0);
    ///
    /// set.shrink_to_fit();
    /// assert!(set.capacity() < 1000);
    /// assert!(set.contains(1.0) && set.contains(2.0));
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Shrinks the capacity of the set, keeping room for at least `min_len`
    /// elements.
    pub fn shrink_to(&mut self, min_len: usize) {
        self.table.shrink_to(min_len);
    }

    /// Reserves capacity for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. NaN payloads are folded
    /// into one element before the lookup.
    ///
    /// # Panics
    ///
    /// Panics with "capacity overflow" if the set must grow past the largest
    /// table its load factor allows. With a load factor near zero this can
    /// happen on the first insert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let mut set = F64HashSet::new();
    /// assert_eq!(set.insert(37.5), true);
    /// assert_eq!(set.insert(37.5), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: f64) -> bool {
        self.table.insert(canonical_bits(value))
    }

    /// Returns `true` if the set contains a value with the same bit pattern,
    /// or any NaN when `value` is NaN.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let mut set = F64HashSet::new();
    /// set.insert(-0.0);
    /// assert!(set.contains(-0.0));
    /// assert!(!set.contains(0.0));
    /// ```
    pub fn contains(&self, value: f64) -> bool {
        self.table.contains(canonical_bits(value))
    }

    /// Removes a value from the set. Returns whether the value was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let mut set = F64HashSet::new();
    /// set.insert(f64::NAN);
    /// assert_eq!(set.remove(-f64::NAN), true);
    /// assert_eq!(set.remove(f64::NAN), false);
    /// ```
    pub fn remove(&mut self, value: f64) -> bool {
        self.table.remove(canonical_bits(value))
    }

    /// Returns an iterator over the values of the set, in no particular
    /// order.
    ///
    /// A NaN element is yielded as the canonical NaN.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let set: F64HashSet = [1.0, 2.0, 3.0].into_iter().collect();
    /// let sum: f64 = set.iter().sum();
    /// assert_eq!(sum, 6.0);
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator that removes and yields all values from the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let mut set = F64HashSet::new();
    /// set.insert(1.0);
    /// set.insert(2.0);
    ///
    /// let values: Vec<f64> = set.drain().collect();
    /// assert_eq!(values.len(), 2);
    /// assert!(set.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Retains only the values for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let mut set: F64HashSet = [-2.0, -1.0, 0.0, 1.0, 2.0].into_iter().collect();
    /// set.retain(|v| v.is_sign_positive());
    /// assert_eq!(set.len(), 3);
    /// assert!(!set.contains(-1.0));
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(f64) -> bool) {
        self.table.retain(|bits| f(f64::from_bits(bits)));
    }

    /// Returns `true` if `self` has no elements in common with `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let a: F64HashSet = [0.0, 1.0].into_iter().collect();
    /// let b: F64HashSet = [-0.0, 2.0].into_iter().collect();
    /// assert!(a.is_disjoint(&b));
    /// ```
    pub fn is_disjoint(&self, other: &F64HashSet) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.table.iter().all(|bits| !large.table.contains(bits))
    }

    /// Returns `true` if every element of `self` is in `other`.
    pub fn is_subset(&self, other: &F64HashSet) -> bool {
        self.len() <= other.len() && self.table.iter().all(|bits| other.table.contains(bits))
    }

    /// Returns `true` if every element of `other` is in `self`.
    pub fn is_superset(&self, other: &F64HashSet) -> bool {
        other.is_subset(self)
    }

    /// Visits the values in `self` or `other`, each once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let a: F64HashSet = [1.0, 2.0].into_iter().collect();
    /// let b: F64HashSet = [2.0, 3.0].into_iter().collect();
    /// assert_eq!(a.union(&b).count(), 3);
    /// ```
    pub fn union<'a>(&'a self, other: &'a F64HashSet) -> Union<'a> {
        Union {
            iter: self.iter().chain(other.difference(self)),
        }
    }

    /// Visits the values in both `self` and `other`.
    pub fn intersection<'a>(&'a self, other: &'a F64HashSet) -> Intersection<'a> {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Intersection {
            iter: small.table.iter(),
            other: large,
        }
    }

    /// Visits the values in `self` but not in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::F64HashSet;
    ///
    /// let a: F64HashSet = [1.0, 2.0, f64::NAN].into_iter().collect();
    /// let b: F64HashSet = [2.0, f64::NAN].into_iter().collect();
    /// assert_eq!(a.difference(&b).collect::<Vec<_>>(), [1.0]);
    /// ```
    pub fn difference<'a>(&'a self, other: &'a F64HashSet) -> Difference<'a> {
        Difference {
            iter: self.table.iter(),
            other,
        }
    }

    /// Visits the values in exactly one of `self` and `other`.
    pub fn symmetric_difference<'a>(&'a self, other: &'a F64HashSet) -> SymmetricDifference<'a> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }

    /// Returns low-level table statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> hash_table::DebugStats {
        self.table.debug_stats()
    }
}

/// An iterator over the values of an [`F64HashSet`].
#[derive(Clone)]
pub struct Iter<'a> {
    inner: hash_table::Iter<'a>,
}

impl Iterator for Iter<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(f64::from_bits)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// A draining iterator over the values of an [`F64HashSet`].
pub struct Drain<'a> {
    inner: hash_table::Drain<'a>,
}

impl Iterator for Drain<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(f64::from_bits)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Drain<'_> {}

/// A consuming iterator over the values of an [`F64HashSet`].
pub struct IntoIter {
    inner: hash_table::IntoIter,
}

impl Iterator for IntoIter {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(f64::from_bits)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}

impl IntoIterator for F64HashSet {
    type IntoIter = IntoIter;
    type Item = f64;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a F64HashSet {
    type IntoIter = Iter<'a>;
    type Item = f64;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<f64> for F64HashSet {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut set = F64HashSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<f64> for F64HashSet {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a> Extend<&'a f64> for F64HashSet {
    fn extend<I: IntoIterator<Item = &'a f64>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<const N: usize> From<[f64; N]> for F64HashSet {
    fn from(values: [f64; N]) -> Self {
        values.into_iter().collect()
    }
}

/// An iterator over the union of two sets.
pub struct Union<'a> {
    iter: Chain<Iter<'a>, Difference<'a>>,
}

impl Iterator for Union<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a> {
    iter: hash_table::Iter<'a>,
    other: &'a F64HashSet,
}

impl Iterator for Intersection<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let bits = self.iter.next()?;
            if self.other.table.contains(bits) {
                return Some(f64::from_bits(bits));
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a> {
    iter: hash_table::Iter<'a>,
    other: &'a F64HashSet,
}

impl Iterator for Difference<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let bits = self.iter.next()?;
            if !self.other.table.contains(bits) {
                return Some(f64::from_bits(bits));
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a> {
    iter: Chain<Difference<'a>, Difference<'a>>,
}

impl Iterator for SymmetricDifference<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}
