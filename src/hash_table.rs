use alloc::alloc::handle_alloc_error;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::ptr::NonNull;

use crate::bits::EMPTY;
use crate::bits::mix;
use crate::error::Error;
use crate::load_factor::DEFAULT_CAPACITY;
use crate::load_factor::LoadFactor;

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

#[inline(always)]
fn home_slot(bits: u64, mask: usize) -> usize {
    mix(bits) as usize & mask
}

/// Returns `true` if `index` lies in the cyclic half-open range
/// `(start, end]` of a table.
#[inline(always)]
fn cyclic_between(start: usize, index: usize, end: usize) -> bool {
    if start <= end {
        start < index && index <= end
    } else {
        start < index || index <= end
    }
}

/// Zero-initialized, power-of-two sized array of key slots.
///
/// A slot holding [`EMPTY`] is free. Since `EMPTY` is all zero bits, a fresh
/// allocation from `alloc_zeroed` is already an empty table.
struct Slots {
    ptr: NonNull<u64>,
    capacity: usize,
}

// SAFETY: `Slots` uniquely owns its allocation of plain `u64`s and exposes it
// only through `&self`/`&mut self`, so it follows the usual aliasing rules.
unsafe impl Send for Slots {}
// SAFETY: See above; shared access never mutates.
unsafe impl Sync for Slots {}

impl Slots {
    fn layout(capacity: usize) -> Layout {
        Layout::array::<u64>(capacity).unwrap_or_else(|_| capacity_overflow())
    }

    fn zeroed(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());

        let layout = Self::layout(capacity);
        // SAFETY: `capacity` is a power of two, so at least one, and the layout
        // has non-zero size. A null return is handed to `handle_alloc_error`.
        let ptr = unsafe {
            let raw = alloc::alloc::alloc_zeroed(layout);
            if raw.is_null() {
                handle_alloc_error(layout);
            }
            NonNull::new_unchecked(raw.cast::<u64>())
        };

        Slots { ptr, capacity }
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.capacity - 1
    }

    #[inline(always)]
    fn as_slice(&self) -> &[u64] {
        // SAFETY: `ptr` points to `capacity` initialized `u64`s that we own.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.capacity) }
    }

    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u64] {
        // SAFETY: `ptr` points to `capacity` initialized `u64`s that we own
        // exclusively through `&mut self`.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.capacity) }
    }

    /// Stores `bits` at the first free slot of its probe sequence. The caller
    /// guarantees `bits` is not [`EMPTY`] and not already present.
    #[inline]
    fn place(&mut self, bits: u64) {
        let mask = self.mask();
        let slots = self.as_mut_slice();
        let mut pos = home_slot(bits, mask);
        while slots[pos] != EMPTY {
            pos = (pos + 1) & mask;
        }
        slots[pos] = bits;
    }
}

impl Clone for Slots {
    fn clone(&self) -> Self {
        let mut slots = Slots::zeroed(self.capacity);
        slots.as_mut_slice().copy_from_slice(self.as_slice());
        slots
    }
}

impl Drop for Slots {
    fn drop(&mut self) {
        // SAFETY: `ptr` was allocated in `zeroed` with exactly this layout.
        unsafe {
            alloc::alloc::dealloc(self.ptr.as_ptr().cast(), Self::layout(self.capacity));
        }
    }
}

/// Debug statistics for hash table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of keys in the table, including the zero key
    pub len: usize,
    /// Number of slots allocated
    pub capacity: usize,
    /// Number of keys the table holds before it grows
    pub max_fill: usize,
    /// Number of slots currently occupied
    pub occupied_slots: usize,
    /// Fill ratio (len / capacity)
    pub load: f64,
    /// Longest distance between a key and its home slot
    pub max_probe: usize,
    /// Total bytes allocated for slots
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} (grows past {}, {:.2}% load)",
            self.len,
            self.capacity,
            self.max_fill,
            self.load * 100.0
        );
        println!("Occupied slots: {}", self.occupied_slots);
        println!("Longest probe: {}", self.max_probe);
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// An open-addressing hash table of raw 64-bit key patterns.
///
/// `HashTable` is the engine behind [`F64HashSet`](crate::F64HashSet). It
/// stores `u64` keys in a flat power-of-two array and resolves collisions by
/// linear probing. The pattern `0` doubles as the empty-slot marker, so the
/// key `0` is tracked by a separate flag instead of living in the array.
///
/// Keys are compared bit for bit. The table performs no canonicalization of
/// its own; callers that want NaN folding use
/// [`canonical_bits`](crate::bits::canonical_bits) or go through
/// `F64HashSet`.
///
/// Removal repairs the probe chain by shifting later keys back into the
/// freed slot, so no tombstones accumulate and lookups always stop at the
/// first empty slot.
///
/// ## Performance Characteristics
///
/// - **Memory**: 8 bytes per slot, `capacity >= len / load_factor`.
///
/// ## Example
///
/// ```rust
/// use f64_hash_set::HashTable;
///
/// let mut table = HashTable::new();
/// assert!(table.insert(1.5f64.to_bits()));
/// assert!(table.insert(0));
/// assert!(!table.insert(0));
/// assert!(table.contains(1.5f64.to_bits()));
/// assert_eq!(table.len(), 2);
/// ```
#[derive(Clone)]
pub struct HashTable {
    slots: Slots,

    len: usize,
    max_fill: usize,
    min_capacity: usize,
    contains_zero: bool,

    load_factor: LoadFactor,
}

impl Debug for HashTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::ToString;
        use alloc::vec::Vec;

        f.debug_struct("HashTable")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("max_fill", &self.max_fill)
            .field("contains_zero", &self.contains_zero)
            .field(
                "slots",
                &self
                    .slots
                    .as_slice()
                    .chunks(8)
                    .map(|w| {
                        w.iter()
                            .map(|&bits| {
                                if bits == EMPTY {
                                    "................".to_string()
                                } else {
                                    format!("{bits:016x}")
                                }
                            })
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HashTable {
    /// Creates an empty table with 16 slots and the default load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::HashTable;
    ///
    /// let table = HashTable::new();
    /// assert_eq!(table.capacity(), 16);
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_slots(DEFAULT_CAPACITY, LoadFactor::DEFAULT)
    }

    /// Creates an empty table that holds `expected` keys without growing,
    /// using the default load factor.
    ///
    /// # Panics
    ///
    /// Panics if the required capacity overflows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::HashTable;
    ///
    /// let table = HashTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 256);
    /// ```
    pub fn with_capacity(expected: usize) -> Self {
        match Self::with_capacity_and_load_factor(expected, LoadFactor::DEFAULT) {
            Ok(table) => table,
            Err(_) => capacity_overflow(),
        }
    }

    /// Creates an empty table that holds `expected` keys without growing at
    /// the given load factor.
    ///
    /// The capacity is the smallest power of two, at least 2, whose fill
    /// threshold admits `expected` keys.
    ///
    /// Returns [`Error::CapacityOverflow`] if that capacity cannot be
    /// allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::HashTable;
    /// use f64_hash_set::LoadFactor;
    ///
    /// let table = HashTable::with_capacity_and_load_factor(8, LoadFactor::FAST).unwrap();
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub fn with_capacity_and_load_factor(
        expected: usize,
        load_factor: LoadFactor,
    ) -> Result<Self, Error> {
        let capacity = load_factor
            .capacity_for(expected)
            .ok_or(Error::CapacityOverflow { expected })?;
        Ok(Self::with_slots(capacity, load_factor))
    }

    fn with_slots(capacity: usize, load_factor: LoadFactor) -> Self {
        Self {
            slots: Slots::zeroed(capacity),
            len: 0,
            max_fill: load_factor.max_fill(capacity),
            min_capacity: capacity,
            contains_zero: false,
            load_factor,
        }
    }

    /// Returns the number of keys in the table, including the zero key.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots currently allocated. Always a power of
    /// two.
    pub fn capacity(&self) -> usize {
        self.slots.capacity
    }

    /// Returns the load factor the table was created with.
    pub fn load_factor(&self) -> LoadFactor {
        self.load_factor
    }

    /// Inserts `bits`. Returns `true` if it was not already present.
    ///
    /// Grows the table afterwards if the number of keys exceeds
    /// `capacity * load_factor`.
    ///
    /// # Panics
    ///
    /// Panics with "capacity overflow" if growing is needed and no table of
    /// at most `MAX_CAPACITY` slots can hold the keys at this load factor.
    /// A load factor close to zero, such as `f64::MIN_POSITIVE`, hits this
    /// on the first insert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// assert!(table.insert(42));
    /// assert!(!table.insert(42));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(&mut self, bits: u64) -> bool {
        if bits == EMPTY {
            if self.contains_zero {
                return false;
            }
            self.contains_zero = true;
        } else {
            let mask = self.slots.mask();
            let slots = self.slots.as_mut_slice();
            let mut pos = home_slot(bits, mask);
            loop {
                let current = slots[pos];
                if current == EMPTY {
                    slots[pos] = bits;
                    break;
                }
                if current == bits {
                    return false;
                }
                pos = (pos + 1) & mask;
            }
        }

        self.len += 1;
        if self.len > self.max_fill {
            self.grow();
        }
        true
    }

    /// Returns `true` if the table contains `bits`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.insert(7);
    /// assert!(table.contains(7));
    /// assert!(!table.contains(0));
    /// ```
    pub fn contains(&self, bits: u64) -> bool {
        if bits == EMPTY {
            return self.contains_zero;
        }
        self.find(bits).is_some()
    }

    /// Removes `bits`. Returns `true` if it was present.
    ///
    /// The probe chain following the freed slot is repaired in place, so
    /// every remaining key stays reachable. The table halves its capacity
    /// when it becomes sparse, never below the capacity it was created with.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.insert(7);
    /// assert!(table.remove(7));
    /// assert!(!table.remove(7));
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, bits: u64) -> bool {
        if bits == EMPTY {
            if !self.contains_zero {
                return false;
            }
            self.contains_zero = false;
        } else {
            let Some(pos) = self.find(bits) else {
                return false;
            };
            self.shift_keys(pos);
        }

        self.len -= 1;
        self.maybe_shrink();
        true
    }

    /// Removes every key. The capacity is left unchanged.
    pub fn clear(&mut self) {
        if self.len == 0 {
            return;
        }
        self.slots.as_mut_slice().fill(EMPTY);
        self.contains_zero = false;
        self.len = 0;
    }

    /// Shrinks the table to the smallest capacity that holds its keys at the
    /// current load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::HashTable;
    ///
    /// let mut table = HashTable::with_capacity(1000);
    /// table.insert(1);
    /// table.insert(2);
    /// table.shrink_to_fit();
    /// assert_eq!(table.capacity(), 4);
    /// assert!(table.contains(1) && table.contains(2));
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.shrink_to(0);
    }

    /// Shrinks the table to the smallest capacity that holds
    /// `max(len, min_len)` keys at the current load factor. Does nothing if
    /// that is not smaller than the current capacity.
    pub fn shrink_to(&mut self, min_len: usize) {
        let Some(capacity) = self.load_factor.capacity_for(self.len.max(min_len)) else {
            return;
        };
        if capacity < self.capacity() {
            self.resize(capacity);
        }
    }

    /// Grows the table, if needed, so that `additional` more keys fit without
    /// another resize.
    ///
    /// # Panics
    ///
    /// Panics if the required capacity overflows.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.len.saturating_add(additional);
        if required > self.max_fill {
            let capacity = self
                .load_factor
                .capacity_for(required)
                .unwrap_or_else(|| capacity_overflow());
            self.resize(capacity);
        }
    }

    /// Keeps only the keys for which `f` returns `true`.
    ///
    /// `f` sees every key exactly once. If anything was removed, the table is
    /// rebuilt at its current capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// for k in 0..10 {
    ///     table.insert(k);
    /// }
    /// table.retain(|k| k % 2 == 0);
    /// assert_eq!(table.len(), 5);
    /// assert!(table.contains(0));
    /// assert!(!table.contains(3));
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(u64) -> bool) {
        let mut removed = false;

        if self.contains_zero && !f(EMPTY) {
            self.contains_zero = false;
            self.len -= 1;
            removed = true;
        }

        for slot in self.slots.as_mut_slice() {
            if *slot != EMPTY && !f(*slot) {
                *slot = EMPTY;
                self.len -= 1;
                removed = true;
            }
        }

        // Holes punched above break probe chains; a rebuild restores them.
        if removed {
            self.resize(self.capacity());
        }
    }

    /// Returns an iterator over the keys in the table.
    ///
    /// The zero key, if present, comes first; the rest follow in slot order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            slots: self.slots.as_slice(),
            zero: self.contains_zero,
            remaining: self.len,
        }
    }

    /// Returns an iterator that removes and yields every key.
    ///
    /// The table is empty afterwards, with its capacity unchanged, even if
    /// the iterator is dropped before it is exhausted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use f64_hash_set::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.insert(0);
    /// table.insert(9);
    /// let mut keys: Vec<u64> = table.drain().collect();
    /// keys.sort();
    /// assert_eq!(keys, [0, 9]);
    /// assert!(table.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_> {
        Drain {
            table: self,
            index: 0,
        }
    }

    /// Finds the slot holding `bits`, which must not be [`EMPTY`].
    #[inline]
    fn find(&self, bits: u64) -> Option<usize> {
        let mask = self.slots.mask();
        let slots = self.slots.as_slice();
        let mut pos = home_slot(bits, mask);
        loop {
            let current = slots[pos];
            if current == bits {
                return Some(pos);
            }
            if current == EMPTY {
                return None;
            }
            pos = (pos + 1) & mask;
        }
    }

    /// Empties the slot at `gap` and closes the hole it leaves in the probe
    /// chain.
    ///
    /// Walks forward to the next empty slot. A key may move back into the gap
    /// unless its home slot lies cyclically in `(gap, pos]`, in which case
    /// moving it would put it before its own home. Each move leaves a new gap
    /// at the moved key's old position.
    fn shift_keys(&mut self, mut gap: usize) {
        let mask = self.slots.mask();
        let slots = self.slots.as_mut_slice();
        let mut pos = gap;
        loop {
            pos = (pos + 1) & mask;
            let current = slots[pos];
            if current == EMPTY {
                slots[gap] = EMPTY;
                return;
            }
            if !cyclic_between(gap, home_slot(current, mask), pos) {
                slots[gap] = current;
                gap = pos;
            }
        }
    }

    #[inline]
    fn maybe_shrink(&mut self) {
        let capacity = self.capacity();
        if capacity > self.min_capacity
            && capacity > DEFAULT_CAPACITY
            && self.len < self.max_fill / 4
            && self.load_factor.max_fill(capacity / 2) >= self.len
        {
            self.resize(capacity / 2);
        }
    }

    #[cold]
    fn grow(&mut self) {
        let capacity = self
            .load_factor
            .capacity_for(self.len)
            .unwrap_or_else(|| capacity_overflow());
        self.resize(capacity);
    }

    /// Moves every key into a freshly allocated array of `capacity` slots.
    ///
    /// The new array is fully populated before the old one is released, so an
    /// allocation failure leaves nothing half-moved.
    fn resize(&mut self, capacity: usize) {
        debug_assert!(self.load_factor.max_fill(capacity) >= self.len);

        let mut slots = Slots::zeroed(capacity);
        for &bits in self.slots.as_slice() {
            if bits != EMPTY {
                slots.place(bits);
            }
        }

        log::trace!(
            "resized f64 table from {} to {} slots holding {} keys",
            self.slots.capacity,
            capacity,
            self.len
        );

        self.slots = slots;
        self.max_fill = self.load_factor.max_fill(capacity);
    }

    /// Computes a histogram of probe lengths for the current table state.
    ///
    /// Index `d` counts the keys stored `d` slots past their home slot. The
    /// zero key lives outside the array and is not counted.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> alloc::vec::Vec<usize> {
        let mut hist = alloc::vec::Vec::new();
        let mask = self.slots.mask();
        for (pos, &bits) in self.slots.as_slice().iter().enumerate() {
            if bits == EMPTY {
                continue;
            }
            let distance = pos.wrapping_sub(home_slot(bits, mask)) & mask;
            if hist.len() <= distance {
                hist.resize(distance + 1, 0);
            }
            hist[distance] += 1;
        }
        hist
    }

    /// Returns detailed utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.probe_histogram();
        let capacity = self.capacity();
        DebugStats {
            len: self.len,
            capacity,
            max_fill: self.max_fill,
            occupied_slots: hist.iter().sum(),
            load: self.len as f64 / capacity as f64,
            max_probe: hist.len().saturating_sub(1),
            total_bytes: Slots::layout(capacity).size(),
        }
    }

    /// Pretty-prints the probe-length histogram horizontally using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_probe_histogram(&self) {
        let hist = self.probe_histogram();
        let max = hist.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} keys):", self.len);
        for (distance, &count) in hist.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", distance, "█".repeat(width), count);
        }
    }
}

impl<'a> IntoIterator for &'a HashTable {
    type IntoIter = Iter<'a>;
    type Item = u64;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for HashTable {
    type IntoIter = IntoIter;
    type Item = u64;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self,
            index: 0,
        }
    }
}

/// Removes and returns the next key of `table`, scanning slots from `index`.
fn take_next(table: &mut HashTable, index: &mut usize) -> Option<u64> {
    if table.len == 0 {
        return None;
    }
    if table.contains_zero {
        table.contains_zero = false;
        table.len -= 1;
        return Some(EMPTY);
    }

    let slots = table.slots.as_mut_slice();
    while *index < slots.len() {
        let bits = core::mem::replace(&mut slots[*index], EMPTY);
        *index += 1;
        if bits != EMPTY {
            table.len -= 1;
            return Some(bits);
        }
    }
    None
}

/// An iterator over the keys of a [`HashTable`].
///
/// Created by [`HashTable::iter`].
#[derive(Clone)]
pub struct Iter<'a> {
    slots: &'a [u64],
    zero: bool,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        if self.zero {
            self.zero = false;
            self.remaining -= 1;
            return Some(EMPTY);
        }

        while let Some((&bits, rest)) = self.slots.split_first() {
            self.slots = rest;
            if bits != EMPTY {
                self.remaining -= 1;
                return Some(bits);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// A draining iterator over the keys of a [`HashTable`].
///
/// Created by [`HashTable::drain`].
pub struct Drain<'a> {
    table: &'a mut HashTable,
    index: usize,
}

impl Iterator for Drain<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        take_next(self.table, &mut self.index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len, Some(self.table.len))
    }
}

impl ExactSizeIterator for Drain<'_> {}

impl Drop for Drain<'_> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

/// A consuming iterator over the keys of a [`HashTable`].
pub struct IntoIter {
    table: HashTable,
    index: usize,
}

impl Iterator for IntoIter {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        take_next(&mut self.table, &mut self.index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.len, Some(self.table.len))
    }
}

impl ExactSizeIterator for IntoIter {}
