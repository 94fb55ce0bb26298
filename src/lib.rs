#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Canonical bit patterns and hashing for `f64` keys.
///
/// This module decides what "the same key" means: NaNs collapse to one
/// pattern, signed zeros stay apart.
pub mod bits;

mod error;

/// Load factor configuration and the capacity arithmetic derived from it.
pub mod load_factor;

/// The open-addressing table of raw `u64` patterns behind the set.
pub mod hash_table;

/// An `f64` hash set built on the open-addressing `HashTable`.
///
/// This module provides an `F64HashSet` that canonicalizes keys and
/// provides a standard set interface over the raw table.
pub mod hash_set;

pub use error::Error;
pub use hash_set::F64HashSet;
pub use hash_table::HashTable;
pub use load_factor::LoadFactor;
