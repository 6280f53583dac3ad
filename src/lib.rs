#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod chain;

/// Table shape: starting bucket count and load factor.
pub mod config;

/// The untagged payload stored as keys and values.
pub mod element;

/// Errors reported by table creation and fallible inserts.
pub mod error;

/// A separately-chained hash table over [`Element`] keys and values.
///
/// This module provides the `HashTable` engine together with its iterator and
/// statistics types.
pub mod hash_table;

/// The fixed sequence of bucket counts a table grows through.
pub mod primes;

pub mod strategy;

pub use config::TableConfig;
pub use element::Element;
pub use error::Error;
pub use hash_table::HashTable;
#[cfg(feature = "foldhash")]
pub use strategy::FoldHash;
pub use strategy::ElementHasher;
pub use strategy::Equivalence;
pub use strategy::Transform;
