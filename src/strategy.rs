//! Strategies injected into a [`HashTable`](crate::HashTable) at creation.
//!
//! A table is generic over three strategies: how keys are hashed, how a stored
//! key is compared against a probe, and how a stored value is compared against
//! a probe. Each is a trait with a blanket implementation for the matching
//! closure shape, plus named zero-sized defaults that interpret elements as
//! signed integers.

use crate::element::Element;

/// Hashes keys.
///
/// Implementations must be pure: the same key always hashes to the same value
/// for the lifetime of a table.
pub trait ElementHasher {
    /// Computes the hash of `key`.
    fn hash(&self, key: Element) -> u64;
}

impl<F> ElementHasher for F
where
    F: Fn(Element) -> u64,
{
    #[inline]
    fn hash(&self, key: Element) -> u64 {
        self(key)
    }
}

/// A predicate over a stored `(key, value)` pair and an extra probe element.
///
/// Used both for key equivalence (compare `key` against `extra`) and value
/// equivalence (compare `value` against `extra`), and as the strategy-typed
/// predicate accepted by [`HashTable::all_with`](crate::HashTable::all_with).
pub trait Equivalence {
    /// Tests the pair against `extra`.
    fn equiv(&self, key: Element, value: Element, extra: &Element) -> bool;
}

impl<F> Equivalence for F
where
    F: Fn(Element, Element, &Element) -> bool,
{
    #[inline]
    fn equiv(&self, key: Element, value: Element, extra: &Element) -> bool {
        self(key, value, extra)
    }
}

/// Rewrites a stored value in place.
pub trait Transform {
    /// Updates `value`, which is stored under `key`, using `extra`.
    fn apply(&self, key: Element, value: &mut Element, extra: &Element);
}

impl<F> Transform for F
where
    F: Fn(Element, &mut Element, &Element),
{
    #[inline]
    fn apply(&self, key: Element, value: &mut Element, extra: &Element) {
        self(key, value, extra)
    }
}

/// Uses the key's signed integer, sign-extended, directly as its hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntHash;

impl ElementHasher for IntHash {
    #[inline]
    fn hash(&self, key: Element) -> u64 {
        key.as_int() as i64 as u64
    }
}

/// Keys are equivalent iff their signed integers match.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntKeyEquiv;

impl Equivalence for IntKeyEquiv {
    #[inline]
    fn equiv(&self, key: Element, _value: Element, extra: &Element) -> bool {
        key.as_int() == extra.as_int()
    }
}

/// Values are equivalent iff their signed integers match.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntValueEquiv;

impl Equivalence for IntValueEquiv {
    #[inline]
    fn equiv(&self, _key: Element, value: Element, extra: &Element) -> bool {
        value.as_int() == extra.as_int()
    }
}

/// Mixes the key's raw bits with foldhash.
///
/// Spreads sequential or clustered integer keys across buckets better than
/// [`IntHash`]. The seed is fixed, so hashes are stable across tables and
/// runs.
#[cfg(feature = "foldhash")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldHash {
    seed: u64,
}

#[cfg(feature = "foldhash")]
impl FoldHash {
    /// Creates a strategy with the given seed.
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

#[cfg(feature = "foldhash")]
impl ElementHasher for FoldHash {
    #[inline]
    fn hash(&self, key: Element) -> u64 {
        use core::hash::BuildHasher;

        foldhash::fast::FixedState::with_seed(self.seed).hash_one(key.to_bits())
    }
}
