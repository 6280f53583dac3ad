use alloc::vec::Vec;
use core::fmt::Debug;

use log::debug;
use log::error;
use log::trace;
use log::warn;

use crate::chain::Chains;
use crate::chain::Entry as ChainEntry;
use crate::config::TableConfig;
use crate::element::Element;
use crate::error::Error;
use crate::primes;
use crate::strategy::ElementHasher;
use crate::strategy::Equivalence;
use crate::strategy::IntHash;
use crate::strategy::IntKeyEquiv;
use crate::strategy::IntValueEquiv;
use crate::strategy::Transform;

/// Chain statistics for a hash table.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq)]
pub struct DebugStats {
    /// Number of entries currently in the table
    pub populated: usize,
    /// Number of buckets
    pub buckets: usize,
    /// Buckets whose chain is empty
    pub empty_buckets: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Current load (populated / buckets)
    pub load: f32,
    /// The load at which the table grows
    pub load_factor: f32,
    /// Entry slots allocated in the arena
    pub arena_slots: usize,
    /// Allocated slots waiting on the free list
    pub free_slots: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the statistics.
    ///
    /// Goes to stdout with the `std` feature and to the `log` facade at info
    /// level without it.
    pub fn print(&self) {
        cfg_if::cfg_if! {
            if #[cfg(feature = "std")] {
                std::println!("=== Hash Table Chain Statistics ===");
                std::println!(
                    "Population: {} in {} buckets ({:.2} load, grows at {:.2})",
                    self.populated, self.buckets, self.load, self.load_factor
                );
                std::println!(
                    "Chains: {} empty, longest {}",
                    self.empty_buckets, self.longest_chain
                );
                std::println!(
                    "Arena: {} slots ({} free)",
                    self.arena_slots, self.free_slots
                );
            } else {
                log::info!(
                    "population {} in {} buckets ({:.2} load, grows at {:.2}); {} empty chains, longest {}; arena {} slots ({} free)",
                    self.populated, self.buckets, self.load, self.load_factor,
                    self.empty_buckets, self.longest_chain, self.arena_slots, self.free_slots
                );
            }
        }
    }
}

/// A separately-chained hash table mapping [`Element`] keys to [`Element`]
/// values.
///
/// The table is generic over three strategies fixed at creation: `H` hashes
/// keys, `KE` decides whether a stored key matches a probe and `VE` decides
/// whether a stored value matches a probe. The defaults treat every element
/// as a signed integer and use it directly as its own hash.
///
/// Buckets are always one of the bucket counts in
/// [`PRIMES`](crate::primes::PRIMES). Before each insert the table checks its
/// load (`len / bucket_count`); once that reaches the load factor it moves to
/// the next prime and rehashes. At the largest prime it stops growing and
/// simply lets its chains get longer.
///
/// A key matches a stored entry when their hashes are equal and `KE` accepts
/// the pair, so distinct keys whose hashes collide are kept apart.
///
/// ## Example
///
/// ```rust
/// use chain_hash::Element;
/// use chain_hash::HashTable;
///
/// let mut table = HashTable::new();
/// table.insert(Element::int(1), Element::int(10));
/// table.insert(Element::int(2), Element::int(20));
///
/// assert_eq!(table.lookup(Element::int(1)), Some(Element::int(10)));
/// assert_eq!(table.remove(Element::int(2)), Some(Element::int(20)));
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Clone)]
pub struct HashTable<H = IntHash, KE = IntKeyEquiv, VE = IntValueEquiv> {
    chains: Chains,
    prime_index: usize,
    load_factor: f32,
    populated: usize,
    exhausted: bool,

    hasher: H,
    key_equiv: KE,
    value_equiv: VE,
}

impl<H, KE, VE> Debug for HashTable<H, KE, VE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        struct Entries<'a>(&'a Chains);

        impl Debug for Entries<'_> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_map()
                    .entries(self.0.iter().map(|e| (e.key, e.value)))
                    .finish()
            }
        }

        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("buckets", &self.chains.buckets())
            .field("load_factor", &self.load_factor)
            .field("entries", &Entries(&self.chains))
            .finish()
    }
}

impl HashTable {
    /// Creates an empty table with 17 buckets, a load factor of 0.75 and the
    /// integer strategies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::HashTable;
    ///
    /// let table = HashTable::new();
    /// assert!(table.is_empty());
    /// assert_eq!(table.bucket_count(), 17);
    /// ```
    pub fn new() -> Self {
        Self::with_strategies(IntHash, IntKeyEquiv, IntValueEquiv)
    }

    /// Creates an empty table with the given shape and the integer
    /// strategies.
    ///
    /// # Errors
    ///
    /// See [`with_config_and_strategies`](Self::with_config_and_strategies).
    pub fn with_config(config: TableConfig) -> Result<Self, Error> {
        Self::with_config_and_strategies(config, IntHash, IntKeyEquiv, IntValueEquiv)
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, KE, VE> HashTable<H, KE, VE>
where
    H: ElementHasher,
    KE: Equivalence,
    VE: Equivalence,
{
    /// Creates an empty table with 17 buckets and a load factor of 0.75.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::Element;
    /// use chain_hash::HashTable;
    /// use chain_hash::strategy::IntKeyEquiv;
    /// use chain_hash::strategy::IntValueEquiv;
    ///
    /// let mut table = HashTable::with_strategies(
    ///     |key: Element| key.as_uint() as u64 * 31,
    ///     IntKeyEquiv,
    ///     IntValueEquiv,
    /// );
    /// table.insert(Element::uint(3), Element::boolean(true));
    /// assert!(table.has_key(Element::uint(3)));
    /// ```
    pub fn with_strategies(hasher: H, key_equiv: KE, value_equiv: VE) -> Self {
        let config = TableConfig::default();
        Self::from_parts(
            Chains::new(config.bucket_count),
            config,
            hasher,
            key_equiv,
            value_equiv,
        )
    }

    /// Creates an empty table with the given shape and strategies.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidCapacity`] if the bucket count is not one of
    ///   [`PRIMES`](crate::primes::PRIMES).
    /// - [`Error::InvalidLoadFactor`] if the load factor is not greater than
    ///   zero.
    /// - [`Error::AllocationFailure`] if the buckets cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::Error;
    /// use chain_hash::HashTable;
    /// use chain_hash::TableConfig;
    /// use chain_hash::strategy::IntHash;
    /// use chain_hash::strategy::IntKeyEquiv;
    /// use chain_hash::strategy::IntValueEquiv;
    ///
    /// let table = HashTable::with_config_and_strategies(
    ///     TableConfig::new(127, 0.5),
    ///     IntHash,
    ///     IntKeyEquiv,
    ///     IntValueEquiv,
    /// )
    /// .unwrap();
    /// assert_eq!(table.bucket_count(), 127);
    ///
    /// let err = HashTable::with_config_and_strategies(
    ///     TableConfig::new(128, 0.5),
    ///     IntHash,
    ///     IntKeyEquiv,
    ///     IntValueEquiv,
    /// )
    /// .unwrap_err();
    /// assert_eq!(err, Error::InvalidCapacity { requested: 128 });
    /// ```
    pub fn with_config_and_strategies(
        config: TableConfig,
        hasher: H,
        key_equiv: KE,
        value_equiv: VE,
    ) -> Result<Self, Error> {
        config.validate()?;
        let chains = Chains::try_new(config.bucket_count)?;
        Ok(Self::from_parts(
            chains,
            config,
            hasher,
            key_equiv,
            value_equiv,
        ))
    }

    /// Creates an empty table from a bucket count, a load factor and the
    /// three strategies.
    ///
    /// Shorthand for [`with_config_and_strategies`] with
    /// `TableConfig::new(bucket_count, load_factor)`.
    ///
    /// [`with_config_and_strategies`]: Self::with_config_and_strategies
    pub fn create(
        bucket_count: usize,
        load_factor: f32,
        hasher: H,
        key_equiv: KE,
        value_equiv: VE,
    ) -> Result<Self, Error> {
        Self::with_config_and_strategies(
            TableConfig::new(bucket_count, load_factor),
            hasher,
            key_equiv,
            value_equiv,
        )
    }

    fn from_parts(
        chains: Chains,
        config: TableConfig,
        hasher: H,
        key_equiv: KE,
        value_equiv: VE,
    ) -> Self {
        trace!(
            "creating hash table with {} buckets, load factor {:.2}",
            config.bucket_count, config.load_factor
        );
        Self {
            chains,
            // Validated configs always name a prime.
            prime_index: primes::index_of(config.bucket_count).unwrap_or(0),
            load_factor: config.load_factor,
            populated: 0,
            exhausted: false,
            hasher,
            key_equiv,
            value_equiv,
        }
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the current number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.chains.buckets()
    }

    /// Returns the load factor the table was created with.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns the current load, `len / bucket_count`.
    pub fn current_load(&self) -> f32 {
        self.populated as f32 / self.chains.buckets() as f32
    }

    /// Returns the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::Element;
    /// use chain_hash::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// assert_eq!(table.lookup(Element::int(-4)), None);
    /// table.insert(Element::int(-4), Element::float(0.5));
    /// assert_eq!(table.lookup(Element::int(-4)), Some(Element::float(0.5)));
    /// ```
    pub fn lookup(&self, key: Element) -> Option<Element> {
        self.find(key).map(|idx| self.chains.entry(idx).value)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn lookup_mut(&mut self, key: Element) -> Option<&mut Element> {
        let idx = self.find(key)?;
        Some(&mut self.chains.entry_mut(idx).value)
    }

    /// Returns `true` if an entry is stored under `key`.
    ///
    /// Unlike [`has_key`](Self::has_key) this only walks one chain.
    pub fn contains(&self, key: Element) -> bool {
        self.find(key).is_some()
    }

    fn find(&self, key: Element) -> Option<usize> {
        let hash = self.hasher.hash(key);
        let bucket = self.chains.bucket_of(hash);
        let key_equiv = &self.key_equiv;
        self.chains
            .probe(bucket, hash, |e| key_equiv.equiv(e.key, e.value, &key))
            .hit
            .map(|(_, idx)| idx)
    }

    /// Inserts a key-value pair, replacing the value if the key is present.
    ///
    /// Returns the previous value on replacement. If memory for a new entry
    /// cannot be reserved the failure is logged and the table is left as it
    /// was; use [`try_insert`](Self::try_insert) to observe it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::Element;
    /// use chain_hash::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// assert_eq!(table.insert(Element::int(1), Element::int(1)), None);
    /// assert_eq!(
    ///     table.insert(Element::int(1), Element::int(2)),
    ///     Some(Element::int(1))
    /// );
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert(&mut self, key: Element, value: Element) -> Option<Element> {
        match self.try_insert(key, value) {
            Ok(previous) => previous,
            Err(err) => {
                error!("dropping insert of {:?}: {}", key, err);
                None
            }
        }
    }

    /// Inserts a key-value pair, reporting allocation failure.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailure`] if a slot for a new entry cannot be
    /// reserved. A failed resize is not an error: the insert proceeds against
    /// the current buckets.
    pub fn try_insert(&mut self, key: Element, value: Element) -> Result<Option<Element>, Error> {
        self.maybe_resize_rehash();

        let hash = self.hasher.hash(key);
        let bucket = self.chains.bucket_of(hash);
        let key_equiv = &self.key_equiv;
        let probe = self
            .chains
            .probe(bucket, hash, |e| key_equiv.equiv(e.key, e.value, &key));

        if let Some((_, idx)) = probe.hit {
            let entry = self.chains.entry_mut(idx);
            return Ok(Some(core::mem::replace(&mut entry.value, value)));
        }

        self.chains
            .splice_after(probe.insert_after, ChainEntry::new(hash, key, value))?;
        self.populated += 1;
        Ok(None)
    }

    fn maybe_resize_rehash(&mut self) {
        let load = self.current_load();
        if load < self.load_factor {
            return;
        }

        let Some((next_index, next_buckets)) = primes::next_after(self.prime_index) else {
            if !self.exhausted {
                warn!(
                    "load {:.2} over limit at {} buckets, no larger bucket count available",
                    load,
                    self.chains.buckets()
                );
                self.exhausted = true;
            }
            return;
        };

        debug!(
            "load {:.2} reached limit {:.2}, resizing {} -> {} buckets",
            load,
            self.load_factor,
            self.chains.buckets(),
            next_buckets
        );
        match self.chains.rehash(next_buckets) {
            Ok(()) => {
                self.prime_index = next_index;
                debug!("rehashed {} entries", self.populated);
            }
            Err(err) => warn!("resize to {} buckets aborted: {}", next_buckets, err),
        }
    }

    /// Removes the entry stored under `key`, returning its value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::Element;
    /// use chain_hash::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// assert_eq!(table.remove(Element::int(1)), None);
    ///
    /// table.insert(Element::int(1), Element::uint(7));
    /// assert_eq!(table.remove(Element::int(1)), Some(Element::uint(7)));
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(&mut self, key: Element) -> Option<Element> {
        let hash = self.hasher.hash(key);
        let bucket = self.chains.bucket_of(hash);
        let key_equiv = &self.key_equiv;
        let (prev, idx) = self
            .chains
            .probe(bucket, hash, |e| key_equiv.equiv(e.key, e.value, &key))
            .hit?;

        let entry = self.chains.unlink(prev, idx);
        self.populated -= 1;
        Some(entry.value)
    }

    /// Removes every entry. The bucket count is kept.
    pub fn clear(&mut self) {
        self.chains.clear();
        self.populated = 0;
    }

    /// Returns an iterator over `(key, value)` pairs.
    ///
    /// Entries come out bucket by bucket, and within a bucket in ascending
    /// hash order. [`keys`](Self::keys) and [`values`](Self::values) use the
    /// same order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.chains.iter(),
            remaining: self.populated,
        }
    }

    /// Returns a snapshot of every key.
    ///
    /// The snapshot does not track later changes to the table. Without an
    /// intervening mutation, position `i` of `keys()` and position `i` of
    /// [`values`](Self::values) belong to the same entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::Element;
    /// use chain_hash::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// for i in 0..3 {
    ///     table.insert(Element::int(i), Element::int(i * 10));
    /// }
    ///
    /// let keys = table.keys();
    /// let values = table.values();
    /// for (k, v) in keys.iter().zip(&values) {
    ///     assert_eq!(k.as_int() * 10, v.as_int());
    /// }
    /// ```
    pub fn keys(&self) -> Vec<Element> {
        let mut keys = Vec::with_capacity(self.populated);
        keys.extend(self.chains.iter().map(|e| e.key));
        keys
    }

    /// Returns a snapshot of every value, in the same order as
    /// [`keys`](Self::keys).
    pub fn values(&self) -> Vec<Element> {
        let mut values = Vec::with_capacity(self.populated);
        values.extend(self.chains.iter().map(|e| e.value));
        values
    }

    /// Returns `true` if `predicate` holds for every `(key, value)` pair.
    ///
    /// Stops at the first pair that fails. An empty table satisfies any
    /// predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::Element;
    /// use chain_hash::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// for i in 0..3 {
    ///     table.insert(Element::int(i), Element::int(i));
    /// }
    /// assert!(table.all(|key, _| key.as_int() < 4));
    /// assert!(!table.all(|key, _| key.as_int() < 1));
    /// ```
    pub fn all(&self, mut predicate: impl FnMut(Element, Element) -> bool) -> bool {
        let keys = self.keys();
        let values = self.values();
        keys.into_iter()
            .zip(values)
            .all(|(key, value)| predicate(key, value))
    }

    /// Returns `true` if `predicate` holds for at least one `(key, value)`
    /// pair. Stops at the first match; `false` on an empty table.
    pub fn any(&self, mut predicate: impl FnMut(Element, Element) -> bool) -> bool {
        let keys = self.keys();
        let values = self.values();
        keys.into_iter()
            .zip(values)
            .any(|(key, value)| predicate(key, value))
    }

    /// [`all`](Self::all) with a strategy-typed predicate and an extra probe
    /// element passed to every call.
    pub fn all_with(&self, predicate: &impl Equivalence, extra: &Element) -> bool {
        self.all(|key, value| predicate.equiv(key, value, extra))
    }

    /// [`any`](Self::any) with a strategy-typed predicate and an extra probe
    /// element passed to every call.
    pub fn any_with(&self, predicate: &impl Equivalence, extra: &Element) -> bool {
        self.any(|key, value| predicate.equiv(key, value, extra))
    }

    /// Returns `true` if any stored key is equivalent to `key` under the
    /// table's key equivalence.
    ///
    /// This scans every entry; [`contains`](Self::contains) is the hashed
    /// lookup.
    pub fn has_key(&self, key: Element) -> bool {
        self.any_with(&self.key_equiv, &key)
    }

    /// Returns `true` if any stored value is equivalent to `value` under the
    /// table's value equivalence.
    pub fn has_value(&self, value: Element) -> bool {
        self.any_with(&self.value_equiv, &value)
    }

    /// Calls `transform` on every entry with mutable access to its value.
    /// Keys are never changed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::Element;
    /// use chain_hash::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// for i in 0..3 {
    ///     table.insert(Element::int(i), Element::int(i));
    /// }
    /// table.apply_to_all(|_, value| *value = Element::int(4));
    /// assert!(table.all(|_, value| value.as_int() == 4));
    /// ```
    pub fn apply_to_all(&mut self, mut transform: impl FnMut(Element, &mut Element)) {
        self.chains
            .for_each_mut(|entry| transform(entry.key, &mut entry.value));
    }

    /// [`apply_to_all`](Self::apply_to_all) with a strategy-typed transform and
    /// an extra element passed to every call.
    pub fn apply_to_all_with(&mut self, transform: &impl Transform, extra: &Element) {
        self.apply_to_all(|key, value| transform.apply(key, value, extra));
    }

    /// Number of chains of each length: index `n` counts the buckets holding
    /// exactly `n` entries.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> Vec<usize> {
        let mut hist = Vec::new();
        for len in self.chains.chain_lengths() {
            if hist.len() <= len {
                hist.resize(len + 1, 0);
            }
            hist[len] += 1;
        }
        hist
    }

    /// Returns chain and arena statistics for the current table state.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let hist = self.chain_histogram();
        let (arena_slots, free_slots) = self.chains.arena_usage();
        DebugStats {
            populated: self.populated,
            buckets: self.chains.buckets(),
            empty_buckets: hist.first().copied().unwrap_or(0),
            longest_chain: hist.len().saturating_sub(1),
            load: self.current_load(),
            load_factor: self.load_factor,
            arena_slots,
            free_slots,
        }
    }
}

impl<H, KE, VE> Extend<(Element, Element)> for HashTable<H, KE, VE>
where
    H: ElementHasher,
    KE: Equivalence,
    VE: Equivalence,
{
    fn extend<I: IntoIterator<Item = (Element, Element)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl FromIterator<(Element, Element)> for HashTable {
    fn from_iter<I: IntoIterator<Item = (Element, Element)>>(iter: I) -> Self {
        let mut table = HashTable::new();
        table.extend(iter);
        table
    }
}

impl<'a, H, KE, VE> IntoIterator for &'a HashTable<H, KE, VE>
where
    H: ElementHasher,
    KE: Equivalence,
    VE: Equivalence,
{
    type Item = (Element, Element);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the `(key, value)` pairs of a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a> {
    inner: crate::chain::ChainIter<'a>,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = (Element, Element);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        self.remaining -= 1;
        Some((entry.key, entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use core::hash::Hasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::primes::MAX_BUCKETS;

    fn init_test_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Trace)
            .is_test(true)
            .try_init();
    }

    fn int(i: i32) -> Element {
        Element::int(i)
    }

    struct SipHash {
        k0: u64,
        k1: u64,
    }

    impl SipHash {
        fn random() -> Self {
            let mut rng = OsRng;
            Self {
                k0: rng.try_next_u64().unwrap(),
                k1: rng.try_next_u64().unwrap(),
            }
        }
    }

    impl ElementHasher for SipHash {
        fn hash(&self, key: Element) -> u64 {
            let mut h = SipHasher::new_with_keys(self.k0, self.k1);
            h.write_i32(key.as_int());
            h.finish()
        }
    }

    #[test]
    fn create_validates_shape() {
        init_test_logger();
        assert!(HashTable::create(17, 0.75, IntHash, IntKeyEquiv, IntValueEquiv).is_ok());
        assert_eq!(
            HashTable::create(18, 0.75, IntHash, IntKeyEquiv, IntValueEquiv).unwrap_err(),
            Error::InvalidCapacity { requested: 18 }
        );
        assert_eq!(
            HashTable::create(17, 0.0, IntHash, IntKeyEquiv, IntValueEquiv).unwrap_err(),
            Error::InvalidLoadFactor { requested: 0.0 }
        );
        assert!(HashTable::with_config(TableConfig::new(31, -1.0)).is_err());

        let table = HashTable::with_config(TableConfig::new(MAX_BUCKETS, 2.0)).unwrap();
        assert_eq!(table.bucket_count(), MAX_BUCKETS);
        assert_eq!(table.load_factor(), 2.0);
        assert!(table.is_empty());
    }

    #[test]
    fn lookup_on_empty_table() {
        let table = HashTable::new();
        for i in -1..17 {
            assert_eq!(table.lookup(int(i)), None);
        }
    }

    #[test]
    fn insert_and_lookup() {
        init_test_logger();
        let mut table = HashTable::new();
        for i in 0..64 {
            assert_eq!(table.insert(int(i), int(i * 2)), None);
            assert_eq!(table.lookup(int(i)), Some(int(i * 2)), "{:#?}", table);
        }
        assert_eq!(table.len(), 64);
        for i in 0..64 {
            assert_eq!(table.lookup(int(i)), Some(int(i * 2)));
        }
        assert_eq!(table.lookup(int(999)), None);
        assert!(table.chains.is_well_formed());
    }

    #[test]
    fn same_bucket_different_keys() {
        let mut table = HashTable::new();
        table.insert(int(0), int(0));
        table.insert(int(17), int(17));
        assert_eq!(table.lookup(int(17)), Some(int(17)));
        assert_eq!(table.lookup(int(0)), Some(int(0)));
        assert_eq!(table.lookup(int(34)), None);
    }

    #[test]
    fn negative_keys() {
        let mut table = HashTable::new();
        table.insert(int(-4), int(1));
        table.insert(int(i32::MIN), int(2));
        assert_eq!(table.lookup(int(-4)), Some(int(1)));
        assert_eq!(table.lookup(int(i32::MIN)), Some(int(2)));
        assert!(table.chains.is_well_formed());
    }

    #[test]
    fn update_keeps_size() {
        let mut table = HashTable::new();
        table.insert(int(1), int(1));
        assert_eq!(table.insert(int(1), int(2)), Some(int(1)));
        assert_eq!(table.lookup(int(1)), Some(int(2)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn lookup_mut_writes_through() {
        let mut table = HashTable::new();
        table.insert(int(5), int(1));
        *table.lookup_mut(int(5)).unwrap() = int(9);
        assert_eq!(table.lookup(int(5)), Some(int(9)));
        assert!(table.lookup_mut(int(6)).is_none());
    }

    #[test]
    fn remove_items() {
        let mut table = HashTable::new();
        assert_eq!(table.remove(int(1)), None);
        assert_eq!(table.len(), 0);

        for i in 1..=3 {
            table.insert(int(i), int(i * 100));
        }
        assert_eq!(table.remove(int(2)), Some(int(200)));
        assert_eq!(table.lookup(int(1)), Some(int(100)));
        assert_eq!(table.lookup(int(2)), None);
        assert_eq!(table.lookup(int(3)), Some(int(300)));
        assert_eq!(table.remove(int(2)), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn remove_all_after_growth() {
        let mut table = HashTable::new();
        for i in 0..17 {
            table.insert(int(i), int(i));
        }
        for i in 0..17 {
            assert_eq!(table.remove(int(i)), Some(int(i)));
        }
        assert_eq!(table.len(), 0);
        assert!(table.iter().next().is_none());
    }

    #[test]
    fn resize_schedule_follows_primes() {
        init_test_logger();
        let mut table = HashTable::new();

        // 13 / 17 is the first load at or over 0.75.
        for i in 0..13 {
            table.insert(int(i), int(i));
        }
        assert_eq!(table.bucket_count(), 17);
        table.insert(int(13), int(13));
        assert_eq!(table.bucket_count(), 31);

        for i in 14..17 {
            table.insert(int(i), int(i));
        }
        assert_eq!(table.len(), 17);

        table.insert(int(17), int(17));
        assert_eq!(table.bucket_count(), 31);
        assert_eq!(table.lookup(int(17)), Some(int(17)));
        for i in 0..17 {
            assert_eq!(table.lookup(int(i)), Some(int(i)));
        }
        assert!(table.chains.is_well_formed());
    }

    #[test]
    fn resize_preserves_membership() {
        let mut table = HashTable::with_strategies(SipHash::random(), IntKeyEquiv, IntValueEquiv);
        for i in 0..5000 {
            table.insert(int(i), int(-i));
        }
        assert_eq!(table.len(), 5000);
        assert_eq!(table.bucket_count(), 8191);
        for i in 0..5000 {
            assert_eq!(table.lookup(int(i)), Some(int(-i)));
        }
        assert!(table.chains.is_well_formed());
    }

    #[test]
    fn resize_ceiling_keeps_working() {
        init_test_logger();
        let mut table = HashTable::with_config(TableConfig::new(MAX_BUCKETS, 0.001)).unwrap();
        for i in 0..40_000 {
            table.insert(int(i), int(i));
        }
        assert_eq!(table.bucket_count(), MAX_BUCKETS);
        assert_eq!(table.len(), 40_000);
        assert!(table.exhausted);
        for i in (0..40_000).step_by(97) {
            assert_eq!(table.lookup(int(i)), Some(int(i)));
        }
        assert!(table.debug_stats().longest_chain >= 2);
    }

    #[test]
    fn colliding_hashes_stay_distinct() {
        let mut table = HashTable::with_strategies(|_: Element| 7u64, IntKeyEquiv, IntValueEquiv);
        for i in 0..50 {
            table.insert(int(i), int(i + 1000));
        }
        assert_eq!(table.len(), 50);
        for i in 0..50 {
            assert_eq!(table.lookup(int(i)), Some(int(i + 1000)));
        }
        assert_eq!(table.remove(int(25)), Some(int(1025)));
        assert_eq!(table.lookup(int(25)), None);
        assert_eq!(table.lookup(int(26)), Some(int(1026)));
        assert_eq!(table.len(), 49);
    }

    #[test]
    fn size_tracks_random_operations() {
        let mut rng = SmallRng::from_os_rng();
        let mut table = HashTable::with_strategies(SipHash::random(), IntKeyEquiv, IntValueEquiv);
        let mut keys: Vec<i32> = (0..2000).collect();
        keys.shuffle(&mut rng);

        for &k in &keys {
            table.insert(int(k), int(k));
        }
        let removed = rng.random_range(0..keys.len());
        for &k in &keys[..removed] {
            assert_eq!(table.remove(int(k)), Some(int(k)));
        }
        assert_eq!(table.len(), keys.len() - removed);
        for &k in &keys[removed..] {
            assert!(table.contains(int(k)));
        }
        for &k in &keys[..removed] {
            assert!(!table.contains(int(k)));
        }
        assert!(table.chains.is_well_formed());
    }

    #[test]
    fn clear_empties_but_keeps_buckets() {
        let mut table = HashTable::new();
        for i in 0..100 {
            table.insert(int(i), int(i));
        }
        let buckets = table.bucket_count();
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.bucket_count(), buckets);
        assert_eq!(table.lookup(int(3)), None);

        table.insert(int(3), int(4));
        assert_eq!(table.lookup(int(3)), Some(int(4)));
    }

    #[test]
    fn keys_and_values_pair_up() {
        let mut table = HashTable::new();
        for i in 0..3 {
            table.insert(int(i), int(i + 10));
        }
        assert_eq!(table.keys(), vec![int(0), int(1), int(2)]);
        assert_eq!(table.values(), vec![int(10), int(11), int(12)]);

        let pairs: Vec<_> = table.iter().collect();
        let zipped: Vec<_> = table.keys().into_iter().zip(table.values()).collect();
        assert_eq!(pairs, zipped);
        assert_eq!(table.iter().len(), 3);
    }

    #[test]
    fn all_and_any() {
        let mut table = HashTable::new();
        assert!(table.all(|_, _| false));
        assert!(!table.any(|_, _| true));

        for i in [0, 1, 2] {
            table.insert(int(i), int(i));
        }
        assert!(table.all(|k, _| k.as_int() < 4));
        assert!(table.any(|k, _| k.as_int() == 2));
        assert!(!table.any(|k, _| k.as_int() == 4));

        table.insert(int(4), int(4));
        table.remove(int(2));
        assert!(!table.all(|k, _| k.as_int() < 4));
    }

    #[test]
    fn predicates_short_circuit() {
        let mut table = HashTable::new();
        for i in 0..10 {
            table.insert(int(i), int(i));
        }
        let mut calls = 0;
        assert!(!table.all(|_, _| {
            calls += 1;
            false
        }));
        assert_eq!(calls, 1);

        calls = 0;
        assert!(table.any(|_, _| {
            calls += 1;
            true
        }));
        assert_eq!(calls, 1);
    }

    #[test]
    fn strategy_typed_predicates() {
        let mut table = HashTable::new();
        for i in 0..3 {
            table.insert(int(i), int(i));
        }
        let key_less = |key: Element, _: Element, x: &Element| key.as_int() < x.as_int();
        assert!(table.all_with(&key_less, &int(4)));
        assert!(!table.all_with(&key_less, &int(1)));
        assert!(table.any_with(&IntKeyEquiv, &int(2)));
        assert!(!table.any_with(&IntKeyEquiv, &int(4)));
    }

    #[test]
    fn has_key_and_has_value() {
        let mut table = HashTable::new();
        table.insert(int(1), int(7));
        assert!(table.has_key(int(1)));
        assert!(!table.has_key(int(2)));
        assert!(table.has_value(int(7)));
        assert!(!table.has_value(int(1)));
    }

    #[test]
    fn apply_to_all_rewrites_values_only() {
        let mut table = HashTable::new();
        for i in 0..3 {
            table.insert(int(i), int(i));
        }
        let set = |_: Element, value: &mut Element, x: &Element| *value = *x;
        table.apply_to_all_with(&set, &int(4));
        assert!(table.all_with(&IntValueEquiv, &int(4)));
        assert_eq!(table.keys(), vec![int(0), int(1), int(2)]);

        table.apply_to_all(|key, value| *value = Element::int(key.as_int() * 3));
        assert_eq!(table.values(), vec![int(0), int(3), int(6)]);
    }

    #[test]
    fn pointer_keys_with_custom_strategies() {
        let words = ["alpha", "beta", "gamma"];

        let knr = |key: Element| {
            // SAFETY: every key in this table points at an entry of `words`.
            let word = unsafe { *key.as_ptr::<&str>() };
            word.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64))
        };
        let same_word = |key: Element, _: Element, x: &Element| {
            // SAFETY: as above, and probes are built the same way.
            unsafe { *key.as_ptr::<&str>() == *x.as_ptr::<&str>() }
        };

        let mut table = HashTable::with_strategies(knr, same_word, IntValueEquiv);
        for (i, word) in words.iter().enumerate() {
            table.insert(Element::ptr(word as *const &str), int(i as i32));
        }
        let probe = "beta";
        assert_eq!(
            table.lookup(Element::ptr(&probe as *const &str)),
            Some(int(1))
        );
        let missing = "delta";
        assert_eq!(table.lookup(Element::ptr(&missing as *const &str)), None);
    }

    #[test]
    fn collect_and_extend() {
        let mut table: HashTable = (0..20).map(|i| (int(i), int(i))).collect();
        assert_eq!(table.len(), 20);
        table.extend((10..30).map(|i| (int(i), int(-i))));
        assert_eq!(table.len(), 30);
        assert_eq!(table.lookup(int(15)), Some(int(-15)));
        assert_eq!((&table).into_iter().count(), 30);
    }

    #[test]
    fn clone_is_independent() {
        let mut table = HashTable::new();
        for i in 0..30 {
            table.insert(int(i), int(i));
        }
        let copy = table.clone();
        table.remove(int(3));
        assert_eq!(copy.lookup(int(3)), Some(int(3)));
        assert_eq!(copy.keys().len(), 30);
        assert_eq!(copy.bucket_count(), table.bucket_count());
    }

    #[test]
    fn histogram_accounts_for_every_entry() {
        let mut table = HashTable::with_strategies(SipHash::random(), IntKeyEquiv, IntValueEquiv);
        for i in 0..500 {
            table.insert(int(i), int(i));
        }
        for i in 0..100 {
            table.remove(int(i));
        }
        let hist = table.chain_histogram();
        assert_eq!(hist.iter().sum::<usize>(), table.bucket_count());
        let entries: usize = hist.iter().enumerate().map(|(len, n)| len * n).sum();
        assert_eq!(entries, 400);

        let stats = table.debug_stats();
        assert_eq!(stats.populated, 400);
        assert_eq!(stats.arena_slots, 500);
        assert_eq!(stats.free_slots, 100);
        stats.print();
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn random_keys_against_model() {
        let mut rng = SmallRng::from_os_rng();
        let mut table = HashTable::with_strategies(SipHash::random(), IntKeyEquiv, IntValueEquiv);
        let mut model = hashbrown::HashMap::new();

        for _ in 0..20_000 {
            let key = rng.random_range(-500..500);
            if rng.random_bool(0.7) {
                let value = rng.random::<i32>();
                assert_eq!(
                    table.insert(int(key), int(value)),
                    model.insert(key, value).map(int)
                );
            } else {
                assert_eq!(table.remove(int(key)), model.remove(&key).map(int));
            }
        }

        assert_eq!(table.len(), model.len());
        for (&k, &v) in &model {
            assert_eq!(table.lookup(int(k)), Some(int(v)));
        }
        assert!(table.chains.is_well_formed());
    }
}
