//! Bucket heads and the entry arena behind them.
//!
//! Entries live in a single `Vec` and refer to each other by index, so a chain
//! is a sequence of indices threaded through `next`. Freed slots are threaded
//! onto a free list through the same field and reused before the arena grows.
//! Rehashing rewrites links only; an entry never moves once it has a slot.
//!
//! Every chain is kept in ascending order of the stored hash. Distinct keys
//! with equal hashes sit next to each other in an arbitrary relative order.

use alloc::vec;
use alloc::vec::Vec;

use crate::element::Element;
use crate::error::Error;

pub(crate) type Link = Option<usize>;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry {
    pub(crate) hash: u64,
    pub(crate) key: Element,
    pub(crate) value: Element,
    next: Link,
}

impl Entry {
    pub(crate) fn new(hash: u64, key: Element, value: Element) -> Self {
        Self {
            hash,
            key,
            value,
            next: None,
        }
    }
}

/// A place a link is stored: a bucket head or the `next` of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Head(usize),
    After(usize),
}

/// Result of walking a chain for a hash.
#[derive(Debug)]
pub(crate) struct Probe {
    /// Last position whose entry hash is strictly below the probed hash. A new
    /// entry for the hash is spliced in right after it.
    pub(crate) insert_after: Position,
    /// Matching entry and the position immediately before it.
    pub(crate) hit: Option<(Position, usize)>,
}

#[derive(Debug, Clone)]
pub(crate) struct Chains {
    heads: Vec<Link>,
    entries: Vec<Entry>,
    free: Link,
    free_len: usize,
}

#[inline(always)]
fn bucket_index(hash: u64, buckets: usize) -> usize {
    (hash % buckets as u64) as usize
}

/// Finds where an entry with `hash` belongs in one chain of `heads`.
fn insertion_point(heads: &[Link], entries: &[Entry], bucket: usize, hash: u64) -> Position {
    let mut prev = Position::Head(bucket);
    let mut cursor = heads[bucket];
    while let Some(idx) = cursor {
        let entry = &entries[idx];
        if entry.hash >= hash {
            break;
        }
        prev = Position::After(idx);
        cursor = entry.next;
    }
    prev
}

impl Chains {
    /// Allocates `buckets` empty chains, aborting on allocation failure.
    pub(crate) fn new(buckets: usize) -> Self {
        Self {
            heads: vec![None; buckets],
            entries: Vec::new(),
            free: None,
            free_len: 0,
        }
    }

    /// Allocates `buckets` empty chains.
    pub(crate) fn try_new(buckets: usize) -> Result<Self, Error> {
        Ok(Self {
            heads: empty_heads(buckets)?,
            entries: Vec::new(),
            free: None,
            free_len: 0,
        })
    }

    #[inline]
    pub(crate) fn buckets(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    pub(crate) fn bucket_of(&self, hash: u64) -> usize {
        bucket_index(hash, self.heads.len())
    }

    #[inline]
    pub(crate) fn entry(&self, idx: usize) -> &Entry {
        &self.entries[idx]
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, idx: usize) -> &mut Entry {
        &mut self.entries[idx]
    }

    #[inline]
    fn link(&self, pos: Position) -> Link {
        match pos {
            Position::Head(bucket) => self.heads[bucket],
            Position::After(idx) => self.entries[idx].next,
        }
    }

    #[inline]
    fn set_link(&mut self, pos: Position, link: Link) {
        match pos {
            Position::Head(bucket) => self.heads[bucket] = link,
            Position::After(idx) => self.entries[idx].next = link,
        }
    }

    /// Walks the chain of `bucket` looking for an entry with `hash` that also
    /// satisfies `eq`. The walk ends at the first entry with a larger hash.
    pub(crate) fn probe(&self, bucket: usize, hash: u64, eq: impl Fn(&Entry) -> bool) -> Probe {
        let mut insert_after = Position::Head(bucket);
        let mut prev = Position::Head(bucket);
        let mut cursor = self.heads[bucket];

        while let Some(idx) = cursor {
            let entry = &self.entries[idx];
            if entry.hash > hash {
                break;
            }
            if entry.hash < hash {
                insert_after = Position::After(idx);
            } else if eq(entry) {
                return Probe {
                    insert_after,
                    hit: Some((prev, idx)),
                };
            }
            prev = Position::After(idx);
            cursor = entry.next;
        }

        Probe {
            insert_after,
            hit: None,
        }
    }

    /// Stores `entry` in a free slot and links it in after `pos`.
    pub(crate) fn splice_after(&mut self, pos: Position, mut entry: Entry) -> Result<usize, Error> {
        entry.next = self.link(pos);
        let idx = match self.free {
            Some(idx) => {
                self.free = self.entries[idx].next;
                self.free_len -= 1;
                self.entries[idx] = entry;
                idx
            }
            None => {
                self.entries.try_reserve(1)?;
                self.entries.push(entry);
                self.entries.len() - 1
            }
        };
        self.set_link(pos, Some(idx));
        Ok(idx)
    }

    /// Unlinks the entry at `idx`, which must directly follow `prev`, and
    /// returns its slot to the free list.
    pub(crate) fn unlink(&mut self, prev: Position, idx: usize) -> Entry {
        debug_assert_eq!(self.link(prev), Some(idx));
        let entry = self.entries[idx];
        self.set_link(prev, entry.next);
        self.entries[idx].next = self.free;
        self.free = Some(idx);
        self.free_len += 1;
        entry
    }

    /// Drops every entry. The head array keeps its length.
    pub(crate) fn clear(&mut self) {
        self.heads.fill(None);
        self.entries.clear();
        self.free = None;
        self.free_len = 0;
    }

    /// Re-threads every entry into a fresh head array of `buckets` chains.
    ///
    /// On allocation failure nothing changes.
    pub(crate) fn rehash(&mut self, buckets: usize) -> Result<(), Error> {
        let mut heads = empty_heads(buckets)?;

        for bucket in 0..self.heads.len() {
            let mut cursor = self.heads[bucket].take();
            while let Some(idx) = cursor {
                cursor = self.entries[idx].next;
                let hash = self.entries[idx].hash;
                let target = bucket_index(hash, buckets);
                let pos = insertion_point(&heads, &self.entries, target, hash);
                let link = match pos {
                    Position::Head(b) => heads[b].replace(idx),
                    Position::After(p) => self.entries[p].next.replace(idx),
                };
                self.entries[idx].next = link;
            }
        }

        self.heads = heads;
        Ok(())
    }

    pub(crate) fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            chains: self,
            bucket: 0,
            cursor: None,
        }
    }

    /// Visits every entry in iteration order with mutable access.
    pub(crate) fn for_each_mut(&mut self, mut f: impl FnMut(&mut Entry)) {
        for bucket in 0..self.heads.len() {
            let mut cursor = self.heads[bucket];
            while let Some(idx) = cursor {
                let entry = &mut self.entries[idx];
                cursor = entry.next;
                f(entry);
            }
        }
    }

    /// Length of every chain, in bucket order.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.heads.iter().map(|&head| {
            let mut len = 0;
            let mut cursor = head;
            while let Some(idx) = cursor {
                len += 1;
                cursor = self.entries[idx].next;
            }
            len
        })
    }

    /// Slots allocated in the arena and how many of them are free.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn arena_usage(&self) -> (usize, usize) {
        (self.entries.len(), self.free_len)
    }

    /// Checks that every entry sits in the bucket its hash maps to and that
    /// each chain is hash-ascending.
    #[cfg(test)]
    pub(crate) fn is_well_formed(&self) -> bool {
        (0..self.heads.len()).all(|bucket| {
            let mut last = 0u64;
            let mut cursor = self.heads[bucket];
            while let Some(idx) = cursor {
                let entry = &self.entries[idx];
                if self.bucket_of(entry.hash) != bucket || entry.hash < last {
                    return false;
                }
                last = entry.hash;
                cursor = entry.next;
            }
            true
        })
    }
}

fn empty_heads(buckets: usize) -> Result<Vec<Link>, Error> {
    let mut heads = Vec::new();
    heads.try_reserve_exact(buckets)?;
    heads.resize(buckets, None);
    Ok(heads)
}

/// Walks buckets in index order and each chain front to back.
pub(crate) struct ChainIter<'a> {
    chains: &'a Chains,
    bucket: usize,
    cursor: Link,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(idx) = self.cursor {
                let entry = &self.chains.entries[idx];
                self.cursor = entry.next;
                return Some(entry);
            }
            if self.bucket >= self.chains.heads.len() {
                return None;
            }
            self.cursor = self.chains.heads[self.bucket];
            self.bucket += 1;
        }
    }
}
