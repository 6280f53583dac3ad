/// Bucket counts a table may use, in growth order.
pub const PRIMES: [usize; 11] = [17, 31, 67, 127, 257, 509, 1021, 2053, 4099, 8191, 16381];

/// Bucket count used when none is requested.
pub const DEFAULT_BUCKETS: usize = PRIMES[0];

/// The largest bucket count; a table at this size never grows again.
pub const MAX_BUCKETS: usize = PRIMES[PRIMES.len() - 1];

/// Position of `buckets` in [`PRIMES`], if it is one of them.
#[inline]
pub fn index_of(buckets: usize) -> Option<usize> {
    PRIMES.binary_search(&buckets).ok()
}

/// Returns `true` if `buckets` is a valid bucket count.
#[inline]
pub fn is_supported(buckets: usize) -> bool {
    index_of(buckets).is_some()
}

/// The bucket count that follows the one at `index`, or `None` at the top of
/// the sequence.
#[inline]
pub(crate) fn next_after(index: usize) -> Option<(usize, usize)> {
    let next = index + 1;
    PRIMES.get(next).map(|&p| (next, p))
}
