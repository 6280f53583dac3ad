use crate::error::Error;
use crate::primes;

/// Load factor used when none is requested.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Shape of a new table: its starting bucket count and its load factor.
///
/// The load factor is fixed for the lifetime of the table. The bucket count
/// must be one of [`PRIMES`](crate::primes::PRIMES).
///
/// # Examples
///
/// ```rust
/// use chain_hash::TableConfig;
///
/// let config = TableConfig::default().bucket_count(127).load_factor(0.5);
/// assert!(config.validate().is_ok());
///
/// assert!(TableConfig::default().bucket_count(100).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub(crate) bucket_count: usize,
    pub(crate) load_factor: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            bucket_count: primes::DEFAULT_BUCKETS,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    /// Creates a configuration from both parameters. Nothing is checked until
    /// [`validate`](Self::validate) or table creation.
    pub fn new(bucket_count: usize, load_factor: f32) -> Self {
        Self {
            bucket_count,
            load_factor,
        }
    }

    /// Sets the starting bucket count.
    pub fn bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = bucket_count;
        self
    }

    /// Sets the load factor.
    pub fn load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Checks both parameters.
    ///
    /// The bucket count is checked first, so a configuration that is wrong in
    /// both respects reports [`Error::InvalidCapacity`].
    pub fn validate(&self) -> Result<(), Error> {
        if !primes::is_supported(self.bucket_count) {
            return Err(Error::InvalidCapacity {
                requested: self.bucket_count,
            });
        }
        if self.load_factor.is_nan() || self.load_factor <= 0.0 {
            return Err(Error::InvalidLoadFactor {
                requested: self.load_factor,
            });
        }
        Ok(())
    }
}
