use {crate::RingPosition, xxhash_rust::xxh3::xxh3_64_with_seed};

/// A strategy for placing string keys on the ring.
///
/// Both virtual node keys and routed object keys go through the same
/// function, so it must be deterministic for the lifetime of the router. Any
/// `Fn(&str) -> RingPosition` closure can be used directly.
pub trait HashingFunction {
    /// Returns ring position for a given key.
    fn hash(&self, key: &str) -> RingPosition;
}

impl<F> HashingFunction for F
where
    F: Fn(&str) -> RingPosition,
{
    fn hash(&self, key: &str) -> RingPosition {
        self(key)
    }
}

/// Hashes keys with MD5 and keeps the first 4 digest bytes.
///
/// The bytes are read as a big-endian `u32`, so positions fall into
/// `[0, 2^32)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Md5Hashing;

impl Md5Hashing {
    pub fn new() -> Self {
        Self
    }
}

impl HashingFunction for Md5Hashing {
    fn hash(&self, key: &str) -> RingPosition {
        let md5::Digest(digest) = md5::compute(key.as_bytes());
        let prefix = [digest[0], digest[1], digest[2], digest[3]];
        RingPosition::from(u32::from_be_bytes(prefix))
    }
}

/// Seed used by [`Xxh3Hashing::new`].
///
/// XXH3 accepts any seed; changing it reshuffles the whole ring.
pub const DEFAULT_SEED: u64 = 12345;

/// A faster, non-cryptographic alternative that spans the full 64-bit ring.
#[derive(Clone, Copy, Debug)]
pub struct Xxh3Hashing {
    seed: u64,
}

impl Default for Xxh3Hashing {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl Xxh3Hashing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl HashingFunction for Xxh3Hashing {
    fn hash(&self, key: &str) -> RingPosition {
        xxh3_64_with_seed(key.as_bytes(), self.seed)
    }
}

/// Default hashing function.
pub type DefaultHashing = Md5Hashing;
