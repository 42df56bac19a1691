//! Faster (but not DoS-resistant) hashmap
use std::collections::HashMap;
use std::hash::{Hash, Hasher, BuildHasherDefault};

/// Act like a streaming farmhash
///
/// Farmhash isn't a streaming hash, so every write is hashed with the state so far as its seed.
/// Keys such as `(u32, u32)` or `(String, Option<String>)` arrive as several writes and each one
/// has to reach the final value.
pub struct FarmChain(u64);

impl Default for FarmChain {
    #[inline]
    fn default() -> FarmChain { FarmChain(0) }
}

impl Hasher for FarmChain {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.0 = farmhash::hash64_with_seed(bytes, self.0);
    }
}

pub type Farm = BuildHasherDefault<FarmChain>;
pub type FarmMap<X, Y> = HashMap<X, Y, Farm>;

pub fn new_farm<X: Hash+Eq, Y>() -> FarmMap<X, Y> {
    Default::default()
}
