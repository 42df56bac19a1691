//! Count tables: the accumulator shared by workers, the reduction and the driver
//!
//! Partial tables and the global table have the same shape, so every merge in the pipeline is the
//! same key-wise addition. The empty table is the identity.
use std::collections::hash_map;
use std::hash::Hash;
use std::iter::FromIterator;
use crate::farm::{FarmMap, new_farm};

/// Mapping from a key (usually a `(target id, context id)` pair) to how often it was seen
#[derive(Debug, Clone)]
pub struct CountTable<K: Hash + Eq> {
    counts: FarmMap<K, u64>,
}

impl<K: Hash + Eq> CountTable<K> {
    pub fn new() -> Self {
        CountTable { counts: new_farm() }
    }

    #[inline]
    pub fn increment(&mut self, key: K) {
        self.add(key, 1);
    }

    #[inline]
    pub fn add(&mut self, key: K, count: u64) {
        *self.counts.entry(key).or_insert(0) += count;
    }

    /// How often `key` was seen, zero if never
    pub fn get(&self, key: &K) -> u64 {
        self.counts.get(key).cloned().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Add every count of `other` into this table
    pub fn merge(&mut self, other: CountTable<K>) {
        // Walk the smaller table
        if other.len() > self.len() {
            let smaller = std::mem::replace(&mut self.counts, other.counts);
            for (key, count) in smaller {
                self.add(key, count);
            }
        } else {
            for (key, count) in other.counts {
                self.add(key, count);
            }
        }
    }

    /// Sum many tables into one
    pub fn sum<I: IntoIterator<Item = CountTable<K>>>(tables: I) -> Self {
        let mut total = CountTable::new();
        for table in tables {
            total.merge(table);
        }
        total
    }
}

impl<K: Hash + Eq> Default for CountTable<K> {
    fn default() -> Self {
        CountTable::new()
    }
}

impl<K: Hash + Eq> PartialEq for CountTable<K> {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}
impl<K: Hash + Eq> Eq for CountTable<K> {}

impl<K: Hash + Eq> FromIterator<(K, u64)> for CountTable<K> {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        let mut table = CountTable::new();
        table.extend(iter);
        table
    }
}

impl<K: Hash + Eq> Extend<(K, u64)> for CountTable<K> {
    fn extend<I: IntoIterator<Item = (K, u64)>>(&mut self, iter: I) {
        for (key, count) in iter {
            self.add(key, count);
        }
    }
}

impl<K: Hash + Eq> IntoIterator for CountTable<K> {
    type Item = (K, u64);
    type IntoIter = hash_map::IntoIter<K, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

impl<'a, K: Hash + Eq> IntoIterator for &'a CountTable<K> {
    type Item = (&'a K, &'a u64);
    type IntoIter = hash_map::Iter<'a, K, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}
