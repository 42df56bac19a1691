//! Hierarchical reduction of count tables
//!
//! Summing thousands of partial tables into one on a single thread is slow, and holding all of
//! them until the end costs too much memory. Instead the tables are summed in chunks on the
//! worker pool, then the chunk sums are summed in chunks, and so on until one table is left.
//! Every level is `chunk_size` times shorter than the one before.
use std::hash::Hash;
use crate::counts::CountTable;
use crate::errors::*;
use crate::pool::Pool;

/// Default number of tables summed by one task
pub const DEFAULT_CHUNK_SIZE: usize = 7;

/// Split `items` into consecutive runs of at most `size`
pub fn chunked<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    assert!(size > 0, "chunks must hold at least one item");
    let mut chunks = Vec::with_capacity((items.len() + size - 1) / size);
    let mut items = items.into_iter().peekable();
    while items.peek().is_some() {
        chunks.push(items.by_ref().take(size).collect());
    }
    chunks
}

/// Sum one chunk; a chunk of one is passed through
fn sum_chunk<K: Hash + Eq>(mut chunk: Vec<CountTable<K>>) -> CountTable<K> {
    if chunk.len() == 1 {
        if let Some(table) = chunk.pop() {
            return table;
        }
    }
    debug!("Summing up {} tables.", chunk.len());
    CountTable::sum(chunk)
}

/// Sum all `tables` into one, `chunk_size` tables per task
///
/// A single table is returned as it is without touching the pool. The result doesn't depend on
/// the order of `tables` or on `chunk_size`.
pub fn sum_tables<K>(mut tables: Vec<CountTable<K>>, pool: &Pool, chunk_size: usize)
    -> Result<CountTable<K>>
    where K: Hash + Eq + Send {
    if chunk_size < 2 {
        return Err(Error::InvalidConfig(format!(
            "the chunk size must be at least 2 to make progress, not {}", chunk_size)));
    }
    loop {
        if tables.len() == 1 {
            if let Some(table) = tables.pop() {
                debug!("Got results for a chunk.");
                return Ok(table);
            }
        }
        if tables.is_empty() {
            return Err(Error::EmptyReduction);
        }
        debug!("Summing up {} tables in chunks of {}.", tables.len(), chunk_size);
        tables = pool.map_unordered(chunked(tables, chunk_size), sum_chunk);
    }
}
