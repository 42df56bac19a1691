//! Worker pool with unordered completion
use std::sync::atomic::{AtomicUsize, Ordering};
use crossbeam_channel::unbounded;
use rayon::{ThreadPool, ThreadPoolBuilder};
use crate::errors::*;

/// A fixed set of worker threads, shared by the counting and the reduction stages
pub struct Pool {
    workers: ThreadPool,
    dispatched: AtomicUsize,
}

impl Pool {
    /// Start `workers` threads, or one per logical CPU when `workers` is 0
    pub fn new(workers: usize) -> Result<Pool> {
        let workers = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("distsem-worker-{}", i))
            .build()?;
        Ok(Pool { workers, dispatched: AtomicUsize::new(0) })
    }

    pub fn size(&self) -> usize {
        self.workers.current_num_threads()
    }

    /// How many tasks were handed to the workers so far
    pub fn dispatched(&self) -> usize {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Run `f` on every item, returning results in the order they complete
    ///
    /// Blocks until every task is done. Nothing about the output order is guaranteed.
    pub fn map_unordered<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
        where T: Send, R: Send, F: Fn(T) -> R + Sync {
        let (sender, receiver) = unbounded();
        let f = &f;
        self.dispatched.fetch_add(items.len(), Ordering::Relaxed);
        self.workers.scope(|scope| {
            for item in items {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    // The receiver outlives the scope, so this can't fail
                    let _ = sender.send(f(item));
                });
            }
        });
        drop(sender);
        receiver.into_iter().collect()
    }

    /// Run `op` inside the pool, so rayon parallel iterators in it use these workers
    pub fn install<OP, R>(&self, op: OP) -> R
        where OP: FnOnce() -> R + Send, R: Send {
        self.workers.install(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use std::thread;

    #[test]
    fn every_item_comes_back_once() {
        let pool = Pool::new(4).unwrap();
        let mut squares = pool.map_unordered((0..100u64).collect(), |x| x * x);
        squares.sort();
        assert_eq!(squares, (0..100u64).map(|x| x * x).collect::<Vec<_>>());
        assert_eq!(pool.dispatched(), 100);
    }

    #[test]
    fn results_arrive_in_completion_order() {
        let pool = Pool::new(2).unwrap();
        let order = pool.map_unordered(vec![300u64, 0], |delay| {
            thread::sleep(Duration::from_millis(delay));
            delay
        });
        assert_eq!(order, vec![0, 300]);
    }

    #[test]
    fn nothing_to_do() {
        let pool = Pool::new(1).unwrap();
        let out: Vec<u8> = pool.map_unordered(vec![], |x: u8| x);
        assert!(out.is_empty());
        assert_eq!(pool.size(), 1);
    }
}
