//! Order-preserving map over tiles, sequential or on a rayon pool.
//!
//! The only contract the merge step relies on is that results come back in
//! the order of the inputs. Rayon's indexed `collect` guarantees that
//! regardless of which worker finished first. Closures are shared by
//! reference across workers, so they must be `Sync`; they are never
//! serialized, so capturing closures work under parallel execution too.

use crate::error::Result;
use log::debug;
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Execution {
    #[default]
    Sequential,
    /// `threads: None` runs on the global rayon pool, sized to the
    /// available hardware parallelism.
    Parallel { threads: Option<usize> },
}

impl Execution {
    pub fn parallel() -> Self {
        Execution::Parallel { threads: None }
    }

    pub fn with_threads(threads: usize) -> Self {
        Execution::Parallel {
            threads: Some(threads),
        }
    }
}

/// Apply `f` to every item and return the results in input order.
pub fn ordered_map<I, U, F>(items: Vec<I>, f: F, execution: Execution) -> Result<Vec<U>>
where
    I: Send,
    U: Send,
    F: Fn(I) -> U + Send + Sync,
{
    match execution {
        Execution::Sequential => {
            debug!("Mapping {} items sequentially", items.len());
            Ok(items.into_iter().map(f).collect())
        }
        Execution::Parallel { threads: None } => {
            debug!(
                "Mapping {} items on the global pool ({} threads)",
                items.len(),
                rayon::current_num_threads()
            );
            Ok(items.into_par_iter().map(f).collect())
        }
        Execution::Parallel {
            threads: Some(n_threads),
        } => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build()?;
            debug!(
                "Mapping {} items on a dedicated pool ({} threads)",
                items.len(),
                pool.current_num_threads()
            );
            Ok(pool.install(|| items.into_par_iter().map(f).collect()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_sequential_keeps_order() {
        let out = ordered_map((0..10).collect(), |x: i32| x * 2, Execution::Sequential).unwrap();
        assert_eq!(out, (0..10).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_parallel_keeps_order_under_uneven_work() {
        // Early items sleep longest, so they finish last
        let slow_first = |x: u64| {
            thread::sleep(Duration::from_millis(20u64.saturating_sub(x)));
            x + 1
        };
        let items: Vec<u64> = (0..20).collect();

        let sequential = ordered_map(items.clone(), slow_first, Execution::Sequential).unwrap();
        let global = ordered_map(items.clone(), slow_first, Execution::parallel()).unwrap();
        let dedicated = ordered_map(items, slow_first, Execution::with_threads(4)).unwrap();

        assert_eq!(sequential, global);
        assert_eq!(sequential, dedicated);
    }

    #[test]
    fn test_capturing_closure_in_parallel() {
        let shift = 100;
        let out = ordered_map(vec![1, 2, 3], move |x: i32| x + shift, Execution::with_threads(2)).unwrap();
        assert_eq!(out, vec![101, 102, 103]);
    }

    #[test]
    fn test_empty_input() {
        let out: Vec<i32> = ordered_map(Vec::<i32>::new(), |x| x, Execution::parallel()).unwrap();
        assert!(out.is_empty());
    }
}
