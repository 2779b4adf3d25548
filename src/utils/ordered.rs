//! Order-preserving parallel map.
//!
//! Work items are handed to rayon by index and every result lands in its own
//! slot of a pre-sized buffer, so `output[i]` is always `f(&input[i])` no
//! matter which worker finishes first.
//!
//! ```text
//! input   [a] [b] [c] [d]
//!          │   │   │   │      workers pick indices in any order
//! slots   [A] [B] [C] [D]     collect_into_vec writes by index
//!          └───┴───┴───┴──►   final pass reads slots 0..n
//! ```

use rayon::{ThreadPool, prelude::*};
use std::sync::atomic::{AtomicBool, Ordering};

/// Apply `f` to every element of `items` in parallel, keeping input order.
///
/// Runs inside `pool` when given, otherwise on rayon's global pool.
/// The first failure fails the whole call: workers stop picking up new
/// elements once any call has failed, and finished siblings are dropped.
pub fn ordered_map<T, R, E, F>(pool: Option<&ThreadPool>, items: &[T], f: F) -> Result<Vec<R>, E>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync + Send,
{
    match items {
        [] => return Ok(Vec::new()),
        [only] => return f(only).map(|result| vec![result]),
        _ => {}
    }

    let run = || {
        let failed = AtomicBool::new(false);
        let mut slots: Vec<Option<Result<R, E>>> = Vec::with_capacity(items.len());

        items
            .par_iter()
            .map(|item| {
                if failed.load(Ordering::Relaxed) {
                    return None;
                }
                let result = f(item);
                if result.is_err() {
                    failed.store(true, Ordering::Relaxed);
                }
                Some(result)
            })
            .collect_into_vec(&mut slots);

        // Skipped slots only exist after a failure, and that failure is
        // itself in a slot, so the loop always returns it.
        let mut results = Vec::with_capacity(slots.len());
        for slot in slots.into_iter().flatten() {
            results.push(slot?);
        }
        Ok(results)
    };

    match pool {
        Some(pool) => pool.install(run),
        None => run(),
    }
}
