use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Controls how independent units of work are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    #[default]
    Serial,

    /// Use the global Rayon thread pool to process the units in parallel.
    Parallel,
}

/// Map every item with its index, keeping the input order in the output.
///
/// The closure must not depend on the order in which items are visited; under
/// [`ExecutionStrategy::Parallel`] they are processed concurrently.
pub fn map_indexed<I, O, F>(strategy: ExecutionStrategy, items: &[I], f: F) -> Vec<O>
where
    I: Sync,
    O: Send,
    F: Fn(usize, &I) -> O + Send + Sync,
{
    match strategy {
        ExecutionStrategy::Serial => items.iter().enumerate().map(|(i, x)| f(i, x)).collect(),
        ExecutionStrategy::Parallel => items
            .par_iter()
            .enumerate()
            .map(|(i, x)| f(i, x))
            .collect(),
    }
}
