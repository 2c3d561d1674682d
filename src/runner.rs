use crate::cursor::Cursor;
use crate::node::{Element, Node};
use anyhow::Result;
use rayon::prelude::*;
use tracing::debug;

/// How terminal operations evaluate a plan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecMode {
    /// Single-threaded pull traversal on the caller's thread.
    #[default]
    Sequential,
    /// Fork/join over contiguous partitions on rayon.
    ///
    /// `threads: Some(n)` evaluates on a dedicated pool of `n` threads;
    /// `partitions` overrides [`Runner::default_partitions`].
    Parallel {
        threads: Option<usize>,
        partitions: Option<usize>,
    },
}

pub struct Runner {
    pub mode: ExecMode,
    pub default_partitions: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Sequential,
            default_partitions: 2 * num_cpus::get().max(2),
        }
    }
}

impl Runner {
    #[must_use]
    pub fn for_mode(mode: ExecMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Fold every element of `chain` into an accumulator.
    ///
    /// Sequentially this is one pull traversal into one accumulator. In
    /// parallel mode each partition gets its own accumulator from `create`,
    /// and the partials are combined with `merge` in partition order, so
    /// `add`/`merge` must be associative for the result to match.
    pub(crate) fn fold<A, C, F, M>(&self, chain: &[Node], create: C, add: F, merge: M) -> Result<A>
    where
        A: Send,
        C: Fn() -> A + Send + Sync,
        F: Fn(A, Element) -> Result<A> + Send + Sync,
        M: Fn(A, A) -> Result<A>,
    {
        match self.mode {
            ExecMode::Sequential => {
                debug!(stages = chain.len(), "executing plan sequentially");
                let mut acc = create();
                for e in Cursor::open(chain)? {
                    acc = add(acc, e?)?;
                }
                Ok(acc)
            }
            ExecMode::Parallel {
                threads,
                partitions,
            } => {
                let parts = partitions.unwrap_or(self.default_partitions);
                let locals = match threads {
                    Some(t) => {
                        let pool = rayon::ThreadPoolBuilder::new().num_threads(t).build()?;
                        pool.install(|| exec_parallel(chain, parts, &create, &add))?
                    }
                    None => exec_parallel(chain, parts, &create, &add)?,
                };
                let mut it = locals.into_iter();
                let Some(mut acc) = it.next() else {
                    return Ok(create());
                };
                for other in it {
                    acc = merge(acc, other)?;
                }
                Ok(acc)
            }
        }
    }
}

/// Parallel executor: materialize the barrier prefix, then run the
/// element-wise tail and the accumulation per partition.
fn exec_parallel<A, C, F>(chain: &[Node], partitions: usize, create: &C, add: &F) -> Result<Vec<A>>
where
    A: Send,
    C: Fn() -> A + Sync,
    F: Fn(A, Element) -> Result<A> + Sync,
{
    let split = chain.iter().rposition(Node::is_barrier).map_or(1, |i| i + 1);
    let (prefix, tail) = chain.split_at(split.min(chain.len()));

    let items = Cursor::open(prefix)?.collect::<Result<Vec<Element>>>()?;
    let parts = partitions.max(1).min(items.len().max(1));
    debug!(
        prefix_stages = prefix.len(),
        tail_stages = tail.len(),
        materialized = items.len(),
        partitions = parts,
        "executing plan in parallel"
    );

    split_vec(items, parts)
        .into_par_iter()
        .map(|chunk| -> Result<A> {
            let mut acc = create();
            for e in Cursor::over(chunk, tail)? {
                acc = add(acc, e?)?;
            }
            Ok(acc)
        })
        .collect()
}

/// Split `v` into at most `n` contiguous chunks, preserving order.
fn split_vec<T>(mut v: Vec<T>, n: usize) -> Vec<Vec<T>> {
    let len = v.len();
    if n <= 1 || len <= 1 {
        return vec![v];
    }
    let chunk = len.div_ceil(n);
    let mut out = Vec::with_capacity(n);
    while v.len() > chunk {
        let rest = v.split_off(chunk);
        out.push(v);
        v = rest;
    }
    out.push(v);
    out
}

#[cfg(test)]
mod tests {
    use super::split_vec;

    #[test]
    fn split_vec_keeps_order_and_sizes() {
        let parts = split_vec((0..10).collect::<Vec<_>>(), 3);
        assert_eq!(parts, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
    }

    #[test]
    fn split_vec_small_inputs_stay_whole() {
        assert_eq!(split_vec(vec![1], 8), vec![vec![1]]);
        assert_eq!(split_vec(Vec::<u8>::new(), 8), vec![Vec::<u8>::new()]);
        assert_eq!(split_vec(vec![1, 2, 3], 1), vec![vec![1, 2, 3]]);
    }
}
