//! Terminal operations: the calls that actually evaluate a stream.
//!
//! Every terminal operation first plans the stream, which consumes it (see
//! [`planner`](crate::planner)), then either folds every element through the
//! [`Runner`] (sequentially or in parallel, following the pipeline's
//! [`ExecMode`](crate::ExecMode)) or pulls elements one at a time from a
//! [`Cursor`] and stops as soon as the answer is known.
//!
//! Folding operations: `for_each`, `for_each_ordered`, `reduce*`, `count`,
//! `min*`/`max*`, `to_vec`, `collect*`.
//!
//! Short-circuiting operations, always pulled on the caller's thread so they
//! stay lazy over infinite sources: `any_match`, `all_match`, `none_match`,
//! `find_first`, `find_any`.

use crate::collectors::Collector;
use crate::cursor::{Cursor, Typed};
use crate::error::StreamError;
use crate::node::unbox;
use crate::planner::{self, Plan};
use crate::runner::Runner;
use crate::stream::{Stream, StreamItem};
use anyhow::Result;
use std::cmp::Ordering;
use tracing::debug;

/// Fold the typed elements of `plan` with the runner for its mode.
fn fold_plan<T, A, C, F, M>(plan: &Plan, create: C, add: F, merge: M) -> Result<A>
where
    T: StreamItem,
    A: Send,
    C: Fn() -> A + Send + Sync,
    F: Fn(A, T) -> Result<A> + Send + Sync,
    M: Fn(A, A) -> Result<A>,
{
    Runner::for_mode(plan.mode).fold(
        &plan.nodes,
        create,
        |acc, e| add(acc, unbox::<T>(e)?),
        merge,
    )
}

/// `candidate` replaces `current` only if strictly smaller.
fn keep_min<T, F: Fn(&T, &T) -> Ordering>(current: T, candidate: T, cmp: &F) -> T {
    if cmp(&candidate, &current) == Ordering::Less {
        candidate
    } else {
        current
    }
}

/// `candidate` replaces `current` only if strictly greater.
fn keep_max<T, F: Fn(&T, &T) -> Ordering>(current: T, candidate: T, cmp: &F) -> T {
    if cmp(&candidate, &current) == Ordering::Greater {
        candidate
    } else {
        current
    }
}

fn merge_options<T>(a: Option<T>, b: Option<T>, pick: impl FnOnce(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

impl<T: StreamItem> Stream<T> {
    fn consume(self) -> Result<Plan> {
        planner::plan(&self.pipeline, self.id)
    }

    fn fold<A, C, F, M>(self, create: C, add: F, merge: M) -> Result<A>
    where
        A: Send,
        C: Fn() -> A + Send + Sync,
        F: Fn(A, T) -> Result<A> + Send + Sync,
        M: Fn(A, A) -> Result<A>,
    {
        let plan = self.consume()?;
        fold_plan(&plan, create, add, merge)
    }

    /// Open a sequential pull over this stream, regardless of its mode.
    fn pull(self) -> Result<Typed<T>> {
        let plan = self.consume()?;
        debug!(stages = plan.nodes.len(), "pulling plan sequentially");
        Ok(Cursor::open(&plan.nodes)?.typed())
    }

    /// Call `f` on every element. In parallel mode the calls happen on
    /// worker threads in no particular order.
    pub fn for_each<F>(self, f: F) -> Result<()>
    where
        F: Fn(T) + Send + Sync,
    {
        self.fold(
            || (),
            |(), t| {
                f(t);
                Ok(())
            },
            |(), ()| Ok(()),
        )
    }

    /// Call `f` on every element in encounter order, on the caller's thread.
    ///
    /// In parallel mode the stages still run on the pool; the results are
    /// gathered in order before `f` sees them.
    pub fn for_each_ordered<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut(T),
    {
        if self.is_parallel() {
            self.to_vec()?.into_iter().for_each(f);
            return Ok(());
        }
        for t in self.pull()? {
            f(t?);
        }
        Ok(())
    }

    /// Combine all elements with `op`; `None` when the stream is empty.
    pub fn reduce<F>(self, op: F) -> Result<Option<T>>
    where
        F: Fn(T, T) -> T + Send + Sync,
    {
        let op = &op;
        self.fold(
            || None,
            |acc, t| Ok(Some(match acc {
                Some(a) => op(a, t),
                None => t,
            })),
            |a, b| Ok(merge_options(a, b, op)),
        )
    }

    /// Combine all elements with `op`, starting from `identity`.
    ///
    /// `identity` seeds every parallel partition, so it must be a true identity
    /// for `op`.
    pub fn reduce_from<F>(self, identity: T, op: F) -> Result<T>
    where
        T: Clone + Sync,
        F: Fn(T, T) -> T + Send + Sync,
    {
        let op = &op;
        self.fold(|| identity.clone(), |a, t| Ok(op(a, t)), |a, b| Ok(op(a, b)))
    }

    /// Reduce into a different type: `accumulator` folds elements into `U`,
    /// `combiner` joins partial results of parallel partitions.
    pub fn reduce_combine<U, F, M>(self, identity: U, accumulator: F, combiner: M) -> Result<U>
    where
        U: Clone + Send + Sync,
        F: Fn(U, T) -> U + Send + Sync,
        M: Fn(U, U) -> U,
    {
        self.fold(
            || identity.clone(),
            |u, t| Ok(accumulator(u, t)),
            |a, b| Ok(combiner(a, b)),
        )
    }

    /// Number of elements.
    ///
    /// A stream whose exact size is known from its plan is not traversed, so
    /// stages such as [`peek`](Stream::peek) do not run.
    pub fn count(self) -> Result<u64> {
        let plan = self.consume()?;
        if let Some(n) = plan.characteristics.exact_size() {
            debug!(n, "count answered from plan size");
            return Ok(n);
        }
        fold_plan(&plan, || 0u64, |n, _: T| Ok(n + 1), |a, b| Ok(a + b))
    }

    /// Whether any element satisfies `pred`. Stops at the first match.
    pub fn any_match<F>(self, mut pred: F) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        for t in self.pull()? {
            if pred(&t?) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether every element satisfies `pred` (true when empty). Stops at the
    /// first counterexample.
    pub fn all_match<F>(self, mut pred: F) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        for t in self.pull()? {
            if !pred(&t?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether no element satisfies `pred` (true when empty).
    pub fn none_match<F>(self, mut pred: F) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        Ok(!self.any_match(|t| pred(t))?)
    }

    /// The first element in encounter order.
    pub fn find_first(self) -> Result<Option<T>> {
        self.pull()?.next().transpose()
    }

    /// Some element of the stream. This implementation returns the first one
    /// pulled, but callers should not rely on which.
    pub fn find_any(self) -> Result<Option<T>> {
        self.pull()?.next().transpose()
    }

    /// The smallest element under `cmp`; the first one among equals.
    pub fn min_by<F>(self, cmp: F) -> Result<Option<T>>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync,
    {
        let cmp = &cmp;
        self.fold(
            || None,
            |acc, t| Ok(Some(match acc {
                Some(cur) => keep_min(cur, t, cmp),
                None => t,
            })),
            |a, b| Ok(merge_options(a, b, |a, b| keep_min(a, b, cmp))),
        )
    }

    /// The largest element under `cmp`; the first one among equals.
    pub fn max_by<F>(self, cmp: F) -> Result<Option<T>>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync,
    {
        let cmp = &cmp;
        self.fold(
            || None,
            |acc, t| Ok(Some(match acc {
                Some(cur) => keep_max(cur, t, cmp),
                None => t,
            })),
            |a, b| Ok(merge_options(a, b, |a, b| keep_max(a, b, cmp))),
        )
    }

    pub fn min(self) -> Result<Option<T>>
    where
        T: Ord,
    {
        self.min_by(Ord::cmp)
    }

    pub fn max(self) -> Result<Option<T>>
    where
        T: Ord,
    {
        self.max_by(Ord::cmp)
    }

    /// All elements, in encounter order.
    pub fn to_vec(self) -> Result<Vec<T>> {
        self.fold(
            Vec::new,
            |mut v, t| {
                v.push(t);
                Ok(v)
            },
            |mut a, b| {
                a.extend(b);
                Ok(a)
            },
        )
    }

    /// Accumulate all elements with `collector`.
    ///
    /// In parallel mode each partition gets its own accumulator and the
    /// partials are merged in encounter order; a collector that cannot merge
    /// fails with [`StreamError::MergeUnsupported`] once there is more than
    /// one partition.
    ///
    /// ```
    /// use ironstream::{Stream, collectors::joining_with};
    ///
    /// let s = Stream::of(vec!["a", "b", "c"]).collect(joining_with(", ")).unwrap();
    /// assert_eq!(s, "a, b, c");
    /// ```
    pub fn collect<C, A, O>(self, collector: C) -> Result<O>
    where
        C: Collector<T, A, O>,
        A: Send,
    {
        let c = &collector;
        let acc = self.fold(
            || c.create(),
            |mut acc, t| {
                c.add_input(&mut acc, t)?;
                Ok(acc)
            },
            |mut acc, other| {
                c.merge(&mut acc, other)?;
                Ok(acc)
            },
        )?;
        Ok(collector.finish(acc))
    }

    /// Mutable reduction from three functions: `supplier` creates a container,
    /// `accumulator` adds one element, `combiner` folds a later partition's
    /// container into an earlier one.
    pub fn collect_with<R, S, F, M>(self, supplier: S, accumulator: F, combiner: M) -> Result<R>
    where
        R: Send,
        S: Fn() -> R + Send + Sync,
        F: Fn(&mut R, T) + Send + Sync,
        M: Fn(&mut R, R),
    {
        self.fold(
            supplier,
            |mut r, t| {
                accumulator(&mut r, t);
                Ok(r)
            },
            |mut a, b| {
                combiner(&mut a, b);
                Ok(a)
            },
        )
    }
}

impl<T: StreamItem> Stream<Option<T>> {
    /// Like [`min_by`](Stream::min_by) with a comparator that does not
    /// accept `None`: any `None` element fails the whole evaluation with
    /// [`StreamError::NullElement`].
    pub fn strict_min_by<F>(self, cmp: F) -> Result<Option<T>>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync,
    {
        let cmp = &cmp;
        self.fold(
            || None,
            |acc, t: Option<T>| {
                let t = t.ok_or(StreamError::NullElement { operation: "min" })?;
                Ok(Some(match acc {
                    Some(cur) => keep_min(cur, t, cmp),
                    None => t,
                }))
            },
            |a, b| Ok(merge_options(a, b, |a, b| keep_min(a, b, cmp))),
        )
    }

    /// Like [`max_by`](Stream::max_by); `None` elements fail with
    /// [`StreamError::NullElement`].
    pub fn strict_max_by<F>(self, cmp: F) -> Result<Option<T>>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync,
    {
        let cmp = &cmp;
        self.fold(
            || None,
            |acc, t: Option<T>| {
                let t = t.ok_or(StreamError::NullElement { operation: "max" })?;
                Ok(Some(match acc {
                    Some(cur) => keep_max(cur, t, cmp),
                    None => t,
                }))
            },
            |a, b| Ok(merge_options(a, b, |a, b| keep_max(a, b, cmp))),
        )
    }
}
