//! The [`Stream`] handle and its intermediate (lazy) operations.
//!
//! Every intermediate operation appends one node to the stream's pipeline and
//! returns a new handle; nothing is evaluated until a terminal operation in
//! [`terminal`](crate::terminal) runs. Each node's
//! [`Characteristics`] are derived from its upstream when it is appended.

use crate::characteristics::{Characteristic, Characteristics};
use crate::cursor::Cursor;
use crate::error::StreamError;
use crate::node::{Element, ElementIter, Node, SeenFilter, boxed, ok_boxed, peek_ref, unbox};
use crate::pipeline::Pipeline;
use crate::planner::{self, PlanExplanation};
use crate::runner::ExecMode;
use crate::NodeId;
use anyhow::Result;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

/// Bound for stream elements: owned, thread-transferable values.
pub trait StreamItem: 'static + Send {}
impl<T> StreamItem for T where T: 'static + Send {}

/// A lazy, single-use sequence of `T`.
///
/// Cloning a `Stream` clones the handle, not the elements: all clones refer to
/// the same sequence, and only one of them may be evaluated or extended. Any
/// later attempt fails at its terminal operation with
/// [`StreamError::AlreadyConsumed`].
pub struct Stream<T> {
    pub(crate) pipeline: Pipeline,
    pub(crate) id: NodeId,
    _t: PhantomData<fn() -> T>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            id: self.id,
            _t: PhantomData,
        }
    }
}

impl<T: StreamItem> Stream<T> {
    pub(crate) const fn from_parts(pipeline: Pipeline, id: NodeId) -> Self {
        Self {
            pipeline,
            id,
            _t: PhantomData,
        }
    }

    fn then<U, D>(self, node: Node, derive: D) -> Stream<U>
    where
        U: StreamItem,
        D: FnOnce(Characteristics) -> Characteristics,
    {
        let id = self.pipeline.append(self.id, node, derive);
        Stream::from_parts(self.pipeline, id)
    }

    /// Apply `f` to each element.
    pub fn map<U, F>(self, f: F) -> Stream<U>
    where
        U: StreamItem,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let op = Arc::new(move |e: Element| -> Result<Element> { Ok(boxed(f(unbox::<T>(e)?))) });
        self.then(Node::Map(op), |c| {
            c.without(Characteristic::SORTED)
                .without(Characteristic::DISTINCT)
        })
    }

    /// Keep the elements for which `pred` holds.
    pub fn filter<F>(self, pred: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let op = Arc::new(move |e: &Element| -> Result<bool> { Ok(pred(peek_ref::<T>(e)?)) });
        self.then(Node::Filter(op), |c| c.without(Characteristic::SIZED))
    }

    /// Replace each element with the elements of `f(element)`, in order.
    pub fn flat_map<U, I, F>(self, f: F) -> Stream<U>
    where
        U: StreamItem,
        I: IntoIterator<Item = U>,
        I::IntoIter: Send + 'static,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        let op = Arc::new(move |e: Element| -> Result<ElementIter> {
            let inner = f(unbox::<T>(e)?).into_iter().map(ok_boxed);
            Ok(Box::new(inner))
        });
        self.then(Node::FlatMap(op), flattened)
    }

    /// Replace each element with the elements of the stream `f` returns.
    ///
    /// The returned sub-stream is consumed. Returning `None` is an error
    /// ([`StreamError::NullSubSequence`]); return [`Stream::empty`] to
    /// contribute nothing.
    pub fn flat_map_stream<U, F>(self, f: F) -> Stream<U>
    where
        U: StreamItem,
        F: Fn(T) -> Option<Stream<U>> + Send + Sync + 'static,
    {
        let op = Arc::new(move |e: Element| -> Result<ElementIter> {
            let sub = f(unbox::<T>(e)?).ok_or(StreamError::NullSubSequence)?;
            let plan = planner::plan(&sub.pipeline, sub.id)?;
            Ok(Box::new(Cursor::open(&plan.nodes)?))
        });
        self.then(Node::FlatMap(op), flattened)
    }

    /// Drop elements equal to one already seen, keeping first occurrences.
    pub fn distinct(self) -> Self
    where
        T: Eq + Hash + Clone,
    {
        self.distinct_by_key(T::clone)
    }

    /// Keep only the first element for each `key`.
    pub(crate) fn distinct_by_key<K, F>(self, key: F) -> Self
    where
        K: Eq + Hash + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        let key = Arc::new(key);
        let factory = Arc::new(move || -> SeenFilter {
            let key = Arc::clone(&key);
            let mut seen: HashSet<K> = HashSet::new();
            Box::new(move |e: &Element| -> Result<bool> {
                Ok(seen.insert(key(peek_ref::<T>(e)?)))
            })
        });
        self.then(Node::Distinct(factory), |c| {
            c.with(Characteristic::DISTINCT)
                .without(Characteristic::SIZED)
        })
    }

    /// Sort by natural order. Buffers the whole upstream on first pull.
    pub fn sorted(self) -> Self
    where
        T: Ord,
    {
        self.sorted_by(Ord::cmp)
    }

    /// Sort with `cmp` (stable). Buffers the whole upstream on first pull.
    pub fn sorted_by<F>(self, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let op = Arc::new(move |all: Vec<Element>| -> Result<Vec<Element>> {
            let mut v = all.into_iter().map(unbox::<T>).collect::<Result<Vec<T>>>()?;
            v.sort_by(|a, b| cmp(a, b));
            Ok(v.into_iter().map(boxed).collect())
        });
        self.then(Node::Sorted(op), sorted_flags)
    }

    /// Truncate to the first `n` elements. Upstream is not pulled past the
    /// `n`th element, so this bounds infinite sources.
    pub fn limit(self, n: u64) -> Self {
        self.then(Node::Limit(n), |c| {
            let size = c.exact_size().map(|s| s.min(n));
            c.with_size(size)
        })
    }

    /// Discard the first `n` elements.
    pub fn skip(self, n: u64) -> Self {
        self.then(Node::Skip(n), |c| {
            let size = c.exact_size().map(|s| s.saturating_sub(n));
            c.with_size(size)
        })
    }

    /// Call `f` on each element as it is traversed.
    ///
    /// `f` only runs for elements a terminal operation actually pulls: a
    /// short-circuiting terminal, or `count()` on a sized stream, may skip it.
    pub fn peek<F>(self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let op = Arc::new(move |e: &Element| -> Result<()> {
            f(peek_ref::<T>(e)?);
            Ok(())
        });
        self.then(Node::Peek(op), |c| c)
    }

    /// Keep elements up to (excluding) the first one failing `pred`.
    ///
    /// Unordered streams are processed in the order their source yields
    /// elements.
    pub fn take_while<F>(self, pred: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let op = Arc::new(move |e: &Element| -> Result<bool> { Ok(pred(peek_ref::<T>(e)?)) });
        self.then(Node::TakeWhile(op), |c| c.without(Characteristic::SIZED))
    }

    /// Drop elements up to (excluding) the first one failing `pred`, then
    /// keep everything.
    ///
    /// Unordered streams are processed in the order their source yields
    /// elements.
    pub fn drop_while<F>(self, pred: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let op = Arc::new(move |e: &Element| -> Result<bool> { Ok(pred(peek_ref::<T>(e)?)) });
        self.then(Node::DropWhile(op), |c| c.without(Characteristic::SIZED))
    }

    /// Give up encounter-order guarantees.
    pub fn unordered(self) -> Self {
        self.then(Node::Unordered, |c| c.without(Characteristic::ORDERED))
    }

    /// Evaluate terminal operations with the default parallel configuration.
    pub fn parallel(self) -> Self {
        self.with_mode(ExecMode::Parallel {
            threads: None,
            partitions: None,
        })
    }

    /// Evaluate terminal operations on the caller's thread.
    pub fn sequential(self) -> Self {
        self.with_mode(ExecMode::Sequential)
    }

    /// Set the execution mode for the whole pipeline.
    pub fn with_mode(self, mode: ExecMode) -> Self {
        self.pipeline.set_mode(mode);
        self
    }

    #[must_use]
    pub fn is_parallel(&self) -> bool {
        matches!(self.pipeline.mode(), ExecMode::Parallel { .. })
    }

    /// Id of this stream's node in its pipeline graph.
    #[must_use]
    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    /// Known properties of this stream. Does not consume it.
    #[must_use]
    pub fn characteristics(&self) -> Characteristics {
        self.pipeline.characteristics(self.id)
    }

    /// Describe this stream's plan. Does not consume it.
    ///
    /// # Errors
    /// Fails only if the pipeline graph is missing a node of the chain.
    pub fn explain(&self) -> Result<PlanExplanation> {
        planner::explain(&self.pipeline, self.id)
    }
}

impl<T: StreamItem> Stream<Option<T>> {
    /// Sort the present values with `cmp`, a comparator that does not
    /// accept `None`: evaluation fails with [`StreamError::NullElement`] if
    /// any element is `None`.
    ///
    /// Plain [`sorted`](Stream::sorted) on `Option<T>` puts `None` first
    /// instead.
    pub fn strict_sorted_by<F>(self, cmp: F) -> Stream<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        let op = Arc::new(move |all: Vec<Element>| -> Result<Vec<Element>> {
            let mut v = Vec::with_capacity(all.len());
            for e in all {
                let value = unbox::<Option<T>>(e)?
                    .ok_or(StreamError::NullElement { operation: "sorted" })?;
                v.push(value);
            }
            v.sort_by(|a, b| cmp(a, b));
            Ok(v.into_iter().map(boxed).collect())
        });
        self.then(Node::Sorted(op), sorted_flags)
    }
}

fn flattened(c: Characteristics) -> Characteristics {
    c.without(Characteristic::SORTED)
        .without(Characteristic::DISTINCT)
        .without(Characteristic::SIZED)
}

fn sorted_flags(c: Characteristics) -> Characteristics {
    c.with(Characteristic::SORTED).with(Characteristic::ORDERED)
}
