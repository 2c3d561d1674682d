//! Sources: where a stream's elements come from.
//!
//! ### Overview
//! - [`from_vec`] / [`from_iter`] -- attach an in-memory source to an existing [`Pipeline`].
//! - [`Stream::of`], [`Stream::empty`], [`Stream::of_nullable`] -- finite, ordered, sized.
//! - [`Stream::iterate`] / [`Stream::iterate_while`] -- `seed, f(seed), ...`, ordered.
//! - [`Stream::generate`] -- repeated supplier calls, unordered.
//! - [`Stream::concat`] -- one stream after another.
//!
//! `iterate` and `generate` are infinite: evaluating them without a bounding
//! stage such as [`Stream::limit`] or [`Stream::take_while`] never finishes.
//! That is a caller contract, not a runtime error.
//!
//! ### Example
//! ```
//! use ironstream::Stream;
//!
//! let powers = Stream::iterate(2, |x: &i32| x * 2).limit(5).to_vec().unwrap();
//! assert_eq!(powers, vec![2, 4, 8, 16, 32]);
//! ```

use crate::characteristics::{Characteristic, Characteristics};
use crate::error::StreamError;
use crate::node::{ElementIter, Node, Opener, SourceKind, ok_boxed};
use crate::pipeline::Pipeline;
use crate::planner;
use crate::runner::ExecMode;
use crate::stream::{Stream, StreamItem};
use anyhow::Result;
use std::iter;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Create a [`Stream<T>`] over `data` as a new source node in `p`.
///
/// The vector is moved into the source and handed out once, on evaluation.
pub fn from_vec<T: StreamItem>(p: &Pipeline, data: Vec<T>) -> Stream<T> {
    let len = data.len() as u64;
    let slot = Mutex::new(Some(data));
    let open: Opener = Arc::new(move || -> Result<ElementIter> {
        let data = slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(StreamError::AlreadyConsumed)?;
        Ok(Box::new(data.into_iter().map(ok_boxed)))
    });
    source(p, SourceKind::Values, Characteristics::sized_ordered(len), open)
}

/// Create a [`Stream<T>`] from any iterable, collected into memory first.
pub fn from_iter<T, I>(p: &Pipeline, iter: I) -> Stream<T>
where
    T: StreamItem,
    I: IntoIterator<Item = T>,
{
    from_vec(p, iter.into_iter().collect())
}

pub(crate) fn source<T: StreamItem>(
    p: &Pipeline,
    kind: SourceKind,
    characteristics: Characteristics,
    open: Opener,
) -> Stream<T> {
    let id = p.insert_node(Node::Source { kind, open }, characteristics);
    Stream::from_parts(p.clone(), id)
}

impl<T: StreamItem> Stream<T> {
    /// A stream over `values`, in order.
    pub fn of(values: Vec<T>) -> Self {
        from_vec(&Pipeline::default(), values)
    }

    /// A stream with no elements.
    pub fn empty() -> Self {
        Self::empty_in(&Pipeline::default())
    }

    /// One element when `value` is `Some`, otherwise empty.
    pub fn of_nullable(value: Option<T>) -> Self {
        value.map_or_else(Self::empty, |v| Self::of(vec![v]))
    }

    /// The infinite sequence `seed, next(seed), next(next(seed)), ...`.
    ///
    /// `next` is only called when the following element is pulled.
    pub fn iterate<F>(seed: T, next: F) -> Self
    where
        T: Clone + Sync,
        F: Fn(&T) -> T + Send + Sync + 'static,
    {
        Self::iterate_while(seed, |_| true, next)
    }

    /// Like [`Stream::iterate`], ending before the first element for which
    /// `has_next` fails.
    pub fn iterate_while<P, F>(seed: T, has_next: P, next: F) -> Self
    where
        T: Clone + Sync,
        P: Fn(&T) -> bool + Send + Sync + 'static,
        F: Fn(&T) -> T + Send + Sync + 'static,
    {
        let has_next = Arc::new(has_next);
        let next = Arc::new(next);
        let open: Opener = Arc::new(move || -> Result<ElementIter> {
            let has_next = Arc::clone(&has_next);
            let next = Arc::clone(&next);
            let seed = seed.clone();
            let mut prev: Option<T> = None;
            let mut done = false;
            let it = iter::from_fn(move || {
                if done {
                    return None;
                }
                let candidate = prev.as_ref().map_or_else(|| seed.clone(), |p| next(p));
                if !has_next(&candidate) {
                    done = true;
                    return None;
                }
                prev = Some(candidate.clone());
                Some(candidate)
            });
            Ok(Box::new(it.map(ok_boxed)))
        });
        source(
            &Pipeline::default(),
            SourceKind::Iterate,
            Characteristics::unknown().with(Characteristic::ORDERED),
            open,
        )
    }

    /// The infinite, unordered sequence of `supplier()` results.
    pub fn generate<F>(supplier: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let supplier = Arc::new(supplier);
        let open: Opener = Arc::new(move || -> Result<ElementIter> {
            let supplier = Arc::clone(&supplier);
            Ok(Box::new(iter::repeat_with(move || ok_boxed(supplier()))))
        });
        source(
            &Pipeline::default(),
            SourceKind::Generate,
            Characteristics::unknown(),
            open,
        )
    }

    /// All elements of `first`, then all elements of `second`.
    ///
    /// Both inputs are consumed. The result is ordered when both are, and
    /// sized when both are. It runs in parallel if either input does.
    pub fn concat(first: Self, second: Self) -> Self {
        let mode = match first.pipeline.mode() {
            ExecMode::Sequential => second.pipeline.mode(),
            parallel => parallel,
        };
        let p = Pipeline::default();
        p.set_mode(mode);

        let left = planner::plan(&first.pipeline, first.id);
        let right = planner::plan(&second.pipeline, second.id);
        match (left, right) {
            (Ok(left), Ok(right)) => {
                let characteristics =
                    Characteristics::concat(left.characteristics, right.characteristics);
                let node = Node::Concat {
                    left: Arc::new(left.nodes),
                    right: Arc::new(right.nodes),
                };
                let id = p.insert_node(node, characteristics);
                Self::from_parts(p, id)
            }
            _ => {
                debug!("concat of a consumed stream");
                let s = Self::empty_in(&p);
                p.poison(s.id);
                s
            }
        }
    }

    fn empty_in(p: &Pipeline) -> Self {
        let open: Opener = Arc::new(|| -> Result<ElementIter> { Ok(Box::new(iter::empty())) });
        source(p, SourceKind::Empty, Characteristics::sized_ordered(0), open)
    }
}

impl<T: StreamItem> FromIterator<T> for Stream<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter.into_iter().collect())
    }
}
