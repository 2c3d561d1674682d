//! Plan nodes: the closed set of source and stage kinds a stream is built from.
//!
//! A stream's plan is a linear chain of [`Node`]s. Element types are erased at
//! this level: every element travels as an [`Element`] (`Box<dyn Any + Send>`)
//! and the typed closures captured by [`Stream`](crate::Stream) downcast on the
//! way in and box on the way out. The [`cursor`](crate::cursor) interpreter is
//! the only code that walks these nodes.

use crate::error::StreamError;
use anyhow::Result;
use std::any::{Any, type_name};
use std::sync::Arc;

/// A single type-erased element in flight.
pub(crate) type Element = Box<dyn Any + Send>;

/// A lazily produced run of elements (a source, or a flat-mapped sub-sequence).
pub(crate) type ElementIter = Box<dyn Iterator<Item = Result<Element>> + Send>;

pub(crate) type Opener = Arc<dyn Fn() -> Result<ElementIter> + Send + Sync>;
pub(crate) type ElementFn = Arc<dyn Fn(Element) -> Result<Element> + Send + Sync>;
pub(crate) type ElementPredicate = Arc<dyn Fn(&Element) -> Result<bool> + Send + Sync>;
pub(crate) type ElementFlatFn = Arc<dyn Fn(Element) -> Result<ElementIter> + Send + Sync>;
pub(crate) type ElementConsumer = Arc<dyn Fn(&Element) -> Result<()> + Send + Sync>;

/// Per-evaluation "first time seen?" check used by `distinct`.
pub(crate) type SeenFilter = Box<dyn FnMut(&Element) -> Result<bool> + Send>;
pub(crate) type DistinctFactory = Arc<dyn Fn() -> SeenFilter + Send + Sync>;

/// Sorts a fully buffered upstream.
pub(crate) type SortFn = Arc<dyn Fn(Vec<Element>) -> Result<Vec<Element>> + Send + Sync>;

/// Where a source's elements come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// An in-memory sequence of values.
    Values,
    /// A numeric range.
    Range,
    /// `seed, f(seed), f(f(seed)), ...`, optionally bounded by a predicate.
    Iterate,
    /// Repeated calls to a supplier.
    Generate,
    /// No elements.
    Empty,
}

impl SourceKind {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Values => "values",
            Self::Range => "range",
            Self::Iterate => "iterate",
            Self::Generate => "generate",
            Self::Empty => "empty",
        }
    }
}

#[derive(Clone)]
pub(crate) enum Node {
    Source {
        kind: SourceKind,
        open: Opener,
    },
    /// Two complete sub-plans evaluated one after the other.
    Concat {
        left: Arc<Vec<Node>>,
        right: Arc<Vec<Node>>,
    },
    Map(ElementFn),
    Filter(ElementPredicate),
    FlatMap(ElementFlatFn),
    Distinct(DistinctFactory),
    Sorted(SortFn),
    Limit(u64),
    Skip(u64),
    Peek(ElementConsumer),
    TakeWhile(ElementPredicate),
    DropWhile(ElementPredicate),
    Unordered,
}

impl Node {
    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Self::Source { kind, .. } => kind.label(),
            Self::Concat { .. } => "concat",
            Self::Map(_) => "map",
            Self::Filter(_) => "filter",
            Self::FlatMap(_) => "flat_map",
            Self::Distinct(_) => "distinct",
            Self::Sorted(_) => "sorted",
            Self::Limit(_) => "limit",
            Self::Skip(_) => "skip",
            Self::Peek(_) => "peek",
            Self::TakeWhile(_) => "take_while",
            Self::DropWhile(_) => "drop_while",
            Self::Unordered => "unordered",
        }
    }

    pub(crate) const fn is_source(&self) -> bool {
        matches!(self, Self::Source { .. } | Self::Concat { .. })
    }

    /// Stages whose output depends on elements outside the current one (or on
    /// their position), so they cannot run independently per partition.
    pub(crate) const fn is_barrier(&self) -> bool {
        matches!(
            self,
            Self::Source { .. }
                | Self::Concat { .. }
                | Self::Distinct(_)
                | Self::Sorted(_)
                | Self::Limit(_)
                | Self::Skip(_)
                | Self::TakeWhile(_)
                | Self::DropWhile(_)
        )
    }
}

pub(crate) fn boxed<T: Send + 'static>(value: T) -> Element {
    Box::new(value)
}

pub(crate) fn ok_boxed<T: Send + 'static>(value: T) -> Result<Element> {
    Ok(Box::new(value))
}

pub(crate) fn unbox<T: 'static>(element: Element) -> Result<T> {
    element.downcast::<T>().map(|b| *b).map_err(|_| {
        StreamError::TypeMismatch {
            expected: type_name::<T>(),
        }
        .into()
    })
}

pub(crate) fn peek_ref<T: 'static>(element: &Element) -> Result<&T> {
    element.downcast_ref::<T>().ok_or_else(|| {
        StreamError::TypeMismatch {
            expected: type_name::<T>(),
        }
        .into()
    })
}
