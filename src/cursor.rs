//! Pull-based interpreter for a linear plan.
//!
//! A [`Cursor`] pairs the opened source with one [`StageState`] per stage
//! node. Each request for an element walks the stages from the terminal end
//! towards the source, pulling only as many upstream elements as the stage
//! needs. Short-circuiting falls out of this directly: a finished `limit` or
//! `take_while` stops pulling, and a terminal that stops asking never touches
//! the rest of the source.

use crate::node::{
    Element, ElementConsumer, ElementFlatFn, ElementFn, ElementIter, ElementPredicate, Node,
    SeenFilter, SortFn, unbox,
};
use anyhow::{Result, bail};
use std::marker::PhantomData;
use std::vec::IntoIter;
use tracing::trace;

enum SourceCursor {
    /// `None` once exhausted, so a drained source is never polled again.
    Iter(Option<ElementIter>),
    Concat {
        left: Box<Cursor>,
        right: Box<Cursor>,
        on_right: bool,
    },
}

impl SourceCursor {
    fn pull(&mut self) -> Result<Option<Element>> {
        match self {
            Self::Iter(slot) => {
                let Some(it) = slot.as_mut() else {
                    return Ok(None);
                };
                match it.next() {
                    Some(next) => next.map(Some),
                    None => {
                        *slot = None;
                        Ok(None)
                    }
                }
            }
            Self::Concat {
                left,
                right,
                on_right,
            } => {
                if !*on_right {
                    if let Some(e) = left.pull()? {
                        return Ok(Some(e));
                    }
                    *on_right = true;
                }
                right.pull()
            }
        }
    }
}

enum StageState {
    Map(ElementFn),
    Filter(ElementPredicate),
    FlatMap {
        f: ElementFlatFn,
        current: Option<ElementIter>,
    },
    Distinct(SeenFilter),
    Sorted {
        sort: SortFn,
        buffer: Option<IntoIter<Element>>,
    },
    Limit {
        remaining: u64,
    },
    Skip {
        remaining: u64,
    },
    Peek(ElementConsumer),
    TakeWhile {
        pred: ElementPredicate,
        done: bool,
    },
    DropWhile {
        pred: ElementPredicate,
        dropping: bool,
    },
    Pass,
}

impl StageState {
    fn new(node: &Node) -> Result<Self> {
        Ok(match node {
            Node::Map(f) => Self::Map(f.clone()),
            Node::Filter(p) => Self::Filter(p.clone()),
            Node::FlatMap(f) => Self::FlatMap {
                f: f.clone(),
                current: None,
            },
            Node::Distinct(factory) => Self::Distinct(factory()),
            Node::Sorted(sort) => Self::Sorted {
                sort: sort.clone(),
                buffer: None,
            },
            Node::Limit(n) => Self::Limit { remaining: *n },
            Node::Skip(n) => Self::Skip { remaining: *n },
            Node::Peek(f) => Self::Peek(f.clone()),
            Node::TakeWhile(p) => Self::TakeWhile {
                pred: p.clone(),
                done: false,
            },
            Node::DropWhile(p) => Self::DropWhile {
                pred: p.clone(),
                dropping: true,
            },
            Node::Unordered => Self::Pass,
            Node::Source { .. } | Node::Concat { .. } => {
                bail!("unexpected additional source in plan")
            }
        })
    }
}

/// Pull the next element out of `stages`, fed by `source`.
fn pull(source: &mut SourceCursor, stages: &mut [StageState]) -> Result<Option<Element>> {
    let Some((stage, upstream)) = stages.split_last_mut() else {
        return source.pull();
    };
    match stage {
        StageState::Map(f) => match pull(source, upstream)? {
            Some(e) => f(e).map(Some),
            None => Ok(None),
        },
        StageState::Filter(pred) => loop {
            let Some(e) = pull(source, upstream)? else {
                return Ok(None);
            };
            if pred(&e)? {
                return Ok(Some(e));
            }
        },
        StageState::FlatMap { f, current } => loop {
            if let Some(inner) = current.as_mut() {
                match inner.next() {
                    Some(next) => return next.map(Some),
                    None => *current = None,
                }
            }
            let Some(e) = pull(source, upstream)? else {
                return Ok(None);
            };
            *current = Some(f(e)?);
        },
        StageState::Distinct(first_seen) => loop {
            let Some(e) = pull(source, upstream)? else {
                return Ok(None);
            };
            if first_seen(&e)? {
                return Ok(Some(e));
            }
        },
        StageState::Sorted { sort, buffer } => {
            if buffer.is_none() {
                let mut all = Vec::new();
                while let Some(e) = pull(source, upstream)? {
                    all.push(e);
                }
                trace!(len = all.len(), "sorted stage buffered upstream");
                *buffer = Some(sort(all)?.into_iter());
            }
            Ok(buffer.as_mut().and_then(Iterator::next))
        }
        StageState::Limit { remaining } => {
            if *remaining == 0 {
                return Ok(None);
            }
            let next = pull(source, upstream)?;
            if next.is_some() {
                *remaining -= 1;
            }
            Ok(next)
        }
        StageState::Skip { remaining } => {
            while *remaining > 0 {
                if pull(source, upstream)?.is_none() {
                    *remaining = 0;
                    return Ok(None);
                }
                *remaining -= 1;
            }
            pull(source, upstream)
        }
        StageState::Peek(f) => {
            let next = pull(source, upstream)?;
            if let Some(e) = &next {
                f(e)?;
            }
            Ok(next)
        }
        StageState::TakeWhile { pred, done } => {
            if *done {
                return Ok(None);
            }
            match pull(source, upstream)? {
                Some(e) => {
                    if pred(&e)? {
                        Ok(Some(e))
                    } else {
                        *done = true;
                        Ok(None)
                    }
                }
                None => {
                    *done = true;
                    Ok(None)
                }
            }
        }
        StageState::DropWhile { pred, dropping } => loop {
            let Some(e) = pull(source, upstream)? else {
                return Ok(None);
            };
            if *dropping {
                if pred(&e)? {
                    continue;
                }
                *dropping = false;
            }
            return Ok(Some(e));
        },
        StageState::Pass => pull(source, upstream),
    }
}

/// An opened, single-use traversal of a plan.
pub(crate) struct Cursor {
    source: SourceCursor,
    stages: Vec<StageState>,
}

impl Cursor {
    /// Open the source at the head of `chain` and prepare its stages.
    pub(crate) fn open(chain: &[Node]) -> Result<Self> {
        let Some((head, stages)) = chain.split_first() else {
            bail!("plan has no source");
        };
        let source = match head {
            Node::Source { open, .. } => SourceCursor::Iter(Some(open()?)),
            Node::Concat { left, right } => SourceCursor::Concat {
                left: Box::new(Self::open(left)?),
                right: Box::new(Self::open(right)?),
                on_right: false,
            },
            other => bail!("plan must start with a source, found {}", other.label()),
        };
        Self::with_source(source, stages)
    }

    /// Run `stages` over an already materialized partition.
    pub(crate) fn over(elements: Vec<Element>, stages: &[Node]) -> Result<Self> {
        let it: ElementIter = Box::new(elements.into_iter().map(Ok::<Element, anyhow::Error>));
        Self::with_source(SourceCursor::Iter(Some(it)), stages)
    }

    fn with_source(source: SourceCursor, stages: &[Node]) -> Result<Self> {
        let stages = stages.iter().map(StageState::new).collect::<Result<Vec<_>>>()?;
        Ok(Self { source, stages })
    }

    pub(crate) fn pull(&mut self) -> Result<Option<Element>> {
        pull(&mut self.source, &mut self.stages)
    }

    /// View this cursor as an iterator of `T`.
    pub(crate) fn typed<T: 'static>(self) -> Typed<T> {
        Typed {
            cursor: self,
            _t: PhantomData,
        }
    }
}

impl Iterator for Cursor {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pull().transpose()
    }
}

pub(crate) struct Typed<T> {
    cursor: Cursor,
    _t: PhantomData<fn() -> T>,
}

impl<T: 'static> Iterator for Typed<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next().map(|r| r.and_then(unbox::<T>))
    }
}
