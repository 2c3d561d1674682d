//! Identifier for nodes within a [`Pipeline`](crate::pipeline::Pipeline).
//!
//! Every source and stage inserted into a pipeline gets a sequential `NodeId`.
//! A [`Stream`](crate::Stream) handle is nothing more than a pipeline plus the
//! id of its last node, so ids are what the planner walks when it rebuilds the
//! chain for a terminal operation.

use std::fmt::{Display, Formatter, Result as FormatResult};

/// Unique numeric identifier for a node in a pipeline graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) const fn new(v: u64) -> Self {
        Self(v)
    }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "#{}", self.0)
    }
}
