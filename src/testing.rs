//! Testing utilities for ironstream pipelines.
//!
//! - **Assertions**: compare stream results with expected values, and check
//!   which [`StreamError`](crate::StreamError) a terminal operation failed with
//! - **Fixtures**: small datasets ([`Person`], [`sample_people`], [`sample_words`])
//! - [`TestPipeline`]: a [`Pipeline`] with graph inspection helpers
//!
//! # Quick Start
//!
//! ```
//! use ironstream::from_vec;
//! use ironstream::testing::*;
//!
//! let p = TestPipeline::new();
//! let result = from_vec(&p, vec![1, 2, 3])
//!     .map(|x: i32| x * 2)
//!     .to_vec()
//!     .unwrap();
//!
//! assert_collections_equal(&result, &[2, 4, 6]);
//! assert_eq!(p.node_count(), 2);
//! assert_eq!(p.edge_count(), 1);
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;

use crate::Pipeline;

/// A test-focused wrapper around [`Pipeline`].
#[derive(Clone)]
pub struct TestPipeline {
    pipeline: Pipeline,
}

impl TestPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline::default(),
        }
    }

    /// Number of nodes in the pipeline graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let (nodes, _) = self.pipeline.snapshot();
        nodes.len()
    }

    /// Number of edges in the pipeline graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let (_, edges) = self.pipeline.snapshot();
        edges.len()
    }

    /// Print nodes and edges, for debugging a failing test.
    pub fn debug_print_graph(&self) {
        let (nodes, edges) = self.pipeline.snapshot();
        println!("Pipeline Graph:");
        println!("  Nodes: {}", nodes.len());
        for id in &nodes {
            println!("    {id}");
        }
        println!("  Edges: {}", edges.len());
        for (from, to) in &edges {
            println!("    {from} -> {to}");
        }
    }
}

impl Default for TestPipeline {
    fn default() -> Self {
        Self::new()
    }
}

// Allow TestPipeline to be used wherever Pipeline is expected
impl std::ops::Deref for TestPipeline {
    type Target = Pipeline;

    fn deref(&self) -> &Self::Target {
        &self.pipeline
    }
}

impl AsRef<Pipeline> for TestPipeline {
    fn as_ref(&self) -> &Pipeline {
        &self.pipeline
    }
}
