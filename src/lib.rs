//! # ironstream
//!
//! A **lazy sequence-processing library**: build a chain of transformations
//! over a source, then evaluate it once with a terminal operation, either on
//! the caller's thread or split across a rayon pool.
//!
//! ## Key Features
//!
//! - **Lazy pipelines** - nothing runs until a terminal operation; short-circuiting
//!   terminals and `limit` stop pulling as soon as the answer is known
//! - **Rich stage set** - map, filter, flat_map, distinct, sorted, limit, skip,
//!   peek, take_while, drop_while, unordered
//! - **Collectors** - lists, sets, maps, grouping, partitioning, joining,
//!   counting, averaging and summary statistics, all composable
//! - **Numeric streams** - [`IntStream`], [`LongStream`], [`DoubleStream`] with
//!   ranges, `sum`, `average` and `summary_statistics`
//! - **Sequential and parallel execution** - the same results, chosen per stream
//! - **Single use, checked** - evaluating a stream twice fails with
//!   [`StreamError::AlreadyConsumed`] instead of silently recomputing
//!
//! ## Quick Start
//!
//! ```
//! use ironstream::Stream;
//! use ironstream::collectors::{counting, grouping_by_with};
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let words = vec!["hello world", "hello rust"];
//!
//! let counts = Stream::of(words)
//!     .flat_map(|line: &str| line.split_whitespace().map(String::from).collect::<Vec<_>>())
//!     .collect(grouping_by_with(|w: &String| w.clone(), counting()))?;
//!
//! assert_eq!(counts["hello"], 2);
//! assert_eq!(counts["rust"], 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Stream
//!
//! A [`Stream<T>`] is a handle to the last node of a plan. Intermediate
//! operations consume the handle and return a new one; terminal operations
//! (in [`terminal`]) evaluate the plan. A stream can be evaluated at most once.
//! Cloning a handle does not copy the elements, so a clone that is evaluated
//! after the original fails with [`StreamError::AlreadyConsumed`].
//!
//! ### Pipeline
//!
//! Every stream lives in a [`Pipeline`], the graph of plan nodes. Sources such
//! as [`Stream::of`] create their own; [`from_vec`] and [`from_iter`] attach a
//! source to a pipeline you hold, which is handy for inspecting the graph in
//! tests.
//!
//! ### Characteristics
//!
//! Each node knows whether its output is ORDERED, DISTINCT, SORTED or SIZED
//! ([`Characteristics`]). `count()` on a SIZED stream answers without
//! traversal, and [`Stream::explain`] shows the characteristics per step.
//!
//! ### Execution Modes
//!
//! - **Sequential** (default) - one pull traversal on the caller's thread.
//! - **Parallel** - [`Stream::parallel`] or [`Stream::with_mode`] with
//!   [`ExecMode::Parallel`]. Work before the last stage that needs to see the
//!   whole sequence (`sorted`, `distinct`, `limit`, ...) runs sequentially; the
//!   rest runs per partition, and partial results are merged in encounter
//!   order. Short-circuiting terminals always pull sequentially.
//!
//! ## Module Overview
//!
//! - [`stream`] - the `Stream` handle and intermediate operations
//! - [`sources`] - sources and `concat`
//! - [`terminal`] - terminal operations
//! - [`collectors`] - the `Collector` trait and standard collectors
//! - [`numeric`] - numeric streams and summary statistics
//! - [`pipeline`], [`planner`], [`runner`] - plan graph, planning, execution
//! - [`testing`] - assertions and fixtures for tests

mod cursor;
mod node;

pub mod characteristics;
pub mod collectors;
pub mod error;
pub mod node_id;
pub mod numeric;
pub mod pipeline;
pub mod planner;
pub mod runner;
pub mod sources;
pub mod stream;
pub mod terminal;
pub mod testing;

// General re-exports
pub use characteristics::{Characteristic, Characteristics};
pub use collectors::Collector;
pub use error::StreamError;
pub use node::SourceKind;
pub use node_id::NodeId;
pub use numeric::{
    CompensatedSum, DoubleStream, IntStream, Integral, LongStream, Numeric, NumericStream,
    SummaryStatistics,
};
pub use pipeline::Pipeline;
pub use planner::{ExplainStep, PlanExplanation};
pub use runner::{ExecMode, Runner};
pub use sources::{from_iter, from_vec};
pub use stream::{Stream, StreamItem};
