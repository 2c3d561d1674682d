//! Collectors for [`Stream::collect`](crate::Stream::collect).
//!
//! A [`Collector<T, A, O>`] describes a mutable reduction in four steps:
//! `create` an empty accumulator `A`, `add_input` one element `T` at a time,
//! `merge` two partial accumulators (parallel evaluation only), and `finish`
//! the accumulator into the result `O`.
//!
//! Provided collectors:
//!
//! - [`to_list`], [`to_set`], [`to_collection`] -- gather elements.
//! - [`to_map`], [`to_map_merging`], [`to_concurrent_map`] -- key/value maps;
//!   duplicate keys fail with [`StreamError::DuplicateKey`](crate::StreamError::DuplicateKey)
//!   unless a merge function is given. `to_concurrent_map` needs the
//!   `concurrent-map` feature (on by default).
//! - [`grouping_by`], [`grouping_by_with`] -- map from classifier result to a
//!   list, or to a downstream collector's result.
//! - [`partitioning_by`], [`partitioning_by_with`] -- always both `true` and `false`.
//! - [`joining`], [`joining_with`], [`joining_with_affixes`] -- strings.
//! - [`counting`], [`reducing`], [`reducing_from`], [`mapping`],
//!   [`collecting_and_then`] -- building blocks for downstream use.
//! - `summing_*`, `averaging_*`, `summarizing_*` for `int` (`i32`), `long`
//!   (`i64`) and `double` (`f64`).
//!
//! # Examples
//! ```
//! use ironstream::Stream;
//! use ironstream::collectors::{counting, grouping_by_with, partitioning_by};
//!
//! let by_len = Stream::of(vec!["a", "bb", "cc", "d"])
//!     .collect(grouping_by_with(|w: &&str| w.len(), counting()))
//!     .unwrap();
//! assert_eq!(by_len[&1], 2);
//! assert_eq!(by_len[&2], 2);
//!
//! let parts = Stream::of(vec![1, 2, 3, 4, 5])
//!     .collect(partitioning_by(|n: &i32| n % 2 == 0))
//!     .unwrap();
//! assert_eq!(parts[&true], vec![2, 4]);
//! assert_eq!(parts[&false], vec![1, 3, 5]);
//! ```

mod basic;
#[cfg(feature = "concurrent-map")]
mod concurrent;
mod maps;
mod numeric;
mod text;

use crate::error::StreamError;
use anyhow::Result;

pub use basic::{
    collecting_and_then, counting, mapping, reducing, reducing_from, to_collection, to_list,
    to_set, CollectingAndThen, Counting, Mapping, Reducing, ReducingFrom, ToCollection, ToList,
    ToSet,
};
#[cfg(feature = "concurrent-map")]
pub use concurrent::{to_concurrent_map, ToConcurrentMap};
pub use maps::{
    grouping_by, grouping_by_with, partitioning_by, partitioning_by_with, to_map, to_map_merging,
    GroupingBy, PartitioningBy, ToMap, ToMapMerging,
};
pub use numeric::{
    averaging_double, averaging_int, averaging_long, summarizing_double, summarizing_int,
    summarizing_long, summing_double, summing_int, summing_long, Averaging, Summarizing, Summing,
};
pub use text::{joining, joining_with, joining_with_affixes, Joining};

/// A mutable reduction of `T`s through an accumulator `A` into an `O`.
pub trait Collector<T, A, O>: Send + Sync + 'static {
    fn create(&self) -> A;

    /// Fold one element into `acc`.
    ///
    /// # Errors
    /// Collectors with a failure mode (such as duplicate map keys) report it
    /// here; the whole evaluation then fails.
    fn add_input(&self, acc: &mut A, value: T) -> Result<()>;

    /// Fold `other`, the accumulator of a later partition, into `acc`.
    ///
    /// # Errors
    /// The default fails with [`StreamError::MergeUnsupported`]: such a
    /// collector only works on sequential streams.
    fn merge(&self, _acc: &mut A, _other: A) -> Result<()> {
        Err(StreamError::MergeUnsupported.into())
    }

    fn finish(&self, acc: A) -> O;
}
