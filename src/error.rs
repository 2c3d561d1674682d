//! Error taxonomy for stream evaluation.
//!
//! Terminal operations return [`anyhow::Result`]. When a failure belongs to one
//! of the categories below, the wrapped error is a [`StreamError`] and can be
//! recovered with [`anyhow::Error::downcast_ref`]:
//!
//! ```
//! use ironstream::{Stream, StreamError};
//!
//! let s = Stream::of(vec![1, 2, 3]);
//! let again = s.clone();
//! assert_eq!(s.count().unwrap(), 3);
//!
//! let err = again.count().unwrap_err();
//! assert_eq!(err.downcast_ref::<StreamError>(), Some(&StreamError::AlreadyConsumed));
//! ```

use thiserror::Error;

/// Failures a stream evaluation can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The stream was already consumed by a terminal operation, or already
    /// linked to another stage.
    #[error("stream has already been operated upon or consumed")]
    AlreadyConsumed,

    /// A map collector without a merge function saw the same key twice.
    #[error("duplicate key {key}")]
    DuplicateKey {
        /// Debug rendering of the offending key.
        key: String,
    },

    /// A comparator that is not null-safe met a `None` element.
    #[error("null element encountered during {operation}")]
    NullElement {
        /// The operation that hit the element (`min`, `max`, `sorted`).
        operation: &'static str,
    },

    /// A `flat_map_stream` function returned no sub-sequence.
    #[error("flat_map function returned no sub-sequence; return an empty stream instead")]
    NullSubSequence,

    /// Parallel evaluation needed to merge partial results of a collector
    /// that cannot merge.
    #[error("collector does not support merging partial results")]
    MergeUnsupported,

    /// An erased element did not have the type the plan expected.
    #[error("element type mismatch: expected {expected}")]
    TypeMismatch {
        /// Name of the expected element type.
        expected: &'static str,
    },
}
