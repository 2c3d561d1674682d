//! Numeric specialization: streams of `i32`, `i64` and `f64`.
//!
//! [`NumericStream<N>`] wraps a [`Stream<N>`] and adds what only makes sense
//! for numbers: `sum`, `average`, `summary_statistics`, numeric ranges, and
//! conversions between the three element types. [`IntStream`], [`LongStream`]
//! and [`DoubleStream`] are the usual names.
//!
//! Integer sums widen to `i64` (wrapping on overflow). Double sums use
//! compensated summation, which keeps the error of long sums small.
//!
//! ```
//! use ironstream::IntStream;
//!
//! let stats = IntStream::range_closed(1, 100).summary_statistics().unwrap();
//! assert_eq!(stats.count(), 100);
//! assert_eq!(stats.sum(), 5050);
//! assert_eq!(stats.min(), Some(1));
//! assert_eq!(stats.max(), Some(100));
//! assert_eq!(stats.average(), Some(50.5));
//! ```

use crate::characteristics::{Characteristic, Characteristics};
use crate::collectors::{Summarizing, Summing};
use crate::node::{ElementIter, Opener, SourceKind, ok_boxed};
use crate::pipeline::Pipeline;
use crate::planner::PlanExplanation;
use crate::runner::ExecMode;
use crate::sources::source;
use crate::stream::Stream;
use anyhow::Result;
use ordered_float::OrderedFloat;
use paste::paste;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use std::iter;
use std::sync::Arc;

/// An element type with numeric stream support.
pub trait Numeric:
    Copy + PartialOrd + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Running-sum state.
    type Sum: Copy + Default + Debug + Send + Sync + Serialize + DeserializeOwned + 'static;
    /// The value `sum()` reports.
    type Total: Copy + Debug + PartialEq + Send + 'static;
    /// A totally ordered, hashable stand-in used by `distinct` and `sorted`.
    type Key: Eq + Hash + Ord + Send + 'static;

    fn add_to(sum: &mut Self::Sum, value: Self);
    fn merge_sums(sum: &mut Self::Sum, other: Self::Sum);
    fn total(sum: &Self::Sum) -> Self::Total;
    fn total_as_f64(sum: &Self::Sum) -> f64;
    fn key(self) -> Self::Key;
    fn as_f64(self) -> f64;

    /// Whether this value poisons `min` and `max`.
    fn is_nan(self) -> bool {
        false
    }
}

/// The smaller of `current` and `value`, keeping `current` on ties. NaN wins.
fn lesser<N: Numeric>(current: Option<N>, value: N) -> N {
    match current {
        Some(c) if c.is_nan() || (!value.is_nan() && c.key() <= value.key()) => c,
        _ => value,
    }
}

/// The larger of `current` and `value`, keeping `current` on ties. NaN wins.
fn greater<N: Numeric>(current: Option<N>, value: N) -> N {
    match current {
        Some(c) if c.is_nan() || (!value.is_nan() && c.key() >= value.key()) => c,
        _ => value,
    }
}

/// Integers usable as range bounds.
pub trait Integral: Numeric + Ord {
    /// `self + 1`; only called when `self` is below a range's end.
    fn successor(self) -> Self;
    fn to_i128(self) -> i128;
}

macro_rules! integer_numeric {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                type Sum = i64;
                type Total = i64;
                type Key = $t;

                fn add_to(sum: &mut i64, value: Self) {
                    *sum = sum.wrapping_add(i64::from(value));
                }

                fn merge_sums(sum: &mut i64, other: i64) {
                    *sum = sum.wrapping_add(other);
                }

                fn total(sum: &i64) -> i64 {
                    *sum
                }

                #[allow(clippy::cast_precision_loss)]
                fn total_as_f64(sum: &i64) -> f64 {
                    *sum as f64
                }

                fn key(self) -> $t {
                    self
                }

                #[allow(clippy::cast_precision_loss)]
                fn as_f64(self) -> f64 {
                    self as f64
                }
            }

            impl Integral for $t {
                fn successor(self) -> Self {
                    self + 1
                }

                fn to_i128(self) -> i128 {
                    i128::from(self)
                }
            }
        )*
    };
}

integer_numeric!(i32, i64);

/// Kahan summation state: the running sum, its compensation term, and a
/// plain sum used when the compensated one overflows to NaN.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
    simple: f64,
}

impl CompensatedSum {
    fn add_compensated(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    pub fn add(&mut self, value: f64) {
        self.add_compensated(value);
        self.simple += value;
    }

    pub fn combine(&mut self, other: Self) {
        self.simple += other.simple;
        self.add_compensated(other.sum);
        self.add_compensated(-other.compensation);
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        let v = self.sum - self.compensation;
        if v.is_nan() && self.simple.is_infinite() {
            self.simple
        } else {
            v
        }
    }
}

impl Numeric for f64 {
    type Sum = CompensatedSum;
    type Total = f64;
    type Key = OrderedFloat<f64>;

    fn add_to(sum: &mut CompensatedSum, value: Self) {
        sum.add(value);
    }

    fn merge_sums(sum: &mut CompensatedSum, other: CompensatedSum) {
        sum.combine(other);
    }

    fn total(sum: &CompensatedSum) -> f64 {
        sum.value()
    }

    fn total_as_f64(sum: &CompensatedSum) -> f64 {
        sum.value()
    }

    fn key(self) -> OrderedFloat<f64> {
        OrderedFloat(self)
    }

    fn as_f64(self) -> f64 {
        self
    }

    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }
}

/// Count, sum, min, max and average of numbers, built in one pass.
///
/// `min`, `max` and `average` are `None` when nothing was accepted.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct SummaryStatistics<N: Numeric> {
    count: u64,
    sum: N::Sum,
    min: Option<N>,
    max: Option<N>,
}

impl<N: Numeric> Default for SummaryStatistics<N> {
    fn default() -> Self {
        Self {
            count: 0,
            sum: N::Sum::default(),
            min: None,
            max: None,
        }
    }
}

impl<N: Numeric> SummaryStatistics<N> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, value: N) {
        self.count += 1;
        N::add_to(&mut self.sum, value);
        self.min = Some(lesser(self.min, value));
        self.max = Some(greater(self.max, value));
    }

    /// Fold in statistics gathered elsewhere.
    pub fn combine(&mut self, other: &Self) {
        self.count += other.count;
        N::merge_sums(&mut self.sum, other.sum);
        if let Some(m) = other.min {
            self.min = Some(lesser(self.min, m));
        }
        if let Some(m) = other.max {
            self.max = Some(greater(self.max, m));
        }
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn sum(&self) -> N::Total {
        N::total(&self.sum)
    }

    #[must_use]
    pub const fn min(&self) -> Option<N> {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> Option<N> {
        self.max
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| N::total_as_f64(&self.sum) / self.count as f64)
    }
}

/// A stream of numbers.
pub struct NumericStream<N> {
    inner: Stream<N>,
}

pub type IntStream = NumericStream<i32>;
pub type LongStream = NumericStream<i64>;
pub type DoubleStream = NumericStream<f64>;

impl<N> Clone for NumericStream<N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<N: Numeric> From<Stream<N>> for NumericStream<N> {
    fn from(inner: Stream<N>) -> Self {
        Self { inner }
    }
}

impl<N: Integral> NumericStream<N> {
    /// `start, start + 1, ..., end - 1`.
    pub fn range(start: N, end: N) -> Self {
        Self::integral_range(start, end, false)
    }

    /// `start, start + 1, ..., end`.
    pub fn range_closed(start: N, end: N) -> Self {
        Self::integral_range(start, end, true)
    }

    fn integral_range(start: N, end: N, closed: bool) -> Self {
        let below_end = move |x: &N| if closed { *x <= end } else { *x < end };
        let span = end.to_i128() - start.to_i128() + i128::from(closed);
        let len = u64::try_from(span.max(0)).unwrap_or(u64::MAX);
        let open: Opener = Arc::new(move || -> Result<ElementIter> {
            let it = iter::successors(Some(start).filter(below_end), move |x| {
                (*x < end).then(|| x.successor()).filter(below_end)
            });
            Ok(Box::new(it.map(ok_boxed)))
        });
        let characteristics = Characteristics::sized_ordered(len)
            .with(Characteristic::SORTED)
            .with(Characteristic::DISTINCT);
        source(&Pipeline::default(), SourceKind::Range, characteristics, open).into()
    }
}

impl<N: Numeric> NumericStream<N> {
    pub fn of(values: Vec<N>) -> Self {
        Stream::of(values).into()
    }

    pub fn empty() -> Self {
        Stream::empty().into()
    }

    /// `seed, next(seed), next(next(seed)), ...` without end.
    pub fn iterate<F>(seed: N, next: F) -> Self
    where
        F: Fn(N) -> N + Send + Sync + 'static,
    {
        Stream::iterate(seed, move |x: &N| next(*x)).into()
    }

    /// Infinite, unordered sequence of `supplier()` results.
    pub fn generate<F>(supplier: F) -> Self
    where
        F: Fn() -> N + Send + Sync + 'static,
    {
        Stream::generate(supplier).into()
    }

    /// All of `first`, then all of `second`.
    pub fn concat(first: Self, second: Self) -> Self {
        Stream::concat(first.inner, second.inner).into()
    }

    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(N) -> N + Send + Sync + 'static,
    {
        self.inner.map(f).into()
    }

    pub fn filter<F>(self, pred: F) -> Self
    where
        F: Fn(N) -> bool + Send + Sync + 'static,
    {
        self.inner.filter(move |x: &N| pred(*x)).into()
    }

    /// Replace each number with the numbers `f` returns.
    pub fn flat_map<I, F>(self, f: F) -> Self
    where
        I: IntoIterator<Item = N>,
        I::IntoIter: Send + 'static,
        F: Fn(N) -> I + Send + Sync + 'static,
    {
        self.inner.flat_map(f).into()
    }

    /// Drop repeated values. Doubles compare by total order, so `NaN` equals
    /// itself and `0.0` differs from `-0.0`.
    pub fn distinct(self) -> Self {
        self.inner.distinct_by_key(|x: &N| x.key()).into()
    }

    /// Ascending order (doubles by total order).
    pub fn sorted(self) -> Self {
        self.inner
            .sorted_by(|a: &N, b: &N| a.key().cmp(&b.key()))
            .into()
    }

    pub fn limit(self, n: u64) -> Self {
        self.inner.limit(n).into()
    }

    pub fn skip(self, n: u64) -> Self {
        self.inner.skip(n).into()
    }

    pub fn peek<F>(self, f: F) -> Self
    where
        F: Fn(N) + Send + Sync + 'static,
    {
        self.inner.peek(move |x: &N| f(*x)).into()
    }

    pub fn take_while<F>(self, pred: F) -> Self
    where
        F: Fn(N) -> bool + Send + Sync + 'static,
    {
        self.inner.take_while(move |x: &N| pred(*x)).into()
    }

    pub fn drop_while<F>(self, pred: F) -> Self
    where
        F: Fn(N) -> bool + Send + Sync + 'static,
    {
        self.inner.drop_while(move |x: &N| pred(*x)).into()
    }

    pub fn unordered(self) -> Self {
        self.inner.unordered().into()
    }

    pub fn parallel(self) -> Self {
        self.inner.parallel().into()
    }

    pub fn sequential(self) -> Self {
        self.inner.sequential().into()
    }

    pub fn with_mode(self, mode: ExecMode) -> Self {
        self.inner.with_mode(mode).into()
    }

    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.inner.is_parallel()
    }

    #[must_use]
    pub fn characteristics(&self) -> Characteristics {
        self.inner.characteristics()
    }

    /// See [`Stream::explain`].
    pub fn explain(&self) -> Result<PlanExplanation> {
        self.inner.explain()
    }

    /// The same numbers as a general [`Stream`].
    pub fn boxed(self) -> Stream<N> {
        self.inner
    }

    pub fn map_to_obj<U, F>(self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: Fn(N) -> U + Send + Sync + 'static,
    {
        self.inner.map(f)
    }

    pub fn as_double_stream(self) -> DoubleStream {
        self.inner.map(N::as_f64).into()
    }

    /// Sum of all numbers; `0` for none.
    pub fn sum(self) -> Result<N::Total> {
        self.inner.collect(Summing::new(|x: &N| *x))
    }

    /// Arithmetic mean; `None` for no numbers.
    pub fn average(self) -> Result<Option<f64>> {
        Ok(self.summary_statistics()?.average())
    }

    /// Count, sum, min, max and average in a single traversal.
    pub fn summary_statistics(self) -> Result<SummaryStatistics<N>> {
        self.inner.collect(Summarizing::new(|x: &N| *x))
    }

    /// See [`Stream::count`].
    pub fn count(self) -> Result<u64> {
        self.inner.count()
    }

    /// Smallest element; any NaN makes the result NaN.
    pub fn min(self) -> Result<Option<N>> {
        self.inner.reduce(|a, b| lesser(Some(a), b))
    }

    /// Largest element; any NaN makes the result NaN.
    pub fn max(self) -> Result<Option<N>> {
        self.inner.reduce(|a, b| greater(Some(a), b))
    }

    pub fn reduce<F>(self, op: F) -> Result<Option<N>>
    where
        F: Fn(N, N) -> N + Send + Sync,
    {
        self.inner.reduce(op)
    }

    pub fn reduce_from<F>(self, identity: N, op: F) -> Result<N>
    where
        F: Fn(N, N) -> N + Send + Sync,
    {
        self.inner.reduce_from(identity, op)
    }

    pub fn any_match<F>(self, pred: F) -> Result<bool>
    where
        F: Fn(N) -> bool,
    {
        self.inner.any_match(|x| pred(*x))
    }

    pub fn all_match<F>(self, pred: F) -> Result<bool>
    where
        F: Fn(N) -> bool,
    {
        self.inner.all_match(|x| pred(*x))
    }

    pub fn none_match<F>(self, pred: F) -> Result<bool>
    where
        F: Fn(N) -> bool,
    {
        self.inner.none_match(|x| pred(*x))
    }

    pub fn find_first(self) -> Result<Option<N>> {
        self.inner.find_first()
    }

    pub fn find_any(self) -> Result<Option<N>> {
        self.inner.find_any()
    }

    pub fn for_each<F>(self, f: F) -> Result<()>
    where
        F: Fn(N) + Send + Sync,
    {
        self.inner.for_each(f)
    }

    pub fn for_each_ordered<F>(self, f: F) -> Result<()>
    where
        F: FnMut(N),
    {
        self.inner.for_each_ordered(f)
    }

    pub fn to_vec(self) -> Result<Vec<N>> {
        self.inner.to_vec()
    }
}

impl IntStream {
    pub fn as_long_stream(self) -> LongStream {
        self.inner.map(i64::from).into()
    }
}

macro_rules! map_to_numeric {
    ($($suffix:ident => $n:ty),*) => {
        paste! {
            impl<T: Send + 'static> Stream<T> {
                $(
                    #[doc = concat!("Map each element to `", stringify!($n), "`.")]
                    pub fn [<map_to_ $suffix>]<F>(self, f: F) -> NumericStream<$n>
                    where
                        F: Fn(T) -> $n + Send + Sync + 'static,
                    {
                        self.map(f).into()
                    }
                )*
            }
        }
    };
}

map_to_numeric!(int => i32, long => i64, double => f64);
