//! Numeric reduction collectors.
//!
//! Each takes a mapper from the element to an `i32`, `i64` or `f64`:
//!
//! - `summing_*` -- sum of mapped values (`i64` for integers, `f64` for doubles).
//! - `averaging_*` -- mean as `f64`; `0.0` when there are no elements.
//! - `summarizing_*` -- a [`SummaryStatistics`], whose `average()` is `None`
//!   when there are no elements.

use super::Collector;
use crate::numeric::{Numeric, SummaryStatistics};
use anyhow::Result;
use paste::paste;
use std::marker::PhantomData;

/* ===================== Summing ===================== */

pub struct Summing<F, N> {
    f: F,
    _n: PhantomData<fn() -> N>,
}

impl<F, N> Summing<F, N> {
    pub const fn new(f: F) -> Self {
        Self { f, _n: PhantomData }
    }
}

impl<T, N, F> Collector<T, N::Sum, N::Total> for Summing<F, N>
where
    N: Numeric,
    F: Fn(&T) -> N + Send + Sync + 'static,
{
    fn create(&self) -> N::Sum {
        N::Sum::default()
    }

    fn add_input(&self, acc: &mut N::Sum, value: T) -> Result<()> {
        N::add_to(acc, (self.f)(&value));
        Ok(())
    }

    fn merge(&self, acc: &mut N::Sum, other: N::Sum) -> Result<()> {
        N::merge_sums(acc, other);
        Ok(())
    }

    fn finish(&self, acc: N::Sum) -> N::Total {
        N::total(&acc)
    }
}

/* ===================== Averaging ===================== */

pub struct Averaging<F, N> {
    f: F,
    _n: PhantomData<fn() -> N>,
}

impl<F, N> Averaging<F, N> {
    pub const fn new(f: F) -> Self {
        Self { f, _n: PhantomData }
    }
}

impl<T, N, F> Collector<T, (N::Sum, u64), f64> for Averaging<F, N>
where
    N: Numeric,
    F: Fn(&T) -> N + Send + Sync + 'static,
{
    fn create(&self) -> (N::Sum, u64) {
        (N::Sum::default(), 0)
    }

    fn add_input(&self, acc: &mut (N::Sum, u64), value: T) -> Result<()> {
        N::add_to(&mut acc.0, (self.f)(&value));
        acc.1 += 1;
        Ok(())
    }

    fn merge(&self, acc: &mut (N::Sum, u64), other: (N::Sum, u64)) -> Result<()> {
        N::merge_sums(&mut acc.0, other.0);
        acc.1 += other.1;
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, acc: (N::Sum, u64)) -> f64 {
        if acc.1 == 0 {
            0.0
        } else {
            N::total_as_f64(&acc.0) / acc.1 as f64
        }
    }
}

/* ===================== Summarizing ===================== */

pub struct Summarizing<F, N> {
    f: F,
    _n: PhantomData<fn() -> N>,
}

impl<F, N> Summarizing<F, N> {
    pub const fn new(f: F) -> Self {
        Self { f, _n: PhantomData }
    }
}

impl<T, N, F> Collector<T, SummaryStatistics<N>, SummaryStatistics<N>> for Summarizing<F, N>
where
    N: Numeric,
    F: Fn(&T) -> N + Send + Sync + 'static,
{
    fn create(&self) -> SummaryStatistics<N> {
        SummaryStatistics::new()
    }

    fn add_input(&self, acc: &mut SummaryStatistics<N>, value: T) -> Result<()> {
        acc.accept((self.f)(&value));
        Ok(())
    }

    fn merge(&self, acc: &mut SummaryStatistics<N>, other: SummaryStatistics<N>) -> Result<()> {
        acc.combine(&other);
        Ok(())
    }

    fn finish(&self, acc: SummaryStatistics<N>) -> SummaryStatistics<N> {
        acc
    }
}

macro_rules! numeric_collectors {
    ($($suffix:ident => $n:ty),*) => {
        paste! {
            $(
                pub fn [<summing_ $suffix>]<T, F>(f: F) -> Summing<F, $n>
                where
                    F: Fn(&T) -> $n + Send + Sync + 'static,
                {
                    Summing::new(f)
                }

                pub fn [<averaging_ $suffix>]<T, F>(f: F) -> Averaging<F, $n>
                where
                    F: Fn(&T) -> $n + Send + Sync + 'static,
                {
                    Averaging::new(f)
                }

                pub fn [<summarizing_ $suffix>]<T, F>(f: F) -> Summarizing<F, $n>
                where
                    F: Fn(&T) -> $n + Send + Sync + 'static,
                {
                    Summarizing::new(f)
                }
            )*
        }
    };
}

numeric_collectors!(int => i32, long => i64, double => f64);
