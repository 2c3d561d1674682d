//! Gathering and general-purpose collectors.

use super::Collector;
use anyhow::Result;
use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;

/* ===================== ToList ===================== */

/// All elements in encounter order.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToList;

impl<T> Collector<T, Vec<T>, Vec<T>> for ToList {
    fn create(&self) -> Vec<T> {
        Vec::new()
    }

    fn add_input(&self, acc: &mut Vec<T>, value: T) -> Result<()> {
        acc.push(value);
        Ok(())
    }

    fn merge(&self, acc: &mut Vec<T>, other: Vec<T>) -> Result<()> {
        acc.extend(other);
        Ok(())
    }

    fn finish(&self, acc: Vec<T>) -> Vec<T> {
        acc
    }
}

pub fn to_list() -> ToList {
    ToList
}

/* ===================== ToSet ===================== */

/// Distinct elements, in no particular order.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToSet;

impl<T: Eq + Hash> Collector<T, HashSet<T>, HashSet<T>> for ToSet {
    fn create(&self) -> HashSet<T> {
        HashSet::new()
    }

    fn add_input(&self, acc: &mut HashSet<T>, value: T) -> Result<()> {
        acc.insert(value);
        Ok(())
    }

    fn merge(&self, acc: &mut HashSet<T>, other: HashSet<T>) -> Result<()> {
        acc.extend(other);
        Ok(())
    }

    fn finish(&self, acc: HashSet<T>) -> HashSet<T> {
        acc
    }
}

pub fn to_set() -> ToSet {
    ToSet
}

/* ===================== ToCollection ===================== */

/// Elements added, in encounter order, to a container made by a supplier.
///
/// Whether the container keeps that order is up to the container: a `Vec`
/// or `VecDeque` does, a `BTreeSet` sorts, a `HashSet` does not.
#[derive(Clone, Copy, Debug)]
pub struct ToCollection<S> {
    supplier: S,
}

impl<T, C, S> Collector<T, C, C> for ToCollection<S>
where
    C: Extend<T> + IntoIterator<Item = T>,
    S: Fn() -> C + Send + Sync + 'static,
{
    fn create(&self) -> C {
        (self.supplier)()
    }

    fn add_input(&self, acc: &mut C, value: T) -> Result<()> {
        acc.extend(std::iter::once(value));
        Ok(())
    }

    fn merge(&self, acc: &mut C, other: C) -> Result<()> {
        acc.extend(other);
        Ok(())
    }

    fn finish(&self, acc: C) -> C {
        acc
    }
}

/// Collect into the container returned by `supplier`.
///
/// ```
/// use ironstream::{Stream, collectors::to_collection};
/// use std::collections::BTreeSet;
///
/// let set = Stream::of(vec![3, 1, 2, 1]).collect(to_collection(BTreeSet::new)).unwrap();
/// assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
/// ```
pub fn to_collection<C, S>(supplier: S) -> ToCollection<S>
where
    S: Fn() -> C + Send + Sync + 'static,
{
    ToCollection { supplier }
}

/* ===================== Counting ===================== */

/// Number of elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct Counting;

impl<T> Collector<T, u64, u64> for Counting {
    fn create(&self) -> u64 {
        0
    }

    fn add_input(&self, acc: &mut u64, _value: T) -> Result<()> {
        *acc += 1;
        Ok(())
    }

    fn merge(&self, acc: &mut u64, other: u64) -> Result<()> {
        *acc += other;
        Ok(())
    }

    fn finish(&self, acc: u64) -> u64 {
        acc
    }
}

pub fn counting() -> Counting {
    Counting
}

/* ===================== Reducing ===================== */

/// Reduction with a binary operator; `None` for no elements.
#[derive(Clone, Copy, Debug)]
pub struct Reducing<F> {
    op: F,
}

impl<T, F> Collector<T, Option<T>, Option<T>> for Reducing<F>
where
    F: Fn(T, T) -> T + Send + Sync + 'static,
{
    fn create(&self) -> Option<T> {
        None
    }

    fn add_input(&self, acc: &mut Option<T>, value: T) -> Result<()> {
        *acc = Some(match acc.take() {
            Some(a) => (self.op)(a, value),
            None => value,
        });
        Ok(())
    }

    fn merge(&self, acc: &mut Option<T>, other: Option<T>) -> Result<()> {
        if let Some(b) = other {
            *acc = Some(match acc.take() {
                Some(a) => (self.op)(a, b),
                None => b,
            });
        }
        Ok(())
    }

    fn finish(&self, acc: Option<T>) -> Option<T> {
        acc
    }
}

pub fn reducing<T, F>(op: F) -> Reducing<F>
where
    F: Fn(T, T) -> T + Send + Sync + 'static,
{
    Reducing { op }
}

/// Reduction with a binary operator starting from an identity value, which is
/// also the result for no elements.
#[derive(Clone, Copy, Debug)]
pub struct ReducingFrom<T, F> {
    identity: T,
    op: F,
}

impl<T, F> Collector<T, T, T> for ReducingFrom<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T, T) -> T + Send + Sync + 'static,
{
    fn create(&self) -> T {
        self.identity.clone()
    }

    fn add_input(&self, acc: &mut T, value: T) -> Result<()> {
        let current = std::mem::replace(acc, self.identity.clone());
        *acc = (self.op)(current, value);
        Ok(())
    }

    fn merge(&self, acc: &mut T, other: T) -> Result<()> {
        let current = std::mem::replace(acc, self.identity.clone());
        *acc = (self.op)(current, other);
        Ok(())
    }

    fn finish(&self, acc: T) -> T {
        acc
    }
}

pub fn reducing_from<T, F>(identity: T, op: F) -> ReducingFrom<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T, T) -> T + Send + Sync + 'static,
{
    ReducingFrom { identity, op }
}

/* ===================== CollectingAndThen ===================== */

/// Another collector's result, post-processed by a finisher.
pub struct CollectingAndThen<C, F, R> {
    collector: C,
    finisher: F,
    _r: PhantomData<fn() -> R>,
}

impl<T, A, R, O, C, F> Collector<T, A, O> for CollectingAndThen<C, F, R>
where
    C: Collector<T, A, R>,
    F: Fn(R) -> O + Send + Sync + 'static,
    R: 'static,
{
    fn create(&self) -> A {
        self.collector.create()
    }

    fn add_input(&self, acc: &mut A, value: T) -> Result<()> {
        self.collector.add_input(acc, value)
    }

    fn merge(&self, acc: &mut A, other: A) -> Result<()> {
        self.collector.merge(acc, other)
    }

    fn finish(&self, acc: A) -> O {
        (self.finisher)(self.collector.finish(acc))
    }
}

/// Wrap `collector` so that `finisher` is applied to its result.
pub fn collecting_and_then<C, F, R, O>(collector: C, finisher: F) -> CollectingAndThen<C, F, R>
where
    F: Fn(R) -> O + Send + Sync + 'static,
{
    CollectingAndThen {
        collector,
        finisher,
        _r: PhantomData,
    }
}

/* ===================== Mapping ===================== */

/// Elements transformed by a function before reaching a downstream collector.
pub struct Mapping<F, D, U> {
    f: F,
    downstream: D,
    _u: PhantomData<fn() -> U>,
}

impl<T, U, A, O, F, D> Collector<T, A, O> for Mapping<F, D, U>
where
    F: Fn(T) -> U + Send + Sync + 'static,
    D: Collector<U, A, O>,
    U: 'static,
{
    fn create(&self) -> A {
        self.downstream.create()
    }

    fn add_input(&self, acc: &mut A, value: T) -> Result<()> {
        self.downstream.add_input(acc, (self.f)(value))
    }

    fn merge(&self, acc: &mut A, other: A) -> Result<()> {
        self.downstream.merge(acc, other)
    }

    fn finish(&self, acc: A) -> O {
        self.downstream.finish(acc)
    }
}

pub fn mapping<T, U, F, D>(f: F, downstream: D) -> Mapping<F, D, U>
where
    F: Fn(T) -> U + Send + Sync + 'static,
{
    Mapping {
        f,
        downstream,
        _u: PhantomData,
    }
}
