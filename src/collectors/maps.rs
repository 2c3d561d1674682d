//! Map-building collectors: `to_map*`, `grouping_by*`, `partitioning_by*`.

use super::basic::{to_list, ToList};
use super::Collector;
use crate::error::StreamError;
use anyhow::Result;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

pub(super) fn duplicate_key<K: Debug>(key: &K) -> anyhow::Error {
    StreamError::DuplicateKey {
        key: format!("{key:?}"),
    }
    .into()
}

fn insert_unique<K, V>(map: &mut HashMap<K, V>, key: K, value: V) -> Result<()>
where
    K: Eq + Hash + Debug,
{
    match map.entry(key) {
        Entry::Occupied(e) => Err(duplicate_key(e.key())),
        Entry::Vacant(e) => {
            e.insert(value);
            Ok(())
        }
    }
}

/* ===================== ToMap ===================== */

/// `key(element) -> value(element)`; a repeated key is an error.
#[derive(Clone, Copy, Debug)]
pub struct ToMap<KF, VF> {
    key: KF,
    value: VF,
}

impl<T, K, V, KF, VF> Collector<T, HashMap<K, V>, HashMap<K, V>> for ToMap<KF, VF>
where
    K: Eq + Hash + Debug,
    KF: Fn(&T) -> K + Send + Sync + 'static,
    VF: Fn(T) -> V + Send + Sync + 'static,
{
    fn create(&self) -> HashMap<K, V> {
        HashMap::new()
    }

    fn add_input(&self, acc: &mut HashMap<K, V>, element: T) -> Result<()> {
        let k = (self.key)(&element);
        insert_unique(acc, k, (self.value)(element))
    }

    fn merge(&self, acc: &mut HashMap<K, V>, other: HashMap<K, V>) -> Result<()> {
        for (k, v) in other {
            insert_unique(acc, k, v)?;
        }
        Ok(())
    }

    fn finish(&self, acc: HashMap<K, V>) -> HashMap<K, V> {
        acc
    }
}

/// Collect into a map, failing with [`StreamError::DuplicateKey`] when two
/// elements produce the same key.
pub fn to_map<T, K, V, KF, VF>(key: KF, value: VF) -> ToMap<KF, VF>
where
    KF: Fn(&T) -> K + Send + Sync + 'static,
    VF: Fn(T) -> V + Send + Sync + 'static,
{
    ToMap { key, value }
}

/* ===================== ToMapMerging ===================== */

/// Like [`ToMap`], combining values of a repeated key with a merge function.
#[derive(Clone, Copy, Debug)]
pub struct ToMapMerging<KF, VF, MF> {
    key: KF,
    value: VF,
    merge: MF,
}

impl<KF, VF, MF> ToMapMerging<KF, VF, MF> {
    fn put<K, V>(&self, map: &mut HashMap<K, V>, k: K, v: V)
    where
        K: Eq + Hash,
        MF: Fn(V, V) -> V,
    {
        let merged = match map.remove(&k) {
            Some(existing) => (self.merge)(existing, v),
            None => v,
        };
        map.insert(k, merged);
    }
}

impl<T, K, V, KF, VF, MF> Collector<T, HashMap<K, V>, HashMap<K, V>> for ToMapMerging<KF, VF, MF>
where
    K: Eq + Hash,
    KF: Fn(&T) -> K + Send + Sync + 'static,
    VF: Fn(T) -> V + Send + Sync + 'static,
    MF: Fn(V, V) -> V + Send + Sync + 'static,
{
    fn create(&self) -> HashMap<K, V> {
        HashMap::new()
    }

    fn add_input(&self, acc: &mut HashMap<K, V>, element: T) -> Result<()> {
        let k = (self.key)(&element);
        self.put(acc, k, (self.value)(element));
        Ok(())
    }

    fn merge(&self, acc: &mut HashMap<K, V>, other: HashMap<K, V>) -> Result<()> {
        for (k, v) in other {
            self.put(acc, k, v);
        }
        Ok(())
    }

    fn finish(&self, acc: HashMap<K, V>) -> HashMap<K, V> {
        acc
    }
}

/// Collect into a map; values for a repeated key are combined as
/// `merge(earlier, later)` in encounter order.
pub fn to_map_merging<T, K, V, KF, VF, MF>(key: KF, value: VF, merge: MF) -> ToMapMerging<KF, VF, MF>
where
    KF: Fn(&T) -> K + Send + Sync + 'static,
    VF: Fn(T) -> V + Send + Sync + 'static,
    MF: Fn(V, V) -> V + Send + Sync + 'static,
{
    ToMapMerging { key, value, merge }
}

/* ===================== GroupingBy ===================== */

/// Groups elements by a classifier and collects each group downstream.
#[derive(Clone, Copy, Debug)]
pub struct GroupingBy<F, D> {
    classifier: F,
    downstream: D,
}

impl<T, K, A, O, F, D> Collector<T, HashMap<K, A>, HashMap<K, O>> for GroupingBy<F, D>
where
    K: Eq + Hash,
    F: Fn(&T) -> K + Send + Sync + 'static,
    D: Collector<T, A, O>,
{
    fn create(&self) -> HashMap<K, A> {
        HashMap::new()
    }

    fn add_input(&self, acc: &mut HashMap<K, A>, element: T) -> Result<()> {
        let group = acc
            .entry((self.classifier)(&element))
            .or_insert_with(|| self.downstream.create());
        self.downstream.add_input(group, element)
    }

    fn merge(&self, acc: &mut HashMap<K, A>, other: HashMap<K, A>) -> Result<()> {
        for (k, partial) in other {
            match acc.entry(k) {
                Entry::Occupied(mut e) => self.downstream.merge(e.get_mut(), partial)?,
                Entry::Vacant(e) => {
                    e.insert(partial);
                }
            }
        }
        Ok(())
    }

    fn finish(&self, acc: HashMap<K, A>) -> HashMap<K, O> {
        acc.into_iter()
            .map(|(k, a)| (k, self.downstream.finish(a)))
            .collect()
    }
}

/// Group elements into lists by `classifier`. Only keys that occur are
/// present.
pub fn grouping_by<T, K, F>(classifier: F) -> GroupingBy<F, ToList>
where
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    grouping_by_with::<T, K, F, ToList>(classifier, to_list())
}

/// Group elements by `classifier`, collecting each group with `downstream`.
pub fn grouping_by_with<T, K, F, D>(classifier: F, downstream: D) -> GroupingBy<F, D>
where
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    GroupingBy {
        classifier,
        downstream,
    }
}

/* ===================== PartitioningBy ===================== */

/// Splits elements by a predicate. The result always holds both `false` and
/// `true`, even when one side received nothing.
#[derive(Clone, Copy, Debug)]
pub struct PartitioningBy<P, D> {
    predicate: P,
    downstream: D,
}

impl<T, A, O, P, D> Collector<T, (A, A), HashMap<bool, O>> for PartitioningBy<P, D>
where
    P: Fn(&T) -> bool + Send + Sync + 'static,
    D: Collector<T, A, O>,
{
    /// `(rejected, accepted)`
    fn create(&self) -> (A, A) {
        (self.downstream.create(), self.downstream.create())
    }

    fn add_input(&self, acc: &mut (A, A), element: T) -> Result<()> {
        let side = if (self.predicate)(&element) {
            &mut acc.1
        } else {
            &mut acc.0
        };
        self.downstream.add_input(side, element)
    }

    fn merge(&self, acc: &mut (A, A), other: (A, A)) -> Result<()> {
        self.downstream.merge(&mut acc.0, other.0)?;
        self.downstream.merge(&mut acc.1, other.1)
    }

    fn finish(&self, acc: (A, A)) -> HashMap<bool, O> {
        let (rejected, accepted) = acc;
        HashMap::from([
            (false, self.downstream.finish(rejected)),
            (true, self.downstream.finish(accepted)),
        ])
    }
}

/// Partition elements into lists by `predicate`.
pub fn partitioning_by<T, P>(predicate: P) -> PartitioningBy<P, ToList>
where
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    partitioning_by_with::<T, P, ToList>(predicate, to_list())
}

/// Partition elements by `predicate`, collecting each side with `downstream`.
pub fn partitioning_by_with<T, P, D>(predicate: P, downstream: D) -> PartitioningBy<P, D>
where
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    PartitioningBy {
        predicate,
        downstream,
    }
}
