//! `to_concurrent_map`: a key/value collector backed by a [`DashMap`].

use super::maps::duplicate_key;
use super::Collector;
use anyhow::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Like [`ToMap`](super::ToMap), producing a [`DashMap`] that can be shared and updated
/// from several threads afterwards.
#[derive(Clone, Copy, Debug)]
pub struct ToConcurrentMap<KF, VF> {
    key: KF,
    value: VF,
}

fn insert_unique<K, V>(map: &DashMap<K, V>, key: K, value: V) -> Result<()>
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

impl<T, K, V, KF, VF> Collector<T, DashMap<K, V>, DashMap<K, V>> for ToConcurrentMap<KF, VF>
where
    K: Eq + Hash + Debug,
    KF: Fn(&T) -> K + Send + Sync + 'static,
    VF: Fn(T) -> V + Send + Sync + 'static,
{
    fn create(&self) -> DashMap<K, V> {
        DashMap::new()
    }

    fn add_input(&self, acc: &mut DashMap<K, V>, element: T) -> Result<()> {
        let k = (self.key)(&element);
        insert_unique(acc, k, (self.value)(element))
    }

    fn merge(&self, acc: &mut DashMap<K, V>, other: DashMap<K, V>) -> Result<()> {
        for (k, v) in other {
            insert_unique(acc, k, v)?;
        }
        Ok(())
    }

    fn finish(&self, acc: DashMap<K, V>) -> DashMap<K, V> {
        acc
    }
}

/// Collect into a concurrent map, failing on duplicate keys like [`to_map`](super::to_map).
pub fn to_concurrent_map<T, K, V, KF, VF>(key: KF, value: VF) -> ToConcurrentMap<KF, VF>
where
    KF: Fn(&T) -> K + Send + Sync + 'static,
    VF: Fn(T) -> V + Send + Sync + 'static,
{
    ToConcurrentMap { key, value }
}
