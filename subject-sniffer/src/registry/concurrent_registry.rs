/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Generic reader/writer-locked key/value registry.

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Identity comparison for registry values.
///
/// `remove_with_value` and `iter_remove_with_value` only remove an entry when the
/// stored value is *the same value* as the one supplied, not merely an equal one.
pub trait SameValue {
    fn same_value(&self, other: &Self) -> bool;
}

impl<T: ?Sized> SameValue for Arc<T> {
    fn same_value(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

/// Thread-safe map guarded by a single reader/writer lock over the whole key space.
///
/// Reads run concurrently with other reads; writes are exclusive. Values are handed
/// out as clones, so callers never hold the lock while working with a value.
///
/// ```
/// use subject_sniffer::Registry;
///
/// let registry: Registry<String, u32> = Registry::new();
/// registry.set("orders.created".to_string(), 1);
///
/// let mut snapshot = registry.iter();
/// snapshot.clear();
///
/// assert_eq!(registry.get("orders.created"), Some(1));
/// assert_eq!(registry.count(), 1);
/// ```
pub struct Registry<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave a HashMap half-updated, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, V>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, V>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: K, value: V) {
        self.write().insert(key, value);
    }

    /// Removes `key` if present.
    pub fn remove<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write().remove(key);
    }

    /// Returns a clone of the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().get(key).cloned()
    }

    /// Removes `key` and returns the value it held.
    pub fn get_and_remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write().remove(key)
    }

    /// Returns the value under `key`, inserting the result of `make` first when absent.
    ///
    /// Lookup and insertion happen under one write lock, so concurrent callers for the
    /// same key all observe the same value.
    pub fn get_or_insert_with<F>(&self, key: K, make: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(existing) = self.read().get(&key) {
            return existing.clone();
        }

        self.write().entry(key).or_insert_with(make).clone()
    }

    /// Returns the number of entries.
    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Returns whether `key` is present.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Returns the set of keys at the time of the call.
    pub fn keys(&self) -> HashSet<K> {
        self.read().keys().cloned().collect()
    }

    /// Returns the values at the time of the call, in no particular order.
    pub fn values(&self) -> Vec<V> {
        self.read().values().cloned().collect()
    }

    /// Returns a point-in-time copy of every entry.
    ///
    /// The copy is detached from the registry: mutating it never changes the registry
    /// and later registry writes never show up in it.
    pub fn iter(&self) -> HashMap<K, V> {
        self.read().clone()
    }

    /// Removes every entry and returns them.
    pub fn clear(&self) -> HashMap<K, V> {
        std::mem::take(&mut *self.write())
    }
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + SameValue,
{
    /// Removes `key` only when it currently holds `value` itself.
    ///
    /// Returns the value stored under `key` whenever the key was present, whether or
    /// not it matched and was removed; `None` means the key was absent.
    pub fn remove_with_value<Q>(&self, key: &Q, value: &V) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut entries = self.write();
        let stored = entries.get(key)?.clone();
        if stored.same_value(value) {
            entries.remove(key);
        }
        Some(stored)
    }

    /// Removes every entry holding `value` itself and returns how many were removed.
    pub fn iter_remove_with_value(&self, value: &V) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, stored| !stored.same_value(value));
        before - entries.len()
    }
}

impl<K, V> Default for Registry<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Debug for Registry<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("keys", &self.keys())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{Registry, SameValue};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn registry_with(entries: &[(&str, u32)]) -> Registry<String, u32> {
        let registry = Registry::new();
        for (key, value) in entries {
            registry.set(key.to_string(), *value);
        }
        registry
    }

    #[test]
    fn set_overwrites_and_get_returns_latest_value() {
        let registry = registry_with(&[("a", 1)]);
        registry.set("a".to_string(), 2);

        assert_eq!(registry.get("a"), Some(2));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get("missing"), None);
    }

    #[test]
    fn remove_and_get_and_remove_drop_entries() {
        let registry = registry_with(&[("a", 1), ("b", 2)]);

        registry.remove("a");
        registry.remove("never-there");
        assert!(!registry.has("a"));

        assert_eq!(registry.get_and_remove("b"), Some(2));
        assert_eq!(registry.get_and_remove("b"), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn keys_values_and_iter_reflect_contents() {
        let registry = registry_with(&[("a", 1), ("b", 2)]);

        let keys = registry.keys();
        assert_eq!(
            keys,
            HashSet::from(["a".to_string(), "b".to_string()])
        );

        let mut values = registry.values();
        values.sort_unstable();
        assert_eq!(values, vec![1, 2]);

        let snapshot = registry.iter();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("b"), Some(&2));
    }

    #[test]
    fn snapshot_is_detached_from_live_registry() {
        let registry = registry_with(&[("a", 1)]);

        let mut snapshot = registry.iter();
        snapshot.insert("b".to_string(), 2);
        snapshot.remove("a");
        registry.set("c".to_string(), 3);

        assert!(registry.has("a"));
        assert!(!registry.has("b"));
        assert!(!snapshot.contains_key("c"));
    }

    #[test]
    fn get_or_insert_with_only_creates_once() {
        let registry: Registry<String, Arc<u32>> = Registry::new();

        let first = registry.get_or_insert_with("a".to_string(), || Arc::new(1));
        let second = registry.get_or_insert_with("a".to_string(), || Arc::new(2));

        assert!(first.same_value(&second));
        assert_eq!(*second, 1);
    }

    #[test]
    fn remove_with_value_requires_identity_not_equality() {
        let registry: Registry<String, Arc<u32>> = Registry::new();
        let stored = Arc::new(7);
        let lookalike = Arc::new(7);
        registry.set("a".to_string(), stored.clone());

        let kept = registry
            .remove_with_value("a", &lookalike)
            .expect("key is present");
        assert!(kept.same_value(&stored));
        assert!(registry.has("a"));

        assert!(registry.remove_with_value("a", &stored).is_some());
        assert!(!registry.has("a"));
        assert!(registry.remove_with_value("a", &stored).is_none());
    }

    #[test]
    fn iter_remove_with_value_counts_removed_entries() {
        let registry: Registry<String, Arc<u32>> = Registry::new();
        let shared = Arc::new(1);
        registry.set("a".to_string(), shared.clone());
        registry.set("b".to_string(), shared.clone());
        registry.set("c".to_string(), Arc::new(1));

        assert_eq!(registry.iter_remove_with_value(&shared), 2);
        assert_eq!(registry.keys(), HashSet::from(["c".to_string()]));
        assert_eq!(registry.iter_remove_with_value(&shared), 0);
    }

    #[test]
    fn clear_returns_all_entries() {
        let registry = registry_with(&[("a", 1), ("b", 2)]);

        let drained = registry.clear();

        assert_eq!(drained.len(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_writers_and_readers_do_not_lose_updates() {
        let registry: Arc<Registry<String, usize>> = Arc::new(Registry::new());

        let writers: Vec<_> = (0..8)
            .map(|worker| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for n in 0..100 {
                        registry.set(format!("{worker}-{n}"), n);
                        let _ = registry.count();
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().expect("writer thread");
        }

        assert_eq!(registry.count(), 800);
    }
}
