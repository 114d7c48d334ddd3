//! Copy-on-write, insertion-ordered map.
//!
//! Every "mutating" operation returns a new map and leaves the receiver
//! untouched, so a snapshot handed to a renderer or a spawned task stays
//! valid no matter what the controller does afterwards. Cloning a map is a
//! reference-count bump; writes clone the entry vector.
//!
//! Lookups are linear scans over the entries.

use std::fmt;
use std::sync::Arc;

pub struct OrderedMap<K, V> {
    entries: Arc<Vec<(K, V)>>,
}

impl<K, V> Clone for OrderedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Vec::new()),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Clone + PartialEq,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from entries. A repeated key overwrites the earlier value
    /// and takes the position of the last write.
    pub fn create(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut out: Vec<(K, V)> = Vec::new();
        for (key, value) in entries {
            if let Some(pos) = out.iter().position(|(k, _)| *k == key) {
                out.remove(pos);
            }
            out.push((key, value));
        }
        Self {
            entries: Arc::new(out),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The stored value, or `default` when the key is absent.
    pub fn get_or(&self, key: &K, default: V) -> V {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Insert or replace. Replacing moves the key to the end.
    pub fn set(&self, key: K, value: V) -> Self {
        let mut entries: Vec<(K, V)> = self
            .entries
            .iter()
            .filter(|(k, _)| *k != key)
            .cloned()
            .collect();
        entries.push((key, value));
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Replace the value in place; returns the same map if the key is absent.
    pub fn update(&self, key: &K, value: V) -> Self {
        let Some(pos) = self.position(key) else {
            return self.clone();
        };
        let mut entries = (*self.entries).clone();
        entries[pos].1 = value;
        Self {
            entries: Arc::new(entries),
        }
    }

    pub fn remove(&self, key: &K) -> Self {
        let Some(pos) = self.position(key) else {
            return self.clone();
        };
        let mut entries = (*self.entries).clone();
        entries.remove(pos);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Right-biased merge: every entry of `other` is `set` in its order.
    pub fn concat(&self, other: &Self) -> Self {
        other
            .entries
            .iter()
            .fold(self.clone(), |acc, (k, v)| acc.set(k.clone(), v.clone()))
    }

    /// Sub-map of the entries at positions `start..end`, clamped to the length.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len());
        let start = start.min(end);
        Self {
            entries: Arc::new(self.entries[start..end].to_vec()),
        }
    }

    pub fn map<U, F>(&self, mut f: F) -> OrderedMap<K, U>
    where
        F: FnMut(&V, &K) -> U,
    {
        OrderedMap {
            entries: Arc::new(
                self.entries
                    .iter()
                    .map(|(k, v)| (k.clone(), f(v, k)))
                    .collect(),
            ),
        }
    }

    pub fn keys(&self) -> Vec<K> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<V> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn entries(&self) -> Vec<(K, V)> {
        (*self.entries).clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedMap<K, V>
where
    K: Clone + PartialEq,
    V: Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::create(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrderedMap<&'static str, i32> {
        OrderedMap::create([("a", 1), ("b", 2), ("c", 3)])
    }

    #[test]
    fn create_keeps_last_write_position() {
        let map = OrderedMap::create([("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(map.entries(), vec![("b", 2), ("a", 3)]);
    }

    #[test]
    fn get_or_falls_back_to_default() {
        let map = sample();
        assert_eq!(map.get_or(&"b", 0), 2);
        assert_eq!(map.get_or(&"z", 0), 0);
        assert_eq!(map.get(&"z"), None);
    }

    #[test]
    fn set_moves_existing_key_to_end() {
        let map = sample();
        let moved = map.set("a", 10);
        assert_eq!(moved.keys(), vec!["b", "c", "a"]);
        assert_eq!(moved.get(&"a"), Some(&10));
        // receiver untouched
        assert_eq!(map.keys(), vec!["a", "b", "c"]);
        assert_eq!(map.get(&"a"), Some(&1));
    }

    #[test]
    fn update_keeps_position_and_ignores_missing_keys() {
        let map = sample();
        let updated = map.update(&"a", 10);
        assert_eq!(updated.entries(), vec![("a", 10), ("b", 2), ("c", 3)]);

        let unchanged = map.update(&"z", 99);
        assert_eq!(unchanged, map);
        assert!(!unchanged.contains_key(&"z"));
    }

    #[test]
    fn remove_is_a_noop_for_missing_keys() {
        let map = sample();
        assert_eq!(map.remove(&"b").keys(), vec!["a", "c"]);
        assert_eq!(map.remove(&"z"), map);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn concat_is_right_biased() {
        let left = sample();
        let right = OrderedMap::create([("b", 20), ("d", 4)]);
        let merged = left.concat(&right);
        assert_eq!(merged.entries(), vec![("a", 1), ("c", 3), ("b", 20), ("d", 4)]);
    }

    #[test]
    fn map_transforms_values_in_order() {
        let doubled = sample().map(|v, k| format!("{k}{}", v * 2));
        assert_eq!(doubled.values(), vec!["a2", "b4", "c6"]);
        assert_eq!(doubled.keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn slice_clamps_to_length() {
        let map = sample();
        assert_eq!(map.slice(1, 10).keys(), vec!["b", "c"]);
        assert!(map.slice(5, 9).is_empty());
    }

    #[test]
    fn snapshots_are_independent() {
        let map = sample();
        let mut first = map.keys();
        first.push("x");
        assert_eq!(map.keys(), vec!["a", "b", "c"]);
        assert_eq!(map.iter().count(), 3);
        assert_eq!(map.iter().count(), 3);
    }
}
