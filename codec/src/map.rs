use std::{
    borrow::Borrow,
    collections::{hash_map::RandomState, HashMap},
    hash::{BuildHasher, Hash, Hasher},
};

/// Hashing for map keys, consistent with their `PartialEq`.
///
/// Floats hash their bit pattern with `-0.0` folded into `0.0`. Generated
/// models hash only their scalar fields, which keeps equal models in the
/// same bucket.
pub trait MapKey: PartialEq {
    fn hash_key<H: Hasher>(&self, state: &mut H);
}

macro_rules! hashed_key {
    ($($t:ty),*) => {
        $(impl MapKey for $t {
            fn hash_key<H: Hasher>(&self, state: &mut H) {
                self.hash(state);
            }
        })*
    };
}

hashed_key!(String, Vec<u8>, bool, i32, i64, u32, u64);

impl MapKey for f32 {
    fn hash_key<H: Hasher>(&self, state: &mut H) {
        let value = if *self == 0.0 { 0.0f32 } else { *self };
        value.to_bits().hash(state);
    }
}

impl MapKey for f64 {
    fn hash_key<H: Hasher>(&self, state: &mut H) {
        let value = if *self == 0.0 { 0.0f64 } else { *self };
        value.to_bits().hash(state);
    }
}

/// Insertion-ordered association list used for schema map fields.
///
/// Map keys in a schema may be floats or whole models, neither of which is
/// `Hash` or `Ord`, so lookups only require `PartialEq`. Iteration (and
/// therefore encoding) follows insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Map<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Map<K, V> {
    pub fn new() -> Self {
        Map { entries: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Map { entries: Vec::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<K: PartialEq, V> Map<K, V> {
    /// Inserts `value` under `key`, returning the previous value if the key
    /// was already present. A replaced entry keeps its original position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.entries
            .iter()
            .find(|(k, _)| <K as Borrow<Q>>::borrow(k) == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.entries
            .iter_mut()
            .find(|(k, _)| <K as Borrow<Q>>::borrow(k) == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.get(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        let position = self
            .entries
            .iter()
            .position(|(k, _)| <K as Borrow<Q>>::borrow(k) == key)?;
        Some(self.entries.remove(position).1)
    }
}

impl<K: MapKey, V> Map<K, V> {
    /// Builds a map from decoded entries in linear time. A repeated key keeps
    /// its first position and takes the last value, matching `insert`.
    pub fn from_entries(entries: Vec<(K, V)>) -> Self {
        let hasher = RandomState::new();
        let mut buckets: HashMap<u64, Vec<usize>> = HashMap::with_capacity(entries.len());
        let mut unique: Vec<(K, V)> = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            let mut state = hasher.build_hasher();
            key.hash_key(&mut state);
            let bucket = buckets.entry(state.finish()).or_default();
            let found = bucket.iter().copied().find(|&i| unique[i].0 == key);
            match found {
                Some(i) => unique[i].1 = value,
                None => {
                    bucket.push(unique.len());
                    unique.push((key, value));
                }
            }
        }
        Map { entries: unique }
    }
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Map::new()
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        map.extend(iter);
        map
    }
}

impl<K: PartialEq, V> Extend<(K, V)> for Map<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> IntoIterator for Map<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Map<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = std::iter::Map<std::slice::Iter<'a, (K, V)>, fn(&'a (K, V)) -> (&'a K, &'a V)>;

    fn into_iter(self) -> Self::IntoIter {
        let entry: fn(&'a (K, V)) -> (&'a K, &'a V) = |(k, v)| (k, v);
        self.entries.iter().map(entry)
    }
}
