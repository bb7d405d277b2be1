use crate::{
    error::CollectionError,
    hash::structural_hasher,
    schema::Relationship,
    value::Value,
};
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::OnceLock,
};

///
/// MapBatch
///
/// One atomic batch of map mutations.
///
/// - `insert` is an upsert.
/// - `replace` is a no-op when the key is missing.
/// - `remove` is a no-op when the key is missing.
///

#[derive(Clone, Debug, Default)]
pub struct MapBatch {
    inserts: Vec<(Value, Value)>,
    replaces: Vec<(Value, Value)>,
    removes: Vec<Value>,
}

impl MapBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn insert(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.inserts.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn replace(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.replaces.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn remove(mut self, key: impl Into<Value>) -> Self {
        self.removes.push(key.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.replaces.is_empty() && self.removes.is_empty()
    }
}

///
/// MapData
///
/// Dictionary-flavored persistent collection over a HAMT. Iteration order is
/// unspecified and must not be relied on; equality and hashing are defined
/// over the logical key/value contents, never the internal layout.
///
/// Optional key/value relationships run on every inserted or replaced entry.
///

pub struct MapData {
    map: im::HashMap<Value, Value>,
    key_rel: Option<Relationship>,
    value_rel: Option<Relationship>,
    hash: OnceLock<u64>,
}

impl MapData {
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: im::HashMap::new(),
            key_rel: None,
            value_rel: None,
            hash: OnceLock::new(),
        }
    }

    /// Attach binding pipelines for keys and values.
    #[must_use]
    pub fn with_relationships(
        mut self,
        key_rel: Option<Relationship>,
        value_rel: Option<Relationship>,
    ) -> Self {
        self.key_rel = key_rel;
        self.value_rel = value_rel;
        self
    }

    /// Build from initial entries, running the binding pipelines.
    pub fn from_entries(
        self,
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Result<Self, CollectionError> {
        let mut map = self.map.clone();
        for (key, value) in entries {
            let (key, value) = self.bind_entry(key, value)?;
            map.insert(key, value);
        }

        Ok(self.with_map(map))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.map.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.map.get(key)
    }

    /// Lazy, restartable iteration. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.map.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.map.keys()
    }

    /// Apply a batch atomically, returning the updated collection.
    ///
    /// All entries are validated before anything is applied, so a failure
    /// yields no partial state and leaves `self` untouched. Unaffected keys
    /// share structure with the original.
    pub fn update(&self, batch: MapBatch) -> Result<Self, CollectionError> {
        let mut inserts = Vec::with_capacity(batch.inserts.len());
        for (key, value) in batch.inserts {
            inserts.push(self.bind_entry(key, value)?);
        }
        let mut replaces = Vec::with_capacity(batch.replaces.len());
        for (key, value) in batch.replaces {
            replaces.push(self.bind_entry(key, value)?);
        }

        let mut map = self.map.clone();
        for key in &batch.removes {
            map.remove(key);
        }
        for (key, value) in replaces {
            if map.contains_key(&key) {
                map.insert(key, value);
            }
        }
        for (key, value) in inserts {
            map.insert(key, value);
        }

        Ok(self.with_map(map))
    }

    /// The empty collection with the same relationships.
    #[must_use]
    pub fn clear(&self) -> Self {
        self.with_map(im::HashMap::new())
    }

    fn bind_entry(&self, key: Value, value: Value) -> Result<(Value, Value), CollectionError> {
        let key = match &self.key_rel {
            Some(rel) => rel.bind(key)?,
            None => key,
        };
        let value = match &self.value_rel {
            Some(rel) => rel.bind(value)?,
            None => value,
        };

        Ok((key, value))
    }

    fn with_map(&self, map: im::HashMap<Value, Value>) -> Self {
        Self {
            map,
            key_rel: self.key_rel.clone(),
            value_rel: self.value_rel.clone(),
            hash: OnceLock::new(),
        }
    }

    /// Cached logical hash: an order-insensitive combination of per-entry
    /// hashes, so internal HAMT layout never leaks into the value contract.
    #[must_use]
    pub fn hash_value(&self) -> u64 {
        *self.hash.get_or_init(|| {
            let mut combined = 0u64;
            for (key, value) in &self.map {
                let mut hasher = structural_hasher();
                key.hash(&mut hasher);
                value.hash(&mut hasher);
                combined = combined.wrapping_add(hasher.finish());
            }
            combined
        })
    }
}

impl Default for MapData {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies start with an empty hash cache.
impl Clone for MapData {
    fn clone(&self) -> Self {
        self.with_map(self.map.clone())
    }
}

impl PartialEq for MapData {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl Eq for MapData {}

impl Hash for MapData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl fmt::Debug for MapData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeConstraint;
    use crate::value::ValueKind;

    fn seed() -> MapData {
        MapData::new()
            .from_entries(vec![
                (Value::from("c"), Value::Int(3)),
                (Value::from("d"), Value::Int(4)),
            ])
            .unwrap()
    }

    #[test]
    fn batch_update_is_atomic_and_preserves_original() {
        let original = seed();
        let updated = original
            .update(
                MapBatch::new()
                    .insert("a", Value::Int(1))
                    .insert("b", Value::Int(2))
                    .remove("c"),
            )
            .unwrap();

        assert_eq!(updated.len(), 3);
        assert_eq!(updated.get(&Value::from("a")), Some(&Value::Int(1)));
        assert_eq!(updated.get(&Value::from("b")), Some(&Value::Int(2)));
        assert_eq!(updated.get(&Value::from("d")), Some(&Value::Int(4)));
        assert!(!updated.contains_key(&Value::from("c")));

        // original untouched
        assert_eq!(original.len(), 2);
        assert_eq!(original.get(&Value::from("c")), Some(&Value::Int(3)));
    }

    #[test]
    fn replace_is_noop_for_missing_keys() {
        let original = seed();
        let updated = original
            .update(
                MapBatch::new()
                    .replace("c", Value::Int(30))
                    .replace("zz", Value::Int(99)),
            )
            .unwrap();

        assert_eq!(updated.get(&Value::from("c")), Some(&Value::Int(30)));
        assert!(!updated.contains_key(&Value::from("zz")));
    }

    #[test]
    fn failed_batch_yields_no_partial_state() {
        let constrained = MapData::new()
            .with_relationships(
                None,
                Some(
                    Relationship::new().with_constraint(TypeConstraint::kind(ValueKind::Int)),
                ),
            )
            .from_entries(vec![(Value::from("k"), Value::Int(1))])
            .unwrap();

        let err = constrained
            .update(
                MapBatch::new()
                    .insert("ok", Value::Int(2))
                    .insert("bad", Value::from("text")),
            )
            .unwrap_err();

        assert!(matches!(err, CollectionError::Constraint(_)));
        assert_eq!(constrained.len(), 1);
        assert!(!constrained.contains_key(&Value::from("ok")));
    }

    #[test]
    fn equality_and_hash_ignore_layout_and_history() {
        let a = MapData::new()
            .from_entries(vec![
                (Value::Int(1), Value::from("a")),
                (Value::Int(2), Value::from("b")),
            ])
            .unwrap();
        let b = MapData::new()
            .from_entries(vec![(Value::Int(2), Value::from("b"))])
            .unwrap()
            .update(MapBatch::new().insert(Value::Int(1), Value::from("a")))
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
    }

    #[test]
    fn clear_keeps_relationships() {
        let constrained = MapData::new()
            .with_relationships(
                None,
                Some(
                    Relationship::new().with_constraint(TypeConstraint::kind(ValueKind::Int)),
                ),
            )
            .from_entries(vec![(Value::from("k"), Value::Int(1))])
            .unwrap();

        let cleared = constrained.clear();
        assert!(cleared.is_empty());
        assert!(
            cleared
                .update(MapBatch::new().insert("k", Value::from("text")))
                .is_err()
        );
    }
}
