//! Read-delegating views.
//!
//! Each view holds a shared reference to one inner instance and forwards
//! every read (equality, hashing, iteration, lookup) to it. Views own no
//! storage and no hash cache of their own; hashing goes through the inner
//! instance's cache.
//!
//! Write policies are fixed per variant:
//! - [`RecordView`] rejects writes outright with an immutability violation.
//! - [`MapView`] and [`ListView`] evolve through: updates delegate to the
//!   inner collection and wrap the result in a new view.

use crate::{
    collection::{ListData, MapBatch, MapData},
    error::{CollectionError, RecordError},
    record::{FieldUpdate, Record},
    value::Value,
};
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

///
/// RecordView
///
/// Read-only proxy over a record. All write and evolve operations are
/// rejected with an immutability violation, regardless of the inner type's
/// mutability opt-in.
///

#[derive(Clone)]
pub struct RecordView {
    inner: Arc<Record>,
}

impl RecordView {
    #[must_use]
    pub fn new(record: Record) -> Self {
        Self {
            inner: Arc::new(record),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &Record {
        &self.inner
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    pub fn get(&self, name: &str) -> Result<&Value, RecordError> {
        self.inner.get(name)
    }

    #[must_use]
    pub fn try_get(&self, name: &str) -> Option<&Value> {
        self.inner.try_get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter()
    }

    /// Delegates to the inner instance's cache; the view never caches
    /// independently.
    #[must_use]
    pub fn hash_value(&self) -> u64 {
        self.inner.hash_value()
    }

    /// Fixed policy: rejected outright.
    pub fn evolve(
        &self,
        _updates: impl IntoIterator<Item = (String, FieldUpdate)>,
    ) -> Result<Self, RecordError> {
        Err(RecordError::Immutable {
            type_name: self.inner.type_name().to_string(),
        })
    }
}

impl PartialEq for RecordView {
    fn eq(&self, other: &Self) -> bool {
        *self.inner == *other.inner
    }
}

impl Eq for RecordView {}

impl PartialEq<Record> for RecordView {
    fn eq(&self, other: &Record) -> bool {
        *self.inner == *other
    }
}

impl Hash for RecordView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl fmt::Debug for RecordView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl fmt::Display for RecordView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

///
/// MapView
///
/// Read-delegating proxy over a dictionary collection. Updates evolve
/// through: they produce a new inner collection wrapped in a new view.
///

#[derive(Clone)]
pub struct MapView {
    inner: Arc<MapData>,
}

impl MapView {
    #[must_use]
    pub fn new(map: MapData) -> Self {
        Self {
            inner: Arc::new(map),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &MapData {
        &self.inner
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.inner.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.inner.iter()
    }

    #[must_use]
    pub fn hash_value(&self) -> u64 {
        self.inner.hash_value()
    }

    /// Fixed policy: delegate and re-wrap.
    pub fn update(&self, batch: MapBatch) -> Result<Self, CollectionError> {
        Ok(Self::new(self.inner.update(batch)?))
    }

    #[must_use]
    pub fn clear(&self) -> Self {
        Self::new(self.inner.clear())
    }
}

impl PartialEq for MapView {
    fn eq(&self, other: &Self) -> bool {
        *self.inner == *other.inner
    }
}

impl Eq for MapView {}

impl PartialEq<MapData> for MapView {
    fn eq(&self, other: &MapData) -> bool {
        *self.inner == *other
    }
}

impl Hash for MapView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl fmt::Debug for MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

///
/// ListView
///
/// Read-delegating proxy over a list collection. Updates evolve through:
/// they produce a new inner collection wrapped in a new view.
///

#[derive(Clone)]
pub struct ListView {
    inner: Arc<ListData>,
}

impl ListView {
    #[must_use]
    pub fn new(list: ListData) -> Self {
        Self {
            inner: Arc::new(list),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &ListData {
        &self.inner
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.inner.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.inner.iter()
    }

    #[must_use]
    pub fn count(&self, value: &Value) -> usize {
        self.inner.count(value)
    }

    pub fn index_of(
        &self,
        value: &Value,
        start: Option<usize>,
        stop: Option<usize>,
    ) -> Result<usize, CollectionError> {
        self.inner.index_of(value, start, stop)
    }

    #[must_use]
    pub fn hash_value(&self) -> u64 {
        self.inner.hash_value()
    }

    /// Fixed policy: delegate and re-wrap.
    pub fn set_range(&self, start: usize, values: Vec<Value>) -> Result<Self, CollectionError> {
        Ok(Self::new(self.inner.set_range(start, values)?))
    }

    pub fn insert_at(&self, index: usize, values: Vec<Value>) -> Result<Self, CollectionError> {
        Ok(Self::new(self.inner.insert_at(index, values)?))
    }

    pub fn delete_range(&self, start: usize, stop: usize) -> Result<Self, CollectionError> {
        Ok(Self::new(self.inner.delete_range(start, stop)?))
    }

    pub fn move_range(
        &self,
        start: usize,
        stop: usize,
        target: usize,
        values: Vec<Value>,
    ) -> Result<Self, CollectionError> {
        Ok(Self::new(self.inner.move_range(start, stop, target, values)?))
    }

    #[must_use]
    pub fn clear(&self) -> Self {
        Self::new(self.inner.clear())
    }
}

impl PartialEq for ListView {
    fn eq(&self, other: &Self) -> bool {
        *self.inner == *other.inner
    }
}

impl Eq for ListView {}

impl PartialEq<ListData> for ListView {
    fn eq(&self, other: &ListData) -> bool {
        *self.inner == *other
    }
}

impl Hash for ListView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl fmt::Debug for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDecl, Registry, TypeDef};

    #[test]
    fn record_view_delegates_reads_and_rejects_writes() {
        let mut registry = Registry::new();
        let schema = registry
            .register(TypeDef::new("P").field("x", FieldDecl::new()))
            .unwrap();
        let record = Record::new(&schema, vec![Value::Int(1)], vec![]).unwrap();

        let view = RecordView::new(record.clone());
        assert_eq!(view, record);
        assert_eq!(view.get("x").unwrap(), &Value::Int(1));
        assert_eq!(view.hash_value(), record.hash_value());

        let err = view
            .evolve(vec![("x".to_string(), FieldUpdate::Set(Value::Int(2)))])
            .unwrap_err();
        assert!(matches!(err, RecordError::Immutable { .. }));
    }

    #[test]
    fn collection_views_evolve_through() {
        let list = ListData::new()
            .from_values(vec![Value::Int(1), Value::Int(2)])
            .unwrap();
        let view = ListView::new(list.clone());

        let grown = view.insert_at(2, vec![Value::Int(3)]).unwrap();
        assert_eq!(grown.len(), 3);
        // the original view still sees the original contents
        assert_eq!(view, list);
    }
}
