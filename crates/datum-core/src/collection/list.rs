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
/// ListData
///
/// List-flavored persistent collection over an RRB vector. Iteration is
/// ordered; equality and hashing follow canonical iteration order, never the
/// internal tree layout. Every update returns a new instance built from
/// shared structure.
///
/// An optional element relationship runs on every inserted or replaced
/// value.
///

pub struct ListData {
    state: im::Vector<Value>,
    rel: Option<Relationship>,
    hash: OnceLock<u64>,
}

impl ListData {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: im::Vector::new(),
            rel: None,
            hash: OnceLock::new(),
        }
    }

    /// Attach a binding pipeline for elements.
    #[must_use]
    pub fn with_relationship(mut self, rel: Relationship) -> Self {
        self.rel = Some(rel);
        self
    }

    /// Build from initial values, running the binding pipeline.
    pub fn from_values(
        self,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Self, CollectionError> {
        let mut state = self.state.clone();
        for value in values {
            state.push_back(self.bind(value)?);
        }

        Ok(self.with_state(state))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.state.get(index)
    }

    /// Lazy, restartable, ordered iteration.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.state.iter()
    }

    /// Number of elements equal to `value`.
    #[must_use]
    pub fn count(&self, value: &Value) -> usize {
        self.state.iter().filter(|v| *v == value).count()
    }

    /// First index of `value` within the bounded search window.
    ///
    /// No bounds searches the whole sequence; `start` alone searches from
    /// `start` to the end; `start` and `stop` bound the search. `stop`
    /// without `start` is an argument-usage violation, mirroring host
    /// sequence-search conventions.
    pub fn index_of(
        &self,
        value: &Value,
        start: Option<usize>,
        stop: Option<usize>,
    ) -> Result<usize, CollectionError> {
        let (start, stop) = match (start, stop) {
            (None, None) => (0, self.state.len()),
            (Some(start), None) => (start, self.state.len()),
            (Some(start), Some(stop)) => (start, stop.min(self.state.len())),
            (None, Some(_)) => return Err(CollectionError::StopWithoutStart),
        };

        self.state
            .iter()
            .enumerate()
            .skip(start)
            .take(stop.saturating_sub(start))
            .find(|(_, v)| *v == value)
            .map(|(i, _)| i)
            .ok_or(CollectionError::ValueNotFound)
    }

    /// Replace the contiguous range starting at `start` with `values`.
    pub fn set_range(
        &self,
        start: usize,
        values: Vec<Value>,
    ) -> Result<Self, CollectionError> {
        let stop = start + values.len();
        if stop > self.state.len() {
            return Err(CollectionError::RangeOutOfBounds {
                start,
                stop,
                len: self.state.len(),
            });
        }

        let values = self.bind_all(values)?;
        let mut state = self.state.clone();
        for (offset, value) in values.into_iter().enumerate() {
            state.set(start + offset, value);
        }

        Ok(self.with_state(state))
    }

    /// Insert `values` at `index`.
    ///
    /// Appending, prepending, and mid-splicing take different
    /// structural-sharing paths but produce equivalent logical results.
    pub fn insert_at(&self, index: usize, values: Vec<Value>) -> Result<Self, CollectionError> {
        if index > self.state.len() {
            return Err(CollectionError::IndexOutOfBounds {
                index,
                len: self.state.len(),
            });
        }

        let values = self.bind_all(values)?;

        Ok(self.with_state(splice(&self.state, index, values)))
    }

    /// Delete the contiguous range `start..stop`.
    pub fn delete_range(&self, start: usize, stop: usize) -> Result<Self, CollectionError> {
        if start > stop || stop > self.state.len() {
            return Err(CollectionError::RangeOutOfBounds {
                start,
                stop,
                len: self.state.len(),
            });
        }

        Ok(self.with_state(remove_range(&self.state, start, stop)))
    }

    /// Atomically delete `start..stop`, then insert `values` at `target`.
    ///
    /// `target` addresses the original sequence and is re-based past the
    /// removed gap; no intermediate state is observable.
    pub fn move_range(
        &self,
        start: usize,
        stop: usize,
        target: usize,
        values: Vec<Value>,
    ) -> Result<Self, CollectionError> {
        if start > stop || stop > self.state.len() {
            return Err(CollectionError::RangeOutOfBounds {
                start,
                stop,
                len: self.state.len(),
            });
        }
        if target > self.state.len() {
            return Err(CollectionError::IndexOutOfBounds {
                index: target,
                len: self.state.len(),
            });
        }

        let values = self.bind_all(values)?;

        let removed = stop - start;
        let post_target = if target >= stop {
            target - removed
        } else if target <= start {
            target
        } else {
            // target inside the removed gap collapses onto its left edge
            start
        };

        let state = remove_range(&self.state, start, stop);

        Ok(self.with_state(splice(&state, post_target, values)))
    }

    /// The empty collection with the same relationship.
    #[must_use]
    pub fn clear(&self) -> Self {
        self.with_state(im::Vector::new())
    }

    fn bind(&self, value: Value) -> Result<Value, CollectionError> {
        match &self.rel {
            Some(rel) => Ok(rel.bind(value)?),
            None => Ok(value),
        }
    }

    fn bind_all(&self, values: Vec<Value>) -> Result<Vec<Value>, CollectionError> {
        values.into_iter().map(|v| self.bind(v)).collect()
    }

    fn with_state(&self, state: im::Vector<Value>) -> Self {
        Self {
            state,
            rel: self.rel.clone(),
            hash: OnceLock::new(),
        }
    }

    /// Cached logical hash over canonical iteration order.
    #[must_use]
    pub fn hash_value(&self) -> u64 {
        *self.hash.get_or_init(|| {
            let mut hasher = structural_hasher();
            for value in &self.state {
                value.hash(&mut hasher);
            }
            hasher.finish()
        })
    }
}

/// Insert `values` at `index`, choosing the cheapest sharing path.
fn splice(state: &im::Vector<Value>, index: usize, values: Vec<Value>) -> im::Vector<Value> {
    if index == state.len() {
        // append
        let mut out = state.clone();
        out.append(im::Vector::from(values));
        out
    } else if index == 0 {
        // prepend
        let mut out = im::Vector::from(values);
        out.append(state.clone());
        out
    } else {
        // mid-splice
        let mut left = state.clone();
        let right = left.split_off(index);
        left.append(im::Vector::from(values));
        left.append(right);
        left
    }
}

fn remove_range(state: &im::Vector<Value>, start: usize, stop: usize) -> im::Vector<Value> {
    let mut left = state.clone();
    let mut rest = left.split_off(start);
    let tail = rest.split_off(stop - start);
    left.append(tail);
    left
}

impl Default for ListData {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies start with an empty hash cache.
impl Clone for ListData {
    fn clone(&self) -> Self {
        self.with_state(self.state.clone())
    }
}

impl PartialEq for ListData {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl Eq for ListData {}

impl Hash for ListData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl fmt::Debug for ListData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.state.iter()).finish()
    }
}

///
/// TESTS
///
