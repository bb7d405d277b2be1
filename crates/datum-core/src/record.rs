use crate::{
    error::RecordError,
    hash::structural_hasher,
    schema::TypeSchema,
    value::Value,
};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock},
};

///
/// FieldUpdate
///
/// One evolution update: a new value, or the deletion marker.
///

#[derive(Clone, Debug)]
pub enum FieldUpdate {
    Set(Value),
    Delete,
}

///
/// Record
///
/// An instance of a resolved type schema: a dense slot array in schema
/// order plus a lazily computed, cached structural hash.
///
/// Records are immutable unless the declaring type opted into mutability;
/// every mutation-producing operation otherwise returns a new instance.
/// The hash cache is the only in-place write on an immutable record, and it
/// is idempotent, so concurrent readers can race on it safely.
///

pub struct Record {
    schema: Arc<TypeSchema>,
    slots: Box<[Option<Value>]>,
    hash: OnceLock<u64>,
}

impl Record {
    /// Construct an instance from positional and named values.
    ///
    /// Positional values bind to `init`-flagged fields in schema order, then
    /// named values bind by name. Every bound value runs through its field's
    /// relationship (convert, type-check, validate).
    ///
    /// Defaults and factories are applied eagerly here and stored verbatim,
    /// without re-running the relationship. A required field left unbound is
    /// not a construction error; reading it later is a missing-value
    /// violation.
    pub fn new(
        schema: &Arc<TypeSchema>,
        positional: Vec<Value>,
        named: Vec<(String, Value)>,
    ) -> Result<Self, RecordError> {
        let init_indices: Vec<usize> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.decl().init())
            .map(|(i, _)| i)
            .collect();

        if positional.len() > init_indices.len() {
            return Err(RecordError::TooManyPositional {
                type_name: schema.name().to_string(),
                expected: init_indices.len(),
                given: positional.len(),
            });
        }

        let mut pairs = Vec::with_capacity(positional.len() + named.len());
        for (value, &index) in positional.into_iter().zip(&init_indices) {
            pairs.push((index, value));
        }
        for (name, value) in named {
            let index = schema
                .field_index(&name)
                .ok_or_else(|| RecordError::UnknownField {
                    type_name: schema.name().to_string(),
                    field: name.clone(),
                })?;
            pairs.push((index, value));
        }

        let mut slots = Self::init_slots(schema, pairs, true)?;

        // Eager defaults: no bound-with-default field is ever observed unset.
        for (index, field) in schema.fields().iter().enumerate() {
            if slots[index].is_none()
                && let Some(default) = field.decl().resolve_default()
            {
                slots[index] = Some(default);
            }
        }

        Ok(Self {
            schema: Arc::clone(schema),
            slots: slots.into_boxed_slice(),
            hash: OnceLock::new(),
        })
    }

    /// Deserialization entry point: bind already-validated raw values by
    /// name, bypassing conversion, validation, and defaults.
    pub fn from_raw(
        schema: &Arc<TypeSchema>,
        pairs: Vec<(String, Value)>,
    ) -> Result<Self, RecordError> {
        let mut indexed = Vec::with_capacity(pairs.len());
        for (name, value) in pairs {
            let index = schema
                .field_index(&name)
                .ok_or_else(|| RecordError::UnknownField {
                    type_name: schema.name().to_string(),
                    field: name.clone(),
                })?;
            indexed.push((index, value));
        }

        let slots = Self::init_slots(schema, indexed, false)?;

        Ok(Self {
            schema: Arc::clone(schema),
            slots: slots.into_boxed_slice(),
            hash: OnceLock::new(),
        })
    }

    // Shared storage-population path for construction and deserialization.
    fn init_slots(
        schema: &Arc<TypeSchema>,
        pairs: Vec<(usize, Value)>,
        validate: bool,
    ) -> Result<Vec<Option<Value>>, RecordError> {
        let mut slots: Vec<Option<Value>> = vec![None; schema.fields().len()];

        for (index, value) in pairs {
            let field = &schema.fields()[index];
            if slots[index].is_some() {
                return Err(RecordError::DuplicateBinding {
                    field: field.name().to_string(),
                });
            }

            let value = if validate {
                field
                    .decl()
                    .relationship()
                    .bind(value)
                    .map_err(|source| RecordError::Constraint {
                        field: field.name().to_string(),
                        source,
                    })?
            } else {
                value
            };

            slots[index] = Some(value);
        }

        Ok(slots)
    }

    #[must_use]
    pub const fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    /// Read a field. Unset fields without defaults are a missing-value
    /// violation, not a construction-time one.
    pub fn get(&self, name: &str) -> Result<&Value, RecordError> {
        let index = self
            .schema
            .field_index(name)
            .ok_or_else(|| RecordError::UnknownField {
                type_name: self.schema.name().to_string(),
                field: name.to_string(),
            })?;

        self.slots[index]
            .as_ref()
            .ok_or_else(|| RecordError::MissingValue {
                type_name: self.schema.name().to_string(),
                field: name.to_string(),
            })
    }

    /// Read a field, folding unknown and unset into `None`.
    #[must_use]
    pub fn try_get(&self, name: &str) -> Option<&Value> {
        let index = self.schema.field_index(name)?;
        self.slots[index].as_ref()
    }

    #[must_use]
    pub fn is_bound(&self, name: &str) -> bool {
        self.try_get(name).is_some()
    }

    /// Lazy, restartable iteration over bound (name, value) pairs in schema
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .zip(&self.slots)
            .filter_map(|(field, slot)| slot.as_ref().map(|value| (field.name(), value)))
    }

    /// Copy-on-write evolution: apply updates to a copy, leaving `self`
    /// untouched. Validation runs before any slot is written, so a failed
    /// evolve produces no partial instance.
    pub fn evolve(
        &self,
        updates: impl IntoIterator<Item = (String, FieldUpdate)>,
    ) -> Result<Self, RecordError> {
        let mut staged: Vec<(usize, Option<Value>)> = Vec::new();

        for (name, update) in updates {
            let index = self
                .schema
                .field_index(&name)
                .ok_or_else(|| RecordError::UnknownField {
                    type_name: self.schema.name().to_string(),
                    field: name.clone(),
                })?;
            let field = &self.schema.fields()[index];

            match update {
                FieldUpdate::Set(value) => {
                    let value = field
                        .decl()
                        .relationship()
                        .bind(value)
                        .map_err(|source| RecordError::Constraint {
                            field: name,
                            source,
                        })?;
                    staged.push((index, Some(value)));
                }
                FieldUpdate::Delete => {
                    if !field.decl().is_deletable() {
                        return Err(RecordError::NotDeletable {
                            type_name: self.schema.name().to_string(),
                            field: name,
                        });
                    }
                    staged.push((index, None));
                }
            }
        }

        let mut slots = self.slots.clone();
        for (index, value) in staged {
            slots[index] = value;
        }

        Ok(Self {
            schema: Arc::clone(&self.schema),
            slots,
            hash: OnceLock::new(),
        })
    }

    /// Direct assignment; only legal on mutability-opted-in types, and only
    /// for settable fields. Runs the full binding pipeline.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), RecordError> {
        let index = self.guard_mutable(name)?;
        let field = &self.schema.fields()[index];

        if !field.decl().settable() {
            return Err(RecordError::NotSettable {
                type_name: self.schema.name().to_string(),
                field: name.to_string(),
            });
        }

        let value = field
            .decl()
            .relationship()
            .bind(value)
            .map_err(|source| RecordError::Constraint {
                field: name.to_string(),
                source,
            })?;

        self.slots[index] = Some(value);
        self.hash = OnceLock::new();

        Ok(())
    }

    /// Direct deletion; requires mutability opt-in and a deletable field.
    pub fn unset(&mut self, name: &str) -> Result<(), RecordError> {
        let index = self.guard_mutable(name)?;
        let field = &self.schema.fields()[index];

        if !field.decl().is_deletable() {
            return Err(RecordError::NotDeletable {
                type_name: self.schema.name().to_string(),
                field: name.to_string(),
            });
        }

        self.slots[index] = None;
        self.hash = OnceLock::new();

        Ok(())
    }

    fn guard_mutable(&self, name: &str) -> Result<usize, RecordError> {
        if !self.schema.is_mutable() {
            return Err(RecordError::Immutable {
                type_name: self.schema.name().to_string(),
            });
        }

        self.schema
            .field_index(name)
            .ok_or_else(|| RecordError::UnknownField {
                type_name: self.schema.name().to_string(),
                field: name.to_string(),
            })
    }

    // (name, value) pairs restricted to eq-significant bound fields.
    fn eq_pairs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .zip(&self.slots)
            .filter(|(field, _)| field.decl().eq())
            .filter_map(|(field, slot)| slot.as_ref().map(|value| (field.name(), value)))
    }

    fn hash_pairs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .zip(&self.slots)
            .filter(|(field, _)| field.decl().hash_significant())
            .filter_map(|(field, slot)| slot.as_ref().map(|value| (field.name(), value)))
    }

    /// The cached structural hash: xxh3 over the type name and the
    /// hash-significant bound pairs in schema order. Computed at most once;
    /// recomputation is idempotent, so cross-thread races are harmless.
    #[must_use]
    pub fn hash_value(&self) -> u64 {
        *self.hash.get_or_init(|| {
            let mut hasher = structural_hasher();
            self.schema.name().hash(&mut hasher);
            for (name, value) in self.hash_pairs() {
                name.hash(&mut hasher);
                value.hash(&mut hasher);
            }
            hasher.finish()
        })
    }

    #[cfg(test)]
    pub(crate) fn has_cached_hash(&self) -> bool {
        self.hash.get().is_some()
    }
}

/// Copies start with an empty hash cache and recompute independently.
impl Clone for Record {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            slots: self.slots.clone(),
            hash: OnceLock::new(),
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        // identical concrete type: same resolved schema instance
        Arc::ptr_eq(&self.schema, &other.schema) && self.eq_pairs().eq(other.eq_pairs())
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl Ord for Record {
    // Ordering is by type name, then eq-significant pairs, then schema
    // identity so unrelated types that happen to share a name never compare
    // Equal while `==` reports them distinct.
    fn cmp(&self, other: &Self) -> Ordering {
        self.schema
            .name()
            .cmp(other.schema.name())
            .then_with(|| self.eq_pairs().cmp(other.eq_pairs()))
            .then_with(|| {
                Arc::as_ptr(&self.schema).cmp(&Arc::as_ptr(&other.schema))
            })
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.schema.name());
        for (name, value) in self.iter() {
            s.field(name, value);
        }
        s.finish()
    }
}

/// `Name(field=value, ...)` over repr-flagged bound fields.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.schema.name())?;

        let mut first = true;
        for (field, slot) in self.schema.fields().iter().zip(&self.slots) {
            let Some(value) = slot else { continue };
            if !field.decl().repr() {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}={value}", field.name())?;
        }

        write!(f, ")")
    }
}

/// Boundary serialization: bound fields as a name → value map. The
/// serialization adapter owns type tagging and wire formats.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.iter().count()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDecl, Registry, Relationship, TypeConstraint, TypeDef};
    use crate::value::ValueKind;

    fn int_field() -> FieldDecl {
        FieldDecl::new().with_relationship(
            Relationship::new().with_constraint(TypeConstraint::kind(ValueKind::Int)),
        )
    }

    fn point_schema(registry: &mut Registry) -> Arc<TypeSchema> {
        registry
            .register(
                TypeDef::new("Point")
                    .field("x", int_field())
                    .field("y", int_field()),
            )
            .unwrap()
    }

    #[test]
    fn positional_then_named_binding() {
        let mut registry = Registry::new();
        let schema = point_schema(&mut registry);

        let p = Record::new(
            &schema,
            vec![Value::Int(3)],
            vec![("y".to_string(), Value::Int(4))],
        )
        .unwrap();

        assert_eq!(p.get("x").unwrap(), &Value::Int(3));
        assert_eq!(p.get("y").unwrap(), &Value::Int(4));
    }

    #[test]
    fn duplicate_binding_is_rejected() {
        let mut registry = Registry::new();
        let schema = point_schema(&mut registry);

        let err = Record::new(
            &schema,
            vec![Value::Int(3)],
            vec![("x".to_string(), Value::Int(4))],
        )
        .unwrap_err();

        assert!(matches!(err, RecordError::DuplicateBinding { .. }));
    }

    #[test]
    fn defaults_apply_eagerly() {
        let mut registry = Registry::new();
        let schema = registry
            .register(TypeDef::new("T").field("n", int_field().with_default(7i64)))
            .unwrap();

        let t = Record::new(&schema, vec![], vec![]).unwrap();
        assert!(t.is_bound("n"));
        assert_eq!(t.get("n").unwrap(), &Value::Int(7));
    }

    #[test]
    fn missing_required_field_fails_on_read_not_construction() {
        let mut registry = Registry::new();
        let schema = point_schema(&mut registry);

        let p = Record::new(&schema, vec![Value::Int(1)], vec![]).unwrap();
        let err = p.get("y").unwrap_err();

        assert!(matches!(err, RecordError::MissingValue { .. }));
    }

    #[test]
    fn evolution_never_mutates_the_source() {
        let mut registry = Registry::new();
        let schema = point_schema(&mut registry);

        let p = Record::new(&schema, vec![Value::Int(3), Value::Int(4)], vec![]).unwrap();
        let q = p
            .evolve(vec![("x".to_string(), FieldUpdate::Set(Value::Int(30)))])
            .unwrap();

        assert_eq!(p.get("x").unwrap(), &Value::Int(3));
        assert_eq!(q.get("x").unwrap(), &Value::Int(30));
        assert_eq!(q.get("y").unwrap(), &Value::Int(4));
    }

    #[test]
    fn noop_evolution_is_value_identity() {
        let mut registry = Registry::new();
        let schema = point_schema(&mut registry);

        let p = Record::new(&schema, vec![Value::Int(3), Value::Int(4)], vec![]).unwrap();
        let q = p.evolve(vec![]).unwrap();

        assert_eq!(p, q);
        assert_eq!(p.hash_value(), q.hash_value());
    }

    #[test]
    fn float_fails_int_constraint() {
        let mut registry = Registry::new();
        let schema = point_schema(&mut registry);
        let p = Record::new(&schema, vec![Value::Int(3), Value::Int(4)], vec![]).unwrap();

        let err = p
            .evolve(vec![(
                "x".to_string(),
                FieldUpdate::Set(Value::float(1.5).unwrap()),
            )])
            .unwrap_err();

        assert!(matches!(err, RecordError::Constraint { .. }));
        // no partial instance: source untouched
        assert_eq!(p.get("x").unwrap(), &Value::Int(3));
    }

    #[test]
    fn hash_is_cached_and_copies_recompute() {
        let mut registry = Registry::new();
        let schema = point_schema(&mut registry);
        let p = Record::new(&schema, vec![Value::Int(3), Value::Int(4)], vec![]).unwrap();

        assert!(!p.has_cached_hash());
        let h1 = p.hash_value();
        assert!(p.has_cached_hash());
        assert_eq!(h1, p.hash_value());

        let q = p.clone();
        assert!(!q.has_cached_hash());
        assert_eq!(q.hash_value(), h1);
    }

    #[test]
    fn cross_type_equality_is_false() {
        let mut registry = Registry::new();
        let a = registry
            .register(TypeDef::new("A").field("x", int_field()))
            .unwrap();
        let b = registry
            .register(TypeDef::new("B").field("x", int_field()))
            .unwrap();

        let ra = Record::new(&a, vec![Value::Int(1)], vec![]).unwrap();
        let rb = Record::new(&b, vec![Value::Int(1)], vec![]).unwrap();

        assert_ne!(ra, rb);
    }

    #[test]
    fn immutable_instances_reject_assignment() {
        let mut registry = Registry::new();
        let schema = point_schema(&mut registry);
        let mut p = Record::new(&schema, vec![Value::Int(3), Value::Int(4)], vec![]).unwrap();

        let err = p.set("x", Value::Int(9)).unwrap_err();
        assert!(matches!(err, RecordError::Immutable { .. }));
    }

    #[test]
    fn mutable_opt_in_allows_checked_assignment() {
        let mut registry = Registry::new();
        let schema = registry
            .register(TypeDef::new("M").mutable().field("x", int_field()))
            .unwrap();
        let mut m = Record::new(&schema, vec![Value::Int(1)], vec![]).unwrap();

        let stale = m.hash_value();
        m.set("x", Value::Int(2)).unwrap();
        assert_eq!(m.get("x").unwrap(), &Value::Int(2));
        assert_ne!(m.hash_value(), stale);

        // pipeline still applies
        let err = m.set("x", Value::from("nope")).unwrap_err();
        assert!(matches!(err, RecordError::Constraint { .. }));
    }

    #[test]
    fn from_raw_bypasses_conversion() {
        let mut registry = Registry::new();
        let schema = point_schema(&mut registry);

        // raw binding stores the value verbatim, even against the constraint
        let p = Record::from_raw(&schema, vec![("x".to_string(), Value::from("raw"))]).unwrap();
        assert_eq!(p.get("x").unwrap(), &Value::from("raw"));
    }

    #[test]
    fn display_lists_repr_fields_in_schema_order() {
        let mut registry = Registry::new();
        let schema = registry
            .register(
                TypeDef::new("P")
                    .field("x", int_field())
                    .field("secret", int_field().no_repr()),
            )
            .unwrap();
        let p = Record::new(&schema, vec![Value::Int(1), Value::Int(2)], vec![]).unwrap();

        assert_eq!(p.to_string(), "P(x=1)");
    }
}
