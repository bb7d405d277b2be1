use crate::{
    error::ConstraintError,
    value::{Value, ValueKind},
};
use std::{collections::BTreeSet, fmt, sync::Arc};

/// Externally-supplied conversion step, run before any checks.
pub type Converter = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Externally-supplied validation predicate, run after the type check.
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Zero-argument default factory.
pub type Factory = Arc<dyn Fn() -> Value + Send + Sync>;

///
/// TypeConstraint
///
/// Accepted value kinds and/or record type names. A record value satisfies a
/// record-type entry when its type is the named type, or descends from it if
/// `subtypes` is set.
///

#[derive(Clone, Debug, Default)]
pub struct TypeConstraint {
    kinds: BTreeSet<ValueKind>,
    record_types: Vec<String>,
    subtypes: bool,
}

impl TypeConstraint {
    /// Accept a single value kind.
    #[must_use]
    pub fn kind(kind: ValueKind) -> Self {
        Self {
            kinds: BTreeSet::from([kind]),
            ..Self::default()
        }
    }

    /// Accept any of the given value kinds.
    #[must_use]
    pub fn kinds(kinds: impl IntoIterator<Item = ValueKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Accept records of the named type (exact by default).
    #[must_use]
    pub fn record(type_name: impl Into<String>) -> Self {
        Self {
            record_types: vec![type_name.into()],
            ..Self::default()
        }
    }

    /// Also accept the named record type.
    #[must_use]
    pub fn or_record(mut self, type_name: impl Into<String>) -> Self {
        self.record_types.push(type_name.into());
        self
    }

    /// Permit descendants of the accepted record types.
    #[must_use]
    pub const fn with_subtypes(mut self, subtypes: bool) -> Self {
        self.subtypes = subtypes;
        self
    }

    /// Does `value` satisfy this constraint?
    #[must_use]
    pub fn admits(&self, value: &Value) -> bool {
        if self.kinds.contains(&value.kind()) {
            return true;
        }

        if let Value::Record(record) = value {
            return self.record_types.iter().any(|name| {
                record.schema().name() == name
                    || (self.subtypes && record.schema().descends_from(name))
            });
        }

        false
    }

    /// Human-readable list of accepted kinds/types, for error messages.
    #[must_use]
    pub fn expected(&self) -> String {
        let mut parts: Vec<String> = self.kinds.iter().map(ToString::to_string).collect();
        for name in &self.record_types {
            if self.subtypes {
                parts.push(format!("record `{name}` (or subtype)"));
            } else {
                parts.push(format!("record `{name}`"));
            }
        }

        parts.join(" | ")
    }
}

///
/// Relationship
///
/// The per-field binding pipeline: convert, then type-check, then validate.
/// Conversion and validation callables are opaque collaborators; their
/// failures surface as constraint violations.
///

#[derive(Clone, Default)]
pub struct Relationship {
    converter: Option<Converter>,
    validator: Option<Validator>,
    constraint: Option<TypeConstraint>,
}

impl Relationship {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_converter(
        mut self,
        converter: impl Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.converter = Some(Arc::new(converter));
        self
    }

    #[must_use]
    pub fn with_validator(
        mut self,
        validator: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: TypeConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    #[must_use]
    pub const fn constraint(&self) -> Option<&TypeConstraint> {
        self.constraint.as_ref()
    }

    /// Run a raw value through the full pipeline and return the stored value.
    pub fn bind(&self, value: Value) -> Result<Value, ConstraintError> {
        let value = match &self.converter {
            Some(convert) => convert(value).map_err(ConstraintError::Conversion)?,
            None => value,
        };

        if let Some(constraint) = &self.constraint
            && !constraint.admits(&value)
        {
            return Err(ConstraintError::InvalidType {
                expected: constraint.expected(),
                actual: value.kind(),
            });
        }

        if let Some(validate) = &self.validator {
            validate(&value).map_err(ConstraintError::Validation)?;
        }

        Ok(value)
    }
}

impl fmt::Debug for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relationship")
            .field("converter", &self.converter.as_ref().map(|_| ".."))
            .field("validator", &self.validator.as_ref().map(|_| ".."))
            .field("constraint", &self.constraint)
            .finish()
    }
}

///
/// TESTS
///
