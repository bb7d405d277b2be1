use crate::{
    schema::{error::DeclareError, relationship::TypeConstraint},
    value::Value,
};

///
/// ConstantDecl
///
/// A fixed class-level value with no per-instance storage. The optional type
/// constraint is checked exactly once, here at declaration time; accesses
/// never re-check.
///

#[derive(Clone, Debug)]
pub struct ConstantDecl {
    value: Value,
    doc: Option<String>,
    metadata: Option<Value>,
}

impl ConstantDecl {
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            doc: None,
            metadata: None,
        }
    }

    /// Declare a constant whose value must satisfy `constraint`.
    pub fn checked(
        value: impl Into<Value>,
        constraint: &TypeConstraint,
    ) -> Result<Self, DeclareError> {
        let value = value.into();
        if !constraint.admits(&value) {
            return Err(DeclareError::ConstantType {
                expected: constraint.expected(),
                actual: value.kind(),
            });
        }

        Ok(Self::new(value))
    }

    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Attach opaque metadata; the core never interprets it.
    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<Value>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    #[must_use]
    pub const fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn checked_constant_validates_once_at_declaration() {
        let constraint = TypeConstraint::kind(ValueKind::Int);

        assert!(ConstantDecl::checked(1i64, &constraint).is_ok());

        let err = ConstantDecl::checked("nope", &constraint).unwrap_err();
        assert!(matches!(
            err,
            DeclareError::ConstantType {
                actual: ValueKind::Text,
                ..
            }
        ));
    }
}
