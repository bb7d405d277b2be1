use crate::value::ValueKind;
use thiserror::Error as ThisError;

pub use crate::schema::DeclareError;

///
/// ConstraintError
///
/// A value failed its field's conversion, type check, or validation.
/// Per-call and recoverable: the receiving instance is left untouched.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConstraintError {
    #[error("invalid type: expected {expected}, got {actual}")]
    InvalidType { expected: String, actual: ValueKind },

    #[error("conversion failed: {0}")]
    Conversion(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

///
/// RecordError
///
/// Per-call record failures: construction, evolution, reads, and the
/// immutability guard.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RecordError {
    #[error("type `{type_name}` has no field `{field}`")]
    UnknownField { type_name: String, field: String },

    #[error("type `{type_name}` takes {expected} positional values, got {given}")]
    TooManyPositional {
        type_name: String,
        expected: usize,
        given: usize,
    },

    #[error("field `{field}` bound more than once")]
    DuplicateBinding { field: String },

    #[error("field `{field}`: {source}")]
    Constraint {
        field: String,
        source: ConstraintError,
    },

    #[error("field `{type_name}.{field}` is unset and has no default")]
    MissingValue { type_name: String, field: String },

    #[error("instances of `{type_name}` are immutable")]
    Immutable { type_name: String },

    #[error("field `{type_name}.{field}` is not settable")]
    NotSettable { type_name: String, field: String },

    #[error("field `{type_name}.{field}` is not deletable")]
    NotDeletable { type_name: String, field: String },
}

///
/// CollectionError
///
/// Per-call persistent-collection failures. A failed batch leaves the
/// original collection fully intact.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CollectionError {
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("range {start}..{stop} out of bounds for length {len}")]
    RangeOutOfBounds {
        start: usize,
        stop: usize,
        len: usize,
    },

    #[error("`stop` bound provided without `start`")]
    StopWithoutStart,

    #[error("value not found")]
    ValueNotFound,

    #[error(transparent)]
    Constraint(#[from] ConstraintError),
}

///
/// Error
///
/// Crate-level error surface: one transparent wrapper per concern.
///

#[derive(Clone, Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Declare(#[from] DeclareError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}
