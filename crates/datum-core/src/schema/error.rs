use crate::value::ValueKind;
use thiserror::Error as ThisError;

///
/// DeclareError
///
/// Declaration-time failures. All of these are fatal to the type being
/// registered: the registry is left untouched and the type never exists.
/// Every variant names the offending type, base, or member.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DeclareError {
    #[error("type `{type_name}` is already registered")]
    DuplicateType { type_name: String },

    #[error("type `{type_name}` declares unknown base `{base}`")]
    UnknownBase { type_name: String, base: String },

    #[error("type `{type_name}` has an inconsistent base hierarchy")]
    InconsistentHierarchy { type_name: String },

    #[error("type `{type_name}` inherits from `{base}`, which allows dynamic attribute storage")]
    UnslottedBase { type_name: String, base: String },

    #[error("type `{type_name}` declares member `{member}` more than once")]
    DuplicateMember { type_name: String, member: String },

    #[error("field `{type_name}.{field}` has both a default and a default factory")]
    DefaultAndFactory { type_name: String, field: String },

    #[error("type `{type_name}`: base `{base}` overrides constant `{member}` with a field")]
    FieldOverridesConstant {
        type_name: String,
        base: String,
        member: String,
    },

    #[error("type `{type_name}`: base `{base}` overrides field `{member}` with a constant")]
    ConstantOverridesField {
        type_name: String,
        base: String,
        member: String,
    },

    #[error("type `{type_name}`: non-schema base `{base}` overrides field `{member}`")]
    MemberOverridesField {
        type_name: String,
        base: String,
        member: String,
    },

    #[error("type `{type_name}`: non-schema base `{base}` overrides constant `{member}`")]
    MemberOverridesConstant {
        type_name: String,
        base: String,
        member: String,
    },

    #[error("type `{type_name}`: base `{base}` overrides ordinary member `{member}` with a field")]
    FieldOverridesMember {
        type_name: String,
        base: String,
        member: String,
    },

    #[error(
        "type `{type_name}`: base `{base}` overrides ordinary member `{member}` with a constant"
    )]
    ConstantOverridesMember {
        type_name: String,
        base: String,
        member: String,
    },

    #[error("constant value has kind `{actual}`, expected {expected}")]
    ConstantType { expected: String, actual: ValueKind },
}
