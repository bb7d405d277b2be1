//! Declaration-time schema model: field/constant declarations, type
//! definitions, C3 linearization, and the registry that resolves them into
//! ordered, validated type schemas.

pub mod constant;
pub mod error;
pub mod field;
pub mod linearize;
pub mod registry;
pub mod relationship;
pub mod type_def;
pub mod type_schema;

pub use constant::ConstantDecl;
pub use error::DeclareError;
pub use field::FieldDecl;
pub use registry::{Registry, ResolvedType};
pub use relationship::{Converter, Factory, Relationship, TypeConstraint, Validator};
pub use type_def::{PlainDef, TypeDef};
pub use type_schema::{PlainSchema, ResolvedField, Slot, TypeSchema};
