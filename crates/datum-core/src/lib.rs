//! Core runtime for Datum: value model, schema resolution, record semantics,
//! persistent collections, and read-only proxies.

pub mod collection;
pub mod error;
pub mod hash;
pub mod proxy;
pub mod record;
pub mod schema;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// Errors and internal helpers are imported explicitly where needed.
///

pub mod prelude {
    pub use crate::{
        collection::{ListData, MapBatch, MapData},
        proxy::{ListView, MapView, RecordView},
        record::{FieldUpdate, Record},
        schema::{
            ConstantDecl, FieldDecl, PlainDef, Registry, Relationship, TypeConstraint, TypeDef,
            TypeSchema,
        },
        value::{Value, ValueKind},
    };
}
