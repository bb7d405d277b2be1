//! Datum — immutable, structurally-typed data objects with persistent
//! collections.
//!
//! This is the public meta-crate. Downstream users depend on **datum** only.
//!
//! It re-exports the stable public API from:
//!   - `datum-core` (value model, schema resolution, records, collections,
//!     proxies)

pub use datum_core as core;

pub use datum_core::error::{
    CollectionError, ConstraintError, DeclareError, Error, RecordError,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Prelude
//

pub mod prelude {
    pub use datum_core::prelude::*;
}
