//! Persistent record collections.
//!
//! Dictionary- and list-flavored containers with the same outer contract as
//! records (structural equality, cached hashing, copy-on-write updates),
//! backed by structurally-shared persistent structures: a HAMT map and an
//! RRB vector. Every update returns a new instance; the receiver is never
//! mutated, and a failed batch leaves it fully intact.

pub mod list;
pub mod map;

pub use list::ListData;
pub use map::{MapBatch, MapData};
