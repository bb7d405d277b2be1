use xxhash_rust::xxh3::Xxh3;

/// Fresh xxh3 hasher used for all cached structural hashes.
///
/// The record and collection hash caches must be stable across processes,
/// so they hash through xxh3 rather than the default `SipHash` state.
#[must_use]
pub fn structural_hasher() -> Xxh3 {
    Xxh3::default()
}
