//! Hash tables of the registry and the resolution caches.

use foldhash::fast::FixedState;

use crate::TypeHandle;

const SEED: u64 = 0x5B1E_C7A0_93D4_6F21;

/// A [`hashbrown::HashMap`] hashed by [`foldhash`] with a fixed seed.
///
/// Two tables holding the same entries iterate them in the same order,
/// within a run and across runs.
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedState>;

/// A table keyed by participating types.
pub type TypeMap<V> = HashMap<TypeHandle, V>;

/// Creates an empty table, usable in `const` constructors.
#[inline]
pub const fn new_map<K, V>() -> HashMap<K, V> {
    HashMap::with_hasher(FixedState::with_seed(SEED))
}

// -----------------------------------------------------------------------------
// Tests
