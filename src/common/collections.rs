//! Hash collections keyed with the fast non-cryptographic Fx hasher.

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type BuildHasher = rustc_hash::FxBuildHasher;
