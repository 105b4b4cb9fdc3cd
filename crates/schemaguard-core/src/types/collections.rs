//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::BTreeMap;

/// SmallVec sized for fluent chains (usually <8 segments).
pub type SmallVec8<T> = SmallVec<[T; 8]>;

/// SmallVec sized for argument and child lists (usually <4).
pub type SmallVec4<T> = SmallVec<[T; 4]>;
