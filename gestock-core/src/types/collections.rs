//! Hash collections used for in-memory aggregation.

pub use rustc_hash::{FxHashMap, FxHashSet};
