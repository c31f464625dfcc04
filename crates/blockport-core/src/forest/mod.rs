//! Forest construction from flat filter results
//!
//! Filter queries return matched blocks one at a time, each carrying its own
//! ancestor chain. The builder merges those fragments into a single forest,
//! then swaps in the full descendant tree of every matched block.

pub mod builder;

pub use builder::{build_forest, ForestBuilder};
