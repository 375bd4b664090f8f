//! Randomized global minimum cut over undirected weighted graphs.
//!
//! The engine never mutates the graph it searches: every trial owns a
//! label-based super-node partition, a weighted edge selector, and a seeded
//! random source of its own, so independent trials (and the two halves of a
//! Karger-Stein branch point) can run concurrently against one shared
//! read-only store.

pub use grampus_graphlib as graphlib;

pub mod karger;
pub mod select;

pub use karger::{
    fast_min_cut, fast_min_cut_par, fast_min_cut_sharded, fast_min_cut_with_target, rand_min_cut,
    rand_min_cut_with_target,
};
pub use select::{Selector, SelectorEmpty, WeightedItem};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
