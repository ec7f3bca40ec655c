//! Implementation of the tree expansion strategies.
//!
//! All of them grow the same `SearchTree` through the `TreeExpander`
//! scaffold and only differ in how they pick the next node to expand.

pub mod astar;
pub mod best_first;
pub mod frontier;
pub mod simple_hill_climbing;
pub mod steepest_ascent;
