use shadow_rs::shadow;

shadow!(build);

// Internals
// ---------
pub mod cost;

// Maze model
// ----------
pub mod grid;
pub mod loader;
pub mod movement;

// Search space
// ------------
pub mod heuristic;
pub mod search;
pub mod state;

// Algorithms
// ----------
pub mod algorithms;
pub mod expander;
