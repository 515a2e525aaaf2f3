//! Priority-ordered search over explicit graphs and implicit state spaces.
//!
//! The core is a binary min-heap frontier and a best-first search that
//! runs as A* with a heuristic or Dijkstra without one. On top of that sit
//! a canonicalizing explorer for large combinatorial state spaces, a
//! threaded variant of it, and a handful of puzzle models that exercise
//! both.

pub mod error;
pub mod explorer;
pub mod graph;
pub mod grid;
pub mod heap;
pub mod node;
pub mod parallel;
pub mod puzzles;
pub mod search;

// Re-export main types
pub use error::{Result, SearchError};
pub use explorer::{explore, Exploration, ExplorerConfig, StateSpace};
pub use graph::{Graph, GraphNode, GraphSpec};
pub use grid::{Grid, GridNode, Position};
pub use heap::{Frontier, MinHeap};
pub use node::{Cost, Neighbor, Neighbors, SearchNode};
pub use parallel::{ParallelConfig, ParallelOutcome};
pub use search::{
    astar, astar_report, astar_to, astar_with, bfs_layers, dijkstra, reachable_within, Path,
    SearchReport, SearchStats,
};
