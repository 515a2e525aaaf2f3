//! Puzzle state spaces built on the search engine.

pub mod elevator;
pub mod maze;
pub mod molecule;
pub mod routing;
pub mod storage;
pub mod vault;
