//! Procedurally generated office maze.
//!
//! A cell is a wall when `x*x + 3*x + 2*x*y + y + y*y + magic` has an odd
//! number of set bits. The maze is materialized as a [`Grid`] large enough
//! for the query and searched with A*.

use crate::grid::{Grid, GridNode, Position};
use crate::search::Path;

/// Where every walk through the office starts
pub const ENTRANCE: Position = Position { x: 1, y: 1 };

pub fn is_wall(magic: u64, x: i32, y: i32) -> bool {
    if x < 0 || y < 0 {
        return true;
    }
    let (x, y) = (x as u64, y as u64);
    let value = x * x + 3 * x + 2 * x * y + y + y * y + magic;
    value.count_ones() % 2 == 1
}

/// A rectangular window onto the infinite office
#[derive(Debug, Clone)]
pub struct OfficeMaze {
    magic: u64,
    grid: Grid,
}

impl OfficeMaze {
    pub fn new(magic: u64, width: usize, height: usize) -> Self {
        Self {
            magic,
            grid: Grid::from_fn(width, height, |x, y| is_wall(magic, x, y)),
        }
    }

    /// A window with `margin` spare cells beyond `target` on both axes
    pub fn around(magic: u64, target: Position, margin: usize) -> Self {
        let width = target.x.max(ENTRANCE.x).max(0) as usize + margin + 1;
        let height = target.y.max(ENTRANCE.y).max(0) as usize + margin + 1;
        Self::new(magic, width, height)
    }

    pub fn magic(&self) -> u64 {
        self.magic
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Shortest walk from the entrance to `target`
    pub fn route_to(&self, target: Position) -> Option<Path<GridNode<'_>, u32>> {
        self.grid.shortest_path(ENTRANCE, target)
    }

    /// Fewest steps from the entrance to `target`
    pub fn steps_to(&self, target: Position) -> Option<u32> {
        self.route_to(target).map(|path| path.cost())
    }

    /// Distinct cells reachable from the entrance in at most `steps` moves.
    ///
    /// The window must extend at least `steps` cells past the entrance for
    /// the count to match the unbounded office.
    pub fn locations_within(&self, steps: u32) -> usize {
        self.grid.reachable_within(ENTRANCE, steps).len()
    }

    /// Text drawing with the route to `target` marked
    pub fn render_route(&self, target: Position) -> String {
        let trail: Vec<Position> = self
            .route_to(target)
            .map(|path| path.iter().map(GridNode::position).collect())
            .unwrap_or_default();
        self.grid.render(&trail)
    }
}
