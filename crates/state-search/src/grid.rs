//! Rectangular wall grids whose open cells are search nodes.
//!
//! Movement is four-way with unit cost. Cells are identified by position,
//! so a cell handle built twice for the same coordinate is the same node.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::node::{Neighbor, Neighbors, SearchNode};
use crate::search::{self, Path};

const WALL: char = '#';
const OPEN: char = '.';
const TRAIL: char = 'O';

/// Position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    fn offset(self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

/// Walls plus any labelled cells found while parsing
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    walls: Vec<bool>,
    markers: BTreeMap<char, Position>,
}

impl Grid {
    /// Build a grid by asking `is_wall` about every cell
    pub fn from_fn(width: usize, height: usize, is_wall: impl Fn(i32, i32) -> bool) -> Self {
        let mut walls = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                walls.push(is_wall(x as i32, y as i32));
            }
        }
        Self {
            width,
            height,
            walls,
            markers: BTreeMap::new(),
        }
    }

    /// Parse a text map. `#` is a wall, `.` is open floor and any other
    /// character is an open cell recorded as a marker.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            return Err(SearchError::parse(1, "empty map"));
        };
        let width = first.chars().count();

        let mut walls = Vec::with_capacity(width * lines.len());
        let mut markers = BTreeMap::new();

        for (y, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                return Err(SearchError::parse(
                    y + 1,
                    format!("expected {} columns, found {}", width, line.chars().count()),
                ));
            }
            for (x, c) in line.chars().enumerate() {
                walls.push(c == WALL);
                if c != WALL && c != OPEN {
                    if markers.insert(c, Position::new(x as i32, y as i32)).is_some() {
                        let message = format!("marker {:?} appears twice", c);
                        return Err(SearchError::parse(y + 1, message));
                    }
                }
            }
        }

        Ok(Self {
            width,
            height: lines.len(),
            walls,
            markers,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Labelled cells, ordered by label
    pub fn markers(&self) -> &BTreeMap<char, Position> {
        &self.markers
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Whether `pos` is inside the grid and not a wall
    pub fn is_open(&self, pos: Position) -> bool {
        self.index(pos).map_or(false, |i| !self.walls[i])
    }

    /// Searchable handle for an open cell
    pub fn cell(&self, pos: Position) -> Option<GridNode<'_>> {
        self.is_open(pos).then_some(GridNode { grid: self, pos })
    }

    /// Shortest route between two open cells, guided by Manhattan distance
    pub fn shortest_path(&self, from: Position, to: Position) -> Option<Path<GridNode<'_>, u32>> {
        let start = self.cell(from)?;
        let goal = self.cell(to)?;
        search::astar(&start, &goal, |a, b| a.pos.manhattan(b.pos))
    }

    /// Open cells at most `steps` moves from `from`, including `from`
    pub fn reachable_within(&self, from: Position, steps: u32) -> Vec<Position> {
        match self.cell(from) {
            Some(start) => search::reachable_within(&start, steps)
                .into_iter()
                .map(|(node, _)| node.pos)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Draw the grid with `trail` cells marked
    pub fn render(&self, trail: &[Position]) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x as i32, y as i32);
                let c = if !self.is_open(pos) {
                    WALL
                } else if trail.contains(&pos) {
                    TRAIL
                } else {
                    OPEN
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}

/// An open cell of a [`Grid`]
#[derive(Debug, Clone, Copy)]
pub struct GridNode<'g> {
    grid: &'g Grid,
    pos: Position,
}

impl GridNode<'_> {
    pub fn position(&self) -> Position {
        self.pos
    }
}

impl PartialEq for GridNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos && std::ptr::eq(self.grid, other.grid)
    }
}

impl Eq for GridNode<'_> {}

impl Hash for GridNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pos.hash(state);
    }
}

impl SearchNode for GridNode<'_> {
    type Cost = u32;

    fn neighbors(&self) -> Neighbors<Self, u32> {
        let mut out = Neighbors::new();
        for (dx, dy) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
            let pos = self.pos.offset(dx, dy);
            if self.grid.is_open(pos) {
                out.push(Neighbor::new(
                    GridNode {
                        grid: self.grid,
                        pos,
                    },
                    1,
                ));
            }
        }
        out
    }
}
