//! Storage cluster data shuffling.
//!
//! A `df`-style listing describes a grid of storage nodes. Data can only
//! move into a node with room for it, which in practice means into the one
//! empty node. Getting the top-right node's data to the origin is then a
//! sliding puzzle: walk the hole next to the data, then leapfrog the data
//! left along the top row at five moves per column.

use rustc_hash::FxHashMap;

use crate::error::{Result, SearchError};
use crate::grid::{Grid, Position};

/// Moves to shift the data one column left once the hole is beside it
const LEAPFROG: u32 = 5;

/// One line of the listing, sizes in terabytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageNode {
    pub position: Position,
    pub size: u32,
    pub used: u32,
    pub avail: u32,
}

impl StorageNode {
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Whether all of this node's data fits on `other` right now
    pub fn fits_on(&self, other: &StorageNode) -> bool {
        !self.is_empty() && self.position != other.position && self.used <= other.avail
    }
}

#[derive(Debug, Clone)]
pub struct Cluster {
    nodes: Vec<StorageNode>,
    width: usize,
    height: usize,
}

impl Cluster {
    /// Parse the listing. Lines that do not start with `/` are headers.
    pub fn parse(text: &str) -> Result<Self> {
        let mut nodes = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if !line.starts_with('/') {
                continue;
            }
            nodes.push(parse_node(index + 1, line)?);
        }

        if nodes.is_empty() {
            return Err(SearchError::parse(1, "no storage nodes listed"));
        }

        let width = nodes.iter().map(|n| n.position.x).max().unwrap_or(0) as usize + 1;
        let height = nodes.iter().map(|n| n.position.y).max().unwrap_or(0) as usize + 1;
        Ok(Self {
            nodes,
            width,
            height,
        })
    }

    pub fn nodes(&self) -> &[StorageNode] {
        &self.nodes
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Unordered node pairs where one side's data fits on the other
    pub fn viable_pairs(&self) -> usize {
        let mut count = 0;
        for (i, a) in self.nodes.iter().enumerate() {
            for b in &self.nodes[i + 1..] {
                if a.fits_on(b) || b.fits_on(a) {
                    count += 1;
                }
            }
        }
        count
    }

    fn empty_node(&self) -> Option<&StorageNode> {
        self.nodes.iter().find(|n| n.is_empty())
    }

    /// Nodes the hole can never pass through, plus gaps in the listing
    pub fn obstacles(&self) -> Grid {
        let capacity = self.empty_node().map_or(0, |n| n.size);
        let by_position: FxHashMap<Position, &StorageNode> =
            self.nodes.iter().map(|n| (n.position, n)).collect();

        Grid::from_fn(self.width, self.height, |x, y| {
            by_position
                .get(&Position::new(x, y))
                .map_or(true, |n| n.used > capacity)
        })
    }

    /// Fewest moves to bring the top-right node's data to the origin.
    ///
    /// `None` when there is no empty node or the hole cannot reach the
    /// data.
    pub fn fewest_moves(&self) -> Option<u32> {
        if self.width < 2 {
            return Some(0);
        }
        let hole = self.empty_node()?.position;
        let beside_data = Position::new(self.width as i32 - 2, 0);

        let walk = self.obstacles().shortest_path(hole, beside_data)?.cost();
        Some(walk + 1 + LEAPFROG * (self.width as u32 - 2))
    }
}

fn parse_node(line_number: usize, line: &str) -> Result<StorageNode> {
    let bad = |what: &str| SearchError::parse(line_number, format!("{}: {:?}", what, line));

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(bad("expected name, size, used and avail"));
    }

    let (x, y) = fields[0]
        .rsplit('/')
        .next()
        .and_then(|name| name.strip_prefix("node-x"))
        .and_then(|coords| coords.split_once("-y"))
        .ok_or_else(|| bad("bad node name"))?;
    let x: i32 = x.parse().map_err(|_| bad("bad x coordinate"))?;
    let y: i32 = y.parse().map_err(|_| bad("bad y coordinate"))?;

    let terabytes = |field: &str| -> Result<u32> {
        field
            .strip_suffix('T')
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| bad("bad size"))
    };

    Ok(StorageNode {
        position: Position::new(x, y),
        size: terabytes(fields[1])?,
        used: terabytes(fields[2])?,
        avail: terabytes(fields[3])?,
    })
}
