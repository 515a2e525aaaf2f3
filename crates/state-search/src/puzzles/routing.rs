//! Shortest tour through numbered locations of an air-duct map.
//!
//! Pairwise walking distances come from A* on the grid. The tour itself is
//! a search over implicit `(location, visited set)` nodes whose edges are
//! those pairwise distances.

use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::error::{Result, SearchError};
use crate::grid::{Grid, Position};
use crate::node::{Neighbor, Neighbors, SearchNode};
use crate::search;

/// Visited sets are `u64` bitmasks
pub const MAX_LOCATIONS: usize = 64;

/// A parsed duct map with its distance table
#[derive(Debug, Clone)]
pub struct DuctMap {
    labels: Vec<char>,
    positions: Vec<Position>,
    /// `None` where two locations are walled off from each other
    distances: Vec<Vec<Option<u32>>>,
}

/// Visiting order and total walking distance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tour {
    pub order: Vec<char>,
    pub steps: u32,
}

impl DuctMap {
    /// Parse a map whose markers are digits; `0` is the starting point
    pub fn parse(text: &str) -> Result<Self> {
        let grid = Grid::parse(text)?;

        let mut labels = Vec::new();
        let mut positions = Vec::new();
        for (&label, &pos) in grid.markers() {
            if !label.is_ascii_digit() {
                return Err(SearchError::parse(
                    pos.y as usize + 1,
                    format!("unexpected marker {:?}", label),
                ));
            }
            labels.push(label);
            positions.push(pos);
        }

        if labels.first() != Some(&'0') {
            return Err(SearchError::parse(1, "map has no location 0"));
        }
        if labels.len() > MAX_LOCATIONS {
            return Err(SearchError::TooLarge {
                what: "locations",
                found: labels.len(),
                limit: MAX_LOCATIONS,
            });
        }

        let n = positions.len();
        let mut distances = vec![vec![None; n]; n];
        for i in 0..n {
            distances[i][i] = Some(0);
            for j in (i + 1)..n {
                let d = grid
                    .shortest_path(positions[i], positions[j])
                    .map(|path| path.cost());
                distances[i][j] = d;
                distances[j][i] = d;
            }
        }

        Ok(Self {
            labels,
            positions,
            distances,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn position(&self, label: char) -> Option<Position> {
        let index = self.labels.iter().position(|&l| l == label)?;
        Some(self.positions[index])
    }

    /// Walking distance between two labelled locations
    pub fn distance(&self, a: char, b: char) -> Option<u32> {
        let i = self.labels.iter().position(|&l| l == a)?;
        let j = self.labels.iter().position(|&l| l == b)?;
        self.distances[i][j]
    }

    fn shortest_edge(&self) -> u32 {
        self.distances
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(move |&(j, _)| j != i)
                    .filter_map(|(_, d)| *d)
            })
            .min()
            .unwrap_or(0)
    }

    /// Shortest walk from `0` visiting every location, optionally ending
    /// back at `0`. `None` when some location cannot be reached.
    pub fn shortest_tour(&self, return_home: bool) -> Option<Tour> {
        let all: u64 = if self.len() == MAX_LOCATIONS {
            u64::MAX
        } else {
            (1u64 << self.len()) - 1
        };
        let start = TourNode {
            map: self,
            at: 0,
            visited: 1,
        };
        let shortest = self.shortest_edge();

        let path = search::astar_to(
            &start,
            |node| node.visited == all && (!return_home || node.at == 0),
            |node| {
                let missing = (all & !node.visited).count_ones();
                let must_return = return_home && !(missing == 0 && node.at == 0);
                (missing + must_return as u32) * shortest
            },
        )?;

        Some(Tour {
            order: path.iter().map(|node| self.labels[node.at as usize]).collect(),
            steps: path.cost(),
        })
    }
}

/// Current location plus the set of locations seen so far
#[derive(Debug, Clone, Copy)]
pub struct TourNode<'m> {
    map: &'m DuctMap,
    at: u8,
    visited: u64,
}

impl PartialEq for TourNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.visited == other.visited
    }
}

impl Eq for TourNode<'_> {}

impl Hash for TourNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.at.hash(state);
        self.visited.hash(state);
    }
}

impl SearchNode for TourNode<'_> {
    type Cost = u32;

    fn neighbors(&self) -> Neighbors<Self, u32> {
        let row = &self.map.distances[self.at as usize];
        row.iter()
            .enumerate()
            .filter(|&(next, _)| next != self.at as usize)
            .filter_map(|(next, d)| {
                d.map(|cost| {
                    Neighbor::new(
                        TourNode {
                            map: self.map,
                            at: next as u8,
                            visited: self.visited | 1 << next,
                        },
                        cost,
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
###########
#0.1.....2#
#.#######.#
#4.......3#
###########
";

    #[test]
    fn test_pairwise_distances() {
        let map = DuctMap::parse(SAMPLE).unwrap();
        assert_eq!(map.len(), 5);
        assert_eq!(map.position('2'), Some(Position::new(9, 1)));
        assert_eq!(map.distance('0', '4'), Some(2));
        assert_eq!(map.distance('1', '2'), Some(6));
        assert_eq!(map.distance('3', '0'), Some(10));
        assert_eq!(map.distance('0', '7'), None);
    }

    #[test]
    fn test_open_tour() {
        let map = DuctMap::parse(SAMPLE).unwrap();
        let tour = map.shortest_tour(false).unwrap();
        assert_eq!(tour.steps, 14);
        assert_eq!(tour.order, vec!['0', '4', '1', '2', '3']);
    }

    #[test]
    fn test_tour_back_home() {
        let map = DuctMap::parse(SAMPLE).unwrap();
        let tour = map.shortest_tour(true).unwrap();
        assert_eq!(tour.steps, 20);
        assert_eq!(tour.order.first(), Some(&'0'));
        assert_eq!(tour.order.last(), Some(&'0'));
    }

    #[test]
    fn test_unreachable_location() {
        let map = DuctMap::parse("#######\n#0.#.1#\n#######\n").unwrap();
        assert_eq!(map.distance('0', '1'), None);
        assert!(map.shortest_tour(false).is_none());
    }

    #[test]
    fn test_missing_start() {
        assert!(DuctMap::parse("#####\n#1.2#\n#####\n").is_err());
    }

    #[test]
    fn test_letter_marker_rejected() {
        let err = DuctMap::parse("#####\n#0.a#\n#####\n").unwrap_err();
        assert!(matches!(err, SearchError::Parse { line: 2, .. }));
    }
}
