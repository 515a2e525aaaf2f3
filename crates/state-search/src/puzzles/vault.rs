//! Four-by-four vault whose doors depend on the route taken.
//!
//! The doors out of a room are decided by the MD5 of the passcode followed
//! by the moves so far: the first four hex digits govern up, down, left and
//! right, and a digit from `b` to `f` means open. Because the route is part
//! of the state, the rooms form a tree rather than a grid.

use std::hash::{Hash, Hasher};

use crate::node::{Neighbor, Neighbors, SearchNode};
use crate::search;

const SIZE: u8 = 4;
const VAULT: (u8, u8) = (SIZE - 1, SIZE - 1);

const MOVES: [(char, i8, i8); 4] = [('U', 0, -1), ('D', 0, 1), ('L', -1, 0), ('R', 1, 0)];

/// Open doors in [`MOVES`] order for `passcode` after `route`
pub fn open_doors(passcode: &str, route: &str) -> [bool; 4] {
    let digest = md5::compute(format!("{}{}", passcode, route));
    let nibbles = [digest[0] >> 4, digest[0] & 0xf, digest[1] >> 4, digest[1] & 0xf];
    nibbles.map(|n| n >= 0xb)
}

/// A position in the vault together with the route that reached it
#[derive(Debug, Clone)]
pub struct Room<'p> {
    passcode: &'p str,
    route: String,
    x: u8,
    y: u8,
}

impl<'p> Room<'p> {
    /// The top-left room with nothing walked yet
    pub fn entrance(passcode: &'p str) -> Self {
        Self {
            passcode,
            route: String::new(),
            x: 0,
            y: 0,
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn is_vault(&self) -> bool {
        (self.x, self.y) == VAULT
    }

    fn distance_to_vault(&self) -> u32 {
        u32::from(VAULT.0 - self.x) + u32::from(VAULT.1 - self.y)
    }
}

// The route determines the position
impl PartialEq for Room<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.route == other.route
    }
}

impl Eq for Room<'_> {}

impl Hash for Room<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.route.hash(state);
    }
}

impl SearchNode for Room<'_> {
    type Cost = u32;

    fn neighbors(&self) -> Neighbors<Self, u32> {
        let mut out = Neighbors::new();
        // Reaching the vault ends the walk
        if self.is_vault() {
            return out;
        }
        let doors = open_doors(self.passcode, &self.route);
        for (&(step, dx, dy), open) in MOVES.iter().zip(doors) {
            let x = self.x as i8 + dx;
            let y = self.y as i8 + dy;
            if !open || !(0..SIZE as i8).contains(&x) || !(0..SIZE as i8).contains(&y) {
                continue;
            }
            let mut route = String::with_capacity(self.route.len() + 1);
            route.push_str(&self.route);
            route.push(step);
            out.push(Neighbor::new(
                Room {
                    passcode: self.passcode,
                    route,
                    x: x as u8,
                    y: y as u8,
                },
                1,
            ));
        }
        out
    }
}

/// Shortest route from the entrance to the vault
pub fn shortest_route(passcode: &str) -> Option<String> {
    let entrance = Room::entrance(passcode);
    let path = search::astar_to(&entrance, Room::is_vault, Room::distance_to_vault)?;
    Some(path.goal().route.clone())
}

/// Length of the longest route that ends at the vault
pub fn longest_route(passcode: &str) -> Option<usize> {
    search::bfs_layers(&Room::entrance(passcode), usize::MAX)
        .into_iter()
        .filter(|(room, _)| room.is_vault())
        .map(|(_, depth)| depth)
        .max()
}
