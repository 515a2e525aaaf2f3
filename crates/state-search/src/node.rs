//! The capability a value needs to be searchable.
//!
//! A node enumerates its neighbors with edge costs and compares equal to
//! every other node describing the same logical state. Identity comes from
//! `Eq + Hash`, so two grid cells built independently for the same
//! coordinate are the same node to the search tables.

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::Add;

use smallvec::SmallVec;

/// Numeric edge cost / priority.
///
/// Costs must be non-negative when used as edge weights.
pub trait Cost: Copy + PartialOrd + Add<Output = Self> + Debug {
    const ZERO: Self;
}

macro_rules! impl_cost {
    ($($t:ty => $zero:expr),* $(,)?) => {
        $(
            impl Cost for $t {
                const ZERO: Self = $zero;
            }
        )*
    };
}

impl_cost!(
    u8 => 0,
    u16 => 0,
    u32 => 0,
    u64 => 0,
    usize => 0,
    i32 => 0,
    i64 => 0,
    f32 => 0.0,
    f64 => 0.0,
);

/// An outgoing edge: the node it reaches and what it costs to take it
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<N, C> {
    pub node: N,
    pub cost: C,
}

impl<N, C> Neighbor<N, C> {
    pub fn new(node: N, cost: C) -> Self {
        Self { node, cost }
    }
}

/// Neighbor list; grids rarely have more than four
pub type Neighbors<N, C> = SmallVec<[Neighbor<N, C>; 4]>;

/// A vertex of an explicit graph or a state generated on demand.
pub trait SearchNode: Clone + Eq + Hash {
    type Cost: Cost;

    /// Every node reachable in one step, with the cost of that step
    fn neighbors(&self) -> Neighbors<Self, Self::Cost>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Counter(u8);

    impl SearchNode for Counter {
        type Cost = u32;

        fn neighbors(&self) -> Neighbors<Self, u32> {
            let mut out = Neighbors::new();
            if self.0 < 3 {
                out.push(Neighbor::new(Counter(self.0 + 1), 1));
            }
            out
        }
    }

    #[test]
    fn test_cost_zero() {
        assert_eq!(<u32 as Cost>::ZERO, 0);
        assert_eq!(<f64 as Cost>::ZERO, 0.0);
        assert_eq!(<i64 as Cost>::ZERO + 5, 5);
    }

    #[test]
    fn test_neighbors_of_counter() {
        let n = Counter(1).neighbors();
        assert_eq!(n.len(), 1);
        assert_eq!(n[0], Neighbor::new(Counter(2), 1));
        assert!(Counter(3).neighbors().is_empty());
    }
}
