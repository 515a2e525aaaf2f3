//! Best-first (A*) search over [`SearchNode`] values.
//!
//! With a zero heuristic the search is Dijkstra; with unit edge costs as
//! well it visits nodes in breadth-first order. The returned path is
//! shortest only when the heuristic is admissible, which is the caller's
//! responsibility and is not checked here.

use std::collections::hash_map::Entry;
use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::heap::{Frontier, MinHeap};
use crate::node::{Cost, SearchNode};

/// A path from start to goal together with its total cost
#[derive(Debug, Clone, PartialEq)]
pub struct Path<N, C> {
    nodes: Vec<N>,
    cost: C,
}

impl<N, C: Copy> Path<N, C> {
    /// Nodes in order, start first
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn cost(&self) -> C {
        self.cost
    }

    /// Number of edges taken
    pub fn steps(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn start(&self) -> &N {
        &self.nodes[0]
    }

    pub fn goal(&self) -> &N {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.nodes.iter()
    }

    pub fn into_nodes(self) -> Vec<N> {
        self.nodes
    }
}

/// Counters collected during one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped and expanded
    pub expanded: usize,
    /// Frontier insertions
    pub pushed: usize,
    /// Popped entries discarded because a cheaper route was found later
    pub stale: usize,
}

/// Outcome of a search plus its counters
#[derive(Debug, Clone)]
pub struct SearchReport<N, C> {
    pub path: Option<Path<N, C>>,
    pub stats: SearchStats,
}

/// Frontier payload: the node and the g-score it was pushed with
pub type FrontierEntry<N> = (N, <N as SearchNode>::Cost);

/// Shortest path from `start` to `goal` guided by `heuristic(node, goal)`.
///
/// Returns `None` when the goal is unreachable.
pub fn astar<N, H>(start: &N, goal: &N, heuristic: H) -> Option<Path<N, N::Cost>>
where
    N: SearchNode,
    H: Fn(&N, &N) -> N::Cost,
{
    let mut frontier = MinHeap::new();
    astar_with(&mut frontier, start, goal, heuristic)
}

/// [`astar`] with a zero heuristic
pub fn dijkstra<N: SearchNode>(start: &N, goal: &N) -> Option<Path<N, N::Cost>> {
    astar(start, goal, |_, _| N::Cost::ZERO)
}

/// [`astar`] over a caller-supplied frontier.
///
/// The frontier must be empty; it is drained by the time this returns
/// unless the goal was found first.
pub fn astar_with<N, F, H>(
    frontier: &mut F,
    start: &N,
    goal: &N,
    heuristic: H,
) -> Option<Path<N, N::Cost>>
where
    N: SearchNode,
    F: Frontier<FrontierEntry<N>, N::Cost>,
    H: Fn(&N, &N) -> N::Cost,
{
    best_first(frontier, start, |n| n == goal, |n| heuristic(n, goal)).path
}

/// Search towards any node satisfying `is_goal`.
///
/// `heuristic` estimates the remaining cost from a node to the nearest goal.
pub fn astar_to<N, G, H>(start: &N, is_goal: G, heuristic: H) -> Option<Path<N, N::Cost>>
where
    N: SearchNode,
    G: Fn(&N) -> bool,
    H: Fn(&N) -> N::Cost,
{
    let mut frontier = MinHeap::new();
    best_first(&mut frontier, start, is_goal, heuristic).path
}

/// [`astar`] returning search counters alongside the path
pub fn astar_report<N, H>(start: &N, goal: &N, heuristic: H) -> SearchReport<N, N::Cost>
where
    N: SearchNode,
    H: Fn(&N, &N) -> N::Cost,
{
    let mut frontier = MinHeap::new();
    best_first(&mut frontier, start, |n| n == goal, |n| heuristic(n, goal))
}

fn best_first<N, F, G, H>(
    frontier: &mut F,
    start: &N,
    is_goal: G,
    heuristic: H,
) -> SearchReport<N, N::Cost>
where
    N: SearchNode,
    F: Frontier<FrontierEntry<N>, N::Cost>,
    G: Fn(&N) -> bool,
    H: Fn(&N) -> N::Cost,
{
    let mut stats = SearchStats::default();

    if is_goal(start) {
        return SearchReport {
            path: Some(Path {
                nodes: vec![start.clone()],
                cost: N::Cost::ZERO,
            }),
            stats,
        };
    }

    let mut g_score: FxHashMap<N, N::Cost> = FxHashMap::default();
    let mut came_from: FxHashMap<N, N> = FxHashMap::default();

    g_score.insert(start.clone(), N::Cost::ZERO);
    frontier.push((start.clone(), N::Cost::ZERO), heuristic(start));
    stats.pushed += 1;

    while !frontier.is_empty() {
        let (current, current_g) = frontier.pop();

        // A cheaper entry for this node was pushed after this one
        if g_score.get(&current).map_or(false, |&best| current_g > best) {
            stats.stale += 1;
            continue;
        }

        if is_goal(&current) {
            debug!(
                expanded = stats.expanded,
                pushed = stats.pushed,
                stale = stats.stale,
                "goal reached"
            );
            let path = reconstruct_path(&came_from, current, current_g);
            return SearchReport {
                path: Some(path),
                stats,
            };
        }

        stats.expanded += 1;

        for neighbor in current.neighbors() {
            assert!(
                !(neighbor.cost < N::Cost::ZERO),
                "negative edge cost {:?}",
                neighbor.cost
            );
            let tentative = current_g + neighbor.cost;

            let improved = match g_score.entry(neighbor.node.clone()) {
                Entry::Occupied(mut known) => {
                    if tentative < *known.get() {
                        known.insert(tentative);
                        true
                    } else {
                        false
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(tentative);
                    true
                }
            };

            if improved {
                let f_score = tentative + heuristic(&neighbor.node);
                came_from.insert(neighbor.node.clone(), current.clone());
                frontier.push((neighbor.node, tentative), f_score);
                stats.pushed += 1;
            }
        }
    }

    debug!(
        expanded = stats.expanded,
        pushed = stats.pushed,
        stale = stats.stale,
        "frontier exhausted, goal unreachable"
    );
    SearchReport { path: None, stats }
}

fn reconstruct_path<N: SearchNode>(
    came_from: &FxHashMap<N, N>,
    goal: N,
    cost: N::Cost,
) -> Path<N, N::Cost> {
    let mut nodes = vec![goal];
    while let Some(previous) = came_from.get(&nodes[nodes.len() - 1]) {
        nodes.push(previous.clone());
    }
    nodes.reverse();
    Path { nodes, cost }
}

/// Every node whose shortest distance from `start` is at most `budget`,
/// paired with that distance. `start` itself is included at distance zero.
///
/// Order follows non-decreasing distance.
pub fn reachable_within<N: SearchNode>(start: &N, budget: N::Cost) -> Vec<(N, N::Cost)> {
    let mut best: FxHashMap<N, N::Cost> = FxHashMap::default();
    let mut frontier: MinHeap<N::Cost, FrontierEntry<N>> = MinHeap::new();
    let mut settled = Vec::new();

    best.insert(start.clone(), N::Cost::ZERO);
    frontier.push((start.clone(), N::Cost::ZERO), N::Cost::ZERO);

    while let Some((current, g)) = frontier.try_pop() {
        if best.get(&current).map_or(false, |&known| g > known) {
            continue;
        }
        settled.push((current.clone(), g));

        for neighbor in current.neighbors() {
            let tentative = g + neighbor.cost;
            if tentative > budget {
                continue;
            }
            let better = best.get(&neighbor.node).map_or(true, |&known| tentative < known);
            if better {
                best.insert(neighbor.node.clone(), tentative);
                frontier.push((neighbor.node, tentative), tentative);
            }
        }
    }

    settled
}

/// Plain breadth-first layer walk for unit-cost graphs; every node at most
/// `max_steps` edges away, in discovery order.
pub fn bfs_layers<N: SearchNode>(start: &N, max_steps: usize) -> Vec<(N, usize)> {
    let mut seen: FxHashMap<N, usize> = FxHashMap::default();
    let mut queue = VecDeque::new();
    let mut order = Vec::new();

    seen.insert(start.clone(), 0);
    queue.push_back((start.clone(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        order.push((current.clone(), depth));
        if depth == max_steps {
            continue;
        }
        for neighbor in current.neighbors() {
            if let Entry::Vacant(slot) = seen.entry(neighbor.node.clone()) {
                slot.insert(depth + 1);
                queue.push_back((neighbor.node, depth + 1));
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Neighbor, Neighbors};
    use std::cell::Cell;

    /// Small explicit graph stored in a static adjacency table
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct V(usize);

    const CYCLE: &[&[(usize, u32)]] = &[
        &[(1, 1), (3, 4)],
        &[(0, 1), (2, 1)],
        &[(1, 1), (3, 1)],
        &[(2, 1), (0, 4)],
    ];

    impl SearchNode for V {
        type Cost = u32;

        fn neighbors(&self) -> Neighbors<Self, u32> {
            CYCLE[self.0]
                .iter()
                .map(|&(to, cost)| Neighbor::new(V(to), cost))
                .collect()
        }
    }

    /// Two disconnected pairs: {0,1} and {2,3}
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct Split(usize);

    impl SearchNode for Split {
        type Cost = u32;

        fn neighbors(&self) -> Neighbors<Self, u32> {
            let other = self.0 ^ 1;
            let mut out = Neighbors::new();
            out.push(Neighbor::new(Split(other), 1));
            out
        }
    }

    thread_local! {
        static EXPANSIONS: Cell<usize> = Cell::new(0);
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct Tracked(u8);

    impl SearchNode for Tracked {
        type Cost = u32;

        fn neighbors(&self) -> Neighbors<Self, u32> {
            EXPANSIONS.with(|c| c.set(c.get() + 1));
            let mut out = Neighbors::new();
            out.push(Neighbor::new(Tracked(self.0.wrapping_add(1)), 1));
            out
        }
    }

    #[test]
    fn test_cycle_prefers_three_light_edges() {
        let path = dijkstra(&V(0), &V(3)).expect("path exists");
        assert_eq!(path.cost(), 3);
        assert_eq!(path.nodes(), &[V(0), V(1), V(2), V(3)]);
        assert_eq!(path.steps(), 3);
        assert_eq!(*path.start(), V(0));
        assert_eq!(*path.goal(), V(3));
    }

    #[test]
    fn test_admissible_heuristic_keeps_optimum() {
        // Remaining hops around the light side, never more than the true cost
        let h = |n: &V, _: &V| (3 - n.0 as u32).min(1);
        let path = astar(&V(0), &V(3), h).unwrap();
        assert_eq!(path.cost(), 3);
    }

    #[test]
    fn test_unreachable_goal() {
        assert!(dijkstra(&Split(0), &Split(2)).is_none());
        assert!(dijkstra(&Split(3), &Split(1)).is_none());
        assert_eq!(dijkstra(&Split(2), &Split(3)).unwrap().cost(), 1);
    }

    #[test]
    fn test_start_equals_goal_does_not_expand() {
        EXPANSIONS.with(|c| c.set(0));
        let report = astar_report(&Tracked(7), &Tracked(7), |_, _| 0);
        let path = report.path.unwrap();
        assert_eq!(path.nodes(), &[Tracked(7)]);
        assert_eq!(path.cost(), 0);
        assert_eq!(report.stats.expanded, 0);
        assert_eq!(EXPANSIONS.with(|c| c.get()), 0);
    }

    #[test]
    fn test_path_edges_exist() {
        let path = dijkstra(&V(3), &V(1)).unwrap();
        for pair in path.nodes().windows(2) {
            assert!(pair[0].neighbors().iter().any(|n| n.node == pair[1]));
        }
        assert_eq!(path.cost(), 2);
    }

    #[test]
    fn test_caller_supplied_frontier() {
        let mut frontier = MinHeap::with_capacity(16);
        let path = astar_with(&mut frontier, &V(1), &V(3), |_, _| 0).unwrap();
        assert_eq!(path.cost(), 2);
    }

    #[test]
    fn test_goal_predicate() {
        let path = astar_to(&V(0), |n| n.0 >= 2, |_| 0).unwrap();
        assert_eq!(*path.goal(), V(2));
        assert_eq!(path.cost(), 2);
    }

    #[test]
    fn test_cheaper_route_overrides_first_discovery() {
        // 0 -> 3 is first pushed at cost 4 and later improved to 3
        let report = astar_report(&V(0), &V(3), |_, _| 0);
        assert_eq!(report.path.unwrap().cost(), 3);
        assert!(report.stats.pushed > report.stats.expanded);
    }

    #[test]
    fn test_reachable_within_budget() {
        let mut within: Vec<(V, u32)> = reachable_within(&V(0), 2);
        within.sort_by_key(|(v, _)| v.0);
        assert_eq!(within, vec![(V(0), 0), (V(1), 1), (V(2), 2)]);
    }

    #[test]
    fn test_bfs_layers() {
        let layers = bfs_layers(&V(0), 1);
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0], (V(0), 0));
        assert!(layers.iter().all(|(_, d)| *d <= 1));
    }

    #[test]
    #[should_panic(expected = "negative edge cost")]
    fn test_negative_edge_panics() {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        struct Bad(u8);

        impl SearchNode for Bad {
            type Cost = i32;

            fn neighbors(&self) -> Neighbors<Self, i32> {
                let mut out = Neighbors::new();
                out.push(Neighbor::new(Bad(1), -1));
                out
            }
        }

        let _ = dijkstra(&Bad(0), &Bad(2));
    }
}
