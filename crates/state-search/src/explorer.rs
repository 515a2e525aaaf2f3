//! Uniform-cost exploration of implicit state spaces.
//!
//! States are generated on demand, reduced to a canonical representative
//! and expanded at most once per representative. Frontier order is the
//! accumulated step count, so with unit steps this is a breadth-first
//! sweep pruned at the best solution length found so far.

use std::hash::Hash;

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::heap::MinHeap;

/// A combinatorial state space too large to materialize.
pub trait StateSpace {
    type State: Clone + Eq + Hash;

    /// Every legal one-step transition out of `state`, with its cost
    fn successors(&self, state: &Self::State) -> Vec<(Self::State, u32)>;

    /// Map `state` to the representative of its symmetry class.
    ///
    /// Must be pure and idempotent, and map label permutations of
    /// interchangeable components to the same representative.
    fn canonicalize(&self, state: &Self::State) -> Self::State;

    fn is_goal(&self, state: &Self::State) -> bool;

    /// Frontier priority for parallel exploration; defaults to the cost so far
    fn priority(&self, _state: &Self::State, cost: u32) -> u32 {
        cost
    }
}

/// Exploration bounds
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Discard any state more than this many steps from the start
    pub max_steps: Option<u32>,
    /// Deduplicate on canonical forms instead of raw states
    pub canonicalize: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            canonicalize: true,
        }
    }
}

/// Result of an exploration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exploration<S> {
    /// Fewest steps to a goal, `None` if no goal is reachable within bounds
    pub steps: Option<u32>,
    /// The (canonical) goal state reached
    pub goal: Option<S>,
    /// Distinct states recorded in the visited set
    pub states_seen: usize,
    /// States popped and expanded
    pub expanded: usize,
    /// States dropped by the step bound or the best-solution prune
    pub pruned: usize,
}

impl<S> Exploration<S> {
    pub fn is_solved(&self) -> bool {
        self.steps.is_some()
    }
}

/// Explore from `initial` until the frontier is exhausted.
///
/// Every state is deduplicated when first generated. That is exact for
/// unit step costs; with mixed costs the reported step count is an upper
/// bound.
pub fn explore<S: StateSpace>(
    space: &S,
    initial: S::State,
    config: &ExplorerConfig,
) -> Exploration<S::State> {
    let key = |state: &S::State| {
        if config.canonicalize {
            space.canonicalize(state)
        } else {
            state.clone()
        }
    };

    let start = key(&initial);
    let mut result = Exploration {
        steps: None,
        goal: None,
        states_seen: 1,
        expanded: 0,
        pruned: 0,
    };

    if space.is_goal(&start) {
        result.steps = Some(0);
        result.goal = Some(start);
        return result;
    }

    let mut seen: FxHashSet<S::State> = FxHashSet::default();
    let mut queue: MinHeap<u32, (S::State, u32)> = MinHeap::with_capacity(1 << 10);
    seen.insert(start.clone());
    queue.push((start, 0), 0);

    let mut least: Option<u32> = None;

    while let Some((state, steps)) = queue.try_pop() {
        // Nothing below here can beat the best solution
        if least.map_or(false, |best| steps >= best) {
            result.pruned += 1;
            continue;
        }

        result.expanded += 1;

        for (next, cost) in space.successors(&state) {
            let next = key(&next);
            let next_steps = steps + cost;

            if config.max_steps.map_or(false, |max| next_steps > max) {
                result.pruned += 1;
                continue;
            }

            if seen.contains(&next) {
                continue;
            }

            if space.is_goal(&next) {
                if least.map_or(true, |best| next_steps < best) {
                    debug!(steps = next_steps, "goal found");
                    least = Some(next_steps);
                    result.goal = Some(next);
                }
                continue;
            }

            seen.insert(next.clone());
            queue.push((next, next_steps), next_steps);
        }
    }

    result.steps = least;
    result.states_seen = seen.len();

    match least {
        Some(steps) => info!(
            steps,
            states = result.states_seen,
            expanded = result.expanded,
            "exploration solved"
        ),
        None => info!(
            states = result.states_seen,
            expanded = result.expanded,
            "exploration exhausted without a solution"
        ),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three interchangeable tokens on positions 0..=4; one token moves
    /// right per step. Goal: every token on 4.
    struct Tokens;

    impl StateSpace for Tokens {
        type State = [u8; 3];

        fn successors(&self, state: &[u8; 3]) -> Vec<([u8; 3], u32)> {
            let mut out = Vec::new();
            for i in 0..3 {
                if state[i] < 4 {
                    let mut next = *state;
                    next[i] += 1;
                    out.push((next, 1));
                }
            }
            out
        }

        fn canonicalize(&self, state: &[u8; 3]) -> [u8; 3] {
            let mut sorted = *state;
            sorted.sort_unstable();
            sorted
        }

        fn is_goal(&self, state: &[u8; 3]) -> bool {
            state.iter().all(|&p| p == 4)
        }
    }

    /// A line with no way forward past position 2
    struct DeadEnd;

    impl StateSpace for DeadEnd {
        type State = u8;

        fn successors(&self, state: &u8) -> Vec<(u8, u32)> {
            if *state < 2 {
                vec![(state + 1, 1)]
            } else {
                Vec::new()
            }
        }

        fn canonicalize(&self, state: &u8) -> u8 {
            *state
        }

        fn is_goal(&self, state: &u8) -> bool {
            *state == 5
        }
    }

    #[test]
    fn test_tokens_solved_in_twelve() {
        let result = explore(&Tokens, [0, 0, 0], &ExplorerConfig::default());
        assert_eq!(result.steps, Some(12));
        assert_eq!(result.goal, Some([4, 4, 4]));
        assert!(result.is_solved());
    }

    #[test]
    fn test_canonical_dedup_visits_fewer_states() {
        let canonical = explore(&Tokens, [0, 0, 0], &ExplorerConfig::default());
        let raw = explore(
            &Tokens,
            [0, 0, 0],
            &ExplorerConfig {
                canonicalize: false,
                ..Default::default()
            },
        );

        assert_eq!(canonical.steps, raw.steps);
        assert!(canonical.states_seen < raw.states_seen);
        // Multisets of three positions out of five, minus the goal
        assert_eq!(canonical.states_seen, 34);
        assert_eq!(raw.states_seen, 124);
    }

    #[test]
    fn test_start_is_goal() {
        let result = explore(&Tokens, [4, 4, 4], &ExplorerConfig::default());
        assert_eq!(result.steps, Some(0));
        assert_eq!(result.expanded, 0);
    }

    #[test]
    fn test_step_bound_reports_no_solution() {
        let config = ExplorerConfig {
            max_steps: Some(11),
            ..Default::default()
        };
        let result = explore(&Tokens, [0, 0, 0], &config);
        assert_eq!(result.steps, None);
        assert!(result.pruned > 0);
    }

    #[test]
    fn test_dead_end_exhausts() {
        let result = explore(&DeadEnd, 0, &ExplorerConfig::default());
        assert!(!result.is_solved());
        assert_eq!(result.expanded, 3);
        assert_eq!(result.states_seen, 3);
    }
}
