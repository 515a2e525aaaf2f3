//! Multi-threaded exploration: one coordinator, a pool of expanders.
//!
//! The coordinator (the calling thread) owns the frontier, the best-cost
//! table and the best solution. Each round it pops a batch of live
//! frontier entries and expands them in parallel on a rayon pool; only
//! [`StateSpace::successors`] runs off the coordinator. Results are merged
//! back in batch order, so the run ends exactly when the frontier is empty.
//! Without a deadline the result is the exhaustive optimum; a run cut short
//! by its deadline reports `exhaustive: false` and the best answer seen so
//! far, which is only an upper bound.

use std::thread;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::explorer::StateSpace;
use crate::heap::MinHeap;

/// Worker pool and stopping rules
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Expander threads
    pub workers: usize,
    /// Frontier entries handed to each worker per batch
    pub max_in_flight: usize,
    /// Stop after this long even if the frontier is not exhausted
    pub deadline: Option<Duration>,
    /// Discard any state more than this many steps from the start
    pub max_steps: Option<u32>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            workers,
            max_in_flight: 4,
            deadline: None,
            max_steps: None,
        }
    }
}

/// Result of a parallel exploration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelOutcome<S> {
    /// Fewest steps to a goal found
    pub steps: Option<u32>,
    pub goal: Option<S>,
    /// True when the whole bounded space was explored, making `steps` optimal
    pub exhaustive: bool,
    /// Distinct canonical states recorded
    pub states_seen: usize,
    /// States expanded by the pool
    pub expanded: usize,
    pub elapsed: Duration,
}

/// Explore `space` from `initial` with a pool of worker threads.
pub fn explore<S>(
    space: &S,
    initial: S::State,
    config: &ParallelConfig,
) -> ParallelOutcome<S::State>
where
    S: StateSpace + Sync,
    S::State: Send + Sync,
{
    let started = Instant::now();
    let deadline = config.deadline.map(|d| started + d);
    let workers = config.workers.max(1);

    let start = space.canonicalize(&initial);
    if space.is_goal(&start) {
        return ParallelOutcome {
            steps: Some(0),
            goal: Some(start),
            exhaustive: true,
            states_seen: 1,
            expanded: 0,
            elapsed: started.elapsed(),
        };
    }

    let pool = match ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!(error = %e, "could not build worker pool, using the global pool");
            None
        }
    };

    let outcome = coordinate(space, start, config, deadline, workers, pool.as_ref());
    ParallelOutcome {
        elapsed: started.elapsed(),
        ..outcome
    }
}

/// Successor lists for every state in `batch`, in batch order
fn expand<S>(
    space: &S,
    batch: &[(S::State, u32)],
    pool: Option<&ThreadPool>,
) -> Vec<Vec<(S::State, u32)>>
where
    S: StateSpace + Sync,
    S::State: Send + Sync,
{
    let run = || {
        batch
            .par_iter()
            .map(|(state, _)| space.successors(state))
            .collect::<Vec<_>>()
    };
    match pool {
        Some(pool) => pool.install(run),
        None => run(),
    }
}

fn coordinate<S>(
    space: &S,
    start: S::State,
    config: &ParallelConfig,
    deadline: Option<Instant>,
    workers: usize,
    pool: Option<&ThreadPool>,
) -> ParallelOutcome<S::State>
where
    S: StateSpace + Sync,
    S::State: Send + Sync,
{
    let capacity = workers * config.max_in_flight.max(1);
    let mut best_cost: FxHashMap<S::State, u32> = FxHashMap::default();
    let mut frontier: MinHeap<u32, (S::State, u32)> = MinHeap::new();
    let mut batch: Vec<(S::State, u32)> = Vec::with_capacity(capacity);
    let mut least: Option<u32> = None;
    let mut goal = None;
    let mut expanded = 0usize;
    let mut rounds = 0usize;
    let mut exhaustive = true;

    best_cost.insert(start.clone(), 0);
    let priority = space.priority(&start, 0);
    frontier.push((start, 0), priority);

    loop {
        while batch.len() < capacity {
            let Some((state, cost)) = frontier.try_pop() else { break };

            let stale = best_cost.get(&state).map_or(false, |&best| cost > best);
            let beaten = least.map_or(false, |best| cost >= best);
            if stale || beaten {
                continue;
            }
            batch.push((state, cost));
        }

        if batch.is_empty() {
            break;
        }

        if deadline.map_or(false, |at| Instant::now() >= at) {
            exhaustive = false;
            break;
        }

        let expansions = expand(space, &batch, pool);
        expanded += batch.len();
        rounds += 1;

        for ((_, base), successors) in batch.drain(..).zip(expansions) {
            for (next, step) in successors {
                let next = space.canonicalize(&next);
                let cost = base + step;

                if config.max_steps.map_or(false, |max| cost > max) {
                    continue;
                }

                if space.is_goal(&next) {
                    if least.map_or(true, |best| cost < best) {
                        debug!(steps = cost, "goal found");
                        least = Some(cost);
                        goal = Some(next);
                    }
                    continue;
                }

                let better = best_cost.get(&next).map_or(true, |&known| cost < known);
                if better {
                    best_cost.insert(next.clone(), cost);
                    let priority = space.priority(&next, cost);
                    frontier.push((next, cost), priority);
                }
            }
        }
    }

    if exhaustive {
        info!(
            steps = ?least,
            states = best_cost.len(),
            expanded,
            rounds,
            "parallel exploration exhausted"
        );
    } else {
        warn!(
            steps = ?least,
            states = best_cost.len(),
            expanded,
            rounds,
            "parallel exploration stopped at deadline; result is an upper bound"
        );
    }

    ParallelOutcome {
        steps: least,
        goal,
        exhaustive,
        states_seen: best_cost.len(),
        expanded,
        elapsed: Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Four interchangeable tokens walking right on 0..=3
    struct Tokens;

    impl StateSpace for Tokens {
        type State = [u8; 4];

        fn successors(&self, state: &[u8; 4]) -> Vec<([u8; 4], u32)> {
            (0..4)
                .filter(|&i| state[i] < 3)
                .map(|i| {
                    let mut next = *state;
                    next[i] += 1;
                    (next, 1)
                })
                .collect()
        }

        fn canonicalize(&self, state: &[u8; 4]) -> [u8; 4] {
            let mut sorted = *state;
            sorted.sort_unstable();
            sorted
        }

        fn is_goal(&self, state: &[u8; 4]) -> bool {
            state.iter().all(|&p| p == 3)
        }

        // Greedy: most advanced token first
        fn priority(&self, state: &[u8; 4], _cost: u32) -> u32 {
            12 - state.iter().map(|&p| p as u32).sum::<u32>()
        }
    }

    #[test]
    fn test_parallel_finds_optimum() {
        let config = ParallelConfig {
            workers: 3,
            ..Default::default()
        };
        let outcome = explore(&Tokens, [0, 0, 0, 0], &config);
        assert_eq!(outcome.steps, Some(12));
        assert_eq!(outcome.goal, Some([3, 3, 3, 3]));
        assert!(outcome.exhaustive);
        assert!(outcome.expanded > 0);
    }

    #[test]
    fn test_single_worker_matches_sequential() {
        let config = ParallelConfig {
            workers: 1,
            max_in_flight: 1,
            ..Default::default()
        };
        let outcome = explore(&Tokens, [3, 0, 3, 1], &config);
        let sequential = crate::explorer::explore(
            &Tokens,
            [3, 0, 3, 1],
            &crate::explorer::ExplorerConfig::default(),
        );
        assert_eq!(outcome.steps, sequential.steps);
        assert_eq!(outcome.steps, Some(5));
    }

    #[test]
    fn test_start_is_goal() {
        let outcome = explore(&Tokens, [3, 3, 3, 3], &ParallelConfig::default());
        assert_eq!(outcome.steps, Some(0));
        assert_eq!(outcome.expanded, 0);
    }

    /// Sixteen fresh states out of every state, no goal anywhere
    struct Endless;

    impl StateSpace for Endless {
        type State = u64;

        fn successors(&self, state: &u64) -> Vec<(u64, u32)> {
            (1..=16)
                .map(|k| (state.wrapping_mul(16).wrapping_add(k), 1))
                .collect()
        }

        fn canonicalize(&self, state: &u64) -> u64 {
            *state
        }

        fn is_goal(&self, _state: &u64) -> bool {
            false
        }
    }

    #[test]
    fn test_deadline_stops_unbounded_space() {
        let config = ParallelConfig {
            workers: 4,
            deadline: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let outcome = explore(&Endless, 0, &config);
        assert!(!outcome.exhaustive);
        assert_eq!(outcome.steps, None);
        assert!(outcome.expanded > 0);
        assert!(outcome.elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_step_bound_without_solution() {
        let config = ParallelConfig {
            workers: 2,
            max_steps: Some(4),
            ..Default::default()
        };
        let outcome = explore(&Tokens, [0, 0, 0, 0], &config);
        assert_eq!(outcome.steps, None);
        assert!(outcome.exhaustive);
    }
}
