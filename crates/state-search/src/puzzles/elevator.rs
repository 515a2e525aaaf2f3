//! Moving paired items up a four-floor building with a two-item elevator.
//!
//! Each item kind has a chip and a generator, encoded as the same bit in
//! the floor's `chips` / `generators` masks. A floor is safe when it holds
//! no generators or every chip on it is next to its own generator. The
//! elevator carries one or two items one floor per step and never travels
//! empty; both the floor it leaves and the floor it reaches must stay safe.
//!
//! Kinds are interchangeable, so states are canonicalized by relabelling
//! kinds in order of their (chip floor, generator floor) pair.

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

use crate::error::{Result, SearchError};
use crate::explorer::StateSpace;

pub const FLOORS: usize = 4;

/// Maximum number of item kinds; one bit per kind in a `u8`
pub const MAX_KINDS: usize = 8;

/// Chips and generators on one floor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Floor {
    pub chips: u8,
    pub generators: u8,
}

/// What the elevator carries in one trip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Load {
    pub chips: u8,
    pub generators: u8,
}

impl Load {
    pub fn chip(mask: u8) -> Self {
        Self {
            chips: mask,
            generators: 0,
        }
    }

    pub fn generator(mask: u8) -> Self {
        Self {
            chips: 0,
            generators: mask,
        }
    }

    fn union(self, other: Load) -> Load {
        Load {
            chips: self.chips | other.chips,
            generators: self.generators | other.generators,
        }
    }
}

/// A chip is only at risk when some generator is present and its own is not
pub fn is_safe(chips: u8, generators: u8) -> bool {
    chips == 0 || generators == 0 || chips & !generators == 0
}

impl Floor {
    pub fn is_empty(&self) -> bool {
        self.chips | self.generators == 0
    }

    pub fn is_safe(&self) -> bool {
        is_safe(self.chips, self.generators)
    }

    pub fn is_safe_without(&self, load: Load) -> bool {
        is_safe(self.chips & !load.chips, self.generators & !load.generators)
    }

    pub fn is_safe_with(&self, load: Load) -> bool {
        is_safe(self.chips | load.chips, self.generators | load.generators)
    }

    pub fn add(&mut self, load: Load) {
        self.chips |= load.chips;
        self.generators |= load.generators;
    }

    pub fn remove(&mut self, load: Load) {
        self.chips &= !load.chips;
        self.generators &= !load.generators;
    }

    /// Every load of one or two items that can leave this floor for `target`
    pub fn loads_to(&self, target: &Floor) -> SmallVec<[Load; 16]> {
        let mut items: SmallVec<[Load; 16]> = SmallVec::new();
        for bit in 0..MAX_KINDS {
            let mask = 1u8 << bit;
            if self.chips & mask != 0 {
                items.push(Load::chip(mask));
            }
            if self.generators & mask != 0 {
                items.push(Load::generator(mask));
            }
        }

        let mut loads = SmallVec::new();
        let mut consider = |load: Load| {
            if self.is_safe_without(load) && target.is_safe_with(load) {
                loads.push(load);
            }
        };

        for (i, &first) in items.iter().enumerate() {
            consider(first);
            for &second in &items[i + 1..] {
                consider(first.union(second));
            }
        }
        loads
    }
}

/// Elevator position plus the contents of every floor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Facility {
    pub elevator: u8,
    pub floors: [Floor; FLOORS],
}

impl Facility {
    /// Parse one sentence per floor, bottom floor first:
    /// "The first floor contains a hydrogen-compatible microchip and a lithium generator."
    pub fn parse(text: &str) -> Result<Self> {
        let mut kinds: Vec<String> = Vec::new();
        let mut facility = Facility::default();

        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() > FLOORS {
            return Err(SearchError::TooLarge {
                what: "floors",
                found: lines.len(),
                limit: FLOORS,
            });
        }

        for (floor_index, line) in lines.iter().enumerate() {
            let cleaned: String = line
                .chars()
                .map(|c| if c == ',' || c == '.' { ' ' } else { c })
                .collect();
            let words: Vec<&str> = cleaned.split_whitespace().collect();

            for (i, word) in words.iter().enumerate().skip(1) {
                let previous = words[i - 1];
                let (element, is_chip) = match *word {
                    "microchip" => match previous.strip_suffix("-compatible") {
                        Some(element) => (element, true),
                        None => {
                            return Err(SearchError::parse(
                                floor_index + 1,
                                format!("microchip without element: {:?}", previous),
                            ))
                        }
                    },
                    "generator" => (previous, false),
                    _ => continue,
                };

                let bit = match kinds.iter().position(|k| k == element) {
                    Some(bit) => bit,
                    None => {
                        if kinds.len() == MAX_KINDS {
                            return Err(SearchError::TooLarge {
                                what: "item kinds",
                                found: kinds.len() + 1,
                                limit: MAX_KINDS,
                            });
                        }
                        kinds.push(element.to_string());
                        kinds.len() - 1
                    }
                };

                let mask = 1u8 << bit;
                let floor = &mut facility.floors[floor_index];
                if is_chip {
                    floor.chips |= mask;
                } else {
                    floor.generators |= mask;
                }
            }
        }

        Ok(facility)
    }

    /// Number of distinct kinds present anywhere
    pub fn kinds(&self) -> usize {
        let all = self
            .floors
            .iter()
            .fold(0u8, |acc, f| acc | f.chips | f.generators);
        all.count_ones() as usize
    }

    /// Add `pairs` new chip/generator pairs on the ground floor
    pub fn with_extra_pairs(mut self, pairs: usize) -> Result<Self> {
        let used = self
            .floors
            .iter()
            .fold(0u8, |acc, f| acc | f.chips | f.generators);
        let free: Vec<u8> = (0..MAX_KINDS as u8)
            .map(|bit| 1u8 << bit)
            .filter(|mask| used & mask == 0)
            .collect();

        if pairs > free.len() {
            return Err(SearchError::TooLarge {
                what: "item kinds",
                found: self.kinds() + pairs,
                limit: MAX_KINDS,
            });
        }

        for &mask in &free[..pairs] {
            self.floors[0].add(Load {
                chips: mask,
                generators: mask,
            });
        }
        Ok(self)
    }

    /// Floors the elevator can reach next
    fn next_floors(&self) -> SmallVec<[u8; 2]> {
        let mut out = SmallVec::new();
        // Nothing below worth fetching
        let below_empty = self.floors[..self.elevator as usize]
            .iter()
            .all(Floor::is_empty);
        if self.elevator > 0 && !below_empty {
            out.push(self.elevator - 1);
        }
        if (self.elevator as usize) < FLOORS - 1 {
            out.push(self.elevator + 1);
        }
        out
    }

    fn moved(&self, target: u8, load: Load) -> Facility {
        let mut next = *self;
        next.floors[self.elevator as usize].remove(load);
        next.floors[target as usize].add(load);
        next.elevator = target;
        next
    }

    /// All items on the top floor
    pub fn is_done(&self) -> bool {
        self.floors[..FLOORS - 1].iter().all(Floor::is_empty)
    }

    /// Relabel kinds so that equivalent arrangements compare equal.
    ///
    /// Kinds are sorted by (chip floor, generator floor) and renumbered in
    /// that order; the result does not depend on the original labels.
    pub fn canonical(&self) -> Facility {
        let mut pairs: SmallVec<[(u8, u8); MAX_KINDS]> = SmallVec::new();
        for bit in 0..MAX_KINDS {
            let mask = 1u8 << bit;
            let chip = self.floors.iter().position(|f| f.chips & mask != 0);
            let generator = self.floors.iter().position(|f| f.generators & mask != 0);
            match (chip, generator) {
                (Some(c), Some(g)) => pairs.push((c as u8, g as u8)),
                (None, None) => {}
                // Unpaired items keep a sentinel floor for the missing half
                (c, g) => pairs.push((
                    c.map_or(u8::MAX, |c| c as u8),
                    g.map_or(u8::MAX, |g| g as u8),
                )),
            }
        }
        pairs.sort_unstable();

        let mut normal = Facility {
            elevator: self.elevator,
            ..Default::default()
        };
        for (label, &(chip, generator)) in pairs.iter().enumerate() {
            let mask = 1u8 << label;
            if let Some(floor) = normal.floors.get_mut(chip as usize) {
                floor.chips |= mask;
            }
            if let Some(floor) = normal.floors.get_mut(generator as usize) {
                floor.generators |= mask;
            }
        }
        normal
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, floor) in self.floors.iter().enumerate().rev() {
            let marker = if i == self.elevator as usize { 'E' } else { '.' };
            writeln!(
                f,
                "F{} {} C{:08b} G{:08b}",
                i + 1,
                marker,
                floor.chips,
                floor.generators
            )?;
        }
        Ok(())
    }
}

/// The relocation state space: move everything to the top floor
#[derive(Debug, Clone, Copy, Default)]
pub struct Relocation;

impl StateSpace for Relocation {
    type State = Facility;

    fn successors(&self, state: &Facility) -> Vec<(Facility, u32)> {
        let current = &state.floors[state.elevator as usize];
        let mut out = Vec::new();
        for target in state.next_floors() {
            for load in current.loads_to(&state.floors[target as usize]) {
                out.push((state.moved(target, load), 1));
            }
        }
        out
    }

    fn canonicalize(&self, state: &Facility) -> Facility {
        state.canonical()
    }

    fn is_goal(&self, state: &Facility) -> bool {
        state.is_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::{explore, ExplorerConfig};

    const SAMPLE: &str = "\
The first floor contains a hydrogen-compatible microchip and a lithium-compatible microchip.
The second floor contains a hydrogen generator.
The third floor contains a lithium generator.
The fourth floor contains nothing relevant.
";

    fn floor(chips: u8, generators: u8) -> Floor {
        Floor { chips, generators }
    }

    #[test]
    fn test_is_safe() {
        assert!(is_safe(1, 0));
        assert!(is_safe(0, 1));
        assert!(is_safe(1, 1));
        assert!(!is_safe(1, 2));
        assert!(!is_safe(2, 1));
        assert!(!is_safe(3, 1));
        assert!(is_safe(1, 3));
    }

    #[test]
    fn test_parse_sample() {
        let facility = Facility::parse(SAMPLE).unwrap();
        assert_eq!(facility.elevator, 0);
        assert_eq!(facility.floors[0], floor(0b11, 0));
        assert_eq!(facility.floors[1], floor(0, 0b01));
        assert_eq!(facility.floors[2], floor(0, 0b10));
        assert!(facility.floors[3].is_empty());
        assert_eq!(facility.kinds(), 2);
    }

    #[test]
    fn test_loads_two_pairs() {
        let loads = floor(3, 3).loads_to(&Floor::default());
        let mut got: Vec<(u8, u8)> = loads.iter().map(|l| (l.chips, l.generators)).collect();
        got.sort_unstable();
        let mut want = vec![(1, 0), (2, 0), (1, 1), (2, 2), (3, 0), (0, 3)];
        want.sort_unstable();
        assert_eq!(got, want);
    }

    #[test]
    fn test_loads_respect_target() {
        // A lone chip cannot join two foreign generators
        let loads = floor(1, 0).loads_to(&floor(0, 6));
        assert!(loads.is_empty());

        let loads = floor(1, 0).loads_to(&floor(0, 3));
        assert_eq!(loads.as_slice(), &[Load::chip(1)]);
    }

    #[test]
    fn test_sample_takes_eleven_steps() {
        let facility = Facility::parse(SAMPLE).unwrap();
        let result = explore(&Relocation, facility, &ExplorerConfig::default());
        assert_eq!(result.steps, Some(11));
        assert!(result.goal.unwrap().is_done());
    }

    #[test]
    fn test_canonical_visits_fewer_states() {
        let facility = Facility::parse(SAMPLE).unwrap();
        let canonical = explore(&Relocation, facility, &ExplorerConfig::default());
        let raw = explore(
            &Relocation,
            facility,
            &ExplorerConfig {
                canonicalize: false,
                ..Default::default()
            },
        );
        assert_eq!(raw.steps, Some(11));
        assert!(canonical.states_seen < raw.states_seen);
    }

    #[test]
    fn test_canonical_relabels_by_pair_floors() {
        let s = Facility {
            elevator: 2,
            floors: [
                floor(1 << 4, 1 << 5),
                floor(1 << 6, 1 << 7),
                floor(1, 1),
                floor(1 << 5 | 1 << 7, 1 << 4 | 1 << 6),
            ],
        };
        let want = Facility {
            elevator: 2,
            floors: [floor(1, 8), floor(2, 16), floor(4, 4), floor(24, 3)],
        };
        assert_eq!(s.canonical(), want);
    }

    #[test]
    fn test_canonical_is_idempotent_and_label_blind() {
        let s = Facility {
            elevator: 1,
            floors: [
                floor(0b0101, 0b0001),
                floor(0b0010, 0b0110),
                floor(0, 0b1000),
                floor(0b1000, 0),
            ],
        };
        let once = s.canonical();
        assert_eq!(once.canonical(), once);

        // Swap every pair of labels and compare
        for a in 0..4u8 {
            for b in (a + 1)..4u8 {
                let swap = |mask: u8| {
                    let bit_a = (mask >> a) & 1;
                    let bit_b = (mask >> b) & 1;
                    let cleared = mask & !(1 << a) & !(1 << b);
                    cleared | bit_a << b | bit_b << a
                };
                let mut permuted = s;
                for f in permuted.floors.iter_mut() {
                    f.chips = swap(f.chips);
                    f.generators = swap(f.generators);
                }
                assert_eq!(permuted.canonical(), once, "swap {} <-> {}", a, b);
            }
        }
    }

    #[test]
    fn test_extra_pairs() {
        let facility = Facility::parse(SAMPLE).unwrap().with_extra_pairs(2).unwrap();
        assert_eq!(facility.kinds(), 4);
        assert_eq!(facility.floors[0], floor(0b1111, 0b1100));

        let full = facility.with_extra_pairs(4).unwrap();
        assert_eq!(full.kinds(), 8);
        assert!(full.with_extra_pairs(1).is_err());
    }

    #[test]
    fn test_elevator_does_not_descend_to_empty_floors() {
        let s = Facility {
            elevator: 1,
            floors: [Floor::default(), floor(1, 1), Floor::default(), Floor::default()],
        };
        assert!(Relocation.successors(&s).iter().all(|(next, _)| next.elevator == 2));
    }
}
