//! Molecule calibration and reduction.
//!
//! Input is a list of `A => B` replacement rules, a blank line and a
//! molecule. Rules whose source is `e` only ever produce a whole molecule,
//! so in reverse they may only consume one.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{Result, SearchError};
use crate::explorer::StateSpace;
use crate::parallel::{self, ParallelConfig, ParallelOutcome};

/// The molecule everything is built from
pub const ELECTRON: &str = "e";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub from: String,
    pub to: String,
}

/// Replacement rules plus the target molecule
#[derive(Debug, Clone)]
pub struct Machine {
    rules: Vec<Rule>,
    molecule: String,
}

impl Machine {
    pub fn parse(text: &str) -> Result<Self> {
        let mut rules = Vec::new();
        let mut lines = text.lines().enumerate();

        for (index, line) in lines.by_ref() {
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            let Some((from, to)) = line.split_once(" => ") else {
                let message = format!("expected `A => B`, found {:?}", line);
                return Err(SearchError::parse(index + 1, message));
            };
            if from.is_empty() || to.is_empty() {
                return Err(SearchError::parse(index + 1, "empty side of a rule"));
            }
            rules.push(Rule {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let molecule = lines
            .map(|(_, line)| line.trim())
            .find(|line| !line.is_empty())
            .ok_or_else(|| SearchError::parse(rules.len() + 1, "missing molecule"))?;

        Ok(Self {
            rules,
            molecule: molecule.to_string(),
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn molecule(&self) -> &str {
        &self.molecule
    }

    /// Distinct molecules one forward replacement away from the target
    pub fn calibrate(&self) -> usize {
        let mut produced = FxHashSet::default();
        for rule in &self.rules {
            for at in occurrences(&self.molecule, &rule.from) {
                produced.insert(splice(&self.molecule, at, rule.from.len(), &rule.to));
            }
        }
        produced.len()
    }

    /// Fewest replacements that build the target from [`ELECTRON`]
    pub fn fabricate(&self, config: &ParallelConfig) -> ParallelOutcome<String> {
        debug!(rules = self.rules.len(), length = self.molecule.len(), "reducing molecule");
        parallel::explore(&Reduction { rules: &self.rules }, self.molecule.clone(), config)
    }
}

/// Reverse replacements from a molecule back towards [`ELECTRON`]
#[derive(Debug, Clone, Copy)]
pub struct Reduction<'r> {
    rules: &'r [Rule],
}

impl<'r> Reduction<'r> {
    pub fn new(rules: &'r [Rule]) -> Self {
        Self { rules }
    }
}

impl StateSpace for Reduction<'_> {
    type State = String;

    fn successors(&self, molecule: &String) -> Vec<(String, u32)> {
        let mut out = Vec::new();
        for rule in self.rules {
            if rule.from == ELECTRON {
                if *molecule == rule.to {
                    out.push((rule.from.clone(), 1));
                }
                continue;
            }
            for at in occurrences(molecule, &rule.to) {
                out.push((splice(molecule, at, rule.to.len(), &rule.from), 1));
            }
        }
        out
    }

    fn canonicalize(&self, molecule: &String) -> String {
        molecule.clone()
    }

    fn is_goal(&self, molecule: &String) -> bool {
        molecule == ELECTRON
    }

    // Shorter molecules are closer to done
    fn priority(&self, molecule: &String, _cost: u32) -> u32 {
        molecule.len() as u32
    }
}

/// Byte offsets of every occurrence of `needle`, overlapping ones included
fn occurrences<'a>(haystack: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    (0..haystack.len()).filter(move |&at| {
        haystack.is_char_boundary(at) && haystack[at..].starts_with(needle)
    })
}

fn splice(molecule: &str, at: usize, len: usize, with: &str) -> String {
    let mut out = String::with_capacity(molecule.len() - len + with.len());
    out.push_str(&molecule[..at]);
    out.push_str(with);
    out.push_str(&molecule[at + len..]);
    out
}
