//! Life-like transition rules.
//!
//! A rule is written in birth/survival notation: `B3/S23` means a dead cell
//! with exactly 3 live neighbors is born, and a live cell with 2 or 3 live
//! neighbors survives. Every other cell is dead after the step.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Computes the next state of a single cell from its current state and the
/// number of live cells among its eight neighbors.
///
/// Implementations must be pure: the same inputs always give the same output.
pub trait TransitionRule: Sync {
    fn next_state(&self, alive: bool, live_neighbors: u8) -> bool;
}

/// A life-like rule stored as two bitmasks over neighbor counts `0..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rule {
    birth: u16,
    survive: u16,
}

const MAX_NEIGHBORS: u8 = 8;

impl Rule {
    /// Conway's Game of Life, `B3/S23`
    pub const CONWAY: Rule = Rule {
        birth: 1 << 3,
        survive: (1 << 2) | (1 << 3),
    };

    /// Build a rule from explicit neighbor counts
    pub fn new(birth: &[u8], survive: &[u8]) -> Result<Self> {
        Ok(Self {
            birth: mask_from_counts(birth)?,
            survive: mask_from_counts(survive)?,
        })
    }

    pub fn births_on(&self, count: u8) -> bool {
        count <= MAX_NEIGHBORS && self.birth & (1 << count) != 0
    }

    pub fn survives_on(&self, count: u8) -> bool {
        count <= MAX_NEIGHBORS && self.survive & (1 << count) != 0
    }

    pub fn birth_counts(&self) -> Vec<u8> {
        (0..=MAX_NEIGHBORS).filter(|&c| self.births_on(c)).collect()
    }

    pub fn survive_counts(&self) -> Vec<u8> {
        (0..=MAX_NEIGHBORS).filter(|&c| self.survives_on(c)).collect()
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::CONWAY
    }
}

impl TransitionRule for Rule {
    #[inline]
    fn next_state(&self, alive: bool, live_neighbors: u8) -> bool {
        if alive {
            self.survives_on(live_neighbors)
        } else {
            self.births_on(live_neighbors)
        }
    }
}

fn mask_from_counts(counts: &[u8]) -> Result<u16> {
    counts.iter().try_fold(0u16, |mask, &count| {
        if count > MAX_NEIGHBORS {
            Err(Error::InvalidRule(format!(
                "neighbor count {} exceeds {}",
                count, MAX_NEIGHBORS
            )))
        } else {
            Ok(mask | (1 << count))
        }
    })
}

fn parse_digits(part: &str) -> Result<u16> {
    let counts = part
        .chars()
        .map(|c| {
            c.to_digit(10)
                .map(|d| d as u8)
                .ok_or_else(|| Error::InvalidRule(format!("unexpected character '{}'", c)))
        })
        .collect::<Result<Vec<u8>>>()?;
    mask_from_counts(&counts)
}

impl FromStr for Rule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut birth = None;
        let mut survive = None;

        for part in s.trim().split('/') {
            let mut chars = part.chars();
            let slot = match chars.next().map(|c| c.to_ascii_uppercase()) {
                Some('B') => &mut birth,
                Some('S') => &mut survive,
                _ => {
                    return Err(Error::InvalidRule(format!(
                        "'{}': expected a part starting with B or S",
                        s
                    )))
                }
            };
            if slot.is_some() {
                return Err(Error::InvalidRule(format!("'{}': duplicate part", s)));
            }
            *slot = Some(parse_digits(chars.as_str())?);
        }

        match (birth, survive) {
            (Some(birth), Some(survive)) => Ok(Self { birth, survive }),
            _ => Err(Error::InvalidRule(format!(
                "'{}': both B and S parts are required",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Rule {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Rule> for String {
    fn from(rule: Rule) -> Self {
        rule.to_string()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |counts: Vec<u8>| counts.iter().map(|c| c.to_string()).collect::<String>();
        write!(
            f,
            "B{}/S{}",
            digits(self.birth_counts()),
            digits(self.survive_counts())
        )
    }
}
