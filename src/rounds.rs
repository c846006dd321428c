//! Round schema shared by the leaderboard parser and the progression calculator.
//!
//! The schema is the ordered list of scored rounds an event has. Both the
//! parser (which looks round columns up by header label) and the progression
//! calculator (which accumulates scores in round order) must agree on it, so
//! it lives here as a single value passed to both.

use anyhow::{bail, Context, Result};
use regex::Regex;

/// Header labels of the standard event layout. Round 6 is not part of it.
pub const STANDARD_ROUND_HEADERS: [&str; 9] = [
    "Round 1 Score",
    "Round 2 Score",
    "Round 3 Score",
    "Round 4 Score",
    "Round 5 Score",
    "Round 7 Score",
    "Round 8 Score",
    "Round 9 Score",
    "Round 10 Score",
];

/// A single scored round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundColumn {
    /// Round ordinal as printed in the header (e.g. 7 for "Round 7 Score")
    pub number: u32,
    /// Key used in `Team::round_scores` (e.g. "round7")
    pub key: String,
    /// Header label the parser looks for (e.g. "Round 7 Score")
    pub header: String,
}

impl RoundColumn {
    pub fn new(number: u32) -> Self {
        RoundColumn {
            number,
            key: format!("round{}", number),
            header: format!("Round {} Score", number),
        }
    }

    /// Display label derived from the key: "round7" becomes "Round 7".
    pub fn label(&self) -> String {
        self.key.replace("round", "Round ")
    }
}

/// Ordered list of rounds for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSchema {
    rounds: Vec<RoundColumn>,
}

impl Default for RoundSchema {
    fn default() -> Self {
        Self::standard()
    }
}

impl RoundSchema {
    /// Rounds 1-5 and 7-10.
    pub fn standard() -> Self {
        Self::from_header_labels(&STANDARD_ROUND_HEADERS)
    }

    /// Build a schema from header labels, taking the round number from the
    /// `Round N` part of each label. Labels without a round number are skipped.
    pub fn from_header_labels(labels: &[&str]) -> Self {
        lazy_static::lazy_static! {
            static ref ROUND_NUMBER: Regex = Regex::new(r"Round (\d+)").unwrap();
        }

        let mut rounds = Vec::with_capacity(labels.len());
        for label in labels {
            let number = ROUND_NUMBER
                .captures(label)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok());

            match number {
                Some(n) => rounds.push(RoundColumn {
                    number: n,
                    key: format!("round{}", n),
                    header: (*label).to_string(),
                }),
                None => log::warn!("Ignoring round header without a round number: '{}'", label),
            }
        }

        RoundSchema { rounds }
    }

    pub fn from_numbers(numbers: &[u32]) -> Self {
        RoundSchema {
            rounds: numbers.iter().map(|&n| RoundColumn::new(n)).collect(),
        }
    }

    /// Parse a comma-separated round list such as "1,2,3,4,5,7,8,9,10".
    pub fn parse_list(list: &str) -> Result<Self> {
        let mut numbers: Vec<u32> = Vec::new();
        for part in list.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let n: u32 = part
                .parse()
                .with_context(|| format!("Invalid round number '{}'", part))?;
            if numbers.contains(&n) {
                bail!("Round {} listed more than once", n);
            }
            numbers.push(n);
        }

        if numbers.is_empty() {
            bail!("Round list is empty");
        }

        Ok(Self::from_numbers(&numbers))
    }

    pub fn rounds(&self) -> &[RoundColumn] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rounds.iter().map(|r| r.key.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rounds.iter().any(|r| r.key == key)
    }
}
