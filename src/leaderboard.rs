//! Leaderboard table parsing
//!
//! Converts the raw leaderboard text (comma-delimited, header on the first
//! line) into an ordered list of [`Team`] records.
//!
//! The first eight columns are read by position. Per-round score columns are
//! found by header label using the [`RoundSchema`], so events with a missing
//! round column still parse.

use crate::rounds::RoundSchema;
use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Declared rank from the first column (`None` if the cell is not a number)
    pub rank: Option<u32>,
    pub team_id: String,
    pub team_name: String,
    pub leader_name: String,
    /// `NaN` if the cell is not a number
    pub final_score: f64,
    /// `NaN` if the cell is not a number
    pub percentile: f64,
    /// `None` if the cell is not a number
    pub rounds_completed: Option<u32>,
    pub status: String,
    /// Sparse per-round scores keyed by round key ("round1", "round7", ...).
    /// Rounds without a header or with an empty cell are absent.
    pub round_scores: BTreeMap<String, f64>,
}

impl Team {
    /// Score for a round, 0 when the team has no entry for it.
    pub fn round_score(&self, key: &str) -> f64 {
        self.round_scores.get(key).copied().unwrap_or(0.0)
    }

    /// Names of the leading numeric fields whose cells could not be parsed.
    pub fn malformed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.rank.is_none() {
            fields.push("rank");
        }
        if self.final_score.is_nan() {
            fields.push("finalScore");
        }
        if self.percentile.is_nan() {
            fields.push("percentile");
        }
        if self.rounds_completed.is_none() {
            fields.push("roundsCompleted");
        }
        fields
    }

    pub fn is_well_formed(&self) -> bool {
        self.malformed_fields().is_empty()
    }
}

// ============================================================================
// Positional decoding
// ============================================================================

/// The fixed leading columns of a row, decoded by position (columns 0-7).
#[derive(Debug, Clone, PartialEq)]
pub struct LeadingFields {
    pub rank: Option<u32>,
    pub team_id: String,
    pub team_name: String,
    pub leader_name: String,
    pub final_score: f64,
    pub percentile: f64,
    pub rounds_completed: Option<u32>,
    pub status: String,
}

impl LeadingFields {
    pub fn decode(record: &StringRecord) -> Self {
        let cell = |i: usize| record.get(i).unwrap_or("");

        LeadingFields {
            rank: parse_leading_int(cell(0)),
            team_id: cell(1).to_string(),
            team_name: cell(2).to_string(),
            leader_name: cell(3).to_string(),
            final_score: parse_leading_float(cell(4)).unwrap_or(f64::NAN),
            percentile: parse_leading_float(cell(5)).unwrap_or(f64::NAN),
            rounds_completed: parse_leading_int(cell(6)),
            status: cell(7).to_string(),
        }
    }

    fn into_team(self, round_scores: BTreeMap<String, f64>) -> Team {
        Team {
            rank: self.rank,
            team_id: self.team_id,
            team_name: self.team_name,
            leader_name: self.leader_name,
            final_score: self.final_score,
            percentile: self.percentile,
            rounds_completed: self.rounds_completed,
            status: self.status,
            round_scores,
        }
    }
}

// ============================================================================
// Header-indexed round columns
// ============================================================================

/// Column index of every schema round present in the header row.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundColumns {
    /// (round key, column index), in schema order
    columns: Vec<(String, usize)>,
}

impl RoundColumns {
    pub fn from_headers(headers: &StringRecord, schema: &RoundSchema) -> Self {
        let mut columns = Vec::with_capacity(schema.len());
        for round in schema.rounds() {
            match headers.iter().position(|h| h == round.header) {
                Some(idx) => columns.push((round.key.clone(), idx)),
                None => log::debug!("Column '{}' not found, skipping round", round.header),
            }
        }
        RoundColumns { columns }
    }

    /// Index of the column holding a round, if the header had it.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, idx)| *idx)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Read the round scores of one row. Empty or missing cells are left out;
    /// unparsable cells count as 0.
    pub fn scores(&self, record: &StringRecord) -> BTreeMap<String, f64> {
        let mut scores = BTreeMap::new();
        for (key, idx) in &self.columns {
            let cell = match record.get(*idx) {
                Some(c) if !c.is_empty() => c,
                _ => continue,
            };
            let score = parse_leading_float(cell)
                .filter(|v| !v.is_nan())
                .unwrap_or(0.0);
            scores.insert(key.clone(), score);
        }
        scores
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse leaderboard text using the standard round schema.
pub fn parse_leaderboard(text: &str) -> Vec<Team> {
    parse_leaderboard_with(text, &RoundSchema::standard())
}

/// Parse leaderboard text with a custom round schema.
///
/// Never fails: empty or header-only input gives an empty list, and rows the
/// reader cannot decode are logged and skipped.
pub fn parse_leaderboard_with(text: &str, schema: &RoundSchema) -> Vec<Team> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    // No quoting: a comma inside a field shifts the rest of that row.
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            log::warn!("Failed to read leaderboard header: {}", e);
            return Vec::new();
        }
    };
    let round_columns = RoundColumns::from_headers(&headers, schema);

    let mut teams = Vec::new();
    for (row_num, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Row {}: skipping unreadable row: {}", row_num + 1, e);
                continue;
            }
        };

        let team = LeadingFields::decode(&record).into_team(round_columns.scores(&record));
        let malformed = team.malformed_fields();
        if !malformed.is_empty() {
            log::warn!(
                "Row {} ({}): unparsable {}",
                row_num + 1,
                team.team_id,
                malformed.join(", ")
            );
        }
        teams.push(team);
    }

    teams
}

// ============================================================================
// Numeric coercion
// ============================================================================

/// Parse the leading decimal number of a cell ("12.5pts" -> 12.5).
/// Leading whitespace is ignored; anything without a numeric prefix is `None`.
pub fn parse_leading_float(s: &str) -> Option<f64> {
    lazy_static::lazy_static! {
        static ref FLOAT_PREFIX: Regex =
            Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap();
    }

    let m = FLOAT_PREFIX.find(s.trim_start())?;
    m.as_str().parse().ok()
}

/// Parse the leading unsigned integer of a cell ("5.0" -> 5).
pub fn parse_leading_int(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}
