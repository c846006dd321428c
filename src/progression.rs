//! Per-round rank progression
//!
//! For every round of the schema, ranks teams by their cumulative score
//! through that round and keeps the top N. This feeds the round-by-round
//! ranking chart.

use crate::leaderboard::Team;
use crate::rounds::RoundSchema;
use serde::Serialize;
use std::cmp::Ordering;

/// Default number of teams shown per round.
pub const DEFAULT_TOP_N: usize = 5;

/// How teams with equal cumulative scores are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Keep the leaderboard's input order (stable sort)
    #[default]
    InputOrder,
    /// Ascending team id, independent of input order
    TeamId,
}

/// Configuration for progression calculation
#[derive(Debug, Clone)]
pub struct ProgressionConfig {
    /// Number of teams kept per round
    pub top_n: usize,
    pub tie_break: TieBreak,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            tie_break: TieBreak::InputOrder,
        }
    }
}

impl ProgressionConfig {
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}

/// A team's standing within one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTeam {
    pub team_id: String,
    pub team_name: String,
    /// Cumulative score through this round
    pub score: f64,
    /// 1-based position within the round's rankings
    pub rank: usize,
}

/// Rankings after one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundProgression {
    /// Display label, e.g. "Round 7"
    pub round: String,
    pub rankings: Vec<RankedTeam>,
}

impl RoundProgression {
    /// Score of the round leader, if any team is ranked.
    pub fn leader_score(&self) -> Option<f64> {
        self.rankings.first().map(|t| t.score)
    }

    /// Bar length for a ranked team as a percentage of the leader's score.
    /// Returns 0 when the leader score is not positive.
    pub fn bar_percent(&self, team: &RankedTeam) -> f64 {
        match self.leader_score() {
            Some(max) if max > 0.0 => team.score / max * 100.0,
            _ => 0.0,
        }
    }
}

/// Index of the round shown after `current` when cycling through `len` rounds.
pub fn next_round_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (current + 1) % len
    }
}

/// Rank progression with the standard round schema and default settings.
pub fn calculate_rank_progression(teams: &[Team]) -> Vec<RoundProgression> {
    calculate_rank_progression_with(teams, &RoundSchema::standard(), &ProgressionConfig::default())
}

/// Rank progression over `schema`, one entry per round in schema order.
///
/// Teams without a score for a round contribute 0 for it. An empty team list
/// still yields one (empty) entry per round.
pub fn calculate_rank_progression_with(
    teams: &[Team],
    schema: &RoundSchema,
    config: &ProgressionConfig,
) -> Vec<RoundProgression> {
    let mut cumulative = vec![0.0_f64; teams.len()];
    let mut progression = Vec::with_capacity(schema.len());

    for round in schema.rounds() {
        for (total, team) in cumulative.iter_mut().zip(teams) {
            *total += team.round_score(&round.key);
        }

        let mut order: Vec<usize> = (0..teams.len()).collect();
        order.sort_by(|&a, &b| {
            let by_score = cumulative[b]
                .partial_cmp(&cumulative[a])
                .unwrap_or(Ordering::Equal);
            match config.tie_break {
                TieBreak::InputOrder => by_score,
                TieBreak::TeamId => by_score.then_with(|| teams[a].team_id.cmp(&teams[b].team_id)),
            }
        });

        let rankings = order
            .into_iter()
            .take(config.top_n)
            .enumerate()
            .map(|(pos, idx)| RankedTeam {
                team_id: teams[idx].team_id.clone(),
                team_name: teams[idx].team_name.clone(),
                score: cumulative[idx],
                rank: pos + 1,
            })
            .collect();

        progression.push(RoundProgression {
            round: round.label(),
            rankings,
        });
    }

    progression
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn team(id: &str, scores: &[(&str, f64)]) -> Team {
        Team {
            rank: Some(1),
            team_id: id.to_string(),
            team_name: format!("Team {}", id),
            leader_name: String::new(),
            final_score: 0.0,
            percentile: 0.0,
            rounds_completed: Some(scores.len() as u32),
            status: "ACTIVE".to_string(),
            round_scores: scores
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_cumulative_scores_and_ranks() {
        let teams = vec![
            team("T1", &[("round1", 10.0), ("round2", 20.0)]),
            team("T2", &[("round1", 30.0), ("round2", 5.0)]),
        ];
        let progression = calculate_rank_progression(&teams);

        let r1 = &progression[0];
        assert_eq!(r1.round, "Round 1");
        assert_eq!(r1.rankings[0].team_id, "T2");
        assert_eq!(r1.rankings[0].score, 30.0);
        assert_eq!(r1.rankings[0].rank, 1);
        assert_eq!(r1.rankings[1].team_id, "T1");
        assert_eq!(r1.rankings[1].score, 10.0);
        assert_eq!(r1.rankings[1].rank, 2);

        let r2 = &progression[1];
        assert_eq!(r2.round, "Round 2");
        assert_eq!(r2.rankings[0].team_id, "T2");
        assert_eq!(r2.rankings[0].score, 35.0);
        assert_eq!(r2.rankings[1].team_id, "T1");
        assert_eq!(r2.rankings[1].score, 30.0);

        // No later scores: totals carry forward unchanged
        let last = progression.last().unwrap();
        assert_eq!(last.round, "Round 10");
        assert_eq!(last.rankings[0].score, 35.0);
    }

    #[test]
    fn test_empty_teams_give_empty_rounds() {
        let progression = calculate_rank_progression(&[]);
        assert_eq!(progression.len(), 9);
        assert!(progression.iter().all(|r| r.rankings.is_empty()));
        assert_eq!(progression[0].leader_score(), None);
    }

    #[test]
    fn test_top_n_cap() {
        let teams: Vec<Team> = (0..8)
            .map(|i| team(&format!("T{}", i), &[("round1", i as f64)]))
            .collect();
        let progression = calculate_rank_progression(&teams);
        assert!(progression.iter().all(|r| r.rankings.len() == 5));
        assert_eq!(progression[0].rankings[0].team_id, "T7");
        assert_eq!(progression[0].rankings[4].team_id, "T3");

        let config = ProgressionConfig::default().with_top_n(3);
        let progression =
            calculate_rank_progression_with(&teams, &RoundSchema::standard(), &config);
        assert!(progression.iter().all(|r| r.rankings.len() == 3));
    }

    #[test]
    fn test_tie_break() {
        let teams = vec![
            team("B", &[("round1", 10.0)]),
            team("A", &[("round1", 10.0)]),
        ];
        let schema = RoundSchema::standard();

        let input_order =
            calculate_rank_progression_with(&teams, &schema, &ProgressionConfig::default());
        assert_eq!(input_order[0].rankings[0].team_id, "B");
        assert_eq!(input_order[0].rankings[1].team_id, "A");

        let by_id = calculate_rank_progression_with(
            &teams,
            &schema,
            &ProgressionConfig::default().with_tie_break(TieBreak::TeamId),
        );
        assert_eq!(by_id[0].rankings[0].team_id, "A");
        assert_eq!(by_id[0].rankings[1].team_id, "B");
        assert_eq!(by_id[0].rankings[1].rank, 2);
    }

    #[test]
    fn test_round_6_scores_ignored_by_standard_schema() {
        let teams = vec![team("T1", &[("round5", 1.0), ("round6", 100.0), ("round7", 2.0)])];
        let progression = calculate_rank_progression(&teams);
        let round7 = progression.iter().find(|r| r.round == "Round 7").unwrap();
        assert_eq!(round7.rankings[0].score, 3.0);
    }

    #[test]
    fn test_bar_percent() {
        let round = RoundProgression {
            round: "Round 1".to_string(),
            rankings: vec![
                RankedTeam {
                    team_id: "T1".to_string(),
                    team_name: "One".to_string(),
                    score: 40.0,
                    rank: 1,
                },
                RankedTeam {
                    team_id: "T2".to_string(),
                    team_name: "Two".to_string(),
                    score: 10.0,
                    rank: 2,
                },
            ],
        };
        assert_eq!(round.leader_score(), Some(40.0));
        assert_eq!(round.bar_percent(&round.rankings[0]), 100.0);
        assert_eq!(round.bar_percent(&round.rankings[1]), 25.0);

        let zero = RoundProgression {
            round: "Round 1".to_string(),
            rankings: vec![RankedTeam {
                score: 0.0,
                ..round.rankings[1].clone()
            }],
        };
        assert_eq!(zero.bar_percent(&zero.rankings[0]), 0.0);
    }

    #[test]
    fn test_next_round_index() {
        assert_eq!(next_round_index(0, 9), 1);
        assert_eq!(next_round_index(8, 9), 0);
        assert_eq!(next_round_index(3, 0), 0);
    }
}
