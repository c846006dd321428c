//! Finalist and winner selection, plus the combined results page data.

use crate::leaderboard::{parse_leaderboard_with, Team};
use crate::progression::{calculate_rank_progression_with, ProgressionConfig, RoundProgression};
use crate::rounds::RoundSchema;
use serde::Serialize;

/// Status value that marks a team as still in the running.
pub const ACTIVE_STATUS: &str = "ACTIVE";

/// Configuration for the finalist/winner subsets
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Status a team must have to be a finalist
    pub finalist_status: String,
    /// Maximum number of finalists
    pub finalist_count: usize,
    /// Number of winners, taken from the top of the leaderboard
    pub winner_count: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            finalist_status: ACTIVE_STATUS.to_string(),
            finalist_count: 6,
            winner_count: 3,
        }
    }
}

/// Teams with the finalist status, in leaderboard order, capped at `finalist_count`.
pub fn select_finalists<'a>(teams: &'a [Team], config: &SelectionConfig) -> Vec<&'a Team> {
    teams
        .iter()
        .filter(|t| t.status == config.finalist_status)
        .take(config.finalist_count)
        .collect()
}

/// The first `winner_count` teams in leaderboard order.
pub fn select_winners<'a>(teams: &'a [Team], config: &SelectionConfig) -> Vec<&'a Team> {
    teams.iter().take(config.winner_count).collect()
}

/// The winner whose declared rank is `position` (1 = first place).
pub fn podium_team<'a>(winners: &[&'a Team], position: u32) -> Option<&'a Team> {
    winners.iter().copied().find(|t| t.rank == Some(position))
}

/// Everything the results page needs
#[derive(Debug, Clone, Default)]
pub struct ResultsConfig {
    pub schema: RoundSchema,
    pub progression: ProgressionConfig,
    pub selection: SelectionConfig,
}

/// Derived data for one render of the results page.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsPage {
    pub teams: Vec<Team>,
    pub finalists: Vec<Team>,
    pub winners: Vec<Team>,
    pub progression: Vec<RoundProgression>,
}

impl ResultsPage {
    /// Parse leaderboard text and derive all views from it.
    pub fn build(text: &str, config: &ResultsConfig) -> Self {
        let teams = parse_leaderboard_with(text, &config.schema);
        Self::from_teams(teams, config)
    }

    pub fn from_teams(teams: Vec<Team>, config: &ResultsConfig) -> Self {
        let finalists = select_finalists(&teams, &config.selection)
            .into_iter()
            .cloned()
            .collect();
        let winners = select_winners(&teams, &config.selection)
            .into_iter()
            .cloned()
            .collect();
        let progression =
            calculate_rank_progression_with(&teams, &config.schema, &config.progression);

        ResultsPage {
            teams,
            finalists,
            winners,
            progression,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn team(rank: u32, id: &str, status: &str) -> Team {
        Team {
            rank: Some(rank),
            team_id: id.to_string(),
            team_name: id.to_string(),
            leader_name: String::new(),
            final_score: 0.0,
            percentile: 0.0,
            rounds_completed: Some(0),
            status: status.to_string(),
            round_scores: BTreeMap::new(),
        }
    }

    fn sample() -> Vec<Team> {
        vec![
            team(1, "A", "ACTIVE"),
            team(2, "B", "ELIMINATED"),
            team(3, "C", "ACTIVE"),
            team(4, "D", "ACTIVE"),
            team(5, "E", "active"),
            team(6, "F", "ACTIVE"),
            team(7, "G", "ACTIVE"),
            team(8, "H", "ACTIVE"),
            team(9, "I", "ACTIVE"),
        ]
    }

    #[test]
    fn test_finalists_filter_and_cap() {
        let teams = sample();
        let finalists = select_finalists(&teams, &SelectionConfig::default());
        let ids: Vec<&str> = finalists.iter().map(|t| t.team_id.as_str()).collect();
        // Status match is exact; "active" is not a finalist
        assert_eq!(ids, vec!["A", "C", "D", "F", "G", "H"]);
    }

    #[test]
    fn test_winners_by_input_order() {
        let teams = sample();
        let winners = select_winners(&teams, &SelectionConfig::default());
        let ids: Vec<&str> = winners.iter().map(|t| t.team_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);

        assert!(select_winners(&teams[..1], &SelectionConfig::default()).len() == 1);
    }

    #[test]
    fn test_podium_team() {
        let teams = vec![team(2, "B", "ACTIVE"), team(1, "A", "ACTIVE"), team(3, "C", "ACTIVE")];
        let winners = select_winners(&teams, &SelectionConfig::default());
        assert_eq!(podium_team(&winners, 1).map(|t| t.team_id.as_str()), Some("A"));
        assert_eq!(podium_team(&winners, 3).map(|t| t.team_id.as_str()), Some("C"));
        assert!(podium_team(&winners, 4).is_none());
    }

    #[test]
    fn test_results_page_build() {
        let text = "Rank,Team ID,Team Name,Leader,Final,Pct,Rounds,Status,Round 1 Score\n\
                    1,T1,Alpha,Lee,95,99,5,ACTIVE,10\n\
                    2,T2,Beta,Kim,80,85,5,ELIMINATED,30\n";
        let page = ResultsPage::build(text, &ResultsConfig::default());
        assert_eq!(page.teams.len(), 2);
        assert_eq!(page.finalists.len(), 1);
        assert_eq!(page.winners.len(), 2);
        assert_eq!(page.progression.len(), 9);
        assert_eq!(page.progression[0].rankings[0].team_id, "T2");
    }
}
