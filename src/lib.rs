//! Winners Board
//!
//! Turns an event leaderboard into the data behind a winners results page.
//!
//! This library provides:
//! - `leaderboard`: Parse the leaderboard table into `Team` records
//! - `progression`: Cumulative per-round rankings (top N per round)
//! - `selection`: Finalist and winner subsets
//! - `rounds`: The round schema shared by parsing and progression
//! - `pipeline`: File loading, text reports and CSV/JSON/XLSX exports
//!
//! Binaries:
//! - `winners`: Command-line front end over `pipeline`

pub mod leaderboard;
pub mod pipeline;
pub mod progression;
pub mod rounds;
pub mod selection;

pub use leaderboard::{parse_leaderboard, parse_leaderboard_with, Team};
pub use progression::{
    calculate_rank_progression, calculate_rank_progression_with, ProgressionConfig, RankedTeam,
    RoundProgression, TieBreak,
};
pub use rounds::RoundSchema;
pub use selection::{ResultsConfig, ResultsPage, SelectionConfig};
