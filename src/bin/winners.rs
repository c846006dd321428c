//! Winners CLI - Leaderboard results from the command line
//!
//! Loads a leaderboard CSV and prints the finalists, winners and
//! round-by-round rank progression, or exports them to CSV, JSON or an
//! Excel workbook.
//!
//! Usage: cargo run --bin winners -- progression -i leaderboard.csv

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use winners_board::pipeline::{
    format_finalists, format_progression, format_teams_table, format_winners, load_results,
    package_workbook, to_json, write_progression_csv, WorkbookConfig,
};
use winners_board::{ProgressionConfig, ResultsConfig, RoundSchema, SelectionConfig, TieBreak};

#[derive(Parser)]
#[command(name = "winners")]
#[command(about = "Derive finalists, winners and rank progression from an event leaderboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every team in leaderboard order
    Teams {
        #[command(flatten)]
        results: ResultsArgs,
    },

    /// Print the finalists
    Finalists {
        #[command(flatten)]
        results: ResultsArgs,
    },

    /// Print the podium
    Winners {
        #[command(flatten)]
        results: ResultsArgs,
    },

    /// Print cumulative rankings round by round
    Progression {
        #[command(flatten)]
        results: ResultsArgs,

        /// Also write the rankings to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Width of the score bars in characters
        #[arg(long, default_value = "30")]
        bar_width: usize,
    },

    /// Print the full results page as JSON
    Json {
        #[command(flatten)]
        results: ResultsArgs,
    },

    /// Package the results into an Excel workbook
    Package {
        #[command(flatten)]
        results: ResultsArgs,

        /// Output xlsx file
        #[arg(short, long)]
        output: PathBuf,

        /// Event name for the Summary sheet
        #[arg(long, default_value = "Event Results")]
        event_name: String,
    },
}

/// Input file and results settings shared by all subcommands
#[derive(Args, Debug)]
struct ResultsArgs {
    /// Leaderboard CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Comma-separated round numbers in the event
    #[arg(long, env = "WINNERS_ROUNDS", default_value = "1,2,3,4,5,7,8,9,10")]
    rounds: String,

    /// Teams shown per round in the progression
    #[arg(long, env = "WINNERS_TOP_N", default_value = "5")]
    top_n: usize,

    /// How to order teams with equal cumulative scores
    #[arg(long, value_enum, default_value = "input-order")]
    tie_break: TieBreakArg,

    /// Status a team needs to be a finalist
    #[arg(long, default_value = "ACTIVE")]
    finalist_status: String,

    /// Maximum number of finalists
    #[arg(long, default_value = "6")]
    finalists: usize,

    /// Number of winners
    #[arg(long, default_value = "3")]
    winners: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TieBreakArg {
    InputOrder,
    TeamId,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::InputOrder => TieBreak::InputOrder,
            TieBreakArg::TeamId => TieBreak::TeamId,
        }
    }
}

impl ResultsArgs {
    fn to_config(&self) -> Result<ResultsConfig> {
        Ok(ResultsConfig {
            schema: RoundSchema::parse_list(&self.rounds)?,
            progression: ProgressionConfig::default()
                .with_top_n(self.top_n)
                .with_tie_break(self.tie_break.into()),
            selection: SelectionConfig {
                finalist_status: self.finalist_status.clone(),
                finalist_count: self.finalists,
                winner_count: self.winners,
            },
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Teams { results } => {
            let page = load_results(&results.input, &results.to_config()?)?;
            print!("{}", format_teams_table(&page.teams)?);
        }
        Commands::Finalists { results } => {
            let page = load_results(&results.input, &results.to_config()?)?;
            print!("{}", format_finalists(&page)?);
        }
        Commands::Winners { results } => {
            let page = load_results(&results.input, &results.to_config()?)?;
            print!("{}", format_winners(&page)?);
        }
        Commands::Progression {
            results,
            output,
            bar_width,
        } => {
            let page = load_results(&results.input, &results.to_config()?)?;
            print!("{}", format_progression(&page.progression, bar_width)?);
            if let Some(path) = output {
                let rows = write_progression_csv(&page.progression, &path)?;
                eprintln!("\nWrote {} rows to: {}", rows, path.display());
            }
        }
        Commands::Json { results } => {
            let page = load_results(&results.input, &results.to_config()?)?;
            println!("{}", to_json(&page)?);
        }
        Commands::Package {
            results,
            output,
            event_name,
        } => {
            let page = load_results(&results.input, &results.to_config()?)?;
            let summary = package_workbook(
                &WorkbookConfig {
                    input: results.input.clone(),
                    output,
                    event_name,
                },
                &page,
            )?;
            eprintln!("{}", summary);
        }
    }

    Ok(())
}
