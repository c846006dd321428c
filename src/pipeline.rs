//! Pipeline functions for programmatic use by the CLI.
//!
//! Loads a leaderboard file, renders the derived views as text, and exports
//! them to CSV, JSON or an Excel workbook. Report functions return strings
//! instead of printing to stdout.

use crate::leaderboard::{parse_leaderboard_with, Team};
use crate::progression::RoundProgression;
use crate::rounds::RoundSchema;
use crate::selection::{podium_team, ResultsConfig, ResultsPage};
use anyhow::{bail, Context, Result};
use std::fmt::Write;
use std::path::{Path, PathBuf};

// ============================================================================
// Loading
// ============================================================================

/// Read and parse a leaderboard file.
pub fn load_leaderboard(path: &Path, schema: &RoundSchema) -> Result<Vec<Team>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read leaderboard {}", path.display()))?;
    if text.trim().is_empty() {
        bail!("Leaderboard {} is empty", path.display());
    }

    let teams = parse_leaderboard_with(&text, schema);
    let malformed = teams.iter().filter(|t| !t.is_well_formed()).count();
    log::info!(
        "Loaded {} teams from {} ({} with unparsable fields)",
        teams.len(),
        path.display(),
        malformed
    );
    Ok(teams)
}

/// Load a leaderboard file and derive all results page views.
pub fn load_results(path: &Path, config: &ResultsConfig) -> Result<ResultsPage> {
    let teams = load_leaderboard(path, &config.schema)?;
    Ok(ResultsPage::from_teams(teams, config))
}

// ============================================================================
// Text reports
// ============================================================================

/// Fixed-width table of every team in leaderboard order.
pub fn format_teams_table(teams: &[Team]) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "\n{:=^96}", " Leaderboard ")?;
    writeln!(
        out,
        "\n{:>4} {:<10} {:<24} {:<18} {:>8} {:>7} {:>6} {:<12}",
        "Rank", "Team ID", "Team", "Leader", "Final", "Pct", "Rounds", "Status"
    )?;
    writeln!(out, "{:-<96}", "")?;

    for team in teams {
        writeln!(
            out,
            "{:>4} {:<10} {:<24} {:<18} {:>8} {:>7} {:>6} {:<12}",
            fmt_count(team.rank),
            truncate_name(&team.team_id, 10),
            truncate_name(&team.team_name, 24),
            truncate_name(&team.leader_name, 18),
            fmt_score(team.final_score),
            fmt_score(team.percentile),
            fmt_count(team.rounds_completed),
            truncate_name(&team.status, 12)
        )?;
    }

    writeln!(out, "{:-<96}", "")?;
    writeln!(out, "{} teams", teams.len())?;
    Ok(out)
}

/// Finalists list.
pub fn format_finalists(page: &ResultsPage) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "\n{:=^60}", " Finalists ")?;
    if page.finalists.is_empty() {
        writeln!(out, "(no finalists)")?;
        return Ok(out);
    }
    for (i, team) in page.finalists.iter().enumerate() {
        writeln!(
            out,
            "  Finalist #{:<2} {:<24} led by {}",
            i + 1,
            truncate_name(&team.team_name, 24),
            team.leader_name
        )?;
    }
    Ok(out)
}

/// Podium of winners, first place first. Winners are matched to podium
/// positions by their declared rank.
pub fn format_winners(page: &ResultsPage) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "\n{:=^60}", " Winners ")?;
    if page.winners.is_empty() {
        writeln!(out, "(no winners)")?;
        return Ok(out);
    }

    let winners: Vec<&Team> = page.winners.iter().collect();
    for position in 1..=winners.len() as u32 {
        match podium_team(&winners, position) {
            Some(team) => writeln!(
                out,
                "  {:<4} {:<24} {:>8}  led by {}",
                ordinal(position),
                truncate_name(&team.team_name, 24),
                fmt_score(team.final_score),
                team.leader_name
            )?,
            None => writeln!(out, "  {:<4} (no team with rank {})", ordinal(position), position)?,
        }
    }
    Ok(out)
}

/// Round-by-round rankings with a bar scaled to the round leader.
pub fn format_progression(progression: &[RoundProgression], bar_width: usize) -> Result<String> {
    let mut out = String::new();

    for round in progression {
        writeln!(out, "\n{:=^60}", format!(" {} ", round.round))?;
        if round.rankings.is_empty() {
            writeln!(out, "  (no teams)")?;
            continue;
        }
        for team in &round.rankings {
            let filled = (round.bar_percent(team) / 100.0 * bar_width as f64).round() as usize;
            writeln!(
                out,
                "  {:>2}. {:<24} {:>8.1} {}",
                team.rank,
                truncate_name(&team.team_name, 24),
                team.score,
                "#".repeat(filled.min(bar_width))
            )?;
        }
    }
    Ok(out)
}

// ============================================================================
// Exports
// ============================================================================

/// Write one CSV row per ranked team per round. Returns the number of data rows.
pub fn write_progression_csv(progression: &[RoundProgression], output: &Path) -> Result<usize> {
    let mut writer = csv::Writer::from_path(output).context("Failed to create output CSV")?;
    writer.write_record(["Round", "Rank", "Team ID", "Team Name", "Score"])?;

    let mut rows = 0;
    for round in progression {
        for team in &round.rankings {
            writer.write_record([
                round.round.as_str(),
                &team.rank.to_string(),
                &team.team_id,
                &team.team_name,
                &format!("{:.2}", team.score),
            ])?;
            rows += 1;
        }
    }

    writer.flush()?;
    log::info!("Wrote {} progression rows to {}", rows, output.display());
    Ok(rows)
}

/// Pretty-printed JSON of the full results page.
pub fn to_json(page: &ResultsPage) -> Result<String> {
    serde_json::to_string_pretty(page).context("Failed to serialize results")
}

/// Configuration for the package workbook command.
pub struct WorkbookConfig {
    /// Leaderboard file the results came from (shown in Summary)
    pub input: PathBuf,
    /// Output xlsx path
    pub output: PathBuf,
    /// Event name for the Summary title
    pub event_name: String,
}

/// Create an Excel workbook with Summary, Teams, Finalists, Winners and
/// Progression sheets. Returns a summary string on success.
pub fn package_workbook(config: &WorkbookConfig, page: &ResultsPage) -> Result<String> {
    use rust_xlsxwriter::{Format, Formula, Workbook};

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let header_fmt = Format::new().set_bold();
    let title_fmt = Format::new().set_bold().set_font_size(14);
    let score_fmt = Format::new().set_num_format("0.00");

    // ---------------------------------------------------------------
    // Summary sheet (first tab)
    // ---------------------------------------------------------------
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;

        let mut row = 0;
        sheet.write_string_with_format(row, 0, &config.event_name, &title_fmt)?;
        row += 2;

        let source = config
            .input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("(unknown)")
            .to_string();
        sheet.write_string_with_format(row, 0, "Leaderboard", &bold)?;
        sheet.write_string(row, 1, source)?;
        row += 1;

        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        sheet.write_string_with_format(row, 0, "Package Date", &bold)?;
        sheet.write_string(row, 1, now)?;
        row += 2;

        // Formulas so counts stay live if sheets are edited
        sheet.write_string_with_format(row, 0, "Number of Teams", &bold)?;
        sheet.write_formula(row, 1, Formula::new("COUNTA(Teams!B:B)-1"))?;
        row += 1;
        sheet.write_string_with_format(row, 0, "Number of Finalists", &bold)?;
        sheet.write_formula(row, 1, Formula::new("COUNTA(Finalists!B:B)-1"))?;
        row += 1;
        sheet.write_string_with_format(row, 0, "Rounds", &bold)?;
        sheet.write_number(row, 1, page.progression.len() as f64)?;

        sheet.set_column_width(0, 22)?;
        sheet.set_column_width(1, 28)?;
    }

    // ---------------------------------------------------------------
    // Teams, Finalists and Winners sheets share one layout
    // ---------------------------------------------------------------
    for (name, teams) in [
        ("Teams", &page.teams),
        ("Finalists", &page.finalists),
        ("Winners", &page.winners),
    ] {
        let round_keys: Vec<String> = rounds_in(teams);

        let sheet = workbook.add_worksheet();
        sheet.set_name(name)?;

        let headers = [
            "Rank", "Team ID", "Team Name", "Leader", "Final Score", "Percentile", "Rounds",
            "Status",
        ];
        for (col, h) in headers.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *h, &header_fmt)?;
        }
        let first_round_col = headers.len() as u16;
        for (i, key) in round_keys.iter().enumerate() {
            let label = key.replace("round", "Round ");
            sheet.write_string_with_format(0, first_round_col + i as u16, label, &header_fmt)?;
        }

        for (i, team) in teams.iter().enumerate() {
            let row = (i + 1) as u32;
            if let Some(rank) = team.rank {
                sheet.write_number(row, 0, rank)?;
            }
            sheet.write_string(row, 1, &team.team_id)?;
            sheet.write_string(row, 2, &team.team_name)?;
            sheet.write_string(row, 3, &team.leader_name)?;
            // Unparsable cells stay blank
            if !team.final_score.is_nan() {
                sheet.write_number_with_format(row, 4, team.final_score, &score_fmt)?;
            }
            if !team.percentile.is_nan() {
                sheet.write_number_with_format(row, 5, team.percentile, &score_fmt)?;
            }
            if let Some(rounds) = team.rounds_completed {
                sheet.write_number(row, 6, rounds)?;
            }
            sheet.write_string(row, 7, &team.status)?;
            for (j, key) in round_keys.iter().enumerate() {
                if let Some(score) = team.round_scores.get(key) {
                    sheet.write_number_with_format(
                        row,
                        first_round_col + j as u16,
                        *score,
                        &score_fmt,
                    )?;
                }
            }
        }

        sheet.set_freeze_panes(1, 0)?;
        sheet.set_column_width(2, 24)?;
        sheet.set_column_width(3, 18)?;
        if !teams.is_empty() {
            let last_col = first_round_col + round_keys.len() as u16 - 1;
            sheet.autofilter(0, 0, teams.len() as u32, last_col)?;
        }
    }

    // ---------------------------------------------------------------
    // Progression sheet
    // ---------------------------------------------------------------
    let mut progression_rows = 0u32;
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Progression")?;

        for (col, h) in ["Round", "Rank", "Team ID", "Team Name", "Score", "Bar %"]
            .iter()
            .enumerate()
        {
            sheet.write_string_with_format(0, col as u16, *h, &header_fmt)?;
        }

        for round in &page.progression {
            for team in &round.rankings {
                progression_rows += 1;
                let row = progression_rows;
                sheet.write_string(row, 0, &round.round)?;
                sheet.write_number(row, 1, team.rank as f64)?;
                sheet.write_string(row, 2, &team.team_id)?;
                sheet.write_string(row, 3, &team.team_name)?;
                sheet.write_number_with_format(row, 4, team.score, &score_fmt)?;
                sheet.write_number_with_format(row, 5, round.bar_percent(team), &score_fmt)?;
            }
        }

        sheet.set_freeze_panes(1, 0)?;
        sheet.set_column_width(3, 24)?;
    }

    workbook
        .save(&config.output)
        .with_context(|| format!("Failed to save workbook {}", config.output.display()))?;

    Ok(format!(
        "Wrote {} ({} teams, {} finalists, {} winners, {} progression rows)",
        config.output.display(),
        page.teams.len(),
        page.finalists.len(),
        page.winners.len(),
        progression_rows
    ))
}

// ============================================================================
// Internal Helpers
// ============================================================================

/// Round keys present on any of the teams, in round-number order.
fn rounds_in(teams: &[Team]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for team in teams {
        for key in team.round_scores.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    keys.sort_by_key(|k| {
        k.trim_start_matches("round")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });
    keys
}

fn ordinal(position: u32) -> String {
    let suffix = match (position % 10, position % 100) {
        (1, n) if n != 11 => "st",
        (2, n) if n != 12 => "nd",
        (3, n) if n != 13 => "rd",
        _ => "th",
    };
    format!("{}{}", position, suffix)
}

fn fmt_count(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn fmt_score(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{:.1}", value)
    }
}

/// Truncate a name to fit in a column.
fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else {
        let kept: String = name.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Alpha", 10), "Alpha");
        assert_eq!(truncate_name("Interstellar Voyagers", 10), "Interst...");
        assert_eq!(truncate_name("Équipe Étoile", 8), "Équip...");
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(22), "22nd");
    }

    #[test]
    fn test_fmt_helpers() {
        assert_eq!(fmt_score(f64::NAN), "-");
        assert_eq!(fmt_score(95.04), "95.0");
        assert_eq!(fmt_count(None), "-");
        assert_eq!(fmt_count(Some(7)), "7");
    }

    #[test]
    fn test_rounds_in_sorts_numerically() {
        let text = "Rank,Team ID,Team Name,Leader,Final,Pct,Rounds,Status,Round 10 Score,Round 2 Score\n\
                    1,T1,Alpha,Lee,95,99,5,ACTIVE,4,5\n";
        let teams = parse_leaderboard_with(text, &RoundSchema::standard());
        assert_eq!(rounds_in(&teams), vec!["round2", "round10"]);
    }

    #[test]
    fn test_format_progression_bars() {
        let text = "Rank,Team ID,Team Name,Leader,Final,Pct,Rounds,Status,Round 1 Score\n\
                    1,T1,Alpha,Lee,95,99,5,ACTIVE,10\n\
                    2,T2,Beta,Kim,80,85,5,ACTIVE,5\n";
        let page = ResultsPage::build(text, &ResultsConfig::default());
        let report = format_progression(&page.progression[..1], 10).unwrap();
        assert!(report.contains(" Round 1 "));
        assert!(report.contains("##########"));
        assert!(report.lines().any(|l| l.contains("Beta") && l.ends_with(" #####")));
    }
}
