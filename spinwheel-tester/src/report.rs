//! Console report rendering for simulation and ledger output.

use std::io::Write;

use chrono::DateTime;
use colored::Colorize;
use spinwheel_core::{HistoryEntry, UserActivity, WinnerTally};

use crate::simulation::SimulationReport;

fn format_timestamp(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map_or_else(|| format!("@{timestamp_ms}ms"), |dt| {
            dt.format("%Y-%m-%d %H:%M:%S").to_string()
        })
}

/// Observed-vs-expected frequency table with a pass/fail verdict line.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_frequency_table<W: Write>(
    out: &mut W,
    report: &SimulationReport,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{:<20} {:>10} {:>10} {:>10} {:>8}",
        "Option", "Expected", "Observed", "Deviation", "Hits"
    )?;
    writeln!(out, "{}", "-".repeat(62))?;
    for row in &report.rows {
        let deviation = row.deviation();
        let line = format!(
            "{:<20} {:>10.4} {:>10.4} {:>10.4} {:>8}",
            row.name, row.expected, row.observed, deviation, row.hits
        );
        if deviation > report.tolerance {
            writeln!(out, "{}", line.red())?;
        } else {
            writeln!(out, "{line}")?;
        }
    }
    let verdict = if report.passed() {
        format!(
            "PASS: worst deviation {:.4} within tolerance {:.4} over {} samples",
            report.worst_deviation(),
            report.tolerance,
            report.samples
        )
        .green()
        .to_string()
    } else {
        format!(
            "FAIL: worst deviation {:.4} exceeds tolerance {:.4} over {} samples",
            report.worst_deviation(),
            report.tolerance,
            report.samples
        )
        .red()
        .bold()
        .to_string()
    };
    writeln!(out, "{verdict}")
}

/// Win counts per option, highest first.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_tallies<W: Write>(out: &mut W, tallies: &[WinnerTally]) -> std::io::Result<()> {
    writeln!(out, "{}", "Win tallies".bright_yellow().bold())?;
    for tally in tallies {
        writeln!(out, "  {:<24} {:>6}", tally.result, tally.wins)?;
    }
    Ok(())
}

/// The trailing window of entries, oldest first.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_recent<W: Write>(
    out: &mut W,
    entries: &[HistoryEntry],
    days: i64,
) -> std::io::Result<()> {
    writeln!(
        out,
        "{}",
        format!("Last {days} days ({} spins)", entries.len())
            .bright_yellow()
            .bold()
    )?;
    for entry in entries {
        writeln!(
            out,
            "  {}  {:<24} {}",
            format_timestamp(entry.timestamp_ms),
            entry.result,
            entry.user.cyan()
        )?;
    }
    Ok(())
}

/// Spin counts and last-seen times per user.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_activity<W: Write>(out: &mut W, activity: &[UserActivity]) -> std::io::Result<()> {
    writeln!(out, "{}", "User activity".bright_yellow().bold())?;
    for user in activity {
        writeln!(
            out,
            "  {:<16} {:>5} spins over {} day(s), last {}",
            user.user,
            user.spins,
            user.daily.len(),
            format_timestamp(user.last_spin_ms)
        )?;
    }
    Ok(())
}
