mod ledger_file;
mod report;
mod simulation;

use std::convert::Infallible;
use std::fs;
use std::io::{Write, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use spinwheel_core::{
    ConfigError, ConfigLoader, HistoryEntry, LedgerStore, PinnedSlots, SpinConfig, StateStore,
    WheelData, WheelEngine, WheelSession, tally_results, user_activity, window,
};

use ledger_file::JsonFileLedger;
use simulation::{FrameRecorder, run_simulation, run_spins};

/// The lunch list the wheel shipped with, embedded for zero-setup runs.
const BUNDLED_WHEEL: &str = include_str!("../assets/lunch_wheel.json");

#[derive(Debug, Parser)]
#[command(name = "spinwheel-tester", version)]
#[command(about = "Headless QA tooling for the spinwheel engine")]
struct Args {
    /// Path to a wheel data JSON file (defaults to the bundled lunch list)
    #[arg(long)]
    wheel: Option<PathBuf>,

    /// Path of the JSON outcome ledger
    #[arg(long, default_value = "ledger.json")]
    ledger: PathBuf,

    /// RNG seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run headless spins on a synthetic frame clock, recording outcomes
    Spin {
        /// Number of spins to run
        #[arg(long, default_value_t = 1)]
        count: usize,

        /// Milliseconds per synthetic frame
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,

        /// User identity recorded with each outcome
        #[arg(long, default_value = "tester")]
        user: String,
    },
    /// Seeded draw-frequency check against the configured weights
    Simulate {
        /// Number of draws to sample
        #[arg(long, default_value_t = 5000)]
        samples: usize,

        /// Maximum tolerated |observed - expected| per option
        #[arg(long, default_value_t = 0.025)]
        tolerance: f64,

        /// Emit the report as JSON instead of a console table
        #[arg(long)]
        json: bool,
    },
    /// Summarize the outcome ledger
    Ledger {
        /// Trailing window for the recent-entries view, in days
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
}

/// Loads wheel data from a file, or the bundled lunch list when none is given.
struct FileConfigLoader {
    wheel_path: Option<PathBuf>,
}

impl ConfigLoader for FileConfigLoader {
    type Error = ConfigError;

    fn load_wheel_data(&self) -> Result<WheelData, Self::Error> {
        let raw = match &self.wheel_path {
            Some(path) => fs::read_to_string(path)
                .map_err(|e| ConfigError::Parse(serde_json::Error::io(e)))?,
            None => BUNDLED_WHEEL.to_string(),
        };
        WheelData::from_json(&raw)
    }

    fn load_spin_config(&self) -> Result<SpinConfig, Self::Error> {
        Ok(SpinConfig::default())
    }
}

/// The tester never persists edited models.
struct NullStateStore;

impl StateStore for NullStateStore {
    type Error = Infallible;

    fn save_model(&self, _pairs: &[(String, f64)]) -> Result<(), Self::Error> {
        Ok(())
    }

    fn load_model(&self) -> Result<Option<Vec<(String, f64)>>, Self::Error> {
        Ok(None)
    }

    fn clear_model(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("{}", "Spinwheel Tester".bright_cyan().bold());
    println!("seed: {seed}");

    match args.command {
        Command::Spin {
            count,
            frame_ms,
            user,
        } => run_spin_command(&args.wheel, &args.ledger, seed, count, frame_ms, user).await,
        Command::Simulate {
            samples,
            tolerance,
            json,
        } => run_simulate_command(&args.wheel, seed, samples, tolerance, json),
        Command::Ledger { days } => run_ledger_command(&args.ledger, days),
    }
}

fn build_session(wheel: &Option<PathBuf>, seed: u64) -> Result<WheelSession> {
    let loader = FileConfigLoader {
        wheel_path: wheel.clone(),
    };
    let data = loader.load_wheel_data()?;
    let pinned = detect_pins(&data);
    let engine = WheelEngine::new(loader, NullStateStore).with_pinned(pinned);
    engine.create_session(seed).context("building wheel session")
}

/// The original wheel pins Golden opposite Poison when both are present.
fn detect_pins(data: &WheelData) -> PinnedSlots {
    let has = |name: &str| data.items.iter().any(|item| item.name == name);
    PinnedSlots {
        top: has("Golden").then(|| "Golden".to_string()),
        bottom: has("Poison").then(|| "Poison".to_string()),
    }
}

async fn run_spin_command(
    wheel: &Option<PathBuf>,
    ledger_path: &PathBuf,
    seed: u64,
    count: usize,
    frame_ms: u64,
    user: String,
) -> Result<()> {
    let mut session = build_session(wheel, seed)?;
    let mut recorder = FrameRecorder::default();
    let runs = run_spins(&mut session, &mut recorder, count, frame_ms)?;
    log::debug!("rendered {} frames", recorder.frames);

    let mut out = stdout().lock();
    for (i, run) in runs.iter().enumerate() {
        writeln!(
            out,
            "{} spin {:>3}: {} ({} frames, rest at {:.3} rad)",
            "OK".green(),
            i + 1,
            run.winner.bold(),
            run.frames,
            run.final_rotation
        )?;
    }
    drop(out);

    // Persist off the async runtime so file IO never stalls a frame loop.
    let entries: Vec<HistoryEntry> = runs
        .iter()
        .map(|run| HistoryEntry::new(chrono::Utc::now().timestamp_millis(), &run.winner, &user))
        .collect();
    let path = ledger_path.clone();
    let writer = move || -> Result<usize, ledger_file::LedgerFileError> {
        let mut ledger = JsonFileLedger::new(path);
        for entry in &entries {
            ledger.append(entry)?;
        }
        Ok(entries.len())
    };
    let appended = tokio::task::spawn_blocking(writer)
        .await
        .context("ledger writer task panicked")??;

    println!("recorded {appended} outcome(s) in {}", ledger_path.display());
    Ok(())
}

fn run_simulate_command(
    wheel: &Option<PathBuf>,
    seed: u64,
    samples: usize,
    tolerance: f64,
    json: bool,
) -> Result<()> {
    let loader = FileConfigLoader {
        wheel_path: wheel.clone(),
    };
    let model = loader.load_wheel_data()?.into_model()?;
    let report = run_simulation(&model, seed, samples, tolerance);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report::write_frequency_table(&mut stdout().lock(), &report)?;
    }
    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_ledger_command(ledger_path: &PathBuf, days: i64) -> Result<()> {
    let ledger = JsonFileLedger::new(ledger_path.clone());
    let entries = ledger.read_all()?;
    if entries.is_empty() {
        println!("ledger {} is empty", ledger_path.display());
        return Ok(());
    }

    let mut out = stdout().lock();
    report::write_tallies(&mut out, &tally_results(&entries))?;
    writeln!(out)?;
    let now_ms = chrono::Utc::now().timestamp_millis();
    report::write_recent(&mut out, &window(&entries, now_ms, days), days)?;
    writeln!(out)?;
    report::write_activity(&mut out, &user_activity(&entries))?;
    Ok(())
}
