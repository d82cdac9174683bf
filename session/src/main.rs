//! Developer CLI for behavior sessions.
//!
//! Registers condition files against the JSON condition store and reports the
//! session gate (time window, hydration) for a config and trial log.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use session::core::conditions::{ConditionRegistry, ConditionSpec};
use session::exit_codes;
use session::io::condition_store::{ConditionStore, load_store, write_store};
use session::io::config::load_config;
use session::io::trial_log::{TrialLog, load_trial_log};
use session::logger::SessionLogger;
use session::logging;
use session::tracker::SessionTracker;

const DEFAULT_STORE: &str = ".session/conditions.json";
const DEFAULT_CONFIG: &str = ".session/config.toml";

#[derive(Parser)]
#[command(name = "session", version, about = "Behavior session state tools")]
struct Cli {
    /// Log debug output for this crate (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a JSON array of conditions and print their identifiers.
    Conditions {
        /// JSON file holding an array of condition objects.
        file: PathBuf,
        /// Condition store to register into.
        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,
    },
    /// Report whether the session may run now.
    Gate {
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        /// Trial log whose reward total is checked against the cap.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Evaluate at this time of day today (`HH:MM` or `HH:MM:SS`).
        #[arg(long, value_parser = parse_time_of_day)]
        at: Option<NaiveTime>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli.command) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(command: Command) -> Result<i32> {
    match command {
        Command::Conditions { file, store } => cmd_conditions(&file, &store),
        Command::Gate { config, log, at } => cmd_gate(&config, log.as_deref(), at),
    }
}

fn cmd_conditions(file: &Path, store_path: &Path) -> Result<i32> {
    let contents =
        fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let conditions: Vec<ConditionSpec> = serde_json::from_str(&contents)
        .with_context(|| format!("parse {} as an array of objects", file.display()))?;

    let request = ConditionRegistry::default()
        .make_conditions(conditions)
        .with_context(|| format!("invalid conditions in {}", file.display()))?;

    let mut store = load_store(store_path)?;
    let ids = store.register(request)?;
    write_store(store_path, &store)?;

    for id in ids {
        println!("{id}");
    }
    Ok(exit_codes::OK)
}

fn cmd_gate(config_path: &Path, log_path: Option<&Path>, at: Option<NaiveTime>) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let mut logger = TrialLog::new(cfg.setup);
    if let Some(path) = log_path {
        let saved = load_trial_log(path)?;
        logger.set_total_reward(saved.total_reward);
    }

    let tracker = SessionTracker::setup(logger, cfg.params);
    let now = evaluation_time(at);

    if tracker.is_sleep_time_at(now) {
        println!("sleep");
        return Ok(exit_codes::SLEEP);
    }
    if tracker.is_hydrated(None) {
        println!("hydrated");
        return Ok(exit_codes::HYDRATED);
    }
    println!("active");
    Ok(exit_codes::OK)
}

fn evaluation_time(at: Option<NaiveTime>) -> NaiveDateTime {
    let now = Local::now().naive_local();
    match at {
        Some(time) => now.date().and_time(time),
        None => now,
    }
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| format!("expected HH:MM or HH:MM:SS, got '{value}'"))
}
