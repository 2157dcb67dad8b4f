//! sweep-runner: periodic SLA escalation sweep for the complaint core.
//!
//! Usage:
//!   sweep-runner --db civic.db
//!   sweep-runner --db civic.db --dry-run --warning-threshold 4
//!   sweep-runner --db civic.db --seed-demo
//!
//! Intended to run from cron every hour. Exits 1 when any breached
//! complaint could not be escalated.

use anyhow::Result;
use civicroute_core::clock::SystemClock;
use civicroute_core::escalation::EscalationSweep;
use civicroute_core::notify::LogSink;
use civicroute_core::seed::seed_demo;
use civicroute_core::store::CivicStore;
use std::env;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let seed_directory = args.iter().any(|a| a == "--seed-demo");
    let warning_threshold = parse_arg(&args, "--warning-threshold", 2i64);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or("civic.db");

    println!("sweep-runner");
    println!("  db:                {db}");
    println!("  dry run:           {dry_run}");
    println!("  warning threshold: {warning_threshold}h");
    println!();

    let store = CivicStore::open(db)?;
    store.migrate()?;

    let clock = SystemClock;
    if seed_directory {
        seed_demo(&store, chrono::Utc::now())?;
        println!("demo directory seeded");
    }

    let sweep = EscalationSweep {
        dry_run,
        warning_threshold_hours: warning_threshold,
    };
    let report = sweep.run(&store, &clock, &LogSink)?;

    println!("=== SWEEP SUMMARY ===");
    println!("  scanned:   {}", report.scanned);
    println!("  escalated: {}", report.escalated);
    println!("  warned:    {}", report.warned);
    println!("  failures:  {}", report.failures);

    if report.failures > 0 {
        log::error!("{} complaint(s) breached SLA with no officer available", report.failures);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
