use anyhow::Result;
use clap::Parser;
use flappy_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use flappy_autopilot::config::{SessionLimits, DEFAULT_PILOT};
use flappy_autopilot::runner::write_json;
use flappy_autopilot::util::{parse_seed, parse_seed_csv, seed_sequence};
use std::path::PathBuf;

const DEFAULT_SEED_START: u32 = 0xF1A9_0001;

#[derive(Parser, Debug)]
#[command(name = "flappy-benchmark")]
#[command(about = "Runs independent training sessions across seeds in parallel")]
struct Cli {
    /// Comma-separated seeds; overrides --seed-start/--seed-count
    #[arg(long)]
    seeds: Option<String>,
    #[arg(long)]
    seed_start: Option<String>,
    #[arg(long, default_value_t = 8)]
    seed_count: u32,
    #[arg(long, default_value_t = 50)]
    population: usize,
    #[arg(long, default_value = DEFAULT_PILOT)]
    pilot: String,
    /// Runs per session (env FLAPPY_MAX_RUNS)
    #[arg(long)]
    max_runs: Option<u32>,
    /// Ticks per session (env FLAPPY_MAX_TICKS)
    #[arg(long)]
    max_ticks: Option<u64>,
    #[arg(long)]
    no_sync: bool,
    #[arg(long)]
    jobs: Option<usize>,
    /// Write the full report as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    flappy_autopilot::init_tracing();
    let cli = Cli::parse();

    let seeds = match (cli.seeds.as_deref(), cli.seed_start.as_deref()) {
        (Some(csv), _) => parse_seed_csv(csv)?,
        (None, Some(start)) => seed_sequence(parse_seed(start)?, cli.seed_count),
        (None, None) => seed_sequence(DEFAULT_SEED_START, cli.seed_count),
    };

    let report = run_benchmark(BenchmarkConfig {
        pilot: cli.pilot,
        seeds,
        population: cli.population,
        limits: SessionLimits::resolve(cli.max_runs, cli.max_ticks),
        sync_lineages: !cli.no_sync,
        jobs: cli.jobs,
    })?;

    println!("pilot={}", report.pilot);
    println!("sessions={}", report.run_count);
    println!(
        "jobs={}",
        report
            .jobs
            .map(|value| value.to_string())
            .unwrap_or_else(|| "auto".to_string())
    );
    println!("avg_best_score={:.2}", report.avg_best_score);
    println!("max_best_score={}", report.max_best_score);
    println!("scoring_rate={:.0}%", report.scoring_rate * 100.0);
    println!("top sessions:");
    for (idx, session) in report.sessions.iter().take(5).enumerate() {
        println!(
            "  {}. {} best={} runs={} ticks={} first_scoring_run={}",
            idx + 1,
            session.seed_hex,
            session.best_score,
            session.runs_completed,
            session.total_ticks,
            session
                .first_scoring_run
                .map(|run| run.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    if let Some(path) = cli.output.as_deref() {
        write_json(path, &report)?;
        println!("output={}", path.display());
    }

    Ok(())
}
