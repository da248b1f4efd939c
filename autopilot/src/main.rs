use anyhow::Result;
use clap::Parser;
use flappy_autopilot::config::{SessionConfig, SessionLimits, DEFAULT_PILOT, DEFAULT_SEED};
use flappy_autopilot::input::{InputSource, NoInput, ScriptedInput};
use flappy_autopilot::pilots::describe_pilots;
use flappy_autopilot::runner::{run_configured_session, write_json};
use flappy_autopilot::util::{parse_seed, seed_to_hex};
use flappy_core::clock::FixedStep;
use flappy_core::constants::DEFAULT_POPULATION;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flappy-autopilot")]
#[command(about = "Trains a population of hill-climbing birds on a deterministic pipe course")]
struct Cli {
    /// Number of lineages (one bird each)
    #[arg(default_value_t = DEFAULT_POPULATION)]
    population: usize,
    /// 1 adds a human bird driven by `ascend` events from the input script
    #[arg(default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    player: u8,
    /// Session seed (decimal or 0x-prefixed hex)
    #[arg(long)]
    seed: Option<String>,
    #[arg(long, default_value = DEFAULT_PILOT)]
    pilot: String,
    /// Stop after this many runs (env FLAPPY_MAX_RUNS)
    #[arg(long)]
    max_runs: Option<u32>,
    /// Stop after this many ticks (env FLAPPY_MAX_TICKS)
    #[arg(long)]
    max_ticks: Option<u64>,
    /// Scripted input events, one `<tick> <ascend|flap|pause|quit>` per line
    #[arg(long)]
    input_script: Option<PathBuf>,
    /// Keep lineages independent instead of copying the leader after each run
    #[arg(long)]
    no_sync: bool,
    /// Write the session report as JSON
    #[arg(long)]
    summary_out: Option<PathBuf>,
    /// List available pilots and exit
    #[arg(long)]
    list_pilots: bool,
}

fn main() -> Result<()> {
    flappy_autopilot::init_tracing();
    let cli = Cli::parse();

    if cli.list_pilots {
        for (id, description) in describe_pilots() {
            println!("{id:14} {description}");
        }
        return Ok(());
    }

    let seed = match cli.seed.as_deref() {
        Some(raw) => parse_seed(raw)?,
        None => DEFAULT_SEED,
    };
    let config = SessionConfig {
        population: cli.population,
        human_player: cli.player == 1,
        seed,
        pilot: cli.pilot,
        sync_lineages: !cli.no_sync,
        limits: SessionLimits::resolve(cli.max_runs, cli.max_ticks),
    };

    let mut input: Box<dyn InputSource> = match cli.input_script.as_deref() {
        Some(path) => Box::new(ScriptedInput::from_file(path)?),
        None => Box::new(NoInput),
    };
    let report = run_configured_session(&config, input.as_mut(), &mut FixedStep)?;

    println!("seed={}", seed_to_hex(report.seed));
    println!("pilot={}", report.pilot);
    println!("population={}", report.population);
    println!("runs={}", report.runs_completed);
    println!("ticks={}", report.total_ticks);
    println!("stop={}", report.stop.as_str());
    if let Some(run) = report.first_scoring_run {
        println!("first_scoring_run={run}");
    }
    if let Some(path) = cli.summary_out.as_deref() {
        write_json(path, &report)?;
        println!("summary={}", path.display());
    }
    println!("Game over! Highest score: {}", report.best_score);

    Ok(())
}
