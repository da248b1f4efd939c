use crate::config::{SessionConfig, SessionLimits, StopReason};
use crate::input::NoInput;
use crate::pilots::pilot_ids;
use crate::runner::run_configured_session;
use crate::util::seed_to_hex;
use anyhow::{anyhow, Context, Result};
use flappy_core::clock::FixedStep;
use flappy_core::pipe::DeathCause;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub pilot: String,
    pub seeds: Vec<u32>,
    pub population: usize,
    pub limits: SessionLimits,
    pub sync_lineages: bool,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRecord {
    pub seed: u32,
    pub seed_hex: String,
    pub stop: StopReason,
    pub runs_completed: u32,
    pub total_ticks: u64,
    pub best_score: u32,
    pub best_death: Option<DeathCause>,
    pub first_scoring_run: Option<u32>,
    /// Longest single run, in ticks.
    pub longest_run_ticks: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub pilot: String,
    pub population: usize,
    pub max_runs: Option<u32>,
    pub max_ticks: Option<u64>,
    pub sync_lineages: bool,
    pub jobs: Option<usize>,
    pub run_count: usize,
    pub avg_best_score: f64,
    pub max_best_score: u32,
    /// Fraction of sessions that scored at least once.
    pub scoring_rate: f64,
    pub avg_first_scoring_run: Option<f64>,
    pub sessions: Vec<SessionRecord>,
}

pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    if !pilot_ids().contains(&config.pilot.as_str()) {
        let available = pilot_ids().join(", ");
        return Err(anyhow!(
            "unknown pilot '{}'. available: {available}",
            config.pilot
        ));
    }
    if config.limits.max_runs.is_none() && config.limits.max_ticks.is_none() {
        return Err(anyhow!("benchmark requires --max-runs or --max-ticks"));
    }
    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }

    let run_one = |seed: &u32| -> Result<SessionRecord> {
        let session = SessionConfig {
            population: config.population,
            human_player: false,
            seed: *seed,
            pilot: config.pilot.clone(),
            sync_lineages: config.sync_lineages,
            limits: config.limits,
        };
        let report = run_configured_session(&session, &mut NoInput, &mut FixedStep)
            .with_context(|| format!("benchmark session failed for seed={seed:#x}"))?;
        Ok(SessionRecord {
            seed: *seed,
            seed_hex: seed_to_hex(*seed),
            stop: report.stop,
            runs_completed: report.runs_completed,
            total_ticks: report.total_ticks,
            best_score: report.best_score,
            best_death: report.best.as_ref().map(|record| record.death),
            first_scoring_run: report.first_scoring_run,
            longest_run_ticks: report
                .runs
                .iter()
                .map(|run| run.ticks)
                .max()
                .unwrap_or_default(),
        })
    };

    let results: Vec<Result<SessionRecord>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| config.seeds.par_iter().map(run_one).collect())
    } else {
        config.seeds.par_iter().map(run_one).collect()
    };

    let mut sessions = Vec::with_capacity(results.len());
    for result in results {
        sessions.push(result?);
    }
    sessions.sort_by(|a, b| {
        b.best_score
            .cmp(&a.best_score)
            .then_with(|| a.first_scoring_run.cmp(&b.first_scoring_run))
            .then_with(|| a.seed.cmp(&b.seed))
    });

    let run_count = sessions.len();
    let sum_best: u64 = sessions.iter().map(|s| s.best_score as u64).sum();
    let max_best_score = sessions
        .iter()
        .map(|s| s.best_score)
        .max()
        .unwrap_or_default();
    let first_scoring: Vec<u32> = sessions
        .iter()
        .filter_map(|s| s.first_scoring_run)
        .collect();
    let avg_first_scoring_run = (!first_scoring.is_empty()).then(|| {
        first_scoring.iter().map(|run| *run as f64).sum::<f64>() / first_scoring.len() as f64
    });

    Ok(BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        pilot: config.pilot,
        population: config.population,
        max_runs: config.limits.max_runs,
        max_ticks: config.limits.max_ticks,
        sync_lineages: config.sync_lineages,
        jobs: config.jobs,
        run_count,
        avg_best_score: sum_best as f64 / run_count as f64,
        max_best_score,
        scoring_rate: first_scoring.len() as f64 / run_count as f64,
        avg_first_scoring_run,
        sessions,
    })
}
