use anyhow::{anyhow, Context, Result};
use flappy_core::clock::TickClock;
use flappy_core::pipe::DeathCause;
use flappy_core::rng::lineage_seed;
use flappy_core::sim::{SimConfig, World};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::{SessionConfig, SessionLimits, StopReason};
use crate::input::{InputEvent, InputSource};
use crate::lineage::{Action, RunRecord};
use crate::pilots::{create_pilot, pilot_ids, Pilot};
use crate::util::seed_to_hex;

#[derive(Clone, Copy, Debug)]
pub struct TrainerOptions {
    /// Let lagging lineages adopt the leader's best run after each run.
    pub sync_lineages: bool,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        Self {
            sync_lineages: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathTally {
    pub head_on: u32,
    pub side: u32,
    pub off_screen: u32,
}

impl DeathTally {
    fn add(&mut self, cause: DeathCause) {
        match cause {
            DeathCause::HeadOn => self.head_on += 1,
            DeathCause::Side => self.side += 1,
            DeathCause::OffScreen => self.off_screen += 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// 1-based run number within the session.
    pub run: u32,
    pub ticks: u32,
    /// Pipes passed during the run.
    pub score: u32,
    /// Highest best score across lineages after this run.
    pub best_score: u32,
    pub deaths: DeathTally,
    pub human_death: Option<DeathCause>,
    /// Lineages that adopted the leader's best run.
    pub synced: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    Paused,
    RunEnded(RunSummary),
    Quit,
}

/// Couples a [`World`] with one pilot per lineage and runs the
/// play / compare / reset cycle.
pub struct Trainer {
    world: World,
    pilots: Vec<Box<dyn Pilot>>,
    options: TrainerOptions,
    runs_completed: u32,
    human_death: Option<DeathCause>,
}

impl Trainer {
    pub fn new(
        config: SimConfig,
        pilots: Vec<Box<dyn Pilot>>,
        options: TrainerOptions,
    ) -> Result<Self> {
        if pilots.len() != config.population {
            return Err(anyhow!(
                "got {} pilots for a population of {}",
                pilots.len(),
                config.population
            ));
        }
        let world = World::new(config).context("invalid simulation config")?;
        Ok(Self {
            world,
            pilots,
            options,
            runs_completed: 0,
            human_death: None,
        })
    }

    /// One pilot of kind `pilot_id` per lineage, each with its own seed.
    pub fn with_pilot(
        config: SimConfig,
        pilot_id: &str,
        seed: u32,
        options: TrainerOptions,
    ) -> Result<Self> {
        let pilots = (0..config.population)
            .map(|index| {
                create_pilot(pilot_id, lineage_seed(seed, index)).ok_or_else(|| {
                    let available = pilot_ids().join(", ");
                    anyhow!("unknown pilot '{pilot_id}'. available: {available}")
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(config, pilots, options)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn pilots(&self) -> &[Box<dyn Pilot>] {
        &self.pilots
    }

    #[inline]
    pub fn runs_completed(&self) -> u32 {
        self.runs_completed
    }

    /// Highest `best.score` across lineages.
    pub fn best_score(&self) -> u32 {
        self.pilots
            .iter()
            .map(|pilot| pilot.lineage().best().score)
            .max()
            .unwrap_or_default()
    }

    /// The best record of the leading lineage.
    pub fn leader_best(&self) -> Option<&RunRecord> {
        self.pilots
            .iter()
            .map(|pilot| pilot.lineage().best())
            .max_by(|a, b| a.cmp_rank(b))
    }

    pub fn tick(&mut self, events: &[InputEvent]) -> TickOutcome {
        for event in events {
            match event {
                InputEvent::Ascend => self.world.trigger_human_ascend(),
                InputEvent::TogglePause => {
                    self.world.toggle_pause();
                    tracing::debug!(paused = self.world.is_paused(), "pause toggled");
                }
                InputEvent::Quit => return TickOutcome::Quit,
            }
        }
        if self.world.is_paused() {
            return TickOutcome::Paused;
        }

        let report = self.world.step();
        for (index, cause) in &report.deaths {
            tracing::trace!(
                frame = report.frame,
                lineage = index,
                death = cause.as_str(),
                "lineage died"
            );
        }
        if let Some(cause) = report.human_death {
            tracing::debug!(frame = report.frame, death = cause.as_str(), "human bird died");
            self.human_death = Some(cause);
        }
        for index in &report.scored {
            if let Some(pilot) = self.pilots.get_mut(*index) {
                pilot.lineage_mut().record_score_tick();
            }
        }

        for (index, pilot) in self.pilots.iter_mut().enumerate() {
            let action = match self.world.flyer(index) {
                Some(flyer) if flyer.is_alive() => pilot.next_action(flyer.bird()),
                _ => continue,
            };
            if action == Action::Ascend {
                self.world.trigger_ascend(index);
            }
        }

        if self.world.all_dead() {
            TickOutcome::RunEnded(self.finish_run())
        } else {
            TickOutcome::Running
        }
    }

    fn finish_run(&mut self) -> RunSummary {
        let mut deaths = DeathTally::default();
        for (index, pilot) in self.pilots.iter_mut().enumerate() {
            let Some(flyer) = self.world.flyer(index) else {
                continue;
            };
            let death = flyer.death().unwrap_or(DeathCause::OffScreen);
            deaths.add(death);
            pilot.lineage_mut().end_run(flyer.score(), death);
        }

        let synced = if self.options.sync_lineages {
            sync_lineages(&mut self.pilots)
        } else {
            0
        };

        self.runs_completed += 1;
        let summary = RunSummary {
            run: self.runs_completed,
            ticks: self.world.frame(),
            score: self.world.score(),
            best_score: self.best_score(),
            deaths,
            human_death: self.human_death.take(),
            synced,
        };
        tracing::debug!(
            run = summary.run,
            ticks = summary.ticks,
            score = summary.score,
            best = summary.best_score,
            head_on = deaths.head_on,
            side = deaths.side,
            off_screen = deaths.off_screen,
            synced,
            "run finished"
        );

        self.world.reset();
        summary
    }

    /// Steps until a quit event or a session limit. Every tick the clock
    /// reports is one trainer tick, paused or not.
    pub fn run_session(
        &mut self,
        input: &mut dyn InputSource,
        clock: &mut dyn TickClock,
        limits: SessionLimits,
    ) -> SessionOutcome {
        let mut runs = Vec::new();
        let mut ticks = 0u64;
        let mut best_score = self.best_score();

        let stop = 'session: loop {
            for _ in 0..clock.elapsed_ticks() {
                if let Some(reason) = limits.reached(runs.len(), ticks) {
                    break 'session reason;
                }
                let outcome = self.tick(&input.poll(ticks));
                if outcome == TickOutcome::Quit {
                    break 'session StopReason::Quit;
                }
                ticks += 1;
                match outcome {
                    TickOutcome::RunEnded(summary) => {
                        if summary.best_score > best_score {
                            best_score = summary.best_score;
                            tracing::info!(run = summary.run, best_score, "new best score");
                        }
                        runs.push(summary);
                    }
                    TickOutcome::Running | TickOutcome::Paused | TickOutcome::Quit => {}
                }
            }
        };

        SessionOutcome { stop, ticks, runs }
    }
}

/// The lineage with the best record leads; every lineage it strictly
/// outranks takes a copy. Returns how many lineages adopted.
pub fn sync_lineages(pilots: &mut [Box<dyn Pilot>]) -> usize {
    let Some(leader) = pilots
        .iter()
        .max_by(|a, b| a.lineage().best().cmp_rank(b.lineage().best()))
    else {
        return 0;
    };
    let record = leader.lineage().best().clone();
    let compare_tick = leader.lineage().compare_tick();
    if record.is_sentinel() {
        return 0;
    }

    let mut adopted = 0;
    for pilot in pilots.iter_mut() {
        if record.outranks(pilot.lineage().best()) {
            pilot.lineage_mut().adopt(&record, compare_tick);
            adopted += 1;
        }
    }
    adopted
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    pub stop: StopReason,
    pub ticks: u64,
    pub runs: Vec<RunSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionReport {
    pub seed: u32,
    pub seed_hex: String,
    pub pilot: String,
    pub population: usize,
    pub human_player: bool,
    pub sync_lineages: bool,
    pub stop: StopReason,
    pub total_ticks: u64,
    pub runs_completed: u32,
    pub best_score: u32,
    /// First run whose best score was non-zero.
    pub first_scoring_run: Option<u32>,
    pub best: Option<RunRecord>,
    pub runs: Vec<RunSummary>,
}

/// Builds a trainer from `config` and runs one session to completion.
pub fn run_configured_session(
    config: &SessionConfig,
    input: &mut dyn InputSource,
    clock: &mut dyn TickClock,
) -> Result<SessionReport> {
    config.validate()?;
    let mut trainer = Trainer::with_pilot(
        config.sim_config(),
        &config.pilot,
        config.seed,
        TrainerOptions {
            sync_lineages: config.sync_lineages,
        },
    )?;

    tracing::info!(
        seed = %seed_to_hex(config.seed),
        pilot = %config.pilot,
        population = config.population,
        human = config.human_player,
        sync = config.sync_lineages,
        max_runs = ?config.limits.max_runs,
        max_ticks = ?config.limits.max_ticks,
        "session start"
    );
    let outcome = trainer.run_session(input, clock, config.limits);
    tracing::info!(
        stop = outcome.stop.as_str(),
        ticks = outcome.ticks,
        runs = trainer.runs_completed(),
        best_score = trainer.best_score(),
        "session end"
    );

    Ok(SessionReport {
        seed: config.seed,
        seed_hex: seed_to_hex(config.seed),
        pilot: config.pilot.clone(),
        population: config.population,
        human_player: config.human_player,
        sync_lineages: config.sync_lineages,
        stop: outcome.stop,
        total_ticks: outcome.ticks,
        runs_completed: trainer.runs_completed(),
        best_score: trainer.best_score(),
        first_scoring_run: outcome
            .runs
            .iter()
            .find(|run| run.best_score > 0)
            .map(|run| run.run),
        best: trainer.leader_best().cloned(),
        runs: outcome.runs,
    })
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    let encoded = serde_json::to_vec_pretty(value)?;
    fs::write(path, encoded).with_context(|| format!("failed writing {}", path.display()))
}
