//! Tick-stepped world: pipes, birds, collisions and scoring for one run.
//!
//! The world knows nothing about how birds decide to ascend. Callers step it
//! once per tick, read the [`StepReport`], and feed ascent impulses back with
//! [`World::trigger_ascend`] before the next step.

use std::collections::VecDeque;

use crate::bird::{Bird, WingPose};
use crate::constants::DEFAULT_POPULATION;
use crate::error::ConfigError;
use crate::mask::{bounds_intersect, overlaps};
use crate::pipe::{DeathCause, GapSchedule, PipePair, PipeStream};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    pub population: usize,
    pub human_player: bool,
    pub gap_schedule: GapSchedule,
}

impl SimConfig {
    pub fn new(population: usize, human_player: bool) -> Self {
        Self {
            population,
            human_player,
            gap_schedule: GapSchedule::default(),
        }
    }

    pub fn with_gap_schedule(mut self, gap_schedule: GapSchedule) -> Self {
        self.gap_schedule = gap_schedule;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POPULATION, false)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fate {
    Alive,
    Dead(DeathCause),
}

/// One bird plus the bookkeeping the world keeps for it during a run.
#[derive(Clone, Debug)]
pub struct Flyer {
    bird: Bird,
    fate: Fate,
    score: u32,
}

impl Flyer {
    fn spawn() -> Self {
        Self {
            bird: Bird::spawn(),
            fate: Fate::Alive,
            score: 0,
        }
    }

    #[inline]
    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    #[inline]
    pub fn fate(&self) -> Fate {
        self.fate
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self.fate, Fate::Alive)
    }

    pub fn death(&self) -> Option<DeathCause> {
        match self.fate {
            Fate::Alive => None,
            Fate::Dead(cause) => Some(cause),
        }
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }
}

/// What happened during one [`World::step`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Frame index the step ran at.
    pub frame: u32,
    pub spawned: bool,
    pub retired: usize,
    /// Lineage indices that died this tick, with their cause.
    pub deaths: Vec<(usize, DeathCause)>,
    pub human_death: Option<DeathCause>,
    /// Lineage indices that were awarded a point this tick.
    pub scored: Vec<usize>,
    pub pipes_passed: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BirdSnapshot {
    pub x: i32,
    pub y: f64,
    pub climbing: bool,
    pub wing: WingPose,
    pub fate: Fate,
    pub score: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PipeSnapshot {
    pub x: f64,
    pub top_pieces: i32,
    pub bottom_pieces: i32,
    pub score_counted: bool,
}

/// Everything a renderer needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    pub frame: u32,
    pub score: u32,
    pub paused: bool,
    pub birds: Vec<BirdSnapshot>,
    pub human: Option<BirdSnapshot>,
    pub pipes: Vec<PipeSnapshot>,
}

pub struct World {
    flyers: Vec<Flyer>,
    human: Option<Flyer>,
    pipes: VecDeque<PipePair>,
    stream: PipeStream,
    frame: u32,
    score: u32,
    paused: bool,
}

impl World {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            flyers: (0..config.population).map(|_| Flyer::spawn()).collect(),
            human: config.human_player.then(Flyer::spawn),
            pipes: VecDeque::new(),
            stream: PipeStream::new(config.gap_schedule),
            frame: 0,
            score: 0,
            paused: false,
        })
    }

    /// Starts a fresh run: birds back at the start, no pipes, schedule rewound.
    pub fn reset(&mut self) {
        for flyer in &mut self.flyers {
            *flyer = Flyer::spawn();
        }
        if let Some(human) = self.human.as_mut() {
            *human = Flyer::spawn();
        }
        self.pipes.clear();
        self.stream.reset();
        self.frame = 0;
        self.score = 0;
        self.paused = false;
    }

    #[inline]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Pipes passed this run, as shown on screen.
    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    #[inline]
    pub fn population(&self) -> usize {
        self.flyers.len()
    }

    pub fn flyers(&self) -> &[Flyer] {
        &self.flyers
    }

    pub fn flyer(&self, index: usize) -> Option<&Flyer> {
        self.flyers.get(index)
    }

    pub fn human(&self) -> Option<&Flyer> {
        self.human.as_ref()
    }

    pub fn pipes(&self) -> &VecDeque<PipePair> {
        &self.pipes
    }

    pub fn alive_count(&self) -> usize {
        self.flyers.iter().filter(|flyer| flyer.is_alive()).count()
    }

    /// Every lineage is dead, and so is the human bird if there is one.
    pub fn all_dead(&self) -> bool {
        self.flyers.iter().all(|flyer| !flyer.is_alive())
            && self.human.as_ref().map_or(true, |human| !human.is_alive())
    }

    /// Starts a climb for lineage `index`. Dead birds ignore it.
    pub fn trigger_ascend(&mut self, index: usize) {
        if let Some(flyer) = self.flyers.get_mut(index) {
            if flyer.is_alive() {
                flyer.bird.trigger_ascend();
            }
        }
    }

    pub fn trigger_human_ascend(&mut self) {
        if let Some(human) = self.human.as_mut() {
            if human.is_alive() {
                human.bird.trigger_ascend();
            }
        }
    }

    /// Advances the world by one tick. A paused world does not move.
    pub fn step(&mut self) -> StepReport {
        let mut report = StepReport {
            frame: self.frame,
            ..StepReport::default()
        };
        if self.paused {
            return report;
        }

        if let Some(pipe) = self.stream.maybe_spawn(self.frame, self.paused) {
            self.pipes.push_back(pipe);
            report.spawned = true;
        }

        for (index, flyer) in self.flyers.iter_mut().enumerate() {
            if let Some(cause) = judge(flyer, &self.pipes) {
                report.deaths.push((index, cause));
            }
        }
        if let Some(human) = self.human.as_mut() {
            report.human_death = judge(human, &self.pipes);
        }

        report.retired = PipeStream::retire_offscreen(&mut self.pipes);

        for pipe in &mut self.pipes {
            pipe.advance(1);
        }
        for flyer in self.alive_flyers_mut() {
            flyer.bird.advance(1);
        }

        for pipe in &mut self.pipes {
            if !pipe.passed_bird_column() || !pipe.count_score() {
                continue;
            }
            report.pipes_passed += 1;
            self.score += 1;
            for (index, flyer) in self.flyers.iter_mut().enumerate() {
                if flyer.is_alive() {
                    flyer.score += 1;
                    report.scored.push(index);
                }
            }
            if let Some(human) = self.human.as_mut().filter(|human| human.is_alive()) {
                human.score += 1;
            }
        }

        self.frame += 1;
        report
    }

    fn alive_flyers_mut(&mut self) -> impl Iterator<Item = &mut Flyer> {
        self.flyers
            .iter_mut()
            .chain(self.human.iter_mut())
            .filter(|flyer| flyer.is_alive())
    }

    pub fn snapshot(&self, wall_clock_ms: u64) -> WorldSnapshot {
        let wing = WingPose::at(wall_clock_ms);
        let bird_snapshot = |flyer: &Flyer| BirdSnapshot {
            x: flyer.bird.x(),
            y: flyer.bird.y(),
            climbing: flyer.bird.is_climbing(),
            wing,
            fate: flyer.fate,
            score: flyer.score,
        };

        WorldSnapshot {
            frame: self.frame,
            score: self.score,
            paused: self.paused,
            birds: self.flyers.iter().map(bird_snapshot).collect(),
            human: self.human.as_ref().map(bird_snapshot),
            pipes: self
                .pipes
                .iter()
                .map(|pipe| PipeSnapshot {
                    x: pipe.x(),
                    top_pieces: pipe.top_pieces(),
                    bottom_pieces: pipe.bottom_pieces(),
                    score_counted: pipe.score_counted(),
                })
                .collect(),
        }
    }
}

/// Marks `flyer` dead if it hit a pipe or left the playfield. Returns the
/// cause the first time only.
fn judge(flyer: &mut Flyer, pipes: &VecDeque<PipePair>) -> Option<DeathCause> {
    if !flyer.is_alive() {
        return None;
    }

    let hit = pipes
        .iter()
        .find(|pipe| bounds_intersect(*pipe, &flyer.bird) && overlaps(*pipe, &flyer.bird));
    let cause = match hit {
        Some(pipe) => pipe.classify_hit(flyer.bird.top()),
        None if flyer.bird.out_of_bounds() => DeathCause::OffScreen,
        None => return None,
    };

    flyer.fate = Fate::Dead(cause);
    Some(cause)
}
