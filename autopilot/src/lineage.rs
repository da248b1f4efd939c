//! Single-lineage hill climber over per-tick ascend thresholds.
//!
//! A lineage replays its best known sequence up to the point where that
//! sequence last scored, then mutates the tail depending on how the best run
//! died. Run over run, `best` only ever improves.

use std::cmp::Ordering;

use flappy_core::pipe::DeathCause;
use flappy_core::rng::SeededRng;
use serde::{Deserialize, Serialize};

/// Tick index of the first policy query in a run.
pub const PLAY_START_TICK: u32 = 2;
/// Upper bound of the default threshold draw.
pub const WIDE_THRESHOLD_MAX: u8 = 25;
/// Upper bound of the draw used near a head-on death; ascends less often.
pub const HEAD_ON_THRESHOLD_MAX: u8 = 30;
/// How far ahead of a head-on death the tail is redrawn.
pub const HEAD_ON_WINDOW_TICKS: u32 = 20;
/// The one threshold value that means "ascend".
pub const ASCEND_THRESHOLD: u8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Ascend,
    Glide,
}

impl Action {
    #[inline]
    pub fn from_threshold(threshold: u8) -> Self {
        if threshold == ASCEND_THRESHOLD {
            Self::Ascend
        } else {
            Self::Glide
        }
    }
}

/// Outcome header of a run plus the thresholds that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub score: u32,
    pub death: DeathCause,
    /// Cursor value at the last tick this run scored.
    pub last_score_tick: u32,
    #[serde(skip)]
    pub thresholds: Vec<u8>,
}

impl RunRecord {
    /// The "nothing learned yet" record. Everything outranks or ties it.
    pub fn sentinel() -> Self {
        Self {
            score: 0,
            death: DeathCause::OffScreen,
            last_score_tick: 0,
            thresholds: Vec::new(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.score == 0
            && self.death == DeathCause::OffScreen
            && self.last_score_tick == 0
            && self.thresholds.is_empty()
    }

    /// Higher score wins; equal scores fall back to the better death.
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.death.rank().cmp(&self.death.rank()))
    }

    #[inline]
    pub fn outranks(&self, other: &Self) -> bool {
        self.cmp_rank(other) == Ordering::Greater
    }
}

impl Default for RunRecord {
    fn default() -> Self {
        Self::sentinel()
    }
}

#[derive(Clone, Debug)]
pub struct Lineage {
    rng: SeededRng,
    current: RunRecord,
    best: RunRecord,
    compare_tick: u32,
    cursor: u32,
}

impl Lineage {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SeededRng::new(seed),
            current: RunRecord::sentinel(),
            best: RunRecord::sentinel(),
            compare_tick: 0,
            cursor: PLAY_START_TICK,
        }
    }

    #[inline]
    pub fn best(&self) -> &RunRecord {
        &self.best
    }

    #[inline]
    pub fn current(&self) -> &RunRecord {
        &self.current
    }

    #[inline]
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Cursor value at which `best` died.
    #[inline]
    pub fn compare_tick(&self) -> u32 {
        self.compare_tick
    }

    /// Decides the action for the current tick and moves the cursor on.
    pub fn play(&mut self) -> Action {
        let slot = (self.cursor - PLAY_START_TICK) as usize;
        if let Some(max) = self.redraw_range(slot) {
            let threshold = self.rng.next_inclusive(max);
            match self.current.thresholds.get_mut(slot) {
                Some(existing) => *existing = threshold,
                None => self.current.thresholds.push(threshold),
            }
        }

        let threshold = self.current.thresholds[slot];
        self.cursor += 1;
        Action::from_threshold(threshold)
    }

    fn redraw_range(&self, slot: usize) -> Option<u8> {
        if self.best.is_sentinel() || slot >= self.current.thresholds.len() {
            return Some(WIDE_THRESHOLD_MAX);
        }
        if self.cursor <= self.best.last_score_tick {
            return None;
        }

        match self.best.death {
            DeathCause::OffScreen => Some(WIDE_THRESHOLD_MAX),
            DeathCause::Side => {
                let midpoint = (self.compare_tick + self.best.last_score_tick) / 2;
                (self.cursor > midpoint).then_some(WIDE_THRESHOLD_MAX)
            }
            DeathCause::HeadOn => (self.cursor + HEAD_ON_WINDOW_TICKS > self.compare_tick)
                .then_some(HEAD_ON_THRESHOLD_MAX),
        }
    }

    pub fn record_score_tick(&mut self) {
        self.current.last_score_tick = self.cursor;
    }

    /// Closes the run: keeps the better of `current` and `best`, then starts
    /// the next run from a copy of `best`.
    pub fn end_run(&mut self, final_score: u32, death: DeathCause) {
        self.current.score = final_score;
        self.current.death = death;
        if self.current.outranks(&self.best) {
            self.best = self.current.clone();
            self.compare_tick = self.cursor;
        }
        self.current = self.best.clone();
        self.cursor = PLAY_START_TICK;
    }

    /// Takes over another lineage's best run as its own.
    pub fn adopt(&mut self, record: &RunRecord, compare_tick: u32) {
        self.best = record.clone();
        self.compare_tick = compare_tick;
        self.current = self.best.clone();
        self.cursor = PLAY_START_TICK;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play_n(lineage: &mut Lineage, n: usize) -> Vec<Action> {
        (0..n).map(|_| lineage.play()).collect()
    }

    /// Plays to `score_at`, scores there, keeps playing to `die_at`, then
    /// ends the run with one point.
    fn scripted_run(lineage: &mut Lineage, score_at: u32, die_at: u32, death: DeathCause) {
        while lineage.cursor() < score_at {
            lineage.play();
        }
        lineage.record_score_tick();
        while lineage.cursor() < die_at {
            lineage.play();
        }
        lineage.end_run(1, death);
    }

    #[test]
    fn fresh_lineage_appends_wide_draws() {
        let mut lineage = Lineage::new(11);
        play_n(&mut lineage, 500);
        assert_eq!(lineage.cursor(), PLAY_START_TICK + 500);
        assert_eq!(lineage.current().thresholds.len(), 500);
        assert!(lineage
            .current()
            .thresholds
            .iter()
            .all(|t| *t <= WIDE_THRESHOLD_MAX));
        assert!(lineage.best().is_sentinel());
    }

    #[test]
    fn only_threshold_one_ascends() {
        assert_eq!(Action::from_threshold(1), Action::Ascend);
        assert_eq!(Action::from_threshold(0), Action::Glide);
        assert_eq!(Action::from_threshold(25), Action::Glide);
    }

    #[test]
    fn ranking_breaks_ties_on_death() {
        let record = |score, death| RunRecord {
            score,
            death,
            ..RunRecord::sentinel()
        };
        assert!(record(1, DeathCause::OffScreen).outranks(&record(0, DeathCause::HeadOn)));
        assert!(record(3, DeathCause::HeadOn).outranks(&record(3, DeathCause::Side)));
        assert!(record(3, DeathCause::Side).outranks(&record(3, DeathCause::OffScreen)));
        assert!(!record(3, DeathCause::Side).outranks(&record(3, DeathCause::Side)));
        assert!(!RunRecord::sentinel().outranks(&RunRecord::sentinel()));
    }

    #[test]
    fn off_screen_zero_score_never_replaces_sentinel() {
        let mut lineage = Lineage::new(3);
        play_n(&mut lineage, 70);
        lineage.end_run(0, DeathCause::OffScreen);
        assert!(lineage.best().is_sentinel());
        assert_eq!(lineage.cursor(), PLAY_START_TICK);
        assert!(lineage.current().thresholds.is_empty());
    }

    #[test]
    fn promotion_records_compare_tick() {
        let mut lineage = Lineage::new(5);
        play_n(&mut lineage, 40);
        lineage.end_run(0, DeathCause::Side);

        assert_eq!(lineage.best().death, DeathCause::Side);
        assert_eq!(lineage.best().thresholds.len(), 40);
        assert_eq!(lineage.compare_tick(), PLAY_START_TICK + 40);
        assert_eq!(lineage.current(), lineage.best());
    }

    #[test]
    fn end_run_twice_is_idempotent() {
        let mut lineage = Lineage::new(9);
        scripted_run(&mut lineage, 20, 50, DeathCause::Side);
        let best = lineage.best().clone();
        let compare = lineage.compare_tick();

        lineage.end_run(1, DeathCause::Side);
        assert_eq!(lineage.best(), &best);
        assert_eq!(lineage.compare_tick(), compare);
    }

    #[test]
    fn best_never_gets_worse() {
        let mut lineage = Lineage::new(21);
        let mut outcome_rng = SeededRng::new(77);
        let causes = [DeathCause::HeadOn, DeathCause::Side, DeathCause::OffScreen];
        let mut previous = lineage.best().clone();

        for _ in 0..300 {
            let ticks = 5 + outcome_rng.next_int(120) as usize;
            play_n(&mut lineage, ticks);
            let score = outcome_rng.next_int(6);
            let death = causes[outcome_rng.next_int(3) as usize];
            lineage.end_run(score, death);

            assert_ne!(lineage.best().cmp_rank(&previous), Ordering::Less);
            previous = lineage.best().clone();
        }
    }

    #[test]
    fn replays_best_up_to_its_last_score() {
        let mut lineage = Lineage::new(13);
        scripted_run(&mut lineage, 10, 30, DeathCause::OffScreen);
        let best = lineage.best().thresholds.clone();

        // Cursor 2..=10 covers slots 0..=8.
        play_n(&mut lineage, 9);
        assert_eq!(lineage.current().thresholds[..9], best[..9]);
    }

    #[test]
    fn side_death_replays_up_to_the_midpoint() {
        let mut lineage = Lineage::new(17);
        scripted_run(&mut lineage, 10, 42, DeathCause::Side);
        assert_eq!(lineage.compare_tick(), 42);
        let best = lineage.best().thresholds.clone();

        // Midpoint (42 + 10) / 2 = 26, so cursors up to 26 replay.
        play_n(&mut lineage, 25);
        assert_eq!(lineage.current().thresholds[..25], best[..25]);
    }

    #[test]
    fn head_on_death_redraws_a_narrow_window_from_the_calm_range() {
        let mut lineage = Lineage::new(19);
        scripted_run(&mut lineage, 10, 42, DeathCause::HeadOn);
        let best = lineage.best().thresholds.clone();

        // 42 - 20 = 22: cursors up to 22 replay.
        play_n(&mut lineage, 40);
        let current = &lineage.current().thresholds;
        assert_eq!(current[..21], best[..21]);
        assert!(current.iter().all(|t| *t <= HEAD_ON_THRESHOLD_MAX));
    }

    /// Scores at cursor 10, dies at 202 (200 slots), then replays the whole
    /// sequence once. Returns the best and the replayed thresholds.
    fn replay_long_tail(seed: u32, death: DeathCause) -> (Vec<u8>, Vec<u8>) {
        let mut lineage = Lineage::new(seed);
        scripted_run(&mut lineage, 10, 202, death);
        assert_eq!(lineage.best().thresholds.len(), 200);
        assert_eq!(lineage.compare_tick(), 202);
        let best = lineage.best().thresholds.clone();
        play_n(&mut lineage, 200);
        (best, lineage.current().thresholds.clone())
    }

    #[test]
    fn off_screen_rerolls_everything_after_the_last_score() {
        let (best, current) = replay_long_tail(41, DeathCause::OffScreen);
        assert_eq!(current[..9], best[..9]);
        // Slots 9..105 sit before the side-death midpoint and still re-roll.
        assert_ne!(current[9..105], best[9..105]);
        assert!(current.iter().all(|t| *t <= WIDE_THRESHOLD_MAX));
    }

    #[test]
    fn side_death_rerolls_only_past_the_midpoint() {
        let (best, current) = replay_long_tail(43, DeathCause::Side);
        // Midpoint (202 + 10) / 2 = 106 is slot 104.
        assert_eq!(current[..105], best[..105]);
        assert_ne!(current[105..], best[105..]);
        assert!(current.iter().all(|t| *t <= WIDE_THRESHOLD_MAX));
    }

    #[test]
    fn head_on_death_rerolls_only_the_last_window() {
        let (best, current) = replay_long_tail(47, DeathCause::HeadOn);
        // 202 - 20 = 182 is slot 180.
        assert_eq!(current[..181], best[..181]);
        assert_ne!(current[181..], best[181..]);
    }

    #[test]
    fn head_on_window_reaches_past_the_wide_range() {
        let mut lineage = Lineage::new(53);
        scripted_run(&mut lineage, 10, 202, DeathCause::HeadOn);

        let mut seen_calm = false;
        for _ in 0..20 {
            play_n(&mut lineage, 200);
            let window = &lineage.current().thresholds[181..];
            assert!(window.iter().all(|t| *t <= HEAD_ON_THRESHOLD_MAX));
            seen_calm |= window.iter().any(|t| *t > WIDE_THRESHOLD_MAX);
            // Same rank as best: no promotion, the next run replays it again.
            lineage.end_run(1, DeathCause::HeadOn);
            assert_eq!(lineage.compare_tick(), 202);
        }
        assert!(seen_calm, "no head-on draw landed in 26..=30");
    }

    #[test]
    fn running_past_the_best_sequence_appends() {
        let mut lineage = Lineage::new(23);
        scripted_run(&mut lineage, 5, 12, DeathCause::Side);
        play_n(&mut lineage, 30);
        assert_eq!(lineage.current().thresholds.len(), 30);
        assert_eq!(lineage.best().thresholds.len(), 10);
    }

    #[test]
    fn adopt_is_a_deep_copy() {
        let mut leader = Lineage::new(29);
        scripted_run(&mut leader, 12, 60, DeathCause::HeadOn);

        let mut follower = Lineage::new(31);
        follower.adopt(leader.best(), leader.compare_tick());
        assert_eq!(follower.best(), leader.best());
        assert_eq!(follower.compare_tick(), leader.compare_tick());

        play_n(&mut follower, 200);
        follower.end_run(4, DeathCause::Side);
        assert_eq!(leader.best().score, 1);
        assert_eq!(leader.best().thresholds.len(), 58);
        assert_eq!(follower.best().score, 4);
    }
}
