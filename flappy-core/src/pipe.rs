use std::collections::VecDeque;

use crate::clock::{frames_to_msec, msec_to_frames};
use crate::constants::{
    BIRD_X, BODY_PIECE_CAPACITY, DEFAULT_GAP_SCHEDULE, PIPE_ADD_INTERVAL_MS, PIPE_BODY_INSET,
    PIPE_PIECE_HEIGHT, PIPE_WIDTH, SCROLL_SPEED, WIN_HEIGHT, WIN_WIDTH,
};
use crate::error::ConfigError;
use crate::mask::{Bitmask, CollisionShape};

/// How a pipe collision is ranked. Lower is closer to a correct flight.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Hit an end cap while inside the gap's vertical band.
    HeadOn = 0,
    /// Hit the pipe body outside the gap band.
    Side = 1,
    /// Left the playfield without touching a pipe.
    OffScreen = 2,
}

impl DeathCause {
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HeadOn => "head_on",
            Self::Side => "side",
            Self::OffScreen => "off_screen",
        }
    }
}

/// A top and a bottom pipe; only the gap between them is safe.
#[derive(Clone, Debug)]
pub struct PipePair {
    x: f64,
    top_pieces: i32,
    bottom_pieces: i32,
    score_counted: bool,
    mask: Bitmask,
}

impl PipePair {
    /// Builds a pair whose bottom pipe has `bottom_body_pieces` body pieces.
    pub fn new(bottom_body_pieces: i32) -> Result<Self, ConfigError> {
        check_gap(0, bottom_body_pieces)?;
        Ok(Self::build(bottom_body_pieces))
    }

    fn build(bottom_body_pieces: i32) -> Self {
        let bottom_body = bottom_body_pieces;
        let top_body = BODY_PIECE_CAPACITY - bottom_body;

        let mut mask = Bitmask::new(PIPE_WIDTH as u32, WIN_HEIGHT as u32);
        let body_width = PIPE_WIDTH - 2 * PIPE_BODY_INSET;

        for i in 1..=bottom_body {
            mask.fill_rect(
                PIPE_BODY_INSET,
                WIN_HEIGHT - i * PIPE_PIECE_HEIGHT,
                body_width,
                PIPE_PIECE_HEIGHT,
            );
        }
        let bottom_end_y = WIN_HEIGHT - bottom_body * PIPE_PIECE_HEIGHT - PIPE_PIECE_HEIGHT;
        mask.fill_rect(0, bottom_end_y, PIPE_WIDTH, PIPE_PIECE_HEIGHT);

        for i in 0..top_body {
            mask.fill_rect(
                PIPE_BODY_INSET,
                i * PIPE_PIECE_HEIGHT,
                body_width,
                PIPE_PIECE_HEIGHT,
            );
        }
        mask.fill_rect(0, top_body * PIPE_PIECE_HEIGHT, PIPE_WIDTH, PIPE_PIECE_HEIGHT);

        // Piece counts include the end caps from here on.
        Self {
            x: f64::from(WIN_WIDTH - 1),
            top_pieces: top_body + 1,
            bottom_pieces: bottom_body + 1,
            score_counted: false,
            mask,
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn top_pieces(&self) -> i32 {
        self.top_pieces
    }

    #[inline]
    pub fn bottom_pieces(&self) -> i32 {
        self.bottom_pieces
    }

    #[inline]
    pub fn top_height_px(&self) -> i32 {
        self.top_pieces * PIPE_PIECE_HEIGHT
    }

    #[inline]
    pub fn bottom_height_px(&self) -> i32 {
        self.bottom_pieces * PIPE_PIECE_HEIGHT
    }

    #[inline]
    pub fn score_counted(&self) -> bool {
        self.score_counted
    }

    pub fn visible(&self) -> bool {
        -f64::from(PIPE_WIDTH) < self.x && self.x < f64::from(WIN_WIDTH)
    }

    /// Trailing edge is behind the birds' column.
    pub fn passed_bird_column(&self) -> bool {
        self.x + f64::from(PIPE_WIDTH) < f64::from(BIRD_X)
    }

    /// Marks the pair as scored. Returns `false` if it already was.
    pub fn count_score(&mut self) -> bool {
        !std::mem::replace(&mut self.score_counted, true)
    }

    pub fn advance(&mut self, elapsed_ticks: u32) {
        self.x -= SCROLL_SPEED * frames_to_msec(elapsed_ticks);
    }

    /// Whether a bird whose top edge is at `bird_top` is inside the band
    /// between the top cap's upper edge and the bottom cap's upper edge.
    pub fn in_gap_band(&self, bird_top: i32) -> bool {
        bird_top > (self.top_pieces - 1) * PIPE_PIECE_HEIGHT
            && bird_top < WIN_HEIGHT - self.bottom_pieces * PIPE_PIECE_HEIGHT
    }

    /// Cause of death for a bird that collided with this pair.
    pub fn classify_hit(&self, bird_top: i32) -> DeathCause {
        if self.in_gap_band(bird_top) {
            DeathCause::HeadOn
        } else {
            DeathCause::Side
        }
    }

    #[cfg(test)]
    pub(crate) fn set_x(&mut self, x: f64) {
        self.x = x;
    }
}

impl CollisionShape for PipePair {
    fn origin(&self) -> (i32, i32) {
        (self.x as i32, 0)
    }

    fn mask(&self) -> &Bitmask {
        &self.mask
    }
}

fn check_gap(index: usize, gap: i32) -> Result<(), ConfigError> {
    if gap <= 0 || gap >= BODY_PIECE_CAPACITY {
        return Err(ConfigError::GapOutOfRange {
            index,
            gap,
            capacity: BODY_PIECE_CAPACITY,
        });
    }
    Ok(())
}

/// Deterministic, repeating list of bottom-pipe body sizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GapSchedule(Vec<i32>);

impl GapSchedule {
    pub fn new(gaps: Vec<i32>) -> Result<Self, ConfigError> {
        if gaps.is_empty() {
            return Err(ConfigError::EmptyGapSchedule);
        }
        for (index, gap) in gaps.iter().enumerate() {
            check_gap(index, *gap)?;
        }
        Ok(Self(gaps))
    }

    pub fn gaps(&self) -> &[i32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for GapSchedule {
    fn default() -> Self {
        Self(DEFAULT_GAP_SCHEDULE.to_vec())
    }
}

/// Produces pipes at a fixed tick interval and retires them once they have
/// scrolled off the left edge. Sole owner of pipe lifetime.
#[derive(Clone, Debug)]
pub struct PipeStream {
    schedule: GapSchedule,
    cursor: usize,
    interval_ticks: u32,
}

impl PipeStream {
    pub fn new(schedule: GapSchedule) -> Self {
        Self {
            schedule,
            cursor: 0,
            interval_ticks: msec_to_frames(f64::from(PIPE_ADD_INTERVAL_MS)).round() as u32,
        }
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rewinds the schedule so every run sees the same pipes.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn maybe_spawn(&mut self, tick: u32, paused: bool) -> Option<PipePair> {
        if paused || tick % self.interval_ticks != 0 {
            return None;
        }
        let gap = self.schedule.0[self.cursor];
        self.cursor = (self.cursor + 1) % self.schedule.len();
        Some(PipePair::build(gap))
    }

    /// Drops invisible pipes from the front. Pipes leave in creation order,
    /// so only the head needs checking.
    pub fn retire_offscreen(pipes: &mut VecDeque<PipePair>) -> usize {
        let mut retired = 0;
        while pipes.front().is_some_and(|pipe| !pipe.visible()) {
            pipes.pop_front();
            retired += 1;
        }
        retired
    }
}

impl Default for PipeStream {
    fn default() -> Self {
        Self::new(GapSchedule::default())
    }
}
