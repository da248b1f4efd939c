use std::f64::consts::PI;
use std::sync::OnceLock;

use crate::clock::frames_to_msec;
use crate::constants::{
    BIRD_HEIGHT, BIRD_START_CLIMB_MS, BIRD_START_Y, BIRD_WIDTH, BIRD_X, CLIMB_DURATION_MS,
    CLIMB_SPEED, SINK_SPEED, WIN_HEIGHT, WING_FLAP_PERIOD_MS,
};
use crate::mask::{Bitmask, CollisionShape};

/// The agent. Climbs quickly after an ascent impulse, otherwise sinks.
///
/// `y` is never clamped here; leaving the playfield is judged by the world.
#[derive(Clone, Debug, PartialEq)]
pub struct Bird {
    x: i32,
    y: f64,
    msec_to_climb: f64,
}

/// Cosmetic wing orientation, derived from wall-clock time only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WingPose {
    Up,
    Down,
}

impl WingPose {
    pub fn at(wall_clock_ms: u64) -> Self {
        if wall_clock_ms % WING_FLAP_PERIOD_MS >= WING_FLAP_PERIOD_MS / 2 {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl Bird {
    pub fn new(x: i32, y: f64, msec_to_climb: f64) -> Self {
        Self {
            x,
            y,
            msec_to_climb,
        }
    }

    /// A bird at the start position, about to make a tiny climb.
    pub fn spawn() -> Self {
        Self::new(BIRD_X, BIRD_START_Y, BIRD_START_CLIMB_MS)
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn msec_to_climb(&self) -> f64 {
        self.msec_to_climb
    }

    #[inline]
    pub fn is_climbing(&self) -> bool {
        self.msec_to_climb > 0.0
    }

    /// Integer top edge, as used for placement and death classification.
    #[inline]
    pub fn top(&self) -> i32 {
        self.y as i32
    }

    pub fn out_of_bounds(&self) -> bool {
        self.y <= 0.0 || self.y >= f64::from(WIN_HEIGHT - BIRD_HEIGHT)
    }

    /// Moves the bird by `elapsed_ticks` worth of time.
    ///
    /// A climb follows `1 - cos(frac * PI)`: it starts gently and speeds up
    /// towards twice `CLIMB_SPEED` as the climb runs out.
    pub fn advance(&mut self, elapsed_ticks: u32) {
        let elapsed_ms = frames_to_msec(elapsed_ticks);
        if self.msec_to_climb > 0.0 {
            let frac_climb_done = 1.0 - self.msec_to_climb / CLIMB_DURATION_MS;
            self.y -= CLIMB_SPEED * elapsed_ms * (1.0 - (frac_climb_done * PI).cos());
            self.msec_to_climb = (self.msec_to_climb - elapsed_ms).max(0.0);
        } else {
            self.y += SINK_SPEED * elapsed_ms;
        }
    }

    /// Restarts a full climb, whatever is left of the current one.
    pub fn trigger_ascend(&mut self) {
        self.msec_to_climb = CLIMB_DURATION_MS;
    }
}

impl Default for Bird {
    fn default() -> Self {
        Self::spawn()
    }
}

impl CollisionShape for Bird {
    fn origin(&self) -> (i32, i32) {
        (self.x, self.top())
    }

    fn mask(&self) -> &Bitmask {
        bird_mask()
    }
}

/// Opaque body of the bird sprite: an ellipse inside the 32x32 frame.
pub fn bird_mask() -> &'static Bitmask {
    static MASK: OnceLock<Bitmask> = OnceLock::new();
    MASK.get_or_init(|| {
        let cx = f64::from(BIRD_WIDTH) / 2.0;
        let cy = f64::from(BIRD_HEIGHT) / 2.0;
        let rx = cx - 1.0;
        let ry = cy - 3.0;
        Bitmask::from_fn(BIRD_WIDTH as u32, BIRD_HEIGHT as u32, |x, y| {
            let dx = (f64::from(x) + 0.5 - cx) / rx;
            let dy = (f64::from(y) + 0.5 - cy) / ry;
            dx * dx + dy * dy <= 1.0
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sinks_at_constant_speed_without_climb() {
        let mut bird = Bird::new(BIRD_X, 100.0, 0.0);
        bird.advance(1);
        let step = SINK_SPEED * frames_to_msec(1);
        assert!((bird.y() - (100.0 + step)).abs() < 1e-9);
        bird.advance(3);
        assert!((bird.y() - (100.0 + 4.0 * step)).abs() < 1e-9);
    }

    #[test]
    fn climb_is_eased_and_runs_out() {
        let mut bird = Bird::new(BIRD_X, 300.0, 0.0);
        bird.trigger_ascend();

        let mut deltas = Vec::new();
        while bird.is_climbing() {
            let before = bird.y();
            bird.advance(1);
            deltas.push(before - bird.y());
        }

        // 200 ms is 12 ticks; float residue of the countdown adds one more.
        assert_eq!(deltas.len(), 13);
        assert_eq!(deltas[0], 0.0);
        assert!(deltas.windows(2).all(|pair| pair[1] >= pair[0]));
        assert_eq!(bird.msec_to_climb(), 0.0);
    }

    #[test]
    fn trigger_restarts_the_curve() {
        let mut bird = Bird::new(BIRD_X, 300.0, 0.0);
        bird.trigger_ascend();
        bird.advance(5);
        assert!(bird.msec_to_climb() < CLIMB_DURATION_MS);
        bird.trigger_ascend();
        assert_eq!(bird.msec_to_climb(), CLIMB_DURATION_MS);
    }

    #[test]
    fn retriggering_every_tick_hovers() {
        let mut bird = Bird::new(BIRD_X, 300.0, 0.0);
        for _ in 0..600 {
            bird.trigger_ascend();
            bird.advance(1);
        }
        assert_eq!(bird.y(), 300.0);
        assert!(!bird.out_of_bounds());
    }

    #[test]
    fn spawn_makes_a_tiny_climb_first() {
        let mut bird = Bird::spawn();
        assert_eq!(bird.y(), 240.0);
        bird.advance(1);
        assert!(bird.y() < 240.0 && bird.y() > 225.0);
        assert!(!bird.is_climbing());
    }

    #[test]
    fn per_tick_motion_is_bounded() {
        // The eased climb peaks at twice its mean speed.
        let bound = SINK_SPEED.max(2.0 * CLIMB_SPEED) * frames_to_msec(1);
        let mut bird = Bird::spawn();
        for tick in 0..400u32 {
            if tick % 7 == 0 || tick % 11 == 0 {
                bird.trigger_ascend();
            }
            let before = bird.y();
            bird.advance(1);
            assert!((bird.y() - before).abs() <= bound + 1e-9, "tick {tick}");
        }
    }

    #[test]
    fn bounds_are_exclusive_of_the_playfield_interior() {
        assert!(Bird::new(BIRD_X, 0.0, 0.0).out_of_bounds());
        assert!(Bird::new(BIRD_X, 480.0, 0.0).out_of_bounds());
        assert!(!Bird::new(BIRD_X, 479.5, 0.0).out_of_bounds());
        assert!(!Bird::new(BIRD_X, 0.5, 0.0).out_of_bounds());
    }

    #[test]
    fn wing_pose_flips_every_half_period() {
        assert_eq!(WingPose::at(0), WingPose::Down);
        assert_eq!(WingPose::at(249), WingPose::Down);
        assert_eq!(WingPose::at(250), WingPose::Up);
        assert_eq!(WingPose::at(750), WingPose::Up);
    }

    #[test]
    fn mask_leaves_frame_corners_transparent() {
        let mask = bird_mask();
        assert!(!mask.get(0, 0) && !mask.get(31, 31));
        assert!(mask.get(16, 16));
    }
}
