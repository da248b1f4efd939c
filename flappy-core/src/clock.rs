use crate::constants::TICKS_PER_SECOND;

/// Converts ticks to milliseconds at the fixed tick rate.
#[inline]
pub fn frames_to_msec(frames: u32) -> f64 {
    1000.0 * f64::from(frames) / f64::from(TICKS_PER_SECOND)
}

/// Converts milliseconds to (fractional) ticks at the fixed tick rate.
#[inline]
pub fn msec_to_frames(milliseconds: f64) -> f64 {
    f64::from(TICKS_PER_SECOND) * milliseconds / 1000.0
}

/// Source of logical time. Reports how many whole ticks elapsed since the
/// previous poll.
pub trait TickClock {
    fn elapsed_ticks(&mut self) -> u32;
}

/// Headless clock: every poll is exactly one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedStep;

impl TickClock for FixedStep {
    fn elapsed_ticks(&mut self) -> u32 {
        1
    }
}
