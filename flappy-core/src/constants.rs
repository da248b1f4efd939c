//! Playfield, timing and physics constants.
//!
//! Distances are pixels, speeds are pixels per millisecond and durations are
//! milliseconds unless the name says ticks.

// Timing
pub const TICKS_PER_SECOND: u32 = 60;
pub const PIPE_ADD_INTERVAL_MS: u32 = 3_000;
pub const SPAWN_INTERVAL_TICKS: u32 = PIPE_ADD_INTERVAL_MS * TICKS_PER_SECOND / 1_000; // 180

// Playfield (background is 284x512, tiled twice)
pub const WIN_WIDTH: i32 = 284 * 2;
pub const WIN_HEIGHT: i32 = 512;
pub const SCROLL_SPEED: f64 = 0.18;

// Bird
pub const BIRD_X: i32 = 50;
pub const BIRD_WIDTH: i32 = 32;
pub const BIRD_HEIGHT: i32 = 32;
pub const BIRD_START_Y: f64 = (WIN_HEIGHT / 2 - BIRD_HEIGHT / 2) as f64; // 240
pub const BIRD_START_CLIMB_MS: f64 = 2.0;
pub const SINK_SPEED: f64 = 0.2;
pub const CLIMB_SPEED: f64 = 0.3;
pub const CLIMB_DURATION_MS: f64 = 200.0;
pub const WING_FLAP_PERIOD_MS: u64 = 500;

// Pipes
pub const PIPE_WIDTH: i32 = 80;
pub const PIPE_PIECE_HEIGHT: i32 = 32;
pub const PIPE_BODY_INSET: i32 = 4;
pub const BODY_PIECE_CAPACITY: i32 =
    body_piece_capacity(WIN_HEIGHT, BIRD_HEIGHT, PIPE_PIECE_HEIGHT); // 10
pub const DEFAULT_GAP_SCHEDULE: [i32; 10] = [5, 4, 8, 3, 8, 7, 3, 2, 6, 5];

// Population
pub const DEFAULT_POPULATION: usize = 250;

/// Body pieces shared by the top and bottom pipe of one pair.
///
/// The playfield is filled from top to bottom, leaving room for three bird
/// heights plus the two end caps and one spare body piece.
pub const fn body_piece_capacity(field_height: i32, bird_height: i32, piece_height: i32) -> i32 {
    (field_height - 3 * bird_height - 3 * piece_height) / piece_height
}
