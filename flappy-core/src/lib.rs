pub mod bird;
pub mod clock;
pub mod constants;
pub mod error;
pub mod mask;
pub mod pipe;
pub mod rng;
pub mod sim;

pub use bird::{Bird, WingPose};
pub use clock::{FixedStep, TickClock};
pub use error::ConfigError;
pub use pipe::{DeathCause, GapSchedule, PipePair, PipeStream};
pub use rng::SeededRng;
pub use sim::{Fate, Flyer, SimConfig, StepReport, World, WorldSnapshot};
