use anyhow::{anyhow, Result};
use flappy_core::constants::DEFAULT_POPULATION;
use flappy_core::sim::SimConfig;
use serde::{Deserialize, Serialize};
use std::env;

use crate::pilots::pilot_ids;

pub const DEFAULT_PILOT: &str = "hill-climber";
pub const DEFAULT_SEED: u32 = 0xF1A9_0001;
/// Applied when neither a run nor a tick limit was given anywhere.
pub const DEFAULT_MAX_RUNS: u32 = 100;

pub const MAX_RUNS_ENV: &str = "FLAPPY_MAX_RUNS";
pub const MAX_TICKS_ENV: &str = "FLAPPY_MAX_TICKS";

/// Why a session stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Quit,
    MaxRuns,
    MaxTicks,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::MaxRuns => "max_runs",
            Self::MaxTicks => "max_ticks",
        }
    }
}

/// Session-level stopping points. Individual runs are never cut short.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLimits {
    pub max_runs: Option<u32>,
    pub max_ticks: Option<u64>,
}

impl SessionLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Explicit values win, then the environment, then [`DEFAULT_MAX_RUNS`].
    pub fn resolve(max_runs: Option<u32>, max_ticks: Option<u64>) -> Self {
        let max_runs = max_runs.or_else(|| read_env_optional_u32(MAX_RUNS_ENV));
        let max_ticks = max_ticks.or_else(|| read_env_optional_u64(MAX_TICKS_ENV));
        if max_runs.is_none() && max_ticks.is_none() {
            tracing::debug!(
                max_runs = DEFAULT_MAX_RUNS,
                "no session limit given, using default run limit"
            );
            return Self {
                max_runs: Some(DEFAULT_MAX_RUNS),
                max_ticks: None,
            };
        }
        Self {
            max_runs,
            max_ticks,
        }
    }

    pub fn reached(&self, runs_completed: usize, ticks: u64) -> Option<StopReason> {
        if self
            .max_runs
            .is_some_and(|max| runs_completed >= max as usize)
        {
            return Some(StopReason::MaxRuns);
        }
        if self.max_ticks.is_some_and(|max| ticks >= max) {
            return Some(StopReason::MaxTicks);
        }
        None
    }
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub population: usize,
    pub human_player: bool,
    pub seed: u32,
    pub pilot: String,
    pub sync_lineages: bool,
    pub limits: SessionLimits,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            population: DEFAULT_POPULATION,
            human_player: false,
            seed: DEFAULT_SEED,
            pilot: DEFAULT_PILOT.to_string(),
            sync_lineages: true,
            limits: SessionLimits::unlimited(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        self.sim_config().validate()?;
        if !pilot_ids().contains(&self.pilot.as_str()) {
            let available = pilot_ids().join(", ");
            return Err(anyhow!(
                "unknown pilot '{}'. available: {available}",
                self.pilot
            ));
        }
        Ok(())
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig::new(self.population, self.human_player)
    }
}

pub(crate) fn read_env_optional_u32(name: &str) -> Option<u32> {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
}

pub(crate) fn read_env_optional_u64(name: &str) -> Option<u64> {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_stop_on_whichever_comes_first() {
        let limits = SessionLimits {
            max_runs: Some(3),
            max_ticks: Some(1_000),
        };
        assert_eq!(limits.reached(2, 999), None);
        assert_eq!(limits.reached(3, 10), Some(StopReason::MaxRuns));
        assert_eq!(limits.reached(0, 1_000), Some(StopReason::MaxTicks));
        assert_eq!(SessionLimits::unlimited().reached(1_000_000, u64::MAX), None);
    }

    #[test]
    fn explicit_limits_win() {
        let limits = SessionLimits::resolve(Some(7), None);
        assert_eq!(limits.max_runs, Some(7));

        let limits = SessionLimits::resolve(None, Some(500));
        assert_eq!(limits.max_ticks, Some(500));
    }

    #[test]
    fn validate_rejects_unknown_pilot_and_empty_population() {
        let config = SessionConfig {
            pilot: "nope".to_string(),
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            population: 0,
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(SessionConfig::default().validate().is_ok());
    }
}
