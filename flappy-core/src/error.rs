use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    EmptyPopulation,
    EmptyGapSchedule,
    GapOutOfRange {
        index: usize,
        gap: i32,
        capacity: i32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPopulation => write!(f, "population must contain at least one bird"),
            Self::EmptyGapSchedule => write!(f, "gap schedule must not be empty"),
            Self::GapOutOfRange {
                index,
                gap,
                capacity,
            } => write!(
                f,
                "gap schedule entry {index} = {gap} leaves a non-positive pipe segment (allowed 1..={})",
                capacity - 1
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
