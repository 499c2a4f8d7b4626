use std::error::Error;
use std::fmt;

/// Everything that can stop a single director tick. None of these end a
/// session; the tick is logged and skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectorError {
    /// Gap or weight computation attempted before the track length is known.
    MissingTrack,
    /// Realtime data referenced a car index that never appeared in the entry list.
    UnknownCar(u16),
    /// No car passed the candidate filter.
    EmptyCandidateSet,
    Computation(String),
}

impl fmt::Display for DirectorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DirectorError::MissingTrack => write!(f, "Track length is not known yet"),
            DirectorError::UnknownCar(index) => write!(f, "Unknown car index {}", index),
            DirectorError::EmptyCandidateSet => write!(f, "No car qualifies for the broadcast focus"),
            DirectorError::Computation(reason) => write!(f, "Computation failed: {}", reason),
        }
    }
}

impl Error for DirectorError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    InvalidValue { key: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Parse(reason) => write!(f, "Failed to parse config: {}", reason),
            ConfigError::InvalidValue { key, reason } => write!(f, "Invalid value for {}: {}", key, reason),
        }
    }
}

impl Error for ConfigError {}
