// src/errors.rs
use std::fmt;

use crate::game_state::Phase;

#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// Action rejected by the reducer; the table state is left untouched.
    InvalidMove { seat: u8, reason: String },
    /// Concealed tiles and declared melds disagree with the 13/14 tile invariant.
    /// This is an upstream bug, not a user mistake.
    MalformedHand { seat: u8, concealed: usize, melds: usize },
    /// The round already reached a terminal phase.
    GameOver { phase: Phase },
    /// Tile or hand string could not be parsed.
    Parse { input: String, message: String },
    /// Configuration rejected by `TrainerConfig::validate` or the JSON decoder.
    Config { message: String },
}

impl GameError {
    pub(crate) fn invalid(seat: u8, reason: impl Into<String>) -> Self {
        GameError::InvalidMove { seat, reason: reason.into() }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidMove { seat, reason } => {
                write!(f, "Invalid move by seat {}: {}", seat, reason)
            }
            GameError::MalformedHand { seat, concealed, melds } => write!(
                f,
                "Malformed hand for seat {}: {} concealed tiles with {} melds",
                seat, concealed, melds
            ),
            GameError::GameOver { phase } => write!(f, "Round is over ({:?})", phase),
            GameError::Parse { input, message } => {
                write!(f, "Parse error on '{}': {}", input, message)
            }
            GameError::Config { message } => write!(f, "Invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for GameError {}

pub type GameResult<T> = Result<T, GameError>;

#[cfg(feature = "python")]
impl From<GameError> for pyo3::PyErr {
    fn from(err: GameError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_seat() {
        let err = GameError::invalid(2, "tile not in hand");
        assert_eq!(err.to_string(), "Invalid move by seat 2: tile not in hand");
    }

    #[test]
    fn malformed_hand_message() {
        let err = GameError::MalformedHand { seat: 1, concealed: 12, melds: 0 };
        assert!(err.to_string().contains("12 concealed tiles"));
    }
}
