// src/config.rs
use serde::{Deserialize, Serialize};

use crate::errors::{GameError, GameResult};

/// Scripted-opponent strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Novice,
    #[default]
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Seed for the session RNG; `None` draws one from entropy.
    pub seed: Option<u64>,
    pub human_seat: u8,
    pub dealer_seat: u8,
    pub bot_difficulty: Difficulty,
    pub starting_score: i32,
    /// Chance a scripted seat claims a ron it is offered.
    pub ron_call_chance: f64,
    /// Chance a novice bot calls pon when it could.
    pub novice_call_chance: f64,
    /// Chance a novice bot throws a terminal/honor when it holds one.
    pub novice_terminal_bias: f64,
    /// Scripted "thinking" interval range in ms, `[min, max)`.
    pub think_delay_ms: [u64; 2],
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            human_seat: 0,
            dealer_seat: 0,
            bot_difficulty: Difficulty::Intermediate,
            starting_score: 25000,
            ron_call_chance: 0.8,
            novice_call_chance: 0.2,
            novice_terminal_bias: 0.7,
            think_delay_ms: [1000, 3000],
        }
    }
}

impl TrainerConfig {
    pub fn from_json_str(text: &str) -> GameResult<Self> {
        let config: TrainerConfig = serde_json::from_str(text)
            .map_err(|e| GameError::Config { message: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GameResult<()> {
        let bad = |message: String| Err(GameError::Config { message });
        if self.human_seat >= 4 {
            return bad(format!("human_seat {} out of range", self.human_seat));
        }
        if self.dealer_seat >= 4 {
            return bad(format!("dealer_seat {} out of range", self.dealer_seat));
        }
        for (name, p) in [
            ("ron_call_chance", self.ron_call_chance),
            ("novice_call_chance", self.novice_call_chance),
            ("novice_terminal_bias", self.novice_terminal_bias),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return bad(format!("{} must be within [0, 1], got {}", name, p));
            }
        }
        let [min, max] = self.think_delay_ms;
        if min > max {
            return bad(format!("think_delay_ms range inverted: {} > {}", min, max));
        }
        Ok(())
    }
}
