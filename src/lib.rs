// src/lib.rs
//! Riichi mahjong trainer core: hand completion, waits, a scripted opponent,
//! the table reducer and a timer-driven session around them.

pub mod action;
pub mod advisor;
pub mod bot;
pub mod completion;
pub mod config;
pub mod errors;
pub mod game_state;
pub mod hand;
pub mod meld;
pub mod player;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod tiles;
pub mod wall;

#[cfg(feature = "python")]
mod python;

#[cfg(test)]
mod test_support;

pub use action::{Action, ActionRecord};
pub use advisor::{analyze, Advice};
pub use bot::Bot;
pub use completion::{can_complete, can_complete_tiles, waits, winning_tiles, Waits};
pub use config::{Difficulty, TrainerConfig};
pub use errors::{GameError, GameResult};
pub use game_state::{Phase, TableState, WinRecord};
pub use hand::Hand;
pub use meld::{Meld, MeldKind};
pub use player::{Player, Wind};
pub use scheduler::{Scheduler, Timer, TurnKey};
pub use scoring::{Score, WinType, Yaku};
pub use session::GameSession;
pub use tiles::{parse_tiles, Suit, Tile, TileKind};
pub use wall::Wall;
