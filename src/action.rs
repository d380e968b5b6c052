// src/action.rs
use serde::{Deserialize, Serialize};

use crate::tiles::Tile;

/// Every move the reducer understands. Each variant carries only what it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Draw from the wall. From a seat with a claim pending it also means "pass".
    Draw { seat: u8 },
    Discard { seat: u8, tile: Tile },
    /// Declare riichi, discarding `tile`.
    Riichi { seat: u8, tile: Tile },
    /// Self-drawn win.
    Tsumo { seat: u8 },
    /// Win on `from`'s last discard.
    Ron { seat: u8, tile: Tile, from: u8 },
    /// Run with two hand tiles and the previous seat's discard.
    Chi { seat: u8, tile: Tile, tiles: [Tile; 2], from: u8 },
    Pon { seat: u8, tile: Tile, from: u8 },
    /// Open kan on a discard when `from` is set, concealed kan of `tile`'s kind otherwise.
    Kan { seat: u8, tile: Tile, from: Option<u8> },
}

impl Action {
    pub fn seat(&self) -> u8 {
        match *self {
            Action::Draw { seat }
            | Action::Discard { seat, .. }
            | Action::Riichi { seat, .. }
            | Action::Tsumo { seat }
            | Action::Ron { seat, .. }
            | Action::Chi { seat, .. }
            | Action::Pon { seat, .. }
            | Action::Kan { seat, .. } => seat,
        }
    }

    /// Actions only the turn holder may take.
    pub fn is_turn_scoped(&self) -> bool {
        matches!(
            self,
            Action::Discard { .. }
                | Action::Riichi { .. }
                | Action::Tsumo { .. }
                | Action::Kan { from: None, .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Draw { .. } => "draw",
            Action::Discard { .. } => "discard",
            Action::Riichi { .. } => "riichi",
            Action::Tsumo { .. } => "tsumo",
            Action::Ron { .. } => "ron",
            Action::Chi { .. } => "chi",
            Action::Pon { .. } => "pon",
            Action::Kan { .. } => "kan",
        }
    }
}

/// An accepted or submitted action with the caller's clock reading (ms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    #[serde(flatten)]
    pub action: Action,
    pub timestamp: u64,
}

impl ActionRecord {
    pub fn new(action: Action, timestamp: u64) -> Self {
        Self { action, timestamp }
    }
}
