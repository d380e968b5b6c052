// src/advisor.rs
//! Read-only hand analysis for the human seat.

use serde::Serialize;

use crate::bot::danger_set;
use crate::completion::{check_hand_size, discard_waits, waits};
use crate::errors::GameResult;
use crate::game_state::TableState;
use crate::tiles::TileKind;

/// Kinds that complete a 13-tile hand, out of a nominal 13.
const EFFICIENCY_SCALE: f64 = 13.0;
const LOW_EFFICIENCY: f64 = 0.3;
const HIGH_EFFICIENCY: f64 = 0.6;
const SAFETY_ALERT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub waits: Vec<TileKind>,
    /// Best discard when holding a drawn tile.
    pub best_discard: Option<TileKind>,
    pub efficiency: f64,
    pub safety: f64,
    pub danger_tiles: Vec<TileKind>,
    pub win_probability: f64,
    pub threats: Vec<String>,
    pub recommendation: &'static str,
    pub safety_alert: Option<&'static str>,
    pub progress_tip: &'static str,
}

pub fn analyze(state: &TableState, seat: u8) -> GameResult<Advice> {
    let player = state.player(seat);
    let mid_turn = check_hand_size(seat, player.hand.len(), player.melds.len())?;
    let counts = player.counts();

    let (best_discard, waits) = if mid_turn {
        discard_waits(&counts, player.melds.len())
            .into_iter()
            .max_by_key(|(_, w)| w.len())
            .map(|(d, w)| (Some(d), w))
            .unwrap_or((None, Vec::new()))
    } else {
        (None, waits(counts, player.melds.len()).collect())
    };

    let efficiency = waits.len() as f64 / EFFICIENCY_SCALE;
    let danger_tiles = danger_set(seat, state);
    let dangerous = player.hand.iter().filter(|t| danger_tiles.contains(&t.kind)).count();
    let safety = if player.hand.is_empty() { 1.0 } else { 1.0 - dangerous as f64 / player.hand.len() as f64 };
    let win_probability = if waits.is_empty() {
        0.0
    } else {
        f64::min(1.0, (waits.len() * 4) as f64 / state.wall.remaining().max(1) as f64)
    };

    Ok(Advice {
        best_discard,
        efficiency,
        safety,
        danger_tiles,
        win_probability,
        threats: threats(state, seat),
        recommendation: recommendation(efficiency),
        safety_alert: (safety < SAFETY_ALERT).then_some(
            "Be careful! Other players might be close to winning. \
             Consider discarding safer tiles (like those already discarded by others).",
        ),
        progress_tip: progress_tip(waits.len()),
        waits,
    })
}

fn threats(state: &TableState, seat: u8) -> Vec<String> {
    let mut out = Vec::new();
    for p in state.players.iter().filter(|p| p.seat != seat) {
        if p.is_riichi {
            out.push(format!("Player {} is in riichi", p.seat + 1));
        }
        if p.melds.len() >= 3 {
            out.push(format!("Player {} has {} melds", p.seat + 1, p.melds.len()));
        }
        if p.discards.len() < 6 {
            out.push(format!("Player {} may be building a fast hand", p.seat + 1));
        }
    }
    out
}

pub fn recommendation(efficiency: f64) -> &'static str {
    if efficiency < LOW_EFFICIENCY {
        "Try discarding your highest single tile (like 9s or honors you don't have pairs of)."
    } else if efficiency < HIGH_EFFICIENCY {
        "Keep tiles that are close to making sequences or sets. Discard isolated tiles."
    } else {
        "You're close! Focus on the specific tiles you need and avoid dangerous discards."
    }
}

pub fn progress_tip(wait_count: usize) -> &'static str {
    match wait_count {
        0 => "Look for pairs or potential sequences (like 3-4 needing a 2 or 5). Discard single tiles that don't connect to anything.",
        1..=3 => "You're getting close to a winning hand. Keep collecting the tiles you are waiting for.",
        4..=8 => "You have multiple ways to win. Focus on the most common tiles.",
        _ => "Your hand is very flexible. Consider what opponents might be collecting before discarding.",
    }
}
