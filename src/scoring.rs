// src/scoring.rs
//! Placeholder scoring: a handful of easy-to-spot yaku, fixed fu and the
//! usual base-point table. Not a tournament scorer.

use serde::{Deserialize, Serialize};

use crate::player::Player;
use crate::tiles::{Suit, Tile};

/// Fu is not computed; every win scores as 30 fu.
pub const PLACEHOLDER_FU: u8 = 30;
pub const RIICHI_STICK: i32 = 1000;
pub const HONBA_BONUS: i32 = 300;

/// Type of win: self-draw (Tsumo) or Ron on a seat's discard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinType {
    Tsumo,
    Ron { from: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Yaku {
    pub name: &'static str,
    pub han: u8,
}

/// Scoring structure for han and fu calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
    pub han: u8,
    pub fu: u8,
    pub points: u32,
    pub yaku: Vec<Yaku>,
}

/// `tiles` is the whole winning hand, meld tiles included.
pub fn detect_yaku(tiles: &[Tile], closed: bool, riichi: bool, tsumo: bool) -> Vec<Yaku> {
    let mut yaku = Vec::new();
    if riichi {
        yaku.push(Yaku { name: "Riichi", han: 1 });
    }
    if tsumo && closed {
        yaku.push(Yaku { name: "Menzen Tsumo", han: 1 });
    }
    if !tiles.is_empty() && tiles.iter().all(|t| t.kind.is_terminal_or_honor()) {
        yaku.push(Yaku { name: "Honroutou", han: 2 });
    }

    let mut suits: Vec<Suit> = tiles.iter().map(|t| t.kind.suit()).collect();
    suits.sort();
    suits.dedup();
    match suits.as_slice() {
        [Suit::Honor] => yaku.push(Yaku { name: "Tsuuiisou", han: 13 }),
        [_] => yaku.push(Yaku { name: "Chinitsu", han: 6 }),
        [_, Suit::Honor] => yaku.push(Yaku { name: "Honitsu", han: 3 }),
        _ => {}
    }
    yaku
}

/// Given total han & fu and the dealer flag, compute final rounded points.
pub fn calculate_points(han: u8, fu: u8, is_dealer: bool) -> u32 {
    let base = if han >= 13 {
        8000
    } else if han >= 11 {
        6000
    } else if han >= 8 {
        4000
    } else if han >= 6 {
        3000
    } else {
        ((fu as u32) * 2u32.pow((han + 2) as u32)).min(2000)
    };
    let round_100 = |x: u32| ((x + 99) / 100) * 100;
    if is_dealer { round_100(base * 6) } else { round_100(base * 4) }
}

/// Score a winning hand as held; for Ron the claimed tile is already in `hand`.
pub fn score_win(winner: &Player, win_type: WinType) -> Score {
    let mut tiles: Vec<Tile> = winner.hand.clone();
    tiles.extend(winner.melds.iter().flat_map(|m| m.tiles.iter().copied()));
    let yaku = detect_yaku(&tiles, winner.is_closed(), winner.is_riichi, win_type == WinType::Tsumo);
    let han = yaku.iter().map(|y| y.han).sum::<u8>();
    let points = calculate_points(han, PLACEHOLDER_FU, winner.is_dealer);
    Score { han, fu: PLACEHOLDER_FU, points, yaku }
}

/// Moves points between seats for a win, including honba and the riichi pool.
pub fn settle(
    players: &mut [Player],
    winner: usize,
    win_type: WinType,
    points: u32,
    honba: u32,
    riichi_sticks: u32,
) {
    let points = points as i32;
    let honba = honba as i32;
    let mut gained = riichi_sticks as i32 * RIICHI_STICK;
    match win_type {
        WinType::Ron { from } => {
            let pay = points + honba * HONBA_BONUS;
            players[from as usize].score -= pay;
            gained += pay;
        }
        WinType::Tsumo => {
            let others = players.len() as i32 - 1;
            let share = ((points / others + 99) / 100) * 100 + honba * HONBA_BONUS / others;
            for (seat, p) in players.iter_mut().enumerate() {
                if seat != winner {
                    p.score -= share;
                    gained += share;
                }
            }
        }
    }
    players[winner].score += gained;
}
