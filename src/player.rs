// src/player.rs
use serde::{Deserialize, Serialize};

use crate::hand::Hand;
use crate::meld::Meld;
use crate::tiles::{Tile, TileKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wind {
    East,
    South,
    West,
    North,
}

impl Wind {
    /// Seat wind of `seat` when `dealer` sits East.
    pub fn for_seat(seat: u8, dealer: u8) -> Self {
        match (seat + 4 - dealer) % 4 {
            0 => Wind::East,
            1 => Wind::South,
            2 => Wind::West,
            _ => Wind::North,
        }
    }

    pub fn tile(self) -> TileKind {
        match self {
            Wind::East => TileKind::East,
            Wind::South => TileKind::South,
            Wind::West => TileKind::West,
            Wind::North => TileKind::North,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub seat: u8,
    pub name: String,
    /// Kept sorted.
    pub hand: Vec<Tile>,
    pub discards: Vec<Tile>,
    pub melds: Vec<Meld>,
    pub score: i32,
    pub wind: Wind,
    pub is_dealer: bool,
    pub is_riichi: bool,
    pub is_scripted: bool,
}

impl Player {
    pub fn new(seat: u8, dealer: u8, score: i32, is_scripted: bool) -> Self {
        let name = if is_scripted { format!("Bot {}", seat) } else { "You".to_string() };
        Self {
            seat,
            name,
            hand: Vec::with_capacity(14),
            discards: Vec::new(),
            melds: Vec::new(),
            score,
            wind: Wind::for_seat(seat, dealer),
            is_dealer: seat == dealer,
            is_riichi: false,
            is_scripted,
        }
    }

    pub fn counts(&self) -> Hand {
        Hand::from_tiles(&self.hand)
    }

    /// `13 - 3*melds`: the concealed size between turns.
    pub fn resting_size(&self) -> usize {
        13usize.saturating_sub(3 * self.melds.len())
    }

    /// True when the hand holds its drawn tile and a discard is owed.
    pub fn is_mid_turn(&self) -> bool {
        self.hand.len() == self.resting_size() + 1
    }

    pub fn is_closed(&self) -> bool {
        self.melds.iter().all(|m| !m.is_open())
    }

    pub fn holds(&self, tile: &Tile) -> bool {
        self.hand.iter().any(|t| t.id == tile.id)
    }

    pub fn take_tile(&mut self, tile: &Tile) -> Option<Tile> {
        let idx = self.hand.iter().position(|t| t.id == tile.id)?;
        Some(self.hand.remove(idx))
    }

    /// Removes `n` tiles of `kind`, preferring non-red copies.
    pub fn take_kind(&mut self, kind: TileKind, n: usize) -> Option<Vec<Tile>> {
        let mut idxs: Vec<usize> = self
            .hand
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == kind)
            .map(|(i, _)| i)
            .collect();
        if idxs.len() < n {
            return None;
        }
        idxs.sort_by_key(|&i| self.hand[i].red);
        let mut chosen: Vec<usize> = idxs.into_iter().take(n).collect();
        chosen.sort_unstable_by(|a, b| b.cmp(a));
        Some(chosen.into_iter().map(|i| self.hand.remove(i)).collect())
    }

    pub fn add_tile(&mut self, tile: Tile) {
        self.hand.push(tile);
        self.hand.sort();
    }

    pub fn has_discarded(&self, kind: TileKind) -> bool {
        self.discards.iter().any(|t| t.kind == kind)
    }

    /// Every tile the player owns: hand, discards and melds.
    pub fn tile_count(&self) -> usize {
        self.hand.len()
            + self.discards.len()
            + self.melds.iter().map(|m| m.tiles.len()).sum::<usize>()
    }
}
