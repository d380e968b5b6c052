// src/wall.rs
use std::collections::VecDeque;

use rand::{seq::SliceRandom, Rng};

use crate::tiles::{full_set, Tile, NUM_TILES};

// No dead wall: kan replacement tiles come off the front like any other draw,
// and dora indicators are not revealed.

/// Undrawn tiles, drawn from the front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wall {
    tiles: VecDeque<Tile>,
}

impl Wall {
    /// All 136 tiles (one red five per suit) in shuffled order.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = full_set();
        assert_eq!(deck.len(), NUM_TILES, "full set should be {} tiles", NUM_TILES);
        deck.shuffle(rng);
        Self { tiles: deck.into() }
    }

    /// A wall in exactly the given order, for stacked deals.
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Self { tiles: tiles.into() }
    }

    pub fn draw(&mut self) -> Option<Tile> {
        self.tiles.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter()
    }
}
