// src/meld.rs
use serde::{Deserialize, Serialize};

use crate::tiles::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeldKind {
    /// Chi
    Run,
    /// Pon
    Triplet,
    /// Open kan
    Quad,
    /// Ankan
    ConcealedQuad,
}

/// A declared group. Counts as one of the four groups no matter its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    pub kind: MeldKind,
    /// Sorted low to high.
    pub tiles: Vec<Tile>,
    pub called_from: Option<u8>,
}

impl Meld {
    /// Builds a meld, checking the tiles actually form `kind`.
    pub fn new(kind: MeldKind, mut tiles: Vec<Tile>, called_from: Option<u8>) -> Option<Self> {
        tiles.sort();
        let ok = match kind {
            MeldKind::Run => {
                tiles.len() == 3
                    && tiles[0].kind.suit().is_number()
                    && tiles[0].kind.offset(1) == Some(tiles[1].kind)
                    && tiles[0].kind.offset(2) == Some(tiles[2].kind)
            }
            MeldKind::Triplet => tiles.len() == 3 && tiles.iter().all(|t| t.same_kind(&tiles[0])),
            MeldKind::Quad | MeldKind::ConcealedQuad => {
                tiles.len() == 4 && tiles.iter().all(|t| t.same_kind(&tiles[0]))
            }
        };
        ok.then_some(Meld { kind, tiles, called_from })
    }

    pub fn is_open(&self) -> bool {
        self.kind != MeldKind::ConcealedQuad
    }
}
