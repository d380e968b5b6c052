// src/test_support.rs
//! Stacked deals for unit tests.

use crate::config::TrainerConfig;
use crate::game_state::TableState;
use crate::tiles::{full_set, parse_kinds, Tile, TileKind};
use crate::wall::Wall;

/// Kinds that never pair, chain or wait: filler for seats a test does not care about.
const JUNK: [TileKind; 14] = [
    TileKind::Man1, TileKind::Man4, TileKind::Man7,
    TileKind::Pin2, TileKind::Pin5, TileKind::Pin8,
    TileKind::Sou3, TileKind::Sou6, TileKind::Sou9,
    TileKind::East, TileKind::South, TileKind::West, TileKind::North,
    TileKind::White,
];

fn near(a: TileKind, b: TileKind) -> bool {
    a == b || (a.suit() == b.suit() && a.suit().is_number() && a.rank().abs_diff(b.rank()) <= 2)
}

fn take(pool: &mut Vec<Tile>, kind: TileKind) -> Option<Tile> {
    let i = pool.iter().position(|t| t.kind == kind)?;
    Some(pool.remove(i))
}

/// Deals `hands` (mpsz, "" for junk filler) through the real deal path.
/// The remaining wall is in tile-id order.
pub fn stacked_with(config: &TrainerConfig, hands: [&str; 4]) -> TableState {
    let dealer = config.dealer_seat as usize;
    let mut pool = full_set();
    let mut seats: Vec<Vec<Tile>> = hands
        .iter()
        .map(|text| {
            parse_kinds(text)
                .unwrap()
                .into_iter()
                .map(|(k, _)| take(&mut pool, k).unwrap_or_else(|| panic!("no {} left", k)))
                .collect()
        })
        .collect();

    for (seat, tiles) in seats.iter_mut().enumerate() {
        let want = if seat == dealer { 14 } else { 13 };
        for kind in JUNK {
            if tiles.len() >= want {
                break;
            }
            let tile = take(&mut pool, kind).or_else(|| {
                let i = pool.iter().position(|t| !tiles.iter().any(|h| near(h.kind, t.kind)))?;
                Some(pool.remove(i))
            });
            tiles.push(tile.expect("filler tile"));
        }
        assert_eq!(tiles.len(), want, "seat {} hand size", seat);
    }

    let mut order = Vec::with_capacity(136);
    for round in 0..13 {
        for tiles in &seats {
            order.push(tiles[round]);
        }
    }
    order.push(seats[dealer][13]);
    order.extend(pool);
    TableState::with_wall(config, Wall::from_tiles(order)).deal()
}

pub fn stacked(hands: [&str; 4]) -> TableState {
    stacked_with(&TrainerConfig::default(), hands)
}

pub fn find(tiles: &[Tile], kind: TileKind) -> Tile {
    *tiles.iter().find(|t| t.kind == kind).unwrap_or_else(|| panic!("{} not held", kind))
}
