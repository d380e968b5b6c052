// src/completion.rs
//! Hand-completion engine and wait enumeration.
//!
//! A complete hand is four groups (runs or triplets) plus one pair, where
//! declared melds count as groups already formed. The search always pivots
//! on the lowest remaining kind, so every branch strictly shrinks the
//! multiset and the recursion terminates.

use crate::errors::{GameError, GameResult};
use crate::hand::Hand;
use crate::meld::Meld;
use crate::tiles::{Tile, TileKind};

/// Groups in a complete hand.
pub const GROUPS: usize = 4;
/// Tile-equivalents in a complete hand (declared melds count as three).
pub const COMPLETE_SIZE: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// Lowest kind of the run.
    Run(TileKind),
    Triplet(TileKind),
}

/// One way of splitting the concealed tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub groups: Vec<Group>,
    pub pair: TileKind,
}

/// True iff `hand` plus `declared_melds` forms four groups and a pair.
/// Hands of the wrong size are never complete.
pub fn can_complete(hand: &Hand, declared_melds: usize) -> bool {
    find_partition(hand, declared_melds).is_some()
}

pub fn can_complete_tiles(tiles: &[Tile], declared_melds: usize) -> bool {
    can_complete(&Hand::from_tiles(tiles), declared_melds)
}

/// First partition found by the backtracking search.
pub fn find_partition(hand: &Hand, declared_melds: usize) -> Option<Partition> {
    if declared_melds > GROUPS || hand.len() + 3 * declared_melds != COMPLETE_SIZE {
        return None;
    }
    let mut groups = Vec::with_capacity(GROUPS);
    let mut pair = None;
    if search(*hand, GROUPS - declared_melds, true, &mut groups, &mut pair) {
        pair.map(|pair| Partition { groups, pair })
    } else {
        None
    }
}

fn search(
    tiles: Hand,
    groups_needed: usize,
    pair_needed: bool,
    groups: &mut Vec<Group>,
    pair: &mut Option<TileKind>,
) -> bool {
    if groups_needed == 0 {
        if !pair_needed {
            return tiles.is_empty();
        }
        return match tiles.lowest() {
            Some(k) if tiles.len() == 2 && tiles.count(k) == 2 => {
                *pair = Some(k);
                true
            }
            _ => false,
        };
    }
    if tiles.len() < 3 {
        return false;
    }
    let Some(pivot) = tiles.lowest() else {
        return false;
    };

    // Triplet
    if tiles.count(pivot) >= 3 {
        let mut rest = tiles;
        rest.remove_n(pivot, 3);
        groups.push(Group::Triplet(pivot));
        if search(rest, groups_needed - 1, pair_needed, groups, pair) {
            return true;
        }
        groups.pop();
    }

    // Run
    if let (Some(second), Some(third)) = (pivot.offset(1), pivot.offset(2)) {
        if tiles.count(second) > 0 && tiles.count(third) > 0 {
            let mut rest = tiles;
            rest.remove(pivot);
            rest.remove(second);
            rest.remove(third);
            groups.push(Group::Run(pivot));
            if search(rest, groups_needed - 1, pair_needed, groups, pair) {
                return true;
            }
            groups.pop();
        }
    }

    // Pair
    if pair_needed && tiles.count(pivot) >= 2 {
        let mut rest = tiles;
        rest.remove_n(pivot, 2);
        *pair = Some(pivot);
        if search(rest, groups_needed, false, groups, pair) {
            return true;
        }
        *pair = None;
    }

    false
}

/// Checks the concealed-count invariant `13 - 3*melds (+1 mid-turn)`.
/// Returns whether the hand is holding a drawn tile.
pub fn check_hand_size(seat: u8, concealed: usize, melds: usize) -> GameResult<bool> {
    let total = concealed + 3 * melds;
    if melds > GROUPS || !(COMPLETE_SIZE - 1..=COMPLETE_SIZE).contains(&total) {
        return Err(GameError::MalformedHand { seat, concealed, melds });
    }
    Ok(total == COMPLETE_SIZE)
}

/// Lazy, restartable enumeration of the kinds that would complete a hand.
/// Kinds come out in canonical order; cloning restarts from the same point.
#[derive(Debug, Clone)]
pub struct Waits {
    hand: Hand,
    declared_melds: usize,
    next: u8,
}

impl Iterator for Waits {
    type Item = TileKind;

    fn next(&mut self) -> Option<TileKind> {
        while let Ok(kind) = TileKind::try_from(self.next) {
            self.next += 1;
            let mut candidate = self.hand;
            // A fifth copy does not exist.
            if candidate.add(kind) && can_complete(&candidate, self.declared_melds) {
                return Some(kind);
            }
        }
        None
    }
}

/// Waits of a counted hand with `declared_melds` groups already formed.
pub fn waits(hand: Hand, declared_melds: usize) -> Waits {
    Waits { hand, declared_melds, next: 0 }
}

/// Every tile kind that completes `hand` given its declared `melds`.
pub fn winning_tiles(hand: &[Tile], melds: &[Meld]) -> Waits {
    waits(Hand::from_tiles(hand), melds.len())
}

/// For a hand holding a drawn tile: the waits left after discarding one copy
/// of each distinct kind, in canonical order.
pub fn discard_waits(hand: &Hand, declared_melds: usize) -> Vec<(TileKind, Vec<TileKind>)> {
    hand.iter()
        .map(|(kind, _)| {
            let mut rest = *hand;
            rest.remove(kind);
            (kind, waits(rest, declared_melds).collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::{parse_kinds, TileKind::*};

    fn hand(s: &str) -> Hand {
        Hand::from_kinds(parse_kinds(s).unwrap().into_iter().map(|(k, _)| k))
    }

    #[test]
    fn three_runs_triplet_and_pair() {
        assert!(can_complete(&hand("123m456p789s11155z"), 0));
    }

    #[test]
    fn extra_tile_breaks_the_pair() {
        assert!(!can_complete(&hand("1123m456p789s1155z"), 0));
    }

    #[test]
    fn wrong_size_is_never_complete() {
        assert!(!can_complete(&hand("123m456p789s1115z"), 0));
        assert!(!can_complete(&hand("123m456p789s11155z"), 1));
        assert!(!can_complete(&hand("11z"), 5));
    }

    #[test]
    fn all_honor_hand() {
        assert!(can_complete(&hand("11122233344455z"), 0));
        assert!(!can_complete(&hand("11122233344456z"), 0));
    }

    #[test]
    fn declared_melds_count_as_groups() {
        assert!(can_complete(&hand("77z"), 4));
        assert!(!can_complete(&hand("67z"), 4));
        assert!(can_complete(&hand("234s55m"), 3));
    }

    #[test]
    fn backtracks_out_of_greedy_triplet() {
        // 111 first leaves 23m stranded; the pair 11m + runs 123m... must be found.
        let h = hand("11123m123p123s789s");
        assert!(can_complete(&h, 0));
        let p = find_partition(&h, 0).unwrap();
        assert_eq!(p.pair, Man1);
        assert_eq!(p.groups.len(), 4);
    }

    #[test]
    fn partition_reports_groups() {
        let p = find_partition(&hand("123m456p789s11155z"), 0).unwrap();
        assert_eq!(p.pair, White);
        assert_eq!(
            p.groups,
            vec![Group::Run(Man1), Group::Run(Pin4), Group::Run(Sou7), Group::Triplet(East)]
        );
    }

    #[test]
    fn single_wait() {
        let w: Vec<_> = waits(hand("123m456p789s1115z"), 0).collect();
        assert_eq!(w, vec![White]);
    }

    #[test]
    fn shanpon_wait() {
        let w: Vec<_> = waits(hand("123m456p789s1155z"), 0).collect();
        assert_eq!(w, vec![East, White]);
    }

    #[test]
    fn nine_gates_waits_on_every_man() {
        let w: Vec<_> = waits(hand("1112345678999m"), 0).collect();
        assert_eq!(w, vec![Man1, Man2, Man3, Man4, Man5, Man6, Man7, Man8, Man9]);
    }

    #[test]
    fn waits_complete_the_hand() {
        let base = hand("2345m456p789s555z");
        let w: Vec<_> = waits(base, 0).collect();
        assert!(!w.is_empty());
        for k in w {
            let mut full = base;
            full.add(k);
            assert!(can_complete(&full, 0), "{} should complete", k);
        }
    }

    #[test]
    fn held_four_copies_are_not_a_wait() {
        // All four 1m are held, so 1m is never reported.
        let w: Vec<_> = waits(hand("111123m456p789s5z"), 0).collect();
        assert!(!w.contains(&Man1));
    }

    #[test]
    fn waits_are_restartable() {
        let w = waits(hand("123m456p789s1155z"), 0);
        let first: Vec<_> = w.clone().collect();
        let second: Vec<_> = w.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn single_tile_with_four_melds() {
        let w: Vec<_> = waits(hand("9p"), 4).collect();
        assert_eq!(w, vec![Pin9]);
    }

    #[test]
    fn discard_waits_finds_tenpai_discards() {
        let options = discard_waits(&hand("123m456p789s1155z7z"), 0);
        let (_, after_red) = options.iter().find(|(k, _)| *k == Red).unwrap();
        assert_eq!(after_red, &vec![East, White]);
        let (_, after_1m) = options.iter().find(|(k, _)| *k == Man1).unwrap();
        assert!(after_1m.is_empty());
    }

    #[test]
    fn hand_size_invariant() {
        assert_eq!(check_hand_size(0, 13, 0), Ok(false));
        assert_eq!(check_hand_size(0, 11, 1), Ok(true));
        assert!(check_hand_size(2, 12, 0).is_err());
        assert!(check_hand_size(2, 2, 5).is_err());
    }
}
