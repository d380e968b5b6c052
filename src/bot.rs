// src/bot.rs
//! Heuristic scripted opponent. Stateless apart from its tuning; every random
//! choice goes through the caller's RNG.

use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::action::Action;
use crate::completion::{can_complete, check_hand_size, discard_waits, waits};
use crate::config::{Difficulty, TrainerConfig};
use crate::errors::{GameError, GameResult};
use crate::game_state::TableState;
use crate::hand::Hand;
use crate::tiles::{Suit, Tile, TileKind};

/// Pon is taken when it keeps at least this share of the current waits.
const PON_KEEP_RATIO: f64 = 0.8;
/// Advanced speed factor switches at this many waits.
const FAST_HAND_WAITS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bot {
    pub difficulty: Difficulty,
    pub novice_call_chance: f64,
    pub novice_terminal_bias: f64,
}

impl Bot {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::from_config(&TrainerConfig { bot_difficulty: difficulty, ..TrainerConfig::default() })
    }

    pub fn from_config(config: &TrainerConfig) -> Self {
        Self {
            difficulty: config.bot_difficulty,
            novice_call_chance: config.novice_call_chance,
            novice_terminal_bias: config.novice_terminal_bias,
        }
    }

    /// Picks `seat`'s move: a win when the hand is complete, otherwise a discard.
    ///
    /// A mid-turn hand wins by tsumo only on a freshly drawn tile; a resting
    /// hand can only answer an open discard with ron.
    pub fn decide<R: Rng + ?Sized>(&self, seat: u8, state: &TableState, rng: &mut R) -> GameResult<Action> {
        let player = state.player(seat);
        let mid_turn = check_hand_size(seat, player.hand.len(), player.melds.len())?;
        let counts = player.counts();

        if !mid_turn {
            return match state.ron_claim(seat) {
                Some((from, tile)) => Ok(Action::Ron { seat, tile, from }),
                None => Err(GameError::invalid(seat, "no tile to act on")),
            };
        }

        let drawn = state.last_drawn.filter(|t| seat == state.current_player && player.holds(t));
        if drawn.is_some() && can_complete(&counts, player.melds.len()) {
            trace!("seat {} declares tsumo", seat);
            return Ok(Action::Tsumo { seat });
        }

        let tile = match self.difficulty {
            Difficulty::Novice => self.novice_discard(&player.hand, rng),
            Difficulty::Intermediate => intermediate_discard(seat, state),
            Difficulty::Advanced => advanced_discard(seat, state, drawn),
        }
        .ok_or_else(|| GameError::invalid(seat, "nothing to discard"))?;
        trace!("seat {} ({:?}) discards {}", seat, self.difficulty, tile);
        Ok(Action::Discard { seat, tile })
    }

    fn novice_discard<R: Rng + ?Sized>(&self, hand: &[Tile], rng: &mut R) -> Option<Tile> {
        let outer: Vec<Tile> = hand.iter().filter(|t| t.kind.is_terminal_or_honor()).copied().collect();
        if !outer.is_empty() && rng.gen_bool(self.novice_terminal_bias) {
            return outer.choose(rng).copied();
        }
        hand.choose(rng).copied()
    }

    /// Whether `seat` claims the open discard with pon or chi.
    pub fn should_call_meld<R: Rng + ?Sized>(&self, seat: u8, state: &TableState, rng: &mut R) -> Option<Action> {
        let (from, tile) = state.last_discard?;
        let player = state.player(seat);
        if from == seat || player.is_riichi || player.is_mid_turn() {
            return None;
        }

        if self.difficulty == Difficulty::Novice {
            if rng.gen_bool(self.novice_call_chance) && state.can_pon(seat) {
                trace!("seat {} (novice) calls pon on {}", seat, tile);
                return Some(Action::Pon { seat, tile, from });
            }
            return None;
        }

        let counts = player.counts();
        let melds = player.melds.len();
        let before = waits(counts, melds).count();

        if state.can_pon(seat) {
            let mut rest = counts;
            rest.remove_n(tile.kind, 2);
            let after = best_waits(&rest, melds + 1);
            trace!("seat {} pon on {}: {} -> {} waits", seat, tile, before, after);
            if after > 0 && after as f64 >= before as f64 * PON_KEEP_RATIO {
                return Some(Action::Pon { seat, tile, from });
            }
        }

        state
            .chi_options(seat)
            .into_iter()
            .map(|pair| {
                let mut rest = counts;
                rest.remove(pair[0].kind);
                rest.remove(pair[1].kind);
                (pair, best_waits(&rest, melds + 1))
            })
            .filter(|&(_, after)| after >= before)
            .max_by_key(|&(_, after)| after)
            .map(|(tiles, after)| {
                trace!("seat {} chi on {}: {} -> {} waits", seat, tile, before, after);
                Action::Chi { seat, tile, tiles, from }
            })
    }
}

/// Waits kept by the best discard of a mid-turn hand.
fn best_waits(hand: &Hand, declared_melds: usize) -> usize {
    discard_waits(hand, declared_melds)
        .iter()
        .map(|(_, w)| w.len())
        .max()
        .unwrap_or(0)
}

/// How much `kind` holds the hand together: 0.3 per same-suit neighbour within
/// two ranks, 0.5 per copy held (itself included).
pub fn efficiency(kind: TileKind, hand: &Hand) -> f64 {
    let linked = (-2i8..=2)
        .filter(|&o| o != 0)
        .filter_map(|o| kind.offset(o))
        .filter(|&k| hand.count(k) > 0)
        .count();
    linked as f64 * 0.3 + hand.count(kind) as f64 * 0.5
}

/// Rough safety in [0, 1] of throwing `kind` from `seat`.
pub fn safety(kind: TileKind, seat: u8, state: &TableState) -> f64 {
    let mut score = 0.0;
    for other in state.players.iter().filter(|p| p.seat != seat) {
        if other.has_discarded(kind) {
            score += 0.8;
        }
        if other.is_riichi {
            score -= 0.5;
        }
    }
    if kind.is_terminal_or_honor() {
        score += 0.3;
    }
    f64::clamp(score, 0.0, 1.0)
}

/// Kinds treated as dangerous for `seat`: the 4-6 middle of every number suit
/// once any opponent is in riichi.
pub fn danger_set(seat: u8, state: &TableState) -> Vec<TileKind> {
    if !state.players.iter().any(|p| p.seat != seat && p.is_riichi) {
        return Vec::new();
    }
    [Suit::Man, Suit::Pin, Suit::Sou]
        .into_iter()
        .flat_map(|suit| (4..=6).filter_map(move |rank| TileKind::from_suit_rank(suit, rank)))
        .collect()
}

fn least_efficient<'a, I: Iterator<Item = &'a Tile>>(tiles: I, hand: &Hand) -> Option<Tile> {
    tiles
        .min_by(|a, b| efficiency(a.kind, hand).total_cmp(&efficiency(b.kind, hand)))
        .copied()
}

fn intermediate_discard(seat: u8, state: &TableState) -> Option<Tile> {
    let player = state.player(seat);
    let counts = player.counts();
    let danger = danger_set(seat, state);
    let safe = player.hand.iter().filter(|t| !danger.contains(&t.kind));
    least_efficient(safe, &counts).or_else(|| least_efficient(player.hand.iter(), &counts))
}

fn advanced_discard(seat: u8, state: &TableState, drawn: Option<Tile>) -> Option<Tile> {
    let player = state.player(seat);
    let counts = player.counts();
    let mut before = counts;
    if let Some(t) = drawn {
        before.remove(t.kind);
    }
    let waiting = if drawn.is_some() { waits(before, player.melds.len()).count() } else { 0 };
    let speed = if waiting > FAST_HAND_WAITS { 0.8 } else { 0.5 };

    let score = |t: &Tile| 0.4 * efficiency(t.kind, &counts) + 0.4 * safety(t.kind, seat, state) + 0.2 * speed;
    player.hand.iter().min_by(|a, b| score(a).total_cmp(&score(b))).copied()
}
