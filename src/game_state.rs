// src/game_state.rs
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionRecord};
use crate::completion::{can_complete, waits};
use crate::config::TrainerConfig;
use crate::errors::{GameError, GameResult};
use crate::hand::Hand;
use crate::meld::{Meld, MeldKind};
use crate::player::Player;
use crate::scoring::{score_win, settle, Score, WinType, RIICHI_STICK};
use crate::tiles::{Tile, NUM_TILES};
use crate::wall::Wall;

pub const NUM_SEATS: u8 = 4;
/// Riichi needs at least this many tiles left in the wall.
const RIICHI_MIN_WALL: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Dealing,
    Playing,
    Won,
    /// Exhaustive draw.
    Draw,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Won | Phase::Draw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinRecord {
    pub seat: u8,
    pub win_type: WinType,
    pub tile: Option<Tile>,
    pub score: Score,
}

/// The whole table. `apply` never mutates in place: it returns the next state
/// or an error, and the receiver stays as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub players: [Player; 4],
    pub wall: Wall,
    pub current_player: u8,
    pub round: u32,
    pub honba: u32,
    pub riichi_sticks: u32,
    pub phase: Phase,
    pub last_action: Option<ActionRecord>,
    pub log: Vec<ActionRecord>,
    pub winner: Option<WinRecord>,
    /// Discard still open to ron/chi/pon/kan: `(discarder, tile)`.
    pub last_discard: Option<(u8, Tile)>,
    pub last_drawn: Option<Tile>,
    pub ron_call_chance: f64,
}

impl TableState {
    /// Empty table with a shuffled wall, before the deal.
    pub fn new<R: Rng + ?Sized>(config: &TrainerConfig, rng: &mut R) -> Self {
        Self::with_wall(config, Wall::shuffled(rng))
    }

    pub fn with_wall(config: &TrainerConfig, wall: Wall) -> Self {
        let dealer = config.dealer_seat % NUM_SEATS;
        let players = [0u8, 1, 2, 3].map(|seat| {
            Player::new(seat, dealer, config.starting_score, seat != config.human_seat)
        });
        Self {
            players,
            wall,
            current_player: dealer,
            round: 1,
            honba: 0,
            riichi_sticks: 0,
            phase: Phase::Dealing,
            last_action: None,
            log: Vec::new(),
            winner: None,
            last_discard: None,
            last_drawn: None,
            ron_call_chance: config.ron_call_chance,
        }
    }

    /// Shuffle and deal in one step.
    pub fn start<R: Rng + ?Sized>(config: &TrainerConfig, rng: &mut R) -> Self {
        Self::new(config, rng).deal()
    }

    /// 13 tiles round-robin to every seat, then the dealer's 14th.
    pub fn deal(mut self) -> Self {
        if self.phase != Phase::Dealing {
            return self;
        }
        for _ in 0..13 {
            for p in self.players.iter_mut() {
                if let Some(t) = self.wall.draw() {
                    p.hand.push(t);
                }
            }
        }
        let dealer = self.players.iter().position(|p| p.is_dealer).unwrap_or(0);
        if let Some(t) = self.wall.draw() {
            self.players[dealer].hand.push(t);
            self.last_drawn = Some(t);
        }
        for p in self.players.iter_mut() {
            p.hand.sort();
        }
        self.current_player = dealer as u8;
        self.phase = Phase::Playing;
        info!("round {} dealt, dealer seat {}, {} tiles in wall", self.round, dealer, self.wall.remaining());
        self
    }

    pub fn player(&self, seat: u8) -> &Player {
        &self.players[seat as usize % 4]
    }

    pub fn current(&self) -> &Player {
        self.player(self.current_player)
    }

    /// The turn holder has not drawn yet.
    pub fn needs_draw(&self) -> bool {
        self.phase == Phase::Playing && self.current().hand.len() == self.current().resting_size()
    }

    /// Tiles on the table; always `NUM_TILES`.
    pub fn total_tiles(&self) -> usize {
        self.wall.remaining() + self.players.iter().map(|p| p.tile_count()).sum::<usize>()
    }

    /// Monotonic id of this committed state.
    pub fn version(&self) -> u64 {
        self.log.len() as u64
    }

    /// The open discard `seat` could win on, if any.
    pub fn ron_claim(&self, seat: u8) -> Option<(u8, Tile)> {
        let (from, tile) = self.last_discard?;
        if from == seat || self.phase != Phase::Playing {
            return None;
        }
        let p = self.player(seat);
        let mut h = p.counts();
        (h.add(tile.kind) && can_complete(&h, p.melds.len())).then_some((from, tile))
    }

    pub fn can_pon(&self, seat: u8) -> bool {
        match self.last_discard {
            Some((from, tile)) => {
                let p = self.player(seat);
                from != seat && !p.is_riichi && !p.is_mid_turn() && p.counts().count(tile.kind) >= 2
            }
            None => false,
        }
    }

    pub fn can_open_kan(&self, seat: u8) -> bool {
        match self.last_discard {
            Some((from, tile)) => {
                let p = self.player(seat);
                from != seat && !p.is_riichi && !p.is_mid_turn() && p.counts().count(tile.kind) >= 3
            }
            None => false,
        }
    }

    /// Any claim `seat` holds on the open discard.
    pub fn has_claim(&self, seat: u8) -> bool {
        self.ron_claim(seat).is_some()
            || self.can_pon(seat)
            || self.can_open_kan(seat)
            || !self.chi_options(seat).is_empty()
    }

    /// Hand-tile pairs `seat` could chi the open discard with.
    pub fn chi_options(&self, seat: u8) -> Vec<[Tile; 2]> {
        let Some((from, tile)) = self.last_discard else {
            return Vec::new();
        };
        let p = self.player(seat);
        if from != (seat + 3) % NUM_SEATS || p.is_riichi || p.is_mid_turn() {
            return Vec::new();
        }
        let find = |offset: i8| {
            tile.kind
                .offset(offset)
                .and_then(|k| p.hand.iter().filter(|t| t.kind == k).min_by_key(|t| t.red).copied())
        };
        [(-2, -1), (-1, 1), (1, 2)]
            .iter()
            .filter_map(|&(a, b)| Some([find(a)?, find(b)?]))
            .collect()
    }

    pub fn apply<R: Rng + ?Sized>(&self, record: ActionRecord, rng: &mut R) -> GameResult<TableState> {
        match self.phase {
            Phase::Playing => {}
            Phase::Dealing => {
                return Err(GameError::invalid(record.action.seat(), "round has not been dealt"))
            }
            phase => return Err(GameError::GameOver { phase }),
        }
        let seat = record.action.seat();
        if seat >= NUM_SEATS {
            return Err(GameError::invalid(seat, "no such seat"));
        }
        if record.action.is_turn_scoped() && seat != self.current_player {
            return Err(GameError::invalid(seat, "not your turn"));
        }
        let mut next = self.clone();
        next.log.push(record);
        next.last_action = Some(record);
        match record.action {
            Action::Draw { seat } => next.draw(seat)?,
            Action::Discard { seat, tile } => {
                if next.player(seat).is_riichi && next.last_drawn.map(|t| t.id) != Some(tile.id) {
                    return Err(GameError::invalid(seat, "riichi hand must discard the drawn tile"));
                }
                next.discard(seat, tile, record.timestamp, rng)?
            }
            Action::Riichi { seat, tile } => next.riichi(seat, tile, record.timestamp, rng)?,
            Action::Tsumo { seat } => {
                let p = next.player(seat);
                if !next.last_drawn.is_some_and(|t| p.holds(&t)) {
                    return Err(GameError::invalid(seat, "tsumo needs a drawn tile"));
                }
                if !p.is_mid_turn() || !can_complete(&p.counts(), p.melds.len()) {
                    return Err(GameError::invalid(seat, "hand is not complete"));
                }
                next.win(seat, WinType::Tsumo, next.last_drawn);
            }
            Action::Ron { seat, tile, from } => {
                next.take_open_discard(seat, from, tile)?;
                if next.ron_claim(seat).is_none() {
                    return Err(GameError::invalid(seat, format!("{} does not complete the hand", tile)));
                }
                if let Some(t) = next.players[from as usize].discards.pop() {
                    next.players[seat as usize].add_tile(t);
                }
                next.win(seat, WinType::Ron { from }, Some(tile));
            }
            Action::Chi { seat, tile, tiles, from } => next.chi(seat, tile, tiles, from)?,
            Action::Pon { seat, tile, from } => next.call_set(seat, tile, from, MeldKind::Triplet)?,
            Action::Kan { seat, tile, from: Some(from) } => next.call_set(seat, tile, from, MeldKind::Quad)?,
            Action::Kan { seat, tile, from: None } => next.concealed_kan(seat, tile)?,
        }
        Ok(next)
    }

    fn draw(&mut self, seat: u8) -> GameResult<()> {
        if seat != self.current_player {
            return Err(GameError::invalid(seat, "not your turn"));
        }
        if !self.needs_draw() {
            return Err(GameError::invalid(seat, "already holding a drawn tile"));
        }
        self.last_discard = None;
        match self.wall.draw() {
            Some(t) => {
                debug!("seat {} draws {} ({} left)", seat, t, self.wall.remaining());
                self.players[seat as usize].add_tile(t);
                self.last_drawn = Some(t);
            }
            None => {
                info!("wall exhausted, round {} ends in a draw", self.round);
                self.last_drawn = None;
                self.phase = Phase::Draw;
            }
        }
        Ok(())
    }

    fn discard<R: Rng + ?Sized>(&mut self, seat: u8, tile: Tile, timestamp: u64, rng: &mut R) -> GameResult<()> {
        let p = &mut self.players[seat as usize];
        if !p.is_mid_turn() {
            return Err(GameError::invalid(seat, "draw before discarding"));
        }
        let tile = p
            .take_tile(&tile)
            .ok_or_else(|| GameError::invalid(seat, format!("{} is not in hand", tile)))?;
        p.discards.push(tile);
        debug!("seat {} discards {}", seat, tile);
        self.current_player = (seat + 1) % NUM_SEATS;
        self.last_discard = Some((seat, tile));
        self.last_drawn = None;

        // Scripted seats may ron; the first one in seat order that says yes wins.
        for other in 0..NUM_SEATS {
            if other == seat || !self.player(other).is_scripted || self.ron_claim(other).is_none() {
                continue;
            }
            if rng.gen_bool(self.ron_call_chance) {
                let ron = ActionRecord::new(Action::Ron { seat: other, tile, from: seat }, timestamp);
                self.log.push(ron);
                self.last_action = Some(ron);
                if let Some(t) = self.players[seat as usize].discards.pop() {
                    self.players[other as usize].add_tile(t);
                }
                self.win(other, WinType::Ron { from: seat }, Some(tile));
                break;
            }
            debug!("seat {} passes on ron with {}", other, tile);
        }
        Ok(())
    }

    fn riichi<R: Rng + ?Sized>(&mut self, seat: u8, tile: Tile, timestamp: u64, rng: &mut R) -> GameResult<()> {
        let p = self.player(seat);
        if p.is_riichi {
            return Err(GameError::invalid(seat, "already in riichi"));
        }
        if !p.is_closed() {
            return Err(GameError::invalid(seat, "riichi needs a closed hand"));
        }
        if p.score < RIICHI_STICK {
            return Err(GameError::invalid(seat, "not enough points for riichi"));
        }
        if self.wall.remaining() < RIICHI_MIN_WALL {
            return Err(GameError::invalid(seat, "too few tiles left for riichi"));
        }
        if !p.is_mid_turn() || !p.holds(&tile) {
            return Err(GameError::invalid(seat, format!("{} is not in hand", tile)));
        }
        let mut rest: Hand = p.counts();
        rest.remove(tile.kind);
        if waits(rest, p.melds.len()).next().is_none() {
            return Err(GameError::invalid(seat, format!("not tenpai after discarding {}", tile)));
        }
        let p = &mut self.players[seat as usize];
        p.is_riichi = true;
        p.score -= RIICHI_STICK;
        self.riichi_sticks += 1;
        info!("seat {} declares riichi", seat);
        self.discard(seat, tile, timestamp, rng)
    }

    /// Checks `tile` is `from`'s open discard and `seat` may claim it.
    fn take_open_discard(&self, seat: u8, from: u8, tile: Tile) -> GameResult<()> {
        if from == seat || from >= NUM_SEATS {
            return Err(GameError::invalid(seat, "cannot claim your own discard"));
        }
        match self.last_discard {
            Some((f, t)) if f == from && t.id == tile.id => Ok(()),
            _ => Err(GameError::invalid(seat, format!("{} is not an open discard from seat {}", tile, from))),
        }
    }

    fn chi(&mut self, seat: u8, tile: Tile, tiles: [Tile; 2], from: u8) -> GameResult<()> {
        self.take_open_discard(seat, from, tile)?;
        if from != (seat + 3) % NUM_SEATS {
            return Err(GameError::invalid(seat, "chi only from the previous seat"));
        }
        let p = &self.players[seat as usize];
        if p.is_riichi || p.is_mid_turn() {
            return Err(GameError::invalid(seat, "cannot call now"));
        }
        if tiles[0].id == tiles[1].id || !p.holds(&tiles[0]) || !p.holds(&tiles[1]) {
            return Err(GameError::invalid(seat, "chi tiles are not in hand"));
        }
        let meld = Meld::new(MeldKind::Run, vec![tiles[0], tiles[1], tile], Some(from))
            .ok_or_else(|| GameError::invalid(seat, "tiles do not form a run"))?;
        let p = &mut self.players[seat as usize];
        for t in &tiles {
            p.take_tile(t);
        }
        self.commit_call(seat, from, meld);
        Ok(())
    }

    fn call_set(&mut self, seat: u8, tile: Tile, from: u8, kind: MeldKind) -> GameResult<()> {
        self.take_open_discard(seat, from, tile)?;
        let need = if kind == MeldKind::Quad { 3 } else { 2 };
        let p = &mut self.players[seat as usize];
        if p.is_riichi || p.is_mid_turn() {
            return Err(GameError::invalid(seat, "cannot call now"));
        }
        let mut tiles = p
            .take_kind(tile.kind, need)
            .ok_or_else(|| GameError::invalid(seat, format!("not enough {} to call", tile.kind)))?;
        tiles.push(tile);
        let meld = Meld::new(kind, tiles, Some(from))
            .ok_or_else(|| GameError::invalid(seat, "tiles do not form a set"))?;
        self.commit_call(seat, from, meld);
        Ok(())
    }

    fn commit_call(&mut self, seat: u8, from: u8, meld: Meld) {
        self.players[from as usize].discards.pop();
        debug!("seat {} calls {:?} from seat {}", seat, meld.kind, from);
        self.players[seat as usize].melds.push(meld);
        self.current_player = seat;
        self.last_discard = None;
        self.last_drawn = None;
    }

    fn concealed_kan(&mut self, seat: u8, tile: Tile) -> GameResult<()> {
        let p = &mut self.players[seat as usize];
        if p.is_riichi || !p.is_mid_turn() {
            return Err(GameError::invalid(seat, "cannot declare kan now"));
        }
        let tiles = p
            .take_kind(tile.kind, 4)
            .ok_or_else(|| GameError::invalid(seat, format!("need four {} for kan", tile.kind)))?;
        let meld = Meld::new(MeldKind::ConcealedQuad, tiles, None)
            .ok_or_else(|| GameError::invalid(seat, "tiles do not form a quad"))?;
        debug!("seat {} declares concealed kan of {}", seat, tile.kind);
        p.melds.push(meld);
        self.last_drawn = None;
        Ok(())
    }

    fn win(&mut self, seat: u8, win_type: WinType, tile: Option<Tile>) {
        // Ron tiles are already in the winner's hand here.
        let score = score_win(self.player(seat), win_type);
        settle(&mut self.players, seat as usize, win_type, score.points, self.honba, self.riichi_sticks);
        info!("seat {} wins by {:?} for {} points", seat, win_type, score.points);
        self.riichi_sticks = 0;
        self.phase = Phase::Won;
        self.last_discard = None;
        self.winner = Some(WinRecord { seat, win_type, tile, score });
    }
}
