// src/session.rs
//! Drives one table: commits actions one at a time, auto-draws at turn start,
//! offers calls to the scripted seats and times their moves through the
//! scheduler. Readers only ever see the committed `Arc<TableState>`.

use std::sync::Arc;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::action::{Action, ActionRecord};
use crate::bot::Bot;
use crate::config::TrainerConfig;
use crate::errors::GameResult;
use crate::game_state::{Phase, TableState, NUM_SEATS};
use crate::scheduler::{Scheduler, TurnKey};

#[derive(Debug)]
pub struct GameSession {
    config: TrainerConfig,
    state: Arc<TableState>,
    scheduler: Scheduler,
    bot: Bot,
    rng: StdRng,
    generation: u32,
    /// Version whose open discard the human passed on.
    passed: Option<u64>,
    /// Version whose open discard the scripted seats already saw.
    offered: Option<u64>,
}

impl GameSession {
    /// Shuffles, deals and settles the first turn.
    pub fn new(config: TrainerConfig, now_ms: u64) -> GameResult<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = TableState::start(&config, &mut rng);
        Self::build(config, state, rng, now_ms)
    }

    /// Session over an already dealt table.
    pub fn from_state(config: TrainerConfig, state: TableState, now_ms: u64) -> GameResult<Self> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed.unwrap_or_default());
        Self::build(config, state, rng, now_ms)
    }

    fn build(config: TrainerConfig, state: TableState, rng: StdRng, now_ms: u64) -> GameResult<Self> {
        let mut session = Self {
            bot: Bot::from_config(&config),
            config,
            state: Arc::new(state),
            scheduler: Scheduler::new(),
            rng,
            generation: 0,
            passed: None,
            offered: None,
        };
        session.settle(now_ms)?;
        Ok(session)
    }

    pub fn snapshot(&self) -> Arc<TableState> {
        Arc::clone(&self.state)
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn human_seat(&self) -> u8 {
        self.config.human_seat
    }

    pub fn key(&self) -> TurnKey {
        TurnKey { generation: self.generation, version: self.state.version() }
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    /// Submits an action. A `Draw` from a seat holding a claim on the open
    /// discard passes on that claim; the scripted seats then get their calls
    /// before the turn's own draw.
    pub fn submit(&mut self, action: Action, now_ms: u64) -> GameResult<Arc<TableState>> {
        if let Action::Draw { seat } = action {
            let version = self.state.version();
            if self.passed != Some(version) && self.state.has_claim(seat) {
                debug!("seat {} passes on {:?}", seat, self.state.last_discard);
                self.passed = Some(version);
                self.settle(now_ms)?;
                return Ok(self.snapshot());
            }
        }
        self.commit(action, now_ms)?;
        self.settle(now_ms)?;
        Ok(self.snapshot())
    }

    /// Fires every timer due at `now_ms`, in due order. Returns how many
    /// scripted moves were applied.
    pub fn advance(&mut self, now_ms: u64) -> GameResult<usize> {
        let mut fired = 0;
        while let Some(timer) = self.scheduler.pop_due(now_ms) {
            if timer.key != self.key() {
                debug!("dropping stale timer {:?}", timer.key);
                continue;
            }
            let action = self.bot.decide(timer.seat, &self.state, &mut self.rng)?;
            self.commit(action, timer.due_ms)?;
            fired += 1;
            self.settle(timer.due_ms)?;
        }
        Ok(fired)
    }

    /// Cancels everything pending and deals a fresh table.
    pub fn reset(&mut self, now_ms: u64) -> GameResult<()> {
        self.scheduler.cancel_all();
        self.generation += 1;
        self.passed = None;
        self.offered = None;
        self.state = Arc::new(TableState::start(&self.config, &mut self.rng));
        info!("session reset, generation {}", self.generation);
        self.settle(now_ms)
    }

    fn commit(&mut self, action: Action, now_ms: u64) -> GameResult<()> {
        match self.state.apply(ActionRecord::new(action, now_ms), &mut self.rng) {
            Ok(next) => {
                self.scheduler.cancel(self.key());
                self.state = Arc::new(next);
                Ok(())
            }
            Err(e) => {
                warn!("rejected {} from seat {}: {}", action.name(), action.seat(), e);
                Err(e)
            }
        }
    }

    /// Runs the automatic steps after a commit until someone has to think.
    fn settle(&mut self, now_ms: u64) -> GameResult<()> {
        loop {
            let state = Arc::clone(&self.state);
            if state.phase != Phase::Playing {
                return Ok(());
            }
            let version = state.version();
            let human = self.config.human_seat;
            let human_pending = state.last_discard.is_some() && self.passed != Some(version);

            // Ron outranks every call, so the human answers first.
            if human_pending && state.ron_claim(human).is_some() {
                return Ok(());
            }
            if state.last_discard.is_some() && self.offered != Some(version) {
                self.offered = Some(version);
                if let Some(call) = self.offer_calls(&state) {
                    self.commit(call, now_ms)?;
                    continue;
                }
            }
            if state.needs_draw() {
                if human_pending && state.has_claim(human) {
                    return Ok(());
                }
                self.commit(Action::Draw { seat: state.current_player }, now_ms)?;
                continue;
            }
            let seat = state.current_player;
            if state.player(seat).is_scripted {
                let due = now_ms.saturating_add(self.think_delay());
                self.scheduler.schedule(self.key(), seat, due);
            }
            return Ok(());
        }
    }

    /// First pon in turn order, otherwise the chi if one was wanted.
    fn offer_calls(&mut self, state: &TableState) -> Option<Action> {
        let (from, _) = state.last_discard?;
        let calls: Vec<Action> = (1..NUM_SEATS)
            .map(|i| (from + i) % NUM_SEATS)
            .filter(|&seat| state.player(seat).is_scripted)
            .filter_map(|seat| self.bot.should_call_meld(seat, state, &mut self.rng))
            .collect();
        calls
            .iter()
            .find(|a| matches!(a, Action::Pon { .. }))
            .or_else(|| calls.first())
            .copied()
    }

    fn think_delay(&mut self) -> u64 {
        let [min, max] = self.config.think_delay_ms;
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Difficulty;
    use crate::test_support::{find, stacked_with};
    use crate::tiles::TileKind;

    fn quiet() -> TrainerConfig {
        TrainerConfig {
            seed: Some(5),
            bot_difficulty: Difficulty::Novice,
            novice_call_chance: 0.0,
            ron_call_chance: 0.0,
            ..TrainerConfig::default()
        }
    }

    fn junk_session(now: u64) -> GameSession {
        let config = quiet();
        let state = stacked_with(&config, ["", "", "", ""]);
        GameSession::from_state(config, state, now).unwrap()
    }

    #[test]
    fn human_dealer_waits_for_input() {
        let s = junk_session(0);
        let gs = s.snapshot();
        assert_eq!(gs.current_player, 0);
        assert!(gs.players[0].is_mid_turn());
        assert_eq!(s.pending_timers(), 0);
    }

    #[test]
    fn discard_hands_turn_to_scripted_seat() {
        let mut s = junk_session(0);
        let tile = s.snapshot().players[0].hand[0];
        let gs = s.submit(Action::Discard { seat: 0, tile }, 500).unwrap();
        // seat 1 was auto-drawn and now thinks
        assert_eq!(gs.current_player, 1);
        assert_eq!(gs.players[1].hand.len(), 14);
        assert_eq!(s.pending_timers(), 1);
        let due = s.next_due().unwrap();
        assert!((1500..3500).contains(&due));

        assert_eq!(s.advance(due - 1).unwrap(), 0);
        assert_eq!(s.advance(u64::MAX).unwrap(), 3);
        let gs = s.snapshot();
        assert_eq!(gs.current_player, 0);
        assert!(gs.players[0].is_mid_turn());
        assert!(gs.players.iter().all(|p| p.discards.len() == 1));
        assert_eq!(s.pending_timers(), 0);
        assert_eq!(gs.total_tiles(), 136);
    }

    #[test]
    fn rejected_action_leaves_snapshot_alone() {
        let mut s = junk_session(0);
        let before = s.snapshot();
        let foreign = before.players[2].hand[0];
        assert!(s.submit(Action::Discard { seat: 0, tile: foreign }, 0).is_err());
        assert!(Arc::ptr_eq(&before, &s.snapshot()));
    }

    #[test]
    fn reset_cancels_pending_turns() {
        let mut s = junk_session(0);
        let tile = s.snapshot().players[0].hand[0];
        s.submit(Action::Discard { seat: 0, tile }, 0).unwrap();
        assert_eq!(s.pending_timers(), 1);
        let old = s.key();
        s.reset(10).unwrap();
        assert_ne!(s.key(), old);
        assert_eq!(s.pending_timers(), 0);
        assert_eq!(s.advance(u64::MAX).unwrap(), 0);
        assert!(s.snapshot().log.is_empty());
    }

    #[test]
    fn stale_timer_is_dropped() {
        let mut s = junk_session(0);
        let stale = TurnKey { generation: 7, version: 0 };
        s.scheduler.schedule(stale, 1, 0);
        assert_eq!(s.advance(100).unwrap(), 0);
        assert!(s.snapshot().log.is_empty());
    }

    #[test]
    fn human_pon_claim_defers_the_draw() {
        let config = TrainerConfig { dealer_seat: 3, bot_difficulty: Difficulty::Intermediate, ..quiet() };
        let state = stacked_with(&config, ["77z123m456p789s12z", "", "", "13579m2468p1357s7z"]);
        let mut s = GameSession::from_state(config, state, 0).unwrap();
        assert_eq!(s.pending_timers(), 1);
        assert_eq!(s.advance(u64::MAX).unwrap(), 1);

        let gs = s.snapshot();
        let (from, red) = gs.last_discard.unwrap();
        assert_eq!((from, red.kind), (3, TileKind::Red));
        assert!(gs.needs_draw());
        assert!(gs.can_pon(0));

        let gs = s.submit(Action::Pon { seat: 0, tile: red, from: 3 }, 9000).unwrap();
        assert_eq!(gs.players[0].melds.len(), 1);
        assert_eq!(gs.players[0].hand.len(), 11);
        assert_eq!(gs.current_player, 0);
        assert_eq!(s.pending_timers(), 0);
    }

    #[test]
    fn human_draw_passes_on_a_claim() {
        let config = TrainerConfig { human_seat: 2, bot_difficulty: Difficulty::Intermediate, ..quiet() };
        let state = stacked_with(&config, ["13579m2468p1357s7z", "", "77z123m456p789s12z", ""]);
        let mut s = GameSession::from_state(config, state, 0).unwrap();
        s.advance(u64::MAX).unwrap();
        let gs = s.snapshot();
        assert_eq!(gs.current_player, 1);
        assert!(gs.needs_draw());
        assert!(gs.can_pon(2));

        let gs = s.submit(Action::Draw { seat: 2 }, 5000).unwrap();
        assert_eq!(gs.players[1].hand.len(), 14);
        assert_eq!(s.pending_timers(), 1);
    }

    #[test]
    fn passing_on_ron_still_offers_the_pon() {
        let config = TrainerConfig { dealer_seat: 3, novice_call_chance: 1.0, ..quiet() };
        let dealt = stacked_with(&config, ["123m456p789s1115z", "", "55z147m258p369s23z", "13579m2468p1357s5z"]);
        let white = find(&dealt.players[3].hand, TileKind::White);
        let state = dealt
            .apply(ActionRecord::new(Action::Discard { seat: 3, tile: white }, 0), &mut StdRng::seed_from_u64(0))
            .unwrap();
        let mut s = GameSession::from_state(config, state, 0).unwrap();
        let gs = s.snapshot();
        assert_eq!(gs.current_player, 0);
        assert!(gs.ron_claim(0).is_some());
        assert!(gs.can_pon(2));
        assert_eq!(s.pending_timers(), 0);

        // seat 0 is on turn, so its draw doubles as the pass
        let gs = s.submit(Action::Draw { seat: 0 }, 3000).unwrap();
        assert_eq!(gs.players[2].melds.len(), 1);
        assert_eq!(gs.current_player, 2);
        assert_eq!(gs.players[0].hand.len(), 13);
        assert!(gs.players[3].discards.is_empty());
        assert_eq!(s.pending_timers(), 1);
    }

    #[test]
    fn human_answers_ron_first() {
        let config = TrainerConfig { dealer_seat: 3, bot_difficulty: Difficulty::Intermediate, ..quiet() };
        let state = stacked_with(&config, ["123m456p789s1115z", "", "", "13579m2468p1357s5z"]);
        let mut s = GameSession::from_state(config, state, 0).unwrap();
        s.advance(u64::MAX).unwrap();
        let gs = s.snapshot();
        let (from, white) = gs.ron_claim(0).unwrap();
        assert_eq!(white.kind, TileKind::White);

        let gs = s.submit(Action::Ron { seat: 0, tile: white, from }, 4000).unwrap();
        assert_eq!(gs.phase, Phase::Won);
        assert_eq!(gs.winner.as_ref().map(|w| w.seat), Some(0));
        assert!(s.submit(Action::Draw { seat: 1 }, 4001).is_err());
    }

    #[test]
    fn same_seed_same_game() {
        let config = TrainerConfig { seed: Some(99), ..TrainerConfig::default() };
        let play = || {
            let mut s = GameSession::new(config.clone(), 0).unwrap();
            let gs = s.snapshot();
            let tile = find(&gs.players[0].hand, gs.players[0].hand[13].kind);
            s.submit(Action::Discard { seat: 0, tile }, 0).unwrap();
            s.advance(u64::MAX).unwrap();
            s.snapshot()
        };
        assert_eq!(*play(), *play());
    }
}
