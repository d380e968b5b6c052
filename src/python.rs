// src/python.rs
use numpy::PyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::action::Action;
use crate::advisor::analyze;
use crate::config::TrainerConfig;
use crate::game_state::{Phase, TableState};
use crate::session::GameSession;
use crate::tiles::{parse_kinds, tiles_to_string, Tile, TileKind};

/// One trainer table driven from Python. All moves are made for the human seat.
#[pyclass]
struct Trainer {
    session: GameSession,
}

impl Trainer {
    fn seat(&self) -> u8 {
        self.session.human_seat()
    }

    fn state(&self) -> std::sync::Arc<TableState> {
        self.session.snapshot()
    }

    /// Physical tile in the human hand matching `text`, honouring the red flag when possible.
    fn held(&self, text: &str) -> PyResult<Tile> {
        let kinds = parse_kinds(text)?;
        let [(kind, red)] = kinds.as_slice() else {
            return Err(PyValueError::new_err(format!("expected one tile, got '{}'", text)));
        };
        let state = self.state();
        let hand = &state.player(self.seat()).hand;
        hand.iter()
            .find(|t| t.kind == *kind && t.red == *red)
            .or_else(|| hand.iter().find(|t| t.kind == *kind))
            .copied()
            .ok_or_else(|| PyValueError::new_err(format!("{} is not in hand", kind)))
    }

    fn open_discard(&self) -> PyResult<(u8, Tile)> {
        self.state()
            .last_discard
            .ok_or_else(|| PyValueError::new_err("no open discard"))
    }

    fn submit(&mut self, action: Action, now_ms: u64) -> PyResult<()> {
        self.session.submit(action, now_ms)?;
        Ok(())
    }
}

#[pymethods]
impl Trainer {
    #[new]
    #[pyo3(signature = (config_json=None, now_ms=0))]
    fn new(config_json: Option<&str>, now_ms: u64) -> PyResult<Self> {
        let config = match config_json {
            Some(text) => TrainerConfig::from_json_str(text)?,
            None => TrainerConfig::default(),
        };
        Ok(Self { session: GameSession::new(config, now_ms)? })
    }

    fn reset(&mut self, now_ms: u64) -> PyResult<()> {
        Ok(self.session.reset(now_ms)?)
    }

    /// Fires due scripted moves; returns how many were applied.
    fn advance(&mut self, now_ms: u64) -> PyResult<usize> {
        Ok(self.session.advance(now_ms)?)
    }

    fn next_due(&self) -> Option<u64> {
        self.session.next_due()
    }

    fn discard(&mut self, tile: &str, now_ms: u64) -> PyResult<()> {
        let tile = self.held(tile)?;
        self.submit(Action::Discard { seat: self.seat(), tile }, now_ms)
    }

    fn riichi(&mut self, tile: &str, now_ms: u64) -> PyResult<()> {
        let tile = self.held(tile)?;
        self.submit(Action::Riichi { seat: self.seat(), tile }, now_ms)
    }

    /// Draws on turn, or passes on an open claim.
    fn draw(&mut self, now_ms: u64) -> PyResult<()> {
        self.submit(Action::Draw { seat: self.seat() }, now_ms)
    }

    fn tsumo(&mut self, now_ms: u64) -> PyResult<()> {
        self.submit(Action::Tsumo { seat: self.seat() }, now_ms)
    }

    fn ron(&mut self, now_ms: u64) -> PyResult<()> {
        let (from, tile) = self.open_discard()?;
        self.submit(Action::Ron { seat: self.seat(), tile, from }, now_ms)
    }

    fn pon(&mut self, now_ms: u64) -> PyResult<()> {
        let (from, tile) = self.open_discard()?;
        self.submit(Action::Pon { seat: self.seat(), tile, from }, now_ms)
    }

    /// `tiles` names the two hand tiles, e.g. "46p"; the first legal option is used when omitted.
    #[pyo3(signature = (now_ms, tiles=None))]
    fn chi(&mut self, now_ms: u64, tiles: Option<&str>) -> PyResult<()> {
        let (from, tile) = self.open_discard()?;
        let options = self.state().chi_options(self.seat());
        let wanted: Option<Vec<TileKind>> = tiles
            .map(|t| parse_kinds(t).map(|ks| ks.into_iter().map(|(k, _)| k).collect()))
            .transpose()?;
        let pair = options
            .into_iter()
            .find(|p| wanted.as_ref().map_or(true, |w| w.len() == 2 && w.contains(&p[0].kind) && w.contains(&p[1].kind)))
            .ok_or_else(|| PyValueError::new_err("no matching chi"))?;
        self.submit(Action::Chi { seat: self.seat(), tile, tiles: pair, from }, now_ms)
    }

    /// Concealed kan of `tile` on own turn, or open kan on the last discard.
    #[pyo3(signature = (now_ms, tile=None))]
    fn kan(&mut self, now_ms: u64, tile: Option<&str>) -> PyResult<()> {
        let seat = self.seat();
        let action = match tile {
            Some(text) => Action::Kan { seat, tile: self.held(text)?, from: None },
            None => {
                let (from, tile) = self.open_discard()?;
                Action::Kan { seat, tile, from: Some(from) }
            }
        };
        self.submit(action, now_ms)
    }

    fn phase(&self) -> &'static str {
        match self.state().phase {
            Phase::Dealing => "dealing",
            Phase::Playing => "playing",
            Phase::Won => "won",
            Phase::Draw => "draw",
        }
    }

    fn current_player(&self) -> u8 {
        self.state().current_player
    }

    fn scores(&self) -> Vec<i32> {
        self.state().players.iter().map(|p| p.score).collect()
    }

    #[pyo3(signature = (seat=None))]
    fn hand(&self, seat: Option<u8>) -> String {
        let state = self.state();
        tiles_to_string(&state.player(seat.unwrap_or(self.seat())).hand)
    }

    fn discards(&self, seat: u8) -> String {
        tiles_to_string(&self.state().player(seat).discards)
    }

    fn waits(&self) -> PyResult<Vec<String>> {
        let advice = analyze(&self.state(), self.seat())?;
        Ok(advice.waits.iter().map(|k| k.to_string()).collect())
    }

    fn advice<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let a = analyze(&self.state(), self.seat())?;
        let kinds = |ks: &[TileKind]| ks.iter().map(|k| k.to_string()).collect::<Vec<_>>();
        let dict = PyDict::new_bound(py);
        dict.set_item("waits", kinds(&a.waits))?;
        dict.set_item("best_discard", a.best_discard.map(|k| k.to_string()))?;
        dict.set_item("efficiency", a.efficiency)?;
        dict.set_item("safety", a.safety)?;
        dict.set_item("danger_tiles", kinds(&a.danger_tiles))?;
        dict.set_item("win_probability", a.win_probability)?;
        dict.set_item("threats", a.threats)?;
        dict.set_item("recommendation", a.recommendation)?;
        dict.set_item("safety_alert", a.safety_alert)?;
        dict.set_item("progress_tip", a.progress_tip)?;
        Ok(dict)
    }

    /// Concealed-hand counts over the 34 kinds.
    fn hand_counts<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<u8>> {
        let counts = self.state().player(self.seat()).counts().to_counts();
        PyArray1::from_vec_bound(py, counts.to_vec())
    }

    fn log_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.state().log).map_err(|e| PyValueError::new_err(e.to_string()))
    }
}

#[pymodule]
fn riichi_trainer(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Trainer>()?;
    Ok(())
}
