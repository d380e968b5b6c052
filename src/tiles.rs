// src/tiles.rs
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{GameError, GameResult};

/// Number of distinct tile kinds (27 suited + 7 honors).
pub const NUM_KINDS: usize = 34;
/// Physical tiles in a full set.
pub const NUM_TILES: usize = 136;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Man,
    Pin,
    Sou,
    Honor,
}

impl Suit {
    pub fn is_number(self) -> bool {
        self != Suit::Honor
    }

    fn letter(self) -> char {
        match self {
            Suit::Man => 'm',
            Suit::Pin => 'p',
            Suit::Sou => 's',
            Suit::Honor => 'z',
        }
    }
}

/// One of the 34 tile kinds, in canonical sort order.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileKind {
    Man1 = 0, Man2, Man3, Man4, Man5, Man6, Man7, Man8, Man9,
    Pin1, Pin2, Pin3, Pin4, Pin5, Pin6, Pin7, Pin8, Pin9,
    Sou1, Sou2, Sou3, Sou4, Sou5, Sou6, Sou7, Sou8, Sou9,
    East, South, West, North,
    White, Green, Red,
}

impl TryFrom<u8> for TileKind {
    type Error = ();
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        use TileKind::*;
        Ok(match v {
            0 => Man1, 1 => Man2, 2 => Man3, 3 => Man4, 4 => Man5,
            5 => Man6, 6 => Man7, 7 => Man8, 8 => Man9,
            9 => Pin1, 10 => Pin2, 11 => Pin3, 12 => Pin4, 13 => Pin5,
            14 => Pin6, 15 => Pin7, 16 => Pin8, 17 => Pin9,
            18 => Sou1, 19 => Sou2, 20 => Sou3, 21 => Sou4, 22 => Sou5,
            23 => Sou6, 24 => Sou7, 25 => Sou8, 26 => Sou9,
            27 => East, 28 => South, 29 => West, 30 => North,
            31 => White, 32 => Green, 33 => Red,
            _ => return Err(()),
        })
    }
}

const HONOR_GLYPHS: [char; 7] = ['東', '南', '西', '北', '白', '發', '中'];

impl TileKind {
    /// Every kind in enumeration order.
    pub fn all() -> impl Iterator<Item = TileKind> + Clone {
        (0u8..NUM_KINDS as u8).filter_map(|i| TileKind::try_from(i).ok())
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_suit_rank(suit: Suit, rank: u8) -> Option<Self> {
        let (base, max) = match suit {
            Suit::Man => (0, 9),
            Suit::Pin => (9, 9),
            Suit::Sou => (18, 9),
            Suit::Honor => (27, 7),
        };
        if rank == 0 || rank > max {
            return None;
        }
        TileKind::try_from(base + rank - 1).ok()
    }

    pub fn suit(self) -> Suit {
        match self as u8 {
            0..=8 => Suit::Man,
            9..=17 => Suit::Pin,
            18..=26 => Suit::Sou,
            _ => Suit::Honor,
        }
    }

    /// 1-9 for number suits; honors are numbered 1-7 (E S W N White Green Red).
    pub fn rank(self) -> u8 {
        match self.suit() {
            Suit::Honor => self as u8 - 26,
            _ => self as u8 % 9 + 1,
        }
    }

    /// Same-suit neighbour `offset` ranks away, if it exists.
    pub fn offset(self, offset: i8) -> Option<TileKind> {
        if !self.suit().is_number() {
            return None;
        }
        let rank = self.rank() as i8 + offset;
        if !(1..=9).contains(&rank) {
            return None;
        }
        TileKind::from_suit_rank(self.suit(), rank as u8)
    }

    pub fn is_honor(self) -> bool {
        self.suit() == Suit::Honor
    }

    pub fn is_terminal(self) -> bool {
        !self.is_honor() && matches!(self.rank(), 1 | 9)
    }

    pub fn is_terminal_or_honor(self) -> bool {
        self.is_honor() || self.is_terminal()
    }

    /// Returns the common Unicode Mahjong tile symbol
    pub fn to_unicode(self) -> char {
        use TileKind::*;
        match self {
            Man1 => '\u{1F007}', Man2 => '\u{1F008}', Man3 => '\u{1F009}',
            Man4 => '\u{1F00A}', Man5 => '\u{1F00B}', Man6 => '\u{1F00C}',
            Man7 => '\u{1F00D}', Man8 => '\u{1F00E}', Man9 => '\u{1F00F}',
            Sou1 => '\u{1F010}', Sou2 => '\u{1F011}', Sou3 => '\u{1F012}',
            Sou4 => '\u{1F013}', Sou5 => '\u{1F014}', Sou6 => '\u{1F015}',
            Sou7 => '\u{1F016}', Sou8 => '\u{1F017}', Sou9 => '\u{1F018}',
            Pin1 => '\u{1F019}', Pin2 => '\u{1F01A}', Pin3 => '\u{1F01B}',
            Pin4 => '\u{1F01C}', Pin5 => '\u{1F01D}', Pin6 => '\u{1F01E}',
            Pin7 => '\u{1F01F}', Pin8 => '\u{1F020}', Pin9 => '\u{1F021}',
            East => '\u{1F000}', South => '\u{1F001}', West => '\u{1F002}',
            North => '\u{1F003}',
            White => '\u{1F006}', Green => '\u{1F005}', Red => '\u{1F004}',
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suit() {
            Suit::Honor => write!(f, "{}", HONOR_GLYPHS[self.rank() as usize - 1]),
            suit => write!(f, "{}{}", self.rank(), suit.letter()),
        }
    }
}

impl FromStr for TileKind {
    type Err = GameError;

    /// Accepts the display form ("5m", "東") and single-tile mpsz ("5z", "0p").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tiles = parse_kinds(s)?;
        match tiles.as_slice() {
            [(kind, _)] => Ok(*kind),
            _ => Err(GameError::Parse {
                input: s.to_string(),
                message: format!("expected one tile, found {}", tiles.len()),
            }),
        }
    }
}

/// One physical tile. Equality is identity (`id`); set matching uses `kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// 0..136, `kind * 4 + copy`.
    pub id: u8,
    pub kind: TileKind,
    pub red: bool,
}

impl Tile {
    pub fn from_id(id: u8) -> Option<Self> {
        if id as usize >= NUM_TILES {
            return None;
        }
        let kind = TileKind::try_from(id / 4).ok()?;
        let red = kind.suit().is_number() && kind.rank() == 5 && id % 4 == 0;
        Some(Tile { id, kind, red })
    }

    pub fn same_kind(&self, other: &Tile) -> bool {
        self.kind == other.kind
    }

    pub fn to_unicode(self) -> char {
        self.kind.to_unicode()
    }
}

impl Ord for Tile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind.cmp(&other.kind).then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Tile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// The full 136-tile set in id order.
pub fn full_set() -> Vec<Tile> {
    (0..NUM_TILES as u8).filter_map(Tile::from_id).collect()
}

/// Parses mpsz notation ("123m0p77z") and display glyphs ("東東") into kinds.
/// The flag marks a red five ("0m").
pub fn parse_kinds(text: &str) -> GameResult<Vec<(TileKind, bool)>> {
    let parse_err = |message: String| GameError::Parse { input: text.to_string(), message };
    let mut out = Vec::new();
    let mut pending: Vec<u8> = Vec::new();

    for c in text.chars() {
        if c.is_whitespace() || c == ',' {
            continue;
        }
        if let Some(d) = c.to_digit(10) {
            pending.push(d as u8);
            continue;
        }
        if let Some(pos) = HONOR_GLYPHS.iter().position(|&g| g == c) {
            if !pending.is_empty() {
                return Err(parse_err(format!("digits before honor glyph '{}'", c)));
            }
            let kind = TileKind::from_suit_rank(Suit::Honor, pos as u8 + 1)
                .ok_or_else(|| parse_err(format!("bad honor glyph '{}'", c)))?;
            out.push((kind, false));
            continue;
        }
        let suit = match c {
            'm' => Suit::Man,
            'p' => Suit::Pin,
            's' => Suit::Sou,
            'z' => Suit::Honor,
            _ => return Err(parse_err(format!("unexpected character '{}'", c))),
        };
        if pending.is_empty() {
            return Err(parse_err(format!("suit '{}' without ranks", c)));
        }
        for d in pending.drain(..) {
            let (rank, red) = if d == 0 && suit.is_number() { (5, true) } else { (d, false) };
            let kind = TileKind::from_suit_rank(suit, rank)
                .ok_or_else(|| parse_err(format!("rank {} out of range for '{}'", d, c)))?;
            out.push((kind, red));
        }
    }
    if !pending.is_empty() {
        return Err(parse_err("trailing ranks without a suit".to_string()));
    }
    Ok(out)
}

/// Parses a hand string into distinct physical tiles, at most four per kind.
pub fn parse_tiles(text: &str) -> GameResult<Vec<Tile>> {
    let mut used = [[false; 4]; NUM_KINDS];
    let mut tiles = Vec::new();
    for (kind, red) in parse_kinds(text)? {
        let is_five = kind.suit().is_number() && kind.rank() == 5;
        let order: &[u8] = match (is_five, red) {
            (true, true) => &[0],
            (true, false) => &[1, 2, 3, 0],
            (false, _) => &[0, 1, 2, 3],
        };
        let copy = order
            .iter()
            .copied()
            .find(|&c| !used[kind.index()][c as usize])
            .ok_or_else(|| GameError::Parse {
                input: text.to_string(),
                message: format!("no more copies of {}", kind),
            })?;
        used[kind.index()][copy as usize] = true;
        if let Some(tile) = Tile::from_id(kind as u8 * 4 + copy) {
            tiles.push(tile);
        }
    }
    Ok(tiles)
}

/// Display strings joined by spaces.
pub fn tiles_to_string(tiles: &[Tile]) -> String {
    tiles.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(" ")
}
