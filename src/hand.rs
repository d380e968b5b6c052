// src/hand.rs
use crate::tiles::{Tile, TileKind, NUM_KINDS};

/// Bit-packed tile multiset: 3 bits per tile kind (0–4 copies used).
/// `Copy`, so the completion search recurses on cheap value copies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Hand(u128);

impl Hand {
    pub fn from_kinds<I: IntoIterator<Item = TileKind>>(kinds: I) -> Self {
        let mut h = Hand::default();
        for k in kinds {
            h.add(k);
        }
        h
    }

    pub fn from_tiles<'a, I: IntoIterator<Item = &'a Tile>>(tiles: I) -> Self {
        Hand::from_kinds(tiles.into_iter().map(|t| t.kind))
    }

    /// Adds one copy; returns false (unchanged) when all four are already held.
    pub fn add(&mut self, kind: TileKind) -> bool {
        let shift = kind as u32 * 3;
        let mask = 0b111u128 << shift;
        let count = (self.0 & mask) >> shift;
        if count >= 4 {
            return false;
        }
        self.0 = (self.0 & !mask) | ((count + 1) << shift);
        true
    }

    pub fn count(&self, kind: TileKind) -> u8 {
        let shift = kind as u32 * 3;
        ((self.0 >> shift) & 0b111) as u8
    }

    pub fn remove(&mut self, kind: TileKind) -> bool {
        self.remove_n(kind, 1)
    }

    /// Removes `n` copies at once, or nothing if fewer are held.
    pub fn remove_n(&mut self, kind: TileKind, n: u8) -> bool {
        let shift = kind as u32 * 3;
        let mask = 0b111u128 << shift;
        let count = ((self.0 & mask) >> shift) as u8;
        if count < n {
            return false;
        }
        self.0 = (self.0 & !mask) | (((count - n) as u128) << shift);
        true
    }

    pub fn len(&self) -> usize {
        self.iter().map(|(_, c)| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Lowest kind present in canonical order.
    pub fn lowest(&self) -> Option<TileKind> {
        self.iter().next().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TileKind, u8)> + '_ {
        TileKind::all().filter_map(move |k| {
            let c = self.count(k);
            (c > 0).then_some((k, c))
        })
    }

    /// Plain count array, indexed by `TileKind as usize`.
    pub fn to_counts(&self) -> [u8; NUM_KINDS] {
        let mut counts = [0u8; NUM_KINDS];
        for (k, c) in self.iter() {
            counts[k.index()] = c;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::parse_tiles;
    use crate::tiles::TileKind::*;

    #[test]
    fn counts_are_packed_per_kind() {
        let mut h = Hand::from_kinds([Man5, Man5, Sou9]);
        assert!(h.add(Man6));
        assert_eq!((h.count(Man5), h.count(Man6), h.count(Sou9)), (2, 1, 1));
        // neighbours in the packing do not bleed into each other
        assert_eq!(h.count(Man4), 0);
        assert_eq!(h.count(Man7), 0);
        assert_eq!(h.len(), 4);
    }

    #[test]
    fn fifth_copy_is_refused() {
        let mut h = Hand::from_kinds([Red, Red, Red, Red]);
        assert!(!h.add(Red));
        assert_eq!(h.count(Red), 4);
    }

    #[test]
    fn iter_walks_kinds_in_canonical_order() {
        let mut h = Hand::from_kinds([North, Pin1, Man9, Pin1]);
        let seen: Vec<_> = h.iter().collect();
        assert_eq!(seen, vec![(Man9, 1), (Pin1, 2), (North, 1)]);
        assert!(h.remove_n(Pin1, 2));
        assert!(!h.remove(Pin1));
        assert_eq!(h.lowest(), Some(Man9));
        assert!(h.remove(Man9) && h.remove(North));
        assert!(h.is_empty());
        assert_eq!(h.lowest(), None);
    }

    #[test]
    fn remove_n_is_all_or_nothing() {
        let mut h = Hand::from_kinds([Pin3, Pin3]);
        assert!(!h.remove_n(Pin3, 3));
        assert_eq!(h.count(Pin3), 2);
        assert!(h.remove_n(Pin3, 2));
        assert!(h.is_empty());
    }

    #[test]
    fn from_tiles_ignores_identity() {
        let tiles = parse_tiles("550m7z").unwrap();
        let h = Hand::from_tiles(&tiles);
        assert_eq!(h.count(Man5), 3);
        assert_eq!(h.lowest(), Some(Man5));
        assert_eq!(h.to_counts()[Red.index()], 1);
    }
}
