//! Castling rights.

use crate::{Color, Square};

/// Which wing a castle goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::King, CastleSide::Queen];

    /// Home square of the rook that castles on this side.
    #[inline]
    pub const fn rook_home(self, color: Color) -> Square {
        match (self, color) {
            (CastleSide::King, Color::White) => Square::H1,
            (CastleSide::Queen, Color::White) => Square::A1,
            (CastleSide::King, Color::Black) => Square::H8,
            (CastleSide::Queen, Color::Black) => Square::A8,
        }
    }

    /// Square the rook lands on.
    #[inline]
    pub const fn rook_target(self, color: Color) -> Square {
        match (self, color) {
            (CastleSide::King, Color::White) => Square::F1,
            (CastleSide::Queen, Color::White) => Square::D1,
            (CastleSide::King, Color::Black) => Square::F8,
            (CastleSide::Queen, Color::Black) => Square::D8,
        }
    }

    /// Square the king lands on.
    #[inline]
    pub const fn king_target(self, color: Color) -> Square {
        match (self, color) {
            (CastleSide::King, Color::White) => Square::G1,
            (CastleSide::Queen, Color::White) => Square::C1,
            (CastleSide::King, Color::Black) => Square::G8,
            (CastleSide::Queen, Color::Black) => Square::C8,
        }
    }

    /// Side implied by the king's destination file, if it is a castling one.
    #[inline]
    pub const fn from_king_target(target: Square) -> Option<CastleSide> {
        match target.col() {
            6 => Some(CastleSide::King),
            2 => Some(CastleSide::Queen),
            _ => None,
        }
    }
}

/// The king's home square for a color.
#[inline]
pub const fn king_home(color: Color) -> Square {
    match color {
        Color::White => Square::E1,
        Color::Black => Square::E8,
    }
}

/// Four independent castling flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates new castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    #[inline]
    const fn flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::King) => Self::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queen) => Self::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::King) => Self::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queen) => Self::BLACK_QUEENSIDE,
        }
    }

    /// Returns true if the right is still held.
    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::flag(color, side) != 0
    }

    #[inline]
    pub fn grant(&mut self, color: Color, side: CastleSide) {
        self.0 |= Self::flag(color, side);
    }

    #[inline]
    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::flag(color, side);
    }

    /// Removes both rights of a color.
    #[inline]
    pub fn revoke_color(&mut self, color: Color) {
        self.revoke(color, CastleSide::King);
        self.revoke(color, CastleSide::Queen);
    }

    /// Drops whichever right depends on a rook standing on `square`.
    ///
    /// Called for both the departure and the arrival square of every move, so
    /// a rook that leaves home or is captured at home loses its right.
    #[inline]
    pub fn revoke_rook_square(&mut self, square: Square) {
        for color in Color::BOTH {
            for side in CastleSide::BOTH {
                if side.rook_home(color) == square {
                    self.revoke(color, side);
                }
            }
        }
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Parses the FEN castling field ("KQkq", "Kq", "-", ...).
    pub fn from_fen(field: &str) -> Option<Self> {
        if field == "-" {
            return Some(Self::NONE);
        }
        if field.is_empty() {
            return None;
        }
        let mut rights = Self::NONE;
        for c in field.chars() {
            match c {
                'K' => rights.grant(Color::White, CastleSide::King),
                'Q' => rights.grant(Color::White, CastleSide::Queen),
                'k' => rights.grant(Color::Black, CastleSide::King),
                'q' => rights.grant(Color::Black, CastleSide::Queen),
                _ => return None,
            }
        }
        Some(rights)
    }

    /// Formats the rights as the FEN castling field.
    pub fn to_fen(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        for (color, side, c) in [
            (Color::White, CastleSide::King, 'K'),
            (Color::White, CastleSide::Queen, 'Q'),
            (Color::Black, CastleSide::King, 'k'),
            (Color::Black, CastleSide::Queen, 'q'),
        ] {
            if self.has(color, side) {
                s.push(c);
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_and_revoke() {
        let mut rights = CastlingRights::ALL;
        assert!(rights.has(Color::White, CastleSide::King));
        rights.revoke(Color::White, CastleSide::King);
        assert!(!rights.has(Color::White, CastleSide::King));
        assert!(rights.has(Color::White, CastleSide::Queen));

        rights.revoke_color(Color::Black);
        assert!(!rights.has(Color::Black, CastleSide::King));
        assert!(!rights.has(Color::Black, CastleSide::Queen));
        assert_eq!(rights.raw(), CastlingRights::WHITE_QUEENSIDE);
    }

    #[test]
    fn rook_square_revocation() {
        let mut rights = CastlingRights::ALL;
        rights.revoke_rook_square(Square::A8);
        assert!(!rights.has(Color::Black, CastleSide::Queen));
        rights.revoke_rook_square(Square::E1);
        assert_eq!(rights.to_fen(), "KQk");
    }

    #[test]
    fn fen_field_roundtrip() {
        for field in ["KQkq", "Kq", "k", "-"] {
            assert_eq!(CastlingRights::from_fen(field).unwrap().to_fen(), field);
        }
        assert_eq!(CastlingRights::from_fen("XYZ"), None);
        assert_eq!(CastlingRights::from_fen(""), None);
    }

    #[test]
    fn castle_geometry() {
        assert_eq!(CastleSide::King.king_target(Color::White), Square::G1);
        assert_eq!(CastleSide::Queen.rook_target(Color::Black), Square::D8);
        assert_eq!(
            CastleSide::from_king_target(Square::C8),
            Some(CastleSide::Queen)
        );
        assert_eq!(CastleSide::from_king_target(Square::F1), None);
        assert_eq!(king_home(Color::Black), Square::E8);
    }
}
