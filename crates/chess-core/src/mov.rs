//! Move representation.

use crate::{Piece, Square};
use std::fmt;

const SQUARE_MASK: u32 = 0x7F;
const PROMOTION_MASK: u32 = 0x7;
const TO_SHIFT: u32 = 3;
const FROM_SHIFT: u32 = 10;

/// A chess move: the triple (from, to, promotion).
///
/// Packed into one integer: 7 bits from, 7 bits to (both 0x88 indices),
/// then 3 low bits of promotion kind where 0 means none and 1-4 are the
/// [`Piece::index`] of knight through queen. Castling and en passant are
/// not encoded; the board recognises them from the piece that moves.
///
/// Moves order by their packed value, so sorting a list groups moves by
/// source square.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move(u32);

impl Move {
    /// Creates a new move.
    #[inline]
    pub const fn new(from: Square, to: Square, promotion: Option<Piece>) -> Self {
        let code = match promotion {
            Some(piece) => piece.index() as u32,
            None => 0,
        };
        Move(((from.index() as u32) << FROM_SHIFT) | ((to.index() as u32) << TO_SHIFT) | code)
    }

    /// Creates a move without promotion.
    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Self::new(from, to, None)
    }

    /// Rebuilds a move from its packed value, rejecting malformed encodings.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        if raw >> (FROM_SHIFT + 7) != 0 {
            return None;
        }
        let from = (raw >> FROM_SHIFT) as u8;
        let to = ((raw >> TO_SHIFT) & SQUARE_MASK) as u8;
        let code = raw & PROMOTION_MASK;
        if !Square::is_on_board(from) || !Square::is_on_board(to) || code > 4 {
            return None;
        }
        Some(Move(raw))
    }

    /// The packed value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the source square.
    #[inline]
    pub const fn from(self) -> Square {
        match Square::from_index(((self.0 >> FROM_SHIFT) & SQUARE_MASK) as u8) {
            Some(sq) => sq,
            None => unreachable!(),
        }
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        match Square::from_index(((self.0 >> TO_SHIFT) & SQUARE_MASK) as u8) {
            Some(sq) => sq,
            None => unreachable!(),
        }
    }

    /// Returns the promotion kind, if any.
    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        match self.0 & PROMOTION_MASK {
            1 => Some(Piece::Knight),
            2 => Some(Piece::Bishop),
            3 => Some(Piece::Rook),
            4 => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Returns the same move with a different promotion kind.
    #[inline]
    pub const fn with_promotion(self, promotion: Option<Piece>) -> Self {
        Self::new(self.from(), self.to(), promotion)
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        match self.promotion() {
            Some(piece) => format!("{}{}{}", self.from(), self.to(), piece.to_char()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }

    /// Parses a coordinate move such as "g1f3" or "a7a8q".
    ///
    /// Only the shape is checked; whether the move is playable is up to the board.
    pub fn from_uci(s: &str) -> Option<Self> {
        if s.len() < 4 || s.len() > 5 || !s.is_ascii() {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s.as_bytes().get(4) {
            None => None,
            Some(&b) => {
                let (piece, _) = Piece::from_fen_char(b as char)?;
                if !piece.is_promotion_target() {
                    return None;
                }
                Some(piece)
            }
        };
        Some(Move::new(from, to, promotion))
    }

    /// Placeholder value meaning "no move". a1a1 is never playable.
    pub const NULL: Move = Move(0);

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
