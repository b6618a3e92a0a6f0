//! Attack detection and castling gating.
//!
//! Attacks are found by looking outward from the target square: the first
//! occupied cell along each ray decides that ray, then the knight and pawn
//! squares are probed. Nothing is allocated and the scan returns on the first
//! attacker found. This runs once per candidate move during legality
//! filtering, so it is the hottest path in move generation.

use chess_core::square::{Offset, DIAGONALS, KNIGHT_JUMPS, ORTHOGONALS};
use chess_core::{king_home, CastleSide, Color, Piece, Square};

use crate::Board;

impl Board {
    /// Returns true if any piece of the color opposing `defender` attacks `square`.
    pub fn is_square_attacked(&self, defender: Color, square: Square) -> bool {
        let attacker = defender.opposite();

        for &dir in &ORTHOGONALS {
            if self.ray_attacked(square, dir, attacker, Piece::Rook) {
                return true;
            }
        }
        for &dir in &DIAGONALS {
            if self.ray_attacked(square, dir, attacker, Piece::Bishop) {
                return true;
            }
        }

        for &jump in &KNIGHT_JUMPS {
            if let Some(from) = square.offset(jump) {
                if self.piece_at(from) == Some((Piece::Knight, attacker)) {
                    return true;
                }
            }
        }

        // An attacking pawn sits one step "ahead" of the square from the
        // defender's point of view, i.e. where the defender's own pawn would capture.
        for &step in &defender.pawn_captures() {
            if let Some(from) = square.offset(step) {
                if self.piece_at(from) == Some((Piece::Pawn, attacker)) {
                    return true;
                }
            }
        }

        false
    }

    /// Walks one ray from `square`. The first piece met attacks along it when it
    /// belongs to `attacker` and is either `slider`, a queen, or an adjacent king.
    #[inline]
    fn ray_attacked(&self, square: Square, dir: Offset, attacker: Color, slider: Piece) -> bool {
        let mut current = square;
        let mut adjacent = true;
        while let Some(next) = current.offset(dir) {
            if let Some((piece, color)) = self.piece_at(next) {
                return color == attacker
                    && (piece == slider || piece == Piece::Queen || (adjacent && piece == Piece::King));
            }
            adjacent = false;
            current = next;
        }
        false
    }

    /// Returns true if `color`'s king is attacked. A board without that king is never in check.
    #[inline]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_square_attacked(color, king))
    }

    /// King-side castle: right held, f/g empty, e/f/g not attacked.
    #[inline]
    pub fn can_king_castle(&self, color: Color) -> bool {
        self.can_castle(color, CastleSide::King)
    }

    /// Queen-side castle: right held, b/c/d empty, e/d/c not attacked.
    #[inline]
    pub fn can_queen_castle(&self, color: Color) -> bool {
        self.can_castle(color, CastleSide::Queen)
    }

    /// Castling legality for `color` on `side`, judged on the current board.
    ///
    /// The right must still be held, the king and rook must be on their home
    /// squares, every square between them must be empty, and none of the
    /// squares the king stands on or crosses may be attacked.
    pub fn can_castle(&self, color: Color, side: CastleSide) -> bool {
        if !self.castling.has(color, side) {
            return false;
        }
        let home = king_home(color);
        let rook_home = side.rook_home(color);
        if self.piece_at(home) != Some((Piece::King, color))
            || self.piece_at(rook_home) != Some((Piece::Rook, color))
        {
            return false;
        }

        let row = home.row();
        let (lo, hi) = if rook_home.col() < home.col() {
            (rook_home.col() + 1, home.col())
        } else {
            (home.col() + 1, rook_home.col())
        };
        for col in lo..hi {
            if let Some(sq) = Square::from_coords(row, col) {
                if !self.is_empty(sq) {
                    return false;
                }
            }
        }

        let target = side.king_target(color);
        let (lo, hi) = if target.col() < home.col() {
            (target.col(), home.col())
        } else {
            (home.col(), target.col())
        };
        for col in lo..=hi {
            if let Some(sq) = Square::from_coords(row, col) {
                if self.is_square_attacked(color, sq) {
                    return false;
                }
            }
        }
        true
    }
}
