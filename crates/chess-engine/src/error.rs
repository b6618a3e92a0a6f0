//! Errors raised by board mutation and move resolution.

use chess_core::{Move, Square};
use thiserror::Error;

/// Why a move could not be applied or undone.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// The caller named a from/to pair matching several promotions.
    #[error("ambiguous move {from}{to}: a promotion piece is required")]
    AmbiguousMove { from: Square, to: Square },

    #[error("no piece on {0}")]
    NoPieceOnSquare(Square),

    /// The destination is not in the moving piece's candidate set.
    #[error("illegal move {0}")]
    IllegalPseudoMove(Move),

    /// Pseudo-legal, but the mover's king would be attacked afterwards.
    #[error("move {0} leaves the king in check")]
    OwnKingInCheck(Move),

    /// Board bookkeeping disagrees with itself; this is a bug, not bad input.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl MoveError {
    /// True for the outcome legality filtering expects and skips over.
    #[inline]
    pub fn is_own_king_in_check(&self) -> bool {
        matches!(self, MoveError::OwnKingInCheck(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_square_or_move() {
        let mv = Move::from_uci("e2e5").unwrap();
        assert_eq!(MoveError::IllegalPseudoMove(mv).to_string(), "illegal move e2e5");
        assert_eq!(MoveError::NoPieceOnSquare(Square::D1).to_string(), "no piece on d1");
        let amb = MoveError::AmbiguousMove {
            from: Square::from_algebraic("b7").unwrap(),
            to: Square::from_algebraic("b8").unwrap(),
        };
        assert!(amb.to_string().contains("b7b8"));
        assert!(MoveError::OwnKingInCheck(mv).is_own_king_in_check());
        assert!(!MoveError::IllegalPseudoMove(mv).is_own_king_in_check());
    }
}
