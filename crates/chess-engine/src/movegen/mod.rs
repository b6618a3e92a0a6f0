//! Move generation.
//!
//! Candidate destinations come from the per-piece [`generators`]; this module
//! expands pawn promotions and filters every candidate by making it, testing
//! the mover's king and unmaking it again.

mod attacks;
pub mod generators;
pub mod perft;

use chess_core::{Move, Piece, Square};

use crate::square_list::Targets;
use crate::{Board, MoveError};

pub use generators::{generator, Generator, GENERATORS};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of legal moves in any chess position.
    pub const MAX_MOVES: usize = 256;

    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, Move>> {
        self.as_slice().iter().copied()
    }

    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl Board {
    /// Pseudo-legal destinations of whatever stands on `square`.
    ///
    /// Empty for an empty square. Own-king safety is not considered.
    pub fn pseudo_legal_targets(&self, square: Square) -> Targets {
        match self.piece_at(square) {
            Some((piece, color)) => generator(piece)(self, square, color),
            None => Targets::new(),
        }
    }

    /// Generates every legal move for the side to move.
    ///
    /// Pawn moves onto the last rank expand to queen, rook, bishop and knight
    /// promotions. The four share one legality probe since the promoted piece
    /// never affects whether the mover's king is exposed. The board is
    /// mutated during filtering and restored before returning.
    pub fn generate_all_moves(&mut self) -> MoveList {
        let mut moves = MoveList::new();
        let color = self.side_to_move;
        let pieces = *self.pieces(color);

        for from in &pieces {
            let Some((piece, _)) = self.piece_at(from) else {
                continue;
            };
            let promotes = piece == Piece::Pawn;
            for to in &generator(piece)(self, from, color) {
                if promotes && to.row() == color.promotion_row() {
                    if self.leaves_king_safe(Move::new(from, to, Some(Piece::Queen))) {
                        for promo in Piece::PROMOTIONS {
                            moves.push(Move::new(from, to, Some(promo)));
                        }
                    }
                } else {
                    let mv = Move::normal(from, to);
                    if self.leaves_king_safe(mv) {
                        moves.push(mv);
                    }
                }
            }
        }
        moves
    }

    /// True if the side to move has at least one legal move.
    pub fn has_legal_move(&mut self) -> bool {
        let color = self.side_to_move;
        let pieces = *self.pieces(color);
        for from in &pieces {
            for to in &self.pseudo_legal_targets(from) {
                if self.leaves_king_safe(self.probe_move(from, to)) {
                    return true;
                }
            }
        }
        false
    }

    /// The side to move is in check and has no legal move.
    pub fn is_checkmate(&mut self) -> bool {
        self.is_in_check(self.side_to_move) && !self.has_legal_move()
    }

    /// The side to move is not in check but has no legal move.
    pub fn is_stalemate(&mut self) -> bool {
        !self.is_in_check(self.side_to_move) && !self.has_legal_move()
    }

    /// Maps a caller's (from, to, promotion) request onto a legal [`Move`].
    ///
    /// A pawn reaching the last rank without a promotion kind is
    /// [`MoveError::AmbiguousMove`] when the promotion itself would be legal.
    /// The board is unchanged on return.
    pub fn resolve_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> Result<Move, MoveError> {
        let requested = Move::new(from, to, promotion);
        let (piece, color) = self.piece_at(from).ok_or(MoveError::NoPieceOnSquare(from))?;
        if color != self.side_to_move || !self.pseudo_legal_targets(from).contains(to) {
            return Err(MoveError::IllegalPseudoMove(requested));
        }

        let promotes = piece == Piece::Pawn && to.row() == color.promotion_row();
        let mv = match (promotes, promotion) {
            (true, None) => {
                let probe = Move::new(from, to, Some(Piece::Queen));
                if !self.leaves_king_safe(probe) {
                    return Err(MoveError::OwnKingInCheck(probe));
                }
                return Err(MoveError::AmbiguousMove { from, to });
            }
            (true, Some(p)) if p.is_promotion_target() => requested,
            (false, None) => requested,
            _ => return Err(MoveError::IllegalPseudoMove(requested)),
        };

        let undo = self.make_legal_move(mv)?;
        self.unmake_move(mv, undo)?;
        Ok(mv)
    }

    /// The move used to test legality of a from/to pair; promotions probe as queen.
    fn probe_move(&self, from: Square, to: Square) -> Move {
        match self.piece_at(from) {
            Some((Piece::Pawn, color)) if to.row() == color.promotion_row() => {
                Move::new(from, to, Some(Piece::Queen))
            }
            _ => Move::normal(from, to),
        }
    }

    /// Makes `mv` unchecked, tests the mover's king and unmakes it.
    fn leaves_king_safe(&mut self, mv: Move) -> bool {
        let mover = self.side_to_move;
        match self.make_move(mv, false) {
            Ok(undo) => {
                let safe = !self.is_in_check(mover);
                let restored = self.unmake_move(mv, undo);
                debug_assert!(restored.is_ok(), "unmake of {mv} failed: {restored:?}");
                safe
            }
            Err(err) => {
                debug_assert!(false, "generated move {mv} rejected by make: {err}");
                false
            }
        }
    }
}
