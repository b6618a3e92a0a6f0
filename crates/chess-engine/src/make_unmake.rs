//! In-place move application and its exact inverse.

use chess_core::{king_home, CastleSide, CastlingRights, Color, Move, Piece, Square};

use crate::{Board, MoveError};

/// Everything [`Board::unmake_move`] needs to reverse one [`Board::make_move`].
///
/// The token is deliberately neither `Clone` nor `Copy`: each make hands out
/// exactly one, and unmake consumes it. It also records the move and the ply
/// it was made at, so an undo applied out of order is reported as
/// [`MoveError::InternalInconsistency`] instead of silently corrupting the board.
#[must_use = "pass the undo state back to unmake_move"]
#[derive(Debug)]
pub struct UndoState {
    mv: Move,
    ply: u32,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    captured: Option<(Piece, Color, Square)>,
    promoted: bool,
    castle: Option<CastleSide>,
}

impl UndoState {
    /// The move this token undoes.
    #[inline]
    pub fn mv(&self) -> Move {
        self.mv
    }

    /// The piece the move captured, if any (the passed pawn for en passant).
    #[inline]
    pub fn captured(&self) -> Option<Piece> {
        self.captured.map(|(piece, _, _)| piece)
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        self.promoted
    }

    #[inline]
    pub fn castle(&self) -> Option<CastleSide> {
        self.castle
    }

    /// True when the move changed the material balance.
    #[inline]
    pub fn material_changed(&self) -> bool {
        self.captured.is_some() || self.promoted
    }
}

impl Board {
    /// Applies `mv` in place and returns the token that reverses it.
    ///
    /// A king stepping two files from its home square is a castle and is only
    /// accepted when [`can_castle`](Board::can_castle) allows it. Any other
    /// move is a normal move; with `check_legal` set its destination must be
    /// among the piece's pseudo-legal targets. Own-king safety is not checked
    /// here, see [`make_legal_move`](Board::make_legal_move).
    ///
    /// On error the board is left untouched.
    pub fn make_move(&mut self, mv: Move, check_legal: bool) -> Result<UndoState, MoveError> {
        let from = mv.from();
        let to = mv.to();
        let (piece, color) = self.piece_at(from).ok_or(MoveError::NoPieceOnSquare(from))?;
        if color != self.side_to_move {
            return Err(MoveError::IllegalPseudoMove(mv));
        }

        if let Some(side) = castle_side(piece, color, mv) {
            if mv.promotion().is_some() || !self.can_castle(color, side) {
                return Err(MoveError::IllegalPseudoMove(mv));
            }
            return Ok(self.apply_castle(mv, color, side));
        }

        if check_legal && !self.pseudo_legal_targets(from).contains(to) {
            return Err(MoveError::IllegalPseudoMove(mv));
        }

        let reaches_last_rank = piece == Piece::Pawn && to.row() == color.promotion_row();
        match mv.promotion() {
            Some(promo) if !reaches_last_rank || !promo.is_promotion_target() => {
                return Err(MoveError::IllegalPseudoMove(mv));
            }
            None if reaches_last_rank => return Err(MoveError::IllegalPseudoMove(mv)),
            _ => {}
        }

        let en_passant_capture =
            piece == Piece::Pawn && Some(to) == self.en_passant && self.is_empty(to);
        let capture_square = if en_passant_capture {
            to.offset(color.opposite().pawn_push())
                .ok_or_else(|| MoveError::InternalInconsistency(format!("en passant square {to}")))?
        } else {
            to
        };
        let victim = self.piece_at(capture_square);
        match victim {
            Some((_, victim_color)) if victim_color == color => {
                return Err(MoveError::IllegalPseudoMove(mv));
            }
            None if en_passant_capture => return Err(MoveError::IllegalPseudoMove(mv)),
            _ => {}
        }

        // Validation done; everything below mutates.
        let mut undo = self.undo_for(mv);

        if let Some((captured, captured_color)) = victim {
            self.remove_piece(capture_square);
            self.castling.revoke_rook_square(capture_square);
            undo.captured = Some((captured, captured_color, capture_square));
        }

        self.remove_piece(from);
        let landed = match mv.promotion() {
            Some(promo) => {
                undo.promoted = true;
                promo
            }
            None => piece,
        };
        self.put_piece(to, landed, color);

        match piece {
            Piece::King => self.castling.revoke_color(color),
            Piece::Rook => self.castling.revoke_rook_square(from),
            _ => {}
        }

        self.en_passant = if piece == Piece::Pawn && from.row().abs_diff(to.row()) == 2 {
            from.offset(color.pawn_push())
        } else {
            None
        };

        if piece == Piece::Pawn || victim.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.finish_turn();
        Ok(undo)
    }

    /// Applies `mv` only if it is pseudo-legal and does not leave the mover's
    /// king attacked. A self-check is undone and reported as
    /// [`MoveError::OwnKingInCheck`].
    pub fn make_legal_move(&mut self, mv: Move) -> Result<UndoState, MoveError> {
        let mover = self.side_to_move;
        let undo = self.make_move(mv, true)?;
        if self.is_in_check(mover) {
            self.unmake_move(mv, undo)?;
            return Err(MoveError::OwnKingInCheck(mv));
        }
        Ok(undo)
    }

    /// Reverses the most recent [`make_move`](Board::make_move).
    ///
    /// Fails with [`MoveError::NoPieceOnSquare`] if the destination is empty
    /// and with [`MoveError::InternalInconsistency`] if `undo` was not issued
    /// for this move at this ply.
    pub fn unmake_move(&mut self, mv: Move, undo: UndoState) -> Result<(), MoveError> {
        if undo.mv != mv {
            return Err(MoveError::InternalInconsistency(format!(
                "undo state for {} passed to unmake of {mv}",
                undo.mv
            )));
        }
        if self.ply() != undo.ply + 1 {
            return Err(MoveError::InternalInconsistency(format!(
                "unmake of {mv} at ply {} but it was made at ply {}",
                self.ply(),
                undo.ply
            )));
        }
        let from = mv.from();
        let to = mv.to();
        let (piece, color) = self.piece_at(to).ok_or(MoveError::NoPieceOnSquare(to))?;
        if !self.is_empty(from) {
            return Err(MoveError::InternalInconsistency(format!(
                "unmake of {mv} but {from} is occupied"
            )));
        }

        if let Some(side) = undo.castle {
            let rook_target = side.rook_target(color);
            if self.piece_at(rook_target) != Some((Piece::Rook, color)) {
                return Err(MoveError::InternalInconsistency(format!(
                    "castle undo found no rook on {rook_target}"
                )));
            }
            self.remove_piece(to);
            self.remove_piece(rook_target);
            self.put_piece(from, Piece::King, color);
            self.put_piece(side.rook_home(color), Piece::Rook, color);
        } else {
            self.remove_piece(to);
            let original = if undo.promoted { Piece::Pawn } else { piece };
            self.put_piece(from, original, color);
            if let Some((captured, captured_color, square)) = undo.captured {
                self.put_piece(square, captured, captured_color);
            }
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.side_to_move = color;
        if color == Color::Black {
            self.fullmove_number -= 1;
        }
        self.hash = self.compute_hash();
        debug_assert_eq!(self.ply(), undo.ply);
        Ok(())
    }

    fn apply_castle(&mut self, mv: Move, color: Color, side: CastleSide) -> UndoState {
        let mut undo = self.undo_for(mv);
        undo.castle = Some(side);

        self.remove_piece(mv.from());
        self.remove_piece(side.rook_home(color));
        self.put_piece(mv.to(), Piece::King, color);
        self.put_piece(side.rook_target(color), Piece::Rook, color);

        self.castling.revoke_color(color);
        self.en_passant = None;
        self.halfmove_clock += 1;
        self.finish_turn();
        undo
    }

    fn undo_for(&self, mv: Move) -> UndoState {
        UndoState {
            mv,
            ply: self.ply(),
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            captured: None,
            promoted: false,
            castle: None,
        }
    }

    fn finish_turn(&mut self) {
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.opposite();
        self.hash = self.compute_hash();
    }
}

/// A king moving two files along its home rank from its home square.
fn castle_side(piece: Piece, color: Color, mv: Move) -> Option<CastleSide> {
    let (from, to) = (mv.from(), mv.to());
    if piece != Piece::King || from != king_home(color) || from.row() != to.row() {
        return None;
    }
    if from.col().abs_diff(to.col()) != 2 {
        return None;
    }
    CastleSide::from_king_target(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(uci: &str) -> Move {
        Move::from_uci(uci).unwrap()
    }

    fn roundtrip(fen: &str, uci: &str) -> Board {
        let mut board = Board::from_fen(fen).unwrap();
        let before = board.clone();
        let undo = board.make_move(mv(uci), true).unwrap();
        board.validate().unwrap();
        let after = board.clone();
        board.unmake_move(mv(uci), undo).unwrap();
        assert_eq!(board, before);
        assert_eq!(board.to_fen(), before.to_fen());
        assert_eq!(board.hash(), before.hash());
        board.validate().unwrap();
        after
    }

    #[test]
    fn quiet_move_and_double_push() {
        let after = roundtrip(chess_core::FenFields::STARTPOS, "e2e4");
        assert_eq!(
            after.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        let after = roundtrip(chess_core::FenFields::STARTPOS, "g1f3");
        assert_eq!(after.halfmove_clock(), 1);
        assert_eq!(after.en_passant(), None);
    }

    #[test]
    fn fullmove_advances_after_black() {
        let after = roundtrip(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "e7e5",
        );
        assert_eq!(after.fullmove_number(), 2);
        assert_eq!(after.side_to_move(), Color::White);
    }

    #[test]
    fn capture_restores_victim() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        let after = roundtrip(fen, "e4d5");
        assert_eq!(after.pieces(Color::Black).len(), 15);
        assert_eq!(after.halfmove_clock(), 0);
    }

    #[test]
    fn en_passant_removes_passed_pawn() {
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        let after = roundtrip(fen, "e5f6");
        let f5 = Square::from_algebraic("f5").unwrap();
        assert!(after.is_empty(f5));
        assert_eq!(
            after.piece_at(Square::from_algebraic("f6").unwrap()),
            Some((Piece::Pawn, Color::White))
        );
    }

    #[test]
    fn promotion_and_underpromotion() {
        let fen = "8/P6k/8/8/8/8/8/K7 w - - 0 1";
        let after = roundtrip(fen, "a7a8q");
        assert_eq!(after.piece_at(Square::A8), Some((Piece::Queen, Color::White)));
        let after = roundtrip(fen, "a7a8n");
        assert_eq!(after.piece_at(Square::A8), Some((Piece::Knight, Color::White)));

        let mut board = Board::from_fen(fen).unwrap();
        assert_eq!(
            board.make_move(mv("a7a8"), true).unwrap_err(),
            MoveError::IllegalPseudoMove(mv("a7a8"))
        );
        let to_king = Move::new(
            Square::from_algebraic("a7").unwrap(),
            Square::A8,
            Some(Piece::King),
        );
        assert_eq!(
            board.make_move(to_king, true).unwrap_err(),
            MoveError::IllegalPseudoMove(to_king)
        );
    }

    #[test]
    fn capture_promotion_restores_both() {
        let fen = "1r5k/P7/8/8/8/8/8/K7 w - - 0 1";
        let after = roundtrip(fen, "a7b8r");
        assert_eq!(after.piece_at(Square::B8), Some((Piece::Rook, Color::White)));
        assert_eq!(after.pieces(Color::Black).len(), 1);
    }

    #[test]
    fn castling_both_sides() {
        let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
        let after = roundtrip(fen, "e1g1");
        assert_eq!(after.piece_at(Square::G1), Some((Piece::King, Color::White)));
        assert_eq!(after.piece_at(Square::F1), Some((Piece::Rook, Color::White)));
        assert!(after.is_empty(Square::H1));
        assert_eq!(after.castling_rights().to_fen(), "kq");
        assert_eq!(after.king_square(Color::White), Some(Square::G1));

        let after = roundtrip(fen, "e1c1");
        assert_eq!(after.piece_at(Square::D1), Some((Piece::Rook, Color::White)));
        assert!(after.is_empty(Square::A1));

        let black = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R b KQkq - 0 1";
        let after = roundtrip(black, "e8c8");
        assert_eq!(after.piece_at(Square::C8), Some((Piece::King, Color::Black)));
        assert_eq!(after.castling_rights().to_fen(), "KQ");
    }

    #[test]
    fn castling_without_right_is_rejected() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1").unwrap();
        let before = board.clone();
        assert_eq!(
            board.make_move(mv("e1g1"), false).unwrap_err(),
            MoveError::IllegalPseudoMove(mv("e1g1"))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn rook_moves_and_captures_clear_rights() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let after = roundtrip(fen, "h1h8");
        assert_eq!(after.castling_rights().to_fen(), "Qq");
        let after = roundtrip(fen, "a1a2");
        assert_eq!(after.castling_rights().to_fen(), "Kkq");
        let after = roundtrip(fen, "e1e2");
        assert_eq!(after.castling_rights().to_fen(), "kq");
    }

    #[test]
    fn errors_leave_board_untouched() {
        let mut board = Board::startpos();
        let before = board.clone();
        let e3 = Square::from_algebraic("e3").unwrap();
        assert_eq!(
            board.make_move(mv("e3e4"), true).unwrap_err(),
            MoveError::NoPieceOnSquare(e3)
        );
        assert_eq!(
            board.make_move(mv("e2e5"), true).unwrap_err(),
            MoveError::IllegalPseudoMove(mv("e2e5"))
        );
        assert_eq!(
            board.make_move(mv("e7e5"), true).unwrap_err(),
            MoveError::IllegalPseudoMove(mv("e7e5"))
        );
        assert_eq!(
            board.make_move(mv("d1d2"), false).unwrap_err(),
            MoveError::IllegalPseudoMove(mv("d1d2"))
        );
        assert_eq!(board, before);
        board.validate().unwrap();
    }

    #[test]
    fn make_legal_move_rejects_self_check() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
        let before = board.clone();
        assert_eq!(
            board.make_legal_move(mv("e1d2")).unwrap_err(),
            MoveError::OwnKingInCheck(mv("e1d2"))
        );
        assert_eq!(board, before);
        assert!(board.make_legal_move(mv("e1e2")).is_ok());
    }

    #[test]
    fn unmake_checks_order_and_destination() {
        let mut board = Board::startpos();
        let first = board.make_move(mv("e2e4"), true).unwrap();
        let second = board.make_move(mv("e7e5"), true).unwrap();

        let err = board.unmake_move(mv("e2e4"), first).unwrap_err();
        assert!(matches!(err, MoveError::InternalInconsistency(_)));

        let err = board.unmake_move(mv("d7d5"), second).unwrap_err();
        assert!(matches!(err, MoveError::InternalInconsistency(_)));
    }

    #[test]
    fn unmake_on_empty_destination() {
        let mut board = Board::startpos();
        let undo = board.make_move(mv("e2e4"), true).unwrap();
        let e4 = Square::from_algebraic("e4").unwrap();
        board.remove_piece(e4);
        assert_eq!(
            board.unmake_move(mv("e2e4"), undo).unwrap_err(),
            MoveError::NoPieceOnSquare(e4)
        );
    }

    #[test]
    fn undo_reports_material_change() {
        let mut board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2")
                .unwrap();
        let undo = board.make_move(mv("e4d5"), true).unwrap();
        assert_eq!(undo.captured(), Some(Piece::Pawn));
        assert!(undo.material_changed());
        board.unmake_move(mv("e4d5"), undo).unwrap();

        let undo = board.make_move(mv("g1f3"), true).unwrap();
        assert!(!undo.material_changed());
        assert_eq!(undo.castle(), None);
        board.unmake_move(mv("g1f3"), undo).unwrap();
    }
}
