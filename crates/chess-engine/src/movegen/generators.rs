//! Per-piece pseudo-legal destination generators.
//!
//! Each generator is a plain function from (board, square, color) to the
//! ascending set of squares that piece could move to, ignoring whether the
//! move would expose its own king. [`GENERATORS`] maps [`Piece::index`] to
//! the matching function so dispatch is a table lookup.

use chess_core::square::{Offset, DIAGONALS, KING_STEPS, KNIGHT_JUMPS, ORTHOGONALS};
use chess_core::{CastleSide, Color, Piece, Square};

use crate::square_list::Targets;
use crate::Board;

/// Signature shared by every piece generator.
pub type Generator = fn(&Board, Square, Color) -> Targets;

/// Generators indexed by [`Piece::index`].
pub const GENERATORS: [Generator; 6] = [pawn, knight, bishop, rook, queen, king];

/// Looks up the generator for a piece kind.
#[inline]
pub fn generator(piece: Piece) -> Generator {
    GENERATORS[piece.index()]
}

fn pawn(board: &Board, from: Square, color: Color) -> Targets {
    let mut targets = Targets::new();

    if let Some(one) = from.offset(color.pawn_push()) {
        if board.is_empty(one) {
            targets.insert(one);
            if from.row() == color.pawn_start_row() {
                if let Some(two) = one.offset(color.pawn_push()) {
                    if board.is_empty(two) {
                        targets.insert(two);
                    }
                }
            }
        }
    }

    for step in color.pawn_captures() {
        let Some(to) = from.offset(step) else {
            continue;
        };
        match board.piece_at(to) {
            Some((_, owner)) if owner != color => {
                targets.insert(to);
            }
            None if board.en_passant() == Some(to) && has_passed_pawn(board, to, color) => {
                targets.insert(to);
            }
            _ => {}
        }
    }

    targets
}

/// The enemy pawn that just double-stepped past `target` is still there.
fn has_passed_pawn(board: &Board, target: Square, color: Color) -> bool {
    target
        .offset(color.opposite().pawn_push())
        .is_some_and(|sq| board.piece_at(sq) == Some((Piece::Pawn, color.opposite())))
}

fn knight(board: &Board, from: Square, color: Color) -> Targets {
    leap(board, from, color, &KNIGHT_JUMPS)
}

fn bishop(board: &Board, from: Square, color: Color) -> Targets {
    let mut targets = Targets::new();
    slide(board, from, color, &DIAGONALS, &mut targets);
    targets
}

fn rook(board: &Board, from: Square, color: Color) -> Targets {
    let mut targets = Targets::new();
    slide(board, from, color, &ORTHOGONALS, &mut targets);
    targets
}

fn queen(board: &Board, from: Square, color: Color) -> Targets {
    let mut targets = Targets::new();
    slide(board, from, color, &ORTHOGONALS, &mut targets);
    slide(board, from, color, &DIAGONALS, &mut targets);
    targets
}

fn king(board: &Board, from: Square, color: Color) -> Targets {
    let mut targets = leap(board, from, color, &KING_STEPS);
    for side in CastleSide::BOTH {
        if board.can_castle(color, side) {
            targets.insert(side.king_target(color));
        }
    }
    targets
}

/// Walks each ray until the edge or a friendly piece (exclusive) or an
/// enemy piece (inclusive).
fn slide(board: &Board, from: Square, color: Color, dirs: &[Offset], targets: &mut Targets) {
    for &dir in dirs {
        let mut current = from;
        while let Some(to) = current.offset(dir) {
            match board.piece_at(to) {
                None => {
                    targets.insert(to);
                }
                Some((_, owner)) => {
                    if owner != color {
                        targets.insert(to);
                    }
                    break;
                }
            }
            current = to;
        }
    }
}

fn leap(board: &Board, from: Square, color: Color, steps: &[Offset]) -> Targets {
    let mut targets = Targets::new();
    for &step in steps {
        if let Some(to) = from.offset(step) {
            if board.piece_at(to).map_or(true, |(_, owner)| owner != color) {
                targets.insert(to);
            }
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn names(targets: &Targets) -> Vec<String> {
        targets.iter().map(|s| s.to_algebraic()).collect()
    }

    fn targets_of(fen: &str, square: &str) -> Targets {
        let board = Board::from_fen(fen).unwrap();
        let from = sq(square);
        let (piece, color) = board.piece_at(from).unwrap();
        generator(piece)(&board, from, color)
    }

    #[test]
    fn table_matches_piece_index() {
        let board = Board::startpos();
        assert_eq!(generator(Piece::Knight)(&board, Square::G1, Color::White).len(), 2);
        assert_eq!(generator(Piece::Pawn)(&board, sq("e2"), Color::White).len(), 2);
        assert!(generator(Piece::Rook)(&board, Square::A1, Color::White).is_empty());
        assert!(generator(Piece::King)(&board, Square::E1, Color::White).is_empty());
    }

    #[test]
    fn rook_ray_stops_on_enemy_inclusive() {
        let targets = targets_of("4k3/8/8/8/R1p5/8/8/4K3 w - - 0 1", "a4");
        assert!(targets.contains(sq("b4")));
        assert!(targets.contains(sq("c4")));
        assert!(!targets.contains(sq("d4")));
        let east: Vec<_> = targets.iter().filter(|s| s.row() == 3).collect();
        assert_eq!(east.iter().max(), Some(&sq("c4")));
    }

    #[test]
    fn rook_ray_stops_before_friend() {
        let targets = targets_of("4k3/8/8/8/R1P5/8/8/4K3 w - - 0 1", "a4");
        assert!(targets.contains(sq("b4")));
        assert!(!targets.contains(sq("c4")));
        assert!(!targets.contains(sq("d4")));
    }

    #[test]
    fn queen_on_empty_board_has_27() {
        let targets = targets_of("8/8/8/3Q4/8/8/8/8 w - - 0 1", "d5");
        assert_eq!(targets.len(), 27);
        assert!(targets.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn knight_in_corner() {
        let targets = targets_of("8/8/8/8/8/8/8/N7 w - - 0 1", "a1");
        assert_eq!(names(&targets), ["c2", "b3"]);
    }

    #[test]
    fn pawn_pushes_and_captures() {
        let targets = targets_of("4k3/8/8/8/8/3p1n2/4P3/4K3 w - - 0 1", "e2");
        assert_eq!(names(&targets), ["d3", "e3", "f3", "e4"]);

        let blocked = targets_of("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1", "e2");
        assert!(blocked.is_empty());

        let black = targets_of("4k3/4p3/8/8/8/8/8/4K3 b - - 0 1", "e7");
        assert_eq!(names(&black), ["e5", "e6"]);
    }

    #[test]
    fn pawn_en_passant_target() {
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2";
        assert_eq!(names(&targets_of(fen, "e5")), ["d6", "e6"]);

        // Target square present but the passed pawn is gone.
        let stale = "4k3/8/8/4P3/8/8/8/4K3 w - d6 0 2";
        assert_eq!(names(&targets_of(stale, "e5")), ["e6"]);
    }

    #[test]
    fn king_includes_castle_destinations() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let targets = targets_of(fen, "e1");
        assert!(targets.contains(Square::G1));
        assert!(targets.contains(Square::C1));
        assert_eq!(targets.len(), 7);

        let no_rights = "r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1";
        let targets = targets_of(no_rights, "e1");
        assert!(!targets.contains(Square::G1));
        assert_eq!(targets.len(), 5);
    }
}
