//! Static evaluation.

use chess_core::{Color, Piece};
use chess_engine::Board;

/// Scores a position for one side. Higher is better for `perspective`.
///
/// Any `Fn(&Board, Color) -> i32` is an evaluator, so tests and callers can
/// plug in a closure.
pub trait Evaluator {
    fn score(&self, board: &Board, perspective: Color) -> i32;

    /// Score used at the search horizon. `material_changed` is set when the
    /// move leading here captured or promoted.
    fn score_leaf(&self, board: &Board, perspective: Color, material_changed: bool) -> i32 {
        let _ = material_changed;
        self.score(board, perspective)
    }

    /// Whether `score(board, c) == -score(board, c.opposite())` always holds.
    ///
    /// The search keeps cached scores across calls for either color only
    /// when this is true.
    fn is_antisymmetric(&self) -> bool {
        false
    }
}

impl<F> Evaluator for F
where
    F: Fn(&Board, Color) -> i32,
{
    fn score(&self, board: &Board, perspective: Color) -> i32 {
        self(board, perspective)
    }
}

/// Material plus piece-square tables.
///
/// At the horizon the score depends on the move that led there. After a
/// capture or promotion the material balance, multiplied by `capture_scale`,
/// is added to the positional term. After a quiet move only the positional
/// term counts. [`StandardEvaluator::counting_material`] builds a variant that
/// also adds the unscaled material balance at quiet leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardEvaluator {
    capture_scale: i32,
    quiet_material: bool,
}

impl StandardEvaluator {
    pub const DEFAULT_CAPTURE_SCALE: i32 = 4;

    pub fn new(capture_scale: i32) -> Self {
        StandardEvaluator {
            capture_scale: capture_scale.max(1),
            quiet_material: false,
        }
    }

    /// Counts material at every leaf, scaled only after a capture or promotion.
    pub fn counting_material(capture_scale: i32) -> Self {
        StandardEvaluator {
            quiet_material: true,
            ..Self::new(capture_scale)
        }
    }

    /// Material balance in centipawns, positive when `perspective` is ahead.
    pub fn material(board: &Board, perspective: Color) -> i32 {
        Self::sum(board, perspective, |piece, _, _| piece.value())
    }

    /// Piece-square bonus balance, positive when `perspective` is better placed.
    pub fn positional(board: &Board, perspective: Color) -> i32 {
        Self::sum(board, perspective, |piece, color, square| {
            piece.positional_bonus(color, square)
        })
    }

    fn sum(
        board: &Board,
        perspective: Color,
        term: impl Fn(Piece, Color, chess_core::Square) -> i32,
    ) -> i32 {
        let mut total = 0;
        for color in Color::BOTH {
            let sign = if color == perspective { 1 } else { -1 };
            for square in board.pieces(color) {
                if let Some((piece, _)) = board.piece_at(square) {
                    total += sign * term(piece, color, square);
                }
            }
        }
        total
    }
}

impl Default for StandardEvaluator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPTURE_SCALE)
    }
}

impl Evaluator for StandardEvaluator {
    fn score(&self, board: &Board, perspective: Color) -> i32 {
        Self::material(board, perspective) + Self::positional(board, perspective)
    }

    fn score_leaf(&self, board: &Board, perspective: Color, material_changed: bool) -> i32 {
        let positional = Self::positional(board, perspective);
        if material_changed {
            Self::material(board, perspective) * self.capture_scale + positional
        } else if self.quiet_material {
            Self::material(board, perspective) + positional
        } else {
            positional
        }
    }

    fn is_antisymmetric(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_balanced() {
        let board = Board::startpos();
        let eval = StandardEvaluator::default();
        assert_eq!(eval.score(&board, Color::White), 0);
        assert_eq!(eval.score(&board, Color::Black), 0);
    }

    #[test]
    fn perspective_flips_sign() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        let eval = StandardEvaluator::default();
        let white = eval.score(&board, Color::White);
        assert!(white > 800);
        assert_eq!(eval.score(&board, Color::Black), -white);
        assert_eq!(StandardEvaluator::material(&board, Color::White), 900);
    }

    #[test]
    fn quiet_leaf_is_positional_only() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let eval = StandardEvaluator::new(3);
        let positional = StandardEvaluator::positional(&board, Color::White);
        assert_eq!(eval.score_leaf(&board, Color::White, false), positional);
        assert_eq!(eval.score_leaf(&board, Color::Black, false), -positional);
        assert_eq!(eval.score_leaf(&board, Color::White, true), 1500 + positional);
    }

    #[test]
    fn counting_material_keeps_quiet_material() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let eval = StandardEvaluator::counting_material(3);
        let positional = StandardEvaluator::positional(&board, Color::White);
        assert_eq!(eval.score_leaf(&board, Color::White, false), 500 + positional);
        assert_eq!(eval.score_leaf(&board, Color::White, true), 1500 + positional);
        assert_ne!(eval, StandardEvaluator::new(3));
    }

    #[test]
    fn positional_rewards_centre() {
        let centre = Board::from_fen("4k3/8/8/8/3N4/8/8/4K3 w - - 0 1").unwrap();
        let rim = Board::from_fen("4k3/8/8/8/N7/8/8/4K3 w - - 0 1").unwrap();
        assert!(
            StandardEvaluator::positional(&centre, Color::White)
                > StandardEvaluator::positional(&rim, Color::White)
        );
    }

    #[test]
    fn closures_are_evaluators() {
        let count = |board: &Board, color: Color| board.pieces(color).len() as i32;
        let board = Board::startpos();
        assert_eq!(count.score(&board, Color::Black), 16);
        assert_eq!(count.score_leaf(&board, Color::Black, true), 16);
        assert!(!count.is_antisymmetric());
        assert!(StandardEvaluator::default().is_antisymmetric());
    }
}
