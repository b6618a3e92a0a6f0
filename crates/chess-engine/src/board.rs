//! The mutable chess position.

use std::fmt;
use std::hash::{Hash, Hasher};

use chess_core::{
    all_squares, CastlingRights, Color, FenError, FenFields, Piece, Square,
};

use crate::square_list::PieceList;
use crate::zobrist::ZOBRIST;

/// Complete position state, mutated in place by
/// [`make_move`](Board::make_move) and restored by
/// [`unmake_move`](Board::unmake_move).
///
/// Cells are indexed by 0x88 square. Alongside them the board keeps one
/// sorted [`PieceList`] per color and the king square per color, so move
/// generation walks at most 16 squares instead of 64.
///
/// Two boards compare equal when their cells, side to move, castling rights,
/// en passant target and full-move number agree. The half-move clock is not
/// part of identity.
#[derive(Clone)]
pub struct Board {
    pub(crate) cells: [Option<(Piece, Color)>; Square::SPACE],
    pub(crate) pieces: [PieceList; 2],
    pub(crate) kings: [Option<Square>; 2],
    pub(crate) castling: CastlingRights,
    pub(crate) en_passant: Option<Square>,
    pub(crate) side_to_move: Color,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) hash: u64,
}

impl Board {
    /// Creates a board with no pieces, White to move.
    pub fn empty() -> Self {
        Board {
            cells: [None; Square::SPACE],
            pieces: [PieceList::new(); 2],
            kings: [None; 2],
            castling: CastlingRights::NONE,
            en_passant: None,
            side_to_move: Color::White,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(FenFields::STARTPOS).expect("STARTPOS is valid")
    }

    /// Creates a board from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Self::from_fields(FenFields::parse(fen)?)
    }

    fn from_fields(fields: FenFields) -> Result<Self, FenError> {
        let mut board = Board::empty();
        for (square, piece, color) in fields.placement {
            if board.pieces[color.index()].is_full() {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "more than {} {} pieces",
                    PieceList::CAPACITY,
                    color
                )));
            }
            if piece == Piece::King && board.kings[color.index()].is_some() {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "more than one {} king",
                    color
                )));
            }
            board.put_piece(square, piece, color);
        }
        board.side_to_move = fields.side_to_move;
        board.castling = fields.castling;
        board.en_passant = fields.en_passant;
        board.halfmove_clock = fields.halfmove_clock;
        board.fullmove_number = fields.fullmove_number;
        board.hash = board.compute_hash();
        Ok(board)
    }

    /// Converts the board to a FEN string.
    pub fn to_fen(&self) -> String {
        let placement = Color::BOTH
            .iter()
            .flat_map(|&color| {
                self.pieces[color.index()]
                    .iter()
                    .filter_map(move |sq| self.cells[sq.index() as usize].map(|(p, _)| (sq, p, color)))
            })
            .collect();
        FenFields {
            placement,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_fen()
    }

    /// Returns the piece and color at the given square, if any.
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        self.cells[square.index() as usize]
    }

    /// Occupied squares of one color, ascending.
    #[inline]
    pub fn pieces(&self, color: Color) -> &PieceList {
        &self.pieces[color.index()]
    }

    /// Squares holding a given kind of piece of one color.
    pub fn squares_of(&self, piece: Piece, color: Color) -> impl Iterator<Item = Square> + '_ {
        self.pieces[color.index()]
            .iter()
            .filter(move |&sq| self.piece_at(sq) == Some((piece, color)))
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.kings[color.index()]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Half-moves played since the notional game start.
    #[inline]
    pub fn ply(&self) -> u32 {
        (self.fullmove_number - 1) * 2 + self.side_to_move.index() as u32
    }

    /// The position hash, current after every make/unmake.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.cells[square.index() as usize].is_none()
    }

    /// Recomputes the Zobrist hash from the piece lists.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = ZOBRIST.side(self.side_to_move)
            ^ ZOBRIST.castling(self.castling)
            ^ ZOBRIST.en_passant(self.en_passant);
        for color in Color::BOTH {
            for sq in self.pieces[color.index()].iter() {
                if let Some((piece, _)) = self.piece_at(sq) {
                    hash ^= ZOBRIST.piece(piece, color, sq);
                }
            }
        }
        hash
    }

    /// Places a piece on an empty square, keeping lists and king cache in step.
    pub(crate) fn put_piece(&mut self, square: Square, piece: Piece, color: Color) {
        debug_assert!(self.is_empty(square), "{square} already occupied");
        self.cells[square.index() as usize] = Some((piece, color));
        let inserted = self.pieces[color.index()].insert(square);
        debug_assert!(inserted, "piece list rejected {square}");
        if piece == Piece::King {
            self.kings[color.index()] = Some(square);
        }
    }

    /// Lifts whatever stands on `square`.
    pub(crate) fn remove_piece(&mut self, square: Square) -> Option<(Piece, Color)> {
        let taken = self.cells[square.index() as usize].take()?;
        let (piece, color) = taken;
        self.pieces[color.index()].remove(square);
        if piece == Piece::King && self.kings[color.index()] == Some(square) {
            self.kings[color.index()] = None;
        }
        Some(taken)
    }

    /// Checks the bookkeeping invariants, describing the first violation.
    pub fn validate(&self) -> Result<(), String> {
        for color in Color::BOTH {
            let list = &self.pieces[color.index()];
            if !list.as_slice().windows(2).all(|w| w[0] < w[1]) {
                return Err(format!("{color} piece list not sorted: {list:?}"));
            }
            for sq in list.iter() {
                match self.piece_at(sq) {
                    Some((_, c)) if c == color => {}
                    other => {
                        return Err(format!("{color} list has {sq} but cell holds {other:?}"))
                    }
                }
            }
            let king = self.squares_of(Piece::King, color).next();
            if king != self.kings[color.index()] {
                return Err(format!(
                    "{color} king cached at {:?} but stands on {:?}",
                    self.kings[color.index()],
                    king
                ));
            }
        }
        for sq in all_squares() {
            if let Some((_, color)) = self.piece_at(sq) {
                if !self.pieces[color.index()].contains(sq)
                    || self.pieces[color.opposite().index()].contains(sq)
                {
                    return Err(format!("{sq} is not in exactly one piece list"));
                }
            }
        }
        if self.hash != self.compute_hash() {
            return Err("stale position hash".to_string());
        }
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.fullmove_number == other.fullmove_number
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.en_passant == other.en_passant
            && self.cells == other.cells
    }
}

impl Eq for Board {}

impl Hash for Board {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Everything the Zobrist key covers is compared by Eq.
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen())
    }
}
