//! Zobrist keys for position hashing.
//!
//! The board XORs together one key per (piece, color, square) it holds plus
//! keys for side to move, each castling right and the en passant file. The
//! hash is recomputed from the piece lists after every mutation rather than
//! updated incrementally; with at most 32 pieces that costs a few dozen XORs.

use chess_core::{CastlingRights, Color, Piece, Square};

/// Zobrist hash keys, generated at compile time from a fixed seed.
pub struct ZobristKeys {
    /// Keys for pieces: [piece][color][dense square]
    pieces: [[[u64; 64]; 2]; 6],
    black_to_move: u64,
    castling: [u64; 4],
    en_passant: [u64; 8],
}

impl ZobristKeys {
    const fn new() -> Self {
        // xorshift64
        const fn next_random(mut x: u64) -> u64 {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = 0x9E3779B97F4A7C15u64;
        let mut pieces = [[[0u64; 64]; 2]; 6];
        let mut castling = [0u64; 4];
        let mut en_passant = [0u64; 8];

        let mut piece = 0;
        while piece < 6 {
            let mut color = 0;
            while color < 2 {
                let mut square = 0;
                while square < 64 {
                    state = next_random(state);
                    pieces[piece][color][square] = state;
                    square += 1;
                }
                color += 1;
            }
            piece += 1;
        }

        state = next_random(state);
        let black_to_move = state;

        let mut i = 0;
        while i < 4 {
            state = next_random(state);
            castling[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 8 {
            state = next_random(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    pub fn piece(&self, piece: Piece, color: Color, square: Square) -> u64 {
        self.pieces[piece.index()][color.index()][square.dense()]
    }

    #[inline]
    pub fn side(&self, side_to_move: Color) -> u64 {
        match side_to_move {
            Color::White => 0,
            Color::Black => self.black_to_move,
        }
    }

    /// XOR of the keys for every right currently held.
    #[inline]
    pub fn castling(&self, rights: CastlingRights) -> u64 {
        let bits = rights.raw();
        let mut key = 0;
        for (i, k) in self.castling.iter().enumerate() {
            if bits & (1 << i) != 0 {
                key ^= k;
            }
        }
        key
    }

    #[inline]
    pub fn en_passant(&self, target: Option<Square>) -> u64 {
        target.map_or(0, |sq| self.en_passant[sq.col() as usize])
    }
}

/// Global Zobrist keys (initialized at compile time).
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct() {
        let a = ZOBRIST.piece(Piece::Pawn, Color::White, Square::A1);
        let b = ZOBRIST.piece(Piece::Pawn, Color::White, Square::B1);
        let c = ZOBRIST.piece(Piece::Pawn, Color::Black, Square::A1);
        let d = ZOBRIST.piece(Piece::Knight, Color::White, Square::A1);
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn empty_state_contributes_nothing() {
        assert_eq!(ZOBRIST.side(Color::White), 0);
        assert_ne!(ZOBRIST.side(Color::Black), 0);
        assert_eq!(ZOBRIST.castling(CastlingRights::NONE), 0);
        assert_eq!(ZOBRIST.en_passant(None), 0);
        assert_ne!(
            ZOBRIST.castling(CastlingRights::ALL),
            ZOBRIST.castling(CastlingRights::new(CastlingRights::WHITE_KINGSIDE))
        );
    }
}
