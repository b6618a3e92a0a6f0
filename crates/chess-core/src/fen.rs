//! FEN (Forsyth-Edwards Notation) parsing and serialization.
//!
//! [`FenFields`] is the typed form of the six space-separated fields. The
//! engine builds its board from it and writes a board back through it, so
//! the field order and separators live in one place.

use crate::{CastlingRights, Color, Piece, Square};
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// The six FEN fields, parsed and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenFields {
    /// Occupied squares in rank 8 to rank 1, file a to file h order.
    pub placement: Vec<(Square, Piece, Color)>,
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    /// Half-moves since the last capture or pawn move.
    pub halfmove_clock: u32,
    /// Starts at 1 and increments after each Black move.
    pub fullmove_number: u32,
}

impl FenFields {
    /// Largest accepted full-move number or half-move clock.
    pub const MAX_CLOCK: u32 = 100_000;

    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let placement = Self::parse_placement(parts[0])?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = CastlingRights::from_fen(parts[2])
            .ok_or_else(|| FenError::InvalidCastlingRights(parts[2].to_string()))?;

        let en_passant = Self::parse_en_passant(parts[3])?;

        let halfmove_clock = parts[4]
            .parse::<u32>()
            .ok()
            .filter(|&n| n <= Self::MAX_CLOCK)
            .ok_or_else(|| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;

        let fullmove_number = parts[5]
            .parse::<u32>()
            .ok()
            .filter(|&n| (1..=Self::MAX_CLOCK).contains(&n))
            .ok_or_else(|| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;

        Ok(FenFields {
            placement,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_placement(field: &str) -> Result<Vec<(Square, Piece, Color)>, FenError> {
        let ranks: Vec<&str> = field.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut placement = Vec::with_capacity(32);
        for (i, rank) in ranks.iter().enumerate() {
            let row = 7 - i as u8;
            let mut col = 0u8;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    col += skip as u8;
                } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                    if let Some(square) = Square::from_coords(row, col) {
                        placement.push((square, piece, color));
                    }
                    col += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        row + 1
                    )));
                }
                if col > 8 {
                    break;
                }
            }
            if col != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    row + 1,
                    col
                )));
            }
        }
        Ok(placement)
    }

    fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
        if field == "-" {
            return Ok(None);
        }
        match Square::from_algebraic(field) {
            Some(sq) if sq.row() == 2 || sq.row() == 5 => Ok(Some(sq)),
            _ => Err(FenError::InvalidEnPassantSquare(field.to_string())),
        }
    }

    /// Converts the fields back to a FEN string.
    ///
    /// `placement` may be in any order.
    pub fn to_fen(&self) -> String {
        let mut grid = [[None; 8]; 8];
        for &(square, piece, color) in &self.placement {
            grid[square.row() as usize][square.col() as usize] = Some(piece.to_fen_char(color));
        }

        let mut fen = String::with_capacity(90);
        for row in (0..8).rev() {
            let mut empty = 0;
            for cell in grid[row] {
                match cell {
                    Some(c) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(c);
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if row > 0 {
                fen.push('/');
            }
        }

        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_algebraic());

        format!(
            "{} {} {} {} {} {}",
            fen,
            self.side_to_move.to_fen_char(),
            self.castling.to_fen(),
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_startpos() {
        let fen = FenFields::parse(FenFields::STARTPOS).unwrap();
        assert_eq!(fen.placement.len(), 32);
        assert_eq!(fen.side_to_move, Color::White);
        assert_eq!(fen.castling, CastlingRights::ALL);
        assert_eq!(fen.en_passant, None);
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(fen.placement[0], (Square::A8, Piece::Rook, Color::Black));
    }

    #[test]
    fn roundtrip() {
        for original in [
            FenFields::STARTPOS,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "8/8/8/8/8/8/8/8 w - - 0 1",
        ] {
            assert_eq!(FenFields::parse(original).unwrap().to_fen(), original);
        }
    }

    #[test]
    fn invalid_part_count_and_color() {
        assert!(matches!(
            FenFields::parse("invalid"),
            Err(FenError::InvalidPartCount(1))
        ));
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 x KQkq - 0 1"),
            Err(FenError::InvalidActiveColor(_))
        ));
    }

    #[test]
    fn invalid_piece_placement() {
        for fen in [
            "8/8/8/8/8/8/8 w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "7/8/8/8/8/8/8/8 w - - 0 1",
            "09/8/8/8/8/8/8/8 w - - 0 1",
        ] {
            assert!(
                matches!(FenFields::parse(fen), Err(FenError::InvalidPiecePlacement(_))),
                "{fen}"
            );
        }
    }

    #[test]
    fn invalid_castling_and_en_passant() {
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 w XYZ - 0 1"),
            Err(FenError::InvalidCastlingRights(_))
        ));
        for ep in ["abc", "x3", "e4"] {
            let fen = format!("8/8/8/8/8/8/8/8 w - {ep} 0 1");
            assert!(matches!(
                FenFields::parse(&fen),
                Err(FenError::InvalidEnPassantSquare(_))
            ));
        }
    }

    #[test]
    fn invalid_clocks() {
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 w - - abc 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 w - - 0 xyz"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
        assert!(matches!(
            FenFields::parse("8/8/8/8/8/8/8/8 w - - 0 0"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn clocks_are_bounded() {
        assert!(matches!(
            FenFields::parse("4k3/8/8/8/8/8/8/4K3 w - - 0 3000000000"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
        assert!(matches!(
            FenFields::parse("4k3/8/8/8/8/8/8/4K3 w - - 100001 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        let fields = FenFields::parse("4k3/8/8/8/8/8/8/4K3 w - - 100000 100000").unwrap();
        assert_eq!(fields.halfmove_clock, FenFields::MAX_CLOCK);
        assert_eq!(fields.fullmove_number, FenFields::MAX_CLOCK);
    }

    #[test]
    fn fen_error_display() {
        assert!(FenError::InvalidPartCount(3).to_string().contains('3'));
        assert!(FenError::InvalidEnPassantSquare("z9".into())
            .to_string()
            .contains("z9"));
    }
}
