//! Core types for chess.
//!
//! This crate provides the fundamental value types shared by the engine and
//! the search:
//! - [`Piece`] and [`Color`], with the piece catalog (material values and
//!   positional bonus tables)
//! - [`Square`], [`File`], and [`Rank`] in a 0x88 index space
//! - [`Move`], a packed (from, to, promotion) triple
//! - [`CastlingRights`] and [`CastleSide`]
//! - FEN parsing and serialization via [`FenFields`]

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
pub mod square;

pub use castling::{king_home, CastleSide, CastlingRights};
pub use color::Color;
pub use fen::{FenError, FenFields};
pub use mov::Move;
pub use piece::Piece;
pub use square::{all_squares, File, Rank, Square};
