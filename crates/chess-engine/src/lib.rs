//! Mailbox chess board with in-place make/unmake.
//!
//! This crate provides:
//! - [`Board`] - a 0x88 mailbox with per-color sorted piece lists and cached
//!   king squares, mutated in place
//! - [`UndoState`] - the token returned by [`Board::make_move`] and consumed
//!   by [`Board::unmake_move`]
//! - Per-piece move generators, attack detection and legal move generation
//! - Perft for move generator validation
//! - [`MoveError`] for rejected moves
//!
//! # Example
//!
//! ```
//! use chess_engine::Board;
//!
//! let mut board = Board::startpos();
//! let moves = board.generate_all_moves();
//! assert_eq!(moves.len(), 20);
//!
//! let mv = moves[0];
//! let undo = board.make_move(mv, true).unwrap();
//! board.unmake_move(mv, undo).unwrap();
//! assert_eq!(board, Board::startpos());
//! ```

mod board;
mod error;
mod make_unmake;
pub mod movegen;
pub mod square_list;
mod zobrist;

pub use board::Board;
pub use error::MoveError;
pub use make_unmake::UndoState;
pub use movegen::perft::{perft, perft_divide};
pub use movegen::MoveList;
pub use square_list::{PieceList, SquareList, Targets};
