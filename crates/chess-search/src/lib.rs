//! Best-move search over a [`chess_engine::Board`].
//!
//! [`Searcher`] runs iterative-deepening negamax with alpha-beta pruning and
//! null-window (negascout) probes. Positions it has searched are remembered in
//! a [`MoveTree`] reached through a bounded [`TranspositionCache`], so each
//! deeper pass tries the previous pass's best moves first and cached scores
//! are reused only when they were computed at least as deep as needed.
//!
//! # Example
//!
//! ```
//! use chess_core::{Color, Move};
//! use chess_engine::Board;
//! use chess_search::{SearchConfig, Searcher};
//!
//! let mut board = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
//! let mut searcher = Searcher::new(SearchConfig::default().with_depth(3));
//! let result = searcher.find_best_move(&mut board, Color::White).unwrap();
//! assert_eq!(result.best_move, Move::from_uci("a1a8"));
//! assert_eq!(result.mate_in(), Some(1));
//! ```

mod cache;
mod config;
mod engine;
mod error;
mod eval;
mod tree;

pub use cache::TranspositionCache;
pub use config::{SearchConfig, MAX_DEPTH};
pub use engine::{find_best_move, SearchResult, SearchStats, Searcher, MATE_SCORE};
pub use error::{ConfigError, SearchError};
pub use eval::{Evaluator, StandardEvaluator};
pub use tree::{Bound, Child, MoveTree, Node, NodeId};
