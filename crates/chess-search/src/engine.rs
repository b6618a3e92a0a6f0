//! Iterative-deepening negamax with null-window probing.
//!
//! The search mutates one board in place, making each move before recursing
//! and unmaking it afterwards. Scores are from the point of view of the side
//! to move at each node; leaves are evaluated for the searched color and
//! negated on the opponent's turn. Every position searched to depth one or more gets a
//! [`Node`] in the [`MoveTree`], found again through the transposition cache,
//! so a deeper iteration starts from the move order the previous one settled on.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chess_core::{Color, Move};
use chess_engine::Board;
use tracing::{debug, error, info};

use crate::cache::TranspositionCache;
use crate::config::MAX_DEPTH;
use crate::eval::{Evaluator, StandardEvaluator};
use crate::tree::{Bound, Child, MoveTree, Node, NodeId};
use crate::{SearchConfig, SearchError};

/// Score of being checkmated at the root; mate `n` plies away scores `MATE_SCORE - n`.
pub const MATE_SCORE: i32 = 1_000_000;

const INFINITY: i32 = MATE_SCORE + 1;

/// Scores beyond this magnitude are mate scores.
const MATE_THRESHOLD: i32 = MATE_SCORE - 1_000;

/// Nodes between clock reads.
const CHECK_INTERVAL: u64 = 1024;

/// Depth recorded for checkmate and stalemate, valid for any query.
const TERMINAL_DEPTH: u8 = u8::MAX;

/// Counters for one call to [`Searcher::find_best_move`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    /// Positions whose cached score answered the query outright.
    pub cache_hits: u64,
    /// Positions not found in the cache.
    pub cache_misses: u64,
    pub cutoffs: u64,
    /// Null-window probes that had to be repeated with the full window.
    pub re_searches: u64,
    pub evictions: u64,
}

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` only when the side to move has no legal move.
    pub best_move: Option<Move>,
    /// Score for the searched color.
    pub score: i32,
    /// Deepest iteration that completed; 0 if none did.
    pub depth: u8,
    pub principal_variation: Vec<Move>,
    pub stats: SearchStats,
}

impl SearchResult {
    /// Plies until mate: positive when the searched color mates, negative
    /// when it is mated.
    pub fn mate_in(&self) -> Option<i32> {
        if self.score >= MATE_THRESHOLD {
            Some(MATE_SCORE - self.score)
        } else if self.score <= -MATE_THRESHOLD {
            Some(-(MATE_SCORE + self.score))
        } else {
            None
        }
    }
}

/// Search state: configuration, evaluator, cache and move tree.
///
/// The cache and tree persist across calls, so consecutive searches of
/// related positions reuse earlier work.
pub struct Searcher<E = StandardEvaluator> {
    config: SearchConfig,
    evaluator: E,
    cache: TranspositionCache<Board, NodeId>,
    tree: MoveTree,
    stats: SearchStats,
    stop: Arc<AtomicBool>,
    deadline: Option<Instant>,
    next_clock_check: u64,
    stopped: bool,
    root_best: Option<Move>,
    /// Color the current search runs for; leaves are scored from its side.
    root_color: Color,
    /// Color the cached scores were computed for.
    cache_color: Option<Color>,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_evaluator(config, StandardEvaluator::default())
    }
}

impl<E: Evaluator> Searcher<E> {
    pub fn with_evaluator(config: SearchConfig, evaluator: E) -> Self {
        Searcher {
            cache: TranspositionCache::new(config.cache_capacity),
            config,
            evaluator,
            tree: MoveTree::new(),
            stats: SearchStats::default(),
            stop: Arc::new(AtomicBool::new(false)),
            deadline: None,
            next_clock_check: 0,
            stopped: false,
            root_best: None,
            root_color: Color::White,
            cache_color: None,
        }
    }

    /// Shares a flag that stops the search between sibling moves once set.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Positions currently held by the transposition cache.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.tree.clear();
        self.cache_color = None;
    }

    /// Searches `board` for `color`, which must be the side to move.
    ///
    /// Runs iterative deepening from depth 2 (or the configured depth, if
    /// smaller) up to the configured depth. An iteration cut short by the stop
    /// flag or the time limit is discarded. If no iteration completes, the
    /// first legal move is returned. The board is restored before returning.
    pub fn find_best_move(
        &mut self,
        board: &mut Board,
        color: Color,
    ) -> Result<SearchResult, SearchError> {
        let to_move = board.side_to_move();
        if color != to_move {
            return Err(SearchError::WrongSideToMove {
                requested: color,
                to_move,
            });
        }

        // Scores from an evaluator that is not antisymmetric depend on the
        // searched color, so they cannot serve a search for the other side.
        if !self.evaluator.is_antisymmetric() && self.cache_color != Some(color) {
            self.clear_cache();
        }
        self.cache_color = Some(color);
        self.root_color = color;

        let started = Instant::now();
        self.stats = SearchStats::default();
        self.stopped = false;
        self.next_clock_check = CHECK_INTERVAL;
        self.deadline = self.config.time_limit().map(|limit| started + limit);

        let max_depth = self.config.depth.clamp(1, MAX_DEPTH);
        let mut result = SearchResult {
            best_move: None,
            score: 0,
            depth: 0,
            principal_variation: Vec::new(),
            stats: SearchStats::default(),
        };

        for depth in max_depth.min(2)..=max_depth {
            if self.interrupted() {
                break;
            }
            self.root_best = None;
            let Some(score) = self.negamax(board, depth, 0, -INFINITY, INFINITY, false) else {
                debug!(depth, nodes = self.stats.nodes, "iteration aborted");
                break;
            };

            let pv = self
                .cache
                .peek(board)
                .map(|&root| self.tree.principal_variation(root, depth as usize))
                .unwrap_or_default();
            result.best_move = pv.first().copied().or(self.root_best);
            result.score = score;
            result.depth = depth;
            result.principal_variation = pv;

            info!(
                depth,
                score,
                nodes = self.stats.nodes,
                cache_hits = self.stats.cache_hits,
                best = %result.best_move.map_or_else(|| "none".to_string(), |m| m.to_uci()),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "iteration complete"
            );

            if score.abs() >= MATE_THRESHOLD {
                break;
            }
        }

        if result.depth == 0 {
            result.best_move = board.generate_all_moves().as_slice().first().copied();
            result.score = self.evaluator.score(board, color);
            result.principal_variation = result.best_move.into_iter().collect();
        }

        if self.stats.evictions > 0 {
            debug!(
                evictions = self.stats.evictions,
                capacity = self.cache.capacity(),
                "transposition cache at capacity"
            );
        }
        result.stats = self.stats;
        Ok(result)
    }

    /// Returns `None` when the stop flag or the clock interrupted the search.
    fn negamax(
        &mut self,
        board: &mut Board,
        depth: u8,
        ply: u8,
        mut alpha: i32,
        beta: i32,
        material_changed: bool,
    ) -> Option<i32> {
        self.stats.nodes += 1;
        if depth == 0 {
            let score = self
                .evaluator
                .score_leaf(board, self.root_color, material_changed);
            return Some(self.from_root_view(board, score));
        }

        let id = self.lookup(board);
        if let Some(node) = self.tree.get(id) {
            let cached = node.cached_score(depth, to_stored(alpha, ply), to_stored(beta, ply));
            if let Some(score) = cached {
                self.stats.cache_hits += 1;
                return Some(from_stored(score, ply));
            }
        }

        let mut children = match self.tree.get_mut(id).and_then(|node| node.children.take()) {
            Some(children) => children,
            None => board
                .generate_all_moves()
                .iter()
                .map(|mv| Child { mv, node: None })
                .collect(),
        };

        if children.is_empty() {
            let score = if board.is_in_check(board.side_to_move()) {
                -(MATE_SCORE - ply as i32)
            } else {
                0
            };
            let node = Node {
                score: to_stored(score, ply),
                depth: TERMINAL_DEPTH,
                bound: Bound::Exact,
                best: None,
                children: Some(children),
            };
            self.record(board, id, node);
            return Some(score);
        }

        let alpha_orig = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = None;
        let mut scores: Vec<Option<i32>> = vec![None; children.len()];
        let mut aborted = false;
        let mut abandoned = false;

        for (i, child) in children.iter_mut().enumerate() {
            if self.interrupted() {
                aborted = true;
                break;
            }
            let mv = child.mv;
            let undo = match board.make_move(mv, false) {
                Ok(undo) => undo,
                Err(err) => {
                    error!(%err, fen = %board.to_fen(), "generated move could not be made");
                    debug_assert!(false, "generated move {mv} could not be made: {err}");
                    abandoned = true;
                    break;
                }
            };
            let changed = undo.material_changed();

            let full_window = best_move.is_none() || !self.config.null_window;
            let score = if full_window {
                self.negamax(board, depth - 1, ply + 1, -beta, -alpha, changed)
                    .map(|s| -s)
            } else {
                match self.negamax(board, depth - 1, ply + 1, -alpha - 1, -alpha, changed) {
                    Some(s) if -s > alpha && -s < beta => {
                        self.stats.re_searches += 1;
                        self.negamax(board, depth - 1, ply + 1, -beta, -alpha, changed)
                            .map(|s| -s)
                    }
                    other => other.map(|s| -s),
                }
            };
            child.node = self.cache.peek(board).copied();

            if let Err(err) = board.unmake_move(mv, undo) {
                error!(%err, "unmake failed during search");
                debug_assert!(false, "unmake of {mv} failed: {err}");
                aborted = true;
                break;
            }
            let Some(score) = score else {
                aborted = true;
                break;
            };

            scores[i] = Some(score);
            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                if ply == 0 {
                    self.root_best = Some(mv);
                }
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }

        if aborted || abandoned || best_move.is_none() {
            if let Some(node) = self.tree.get_mut(id) {
                node.children = Some(children);
            }
            if aborted {
                return None;
            }
            if best_move.is_none() {
                let score = self.evaluator.score(board, self.root_color);
                return Some(self.from_root_view(board, score));
            }
            return Some(best_score);
        }

        let mut ordered: Vec<(Option<i32>, Child)> = scores.into_iter().zip(children).collect();
        ordered.sort_by_key(|&(score, _)| Reverse(score));
        let children = ordered.into_iter().map(|(_, child)| child).collect();

        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        let node = Node {
            score: to_stored(best_score, ply),
            depth,
            bound,
            best: best_move,
            children: Some(children),
        };
        self.record(board, id, node);
        Some(best_score)
    }

    /// Converts a score for the searched color into one for the side to move.
    fn from_root_view(&self, board: &Board, score: i32) -> i32 {
        if board.side_to_move() == self.root_color {
            score
        } else {
            -score
        }
    }

    /// Finds the node for `board`, creating and caching an empty one on a miss.
    fn lookup(&mut self, board: &Board) -> NodeId {
        if let Some(&id) = self.cache.get(board) {
            if self.tree.get(id).is_some() {
                return id;
            }
        }
        self.stats.cache_misses += 1;
        let id = self.tree.insert(Node::unexpanded());
        self.cache_node(board, id);
        id
    }

    /// Writes a finished node back. If the cache evicted it meanwhile, it is
    /// stored again under a fresh id.
    fn record(&mut self, board: &Board, id: NodeId, node: Node) {
        match self.tree.get_mut(id) {
            Some(slot) => *slot = node,
            None => {
                let id = self.tree.insert(node);
                self.cache_node(board, id);
            }
        }
    }

    fn cache_node(&mut self, board: &Board, id: NodeId) {
        if let Some((_, evicted)) = self.cache.put(board.clone(), id) {
            self.tree.remove(evicted);
            self.stats.evictions += 1;
        }
    }

    /// Polls the stop flag every call and the clock every [`CHECK_INTERVAL`] nodes.
    fn interrupted(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if self.stop.load(Ordering::Relaxed) {
            self.stopped = true;
        } else if let Some(deadline) = self.deadline {
            if self.stats.nodes >= self.next_clock_check || self.stats.nodes == 0 {
                self.next_clock_check = self.stats.nodes + CHECK_INTERVAL;
                self.stopped = Instant::now() >= deadline;
            }
        }
        self.stopped
    }
}

/// Searches `board` for `color` to `depth` with a fresh searcher.
pub fn find_best_move<E: Evaluator>(
    board: &mut Board,
    color: Color,
    depth: u8,
    evaluator: E,
) -> Result<SearchResult, SearchError> {
    let config = SearchConfig::default().with_depth(depth);
    Searcher::with_evaluator(config, evaluator).find_best_move(board, color)
}

/// Mate scores are stored relative to the node so they stay valid at any ply.
fn to_stored(score: i32, ply: u8) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

fn from_stored(score: i32, ply: u8) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}
