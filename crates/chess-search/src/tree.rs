//! The move tree: per-position search records kept across iterative deepening.
//!
//! Nodes live in a generational arena and refer to each other by [`NodeId`].
//! A node does not own a board; the transposition cache maps each board
//! snapshot to its node. When the cache evicts a position the node is removed
//! from the arena and its slot's generation is bumped, so stale ids held by
//! parents resolve to `None` instead of to whatever reuses the slot.

use chess_core::Move;

/// Handle to a node in a [`MoveTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// How a stored score relates to the true value of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score is the exact value.
    Exact,
    /// The search failed high; the true value is at least the score.
    Lower,
    /// The search failed low; the true value is at most the score.
    Upper,
}

/// An edge to a successor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Child {
    pub mv: Move,
    /// Node of the resulting position, once it has been searched.
    pub node: Option<NodeId>,
}

/// Search record for one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Score from the point of view of the side to move in this position.
    pub score: i32,
    /// Remaining depth the score was computed with; 0 means never scored.
    pub depth: u8,
    pub bound: Bound,
    pub best: Option<Move>,
    /// Legal moves, best first after each search. `None` until expanded.
    pub children: Option<Vec<Child>>,
}

impl Node {
    /// A fresh node with no score and no children.
    pub fn unexpanded() -> Self {
        Node {
            score: 0,
            depth: 0,
            bound: Bound::Exact,
            best: None,
            children: None,
        }
    }

    /// The stored score, if it settles a search of `depth` within `(alpha, beta)`.
    ///
    /// A score recorded at a shallower depth is never reused, and a bound is
    /// only used when it already falls outside the window on the side it bounds.
    pub fn cached_score(&self, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        if self.depth == 0 || self.depth < depth {
            return None;
        }
        match self.bound {
            Bound::Exact => Some(self.score),
            Bound::Lower if self.score >= beta => Some(self.score),
            Bound::Upper if self.score <= alpha => Some(self.score),
            _ => None,
        }
    }

    pub fn child(&self, mv: Move) -> Option<&Child> {
        self.children.as_ref()?.iter().find(|c| c.mv == mv)
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of [`Node`]s.
#[derive(Default)]
pub struct MoveTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl MoveTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn insert(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Removes a node, invalidating every copy of `id`.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    /// Follows best moves from `root`, at most `max_len` plies.
    pub fn principal_variation(&self, root: NodeId, max_len: usize) -> Vec<Move> {
        let mut line = Vec::new();
        let mut current = self.get(root);
        while let Some(node) = current {
            if line.len() >= max_len {
                break;
            }
            let Some(best) = node.best else {
                break;
            };
            line.push(best);
            current = node.child(best).and_then(|c| c.node).and_then(|id| self.get(id));
        }
        line
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}
