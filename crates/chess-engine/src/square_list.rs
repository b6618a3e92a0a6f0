//! Fixed-capacity, ascending-sorted square lists.
//!
//! Used for per-color piece locations (capacity 16) and for a single piece's
//! destination squares (capacity 27, a queen in the middle of an empty board).
//! The explicit length replaces a sentinel terminator; iteration stops at
//! `len` and membership is a binary search.

use chess_core::Square;

/// A sorted set of squares stored inline.
#[derive(Clone, Copy)]
pub struct SquareList<const N: usize> {
    squares: [Square; N],
    len: u8,
}

/// Occupied squares of one color.
pub type PieceList = SquareList<16>;

/// Destination squares produced by a single piece generator.
pub type Targets = SquareList<27>;

impl<const N: usize> SquareList<N> {
    /// Maximum number of squares the list can hold.
    pub const CAPACITY: usize = N;

    #[inline]
    pub const fn new() -> Self {
        SquareList {
            squares: [Square::A1; N],
            len: 0,
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len as usize == N
    }

    #[inline]
    pub fn as_slice(&self) -> &[Square] {
        &self.squares[..self.len()]
    }

    #[inline]
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, Square>> {
        self.as_slice().iter().copied()
    }

    #[inline]
    pub fn contains(&self, square: Square) -> bool {
        self.as_slice().binary_search(&square).is_ok()
    }

    /// Inserts keeping ascending order. Returns false if the square was
    /// already present or the list is full.
    pub fn insert(&mut self, square: Square) -> bool {
        let pos = match self.as_slice().binary_search(&square) {
            Ok(_) => return false,
            Err(pos) => pos,
        };
        if self.is_full() {
            return false;
        }
        let len = self.len();
        self.squares.copy_within(pos..len, pos + 1);
        self.squares[pos] = square;
        self.len += 1;
        true
    }

    /// Removes a square. Returns false if it was not present.
    pub fn remove(&mut self, square: Square) -> bool {
        match self.as_slice().binary_search(&square) {
            Ok(pos) => {
                let len = self.len();
                self.squares.copy_within(pos + 1..len, pos);
                self.len -= 1;
                true
            }
            Err(_) => false,
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for SquareList<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PartialEq for SquareList<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<const N: usize> Eq for SquareList<N> {}

impl<'a, const N: usize> IntoIterator for &'a SquareList<N> {
    type Item = Square;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Square>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const N: usize> std::fmt::Debug for SquareList<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}
