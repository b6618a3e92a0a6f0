//! Board coordinates in the 0x88 index space.
//!
//! A square index is `rank * 16 + file`. The upper nibble holds the rank and
//! the lower nibble the file, so the eight "phantom" columns to the right of
//! the real board make every off-board index have bit 3 or bit 7 set. Stepping
//! off the board in any direction is detected with a single `& 0x88` test.

use std::fmt;

/// A file (column) on the chess board, from A to H.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    /// All files in order.
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    /// Creates a file from index (0-7).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Creates a file from a character ('a'-'h' or 'A'-'H').
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        let lower = c.to_ascii_lowercase();
        if lower >= 'a' && lower <= 'h' {
            Self::from_index(lower as u8 - b'a')
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A rank (row) on the chess board, from 1 to 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    /// All ranks in order.
    pub const ALL: [Rank; 8] = [
        Rank::R1,
        Rank::R2,
        Rank::R3,
        Rank::R4,
        Rank::R5,
        Rank::R6,
        Rank::R7,
        Rank::R8,
    ];

    /// Creates a rank from index (0-7).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Creates a rank from a character ('1'-'8').
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        if c >= '1' && c <= '8' {
            Self::from_index(c as u8 - b'1')
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn to_char(self) -> char {
        (b'1' + self as u8) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Signed step between two 0x88 squares.
pub type Offset = i8;

/// One rank up (towards rank 8).
pub const NORTH: Offset = 16;
/// One rank down (towards rank 1).
pub const SOUTH: Offset = -16;
pub const EAST: Offset = 1;
pub const WEST: Offset = -1;
pub const NORTH_EAST: Offset = 17;
pub const NORTH_WEST: Offset = 15;
pub const SOUTH_EAST: Offset = -15;
pub const SOUTH_WEST: Offset = -17;

/// The four rook directions.
pub const ORTHOGONALS: [Offset; 4] = [NORTH, SOUTH, EAST, WEST];

/// The four bishop directions.
pub const DIAGONALS: [Offset; 4] = [NORTH_EAST, NORTH_WEST, SOUTH_EAST, SOUTH_WEST];

/// The eight king steps, orthogonals first.
pub const KING_STEPS: [Offset; 8] = [
    NORTH, SOUTH, EAST, WEST, NORTH_EAST, NORTH_WEST, SOUTH_EAST, SOUTH_WEST,
];

/// The eight knight jumps.
pub const KNIGHT_JUMPS: [Offset; 8] = [33, 31, 18, 14, -14, -18, -31, -33];

/// A square on the chess board, stored as a 0x88 index.
///
/// Only indices with `index & 0x88 == 0` are valid; the constructors never
/// produce anything else. Ordering follows the index, so a1 < b1 < ... < h8.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// Number of slots in the padded 0x88 index space.
    pub const SPACE: usize = 128;

    /// Creates a square from file and rank.
    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square((rank.index() << 4) | file.index())
    }

    /// Creates a square from a zero-based row (rank) and column (file).
    #[inline]
    pub const fn from_coords(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Square((row << 4) | col))
        } else {
            None
        }
    }

    /// Creates a square from a 0x88 index, rejecting off-board indices.
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if Self::is_on_board(index) {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Creates a square from a 0-63 dense index (a1 = 0, h8 = 63).
    #[inline]
    pub const fn from_dense(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(((index >> 3) << 4) | (index & 7)))
        } else {
            None
        }
    }

    /// The 0x88 membership test.
    #[inline]
    pub const fn is_on_board(index: u8) -> bool {
        index & 0x88 == 0
    }

    /// Parses a square from algebraic notation (e.g., "e4").
    pub const fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let file = match File::from_char(bytes[0] as char) {
            Some(f) => f,
            None => return None,
        };
        let rank = match Rank::from_char(bytes[1] as char) {
            Some(r) => r,
            None => return None,
        };
        Some(Square::new(file, rank))
    }

    /// Returns the 0x88 index.
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns the dense 0-63 index, used by tables laid out a1..h8.
    #[inline]
    pub const fn dense(self) -> usize {
        ((self.0 >> 4) * 8 + (self.0 & 7)) as usize
    }

    /// Zero-based row (0 = rank 1).
    #[inline]
    pub const fn row(self) -> u8 {
        self.0 >> 4
    }

    /// Zero-based column (0 = file a).
    #[inline]
    pub const fn col(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub const fn file(self) -> File {
        File::ALL[self.col() as usize]
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        Rank::ALL[self.row() as usize]
    }

    /// Steps by `offset`, returning `None` when the target leaves the board.
    ///
    /// Negative results wrap to indices >= 128, which the 0x88 mask rejects
    /// the same way as overflow past h8.
    #[inline]
    pub const fn offset(self, offset: Offset) -> Option<Self> {
        let target = self.0.wrapping_add(offset as u8);
        if Self::is_on_board(target) {
            Some(Square(target))
        } else {
            None
        }
    }

    /// Returns the algebraic notation for this square.
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }

    // Common squares
    pub const A1: Square = Square(0x00);
    pub const B1: Square = Square(0x01);
    pub const C1: Square = Square(0x02);
    pub const D1: Square = Square(0x03);
    pub const E1: Square = Square(0x04);
    pub const F1: Square = Square(0x05);
    pub const G1: Square = Square(0x06);
    pub const H1: Square = Square(0x07);
    pub const A8: Square = Square(0x70);
    pub const B8: Square = Square(0x71);
    pub const C8: Square = Square(0x72);
    pub const D8: Square = Square(0x73);
    pub const E8: Square = Square(0x74);
    pub const F8: Square = Square(0x75);
    pub const G8: Square = Square(0x76);
    pub const H8: Square = Square(0x77);
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self.to_algebraic())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

/// Iterates all 64 squares in ascending index order.
pub fn all_squares() -> impl Iterator<Item = Square> {
    (0u8..64).filter_map(Square::from_dense)
}
