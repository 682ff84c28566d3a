// Move record and the fixed-capacity move buffer.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use crate::pieces::{Piece, PieceType};
use crate::squares::{square_name, Square};

/// Capacity of a `MoveList`; no legal chess position has more moves.
pub const MAX_MOVES: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MoveType {
    #[default]
    Normal,
    DoublePawnPush,
    EnPassant,
    Castling,
    /// Promotion to the given piece type (Knight..Queen).
    Promotion(PieceType),
}

/// A single move. `source_piece` and `target_piece` (the captured piece, or
/// `Piece::NONE`) let the move undo itself; identity is (source, target, type).
#[derive(Debug, Clone, Copy, Default)]
pub struct Move {
    source: u8,
    target: u8,
    pub source_piece: Piece,
    pub target_piece: Piece,
    pub kind: MoveType,
}

impl Move {
    /// Squares must be on the board (`< 64`); callers validate text input
    /// with `parse_square` first.
    pub fn new(source: Square, target: Square, source_piece: Piece, target_piece: Piece, kind: MoveType) -> Self {
        debug_assert!(source < 64 && target < 64);
        Self {
            source: source as u8,
            target: target as u8,
            source_piece,
            target_piece,
            kind,
        }
    }

    #[inline]
    pub fn source(&self) -> Square {
        self.source as Square
    }

    #[inline]
    pub fn target(&self) -> Square {
        self.target as Square
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        matches!(self.kind, MoveType::Promotion(_))
    }

    /// Promotion piece type, `PieceType::None` for other moves.
    #[inline]
    pub fn promotion_piece(&self) -> PieceType {
        match self.kind {
            MoveType::Promotion(kind) => kind,
            _ => PieceType::None,
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.target_piece.is_piece() || self.kind == MoveType::EnPassant
    }

    /// Placeholder record (source == target).
    #[inline]
    pub fn is_null(&self) -> bool {
        self.source == self.target
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.target == other.target && self.kind == other.kind
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.target.hash(state);
        self.kind.hash(state);
    }
}

/// UCI coordinate text, e.g. "e2e4" or "e7e8q".
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", square_name(self.source()), square_name(self.target()))?;
        if let MoveType::Promotion(kind) = self.kind {
            write!(f, "{}", kind.lower_char())?;
        }
        Ok(())
    }
}

/// Stack-allocated buffer filled by the move generator.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub fn new() -> Self {
        Self {
            moves: [Move::default(); MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES, "move list overflow");
        self.moves[self.len] = mv;
        self.len += 1;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for MoveList {
    type Target = [Move];

    fn deref(&self) -> &[Move] {
        self.as_slice()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|m| m.to_string())).finish()
    }
}
