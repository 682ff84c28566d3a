//! Position snapshot: one per ply on the game stack.
//!
//! Invariants kept by every mutation site:
//! - `pieces[0]` is the complement of all occupied squares;
//! - `colors[White] | colors[Black]` is the occupied set;
//! - each occupied square is in exactly one `pieces[p]` (p != 0) and one
//!   `colors[c]`.

use std::fmt;

use crate::magic::{bishop_attacks, queen_attacks, rook_attacks};
use crate::pieces::{Color, Piece, PieceType};
use crate::squares::{make_square, Square, FILE_A, FILE_H};
use crate::utils::{count_bits, file_mask, king_attacks, knight_attacks, lsb_index, square_mask, Bitboard};
use crate::zobrist;

pub const CASTLING_WK: u8 = 1;
pub const CASTLING_WQ: u8 = 2;
pub const CASTLING_BK: u8 = 4;
pub const CASTLING_BQ: u8 = 8;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub pieces: [Bitboard; Piece::COUNT],
    pub colors: [Bitboard; 2],
    pub side: Color,
    pub castling: u8,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
}

impl Default for Position {
    fn default() -> Self {
        Self::empty()
    }
}

impl Position {
    /// Empty board, white to move, no rights.
    pub fn empty() -> Self {
        let mut pieces = [0; Piece::COUNT];
        pieces[Piece::NONE.index()] = u64::MAX;
        Self {
            pieces,
            colors: [0; 2],
            side: Color::White,
            castling: 0,
            en_passant: None,
            halfmove_clock: 0,
        }
    }

    #[inline]
    pub fn bb(&self, piece: Piece) -> Bitboard {
        self.pieces[piece.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        !self.pieces[Piece::NONE.index()]
    }

    #[inline]
    pub fn empty_squares(&self) -> Bitboard {
        self.pieces[Piece::NONE.index()]
    }

    #[inline]
    pub fn color_bb(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    /// Places `piece` on an empty square.
    pub fn put_piece(&mut self, piece: Piece, sq: Square) {
        let bit = square_mask(sq);
        debug_assert!(self.empty_squares() & bit != 0, "square {sq} already occupied");
        self.pieces[Piece::NONE.index()] &= !bit;
        self.pieces[piece.index()] |= bit;
        self.colors[piece.color().index()] |= bit;
    }

    pub fn hash(&self) -> u64 {
        self.pieces_hash() ^ self.info_hash()
    }

    pub fn pieces_hash(&self) -> u64 {
        let mut hash = 0;
        for id in 1..Piece::COUNT {
            let mut mask = self.pieces[id];
            while let Some(sq) = crate::utils::pop_lsb(&mut mask) {
                hash ^= zobrist::keys().pieces[id][sq];
            }
        }
        hash
    }

    #[inline]
    pub fn info_hash(&self) -> u64 {
        zobrist::info_key(self.side, self.castling, self.en_passant)
    }

    // Pawn geometry -----------------------------------------------------

    /// Squares one step ahead of `color`'s pawns (occupancy ignored).
    #[inline]
    pub fn pawn_pushes(&self, color: Color) -> Bitboard {
        let pawns = self.bb(Piece::new(color, PieceType::Pawn));
        match color {
            Color::White => pawns >> 8,
            Color::Black => pawns << 8,
        }
    }

    /// Captures toward the a-file.
    #[inline]
    pub fn pawn_left_attacks(&self, color: Color) -> Bitboard {
        let pawns = self.bb(Piece::new(color, PieceType::Pawn));
        match color {
            Color::White => (pawns >> 9) & !file_mask(FILE_H),
            Color::Black => (pawns << 7) & !file_mask(FILE_H),
        }
    }

    /// Captures toward the h-file.
    #[inline]
    pub fn pawn_right_attacks(&self, color: Color) -> Bitboard {
        let pawns = self.bb(Piece::new(color, PieceType::Pawn));
        match color {
            Color::White => (pawns >> 7) & !file_mask(FILE_A),
            Color::Black => (pawns << 9) & !file_mask(FILE_A),
        }
    }

    #[inline]
    pub fn pawn_attacks(&self, color: Color) -> Bitboard {
        self.pawn_left_attacks(color) | self.pawn_right_attacks(color)
    }

    /// Attack set of a non-pawn piece class standing on `sq`.
    #[inline]
    pub fn attacks_from(&self, kind: PieceType, sq: Square) -> Bitboard {
        match kind {
            PieceType::Knight => knight_attacks(sq),
            PieceType::Bishop => bishop_attacks(sq, self.occupied()),
            PieceType::Rook => rook_attacks(sq, self.occupied()),
            PieceType::Queen => queen_attacks(sq, self.occupied()),
            PieceType::King => king_attacks(sq),
            PieceType::Pawn | PieceType::None => 0,
        }
    }

    // Attack / check queries ------------------------------------------------

    /// True if any piece of `by` attacks `sq`, tested from `sq`'s side
    /// with each attacker's movement rule.
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        if self.pawn_attacks(by) & square_mask(sq) != 0 {
            return true;
        }
        PieceType::OFFICERS
            .iter()
            .any(|&kind| self.attacks_from(kind, sq) & self.bb(Piece::new(by, kind)) != 0)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        lsb_index(self.bb(Piece::new(color, PieceType::King)))
    }

    /// Side to move in check.
    pub fn is_check(&self) -> bool {
        self.is_in_check(self.side)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(sq) => self.is_attacked(sq, color.opposite()),
            None => false,
        }
    }

    // Draw rules ------------------------------------------------------------

    pub fn is_draw(&self) -> bool {
        self.is_draw_by_fifty_move_rule() || self.is_draw_by_insufficient_material()
    }

    pub fn is_draw_by_fifty_move_rule(&self) -> bool {
        self.halfmove_clock >= 100
    }

    pub fn is_draw_by_insufficient_material(&self) -> bool {
        !self.has_sufficient_material(Color::White) && !self.has_sufficient_material(Color::Black)
    }

    /// Three or more men (king included), or any pawn, rook or queen.
    pub fn has_sufficient_material(&self, color: Color) -> bool {
        count_bits(self.color_bb(color)) >= 3
            || self.bb(Piece::new(color, PieceType::Pawn)) != 0
            || self.bb(Piece::new(color, PieceType::Rook)) != 0
            || self.bb(Piece::new(color, PieceType::Queen)) != 0
    }

    /// Occupant of `sq` read from the bitboards (O(16)); the game keeps a
    /// mirror board for O(1) lookups.
    pub fn piece_on(&self, sq: Square) -> Piece {
        let bit = square_mask(sq);
        (1..Piece::COUNT)
            .find(|&id| self.pieces[id] & bit != 0)
            .map(Piece::from_index)
            .unwrap_or(Piece::NONE)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{self}")?;
        write!(
            f,
            "side={:?} castling={:04b} ep={:?} halfmove={}",
            self.side, self.castling, self.en_passant, self.halfmove_clock
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in 0..8 {
            for file in 0..8 {
                let piece = self.piece_on(make_square(rank, file));
                if piece.is_piece() {
                    write!(f, "{} ", piece.to_char())?;
                } else {
                    write!(f, ". ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
