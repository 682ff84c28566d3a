// Square mapping: A8=0, B8=1, ..., H1=63.
// rank = square / 8 (rank 0 is the 8th rank), file = square % 8.

use crate::error::{ChessError, Result};
use crate::pieces::Color;

pub type Square = usize;

pub const SQUARE_COUNT: usize = 64;
pub const RANK_COUNT: usize = 8;
pub const FILE_COUNT: usize = 8;

pub const RANK_8: usize = 0;
pub const RANK_7: usize = 1;
pub const RANK_2: usize = 6;
pub const RANK_1: usize = 7;

pub const FILE_A: usize = 0;
pub const FILE_C: usize = 2;
pub const FILE_G: usize = 6;
pub const FILE_H: usize = 7;

pub const A8: Square = 0;
pub const B8: Square = 1;
pub const C8: Square = 2;
pub const D8: Square = 3;
pub const E8: Square = 4;
pub const F8: Square = 5;
pub const G8: Square = 6;
pub const H8: Square = 7;

pub const A1: Square = 56;
pub const B1: Square = 57;
pub const C1: Square = 58;
pub const D1: Square = 59;
pub const E1: Square = 60;
pub const F1: Square = 61;
pub const G1: Square = 62;
pub const H1: Square = 63;

// Direction deltas
pub const UP: isize = -8;
pub const DOWN: isize = 8;
pub const LEFT: isize = -1;
pub const RIGHT: isize = 1;

#[inline]
pub const fn make_square(rank: usize, file: usize) -> Square {
    rank * 8 + file
}

#[inline]
pub const fn rank_of(sq: Square) -> usize {
    sq / 8
}

#[inline]
pub const fn file_of(sq: Square) -> usize {
    sq % 8
}

#[inline]
pub const fn mirror_square(sq: Square) -> Square {
    sq ^ 63
}

#[inline]
pub const fn mirror_rank(sq: Square) -> Square {
    sq ^ 56
}

#[inline]
pub const fn mirror_file(sq: Square) -> Square {
    sq ^ 7
}

/// Pawn push direction for `color`.
#[inline]
pub fn move_direction(color: Color) -> isize {
    match color {
        Color::White => UP,
        Color::Black => DOWN,
    }
}

#[inline]
pub fn promotion_rank(color: Color) -> usize {
    match color {
        Color::White => RANK_8,
        Color::Black => RANK_1,
    }
}

/// Rank from which `color`'s pawns may double push.
#[inline]
pub fn pawn_start_rank(color: Color) -> usize {
    match color {
        Color::White => RANK_2,
        Color::Black => RANK_7,
    }
}

/// `sq + delta`; callers guarantee the result stays on the board.
#[inline]
pub fn offset(sq: Square, delta: isize) -> Square {
    let target = sq as isize + delta;
    debug_assert!((0..SQUARE_COUNT as isize).contains(&target), "square {sq} + {delta} is off the board");
    target as Square
}

#[inline]
pub fn rank_char(rank: usize) -> char {
    (b'8' - rank as u8) as char
}

#[inline]
pub fn file_char(file: usize) -> char {
    (b'a' + file as u8) as char
}

/// Algebraic name, e.g. 0 -> "a8", 63 -> "h1".
pub fn square_name(sq: Square) -> String {
    let mut name = String::with_capacity(2);
    name.push(file_char(file_of(sq)));
    name.push(rank_char(rank_of(sq)));
    name
}

/// Parses two-character algebraic notation ("e2" -> 52).
pub fn parse_square(text: &str) -> Result<Square> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessError::InvalidSquare(text.to_string()));
    }
    let (file, rank) = (bytes[0], bytes[1]);
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(ChessError::InvalidSquare(text.to_string()));
    }
    Ok(make_square((b'8' - rank) as usize, (file - b'a') as usize))
}
