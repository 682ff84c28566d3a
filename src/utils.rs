// Bitboard primitives and the static (occupancy-independent) move masks.
// Bit i of a bitboard is square i (A8 = bit 0, H1 = bit 63).

use std::sync::OnceLock;

use crate::squares::{file_of, rank_of, Square, FILE_A, FILE_H, RANK_1, RANK_8, SQUARE_COUNT};

pub type Bitboard = u64;

#[inline]
pub const fn rank_mask(rank: usize) -> Bitboard {
    0x00000000000000FF << (rank * 8)
}

#[inline]
pub const fn file_mask(file: usize) -> Bitboard {
    0x0101010101010101 << file
}

#[inline]
pub const fn square_mask(sq: Square) -> Bitboard {
    1u64 << sq
}

pub const NOT_FILE_A: Bitboard = !file_mask(FILE_A);
pub const NOT_FILE_H: Bitboard = !file_mask(FILE_H);

pub const EDGE_MASK: Bitboard =
    rank_mask(RANK_1) | rank_mask(RANK_8) | file_mask(FILE_A) | file_mask(FILE_H);

// Bit operations
#[inline]
pub fn test_square(bb: Bitboard, sq: Square) -> bool {
    bb & square_mask(sq) != 0
}

#[inline]
pub fn set_square(bb: &mut Bitboard, sq: Square) {
    *bb |= square_mask(sq);
}

#[inline]
pub fn clear_square(bb: &mut Bitboard, sq: Square) {
    *bb &= !square_mask(sq);
}

#[inline]
pub fn pop_lsb(bb: &mut Bitboard) -> Option<Square> {
    if *bb == 0 {
        return None;
    }
    let lsb = bb.trailing_zeros() as Square;
    *bb &= *bb - 1;
    Some(lsb)
}

#[inline]
pub fn lsb_index(bb: Bitboard) -> Option<Square> {
    if bb == 0 {
        None
    } else {
        Some(bb.trailing_zeros() as Square)
    }
}

#[inline]
pub fn count_bits(bb: Bitboard) -> u32 {
    bb.count_ones()
}

pub struct BitIter {
    bb: Bitboard,
}

impl Iterator for BitIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        pop_lsb(&mut self.bb)
    }
}

#[inline]
pub fn iter_bits(bb: Bitboard) -> BitIter {
    BitIter { bb }
}

/// SplitMix64 stream: seeds the Zobrist keys, the magic search fallback and
/// reproducible test fixtures.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Few-bits-set value, the usual shape of a magic multiplier.
    pub fn sparse(&mut self) -> u64 {
        self.next_u64() & self.next_u64() & self.next_u64()
    }
}

/// Per-square reachability on an empty board.
pub struct MoveMasks {
    pub knight: [Bitboard; SQUARE_COUNT],
    pub bishop: [Bitboard; SQUARE_COUNT],
    pub rook: [Bitboard; SQUARE_COUNT],
    pub queen: [Bitboard; SQUARE_COUNT],
    pub king: [Bitboard; SQUARE_COUNT],
}

static MOVE_MASKS: OnceLock<MoveMasks> = OnceLock::new();

fn build_move_masks() -> MoveMasks {
    let mut masks = MoveMasks {
        knight: [0; SQUARE_COUNT],
        bishop: [0; SQUARE_COUNT],
        rook: [0; SQUARE_COUNT],
        queen: [0; SQUARE_COUNT],
        king: [0; SQUARE_COUNT],
    };

    for source in 0..SQUARE_COUNT {
        for target in 0..SQUARE_COUNT {
            if source == target {
                continue;
            }
            let dr = rank_of(source).abs_diff(rank_of(target));
            let df = file_of(source).abs_diff(file_of(target));
            let bit = square_mask(target);
            if (dr == 1 && df == 2) || (dr == 2 && df == 1) {
                masks.knight[source] |= bit;
            }
            if dr == df {
                masks.bishop[source] |= bit;
            }
            if dr == 0 || df == 0 {
                masks.rook[source] |= bit;
            }
            if dr == df || dr == 0 || df == 0 {
                masks.queen[source] |= bit;
            }
            if dr <= 1 && df <= 1 {
                masks.king[source] |= bit;
            }
        }
    }
    masks
}

#[inline]
fn move_masks() -> &'static MoveMasks {
    MOVE_MASKS.get_or_init(build_move_masks)
}

#[inline(always)]
pub fn init_attack_tables() {
    move_masks();
}

#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    move_masks().knight[sq]
}

#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    move_masks().king[sq]
}

/// Unblocked diagonal rays.
#[inline]
pub fn bishop_rays(sq: Square) -> Bitboard {
    move_masks().bishop[sq]
}

/// Unblocked orthogonal rays.
#[inline]
pub fn rook_rays(sq: Square) -> Bitboard {
    move_masks().rook[sq]
}

#[inline]
pub fn queen_rays(sq: Square) -> Bitboard {
    move_masks().queen[sq]
}
