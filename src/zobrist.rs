// Zobrist hashing with precomputed tables
//
// A position hash is the XOR of a piece-placement part (one key per piece id
// and square; id 0, the empty-square slot, keys to zero) and an info part
// (side to move, castling rights, en-passant file). The info part is XORed out
// before a move and back in after it, so make/unmake update it incrementally.

use std::sync::OnceLock;

use crate::pieces::{Color, Piece};
use crate::squares::{file_of, Square, SQUARE_COUNT};
use crate::utils::SplitMix64;

const ZOBRIST_SEED: u64 = 0x2545_F491_4F6C_DD1D;

pub struct ZobristKeys {
    pub pieces: [[u64; SQUARE_COUNT]; Piece::COUNT],
    pub side: u64,
    // Index: 4-bit castling rights value
    pub castling: [u64; 16],
    pub ep_file: [u64; 8],
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

fn build_keys() -> ZobristKeys {
    let mut rng = SplitMix64::new(ZOBRIST_SEED);
    let mut keys = ZobristKeys {
        pieces: [[0; SQUARE_COUNT]; Piece::COUNT],
        side: 0,
        castling: [0; 16],
        ep_file: [0; 8],
    };
    for (id, row) in keys.pieces.iter_mut().enumerate() {
        if id % 8 == 0 || id % 8 == 7 {
            continue;
        }
        for key in row.iter_mut() {
            *key = rng.next_u64();
        }
    }
    keys.side = rng.next_u64();
    for key in keys.castling.iter_mut() {
        *key = rng.next_u64();
    }
    for key in keys.ep_file.iter_mut() {
        *key = rng.next_u64();
    }
    keys
}

#[inline]
pub fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(build_keys)
}

pub fn init_zobrist() {
    keys();
}

#[inline]
pub fn piece_key(piece: Piece, sq: Square) -> u64 {
    keys().pieces[piece.index()][sq]
}

/// Side, castling and en-passant component.
pub fn info_key(side: Color, castling: u8, en_passant: Option<Square>) -> u64 {
    let keys = keys();
    let mut h = keys.castling[castling as usize & 0xF];
    if side == Color::Black {
        h ^= keys.side;
    }
    if let Some(ep) = en_passant {
        h ^= keys.ep_file[file_of(ep)];
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_keys_are_zero() {
        for sq in 0..SQUARE_COUNT {
            assert_eq!(piece_key(Piece::NONE, sq), 0);
        }
    }

    #[test]
    fn piece_keys_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for id in [1usize, 2, 3, 4, 5, 6, 9, 10, 11, 12, 13, 14] {
            for sq in 0..SQUARE_COUNT {
                assert!(seen.insert(keys().pieces[id][sq]));
            }
        }
    }

    #[test]
    fn info_key_separates_states() {
        let base = info_key(Color::White, 0, None);
        assert_ne!(base, info_key(Color::Black, 0, None));
        assert_ne!(base, info_key(Color::White, 1, None));
        assert_ne!(info_key(Color::White, 0, Some(16)), info_key(Color::White, 0, Some(17)));
        // Only the file of the en-passant square matters.
        assert_eq!(info_key(Color::White, 0, Some(16)), info_key(Color::White, 0, Some(40)));
    }
}
