//! Magic Bitboards for O(1) sliding piece attack generation
//!
//! For every square the "relevant occupancy" mask keeps the ray squares that
//! can actually block (the last square of each ray is dropped: a ray ends at
//! the edge whatever sits there). Every subset of that mask is hashed with
//! `(occ & mask) * magic >> shift` into a per-square slice of one shared
//! attack table, filled by ray tracing at build time.
//!
//! The multipliers below are fixed constants for the A8=0 square layout used
//! throughout the crate. Each one is verified while its table is filled; if a
//! destructive collision ever showed up the square gets a freshly searched
//! multiplier instead, so a lookup can never return a wrong attack set.

use std::sync::OnceLock;

use crate::squares::{file_of, make_square, rank_of, Square, SQUARE_COUNT};
use crate::utils::{square_mask, Bitboard, SplitMix64};

// ============================================================================
// MAGIC NUMBERS
// ============================================================================

const BISHOP_MAGICS: [u64; 64] = [
    0x208A200214110024, 0x0008826802002000, 0x00080E1C00202584, 0x0102208203680004,
    0x00220A1020449802, 0x0004884440101100, 0x00110090100A4250, 0x0043004202A04800,
    0x400028900C082042, 0x4082082801040020, 0x1062221204460880, 0x0441082042409000,
    0x20802E0211800000, 0x0000221202208000, 0x3902140202026000, 0x0010004118011001,
    0x0140208450040108, 0x0050100212021402, 0x0848001000204113, 0x0805800802004104,
    0x0414005E020A0408, 0x2201000201038A00, 0x0900400401441020, 0x0401040344088440,
    0x0020140130108200, 0x0110480C04018400, 0x0080680030004243, 0x0000802108020060,
    0x0880840010802000, 0x2001020007024520, 0x0201004011041000, 0x0008420309010100,
    0x0C04044020200220, 0x0012014401200840, 0x000C241000010100, 0x0008200801110050,
    0x000801004084004E, 0x0409046101520100, 0x0502080060090400, 0x000088B200008201,
    0x0808085411041C21, 0x00212C1004000200, 0x0102001048040410, 0x0000402011010800,
    0x2022A83101400400, 0x0005101001401080, 0x0102040400912400, 0x1004008401400104,
    0x4641081206200810, 0x3101008630060008, 0x24000D1041101820, 0x4400100442020402,
    0x10A028C0082A0A02, 0x0208400208224060, 0x2229200404104000, 0x31A014040160C002,
    0x40A2042504100400, 0x0044250048020840, 0x050004014200B000, 0x40400400088C0C00,
    0x4430800108210900, 0x1001024008210704, 0x0204A08204280881, 0x0004018202040700,
];

const ROOK_MAGICS: [u64; 64] = [
    0x4080008010204000, 0x0040014010002000, 0x0480100008802002, 0x0480080030000581,
    0x0100028C10080100, 0x0100080A04000500, 0x0080060010800100, 0x4200010204412084,
    0x0104800020804002, 0x000A00220882C900, 0x0001801001802000, 0x02A0801000080182,
    0x000A800800800400, 0x000C800200808400, 0x0001006402008100, 0x09F0800040800100,
    0x4008808000204000, 0x1010004001200040, 0x2091010020001148, 0x0800210010030008,
    0x0488004004004200, 0x000180800A000400, 0x2000040010010822, 0x0000020010C08401,
    0x1280104440062000, 0x00A5008100214000, 0x0250002020080400, 0x0610890100201000,
    0x0409003100060800, 0x0802005A00100804, 0x0422521400500128, 0x001011A200014304,
    0x0B10604000800480, 0x0010006000400940, 0x2010802000801000, 0x0100821800801000,
    0x1810050801001100, 0x0401800400802200, 0x0800020104001008, 0x0403000043000092,
    0x0380204008848000, 0x4010002000C84003, 0x002100A000410014, 0x20212A0010420020,
    0x0000110008010024, 0x0204440002008080, 0x0822000C08060083, 0x1012042240820001,
    0x0250210142018A00, 0x5200401002200240, 0x0810008020001080, 0x0042281001002100,
    0x00208048004C0080, 0x0420060004008080, 0x4030020805100400, 0x1004210044008200,
    0x0309001048208001, 0x1800308440010065, 0x0008200040110319, 0x50110015100008A1,
    0x080A00102008040A, 0x044E000450080102, 0x040200C210080104, 0x10480C0D02408222,
];

/// Bishop shift amounts (64 - number of relevant bits)
const BISHOP_SHIFTS: [u8; 64] = [
    58, 59, 59, 59, 59, 59, 59, 58,
    59, 59, 59, 59, 59, 59, 59, 59,
    59, 59, 57, 57, 57, 57, 59, 59,
    59, 59, 57, 55, 55, 57, 59, 59,
    59, 59, 57, 55, 55, 57, 59, 59,
    59, 59, 57, 57, 57, 57, 59, 59,
    59, 59, 59, 59, 59, 59, 59, 59,
    58, 59, 59, 59, 59, 59, 59, 58,
];

/// Rook shift amounts
const ROOK_SHIFTS: [u8; 64] = [
    52, 53, 53, 53, 53, 53, 53, 52,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    53, 54, 54, 54, 54, 54, 54, 53,
    52, 53, 53, 53, 53, 53, 53, 52,
];

const BISHOP_DIRECTIONS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRECTIONS: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

// ============================================================================
// ATTACK TABLES
// ============================================================================

/// Magic entry for a single square
#[derive(Clone, Copy, Default)]
struct MagicEntry {
    mask: Bitboard, // Relevant occupancy mask (excludes edges)
    magic: u64,
    shift: u8,      // 64 - relevant bits
    offset: usize,  // Offset into attack table
}

impl MagicEntry {
    #[inline]
    fn index(&self, occ: Bitboard) -> usize {
        self.offset + ((occ & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

struct SliderTable {
    entries: [MagicEntry; SQUARE_COUNT],
    attacks: Vec<Bitboard>,
}

struct MagicTables {
    bishop: SliderTable,
    rook: SliderTable,
}

static MAGIC_TABLES: OnceLock<MagicTables> = OnceLock::new();

// ============================================================================
// MASK AND RAY GENERATION (used to build tables)
// ============================================================================

/// Walks each direction from `sq`, stopping on (and including) the first
/// occupied square.
fn slide(sq: Square, occ: Bitboard, directions: &[(isize, isize)]) -> Bitboard {
    let mut attacks = 0;
    for &(dr, df) in directions {
        let mut r = rank_of(sq) as isize + dr;
        let mut f = file_of(sq) as isize + df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = square_mask(make_square(r as usize, f as usize));
            attacks |= bit;
            if occ & bit != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// Ray squares that can block: every ray minus its final (edge) square.
fn relevant_mask(sq: Square, directions: &[(isize, isize)]) -> Bitboard {
    let mut mask = 0;
    for &(dr, df) in directions {
        let mut r = rank_of(sq) as isize + dr;
        let mut f = file_of(sq) as isize + df;
        while (0..8).contains(&(r + dr)) && (0..8).contains(&(f + df)) {
            mask |= square_mask(make_square(r as usize, f as usize));
            r += dr;
            f += df;
        }
    }
    mask
}

/// Slow reference for diagonal attacks.
pub fn bishop_attacks_slow(sq: Square, occ: Bitboard) -> Bitboard {
    slide(sq, occ, &BISHOP_DIRECTIONS)
}

/// Slow reference for orthogonal attacks.
pub fn rook_attacks_slow(sq: Square, occ: Bitboard) -> Bitboard {
    slide(sq, occ, &ROOK_DIRECTIONS)
}

// ============================================================================
// TABLE INITIALIZATION
// ============================================================================

/// Every subset of `mask`, via `sub = (sub - 1) & mask` until it wraps to 0.
fn enumerate_subsets(mask: Bitboard) -> Vec<Bitboard> {
    let mut subsets = Vec::with_capacity(1 << mask.count_ones());
    let mut sub = mask;
    loop {
        subsets.push(sub);
        if sub == 0 {
            break;
        }
        sub = (sub - 1) & mask;
    }
    subsets
}

/// Fills `slot` for one magic; `false` on a destructive collision.
fn try_fill(
    slot: &mut [Bitboard],
    used: &mut [bool],
    subsets: &[Bitboard],
    attacks: &[Bitboard],
    magic: u64,
    shift: u8,
) -> bool {
    slot.fill(0);
    used.fill(false);
    for (&occ, &atk) in subsets.iter().zip(attacks) {
        let index = (occ.wrapping_mul(magic) >> shift) as usize;
        if used[index] && slot[index] != atk {
            return false;
        }
        used[index] = true;
        slot[index] = atk;
    }
    true
}

fn build_slider_table(
    magics: &[u64; 64],
    shifts: &[u8; 64],
    directions: &[(isize, isize)],
) -> SliderTable {
    let total: usize = shifts.iter().map(|&s| 1usize << (64 - s)).sum();
    let mut entries = [MagicEntry::default(); SQUARE_COUNT];
    let mut table = vec![0u64; total];
    let mut rng = SplitMix64::new(0x5CAB_1E5E_ED00_0001);
    let mut offset = 0usize;

    for sq in 0..SQUARE_COUNT {
        let mask = relevant_mask(sq, directions);
        let shift = shifts[sq];
        let size = 1usize << (64 - shift);
        debug_assert_eq!(mask.count_ones(), 64 - shift as u32);

        let subsets = enumerate_subsets(mask);
        let attacks: Vec<Bitboard> = subsets.iter().map(|&occ| slide(sq, occ, directions)).collect();
        let slot = &mut table[offset..offset + size];
        let mut used = vec![false; size];

        let mut magic = magics[sq];
        while !try_fill(slot, &mut used, &subsets, &attacks, magic, shift) {
            magic = rng.sparse();
        }

        entries[sq] = MagicEntry { mask, magic, shift, offset };
        offset += size;
    }

    SliderTable { entries, attacks: table }
}

fn init_magic_tables() -> MagicTables {
    MagicTables {
        bishop: build_slider_table(&BISHOP_MAGICS, &BISHOP_SHIFTS, &BISHOP_DIRECTIONS),
        rook: build_slider_table(&ROOK_MAGICS, &ROOK_SHIFTS, &ROOK_DIRECTIONS),
    }
}

#[inline]
fn tables() -> &'static MagicTables {
    MAGIC_TABLES.get_or_init(init_magic_tables)
}

/// Initialize magic tables (thread-safe, called once)
#[inline(always)]
pub fn init() {
    tables();
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Get bishop attacks for a square given board occupancy
#[inline]
pub fn bishop_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    let table = &tables().bishop;
    table.attacks[table.entries[sq].index(occ)]
}

/// Get rook attacks for a square given board occupancy
#[inline]
pub fn rook_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    let table = &tables().rook;
    table.attacks[table.entries[sq].index(occ)]
}

/// Get queen attacks (bishop + rook)
#[inline]
pub fn queen_attacks(sq: Square, occ: Bitboard) -> Bitboard {
    rook_attacks(sq, occ) | bishop_attacks(sq, occ)
}

// ============================================================================
// TESTS
// ============================================================================
