//! Chess rules core: board representation, legal move generation and the
//! ply-indexed game state machine that notation, game-tree and engine layers
//! are built on.

pub mod error;
pub mod game;
pub mod magic;
pub mod moves;
pub mod notation;
pub mod pieces;
pub mod position;
pub mod scores;
pub mod squares;
pub mod utils;
pub mod zobrist;

pub use error::{ChessError, Result};
pub use game::{Game, GameResult, MAX_DEPTH, MAX_PLY, START_FEN};
pub use moves::{Move, MoveList, MoveType, MAX_MOVES};
pub use pieces::{Color, Piece, PieceType};
pub use position::Position;
pub use squares::Square;

/// Builds every static lookup table up front.
///
/// Optional: each table is also built on first use.
pub fn init() {
    utils::init_attack_tables();
    magic::init();
    zobrist::init_zobrist();
}
