//! Error type shared by the parsing boundaries of the crate.
//!
//! Only malformed input is an error. Illegal moves and a full ply stack are
//! reported through `bool` results by `Game::play_move`.

use crate::pieces::Color;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("FEN is missing the {0} field")]
    MissingFenField(&'static str),

    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),

    #[error("invalid side to move: {0}")]
    InvalidColor(String),

    #[error("invalid castling character '{0}'")]
    InvalidCastling(char),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid move counter: {0}")]
    InvalidCounter(String),

    #[error("invalid board layout: {0}")]
    InvalidBoardLayout(String),

    #[error("{0:?} must have exactly one king")]
    InvalidKingCount(Color),

    #[error("invalid promotion piece '{0}'")]
    InvalidPromotion(char),

    #[error("invalid move text: {0}")]
    InvalidMoveText(String),

    #[error("no piece on the source square of {0}")]
    EmptySourceSquare(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("invalid game result: {0}")]
    InvalidResult(String),

    #[error("invalid evaluation: {0}")]
    InvalidEval(String),
}

pub type Result<T> = std::result::Result<T, ChessError>;
