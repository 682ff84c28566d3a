//! Score helpers for analysis consumers: mate-distance conversion, win
//! probability and move classification by lost win probability.
//!
//! Scores are centipawns from the side to move's point of view. Mate scores
//! sit near `MATE_SCORE`: mate in `n` plies is `MATE_SCORE - n`.

use std::fmt;

use crate::error::{ChessError, Result};
use crate::game::MAX_DEPTH;

pub const UNKNOWN_SCORE: i32 = -30000;
pub const MIN_SCORE: i32 = -20000;
pub const MAX_SCORE: i32 = 20000;
pub const MATE_SCORE: i32 = 19000;
pub const DRAW_SCORE: i32 = 0;

#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() > MATE_SCORE - MAX_DEPTH as i32
}

/// Plies to mate, negative when the side to move is getting mated.
#[inline]
pub fn to_mate_distance(score: i32) -> i32 {
    MATE_SCORE * score.signum() - score
}

#[inline]
pub fn to_mate_score(distance: i32) -> i32 {
    distance.signum() * MATE_SCORE - distance
}

pub fn to_win_probability(score: i32) -> f64 {
    ((score as f64 * 0.007).atan() * 0.32 + 0.5).clamp(0.0, 1.0)
}

/// Evaluation text: `M<n>` for mates, pawns with two decimals otherwise.
pub fn format_eval(score: i32) -> String {
    if is_mate_score(score) {
        format!("M{}", to_mate_distance(score))
    } else {
        format!("{:.2}", score as f64 / 100.0)
    }
}

pub fn parse_eval(text: &str) -> Result<i32> {
    let text = text.trim();
    let invalid = || ChessError::InvalidEval(text.to_string());
    if let Some(distance) = text.strip_prefix('M') {
        let distance: i32 = distance.parse().map_err(|_| invalid())?;
        if distance == 0 || distance.abs() >= MAX_DEPTH as i32 {
            return Err(invalid());
        }
        return Ok(to_mate_score(distance));
    }
    let pawns: f64 = text.parse().map_err(|_| invalid())?;
    let score = (pawns * 100.0).round();
    if !score.is_finite() || score.abs() > f64::from(MATE_SCORE - MAX_DEPTH as i32) {
        return Err(invalid());
    }
    Ok(score as i32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveClass {
    Best,
    Great,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
}

impl MoveClass {
    /// Class of a non-best move that loses `loss` win probability (0..1).
    pub fn from_win_probability_loss(loss: f64) -> MoveClass {
        if loss >= 0.25 {
            MoveClass::Blunder
        } else if loss >= 0.15 {
            MoveClass::Mistake
        } else if loss >= 0.08 {
            MoveClass::Inaccuracy
        } else if loss >= 0.02 {
            MoveClass::Good
        } else {
            MoveClass::Great
        }
    }

    /// Classifies a move from the scores (mover's point of view) before and
    /// after it. Matching or beating the best score is `Best`.
    pub fn classify(best_score: i32, played_score: i32) -> MoveClass {
        if played_score >= best_score {
            return MoveClass::Best;
        }
        MoveClass::from_win_probability_loss(to_win_probability(best_score) - to_win_probability(played_score))
    }
}

impl fmt::Display for MoveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
