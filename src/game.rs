//! Game state machine: a ply-indexed stack of `Position` snapshots with a
//! parallel hash history and a mirror board (`square -> piece`) kept in sync
//! by `play_move`/`undo_move`.
//!
//! `generate_moves` is pseudo-legal. `play_move` is the only legality gate:
//! it applies the move and rejects it when the mover's king is left in check.

use std::fmt;
use std::str::FromStr;

use crate::error::{ChessError, Result};
use crate::moves::{Move, MoveList, MoveType};
use crate::notation;
use crate::pieces::{Color, Piece, PieceType};
use crate::position::{Position, CASTLING_BK, CASTLING_BQ, CASTLING_WK, CASTLING_WQ};
use crate::squares::*;
use crate::utils::{iter_bits, rank_mask, square_mask, Bitboard};
use crate::zobrist::piece_key;

/// Capacity of the ply stack.
pub const MAX_PLY: usize = 1024;
/// Deepest search horizon callers may use; bounds mate-score detection.
pub const MAX_DEPTH: usize = 64;
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    Ongoing,
    WhiteWon,
    BlackWon,
    Draw,
}

/// PGN result token.
impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            GameResult::Ongoing => "*",
            GameResult::WhiteWon => "1-0",
            GameResult::BlackWon => "0-1",
            GameResult::Draw => "1/2-1/2",
        };
        f.write_str(token)
    }
}

impl FromStr for GameResult {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "*" => Ok(GameResult::Ongoing),
            "1-0" => Ok(GameResult::WhiteWon),
            "0-1" => Ok(GameResult::BlackWon),
            "1/2-1/2" => Ok(GameResult::Draw),
            other => Err(ChessError::InvalidResult(other.to_string())),
        }
    }
}

/// One castling option: the right bit, the king and rook paths, the squares
/// that must be empty and the transit square that must not be attacked.
struct CastlingRule {
    right: u8,
    color: Color,
    king_from: Square,
    king_to: Square,
    rook_from: Square,
    rook_to: Square,
    empty: Bitboard,
    transit: Square,
}

impl CastlingRule {
    /// Squares whose involvement in any move revokes this right.
    const fn home_mask(&self) -> Bitboard {
        square_mask(self.king_from) | square_mask(self.rook_from)
    }
}

static CASTLING_RULES: [CastlingRule; 4] = [
    CastlingRule {
        right: CASTLING_WK,
        color: Color::White,
        king_from: E1,
        king_to: G1,
        rook_from: H1,
        rook_to: F1,
        empty: square_mask(F1) | square_mask(G1),
        transit: F1,
    },
    CastlingRule {
        right: CASTLING_WQ,
        color: Color::White,
        king_from: E1,
        king_to: C1,
        rook_from: A1,
        rook_to: D1,
        empty: square_mask(D1) | square_mask(C1) | square_mask(B1),
        transit: D1,
    },
    CastlingRule {
        right: CASTLING_BK,
        color: Color::Black,
        king_from: E8,
        king_to: G8,
        rook_from: H8,
        rook_to: F8,
        empty: square_mask(F8) | square_mask(G8),
        transit: F8,
    },
    CastlingRule {
        right: CASTLING_BQ,
        color: Color::Black,
        king_from: E8,
        king_to: C8,
        rook_from: A8,
        rook_to: D8,
        empty: square_mask(D8) | square_mask(C8) | square_mask(B8),
        transit: D8,
    },
];

/// Rule whose king lands on `king_to`.
fn castling_rule(king_to: Square) -> Option<&'static CastlingRule> {
    CASTLING_RULES.iter().find(|rule| rule.king_to == king_to)
}

#[derive(Clone)]
pub struct Game {
    positions: Vec<Position>,
    hashes: Vec<u64>,
    board: [Piece; SQUARE_COUNT],
    ply: usize,
    start_fullmove: u32,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Empty board, white to move.
    pub fn new() -> Self {
        let mut game = Game {
            positions: vec![Position::empty(); MAX_PLY],
            hashes: vec![0; MAX_PLY],
            board: [Piece::NONE; SQUARE_COUNT],
            ply: 0,
            start_fullmove: 1,
        };
        game.reset(Position::empty(), 1);
        game
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut game = Game::new();
        game.set_fen(fen)?;
        Ok(game)
    }

    /// Replaces the game with the FEN position; on error the game is unchanged.
    pub fn set_fen(&mut self, fen: &str) -> Result<()> {
        let (position, fullmove) = notation::parse_fen(fen)?;
        self.reset(position, fullmove);
        Ok(())
    }

    fn reset(&mut self, position: Position, fullmove: u32) {
        for (sq, slot) in self.board.iter_mut().enumerate() {
            *slot = position.piece_on(sq);
        }
        self.positions[0] = position;
        self.hashes[0] = position.hash();
        self.ply = 0;
        self.start_fullmove = fullmove;
    }

    // Accessors -------------------------------------------------------------

    #[inline]
    pub fn board(&self) -> &[Piece; SQUARE_COUNT] {
        &self.board
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Piece {
        self.board[sq]
    }

    #[inline]
    pub fn ply(&self) -> usize {
        self.ply
    }

    #[inline]
    pub fn current_position(&self) -> &Position {
        &self.positions[self.ply]
    }

    #[inline]
    pub fn starting_position(&self) -> &Position {
        &self.positions[0]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.current_position().side
    }

    #[inline]
    pub fn starting_color(&self) -> Color {
        self.starting_position().side
    }

    /// Hash of the current position, maintained incrementally.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hashes[self.ply]
    }

    /// Hashes of plies `0..=ply`.
    pub fn hash_history(&self) -> &[u64] {
        &self.hashes[..=self.ply]
    }

    /// Fullmove number of the current position.
    pub fn fullmove_number(&self) -> u32 {
        let offset = match self.starting_color() {
            Color::White => 0,
            Color::Black => 1,
        };
        self.start_fullmove + ((self.ply + offset) / 2) as u32
    }

    // Move generation -------------------------------------------------------

    /// Fills `moves` with the pseudo-legal moves of the side to move and
    /// returns how many there are. With `critical_only` set, quiet pawn
    /// pushes, non-capturing piece moves and castling are skipped
    /// (promotions are kept).
    pub fn generate_moves(&self, moves: &mut MoveList, critical_only: bool) -> usize {
        moves.clear();
        let pos = self.current_position();
        let us = pos.side;
        let them = us.opposite();
        let dir = move_direction(us);
        let pawn = Piece::new(us, PieceType::Pawn);
        let enemies = pos.color_bb(them);
        let last_rank = rank_mask(promotion_rank(us));

        let pushes = pos.pawn_pushes(us) & pos.empty_squares();
        if !critical_only {
            for target in iter_bits(pushes & !last_rank) {
                moves.push(Move::new(offset(target, -dir), target, pawn, Piece::NONE, MoveType::Normal));
            }
            let starters = pos.bb(pawn) & rank_mask(pawn_start_rank(us));
            for source in iter_bits(starters) {
                let middle = offset(source, dir);
                let target = offset(middle, dir);
                if pushes & square_mask(middle) != 0 && pos.empty_squares() & square_mask(target) != 0 {
                    moves.push(Move::new(source, target, pawn, Piece::NONE, MoveType::DoublePawnPush));
                }
            }
        }
        for target in iter_bits(pushes & last_rank) {
            push_promotions(moves, offset(target, -dir), target, pawn, Piece::NONE);
        }

        let left = pos.pawn_left_attacks(us) & enemies;
        let right = pos.pawn_right_attacks(us) & enemies;
        for (targets, delta) in [(left, dir + LEFT), (right, dir + RIGHT)] {
            for target in iter_bits(targets & !last_rank) {
                moves.push(Move::new(offset(target, -delta), target, pawn, self.board[target], MoveType::Normal));
            }
        }
        for (targets, delta) in [(left, dir + LEFT), (right, dir + RIGHT)] {
            for target in iter_bits(targets & last_rank) {
                push_promotions(moves, offset(target, -delta), target, pawn, self.board[target]);
            }
        }

        if let Some(ep) = pos.en_passant {
            if file_of(ep) != FILE_H {
                let source = offset(ep, -(dir + LEFT));
                if self.board[source] == pawn {
                    moves.push(Move::new(source, ep, pawn, Piece::NONE, MoveType::EnPassant));
                }
            }
            if file_of(ep) != FILE_A {
                let source = offset(ep, -(dir + RIGHT));
                if self.board[source] == pawn {
                    moves.push(Move::new(source, ep, pawn, Piece::NONE, MoveType::EnPassant));
                }
            }
        }

        for kind in PieceType::OFFICERS {
            let piece = Piece::new(us, kind);
            for source in iter_bits(pos.bb(piece)) {
                let mut targets = pos.attacks_from(kind, source) & !pos.color_bb(us);
                if critical_only {
                    targets &= enemies;
                }
                for target in iter_bits(targets) {
                    moves.push(Move::new(source, target, piece, self.board[target], MoveType::Normal));
                }
            }
        }

        if !critical_only && !pos.is_check() {
            let king = Piece::new(us, PieceType::King);
            let rook = Piece::new(us, PieceType::Rook);
            for rule in CASTLING_RULES.iter().filter(|rule| rule.color == us) {
                if pos.castling & rule.right != 0
                    && self.board[rule.king_from] == king
                    && self.board[rule.rook_from] == rook
                    && pos.occupied() & rule.empty == 0
                    && !pos.is_attacked(rule.transit, them)
                {
                    moves.push(Move::new(rule.king_from, rule.king_to, king, Piece::NONE, MoveType::Castling));
                }
            }
        }

        moves.len()
    }

    /// Moves that pass the `play_move` legality gate.
    pub fn legal_moves(&mut self) -> MoveList {
        let mut candidates = MoveList::new();
        self.generate_moves(&mut candidates, false);
        let mut legal = MoveList::new();
        for &mv in candidates.iter() {
            if self.play_move(mv) {
                self.undo_move(mv);
                legal.push(mv);
            }
        }
        legal
    }

    // Make / unmake ---------------------------------------------------------

    /// Applies a pseudo-legal move. Returns false, leaving the game untouched,
    /// if the move leaves the mover in check, if it is a null move, or if
    /// the ply stack is full.
    pub fn play_move(&mut self, mv: Move) -> bool {
        let (source, target) = (mv.source(), mv.target());
        if mv.is_null() {
            return false;
        }
        if self.ply + 1 >= MAX_PLY {
            return false;
        }
        debug_assert_eq!(self.board[source], mv.source_piece, "move {mv} disagrees with the board");
        debug_assert_eq!(self.board[target], mv.target_piece, "move {mv} disagrees with the board");

        let mut pos = self.positions[self.ply];
        let us = pos.side;
        let them = us.opposite();
        debug_assert_eq!(mv.source_piece.color(), us);

        let moved = mv.source_piece;
        let captured = mv.target_piece;
        let source_bit = square_mask(source);
        let target_bit = square_mask(target);
        let move_mask = source_bit | target_bit;

        let mut hash = self.hashes[self.ply] ^ pos.info_hash();
        hash ^= piece_key(moved, source) ^ piece_key(captured, target);

        pos.pieces[moved.index()] ^= move_mask;
        pos.colors[us.index()] ^= move_mask;
        pos.pieces[Piece::NONE.index()] |= source_bit;
        pos.pieces[captured.index()] &= !target_bit;
        if captured.is_piece() {
            pos.colors[them.index()] &= !target_bit;
        }

        if moved.kind() == PieceType::Pawn || captured.is_piece() {
            pos.halfmove_clock = 0;
        } else {
            pos.halfmove_clock = pos.halfmove_clock.saturating_add(1);
        }
        pos.en_passant = None;

        let mut placed = moved;
        match mv.kind {
            MoveType::Normal => {}
            MoveType::DoublePawnPush => {
                pos.en_passant = Some(offset(target, -move_direction(us)));
            }
            MoveType::EnPassant => {
                let victim_sq = offset(target, -move_direction(us));
                let victim = Piece::new(them, PieceType::Pawn);
                let bit = square_mask(victim_sq);
                pos.pieces[victim.index()] &= !bit;
                pos.colors[them.index()] &= !bit;
                pos.pieces[Piece::NONE.index()] |= bit;
                hash ^= piece_key(victim, victim_sq);
                self.board[victim_sq] = Piece::NONE;
            }
            MoveType::Castling => {
                if let Some(rule) = castling_rule(target) {
                    let rook = Piece::new(us, PieceType::Rook);
                    let rook_mask = square_mask(rule.rook_from) | square_mask(rule.rook_to);
                    pos.pieces[rook.index()] ^= rook_mask;
                    pos.colors[us.index()] ^= rook_mask;
                    pos.pieces[Piece::NONE.index()] ^= rook_mask;
                    hash ^= piece_key(rook, rule.rook_from) ^ piece_key(rook, rule.rook_to);
                    self.board[rule.rook_from] = Piece::NONE;
                    self.board[rule.rook_to] = rook;
                }
            }
            MoveType::Promotion(kind) => {
                placed = moved.with_kind(kind);
                pos.pieces[moved.index()] &= !target_bit;
                pos.pieces[placed.index()] |= target_bit;
            }
        }
        self.board[source] = Piece::NONE;
        self.board[target] = placed;

        if pos.is_in_check(us) {
            self.restore_board(mv);
            return false;
        }

        for rule in &CASTLING_RULES {
            if move_mask & rule.home_mask() != 0 {
                pos.castling &= !rule.right;
            }
        }
        pos.side = them;
        hash ^= piece_key(placed, target) ^ pos.info_hash();
        debug_assert_eq!(hash, pos.hash(), "incremental hash drifted after {mv}");

        self.ply += 1;
        self.positions[self.ply] = pos;
        self.hashes[self.ply] = hash;
        true
    }

    /// Takes back `mv`, which must be the last move played.
    pub fn undo_move(&mut self, mv: Move) {
        debug_assert!(self.ply > 0, "undo_move on an empty stack");
        if self.ply == 0 {
            return;
        }
        self.ply -= 1;
        self.restore_board(mv);
    }

    /// Reverts the mirror-board edits of `mv` from the move record alone.
    fn restore_board(&mut self, mv: Move) {
        let (source, target) = (mv.source(), mv.target());
        let us = mv.source_piece.color();
        self.board[source] = mv.source_piece;
        self.board[target] = mv.target_piece;
        match mv.kind {
            MoveType::EnPassant => {
                let victim_sq = offset(target, -move_direction(us));
                self.board[victim_sq] = Piece::new(us.opposite(), PieceType::Pawn);
            }
            MoveType::Castling => {
                if let Some(rule) = castling_rule(target) {
                    self.board[rule.rook_from] = Piece::new(us, PieceType::Rook);
                    self.board[rule.rook_to] = Piece::NONE;
                }
            }
            _ => {}
        }
    }

    // Terminal state --------------------------------------------------------

    pub fn is_check(&self) -> bool {
        self.current_position().is_check()
    }

    /// True when the side to move has no legal move.
    pub fn is_finished(&mut self) -> bool {
        let mut moves = MoveList::new();
        self.generate_moves(&mut moves, false);
        for &mv in moves.iter() {
            if self.play_move(mv) {
                self.undo_move(mv);
                return false;
            }
        }
        true
    }

    pub fn is_checkmate(&mut self) -> bool {
        self.is_check() && self.is_finished()
    }

    pub fn is_stalemate(&mut self) -> bool {
        !self.is_check() && self.is_finished()
    }

    /// Current position seen at least three times in the history.
    pub fn is_draw_by_repetition(&self) -> bool {
        let current = self.hash();
        self.hash_history().iter().filter(|&&h| h == current).count() >= 3
    }

    pub fn result(&mut self) -> GameResult {
        if self.is_finished() {
            if !self.is_check() {
                return GameResult::Draw;
            }
            return match self.side_to_move() {
                Color::White => GameResult::BlackWon,
                Color::Black => GameResult::WhiteWon,
            };
        }
        if self.current_position().is_draw() || self.is_draw_by_repetition() {
            return GameResult::Draw;
        }
        GameResult::Ongoing
    }

    // Perft -----------------------------------------------------------------

    /// Number of leaf nodes of the legal move tree `depth` plies deep.
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let mut moves = MoveList::new();
        self.generate_moves(&mut moves, false);
        let mut nodes = 0;
        for &mv in moves.iter() {
            if self.play_move(mv) {
                nodes += self.perft(depth - 1);
                self.undo_move(mv);
            }
        }
        nodes
    }

    /// Perft split by root move. Depth 0 has no root moves, so the split is
    /// empty even though `perft(0)` counts the root itself.
    pub fn divide(&mut self, depth: u32) -> Vec<(Move, u64)> {
        if depth == 0 {
            return Vec::new();
        }
        let mut moves = MoveList::new();
        self.generate_moves(&mut moves, false);
        let mut split = Vec::with_capacity(moves.len());
        for &mv in moves.iter() {
            if self.play_move(mv) {
                split.push((mv, self.perft(depth - 1)));
                self.undo_move(mv);
            }
        }
        split
    }
}

fn push_promotions(moves: &mut MoveList, source: Square, target: Square, pawn: Piece, captured: Piece) {
    for kind in PieceType::PROMOTIONS {
        moves.push(Move::new(source, target, pawn, captured, MoveType::Promotion(kind)));
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("fen", &self.fen())
            .field("ply", &self.ply)
            .field("hash", &format_args!("{:#018x}", self.hash()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(game: &mut Game, uci: &str) -> Move {
        let mv = game.parse_move(uci).unwrap();
        assert!(game.play_move(mv), "{uci} rejected");
        mv
    }

    fn snapshot(game: &Game) -> ([Piece; 64], Position, u64, usize) {
        (*game.board(), *game.current_position(), game.hash(), game.ply())
    }

    #[test]
    fn start_position_has_twenty_moves() {
        let mut game = Game::from_fen(START_FEN).unwrap();
        let mut moves = MoveList::new();
        assert_eq!(game.generate_moves(&mut moves, false), 20);
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.generate_moves(&mut moves, true), 0);
    }

    #[test]
    fn play_and_undo_restore_everything() {
        let mut game =
            Game::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
        let before = snapshot(&game);
        let mut moves = MoveList::new();
        game.generate_moves(&mut moves, false);
        for &mv in moves.iter() {
            if game.play_move(mv) {
                assert_eq!(game.hash(), game.current_position().hash());
                game.undo_move(mv);
            }
            assert_eq!(snapshot(&game), before, "after {mv}");
        }
    }

    #[test]
    fn pinned_piece_cannot_move() {
        // The e2 knight shields the white king from the e8 rook.
        let mut game = Game::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let before = snapshot(&game);
        let knight_move = game.parse_move("e2c3").unwrap();
        assert!(!game.play_move(knight_move));
        assert_eq!(snapshot(&game), before);
        assert!(game.legal_moves().iter().all(|m| m.source() != knight_move.source()));
    }

    #[test]
    fn castling_moves_rook_and_revokes_rights() {
        let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        play(&mut game, "e1g1");
        assert_eq!(game.piece_at(F1), Piece::WHITE_ROOK);
        assert_eq!(game.piece_at(H1), Piece::NONE);
        assert_eq!(game.current_position().castling, CASTLING_BK | CASTLING_BQ);
        // Capturing a rook on its home square revokes that side's right.
        let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        play(&mut game, "a1a8");
        assert_eq!(game.current_position().castling, CASTLING_WK | CASTLING_BK);
    }

    #[test]
    fn castling_requires_safe_transit() {
        // The f3 rook covers f1: no king-side castling; d1 is free.
        let mut game = Game::from_fen("4k3/8/8/8/8/5r2/8/R3K2R w KQ - 0 1").unwrap();
        let castles: Vec<String> = game
            .legal_moves()
            .iter()
            .filter(|m| m.kind == MoveType::Castling)
            .map(|m| m.to_string())
            .collect();
        assert_eq!(castles, ["e1c1"]);
    }

    #[test]
    fn en_passant_sets_and_captures() {
        let mut game = Game::from_fen("4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1").unwrap();
        let push = play(&mut game, "e2e4");
        assert_eq!(push.kind, MoveType::DoublePawnPush);
        assert_eq!(game.current_position().en_passant, Some(parse_square("e3").unwrap()));
        let capture = play(&mut game, "d4e3");
        assert_eq!(capture.kind, MoveType::EnPassant);
        assert_eq!(game.piece_at(parse_square("e4").unwrap()), Piece::NONE);
        assert_eq!(game.hash(), game.current_position().hash());
        game.undo_move(capture);
        assert_eq!(game.piece_at(parse_square("e4").unwrap()), Piece::WHITE_PAWN);
    }

    #[test]
    fn full_stack_rejects_moves() {
        let mut game = Game::from_fen(START_FEN).unwrap();
        let cycle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        let mut played = 0;
        'outer: loop {
            for uci in cycle {
                let mv = game.parse_move(uci).unwrap();
                if !game.play_move(mv) {
                    break 'outer;
                }
                played += 1;
            }
        }
        assert_eq!(played, MAX_PLY - 1);
        assert_eq!(game.ply(), MAX_PLY - 1);
    }

    #[test]
    fn checkmate_and_stalemate() {
        let mut mate = Game::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        assert!(mate.is_checkmate());
        assert_eq!(mate.result(), GameResult::WhiteWon);

        let mut stale = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(stale.is_stalemate());
        assert_eq!(stale.result(), GameResult::Draw);
    }

    #[test]
    fn fullmove_number_counts_from_fen() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/4K2R b K - 3 40").unwrap();
        assert_eq!(game.fullmove_number(), 40);
        play(&mut game, "e8d8");
        assert_eq!(game.fullmove_number(), 41);
        play(&mut game, "e1f1");
        assert_eq!(game.fullmove_number(), 41);
    }

    #[test]
    fn result_tokens() {
        for result in [GameResult::Ongoing, GameResult::WhiteWon, GameResult::BlackWon, GameResult::Draw] {
            assert_eq!(result.to_string().parse::<GameResult>().unwrap(), result);
        }
        assert!("2-0".parse::<GameResult>().is_err());
    }
}
