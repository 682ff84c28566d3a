// FEN, UCI and SAN text conversion.

use crate::error::{ChessError, Result};
use crate::game::Game;
use crate::moves::{Move, MoveList, MoveType};
use crate::pieces::{Color, Piece, PieceType};
use crate::position::{Position, CASTLING_BK, CASTLING_BQ, CASTLING_WK, CASTLING_WQ};
use crate::squares::{
    file_char, file_of, make_square, move_direction, offset, parse_square, promotion_rank, rank_char, rank_of, square_name, FILE_COUNT,
    FILE_G, RANK_COUNT,
};
use crate::utils::count_bits;

const CASTLING_LETTERS: [(u8, char); 4] = [(CASTLING_WK, 'K'), (CASTLING_WQ, 'Q'), (CASTLING_BK, 'k'), (CASTLING_BQ, 'q')];

/// Decodes a FEN string into a position and its fullmove number.
///
/// Placement, side, castling and en-passant fields are required; the
/// halfmove clock and fullmove number default to 0 and 1.
pub fn parse_fen(fen: &str) -> Result<(Position, u32)> {
    let mut fields = fen.split_whitespace();
    let placement = fields.next().ok_or(ChessError::MissingFenField("piece placement"))?;
    let side = fields.next().ok_or(ChessError::MissingFenField("side to move"))?;
    let castling = fields.next().ok_or(ChessError::MissingFenField("castling"))?;
    let en_passant = fields.next().ok_or(ChessError::MissingFenField("en passant"))?;
    let halfmove = fields.next();
    let fullmove = fields.next();

    let mut position = Position::empty();

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != RANK_COUNT {
        return Err(ChessError::InvalidBoardLayout(placement.to_string()));
    }
    for (rank, row) in ranks.iter().enumerate() {
        let mut file = 0;
        for ch in row.chars() {
            if let Some(skip) = ch.to_digit(10) {
                if !(1..=8).contains(&skip) {
                    return Err(ChessError::InvalidBoardLayout(placement.to_string()));
                }
                file += skip as usize;
                continue;
            }
            let piece = Piece::from_char(ch).ok_or(ChessError::InvalidPiece(ch))?;
            if file >= FILE_COUNT {
                return Err(ChessError::InvalidBoardLayout(placement.to_string()));
            }
            position.put_piece(piece, make_square(rank, file));
            file += 1;
        }
        if file != FILE_COUNT {
            return Err(ChessError::InvalidBoardLayout(placement.to_string()));
        }
    }

    for color in Color::ALL {
        if count_bits(position.bb(Piece::new(color, PieceType::King))) != 1 {
            return Err(ChessError::InvalidKingCount(color));
        }
    }

    position.side = match side {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(ChessError::InvalidColor(other.to_string())),
    };

    if castling != "-" {
        for ch in castling.chars() {
            let (right, _) = CASTLING_LETTERS
                .iter()
                .find(|(_, letter)| *letter == ch)
                .ok_or(ChessError::InvalidCastling(ch))?;
            position.castling |= right;
        }
    }

    if en_passant != "-" {
        let sq = parse_square(en_passant)?;
        // The square behind a pawn that just double-pushed.
        let expected_rank = match position.side {
            Color::White => 2,
            Color::Black => 5,
        };
        // The square itself and the pawn's start square are empty, and the
        // pushed pawn stands in front of it.
        let dir = move_direction(position.side);
        let pushed = Piece::new(position.side.opposite(), PieceType::Pawn);
        if rank_of(sq) != expected_rank
            || position.piece_on(sq).is_piece()
            || position.piece_on(offset(sq, dir)).is_piece()
            || position.piece_on(offset(sq, -dir)) != pushed
        {
            return Err(ChessError::InvalidSquare(en_passant.to_string()));
        }
        position.en_passant = Some(sq);
    }

    if let Some(text) = halfmove {
        position.halfmove_clock = text.parse().map_err(|_| ChessError::InvalidCounter(text.to_string()))?;
    }
    let fullmove = match fullmove {
        Some(text) => text
            .parse::<u32>()
            .map_err(|_| ChessError::InvalidCounter(text.to_string()))?
            .max(1),
        None => 1,
    };

    Ok((position, fullmove))
}

impl Game {
    /// FEN of the current position.
    pub fn fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        let board = self.board();
        for rank in 0..RANK_COUNT {
            let mut empty = 0;
            for file in 0..FILE_COUNT {
                let piece = board[make_square(rank, file)];
                if piece.is_piece() {
                    if empty > 0 {
                        fen.push_str(&empty.to_string());
                        empty = 0;
                    }
                    fen.push(piece.to_char());
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank + 1 != RANK_COUNT {
                fen.push('/');
            }
        }

        let position = self.current_position();
        fen.push(' ');
        fen.push(position.side.to_char());
        fen.push(' ');
        if position.castling == 0 {
            fen.push('-');
        } else {
            for (right, letter) in CASTLING_LETTERS {
                if position.castling & right != 0 {
                    fen.push(letter);
                }
            }
        }
        fen.push(' ');
        match position.en_passant {
            Some(sq) => fen.push_str(&square_name(sq)),
            None => fen.push('-'),
        }
        fen.push_str(&format!(" {} {}", position.halfmove_clock, self.fullmove_number()));
        fen
    }

    /// Decodes UCI coordinate text ("e2e4", "e7e8q") against the current
    /// board, inferring the move type. Text that names no pseudo-legal move
    /// is an `IllegalMove` error; `play_move` still rejects moves that leave
    /// the king in check.
    pub fn parse_move(&self, text: &str) -> Result<Move> {
        let text = text.trim();
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(ChessError::InvalidMoveText(text.to_string()));
        }
        let source = parse_square(&text[0..2])?;
        let target = parse_square(&text[2..4])?;
        let piece = self.piece_at(source);
        if !piece.is_piece() {
            return Err(ChessError::EmptySourceSquare(text.to_string()));
        }
        let captured = self.piece_at(target);
        let position = self.current_position();

        let kind = match piece.kind() {
            PieceType::Pawn => {
                if let Some(letter) = text.chars().nth(4) {
                    let promotion = PieceType::from_promotion_char(letter).ok_or(ChessError::InvalidPromotion(letter))?;
                    MoveType::Promotion(promotion)
                } else if rank_of(target) == promotion_rank(piece.color()) {
                    return Err(ChessError::InvalidMoveText(text.to_string()));
                } else if position.en_passant == Some(target) && file_of(source) != file_of(target) {
                    MoveType::EnPassant
                } else if source.abs_diff(target) == 16 {
                    MoveType::DoublePawnPush
                } else {
                    MoveType::Normal
                }
            }
            PieceType::King if source.abs_diff(target) == 2 => MoveType::Castling,
            _ if text.len() == 5 => return Err(ChessError::InvalidMoveText(text.to_string())),
            _ => MoveType::Normal,
        };
        let decoded = Move::new(source, target, piece, captured, kind);

        let mut moves = MoveList::new();
        self.generate_moves(&mut moves, false);
        moves
            .iter()
            .copied()
            .find(|&mv| mv == decoded)
            .ok_or_else(|| ChessError::IllegalMove(text.to_string()))
    }

    /// Standard algebraic notation for `mv`, a pseudo-legal move of the side
    /// to move. The check or mate suffix comes from playing the move.
    pub fn format_san(&mut self, mv: Move) -> String {
        let mut san = String::with_capacity(8);
        if mv.kind == MoveType::Castling {
            san.push_str(if file_of(mv.target()) == FILE_G { "O-O" } else { "O-O-O" });
        } else {
            let kind = mv.source_piece.kind();
            if kind != PieceType::Pawn {
                san.push(kind.upper_char());
            }

            let (mut ambiguous, mut same_file, mut same_rank) = (false, false, false);
            for other in self.legal_moves().iter() {
                if other.source() == mv.source()
                    || other.source_piece != mv.source_piece
                    || other.target() != mv.target()
                {
                    continue;
                }
                ambiguous = true;
                same_file |= file_of(other.source()) == file_of(mv.source());
                same_rank |= rank_of(other.source()) == rank_of(mv.source());
            }

            let capture = mv.is_capture();
            let (need_file, need_rank) = if kind == PieceType::Pawn {
                (capture, false)
            } else if !ambiguous {
                (false, false)
            } else if same_file && same_rank {
                (true, true)
            } else if same_file {
                (false, true)
            } else {
                (true, false)
            };
            if need_file {
                san.push(file_char(file_of(mv.source())));
            }
            if need_rank {
                san.push(rank_char(rank_of(mv.source())));
            }
            if capture {
                san.push('x');
            }
            san.push_str(&square_name(mv.target()));
            if let MoveType::Promotion(promotion) = mv.kind {
                san.push('=');
                san.push(promotion.upper_char());
            }
        }

        if self.play_move(mv) {
            if self.is_checkmate() {
                san.push('#');
            } else if self.is_check() {
                san.push('+');
            }
            self.undo_move(mv);
        }
        san
    }

    /// Legal move whose UCI or SAN text matches `text`. Check, mate and
    /// annotation marks (`+ # ! ?`) are ignored on both sides.
    pub fn find_move(&mut self, text: &str) -> Option<Move> {
        let token = strip_suffix(text.trim());
        if token.is_empty() {
            return None;
        }
        let legal = self.legal_moves();
        if let Some(mv) = legal.iter().find(|mv| mv.to_string() == token) {
            return Some(*mv);
        }
        legal.iter().copied().find(|&mv| strip_suffix(&self.format_san(mv)) == token)
    }

    /// Looks up `text` with `find_move` and plays it.
    pub fn play_text(&mut self, text: &str) -> Result<Move> {
        let mv = self
            .find_move(text)
            .ok_or_else(|| ChessError::IllegalMove(text.trim().to_string()))?;
        if !self.play_move(mv) {
            return Err(ChessError::IllegalMove(text.trim().to_string()));
        }
        Ok(mv)
    }
}

fn strip_suffix(text: &str) -> &str {
    text.trim_end_matches(['+', '#', '!', '?'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::START_FEN;

    #[test]
    fn start_fen_round_trips() {
        let game = Game::from_fen(START_FEN).unwrap();
        assert_eq!(game.fen(), START_FEN);
    }

    #[test]
    fn fen_defaults_counters() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
        assert_eq!(game.fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    }

    #[test]
    fn fen_rejects_malformed_fields() {
        let cases = [
            ("", ChessError::MissingFenField("piece placement")),
            ("4k3/8/8/8/8/8/8/4K3 w KQ", ChessError::MissingFenField("en passant")),
            ("4k3/8/8/8/8/8/8/4K3 x - -", ChessError::InvalidColor("x".into())),
            ("4k3/8/8/8/8/8/8/4K3 w KX -", ChessError::InvalidCastling('X')),
            ("4k3/8/8/8/8/8/8/4X3 w - -", ChessError::InvalidPiece('X')),
            ("4k3/8/8/8/8/8/4K3 w - -", ChessError::InvalidBoardLayout("4k3/8/8/8/8/8/4K3".into())),
            ("4k3/8/8/8/8/8/8/4K4 w - -", ChessError::InvalidBoardLayout("4k3/8/8/8/8/8/8/4K4".into())),
            ("4k3/8/8/8/8/8/8/8 w - -", ChessError::InvalidKingCount(Color::White)),
            ("4k3/8/8/8/8/8/8/4K3 w - e4", ChessError::InvalidSquare("e4".into())),
            ("4k3/8/8/8/8/8/8/4K3 w - - x 1", ChessError::InvalidCounter("x".into())),
            ("4k3/8/8/3Pn3/8/8/8/4K3 w - e6 0 1", ChessError::InvalidSquare("e6".into())),
            ("4k3/8/8/3PP3/8/8/8/4K3 w - e6 0 1", ChessError::InvalidSquare("e6".into())),
            ("4k3/8/4n3/3Pp3/8/8/8/4K3 w - e6 0 1", ChessError::InvalidSquare("e6".into())),
            ("4k3/4n3/8/3Pp3/8/8/8/4K3 w - e6 0 1", ChessError::InvalidSquare("e6".into())),
            ("4k3/8/8/8/3p4/8/4n3/4K3 b - e3 0 1", ChessError::InvalidSquare("e3".into())),
        ];
        for (fen, expected) in cases {
            assert_eq!(parse_fen(fen).unwrap_err(), expected, "{fen:?}");
        }
    }

    #[test]
    fn fen_accepts_a_real_en_passant_square() {
        let (position, _) = parse_fen("4k3/8/8/3Pp3/8/8/8/4K3 w - e6 0 1").unwrap();
        assert_eq!(position.en_passant, parse_square("e6").ok());
        let (position, _) = parse_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(position.en_passant, parse_square("e3").ok());
    }

    #[test]
    fn failed_set_fen_keeps_the_game() {
        let mut game = Game::from_fen(START_FEN).unwrap();
        assert!(game.set_fen("8/8/8/8/8/8/8/8 w - -").is_err());
        assert_eq!(game.fen(), START_FEN);
    }

    #[test]
    fn parse_move_infers_types() {
        let game = Game::from_fen("r3k3/1P6/8/3pP3/8/8/8/R3K3 w Qq d6 0 1").unwrap();
        assert_eq!(game.parse_move("e5d6").unwrap().kind, MoveType::EnPassant);
        assert_eq!(game.parse_move("b7a8r").unwrap().kind, MoveType::Promotion(PieceType::Rook));
        assert_eq!(game.parse_move("b7a8r").unwrap().target_piece, Piece::BLACK_ROOK);
        assert_eq!(game.parse_move("e1c1").unwrap().kind, MoveType::Castling);
        assert_eq!(game.parse_move("e1d1").unwrap().kind, MoveType::Normal);
        assert_eq!(game.parse_move("b7b8x").unwrap_err(), ChessError::InvalidPromotion('x'));
        assert!(matches!(game.parse_move("b7b8"), Err(ChessError::InvalidMoveText(_))));
        assert!(matches!(game.parse_move("c3c4"), Err(ChessError::EmptySourceSquare(_))));
        assert!(matches!(game.parse_move("z9a1"), Err(ChessError::InvalidSquare(_))));
        assert!(matches!(game.parse_move("e1"), Err(ChessError::InvalidMoveText(_))));
    }

    #[test]
    fn parse_move_rejects_impossible_moves() {
        let mut game = Game::from_fen(START_FEN).unwrap();
        let before = game.fen();
        for text in ["e1c1", "e1e5", "e1g1", "a1a5", "d1h5", "e2e5", "g1g3"] {
            assert_eq!(game.parse_move(text).unwrap_err(), ChessError::IllegalMove(text.into()), "{text}");
        }
        assert!(matches!(game.play_text("e1c1"), Err(ChessError::IllegalMove(_))));
        assert_eq!(game.fen(), before);
        assert_eq!(game.ply(), 0);
    }

    #[test]
    fn san_basics() {
        let mut game = Game::from_fen(START_FEN).unwrap();
        let e4 = game.parse_move("e2e4").unwrap();
        assert_eq!(game.format_san(e4), "e4");
        let nf3 = game.parse_move("g1f3").unwrap();
        assert_eq!(game.format_san(nf3), "Nf3");

        let mut game = Game::from_fen("r3k3/1P6/8/3pP3/8/8/8/R3K3 w Qq d6 0 1").unwrap();
        let ep = game.parse_move("e5d6").unwrap();
        assert_eq!(game.format_san(ep), "exd6");
        let promo = game.parse_move("b7a8q").unwrap();
        assert_eq!(game.format_san(promo), "bxa8=Q+");
        let castle = game.parse_move("e1c1").unwrap();
        assert_eq!(game.format_san(castle), "O-O-O");
    }

    #[test]
    fn san_mate_suffix() {
        let mut game = Game::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let mv = game.parse_move("a1a8").unwrap();
        assert_eq!(game.format_san(mv), "Ra8#");
    }

    #[test]
    fn find_and_play_text() {
        let mut game = Game::from_fen(START_FEN).unwrap();
        assert_eq!(game.play_text("e4").unwrap().to_string(), "e2e4");
        assert_eq!(game.play_text("e7e5").unwrap().to_string(), "e7e5");
        assert_eq!(game.play_text("Nf3!?").unwrap().to_string(), "g1f3");
        assert!(matches!(game.play_text("Ke3"), Err(ChessError::IllegalMove(_))));
        assert_eq!(game.ply(), 3);
    }
}
