// Piece identifiers: piece id = color * 8 + type, type 0 is "no piece".
// Slot 0 of the per-piece bitboard array holds the empty squares.

use std::fmt;
use std::ops::Not;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// FEN side-to-move letter.
    pub fn to_char(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }
}

impl Not for Color {
    type Output = Color;

    #[inline]
    fn not(self) -> Color {
        self.opposite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceType {
    None = 0,
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

impl PieceType {
    /// Promotion choices, highest value first.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    /// Non-pawn piece classes in generation order.
    pub const OFFICERS: [PieceType; 5] = [
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    #[inline]
    pub fn from_index(index: u8) -> PieceType {
        match index {
            1 => PieceType::Pawn,
            2 => PieceType::Knight,
            3 => PieceType::Bishop,
            4 => PieceType::Rook,
            5 => PieceType::Queen,
            6 => PieceType::King,
            _ => PieceType::None,
        }
    }

    pub fn lower_char(self) -> char {
        match self {
            PieceType::None => ' ',
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }

    pub fn upper_char(self) -> char {
        self.lower_char().to_ascii_uppercase()
    }

    /// Parses a promotion letter (either case).
    pub fn from_promotion_char(ch: char) -> Option<PieceType> {
        match ch.to_ascii_lowercase() {
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Piece(u8);

impl Piece {
    pub const NONE: Piece = Piece(0);
    /// Size of any array indexed by piece id.
    pub const COUNT: usize = 16;

    pub const WHITE_PAWN: Piece = Piece::new(Color::White, PieceType::Pawn);
    pub const WHITE_KNIGHT: Piece = Piece::new(Color::White, PieceType::Knight);
    pub const WHITE_BISHOP: Piece = Piece::new(Color::White, PieceType::Bishop);
    pub const WHITE_ROOK: Piece = Piece::new(Color::White, PieceType::Rook);
    pub const WHITE_QUEEN: Piece = Piece::new(Color::White, PieceType::Queen);
    pub const WHITE_KING: Piece = Piece::new(Color::White, PieceType::King);
    pub const BLACK_PAWN: Piece = Piece::new(Color::Black, PieceType::Pawn);
    pub const BLACK_KNIGHT: Piece = Piece::new(Color::Black, PieceType::Knight);
    pub const BLACK_BISHOP: Piece = Piece::new(Color::Black, PieceType::Bishop);
    pub const BLACK_ROOK: Piece = Piece::new(Color::Black, PieceType::Rook);
    pub const BLACK_QUEEN: Piece = Piece::new(Color::Black, PieceType::Queen);
    pub const BLACK_KING: Piece = Piece::new(Color::Black, PieceType::King);

    #[inline]
    pub const fn new(color: Color, kind: PieceType) -> Piece {
        Piece(color as u8 * 8 + kind as u8)
    }

    /// Inverse of `index`; ids outside 0..16 map to `NONE`.
    #[inline]
    pub fn from_index(id: usize) -> Piece {
        if id < Piece::COUNT {
            Piece(id as u8)
        } else {
            Piece::NONE
        }
    }

    #[inline]
    pub fn kind(self) -> PieceType {
        PieceType::from_index(self.0 % 8)
    }

    #[inline]
    pub fn color(self) -> Color {
        if self.0 < 8 {
            Color::White
        } else {
            Color::Black
        }
    }

    #[inline]
    pub fn is_piece(self) -> bool {
        self.0 % 8 != 0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Same color, different type (used for promotions).
    #[inline]
    pub fn with_kind(self, kind: PieceType) -> Piece {
        Piece::new(self.color(), kind)
    }

    /// FEN letter: uppercase for white, lowercase for black, ' ' for none.
    pub fn to_char(self) -> char {
        if !self.is_piece() {
            return ' ';
        }
        match self.color() {
            Color::White => self.kind().upper_char(),
            Color::Black => self.kind().lower_char(),
        }
    }

    pub fn from_char(ch: char) -> Option<Piece> {
        let kind = match ch.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, kind))
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_piece() {
            write!(f, "{:?}{:?}", self.color(), self.kind())
        } else {
            write!(f, "None")
        }
    }
}
