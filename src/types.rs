//! Strongly-typed board primitives for boardmarks.
//!
//! Squares are only constructible through checked constructors so that an
//! off-board coordinate can never reach the render or premove code.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::SquareError;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

fn check_extent(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else if val == 0.0 {
        Err(NumericError::Zero)
    } else if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

fn check_finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Side color. Also used as board orientation: `White` puts rank 1 at the bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Rank index (0-based) of this color's back rank.
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Piece role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Pawn,
        Role::Knight,
        Role::Bishop,
        Role::Rook,
        Role::Queen,
        Role::King,
    ];

    /// Lowercase FEN letter
    pub fn letter(self) -> char {
        match self {
            Role::Pawn => 'p',
            Role::Knight => 'n',
            Role::Bishop => 'b',
            Role::Rook => 'r',
            Role::Queen => 'q',
            Role::King => 'k',
        }
    }

    pub fn from_letter(c: char) -> Option<Role> {
        let c = c.to_ascii_lowercase();
        Role::ALL.into_iter().find(|role| role.letter() == c)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Pawn => "pawn",
            Role::Knight => "knight",
            Role::Bishop => "bishop",
            Role::Rook => "rook",
            Role::Queen => "queen",
            Role::King => "king",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub role: Role,
    pub color: Color,
}

impl Piece {
    pub fn new(role: Role, color: Color) -> Self {
        Piece { role, color }
    }

    /// FEN letter: uppercase for white, lowercase for black
    pub fn fen_char(self) -> char {
        match self.color {
            Color::White => self.role.letter().to_ascii_uppercase(),
            Color::Black => self.role.letter(),
        }
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let role = Role::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { role, color })
    }
}

/// A board square. Field order gives file-major, rank-minor ordering.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Create a square from 0-based file and rank. Returns None off the board.
    pub fn new(file: u8, rank: u8) -> Option<Square> {
        (file < 8 && rank < 8).then_some(Square { file, rank })
    }


    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    /// All 64 squares in file-major, rank-minor order (a1, a2, .., a8, b1, ..).
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|file| (0..8u8).map(move |rank| Square { file, rank }))
    }

    /// Board position as seen from `orientation`: (0, 0) is the bottom-left corner.
    pub fn oriented(self, orientation: Color) -> (f64, f64) {
        match orientation {
            Color::White => (self.file as f64, self.rank as f64),
            Color::Black => ((7 - self.file) as f64, (7 - self.rank) as f64),
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(SquareError::InvalidKey { key: s.to_string() });
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::new(file, rank).ok_or_else(|| SquareError::InvalidKey { key: s.to_string() })
    }
}

/// Piece placement snapshot, iterated in file-major square order.
pub type Pieces = BTreeMap<Square, Piece>;

/// Board pixel bounds as reported by the host.
///
/// Only constructible through `try_new`, so extents are always positive and finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    width: f64,
    height: f64,
    left: f64,
    top: f64,
}

impl Bounds {
    /// Create bounds with validation (rejects NaN, infinite, zero and negative extents)
    pub fn try_new(width: f64, height: f64, left: f64, top: f64) -> Result<Self, NumericError> {
        Ok(Bounds {
            width: check_extent(width)?,
            height: check_extent(height)?,
            left: check_finite(left)?,
            top: check_finite(top)?,
        })
    }

    /// Square bounds anchored at the origin (convenient for tests and headless hosts)
    pub fn square(size: f64) -> Result<Self, NumericError> {
        Self::try_new(size, size, 0.0, 0.0)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn top(&self) -> f64 {
        self.top
    }
}

/// Everything a render pass needs from the host besides the shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardView {
    pub bounds: Bounds,
    pub orientation: Color,
}

impl BoardView {
    pub fn new(bounds: Bounds, orientation: Color) -> Self {
        BoardView { bounds, orientation }
    }
}
