//! Premove mobility: squares a piece could be queued to move to before its
//! side is on move.
//!
//! Pure functions over (origin, destination) deltas. No path occupancy is
//! checked; the host re-validates the queued move once the turn arrives.

use crate::log::debug;
use crate::types::{Color, Piece, Pieces, Role, Square};

/// Everything a mobility predicate may consult
pub struct MobilityContext<'a> {
    pub origin: Square,
    pub piece: Piece,
    /// Side queuing the premove (owner of the piece)
    pub mover: Color,
    pub pieces: &'a Pieces,
    /// Files of the mover's rooks on its back rank
    pub rook_files: &'a [u8],
    pub can_castle: bool,
    pub last_move: Option<(Square, Square)>,
}

impl MobilityContext<'_> {
    fn delta(&self, dest: Square) -> (i8, i8) {
        (
            dest.file() as i8 - self.origin.file() as i8,
            dest.rank() as i8 - self.origin.rank() as i8,
        )
    }
}

/// A mobility predicate for one role
pub type Mobility = fn(&MobilityContext<'_>, Square) -> bool;

/// Host veto: returning false removes the candidate.
pub type ExtraPredicate = dyn Fn(&MobilityContext<'_>, Square) -> bool;

fn pawn(ctx: &MobilityContext<'_>, dest: Square) -> bool {
    let (dx, dy) = ctx.delta(dest);
    let (forward, home_rank) = match ctx.piece.color {
        Color::White => (1, 1),
        Color::Black => (-1, 6),
    };
    (dy == forward && dx.abs() <= 1)
        || (dx == 0 && dy == 2 * forward && ctx.origin.rank() == home_rank)
}

fn knight(ctx: &MobilityContext<'_>, dest: Square) -> bool {
    let (dx, dy) = ctx.delta(dest);
    matches!((dx.abs(), dy.abs()), (1, 2) | (2, 1))
}

fn bishop(ctx: &MobilityContext<'_>, dest: Square) -> bool {
    let (dx, dy) = ctx.delta(dest);
    dx != 0 && dx.abs() == dy.abs()
}

fn rook(ctx: &MobilityContext<'_>, dest: Square) -> bool {
    let (dx, dy) = ctx.delta(dest);
    (dx == 0) != (dy == 0)
}

fn queen(ctx: &MobilityContext<'_>, dest: Square) -> bool {
    bishop(ctx, dest) || rook(ctx, dest)
}

fn king(ctx: &MobilityContext<'_>, dest: Square) -> bool {
    let (dx, dy) = ctx.delta(dest);
    if dx.abs().max(dy.abs()) == 1 {
        return true;
    }
    // Simplified castling: two files toward a friendly rook on the home rank.
    let home = ctx.piece.color.back_rank();
    if !ctx.can_castle || dy != 0 || ctx.origin.rank() != home || dx.abs() != 2 {
        return false;
    }
    let from = ctx.origin.file();
    ctx.rook_files
        .iter()
        .any(|&f| if dx < 0 { f < from } else { f > from })
}

/// The predicate table
pub fn mobility_for(role: Role) -> Mobility {
    match role {
        Role::Pawn => pawn,
        Role::Knight => knight,
        Role::Bishop => bishop,
        Role::Rook => rook,
        Role::Queen => queen,
        Role::King => king,
    }
}

/// Files of `color`'s rooks standing on its back rank
pub fn rook_files_of(pieces: &Pieces, color: Color) -> Vec<u8> {
    let back_rank = color.back_rank();
    pieces
        .iter()
        .filter(|(sq, p)| sq.rank() == back_rank && p.color == color && p.role == Role::Rook)
        .map(|(sq, _)| sq.file())
        .collect()
}

/// Query options beyond the placement itself
pub struct PremoveOptions {
    /// Explicit rook files; derived from the placement when None
    pub rook_files: Option<Vec<u8>>,
    pub can_castle: bool,
    pub last_move: Option<(Square, Square)>,
    pub extra: Option<Box<ExtraPredicate>>,
}

impl Default for PremoveOptions {
    fn default() -> Self {
        Self {
            rook_files: None,
            can_castle: true,
            last_move: None,
            extra: None,
        }
    }
}

/// Premove destinations for the piece on `origin`, queued by `mover`.
///
/// Empty when the square is empty or holds a piece of the other color.
pub fn premove_destinations(pieces: &Pieces, origin: Square, mover: Color) -> Vec<Square> {
    premove_destinations_with(pieces, origin, mover, &PremoveOptions::default())
}

pub fn premove_destinations_with(
    pieces: &Pieces,
    origin: Square,
    mover: Color,
    options: &PremoveOptions,
) -> Vec<Square> {
    let Some(&piece) = pieces.get(&origin) else {
        return Vec::new();
    };
    if piece.color != mover {
        return Vec::new();
    }

    let derived;
    let rook_files = match &options.rook_files {
        Some(files) => files.as_slice(),
        None => {
            derived = rook_files_of(pieces, mover);
            derived.as_slice()
        }
    };

    let ctx = MobilityContext {
        origin,
        piece,
        mover,
        pieces,
        rook_files,
        can_castle: options.can_castle,
        last_move: options.last_move,
    };
    let mobility = mobility_for(piece.role);

    let dests: Vec<Square> = Square::all()
        .filter(|&dest| dest != origin && mobility(&ctx, dest))
        .filter(|&dest| options.extra.as_ref().is_none_or(|extra| extra(&ctx, dest)))
        .collect();

    debug!(
        origin = %origin,
        role = %piece.role,
        count = dests.len(),
        "premove destinations"
    );
    dests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::{INITIAL_FEN, read_fen};

    fn sq(key: &str) -> Square {
        key.parse().unwrap()
    }

    fn keys(dests: &[Square]) -> Vec<String> {
        dests.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn knight_from_b1() {
        let pieces = read_fen(INITIAL_FEN).unwrap();
        let dests = premove_destinations(&pieces, sq("b1"), Color::White);
        assert_eq!(keys(&dests), ["a3", "c3", "d2"]);
    }

    #[test]
    fn white_pawn_from_home_rank() {
        let pieces = read_fen(INITIAL_FEN).unwrap();
        let dests = premove_destinations(&pieces, sq("e2"), Color::White);
        assert_eq!(keys(&dests), ["d3", "e3", "e4", "f3"]);
    }

    #[test]
    fn black_pawn_moves_down() {
        let pieces = read_fen(INITIAL_FEN).unwrap();
        let dests = premove_destinations(&pieces, sq("e7"), Color::Black);
        assert_eq!(keys(&dests), ["d6", "e5", "e6", "f6"]);
    }

    #[test]
    fn pawn_off_home_rank_has_no_double_step() {
        let pieces = read_fen("8/8/8/8/8/4P3/8/8").unwrap();
        let dests = premove_destinations(&pieces, sq("e3"), Color::White);
        assert_eq!(keys(&dests), ["d4", "e4", "f4"]);
    }

    #[test]
    fn bishop_ignores_blockers() {
        let pieces = read_fen(INITIAL_FEN).unwrap();
        let dests = premove_destinations(&pieces, sq("c1"), Color::White);
        assert_eq!(keys(&dests), ["a3", "b2", "d2", "e3", "f4", "g5", "h6"]);
    }

    #[test]
    fn rook_covers_file_and_rank() {
        let pieces = read_fen("8/8/8/8/8/8/8/R7").unwrap();
        let dests = premove_destinations(&pieces, sq("a1"), Color::White);
        assert_eq!(dests.len(), 14);
        assert!(dests.contains(&sq("a8")));
        assert!(dests.contains(&sq("h1")));
        assert!(!dests.contains(&sq("b2")));
    }

    #[test]
    fn queen_is_rook_plus_bishop() {
        let pieces = read_fen("8/8/8/8/3Q4/8/8/8").unwrap();
        let dests = premove_destinations(&pieces, sq("d4"), Color::White);
        assert_eq!(dests.len(), 27);
    }

    #[test]
    fn king_castles_toward_rooks() {
        let pieces = read_fen("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        let dests = premove_destinations(&pieces, sq("e8"), Color::Black);
        assert_eq!(keys(&dests), ["c8", "d7", "d8", "e7", "f7", "f8", "g8"]);
    }

    #[test]
    fn king_without_castling_rights() {
        let pieces = read_fen("8/8/8/8/8/8/8/R3K2R").unwrap();
        let options = PremoveOptions {
            can_castle: false,
            ..PremoveOptions::default()
        };
        let dests = premove_destinations_with(&pieces, sq("e1"), Color::White, &options);
        assert_eq!(keys(&dests), ["d1", "d2", "e2", "f1", "f2"]);
    }

    #[test]
    fn king_castles_only_toward_present_rook() {
        let pieces = read_fen("8/8/8/8/8/8/8/4K2R").unwrap();
        let dests = premove_destinations(&pieces, sq("e1"), Color::White);
        assert_eq!(keys(&dests), ["d1", "d2", "e2", "f1", "f2", "g1"]);
    }

    #[test]
    fn foreign_or_empty_origin_is_empty() {
        let pieces = read_fen(INITIAL_FEN).unwrap();
        assert!(premove_destinations(&pieces, sq("e4"), Color::White).is_empty());
        assert!(premove_destinations(&pieces, sq("e7"), Color::White).is_empty());
    }

    fn off_second_rank(_ctx: &MobilityContext<'_>, dest: Square) -> bool {
        dest.rank() != 1
    }

    #[test]
    fn extra_predicate_vetoes() {
        let pieces = read_fen(INITIAL_FEN).unwrap();
        let options = PremoveOptions {
            extra: Some(Box::new(off_second_rank)),
            ..PremoveOptions::default()
        };
        let dests = premove_destinations_with(&pieces, sq("b1"), Color::White, &options);
        assert_eq!(keys(&dests), ["a3", "c3"]);
    }

    #[test]
    fn rook_files_from_back_rank() {
        let pieces = read_fen("r3k3/8/8/8/8/8/R7/4K2R").unwrap();
        assert_eq!(rook_files_of(&pieces, Color::White), vec![7]);
        assert_eq!(rook_files_of(&pieces, Color::Black), vec![0]);
    }
}
