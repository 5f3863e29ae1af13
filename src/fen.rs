//! Read and write the piece-placement field of FEN
//!
//! Premove queries operate on a `Pieces` snapshot; hosts usually keep
//! positions as FEN, so this is the bridge between the two.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::errors::FenError;
use crate::types::{Piece, Pieces, Square};

#[derive(Parser)]
#[grammar = "fen.pest"]
pub struct FenParser;

/// Standard starting placement
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Parse a FEN piece placement into a `Pieces` snapshot.
///
/// Accepts a full FEN record; only the first field is read.
pub fn read_fen(fen: &str) -> Result<Pieces, FenError> {
    let pairs = FenParser::parse(Rule::placement, fen).map_err(|e| {
        let offset = match e.location {
            pest::error::InputLocation::Pos(p) => p,
            pest::error::InputLocation::Span((s, _)) => s,
        };
        FenError::Syntax {
            message: e.variant.message().to_string(),
            src: FenError::source_of(fen),
            span: (offset, 0).into(),
        }
    })?;

    let mut ranks = Vec::new();
    for pair in pairs {
        if pair.as_rule() == Rule::placement {
            for inner in pair.into_inner() {
                if inner.as_rule() == Rule::rank {
                    ranks.push(inner);
                }
            }
        }
    }

    if ranks.len() != 8 {
        let end = fen.find(' ').unwrap_or(fen.len());
        return Err(FenError::RankCount {
            count: ranks.len(),
            src: FenError::source_of(fen),
            span: (0, end).into(),
        });
    }

    let mut pieces = Pieces::new();
    for (i, rank_pair) in ranks.into_iter().enumerate() {
        let rank = 7 - i as u8;
        read_rank(fen, rank_pair, rank, &mut pieces)?;
    }
    Ok(pieces)
}

fn read_rank(fen: &str, pair: Pair<Rule>, rank: u8, pieces: &mut Pieces) -> Result<(), FenError> {
    let span = pair.as_span();
    let mut file = 0usize;
    for cell in pair.into_inner() {
        match cell.as_rule() {
            Rule::gap => {
                // grammar restricts gaps to a single digit 1-8
                let run = cell.as_str().bytes().next().map_or(0, |b| (b - b'0') as usize);
                file += run;
            }
            Rule::piece => {
                let piece = cell.as_str().chars().next().and_then(Piece::from_fen_char);
                if let (Some(piece), Some(square)) = (piece, Square::new(file as u8, rank)) {
                    pieces.insert(square, piece);
                }
                file += 1;
            }
            _ => {}
        }
    }

    if file != 8 {
        return Err(FenError::RankWidth {
            rank: rank + 1,
            files: file,
            src: FenError::source_of(fen),
            span: (span.start(), span.end() - span.start()).into(),
        });
    }
    Ok(())
}

/// Write the piece-placement field for a snapshot.
pub fn write_fen(pieces: &Pieces) -> String {
    let mut out = String::with_capacity(64);
    for rank in (0..8u8).rev() {
        let mut empty = 0u8;
        for file in 0..8u8 {
            let piece = Square::new(file, rank).and_then(|sq| pieces.get(&sq));
            match piece {
                Some(piece) => {
                    if empty > 0 {
                        out.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    out.push(piece.fen_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push((b'0' + empty) as char);
        }
        if rank > 0 {
            out.push('/');
        }
    }
    out
}
