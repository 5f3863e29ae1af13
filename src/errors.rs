//! Error types with rich diagnostics using miette
//!
//! Only text inputs (square keys and FEN placements) can fail. Rendering and
//! premove queries degrade to empty output instead of erroring.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors from parsing an algebraic square key such as `e4`
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    #[error("invalid square key: {key:?}")]
    #[diagnostic(
        code(boardmarks::square::invalid_key),
        help("square keys are a file letter a-h followed by a rank digit 1-8")
    )]
    InvalidKey { key: String },
}

// ============================================================================
// FEN Errors
// ============================================================================

/// Errors that occur while reading a FEN piece placement
#[derive(Error, Diagnostic, Debug)]
pub enum FenError {
    #[error("malformed piece placement")]
    #[diagnostic(code(boardmarks::fen::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
    },

    #[error("rank {rank} describes {files} files")]
    #[diagnostic(
        code(boardmarks::fen::rank_width),
        help("every rank must account for exactly 8 files")
    )]
    RankWidth {
        rank: u8,
        files: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("this rank")]
        span: SourceSpan,
    },

    #[error("expected 8 ranks, found {count}")]
    #[diagnostic(code(boardmarks::fen::rank_count))]
    RankCount {
        count: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("placement field")]
        span: SourceSpan,
    },
}

impl FenError {
    pub(crate) fn source_of(fen: &str) -> NamedSource<String> {
        NamedSource::new("<fen>", fen.to_string())
    }
}
