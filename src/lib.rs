//! Bitboard chess engine core: legal move generation with magic bitboards,
//! reversible make/unmake, incremental Zobrist hashing and [perft].
//!
//! The engine is exposed over HTTP by the binary: a request names a sequence
//! of moves from the starting position and the response is the evaluation of
//! the resulting position.
//!
//! ```
//! use stronkchess::chess::position::Position;
//!
//! let mut position = Position::starting();
//! let e4 = position.parse_move("e2e4").unwrap();
//! let undo = position.play(e4);
//! assert_eq!(position.generate_moves().len(), 20);
//! position.undo(e4, undo);
//! assert_eq!(position, Position::starting());
//! ```
//!
//! [perft]: crate::perft

pub mod chess;
pub mod evaluation;
pub mod perft;
pub mod server;

use shadow_rs::shadow;

shadow!(build);

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
#[must_use]
pub fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}
