//! Implementation of chess environment, its rules and specifics.

pub mod attacks;
pub mod bitboard;
pub mod core;
pub mod game;
pub mod movegen;
pub mod position;
pub mod zobrist;
mod generated;

/// Categories of chess failures. Fallible operations return
/// [`anyhow::Result`] with one of these attached as context, callers
/// recover the category with `downcast_ref::<Error>()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The textual setup is syntactically invalid or describes an impossible
    /// position.
    #[error("malformed position setup")]
    MalformedSetup,
    /// The move token is syntactically invalid or does not correspond to a
    /// legal move in the current position.
    #[error("illegal move token")]
    IllegalMoveToken,
    /// The internal state of a position is inconsistent.
    #[error("position invariant violated")]
    InvariantViolation,
}
