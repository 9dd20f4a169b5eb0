//! This module implements "static" [evaluation], i.e. predicting the relative
//! value/score of given position.
//!
//! The only evaluation is [mobility]: the number of legal moves available to
//! the side to move. It exercises the move generator rather than playing good
//! chess.
//!
//! [evaluation]: https://www.chessprogramming.org/Evaluation
//! [mobility]: https://www.chessprogramming.org/Mobility

use crate::chess::position::Position;

/// Score relative to the side to move: positive values are good for it.
pub type Score = i32;

/// Score of a checkmated side (negated).
pub const MATE: Score = 10_000;

/// Evaluates the position by counting the legal moves. Positions without
/// legal moves are terminal: checkmate scores as `-MATE` and stalemate as a
/// draw.
#[must_use]
pub fn mobility(position: &Position) -> Score {
    let moves = position.generate_moves();
    if moves.is_empty() {
        return if position.in_check() { -MATE } else { 0 };
    }
    // At most 218 legal moves in any chess position.
    moves.len() as Score
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn mobility_scores() {
        assert_eq!(mobility(&Position::starting()), 20);
        // Fool's mate.
        assert_eq!(
            mobility(
                &Position::from_fen(
                    "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"
                )
                .unwrap()
            ),
            -MATE
        );
        // Stalemate.
        assert_eq!(
            mobility(&Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap()),
            0
        );
        assert_eq!(
            mobility(
                &Position::from_fen(
                    "r6r/1b2k1bq/8/8/7B/8/8/R3K2R b KQ - 3 2"
                )
                .unwrap()
            ),
            8
        );
    }
}
