//! A game is a position together with the history that led to it. It is the
//! request-scoped state for replaying a sequence of moves: nothing in it is
//! shared between games.

use anyhow::{bail, Context};

use crate::chess::position::Position;
use crate::chess::zobrist::RepetitionTable;
use crate::chess::Error;

/// Length of a coordinate move token without promotion (`e2e4`).
pub const TOKEN_LENGTH: usize = 4;

/// Replays moves from the starting position and tracks repetitions.
#[derive(Debug)]
pub struct Game {
    position: Position,
    repetitions: RepetitionTable,
    threefold_repetition: bool,
}

impl Game {
    /// Creates a game at the standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::from_position(Position::starting())
    }

    /// Creates a game starting at the given position.
    #[must_use]
    pub fn from_position(root: Position) -> Self {
        let mut repetitions = RepetitionTable::new();
        let _ = repetitions.record(root.hash());
        Self {
            position: root,
            repetitions,
            threefold_repetition: false,
        }
    }

    /// Plays a single legal move given in coordinate notation. A pawn move
    /// reaching the last rank without a promotion suffix promotes to a queen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalMoveToken`] context if the token does not
    /// match a legal move; the game is left untouched in that case.
    pub fn apply(&mut self, token: &str) -> anyhow::Result<()> {
        let next_move = match self.position.parse_move(token) {
            Ok(next_move) => next_move,
            Err(e) if token.len() == TOKEN_LENGTH => self
                .position
                .parse_move(&format!("{token}q"))
                .map_err(|_| e)?,
            Err(e) => return Err(e),
        };
        let _ = self.position.play(next_move);
        if self.repetitions.record(self.position.hash()) {
            self.threefold_repetition = true;
        }
        Ok(())
    }

    /// Replays a concatenation of 4-character tokens (`e2e4e7e5`).
    ///
    /// # Errors
    ///
    /// Fails on the first token that is not a legal move. Moves preceding it
    /// stay applied.
    pub fn replay(&mut self, moves: &str) -> anyhow::Result<()> {
        for token in tokens(moves)? {
            self.apply(token)
                .with_context(|| format!("replaying move {token}"))?;
        }
        Ok(())
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Whether some position occurred three times during the game.
    #[must_use]
    pub const fn is_threefold_repetition(&self) -> bool {
        self.threefold_repetition
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits concatenated 4-character move tokens.
///
/// # Errors
///
/// Fails if the input is not ASCII or its length is not a multiple of 4.
pub fn tokens(moves: &str) -> anyhow::Result<impl Iterator<Item = &str>> {
    if !moves.is_ascii() || moves.len() % TOKEN_LENGTH != 0 {
        bail!(Error::IllegalMoveToken);
    }
    // ASCII input: every chunk boundary is a char boundary.
    Ok((0..moves.len())
        .step_by(TOKEN_LENGTH)
        .map(move |start| &moves[start..start + TOKEN_LENGTH]))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn split_tokens() {
        assert_eq!(
            tokens("e2e4e7e5").unwrap().collect::<Vec<_>>(),
            vec!["e2e4", "e7e5"]
        );
        assert_eq!(tokens("").unwrap().count(), 0);
        assert!(tokens("e2e").is_err());
        assert!(tokens("é2e4").is_err());
    }

    #[test]
    fn replay() {
        let mut game = Game::new();
        game.replay("e2e4e7e5g1f3").unwrap();
        assert_eq!(
            game.position().to_string(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
        assert!(!game.is_threefold_repetition());
    }

    #[test]
    fn illegal_token_leaves_position() {
        let mut game = Game::new();
        game.replay("e2e4").unwrap();
        let before = game.position().clone();
        let error = game.replay("e2e4").unwrap_err();
        assert_eq!(
            error.downcast_ref::<Error>(),
            Some(&Error::IllegalMoveToken)
        );
        assert_eq!(game.position(), &before);
    }

    #[test]
    fn short_promotion_token_queens() {
        let mut game =
            Game::from_position(Position::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap());
        game.apply("b7b8").unwrap();
        assert_eq!(game.position().to_string(), "1Q2k3/8/8/8/8/8/8/4K3 b - - 0 1");

        let mut game = Game::new();
        game.replay("a2a4b7b5a4b5a7a6b5a6c8b7a6b7b8c6b7a8").unwrap();
        assert_eq!(
            game.position().to_string(),
            "Q2qkbnr/2pppppp/2n5/8/8/8/1PPPPPPP/RNBQKBNR b KQk - 0 5"
        );
        // Non-pawn moves are not affected.
        assert!(game.apply("e1e2").is_err());
    }

    #[test]
    fn threefold_repetition() {
        let mut game = Game::new();
        game.replay("g1f3g8f6f3g1f6g8g1f3g8f6f3g1").unwrap();
        assert!(!game.is_threefold_repetition());
        game.apply("f6g8").unwrap();
        assert!(game.is_threefold_repetition());
    }
}
