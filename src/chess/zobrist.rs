//! [Zobrist hashing] utilities: key lookups, from-scratch hash computation and
//! the repetition history.
//!
//! The keys are drawn from a fixed-seed PRNG in `build.rs`, so the hash of a
//! position is the same in every run and every process.
//!
//! [Zobrist hashing]: https://www.chessprogramming.org/Zobrist_Hashing

use std::collections::HashMap;

use crate::chess::bitboard::Board;
use crate::chess::core::{CastleRights, Piece, PieceKind, Player, Square, BOARD_SIZE};
use crate::chess::generated;

/// Zobrist keys are 64-bit unsigned integers that are computed once position is
/// created and updated whenever a move is made.
pub type Key = u64;

/// Key of a piece standing on the square.
#[must_use]
pub fn piece_key(piece: Piece, square: Square) -> Key {
    let player = match piece.owner {
        Player::White => 0,
        Player::Black => 1,
    };
    generated::PIECE_ZOBRIST_KEYS
        [(player * PieceKind::ALL.len() + piece.kind as usize) * BOARD_SIZE as usize
            + square as usize]
}

/// Combined key of all rights in the set.
#[must_use]
pub fn castling_key(rights: CastleRights) -> Key {
    CastleRights::EACH
        .iter()
        .zip(generated::CASTLING_ZOBRIST_KEYS)
        .filter(|(right, _)| rights.contains(**right))
        .fold(0, |key, (_, right_key)| key ^ right_key)
}

/// Only the file of the en passant square is hashed: the rank is implied by
/// the side to move.
#[must_use]
pub fn en_passant_key(square: Square) -> Key {
    generated::EN_PASSANT_ZOBRIST_KEYS[square.file() as usize]
}

/// XORed into the hash when Black is to move.
#[must_use]
pub const fn side_key() -> Key {
    generated::BLACK_TO_MOVE_ZOBRIST_KEY
}

/// Computes the hash of the state from scratch. During play the hash is
/// updated incrementally, this is the reference it has to agree with.
#[must_use]
pub fn compute(
    board: &Board,
    side_to_move: Player,
    castling: CastleRights,
    en_passant_square: Option<Square>,
) -> Key {
    let mut key = 0;
    for owner in [Player::White, Player::Black] {
        let pieces = board.player_pieces(owner);
        for kind in PieceKind::ALL {
            for square in pieces.bitboard_for(kind).iter() {
                key ^= piece_key(Piece { owner, kind }, square);
            }
        }
    }
    key ^= castling_key(castling);
    if let Some(square) = en_passant_square {
        key ^= en_passant_key(square);
    }
    if side_to_move == Player::Black {
        key ^= side_key();
    }
    key
}

/// Counts occurrences of positions (by their hash) within one game.
#[derive(Debug, Default)]
pub(crate) struct RepetitionTable {
    table: HashMap<Key, u8>,
}

impl RepetitionTable {
    /// Creates an empty repetition table.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns true if the position has occurred 3 times.
    ///
    /// In the tournament setting 3-fold repetition is a draw.
    #[must_use]
    pub(crate) fn record(&mut self, key: Key) -> bool {
        let count = self.table.entry(key).or_insert(0);
        *count = count.saturating_add(1);
        *count >= 3
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::chess::position::Position;

    #[test]
    fn distinct_keys() {
        let mut keys: Vec<Key> = generated::PIECE_ZOBRIST_KEYS.to_vec();
        keys.extend(generated::CASTLING_ZOBRIST_KEYS);
        keys.extend(generated::EN_PASSANT_ZOBRIST_KEYS);
        keys.push(side_key());
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert!(!keys.contains(&0));
    }

    #[test]
    fn castling_keys_combine() {
        assert_eq!(castling_key(CastleRights::NONE), 0);
        assert_eq!(
            castling_key(CastleRights::ALL),
            castling_key(CastleRights::WHITE_BOTH) ^ castling_key(CastleRights::BLACK_BOTH)
        );
        assert_eq!(
            castling_key(CastleRights::WHITE_BOTH),
            castling_key(CastleRights::WHITE_SHORT) ^ castling_key(CastleRights::WHITE_LONG)
        );
    }

    #[test]
    fn en_passant_key_depends_on_file() {
        assert_eq!(en_passant_key(Square::E3), en_passant_key(Square::E6));
        assert_ne!(en_passant_key(Square::E3), en_passant_key(Square::D3));
    }

    #[test]
    fn reproducible() {
        assert_eq!(Position::starting().hash(), Position::starting().hash());
        assert_eq!(
            Position::starting().hash(),
            Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .unwrap()
                .hash()
        );
        // Counters are not part of the hash.
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap().hash(),
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 42 90").unwrap().hash()
        );
        // Side to move is.
        assert_ne!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap().hash(),
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap().hash()
        );
    }

    #[test]
    fn repetition_table() {
        let mut table = RepetitionTable::new();

        let mut position = Position::starting();
        let initial_hash = position.hash();
        assert!(!table.record(initial_hash));

        for (i, token) in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1"]
            .iter()
            .enumerate()
        {
            let m = position.parse_move(token).expect("legal move");
            let _ = position.play(m);
            assert_ne!(i == 3, position.hash() != initial_hash);
            assert!(!table.record(position.hash()));
        }
        // Three-fold repetition.
        let m = position.parse_move("f6g8").expect("legal move");
        let _ = position.play(m);
        assert_eq!(position.hash(), initial_hash);
        assert!(table.record(position.hash()));
        // Counting continues past three.
        assert!(table.record(position.hash()));
    }
}
