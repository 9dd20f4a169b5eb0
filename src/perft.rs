//! [Perft] (*per*formance *t*esting) is a technique for checking correctness of
//! move generation (tested functions are generate move, make move and unmake
//! move).
//!
//! [Perft]: https://www.chessprogramming.org/Perft

use crate::chess::core::Move;
use crate::chess::position::Position;

/// Counts the leaf nodes of the legal move tree of given depth. The position
/// is mutated during the walk and restored before returning.
#[must_use]
pub fn perft(position: &mut Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = position.generate_moves();
    // Bulk counting: the leaves do not have to be played.
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for next_move in moves {
        let undo = position.play(next_move);
        nodes += perft(position, depth - 1);
        position.undo(next_move, undo);
    }
    nodes
}

/// Splits the [`perft`] count by root move. Useful for finding the branch in
/// which move generation diverges from a reference implementation.
#[must_use]
pub fn perft_divide(position: &mut Position, depth: u8) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    position
        .generate_moves()
        .into_iter()
        .map(|next_move| {
            let undo = position.play(next_move);
            let nodes = perft(position, depth - 1);
            position.undo(next_move, undo);
            (next_move, nodes)
        })
        .collect()
}
