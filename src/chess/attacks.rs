//! Mappings of occupied squares to the attacked squares for each piece. The
//! mappings are pre-calculated in `build.rs` to provide an efficient way of
//! generating moves.
//!
//! Sliding pieces use [Fancy Magic Bitboards]: relevant occupancy bits of
//! the rays are multiplied by a per-square magic number, and the top bits of
//! the product index a dense per-square slice of the attack table.
//!
//! [Fancy Magic Bitboards]: https://www.chessprogramming.org/Magic_Bitboards#Fancy

use crate::chess::bitboard::{Bitboard, Board};
use crate::chess::core::{Player, Square, BOARD_SIZE};
use crate::chess::generated;

#[must_use]
#[allow(missing_docs)]
pub fn king_attacks(from: Square) -> Bitboard {
    generated::KING_ATTACKS[from as usize]
}

#[must_use]
#[allow(missing_docs)]
pub fn knight_attacks(from: Square) -> Bitboard {
    generated::KNIGHT_ATTACKS[from as usize]
}

/// Squares a pawn of the given player attacks from `from`. The reverse lookup
/// (which pawns attack a square) uses the opponent's table.
#[must_use]
pub fn pawn_attacks(from: Square, player: Player) -> Bitboard {
    match player {
        Player::White => generated::WHITE_PAWN_ATTACKS[from as usize],
        Player::Black => generated::BLACK_PAWN_ATTACKS[from as usize],
    }
}

#[must_use]
#[allow(missing_docs)]
pub fn bishop_attacks(from: Square, occupancy: Bitboard) -> Bitboard {
    let square = from as usize;
    let relevant = occupancy.bits() & generated::BISHOP_RELEVANT_OCCUPANCIES[square];
    let index = (relevant.wrapping_mul(generated::BISHOP_MAGICS[square])
        >> generated::BISHOP_SHIFTS[square]) as usize;
    generated::BISHOP_ATTACKS[generated::BISHOP_OFFSETS[square] + index]
}

#[must_use]
#[allow(missing_docs)]
pub fn rook_attacks(from: Square, occupancy: Bitboard) -> Bitboard {
    let square = from as usize;
    let relevant = occupancy.bits() & generated::ROOK_RELEVANT_OCCUPANCIES[square];
    let index = (relevant.wrapping_mul(generated::ROOK_MAGICS[square])
        >> generated::ROOK_SHIFTS[square]) as usize;
    generated::ROOK_ATTACKS[generated::ROOK_OFFSETS[square] + index]
}

#[must_use]
#[allow(missing_docs)]
pub fn queen_attacks(from: Square, occupancy: Bitboard) -> Bitboard {
    bishop_attacks(from, occupancy) | rook_attacks(from, occupancy)
}

/// Squares strictly between `from` and `to` if they share a rank, file or
/// diagonal, empty set otherwise.
#[must_use]
pub fn between(from: Square, to: Square) -> Bitboard {
    generated::BETWEEN[from as usize * BOARD_SIZE as usize + to as usize]
}

/// The full board line passing through both squares (including them) if they
/// share a rank, file or diagonal, empty set otherwise.
#[must_use]
pub fn line(from: Square, to: Square) -> Bitboard {
    generated::LINE[from as usize * BOARD_SIZE as usize + to as usize]
}

/// Pieces of both players attacking the square given the occupancy. The
/// occupancy may differ from the board (e.g. with a piece lifted off) to probe
/// x-rays.
#[must_use]
pub fn attackers_to(square: Square, occupancy: Bitboard, board: &Board) -> Bitboard {
    let (white, black) = (&board.white_pieces, &board.black_pieces);
    let queens = white.queens | black.queens;
    (pawn_attacks(square, Player::Black) & white.pawns)
        | (pawn_attacks(square, Player::White) & black.pawns)
        | (knight_attacks(square) & (white.knights | black.knights))
        | (king_attacks(square) & (white.king | black.king))
        | (bishop_attacks(square, occupancy) & (white.bishops | black.bishops | queens))
        | (rook_attacks(square, occupancy) & (white.rooks | black.rooks | queens))
}

/// Returns true if any piece of `attacker` attacks the square.
#[must_use]
pub fn is_attacked(square: Square, attacker: Player, occupancy: Bitboard, board: &Board) -> bool {
    (attackers_to(square, occupancy, board) & board.player_pieces(attacker).all()).has_any()
}

// Squares the king passes through and the squares that have to be empty for
// castling.
pub(super) const WHITE_SHORT_CASTLE_KING_WALK: Bitboard =
    Bitboard::from_bits((1 << Square::F1 as u8) | (1 << Square::G1 as u8));
pub(super) const WHITE_SHORT_CASTLE_ROOK_WALK: Bitboard =
    Bitboard::from_bits((1 << Square::F1 as u8) | (1 << Square::G1 as u8));
pub(super) const WHITE_LONG_CASTLE_KING_WALK: Bitboard =
    Bitboard::from_bits((1 << Square::C1 as u8) | (1 << Square::D1 as u8));
pub(super) const WHITE_LONG_CASTLE_ROOK_WALK: Bitboard = Bitboard::from_bits(
    (1 << Square::B1 as u8) | (1 << Square::C1 as u8) | (1 << Square::D1 as u8),
);
pub(super) const BLACK_SHORT_CASTLE_KING_WALK: Bitboard =
    Bitboard::from_bits((1 << Square::F8 as u8) | (1 << Square::G8 as u8));
pub(super) const BLACK_SHORT_CASTLE_ROOK_WALK: Bitboard =
    Bitboard::from_bits((1 << Square::F8 as u8) | (1 << Square::G8 as u8));
pub(super) const BLACK_LONG_CASTLE_KING_WALK: Bitboard =
    Bitboard::from_bits((1 << Square::C8 as u8) | (1 << Square::D8 as u8));
pub(super) const BLACK_LONG_CASTLE_ROOK_WALK: Bitboard = Bitboard::from_bits(
    (1 << Square::B8 as u8) | (1 << Square::C8 as u8) | (1 << Square::D8 as u8),
);

/// Everything the legal move generator needs to know about the opponent's
/// threats, computed once per position.
#[derive(Debug)]
pub(super) struct AttackInfo {
    /// Opponent pieces giving check to our king.
    pub(super) checkers: Bitboard,
    /// Our pieces that can only move along the line to our king.
    pub(super) pins: Bitboard,
    /// Squares attacked by the opponent, computed with our king lifted off
    /// the board so that it can not step back along a slider's ray.
    pub(super) attacks: Bitboard,
    /// King moves that do not land on an attacked square or our own piece.
    pub(super) safe_king_squares: Bitboard,
}

impl AttackInfo {
    pub(super) fn new(board: &Board, us: Player) -> Self {
        let they = us.opponent();
        let (our_pieces, their_pieces) = (board.player_pieces(us), board.player_pieces(they));
        let king = our_pieces.king.as_square();
        let occupancy = board.occupancy();

        let without_king = occupancy - our_pieces.king;
        let mut attacks = Bitboard::empty();
        for from in their_pieces.pawns.iter() {
            attacks |= pawn_attacks(from, they);
        }
        for from in their_pieces.knights.iter() {
            attacks |= knight_attacks(from);
        }
        for from in (their_pieces.bishops | their_pieces.queens).iter() {
            attacks |= bishop_attacks(from, without_king);
        }
        for from in (their_pieces.rooks | their_pieces.queens).iter() {
            attacks |= rook_attacks(from, without_king);
        }
        attacks |= king_attacks(their_pieces.king.as_square());

        let checkers = attackers_to(king, occupancy, board) & their_pieces.all();

        // Sliders that would hit the king on an empty board pin the only own
        // piece standing between them and the king.
        let snipers = (bishop_attacks(king, Bitboard::empty())
            & (their_pieces.bishops | their_pieces.queens))
            | (rook_attacks(king, Bitboard::empty()) & (their_pieces.rooks | their_pieces.queens));
        let mut pins = Bitboard::empty();
        for sniper in snipers.iter() {
            let blockers = between(king, sniper) & occupancy;
            if blockers.has_any() && !blockers.has_many() {
                pins |= blockers & our_pieces.all();
            }
        }

        Self {
            checkers,
            pins,
            attacks,
            safe_king_squares: king_attacks(king) - our_pieces.all() - attacks,
        }
    }
}
