//! Legal move [generation] with [Fancy Magic Bitboards].
//!
//! The generator produces legal moves directly instead of generating
//! pseudo-legal moves and filtering them by playing each one: checks and pins
//! are computed once per position and every candidate is intersected with
//! the resulting masks. En passant is the exception: removing two pawns from
//! one rank can expose the king in ways a pin mask does not capture, so it is
//! verified with the actual post-capture occupancy.
//!
//! This is a performance and correctness-critical path: every modification
//! should be benchmarked and carefully tested.
//!
//! [generation]: https://www.chessprogramming.org/Table-driven_Move_Generation
//! [Fancy Magic Bitboards]: https://www.chessprogramming.org/Magic_Bitboards#Fancy

use crate::chess::attacks::{self, AttackInfo};
use crate::chess::bitboard::Bitboard;
use crate::chess::core::{
    CastleRights, MoveFlags, MoveList, Move, PieceKind, Player, Rank, Square,
};
use crate::chess::position::Position;

/// Calculates the list of legal moves (i.e. the moves that do not leave our
/// king in check) for the side to move. The order of the moves is not
/// specified.
#[must_use]
pub fn generate_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    let board = position.board();
    let us = position.side_to_move();
    let they = us.opponent();
    let attack_info = AttackInfo::new(board, us);
    let (our_pieces, their_pieces) = (board.player_pieces(us), board.player_pieces(they));
    let king = our_pieces.king.as_square();
    let occupancy = board.occupancy();

    // Moving the king to safety is always correct regardless of the checks.
    for to in attack_info.safe_king_squares.iter() {
        moves.push(Move::new(king, to, capture_flag(their_pieces.all(), to)));
    }

    // If there are checks, the moves are restricted to resolving them.
    let check_mask = match attack_info.checkers.count() {
        0 => Bitboard::full(),
        // Capturing the checker or blocking the ray. For leapers and adjacent
        // checkers the ray is empty and capture is the only option.
        1 => attack_info.checkers | attacks::between(king, attack_info.checkers.as_square()),
        // Double checks can only be evaded by the king moves to safety.
        _ => return moves,
    };
    let targets_mask = check_mask - our_pieces.all();

    for (kind, bitboard) in [
        (PieceKind::Knight, our_pieces.knights),
        (PieceKind::Bishop, our_pieces.bishops),
        (PieceKind::Rook, our_pieces.rooks),
        (PieceKind::Queen, our_pieces.queens),
    ] {
        for from in bitboard.iter() {
            let mut targets = match kind {
                PieceKind::Knight => attacks::knight_attacks(from),
                PieceKind::Bishop => attacks::bishop_attacks(from, occupancy),
                PieceKind::Rook => attacks::rook_attacks(from, occupancy),
                _ => attacks::queen_attacks(from, occupancy),
            } & targets_mask;
            // A pinned piece can only slide along the pin (knights never can).
            if attack_info.pins.contains(from) {
                targets &= attacks::line(king, from);
            }
            for to in targets.iter() {
                moves.push(Move::new(from, to, capture_flag(their_pieces.all(), to)));
            }
        }
    }

    let promotion_rank = Rank::backrank(they);
    let can_move = |from: Square, to: Square| {
        !attack_info.pins.contains(from) || attacks::line(king, from).contains(to)
    };

    // Pawn captures.
    for from in our_pieces.pawns.iter() {
        let targets = attacks::pawn_attacks(from, us) & their_pieces.all() & check_mask;
        for to in targets.iter() {
            if can_move(from, to) {
                add_pawn_moves(&mut moves, from, to, MoveFlags::CAPTURE, promotion_rank);
            }
        }
    }

    // Regular pawn pushes.
    let push_direction = us.push_direction();
    let single_pushes = our_pieces.pawns.shift(push_direction) - occupancy;
    let legal_pushes = single_pushes & check_mask;
    let original_squares = legal_pushes.shift(push_direction.opposite());
    for (from, to) in original_squares.iter().zip(legal_pushes.iter()) {
        if can_move(from, to) {
            add_pawn_moves(&mut moves, from, to, MoveFlags::QUIET, promotion_rank);
        }
    }

    // Double pawn pushes are never promoting.
    let third_rank = Rank::pawns_starting(us).mask().shift(push_direction);
    let double_pushes =
        ((single_pushes & third_rank).shift(push_direction) - occupancy) & check_mask;
    let original_squares = double_pushes
        .shift(push_direction.opposite())
        .shift(push_direction.opposite());
    for (from, to) in original_squares.iter().zip(double_pushes.iter()) {
        if can_move(from, to) {
            moves.push(Move::new(from, to, MoveFlags::DOUBLE_PAWN_PUSH));
        }
    }

    if let Some(en_passant_square) = position.en_passant_square() {
        generate_en_passant(position, en_passant_square, king, &mut moves);
    }

    if attack_info.checkers.is_empty() {
        generate_castling(position, attack_info.attacks, occupancy, &mut moves);
    }

    moves
}

const fn capture_flag(their_pieces: Bitboard, to: Square) -> MoveFlags {
    if their_pieces.contains(to) {
        MoveFlags::CAPTURE
    } else {
        MoveFlags::QUIET
    }
}

// Emits 4 moves (one per promotion piece) for pawns reaching the last rank.
fn add_pawn_moves(
    moves: &mut MoveList,
    from: Square,
    to: Square,
    flags: MoveFlags,
    promotion_rank: Rank,
) {
    if to.rank() == promotion_rank {
        for promotion in MoveFlags::PROMOTIONS {
            moves.push(Move::new(from, to, promotion | flags));
        }
    } else {
        moves.push(Move::new(from, to, flags));
    }
}

// Both pawns leave their squares at once. Re-computing the attackers of the
// king with the resulting occupancy catches every discovered check, including
// the horizontal one through both pawns and checks the capture does not
// resolve.
fn generate_en_passant(
    position: &Position,
    en_passant_square: Square,
    king: Square,
    moves: &mut MoveList,
) {
    let board = position.board();
    let us = position.side_to_move();
    let they = us.opponent();
    let target = Bitboard::from(en_passant_square);
    let captured_pawn = target.shift(they.push_direction());
    let candidates = attacks::pawn_attacks(en_passant_square, they) & board.player_pieces(us).pawns;
    for from in candidates.iter() {
        let occupancy = (board.occupancy() - Bitboard::from(from) - captured_pawn) | target;
        let attackers = attacks::attackers_to(king, occupancy, board)
            & board.player_pieces(they).all()
            & !captured_pawn;
        if attackers.is_empty() {
            moves.push(Move::new(from, en_passant_square, MoveFlags::EN_PASSANT));
        }
    }
}

fn generate_castling(
    position: &Position,
    attacked: Bitboard,
    occupancy: Bitboard,
    moves: &mut MoveList,
) {
    let us = position.side_to_move();
    let (king, short_to, long_to) = match us {
        Player::White => (Square::E1, Square::G1, Square::C1),
        Player::Black => (Square::E8, Square::G8, Square::C8),
    };
    let (short_king_walk, short_rook_walk, long_king_walk, long_rook_walk) = match us {
        Player::White => (
            attacks::WHITE_SHORT_CASTLE_KING_WALK,
            attacks::WHITE_SHORT_CASTLE_ROOK_WALK,
            attacks::WHITE_LONG_CASTLE_KING_WALK,
            attacks::WHITE_LONG_CASTLE_ROOK_WALK,
        ),
        Player::Black => (
            attacks::BLACK_SHORT_CASTLE_KING_WALK,
            attacks::BLACK_SHORT_CASTLE_ROOK_WALK,
            attacks::BLACK_LONG_CASTLE_KING_WALK,
            attacks::BLACK_LONG_CASTLE_ROOK_WALK,
        ),
    };
    let castling = position.castling();
    if castling.contains(CastleRights::short(us))
        && (attacked & short_king_walk).is_empty()
        && (occupancy & (short_king_walk | short_rook_walk)).is_empty()
    {
        moves.push(Move::new(king, short_to, MoveFlags::KINGSIDE_CASTLE));
    }
    if castling.contains(CastleRights::long(us))
        && (attacked & long_king_walk).is_empty()
        && (occupancy & (long_king_walk | long_rook_walk)).is_empty()
    {
        moves.push(Move::new(king, long_to, MoveFlags::QUEENSIDE_CASTLE));
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    fn moves(fen: &str) -> Vec<String> {
        let position = Position::from_fen(fen).unwrap();
        let mut moves: Vec<String> = generate_moves(&position)
            .iter()
            .map(Move::to_string)
            .collect();
        moves.sort();
        moves
    }

    #[test]
    fn flags() {
        let position =
            Position::from_fen("r3k2r/1P6/8/3pP3/8/8/8/R3K2R w KQkq d6 0 1").unwrap();
        let moves = generate_moves(&position);
        let find = |text: &str| {
            moves
                .iter()
                .filter(|m| m.to_string() == text)
                .map(|m| m.flags())
                .collect::<Vec<_>>()
        };
        assert_eq!(find("e5d6"), vec![MoveFlags::EN_PASSANT]);
        assert_eq!(find("e1g1"), vec![MoveFlags::KINGSIDE_CASTLE]);
        assert_eq!(find("e1c1"), vec![MoveFlags::QUEENSIDE_CASTLE]);
        assert_eq!(find("e5e6"), vec![MoveFlags::QUIET]);
        assert_eq!(
            find("b7a8q"),
            vec![MoveFlags::QUEEN_PROMOTION | MoveFlags::CAPTURE]
        );
        assert_eq!(find("b7b8n"), vec![MoveFlags::KNIGHT_PROMOTION]);
        assert_eq!(find("a1a8"), vec![MoveFlags::CAPTURE]);
    }

    #[test]
    fn no_duplicates() {
        let position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let moves = generate_moves(&position);
        assert_eq!(moves.len(), 48);
        assert_eq!(moves.iter().collect::<HashSet<_>>().len(), moves.len());
    }

    #[test]
    fn pinned_pieces_stay_on_the_line() {
        // The bishop on d2 is pinned by the bishop on b4 and can only capture
        // it or step between; the knight on e2 is pinned by the rook on e8.
        assert_eq!(
            moves("4r2k/8/8/8/1b6/8/3BN3/4K3 w - - 0 1"),
            vec!["d2b4", "d2c3", "e1d1", "e1f1", "e1f2"]
        );
    }

    #[test]
    fn horizontal_en_passant_pin() {
        // Capturing en passant removes both pawns from the fifth rank and
        // exposes the king to the rook. b4 is attacked by the c5 pawn.
        assert_eq!(
            moves("8/8/8/KPp4r/8/8/8/7k w - c6 0 1"),
            vec!["a5a4", "a5a6", "a5b6", "b5b6"]
        );
    }

    #[test]
    fn en_passant_resolves_pawn_check() {
        // The pushed pawn gives check and capturing it en passant is legal.
        let moves = moves("8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1");
        assert!(moves.contains(&"e4d3".to_string()));
        assert!(moves.contains(&"c5d4".to_string()));
        assert!(!moves.contains(&"e4e3".to_string()));
    }

    #[test]
    fn castling_through_attack() {
        // f1 is attacked by the bishop: no short castle. A blocked b1 forbids
        // the long castle even though the king never crosses it.
        let moves = moves("r3k2r/8/8/8/8/8/6b1/R3K2R w KQkq - 0 1");
        assert!(!moves.contains(&"e1g1".to_string()));
        assert!(moves.contains(&"e1c1".to_string()));
        let moves_blocked = self::moves("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1");
        assert!(!moves_blocked.contains(&"e1c1".to_string()));
        assert!(moves_blocked.contains(&"e1g1".to_string()));
    }
}
