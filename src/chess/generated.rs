//! Lookup tables produced by `build.rs`. The tables are computed once per
//! build and embedded into the binary as `static` data, so there is no runtime
//! initialization step and the tables are trivially shared between threads.

use crate::chess::bitboard::Bitboard;
use crate::chess::core::{BOARD_SIZE, BOARD_WIDTH};

const SQUARES: usize = BOARD_SIZE as usize;
const SQUARE_PAIRS: usize = SQUARES * SQUARES;

pub(super) static KING_ATTACKS: [Bitboard; SQUARES] =
    include!(concat!(env!("OUT_DIR"), "/king_attacks"));
pub(super) static KNIGHT_ATTACKS: [Bitboard; SQUARES] =
    include!(concat!(env!("OUT_DIR"), "/knight_attacks"));
pub(super) static WHITE_PAWN_ATTACKS: [Bitboard; SQUARES] =
    include!(concat!(env!("OUT_DIR"), "/white_pawn_attacks"));
pub(super) static BLACK_PAWN_ATTACKS: [Bitboard; SQUARES] =
    include!(concat!(env!("OUT_DIR"), "/black_pawn_attacks"));

// Fancy magic bitboards: every square owns a contiguous slice of the attack
// table starting at its offset, indexed by
// ((occupancy & mask) * magic) >> shift.
pub(super) const BISHOP_ATTACKS_COUNT: usize = 5248;
pub(super) static BISHOP_ATTACKS: [Bitboard; BISHOP_ATTACKS_COUNT] =
    include!(concat!(env!("OUT_DIR"), "/bishop_attacks"));
pub(super) static BISHOP_RELEVANT_OCCUPANCIES: [u64; SQUARES] =
    include!(concat!(env!("OUT_DIR"), "/bishop_occupancies"));
pub(super) static BISHOP_MAGICS: [u64; SQUARES] =
    include!(concat!(env!("OUT_DIR"), "/bishop_magics"));
pub(super) static BISHOP_SHIFTS: [u32; SQUARES] =
    include!(concat!(env!("OUT_DIR"), "/bishop_shifts"));
pub(super) static BISHOP_OFFSETS: [usize; SQUARES] =
    include!(concat!(env!("OUT_DIR"), "/bishop_offsets"));

pub(super) const ROOK_ATTACKS_COUNT: usize = 102_400;
pub(super) static ROOK_ATTACKS: [Bitboard; ROOK_ATTACKS_COUNT] =
    include!(concat!(env!("OUT_DIR"), "/rook_attacks"));
pub(super) static ROOK_RELEVANT_OCCUPANCIES: [u64; SQUARES] =
    include!(concat!(env!("OUT_DIR"), "/rook_occupancies"));
pub(super) static ROOK_MAGICS: [u64; SQUARES] = include!(concat!(env!("OUT_DIR"), "/rook_magics"));
pub(super) static ROOK_SHIFTS: [u32; SQUARES] = include!(concat!(env!("OUT_DIR"), "/rook_shifts"));
pub(super) static ROOK_OFFSETS: [usize; SQUARES] =
    include!(concat!(env!("OUT_DIR"), "/rook_offsets"));

// Indexed by from * 64 + to.
pub(super) static BETWEEN: [Bitboard; SQUARE_PAIRS] =
    include!(concat!(env!("OUT_DIR"), "/between"));
pub(super) static LINE: [Bitboard; SQUARE_PAIRS] = include!(concat!(env!("OUT_DIR"), "/line"));

// Indexed by (player * 6 + piece kind) * 64 + square.
pub(super) static PIECE_ZOBRIST_KEYS: [u64; 2 * 6 * SQUARES] =
    include!(concat!(env!("OUT_DIR"), "/piece_zobrist_keys"));
pub(super) static CASTLING_ZOBRIST_KEYS: [u64; 4] =
    include!(concat!(env!("OUT_DIR"), "/castling_zobrist_keys"));
pub(super) static EN_PASSANT_ZOBRIST_KEYS: [u64; BOARD_WIDTH as usize] =
    include!(concat!(env!("OUT_DIR"), "/en_passant_zobrist_keys"));
pub(super) const BLACK_TO_MOVE_ZOBRIST_KEY: u64 =
    include!(concat!(env!("OUT_DIR"), "/black_to_move_zobrist_key"));
