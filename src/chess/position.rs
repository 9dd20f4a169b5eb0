//! Provides fully-specified [Chess Position] implementation: stores information
//! about the board and tracks the state of castling, 50-move rule draw, etc.
//!
//! [`Position::play`] and [`Position::undo`] are the only ways to mutate the
//! position once it is created. They maintain the [Zobrist hash]
//! incrementally, so a single instance can be walked through the whole search
//! tree.
//!
//! [Chess Position]: https://www.chessprogramming.org/Chess_Position
//! [Zobrist hash]: https://www.chessprogramming.org/Zobrist_Hashing

use std::fmt;
use std::num::NonZeroU16;

use anyhow::{bail, Context};

use crate::chess::attacks::{self, AttackInfo};
use crate::chess::bitboard::{Bitboard, Board};
use crate::chess::core::{
    CastleRights, File, Move, MoveFlags, MoveList, Piece, PieceKind, Player, Rank, Square,
    UciMove, BOARD_WIDTH,
};
use crate::chess::zobrist::{self, Key};
use crate::chess::{movegen, Error};

/// State of the chess game: board, half-move counters and castling rights,
/// etc. It has 1:1 relationship with [Forsyth-Edwards Notation] (FEN).
///
/// [`Position::try_from()`] provides a convenient interface for creating a
/// [`Position`]. It will clean up the input (trim newlines and whitespace) and
/// attempt to parse in either FEN or a version of [Extended Position
/// Description] (EPD). The EPD format does not support [Operations]: the
/// support exists for compatibility with databases which provide trimmed FEN
/// lines (all FEN parts except Halfmove Clock and Fullmove Counter).
///
/// The en passant square is only stored when an enemy pawn can actually
/// capture onto it. Otherwise two identical positions reached through
/// different move orders would have different hashes.
///
/// [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
/// [Extended Position Description]: https://www.chessprogramming.org/Extended_Position_Description
/// [Operations]: https://www.chessprogramming.org/Extended_Position_Description#Operations
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    castling: CastleRights,
    side_to_move: Player,
    /// [Halfmove Clock][^ply] keeps track of the number of (half-)moves
    /// since the last capture or pawn move and is used to enforce
    /// fifty[^fifty]-move draw rule.
    ///
    /// [Halfmove Clock]: https://www.chessprogramming.org/Halfmove_Clock
    /// [^ply]: "Half-move" or ["ply"](https://www.chessprogramming.org/Ply) means a move of only
    ///     one side.
    /// [^fifty]: 50 __full__ moves
    halfmove_clock: u8,
    fullmove_counter: NonZeroU16,
    en_passant_square: Option<Square>,
    hash: Key,
}

/// Everything [`Position::play`] overwrites and [`Position::undo`] can not
/// infer from the move itself. Each value has to be passed back to `undo`
/// together with the move that produced it, in last-in-first-out order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct UndoInfo {
    captured: Option<PieceKind>,
    castling: CastleRights,
    en_passant_square: Option<Square>,
    halfmove_clock: u8,
    fullmove_counter: NonZeroU16,
    hash: Key,
}

impl Position {
    /// Creates the starting position of the standard chess variant.
    ///
    /// ```
    /// use stronkchess::chess::position::Position;
    ///
    /// let starting_position = Position::starting();
    /// assert_eq!(
    ///     &starting_position.to_string(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    /// );
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        let mut result = Self {
            board: Board::starting(),
            castling: CastleRights::ALL,
            ..Self::empty()
        };
        result.hash = result.compute_hash();
        result
    }

    // Creates an empty board to be filled by parser.
    const fn empty() -> Self {
        Self {
            board: Board::empty(),
            castling: CastleRights::NONE,
            side_to_move: Player::White,
            halfmove_clock: 0,
            fullmove_counter: NonZeroU16::MIN,
            en_passant_square: None,
            hash: 0,
        }
    }

    /// Parses board from Forsyth-Edwards Notation. It will also accept trimmed
    /// FEN (EPD with 4 parts).
    ///
    /// FEN ::=
    ///       Piece Placement
    ///   ' ' Side to move
    ///   ' ' Castling ability
    ///   ' ' En passant target square
    ///   ' ' Halfmove clock
    ///   ' ' Fullmove counter
    ///
    /// The last two parts (together) are optional and will default to "0 1".
    ///
    /// NOTE: This expects properly-formatted inputs: no extra symbols or
    /// additional whitespace. Use [`Position::try_from`] for cleaning up the
    /// input if it is coming from untrusted source and is likely to contain
    /// extra symbols.
    ///
    /// # Errors
    ///
    /// Structurally invalid input and positions that can not occur in a game
    /// (missing kings, pawns on the back ranks, the side not to move being in
    /// check, etc) are rejected. The error carries [`Error::MalformedSetup`]
    /// as context.
    pub fn from_fen(input: &str) -> anyhow::Result<Self> {
        Self::parse_fen(input)
            .and_then(Self::finish_setup)
            .context(Error::MalformedSetup)
    }

    fn parse_fen(input: &str) -> anyhow::Result<Self> {
        let mut parts = input.split(' ');
        let mut result = Self::empty();
        let Some(pieces_placement) = parts.next() else {
            bail!("incorrect FEN: missing pieces placement");
        };
        let mut rank_id = BOARD_WIDTH;
        for rank_fen in pieces_placement.split('/') {
            if rank_id == 0 {
                bail!("incorrect FEN: expected 8 ranks, got {pieces_placement}");
            }
            rank_id -= 1;
            let rank = Rank::try_from(rank_id)?;
            let mut file: u8 = 0;
            for symbol in rank_fen.chars() {
                if file >= BOARD_WIDTH {
                    bail!("incorrect FEN: rank {rank_fen} is longer than {BOARD_WIDTH} squares");
                }
                match symbol {
                    '0' | '9' => bail!("increment should be within 1..=8, got {symbol}"),
                    '1'..='8' => {
                        file += symbol as u8 - b'0';
                        continue;
                    },
                    _ => (),
                }
                let piece = Piece::try_from(symbol)?;
                result
                    .board
                    .toggle(piece, Square::new(File::try_from(file)?, rank));
                file += 1;
            }
            if file != BOARD_WIDTH {
                bail!(
                    "incorrect FEN: rank size should be exactly {BOARD_WIDTH}, got {rank_fen} of \
                     length {file}"
                );
            }
        }
        if rank_id != 0 {
            bail!("incorrect FEN: there should be 8 ranks, got {pieces_placement}");
        }
        result.side_to_move = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("incorrect FEN: missing side to move"),
        };
        result.castling = match parts.next() {
            Some(value) => value.try_into()?,
            None => bail!("incorrect FEN: missing castling rights"),
        };
        result.en_passant_square = match parts.next() {
            Some("-") => None,
            Some(value) => Some(value.try_into()?),
            None => bail!("incorrect FEN: missing en passant square"),
        };
        result.halfmove_clock = match parts.next() {
            Some(value) => {
                if !value.bytes().all(|c| c.is_ascii_digit()) {
                    bail!("halfmove clock can not contain anything other than digits");
                }
                // Saturates the same way playing moves does.
                value.parse::<u8>().unwrap_or(u8::MAX)
            },
            // This is a correct EPD: exit early.
            None => return Ok(result),
        };
        result.fullmove_counter = match parts.next() {
            Some(value) => {
                if !value.bytes().all(|c| c.is_ascii_digit()) {
                    bail!("fullmove counter can not contain anything other than digits");
                }
                value.parse::<NonZeroU16>().with_context(|| {
                    format!("incorrect FEN: fullmove counter can not be parsed {value}")
                })?
            },
            None => bail!("incorrect FEN: missing fullmove counter"),
        };
        match parts.next() {
            None => Ok(result),
            Some(_) => bail!("trailing symbols are not allowed in FEN"),
        }
    }

    // Checks that the parsed position can occur in a game, drops an en passant
    // square nobody can capture on and computes the hash.
    fn finish_setup(mut self) -> anyhow::Result<Self> {
        let (us, they) = (self.us(), self.they());
        for player in [Player::White, Player::Black] {
            let kings = self.board.player_pieces(player).king.count();
            if kings != 1 {
                bail!("expected exactly one {player:?} king, got {kings}");
            }
        }
        let pawns = self.board.white_pieces.pawns | self.board.black_pieces.pawns;
        if (pawns & (Rank::One.mask() | Rank::Eight.mask())).has_any() {
            bail!("pawns can not be placed on the first or the last rank");
        }
        for (right, king, rook) in [
            (CastleRights::WHITE_SHORT, Square::E1, Square::H1),
            (CastleRights::WHITE_LONG, Square::E1, Square::A1),
            (CastleRights::BLACK_SHORT, Square::E8, Square::H8),
            (CastleRights::BLACK_LONG, Square::E8, Square::A8),
        ] {
            let owner = if CastleRights::WHITE_BOTH.contains(right) {
                Player::White
            } else {
                Player::Black
            };
            let pieces = self.board.player_pieces(owner);
            if self.castling.contains(right)
                && !(pieces.king.contains(king) && pieces.rooks.contains(rook))
            {
                bail!("castling rights {right:?} require the king on {king} and the rook on {rook}");
            }
        }
        let occupancy = self.board.occupancy();
        let their_king = self.board.player_pieces(they).king.as_square();
        if attacks::is_attacked(their_king, us, occupancy, &self.board) {
            bail!("{they:?} king can not be in check when {us:?} is to move");
        }
        let checkers = AttackInfo::new(&self.board, us).checkers;
        if checkers.count() > 2 {
            bail!("more than two pieces can not check the king, got {}", checkers.count());
        }
        if let Some(en_passant_square) = self.en_passant_square {
            if en_passant_square.rank() != Rank::en_passant(us) {
                bail!("en passant square {en_passant_square} is on the wrong rank");
            }
            let target = Bitboard::from(en_passant_square);
            let pushed_pawn = target.shift(they.push_direction());
            let original_square = target.shift(us.push_direction());
            if (self.board.player_pieces(they).pawns & pushed_pawn).is_empty() {
                bail!("en passant square {en_passant_square} requires a pawn pushed past it");
            }
            if (occupancy & (target | original_square)).has_any() {
                bail!("en passant square {en_passant_square} and the square behind it should be empty");
            }
            if !self.is_en_passant_capturable(en_passant_square) {
                self.en_passant_square = None;
            }
        }
        self.hash = self.compute_hash();
        Ok(self)
    }

    /// Returns the legal moves of the side to move.
    #[must_use]
    pub fn generate_moves(&self) -> MoveList {
        movegen::generate_moves(self)
    }

    /// Returns true if the king of the side to move is attacked.
    #[must_use]
    pub fn in_check(&self) -> bool {
        let king = self.board.player_pieces(self.us()).king.as_square();
        attacks::is_attacked(king, self.they(), self.board.occupancy(), &self.board)
    }

    /// Maps coordinate notation (e.g. "e2e4", "e7e8q") to the legal move of
    /// this position with the same origin, destination and promotion.
    ///
    /// # Errors
    ///
    /// The error carries [`Error::IllegalMoveToken`] as context if the token
    /// is malformed or does not match any legal move.
    pub fn parse_move(&self, token: &str) -> anyhow::Result<Move> {
        let uci = UciMove::try_from(token).context(Error::IllegalMoveToken)?;
        self.generate_moves()
            .into_iter()
            .find(|m| m.from() == uci.from && m.to() == uci.to && m.promotion() == uci.promotion)
            .with_context(|| format!("{token} is not a legal move in {self}"))
            .context(Error::IllegalMoveToken)
    }

    /// Applies a move of the side to move and returns the information needed
    /// to take it back. The move has to be generated for this position: ad-hoc
    /// moves are not checked for legality.
    ///
    /// # Panics
    ///
    /// If there is no piece of the side to move on the move's origin. The
    /// position is corrupt (or the move is not from this position) and
    /// continuing would produce meaningless results.
    pub fn play(&mut self, next_move: Move) -> UndoInfo {
        let (us, they) = (self.us(), self.they());
        let (from, to) = (next_move.from(), next_move.to());
        let Some(moving) = self.board.player_pieces(us).at(from) else {
            panic!("no {us:?} piece on {from} for {next_move:?}:\n{self:?}");
        };
        let captured = if next_move.is_en_passant() {
            Some(PieceKind::Pawn)
        } else if next_move.is_capture() {
            self.board.player_pieces(they).at(to)
        } else {
            None
        };
        let undo = UndoInfo {
            captured,
            castling: self.castling,
            en_passant_square: self.en_passant_square,
            halfmove_clock: self.halfmove_clock,
            fullmove_counter: self.fullmove_counter,
            hash: self.hash,
        };

        if let Some(square) = self.en_passant_square.take() {
            self.hash ^= zobrist::en_passant_key(square);
        }

        if let Some(kind) = captured {
            let square = if next_move.is_en_passant() {
                Square::new(to.file(), from.rank())
            } else {
                to
            };
            self.toggle(Piece { owner: they, kind }, square);
        }

        self.toggle(Piece { owner: us, kind: moving }, from);
        let placed = next_move.promotion().unwrap_or(moving);
        self.toggle(Piece { owner: us, kind: placed }, to);

        if next_move.is_castle() {
            let (rook_from, rook_to) = Self::castling_rook_squares(next_move);
            let rook = Piece {
                owner: us,
                kind: PieceKind::Rook,
            };
            self.toggle(rook, rook_from);
            self.toggle(rook, rook_to);
        }

        let castling =
            self.castling - CastleRights::revoked_by(from) - CastleRights::revoked_by(to);
        self.hash ^= zobrist::castling_key(self.castling) ^ zobrist::castling_key(castling);
        self.castling = castling;

        if next_move.is_double_pawn_push() {
            let skipped = Square::from_index((from as u8 + to as u8) / 2);
            if (attacks::pawn_attacks(skipped, us) & self.board.player_pieces(they).pawns)
                .has_any()
            {
                self.en_passant_square = Some(skipped);
                self.hash ^= zobrist::en_passant_key(skipped);
            }
        }

        self.halfmove_clock = if moving == PieceKind::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        if us == Player::Black {
            self.fullmove_counter = self.fullmove_counter.saturating_add(1);
        }

        self.side_to_move = they;
        self.hash ^= zobrist::side_key();
        debug_assert_eq!(self.hash, self.compute_hash(), "{next_move:?}\n{self:?}");
        undo
    }

    /// Takes back the move that produced `undo`. The move has to be the last
    /// one played that was not taken back yet.
    ///
    /// # Panics
    ///
    /// If the move's destination is empty: the move and the position do not
    /// belong together.
    pub fn undo(&mut self, last_move: Move, undo: UndoInfo) {
        let us = self.they();
        let they = self.us();
        let (from, to) = (last_move.from(), last_move.to());

        if last_move.is_castle() {
            let (rook_from, rook_to) = Self::castling_rook_squares(last_move);
            let rook = Piece {
                owner: us,
                kind: PieceKind::Rook,
            };
            self.board.toggle(rook, rook_to);
            self.board.toggle(rook, rook_from);
        }

        let Some(placed) = self.board.player_pieces(us).at(to) else {
            panic!("no {us:?} piece on {to} to take {last_move:?} back:\n{self:?}");
        };
        let moved = if last_move.promotion().is_some() {
            PieceKind::Pawn
        } else {
            placed
        };
        self.board.toggle(Piece { owner: us, kind: placed }, to);
        self.board.toggle(Piece { owner: us, kind: moved }, from);

        if let Some(kind) = undo.captured {
            let square = if last_move.is_en_passant() {
                Square::new(to.file(), from.rank())
            } else {
                to
            };
            self.board.toggle(Piece { owner: they, kind }, square);
        }

        self.side_to_move = us;
        self.castling = undo.castling;
        self.en_passant_square = undo.en_passant_square;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_counter = undo.fullmove_counter;
        self.hash = undo.hash;
        debug_assert_eq!(self.hash, self.compute_hash(), "{last_move:?}\n{self:?}");
    }

    /// Re-checks the internal invariants: piece sets are disjoint, the cached
    /// occupancy matches the pieces, each side has exactly one king and the
    /// incrementally maintained hash matches a from-scratch computation.
    ///
    /// # Errors
    ///
    /// The first violated invariant, with [`Error::InvariantViolation`] as
    /// context.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.check_invariants().context(Error::InvariantViolation)
    }

    fn check_invariants(&self) -> anyhow::Result<()> {
        for player in [Player::White, Player::Black] {
            let pieces = self.board.player_pieces(player);
            let mut union = Bitboard::empty();
            let mut total = 0;
            for kind in PieceKind::ALL {
                let bitboard = pieces.bitboard_for(kind);
                union |= bitboard;
                total += bitboard.count();
            }
            if total != union.count() {
                bail!("{player:?} piece sets overlap");
            }
            if union != pieces.all() {
                bail!("cached {player:?} occupancy does not match the pieces");
            }
            if pieces.king.count() != 1 {
                bail!("{player:?} should have exactly one king, got {}", pieces.king.count());
            }
        }
        if (self.board.white_pieces.all() & self.board.black_pieces.all()).has_any() {
            bail!("white and black pieces overlap");
        }
        let expected = self.compute_hash();
        if self.hash != expected {
            bail!("hash drifted: {:016x}, expected {expected:016x}", self.hash);
        }
        Ok(())
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn castling(&self) -> CastleRights {
        self.castling
    }

    /// The square a pawn can capture en passant onto, if any.
    #[must_use]
    pub const fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn halfmove_clock(&self) -> u8 {
        self.halfmove_clock
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn fullmove_counter(&self) -> NonZeroU16 {
        self.fullmove_counter
    }

    /// Zobrist hash of the position (counters are not included).
    #[must_use]
    pub const fn hash(&self) -> Key {
        self.hash
    }

    pub(super) const fn us(&self) -> Player {
        self.side_to_move
    }

    pub(super) const fn they(&self) -> Player {
        self.side_to_move.opponent()
    }

    fn compute_hash(&self) -> Key {
        zobrist::compute(
            &self.board,
            self.side_to_move,
            self.castling,
            self.en_passant_square,
        )
    }

    fn toggle(&mut self, piece: Piece, square: Square) {
        self.board.toggle(piece, square);
        self.hash ^= zobrist::piece_key(piece, square);
    }

    fn is_en_passant_capturable(&self, square: Square) -> bool {
        (attacks::pawn_attacks(square, self.they()) & self.board.player_pieces(self.us()).pawns)
            .has_any()
    }

    // The king's destination determines the side.
    fn castling_rook_squares(castle: Move) -> (Square, Square) {
        let rank = castle.to().rank();
        if castle.flags() == MoveFlags::KINGSIDE_CASTLE {
            (Square::new(File::H, rank), Square::new(File::F, rank))
        } else {
            (Square::new(File::A, rank), Square::new(File::D, rank))
        }
    }
}

impl TryFrom<&str> for Position {
    type Error = anyhow::Error;

    /// Trims the input and strips an optional "fen " or "epd " prefix before
    /// parsing it with [`Position::from_fen`].
    fn try_from(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        for prefix in ["fen ", "epd "] {
            if let Some(stripped) = input.strip_prefix(prefix) {
                return Self::from_fen(stripped);
            }
        }
        Self::from_fen(input)
    }
}

impl fmt::Display for Position {
    /// Prints board in Forsyth-Edwards Notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", &self.board)?;
        write!(f, "{} ", &self.side_to_move)?;
        write!(f, "{} ", &self.castling)?;
        match self.en_passant_square {
            Some(square) => write!(f, "{square} "),
            None => write!(f, "- "),
        }?;
        write!(f, "{} ", &self.halfmove_clock)?;
        write!(f, "{}", &self.fullmove_counter)?;
        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:?}", &self.board)?;
        writeln!(f, "Player to move: {:?}", &self.side_to_move)?;
        writeln!(f, "Fullmove counter: {:?}", &self.fullmove_counter)?;
        writeln!(f, "En Passant: {:?}", &self.en_passant_square)?;
        // bitflags' default fmt::Debug implementation is not very convenient:
        // dump FEN instead.
        writeln!(f, "Castling rights: {}", &self.castling)?;
        writeln!(f, "Hash: {:016x}", self.hash)?;
        writeln!(f, "FEN: {self}")?;
        Ok(())
    }
}
