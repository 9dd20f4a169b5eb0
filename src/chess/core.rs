//! Chess primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};
use std::mem;

use anyhow::bail;
use arrayvec::ArrayVec;
use itertools::Itertools;

use crate::chess::bitboard::Bitboard;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Upper bound on the number of legal moves in any reachable position (the
/// known maximum is 218).
pub const MAX_MOVES: usize = 256;

/// Legal moves of a single position. Lives on the stack: one list per ply of
/// the traversal, regenerated for every position and never reused.
pub type MoveList = ArrayVec<Move, MAX_MOVES>;

bitflags::bitflags! {
    /// The "special" part of a [`Move`]: everything that can not be inferred
    /// from the origin and destination squares alone and is required to make
    /// and unmake the move without looking at the board.
    ///
    /// The values resemble a common [Move Encoding] technique:
    ///
    /// | Index | Promotion | Capture | MSB Special | LSB Special | Move Kind |
    /// | ----- | --------- | ------- | ----------- | ----------- | --------- |
    /// | 0  | 0 | 0 | 0 | 0 | Quiet move |
    /// | 1  | 0 | 0 | 0 | 1 | Double pawn push |
    /// | 2  | 0 | 0 | 1 | 0 | Kingside castle (short castle or O-O) |
    /// | 3  | 0 | 0 | 1 | 1 | Queenside castle (long castle or O-O-O) |
    /// | 4  | 0 | 1 | 0 | 0 | Capture |
    /// | 5  | 0 | 1 | 0 | 1 | En Passant capture |
    /// | 8  | 1 | 0 | 0 | 0 | Knight promotion |
    /// | 9  | 1 | 0 | 0 | 1 | Bishop promotion |
    /// | 10 | 1 | 0 | 1 | 0 | Rook promotion |
    /// | 11 | 1 | 0 | 1 | 1 | Queen promotion |
    /// | 12 | 1 | 1 | 0 | 0 | Capture and knight promotion |
    /// | 13 | 1 | 1 | 0 | 1 | Capture and bishop promotion |
    /// | 14 | 1 | 1 | 1 | 0 | Capture and rook promotion |
    /// | 15 | 1 | 1 | 1 | 1 | Capture and queen promotion |
    ///
    /// Kinds are compared for equality (e.g. en passant also "contains" the
    /// double pawn push bit), single bits are only queried for
    /// [`MoveFlags::CAPTURE`] and [`MoveFlags::PROMOTION`].
    ///
    /// [Move Encoding]: https://www.chessprogramming.org/Encoding_Moves
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u8 {
        /// Moves that do not change the material balance.
        const QUIET = 0;

        /// Implementation detail.
        const MSB_SPECIAL = 0b0010;
        /// Implementation detail.
        const LSB_SPECIAL = 0b0001;

        /// Pawn advancement by 2 squares from the original rank (second for
        /// white and seventh for black).
        const DOUBLE_PAWN_PUSH = Self::LSB_SPECIAL.bits();
        /// Short castle or O-O.
        const KINGSIDE_CASTLE = Self::MSB_SPECIAL.bits();
        /// Long castle or O-O-O.
        const QUEENSIDE_CASTLE = Self::MSB_SPECIAL.bits() | Self::LSB_SPECIAL.bits();

        /// Moves that change the material balance.
        const CAPTURE = 0b0100;
        /// Capture of a pawn that has just been pushed by two squares "in
        /// passing".
        const EN_PASSANT = Self::CAPTURE.bits() | Self::LSB_SPECIAL.bits();

        /// Pawn move to the opponent's "home" rank. The two special bits
        /// select the piece.
        const PROMOTION = 0b1000;

        /// Pawn promotion to [`PieceKind::Knight`].
        const KNIGHT_PROMOTION = Self::PROMOTION.bits();
        /// Pawn promotion to [`PieceKind::Bishop`].
        const BISHOP_PROMOTION = Self::PROMOTION.bits() | Self::LSB_SPECIAL.bits();
        /// Pawn promotion to [`PieceKind::Rook`].
        const ROOK_PROMOTION = Self::PROMOTION.bits() | Self::MSB_SPECIAL.bits();
        /// Pawn promotion to [`PieceKind::Queen`].
        const QUEEN_PROMOTION = Self::PROMOTION.bits()
            | Self::MSB_SPECIAL.bits()
            | Self::LSB_SPECIAL.bits();
    }
}

impl MoveFlags {
    /// All promotion targets in the order the generator emits them.
    pub(super) const PROMOTIONS: [Self; 4] = [
        Self::QUEEN_PROMOTION,
        Self::ROOK_PROMOTION,
        Self::BISHOP_PROMOTION,
        Self::KNIGHT_PROMOTION,
    ];

    fn special_bits(self) -> u8 {
        self.bits() & (Self::MSB_SPECIAL.bits() | Self::LSB_SPECIAL.bits())
    }
}

/// Represents any kind of a legal chess move. A move is the only way to mutate
/// [`crate::chess::position::Position`] and change the board state. Moves are
/// not sorted according to their potential "value" by the move generator.
///
/// The move is packed into 16 bits: origin square (bits 0-5), destination
/// square (bits 6-11) and [`MoveFlags`] (bits 12-15). Castling is a king move,
/// so `from` and `to` correspond to the king. The textual form (see
/// [`fmt::Display`]) has one-to-one correspondence with the UCI move
/// representation.
///
/// ```
/// use stronkchess::chess::core::{Move, MoveFlags, Square};
///
/// let m = Move::new(Square::E2, Square::E4, MoveFlags::DOUBLE_PAWN_PUSH);
/// assert_eq!(m.from(), Square::E2);
/// assert_eq!(m.to(), Square::E4);
/// assert_eq!(m.to_string(), "e2e4");
/// assert_eq!(std::mem::size_of::<Move>(), 2);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    bits: u16,
}

impl Move {
    const SQUARE_MASK: u16 = 0b11_1111;
    const TO_SHIFT: u16 = 6;
    const FLAGS_SHIFT: u16 = 12;

    #[must_use]
    #[allow(missing_docs)]
    pub const fn new(from: Square, to: Square, flags: MoveFlags) -> Self {
        Self {
            bits: from as u16
                | ((to as u16) << Self::TO_SHIFT)
                | ((flags.bits() as u16) << Self::FLAGS_SHIFT),
        }
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn from(self) -> Square {
        Square::from_index((self.bits & Self::SQUARE_MASK) as u8)
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn to(self) -> Square {
        Square::from_index(((self.bits >> Self::TO_SHIFT) & Self::SQUARE_MASK) as u8)
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn flags(self) -> MoveFlags {
        MoveFlags::from_bits_retain((self.bits >> Self::FLAGS_SHIFT) as u8)
    }

    /// Returns true for regular captures, en passant and capturing promotions.
    #[must_use]
    pub fn is_capture(self) -> bool {
        self.flags().contains(MoveFlags::CAPTURE)
    }

    #[must_use]
    #[allow(missing_docs)]
    pub fn is_en_passant(self) -> bool {
        self.flags() == MoveFlags::EN_PASSANT
    }

    #[must_use]
    #[allow(missing_docs)]
    pub fn is_double_pawn_push(self) -> bool {
        self.flags() == MoveFlags::DOUBLE_PAWN_PUSH
    }

    /// Returns true for both kingside and queenside castling.
    #[must_use]
    pub fn is_castle(self) -> bool {
        matches!(
            self.flags(),
            MoveFlags::KINGSIDE_CASTLE | MoveFlags::QUEENSIDE_CASTLE
        )
    }

    /// Returns the piece a pawn is promoted to, if this move is a promotion.
    #[must_use]
    pub fn promotion(self) -> Option<PieceKind> {
        let flags = self.flags();
        if !flags.contains(MoveFlags::PROMOTION) {
            return None;
        }
        Some(match flags.special_bits() {
            0b00 => PieceKind::Knight,
            0b01 => PieceKind::Bishop,
            0b10 => PieceKind::Rook,
            _ => PieceKind::Queen,
        })
    }
}

impl fmt::Display for Move {
    /// Serializes a move in [UCI format].
    ///
    /// [UCI format]: http://wbec-ridderkerk.nl/html/UCIProtocol.html
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(promotion) = self.promotion() {
            write!(f, "{promotion}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({:?})", self.flags())
    }
}

/// Origin, destination and optional promotion parsed from the coordinate
/// notation (e.g. "e2e4", "e7e8q"). This is not a [`Move`] yet: the special
/// flags depend on the position the text is applied to, see
/// [`crate::chess::position::Position::parse_move`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UciMove {
    #[allow(missing_docs)]
    pub from: Square,
    #[allow(missing_docs)]
    pub to: Square,
    #[allow(missing_docs)]
    pub promotion: Option<PieceKind>,
}

impl TryFrom<&str> for UciMove {
    type Error = anyhow::Error;

    fn try_from(token: &str) -> anyhow::Result<Self> {
        if !token.is_ascii() || !(4..=5).contains(&token.len()) {
            bail!("move should be 4 or 5 ASCII chars (e.g. e2e4, e7e8q), got '{token}'");
        }
        let from = Square::try_from(&token[0..2])?;
        let to = Square::try_from(&token[2..4])?;
        let promotion = match token.as_bytes().get(4) {
            None => None,
            Some(b'q') => Some(PieceKind::Queen),
            Some(b'r') => Some(PieceKind::Rook),
            Some(b'b') => Some(PieceKind::Bishop),
            Some(b'n') => Some(PieceKind::Knight),
            Some(&symbol) => bail!(
                "promotion should be one of 'qrbn', got '{}'",
                symbol as char
            ),
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

/// Board squares: from left to right, from bottom to the top:
///
/// ```
/// use stronkchess::chess::core::Square;
///
/// assert_eq!(Square::A1 as u8, 0);
/// assert_eq!(Square::E1 as u8, 4);
/// assert_eq!(Square::H1 as u8, 7);
/// assert_eq!(Square::A4 as u8, 8 * 3);
/// assert_eq!(Square::H8 as u8, 63);
/// ```
///
/// Square is a compact representation using only one byte.
///
/// ```
/// use stronkchess::chess::core::Square;
/// use std::mem;
///
/// assert_eq!(std::mem::size_of::<Square>(), 1);
/// ```
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square.
    #[must_use]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self::from_index(file as u8 + (rank as u8) * BOARD_WIDTH)
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub const fn file(self) -> File {
        unsafe { mem::transmute(self as u8 % BOARD_WIDTH) }
    }

    /// Returns rank (row) on which the square is located.
    #[must_use]
    pub const fn rank(self) -> Rank {
        unsafe { mem::transmute(self as u8 / BOARD_WIDTH) }
    }

    /// Iterates over all squares from A1 to H8.
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).map(Self::from_index)
    }

    // Callers guarantee the index is within 0..BOARD_SIZE: they either mask
    // it out of a 6-bit field or get it from a bit scan of a u64.
    pub(crate) const fn from_index(index: u8) -> Self {
        debug_assert!(index < BOARD_SIZE);
        unsafe { mem::transmute(index & (BOARD_SIZE - 1)) }
    }
}

impl TryFrom<u8> for Square {
    type Error = anyhow::Error;

    /// Creates a square given its position on the board.
    ///
    /// # Errors
    ///
    /// If given square index is outside 0..[`BOARD_SIZE`] range.
    fn try_from(square_index: u8) -> anyhow::Result<Self> {
        // Exclusive range patterns are not allowed:
        // https://github.com/rust-lang/rust/issues/37854
        const MAX_INDEX: u8 = BOARD_SIZE - 1;
        match square_index {
            0..=MAX_INDEX => Ok(Self::from_index(square_index)),
            _ => bail!("square index should be in 0..BOARD_SIZE, got {square_index}"),
        }
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(square: &str) -> anyhow::Result<Self> {
        let (file, rank) = match square.chars().collect_tuple() {
            Some((file, rank)) => (file, rank),
            None => bail!(
                "square should be two-char, got {square} with {} chars",
                square.chars().count()
            ),
        };
        Ok(Self::new(file.try_into()?, rank.try_into()?))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Represents a column (vertical row) of the chessboard. In chess notation, it
/// is normally represented with a lowercase letter.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    /// All files from A to H.
    pub const ALL: [Self; BOARD_WIDTH as usize] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
    ];
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char((b'a' + *self as u8) as char)
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;

    fn try_from(file: char) -> anyhow::Result<Self> {
        match file {
            'a'..='h' => Ok(Self::ALL[(file as u8 - b'a') as usize]),
            _ => bail!("file should be within 'a'..='h', got '{file}'"),
        }
    }
}

impl TryFrom<u8> for File {
    type Error = anyhow::Error;

    fn try_from(column: u8) -> anyhow::Result<Self> {
        match column {
            0..=7 => Ok(Self::ALL[column as usize]),
            _ => bail!("file should be within 0..BOARD_WIDTH, got {column}"),
        }
    }
}

/// Represents a horizontal row of the chessboard. In chess notation, it is
/// represented with a number. The implementation assumes zero-based values
/// (i.e. rank 1 would be 0).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Rank {
    One = 0,
    Two = 1,
    Three = 2,
    Four = 3,
    Five = 4,
    Six = 5,
    Seven = 6,
    Eight = 7,
}

impl Rank {
    /// All ranks from the first to the eighth.
    pub const ALL: [Self; BOARD_WIDTH as usize] = [
        Self::One,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
    ];

    /// Returns a pre-calculated bitboard mask with 1s set for squares of the
    /// given rank.
    #[must_use]
    pub const fn mask(self) -> Bitboard {
        Bitboard::from_bits(0xFF << (self as u8 * BOARD_WIDTH))
    }

    pub(super) const fn backrank(player: Player) -> Self {
        match player {
            Player::White => Self::One,
            Player::Black => Self::Eight,
        }
    }

    pub(super) const fn pawns_starting(player: Player) -> Self {
        match player {
            Player::White => Self::Two,
            Player::Black => Self::Seven,
        }
    }

    // Rank the opponent's pawn lands on after a double push, i.e. the rank of
    // the en passant target square when `player` is to move.
    pub(super) const fn en_passant(player: Player) -> Self {
        match player {
            Player::White => Self::Six,
            Player::Black => Self::Three,
        }
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: char) -> anyhow::Result<Self> {
        match rank {
            '1'..='8' => Ok(Self::ALL[(rank as u8 - b'1') as usize]),
            _ => bail!("rank should be within '1'..='8', got '{rank}'"),
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = anyhow::Error;

    fn try_from(row: u8) -> anyhow::Result<Self> {
        match row {
            0..=7 => Ok(Self::ALL[row as usize]),
            _ => bail!("rank should be within 0..BOARD_WIDTH, got {row}"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub(super) const fn push_direction(self) -> Direction {
        match self {
            Self::White => Direction::Up,
            Self::Black => Direction::Down,
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("player should be 'w' or 'b', got '{player}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match &self {
            Self::White => 'w',
            Self::Black => 'b',
        })
    }
}

/// Standard [chess pieces].
///
/// The discriminants are used as indices into per-kind tables (e.g. Zobrist
/// keys), hence the explicit ordering.
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PieceKind {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceKind {
    /// All piece kinds in the index order.
    pub const ALL: [Self; 6] = [
        Self::Pawn,
        Self::Knight,
        Self::Bishop,
        Self::Rook,
        Self::Queen,
        Self::King,
    ];
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match &self {
            Self::King => 'k',
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
            Self::Pawn => 'p',
        })
    }
}

/// Represents a specific piece owned by a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    #[allow(missing_docs)]
    pub owner: Player,
    #[allow(missing_docs)]
    pub kind: PieceKind,
}

impl TryFrom<char> for Piece {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        let kind = match symbol.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => bail!("piece symbol should be within \"KQRBNPkqrbnp\", got '{symbol}'"),
        };
        let owner = if symbol.is_ascii_uppercase() {
            Player::White
        } else {
            Player::Black
        };
        Ok(Self { owner, kind })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // White player: uppercase symbols, black player: lowercase symbols.
        let symbol = self.kind.to_string();
        match self.owner {
            Player::White => f.write_str(&symbol.to_ascii_uppercase()),
            Player::Black => f.write_str(&symbol),
        }
    }
}

bitflags::bitflags! {
    /// Track the ability to [castle] each side (kingside is often referred to
    /// as O-O or h-side castle, queenside -- O-O-O or a-side castle). When the
    /// king moves, player loses ability to castle both sides. When the rook
    /// moves or is captured, player loses ability to castle its corresponding
    /// side.
    ///
    /// - When castling h-side (short), the king ends up on [`File::G`] and the
    ///   rook on [`File::F`]
    /// - When castling a-side (long), the king ends up on [`File::C`] and the
    ///   rook on [`File::D`]
    ///
    /// The full rules are:
    ///
    /// - The king and the castling rook must not have previously moved.
    /// - No square from the king's initial square to its final square may be under
    ///   attack by an enemy piece.
    /// - All the squares between the king's initial and final squares
    ///   (including the final square), and all the squares between the castling
    ///   rook's initial and final squares (including the final square), must be
    ///   vacant except for the king and castling rook.
    ///
    /// [castle]: https://www.chessprogramming.org/Castling
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CastleRights : u8 {
        #[allow(missing_docs)]
        const NONE = 0;
        #[allow(missing_docs)]
        const WHITE_SHORT = 0b1000;
        #[allow(missing_docs)]
        const WHITE_LONG = 0b0100;
        #[allow(missing_docs)]
        const WHITE_BOTH = Self::WHITE_SHORT.bits() | Self::WHITE_LONG.bits();
        #[allow(missing_docs)]
        const BLACK_SHORT = 0b0010;
        #[allow(missing_docs)]
        const BLACK_LONG = 0b0001;
        #[allow(missing_docs)]
        const BLACK_BOTH = Self::BLACK_SHORT.bits() | Self::BLACK_LONG.bits();
        #[allow(missing_docs)]
        const ALL = Self::WHITE_BOTH.bits() | Self::BLACK_BOTH.bits();
    }
}

impl CastleRights {
    /// Individual rights in the order of their Zobrist keys.
    pub(super) const EACH: [Self; 4] = [
        Self::WHITE_SHORT,
        Self::WHITE_LONG,
        Self::BLACK_SHORT,
        Self::BLACK_LONG,
    ];

    pub(super) const fn short(player: Player) -> Self {
        match player {
            Player::White => Self::WHITE_SHORT,
            Player::Black => Self::BLACK_SHORT,
        }
    }

    pub(super) const fn long(player: Player) -> Self {
        match player {
            Player::White => Self::WHITE_LONG,
            Player::Black => Self::BLACK_LONG,
        }
    }

    /// Rights revoked by any move that starts or ends on the given square:
    /// moving the king or a rook from its original square, or capturing a
    /// rook there.
    pub(super) const fn revoked_by(square: Square) -> Self {
        match square {
            Square::E1 => Self::WHITE_BOTH,
            Square::H1 => Self::WHITE_SHORT,
            Square::A1 => Self::WHITE_LONG,
            Square::E8 => Self::BLACK_BOTH,
            Square::H8 => Self::BLACK_SHORT,
            Square::A8 => Self::BLACK_LONG,
            _ => Self::NONE,
        }
    }
}

impl TryFrom<&str> for CastleRights {
    type Error = anyhow::Error;

    /// Parses [`CastleRights`] for both players from the FEN format. The user
    /// is responsible for providing valid input cleaned up from the actual FEN
    /// chunk.
    ///
    /// # Errors
    ///
    /// Returns [`anyhow::Error`] if given pattern does not match
    ///
    /// [`CastleRights`] := (K)? (Q)? (k)? (q)?
    ///
    /// Note that both letters have to be either uppercase or lowercase.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        if input == "-" {
            return Ok(Self::NONE);
        }
        let mut result = Self::NONE;
        let mut remaining = input;
        for (symbol, right) in [
            ('K', Self::WHITE_SHORT),
            ('Q', Self::WHITE_LONG),
            ('k', Self::BLACK_SHORT),
            ('q', Self::BLACK_LONG),
        ] {
            if let Some(rest) = remaining.strip_prefix(symbol) {
                result |= right;
                remaining = rest;
            }
        }
        if result == Self::NONE || !remaining.is_empty() {
            bail!("unknown castle rights: {input}");
        }
        Ok(result)
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            return f.write_char('-');
        }
        if self.contains(Self::WHITE_SHORT) {
            f.write_char('K')?;
        }
        if self.contains(Self::WHITE_LONG) {
            f.write_char('Q')?;
        }
        if self.contains(Self::BLACK_SHORT) {
            f.write_char('k')?;
        }
        if self.contains(Self::BLACK_LONG) {
            f.write_char('q')?;
        }
        Ok(())
    }
}

/// Directions on the board from a perspective of White player. Only the ones
/// pawns are pushed in are needed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Also known as North.
    Up,
    /// Also known as South.
    Down,
}

impl Direction {
    pub(super) const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}
