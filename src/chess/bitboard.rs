//! [`Bitboard`]-based representation for [`crate::chess::position::Position`].
//! Bitboard utilizes the fact that modern processors operate on 64 bit
//! integers, and the bit operations can be performed simultaneously. This
//! results in very efficient calculation of possible attack vectors and other
//! meaningful features of the position. The disadvantage is complexity that
//! comes with bitboard implementation and inefficiency of some operations like
//! "get piece type on given square" (efficiently handled by Square-centric
//! board implementations).
//!
//! [Bitboard]: https://www.chessprogramming.org/Bitboards

use std::fmt::{self, Write};
use std::ops::{
    BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Sub, SubAssign,
};

use itertools::Itertools;

use crate::chess::core::{
    Direction, File, Piece, PieceKind, Player, Rank, Square, BOARD_WIDTH,
};

/// Represents a set of squares and provides common operations (e.g. AND, OR,
/// XOR) over these sets. Each bit corresponds to one of 64 squares of the chess
/// board.
///
/// Mirroring [`Square`] semantics, the least significant
/// bit corresponds to A1, and the most significant bit - to H8.
///
/// Bitboard is a thin wrapper around [u64].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Bitboard {
    bits: u64,
}

impl Bitboard {
    /// Constructs Bitboard from pre-calculated bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    /// Constructs a bitboard representing empty set of squares.
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_bits(0)
    }

    /// Constructs a bitboard representing the universal set, it contains all
    /// squares by setting all bits to binary one.
    #[must_use]
    pub const fn full() -> Self {
        Self::from_bits(u64::MAX)
    }

    /// Returns raw bits.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.bits
    }

    #[must_use]
    #[allow(missing_docs)]
    pub fn from_squares(squares: &[Square]) -> Self {
        squares
            .iter()
            .fold(Self::empty(), |result, square| result | Self::from(*square))
    }

    /// Returns true if this bitboard contains given square.
    #[must_use]
    pub const fn contains(self, square: Square) -> bool {
        (self.bits & (1u64 << square as u8)) != 0
    }

    /// Number of squares in the set.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.bits.count_ones()
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns true if the set has at least one square.
    #[must_use]
    pub const fn has_any(self) -> bool {
        self.bits != 0
    }

    /// Returns true if more than one square is set. Cheaper than counting
    /// when only a single blocker pins.
    #[must_use]
    pub const fn has_many(self) -> bool {
        (self.bits & self.bits.wrapping_sub(1)) != 0
    }

    /// Returns the only square in the set.
    ///
    /// The caller has to make sure the set is a singleton (e.g. the king
    /// bitboard).
    #[must_use]
    pub const fn as_square(self) -> Square {
        debug_assert!(self.bits.count_ones() == 1);
        Square::from_index(self.bits.trailing_zeros() as u8)
    }

    /// An efficient way to iterate over the set squares.
    #[must_use]
    pub const fn iter(self) -> BitboardIterator {
        BitboardIterator { bits: self.bits }
    }

    /// Moves every square one rank in the given direction. Squares pushed off
    /// the board disappear.
    #[must_use]
    pub const fn shift(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::from_bits(self.bits << BOARD_WIDTH),
            Direction::Down => Self::from_bits(self.bits >> BOARD_WIDTH),
        }
    }
}

impl fmt::Debug for Bitboard {
    /// Dumps the set as an 8x8 grid: rank 8 on top, '1' for set squares and
    /// '.' for the rest.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = Rank::ALL
            .iter()
            .rev()
            .map(|&rank| {
                File::ALL
                    .iter()
                    .map(|&file| {
                        if self.contains(Square::new(file, rank)) {
                            '1'
                        } else {
                            '.'
                        }
                    })
                    .join(SQUARE_SEPARATOR)
            })
            .join(LINE_SEPARATOR);
        f.write_str(&grid)
    }
}

impl BitOr for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits.bitor(rhs.bits))
    }
}

impl BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits.bitor_assign(rhs.bits);
    }
}

impl BitAnd for Bitboard {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits.bitand(rhs.bits))
    }
}

impl BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Self) {
        self.bits.bitand_assign(rhs.bits);
    }
}

impl BitXor for Bitboard {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits.bitxor(rhs.bits))
    }
}

impl BitXorAssign for Bitboard {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.bits.bitxor_assign(rhs.bits);
    }
}

impl Sub for Bitboard {
    type Output = Self;

    /// [Relative component], i.e. Result = LHS \ RHS.
    ///
    /// [Relative component]: https://en.wikipedia.org/wiki/Complement_%28set_theory%29#Relative_complement
    fn sub(self, rhs: Self) -> Self::Output {
        self & !rhs
    }
}

impl SubAssign for Bitboard {
    fn sub_assign(&mut self, rhs: Self) {
        self.bitand_assign(!rhs);
    }
}

impl Not for Bitboard {
    type Output = Self;

    /// Returns [complement
    /// set](https://en.wikipedia.org/wiki/Complement_%28set_theory%29) of Self,
    /// i.e. flipping the set squares to unset and vice versa.
    fn not(self) -> Self::Output {
        Self::from_bits(!self.bits)
    }
}

impl From<Square> for Bitboard {
    fn from(square: Square) -> Self {
        Self::from_bits(1u64 << square as u8)
    }
}

impl IntoIterator for Bitboard {
    type IntoIter = BitboardIterator;
    type Item = Square;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterates over set squares in a given [Bitboard] from least significant 1
/// bits (LS1B) to most significant 1 bits (MS1B) through implementing
/// [`BitScan`] forward operation.
///
/// [BitScan]: https://www.chessprogramming.org/BitScan
pub struct BitboardIterator {
    bits: u64,
}

impl Iterator for BitboardIterator {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        // Get the LS1B and consume it from the iterator.
        let next_index = self.bits.trailing_zeros();
        self.bits &= self.bits - 1;
        Some(Square::from_index(next_index as u8))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bits.count_ones() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitboardIterator {}

/// Piece-centric representation of all material owned by one player. Uses
/// [Bitboard] to store a set of squares occupied by each piece. The main user
/// is [`crate::chess::position::Position`], [Bitboard] is not very useful on
/// its own.
///
/// The union of all pieces is cached and kept in sync by [`Pieces::toggle`],
/// which is the only way to modify the set.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Pieces {
    pub(super) king: Bitboard,
    pub(super) queens: Bitboard,
    pub(super) rooks: Bitboard,
    pub(super) bishops: Bitboard,
    pub(super) knights: Bitboard,
    pub(super) pawns: Bitboard,
    all: Bitboard,
}

impl Pieces {
    pub(super) const fn empty() -> Self {
        Self {
            king: Bitboard::empty(),
            queens: Bitboard::empty(),
            rooks: Bitboard::empty(),
            bishops: Bitboard::empty(),
            knights: Bitboard::empty(),
            pawns: Bitboard::empty(),
            all: Bitboard::empty(),
        }
    }

    pub(super) fn new_white() -> Self {
        let mut pieces = Self::empty();
        pieces.place_backrank(Rank::One);
        for file in File::ALL {
            pieces.toggle(PieceKind::Pawn, Square::new(file, Rank::Two));
        }
        pieces
    }

    pub(super) fn new_black() -> Self {
        let mut pieces = Self::empty();
        pieces.place_backrank(Rank::Eight);
        for file in File::ALL {
            pieces.toggle(PieceKind::Pawn, Square::new(file, Rank::Seven));
        }
        pieces
    }

    fn place_backrank(&mut self, rank: Rank) {
        const BACKRANK: [PieceKind; BOARD_WIDTH as usize] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, kind) in File::ALL.into_iter().zip(BACKRANK) {
            self.toggle(kind, Square::new(file, rank));
        }
    }

    /// Union of all pieces of the player.
    #[must_use]
    pub const fn all(&self) -> Bitboard {
        self.all
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn bitboard_for(&self, kind: PieceKind) -> Bitboard {
        match kind {
            PieceKind::King => self.king,
            PieceKind::Queen => self.queens,
            PieceKind::Rook => self.rooks,
            PieceKind::Bishop => self.bishops,
            PieceKind::Knight => self.knights,
            PieceKind::Pawn => self.pawns,
        }
    }

    /// Adds the piece to the square if it is empty and removes it if the piece
    /// is already there.
    pub(super) fn toggle(&mut self, kind: PieceKind, square: Square) {
        let bit = Bitboard::from(square);
        let bitboard = match kind {
            PieceKind::King => &mut self.king,
            PieceKind::Queen => &mut self.queens,
            PieceKind::Rook => &mut self.rooks,
            PieceKind::Bishop => &mut self.bishops,
            PieceKind::Knight => &mut self.knights,
            PieceKind::Pawn => &mut self.pawns,
        };
        *bitboard ^= bit;
        self.all ^= bit;
    }

    /// Returns the kind of the piece standing on the square, if any.
    #[must_use]
    pub fn at(&self, square: Square) -> Option<PieceKind> {
        if !self.all.contains(square) {
            return None;
        }
        PieceKind::ALL
            .into_iter()
            .find(|&kind| self.bitboard_for(kind).contains(square))
    }
}

/// Piece-centric implementation of the chess board. This is the "back-end" of
/// the chess engine, an efficient board representation is crucial for
/// performance.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Board {
    pub(super) white_pieces: Pieces,
    pub(super) black_pieces: Pieces,
}

impl Board {
    #[must_use]
    pub(super) fn starting() -> Self {
        Self {
            white_pieces: Pieces::new_white(),
            black_pieces: Pieces::new_black(),
        }
    }

    // Constructs an empty Board to be filled by the position parser.
    #[must_use]
    pub(super) const fn empty() -> Self {
        Self {
            white_pieces: Pieces::empty(),
            black_pieces: Pieces::empty(),
        }
    }

    #[must_use]
    #[allow(missing_docs)]
    pub const fn player_pieces(&self, player: Player) -> &Pieces {
        match player {
            Player::White => &self.white_pieces,
            Player::Black => &self.black_pieces,
        }
    }

    pub(super) fn player_pieces_mut(&mut self, player: Player) -> &mut Pieces {
        match player {
            Player::White => &mut self.white_pieces,
            Player::Black => &mut self.black_pieces,
        }
    }

    /// Squares occupied by pieces of both players.
    #[must_use]
    pub const fn occupancy(&self) -> Bitboard {
        Bitboard::from_bits(self.white_pieces.all().bits() | self.black_pieces.all().bits())
    }

    /// Returns the piece standing on the square, if any.
    #[must_use]
    pub fn at(&self, square: Square) -> Option<Piece> {
        if let Some(kind) = self.white_pieces.at(square) {
            return Some(Piece {
                owner: Player::White,
                kind,
            });
        }
        self.black_pieces.at(square).map(|kind| Piece {
            owner: Player::Black,
            kind,
        })
    }

    pub(super) fn toggle(&mut self, piece: Piece, square: Square) {
        self.player_pieces_mut(piece.owner).toggle(piece.kind, square);
    }
}

impl fmt::Display for Board {
    /// Prints board representation in FEN format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.iter().rev() {
            let mut empty_squares = 0i32;
            for file in File::ALL {
                let square = Square::new(file, *rank);
                if let Some(piece) = self.at(square) {
                    if empty_squares != 0 {
                        write!(f, "{empty_squares}")?;
                        empty_squares = 0;
                    }
                    write!(f, "{piece}")?;
                } else {
                    empty_squares += 1;
                }
            }
            if empty_squares != 0 {
                write!(f, "{empty_squares}")?;
            }
            if *rank != Rank::One {
                const RANK_SEPARATOR: char = '/';
                f.write_char(RANK_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    /// Dumps the board in a simple format ('.' for empty square, FEN algebraic
    /// symbol for piece) a-la Stockfish "debug" command in UCI mode.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.iter().rev() {
            for file in File::ALL {
                match self.at(Square::new(file, *rank)) {
                    Some(piece) => write!(f, "{piece}"),
                    None => f.write_char('.'),
                }?;
                if file != File::H {
                    f.write_str(SQUARE_SEPARATOR)?;
                }
            }
            if *rank != Rank::One {
                f.write_str(LINE_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

const LINE_SEPARATOR: &str = "\n";
const SQUARE_SEPARATOR: &str = " ";

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Bitboard, Board, Pieces};
    use crate::chess::core::{Direction, Piece, PieceKind, Player, Rank, Square};

    #[test]
    fn basics() {
        assert_eq!(std::mem::size_of::<Bitboard>(), 8);
        assert_eq!(Bitboard::full().bits, u64::MAX);
        assert_eq!(Bitboard::empty().bits, u64::MIN);

        assert_eq!(Bitboard::from(Square::A1).bits, 1);
        assert_eq!(Bitboard::from(Square::B1).bits, 2);
        assert_eq!(Bitboard::from(Square::D1).bits, 8);
        assert_eq!(Bitboard::from(Square::H8).bits, 1u64 << 63);

        assert_eq!(
            Bitboard::from(Square::D1) | Bitboard::from(Square::B1),
            Bitboard::from_bits(0b10 | 0b1000)
        );

        let pair = Bitboard::from_squares(&[Square::C3, Square::F6]);
        assert!(pair.contains(Square::C3));
        assert!(!pair.contains(Square::C4));
        assert_eq!(pair.count(), 2);
        assert!(pair.has_many());
        assert!(!Bitboard::from(Square::C3).has_many());
        assert!(Bitboard::empty().is_empty());
        assert!(!Bitboard::empty().has_any());
        assert_eq!(Bitboard::from(Square::G7).as_square(), Square::G7);
    }

    #[test]
    fn set_basics() {
        // Create a starting position.
        let white = Pieces::new_white();
        let black = Pieces::new_black();

        // Check that each player has 16 pieces.
        assert_eq!(white.all().count(), 16);
        assert_eq!(black.all().count(), 16);
        // Check that each player has correct number of pieces (previous check
        // was not enough to confirm there are no overlaps).
        assert_eq!(white.king.count(), 1);
        assert_eq!(black.king.count(), 1);
        assert_eq!(white.queens.count(), 1);
        assert_eq!(black.queens.count(), 1);
        assert_eq!(white.rooks.count(), 2);
        assert_eq!(black.rooks.count(), 2);
        assert_eq!(white.bishops.count(), 2);
        assert_eq!(black.bishops.count(), 2);
        assert_eq!(white.knights.count(), 2);
        assert_eq!(black.knights.count(), 2);
        assert_eq!(white.pawns.count(), 8);
        assert_eq!(black.pawns.count(), 8);

        // Check few positions manually.
        assert_eq!(white.queens.bits, 1 << 3);
        assert_eq!(black.queens.bits, 1 << (3 + 8 * 7));

        assert_eq!(Rank::One.mask().shift(Direction::Up), Rank::Two.mask());
        assert_eq!(Rank::Five.mask().shift(Direction::Down), Rank::Four.mask());
        assert_eq!(Rank::Eight.mask().shift(Direction::Up), Bitboard::empty());
        assert_eq!(Rank::One.mask().shift(Direction::Down), Bitboard::empty());
    }

    #[test]
    fn toggle() {
        let mut pieces = Pieces::empty();
        pieces.toggle(PieceKind::Knight, Square::F3);
        assert_eq!(pieces.at(Square::F3), Some(PieceKind::Knight));
        assert_eq!(pieces.all(), Bitboard::from(Square::F3));
        pieces.toggle(PieceKind::Knight, Square::F3);
        assert_eq!(pieces.at(Square::F3), None);
        assert!(pieces.all().is_empty());
        assert!(pieces.knights.is_empty());
    }

    #[test]
    fn bitboard_iterator() {
        let white = Pieces::new_white();

        let mut it = white.king.iter();
        assert_eq!(it.next(), Some(Square::E1));
        assert_eq!(it.next(), None);

        let mut it = white.bishops.iter();
        assert_eq!(it.len(), 2);
        assert_eq!(it.next(), Some(Square::C1));
        assert_eq!(it.next(), Some(Square::F1));
        assert_eq!(it.next(), None);

        // The order is important here: we are iterating from least significant
        // bits to most significant bits.
        assert_eq!(
            white.pawns.iter().collect::<Vec<_>>(),
            vec![
                Square::A2,
                Square::B2,
                Square::C2,
                Square::D2,
                Square::E2,
                Square::F2,
                Square::G2,
                Square::H2,
            ]
        );
    }

    #[test]
    fn set_ops() {
        let bitboard = Bitboard::from_squares(&[
            Square::A1,
            Square::B1,
            Square::C1,
            Square::D1,
            Square::E1,
            Square::F1,
            Square::H1,
            Square::A2,
            Square::B2,
            Square::C2,
            Square::D2,
            Square::G2,
            Square::F2,
            Square::H2,
            Square::F3,
            Square::E4,
            Square::E5,
            Square::C6,
            Square::A7,
            Square::B7,
            Square::C7,
            Square::D7,
            Square::F7,
            Square::G7,
            Square::H7,
            Square::A8,
            Square::C8,
            Square::D8,
            Square::E8,
            Square::F8,
            Square::G8,
            Square::H8,
        ]);
        assert_eq!(
            format!("{bitboard:?}"),
            "1 . 1 1 1 1 1 1\n\
            1 1 1 1 . 1 1 1\n\
            . . 1 . . . . .\n\
            . . . . 1 . . .\n\
            . . . . 1 . . .\n\
            . . . . . 1 . .\n\
            1 1 1 1 . 1 1 1\n\
            1 1 1 1 1 1 . 1"
        );
        assert_eq!(
            format!("{:?}", !bitboard),
            ". 1 . . . . . .\n\
            . . . . 1 . . .\n\
            1 1 . 1 1 1 1 1\n\
            1 1 1 1 . 1 1 1\n\
            1 1 1 1 . 1 1 1\n\
            1 1 1 1 1 . 1 1\n\
            . . . . 1 . . .\n\
            . . . . . . 1 ."
        );
        assert_eq!(
            format!(
                "{:?}",
                bitboard - Bitboard::from_squares(&[Square::A1, Square::E4, Square::G8])
            ),
            "1 . 1 1 1 1 . 1\n\
            1 1 1 1 . 1 1 1\n\
            . . 1 . . . . .\n\
            . . . . 1 . . .\n\
            . . . . . . . .\n\
            . . . . . 1 . .\n\
            1 1 1 1 . 1 1 1\n\
            . 1 1 1 1 1 . 1"
        );
        assert_eq!(!!bitboard, bitboard);
        assert_eq!(bitboard - !bitboard, bitboard);
    }

    #[test]
    // Check the debug output for few bitboards.
    fn bitboard_dump() {
        assert_eq!(
            format!("{:?}", Bitboard::empty()),
            ". . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . ."
        );
        assert_eq!(
            format!(
                "{:?}",
                Bitboard::from(Square::G5) | Bitboard::from(Square::B8)
            ),
            ". 1 . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . 1 .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . ."
        );
    }

    #[test]
    fn starting_board() {
        let starting_board = Board::starting();
        assert_eq!(
            format!("{starting_board:?}"),
            "r n b q k b n r\n\
             p p p p p p p p\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             . . . . . . . .\n\
             P P P P P P P P\n\
             R N B Q K B N R"
        );
        assert_eq!(
            starting_board.occupancy(),
            Rank::One.mask() | Rank::Two.mask() | Rank::Seven.mask() | Rank::Eight.mask()
        );
        assert_eq!(
            starting_board.to_string(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
        assert_eq!(
            starting_board.at(Square::D8),
            Some(Piece {
                owner: Player::Black,
                kind: PieceKind::Queen
            })
        );
        assert_eq!(starting_board.at(Square::D4), None);
    }

    #[test]
    fn empty_board() {
        assert_eq!(Board::empty().to_string(), "8/8/8/8/8/8/8/8");
        assert!(Board::empty().occupancy().is_empty());
    }
}
