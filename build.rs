//! Generates the attack tables and Zobrist keys used by the engine and
//! retrieves build metadata from Git for the version string.
//!
//! Everything here runs once per build: the engine itself never initializes
//! lookup tables at runtime, it only reads the `static` arrays this script
//! writes to `OUT_DIR` (see `src/chess/generated.rs`).

use std::error::Error;
use std::fmt::Write;
use std::path::Path;
use std::{env, fs};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

const BOARD_WIDTH: i32 = 8;
const BOARD_SIZE: i32 = BOARD_WIDTH * BOARD_WIDTH;

const BISHOP_ATTACK_DIRECTIONS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_ATTACK_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const KING_STEPS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const KNIGHT_STEPS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

// Fixed seeds keep magics and Zobrist keys identical from build to build, so
// position hashes are reproducible across runs and machines.
const MAGIC_SEED: u64 = 0x5EED_0F_B17B_0A2D;
const ZOBRIST_SEED: u64 = 0x2F0B_2157_C0FF_EE00;

fn from_index(index: i32) -> (i32, i32) {
    (index % BOARD_WIDTH, index / BOARD_WIDTH)
}

fn to_square(column: i32, row: i32) -> u64 {
    1 << (row * BOARD_WIDTH + column)
}

fn is_within_board(column: i32, row: i32) -> bool {
    (0..BOARD_WIDTH).contains(&column) && (0..BOARD_WIDTH).contains(&row)
}

// Serial implementation of PDEP: scatters the low bits of `a` into the set
// bits of `mask`. Enumerates all subsets of a relevant occupancy mask.
fn pdep(a: u64, mask: u64) -> u64 {
    let mut result = 0u64;
    let mut mask = mask;
    let mut scanning_bit = 1u64;
    while mask != 0 {
        let ls1b = 1u64 << mask.trailing_zeros();
        if (a & scanning_bit) != 0 {
            result |= ls1b;
        }
        mask ^= ls1b;
        scanning_bit <<= 1;
    }
    result
}

fn generate_file(filename: &str, contents: &str) {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join(filename);
    fs::write(dest_path, contents).unwrap();
}

fn serialize_bitboard_array(array: &[u64]) -> Result<String, Box<dyn Error>> {
    let mut result = String::new();
    result.push('[');
    for element in array {
        writeln!(result, "Bitboard::from_bits({element}), ")?;
    }
    result.push(']');
    Ok(result)
}

fn serialize_array<T: std::fmt::Display>(array: &[T]) -> Result<String, Box<dyn Error>> {
    let mut result = String::new();
    result.push('[');
    for element in array {
        writeln!(result, "{element}, ")?;
    }
    result.push(']');
    Ok(result)
}

fn leaper_attacks(steps: &[(i32, i32)]) -> Vec<u64> {
    (0..BOARD_SIZE)
        .map(|square| {
            let (column, row) = from_index(square);
            steps
                .iter()
                .filter(|(d_column, d_row)| is_within_board(column + d_column, row + d_row))
                .fold(0u64, |acc, (d_column, d_row)| {
                    acc | to_square(column + d_column, row + d_row)
                })
        })
        .collect()
}

fn generate_leaper_tables() -> Result<(), Box<dyn Error>> {
    generate_file(
        "king_attacks",
        &serialize_bitboard_array(&leaper_attacks(&KING_STEPS))?,
    );
    generate_file(
        "knight_attacks",
        &serialize_bitboard_array(&leaper_attacks(&KNIGHT_STEPS))?,
    );
    generate_file(
        "white_pawn_attacks",
        &serialize_bitboard_array(&leaper_attacks(&[(-1, 1), (1, 1)]))?,
    );
    generate_file(
        "black_pawn_attacks",
        &serialize_bitboard_array(&leaper_attacks(&[(-1, -1), (1, -1)]))?,
    );
    Ok(())
}

fn generate_attacks(
    source_column: i32,
    source_row: i32,
    directions: &[(i32, i32); 4],
    occupancy_mask: u64,
) -> u64 {
    let mut result = 0u64;
    for (d_column, d_row) in directions {
        let mut column = source_column + d_column;
        let mut row = source_row + d_row;
        while is_within_board(column, row) {
            let attacked_square = to_square(column, row);
            result |= attacked_square;
            if (occupancy_mask & attacked_square) != 0 {
                break;
            }
            column += d_column;
            row += d_row;
        }
    }
    result
}

fn relevant_occupancy_mask(square: i32, directions: &[(i32, i32); 4]) -> u64 {
    let (source_column, source_row) = from_index(square);
    let mut mask = 0u64;
    for (d_column, d_row) in directions {
        let mut column = source_column + d_column;
        let mut row = source_row + d_row;
        // The last square on the ray is attacked regardless of its occupancy.
        while is_within_board(column + d_column, row + d_row) {
            mask |= to_square(column, row);
            column += d_column;
            row += d_row;
        }
    }
    mask
}

// Searches a multiplier that maps every subset of the relevant occupancy mask
// to a slot of a 2^bits table without destructive collisions. Returns the
// magic and the filled table.
fn find_magic(
    square: i32,
    mask: u64,
    directions: &[(i32, i32); 4],
    rng: &mut StdRng,
) -> (u64, Vec<u64>) {
    let (column, row) = from_index(square);
    let bits = mask.count_ones();
    let size = 1usize << bits;
    let occupancies: Vec<u64> = (0..size as u64).map(|index| pdep(index, mask)).collect();
    let reference: Vec<u64> = occupancies
        .iter()
        .map(|&occupancy| generate_attacks(column, row, directions, occupancy))
        .collect();
    let mut table: Vec<Option<u64>> = vec![None; size];
    loop {
        // Sparse candidates converge much faster.
        let magic = rng.next_u64() & rng.next_u64() & rng.next_u64();
        if (mask.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }
        table.iter_mut().for_each(|slot| *slot = None);
        let mut found = true;
        for (occupancy, attacks) in occupancies.iter().zip(&reference) {
            let index = (occupancy.wrapping_mul(magic) >> (64 - bits)) as usize;
            match table[index] {
                None => table[index] = Some(*attacks),
                Some(existing) if existing == *attacks => {},
                Some(_) => {
                    found = false;
                    break;
                },
            }
        }
        if found {
            return (magic, table.into_iter().map(|slot| slot.unwrap_or(0)).collect());
        }
    }
}

// Generates fancy magic tables for rooks and bishops and returns the table
// size for correctness check. Returned table size should be:
//
// - 5248 for bishop
// - 102400 for rook
//
// The tables are used in src/chess/attacks.rs, see documentation there for more
// information.
fn generate_magic_table(
    identifier: &str,
    directions: &[(i32, i32); 4],
    rng: &mut StdRng,
) -> Result<usize, Box<dyn Error>> {
    let mut attacks = vec![];
    let mut relevant_occupancies = vec![];
    let mut magics = vec![];
    let mut shifts = vec![];
    let mut table_offsets = vec![];
    for square in 0..BOARD_SIZE {
        let mask = relevant_occupancy_mask(square, directions);
        let (magic, table) = find_magic(square, mask, directions, rng);
        table_offsets.push(attacks.len());
        attacks.extend(table);
        relevant_occupancies.push(mask);
        magics.push(magic);
        shifts.push(64 - mask.count_ones());
    }
    generate_file(
        &(identifier.to_owned() + "_attacks"),
        &serialize_bitboard_array(&attacks)?,
    );
    generate_file(
        &(identifier.to_owned() + "_occupancies"),
        &serialize_array(&relevant_occupancies)?,
    );
    generate_file(
        &(identifier.to_owned() + "_magics"),
        &serialize_array(&magics)?,
    );
    generate_file(
        &(identifier.to_owned() + "_shifts"),
        &serialize_array(&shifts)?,
    );
    generate_file(
        &(identifier.to_owned() + "_offsets"),
        &serialize_array(&table_offsets)?,
    );
    Ok(attacks.len())
}

fn generate_attack_tables() -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(MAGIC_SEED);
    assert_eq!(
        generate_magic_table("bishop", &BISHOP_ATTACK_DIRECTIONS, &mut rng)?,
        5248
    );
    assert_eq!(
        generate_magic_table("rook", &ROOK_ATTACK_DIRECTIONS, &mut rng)?,
        102_400
    );
    Ok(())
}

// BETWEEN holds the squares strictly between two aligned squares, LINE holds
// the whole board line passing through both of them. Both are empty for
// squares that do not share a rank, file or diagonal.
fn generate_rays() -> Result<(), Box<dyn Error>> {
    let mut between = vec![0u64; (BOARD_SIZE * BOARD_SIZE) as usize];
    let mut line = vec![0u64; (BOARD_SIZE * BOARD_SIZE) as usize];
    for from in 0..BOARD_SIZE {
        let (from_column, from_row) = from_index(from);
        for (d_column, d_row) in BISHOP_ATTACK_DIRECTIONS
            .iter()
            .chain(ROOK_ATTACK_DIRECTIONS.iter())
        {
            // Full line through `from` in this direction (both ways).
            let mut full_line = to_square(from_column, from_row);
            for sign in [1, -1] {
                let (mut column, mut row) = (from_column + sign * d_column, from_row + sign * d_row);
                while is_within_board(column, row) {
                    full_line |= to_square(column, row);
                    column += sign * d_column;
                    row += sign * d_row;
                }
            }
            let mut squares_between = 0u64;
            let (mut column, mut row) = (from_column + d_column, from_row + d_row);
            while is_within_board(column, row) {
                let to = (row * BOARD_WIDTH + column) as usize;
                between[from as usize * BOARD_SIZE as usize + to] = squares_between;
                line[from as usize * BOARD_SIZE as usize + to] = full_line;
                squares_between |= to_square(column, row);
                column += d_column;
                row += d_row;
            }
        }
    }
    generate_file("between", &serialize_bitboard_array(&between)?);
    generate_file("line", &serialize_bitboard_array(&line)?);
    Ok(())
}

fn generate_zobrist_keys() -> Result<(), Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
    // 2 players * 6 piece kinds * 64 squares.
    let pieces: Vec<u64> = (0..2 * 6 * BOARD_SIZE).map(|_| rng.next_u64()).collect();
    let castling: Vec<u64> = (0..4).map(|_| rng.next_u64()).collect();
    let en_passant: Vec<u64> = (0..BOARD_WIDTH).map(|_| rng.next_u64()).collect();
    let black_to_move: u64 = rng.next_u64();
    generate_file("piece_zobrist_keys", &serialize_array(&pieces)?);
    generate_file("castling_zobrist_keys", &serialize_array(&castling)?);
    generate_file("en_passant_zobrist_keys", &serialize_array(&en_passant)?);
    generate_file("black_to_move_zobrist_key", &black_to_move.to_string());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    generate_leaper_tables()?;
    generate_attack_tables()?;
    generate_rays()?;
    generate_zobrist_keys()?;
    shadow_rs::new().map_err(|e| e.to_string())?;
    Ok(())
}
