//! Criterion benchmarks measure time of move generation and perft calculation.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shakmaty::{CastlingMode, Chess, Position as ShakmatyPosition};
use stronkchess::chess::position::Position;
use stronkchess::perft::perft;

const POSITIONS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    "2r3r1/p3k3/1p3pp1/1B5p/5P2/2P1p1P1/PP4KP/3R4 w - - 0 34",
    "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
];

fn movegen_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Move generation");
    let positions: Vec<Position> = POSITIONS
        .iter()
        .map(|fen| Position::from_fen(fen).unwrap())
        .collect();
    group.throughput(Throughput::Elements(positions.len() as u64));
    group.bench_with_input(
        BenchmarkId::new("movegen", format!("{} positions", positions.len())),
        &positions,
        |b, positions| {
            b.iter(|| {
                for position in positions {
                    std::hint::black_box(position.generate_moves());
                }
            });
        },
    );
    // shakmaty is a reasonable reference with stable performance.
    let shakmaty_positions: Vec<Chess> = POSITIONS
        .iter()
        .map(|fen| {
            let setup: shakmaty::fen::Fen = fen.parse().unwrap();
            setup.into_position(CastlingMode::Standard).unwrap()
        })
        .collect();
    group.bench_with_input(
        BenchmarkId::new(
            "movegen_reference_shakmaty",
            format!("{} positions", shakmaty_positions.len()),
        ),
        &shakmaty_positions,
        |b, positions| {
            b.iter(|| {
                for position in positions {
                    std::hint::black_box(position.legal_moves());
                }
            });
        },
    );
    group.finish();
}

criterion_group! {
    name = movegen;
    config = Criterion::default().sample_size(100);
    targets = movegen_bench
}

// This acts both as performance and correctness test.
fn perft_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    for (fen, depth, nodes) in [
        // Position 1.
        (POSITIONS[0], 5, 4_865_609),
        // Position 2.
        (POSITIONS[1], 4, 4_085_603),
        // Position 3.
        (POSITIONS[2], 6, 11_030_083),
        // Position 4.
        (POSITIONS[3], 5, 15_833_292),
    ] {
        let mut position = Position::from_fen(fen).unwrap();
        group.throughput(Throughput::Elements(nodes));
        group.bench_with_input(
            BenchmarkId::new("perft", format!("position {fen}, depth {depth}")),
            &depth,
            |b, &depth| {
                b.iter(|| {
                    assert_eq!(perft(&mut position, depth), nodes);
                });
            },
        );
    }
    group.finish();
}

criterion_group! {
    name = perft_group;
    config = Criterion::default().sample_size(10);
    targets = perft_bench
}

criterion_main!(movegen, perft_group);
